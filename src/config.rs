use crate::error::TraceError;

/// All tracing parameters in one struct.
///
/// Override individual fields with struct-update syntax:
/// `TracingConfig { chunk_size: 16, ..TracingConfig::default() }`.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    // -- Bitmap stage --
    /// Threshold method for converting to binary.
    pub threshold: ThresholdMethod,
    /// If true, invert the image (swap foreground/background) before tracing.
    pub invert: bool,

    // -- Thinning stage --
    /// Run Zhang-Suen thinning before tracing. Disable for images that
    /// are already one pixel wide.
    pub thin: bool,

    // -- Tracing stage --
    /// Chunks with both sides at or below this size are traced directly
    /// instead of being split further.
    pub chunk_size: usize,
    /// Recursion budget. Regions still unresolved when it runs out are
    /// dropped from the result.
    pub max_depth: usize,
    /// Trace the two halves of each split on the rayon pool.
    pub parallel: bool,
    /// Keep the list of sub-chunks the tracer visited (for overlays).
    pub record_chunks: bool,
}

/// Threshold method for converting a grayscale image to binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMethod {
    /// Fixed brightness threshold (0-255).
    Fixed(u8),
    /// Otsu's method (automatic).
    Otsu,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::Otsu,
            invert: false,
            thin: true,
            chunk_size: 10,
            max_depth: 999,
            parallel: true,
            record_chunks: false,
        }
    }
}

impl TracingConfig {
    /// Reject parameter combinations the tracer cannot run with.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.chunk_size == 0 {
            return Err(TraceError::InvalidChunkSize);
        }
        Ok(())
    }

    /// The subset of parameters the recursive tracer needs.
    pub fn trace_params(&self) -> crate::skeleton::TraceParams {
        crate::skeleton::TraceParams {
            chunk_size: self.chunk_size,
            max_depth: self.max_depth,
            parallel: self.parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TracingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.max_depth, 999);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = TracingConfig {
            chunk_size: 0,
            ..TracingConfig::default()
        };
        assert!(matches!(config.validate(), Err(TraceError::InvalidChunkSize)));
    }
}
