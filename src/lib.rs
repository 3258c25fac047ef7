//! img2skel: binary bitmap → skeleton polylines.
//!
//! Thins the foreground of a binary image to a one-pixel-wide skeleton
//! (Zhang-Suen), then traces that skeleton into open polylines by
//! recursively splitting the image into chunks and stitching the pieces
//! back together.
//!
//! # Example
//!
//! ```no_run
//! use img2skel::{trace_image, TracingConfig};
//! use std::path::Path;
//!
//! let config = TracingConfig::default();
//! let result = trace_image(Path::new("drawing.png"), &config)?;
//! for line in &result.polylines {
//!     println!("{} points", line.len());
//! }
//! # Ok::<(), img2skel::TraceError>(())
//! ```
//!
//! The core operations work on raw buffers as well:
//!
//! ```
//! let (w, h) = (20, 20);
//! let mut buf = vec![0u8; w * h];
//! for x in 2..18 {
//!     buf[10 * w + x] = 1;
//! }
//! img2skel::thin_buffer(&mut buf, w, h)?;
//! let lines = img2skel::trace_buffer(&buf, w, h, 0, 0, w, h, 10, 999)?;
//! assert_eq!(lines.len(), 1);
//! # Ok::<(), img2skel::TraceError>(())
//! ```

#![forbid(unsafe_code)]

mod config;
mod geom;

pub mod bitmap;
pub mod error;
pub mod output;
pub mod polyline;
pub mod render;
pub mod skeleton;
pub mod thin;

// Re-export kurbo so downstream users get the same version
// used by `TraceResult::paths`.
pub use kurbo;

pub use bitmap::{Bitmap, PixelView};
pub use config::{ThresholdMethod, TracingConfig};
pub use error::TraceError;
pub use geom::{Point, Rect};
pub use polyline::{Fragments, Polyline, PolylineId};
pub use skeleton::{trace, trace_with_chunks, TraceParams};
pub use thin::{thin, thin_buffer};

use std::path::Path;
use std::time::Instant;

use kurbo::BezPath;
use tracing::instrument;

/// The traced skeleton of one image.
#[derive(Debug, Clone)]
pub struct TraceResult {
    /// One open polyline per skeleton stroke, in pixel coordinates.
    pub polylines: Fragments,
    /// Source image width in pixels.
    pub width: usize,
    /// Source image height in pixels.
    pub height: usize,
    /// The binary image before thinning.
    pub bitmap: Bitmap,
    /// Sub-chunks visited by the tracer, when
    /// [`TracingConfig::record_chunks`] is set. Empty otherwise.
    pub chunks: Vec<Rect>,
}

impl TraceResult {
    /// The polylines as open kurbo paths.
    pub fn paths(&self) -> Vec<BezPath> {
        self.polylines.to_bezpaths()
    }
}

/// Trace a region of a caller-owned, already thinned buffer.
///
/// Flat-argument form of [`trace`]; validates the buffer and region
/// before reading any pixel.
#[allow(clippy::too_many_arguments)]
pub fn trace_buffer(
    buf: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    region_width: usize,
    region_height: usize,
    chunk_size: usize,
    max_depth: usize,
) -> Result<Fragments, TraceError> {
    let view = PixelView::new(buf, width, height)?;
    let params = TraceParams {
        chunk_size,
        max_depth,
        ..TraceParams::default()
    };
    trace(view, Rect::new(x, y, region_width, region_height), &params)
}

/// Full pipeline: image path → skeleton polylines.
///
/// Load and threshold, thin, then trace the whole image.
pub fn trace_image(image_path: &Path, config: &TracingConfig) -> Result<TraceResult, TraceError> {
    config.validate()?;
    let t_start = Instant::now();

    // ── Load & threshold ──────────────────────────────────
    let bitmap = bitmap::load_and_threshold(image_path, config)?;
    let threshold_name = match config.threshold {
        ThresholdMethod::Otsu => "Otsu".to_string(),
        ThresholdMethod::Fixed(t) => format!("fixed {}", t),
    };
    eprintln!(
        "  Load        {}x{} px, {} threshold, {} foreground",
        bitmap.width(),
        bitmap.height(),
        threshold_name,
        bitmap.count_foreground(),
    );

    let result = trace_owned(bitmap, config)?;
    eprintln!(
        "  Total       {}ms",
        t_start.elapsed().as_millis()
    );
    Ok(result)
}

/// Thin (unless disabled) and trace an in-memory bitmap.
///
/// The caller's bitmap is left untouched; thinning runs on a copy.
pub fn trace_bitmap(bitmap: &Bitmap, config: &TracingConfig) -> Result<TraceResult, TraceError> {
    trace_owned(bitmap.clone(), config)
}

#[instrument(level = "debug", skip_all, fields(w = bitmap.width(), h = bitmap.height()))]
fn trace_owned(bitmap: Bitmap, config: &TracingConfig) -> Result<TraceResult, TraceError> {
    config.validate()?;

    // ── Thin ──────────────────────────────────────────────
    let mut skeleton = bitmap.clone();
    if config.thin {
        let t = Instant::now();
        let before = skeleton.count_foreground();
        let iterations = thin(&mut skeleton);
        eprintln!(
            "  Thin        {} \u{2192} {} px in {} iterations  ({}ms)",
            before,
            skeleton.count_foreground(),
            iterations,
            t.elapsed().as_millis(),
        );
    }

    // ── Trace ─────────────────────────────────────────────
    let t = Instant::now();
    let params = config.trace_params();
    let (polylines, chunks) = if config.record_chunks {
        trace_with_chunks(skeleton.view(), skeleton.bounds(), &params)?
    } else {
        (trace(skeleton.view(), skeleton.bounds(), &params)?, Vec::new())
    };
    if polylines.is_empty() {
        return Err(TraceError::NoSkeleton);
    }
    eprintln!(
        "  Trace       {} polylines \u{00b7} {} points \u{00b7} chunk {}  ({}ms)",
        polylines.len(),
        polylines.total_points(),
        config.chunk_size,
        t.elapsed().as_millis(),
    );

    Ok(TraceResult {
        polylines,
        width: bitmap.width(),
        height: bitmap.height(),
        bitmap,
        chunks,
    })
}
