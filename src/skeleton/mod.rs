//! Skeleton tracing: thinned bitmap → polylines.
//!
//! 1. Chunks no larger than the chunk size are traced directly ([`leaf`])
//! 2. Larger chunks are cut along the cheapest seam ([`seam`])
//! 3. Both halves are traced recursively, in parallel when both hold
//!    foreground
//! 4. The halves' fragments are stitched back together ([`merge`])
//!
//! A chunk that cannot be cut anywhere is traced directly whatever its
//! size.

pub mod leaf;
pub mod merge;
pub mod seam;

use tracing::instrument;

use crate::bitmap::PixelView;
use crate::error::TraceError;
use crate::geom::Rect;
use crate::polyline::Fragments;

/// Parameters of the recursive tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceParams {
    /// Chunks with both sides at or below this size are leaves.
    pub chunk_size: usize,
    /// Recursion budget; exhausted branches contribute nothing.
    pub max_depth: usize,
    /// Trace sibling chunks on the rayon pool.
    pub parallel: bool,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            max_depth: 999,
            parallel: true,
        }
    }
}

/// Trace the skeleton inside `region` of a thinned image.
///
/// Every returned point lies inside `region`. Fails without touching any
/// pixel if `region` exceeds the image or the chunk size is zero.
#[instrument(level = "debug", skip(im), fields(w = im.width(), h = im.height()))]
pub fn trace(im: PixelView<'_>, region: Rect, params: &TraceParams) -> Result<Fragments, TraceError> {
    check(im, region, params)?;
    let frags = trace_chunk(im, region, params, params.max_depth, None);
    tracing::debug!(
        polylines = frags.len(),
        points = frags.total_points(),
        "skeleton traced"
    );
    Ok(frags)
}

/// Like [`trace`], also returning every sub-chunk the recursion visited.
///
/// Only non-empty halves of a split are listed, each right before the
/// chunks it was split into (pre-order, first half before second). The
/// order does not depend on `params.parallel`. `region` itself is not
/// listed.
#[instrument(level = "debug", skip(im), fields(w = im.width(), h = im.height()))]
pub fn trace_with_chunks(
    im: PixelView<'_>,
    region: Rect,
    params: &TraceParams,
) -> Result<(Fragments, Vec<Rect>), TraceError> {
    check(im, region, params)?;
    let mut chunks = Vec::new();
    let frags = trace_chunk(im, region, params, params.max_depth, Some(&mut chunks));
    tracing::debug!(
        polylines = frags.len(),
        chunks = chunks.len(),
        "skeleton traced"
    );
    Ok((frags, chunks))
}

fn check(im: PixelView<'_>, region: Rect, params: &TraceParams) -> Result<(), TraceError> {
    if params.chunk_size == 0 {
        return Err(TraceError::InvalidChunkSize);
    }
    region.check_within(im.width(), im.height())
}

fn trace_chunk(
    im: PixelView<'_>,
    chunk: Rect,
    params: &TraceParams,
    depth: usize,
    chunks: Option<&mut Vec<Rect>>,
) -> Fragments {
    if depth == 0 || chunk.is_empty() {
        return Fragments::new();
    }
    if chunk.width <= params.chunk_size && chunk.height <= params.chunk_size {
        return leaf::extract(im, chunk);
    }

    let Some(seam) = seam::find(im, chunk, params.chunk_size) else {
        tracing::trace!(?chunk, "no usable seam, tracing chunk whole");
        return leaf::extract(im, chunk);
    };
    if depth == params.max_depth {
        tracing::debug!(?seam, "root seam");
    }

    let (first, second) = seam.split(chunk);
    let recording = chunks.is_some();
    // Each half records into its own list so sibling tasks never share one.
    let recurse = |half: Rect| {
        let mut visited = Vec::new();
        let frags = trace_chunk(im, half, params, depth - 1, recording.then_some(&mut visited));
        (frags, visited)
    };
    let (frags, halves) = match (im.region_not_empty(first), im.region_not_empty(second)) {
        (true, true) => {
            let ((a, visited_a), (b, visited_b)) = if params.parallel {
                rayon::join(|| recurse(first), || recurse(second))
            } else {
                (recurse(first), recurse(second))
            };
            (
                merge::merge(a, b, seam),
                vec![(first, visited_a), (second, visited_b)],
            )
        }
        (true, false) => {
            let (a, visited) = recurse(first);
            (a, vec![(first, visited)])
        }
        (false, true) => {
            let (b, visited) = recurse(second);
            (b, vec![(second, visited)])
        }
        (false, false) => (Fragments::new(), Vec::new()),
    };

    if let Some(out) = chunks {
        for (half, visited) in halves {
            out.push(half);
            out.extend(visited);
        }
    }
    frags
}
