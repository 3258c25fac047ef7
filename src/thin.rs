//! Zhang-Suen thinning.
//!
//! Reduces every foreground region to a one-pixel-wide skeleton, in place.
//! Each iteration runs two sub-passes with mirrored structuring elements.
//! A sub-pass first marks removable pixels in bit 1 of the buffer while
//! reading only bit 0, then clears every marked pixel, so decisions within
//! a sub-pass never see each other's removals.
//!
//! The outermost ring of pixels is never examined or modified.

use tracing::instrument;

use crate::bitmap::Bitmap;
use crate::error::TraceError;

const MARK: u8 = 0b10;

/// Which structuring-element orientation a sub-pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubPass {
    /// Removes south-east boundary pixels and north-west corners.
    First,
    /// Removes north-west boundary pixels and south-east corners.
    Second,
}

/// Thin a bitmap in place. Returns the number of iterations run.
///
/// Re-running on an already thinned bitmap changes nothing and returns 1.
pub fn thin(bitmap: &mut Bitmap) -> usize {
    let (w, h) = bitmap.dimensions();
    thin_in_place(bitmap.as_mut_slice(), w, h)
}

/// Thin a caller-owned row-major buffer of 0/1 values.
pub fn thin_buffer(buf: &mut [u8], width: usize, height: usize) -> Result<usize, TraceError> {
    crate::bitmap::PixelView::new(buf, width, height)?;
    Ok(thin_in_place(buf, width, height))
}

#[instrument(level = "debug", skip(im))]
fn thin_in_place(im: &mut [u8], w: usize, h: usize) -> usize {
    let mut iterations = 0;
    loop {
        iterations += 1;
        let first = sub_pass(im, w, h, SubPass::First);
        let second = sub_pass(im, w, h, SubPass::Second);
        if !first && !second {
            break;
        }
    }
    tracing::debug!(iterations, "thinning converged");
    iterations
}

/// Run one marking sub-pass followed by the sweep. Returns true if any
/// pixel was removed.
fn sub_pass(im: &mut [u8], w: usize, h: usize, pass: SubPass) -> bool {
    if w < 3 || h < 3 {
        return false;
    }
    for i in 1..h - 1 {
        for j in 1..w - 1 {
            if im[i * w + j] & 1 == 0 {
                continue;
            }
            // p2..p9, clockwise from north.
            let p = [
                im[(i - 1) * w + j] & 1,
                im[(i - 1) * w + j + 1] & 1,
                im[i * w + j + 1] & 1,
                im[(i + 1) * w + j + 1] & 1,
                im[(i + 1) * w + j] & 1,
                im[(i + 1) * w + j - 1] & 1,
                im[i * w + j - 1] & 1,
                im[(i - 1) * w + j - 1] & 1,
            ];
            if is_removable(&p, pass) {
                im[i * w + j] |= MARK;
            }
        }
    }

    let mut changed = false;
    for v in im.iter_mut() {
        let old = *v & 1;
        let new = if *v & MARK != 0 { 0 } else { old };
        changed |= new != old;
        *v = new;
    }
    changed
}

/// The Zhang-Suen removal test for neighbours `p2..=p9`.
fn is_removable(p: &[u8; 8], pass: SubPass) -> bool {
    let [p2, _, p4, _, p6, _, p8, _] = *p;
    let transitions = (0..8).filter(|&k| p[k] == 0 && p[(k + 1) % 8] == 1).count();
    let neighbours: u8 = p.iter().sum();
    let (m1, m2) = match pass {
        SubPass::First => (p2 * p4 * p6, p4 * p6 * p8),
        SubPass::Second => (p2 * p4 * p8, p2 * p6 * p8),
    };
    transitions == 1 && (2..=6).contains(&neighbours) && m1 == 0 && m2 == 0
}
