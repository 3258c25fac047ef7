//! Seam search: where to cut a chunk in two.
//!
//! A seam is a row (or column) boundary. Cutting at row `r` puts rows
//! `[y, r)` in the first half and `[r, bottom)` in the second, so the two
//! pixel lines straddling the seam are `r - 1` and `r`. A candidate is only
//! usable when both straddling lines are background at the two ends of the
//! cut, which keeps strokes from being sliced along the chunk border.
//! Among usable candidates the one crossing the fewest foreground pixels
//! wins; ties go to the candidate nearest the chunk center, which keeps the
//! recursion tree balanced.

use crate::bitmap::PixelView;
use crate::geom::Rect;

/// Candidates closer than this to either chunk edge are never considered.
const EDGE_MARGIN: usize = 3;

/// Direction of the cut line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// A row boundary; splits the chunk into top and bottom halves.
    Horizontal,
    /// A column boundary; splits the chunk into left and right halves.
    Vertical,
}

/// A chosen cut through a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seam {
    pub orientation: Orientation,
    /// Absolute row (horizontal) or column (vertical) where the second
    /// half starts.
    pub at: usize,
    /// Foreground pixels on the two lines straddling the seam.
    pub score: usize,
}

impl Seam {
    /// Split `chunk` into (top, bottom) or (left, right).
    pub fn split(&self, chunk: Rect) -> (Rect, Rect) {
        match self.orientation {
            Orientation::Horizontal => chunk.split_at_row(self.at),
            Orientation::Vertical => chunk.split_at_column(self.at),
        }
    }
}

/// Find the best seam for a chunk larger than `chunk_size`.
///
/// Rows are only searched when the chunk is taller than `chunk_size` and
/// columns only when it is wider. A column seam replaces the best row seam
/// only with a strictly lower score, so equal scores favour the row.
pub fn find(im: PixelView<'_>, chunk: Rect, chunk_size: usize) -> Option<Seam> {
    let row = if chunk.height > chunk_size {
        best_row(im, chunk)
    } else {
        None
    };
    let column = if chunk.width > chunk_size {
        best_column(im, chunk)
    } else {
        None
    };
    match (row, column) {
        (Some(r), Some(c)) if c.score < r.score => Some(c),
        (Some(r), _) => Some(r),
        (None, c) => c,
    }
}

fn best_row(im: PixelView<'_>, chunk: Rect) -> Option<Seam> {
    let Rect { x, y, width, .. } = chunk;
    let last = chunk.right() - 1;
    let center = y + chunk.height / 2;
    let candidates = (y + EDGE_MARGIN..chunk.bottom().saturating_sub(EDGE_MARGIN)).filter(|&i| {
        !(im.is_set(x, i) || im.is_set(x, i - 1) || im.is_set(last, i) || im.is_set(last, i - 1))
    });
    pick(candidates, center, Orientation::Horizontal, |i| {
        im.row_sum(x, i, width) + im.row_sum(x, i - 1, width)
    })
}

fn best_column(im: PixelView<'_>, chunk: Rect) -> Option<Seam> {
    let Rect { x, y, height, .. } = chunk;
    let last = chunk.bottom() - 1;
    let center = x + chunk.width / 2;
    let candidates = (x + EDGE_MARGIN..chunk.right().saturating_sub(EDGE_MARGIN)).filter(|&j| {
        !(im.is_set(j, y) || im.is_set(j - 1, y) || im.is_set(j, last) || im.is_set(j - 1, last))
    });
    pick(candidates, center, Orientation::Vertical, |j| {
        im.column_sum(j, y, height) + im.column_sum(j - 1, y, height)
    })
}

/// Lowest score wins; among equal scores the first candidate strictly
/// closest to `center`.
fn pick(
    candidates: impl Iterator<Item = usize>,
    center: usize,
    orientation: Orientation,
    score: impl Fn(usize) -> usize,
) -> Option<Seam> {
    let mut best: Option<Seam> = None;
    for at in candidates {
        let s = score(at);
        let better = match best {
            None => true,
            Some(b) => s < b.score || (s == b.score && at.abs_diff(center) < b.at.abs_diff(center)),
        };
        if better {
            best = Some(Seam {
                orientation,
                at,
                score: s,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;

    #[test]
    fn blank_chunk_splits_through_the_middle() {
        let bm = Bitmap::blank(20, 20);
        let seam = find(bm.view(), bm.bounds(), 10).unwrap();
        assert_eq!(seam.orientation, Orientation::Horizontal);
        assert_eq!(seam.at, 10);
        assert_eq!(seam.score, 0);
    }

    #[test]
    fn only_wide_chunks_get_column_seams() {
        let bm = Bitmap::blank(20, 8);
        let seam = find(bm.view(), bm.bounds(), 10).unwrap();
        assert_eq!(seam.orientation, Orientation::Vertical);
        assert_eq!(seam.at, 10);
    }

    #[test]
    fn seam_avoids_a_horizontal_stroke() {
        let mut bm = Bitmap::blank(20, 20);
        for x in 2..18 {
            bm.set(x, 10, true);
        }
        let seam = find(bm.view(), bm.bounds(), 10).unwrap();
        assert_eq!(seam.orientation, Orientation::Horizontal);
        assert_eq!(seam.score, 0);
        // Rows 10 and 11 would straddle the stroke; 9 is the nearest clean cut.
        assert_eq!(seam.at, 9);
    }

    #[test]
    fn column_wins_only_when_strictly_better() {
        // A vertical stroke makes every row seam cost 2 while columns away
        // from it cost nothing.
        let mut bm = Bitmap::blank(20, 20);
        for y in 2..18 {
            bm.set(10, y, true);
        }
        let seam = find(bm.view(), bm.bounds(), 10).unwrap();
        assert_eq!(seam.orientation, Orientation::Vertical);
        assert_eq!(seam.score, 0);
        assert_eq!(seam.at, 9);
    }

    #[test]
    fn strokes_touching_the_edges_block_every_cut() {
        let mut bm = Bitmap::blank(12, 12);
        for i in 0..12 {
            bm.set(0, i, true);
            bm.set(i, 0, true);
        }
        assert_eq!(find(bm.view(), bm.bounds(), 4), None);
    }

    #[test]
    fn split_halves_tile_the_chunk() {
        let seam = Seam {
            orientation: Orientation::Vertical,
            at: 7,
            score: 0,
        };
        let (a, b) = seam.split(Rect::new(2, 1, 10, 4));
        assert_eq!(a, Rect::new(2, 1, 5, 4));
        assert_eq!(b, Rect::new(7, 1, 5, 4));
    }
}
