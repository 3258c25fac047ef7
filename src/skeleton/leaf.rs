//! Leaf chunks: turn a small chunk of skeleton into fragments.
//!
//! The chunk border is walked clockwise from the top-left corner. Each run
//! of consecutive foreground border pixels is one place where a stroke
//! leaves the chunk (a crossing), located at the midpoint of the run. Every
//! crossing gets a fragment running from the crossing to the chunk center.
//!
//! - Two crossings: a single segment joins them directly, running from the
//!   later crossing in walk order back to the earlier one.
//! - More than two: the shared center moves to the densest 3×3 window
//!   inside the chunk, so all branches meet at the junction.
//! - No crossings but foreground inside: the blob is reported as a
//!   zero-length fragment at its densest point.

use crate::bitmap::PixelView;
use crate::geom::{Point, Rect};
use crate::polyline::{Fragments, PolylineId};

/// Extract fragments from one leaf chunk.
pub fn extract(im: PixelView<'_>, chunk: Rect) -> Fragments {
    let mut frags = Fragments::new();
    if chunk.is_empty() {
        return frags;
    }
    let center = chunk.center();

    // Crossings in walk order.
    let mut crossings: Vec<PolylineId> = Vec::new();
    let mut open = false;
    let mut last = Point::default();
    for p in perimeter(chunk) {
        if im.is_set(p.x as usize, p.y as usize) {
            if !open {
                open = true;
                crossings.push(frags.add(&[p, center]));
            }
        } else if open {
            // Leaving the stroke: move the entry point to the stroke's middle.
            if let Some(&id) = crossings.last() {
                if let Some(entry) = frags.head(id) {
                    frags.set_head(id, entry.midpoint(last));
                }
            }
            open = false;
        }
        last = p;
    }

    match crossings.len() {
        0 => {
            if let Some(dot) = densest_point(im, chunk) {
                if dot.score > 0 {
                    frags.add(&[dot.at, dot.at]);
                }
            }
            frags
        }
        2 => {
            // Later crossing first.
            let ends: Vec<Point> = crossings
                .iter()
                .rev()
                .filter_map(|&id| frags.head(id))
                .collect();
            let mut joined = Fragments::new();
            joined.add(&ends);
            joined
        }
        1 => frags,
        _ => {
            if let Some(junction) = densest_point(im, chunk) {
                for &id in &crossings {
                    frags.set_tail(id, junction.at);
                }
            }
            frags
        }
    }
}

/// Border pixels of `chunk`, clockwise from the top-left corner.
///
/// Yields `2 * (width + height) - 4` positions when both sides are at
/// least two pixels; thinner chunks revisit some pixels.
fn perimeter(chunk: Rect) -> impl Iterator<Item = Point> {
    let Rect { x, y, .. } = chunk;
    let right = chunk.right() - 1;
    let bottom = chunk.bottom() - 1;
    let pt = |x: usize, y: usize| Point::new(x as i32, y as i32);

    let top = (x..=right).map(move |j| pt(j, y));
    let right_side = (y + 1..=bottom).map(move |i| pt(right, i));
    let bottom_side = (x..right).rev().map(move |j| pt(j, bottom));
    let left_side = (y + 1..bottom).rev().map(move |i| pt(x, i));
    top.chain(right_side).chain(bottom_side).chain(left_side)
}

#[derive(Debug, Clone, Copy)]
struct Densest {
    at: Point,
    score: u8,
}

/// Center of the 3×3 window with the most foreground, over every window
/// that fits inside `chunk`. Ties go to the window nearest the chunk center
/// (Manhattan distance), then to the first in raster order.
fn densest_point(im: PixelView<'_>, chunk: Rect) -> Option<Densest> {
    if chunk.width < 3 || chunk.height < 3 {
        return None;
    }
    let center = chunk.center();
    let mut best: Option<Densest> = None;
    for i in chunk.y + 1..chunk.bottom() - 1 {
        for j in chunk.x + 1..chunk.right() - 1 {
            let score: u8 = (i - 1..=i + 1)
                .flat_map(|yy| (j - 1..=j + 1).map(move |xx| (xx, yy)))
                .map(|(xx, yy)| im.get(xx, yy))
                .sum();
            let at = Point::new(j as i32, i as i32);
            let better = match best {
                None => true,
                Some(b) => {
                    score > b.score || (score == b.score && at.l1(center) < b.at.l1(center))
                }
            };
            if better {
                best = Some(Densest { at, score });
            }
        }
    }
    best
}
