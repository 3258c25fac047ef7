//! Stitching the fragments of two sibling chunks across their seam.
//!
//! Every fragment from the second chunk that ends exactly on the seam looks
//! for a fragment from the first chunk ending on, or one pixel before, the
//! seam. The closest such fragment along the seam (fewer than
//! [`MAX_OFFSET`] pixels away) absorbs it. Fragments that find no partner
//! are carried over unchanged.

use crate::geom::Point;
use crate::polyline::{Fragments, PolylineId};

use super::seam::{Orientation, Seam};

/// Matches at this distance along the seam or more are rejected.
const MAX_OFFSET: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Head,
    Tail,
}

/// (first-chunk end, second-chunk end) pairs, in the order they are tried.
const PAIRINGS: [(End, End); 4] = [
    (End::Tail, End::Head),
    (End::Head, End::Head),
    (End::Tail, End::Tail),
    (End::Head, End::Tail),
];

/// Merge `second` into `first` across `seam`.
///
/// `first` holds the fragments of the top (or left) half, `second` those
/// of the bottom (or right) half.
pub fn merge(mut first: Fragments, second: Fragments, seam: Seam) -> Fragments {
    if first.is_empty() {
        return second;
    }
    if second.is_empty() {
        return first;
    }

    let incoming = first.absorb(second);
    let mut unmatched = Vec::new();
    for id in incoming {
        let joined = PAIRINGS
            .iter()
            .any(|&(near, far)| try_join(&mut first, id, seam, near, far));
        if !joined {
            unmatched.push(id);
        }
    }
    tracing::trace!(
        at = seam.at,
        unmatched = unmatched.len(),
        "merged fragments across seam"
    );
    for id in unmatched {
        first.prepend(id);
    }
    first
}

/// Try to splice detached fragment `id` onto a fragment already in
/// `frags`, pairing its `far` end with the candidate's `near` end.
fn try_join(frags: &mut Fragments, id: PolylineId, seam: Seam, near: End, far: End) -> bool {
    let Some(p1) = endpoint(frags, id, far) else {
        return false;
    };
    if across(p1, seam) != seam.at as i32 {
        return false;
    }

    let mut best: Option<(PolylineId, i32)> = None;
    for line in frags.iter() {
        let Some(p0) = endpoint(frags, line.id(), near) else {
            continue;
        };
        if (across(p0, seam) - seam.at as i32).abs() > 1 {
            continue;
        }
        let d = (along(p0, seam) - along(p1, seam)).abs();
        if d < best.map_or(MAX_OFFSET, |(_, bd)| bd) {
            best = Some((line.id(), d));
        }
    }
    let Some((target, _)) = best else {
        return false;
    };

    match (near, far) {
        (End::Head, End::Head) => {
            frags.reverse(id);
            frags.cat_head(target, id);
        }
        (End::Tail, End::Head) => frags.cat_tail(target, id),
        (End::Head, End::Tail) => frags.cat_head(target, id),
        (End::Tail, End::Tail) => {
            frags.reverse(id);
            frags.cat_tail(target, id);
        }
    }
    true
}

fn endpoint(frags: &Fragments, id: PolylineId, end: End) -> Option<Point> {
    match end {
        End::Head => frags.head(id),
        End::Tail => frags.tail(id),
    }
}

/// Coordinate perpendicular to the seam line.
fn across(p: Point, seam: Seam) -> i32 {
    match seam.orientation {
        Orientation::Horizontal => p.y,
        Orientation::Vertical => p.x,
    }
}

/// Coordinate along the seam line.
fn along(p: Point, seam: Seam) -> i32 {
    match seam.orientation {
        Orientation::Horizontal => p.x,
        Orientation::Vertical => p.y,
    }
}
