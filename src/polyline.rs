//! Arena-backed polylines.
//!
//! A [`Fragments`] collection owns every point and polyline it holds. Points
//! are singly linked through indices into the point arena, so appending,
//! splicing two polylines together and detaching a polyline from the
//! collection are all O(1); reversing is O(len). Polylines themselves form a
//! doubly linked list inside the collection.
//!
//! Splicing consumes the source polyline: its points move to the
//! destination and the source id must not be used again.

use std::fmt::Write as _;

use kurbo::BezPath;

use crate::geom::Point;

/// Handle to a polyline inside a [`Fragments`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolylineId(usize);

#[derive(Debug, Clone, Copy)]
struct Node {
    point: Point,
    next: Option<usize>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    head: Option<usize>,
    tail: Option<usize>,
    size: usize,
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
    consumed: bool,
}

/// A collection of open polylines.
///
/// Used both for the in-progress fragments of a chunk and for the final
/// traced skeleton.
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    nodes: Vec<Node>,
    slots: Vec<Slot>,
    first: Option<usize>,
    len: usize,
}

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of polylines in the collection.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocate an empty polyline that is not yet part of the collection.
    pub fn create(&mut self) -> PolylineId {
        self.slots.push(Slot::default());
        PolylineId(self.slots.len() - 1)
    }

    /// Create a polyline from `points` and prepend it to the collection.
    pub fn add(&mut self, points: &[Point]) -> PolylineId {
        let id = self.create();
        for &p in points {
            self.push_point(id, p);
        }
        self.prepend(id);
        id
    }

    /// Append a point at the tail.
    pub fn push_point(&mut self, id: PolylineId, point: Point) {
        debug_assert!(!self.slots[id.0].consumed, "polyline already consumed");
        self.nodes.push(Node { point, next: None });
        let node = self.nodes.len() - 1;
        let slot = &mut self.slots[id.0];
        match slot.tail {
            Some(tail) => self.nodes[tail].next = Some(node),
            None => slot.head = Some(node),
        }
        slot.tail = Some(node);
        slot.size += 1;
    }

    /// Insert a detached polyline at the front of the collection.
    pub fn prepend(&mut self, id: PolylineId) {
        let slot = &self.slots[id.0];
        debug_assert!(!slot.linked && !slot.consumed);
        if let Some(first) = self.first {
            self.slots[first].prev = Some(id.0);
        }
        let slot = &mut self.slots[id.0];
        slot.prev = None;
        slot.next = self.first;
        slot.linked = true;
        self.first = Some(id.0);
        self.len += 1;
    }

    /// Remove a polyline from the collection without dropping its points.
    pub fn unlink(&mut self, id: PolylineId) {
        let Slot {
            prev, next, linked, ..
        } = self.slots[id.0];
        if !linked {
            return;
        }
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.first = next,
        }
        if let Some(n) = next {
            self.slots[n].prev = prev;
        }
        let slot = &mut self.slots[id.0];
        slot.prev = None;
        slot.next = None;
        slot.linked = false;
        self.len -= 1;
    }

    /// Reverse the point order in place. No-op below two points.
    pub fn reverse(&mut self, id: PolylineId) {
        let slot = &self.slots[id.0];
        if slot.size < 2 {
            return;
        }
        let (head, tail) = (slot.head, slot.tail);
        let mut prev = None;
        let mut cur = head;
        while let Some(i) = cur {
            cur = self.nodes[i].next;
            self.nodes[i].next = prev;
            prev = Some(i);
        }
        let slot = &mut self.slots[id.0];
        slot.head = tail;
        slot.tail = head;
    }

    /// Append all of `src`'s points after `dst`'s tail, consuming `src`.
    pub fn cat_tail(&mut self, dst: PolylineId, src: PolylineId) {
        let Some((head, tail, size)) = self.take(dst, src) else {
            return;
        };
        let slot = &mut self.slots[dst.0];
        match slot.tail {
            Some(old_tail) => self.nodes[old_tail].next = Some(head),
            None => slot.head = Some(head),
        }
        slot.tail = Some(tail);
        slot.size += size;
    }

    /// Prepend all of `src`'s points before `dst`'s head, consuming `src`.
    pub fn cat_head(&mut self, dst: PolylineId, src: PolylineId) {
        let Some((head, tail, size)) = self.take(dst, src) else {
            return;
        };
        let slot = &mut self.slots[dst.0];
        match slot.head {
            Some(old_head) => self.nodes[tail].next = Some(old_head),
            None => slot.tail = Some(tail),
        }
        slot.head = Some(head);
        slot.size += size;
    }

    /// Detach `src` and mark it consumed, returning its point chain.
    fn take(&mut self, dst: PolylineId, src: PolylineId) -> Option<(usize, usize, usize)> {
        assert_ne!(dst, src, "cannot splice a polyline onto itself");
        debug_assert!(!self.slots[src.0].consumed, "polyline already consumed");
        self.unlink(src);
        let slot = std::mem::take(&mut self.slots[src.0]);
        self.slots[src.0].consumed = true;
        Some((slot.head?, slot.tail?, slot.size))
    }

    pub fn head(&self, id: PolylineId) -> Option<Point> {
        self.slots[id.0].head.map(|i| self.nodes[i].point)
    }

    pub fn tail(&self, id: PolylineId) -> Option<Point> {
        self.slots[id.0].tail.map(|i| self.nodes[i].point)
    }

    pub fn set_head(&mut self, id: PolylineId, point: Point) {
        if let Some(i) = self.slots[id.0].head {
            self.nodes[i].point = point;
        }
    }

    pub fn set_tail(&mut self, id: PolylineId, point: Point) {
        if let Some(i) = self.slots[id.0].tail {
            self.nodes[i].point = point;
        }
    }

    /// Ids of the polylines currently in the collection, front first.
    pub fn ids(&self) -> Vec<PolylineId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut cur = self.first;
        while let Some(i) = cur {
            ids.push(PolylineId(i));
            cur = self.slots[i].next;
        }
        ids
    }

    /// Move every point and polyline of `other` into this arena.
    ///
    /// The moved polylines come back detached, in `other`'s front-to-back
    /// order; the caller decides whether to splice or prepend each one.
    pub fn absorb(&mut self, other: Fragments) -> Vec<PolylineId> {
        let node_base = self.nodes.len();
        let slot_base = self.slots.len();
        let incoming: Vec<PolylineId> = other
            .ids()
            .into_iter()
            .map(|id| PolylineId(id.0 + slot_base))
            .collect();

        let shift = |i: Option<usize>, base: usize| i.map(|i| i + base);
        self.nodes.extend(other.nodes.into_iter().map(|n| Node {
            point: n.point,
            next: shift(n.next, node_base),
        }));
        self.slots.extend(other.slots.into_iter().map(|s| Slot {
            head: shift(s.head, node_base),
            tail: shift(s.tail, node_base),
            size: s.size,
            prev: None,
            next: None,
            linked: false,
            consumed: s.consumed,
        }));
        incoming
    }

    /// Read-only view of one polyline.
    pub fn polyline(&self, id: PolylineId) -> Polyline<'_> {
        Polyline { arena: self, id }
    }

    /// Iterate over the polylines in the collection, front first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: self,
            cur: self.first,
        }
    }

    /// Point count summed over all polylines.
    pub fn total_points(&self) -> usize {
        self.iter().map(|p| p.len()).sum()
    }

    pub fn to_vecs(&self) -> Vec<Vec<Point>> {
        self.iter().map(|p| p.to_vec()).collect()
    }

    /// One open `BezPath` per polyline.
    pub fn to_bezpaths(&self) -> Vec<BezPath> {
        self.iter().map(|p| p.to_bezpath()).collect()
    }

    /// Plain-text dump: one polyline per line, `x,y` pairs separated by
    /// spaces.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in self.iter() {
            for p in line.points() {
                let _ = write!(out, "{},{} ", p.x, p.y);
            }
            out.push('\n');
        }
        out
    }
}

impl<'a> IntoIterator for &'a Fragments {
    type Item = Polyline<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the polylines of a [`Fragments`] collection.
pub struct Iter<'a> {
    arena: &'a Fragments,
    cur: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Polyline<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.cur?;
        self.cur = self.arena.slots[i].next;
        Some(Polyline {
            arena: self.arena,
            id: PolylineId(i),
        })
    }
}

/// Borrowed view of a single polyline.
#[derive(Clone, Copy)]
pub struct Polyline<'a> {
    arena: &'a Fragments,
    id: PolylineId,
}

impl<'a> Polyline<'a> {
    pub fn id(&self) -> PolylineId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.arena.slots[self.id.0].size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn head(&self) -> Option<Point> {
        self.arena.head(self.id)
    }

    pub fn tail(&self) -> Option<Point> {
        self.arena.tail(self.id)
    }

    /// Points from head to tail.
    pub fn points(&self) -> Points<'a> {
        Points {
            nodes: &self.arena.nodes,
            cur: self.arena.slots[self.id.0].head,
        }
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.points().collect()
    }

    /// Open path: `MoveTo` the head, then `LineTo` each following point.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points();
        if let Some(first) = points.next() {
            path.move_to(first);
            for p in points {
                path.line_to(p);
            }
        }
        path
    }
}

impl std::fmt::Debug for Polyline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.points()).finish()
    }
}

/// Iterator over the points of one polyline.
pub struct Points<'a> {
    nodes: &'a [Node],
    cur: Option<usize>,
}

impl Iterator for Points<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let node = self.nodes[self.cur?];
        self.cur = node.next;
        Some(node.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pts(v: &[(i32, i32)]) -> Vec<Point> {
        v.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn append_keeps_size_and_order() {
        let mut f = Fragments::new();
        let id = f.add(&pts(&[(0, 0), (1, 0), (2, 1)]));
        let line = f.polyline(id);
        assert_eq!(line.len(), 3);
        assert_eq!(line.head(), Some(Point::new(0, 0)));
        assert_eq!(line.tail(), Some(Point::new(2, 1)));
        assert_eq!(line.to_vec(), pts(&[(0, 0), (1, 0), (2, 1)]));
    }

    #[test]
    fn reverse_small_polylines() {
        let mut f = Fragments::new();
        let one = f.add(&pts(&[(3, 3)]));
        f.reverse(one);
        assert_eq!(f.polyline(one).to_vec(), pts(&[(3, 3)]));

        let two = f.add(&pts(&[(0, 0), (1, 1)]));
        f.reverse(two);
        assert_eq!(f.polyline(two).to_vec(), pts(&[(1, 1), (0, 0)]));
        // Appending after a reverse must land on the new tail.
        f.push_point(two, Point::new(9, 9));
        assert_eq!(f.polyline(two).to_vec(), pts(&[(1, 1), (0, 0), (9, 9)]));
    }

    #[test]
    fn cat_tail_moves_points() {
        let mut f = Fragments::new();
        let a = f.add(&pts(&[(0, 0), (1, 0)]));
        let b = f.add(&pts(&[(2, 0), (3, 0)]));
        f.cat_tail(a, b);
        assert_eq!(f.len(), 1);
        assert_eq!(f.polyline(a).len(), 4);
        assert_eq!(
            f.polyline(a).to_vec(),
            pts(&[(0, 0), (1, 0), (2, 0), (3, 0)])
        );
        f.push_point(a, Point::new(4, 0));
        assert_eq!(f.polyline(a).tail(), Some(Point::new(4, 0)));
    }

    #[test]
    fn cat_head_moves_points() {
        let mut f = Fragments::new();
        let a = f.add(&pts(&[(2, 0), (3, 0)]));
        let b = f.create();
        f.push_point(b, Point::new(0, 0));
        f.push_point(b, Point::new(1, 0));
        f.cat_head(a, b);
        assert_eq!(
            f.polyline(a).to_vec(),
            pts(&[(0, 0), (1, 0), (2, 0), (3, 0)])
        );
        assert_eq!(f.polyline(a).len(), 4);
    }

    #[test]
    fn cat_onto_empty_polyline() {
        let mut f = Fragments::new();
        let a = f.create();
        let b = f.add(&pts(&[(5, 5), (6, 6)]));
        f.cat_head(a, b);
        f.prepend(a);
        assert_eq!(f.len(), 1);
        assert_eq!(f.polyline(a).len(), 2);
        assert_eq!(f.polyline(a).tail(), Some(Point::new(6, 6)));
    }

    #[test]
    fn unlink_middle_of_collection() {
        let mut f = Fragments::new();
        let a = f.add(&pts(&[(0, 0)]));
        let b = f.add(&pts(&[(1, 1)]));
        let c = f.add(&pts(&[(2, 2)]));
        assert_eq!(f.ids(), vec![c, b, a]);
        f.unlink(b);
        assert_eq!(f.ids(), vec![c, a]);
        f.unlink(c);
        assert_eq!(f.ids(), vec![a]);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn absorb_rebases_handles() {
        let mut f = Fragments::new();
        f.add(&pts(&[(0, 0), (1, 1)]));
        let mut g = Fragments::new();
        g.add(&pts(&[(5, 5), (6, 6)]));
        g.add(&pts(&[(7, 7), (8, 8), (9, 9)]));

        let moved = f.absorb(g);
        assert_eq!(moved.len(), 2);
        assert_eq!(f.len(), 1);
        assert_eq!(f.polyline(moved[0]).to_vec(), pts(&[(7, 7), (8, 8), (9, 9)]));
        assert_eq!(f.polyline(moved[1]).to_vec(), pts(&[(5, 5), (6, 6)]));

        let first = f.ids()[0];
        f.cat_tail(first, moved[1]);
        f.prepend(moved[0]);
        assert_eq!(f.len(), 2);
        assert_eq!(f.total_points(), 7);
    }

    #[test]
    fn bezpath_and_text_output() {
        let mut f = Fragments::new();
        f.add(&pts(&[(1, 2), (3, 4)]));
        assert_eq!(f.to_text(), "1,2 3,4 \n");
        let path = &f.to_bezpaths()[0];
        assert_eq!(path.elements().len(), 2);
    }

    proptest! {
        #[test]
        fn reverse_twice_is_identity(raw in prop::collection::vec((0i32..100, 0i32..100), 0..40)) {
            let points = pts(&raw);
            let mut f = Fragments::new();
            let id = f.add(&points);
            f.reverse(id);
            f.reverse(id);
            prop_assert_eq!(f.polyline(id).to_vec(), points);
        }

        #[test]
        fn splicing_preserves_every_point(
            a in prop::collection::vec((0i32..50, 0i32..50), 1..20),
            b in prop::collection::vec((0i32..50, 0i32..50), 1..20),
            at_head in any::<bool>(),
            flip in any::<bool>(),
        ) {
            let mut f = Fragments::new();
            let ia = f.add(&pts(&a));
            let ib = f.add(&pts(&b));
            if flip {
                f.reverse(ib);
            }
            if at_head {
                f.cat_head(ia, ib);
            } else {
                f.cat_tail(ia, ib);
            }
            prop_assert_eq!(f.len(), 1);
            prop_assert_eq!(f.polyline(ia).len(), a.len() + b.len());
            prop_assert_eq!(f.polyline(ia).points().count(), a.len() + b.len());
        }
    }
}
