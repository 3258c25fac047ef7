//! Shared geometry types: integer pixel points and rectangles.

use crate::error::TraceError;

/// A pixel coordinate. `x` grows to the right, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Integer midpoint, rounding toward the origin.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2, (self.y + other.y) / 2)
    }

    /// Manhattan distance.
    pub fn l1(self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x as f64, p.y as f64)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// An axis-aligned pixel rectangle covering `[x, x + width) × [y, y + height)`.
///
/// The tracer calls these chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Geometric center, rounded toward the top-left.
    pub fn center(&self) -> Point {
        Point::new(
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x as i32
            && p.y >= self.y as i32
            && (p.x as i64) < self.right() as i64
            && (p.y as i64) < self.bottom() as i64
    }

    /// Split at absolute row `row` into `[y, row)` and `[row, bottom)`.
    pub fn split_at_row(&self, row: usize) -> (Rect, Rect) {
        debug_assert!(row > self.y && row < self.bottom());
        (
            Rect::new(self.x, self.y, self.width, row - self.y),
            Rect::new(self.x, row, self.width, self.bottom() - row),
        )
    }

    /// Split at absolute column `col` into `[x, col)` and `[col, right)`.
    pub fn split_at_column(&self, col: usize) -> (Rect, Rect) {
        debug_assert!(col > self.x && col < self.right());
        (
            Rect::new(self.x, self.y, col - self.x, self.height),
            Rect::new(col, self.y, self.right() - col, self.height),
        )
    }

    /// Fail unless the rectangle lies inside a `width × height` image.
    pub fn check_within(&self, width: usize, height: usize) -> Result<(), TraceError> {
        let fits = |start: usize, len: usize, limit: usize| {
            start
                .checked_add(len)
                .is_some_and(|end| end <= limit)
        };
        if fits(self.x, self.width, width) && fits(self.y, self.height, height) {
            Ok(())
        } else {
            Err(TraceError::RegionOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                image_width: width,
                image_height: height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_share_no_pixels() {
        let r = Rect::new(2, 3, 10, 8);
        let (top, bottom) = r.split_at_row(7);
        assert_eq!(top, Rect::new(2, 3, 10, 4));
        assert_eq!(bottom, Rect::new(2, 7, 10, 4));

        let (left, right) = r.split_at_column(5);
        assert_eq!(left, Rect::new(2, 3, 3, 8));
        assert_eq!(right, Rect::new(5, 3, 7, 8));
    }

    #[test]
    fn bounds_check_catches_overflow() {
        assert!(Rect::new(0, 0, 20, 20).check_within(20, 20).is_ok());
        assert!(Rect::new(1, 0, 20, 20).check_within(20, 20).is_err());
        assert!(Rect::new(usize::MAX, 0, 2, 1).check_within(20, 20).is_err());
    }

    #[test]
    fn center_and_contains() {
        let r = Rect::new(10, 0, 5, 4);
        assert_eq!(r.center(), Point::new(12, 2));
        assert!(r.contains(Point::new(14, 3)));
        assert!(!r.contains(Point::new(15, 3)));
        assert!(!r.contains(Point::new(-1, 0)));
    }
}
