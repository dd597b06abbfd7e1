use super::Point;

/// Axis-aligned integer rectangle in physical pixels (top-left origin).
///
/// Half-open: contains `min` and excludes `max`. A rectangle whose width or
/// height is not positive is empty; all empty rectangles behave the same in
/// `union` and `intersect`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// The canonical empty rectangle.
    pub const ZERO: Rect = Rect {
        min: Point::ZERO,
        max: Point::ZERO,
    };

    /// Builds a rectangle from two corners, swapping coordinates so that
    /// `min <= max` on both axes.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Rectangle anchored at the origin with the given size.
    #[inline]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Number of pixels covered; zero when empty.
    #[inline]
    pub fn area(self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width() as u64 * self.height() as u64
        }
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x < self.max.x && p.y < self.max.y
    }

    /// True when `other` lies entirely inside `self`. An empty rectangle is
    /// inside everything.
    #[inline]
    pub fn contains_rect(self, other: Rect) -> bool {
        other.is_empty()
            || (other.min.x >= self.min.x
                && other.min.y >= self.min.y
                && other.max.x <= self.max.x
                && other.max.y <= self.max.y)
    }

    /// Overlap of both rectangles, or `None` when they do not overlap.
    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let r = Rect {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() { None } else { Some(r) }
    }

    /// Smallest rectangle containing both. Empty operands are ignored.
    #[inline]
    pub fn union(self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Rect {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x0: i32, y0: i32, x1: i32, y1: i32) -> Rect { Rect::new(x0, y0, x1, y1) }

    // ── new ───────────────────────────────────────────────────────────────

    #[test]
    fn new_canonicalizes_swapped_corners() {
        assert_eq!(r(10, 20, 0, 5), r(0, 5, 10, 20));
        assert_eq!(r(10, 20, 0, 5).min, Point::new(0, 5));
    }

    #[test]
    fn from_size_is_anchored_at_origin() {
        let b = Rect::from_size(640, 480);
        assert_eq!(b.min, Point::ZERO);
        assert_eq!((b.width(), b.height()), (640, 480));
    }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0, 0, 10, 10).contains(Point::new(0, 0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0, 0, 10, 10).contains(Point::new(10, 10)));
        assert!(!r(0, 0, 10, 10).contains(Point::new(-1, 5)));
    }

    #[test]
    fn contains_rect_accepts_empty() {
        assert!(r(0, 0, 10, 10).contains_rect(Rect::ZERO));
        assert!(r(0, 0, 10, 10).contains_rect(r(2, 2, 10, 10)));
        assert!(!r(0, 0, 10, 10).contains_rect(r(2, 2, 11, 10)));
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        assert_eq!(r(0, 0, 10, 10).intersect(r(5, 5, 15, 15)), Some(r(5, 5, 10, 10)));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        assert!(r(0, 0, 10, 10).intersect(r(10, 0, 20, 10)).is_none());
    }

    #[test]
    fn intersect_outside_bounds_returns_none() {
        let bounds = Rect::from_size(640, 480);
        assert!(bounds.intersect(r(700, 500, 800, 600)).is_none());
        assert!(bounds.intersect(r(-50, -50, -1, -1)).is_none());
    }

    // ── union ─────────────────────────────────────────────────────────────

    #[test]
    fn union_is_bounding_box() {
        assert_eq!(r(0, 0, 10, 10).union(r(20, 30, 25, 35)), r(0, 0, 25, 35));
    }

    #[test]
    fn union_ignores_empty_operands() {
        let a = r(5, 5, 10, 10);
        assert_eq!(Rect::ZERO.union(a), a);
        assert_eq!(a.union(r(100, 100, 100, 200)), a);
    }

    // ── is_empty / area ───────────────────────────────────────────────────

    #[test]
    fn zero_width_or_height_is_empty() {
        assert!(r(0, 0, 0, 5).is_empty());
        assert!(r(0, 0, 5, 0).is_empty());
        assert_eq!(r(0, 0, 5, 0).area(), 0);
        assert_eq!(r(1, 1, 4, 3).area(), 6);
    }
}
