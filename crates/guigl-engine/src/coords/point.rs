use std::ops::Mul;

/// Integer point in physical pixels (top-left origin, +Y down).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Mul<i32> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, k: i32) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}
