use std::ops::{Mul, Sub};

/// A position or a size in pixels
#[derive(Debug, PartialEq, Eq, Hash, Default, Clone, Copy)]
pub struct Vec2d {
    pub x: u32,
    pub y: u32,
}

impl Vec2d {
    pub fn square(size: u32) -> Vec2d {
        Vec2d { x: size, y: size }
    }

    pub fn min<T: Into<Vec2d>>(self, other: T) -> Vec2d {
        let other = other.into();
        Vec2d {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }

    /// Number of cells of size `other` needed to cover `self`, along each axis
    pub fn ceil_div<T: Into<Vec2d>>(self, other: T) -> Vec2d {
        let other = other.into();
        Vec2d {
            x: self.x.div_ceil(other.x),
            y: self.y.div_ceil(other.y),
        }
    }

    pub fn area(self) -> u64 {
        u64::from(self.x) * u64::from(self.y)
    }

    pub fn is_empty(self) -> bool {
        self.x == 0 || self.y == 0
    }
}

impl From<u32> for Vec2d {
    fn from(size: u32) -> Self { Vec2d::square(size) }
}

impl std::fmt::Display for Vec2d {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "x={} y={}", self.x, self.y)
    }
}

/// Saturating: a window starting past the edge of an image has no extent
impl Sub<Vec2d> for Vec2d {
    type Output = Vec2d;

    fn sub(self, rhs: Vec2d) -> Self::Output {
        Vec2d {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

impl Mul<u32> for Vec2d {
    type Output = Vec2d;

    fn mul(self, rhs: u32) -> Self::Output {
        Vec2d {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
