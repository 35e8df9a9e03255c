use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// World-space 2D vector used for particle positions, velocities and forces.
///
/// Single precision keeps particle records compact; the same layout is what a
/// shader-side port of the collision pass would consume.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Dot product.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_quadtree_collisions::models::Vec2;
    ///
    /// let a = Vec2::new(1.0, 2.0);
    /// let b = Vec2::new(3.0, -1.0);
    /// assert_eq!(a.dot(b), 1.0);
    /// ```
    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length, avoids the square root when only comparing distances.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(coords: (f32, f32)) -> Self {
        Vec2::new(coords.0, coords.1)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, scale: f32) -> Vec2 {
        Vec2::new(self.x * scale, self.y * scale)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}
