use std::ops::{Add, Mul, Sub};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3([f32; 3]);

impl Vec3 {
    pub const ZERO: Vec3 = Vec3([0.0, 0.0, 0.0]);

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3([x, y, z])
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }

    pub fn length(&self) -> f32 {
        (self.x().powi(2) + self.y().powi(2) + self.z().powi(2)).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self::ZERO;
        }

        Self([self.x() / length, self.y() / length, self.z() / length])
    }

    /// Straight-line distance to another point.
    pub fn distance_to(&self, other: &Self) -> f32 {
        (*self - *other).length()
    }

    /// Distance to another point measured on the horizontal (XZ) plane only.
    pub fn planar_distance_to(&self, other: &Self) -> f32 {
        let dx = other.x() - self.x();
        let dz = other.z() - self.z();
        (dx * dx + dz * dz).sqrt()
    }

    /// Unit step toward a target point on the horizontal plane.
    ///
    /// Returns the XZ components of the step and the heading angle
    /// (`atan2(dz, dx)`) used to orient the walker toward the target.
    pub fn direction_to(&self, target: &Self) -> (f32, f32, f32) {
        let dx = target.x() - self.x();
        let dz = target.z() - self.z();
        let angle = dz.atan2(dx);

        (angle.cos(), angle.sin(), angle)
    }

    /// The same point with the vertical component replaced.
    pub fn with_y(&self, y: f32) -> Self {
        Self([self.x(), y, self.z()])
    }

    /// Rotates the vector around the vertical axis by `angle` radians.
    ///
    /// A forward offset (+Z) rotated by a yaw of `atan2(dx, dz)` lands along
    /// the `(dx, dz)` heading, which is how local collider offsets follow
    /// their owner's facing.
    pub fn rotated_y(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self([
            self.x() * cos + self.z() * sin,
            self.y(),
            -self.x() * sin + self.z() * cos,
        ])
    }

    pub fn as_array(&self) -> &[f32; 3] {
        &self.0
    }
    pub fn x(&self) -> f32 {
        self.0[0]
    }
    pub fn y(&self) -> f32 {
        self.0[1]
    }
    pub fn z(&self) -> f32 {
        self.0[2]
    }

    pub fn set_y(&mut self, y: f32) {
        self.0[1] = y;
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(values: [f32; 3]) -> Self {
        Vec3(values)
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(vec: Vec3) -> Self {
        vec.0
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self([
            self.x() + other.x(),
            self.y() + other.y(),
            self.z() + other.z(),
        ])
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self([
            self.x() - other.x(),
            self.y() - other.y(),
            self.z() - other.z(),
        ])
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self([self.x() * scalar, self.y() * scalar, self.z() * scalar])
    }
}
