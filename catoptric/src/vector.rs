use super::*;

/// 2D-specific operations missing from nalgebra's vectors.
pub trait Vector2Ext {
    /// The z component of the 3D cross product of `self` and `other`
    /// (both extended with `z = 0`).
    fn cross_z(&self, other: &Self) -> Float;

    /// `self` rotated by a quarter turn counter-clockwise: `(-y, x)`.
    fn perp_ccw(&self) -> Self;

    /// `self` rotated by a quarter turn clockwise: `(y, -x)`.
    fn perp_cw(&self) -> Self;

    /// `self` rotated by `angle` radians (counter-clockwise for positive angles).
    fn rotated(&self, angle: Float) -> Self;

    /// The angle between the positive x axis and `self`, in `(-π, π]`.
    fn heading(&self) -> Float;

    /// The signed angle that rotates `self` onto `other`, in `(-π, π]`.
    fn angle_to(&self, other: &Self) -> Float;
}

impl Vector2Ext for Vector2 {
    #[inline]
    fn cross_z(&self, other: &Self) -> Float {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    fn perp_ccw(&self) -> Self {
        Vector2::new(-self.y, self.x)
    }

    #[inline]
    fn perp_cw(&self) -> Self {
        Vector2::new(self.y, -self.x)
    }

    #[inline]
    fn rotated(&self, angle: Float) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vector2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn heading(&self) -> Float {
        self.y.atan2(self.x)
    }

    #[inline]
    fn angle_to(&self, other: &Self) -> Float {
        self.cross_z(other).atan2(self.dot(other))
    }
}

/// Rotates `p` by `angle` radians around `pivot`.
#[inline]
#[must_use]
pub fn rotate_about(p: &Vector2, pivot: &Vector2, angle: Float) -> Vector2 {
    pivot + (p - pivot).rotated(angle)
}

/// Orientation test: whether `p` lies strictly on the positive side of the line
/// through `b` and `a`, i. e. the sign of `cross_z(a - b, p - b)`.
///
/// Swapping `a` and `b` flips the result for every `p` off the line.
#[inline]
#[must_use]
pub fn is_point_on_right(a: &Vector2, b: &Vector2, p: &Vector2) -> bool {
    (a - b).cross_z(&(p - b)) > 0.0
}

/// Distance between `p` and the line segment `[a, b]`.
#[must_use]
pub fn distance_to_segment(p: &Vector2, a: &Vector2, b: &Vector2) -> Float {
    let ab = b - a;
    let len_sq = ab.norm_squared();

    if len_sq == 0.0 {
        return (p - a).norm();
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Returns `v` unchanged if both its coordinates are finite.
#[inline]
pub fn finite(v: Vector2) -> Result<Vector2, GeometryError> {
    if v.x.is_finite() && v.y.is_finite() {
        Ok(v)
    } else {
        Err(GeometryError::NonFinite)
    }
}

/// Returns `angle` unchanged if it is finite.
#[inline]
pub fn finite_angle(angle: Float) -> Result<Float, GeometryError> {
    if angle.is_finite() {
        Ok(angle)
    } else {
        Err(GeometryError::NonFinite)
    }
}

/// Normalizes `v`, failing if it is zero or has non-finite coordinates.
#[inline]
pub fn try_unit(v: Vector2) -> Result<Unit2, GeometryError> {
    Unit2::try_new(finite(v)?, 0.0).ok_or(GeometryError::ZeroDirection)
}
