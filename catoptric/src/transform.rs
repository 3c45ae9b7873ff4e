use core::ops::{BitOr, BitOrAssign};

use super::*;

/// Returned by every geometric mutation: whether rays that were cast
/// against (or from) the mutated object must be cast again.
#[must_use]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dirty(bool);

impl Dirty {
    pub const CLEAN: Self = Self(false);
    pub const DIRTY: Self = Self(true);

    #[inline]
    #[must_use]
    pub const fn is_dirty(self) -> bool {
        self.0
    }
}

impl From<bool> for Dirty {
    #[inline]
    fn from(dirty: bool) -> Self {
        Self(dirty)
    }
}

impl BitOr for Dirty {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Dirty {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Rigid motions of scene objects.
///
/// Mutating a mirror invalidates every ray cast in the scene, mutating a ray
/// or beam invalidates its own chain. Either way, the returned [`Dirty`] flag
/// must reach whoever is responsible for casting again
/// (usually a [`Scene`], which does so before its rays can be read).
///
/// Non-finite deltas and angles, or moves that would leave a coordinate
/// non-finite, fail with [`GeometryError::NonFinite`] and leave the object untouched.
pub trait Transform {
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError>;

    /// Rotates by `angle` radians around the object's own pivot
    /// (a mirror's center, a ray's origin).
    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError>;
}

impl<L: Transform, R: Transform> Transform for Either<L, R> {
    #[inline]
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError> {
        match self {
            Either::Left(t) => t.translate(delta),
            Either::Right(t) => t.translate(delta),
        }
    }

    #[inline]
    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError> {
        match self {
            Either::Left(t) => t.rotate(angle),
            Either::Right(t) => t.rotate(angle),
        }
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    #[inline]
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError> {
        (**self).translate(delta)
    }

    #[inline]
    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError> {
        (**self).rotate(angle)
    }
}

/// Point containment, for selecting objects with a pointing device.
///
/// This only needs to agree approximately with the drawn geometry, it plays no
/// part in the optics.
pub trait Pick {
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool;
}

impl<L: Pick, R: Pick> Pick for Either<L, R> {
    #[inline]
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool {
        match self {
            Either::Left(m) => m.contains_point(p, tolerance),
            Either::Right(m) => m.contains_point(p, tolerance),
        }
    }
}

impl<T: Pick + ?Sized> Pick for Box<T> {
    #[inline]
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool {
        (**self).contains_point(p, tolerance)
    }
}
