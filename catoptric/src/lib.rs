//! Specular reflection of light rays in a 2D scene of mirrors.
//!
//! A [`Ray`] is cast against a [`Mirror`] (usually a whole collection of them),
//! bounces off the closest surface it meets, and grows an owned chain of
//! reflected rays until it escapes the scene or reaches the configured
//! bounce-depth cap. A [`Scene`] owns mirrors and emitters (rays and beams) and
//! re-casts whatever a geometric mutation invalidated.

use std::{ops::Deref, rc::Rc, sync::Arc};

pub use either;
pub use nalgebra;

use either::Either;
use nalgebra::Unit;

mod beam;
mod config;
mod error;
mod ray;
mod scene;
mod transform;
mod vector;

pub use beam::*;
pub use config::*;
pub use error::*;
pub use ray::*;
pub use scene::*;
pub use transform::*;
pub use vector::*;

pub type Float = f64;

pub type Vector2 = nalgebra::Vector2<Float>;

pub type Unit2 = Unit<Vector2>;

/// A point where a ray meets a mirror.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Distance travelled along the ray's direction before meeting the surface.
    pub dist: Float,
    /// The outward normal of the reflective surface at the point of impact.
    ///
    /// A ray only bounces off a surface it approaches from this side.
    pub normal: Unit2,
}

impl Hit {
    #[inline]
    #[must_use]
    pub const fn new(dist: Float, normal: Unit2) -> Self {
        Self { dist, normal }
    }

    /// Whether a ray travelling along `direction` approaches the surface
    /// from its reflective side.
    #[inline]
    #[must_use]
    pub fn faces(&self, direction: &Unit2) -> bool {
        self.normal.dot(direction) < 0.0
    }
}

/// Collects the hits reported by mirrors for a single ray, keeping the closest one.
#[derive(Clone, Debug)]
pub struct SimulationCtx<'a> {
    ray: &'a Ray,
    config: &'a TraceConfig,
    closest: Option<Hit>,
}

impl<'a> SimulationCtx<'a> {
    #[inline]
    #[must_use]
    pub fn new(ray: &'a Ray, config: &'a TraceConfig) -> Self {
        Self {
            ray,
            config,
            closest: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn ray(&self) -> &Ray {
        self.ray
    }

    /// Minimum distance below which intersections are considered
    /// to be the ray's own starting surface.
    #[inline]
    #[must_use]
    pub const fn epsilon(&self) -> Float {
        self.config.epsilon
    }

    /// Stores `hit` if its distance is positive, shorter than the configured
    /// maximum ray length, and strictly shorter than the one stored so far.
    ///
    /// Ties keep the hit that was reported first.
    pub fn add_hit(&mut self, hit: Hit) {
        let d = hit.dist;

        if d > 0.0
            && d < self.config.max_length
            && self.closest.as_ref().map_or(true, |c| d < c.dist)
        {
            self.closest = Some(hit);
        }
    }

    #[inline]
    #[must_use]
    pub const fn closest(&self) -> Option<&Hit> {
        self.closest.as_ref()
    }

    #[inline]
    pub fn into_closest(self) -> Option<Hit> {
        self.closest
    }
}

/// The core trait of this library: a reflective curve.
///
/// Implementors report every intersection between themselves and
/// [`ctx.ray()`](SimulationCtx::ray) through
/// [`ctx.add_hit(...)`](SimulationCtx::add_hit), in no particular order.
/// The context keeps the closest one.
///
/// Nothing is reported if the ray doesn't meet the mirror. Intersections behind
/// the ray's origin may be reported, they are discarded by the context.
///
/// This method is expected to be deterministic: for a given ray and an unmodified
/// `self`, the same hits must be reported every time, regardless of any other state.
pub trait Mirror {
    fn add_hits(&self, ctx: &mut SimulationCtx);
}

use impl_trait_for_tuples::impl_for_tuples;

#[impl_for_tuples(1, 16)]
impl Mirror for T {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        for_tuples!( #( T.add_hits(ctx); )* );
    }
}

impl<L: Mirror, R: Mirror> Mirror for Either<L, R> {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        match self {
            Either::Left(m) => m.add_hits(ctx),
            Either::Right(m) => m.add_hits(ctx),
        }
    }
}

impl<T: Mirror> Mirror for [T] {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        self.iter().for_each(|mirror| mirror.add_hits(ctx));
    }
}

impl<const N: usize, T: Mirror> Mirror for [T; N] {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        self.as_slice().add_hits(ctx);
    }
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all
// types implementing `Deref` makes it impossible to implement it for new types downstream.

impl<T: Mirror> Mirror for Vec<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        self.as_slice().add_hits(ctx);
    }
}

impl<T: Mirror + ?Sized> Mirror for Box<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        self.deref().add_hits(ctx);
    }
}

impl<T: Mirror + ?Sized> Mirror for Arc<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        self.deref().add_hits(ctx);
    }
}

impl<T: Mirror + ?Sized> Mirror for Rc<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        self.deref().add_hits(ctx);
    }
}

impl<T: Mirror + ?Sized> Mirror for &T {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        (*self).add_hits(ctx);
    }
}

impl<T: Mirror + ?Sized> Mirror for &mut T {
    #[inline]
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        self.deref().add_hits(ctx);
    }
}
