mod plane;
mod spherical;

pub use plane::*;
pub use spherical::*;

use catoptric::{either::Either, *};

/// Any of the mirrors of this crate.
pub type SceneMirror = Either<PlaneMirror, SphericalMirror>;

impl From<PlaneMirror> for SceneMirror {
    #[inline]
    fn from(mirror: PlaneMirror) -> Self {
        Either::Left(mirror)
    }
}

impl From<SphericalMirror> for SceneMirror {
    #[inline]
    fn from(mirror: SphericalMirror) -> Self {
        Either::Right(mirror)
    }
}
