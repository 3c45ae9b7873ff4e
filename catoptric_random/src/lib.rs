//! Randomly generated mirrors, light sources and scenes.

use core::iter;

use catoptric::*;
use catoptric_mirrors::*;
use tracing::debug;

pub use rand;

use rand::Rng;

/// Random coordinates are drawn in `[-SCENE_EXTENT, SCENE_EXTENT]`.
pub const SCENE_EXTENT: Float = 300.0;

const MAX_BEAM_COUNT: usize = 8;

const MAX_BEAM_WIDTH: Float = 100.0;

pub trait Random: Sized {
    /// Generate a randomized value using the provided `rng`.
    ///
    /// This method must not fail. If creating a value is fallible, keep trying until success.
    fn random(rng: &mut (impl Rng + ?Sized)) -> Self;
}

fn random_direction(rng: &mut (impl Rng + ?Sized)) -> Vector2 {
    loop {
        if let Ok(v) = try_unit(rand_vect(rng, 1.0)) {
            break v.into_inner();
        }
    }
}

impl Random for Ray {
    fn random(rng: &mut (impl Rng + ?Sized)) -> Self {
        let origin = rand_vect(rng, SCENE_EXTENT);
        Self::new(origin, random_direction(rng))
    }
}

impl Random for Beam {
    fn random(rng: &mut (impl Rng + ?Sized)) -> Self {
        let origin = rand_vect(rng, SCENE_EXTENT);
        let direction = random_direction(rng);
        let count = rng.gen_range(1..=MAX_BEAM_COUNT);
        let width = rng.gen_range(0.0..MAX_BEAM_WIDTH);

        Self::new(origin, direction, count, width)
    }
}

impl Random for Emitter {
    fn random(rng: &mut (impl Rng + ?Sized)) -> Self {
        if rng.gen_bool(0.75) {
            Ray::random(rng).into()
        } else {
            Beam::random(rng).into()
        }
    }
}

impl Random for PlaneMirror {
    fn random(rng: &mut (impl Rng + ?Sized)) -> Self {
        loop {
            if let Ok(mirror) = Self::try_new(
                rand_vect(rng, SCENE_EXTENT),
                rand_vect(rng, SCENE_EXTENT),
            ) {
                break mirror;
            }
        }
    }
}

impl Random for SphericalMirror {
    /// Always valid: collinear draws are thrown away.
    fn random(rng: &mut (impl Rng + ?Sized)) -> Self {
        loop {
            let [p1, p2, p3] = [(); 3].map(|()| rand_vect(rng, SCENE_EXTENT));
            if is_point_on_right(&p1, &p3, &p2) == is_point_on_right(&p3, &p1, &p2) {
                // collinear, skip before `try_new` warns about it
                continue;
            }
            if let Ok(mirror) = Self::try_new(p1, p2, p3, rng.gen()) {
                if mirror.is_valid() {
                    break mirror;
                }
            }
        }
    }
}

impl Random for SceneMirror {
    fn random(rng: &mut (impl Rng + ?Sized)) -> Self {
        if rng.gen_bool(0.5) {
            PlaneMirror::random(rng).into()
        } else {
            SphericalMirror::random(rng).into()
        }
    }
}

pub fn random_vec<T: Random>(n: usize, rng: &mut (impl Rng + ?Sized)) -> Vec<T> {
    iter::repeat_with(|| T::random(rng)).take(n).collect()
}

/// A scene of `num_mirrors` random mirrors and `num_emitters` random emitters, already cast.
pub fn random_scene(
    rng: &mut (impl Rng + ?Sized),
    num_mirrors: usize,
    num_emitters: usize,
    config: TraceConfig,
) -> Result<Scene<SceneMirror>, ConfigError> {
    let mirrors = random_vec::<SceneMirror>(num_mirrors, rng);
    let emitters = random_vec::<Emitter>(num_emitters, rng);

    debug!(mirrors = num_mirrors, emitters = num_emitters, "generated random scene");

    Scene::with_contents(config, mirrors, emitters)
}

pub fn rand_vect(rng: &mut (impl Rng + ?Sized), max_coord_mag: Float) -> Vector2 {
    // the rng generates floats in 0.0..1.0, scale and translate the range accordingly
    Vector2::from_fn(|_, _| (rng.gen::<Float>() - 0.5) * (max_coord_mag.abs() * 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn coordinates_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let v = rand_vect(&mut rng, 5.0);
            assert!(v.x.abs() <= 5.0 && v.y.abs() <= 5.0);
        }
    }

    #[test]
    fn random_mirrors_are_usable() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let plane = PlaneMirror::random(&mut rng);
            assert!(plane.length() > 0.0);

            let arc = SphericalMirror::random(&mut rng);
            assert!(arc.is_valid());
        }
    }

    #[test]
    fn random_beams_have_rays() {
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let beam = Beam::random(&mut rng);
            assert!((1..=MAX_BEAM_COUNT).contains(&beam.rays().len()));
        }
    }
}
