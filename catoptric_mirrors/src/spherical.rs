use core::f64::consts::TAU;

use tracing::warn;

use super::*;

/// All points at a certain distance (`radius`) from a certain point (`center`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vector2,
    pub radius: Float,
}

impl Circle {
    /// Both distances `t` (`t1 <= t2`, possibly negative) such that [`ray.at(t)`](Ray::at)
    /// lies on this circle, if any.
    #[must_use]
    pub fn intersections(&self, ray: &Ray) -> Option<[Float; 2]> {
        // substituting `V` for `P + t * D` in the circle equation:
        // `||V - C||^2 = r^2` results in a quadratic equation in `t`.
        let a = ray.origin() - self.center;
        let da = ray.direction().dot(&a);

        let det = da * da - a.norm_squared() + self.radius * self.radius;

        (det >= 0.0).then(|| {
            let root = det.sqrt();
            [-da - root, -da + root]
        })
    }
}

/// The circle through three points, `None` if they are collinear (or coincide).
#[must_use]
pub fn find_circle(p1: &Vector2, p2: &Vector2, p3: &Vector2) -> Option<Circle> {
    let (x1, y1) = (p1.x, p1.y);
    let (x2, y2) = (p2.x, p2.y);
    let (x3, y3) = (p3.x, p3.y);

    let (x12, x13) = (x1 - x2, x1 - x3);
    let (y12, y13) = (y1 - y2, y1 - y3);
    let (x31, x21) = (x3 - x1, x2 - x1);
    let (y31, y21) = (y3 - y1, y2 - y1);

    let sx13 = x1 * x1 - x3 * x3;
    let sy13 = y1 * y1 - y3 * y3;
    let sx21 = x2 * x2 - x1 * x1;
    let sy21 = y2 * y2 - y1 * y1;

    // the circle is `x^2 + y^2 + 2gx + 2fy + c = 0`
    let f = ((sx13 + sy13) * x12 + (sx21 + sy21) * x13) / (2.0 * (y31 * x12 - y21 * x13));
    let g = ((sx13 + sy13) * y12 + (sx21 + sy21) * y13) / (2.0 * (x31 * y12 - x21 * y13));
    let c = -x1 * x1 - y1 * y1 - 2.0 * g * x1 - 2.0 * f * y1;

    let center = Vector2::new(-g, -f);
    let radius = (g * g + f * f - c).sqrt();

    (center.x.is_finite() && center.y.is_finite() && radius.is_finite() && radius > 0.0)
        .then_some(Circle { center, radius })
}

/// Angular extent of a [`SphericalMirror`]'s arc, in radians:
/// the arc goes counter-clockwise from `start` to `end`, sweeping `angle`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcAngles {
    pub start: Float,
    pub end: Float,
    /// In `[0, 2π)`.
    pub angle: Float,
}

/// A circular-arc-shaped mirror, going from one endpoint to the other through a third point.
///
/// Convex mirrors reflect on the outside of their circle, concave ones on the inside.
///
/// If the three points are collinear the mirror is invalid: it is kept as is,
/// but never reports an intersection.
#[derive(Clone, Debug, PartialEq)]
pub struct SphericalMirror {
    /// `[p1, p2, p3]`, ordered so that `p2` is on the right of `p1 -> p3`
    /// according to [`is_point_on_right`].
    points: [Vector2; 3],
    convex: bool,
    circle: Option<Circle>,
}

impl SphericalMirror {
    /// Returns an error only if a coordinate isn't finite. Collinear points give an
    /// invalid mirror, see [`Self::is_valid`].
    pub fn try_new(
        p1: Vector2,
        p2: Vector2,
        p3: Vector2,
        convex: bool,
    ) -> Result<Self, GeometryError> {
        if ![p1, p2, p3].iter().flat_map(|p| p.iter()).all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        let (p1, p3) = if is_point_on_right(&p1, &p3, &p2) {
            (p1, p3)
        } else {
            (p3, p1)
        };

        let circle = find_circle(&p1, &p2, &p3);

        if circle.is_none() {
            warn!(
                ?p1,
                ?p2,
                ?p3,
                "spherical mirror built from collinear points never reflects"
            );
        }

        Ok(Self {
            points: [p1, p2, p3],
            convex,
            circle,
        })
    }

    /// # Panics
    ///
    /// If a coordinate isn't finite.
    #[must_use]
    pub fn new(p1: Vector2, p2: Vector2, p3: Vector2, convex: bool) -> Self {
        Self::try_new(p1, p2, p3, convex).expect("invalid spherical mirror")
    }

    /// The arc endpoints and its middle point, in canonical order.
    #[inline]
    #[must_use]
    pub const fn points(&self) -> &[Vector2; 3] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub const fn is_convex(&self) -> bool {
        self.convex
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.circle.is_some()
    }

    #[inline]
    #[must_use]
    pub const fn circle(&self) -> Option<&Circle> {
        self.circle.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Option<Vector2> {
        self.circle.map(|c| c.center)
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> Option<Float> {
        self.circle.map(|c| c.radius)
    }

    /// For drawing the arc and its shaded back side, `None` if the mirror is invalid.
    #[must_use]
    pub fn arc(&self) -> Option<ArcAngles> {
        let [p1, _, p3] = &self.points;

        self.circle.map(|Circle { center, .. }| {
            let (v1, v3) = (p1 - center, p3 - center);
            let angle = v1.angle_to(&v3);
            ArcAngles {
                start: v1.heading(),
                end: v3.heading(),
                angle: if angle < 0.0 { angle + TAU } else { angle },
            }
        })
    }

    /// Whether a point of the circle belongs to the arc: the arc is the part of the
    /// circle lying on the same side of the chord `p1 p3` as `p2`.
    #[inline]
    #[must_use]
    pub fn is_on_arc(&self, p: &Vector2) -> bool {
        let [p1, _, p3] = &self.points;
        is_point_on_right(p1, p3, p)
    }

    /// Switches between reflecting on the outside or inside of the circle.
    /// Reachable in a scene through [`Scene::modify_mirror`].
    pub fn set_convex(&mut self, convex: bool) -> Dirty {
        let dirty = Dirty::from(convex != self.convex);
        self.convex = convex;
        dirty
    }

    /// The reflective side's normal at a point of the circle.
    fn normal_at(&self, center: &Vector2, p: &Vector2) -> Unit2 {
        let outward = p - center;
        Unit2::new_normalize(if self.convex { outward } else { -outward })
    }

    /// The closest distance `t > eps` such that [`ray.at(t)`](Ray::at) lands on the arc,
    /// along with the normal there.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray, eps: Float) -> Option<Hit> {
        let circle = self.circle.as_ref()?;
        let [t1, t2] = circle.intersections(ray)?;

        if t2 < 0.0 {
            return None;
        }

        [t1, t2]
            .into_iter()
            .map(|t| (t, ray.at(t)))
            .find(|(t, p)| *t > eps && self.is_on_arc(p))
            .map(|(t, p)| Hit::new(t, self.normal_at(&circle.center, &p)))
    }

    fn pivot(&self) -> Vector2 {
        self.center()
            .unwrap_or_else(|| self.points.iter().sum::<Vector2>() / 3.0)
    }

    fn set_points(&mut self, [p1, p2, p3]: [Vector2; 3]) -> Result<Dirty, GeometryError> {
        *self = Self::try_new(p1, p2, p3, self.convex)?;
        Ok(Dirty::DIRTY)
    }
}

impl Mirror for SphericalMirror {
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        if let Some(hit) = self.intersect_ray(ctx.ray(), ctx.epsilon()) {
            ctx.add_hit(hit);
        }
    }
}

impl Transform for SphericalMirror {
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError> {
        if finite(delta)? == Vector2::zeros() {
            return Ok(Dirty::CLEAN);
        }
        self.set_points(self.points.map(|p| p + delta))
    }

    /// Rotates around the circle's center (the points' centroid if the mirror is invalid).
    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError> {
        if finite_angle(angle)? == 0.0 {
            return Ok(Dirty::CLEAN);
        }
        let pivot = self.pivot();
        self.set_points(self.points.map(|p| rotate_about(&p, &pivot, angle)))
    }
}

impl Pick for SphericalMirror {
    /// Radial band around the arc. Invalid mirrors are picked along their polyline.
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool {
        let [p1, p2, p3] = &self.points;

        match &self.circle {
            Some(Circle { center, radius }) => {
                ((p - center).norm() - radius).abs() <= tolerance && self.is_on_arc(p)
            }
            None => {
                distance_to_segment(p, p1, p2) <= tolerance
                    || distance_to_segment(p, p2, p3) <= tolerance
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::{FRAC_PI_2, PI};

    fn half_circle(convex: bool) -> SphericalMirror {
        SphericalMirror::new(
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
            convex,
        )
    }

    #[test]
    fn circle_through_three_points() {
        let (p1, p2, p3) = (
            Vector2::new(3.0, 7.0),
            Vector2::new(-2.0, 1.5),
            Vector2::new(10.0, -4.0),
        );
        let circle = find_circle(&p1, &p2, &p3).unwrap();

        for p in [p1, p2, p3] {
            assert_abs_diff_eq!((p - circle.center).norm(), circle.radius, epsilon = 1e-9);
        }
    }

    #[test]
    fn unit_circle() {
        let circle = half_circle(true).circle().copied().unwrap();

        assert_abs_diff_eq!(circle.center, Vector2::zeros(), epsilon = 1e-12);
        assert_abs_diff_eq!(circle.radius, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_points_have_no_circle() {
        let (p1, p2, p3) = (
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 2.0),
        );
        assert!(find_circle(&p1, &p2, &p3).is_none());
        assert!(find_circle(&p1, &p2, &p1).is_none());

        let m = SphericalMirror::new(p1, p2, p3, true);
        assert!(!m.is_valid());
        assert!(m.arc().is_none());

        let ray = Ray::new(Vector2::new(0.0, 2.0), Vector2::new(1.0, -1.0));
        assert!(m.intersect_ray(&ray, EPSILON).is_none());
    }

    #[test]
    fn endpoints_are_ordered_canonically() {
        let a = half_circle(true);
        let b = SphericalMirror::new(
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(-1.0, 0.0),
            true,
        );
        assert_eq!(a.points(), b.points());

        let [p1, p2, p3] = a.points();
        assert!(is_point_on_right(p1, p3, p2));
    }

    #[test]
    fn arc_goes_counter_clockwise_through_the_middle_point() {
        let arc = half_circle(true).arc().unwrap();

        assert_abs_diff_eq!(arc.start, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.end, PI, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.angle, PI, epsilon = 1e-12);

        let mid = arc.start + arc.angle / 2.0;
        assert_abs_diff_eq!(mid, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn phantom_side_is_ignored() {
        let m = half_circle(true);

        // passes through the lower, missing, half first
        let ray = Ray::new(Vector2::new(0.0, -3.0), Vector2::y());
        let hit = m.intersect_ray(&ray, EPSILON).unwrap();

        assert_abs_diff_eq!(ray.at(hit.dist), Vector2::new(0.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(*hit.normal.as_ref(), Vector2::y(), epsilon = 1e-12);

        // only meets the missing half
        let ray = Ray::new(Vector2::new(-3.0, -0.5), Vector2::x());
        assert!(m.intersect_ray(&ray, EPSILON).is_none());
    }

    #[test]
    fn concave_normals_point_inwards() {
        let m = half_circle(false);
        let ray = Ray::new(Vector2::zeros(), Vector2::y());
        let hit = m.intersect_ray(&ray, EPSILON).unwrap();

        assert_abs_diff_eq!(hit.dist, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(*hit.normal.as_ref(), -Vector2::y(), epsilon = 1e-12);
        assert!(hit.faces(ray.direction()));
    }

    #[test]
    fn circle_behind_the_ray() {
        let m = half_circle(true);
        let ray = Ray::new(Vector2::new(0.0, 5.0), Vector2::y());
        assert!(m.intersect_ray(&ray, EPSILON).is_none());
    }

    #[test]
    fn transforms_keep_the_shape() {
        let mut m = half_circle(true);

        assert!(m.translate(Vector2::new(2.0, 3.0)).unwrap().is_dirty());
        assert_abs_diff_eq!(m.center().unwrap(), Vector2::new(2.0, 3.0), epsilon = 1e-12);

        assert!(m.rotate(PI).unwrap().is_dirty());
        assert_abs_diff_eq!(m.center().unwrap(), Vector2::new(2.0, 3.0), epsilon = 1e-9);
        assert_abs_diff_eq!(m.radius().unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.points()[1], Vector2::new(2.0, 2.0), epsilon = 1e-9);
    }

    #[test]
    fn non_finite_moves_are_rejected() {
        let mut m = half_circle(false);
        let before = m.clone();

        assert_eq!(
            m.translate(Vector2::new(0.0, Float::INFINITY)),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(m.rotate(Float::NAN), Err(GeometryError::NonFinite));
        assert_eq!(
            m.translate(Vector2::new(Float::MAX, Float::MAX))
                .and_then(|_| m.translate(Vector2::new(Float::MAX, 0.0))),
            Err(GeometryError::NonFinite)
        );
        assert!(m.points().iter().all(|p| p.x.is_finite() && p.y.is_finite()));

        let mut flipped = before.clone();
        assert!(flipped.set_convex(true).is_dirty());
        assert!(!flipped.set_convex(true).is_dirty());
        assert_eq!(flipped.points(), before.points());
    }

    #[test]
    fn picking() {
        let m = half_circle(true);

        assert!(m.contains_point(&Vector2::new(0.0, 1.05), 0.1));
        assert!(!m.contains_point(&Vector2::new(0.0, -1.0), 0.1));
        assert!(!m.contains_point(&Vector2::new(0.0, 0.5), 0.1));
    }
}
