use super::*;

/// A line-segment-shaped mirror.
///
/// Only reflective on the side its normal points to: the direction
/// `start -> end` turned a quarter turn clockwise.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneMirror {
    start: Vector2,
    end: Vector2,
    direction: Unit2,
    normal: Unit2,
    length: Float,
}

impl PlaneMirror {
    /// Returns an error if `start == end`, or if a coordinate isn't finite.
    pub fn try_new(start: Vector2, end: Vector2) -> Result<Self, GeometryError> {
        if !start.iter().chain(end.iter()).all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        let dist = end - start;
        let direction = try_unit(dist).map_err(|_| GeometryError::DegenerateSegment)?;

        Ok(Self {
            start,
            end,
            direction,
            // SAFETY: quarter turns preserve norms
            normal: Unit2::new_unchecked(direction.perp_cw()),
            length: dist.norm(),
        })
    }

    /// # Panics
    ///
    /// If `start == end`, or if a coordinate isn't finite.
    #[must_use]
    pub fn new(start: Vector2, end: Vector2) -> Self {
        Self::try_new(start, end).expect("invalid plane mirror")
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> &Vector2 {
        &self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> &Vector2 {
        &self.end
    }

    /// Unit vector from `start` to `end`.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> &Unit2 {
        &self.direction
    }

    #[inline]
    #[must_use]
    pub const fn normal(&self) -> &Unit2 {
        &self.normal
    }

    #[inline]
    #[must_use]
    pub const fn length(&self) -> Float {
        self.length
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Vector2 {
        (self.start + self.end) / 2.0
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> [Vector2; 2] {
        [self.start, self.end]
    }

    /// Distance `t` such that [`ray.at(t)`](Ray::at) lands on this segment, along with its normal.
    ///
    /// Returns `None` if `ray` is parallel to the segment, passes beside it, or starts
    /// (within `eps`) on the segment's line, which is where reflected rays start.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray, eps: Float) -> Option<Hit> {
        // Solving `origin + t * direction = start + u * (end - start)` with cross products.
        let v1 = ray.origin() - self.start;
        let v2 = self.end - self.start;
        let v3 = ray.direction().perp_ccw();

        let denom = v2.dot(&v3);
        if denom == 0.0 {
            return None;
        }

        let t = v2.cross_z(&v1) / denom;
        if t.abs() < eps {
            return None;
        }

        let u = v1.dot(&v3) / denom;
        (0.0..=1.0).contains(&u).then_some(Hit::new(t, self.normal))
    }

    fn set_endpoints(&mut self, start: Vector2, end: Vector2) -> Result<Dirty, GeometryError> {
        *self = Self::try_new(start, end)?;
        Ok(Dirty::DIRTY)
    }
}

impl TryFrom<[Vector2; 2]> for PlaneMirror {
    type Error = GeometryError;

    #[inline]
    fn try_from([start, end]: [Vector2; 2]) -> Result<Self, Self::Error> {
        Self::try_new(start, end)
    }
}

impl Mirror for PlaneMirror {
    fn add_hits(&self, ctx: &mut SimulationCtx) {
        if let Some(hit) = self.intersect_ray(ctx.ray(), ctx.epsilon()) {
            ctx.add_hit(hit);
        }
    }
}

impl Transform for PlaneMirror {
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError> {
        if finite(delta)? == Vector2::zeros() {
            return Ok(Dirty::CLEAN);
        }
        self.set_endpoints(self.start + delta, self.end + delta)
    }

    /// Rotates around the segment's midpoint.
    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError> {
        if finite_angle(angle)? == 0.0 {
            return Ok(Dirty::CLEAN);
        }
        let c = self.center();
        self.set_endpoints(
            rotate_about(&self.start, &c, angle),
            rotate_about(&self.end, &c, angle),
        )
    }
}

impl Pick for PlaneMirror {
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool {
        distance_to_segment(p, &self.start, &self.end) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn derived_geometry() {
        let m = PlaneMirror::new(Vector2::new(50.0, 400.0), Vector2::new(550.0, 400.0));

        assert_abs_diff_eq!(*m.direction().as_ref(), Vector2::x());
        assert_abs_diff_eq!(*m.normal().as_ref(), Vector2::new(0.0, -1.0));
        assert_abs_diff_eq!(m.length(), 500.0);
        assert_abs_diff_eq!(m.center(), Vector2::new(300.0, 400.0));
    }

    #[test]
    fn degenerate_segments_are_rejected() {
        let p = Vector2::new(1.0, 1.0);
        assert_eq!(PlaneMirror::try_new(p, p), Err(GeometryError::DegenerateSegment));
        assert_eq!(
            PlaneMirror::try_new(p, Vector2::new(Float::INFINITY, 0.0)),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn misses() {
        let m = PlaneMirror::new(Vector2::new(10.0, -5.0), Vector2::new(10.0, 5.0));

        // parallel
        let ray = Ray::new(Vector2::zeros(), Vector2::y());
        assert!(m.intersect_ray(&ray, EPSILON).is_none());

        // beside the segment
        let ray = Ray::new(Vector2::zeros(), Vector2::new(1.0, 1.0));
        assert!(m.intersect_ray(&ray, EPSILON).is_none());

        // starting on the mirror's line
        let ray = Ray::new(Vector2::new(10.0, 20.0), Vector2::new(-1.0, -1.0));
        assert!(m.intersect_ray(&ray, EPSILON).is_none());
    }

    #[test]
    fn hits_behind_are_reported_negative() {
        let m = PlaneMirror::new(Vector2::new(10.0, -5.0), Vector2::new(10.0, 5.0));
        let ray = Ray::new(Vector2::new(20.0, 0.0), Vector2::x());

        let hit = m.intersect_ray(&ray, EPSILON).unwrap();
        assert_abs_diff_eq!(hit.dist, -10.0);
    }

    #[test]
    fn rotation_about_midpoint() {
        let mut m = PlaneMirror::new(Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0));

        assert!(m.rotate(core::f64::consts::FRAC_PI_2).unwrap().is_dirty());
        assert_abs_diff_eq!(*m.start(), Vector2::new(0.0, -1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(*m.end(), Vector2::new(0.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(*m.normal().as_ref(), Vector2::x(), epsilon = 1e-12);
        assert!(!m.rotate(0.0).unwrap().is_dirty());
    }

    #[test]
    fn non_finite_moves_are_rejected() {
        let mut m = PlaneMirror::new(Vector2::new(0.0, -1.0), Vector2::new(0.0, 1.0));
        let before = m.clone();

        assert_eq!(
            m.translate(Vector2::new(Float::NAN, 0.0)),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(m.rotate(Float::NEG_INFINITY), Err(GeometryError::NonFinite));
        assert_eq!(m, before);

        // the second move overflows
        let far = Vector2::new(Float::MAX, 0.0);
        assert!(m.translate(far).unwrap().is_dirty());
        assert_eq!(m.translate(far), Err(GeometryError::NonFinite));
        assert_eq!(*m.start(), Vector2::new(Float::MAX, -1.0));
        assert_eq!(m.length(), before.length());
    }

    #[test]
    fn picking() {
        let m = PlaneMirror::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0));

        assert!(m.contains_point(&Vector2::new(5.0, 2.0), 3.0));
        assert!(!m.contains_point(&Vector2::new(5.0, 4.0), 3.0));
        assert!(!m.contains_point(&Vector2::new(14.0, 0.0), 3.0));
    }
}
