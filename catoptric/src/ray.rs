use core::iter;

use serde::Serialize;
use tracing::debug;

use super::*;

/// One straight piece of a traced light path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Segment {
    pub origin: Vector2,
    pub end: Vector2,
    /// Number of reflections the light went through before this segment.
    pub level: usize,
}

/// A traced light path.
///
/// A ray starts at `origin`, travels along `direction`, and stops at `end`:
/// either the closest mirror it meets, or `max_length` away if it escapes the scene.
/// If it bounced off that mirror, the reflected ray is stored in `next`, and so on,
/// forming a chain owned by the source ray.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Vector2,
    direction: Unit2,
    level: usize,
    end: Vector2,
    max_length: Float,
    next: Option<Box<Ray>>,
}

impl Ray {
    /// Returns an error if `direction` is zero, or if any coordinate isn't finite.
    pub fn try_new(origin: Vector2, direction: Vector2) -> Result<Self, GeometryError> {
        let origin = finite(origin)?;
        try_unit(direction).map(|direction| Self::with_level(origin, direction, 0))
    }

    /// # Panics
    ///
    /// If `direction` is zero, or if any coordinate isn't finite.
    #[must_use]
    pub fn new(origin: Vector2, direction: Vector2) -> Self {
        Self::try_new(origin, direction).expect("invalid ray")
    }

    /// A ray that has already been reflected `level` times.
    #[must_use]
    pub fn with_level(origin: Vector2, direction: Unit2, level: usize) -> Self {
        let mut ray = Self {
            origin,
            direction,
            level,
            end: origin,
            max_length: MAX_LENGTH,
            next: None,
        };
        ray.invalidate();
        ray
    }

    #[inline]
    #[must_use]
    pub const fn origin(&self) -> &Vector2 {
        &self.origin
    }

    #[inline]
    #[must_use]
    pub const fn direction(&self) -> &Unit2 {
        &self.direction
    }

    #[inline]
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> &Vector2 {
        &self.end
    }

    /// The reflected ray, if this one bounced off a mirror.
    #[inline]
    #[must_use]
    pub fn next(&self) -> Option<&Ray> {
        self.next.as_deref()
    }

    /// Returns [`self.origin`](Self::origin), translated by
    /// [`self.direction`](Self::direction)`* t`.
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Vector2 {
        self.origin + self.direction.as_ref() * t
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> Float {
        (self.end - self.origin).norm()
    }

    /// This ray, followed by every reflected ray in its chain.
    pub fn chain(&self) -> impl Iterator<Item = &Ray> + '_ {
        iter::successors(Some(self), |ray| ray.next())
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.chain().map(Ray::segment)
    }

    #[inline]
    #[must_use]
    pub fn segment(&self) -> Segment {
        Segment {
            origin: self.origin,
            end: self.end,
            level: self.level,
        }
    }

    /// Number of segments in the chain starting at this ray.
    #[must_use]
    pub fn chain_len(&self) -> usize {
        self.chain().count()
    }

    /// The last ray of the chain.
    #[must_use]
    pub fn last(&self) -> &Ray {
        self.chain().last().unwrap_or(self)
    }

    /// Display weight, fading with each reflection.
    #[must_use]
    pub fn opacity(&self, max_level: usize) -> Float {
        if max_level == 0 {
            return 1.0;
        }
        (1.0 - self.level as Float / max_level as Float).max(0.1)
    }

    /// Where to draw this segment's direction arrow: 100 units from the origin
    /// on long segments, halfway otherwise.
    #[must_use]
    pub fn arrow_position(&self) -> Vector2 {
        let length = self.length();
        let dist = if length > 200.0 { 100.0 } else { length / 2.0 };
        self.at(dist)
    }

    /// The closest intersection between this ray and `mirror`.
    #[must_use]
    pub fn closest_hit<M: Mirror + ?Sized>(
        &self,
        mirror: &M,
        config: &TraceConfig,
    ) -> Option<Hit> {
        let mut ctx = SimulationCtx::new(self, config);
        mirror.add_hits(&mut ctx);
        ctx.into_closest()
    }

    /// Rebuilds the whole chain against `mirror`.
    ///
    /// The chain grows one reflection at a time, until a ray misses every mirror,
    /// meets one from its non-reflective side, or reaches `config.max_level`.
    pub fn cast<M: Mirror + ?Sized>(&mut self, mirror: &M, config: &TraceConfig) {
        let mut ray = self;

        loop {
            ray.next = None;
            ray.max_length = config.max_length;

            let hit = ray.closest_hit(mirror, config);
            ray.end = ray.at(hit.map_or(config.max_length, |h| h.dist));

            let Some(hit) = hit else { break };

            if !hit.faces(&ray.direction) {
                break;
            }

            if ray.level >= config.max_level {
                debug!(max_level = config.max_level, "ray level limit reached");
                break;
            }

            let reflected = ray.reflected(&hit.normal);
            let child = Ray::with_level(ray.end, reflected, ray.level + 1);
            ray = &mut **ray.next.insert(Box::new(child));
        }
    }

    /// This ray's direction, mirrored with respect to the surface of normal `normal`.
    #[must_use]
    pub fn reflected(&self, normal: &Unit2) -> Unit2 {
        let d = self.direction.as_ref();
        let n = normal.as_ref();
        Unit2::new_normalize(d - n * (2.0 * d.dot(n)))
    }

    /// Points this ray towards `target`.
    pub fn update_direction(&mut self, target: &Vector2) -> Result<Dirty, GeometryError> {
        self.set_direction(target - self.origin)
    }

    pub fn set_direction(&mut self, direction: Vector2) -> Result<Dirty, GeometryError> {
        self.direction = try_unit(direction)?;
        self.invalidate();
        Ok(Dirty::DIRTY)
    }

    pub fn set_origin(&mut self, origin: Vector2) -> Result<Dirty, GeometryError> {
        self.origin = finite(origin)?;
        self.invalidate();
        Ok(Dirty::DIRTY)
    }

    /// Drops the reflected chain and extends this ray to its maximum length.
    pub fn invalidate(&mut self) {
        self.next = None;
        self.end = self.at(self.max_length);
    }
}

impl Transform for Ray {
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError> {
        if finite(delta)? == Vector2::zeros() {
            return Ok(Dirty::CLEAN);
        }
        self.set_origin(self.origin + delta)
    }

    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError> {
        if finite_angle(angle)? == 0.0 {
            return Ok(Dirty::CLEAN);
        }
        self.direction = Unit2::new_normalize(self.direction.rotated(angle));
        self.invalidate();
        Ok(Dirty::DIRTY)
    }
}

impl Pick for Ray {
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool {
        distance_to_segment(p, &self.origin, &self.end) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// An infinite vertical line at `x`, reflective on the side `normal` points to.
    struct Wall {
        x: Float,
        normal: Unit2,
    }

    impl Wall {
        fn new(x: Float, nx: Float) -> Self {
            Self {
                x,
                normal: Unit2::new_normalize(Vector2::new(nx, 0.0)),
            }
        }
    }

    impl Mirror for Wall {
        fn add_hits(&self, ctx: &mut SimulationCtx) {
            let ray = ctx.ray();
            let dx = ray.direction().x;
            if dx != 0.0 {
                let t = (self.x - ray.origin().x) / dx;
                if t.abs() >= ctx.epsilon() {
                    ctx.add_hit(Hit::new(t, self.normal));
                }
            }
        }
    }

    #[test]
    fn escapes_without_mirrors() {
        let mut ray = Ray::new(Vector2::new(1.0, 1.0), Vector2::new(0.0, 3.0));
        ray.cast(&[] as &[Wall], &TraceConfig::default());

        assert_eq!(ray.chain_len(), 1);
        assert_abs_diff_eq!(ray.end().y, 1.0 + MAX_LENGTH);
    }

    #[test]
    fn bounces_until_level_cap() {
        let config = TraceConfig {
            max_level: 7,
            ..Default::default()
        };
        let walls = (Wall::new(0.0, 1.0), Wall::new(10.0, -1.0));
        let mut ray = Ray::new(Vector2::new(5.0, 0.0), Vector2::new(1.0, 0.1));

        ray.cast(&walls, &config);

        assert_eq!(ray.chain_len(), config.max_level + 1);
        assert_eq!(ray.last().level(), config.max_level);
        for (i, r) in ray.chain().enumerate() {
            assert_eq!(r.level(), i);
            assert_abs_diff_eq!(r.direction().norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn back_face_stops_the_chain() {
        let mut ray = Ray::new(Vector2::zeros(), Vector2::x());
        ray.cast(&Wall::new(4.0, 1.0), &TraceConfig::default());

        assert!(ray.next().is_none());
        assert_abs_diff_eq!(*ray.end(), Vector2::new(4.0, 0.0));
    }

    #[test]
    fn mutations_drop_the_chain() {
        let config = TraceConfig::default();
        let wall = Wall::new(4.0, -1.0);
        let mut ray = Ray::new(Vector2::zeros(), Vector2::x());

        ray.cast(&wall, &config);
        assert!(ray.next().is_some());

        assert!(ray.translate(Vector2::new(0.0, 1.0)).unwrap().is_dirty());
        assert!(ray.next().is_none());
        assert_abs_diff_eq!(ray.length(), MAX_LENGTH);

        ray.cast(&wall, &config);
        assert!(ray.update_direction(&Vector2::new(1.0, 1.0)).unwrap().is_dirty());
        assert!(ray.next().is_none());
        assert_abs_diff_eq!(ray.direction().x, 1.0, epsilon = 1e-12);

        assert_eq!(
            ray.update_direction(&Vector2::new(0.0, 1.0)),
            Err(GeometryError::ZeroDirection)
        );
        assert!(!ray.translate(Vector2::zeros()).unwrap().is_dirty());
    }

    #[test]
    fn non_finite_moves_are_rejected() {
        let mut ray = Ray::new(Vector2::new(1.0, 2.0), Vector2::x());
        let before = ray.clone();

        assert_eq!(
            ray.translate(Vector2::new(Float::NAN, 0.0)),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(ray.rotate(Float::INFINITY), Err(GeometryError::NonFinite));
        assert_eq!(
            ray.set_origin(Vector2::new(0.0, Float::NEG_INFINITY)),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(ray, before);

        // overflows to infinity
        assert!(ray.set_origin(Vector2::new(Float::MAX, 0.0)).unwrap().is_dirty());
        assert_eq!(
            ray.translate(Vector2::new(Float::MAX, 0.0)),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(ray.origin().x, Float::MAX);

        ray.set_origin(*before.origin()).unwrap();
        assert_eq!(ray, before);
        assert_abs_diff_eq!(ray.direction().norm(), 1.0);
    }

    #[test]
    fn opacity_fades_with_level() {
        let ray = Ray::with_level(Vector2::zeros(), Vector2::x_axis(), 25);
        assert_abs_diff_eq!(ray.opacity(50), 0.5);

        let deep = Ray::with_level(Vector2::zeros(), Vector2::x_axis(), 50);
        assert_abs_diff_eq!(deep.opacity(50), 0.1);
    }

    #[test]
    fn arrow_placement() {
        let mut ray = Ray::new(Vector2::zeros(), Vector2::x());
        assert_abs_diff_eq!(ray.arrow_position(), Vector2::new(100.0, 0.0));

        ray.cast(&Wall::new(50.0, 1.0), &TraceConfig::default());
        assert_abs_diff_eq!(ray.arrow_position(), Vector2::new(25.0, 0.0));
    }
}
