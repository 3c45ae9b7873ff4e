use super::*;

/// A bundle of parallel rays, evenly spread across `width`,
/// perpendicularly to their common direction, and centered on `origin`.
///
/// Member rays don't interact with each other: casting a beam casts each of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    origin: Vector2,
    direction: Unit2,
    count: usize,
    width: Float,
    rays: Vec<Ray>,
}

impl Beam {
    pub fn try_new(
        origin: Vector2,
        direction: Vector2,
        count: usize,
        width: Float,
    ) -> Result<Self, GeometryError> {
        if !(origin.x.is_finite() && origin.y.is_finite() && width.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        let mut beam = Self {
            origin,
            direction: try_unit(direction)?,
            count,
            width: width.max(0.0),
            rays: Vec::new(),
        };
        beam.regenerate();
        Ok(beam)
    }

    /// # Panics
    ///
    /// If `direction` is zero, or if any coordinate isn't finite.
    #[must_use]
    pub fn new(origin: Vector2, direction: Vector2, count: usize, width: Float) -> Self {
        Self::try_new(origin, direction, count, width).expect("invalid beam")
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
    pub const fn count(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> Float {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.rays.iter().flat_map(Ray::segments)
    }

    /// Distance between the origins of two neighbouring rays,
    /// `None` if the beam collapses to (at most) a single ray.
    #[must_use]
    pub fn spacing(&self) -> Option<Float> {
        (self.count > 1 && self.width >= 1.0).then(|| self.width / (self.count - 1) as Float)
    }

    /// Rebuilds every member ray from the beam's geometry. Their chains are lost.
    pub fn regenerate(&mut self) {
        let across = self.direction.perp_ccw();

        self.rays = match self.spacing() {
            Some(spacing) => {
                let first = self.origin - across * (self.width / 2.0);
                (0..self.count)
                    .map(|i| {
                        let origin = first + across * (spacing * i as Float);
                        Ray::with_level(origin, self.direction, 0)
                    })
                    .collect()
            }
            None if self.count == 0 => Vec::new(),
            None => vec![Ray::with_level(self.origin, self.direction, 0)],
        };
    }

    pub fn cast<M: Mirror + ?Sized>(&mut self, mirror: &M, config: &TraceConfig) {
        self.rays.iter_mut().for_each(|ray| ray.cast(mirror, config));
    }

    pub fn set_count(&mut self, count: usize) -> Dirty {
        if count == self.count {
            return Dirty::CLEAN;
        }
        self.count = count;
        self.regenerate();
        Dirty::DIRTY
    }

    pub fn increment_count(&mut self) -> Dirty {
        self.set_count(self.count.saturating_add(1))
    }

    /// Removes a ray from the beam, if it has any.
    pub fn decrement_count(&mut self) -> Dirty {
        self.set_count(self.count.saturating_sub(1))
    }

    /// Negative widths are clamped to zero.
    pub fn set_width(&mut self, width: Float) -> Result<Dirty, GeometryError> {
        if !width.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        let width = width.max(0.0);
        if width == self.width {
            return Ok(Dirty::CLEAN);
        }
        self.width = width;
        self.regenerate();
        Ok(Dirty::DIRTY)
    }

    /// Points the beam towards `target`.
    pub fn update_direction(&mut self, target: &Vector2) -> Result<Dirty, GeometryError> {
        self.direction = try_unit(target - self.origin)?;
        self.regenerate();
        Ok(Dirty::DIRTY)
    }
}

impl Transform for Beam {
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError> {
        if finite(delta)? == Vector2::zeros() {
            return Ok(Dirty::CLEAN);
        }
        self.origin = finite(self.origin + delta)?;
        self.regenerate();
        Ok(Dirty::DIRTY)
    }

    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError> {
        if finite_angle(angle)? == 0.0 {
            return Ok(Dirty::CLEAN);
        }
        self.direction = Unit2::new_normalize(self.direction.rotated(angle));
        self.regenerate();
        Ok(Dirty::DIRTY)
    }
}

impl Pick for Beam {
    /// Tests against the quad swept by the beam's width along its
    /// first segments (the shortest of them).
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool {
        let reach = self
            .rays
            .iter()
            .map(Ray::length)
            .reduce(Float::min)
            .unwrap_or(0.0);

        let v = p - self.origin;
        let along = v.dot(&self.direction);
        let across = v.dot(&self.direction.perp_ccw()).abs();

        (-tolerance..=reach + tolerance).contains(&along) && across <= self.width / 2.0 + tolerance
    }
}
