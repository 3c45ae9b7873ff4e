use core::fmt;

use tracing::{debug, trace};

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MirrorId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(pub usize);

impl fmt::Display for MirrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source of light in a [`Scene`].
#[derive(Clone, Debug, PartialEq)]
pub enum Emitter {
    Ray(Ray),
    Beam(Beam),
}

impl From<Ray> for Emitter {
    #[inline]
    fn from(ray: Ray) -> Self {
        Self::Ray(ray)
    }
}

impl From<Beam> for Emitter {
    #[inline]
    fn from(beam: Beam) -> Self {
        Self::Beam(beam)
    }
}

impl Emitter {
    /// The source rays of this emitter (not their reflections).
    #[must_use]
    pub fn rays(&self) -> &[Ray] {
        match self {
            Self::Ray(ray) => core::slice::from_ref(ray),
            Self::Beam(beam) => beam.rays(),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.rays().iter().flat_map(Ray::segments)
    }

    pub fn cast<M: Mirror + ?Sized>(&mut self, mirror: &M, config: &TraceConfig) {
        match self {
            Self::Ray(ray) => ray.cast(mirror, config),
            Self::Beam(beam) => beam.cast(mirror, config),
        }
    }

    pub fn update_direction(&mut self, target: &Vector2) -> Result<Dirty, GeometryError> {
        match self {
            Self::Ray(ray) => ray.update_direction(target),
            Self::Beam(beam) => beam.update_direction(target),
        }
    }
}

impl Transform for Emitter {
    fn translate(&mut self, delta: Vector2) -> Result<Dirty, GeometryError> {
        match self {
            Self::Ray(ray) => ray.translate(delta),
            Self::Beam(beam) => beam.translate(delta),
        }
    }

    fn rotate(&mut self, angle: Float) -> Result<Dirty, GeometryError> {
        match self {
            Self::Ray(ray) => ray.rotate(angle),
            Self::Beam(beam) => beam.rotate(angle),
        }
    }
}

impl Pick for Emitter {
    fn contains_point(&self, p: &Vector2, tolerance: Float) -> bool {
        match self {
            Self::Ray(ray) => ray.contains_point(p, tolerance),
            Self::Beam(beam) => beam.contains_point(p, tolerance),
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    emitter: Emitter,
    stale: bool,
}

/// An object found by [`SceneView::pick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Picked {
    Emitter(EmitterId),
    Mirror(MirrorId),
}

/// Mirrors and light sources.
///
/// All geometric mutations go through the scene, which records which emitters
/// they invalidated: moving a mirror invalidates every emitter, moving an
/// emitter only invalidates itself. Invalidated emitters are cast again by
/// [`Self::update`], and ray state can only be read through [`Self::view`],
/// which updates first.
///
/// Removing a mirror or an emitter shifts the ids of those added after it down by one.
#[derive(Clone, Debug)]
pub struct Scene<M> {
    config: TraceConfig,
    mirrors: Vec<M>,
    emitters: Vec<Slot>,
}

impl<M> Default for Scene<M> {
    fn default() -> Self {
        Self {
            config: TraceConfig::default(),
            mirrors: Vec::new(),
            emitters: Vec::new(),
        }
    }
}

impl<M> Scene<M> {
    pub fn new(config: TraceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Mirror geometry is never stale, so it can be read at any time.
    #[inline]
    #[must_use]
    pub fn mirrors(&self) -> &[M] {
        &self.mirrors
    }

    #[inline]
    #[must_use]
    pub fn mirror(&self, id: MirrorId) -> Option<&M> {
        self.mirrors.get(id.0)
    }

    #[inline]
    #[must_use]
    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Whether some emitters must be cast again before their rays can be read.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.emitters.iter().any(|slot| slot.stale)
    }

    fn invalidate_all(&mut self) {
        self.emitters.iter_mut().for_each(|slot| slot.stale = true);
    }

    fn mirror_mut(&mut self, id: MirrorId) -> Result<&mut M, SceneError> {
        self.mirrors.get_mut(id.0).ok_or(SceneError::UnknownMirror(id))
    }

    fn slot_mut(&mut self, id: EmitterId) -> Result<&mut Slot, SceneError> {
        self.emitters.get_mut(id.0).ok_or(SceneError::UnknownEmitter(id))
    }

    fn modify_emitter(
        &mut self,
        id: EmitterId,
        f: impl FnOnce(&mut Emitter) -> Result<Dirty, SceneError>,
    ) -> Result<Dirty, SceneError> {
        let slot = self.slot_mut(id)?;
        let dirty = f(&mut slot.emitter)?;
        slot.stale |= dirty.is_dirty();
        Ok(dirty)
    }

    fn modify_beam(
        &mut self,
        id: EmitterId,
        f: impl FnOnce(&mut Beam) -> Result<Dirty, GeometryError>,
    ) -> Result<Dirty, SceneError> {
        self.modify_emitter(id, |emitter| match emitter {
            Emitter::Beam(beam) => Ok(f(beam)?),
            Emitter::Ray(_) => Err(SceneError::NotABeam(id)),
        })
    }

    /// Edits a mirror in place. Every emitter is cast again on the next update
    /// if `f` reports a change.
    pub fn modify_mirror(
        &mut self,
        id: MirrorId,
        f: impl FnOnce(&mut M) -> Result<Dirty, GeometryError>,
    ) -> Result<Dirty, SceneError> {
        let dirty = f(self.mirror_mut(id)?)?;
        if dirty.is_dirty() {
            self.invalidate_all();
        }
        Ok(dirty)
    }

    pub fn add_mirror(&mut self, mirror: M) -> MirrorId {
        self.mirrors.push(mirror);
        self.invalidate_all();
        MirrorId(self.mirrors.len() - 1)
    }

    pub fn remove_mirror(&mut self, id: MirrorId) -> Result<M, SceneError> {
        if id.0 >= self.mirrors.len() {
            return Err(SceneError::UnknownMirror(id));
        }
        self.invalidate_all();
        Ok(self.mirrors.remove(id.0))
    }

    pub fn add_emitter(&mut self, emitter: impl Into<Emitter>) -> EmitterId {
        self.emitters.push(Slot {
            emitter: emitter.into(),
            stale: true,
        });
        EmitterId(self.emitters.len() - 1)
    }

    pub fn remove_emitter(&mut self, id: EmitterId) -> Result<Emitter, SceneError> {
        if id.0 >= self.emitters.len() {
            return Err(SceneError::UnknownEmitter(id));
        }
        Ok(self.emitters.remove(id.0).emitter)
    }

    /// Replaces the tracing parameters, every emitter is cast again on the next update.
    pub fn set_config(&mut self, config: TraceConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config != self.config {
            self.config = config;
            self.invalidate_all();
        }
        Ok(())
    }

    pub fn translate_emitter(
        &mut self,
        id: EmitterId,
        delta: Vector2,
    ) -> Result<Dirty, SceneError> {
        self.modify_emitter(id, |e| Ok(e.translate(delta)?))
    }

    pub fn rotate_emitter(&mut self, id: EmitterId, angle: Float) -> Result<Dirty, SceneError> {
        self.modify_emitter(id, |e| Ok(e.rotate(angle)?))
    }

    /// Points a ray or a beam towards `target`.
    pub fn update_emitter_direction(
        &mut self,
        id: EmitterId,
        target: &Vector2,
    ) -> Result<Dirty, SceneError> {
        self.modify_emitter(id, |e| Ok(e.update_direction(target)?))
    }

    pub fn set_beam_count(&mut self, id: EmitterId, count: usize) -> Result<Dirty, SceneError> {
        self.modify_beam(id, |beam| Ok(beam.set_count(count)))
    }

    pub fn increment_beam_count(&mut self, id: EmitterId) -> Result<Dirty, SceneError> {
        self.modify_beam(id, |beam| Ok(beam.increment_count()))
    }

    pub fn decrement_beam_count(&mut self, id: EmitterId) -> Result<Dirty, SceneError> {
        self.modify_beam(id, |beam| Ok(beam.decrement_count()))
    }

    pub fn set_beam_width(&mut self, id: EmitterId, width: Float) -> Result<Dirty, SceneError> {
        self.modify_beam(id, |beam| beam.set_width(width))
    }
}

impl<M: Transform> Scene<M> {
    pub fn translate_mirror(&mut self, id: MirrorId, delta: Vector2) -> Result<Dirty, SceneError> {
        self.modify_mirror(id, |mirror| mirror.translate(delta))
    }

    /// Rotates a mirror around its own center.
    pub fn rotate_mirror(&mut self, id: MirrorId, angle: Float) -> Result<Dirty, SceneError> {
        self.modify_mirror(id, |mirror| mirror.rotate(angle))
    }
}

impl<M: Mirror> Scene<M> {
    /// Builds a scene and casts all of its emitters.
    pub fn with_contents(
        config: TraceConfig,
        mirrors: impl IntoIterator<Item = M>,
        emitters: impl IntoIterator<Item = Emitter>,
    ) -> Result<Self, ConfigError> {
        let mut scene = Self::new(config)?;
        scene.mirrors.extend(mirrors);
        for emitter in emitters {
            scene.add_emitter(emitter);
        }
        scene.update();
        Ok(scene)
    }

    /// Casts every stale emitter again, returns how many were cast.
    pub fn update(&mut self) -> usize {
        let Self {
            config,
            mirrors,
            emitters,
        } = self;

        let mut count = 0;

        for (i, slot) in emitters.iter_mut().enumerate().filter(|(_, slot)| slot.stale) {
            trace!(emitter = i, "casting");
            slot.emitter.cast(mirrors.as_slice(), config);
            slot.stale = false;
            count += 1;
        }

        if count > 0 {
            debug!(cast = count, mirrors = mirrors.len(), "scene updated");
        }

        count
    }

    /// Brings every ray up to date, then gives read access to the whole scene.
    pub fn view(&mut self) -> SceneView<'_, M> {
        self.update();
        SceneView { scene: self }
    }
}

/// Read access to an up-to-date [`Scene`], see [`Scene::view`].
pub struct SceneView<'a, M> {
    scene: &'a Scene<M>,
}

impl<M> Clone for SceneView<'_, M> {
    fn clone(&self) -> Self {
        Self { scene: self.scene }
    }
}

impl<'a, M> SceneView<'a, M> {
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &'a TraceConfig {
        &self.scene.config
    }

    #[inline]
    #[must_use]
    pub fn mirrors(&self) -> &'a [M] {
        &self.scene.mirrors
    }

    #[inline]
    #[must_use]
    pub fn emitter(&self, id: EmitterId) -> Option<&'a Emitter> {
        self.scene.emitters.get(id.0).map(|slot| &slot.emitter)
    }

    pub fn emitters(&self) -> impl Iterator<Item = (EmitterId, &'a Emitter)> + 'a {
        self.scene
            .emitters
            .iter()
            .enumerate()
            .map(|(i, slot)| (EmitterId(i), &slot.emitter))
    }

    /// Every segment of every light path in the scene.
    pub fn segments(&self) -> impl Iterator<Item = (EmitterId, Segment)> + 'a {
        self.emitters()
            .flat_map(|(id, emitter)| emitter.segments().map(move |segment| (id, segment)))
    }
}

impl<M: Pick> SceneView<'_, M> {
    /// The first emitter, or else the first mirror, containing `p`.
    #[must_use]
    pub fn pick(&self, p: &Vector2, tolerance: Float) -> Option<Picked> {
        self.emitters()
            .find(|(_, emitter)| emitter.contains_point(p, tolerance))
            .map(|(id, _)| Picked::Emitter(id))
            .or_else(|| {
                self.mirrors()
                    .iter()
                    .position(|mirror| mirror.contains_point(p, tolerance))
                    .map(|i| Picked::Mirror(MirrorId(i)))
            })
    }
}
