use thiserror::Error;

use super::*;

/// Malformed geometric input, rejected before it can propagate NaNs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("direction vector must be non-zero")]
    ZeroDirection,
    #[error("segment endpoints must be distinct")]
    DegenerateSegment,
    #[error("coordinates must be finite")]
    NonFinite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("no mirror with id {0}")]
    UnknownMirror(MirrorId),
    #[error("no emitter with id {0}")]
    UnknownEmitter(EmitterId),
    #[error("emitter {0} is not a beam")]
    NotABeam(EmitterId),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
