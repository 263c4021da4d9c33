use thiserror::Error;

use crate::surface::SurfaceId;

/// Top-level error type for the surface portal engine.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("transform is singular and cannot be decomposed")]
    SingularTransform,
}

/// Errors raised when an event or pick references something the registry
/// does not know about.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown surface: {0}")]
    UnknownSurface(SurfaceId),

    #[error("mesh is not owned by any live surface")]
    UnknownMesh,
}

/// Errors related to portal selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("surface {0} is not vertical")]
    NotVertical(SurfaceId),
}

/// Convenience type alias for results using [`PortalError`].
pub type Result<T> = std::result::Result<T, PortalError>;
