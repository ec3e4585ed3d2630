use thiserror::Error;

/// Top-level error type for spherical geometry operations.
#[derive(Debug, Error)]
pub enum SphereError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Invalid geometric input: degenerate, non-finite or non-convex arguments.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("non-finite input: {0}")]
    NonFinite(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("non-convex input: {0}")]
    NonConvex(String),
}

/// Invalid state while assembling arc paths or vertex-based regions.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("path arcs are not connected: previous= {previous}, next= {next}")]
    NotConnected { previous: String, next: String },

    #[error("cannot add to a path ending or starting with a full arc: {0}")]
    AfterFullArc(String),

    #[error("unable to close path: {0}")]
    CannotClose(String),

    #[error("unable to create arc: no point precision specified")]
    MissingPrecision,

    #[error("at least 3 distinct vertices are required, found {0}")]
    TooFewVertices(usize),
}

/// Convenience type alias for results using [`SphereError`].
pub type Result<T> = std::result::Result<T, SphereError>;
