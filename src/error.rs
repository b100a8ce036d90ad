//! Errors raised while setting up the view.

/// Failure to build the fixed projection and viewport.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum SetupError {
    #[error("viewport of {width}x{height} pixels is too small to render into")]
    EmptyViewport { width: u32, height: u32 },
    #[error("projection and viewport transforms cannot be inverted")]
    SingularProjection,
}
