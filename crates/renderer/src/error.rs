//! Renderer error types.
//!
//! Errors are split by when they can occur: [`RenderError::Setup`] covers
//! resource creation (initial or during a resize rebuild),
//! [`RenderError::Runtime`] covers the per-frame acquire/submit/present
//! path, and [`RenderError::InvalidState`] surfaces calls made on a
//! renderer whose GPU state is not live.

use thiserror::Error;

use vkr_resources::ResourceError;
use vkr_rhi::RhiError;

/// Errors reported by the renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A GPU resource creation step failed. The renderer is left invalid.
    #[error("renderer setup failed: {0}")]
    Setup(#[source] RhiError),

    /// Loading or validating CPU-side scene data failed during setup.
    #[error("scene resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Acquire, submit, or present failed while rendering a frame.
    /// The frame is skipped; no retry is attempted.
    #[error("frame rendering failed: {0}")]
    Runtime(#[source] RhiError),

    /// An operation was invoked on a renderer without live GPU state.
    #[error("invalid renderer state: {0}")]
    InvalidState(String),
}

/// Result alias for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::InvalidState("render_frame before create".to_string());
        assert_eq!(
            err.to_string(),
            "invalid renderer state: render_frame before create"
        );
    }

    #[test]
    fn test_setup_error_wraps_source() {
        use std::error::Error as _;
        let err = RenderError::Setup(RhiError::NoSuitableGpu);
        assert!(err.source().is_some());
    }
}
