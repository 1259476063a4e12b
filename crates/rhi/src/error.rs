//! RHI-specific error types.
//!
//! Every `vk::Result` coming out of the driver is converted into a typed
//! error carrying a descriptive message; nothing panics on a reported
//! failure and nothing is swallowed.

use thiserror::Error;

/// RHI-specific error type.
#[derive(Error, Debug)]
pub enum RhiError {
    /// Vulkan API error
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] ash::vk::Result),

    /// Failed to load Vulkan library
    #[error("Failed to load Vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    /// GPU allocator error
    #[error("Allocator error: {0}")]
    AllocatorError(#[from] gpu_allocator::AllocationError),

    /// No suitable GPU found
    #[error("No suitable GPU found")]
    NoSuitableGpu,

    /// Shader loading error
    #[error("Shader error: {0}")]
    ShaderError(String),

    /// Surface creation error
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Swapchain error
    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    /// Invalid handle or argument
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Pipeline creation error
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vk_result_conversion() {
        let err: RhiError = ash::vk::Result::ERROR_OUT_OF_DATE_KHR.into();
        assert!(matches!(err, RhiError::VulkanError(_)));
        assert!(err.to_string().contains("Vulkan error"));
    }

    #[test]
    fn test_descriptive_messages() {
        let err = RhiError::SwapchainError("surface reports no formats".to_string());
        assert_eq!(
            err.to_string(),
            "Swapchain error: surface reports no formats"
        );
    }
}
