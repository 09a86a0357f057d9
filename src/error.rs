// src/error.rs
use memo_core::{ConfigurationError, ValidationError};
use memo_traits::RenderError;
use thiserror::Error;

/// Everything that can stop a memo from becoming a PDF.
///
/// Each variant is a different kind of failure: the caller's input, the
/// deployment, or the rendering engine. The HTTP layer maps them to status
/// codes via [`GenerateError::category`].
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Rendering(#[from] RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-fixable; a 4xx.
    Validation,
    /// Deployment defect; a 5xx.
    Configuration,
    /// Engine failure or timeout, possibly transient; a 5xx.
    Rendering,
}

impl GenerateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GenerateError::Validation(_) => ErrorCategory::Validation,
            GenerateError::Configuration(_) => ErrorCategory::Configuration,
            GenerateError::Rendering(_) => ErrorCategory::Rendering,
        }
    }
}

/// Errors raised while putting a pipeline together.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("No template source configured. Use `with_template_dir` or `with_template_source`.")]
    MissingTemplates,

    #[error("No PDF renderer configured. Use `with_renderer`.")]
    MissingRenderer,

    #[error("Template directory '{}' does not exist", .0.display())]
    TemplateDir(std::path::PathBuf),

    #[error(transparent)]
    Templates(#[from] ConfigurationError),

    #[error("Failed to preload templates: {0}")]
    Preload(#[from] memo_traits::ResourceError),
}
