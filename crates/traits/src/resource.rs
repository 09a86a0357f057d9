//! TemplateSource trait for abstracting template loading.
//!
//! The assembler asks for templates by logical name (`document.html`,
//! `pages/page2.html`, ...) and never touches the filesystem itself.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for template loading operations.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to load template '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Template '{0}' is not valid UTF-8")]
    InvalidEncoding(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared template text (reference-counted, immutable).
pub type SharedTemplate = Arc<str>;

/// A read-only store of template text keyed by logical name.
///
/// # Implementations
///
/// - `InMemoryTemplateSource`: pre-populated map, used by tests and the CLI
/// - `FilesystemTemplateSource` (memo-resource): reads below a base directory
/// - `PreloadedTemplates` (memo-resource): loaded once, immutable afterwards
pub trait TemplateSource: Send + Sync + Debug {
    /// Load a template by its logical name.
    fn load(&self, name: &str) -> Result<SharedTemplate, ResourceError>;

    /// Check if a template exists.
    fn exists(&self, name: &str) -> bool;

    /// Get the base path templates are resolved against, if any.
    fn base_path(&self) -> Option<&str> {
        None
    }

    /// Returns a human-readable name for this source (for logging).
    fn name(&self) -> &'static str;
}

impl<T: TemplateSource + ?Sized> TemplateSource for Arc<T> {
    fn load(&self, name: &str) -> Result<SharedTemplate, ResourceError> {
        (**self).load(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn base_path(&self) -> Option<&str> {
        (**self).base_path()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// An in-memory template source.
///
/// Templates must be added before use. Works anywhere, including tests that
/// want full control over template text.
#[derive(Debug, Default)]
pub struct InMemoryTemplateSource {
    templates: RwLock<HashMap<String, SharedTemplate>>,
}

impl InMemoryTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from `(name, text)` pairs.
    pub fn with_templates<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let map = templates
            .into_iter()
            .map(|(k, v)| (k.into(), SharedTemplate::from(v.as_ref())))
            .collect();
        Self {
            templates: RwLock::new(map),
        }
    }

    /// Add a template to the store, replacing any previous text.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, name: impl Into<String>, text: impl AsRef<str>) -> Result<(), ResourceError> {
        let name = name.into();
        let mut templates = self
            .templates
            .write()
            .map_err(|_| ResourceError::LoadFailed {
                path: name.clone(),
                message: "template store lock poisoned".to_string(),
            })?;
        templates.insert(name, SharedTemplate::from(text.as_ref()));
        Ok(())
    }

    /// Remove a template from the store.
    ///
    /// Returns `None` if the lock is poisoned or the template doesn't exist.
    pub fn remove(&self, name: &str) -> Option<SharedTemplate> {
        self.templates.write().ok()?.remove(name)
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateSource for InMemoryTemplateSource {
    fn load(&self, name: &str) -> Result<SharedTemplate, ResourceError> {
        let templates = self
            .templates
            .read()
            .map_err(|_| ResourceError::LoadFailed {
                path: name.to_string(),
                message: "template store lock poisoned".to_string(),
            })?;
        templates
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))
    }

    fn exists(&self, name: &str) -> bool {
        self.templates
            .read()
            .map(|t| t.contains_key(name))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryTemplateSource"
    }
}
