//! Filesystem-backed template source.
//!
//! Template names are resolved relative to a base directory. Names that would
//! leave that directory (absolute paths, `..` components, symlinks pointing
//! outside) are reported as not found.

use memo_traits::{ResourceError, SharedTemplate, TemplateSource};
use std::path::{Component, Path, PathBuf};

/// Reads UTF-8 templates from below `base_path` on every `load`.
#[derive(Debug)]
pub struct FilesystemTemplateSource {
    base_path: PathBuf,
    /// Canonicalized base path for containment checks
    canonical_base: Option<PathBuf>,
}

impl FilesystemTemplateSource {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        // May fail if the directory doesn't exist yet
        let canonical = base.canonicalize().ok();
        Self {
            base_path: base,
            canonical_base: canonical,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Returns `None` if the name would escape the base directory.
    fn resolve_path_safe(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return None;
        }

        let full_path = self.base_path.join(relative);

        if let Ok(canonical) = full_path.canonicalize()
            && let Some(ref base) = self.canonical_base
        {
            return canonical.starts_with(base).then_some(canonical);
        }

        Some(full_path)
    }
}

impl TemplateSource for FilesystemTemplateSource {
    fn load(&self, name: &str) -> Result<SharedTemplate, ResourceError> {
        let full_path = self.resolve_path_safe(name).ok_or_else(|| {
            log::warn!("Rejected template name outside base directory: {}", name);
            ResourceError::NotFound(name.to_string())
        })?;

        let bytes = std::fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(name.to_string())
            } else {
                ResourceError::LoadFailed {
                    path: full_path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let text = String::from_utf8(bytes)
            .map_err(|_| ResourceError::InvalidEncoding(name.to_string()))?;

        log::debug!("Loaded template '{}' ({} bytes)", name, text.len());
        Ok(SharedTemplate::from(text))
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve_path_safe(name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn base_path(&self) -> Option<&str> {
        self.base_path.to_str()
    }

    fn name(&self) -> &'static str {
        "FilesystemTemplateSource"
    }
}
