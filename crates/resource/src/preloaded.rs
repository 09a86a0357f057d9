//! A fixed set of templates read once, up front, and never modified.

use memo_traits::{ResourceError, SharedTemplate, TemplateSource};
use std::collections::HashMap;

/// Templates copied out of another source at startup.
///
/// There is no way to add, replace, or evict an entry after construction, so
/// a `PreloadedTemplates` can be shared across requests without locking.
/// Names that were not preloaded are reported as `NotFound`.
#[derive(Debug)]
pub struct PreloadedTemplates {
    templates: HashMap<String, SharedTemplate>,
}

impl PreloadedTemplates {
    /// Loads every name in `names` from `source`, failing on the first
    /// template that can't be read.
    pub fn preload<S>(source: &S, names: &[&str]) -> Result<Self, ResourceError>
    where
        S: TemplateSource + ?Sized,
    {
        let mut templates = HashMap::with_capacity(names.len());
        for &name in names {
            let text = source.load(name)?;
            templates.insert(name.to_string(), text);
        }
        log::info!(
            "Preloaded {} templates from {}",
            templates.len(),
            source.name()
        );
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Names of the preloaded templates, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TemplateSource for PreloadedTemplates {
    fn load(&self, name: &str) -> Result<SharedTemplate, ResourceError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))
    }

    fn exists(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn name(&self) -> &'static str {
        "PreloadedTemplates"
    }
}
