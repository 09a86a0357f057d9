// src/pipeline/builder.rs
use super::api::MemoPipeline;
use crate::error::BuildError;
use memo_core::{MemoTemplates, REQUIRED_TEMPLATES};
use memo_resource::{FilesystemTemplateSource, PreloadedTemplates};
use memo_traits::{PdfOptions, PdfRenderer, TemplateSource};
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a `MemoPipeline`.
#[derive(Default)]
pub struct PipelineBuilder {
    templates: Option<Arc<dyn TemplateSource>>,
    renderer: Option<Arc<dyn PdfRenderer>>,
    options: PdfOptions,
    preload: bool,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Uses any template source, e.g. an in-memory one in tests.
    pub fn with_template_source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.templates = Some(Arc::new(source));
        self
    }

    /// Reads templates from a directory on disk.
    pub fn with_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Result<Self, BuildError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(BuildError::TemplateDir(dir.to_path_buf()));
        }
        self.templates = Some(Arc::new(FilesystemTemplateSource::new(dir)));
        Ok(self)
    }

    pub fn with_renderer(mut self, renderer: impl PdfRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_shared_renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_pdf_options(mut self, options: PdfOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads every template once at build time and serves them from memory
    /// afterwards. Without this, edits on disk are picked up per request.
    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    /// Checks that all templates load, then builds the pipeline.
    ///
    /// Placeholders that no rendering step will ever fill are logged as
    /// warnings; they are not an error because unmatched tokens are left in
    /// the output verbatim.
    pub fn build(self) -> Result<MemoPipeline, BuildError> {
        let templates = self.templates.ok_or(BuildError::MissingTemplates)?;
        let renderer = self.renderer.ok_or(BuildError::MissingRenderer)?;

        let loaded = MemoTemplates::load(templates.as_ref())?;
        for (template, names) in loaded.unresolved_placeholders() {
            tracing::warn!(
                template,
                placeholders = ?names,
                "Template contains placeholders that will never be filled"
            );
        }

        let templates: Arc<dyn TemplateSource> = if self.preload {
            let preloaded = PreloadedTemplates::preload(templates.as_ref(), &REQUIRED_TEMPLATES)?;
            tracing::debug!(count = preloaded.len(), "Templates preloaded");
            Arc::new(preloaded)
        } else {
            templates
        };

        tracing::info!(
            templates = templates.name(),
            renderer = renderer.name(),
            paper = self.options.format.css_name(),
            "Pipeline ready"
        );
        Ok(MemoPipeline::new(templates, renderer, self.options))
    }
}
