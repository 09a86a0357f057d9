// src/pipeline/api.rs
use crate::error::GenerateError;
use memo_core::{Asset, FieldSet, assemble, validate};
use memo_traits::{PdfOptions, PdfRenderer, TemplateSource};
use std::sync::Arc;
use std::time::Instant;

/// One memo to generate: raw form fields plus the two optional uploads.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub fields: FieldSet,
    pub cover_image: Option<Asset>,
    pub footer_logo: Option<Asset>,
}

impl GenerateRequest {
    pub fn new(fields: FieldSet) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn with_cover_image(mut self, asset: Asset) -> Self {
        self.cover_image = Some(asset);
        self
    }

    pub fn with_footer_logo(mut self, asset: Asset) -> Self {
        self.footer_logo = Some(asset);
        self
    }
}

/// A ready-to-use pipeline. Cheap to share behind an `Arc`; holds no
/// per-request state.
pub struct MemoPipeline {
    templates: Arc<dyn TemplateSource>,
    renderer: Arc<dyn PdfRenderer>,
    options: PdfOptions,
}

impl MemoPipeline {
    pub(crate) fn new(
        templates: Arc<dyn TemplateSource>,
        renderer: Arc<dyn PdfRenderer>,
        options: PdfOptions,
    ) -> Self {
        Self {
            templates,
            renderer,
            options,
        }
    }

    /// Runs every stage except rendering and returns the final HTML.
    pub fn assemble_html(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        let data = validate(&request.fields)?;
        let html = assemble(
            self.templates.as_ref(),
            &data,
            request.cover_image.as_ref(),
            request.footer_logo.as_ref(),
        )?;
        Ok(html)
    }

    /// Generates the PDF. The renderer is only invoked once the document has
    /// been fully assembled, and nothing is returned unless it succeeds.
    pub async fn generate(&self, request: GenerateRequest) -> Result<Vec<u8>, GenerateError> {
        let started = Instant::now();
        let html = self.assemble_html(&request)?;
        // The uploads are already inlined; release them before the long wait.
        drop(request);

        tracing::debug!(
            html_bytes = html.len(),
            renderer = self.renderer.name(),
            "Document assembled, rendering"
        );

        let pdf = self.renderer.render_to_pdf(&html, &self.options).await?;

        tracing::info!(
            pdf_bytes = pdf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Memo generated"
        );
        Ok(pdf)
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    pub fn template_source(&self) -> &dyn TemplateSource {
        self.templates.as_ref()
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }
}

impl std::fmt::Debug for MemoPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoPipeline")
            .field("templates", &self.templates.name())
            .field("renderer", &self.renderer.name())
            .field("options", &self.options)
            .finish()
    }
}
