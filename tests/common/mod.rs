#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use memo_press::{PdfOptions, PdfRenderer, RenderError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n% fake\n%%EOF\n";

/// A `PdfRenderer` that records every document it is asked to render.
///
/// Clones share the same record, so a test can keep one handle and give the
/// other to the pipeline.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<String>>>,
    failure: Option<fn() -> RenderError>,
    delay: Option<Duration>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with the error `make` builds.
    pub fn failing(make: fn() -> RenderError) -> Self {
        Self {
            failure: Some(make),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The HTML of the most recent call.
    pub fn last_html(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PdfRenderer for RecordingRenderer {
    async fn render_to_pdf(&self, html: &str, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        self.calls.lock().unwrap().push(html.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure {
            Some(make) => Err(make()),
            None => Ok(FAKE_PDF.to_vec()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
