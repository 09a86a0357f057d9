//! The rendering seam: turn a finished HTML document into PDF bytes.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures of the HTML-to-PDF engine.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to launch rendering engine '{program}': {message}")]
    Launch { program: String, message: String },

    #[error("Rendering I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendering timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rendering engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Rendering engine produced no usable PDF: {0}")]
    MalformedOutput(String),
}

impl RenderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RenderError::Timeout(_))
    }
}

/// Paper sizes the renderer understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaperFormat {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl PaperFormat {
    /// The CSS `@page { size: ... }` keyword for this format.
    pub fn css_name(self) -> &'static str {
        match self {
            PaperFormat::A4 => "A4",
            PaperFormat::A3 => "A3",
            PaperFormat::A5 => "A5",
            PaperFormat::Letter => "letter",
            PaperFormat::Legal => "legal",
        }
    }

    /// Width and height in millimetres, portrait.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperFormat::A4 => (210.0, 297.0),
            PaperFormat::A3 => (297.0, 420.0),
            PaperFormat::A5 => (148.0, 210.0),
            PaperFormat::Letter => (215.9, 279.4),
            PaperFormat::Legal => (215.9, 355.6),
        }
    }
}

impl std::str::FromStr for PaperFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperFormat::A4),
            "a3" => Ok(PaperFormat::A3),
            "a5" => Ok(PaperFormat::A5),
            "letter" => Ok(PaperFormat::Letter),
            "legal" => Ok(PaperFormat::Legal),
            other => Err(format!("unknown paper format '{other}'")),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PdfMargins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl PdfMargins {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn uniform(mm: f32) -> Self {
        Self {
            top: mm,
            right: mm,
            bottom: mm,
            left: mm,
        }
    }
}

/// Options handed to the renderer with every document.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub format: PaperFormat,
    /// Print background colours and images.
    pub print_background: bool,
    /// Let `@page` rules in the document override `format` and `margins`.
    pub prefer_css_page_size: bool,
    pub margins: PdfMargins,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            format: PaperFormat::A4,
            print_background: true,
            prefer_css_page_size: true,
            margins: PdfMargins::zero(),
        }
    }
}

/// Converts final markup into paginated PDF bytes.
///
/// Implementations may be slow (seconds) and may fail transiently. They must
/// release whatever engine they acquire before returning, on every path, and
/// must never hand back a partial document.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_to_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError>;

    /// Returns a human-readable name for this renderer (for logging).
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_memo_layout() {
        let options = PdfOptions::default();
        assert_eq!(options.format, PaperFormat::A4);
        assert!(options.print_background);
        assert!(options.prefer_css_page_size);
        assert_eq!(options.margins, PdfMargins::zero());
    }

    #[test]
    fn test_paper_format_from_str() {
        assert_eq!("a4".parse::<PaperFormat>(), Ok(PaperFormat::A4));
        assert_eq!("Letter".parse::<PaperFormat>(), Ok(PaperFormat::Letter));
        assert!("tabloid".parse::<PaperFormat>().is_err());
    }

    #[test]
    fn test_paper_format_css_and_dimensions() {
        assert_eq!(PaperFormat::Letter.css_name(), "letter");
        assert_eq!(PaperFormat::A4.dimensions_mm(), (210.0, 297.0));
    }

    #[test]
    fn test_render_error_timeout_flag() {
        assert!(RenderError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!RenderError::MalformedOutput("empty".into()).is_timeout());
    }

    struct Fixed;

    #[async_trait]
    impl PdfRenderer for Fixed {
        async fn render_to_pdf(&self, _html: &str, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
            Ok(b"%PDF-1.7".to_vec())
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }
    }

    #[tokio::test]
    async fn test_renderer_is_object_safe() {
        let renderer: Box<dyn PdfRenderer> = Box::new(Fixed);
        let bytes = renderer.render_to_pdf("<p/>", &PdfOptions::default()).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
