//! PDF renderers.
//!
//! The pipeline only sees [`PdfRenderer`]; [`ChromiumRenderer`] is the
//! production implementation.

pub mod chromium;

pub use chromium::{ChromiumRenderer, inject_print_defaults};
pub use memo_traits::{PaperFormat, PdfMargins, PdfOptions, PdfRenderer, RenderError};
