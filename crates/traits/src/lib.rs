pub mod render;
pub mod resource;

pub use render::{PaperFormat, PdfMargins, PdfOptions, PdfRenderer, RenderError};
pub use resource::{InMemoryTemplateSource, ResourceError, SharedTemplate, TemplateSource};
