//! Template sources for the memo-press pipeline.
//!
//! ## Available Sources
//!
//! - [`FilesystemTemplateSource`]: reads templates below a base directory
//! - [`PreloadedTemplates`]: a fixed set of templates read once at startup
//!
//! The in-memory source from memo-traits is re-exported for convenience.

mod filesystem;
mod preloaded;

pub use filesystem::FilesystemTemplateSource;
pub use preloaded::PreloadedTemplates;

pub use memo_traits::InMemoryTemplateSource;
