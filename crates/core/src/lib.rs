//! # memo-core
//!
//! The document pipeline up to, but not including, PDF rendering:
//! - **validate**: raw form fields to a typed [`MemoData`] record
//! - **asset**: uploaded images to inline `data:` references
//! - **assemble**: render the cover and body fragments, nest them into the
//!   document shell
//! - **error**: [`ValidationError`] and [`ConfigurationError`]
//!
//! Everything here is synchronous and free of I/O apart from the
//! [`TemplateSource`] the assembler reads from.

pub use memo_template as template;
pub use memo_traits as traits;

pub mod assemble;
pub mod asset;
pub mod error;
pub mod schema;
pub mod validate;

pub use assemble::{MemoTemplates, REQUIRED_TEMPLATES, assemble};
pub use asset::{Asset, decode_inline_reference, encode};
pub use error::{ConfigurationError, FieldIssue, IssueKind, ValidationError};
pub use schema::{FieldSet, MEMO_FIELDS, MemoData};
pub use validate::validate;

pub use traits::{InMemoryTemplateSource, ResourceError, TemplateSource};
