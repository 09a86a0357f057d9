//! # memo-press
//!
//! Turns a finance memo form (text fields plus an optional cover image and
//! footer logo) into a paginated PDF.
//!
//! ```text
//! FieldSet ──validate──▶ MemoData ─┐
//! uploads ──encode──▶ data: URLs ──┼──assemble──▶ HTML ──render──▶ PDF
//! templates ───────────────────────┘
//! ```
//!
//! - [`pipeline`]: [`MemoPipeline`] and its [`PipelineBuilder`]
//! - [`render`]: the headless Chromium [`ChromiumRenderer`]
//! - [`service`]: the axum HTTP surface
//!
//! Validation, asset encoding and assembly live in `memo-core`; they are
//! re-exported here.

pub mod error;
pub mod pipeline;
pub mod render;
pub mod service;

pub use error::{BuildError, ErrorCategory, GenerateError};
pub use pipeline::{GenerateRequest, MemoPipeline, PipelineBuilder};
pub use render::ChromiumRenderer;

pub use memo_core::{
    Asset, ConfigurationError, FieldIssue, FieldSet, IssueKind, MemoData, ValidationError,
};
pub use memo_traits::{PaperFormat, PdfMargins, PdfOptions, PdfRenderer, RenderError};
