//! The end-to-end memo pipeline.
//!
//! `validate → encode assets → assemble → render`, strictly in that order.
//! The first three stages are synchronous and pure; only the renderer is
//! awaited.

mod api;
mod builder;

pub use api::{GenerateRequest, MemoPipeline};
pub use builder::PipelineBuilder;
