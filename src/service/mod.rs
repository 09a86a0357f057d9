//! The HTTP service around the pipeline.
//!
//! | Route                | Handler                        |
//! |----------------------|--------------------------------|
//! | `POST /api/generate` | [`api::generate_memo`]         |
//! | `GET /health`        | [`api::health_check`]          |
//! | `GET /version`       | [`api::version`]               |
//! | anything else        | static files from `public.dir` |

pub mod api;
pub mod config;
pub mod error;
pub mod router;
pub mod state;

pub use config::Config;
pub use error::ServiceError;
pub use router::build_router;
pub use state::{AppState, BuildInfo};
