use crate::pipeline::MemoPipeline;
use crate::service::config::Config;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Shared application state accessible to all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MemoPipeline>,

    /// Limits concurrent renders; each holds a browser process
    pub render_semaphore: Arc<Semaphore>,

    pub config: Arc<Config>,

    pub build: BuildInfo,
}

/// What `/version` reports.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    #[serde(rename = "gitSha")]
    pub git_sha: String,
    #[serde(rename = "buildTime")]
    pub build_time: String,
    /// Compiler the binary was built with, e.g. `rustc 1.89.0 (...)`.
    pub runtime: &'static str,
}

impl BuildInfo {
    /// Package metadata plus `GIT_SHA` and `BUILD_TIME` from the environment.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_else(|_| "unknown".to_string());
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            git_sha: var("GIT_SHA"),
            build_time: var("BUILD_TIME"),
            runtime: env!("MEMO_PRESS_RUSTC_VERSION"),
        }
    }
}

impl AppState {
    pub fn new(pipeline: MemoPipeline, config: Config) -> Self {
        let render_semaphore = Arc::new(Semaphore::new(config.server.max_concurrent_renders));

        Self {
            pipeline: Arc::new(pipeline),
            render_semaphore,
            config: Arc::new(config),
            build: BuildInfo::from_env(),
        }
    }
}
