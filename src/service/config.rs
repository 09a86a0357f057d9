use config::ConfigBuilder;
use config::builder::DefaultState;
use memo_traits::{PaperFormat, PdfOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "MEMO_PRESS_CONFIG";
/// Prefix for per-key environment overrides, e.g. `MEMO_PRESS__SERVER__PORT`.
pub const ENV_PREFIX: &str = "MEMO_PRESS";
const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub templates: TemplatesConfig,
    pub renderer: RendererConfig,
    pub public: PublicConfig,
    /// Base path for resolving relative paths (set during loading)
    #[serde(skip)]
    base_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-file upload limit.
    pub max_upload_mb: usize,
    pub max_concurrent_renders: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    pub dir: PathBuf,
    pub preload: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Browser executable. Searched for on `PATH` when unset.
    #[serde(default)]
    pub chromium_path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub settle_ms: u64,
    pub paper: String,
    pub no_sandbox: bool,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicConfig {
    pub dir: PathBuf,
}

impl Config {
    /// Loads defaults, then the configuration file, then environment
    /// overrides.
    ///
    /// The file is `explicit` if given, else the one named by
    /// `MEMO_PRESS_CONFIG`, else `config/default.toml` when it exists. Running
    /// without any file is fine; the built-in defaults are complete.
    pub fn load(explicit: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Self::defaults()?;

        let env_file = std::env::var(CONFIG_ENV)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        let config_file = explicit
            .map(Path::to_path_buf)
            .or(env_file)
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut base_path = None;
        if let Some(file) = &config_file {
            builder = builder.add_source(config::File::from(file.as_path()).required(true));
            // config/default.toml lives one level below the directory its
            // relative paths refer to
            base_path = file
                .parent()
                .map(|dir| match dir.file_name() {
                    Some(name) if name == "config" => dir.parent().unwrap_or(dir),
                    _ => dir,
                })
                .map(Path::to_path_buf);
        }

        // Always layer environment variables on top
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        // Hosting platforms hand the port over as plain PORT
        if let Ok(port) = std::env::var("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| config::ConfigError::Message(format!("Invalid PORT '{port}': {e}")))?;
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        let mut config: Config = builder.build()?.try_deserialize()?;
        config.base_path = base_path;
        config.resolve_paths();
        config.validate()?;

        if let Some(file) = &config_file {
            tracing::debug!(file = %file.display(), "Configuration file loaded");
        }
        Ok(config)
    }

    /// The built-in defaults alone, without reading files or the environment.
    pub fn from_defaults() -> Result<Self, config::ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 10000_i64)?
            .set_default("server.max_upload_mb", 15_i64)?
            .set_default("server.max_concurrent_renders", 2_i64)?
            .set_default("templates.dir", "templates")?
            .set_default("templates.preload", true)?
            .set_default("renderer.timeout_secs", 30_i64)?
            .set_default("renderer.settle_ms", 150_i64)?
            .set_default("renderer.paper", "A4")?
            .set_default("renderer.no_sandbox", true)?
            .set_default("public.dir", "public")
    }

    /// Resolve relative paths in the config based on the base path
    fn resolve_paths(&mut self) {
        let Some(base) = self.base_path.clone() else {
            return;
        };
        for path in [&mut self.templates.dir, &mut self.public.dir] {
            if path.is_relative() {
                let relative = path.strip_prefix("./").unwrap_or(path.as_path()).to_path_buf();
                *path = base.join(relative);
            }
        }
        if let Some(path) = self.renderer.chromium_path.as_mut()
            && path.is_relative()
            && path.components().count() > 1
        {
            *path = base.join(&*path);
        }
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.max_concurrent_renders == 0 {
            return Err(config::ConfigError::Message(
                "server.max_concurrent_renders must be at least 1".into(),
            ));
        }
        if self.renderer.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "renderer.timeout_secs must be at least 1".into(),
            ));
        }
        self.paper_format().map_err(config::ConfigError::Message)?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb * 1024 * 1024
    }

    pub fn paper_format(&self) -> Result<PaperFormat, String> {
        self.renderer.paper.parse()
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.renderer.timeout_secs)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.renderer.settle_ms)
    }

    /// The memo layout's print settings on the configured paper.
    pub fn pdf_options(&self) -> PdfOptions {
        PdfOptions {
            format: self.paper_format().unwrap_or_default(),
            ..PdfOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Environment variables are process-wide; tests here only touch files.

    #[test]
    fn test_file_values_and_relative_paths() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("config")).unwrap();
        let file = root.path().join("config").join("service.toml");
        let mut f = std::fs::File::create(&file).unwrap();
        writeln!(
            f,
            r#"
[server]
port = 8088
max_concurrent_renders = 4

[templates]
dir = "./tpl"
preload = false

[renderer]
paper = "letter"
timeout_secs = 5
"#
        )
        .unwrap();

        let config = Config::load(Some(&file)).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.max_concurrent_renders, 4);
        assert_eq!(config.max_upload_bytes(), 15 * 1024 * 1024);
        assert!(!config.templates.preload);
        assert_eq!(config.templates.dir, root.path().join("tpl"));
        assert_eq!(config.public.dir, root.path().join("public"));
        assert_eq!(config.pdf_options().format, PaperFormat::Letter);
        assert_eq!(config.render_timeout(), Duration::from_secs(5));
        assert_eq!(config.render_settle(), Duration::from_millis(150));
    }

    #[test]
    fn test_defaults_match_original_deployment() {
        let config = Config::from_defaults().unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:10000");
        assert_eq!(config.server.max_upload_mb, 15);
        assert!(config.templates.preload);
        assert!(config.renderer.no_sandbox);
        assert_eq!(config.renderer.chromium_path, None);
        assert!(config.renderer.extra_args.is_empty());
        assert_eq!(config.pdf_options(), PdfOptions::default());
    }

    #[test]
    fn test_unknown_paper_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.toml");
        std::fs::write(&file, "[renderer]\npaper = \"tabloid\"\n").unwrap();

        let err = Config::load(Some(&file)).unwrap_err();
        assert!(err.to_string().contains("tabloid"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }
}
