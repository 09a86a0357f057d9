use anyhow::Context;
use clap::{Parser, Subcommand};
use memo_core::{Asset, FieldSet, MemoTemplates};
use memo_press::{
    ChromiumRenderer, GenerateRequest, PipelineBuilder,
    service::{AppState, Config, build_router},
};
use memo_resource::FilesystemTemplateSource;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "memo-press")]
#[command(about = "Finance memorandum generator: form fields in, PDF out", version)]
struct Cli {
    /// Configuration file (defaults to config/default.toml when present)
    #[arg(long, short, global = true, env = "MEMO_PRESS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (the default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate one memo from the command line
    Render {
        /// JSON object of form fields, e.g. {"title": "..."}
        #[arg(long, required_unless_present = "check")]
        fields: Option<PathBuf>,
        #[arg(long)]
        cover: Option<PathBuf>,
        #[arg(long)]
        footer_logo: Option<PathBuf>,
        #[arg(long, short, default_value = "finance-memorandum.pdf")]
        out: PathBuf,
        /// Write the assembled HTML instead of a PDF; no browser needed
        #[arg(long)]
        html: bool,
        /// Only check that the templates load and report unfilled placeholders
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Render {
            fields,
            cover,
            footer_logo,
            out,
            html,
            check,
        } => {
            if check {
                return check_templates(&config);
            }
            let fields = fields.context("--fields is required")?;
            let request = read_request(&fields, cover.as_deref(), footer_logo.as_deref()).await?;
            if html {
                render_html(&config, request, &out).await
            } else {
                render_pdf(&config, request, &out).await
            }
        }
    }
}

async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting memo-press...");
    let pipeline = PipelineBuilder::new()
        .with_template_dir(&config.templates.dir)?
        .with_renderer(build_renderer(&config)?)
        .with_pdf_options(config.pdf_options())
        .with_preload(config.templates.preload)
        .build()?;
    tracing::info!(templates = %config.templates.dir.display(), "Pipeline initialized");

    let addr = config.bind_addr();
    let public_dir = config.public.dir.clone();
    let app = build_router(AppState::new(pipeline, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("memo-press listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - POST /api/generate");
    tracing::info!("  - GET  /health");
    tracing::info!("  - GET  /version");
    tracing::info!("  - GET  /        (static files from {})", public_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("memo-press stopped");
    Ok(())
}

fn build_renderer(config: &Config) -> anyhow::Result<ChromiumRenderer> {
    let program = config
        .renderer
        .chromium_path
        .clone()
        .or_else(ChromiumRenderer::discover)
        .context("No Chromium executable found; set renderer.chromium_path")?;
    tracing::info!(program = %program.display(), "Using Chromium renderer");

    Ok(ChromiumRenderer::new(program)
        .with_timeout(config.render_timeout())
        .with_settle(config.render_settle())
        .with_no_sandbox(config.renderer.no_sandbox)
        .with_extra_args(config.renderer.extra_args.iter().cloned()))
}

async fn read_request(
    fields: &Path,
    cover: Option<&Path>,
    footer_logo: Option<&Path>,
) -> anyhow::Result<GenerateRequest> {
    let text = tokio::fs::read_to_string(fields)
        .await
        .with_context(|| format!("Failed to read {}", fields.display()))?;
    let fields: FieldSet = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON object of strings", fields.display()))?;

    let mut request = GenerateRequest::new(fields);
    if let Some(path) = cover {
        request = request.with_cover_image(read_asset(path).await?);
    }
    if let Some(path) = footer_logo {
        request = request.with_footer_logo(read_asset(path).await?);
    }
    Ok(request)
}

async fn read_asset(path: &Path) -> anyhow::Result<Asset> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Asset::new(bytes, media_type_for(path)))
}

fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn check_templates(config: &Config) -> anyhow::Result<()> {
    let source = FilesystemTemplateSource::new(&config.templates.dir);
    let templates = MemoTemplates::load(&source)?;

    let unresolved = templates.unresolved_placeholders();
    if unresolved.is_empty() {
        println!("Templates in {} are complete", config.templates.dir.display());
    }
    for (template, names) in unresolved {
        println!("{template}: never filled: {}", names.join(", "));
    }
    Ok(())
}

async fn render_html(config: &Config, request: GenerateRequest, out: &Path) -> anyhow::Result<()> {
    let source = FilesystemTemplateSource::new(&config.templates.dir);
    let data = memo_core::validate(&request.fields)?;
    let html = memo_core::assemble(
        &source,
        &data,
        request.cover_image.as_ref(),
        request.footer_logo.as_ref(),
    )?;

    tokio::fs::write(out, html).await?;
    tracing::info!(out = %out.display(), "HTML written");
    Ok(())
}

async fn render_pdf(config: &Config, request: GenerateRequest, out: &Path) -> anyhow::Result<()> {
    let pipeline = PipelineBuilder::new()
        .with_template_dir(&config.templates.dir)?
        .with_renderer(build_renderer(config)?)
        .with_pdf_options(config.pdf_options())
        .build()?;

    let pdf = pipeline.generate(request).await?;
    tokio::fs::write(out, &pdf).await?;
    tracing::info!(out = %out.display(), bytes = pdf.len(), "PDF written");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,memo_press=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
