// src/render/chromium.rs
use async_trait::async_trait;
use memo_traits::{PdfOptions, PdfRenderer, RenderError};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::process::{Child, Command};

/// Executable names tried, in order, when no path is configured.
pub const CANDIDATE_PROGRAMS: [&str; 5] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(150);

const INPUT_FILE: &str = "document.html";
const OUTPUT_FILE: &str = "document.pdf";
const STDERR_FILE: &str = "engine.log";
const STDERR_TAIL: usize = 2048;

/// Renders by running a headless Chromium once per document.
///
/// Each call gets a private scratch directory holding the input document,
/// the browser profile and the output PDF. The directory and the browser
/// process are released when the call returns, whatever the outcome.
///
/// The page is loaded from a `file://` URL with scripts enabled, and memo
/// fields reach it unescaped. Submitted text is trusted; sanitize upstream
/// if it may be hostile.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    program: PathBuf,
    timeout: Duration,
    settle: Duration,
    no_sandbox: bool,
    extra_args: Vec<String>,
    work_root: Option<PathBuf>,
}

impl ChromiumRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
            settle: DEFAULT_SETTLE,
            no_sandbox: false,
            extra_args: Vec::new(),
            work_root: None,
        }
    }

    /// Looks for a Chromium-family browser on `PATH`.
    pub fn discover() -> Option<PathBuf> {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path).find_map(|dir| {
            CANDIDATE_PROGRAMS
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }

    /// Upper bound on a whole render, from staging the document to reading
    /// the PDF back.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long the page may run scripts and load resources before printing.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Disables the browser sandbox. Needed in most containers.
    pub fn with_no_sandbox(mut self, no_sandbox: bool) -> Self {
        self.no_sandbox = no_sandbox;
        self
    }

    /// Arguments placed before the standard ones.
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Directory under which per-render scratch directories are created.
    /// Defaults to the system temp dir.
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("memo-render-");
        match &self.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    fn command(&self, workdir: &Path, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.extra_args)
            .arg("--headless")
            .arg("--disable-gpu");
        if self.no_sandbox {
            cmd.arg("--no-sandbox").arg("--disable-setuid-sandbox");
        }
        cmd.arg("--no-pdf-header-footer")
            .arg("--print-to-pdf-no-header")
            .arg("--hide-scrollbars")
            .arg("--no-first-run")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .arg("--run-all-compositor-stages-before-draw")
            .arg(format!("--user-data-dir={}", workdir.join("profile").display()))
            .arg(format!("--virtual-time-budget={}", self.settle.as_millis()))
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(file_url(input));
        cmd
    }
}

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render_to_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let started = Instant::now();

        // Dropping the run on expiry drops its lease, which kills the engine.
        let pdf = match tokio::time::timeout(self.timeout, self.run_engine(html, options)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "Rendering engine timed out");
                return Err(RenderError::Timeout(self.timeout));
            }
        };

        tracing::debug!(
            pdf_bytes = pdf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rendering engine finished"
        );
        Ok(pdf)
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

impl ChromiumRenderer {
    /// One unbounded engine run: stage the document, launch, wait, collect.
    async fn run_engine(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let workdir = self.scratch_dir()?;
        let input = workdir.path().join(INPUT_FILE);
        let output = workdir.path().join(OUTPUT_FILE);
        let stderr_path = workdir.path().join(STDERR_FILE);

        tokio::fs::write(&input, inject_print_defaults(html, options)).await?;
        let stderr = std::fs::File::create(&stderr_path)?;

        let mut cmd = self.command(workdir.path(), &input, &output);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true);
        // Own process group, so the browser's helpers can be killed with it
        #[cfg(unix)]
        cmd.process_group(0);

        tracing::debug!(program = %self.program.display(), "Launching rendering engine");
        let child = cmd.spawn().map_err(|e| RenderError::Launch {
            program: self.program.display().to_string(),
            message: e.to_string(),
        })?;
        let mut lease = EngineLease::new(workdir, child);

        let status = lease.wait().await?;
        if !status.success() {
            let stderr = read_tail(&stderr_path, STDERR_TAIL).await;
            return Err(RenderError::EngineFailed {
                status: status.to_string(),
                stderr,
            });
        }

        let pdf = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::MalformedOutput("engine wrote no output file".into()));
            }
            Err(e) => return Err(e.into()),
        };
        if pdf.is_empty() {
            return Err(RenderError::MalformedOutput("output file is empty".into()));
        }
        if !pdf.starts_with(b"%PDF-") {
            return Err(RenderError::MalformedOutput("output is not a PDF document".into()));
        }
        Ok(pdf)
    }
}

/// A running engine, its process group and its scratch directory. Dropping
/// the lease kills the whole group and removes the directory.
struct EngineLease {
    child: Option<Child>,
    process_group: Option<i32>,
    // Declared last so the processes go before their working files.
    workdir: TempDir,
}

impl EngineLease {
    fn new(workdir: TempDir, child: Child) -> Self {
        let process_group = child
            .id()
            .and_then(|pid| i32::try_from(pid).ok())
            .filter(|pid| *pid > 0);
        Self {
            child: Some(child),
            process_group,
            workdir,
        }
    }

    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let Some(child) = self.child.as_mut() else {
            return Err(std::io::Error::other("rendering engine already reaped"));
        };
        let status = child.wait().await?;
        self.child = None;
        Ok(status)
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        // Helpers can outlive the main process even after a clean exit.
        if let Some(pgid) = self.process_group {
            kill_process_group(pgid);
        }
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        tracing::trace!(workdir = %self.workdir.path().display(), "Releasing render workdir");
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: i32) {
    // SAFETY: killpg takes no pointers. A group with no members left gives ESRCH.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
        tracing::trace!(pgid, "Killed rendering engine process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: i32) {}

async fn read_tail(path: &Path, max: usize) -> String {
    let Ok(bytes) = tokio::fs::read(path).await else {
        return String::new();
    };
    let start = bytes.len().saturating_sub(max);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

fn file_url(path: &Path) -> String {
    let mut url = String::from("file://");
    for byte in path.to_string_lossy().bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'/' | b'-' | b'_' | b'.' | b'~' => {
                url.push(byte as char)
            }
            // Windows separators and drive letters
            b'\\' => url.push('/'),
            b':' => url.push(':'),
            other => {
                let _ = write!(url, "%{other:02X}");
            }
        }
    }
    url
}

/// Puts the paper size, margins and background policy into the document as
/// an `@page` rule, since a command-line print has no other way to set them.
///
/// When `prefer_css_page_size` is set the rule goes first in `<head>`, so any
/// `@page` rule the document declares itself wins. Otherwise it is marked
/// `!important`.
pub fn inject_print_defaults(html: &str, options: &PdfOptions) -> String {
    let priority = if options.prefer_css_page_size { "" } else { " !important" };
    let m = &options.margins;
    let mut style = format!(
        "<style data-memo-press>@page {{ size: {size}{priority}; margin: {}mm {}mm {}mm {}mm{priority}; }}",
        m.top,
        m.right,
        m.bottom,
        m.left,
        size = options.format.css_name(),
    );
    if options.print_background {
        style.push_str(" html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }");
    }
    style.push_str("</style>");

    let lower = html.to_ascii_lowercase();
    let at = tag_end(&lower, "<head").or_else(|| tag_end(&lower, "<html")).unwrap_or(0);

    let mut out = String::with_capacity(html.len() + style.len());
    out.push_str(&html[..at]);
    out.push_str(&style);
    out.push_str(&html[at..]);
    out
}

/// Byte offset just past the `>` of the first opening `tag`, skipping longer
/// names that share the prefix (`<header` for `<head`).
fn tag_end(lower: &str, tag: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = lower[from..].find(tag) {
        let after = from + pos + tag.len();
        match lower.as_bytes().get(after) {
            Some(b'>') => return Some(after + 1),
            Some(c) if c.is_ascii_whitespace() || *c == b'/' => {
                return lower[after..].find('>').map(|end| after + end + 1);
            }
            Some(_) => from = after,
            None => return None,
        }
    }
    None
}
