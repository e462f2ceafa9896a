//! CLI binary for edgequake-docsum.
//!
//! Maps CLI flags to `SummaryConfig`, drives one [`Session`] and prints the
//! summary as styled blocks, raw markdown or JSON.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_docsum::display::{render_summary, DisplayMode};
use edgequake_docsum::pipeline::input::resolve_inputs;
use edgequake_docsum::{
    ProgressCallback, ProgressStatus, RasterizationWarning, Session, SessionState, SummaryConfig,
    SummaryOutput, SummaryProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner showing the pipeline's current status line.
///
/// A fresh spinner is started on every `Preparing` status, so one callback
/// serves every summarize action of an interactive session.
struct SpinnerCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn start(&self) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Summarizing");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    /// Clear the spinner; called after every summarize action, success or not.
    fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl SummaryProgressCallback for SpinnerCallback {
    fn on_status(&self, status: &ProgressStatus) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        if matches!(status, ProgressStatus::Preparing) {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
        }
        let bar = guard.get_or_insert_with(|| self.start());
        bar.set_message(status.to_string());
    }

    fn on_page_skipped(&self, warning: &RasterizationWarning) {
        let line = format!("  {} {}", yellow("⚠"), warning);
        match self.bar.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(bar) => bar.println(line),
                None => eprintln!("{line}"),
            },
            Err(_) => eprintln!("{line}"),
        }
    }

    fn on_complete(&self, pages: usize, summary_len: usize) {
        self.finish();
        eprintln!(
            "{} Summarized {} page(s)  {}",
            green("✔"),
            bold(&pages.to_string()),
            dim(&format!("{summary_len} chars"))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a PDF
  docsum report.pdf

  # Several files, summarized together in the given order
  docsum slides.pdf chart.png scan.jpg

  # A PDF from the web
  docsum https://arxiv.org/pdf/1706.03762

  # Raw markdown for piping, or JSON with blocks and stats
  docsum --raw report.pdf > summary.md
  docsum --json report.pdf > summary.json

  # Keep going: summarize another selection after the first
  docsum --interactive report.pdf

ACCEPTED FILES:
  .pdf  .png  .jpg  .jpeg  .webp      anything else is ignored

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          API key (GOOGLE_API_KEY also works; --api-key-env names another)
  DOCSUM_MODEL            Model ID (default: gemini-2.5-flash)
  DOCSUM_PROVIDER         edgequake-llm provider name (default: gemini)
  PDFIUM_LIB_PATH         libpdfium file or directory; otherwise the system library
  RUST_LOG                Log filter, overrides -v / -q
"#;

/// Summarize PDFs and images with a multimodal language model.
#[derive(Parser, Debug)]
#[command(
    name = "docsum",
    version,
    about = "Summarize PDFs and images with a multimodal language model",
    long_about = "Render every page of the given PDFs and images, send them in one request \
to a multimodal model together with a fixed analyst prompt, and print the returned summary.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local files or HTTP/HTTPS URLs, in the order they should be read.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Model ID.
    #[arg(long, env = "DOCSUM_MODEL", default_value = edgequake_docsum::config::DEFAULT_MODEL)]
    model: String,

    /// edgequake-llm provider name.
    #[arg(long, env = "DOCSUM_PROVIDER", default_value = edgequake_docsum::config::DEFAULT_PROVIDER)]
    provider: String,

    /// Environment variable holding the API key.
    #[arg(long, env = "DOCSUM_API_KEY_ENV", default_value = edgequake_docsum::config::DEFAULT_API_KEY_ENV)]
    api_key_env: String,

    /// PDF render scale relative to the page's natural size (0.25–4.0).
    #[arg(long, env = "DOCSUM_SCALE", default_value_t = edgequake_docsum::config::DEFAULT_RENDER_SCALE)]
    scale: f32,

    /// JPEG quality for rendered PDF pages (1–100).
    #[arg(long, env = "DOCSUM_JPEG_QUALITY", default_value_t = edgequake_docsum::config::DEFAULT_JPEG_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Longest edge of a rendered PDF page in pixels; larger pages are scaled down.
    #[arg(long, env = "DOCSUM_MAX_PIXELS", default_value_t = edgequake_docsum::config::DEFAULT_MAX_RENDERED_PIXELS,
          value_parser = clap::value_parser!(u32).range(100..))]
    max_pixels: u32,

    /// Path to a text file replacing the built-in instruction prompt.
    #[arg(long, env = "DOCSUM_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Sampling temperature (0.0–2.0). Provider default if unset.
    #[arg(long, env = "DOCSUM_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max output tokens. Provider default if unset.
    #[arg(long, env = "DOCSUM_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCSUM_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the model's markdown verbatim.
    #[arg(long, conflicts_with = "json")]
    raw: bool,

    /// Print the full output (markdown, blocks, warnings, stats) as JSON.
    #[arg(long, env = "DOCSUM_JSON")]
    json: bool,

    /// Disable ANSI styling of the summary. `NO_COLOR` is honoured too.
    #[arg(long, env = "DOCSUM_NO_COLOR")]
    no_color: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOCSUM_NO_PROGRESS")]
    no_progress: bool,

    /// After each summary, offer to summarize another selection.
    #[arg(short, long)]
    interactive: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the summary.
    #[arg(short, long, env = "DOCSUM_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep INFO logs out of the way while the spinner is drawn.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and session ─────────────────────────────────────────
    let spinner = show_progress.then(SpinnerCallback::new);
    let progress_cb = spinner
        .clone()
        .map(|cb| cb as Arc<dyn SummaryProgressCallback>);

    let config = build_config(&cli, progress_cb).await?;
    // The credential is checked here, before any input is touched.
    let mut session = Session::new(config).context("Failed to start session")?;

    let mut inputs = cli.inputs.clone();
    loop {
        let files = resolve_inputs(&inputs, cli.download_timeout)
            .await
            .context("Failed to resolve inputs");

        let outcome = match files {
            Ok(files) => {
                session.select(files);
                session.summarize().await;
                if let Some(ref s) = spinner {
                    s.finish();
                }
                print_state(&cli, session.state())
            }
            Err(e) => Err(e),
        };

        if !cli.interactive {
            return outcome;
        }
        if let Err(e) = outcome {
            eprintln!("{} {:#}", red("✘"), e);
        }

        match prompt_next()? {
            Some(next) => {
                session.reset();
                inputs = next;
            }
            None => return Ok(()),
        }
    }
}

/// Print the outcome of one summarize action.
fn print_state(cli: &Cli, state: &SessionState) -> Result<()> {
    match state {
        SessionState::Summarized { output, .. } => print_output(cli, output),
        SessionState::Idle {
            error: Some(msg), ..
        } => anyhow::bail!("{msg}"),
        SessionState::Idle { .. } | SessionState::Busy { .. } => {
            anyhow::bail!("Summary did not complete")
        }
    }
}

fn print_output(cli: &Cli, output: &SummaryOutput) -> Result<()> {
    if !cli.quiet && !cli.json {
        for w in &output.warnings {
            eprintln!("{} {}", yellow("⚠"), w);
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if cli.json {
        let json = serde_json::to_string_pretty(output).context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else if cli.raw {
        handle
            .write_all(output.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    } else {
        let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();
        let mode = if no_color || !io::stdout().is_terminal() {
            DisplayMode::Plain
        } else {
            DisplayMode::Styled
        };
        handle
            .write_all(render_summary(&output.blocks, mode).as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {} pages  ·  {} tokens in  /  {} tokens out  ·  {}ms total",
            output.stats.pages,
            dim(&output.stats.input_tokens.to_string()),
            dim(&output.stats.output_tokens.to_string()),
            output.stats.total_duration_ms,
        );
    }
    Ok(())
}

/// Ask for the next selection. `None` means the user is done.
fn prompt_next() -> Result<Option<Vec<String>>> {
    eprint!(
        "\n{} ",
        bold("Summarize another? Enter files or URLs (blank to quit):")
    );
    io::stderr().flush().ok();

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    let inputs = parse_selection(&line);
    if read == 0 || inputs.is_empty() {
        return Ok(None);
    }
    Ok(Some(inputs))
}

/// Split a typed selection on whitespace.
fn parse_selection(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Map CLI args to `SummaryConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .model(&cli.model)
        .provider_name(&cli.provider)
        .api_key_env(&cli.api_key_env)
        .render_scale(cli.scale)
        .jpeg_quality(cli.jpeg_quality)
        .max_rendered_pixels(cli.max_pixels)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
