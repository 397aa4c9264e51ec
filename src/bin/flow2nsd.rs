//! CLI binary for flow2nsd.
//!
//! A thin shim over the library crate: maps CLI flags to `PipelineConfig`,
//! drives a `PipelineController` and prints what happened.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use flow2nsd::{
    ExportFormat, ExportOutcome, ExportTarget, Operation, PipelineConfig, PipelineController,
    PipelineObserver, PipelineStage, StructogramOutcome, SubmitOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
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

// ── Terminal feedback ────────────────────────────────────────────────────────

/// Spinner while a request is in flight, plus status lines that don't tear
/// the spinner. Doubles as the controller's observer.
struct Ui {
    show_progress: bool,
    quiet: bool,
    active: Mutex<Option<ProgressBar>>,
}

impl Ui {
    fn new(show_progress: bool, quiet: bool) -> Arc<Self> {
        Arc::new(Self {
            show_progress,
            quiet,
            active: Mutex::new(None),
        })
    }

    fn active(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Print a status line to stderr.
    fn line(&self, msg: String) {
        if self.quiet {
            return;
        }
        match self.active().as_ref() {
            Some(bar) => bar.println(msg),
            None => eprintln!("{msg}"),
        }
    }

    /// Await `fut` with a spinner labelled `msg`.
    async fn busy<F: Future>(&self, msg: &str, fut: F) -> F::Output {
        if self.show_progress {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
            );
            bar.set_message(msg.to_string());
            bar.enable_steady_tick(Duration::from_millis(80));
            *self.active() = Some(bar);
        }

        let out = fut.await;

        if let Some(bar) = self.active().take() {
            bar.finish_and_clear();
        }
        out
    }
}

impl PipelineObserver for Ui {
    fn on_stage_change(&self, from: PipelineStage, to: PipelineStage) {
        self.line(dim(&format!("  stage {from} → {to}")));
    }

    fn on_stale_result(&self, operation: Operation) {
        self.line(yellow(&format!("  discarded stale {operation:?} result")));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render a diagram text file, print the flowchart SVG to stdout
  flow2nsd flow.mmd > flowchart.svg

  # Translate Python, build the structogram, save both SVGs
  flow2nsd script.py --structogram --export flowchart-svg,structogram-svg -o out/

  # Arduino sketch against a remote converter, JSON snapshot on stdout
  flow2nsd --server http://converter:5000 sketch.ino --json

  # Interactive session
  flow2nsd --interactive

INTERACTIVE COMMANDS:
  open <path>     submit a file (.py, .ino, anything else = diagram text)
  nsd             convert the loaded diagram text to a structogram
  export <what>   flowchart-svg | flowchart-mmd | structogram-svg
  status          show the current stage and cached artifacts
  reset           drop everything and return to idle
  quit            leave

ENVIRONMENT VARIABLES:
  FLOW2NSD_SERVER     Converter base URL
  FLOW2NSD_TIMEOUT    Per-request timeout in seconds
  FLOW2NSD_OUT_DIR    Export directory
  RUST_LOG            Overrides -v / -q log filtering
"#;

/// Convert Python, Arduino and diagram text files to flowcharts and structograms.
#[derive(Parser, Debug)]
#[command(
    name = "flow2nsd",
    version,
    about = "Convert Python, Arduino and diagram text files to flowcharts and structograms",
    long_about = "Classifies the input by extension, translates .py and .ino files into diagram \
text through a converter server, renders a flowchart SVG locally and optionally asks the server \
for a Nassi–Shneiderman structogram.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File to convert (.py, .ino, or diagram text).
    #[arg(required_unless_present = "interactive")]
    input: Option<PathBuf>,

    /// Read commands from stdin instead of converting a single file.
    #[arg(short, long, conflicts_with = "input")]
    interactive: bool,

    /// Also convert the diagram text into a structogram.
    #[arg(short, long, env = "FLOW2NSD_STRUCTOGRAM")]
    structogram: bool,

    /// Artifacts to save, comma separated.
    #[arg(short, long, value_enum, value_delimiter = ',')]
    export: Vec<ExportArg>,

    /// Directory exports are written to.
    #[arg(short, long = "out-dir", env = "FLOW2NSD_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Converter server base URL.
    #[arg(long, env = "FLOW2NSD_SERVER", default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "FLOW2NSD_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Print the final pipeline snapshot as JSON on stdout.
    #[arg(long, env = "FLOW2NSD_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FLOW2NSD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FLOW2NSD_QUIET")]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportArg {
    FlowchartSvg,
    FlowchartMmd,
    StructogramSvg,
}

impl ExportArg {
    fn request(self) -> (ExportTarget, ExportFormat) {
        match self {
            ExportArg::FlowchartSvg => (ExportTarget::Primary, ExportFormat::Vector),
            ExportArg::FlowchartMmd => (ExportTarget::Primary, ExportFormat::DiagramText),
            ExportArg::StructogramSvg => (ExportTarget::Secondary, ExportFormat::Vector),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and status lines cover INFO; library logs only show up
    // with -v or RUST_LOG.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let show_progress = !cli.quiet && !cli.json && !cli.verbose;
    let ui = Ui::new(show_progress, cli.quiet);

    // ── Build controller ─────────────────────────────────────────────────
    let config = PipelineConfig::builder()
        .base_url(&cli.server)
        .request_timeout_secs(cli.timeout)
        .output_dir(&cli.out_dir)
        .build()
        .context("Invalid configuration")?;
    let pipeline = PipelineController::new(config)
        .context("Failed to set up the converter client")?
        .with_observer(ui.clone());

    if cli.interactive {
        return interactive(&pipeline, &ui).await;
    }

    // ── One-shot ─────────────────────────────────────────────────────────
    let Some(input) = cli.input.as_ref() else {
        bail!("no input file given");
    };

    submit(&pipeline, &ui, input).await?;

    if cli.structogram {
        structogram(&pipeline, &ui).await?;
    }

    for what in &cli.export {
        export(&pipeline, &ui, *what).await?;
    }

    let snapshot = pipeline.snapshot();
    if cli.json {
        let json =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialise snapshot")?;
        println!("{json}");
    } else if cli.export.is_empty() {
        // Nothing saved: print the most advanced artifact.
        let markup = snapshot
            .structogram
            .as_ref()
            .or(snapshot.flowchart.as_ref())
            .map(|a| a.markup());
        if let Some(markup) = markup {
            println!("{markup}");
        }
    }

    Ok(())
}

// ── Commands ─────────────────────────────────────────────────────────────────

async fn submit(pipeline: &PipelineController, ui: &Ui, path: &Path) -> Result<()> {
    let label = format!("Converting {}…", path.display());
    let outcome = ui
        .busy(&label, pipeline.submit_path(path))
        .await
        .with_context(|| format!("Failed to convert {}", path.display()))?;

    match outcome {
        SubmitOutcome::Rendered { kind, flowchart } => ui.line(format!(
            "{} flowchart rendered from {} {}",
            green("✔"),
            kind,
            dim(&format!("({} bytes)", flowchart.markup().len()))
        )),
        SubmitOutcome::RenderFailed { error, .. } => {
            ui.line(format!("{} {}", red("✗"), error));
            for line in error.source_text.lines() {
                ui.line(dim(&format!("  │ {line}")));
            }
        }
        SubmitOutcome::Superseded => {}
    }
    Ok(())
}

async fn structogram(pipeline: &PipelineController, ui: &Ui) -> Result<()> {
    let outcome = ui
        .busy("Building structogram…", pipeline.convert_to_structogram())
        .await
        .context("Structogram conversion failed")?;

    match outcome {
        StructogramOutcome::Rendered(svg) => ui.line(format!(
            "{} structogram ready {}",
            green("✔"),
            dim(&format!("({} bytes)", svg.markup().len()))
        )),
        StructogramOutcome::NothingToConvert(guard) => {
            ui.line(format!("{} nothing to convert: {}", yellow("⚠"), guard))
        }
        StructogramOutcome::Superseded => {}
    }
    Ok(())
}

async fn export(pipeline: &PipelineController, ui: &Ui, what: ExportArg) -> Result<()> {
    let (target, format) = what.request();
    match pipeline.export(target, format).await? {
        ExportOutcome::Saved(file) => ui.line(format!(
            "{} {}  {}",
            green("→"),
            bold(&file.path.display().to_string()),
            dim(&file.mime_type)
        )),
        ExportOutcome::Skipped(guard) => ui.line(format!(
            "{} skipped {:?}: {}",
            yellow("⚠"),
            what,
            guard
        )),
    }
    Ok(())
}

fn status(pipeline: &PipelineController) {
    let snap = pipeline.snapshot();
    println!("stage:        {}", snap.stage);
    if !snap.stage.has_source() {
        println!("{}", dim("nothing loaded; use `open <path>` or pass a file"));
        return;
    }
    if let Some(name) = &snap.file_name {
        println!("file:         {name}");
    }
    if let Some(kind) = snap.source_kind {
        println!("kind:         {kind}");
    }
    if let Some(src) = &snap.diagram_source {
        println!("diagram:      {} bytes", src.as_str().len());
    }
    if let Some(svg) = &snap.flowchart {
        println!("flowchart:    {} bytes", svg.markup().len());
    }
    if let Some(svg) = &snap.structogram {
        println!("structogram:  {} bytes", svg.markup().len());
    }
    if let Some(e) = &snap.render_error {
        println!("render error: {e}");
    }
    if let Some(e) = &snap.structogram_error {
        println!("nsd error:    {e}");
    }
}

/// Line-oriented session on stdin. Command failures are printed and the
/// session continues.
async fn interactive(pipeline: &PipelineController, ui: &Ui) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    ui.line(dim("commands: open <path>, nsd, export <what>, status, reset, quit"));

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        let (cmd, arg) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        let result = match cmd {
            "" => Ok(()),
            "open" if arg.is_empty() => Err(anyhow::anyhow!("usage: open <path>")),
            "open" => submit(pipeline, ui, Path::new(arg)).await,
            "nsd" => structogram(pipeline, ui).await,
            "export" => match ExportArg::from_str(arg, true) {
                Ok(what) => export(pipeline, ui, what).await,
                Err(_) => Err(anyhow::anyhow!(
                    "usage: export <flowchart-svg|flowchart-mmd|structogram-svg>"
                )),
            },
            "status" => {
                status(pipeline);
                Ok(())
            }
            "reset" => {
                pipeline.reset();
                Ok(())
            }
            "quit" | "exit" => break,
            other => Err(anyhow::anyhow!("unknown command: {other}")),
        };

        if let Err(e) = result {
            eprintln!("{} {:#}", red("error:"), e);
        }
    }
    Ok(())
}
