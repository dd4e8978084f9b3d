//! CLI binary for docconv-upload.
//!
//! A thin shim over the library crate: paths play the role of the file
//! picker (or a dropped directory), `--to` is the format click, and the
//! upload is the form submission. Selection feedback and notices are drawn
//! by a [`SelectionObserver`] on stderr.

use anyhow::{Context, Result};
use clap::Parser;
use docconv_upload::theme::Palette;
use docconv_upload::{
    collect_candidates, download, download_batch, fetch_capabilities, format_file_size, submit,
    Notice, NoticeLevel, Outcome, Phase, Quality, SelectionObserver, SelectionView,
    SupportedFormat, Theme, UploadConfig, UploadCoordinator, DEFAULT_ENDPOINT,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── Terminal presenter ───────────────────────────────────────────────────────

/// Renders selection changes and notices to stderr using the theme palette.
///
/// File lines are printed only when the file list changes and the button
/// line only when its label changes, so re-renders stay quiet.
struct CliPresenter {
    palette: Palette,
    last: Mutex<Option<SelectionView>>,
}

impl CliPresenter {
    fn new(theme: Theme) -> Arc<Self> {
        Arc::new(Self {
            palette: theme.palette(),
            last: Mutex::new(None),
        })
    }

    fn bold(s: &str) -> String {
        format!("\x1b[1m{s}\x1b[0m")
    }
}

impl SelectionObserver for CliPresenter {
    fn on_selection_changed(&self, view: &SelectionView) {
        let p = &self.palette;
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let files_changed = last.as_ref().map(|l| &l.file_names) != Some(&view.file_names);
        let label_changed = last.as_ref().map(|l| &l.submit_label) != Some(&view.submit_label);

        if files_changed && !view.headline.is_empty() {
            eprintln!(
                "{} {}  {}",
                p.paint(p.accent, "◆"),
                Self::bold(&view.headline),
                p.paint(p.muted, &view.detail)
            );
            if !view.preview.is_empty() {
                eprintln!("  {}", p.paint(p.muted, &view.preview));
            }
        }
        if label_changed && view.phase != Phase::Empty {
            let colour = if view.can_submit { p.success } else { p.muted };
            eprintln!("  {} {}", p.paint(colour, "▸"), view.submit_label);
        }
        *last = Some(view.clone());
    }

    fn on_notice(&self, notice: &Notice) {
        let p = &self.palette;
        let (icon, colour) = match notice.level {
            NoticeLevel::Info => ("ℹ", p.accent),
            NoticeLevel::Warning => ("⚠", p.warning),
            NoticeLevel::Danger => ("✘", p.danger),
        };
        eprintln!("{} {}", p.paint(colour, icon), notice.message);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one document to PDF
  docconv report.docx --to pdf

  # Batch: several files, or a whole directory
  docconv a.odt b.rtf c.doc --to docx
  docconv ./inbox --to pdf --quality high

  # Save the converted result(s) locally
  docconv report.docx --to pdf -o ./converted

  # Check the selection without uploading
  docconv ./inbox --to pdf --dry-run --json

  # Ask the service what it supports
  docconv --check-formats

SUPPORTED FORMATS:
  odt ods odp odg odf pdf doc docx rtf xls xlsx csv ppt pptx txt html htm
  Files larger than 50 MB are skipped.

ENVIRONMENT VARIABLES:
  DOCCONV_ENDPOINT   Upload URL of the conversion service
  DOCCONV_THEME      Terminal palette: light or dark
  RUST_LOG           Override log filtering (tracing EnvFilter syntax)
"#;

/// Upload documents to a conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "docconv",
    version,
    about = "Validate and upload documents to a conversion service",
    long_about = "Select documents (files or a directory), validate them against the supported \
formats and the 50 MB limit, and upload them with the chosen target format to a document \
conversion service in a single multipart form POST.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files or directories to upload.
    #[arg(required_unless_present = "check_formats")]
    inputs: Vec<PathBuf>,

    /// Target format (pdf, docx, odt, ...).
    #[arg(short = 't', long = "to", env = "DOCCONV_TARGET",
          required_unless_present = "check_formats")]
    target: Option<SupportedFormat>,

    /// Upload endpoint of the conversion service.
    #[arg(long, env = "DOCCONV_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Conversion quality.
    #[arg(long, env = "DOCCONV_QUALITY", value_enum, default_value = "medium")]
    quality: QualityArg,

    /// Multipart field name for files.
    #[arg(long, env = "DOCCONV_FILES_FIELD", default_value = "file")]
    files_field: String,

    /// Multipart field name for the target format.
    #[arg(long, env = "DOCCONV_FORMAT_FIELD", default_value = "targetFormat")]
    format_field: String,

    /// Per-file size limit in MB (at most 50).
    #[arg(long, env = "DOCCONV_MAX_SIZE_MB", default_value_t = 50,
          value_parser = clap::value_parser!(u64).range(1..=50))]
    max_size_mb: u64,

    /// Request timeout in seconds (covers conversion time).
    #[arg(long, env = "DOCCONV_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Download converted results into this directory.
    #[arg(short, long = "download", env = "DOCCONV_DOWNLOAD_DIR")]
    output: Option<PathBuf>,

    /// Validate the selection and stop before uploading.
    #[arg(long)]
    dry_run: bool,

    /// Print the service's supported formats and exit.
    #[arg(long)]
    check_formats: bool,

    /// Output structured JSON instead of text.
    #[arg(long, env = "DOCCONV_JSON")]
    json: bool,

    /// Terminal palette.
    #[arg(long, env = "DOCCONV_THEME", value_enum, default_value = "light")]
    theme: ThemeArg,

    /// Disable the upload spinner.
    #[arg(long, env = "DOCCONV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCCONV_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum QualityArg {
    High,
    Medium,
    Low,
}

impl From<QualityArg> for Quality {
    fn from(v: QualityArg) -> Self {
        match v {
            QualityArg::High => Quality::High,
            QualityArg::Medium => Quality::Medium,
            QualityArg::Low => Quality::Low,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(v: ThemeArg) -> Self {
        match v {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The presenter and spinner cover normal feedback; library INFO logs
    // only show up when the spinner is off.
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

    let config = build_config(&cli)?;
    let theme: Theme = cli.theme.clone().into();
    let palette = theme.palette();

    // ── Capability query ─────────────────────────────────────────────────
    if cli.check_formats {
        let caps = fetch_capabilities(&config)
            .await
            .context("Failed to query supported formats")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&caps).context("Failed to serialise formats")?
            );
        } else {
            println!("Accepted inputs:  {}", caps.supported_formats.join(", "));
            println!("Targets:          {}", caps.conversion_formats.join(", "));
            if !caps.quality_settings.is_empty() {
                println!("Quality tuned:    {}", caps.quality_settings.join(", "));
            }
        }
        return Ok(());
    }

    let target = cli
        .target
        .context("A target format is required (--to <FORMAT>)")?;

    // ── Selection ────────────────────────────────────────────────────────
    let mut coordinator = UploadCoordinator::new(&config);
    if !cli.quiet && !cli.json {
        coordinator = coordinator.with_observer(CliPresenter::new(theme));
    }

    let candidates = collect_candidates(&cli.inputs).context("Failed to read inputs")?;
    coordinator
        .accept_candidates(candidates)
        .context("No files to upload")?;
    coordinator
        .select_format(target)
        .context("Failed to select target format")?;
    let submission = coordinator
        .begin_submission()
        .context("Submission refused")?;

    if cli.dry_run {
        let view = coordinator.view();
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&submission).context("Failed to serialise selection")?
            );
        } else if !cli.quiet {
            eprintln!(
                "{} dry run: {} file(s), {} → {}",
                palette.paint(palette.success, "✔"),
                view.file_names.len(),
                format_file_size(view.total_size),
                target.label()
            );
        }
        return Ok(());
    }

    // ── Upload ───────────────────────────────────────────────────────────
    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.set_message(format!(
            "{} file(s), {} → {}",
            submission.files.len(),
            format_file_size(submission.total_size()),
            target.label()
        ));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = submit(&submission, &config).await;
    coordinator.finish_submission();
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let receipt = result.context("Upload failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&receipt).context("Failed to serialise receipt")?
        );
    }

    match &receipt.outcome {
        Outcome::Preview { filename } => {
            if !cli.quiet && !cli.json {
                eprintln!(
                    "{} converted in {}ms  →  {}",
                    palette.paint(palette.success, "✔"),
                    receipt.elapsed_ms,
                    CliPresenter::bold(filename)
                );
            }
            if let Some(ref dir) = cli.output {
                let path = download(&config, filename, dir)
                    .await
                    .context("Failed to download converted file")?;
                if !cli.quiet && !cli.json {
                    eprintln!("   saved {}", palette.paint(palette.muted, &path.display().to_string()));
                }
            }
        }
        Outcome::BatchResults { batch_id, files } => {
            if !cli.quiet && !cli.json {
                eprintln!(
                    "{} batch {} finished in {}ms  ({} file(s) available)",
                    palette.paint(palette.success, "✔"),
                    CliPresenter::bold(batch_id),
                    receipt.elapsed_ms,
                    files.len()
                );
            }
            if let Some(ref dir) = cli.output {
                let path = download_batch(&config, batch_id, dir)
                    .await
                    .context("Failed to download batch archive")?;
                if !cli.quiet && !cli.json {
                    eprintln!("   saved {}", palette.paint(palette.muted, &path.display().to_string()));
                }
            }
        }
        Outcome::Returned { message } => {
            anyhow::bail!(
                "Conversion failed: {}",
                message.as_deref().unwrap_or("the service returned to the upload form")
            );
        }
    }

    Ok(())
}

/// Map CLI args to `UploadConfig`.
fn build_config(cli: &Cli) -> Result<UploadConfig> {
    UploadConfig::builder()
        .endpoint(cli.endpoint.clone())
        .quality(cli.quality.clone().into())
        .files_field(cli.files_field.clone())
        .format_field(cli.format_field.clone())
        .max_file_size(cli.max_size_mb * 1024 * 1024)
        .timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_target_case_insensitively() {
        let cli = Cli::try_parse_from(["docconv", "report.docx", "--to", "PDF"]).unwrap();
        assert_eq!(cli.target, Some(SupportedFormat::Pdf));
        assert_eq!(cli.inputs, [PathBuf::from("report.docx")]);
    }

    #[test]
    fn check_formats_needs_no_inputs() {
        let cli = Cli::try_parse_from(["docconv", "--check-formats"]).unwrap();
        assert!(cli.check_formats);
        assert!(cli.inputs.is_empty());
    }

    #[test]
    fn size_limit_above_fifty_is_refused() {
        let res = Cli::try_parse_from(["docconv", "a.pdf", "-t", "docx", "--max-size-mb", "60"]);
        assert!(res.is_err());
    }

    #[test]
    fn build_config_maps_flags() {
        let cli = Cli::try_parse_from([
            "docconv",
            "a.pdf",
            "-t",
            "docx",
            "--quality",
            "high",
            "--max-size-mb",
            "10",
            "--format-field",
            "target_format",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.quality, Quality::High);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.format_field, "target_format");
    }
}
