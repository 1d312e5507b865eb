//! CLI binary for mhb2svg.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mhb2svg::{
    convert, inspect, ArchiveSource, ConversionConfig, ConversionOutput,
    ConversionProgressCallback, MetadataEntry, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal reporter: prints the archive metadata as soon as it is read and,
/// unless disabled, drives a spinner while the archive is fetched and a bar
/// with one log line per converted slide.
struct CliProgressCallback {
    bar: Option<ProgressBar>,
}

impl CliProgressCallback {
    fn new(show_bar: bool) -> Arc<Self> {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(0); // length set in on_conversion_start

            let spinner_style =
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(TICKS);

            bar.set_style(spinner_style);
            bar.set_prefix("Preparing");
            bar.set_message("Fetching archive…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });

        Arc::new(Self { bar })
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    fn activate_bar(bar: &ProgressBar, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_length(total as u64);
        bar.set_style(progress_style);
        bar.set_prefix("Rendering");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_metadata(&self, archive_name: &str, metadata: &[MetadataEntry]) {
        self.println(format!("Metadata of {archive_name}:"));
        for entry in metadata {
            self.println(format!("\t{entry}"));
        }
    }

    fn on_conversion_start(&self, total_slides: usize) {
        let Some(bar) = &self.bar else { return };
        Self::activate_bar(bar, total_slides);
        bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_slides} slides…"))
        ));
    }

    fn on_slide_start(&self, _index: usize, _total: usize, stem: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("slide {stem}"));
        }
    }

    fn on_slide_complete(&self, index: usize, total: usize, stem: &str, files: usize) {
        let Some(bar) = &self.bar else { return };
        bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            index,
            total,
            stem,
            dim(&format!("{files} file(s)")),
        ));
        bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_slides: usize) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a local archive (monochrome, one SVG per slide)
  mhb2svg -f meeting.mhb

  # Convert a share link, in colour, split into A-series pages
  mhb2svg -c -p -l 'https://example.com/share?s_id=abc123'

  # Thicker strokes, tighter margin, write into ./out
  mhb2svg -f meeting.mhb --stroke-ratio 1.5 --padding 4 -o out

  # Print archive metadata only
  mhb2svg --inspect-only -f meeting.mhb

OUTPUT:
  <slide>.svg          one file per slide
  <slide>-<n>.svg      one file per page when --paging splits a tall slide
"#;

/// Convert MAXHUB whiteboard archives to SVG.
#[derive(Parser, Debug)]
#[command(
    name = "mhb2svg",
    version,
    about = "Convert MAXHUB whiteboard archives (.mhb files or share links) to SVG",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Enable colour (default black & white).
    #[arg(short, long, env = "MHB2SVG_COLOR")]
    color: bool,

    /// Enable paging (default none).
    #[arg(short, long, env = "MHB2SVG_PAGING")]
    paging: bool,

    /// Margin around the drawing, in drawing units.
    #[arg(long, env = "MHB2SVG_PADDING", default_value_t = 10.0)]
    padding: f64,

    /// Multiplier applied to every stroke thickness.
    #[arg(long, env = "MHB2SVG_STROKE_RATIO", default_value_t = 1.0)]
    stroke_ratio: f64,

    /// Page height / width used by --paging.
    #[arg(long, env = "MHB2SVG_ASPECT_RATIO", default_value_t = std::f64::consts::SQRT_2)]
    aspect_ratio: f64,

    /// Directory the SVG files are written to.
    #[arg(short, long, env = "MHB2SVG_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// HTTP timeout for share-link lookups and downloads, in seconds.
    #[arg(long, env = "MHB2SVG_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print archive metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of the text summary.
    #[arg(long, env = "MHB2SVG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MHB2SVG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MHB2SVG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MHB2SVG_QUIET")]
    quiet: bool,
}

/// Exactly one archive source is required.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Path to .mhb file.
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// MAXHUB URL containing the s_id argument.
    #[arg(short, long, value_name = "URL")]
    link: Option<String>,
}

impl SourceArgs {
    fn to_source(&self) -> Result<ArchiveSource> {
        match (&self.file, &self.link) {
            (Some(path), None) => Ok(ArchiveSource::File(path.clone())),
            (None, Some(link)) => Ok(ArchiveSource::Link(link.clone())),
            _ => anyhow::bail!("Exactly one of --file or --link is required"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs are hidden while the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    let source = cli.source.to_source()?;

    // Metadata is printed by the callback, ahead of slide conversion.
    let progress_cb: Option<ProgressCallback> = if !cli.quiet && !cli.json {
        Some(CliProgressCallback::new(show_progress) as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let metadata = inspect(&source, &config)
            .await
            .context("Failed to inspect archive")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?
            );
        } else {
            print_metadata(&source.to_string(), &metadata);
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&source, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        print_summary(&output);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .color(cli.color)
        .paging(cli.paging)
        .padding(cli.padding)
        .stroke_ratio(cli.stroke_ratio)
        .aspect_ratio(cli.aspect_ratio)
        .output_dir(&cli.output_dir)
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_metadata(archive_name: &str, metadata: &[MetadataEntry]) {
    println!("Metadata of {archive_name}:");
    for entry in metadata {
        println!("\t{entry}");
    }
}

fn print_summary(output: &ConversionOutput) {
    for warning in &output.warnings {
        eprintln!("{} {}", yellow("⚠"), warning);
    }

    if output.slides.is_empty() {
        eprintln!("{} No SVG files generated", yellow("⚠"));
        return;
    }

    let labels: Vec<String> = output.slides.iter().map(|s| s.label()).collect();
    println!("Generated {}", labels.join(", "));
    eprintln!(
        "{}  {} slides  {} files  {}ms",
        green("✔"),
        output.stats.total_slides,
        output.stats.generated_files,
        output.stats.total_duration_ms,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn file_and_link_are_exclusive() {
        let res = Cli::try_parse_from(["mhb2svg", "-f", "a.mhb", "-l", "https://x/?s_id=1"]);
        assert!(res.is_err());
    }

    #[test]
    fn source_is_required() {
        assert!(Cli::try_parse_from(["mhb2svg", "-c"]).is_err());
    }

    #[test]
    fn flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "mhb2svg", "-l", "https://x/?s_id=1", "-c", "-p", "--padding", "5", "--stroke-ratio",
            "2",
        ])
        .unwrap();
        assert_eq!(
            cli.source.to_source().unwrap(),
            ArchiveSource::Link("https://x/?s_id=1".into())
        );
        let config = build_config(&cli, None).unwrap();
        assert!(config.color && config.paging);
        assert_eq!(config.padding, 5.0);
        assert_eq!(config.stroke_ratio, 2.0);
    }

    #[test]
    fn reporter_without_bar_is_quiet_on_slide_events() {
        let cb = CliProgressCallback::new(false);
        cb.on_conversion_start(2);
        cb.on_slide_start(1, 2, "1");
        cb.on_slide_complete(1, 2, "1", 1);
        cb.on_conversion_complete(2);
        assert!(cb.bar.is_none());
    }

    #[test]
    fn negative_padding_is_rejected() {
        let cli = Cli::try_parse_from(["mhb2svg", "-f", "a.mhb", "--padding=-3"]).unwrap();
        assert!(build_config(&cli, None).is_err());
    }
}
