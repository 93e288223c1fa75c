//! # CLI Module
//!
//! Command-line interface for the ingest core.
//!
//! ## Usage
//! ```bash
//! # Wait for memory cards and list what's on them
//! photo-ingest watch
//!
//! # Copy a card into a project
//! photo-ingest import-card /media/alice/EOS_DIGITAL/DCIM --project ~/Projects/2024_05_01_Wedding
//!
//! # Resolve displayable previews for RAW files
//! photo-ingest thumbnail ~/Projects/2024_05_01_Wedding/RAW/*.CR2
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_ingest::core::preview::EmbeddedJpegExtractor;
use photo_ingest::core::thumbnail::ThumbnailCache;
use photo_ingest::core::transfer::{prepare_destination, TransferEngine, TransferReport};
use photo_ingest::core::volume::{scan_media_dir, MonitorConfig, VolumeMonitor};
use photo_ingest::error::{IngestError, Result};
use photo_ingest::events::{Event, EventChannel, EventReceiver, TransferEvent, VolumeEvent};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Photo Ingest - get photos off memory cards and preview RAW files
#[derive(Parser, Debug)]
#[command(name = "photo-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the embedded JPEG preview of a RAW file
    Preview {
        /// RAW file
        raw: PathBuf,

        /// Where to write the preview (default: <raw>.preview.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a displayable path for each file, caching RAW previews
    Thumbnail {
        /// Media files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Thumbnail cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Show how much the thumbnail cache holds
    CacheStats {
        /// Thumbnail cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// List the media files under a card's DCIM directory
    Scan {
        /// DCIM directory
        dcim: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Copy files into a project's RAW/ and JPG/ folders
    Import {
        /// Files to copy
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Project directory
        #[arg(short, long)]
        project: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Copy everything under a card's DCIM directory into a project
    ImportCard {
        /// DCIM directory
        dcim: PathBuf,

        /// Project directory
        #[arg(short, long)]
        project: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Watch for memory cards until Enter is pressed
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "2000")]
        interval_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    photo_ingest::init_tracing(if cli.verbose { "debug" } else { "warn" });

    match cli.command {
        Commands::Preview { raw, output } => run_preview(&raw, output),
        Commands::Thumbnail { paths, cache_dir } => run_thumbnail(&paths, cache_dir),
        Commands::CacheStats { cache_dir } => run_cache_stats(cache_dir),
        Commands::Scan { dcim, output } => run_scan(&dcim, output),
        Commands::Import {
            files,
            project,
            output,
        } => run_import(&project, output, |engine, sender| {
            engine.transfer(&files, &project, sender)
        }),
        Commands::ImportCard {
            dcim,
            project,
            output,
        } => run_import(&project, output, |engine, sender| {
            engine.import_from_card(&dcim, &project, sender)
        }),
        Commands::Watch { interval_ms } => run_watch(Duration::from_millis(interval_ms)),
    }
}

fn thumbnail_cache(cache_dir: Option<PathBuf>) -> ThumbnailCache {
    match cache_dir {
        Some(dir) => ThumbnailCache::with_root(dir),
        None => ThumbnailCache::new(),
    }
}

fn run_preview(raw: &Path, output: Option<PathBuf>) -> Result<()> {
    let bytes = EmbeddedJpegExtractor.try_extract(raw)?;
    let output = output.unwrap_or_else(|| raw.with_extension("preview.jpg"));

    std::fs::write(&output, &bytes).map_err(|e| IngestError::Destination {
        path: output.clone(),
        source: e,
    })?;

    println!(
        "{} {} ({})",
        style("✓").green().bold(),
        output.display(),
        format_bytes(bytes.len() as u64)
    );
    Ok(())
}

fn run_thumbnail(paths: &[PathBuf], cache_dir: Option<PathBuf>) -> Result<()> {
    let cache = thumbnail_cache(cache_dir);

    for (path, resolved) in paths.iter().zip(cache.display_paths(paths)) {
        match resolved {
            Some(display) => println!("{}\t{}", path.display(), display.display()),
            None => println!("{}\t{}", path.display(), style("-").dim()),
        }
    }
    Ok(())
}

fn run_cache_stats(cache_dir: Option<PathBuf>) -> Result<()> {
    let stats = thumbnail_cache(cache_dir).stats()?;

    println!("{}", style(stats.root.display()).bold());
    println!(
        "  {} previews, {}",
        style(stats.total_entries).cyan(),
        style(format_bytes(stats.total_size_bytes)).yellow()
    );
    Ok(())
}

fn run_scan(dcim: &Path, output: OutputFormat) -> Result<()> {
    let scan = scan_media_dir(dcim);

    match output {
        OutputFormat::Json => {
            let errors: Vec<String> = scan.errors.iter().map(|e| e.to_string()).collect();
            let output = serde_json::json!({
                "dcimPath": dcim,
                "imageCount": scan.files.len(),
                "images": scan.files,
                "errors": errors,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
        OutputFormat::Pretty => {
            for file in &scan.files {
                println!("{}", file.display());
            }
            for error in &scan.errors {
                eprintln!("{} {}", style("!").yellow().bold(), error);
            }
            eprintln!(
                "{} media files under {}",
                style(scan.files.len()).cyan(),
                dcim.display()
            );
        }
    }
    Ok(())
}

fn run_import<F>(project: &Path, output: OutputFormat, job: F) -> Result<()>
where
    F: FnOnce(&TransferEngine, &photo_ingest::events::EventSender) -> TransferReport,
{
    prepare_destination(project)?;

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let event_thread = {
        let progress = progress.clone();
        thread::spawn(move || show_transfer_progress(receiver, progress))
    };

    let report = job(&TransferEngine::new(), &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    match output {
        OutputFormat::Pretty => print_pretty_report(&Term::stderr(), &report),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default())
        }
    }
    Ok(())
}

fn show_transfer_progress(receiver: EventReceiver, progress: Option<ProgressBar>) {
    let Some(pb) = progress else {
        for _ in receiver.iter() {}
        return;
    };

    for event in receiver.iter() {
        match event {
            Event::Transfer(TransferEvent::Started { total, .. }) => pb.set_length(total as u64),
            Event::Transfer(TransferEvent::Progress(p)) => {
                pb.set_position(p.completed as u64);
                pb.set_message(p.current_file);
            }
            Event::Transfer(TransferEvent::FileFailed { path, message, .. }) => {
                pb.println(format!(
                    "{} {}: {}",
                    style("✗").red(),
                    path.file_name().unwrap_or_default().to_string_lossy(),
                    message
                ));
            }
            Event::Transfer(TransferEvent::Completed { .. }) => pb.finish_and_clear(),
            _ => {}
        }
    }
}

fn print_pretty_report(term: &Term, report: &TransferReport) {
    term.write_line("").ok();
    term.write_line(&format!(
        "{} Import complete in {:.1}s",
        style("✓").green().bold(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} copied ({})",
        style(report.succeeded()).cyan(),
        format_bytes(report.total_bytes)
    ))
    .ok();

    if report.failed() > 0 {
        term.write_line(&format!("  {} not copied:", style(report.failed()).yellow()))
            .ok();
        for result in &report.results {
            if let Some(reason) = result.failure() {
                term.write_line(&format!(
                    "    {} {} - {}",
                    style("○").dim(),
                    result.source.display(),
                    reason
                ))
                .ok();
            }
        }
    }
}

fn run_watch(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(IngestError::Config(
            "--interval-ms must be greater than zero".to_string(),
        ));
    }

    let config = MonitorConfig::default().with_poll_interval(interval);
    let (sender, receiver) = EventChannel::new();

    let handle = VolumeMonitor::new(config).spawn(sender)?;

    let printer = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Volume(VolumeEvent::MonitorStarted { known_volumes }) => {
                    eprintln!(
                        "{} Watching for memory cards ({} volumes already mounted). Press Enter to stop.",
                        style("●").green(),
                        known_volumes
                    );
                }
                Event::Volume(VolumeEvent::CardDetected(card)) => {
                    println!(
                        "{} {} - {} media files in {}",
                        style("Card detected:").bold().cyan(),
                        card.drive.display(),
                        style(card.image_count).cyan(),
                        card.dcim_path.display()
                    );
                    for image in &card.images {
                        println!("    {}", style(image.display()).dim());
                    }
                    if card.image_count > card.images.len() {
                        println!(
                            "    {}",
                            style(format!("… and {} more", card.image_count - card.images.len())).dim()
                        );
                    }
                }
                _ => {}
            }
        }
    });

    // Blocks until Enter or EOF
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok();

    handle.stop()?;
    printer.join().ok();
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
