use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framesift::{
    BatchReport, Cataloger, FrameExtractor, FrameSelector, ItemStatus, OperationType,
    PipelineConfig, ProgressCallback, ProgressInfo, RangeTrimmer, ScanFilter, SystemRunner,
    ToolLogLevel, tool_available,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framesift catalog /media/card day1.txt\n  framesift extract day1.txt --progress\n  framesift organize frames_day1\n  framesift run /media/card day1.txt --json\n  framesift trim take_07.mov --start 00:01:05 --end 95.5\n  framesift completions zsh > _framesift";

#[derive(Debug, Parser)]
#[command(
    name = "framesift",
    version,
    about = "Catalog videos, dump their frames, and keep a rule-based sample",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging, including every external command line.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar for batch commands.
    #[arg(long, global = true)]
    progress: bool,

    /// Print results as machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Path to the ffmpeg binary.
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary.
    #[arg(long, global = true)]
    ffprobe: Option<PathBuf>,

    /// ffmpeg/ffprobe log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    tool_log_level: Option<String>,

    /// Source video extension to catalog; repeat for several (default: .mov).
    #[arg(long = "extension", value_name = "EXT", global = true)]
    extensions: Vec<String>,

    /// Extracted frame image extension (default: tiff).
    #[arg(long, value_name = "EXT", global = true)]
    frame_ext: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a frame-count manifest for a directory of videos.
    #[command(
        about = "Catalog source videos",
        after_help = "Examples:\n  framesift catalog /media/card day1.txt\n  framesift catalog /media/card day1.txt --extension .mov --extension .mkv"
    )]
    Catalog {
        /// Directory of source videos.
        folder: PathBuf,
        /// Manifest file to write.
        manifest: PathBuf,
    },

    /// Dump every frame of each manifest entry.
    #[command(
        about = "Extract frames",
        after_help = "Examples:\n  framesift extract day1.txt\n  framesift extract day1.txt --frame-ext png --progress"
    )]
    Extract {
        /// Manifest written by `catalog`.
        manifest: PathBuf,
    },

    /// Apply the selection rules to every frame folder.
    #[command(
        about = "Select and group frames",
        visible_alias = "select",
        after_help = "Examples:\n  framesift organize frames_day1"
    )]
    Organize {
        /// Directory holding one folder per extracted video.
        frames_root: PathBuf,
    },

    /// Catalog, extract, and organize in one go.
    #[command(
        about = "Run the whole pipeline",
        after_help = "Examples:\n  framesift run /media/card day1.txt --progress"
    )]
    Run {
        /// Directory of source videos.
        folder: PathBuf,
        /// Manifest file to write.
        manifest: PathBuf,
    },

    /// Cut a time range out of a video without re-encoding.
    #[command(
        about = "Trim a video by stream copy",
        after_help = "Examples:\n  framesift trim take_07.mov --start 65 --end 95.5\n  framesift trim take_07.mov short.mov --start 00:01:05 --end 00:01:35"
    )]
    Trim {
        /// Input video.
        input: PathBuf,
        /// Output video (default: trimmed_<input name> in the current directory).
        output: Option<PathBuf>,
        /// Start time, in seconds or HH:MM:SS.
        #[arg(long)]
        start: String,
        /// End time, in seconds or HH:MM:SS.
        #[arg(long)]
        end: String,
    },

    /// Print the selection rule table.
    #[command(about = "Show selection rules")]
    Rules,

    /// Check that ffmpeg and ffprobe can be launched.
    #[command(about = "Check external tools")]
    Doctor,

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "framesift=debug"
    } else {
        "framesift=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn normalize_extension(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with('.') {
        trimmed.to_ascii_lowercase()
    } else {
        format!(".{}", trimmed.to_ascii_lowercase())
    }
}

fn build_config(global: &GlobalOptions) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = PipelineConfig::new();

    if let Some(ffmpeg) = &global.ffmpeg {
        config = config.with_ffmpeg(ffmpeg);
    }
    if let Some(ffprobe) = &global.ffprobe {
        config = config.with_ffprobe(ffprobe);
    }
    if let Some(level) = &global.tool_log_level {
        let parsed =
            ToolLogLevel::parse(level).ok_or(format!("unsupported --tool-log-level: {level}"))?;
        config = config.with_tool_log_level(parsed);
    }
    if !global.extensions.is_empty() {
        let extensions: Vec<String> = global
            .extensions
            .iter()
            .map(|extension| normalize_extension(extension))
            .collect();
        config = config.with_scan_filter(ScanFilter::new(extensions));
    }
    if let Some(extension) = &global.frame_ext {
        config = config.with_frame_extension(extension);
    }
    if global.progress {
        config = config.with_progress(Arc::new(TerminalProgress::default()));
    }

    Ok(config)
}

/// Renders batch progress as one indicatif bar per operation.
#[derive(Default)]
struct TerminalProgress {
    bar: Mutex<Option<(OperationType, ProgressBar)>>,
}

fn operation_label(operation: OperationType) -> &'static str {
    match operation {
        OperationType::Cataloging => "catalog",
        OperationType::FrameExtraction => "extract",
        OperationType::Organizing => "organize",
        _ => "work",
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        if slot
            .as_ref()
            .is_none_or(|(operation, _)| *operation != info.operation)
        {
            if let Some((_, previous)) = slot.take() {
                previous.finish_and_clear();
            }
            let bar = ProgressBar::new(info.total.unwrap_or(0));
            if let Ok(style) = ProgressStyle::with_template(
                "{prefix:.bold} {spinner:.green} {bar:40.cyan/blue} {pos}/{len} {wide_msg}",
            ) {
                bar.set_style(style.progress_chars("##-"));
            }
            bar.set_prefix(operation_label(info.operation));
            *slot = Some((info.operation, bar));
        }

        if let Some((_, bar)) = slot.as_ref() {
            bar.set_position(info.current);
            if let Some(item) = &info.current_item {
                bar.set_message(item.clone());
            }
            if info.total.is_some_and(|total| info.current >= total) {
                bar.finish_and_clear();
            }
        }
    }
}

fn print_report(title: &str, report: &BatchReport) {
    println!("{}", title.bold());
    if report.items.is_empty() {
        println!("  nothing to do");
        return;
    }
    for item in &report.items {
        let label = match item.status {
            ItemStatus::Succeeded => "ok".green().bold(),
            ItemStatus::Skipped => "skip".yellow().bold(),
            ItemStatus::Failed => "fail".red().bold(),
        };
        println!("  {label} {}: {}", item.path.display(), item.message);
    }
    println!(
        "  {} succeeded, {} skipped, {} failed",
        report.count(ItemStatus::Succeeded),
        report.count(ItemStatus::Skipped),
        report.count(ItemStatus::Failed)
    );
}

fn failure_count(reports: &[&BatchReport]) -> usize {
    reports
        .iter()
        .map(|report| report.count(ItemStatus::Failed))
        .sum()
}

fn finish_batch(reports: &[&BatchReport]) -> Result<(), Box<dyn Error>> {
    match failure_count(reports) {
        0 => Ok(()),
        failed => Err(format!("{failed} item(s) failed").into()),
    }
}

fn catalog(
    config: &PipelineConfig,
    folder: &Path,
    manifest: &Path,
) -> Result<BatchReport, Box<dyn Error>> {
    let catalog = Cataloger::new(config, &SystemRunner).catalog(folder, manifest)?;
    Ok(catalog.report)
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let config = build_config(&cli.global)?;

    match cli.command {
        Commands::Catalog { folder, manifest } => {
            let report = catalog(&config, &folder, &manifest)?;
            if cli.global.json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            } else {
                print_report("catalog", &report);
                println!("{} {}", "saved".green().bold(), manifest.display());
            }
            finish_batch(&[&report])?;
        }
        Commands::Extract { manifest } => {
            let extraction = FrameExtractor::new(&config, &SystemRunner).extract_manifest(&manifest)?;
            if cli.global.json {
                let payload = json!({
                    "output_root": extraction.output_root.display().to_string(),
                    "report": extraction.report.to_json(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_report("extract", &extraction.report);
                println!(
                    "{} {}",
                    "frames in".green().bold(),
                    extraction.output_root.display()
                );
            }
            finish_batch(&[&extraction.report])?;
        }
        Commands::Organize { frames_root } => {
            let report = FrameSelector::new(&config).organize_all(&frames_root)?;
            if cli.global.json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            } else {
                print_report("organize", &report);
            }
            finish_batch(&[&report])?;
        }
        Commands::Run { folder, manifest } => {
            let catalog_report = catalog(&config, &folder, &manifest)?;
            let extraction =
                FrameExtractor::new(&config, &SystemRunner).extract_manifest(&manifest)?;
            let organize_report = FrameSelector::new(&config).organize_all(&extraction.output_root)?;

            if cli.global.json {
                let payload = json!({
                    "manifest": manifest.display().to_string(),
                    "output_root": extraction.output_root.display().to_string(),
                    "catalog": catalog_report.to_json(),
                    "extract": extraction.report.to_json(),
                    "organize": organize_report.to_json(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_report("catalog", &catalog_report);
                print_report("extract", &extraction.report);
                print_report("organize", &organize_report);
                println!(
                    "{} {}",
                    "frames in".green().bold(),
                    extraction.output_root.display()
                );
            }
            finish_batch(&[&catalog_report, &extraction.report, &organize_report])?;
        }
        Commands::Trim {
            input,
            output,
            start,
            end,
        } => {
            let output = output.unwrap_or_else(|| RangeTrimmer::default_output_path(&input));
            if output.exists() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("overwriting {}", output.display()).yellow()
                );
            }
            let summary = RangeTrimmer::new(config.tools(), &SystemRunner)
                .trim(&input, &output, &start, &end)?;
            if cli.global.json {
                let payload = json!({
                    "output": summary.output.display().to_string(),
                    "start_seconds": summary.start.as_secs_f64(),
                    "end_seconds": summary.end.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{} {summary}", "saved".green().bold());
            }
        }
        Commands::Rules => {
            print!("{}", config.rules());
        }
        Commands::Doctor => {
            let tools = config.tools();
            let mut missing = Vec::new();
            for program in [&tools.ffmpeg, &tools.ffprobe] {
                if tool_available(&SystemRunner, program) {
                    println!("{} {}", "found".green().bold(), program.display());
                } else {
                    println!("{} {}", "missing".red().bold(), program.display());
                    missing.push(program.display().to_string());
                }
            }
            if !missing.is_empty() {
                return Err(format!("cannot launch {}", missing.join(", ")).into());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framesift", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
