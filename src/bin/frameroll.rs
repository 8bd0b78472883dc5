use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use env_logger::Env;
use frameroll::{
    DEFAULT_FRAME_RATE, EncodeOptions, FfmpegLogLevel, FrameEncoder, ProgressCallback,
    ProgressInfo, SizeMismatchPolicy, VideoProbe,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  frameroll encode shots --fps 10\n  frameroll encode shots --out timelapse.mp4 --resize-mismatched --progress\n  frameroll list shots --json\n  frameroll probe shots/video.mp4\n  frameroll completions zsh > _frameroll";

#[derive(Debug, Parser)]
#[command(
    name = "frameroll",
    version,
    about = "Roll a directory of still images into an MP4 video",
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
    /// Show debug logging from frameroll.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while encoding.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting an existing output file.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encode the images in a directory into a video.
    #[command(
        about = "Encode a directory of images",
        after_help = "Examples:\n  frameroll encode shots\n  frameroll encode shots --fps 12.5 --out /tmp/clip.mp4 --json"
    )]
    Encode {
        /// Directory holding the images.
        directory: PathBuf,
        /// Output video path. Defaults to <DIRECTORY>/video.mp4.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Frames per second.
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
        fps: f64,
        /// Index (in sorted order) of the image that fixes the frame size.
        #[arg(long, default_value_t = 0)]
        reference_frame: usize,
        /// Resize images whose size differs instead of failing.
        #[arg(long)]
        resize_mismatched: bool,
        /// Target bitrate in bits per second.
        #[arg(long)]
        bitrate: Option<usize>,
        /// Keep the half-written video if the encode fails.
        #[arg(long)]
        keep_partial: bool,
        /// Print the encode report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the images an encode would use, in order.
    #[command(about = "List images in encode order", visible_alias = "ls")]
    List {
        directory: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Print the frame count, size and rate of a video.
    #[command(about = "Inspect a video file", visible_alias = "info")]
    Probe {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    value.parse().ok()
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if global.verbose { "frameroll=debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        frameroll::set_ffmpeg_log_level(parsed);
    }

    Ok(())
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if let Some(name) = info.current_file.as_deref().and_then(Path::file_name) {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
    }
}

fn build_encode_options(
    out: Option<PathBuf>,
    fps: f64,
    reference_frame: usize,
    resize_mismatched: bool,
    bitrate: Option<usize>,
    keep_partial: bool,
) -> EncodeOptions {
    let mut options = EncodeOptions::new()
        .with_fps(fps)
        .with_reference_frame(reference_frame)
        .with_keep_partial_output(keep_partial);
    if let Some(out) = out {
        options = options.with_output(out);
    }
    if resize_mismatched {
        options = options.with_size_mismatch(SizeMismatchPolicy::Resize);
    }
    if let Some(bitrate) = bitrate {
        options = options.with_bitrate(bitrate);
    }
    options
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Encode {
            directory,
            out,
            fps,
            reference_frame,
            resize_mismatched,
            bitrate,
            keep_partial,
            json,
        } => {
            let mut options = build_encode_options(
                out,
                fps,
                reference_frame,
                resize_mismatched,
                bitrate,
                keep_partial,
            );
            ensure_writable_path(&options.resolve_output(&directory), cli.global.overwrite)?;

            let progress = if cli.global.progress {
                let progress = Arc::new(BarProgress::new()?);
                options = options.with_progress(progress.clone());
                Some(progress)
            } else {
                None
            };

            let result = FrameEncoder::new(options).encode(&directory);
            if let Some(progress) = progress {
                match &result {
                    Ok(_) => progress.bar.finish_with_message("done"),
                    Err(_) => progress.bar.abandon(),
                }
            }
            let report = result?;

            if json {
                let payload = json!({
                    "output": report.output.display().to_string(),
                    "frames": report.frames,
                    "width": report.width,
                    "height": report.height,
                    "fps": report.fps,
                    "fourcc": report.fourcc.to_string(),
                    "elapsed_seconds": report.elapsed.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Wrote {} frame(s) ({}x{} @ {} fps) to {}",
                        report.frames,
                        report.width,
                        report.height,
                        report.fps,
                        report.output.display()
                    )
                    .green()
                );
            }
        }
        Commands::List { directory, json } => {
            let files = frameroll::image_files(&directory)?;
            if json {
                let payload: Vec<String> = files
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for path in &files {
                    println!("{}", path.display());
                }
                if cli.global.verbose {
                    eprintln!("{} image(s)", files.len());
                }
            }
        }
        Commands::Probe { input, json } => {
            let summary = VideoProbe::probe(&input)?;
            if json {
                let payload = json!({
                    "format": summary.format,
                    "codec": summary.codec,
                    "width": summary.width,
                    "height": summary.height,
                    "fps": summary.frames_per_second,
                    "frame_count": summary.frame_count,
                    "duration_seconds": summary.duration.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", summary.format);
                println!("Duration: {:?}", summary.duration);
                println!(
                    "Video: {}x{} @ {:.2} fps [{}], {} frame(s)",
                    summary.width,
                    summary.height,
                    summary.frames_per_second,
                    summary.codec,
                    summary.frame_count,
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "frameroll", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::{Cli, Commands, build_encode_options, parse_log_level};
    use frameroll::{FfmpegLogLevel, SizeMismatchPolicy};

    #[test]
    fn parse_log_level_aliases() {
        assert_eq!(parse_log_level("quiet"), Some(FfmpegLogLevel::Quiet));
        assert_eq!(parse_log_level("warn"), Some(FfmpegLogLevel::Warning));
        assert_eq!(parse_log_level("TRACE"), Some(FfmpegLogLevel::Trace));
        assert_eq!(parse_log_level("shout"), None);
    }

    #[test]
    fn encode_defaults() {
        let cli = Cli::try_parse_from(["frameroll", "encode", "shots"]).unwrap();
        match cli.command {
            Commands::Encode {
                directory,
                out,
                fps,
                reference_frame,
                resize_mismatched,
                ..
            } => {
                assert_eq!(directory, Path::new("shots"));
                assert_eq!(out, None);
                assert_eq!(fps, 25.0);
                assert_eq!(reference_frame, 0);
                assert!(!resize_mismatched);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "frameroll",
            "encode",
            "shots",
            "--fps",
            "10",
            "--overwrite",
        ])
        .unwrap();
        assert!(cli.global.overwrite);
        assert!(matches!(cli.command, Commands::Encode { fps, .. } if fps == 10.0));
    }

    #[test]
    fn encode_options_from_flags() {
        let options = build_encode_options(Some("out.mp4".into()), 12.5, 1, true, None, false);
        assert_eq!(options.fps(), 12.5);
        assert_eq!(options.output(), Some(Path::new("out.mp4")));
        assert_eq!(options.reference_frame(), 1);
        assert_eq!(options.size_mismatch(), SizeMismatchPolicy::Resize);
        assert_eq!(options.resolve_output(Path::new("shots")), Path::new("out.mp4"));

        let options = build_encode_options(None, 25.0, 0, false, None, false);
        assert_eq!(
            options.resolve_output(Path::new("shots")),
            Path::new("shots").join("video.mp4")
        );
    }
}
