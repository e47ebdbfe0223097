use std::{
    io::{self, BufRead, Write},
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use env_logger::Env;
use framepick::{
    ExportOptions, FfmpegLogLevel, FramepickError, GifExportSpec, GifPreset, ProgressCallback,
    ProgressInfo, SessionOptions, VideoSession, utilities::still_file_name,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Frame indices start at 0.\n\nExamples:\n  framepick probe input.mp4 --json\n  framepick frame input.mp4 --index 120 --out still.png\n  framepick stills input.mp4 --frames 0,12,40-45 --out stills --progress\n  framepick gif input.mp4 --frames 100-140 --out clip.gif --preset messenger\n  framepick browse input.mp4\n  framepick completions zsh > _framepick";

const BROWSE_HELP: &str = "Commands:\n  next [N]         move forward N frames (default 1)\n  prev [N]         move back N frames (default 1)\n  jump DELTA       move by a signed number of frames\n  goto INDEX       move to a frame index\n  mark [LIST]      mark the current frame, or the frames in LIST\n  unmark [LIST]    unmark the current frame, or the frames in LIST\n  clear            unmark everything\n  list             show marked frames\n  info             show video metadata\n  export DIR       write marked frames as stills into DIR\n  gif PATH         write marked frames as an animated GIF\n  help             show this help\n  quit             leave";

#[derive(Debug, Parser)]
#[command(
    name = "framepick",
    version,
    about = "Browse video frames, mark them, and export stills or an animated GIF",
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
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar for batch exports.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Path to the ffmpeg executable.
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable.
    #[arg(long, global = true)]
    ffprobe: Option<PathBuf>,

    /// Maximum number of decoded frames kept in memory.
    #[arg(long, global = true)]
    cache_size: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print video metadata.
    #[command(
        about = "Print video metadata",
        visible_alias = "info",
        after_help = "Examples:\n  framepick probe input.mp4\n  framepick probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export a single frame.
    #[command(
        about = "Export one frame as an image",
        after_help = "Examples:\n  framepick frame input.mp4 --index 0 --out first.png\n  framepick frame input.mp4 --index 299 --out last.jpg"
    )]
    Frame {
        /// Input video path.
        input: PathBuf,
        /// Frame index.
        #[arg(long)]
        index: u64,
        /// Output image path. The format follows the extension.
        #[arg(long)]
        out: PathBuf,
    },

    /// Export a list of frames as numbered stills.
    #[command(
        about = "Export frames as stills",
        after_help = "Examples:\n  framepick stills input.mp4 --frames 2,0,5 --out stills\n  framepick stills input.mp4 --frames 10-20,40 --out stills --progress"
    )]
    Stills {
        /// Input video path.
        input: PathBuf,
        /// Frame indices, e.g. `2,0,5` or `10-20`.
        #[arg(long)]
        frames: String,
        /// Output directory.
        #[arg(long)]
        out: PathBuf,
    },

    /// Export a list of frames as an animated GIF.
    #[command(
        about = "Export frames as an animated GIF",
        after_help = "Examples:\n  framepick gif input.mp4 --frames 0-29 --out clip.gif\n  framepick gif input.mp4 --frames 0-29 --out clip.gif --fps 12 --width 320 --loop-count 2\n  framepick gif input.mp4 --frames 0-29 --out sticker.gif --preset compact"
    )]
    Gif {
        /// Input video path.
        input: PathBuf,
        /// Frame indices, e.g. `2,0,5` or `10-20`.
        #[arg(long)]
        frames: String,
        /// Output GIF path.
        #[arg(long)]
        out: PathBuf,
        /// Output frame rate (1-30).
        #[arg(long)]
        fps: Option<u32>,
        /// Output width in pixels. Height keeps the aspect ratio.
        #[arg(long)]
        width: Option<u32>,
        /// Loop count, 0 loops forever.
        #[arg(long)]
        loop_count: Option<u16>,
        /// Size and rate preset: messenger, compact, standard.
        #[arg(long)]
        preset: Option<String>,
    },

    /// Browse a video interactively from standard input.
    #[command(about = "Browse and mark frames interactively")]
    Browse {
        /// Input video path.
        input: PathBuf,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a frame list such as `2,0,5` or `10-20,40` into inclusive ranges.
/// Order is kept; duplicates are left to the selection.
fn parse_frame_list(value: &str) -> Result<Vec<RangeInclusive<u64>>, String> {
    let mut ranges = Vec::new();
    for part in value.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_frame_index(start)?;
                let end = parse_frame_index(end)?;
                if start > end {
                    return Err(format!("invalid range {part}: start is after end"));
                }
                ranges.push(start..=end);
            }
            None => {
                let index = parse_frame_index(part)?;
                ranges.push(index..=index);
            }
        }
    }
    if ranges.is_empty() {
        return Err("frame list is empty".to_string());
    }
    Ok(ranges)
}

/// Expand parsed ranges into frame indices, rejecting any range that runs
/// past the end of the video before it is expanded.
fn expand_frame_list(
    ranges: &[RangeInclusive<u64>],
    total_frames: u64,
) -> Result<Vec<u64>, FramepickError> {
    let mut frames = Vec::new();
    for range in ranges {
        if *range.end() >= total_frames {
            return Err(FramepickError::FrameOutOfRange {
                frame_index: *range.end(),
                total_frames,
            });
        }
        frames.extend(range.clone());
    }
    Ok(frames)
}

fn parse_frame_index(value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid frame index: {value}"))
}

fn session_options(global: &GlobalOptions) -> Result<SessionOptions, Box<dyn std::error::Error>> {
    let mut options = SessionOptions::new();
    if let Some(level) = &global.log_level {
        let parsed =
            FfmpegLogLevel::parse(level).ok_or(format!("unsupported --log-level: {level}"))?;
        options = options.with_log_level(parsed);
    }
    if let Some(path) = &global.ffmpeg {
        options = options.with_ffmpeg(path);
    }
    if let Some(path) = &global.ffprobe {
        options = options.with_ffprobe(path);
    }
    if let Some(size) = global.cache_size {
        options = options.with_cache_size(size);
    }
    Ok(options)
}

fn export_options(global: &GlobalOptions, total: usize) -> ExportOptions {
    let options = ExportOptions::new();
    if global.progress {
        options.with_progress(Arc::new(TerminalProgress::new(total as u64)))
    } else {
        options
    }
}

fn gif_spec(
    preset: Option<&str>,
    fps: Option<u32>,
    width: Option<u32>,
    loop_count: Option<u16>,
) -> Result<GifExportSpec, Box<dyn std::error::Error>> {
    let mut spec = match preset {
        Some(name) => GifExportSpec::from(name.parse::<GifPreset>()?),
        None => GifExportSpec::new(),
    };
    if let Some(fps) = fps {
        spec = spec.with_fps(fps);
    }
    if let Some(width) = width {
        spec = spec.with_width(width);
    }
    if let Some(loop_count) = loop_count {
        spec = spec.with_loop_count(loop_count);
    }
    spec.validate()?;
    Ok(spec)
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

fn ensure_writable_stills(
    directory: &Path,
    frames: &[u64],
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for &frame in frames {
        ensure_writable_path(&directory.join(still_file_name(frame)), overwrite)?;
    }
    Ok(())
}

fn open_session(
    global: &GlobalOptions,
    input: &Path,
) -> Result<VideoSession, Box<dyn std::error::Error>> {
    let mut session = VideoSession::with_options(&session_options(global)?);
    session.load(input)?;
    Ok(session)
}

fn select_frames(
    session: &mut VideoSession,
    ranges: &[RangeInclusive<u64>],
) -> Result<(), Box<dyn std::error::Error>> {
    for frame in expand_frame_list(ranges, session.total_frames())? {
        session.select(frame)?;
    }
    Ok(())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        if info.skipped > 0 {
            self.bar.set_message(format!("{} skipped", info.skipped));
        }
        if info.current_frame.is_none() {
            self.bar.finish();
        }
    }
}

fn print_success(message: String) {
    println!("{} {}", "success:".green().bold(), message.green());
}

fn print_skipped(skipped: &[u64]) {
    if !skipped.is_empty() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("could not decode frame(s) {skipped:?}").yellow()
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Probe { input, json } => {
            let session = open_session(&cli.global, &input)?;
            let metadata = session.metadata().ok_or("no video loaded")?;
            if json {
                let payload = json!({
                    "path": input.display().to_string(),
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Path: {}", input.display());
                println!(
                    "Video: {}x{} @ {:.2} fps",
                    metadata.width, metadata.height, metadata.frames_per_second
                );
                println!("Frames: {}", metadata.frame_count);
                println!("Duration: {:.3}s", metadata.duration.as_secs_f64());
            }
        }

        Commands::Frame { input, index, out } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let mut session = open_session(&cli.global, &input)?;
            let path = session.export_frame(index, &out)?;
            print_success(format!("Saved frame {index} to {}", path.display()));
        }

        Commands::Stills { input, frames, out } => {
            let frames = parse_frame_list(&frames)?;
            let mut session = open_session(&cli.global, &input)?;
            select_frames(&mut session, &frames)?;
            let selected = session.selected_frames();
            ensure_writable_stills(&out, &selected, cli.global.overwrite)?;

            let options = export_options(&cli.global, selected.len());
            let summary = session.export_selected(&out, &options)?;
            if cli.global.verbose {
                for path in &summary.paths {
                    eprintln!("saved {}", path.display());
                }
            }
            print_skipped(&summary.skipped);
            print_success(format!(
                "Exported {} of {} frame(s) to {}",
                summary.written,
                summary.requested,
                out.display()
            ));
        }

        Commands::Gif {
            input,
            frames,
            out,
            fps,
            width,
            loop_count,
            preset,
        } => {
            let frames = parse_frame_list(&frames)?;
            let spec = gif_spec(preset.as_deref(), fps, width, loop_count)?;
            ensure_writable_path(&out, cli.global.overwrite)?;

            let mut session = open_session(&cli.global, &input)?;
            select_frames(&mut session, &frames)?;
            let options = export_options(&cli.global, session.selection().len());
            let summary = session.export_gif(&out, &spec, &options)?;
            print_skipped(&summary.skipped);
            print_success(format!(
                "Wrote {} frame(s) to {} ({}x{}, {} bytes)",
                summary.summary.frame_count,
                summary.output.display(),
                summary.summary.width,
                summary.summary.height,
                summary.summary.file_size
            ));
        }

        Commands::Browse { input } => {
            let mut session = open_session(&cli.global, &input)?;
            browse(&mut session, &cli.global)?;
        }

        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framepick", &mut io::stdout());
        }
    }

    Ok(())
}

fn browse(
    session: &mut VideoSession,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(metadata) = session.metadata() {
        println!(
            "{} {}x{} @ {:.2} fps, {} frames",
            "loaded".cyan().bold(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count
        );
    }
    println!("Type `help` for commands.");
    show_current(session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let argument = words.next();

        if let Err(error) = browse_command(session, global, command, argument) {
            match error {
                BrowseOutcome::Quit => break,
                BrowseOutcome::Failed(message) => {
                    eprintln!("{} {message}", "error:".red().bold());
                }
            }
        }
    }

    session.close();
    Ok(())
}

enum BrowseOutcome {
    Quit,
    Failed(String),
}

impl<E: std::fmt::Display> From<E> for BrowseOutcome {
    fn from(error: E) -> Self {
        BrowseOutcome::Failed(error.to_string())
    }
}

fn browse_command(
    session: &mut VideoSession,
    global: &GlobalOptions,
    command: &str,
    argument: Option<&str>,
) -> Result<(), BrowseOutcome> {
    match command.to_ascii_lowercase().as_str() {
        "next" | "n" => {
            let step = argument.map(str::parse::<i64>).transpose()?.unwrap_or(1);
            session.jump(step);
            show_current(session);
        }
        "prev" | "p" => {
            let step = argument.map(str::parse::<i64>).transpose()?.unwrap_or(1);
            session.jump(step.saturating_neg());
            show_current(session);
        }
        "jump" | "j" => {
            let delta = argument.ok_or("jump needs a frame delta")?.parse::<i64>()?;
            session.jump(delta);
            show_current(session);
        }
        "goto" | "g" => {
            let index = parse_frame_index(argument.ok_or("goto needs a frame index")?)?;
            session.seek(index);
            show_current(session);
        }
        "mark" | "m" => match argument {
            Some(list) => {
                select_frames(session, &parse_frame_list(list)?)?;
                println!("{} frame(s) marked", session.selection().len());
            }
            None => {
                if !session.is_selected(session.current_frame()) {
                    session.toggle_current()?;
                }
                show_current(session);
            }
        },
        "unmark" | "u" => match argument {
            Some(list) => {
                let last = session.total_frames().saturating_sub(1);
                for range in parse_frame_list(list)? {
                    for frame in *range.start()..=(*range.end()).min(last) {
                        session.deselect(frame);
                    }
                }
                println!("{} frame(s) marked", session.selection().len());
            }
            None => {
                session.deselect(session.current_frame());
                show_current(session);
            }
        },
        "clear" => {
            session.clear_selection();
            println!("selection cleared");
        }
        "list" | "l" => {
            let frames = session.selected_frames();
            if frames.is_empty() {
                println!("no frames marked");
            }
            for frame in frames {
                println!("  {}", session.frame_label(frame).unwrap_or_default());
            }
        }
        "info" => {
            if let Some(metadata) = session.metadata() {
                println!(
                    "{}x{} @ {:.2} fps, {} frames, {:.3}s",
                    metadata.width,
                    metadata.height,
                    metadata.frames_per_second,
                    metadata.frame_count,
                    metadata.duration.as_secs_f64()
                );
            }
        }
        "export" | "e" => {
            let directory = PathBuf::from(argument.ok_or("export needs a directory")?);
            let selected = session.selected_frames();
            ensure_writable_stills(&directory, &selected, global.overwrite)?;
            let options = export_options(global, selected.len());
            let summary = session.export_selected(&directory, &options)?;
            print_skipped(&summary.skipped);
            print_success(format!(
                "Exported {} of {} frame(s) to {}",
                summary.written,
                summary.requested,
                directory.display()
            ));
        }
        "gif" => {
            let output = PathBuf::from(argument.ok_or("gif needs an output path")?);
            ensure_writable_path(&output, global.overwrite)?;
            let options = export_options(global, session.selection().len());
            let summary = session.export_gif(&output, &GifExportSpec::new(), &options)?;
            print_skipped(&summary.skipped);
            print_success(format!(
                "Wrote {} frame(s) to {}",
                summary.summary.frame_count,
                output.display()
            ));
        }
        "help" | "h" | "?" => println!("{BROWSE_HELP}"),
        "quit" | "q" | "exit" => return Err(BrowseOutcome::Quit),
        other => return Err(BrowseOutcome::Failed(format!("unknown command: {other}"))),
    }
    Ok(())
}

fn show_current(session: &mut VideoSession) {
    let frame = session.current_frame();
    let label = session.frame_label(frame).unwrap_or_default();
    let marker = if session.is_selected(frame) {
        "[x]".green().bold()
    } else {
        "[ ]".normal()
    };
    match session.current_image() {
        Some(image) => println!("{marker} {label} {}x{}", image.width(), image.height()),
        None => println!("{marker} {label} {}", "(unavailable)".red()),
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
