//! paper-piano CLI: detect keys in a frame, render synthetic sheets and
//! replay recorded sessions.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::info;
use nalgebra::Point2;
use paper_piano::core::sheet::{place_sheet, SheetLayout};
use paper_piano::report::{self, DetectReport, ReplayFrameReport, ReplayReport, ReplayScript};
use paper_piano::{
    draw_overlay, mask_to_rgb, Controls, KeyPoint, PaperDetector, PianoConfig, PianoSession,
    ScriptedHands, SoundBank,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "paper-piano")]
#[command(about = "Find a paper keyboard in camera frames and report key presses")]
#[command(version)]
struct Cli {
    /// Log every pipeline stage.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the sheet and its keys in one image.
    Detect(DetectArgs),
    /// Write a synthetic frame containing a keyboard sheet.
    Render(RenderArgs),
    /// Run a recorded sequence of frames and fingertips through a session.
    Replay(ReplayArgs),
}

#[derive(Debug, Args)]
struct DetectArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    /// JSON configuration (defaults when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the JSON report; printed to stdout when omitted.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Where to write the frame with the detection drawn on it.
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Where to write the rectified sheet next to its marker mask.
    #[arg(long)]
    rectified: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Output image.
    #[arg(long)]
    out: PathBuf,

    /// Number of key markers on the sheet.
    #[arg(long, default_value_t = 5)]
    keys: usize,

    /// Where to write the true key positions as JSON.
    #[arg(long)]
    expected: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Replay script (JSON list of frames with fingertips).
    #[arg(long)]
    script: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the per-frame report; printed to stdout when omitted.
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Sheet corners used by `render`, slightly rotated and in perspective.
const RENDER_CORNERS: [[f32; 2]; 4] = [
    [130.0, 110.0],
    [500.0, 95.0],
    [520.0, 370.0],
    [115.0, 360.0],
];
const RENDER_SIZE: (u32, u32) = (640, 480);
const RENDER_BACKGROUND: [u8; 3] = [40, 40, 40];

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Render(args) => run_render(&args),
        Commands::Replay(args) => run_replay(&args),
    }
}

/// `RUST_LOG` overrides the level picked by `-v`.
#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

/// Span close events carry the per-frame timings of the instrumented
/// detector, validator and session calls.
#[cfg(feature = "tracing")]
fn init_logging(verbose: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> CliResult<PianoConfig> {
    let config = match path {
        Some(p) => PianoConfig::load_json(p)?,
        None => PianoConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn emit<T: serde::Serialize>(value: &T, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(p) => {
            report::write_json(value, p)?;
            info!("report written to {}", p.display());
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

// ── detect ─────────────────────────────────────────────────────────────

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    info!("loading image: {}", args.image.display());
    let frame = image::open(&args.image)?.to_rgb8();
    let (w, h) = frame.dimensions();
    info!("image size: {w}x{h}");

    let mut detector = PaperDetector::new(config.detector.clone())?;
    let result = detector.process(&frame, &config.edges)?;
    info!(
        "sheet {}, {} keys",
        if result.found_sheet() { "found" } else { "not found" },
        result.key_count()
    );

    if let Some(path) = &args.overlay {
        let pressed = Default::default();
        let overlay = draw_overlay(&frame, result.quad.as_ref(), &result.key_points, &pressed, &[]);
        overlay.save(path)?;
        info!("overlay written to {}", path.display());
    }
    if let Some(path) = &args.rectified {
        side_by_side(&result.rectified, &mask_to_rgb(&result.rectified_mask)).save(path)?;
        info!("rectified sheet written to {}", path.display());
    }

    let report = DetectReport {
        image_path: args.image.display().to_string(),
        frame_size: [w, h],
        detection: result.summary(),
    };
    emit(&report, args.report.as_deref())
}

fn side_by_side(left: &image::RgbImage, right: &image::RgbImage) -> image::RgbImage {
    let mut out = image::RgbImage::new(
        left.width() + right.width(),
        left.height().max(right.height()),
    );
    image::imageops::replace(&mut out, left, 0, 0);
    image::imageops::replace(&mut out, right, i64::from(left.width()), 0);
    out
}

// ── render ─────────────────────────────────────────────────────────────

fn run_render(args: &RenderArgs) -> CliResult<()> {
    let layout = SheetLayout {
        keys: args.keys,
        ..SheetLayout::default()
    };
    let corners = RENDER_CORNERS.map(|[x, y]| Point2::new(x, y));
    let placed = place_sheet(
        &layout,
        RENDER_SIZE.0,
        RENDER_SIZE.1,
        corners,
        RENDER_BACKGROUND,
    )
    .ok_or("degenerate sheet corners")?;
    placed.frame.save(&args.out)?;
    info!("frame with {} keys written to {}", args.keys, args.out.display());

    if let Some(path) = &args.expected {
        let keys: Vec<KeyPoint> = placed
            .markers
            .iter()
            .enumerate()
            .map(|(index, &position)| KeyPoint { index, position })
            .collect();
        report::write_json(&keys, path)?;
    }
    Ok(())
}

// ── replay ─────────────────────────────────────────────────────────────

fn run_replay(args: &ReplayArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let script: ReplayScript = report::load_json(&args.script)?;
    let base = args.script.parent().unwrap_or_else(|| Path::new("."));
    let images = script.image_paths(base);

    let hands = ScriptedHands::new(script.frames.iter().map(|f| f.fingertips.clone()));
    let mut session = PianoSession::from_config(&config, hands)?;
    if let Some(dir) = &config.sounds_dir {
        session = session.with_sounds(SoundBank::from_dir(dir)?, config.sound_selection);
    }

    let mut controls = Controls::from_config(&config);
    let mut report = ReplayReport::default();
    for (i, (frame, path)) in script.frames.iter().zip(&images).enumerate() {
        let rgb = image::open(path)?.to_rgb8();
        controls.freeze_keys = frame.freeze_keys;
        let outcome = session.step(&rgb, &controls)?;
        report.frames.push(ReplayFrameReport {
            frame: i,
            key_count: outcome.key_points.len(),
            found_sheet: outcome.quad.is_some(),
            pressed: outcome.pressed.into_iter().collect(),
            sounds: outcome.sounds,
        });
    }
    info!(
        "replayed {} frames, {} presses",
        report.frames.len(),
        report.presses().len()
    );
    emit(&report, args.report.as_deref())
}
