use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use telecine_align::{
    CalibrationConfig, CalibrationManager, CalibrationProfile, Image, Side, VerticalOffset,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ta_tool")]
#[command(about = "Calibrate perforation lanes and measure film drift on image files")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a calibration profile from a frame and operator-drawn rois.
    Calibrate(CalibrateArgs),
    /// Measure the vertical offset of each frame against a profile.
    Measure(MeasureArgs),
    /// Print lanes and anchor count of a saved profile.
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Clone)]
struct CalibrateArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    /// Perforation corners as `x1,y1,x2,y2`; repeat for every hole.
    #[arg(long = "roi", required = true, num_args = 1.., value_parser = parse_corners)]
    rois: Vec<Corners>,
    #[arg(long, required = true)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    /// JSON calibration config; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, required = true)]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct MeasureArgs {
    #[arg(long, required = true)]
    profile: PathBuf,
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct SummaryArgs {
    #[arg(long, required = true)]
    profile: PathBuf,
}

#[derive(Debug, Clone, Copy)]
struct Corners {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

#[derive(Debug, Clone, Serialize)]
struct MeasurementDto<'a> {
    frame: &'a str,
    side: Side,
    offset: f64,
    confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
struct SummaryDto {
    #[serde(flatten)]
    summary: telecine_align::ProfileSummary,
    description: String,
    timestamp: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Calibrate(args) => run_calibrate(args),
        Command::Measure(args) => run_measure(args),
        Command::Summary(args) => run_summary(args),
    }
}

fn run_calibrate(args: CalibrateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let frame = load_input_u8(&args.input)?;

    let mut manager = CalibrationManager::new(config);
    for c in &args.rois {
        if manager.add_raw_roi(c.x1, c.y1, c.x2, c.y2).is_none() {
            warn!(?c, "roi below minimum size, ignored");
        }
    }

    let Some(mut profile) = manager
        .generate_calibration_profile(&frame.as_view())
        .context("building vertical strips")?
    else {
        bail!("calibration incomplete: no lane could be built from the given rois");
    };
    profile.set_name(args.name);
    profile.set_description(args.description);
    profile.ensure_named()?;

    let text = profile.to_json()?;
    fs::write(&args.out, text).with_context(|| format!("writing {}", args.out.display()))?;
    info!(id = profile.id(), out = %args.out.display(), "saved calibration profile");
    Ok(())
}

fn run_measure(args: MeasureArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let profile = read_profile(&args.profile)?;

    let mut strips = Side::BOTH
        .into_iter()
        .filter(|&side| profile.lane(side).is_some())
        .map(|side| profile.build_strip(side, &config.tracker))
        .collect::<Result<Vec<_>, _>>()
        .context("rebuilding strips from profile")?;

    for path in &args.input {
        let frame = load_input_u8(path)?;
        if frame.height() != strips.first().map_or(0, |s| s.height()) {
            warn!(
                frame = %path.display(),
                height = frame.height(),
                "frame height differs from the calibrated frame"
            );
        }
        let name = path.display().to_string();
        for strip in &mut strips {
            let VerticalOffset { offset, confidence } =
                strip.measure_vertical_offset(&frame.as_view());
            let line = MeasurementDto {
                frame: &name,
                side: strip.side(),
                offset,
                confidence,
            };
            println!("{}", serde_json::to_string(&line).context("serializing measurement")?);
        }
    }
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    let profile = read_profile(&args.profile)?;
    let dto = SummaryDto {
        summary: profile.summary(),
        description: profile.description().to_owned(),
        timestamp: profile.timestamp().to_string(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&dto).context("serializing summary")?
    );
    Ok(())
}

fn parse_corners(s: &str) -> Result<Corners, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid roi `{s}`: {e}"))?;
    match parts[..] {
        [x1, y1, x2, y2] => Ok(Corners { x1, y1, x2, y2 }),
        _ => Err(format!("roi `{s}` must be x1,y1,x2,y2")),
    }
}

fn load_config(path: Option<&Path>) -> Result<CalibrationConfig> {
    match path {
        Some(path) => read_json(path),
        None => Ok(CalibrationConfig::default()),
    }
}

fn read_profile(path: &Path) -> Result<CalibrationProfile> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    CalibrationProfile::from_json(&text)
        .with_context(|| format!("parsing profile {}", path.display()))
}

fn load_input_u8(path: &Path) -> Result<Image<u8>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing frame from {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}
