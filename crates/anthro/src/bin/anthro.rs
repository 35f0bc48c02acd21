//! anthro CLI: child measurements from a photograph with a 15 cm scale.

use anthro::detect;
use anthro::{JsonLandmarkFile, MeasureConfig, MeasureParams, MeasureReport, MeasurementResult};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

const CM_PER_INCH: f64 = 2.54;

#[derive(Parser)]
#[command(name = "anthro")]
#[command(about = "Measure height, head and wrist circumference of a child from a single photo")]
#[command(version)]
struct Cli {
    /// Log pipeline details to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON (requires the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure the subject in a photo.
    Measure(MeasureArgs),

    /// Detect the reference scale only and print the calibration.
    Scale {
        /// Path to the input image.
        #[arg(long)]
        image: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct MeasureArgs {
    /// Path to the input image (overrides the config).
    #[arg(long)]
    image: Option<PathBuf>,

    /// Landmark JSON from the pose estimator (overrides the config).
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// JSON run config (paths, output, parameter overrides).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the last-resort wrist estimate.
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON report to this path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the full result as JSON instead of the summary table.
    #[arg(long)]
    json: bool,
}

fn log_level(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    }
}

/// `RUST_LOG` overrides `--verbose` when built with `tracing`.
fn init_logging(verbose: bool, json: bool) {
    let level = log_level(verbose);
    #[cfg(feature = "tracing")]
    anthro::core::init_tracing(json, level);
    #[cfg(not(feature = "tracing"))]
    {
        if json {
            eprintln!("--log-json needs the `tracing` feature; using plain logs");
        }
        let _ = anthro::core::init_with_level(level);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let outcome = match cli.command {
        Commands::Measure(args) => run_measure(&args),
        Commands::Scale { image } => run_scale(&image),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── measure ─────────────────────────────────────────────────────────────

struct MeasureJob {
    image: PathBuf,
    landmarks: PathBuf,
    params: MeasureParams,
    out: Option<PathBuf>,
}

fn resolve_job(args: &MeasureArgs) -> CliResult<MeasureJob> {
    let cfg = args.config.as_ref().map(MeasureConfig::load_json).transpose()?;

    let image = args
        .image
        .clone()
        .or_else(|| cfg.as_ref().map(|c| PathBuf::from(&c.image_path)))
        .ok_or("no image given; pass --image or --config")?;
    let landmarks = args
        .landmarks
        .clone()
        .or_else(|| cfg.as_ref().map(|c| PathBuf::from(&c.landmarks_path)))
        .ok_or("no landmarks given; pass --landmarks or --config")?;

    let mut params = cfg.as_ref().map(|c| c.build_params()).unwrap_or_default();
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    let out = args
        .out
        .clone()
        .or_else(|| cfg.as_ref().map(|c| c.output_path()));

    Ok(MeasureJob {
        image,
        landmarks,
        params,
        out,
    })
}

fn run_measure(args: &MeasureArgs) -> CliResult<()> {
    let job = resolve_job(args)?;
    log::info!("processing image: {}", job.image.display());

    let provider = JsonLandmarkFile::new(&job.landmarks);
    let outcome = detect::measure_path(&job.image, &provider, job.params);

    if let Some(out) = &job.out {
        let mut report = MeasureReport::new(
            job.image.to_string_lossy(),
            job.landmarks.to_string_lossy(),
        );
        match &outcome {
            Ok(res) => report.set_result(res.clone()),
            Err(e) => report.set_error(e),
        }
        report.write_json(out)?;
        log::info!("report written to {}", out.display());
    }

    let res = outcome?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        print_summary(&res);
    }
    Ok(())
}

fn print_summary(res: &MeasurementResult) {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("MEASUREMENT RESULTS");
    println!("{rule}");
    println!(
        "Height:              {:.1} cm ({:.1} inches)",
        res.height_cm,
        res.height_cm / CM_PER_INCH
    );
    println!("Head Circumference:  {:.1} cm", res.head_circumference_cm);
    match res.wrist_circumference_cm {
        Some(c) if res.wrist_fallback_used => println!("Wrist Circumference: {c:.1} cm (estimated)"),
        Some(c) => println!("Wrist Circumference: {c:.1} cm"),
        None => println!("Wrist Circumference: Not detected"),
    }
    println!();
    println!("Calibration: {:.3} pixels per cm", res.pixels_per_cm);
    println!("{rule}");
}

// ── scale ───────────────────────────────────────────────────────────────

fn run_scale(image: &Path) -> CliResult<()> {
    let (cal, scale) = detect::calibrate_path(image, MeasureParams::default())?;
    println!("Scale length: {:.1} px", scale.pixel_length);
    if scale.fallback_used {
        println!("Warning: no ruler-like object found, used the largest contour");
    }
    println!("Calibration: {:.3} pixels per cm", cal.pixels_per_cm());
    Ok(())
}
