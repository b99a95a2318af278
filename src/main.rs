use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use sphere_capture::{App, Error, RenderConfig, RenderMode, SphereStrategy, SHADER_SOURCE};

/// Render a procedurally generated sphere offscreen and save the frames as PNG files.
#[derive(Parser, Debug)]
#[command(name = "sphere-capture", version, about)]
struct Args {
    /// How the sphere is triangulated.
    #[arg(long, value_enum, default_value_t = Strategy::Grid)]
    strategy: Strategy,

    /// Sphere subdivisions; defaults to 64 for `grid` and 20 for `stacked`.
    #[arg(long)]
    segments: Option<u32>,

    /// Render target width in pixels.
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Render target height in pixels.
    #[arg(long, default_value_t = 1000)]
    height: u32,

    /// Directory the PNG files are written to.
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Sweep the model through 0..=360 degrees, one frame per step.
    #[arg(long)]
    animate: bool,

    /// Rotation step of the sweep, in degrees.
    #[arg(long, default_value_t = 10)]
    step: u32,

    /// WGSL file to use instead of the built-in shader.
    #[arg(long)]
    shader: Option<PathBuf>,

    /// Row alignment of the readback buffer, in bytes.
    #[arg(long, default_value_t = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)]
    row_alignment: u32,

    /// Log filter (e.g. "info", "sphere_capture=debug,wgpu=warn"); overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Strategy {
    Grid,
    Stacked,
}

impl From<Strategy> for SphereStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Grid => SphereStrategy::Grid,
            Strategy::Stacked => SphereStrategy::Stacked,
        }
    }
}

fn init_logging(filter: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    match filter.map(str::to_owned).or_else(|| std::env::var("RUST_LOG").ok()) {
        Some(filter) => {
            builder.parse_filters(&filter);
        }
        None => {
            builder
                .filter_level(log::LevelFilter::Info)
                .filter_module("wgpu_core", log::LevelFilter::Warn)
                .filter_module("wgpu_hal", log::LevelFilter::Warn)
                .filter_module("naga", log::LevelFilter::Warn);
        }
    }
    builder.init();
}

fn config_from(args: &Args) -> RenderConfig {
    let strategy = SphereStrategy::from(args.strategy);
    RenderConfig {
        width: args.width,
        height: args.height,
        segments: args.segments.unwrap_or(strategy.default_segments()),
        row_alignment: args.row_alignment,
        mode: if args.animate {
            RenderMode::Sweep {
                step_degrees: args.step,
            }
        } else {
            RenderMode::Static
        },
        out_dir: args.out_dir.clone(),
        ..RenderConfig::for_strategy(strategy)
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let shader_source = match &args.shader {
        Some(path) => std::fs::read_to_string(path).map_err(|source| Error::ShaderSource {
            path: path.clone(),
            source,
        })?,
        None => SHADER_SOURCE.to_string(),
    };

    let report = App::new(config_from(args), shader_source).run()?;
    log::info!(
        "{} frame(s) written, {} skipped",
        report.written.len(),
        report.failed.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
