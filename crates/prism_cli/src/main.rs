//! prism - headless Monte Carlo path tracer.
//!
//! Reads a declarative TOML scene, renders it with the path tracing
//! core, and writes a gamma-corrected PPM (P3) image to stdout or a
//! file. Diagnostics and progress go to stderr via the logger; the
//! output stream carries nothing but the image.

use anyhow::Context;
use clap::Parser;
use prism_render::{render, write_ppm};
use prism_scene::load_scene;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// Every failure, from a bad flag to a missing scene file, exits with
/// this code; success is 0.
const EXIT_FAILURE: u8 = 84;

#[derive(Parser, Debug)]
#[command(
    name = "prism",
    version,
    about = "Headless Monte Carlo path tracer: TOML scene in, PPM image out",
    after_help = "EXAMPLES:\n  \
                  prism --config scenes/cornell.toml > cornell.ppm\n  \
                  prism --config scenes/cornell.toml --fast --output preview.ppm\n  \
                  RUST_LOG=debug prism --config scenes/weekend.toml --seed 7 > out.ppm"
)]
struct Cli {
    /// Scene description file (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Preview overrides: 300 px wide, 10 samples per pixel, depth 50
    #[arg(long)]
    fast: bool,

    /// Base RNG seed; a fixed seed gives a byte-stable image
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the image here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            eprintln!("{err}");
            return ExitCode::from(EXIT_FAILURE);
        }
        Err(err) => {
            // --help / --version
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut scene = load_scene(&cli.config, cli.seed)?;

    if cli.fast {
        scene.camera.image_width = 300;
        scene.camera.samples_per_pixel = 10;
        scene.camera.max_depth = 50;
    }
    scene.camera.initialize();

    let width = scene.camera.image_width;
    let height = scene.camera.image_height();
    log::info!(
        "rendering {}x{} at {} spp, depth {}, seed {}",
        width,
        height,
        scene.camera.samples_per_pixel,
        scene.camera.max_depth,
        cli.seed
    );

    let start = Instant::now();
    let image = render(&scene.camera, scene.world.as_ref(), cli.seed);
    let elapsed = start.elapsed().as_secs_f64();

    let total_rays = width as u64 * height as u64 * scene.camera.samples_per_pixel as u64;
    log::info!(
        "traced {:.2}M primary rays in {elapsed:.2}s ({:.2} Mrays/s)",
        total_rays as f64 / 1e6,
        total_rays as f64 / elapsed / 1e6
    );

    match &cli.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create `{}`", path.display()))?;
            write_ppm(file, &image).context("writing image")?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_ppm(stdout.lock(), &image).context("writing image")?;
        }
    }

    Ok(())
}
