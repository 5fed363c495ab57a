//! roadscape CLI - run the driving scene headless and inspect terrain.

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use roadscape::render::FrameRecorder;
use roadscape::terrain::{HeightmapGenerator, TileKey};
use roadscape::world::{DriveInput, FrameClock, World, WorldConfig};

/// Verbosity from -q / -v / -vv; `None` defers to RUST_LOG.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter);
    // Already installed (e.g. by a test harness) is fine.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("roadscape-cli");

    let mut level = None;
    let mut rest: Vec<&str> = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => level = Some("debug"),
            "-vv" | "--trace" => level = Some("trace"),
            "-q" | "--quiet" => level = Some("warn"),
            _ => rest.push(arg),
        }
    }
    init_tracing(level);

    let Some((&command, options)) = rest.split_first() else {
        print_usage(prog);
        return Ok(());
    };

    match command {
        "drive" | "d" => cmd_drive(&Options::parse(options)?),
        "heightmap" | "hm" => {
            let opts = Options::parse(options)?;
            let key = opts
                .positional
                .context("heightmap needs a tile key")?
                .parse::<i32>()
                .context("tile key must be an integer")?;
            cmd_heightmap(&opts, TileKey(key))
        }
        "config" | "c" => {
            println!("{}", load_config(&Options::parse(options)?)?.to_json_pretty()?);
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_usage(prog);
            Ok(())
        }
        other => {
            print_usage(prog);
            bail!("unknown command: {other}")
        }
    }
}

fn print_usage(prog: &str) {
    println!("roadscape CLI - headless road terrain driver");
    println!();
    println!("Usage: {prog} [options] <command> [args]");
    println!();
    println!("Commands:");
    println!("  d, drive           Drive forward and report streaming/render stats");
    println!("       --ticks N     Simulation ticks to run (default 600)");
    println!("       --speed S     Forward speed in units/s (default 20)");
    println!("       --fps F       Render rate fed to the frame clock (default 144)");
    println!("  hm, heightmap K    Generate tile K and print a summary");
    println!("  c, config          Print the effective config as JSON");
    println!("  h, help            Show this help");
    println!();
    println!("Options:");
    println!("  --config FILE  Load a JSON world config");
    println!("  -v, --verbose  Debug output");
    println!("  -vv, --trace   Trace output (very verbose)");
    println!("  -q, --quiet    Warnings only");
}

#[derive(Debug, Default)]
struct Options<'a> {
    config: Option<&'a str>,
    ticks: Option<u64>,
    speed: Option<f32>,
    fps: Option<f32>,
    positional: Option<&'a str>,
}

impl<'a> Options<'a> {
    fn parse(args: &[&'a str]) -> Result<Self> {
        let mut opts = Self::default();
        let mut it = args.iter().copied();
        while let Some(arg) = it.next() {
            let mut value = |name: &str| it.next().with_context(|| format!("{name} needs a value"));
            match arg {
                "--config" => opts.config = Some(value("--config")?),
                "--ticks" => opts.ticks = Some(value("--ticks")?.parse().context("--ticks")?),
                "--speed" => opts.speed = Some(value("--speed")?.parse().context("--speed")?),
                "--fps" => opts.fps = Some(value("--fps")?.parse().context("--fps")?),
                _ if opts.positional.is_none() => opts.positional = Some(arg),
                _ => bail!("unexpected argument: {arg}"),
            }
        }
        Ok(opts)
    }
}

fn load_config(opts: &Options) -> Result<WorldConfig> {
    match opts.config {
        Some(path) => {
            debug!(path, "loading config");
            WorldConfig::load(Path::new(path)).with_context(|| format!("failed to load {path}"))
        }
        None => Ok(WorldConfig::default()),
    }
}

fn cmd_drive(opts: &Options) -> Result<()> {
    let mut config = load_config(opts)?;
    config.drive_speed = opts.speed.unwrap_or(20.0);
    let ticks = opts.ticks.unwrap_or(600);
    let fps = opts.fps.unwrap_or(144.0);
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be positive");
    }

    let mut clock = FrameClock::new(config.tick_rate, 8);
    let mut world = World::new(config)?;
    let mut target = FrameRecorder::new();
    let frame_time = Duration::from_secs_f32(1.0 / fps);
    let input = DriveInput::default();

    while world.ticks() < ticks {
        for _ in 0..clock.advance(frame_time) {
            world.step(&input)?;
        }
        world.render(&mut target, 16.0 / 9.0);
    }

    let stats = world.streamer().stats();
    let pos = world.camera().position();
    info!(ticks = world.ticks(), frames = target.frames, "drive finished");

    println!("Ticks:      {}", world.ticks());
    println!("Frames:     {}", target.frames);
    println!("Camera:     ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z);
    let keys: Vec<String> = world.streamer().active_keys().map(|k| k.0.to_string()).collect();
    println!("Window:     [{}]", keys.join(", "));
    println!("Tiles:      {} built, {} cache hits, {} evicted", stats.tiles_built, stats.cache_hits, stats.evicted);
    println!("Cached:     {}", world.streamer().cached_len());
    println!("Nodes:      {}", world.graph().len());
    println!(
        "Last frame: {} draws ({} translucent), {} triangles",
        target.draws.len(),
        target.draws.iter().filter(|d| d.translucent).count(),
        target.triangles()
    );
    Ok(())
}

fn cmd_heightmap(opts: &Options, key: TileKey) -> Result<()> {
    let config = load_config(opts)?;
    let mut heightmaps = HeightmapGenerator::new(&config.terrain)?;
    let map = heightmaps.generate(key);
    let (lo, hi) = map.elevation_range();

    let mut per_material = [0usize; 3];
    for &m in map.materials() {
        if let Some(count) = per_material.get_mut(m as usize) {
            *count += 1;
        }
    }

    println!("{key}: {}x{} samples", map.rows(), map.cols());
    println!("Origin z:   {:.2}", key.origin_z(config.terrain.tile_size));
    println!("Elevation:  {lo:.3} .. {hi:.3}");
    println!("Materials:  {:?}", per_material);

    // Coarse preview of the first row, road in the middle.
    const RAMP: &[u8] = b" .:-=+*#%@";
    let max = heightmaps.max_height().max(f32::EPSILON);
    let preview: String = map
        .row(0)
        .iter()
        .map(|h| {
            let i = ((h / max) * (RAMP.len() - 1) as f32).round() as usize;
            RAMP[i.min(RAMP.len() - 1)] as char
        })
        .collect();
    println!("Row 0:      |{preview}|");
    Ok(())
}
