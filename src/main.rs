//! # Sun Map Application Entry Point
//!
//! Computes the sun's position and the day/night terminator for one instant
//! and renders the result. It supports image mode (binary PBM written to
//! disk), development mode (ASCII output) and a JSON dump of the snapshot.


use anyhow::{bail, Context};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use sunmap_lib::config::Config;
use sunmap_lib::framebuffer::MapBuffer;
use sunmap_lib::renderer::{draw_ascii, draw_map};
use sunmap_lib::{Instant, SunMap};

const USAGE: &str = "usage: sunmap [--stdout | --json] [--at <RFC3339>] [--config <path>] [--output <path>]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    stdout: bool,
    json: bool,
    at: Option<String>,
    config: Option<String>,
    output: Option<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stdout" => parsed.stdout = true,
            "--json" => parsed.json = true,
            "--at" => parsed.at = Some(args.next().context("--at needs a timestamp")?),
            "--config" => parsed.config = Some(args.next().context("--config needs a path")?),
            "--output" => parsed.output = Some(args.next().context("--output needs a path")?),
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument `{other}`\n{USAGE}"),
        }
    }
    if parsed.stdout && parsed.json {
        bail!("--stdout and --json are mutually exclusive");
    }
    Ok(parsed)
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    // Fixed instant for reproducible maps, otherwise the system clock
    let instant = match &args.at {
        Some(text) => Instant::parse_rfc3339(text)
            .with_context(|| format!("invalid --at timestamp `{text}`"))?,
        None => Instant::now(),
    };
    let observer = config.observer();

    // Development mode: ASCII output for testing
    if args.stdout {
        let map = SunMap::compute(
            instant,
            config.ascii.columns,
            config.ascii.rows,
            config.map.apparent,
        )?;
        draw_ascii(&map, observer.as_ref());
        return Ok(());
    }

    let map = SunMap::compute(
        instant,
        config.map.width,
        config.map.height,
        config.map.apparent,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    let mut buffer = MapBuffer::new(map.width, map.height);
    draw_map(&map, observer.as_ref(), &mut buffer).unwrap_or_else(|never| match never {});

    let output = args.output.unwrap_or(config.map.output);
    let file = File::create(&output).with_context(|| format!("create {output}"))?;
    buffer
        .write_pbm(BufWriter::new(file))
        .with_context(|| format!("write {output}"))?;

    let (lat, lon) = map.sun.subsolar_point();
    log::info!(
        "Sun over {:.2} lat, {:.2} lon at {}; map written to {}",
        lat,
        lon,
        map.instant,
        output
    );
    Ok(())
}
