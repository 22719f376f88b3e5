//! `fluid-gradient` binary.
//!
//! ```text
//! fluid-gradient                                   interactive window
//! fluid-gradient render [--size WxH] [--frames N] [--out file.png]
//! fluid-gradient glass <image> [--out file.png] [--mouse x,y]
//! ```
//!
//! `glass` without `--out` opens a window; with it, renders one frame on
//! the CPU.

use std::error::Error;
use std::time::{Duration, Instant};

use fluid_gradient::prelude::*;

const FRAME_STEP: Duration = Duration::from_micros(16_667);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result: Result<(), Box<dyn Error>> = match args.first().map(String::as_str) {
        None => FluidEffect::new().run().map_err(Into::into),
        Some("render") => render(&args[1..]),
        Some("glass") => glass(&args[1..]),
        Some(other) => Err(format!("unknown command '{}' (expected render or glass)", other).into()),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Value following `--name`, if present.
fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_pair<T: std::str::FromStr>(s: &str, sep: char) -> Option<(T, T)> {
    let (a, b) = s.split_once(sep)?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Headless CPU render with a pointer orbiting the centre.
fn render(args: &[String]) -> Result<(), Box<dyn Error>> {
    let (width, height) = match flag(args, "--size") {
        Some(s) => parse_pair::<u32>(s, 'x').ok_or_else(|| format!("invalid --size '{}', expected WxH", s))?,
        None => (640, 360),
    };
    let frames: u32 = match flag(args, "--frames") {
        Some(s) => s.parse().map_err(|_| format!("invalid --frames '{}'", s))?,
        None => 180,
    };
    let out = flag(args, "--out").unwrap_or("gradient.png");

    let config = FluidConfig::default();
    config.validate()?;

    let t0 = Instant::now();
    let mut time = Time::starting_at(t0);
    time.set_fixed_delta(Some(FRAME_STEP.as_secs_f32()));
    let mut scheduler = FrameScheduler::with_time(CpuBackend::new(config, width, height), time);

    let center = Vec2::new(width as f32, height as f32) * 0.5;
    let radius = center.min_element() * 0.6;
    log::info!("Rendering {} frames at {}x{}", frames, width, height);

    for i in 0..frames {
        let now = t0 + FRAME_STEP * i;
        let angle = i as f32 * 0.05;
        let screen = center + radius * Vec2::new(angle.cos(), angle.sin());
        scheduler.pointer_mut().on_move(screen, now);
        scheduler.tick_at(now);
    }

    scheduler.backend().to_image().save(out)?;
    log::info!("Wrote {}", out);
    Ok(())
}

fn glass(args: &[String]) -> Result<(), Box<dyn Error>> {
    let path = args.first().ok_or("glass needs an image path")?;
    let Some(effect) = GlassEffect::load(path, GlassParams::default())? else {
        return Ok(());
    };

    let Some(out) = flag(args, "--out") else {
        return Ok(effect.run()?);
    };

    let mouse = match flag(args, "--mouse") {
        Some(s) => parse_pair::<f32>(s, ',').ok_or_else(|| format!("invalid --mouse '{}', expected x,y", s))?,
        None => (0.5, 0.5),
    };
    let (width, height) = effect.image().dimensions();
    effect
        .render(Vec2::new(mouse.0, mouse.1), width, height)
        .save(out)?;
    log::info!("Wrote {}", out);
    Ok(())
}
