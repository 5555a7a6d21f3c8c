use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use radar_core::{BuildProfile, Viewport, builtin_profile, load_profile};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;
mod shutdown;

use shutdown::ShutdownSignal;

#[derive(Parser)]
#[command(name = "radar")]
#[command(about = "Player-centric entity radar over read-only process memory")]
struct Args {
    /// Executable name to attach to (defaults to the profile's).
    #[arg(short, long)]
    process: Option<String>,

    /// Build profile JSON; the builtin profile is used when omitted.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Initial display range in world units.
    #[arg(short, long)]
    range: Option<f32>,

    /// Milliseconds between scan/render cycles.
    #[arg(long, default_value_t = 250)]
    interval: u64,

    /// Square viewport edge length in pixels.
    #[arg(long, default_value_t = 800)]
    viewport: u32,

    /// Render a single frame and exit.
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("radar=info".parse()?))
        .init();

    let args = Args::parse();

    let profile = match &args.profile {
        Some(path) => {
            let profile = load_profile(path)?;
            info!("Loaded profile '{}' from {:?}", profile.name, path);
            profile
        }
        None => builtin_profile(),
    };

    let shutdown = Arc::new(ShutdownSignal::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.trigger())?;
    }

    run(&args, profile, &shutdown)
}

#[cfg(target_os = "windows")]
fn run(args: &Args, profile: BuildProfile, shutdown: &ShutdownSignal) -> Result<()> {
    use radar_core::{MemoryReader, Radar, RadarSettings};

    let process_name = args
        .process
        .clone()
        .unwrap_or_else(|| profile.process_name.clone());

    loop {
        if shutdown.is_shutdown() {
            return Ok(());
        }

        match MemoryReader::attach(&process_name) {
            Ok(reader) => {
                let mut radar = Radar::new(reader, profile.clone(), RadarSettings::default());
                if let Some(range) = args.range {
                    radar = radar.with_range(range);
                }

                run_radar(&mut radar, args, shutdown)?;
                if args.once || shutdown.is_shutdown() {
                    return Ok(());
                }
                info!("Process disconnected, waiting for reconnect...");
            }
            Err(e) => {
                info!("Waiting for {process_name}... ({e})");
            }
        }

        // Re-attachment cadence; interruptible.
        if shutdown.wait(Duration::from_secs(5)) {
            return Ok(());
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn run(_args: &Args, _profile: BuildProfile, _shutdown: &ShutdownSignal) -> Result<()> {
    anyhow::bail!("Live process capture is only supported on Windows")
}

/// Tick loop against one attached process. Returns normally on detach or
/// shutdown; the caller decides whether to re-attach.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn run_radar<R: radar_core::ReadMemory>(
    radar: &mut radar_core::Radar<R>,
    args: &Args,
    shutdown: &ShutdownSignal,
) -> Result<()> {
    let viewport = Viewport::new(args.viewport, args.viewport);
    info!(
        "Radar running (profile '{}', range {:.0})",
        radar.profile().name,
        radar.range()
    );

    loop {
        if shutdown.is_shutdown() {
            return Ok(());
        }

        match render::poll_key().unwrap_or(render::KeyAction::None) {
            render::KeyAction::Quit => {
                shutdown.trigger();
                return Ok(());
            }
            render::KeyAction::ZoomIn => {
                info!("Range: {:.0}", radar.zoom_in());
            }
            render::KeyAction::ZoomOut => {
                info!("Range: {:.0}", radar.zoom_out());
            }
            render::KeyAction::None => {}
        }

        match radar.tick_interruptible(viewport, shutdown.as_atomic()) {
            Ok(frame) => render::draw(&frame, radar.range()),
            Err(e) if e.is_terminal() => {
                warn!("Acquisition stopped: {e}");
                return Ok(());
            }
            Err(e) => {
                // Non-terminal errors never escape a scan; log and carry on
                // if one ever does.
                warn!("Scan failed: {e}");
            }
        }

        if args.once {
            return Ok(());
        }
        if shutdown.wait(Duration::from_millis(args.interval)) {
            return Ok(());
        }
    }
}
