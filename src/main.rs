/// Entry point and frame loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use config::GameConfig;
use sim::driver::{Frame, FrameDriver};
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const KEYS_QUIT: &[&str] = &["q", "escape"];
const KEYS_PAUSE: &[&str] = &["p", "f1"];
const KEYS_RESTART: &[&str] = &["r"];

/// Terminal failures that end the run.
#[derive(Debug, Error)]
enum AppError {
    #[error("terminal init failed: {0}")]
    Init(#[source] io::Error),
    #[error("frame failed at tick {tick}: {source}")]
    Frame { tick: u64, source: io::Error },
}

/// Human-vs-AI pursuit on a bounded plane
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: config.toml next to the binary or in the cwd)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write log records to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let (config, config_err) = match GameConfig::load(args.config.as_deref()) {
        Ok(c) => (c, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    let log_file = args.log_file.clone().or_else(|| config.log_file.clone());
    let log_buffer = logging::init(args.verbose, log_file.as_deref());
    if let Some(e) = config_err {
        warn!("{e}; using defaults");
    }

    let seed = args.seed.or(config.sim.seed).unwrap_or_else(rand::random);
    info!("seed {seed}, {} pursuer(s), tick {} ms",
        config.ai.spawns.len(), config.sim.tick_rate_ms);

    let mut driver = FrameDriver::new(
        WorldState::new(&config),
        ChaCha8Rng::seed_from_u64(seed),
        Duration::from_millis(config.sim.tick_rate_ms),
    );

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init().map_err(AppError::Init) {
        let _ = renderer.cleanup();
        flush_log(log_buffer.as_ref());
        eprintln!("{e}");
        return;
    }

    let mut kb = InputState::new();
    if let Err(e) = kb.register() {
        warn!("keyboard enhancement unavailable: {e}");
    }

    let sound = SoundEngine::new();

    let result = frame_loop(&mut driver, &mut renderer, &mut kb, sound.as_ref(), &config);

    info!("stopped at tick {} ({} frames dropped, {:?} per tick)",
        driver.world.tick, driver.dropped_frames(), driver.tick_rate());

    if let Err(e) = kb.deregister() {
        warn!("keyboard restore failed: {e}");
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    flush_log(log_buffer.as_ref());

    if let Err(e) = result {
        eprintln!("{e}");
    }

    println!("Stopped after {} ticks (seed {seed}).", driver.world.tick);
}

fn flush_log(buffer: Option<&logging::LogBuffer>) {
    if let Some(buf) = buffer {
        let _ = buf.drain_to(&mut io::stderr());
    }
}

fn frame_loop<R: Rng>(
    driver: &mut FrameDriver<R>,
    renderer: &mut Renderer,
    kb: &mut InputState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), AppError> {
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }

    while driver.is_running() {
        kb.drain_events();
        gp.update();

        handle_meta(driver, kb, &gp, config);

        if driver.due() {
            let mut keys = kb.snapshot();
            gp.merge_into(&mut keys);

            let frame = driver.run_frame(&keys, renderer)
                .map_err(|source| AppError::Frame { tick: driver.world.tick, source })?;
            if let Frame::Ran(events) = frame {
                if let Some(sfx) = sound {
                    for event in &events {
                        sound::play_event(sfx, event);
                    }
                }
            }
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Quit, pause and restart. Quitting wins over everything else this frame.
fn handle_meta<R: Rng>(
    driver: &mut FrameDriver<R>,
    kb: &InputState,
    gp: &GamepadState,
    config: &GameConfig,
) {
    if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
        info!("quit requested at tick {}", driver.world.tick);
        driver.stop();
        return;
    }

    if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
        driver.toggle_pause();
        info!("{}", if driver.world.paused { "paused" } else { "resumed" });
    }

    if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
        driver.restart(config);
    }
}
