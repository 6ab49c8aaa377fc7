/// External configuration loader.
///
/// Reads `config.toml` from an explicit path, or searches the executable's
/// directory, the CWD and `~/.config/pursuit`. Every key has a default, so a
/// partial file only overrides what it names. A missing file is not an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::entity::Obstacle;
use crate::domain::geometry::Bounds;

// ── Errors ──

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub human: HumanConfig,
    pub ai: AiConfig,
    pub obstacles: Vec<Obstacle>,
    pub gamepad: GamepadConfig,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub bounds: Bounds,
    pub tick_rate_ms: u64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct HumanConfig {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub size: f32,
}

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub speed: f32,
    pub size: f32,
    pub rotation_speed: f32,
    /// Total cone width, degrees.
    pub cone_angle: f32,
    pub vision_distance: f32,
    pub spawns: Vec<SpawnConfig>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct SpawnConfig {
    pub x: f32,
    pub y: f32,
    /// Initial facing, radians.
    #[serde(default)]
    pub rotation: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub pause: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug)]
struct TomlConfig {
    #[serde(default)]
    sim: TomlSim,
    #[serde(default)]
    human: TomlHuman,
    #[serde(default)]
    ai: TomlAi,
    #[serde(default = "default_obstacles")]
    obstacles: Vec<TomlObstacle>,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSim {
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlHuman {
    #[serde(default = "default_human_x")]
    x: f32,
    #[serde(default = "default_human_y")]
    y: f32,
    #[serde(default = "default_human_speed")]
    speed: f32,
    #[serde(default = "default_size")]
    size: f32,
}

#[derive(Deserialize, Debug)]
struct TomlAi {
    #[serde(default = "default_ai_speed")]
    speed: f32,
    #[serde(default = "default_size")]
    size: f32,
    #[serde(default = "default_rotation_speed")]
    rotation_speed: f32,
    #[serde(default = "default_cone_angle")]
    cone_angle: f32,
    #[serde(default = "default_vision_distance")]
    vision_distance: f32,
    #[serde(default = "default_spawns")]
    spawns: Vec<SpawnConfig>,
}

#[derive(Deserialize, Debug, Clone)]
struct TomlObstacle {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default = "default_obstacle_color")]
    color: String,
    #[serde(default)]
    pulse: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_width() -> f32 { 800.0 }
fn default_height() -> f32 { 600.0 }
fn default_tick_rate() -> u64 { 16 }     // ~60 frames/s
fn default_human_x() -> f32 { 100.0 }
fn default_human_y() -> f32 { 300.0 }
fn default_human_speed() -> f32 { 3.0 }
fn default_size() -> f32 { 15.0 }
fn default_ai_speed() -> f32 { 2.0 }
fn default_rotation_speed() -> f32 { 0.05 }
fn default_cone_angle() -> f32 { 60.0 }
fn default_vision_distance() -> f32 { 200.0 }
fn default_obstacle_color() -> String { "#8b5cf6".into() }

fn default_spawns() -> Vec<SpawnConfig> {
    vec![SpawnConfig { x: 700.0, y: 300.0, rotation: std::f32::consts::PI }]
}

fn default_obstacles() -> Vec<TomlObstacle> {
    let boxed = |x, y, width, height, color: &str| TomlObstacle {
        x, y, width, height,
        color: color.into(),
        pulse: None,
    };
    vec![
        boxed(400.0, 180.0, 80.0, 80.0, "#8b5cf6"),
        boxed(260.0, 450.0, 140.0, 40.0, "#0ea5e9"),
        boxed(580.0, 440.0, 50.0, 120.0, "#f59e0b"),
    ]
}

fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_restart() -> Vec<String> { vec!["North".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlConfig {
    fn default() -> Self {
        TomlConfig {
            sim: TomlSim::default(),
            human: TomlHuman::default(),
            ai: TomlAi::default(),
            obstacles: default_obstacles(),
            gamepad: TomlGamepad::default(),
            general: TomlGeneral::default(),
        }
    }
}

impl Default for TomlSim {
    fn default() -> Self {
        TomlSim {
            width: default_width(),
            height: default_height(),
            tick_rate_ms: default_tick_rate(),
            seed: None,
        }
    }
}

impl Default for TomlHuman {
    fn default() -> Self {
        TomlHuman {
            x: default_human_x(),
            y: default_human_y(),
            speed: default_human_speed(),
            size: default_size(),
        }
    }
}

impl Default for TomlAi {
    fn default() -> Self {
        TomlAi {
            speed: default_ai_speed(),
            size: default_size(),
            rotation_speed: default_rotation_speed(),
            cone_angle: default_cone_angle(),
            vision_distance: default_vision_distance(),
            spawns: default_spawns(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            pause: default_pause(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `explicit`, or from the first `config.toml` found in
    /// the candidate directories. No file at all yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if path.is_file() {
                return Self::load_from(&path);
            }
        }
        Ok(GameConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from)
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            sim: SimConfig {
                bounds: Bounds::new(t.sim.width, t.sim.height),
                tick_rate_ms: t.sim.tick_rate_ms.max(1),
                seed: t.sim.seed,
            },
            human: HumanConfig {
                x: t.human.x,
                y: t.human.y,
                speed: t.human.speed,
                size: t.human.size,
            },
            ai: AiConfig {
                speed: t.ai.speed,
                size: t.ai.size,
                rotation_speed: t.ai.rotation_speed,
                cone_angle: t.ai.cone_angle,
                vision_distance: t.ai.vision_distance,
                spawns: t.ai.spawns,
            },
            obstacles: t.obstacles.into_iter()
                .map(|o| {
                    let mut ob = Obstacle::new(o.x, o.y, o.width, o.height, &o.color);
                    ob.pulse = o.pulse;
                    ob
                })
                .collect(),
            gamepad: GamepadConfig {
                pause: t.gamepad.pause,
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
            },
            log_file: t.general.log_file.map(PathBuf::from),
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG config (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".config/pursuit");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_reference_scenario() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.sim.bounds, Bounds::new(800.0, 600.0));
        assert_eq!(cfg.ai.spawns.len(), 1);
        assert_eq!(cfg.ai.cone_angle, 60.0);
        assert_eq!(cfg.obstacles.len(), 3);
        assert!(cfg.sim.seed.is_none());
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[sim]\nseed = 42\n\n[ai]\nspeed = 4.5\n",
        ).unwrap();
        assert_eq!(cfg.sim.seed, Some(42));
        assert_eq!(cfg.sim.tick_rate_ms, 16);
        assert_eq!(cfg.ai.speed, 4.5);
        assert_eq!(cfg.ai.size, 15.0);
    }

    #[test]
    fn explicit_obstacles_replace_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[[obstacles]]\nx = 10.0\ny = 20.0\nwidth = 30.0\nheight = 40.0\npulse = 0.5\n",
        ).unwrap();
        assert_eq!(cfg.obstacles.len(), 1);
        assert_eq!(cfg.obstacles[0].color, "#8b5cf6");
        assert_eq!(cfg.obstacles[0].pulse, Some(0.5));
    }

    #[test]
    fn multiple_spawns() {
        let cfg = GameConfig::from_toml_str(
            "[ai]\nspawns = [{ x = 1.0, y = 2.0 }, { x = 3.0, y = 4.0, rotation = 1.5 }]\n",
        ).unwrap();
        assert_eq!(cfg.ai.spawns[0].rotation, 0.0);
        assert_eq!(cfg.ai.spawns[1], SpawnConfig { x: 3.0, y: 4.0, rotation: 1.5 });
    }

    #[test]
    fn zero_tick_rate_is_raised() {
        let cfg = GameConfig::from_toml_str("[sim]\ntick_rate_ms = 0\n").unwrap();
        assert_eq!(cfg.sim.tick_rate_ms, 1);
    }

    #[test]
    fn bad_toml_reports_path() {
        let dir = std::env::temp_dir().join(format!("pursuit-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[sim\nwidth = ").unwrap();
        let err = GameConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let err = GameConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
