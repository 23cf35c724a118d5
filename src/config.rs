/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.config/blockfall`.
/// A missing file or missing keys fall back to defaults; a file that
/// exists but does not parse is reported so the caller can warn.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::color::Rgb;
use crate::domain::shape::Shape;
use crate::error::ConfigError;
use crate::sim::board::{MAX_SIDE, MIN_SIDE};

pub const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub timing: TimingConfig,
    pub keys: KeyConfig,
    pub gamepad: GamepadConfig,
    pub logging: LoggingConfig,
    /// Base color overrides from `[colors]`.
    pub colors: Vec<(Shape, Rgb)>,
    /// Fixed RNG seed for reproducible piece order.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub frame_sleep_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyConfig {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub enabled: bool,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Empty disables logging.
    pub file: PathBuf,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    logging: TomlLogging,
    #[serde(default)]
    colors: BTreeMap<String, String>,
    #[serde(default)]
    game: TomlGame,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_key_left")]
    left: Vec<String>,
    #[serde(default = "default_key_right")]
    right: Vec<String>,
    #[serde(default = "default_key_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_pad_left")]
    left: Vec<String>,
    #[serde(default = "default_pad_right")]
    right: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGame {
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_width() -> usize { 10 }
fn default_height() -> usize { 22 }
fn default_tick_ms() -> u64 { 100 }
fn default_frame_sleep() -> u64 { 5 }
fn default_true() -> bool { true }

fn default_key_left() -> Vec<String> { vec!["Left".into(), "a".into(), "h".into()] }
fn default_key_right() -> Vec<String> { vec!["Right".into(), "d".into(), "l".into()] }
fn default_key_quit() -> Vec<String> { vec!["Esc".into(), "q".into()] }

fn default_pad_left() -> Vec<String> { vec!["L1".into()] }
fn default_pad_right() -> Vec<String> { vec!["R1".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_log_file() -> String { "blockfall.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_ms: default_tick_ms(),
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            left: default_key_left(),
            right: default_key_right(),
            quit: default_key_quit(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            enabled: default_true(),
            left: default_pad_left(),
            right: default_pad_right(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

// ── Resolving ──

impl TomlConfig {
    fn resolve(self) -> Result<GameConfig, ConfigError> {
        let (width, height) = (self.board.width, self.board.height);
        let side = MIN_SIDE..=MAX_SIDE;
        if !side.contains(&width) || !side.contains(&height) {
            return Err(ConfigError::BoardSize { width, height, min: MIN_SIDE, max: MAX_SIDE });
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::TickInterval);
        }

        let mut colors = Vec::with_capacity(self.colors.len());
        for (name, hex) in &self.colors {
            let shape = Shape::from_name(name)
                .ok_or_else(|| ConfigError::UnknownShape(name.clone()))?;
            let rgb = Rgb::from_hex(hex).map_err(|source| ConfigError::Color {
                shape: shape.name().to_string(),
                source,
            })?;
            colors.push((shape, rgb));
        }

        Ok(self.into_config(colors))
    }

    fn into_config(self, colors: Vec<(Shape, Rgb)>) -> GameConfig {
        GameConfig {
            board: BoardConfig {
                width: self.board.width,
                height: self.board.height,
            },
            timing: TimingConfig {
                tick_ms: self.timing.tick_ms,
                frame_sleep_ms: self.timing.frame_sleep_ms,
            },
            keys: KeyConfig {
                left: self.keys.left,
                right: self.keys.right,
                quit: self.keys.quit,
            },
            gamepad: GamepadConfig {
                enabled: self.gamepad.enabled,
                left: self.gamepad.left,
                right: self.gamepad.right,
                quit: self.gamepad.quit,
            },
            logging: LoggingConfig {
                file: PathBuf::from(self.logging.file),
                level: self.logging.level,
            },
            colors,
            seed: self.game.seed,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into_config(vec![])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.config/blockfall`.
    /// No file at all is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match find_config(&candidate_dirs()) {
            Some(path) => Self::from_file(&path),
            None => Ok(GameConfig::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str::<TomlConfig>(text)?.resolve()
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timing.tick_ms)
    }

    pub fn frame_sleep(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timing.frame_sleep_ms)
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (symlinks resolved)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG config home (~/.config/blockfall)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".config/blockfall");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First `config.toml` found in the candidate directories.
fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.board, BoardConfig { width: 10, height: 22 });
        assert_eq!(cfg.timing, TimingConfig { tick_ms: 100, frame_sleep_ms: 5 });
        assert_eq!(cfg.keys.left, vec!["Left", "a", "h"]);
        assert!(cfg.gamepad.enabled);
        assert_eq!(cfg.logging.file, PathBuf::from("blockfall.log"));
        assert!(cfg.colors.is_empty());
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[board]\nwidth = 12\n\n[timing]\ntick_ms = 250\n\n[game]\nseed = 9\n",
        )
        .unwrap();
        assert_eq!(cfg.board, BoardConfig { width: 12, height: 22 });
        assert_eq!(cfg.timing.tick_ms, 250);
        assert_eq!(cfg.timing.frame_sleep_ms, 5);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.tick_interval(), std::time::Duration::from_millis(250));
    }

    #[test]
    fn color_overrides_are_parsed() {
        let cfg = GameConfig::from_toml_str("[colors]\no = \"#102030\"\n").unwrap();
        assert_eq!(cfg.colors, vec![(Shape::O, Rgb::new(0x10, 0x20, 0x30))]);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            GameConfig::from_toml_str("[board]\nwidth = 3\n"),
            Err(ConfigError::BoardSize { width: 3, height: 22, .. })
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[timing]\ntick_ms = 0\n"),
            Err(ConfigError::TickInterval)
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[colors]\nQ = \"#ffffff\"\n"),
            Err(ConfigError::UnknownShape(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[colors]\nT = \"purple\"\n"),
            Err(ConfigError::Color { .. })
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[board\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn oversized_board_is_rejected() {
        assert!(matches!(
            GameConfig::from_toml_str("[board]\nwidth = 9223372036854775807\nheight = 4\n"),
            Err(ConfigError::BoardSize { height: 4, max: MAX_SIDE, .. })
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[board]\nheight = 257\n"),
            Err(ConfigError::BoardSize { width: 10, height: 257, .. })
        ));
        let cfg = GameConfig::from_toml_str("[board]\nwidth = 256\nheight = 256\n").unwrap();
        assert_eq!(cfg.board, BoardConfig { width: MAX_SIDE, height: MAX_SIDE });
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = GameConfig::from_file(Path::new("/nonexistent/blockfall/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
