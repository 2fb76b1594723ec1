/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from
/// an explicit path given on the command line.
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub rules: RulesConfig,
    pub scores: ScoresConfig,
    pub log: LogConfig,
    pub gamepad: GamepadConfig,
}

/// Board size in cells. 0 = derive from the terminal size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub columns: u16,
    pub rows: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub tick_rate_ms: u64,
    pub start_length: usize,
    pub growth: u32,      // segments added per food
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoresConfig {
    pub capacity: usize,
    pub file: PathBuf,    // relative paths resolve against the save dir
    pub base_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub filter: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    scores: TomlScores,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default)]
    columns: u16,
    #[serde(default)]
    rows: u16,
    #[serde(default = "default_start_length")]
    start_length: usize,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_growth")]
    growth: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScores {
    #[serde(default = "default_capacity")]
    capacity: usize,
    #[serde(default = "default_scores_file")]
    file: String,
    #[serde(default = "default_base_url")]
    base_url: String,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_filter")]
    filter: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

// ── Defaults ──

fn default_start_length() -> usize { 3 }
fn default_tick_rate() -> u64 { 50 }
fn default_growth() -> u32 { 1 }
fn default_capacity() -> usize { 3 }
fn default_scores_file() -> String { "scores.url".into() }
fn default_base_url() -> String { "https://checksnake.local/".into() }
fn default_log_file() -> String { "checksnake.log".into() }
fn default_log_filter() -> String { "checksnake=info".into() }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into(), "B".into()] }
fn default_pause() -> Vec<String> { vec!["Y".into()] }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { columns: 0, rows: 0, start_length: default_start_length() }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate(), growth: default_growth() }
    }
}

impl Default for TomlScores {
    fn default() -> Self {
        TomlScores {
            capacity: default_capacity(),
            file: default_scores_file(),
            base_url: default_base_url(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), filter: default_log_filter() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            pause: default_pause(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `explicit`, or search for `config.toml`:
    /// (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let toml_cfg = match explicit {
            Some(path) => read_toml(path).unwrap_or_default(),
            None => load_toml(&candidate_dirs()),
        };
        GameConfig::from_toml(toml_cfg)
    }

    /// Parse config text directly. Used by tests and `--config` validation.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let log_file = cfg.log.file.trim();
        GameConfig {
            grid: GridConfig {
                columns: cfg.grid.columns,
                rows: cfg.grid.rows,
            },
            rules: RulesConfig {
                tick_rate_ms: cfg.speed.tick_rate_ms.max(1),
                start_length: cfg.grid.start_length.max(1),
                growth: cfg.speed.growth.max(1),
            },
            scores: ScoresConfig {
                capacity: cfg.scores.capacity.max(1),
                file: PathBuf::from(cfg.scores.file),
                base_url: cfg.scores.base_url,
            },
            log: LogConfig {
                file: (!log_file.is_empty()).then(|| PathBuf::from(log_file)),
                filter: cfg.log.filter,
            },
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
                pause: cfg.gamepad.pause,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
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

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            if let Some(cfg) = read_toml(&path) {
                return cfg;
            }
            return TomlConfig::default();
        }
    }
    TomlConfig::default()
}

/// Runs before the terminal is taken over, so warnings go to stderr.
fn read_toml(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!("Warning: {} parse error: {e}", path.display());
                eprintln!("Using default settings.");
                None
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            None
        }
    }
}
