// Configuration loading and parsing (huddle.toml, credentials.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::export::default_export_dir;
use crate::grouping::MIN_GROUP_SIZE;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub draw: DrawConfig,
    pub grouping: GroupingConfig,
    pub llm: LlmConfig,
    pub export: ExportConfig,
    pub credentials: CredentialsConfig,
}

impl Config {
    /// Directory CSV exports are written to.
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_export_dir)
    }
}

// ---------------------------------------------------------------------------
// huddle.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire huddle.toml file.
#[derive(Debug, Clone, Deserialize)]
struct HuddleFile {
    #[serde(default)]
    draw: DrawConfig,
    #[serde(default)]
    grouping: GroupingConfig,
    #[serde(default)]
    llm: LlmConfig,
    #[serde(default)]
    export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Whether a participant may win more than once.
    pub allow_repeat: bool,
    /// Delay between suspense animation frames.
    pub animation_interval_ms: u64,
    /// Total suspense animation length before the winner is revealed.
    pub animation_duration_ms: u64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        DrawConfig {
            allow_repeat: false,
            animation_interval_ms: 80,
            animation_duration_ms: 2500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub group_size: usize,
    pub theme: String,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        GroupingConfig {
            group_size: 4,
            theme: "Superheroes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on one naming request before falling back to placeholders.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 400,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// Export directory; the user's download directory when absent.
    #[serde(default)]
    pub directory: Option<String>,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/huddle.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- huddle.toml (required) ---
    let huddle_path = config_dir.join("huddle.toml");
    let huddle_text = read_file(&huddle_path)?;
    let huddle_file: HuddleFile =
        toml::from_str(&huddle_text).map_err(|e| ConfigError::ParseError {
            path: huddle_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        draw: huddle_file.draw,
        grouping: huddle_file.grouping,
        llm: huddle_file.llm,
        export: huddle_file.export,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// into `config/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.draw.animation_interval_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "draw.animation_interval_ms".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.grouping.group_size < MIN_GROUP_SIZE {
        return Err(ConfigError::ValidationError {
            field: "grouping.group_size".into(),
            message: format!(
                "must be at least {MIN_GROUP_SIZE}, got {}",
                config.grouping.group_size
            ),
        });
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "llm.model".into(),
            message: "must not be empty".into(),
        });
    }

    let llm_fields: &[(&str, u64)] = &[
        ("llm.max_tokens", u64::from(config.llm.max_tokens)),
        ("llm.timeout_secs", config.llm.timeout_secs),
    ];
    for (name, val) in llm_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
