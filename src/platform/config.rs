// CrashSleuth - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for CrashSleuth data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/crashsleuth/ or %APPDATA%\CrashSleuth\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the default mod registry.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
                data_dir: PathBuf::from("."),
            }
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    /// Registry location used when neither the CLI nor config.toml names one.
    pub fn default_registry(&self) -> PathBuf {
        self.data_dir.join(constants::REGISTRY_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads in
/// an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub registry: RegistrySection,
    pub strings: StringsSection,
    pub input: InputSection,
    pub analysis: AnalysisSection,
    pub logging: LoggingSection,
}

/// `[registry]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Mod registry JSON path.
    pub path: Option<String>,
}

/// `[strings]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StringsSection {
    /// User template override TOML path.
    pub path: Option<String>,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Maximum accepted facts/log/registry file size in bytes.
    pub max_file_size_bytes: Option<u64>,
}

/// `[analysis]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Number of worker threads for batch evaluation (0 = auto).
    pub worker_threads: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Registry path from config; `None` means the platform default.
    pub registry_path: Option<PathBuf>,

    /// Template override path.
    pub strings_path: Option<PathBuf>,

    pub max_file_size: u64,

    /// 0 = one worker per CPU core.
    pub worker_threads: usize,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,

    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry_path: None,
            strings_path: None,
            max_file_size: constants::DEFAULT_MAX_INPUT_FILE_SIZE,
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            log_level: None,
            log_file: None,
        }
    }
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value.filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}

/// Load and validate `config.toml` from the given config directory.
///
/// See `load_config_file`.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<ConfigError>) {
    load_config_file(&config_dir.join(constants::CONFIG_FILE_NAME))
}

/// Load and validate a config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal problems.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus the error, so the tool still runs
/// but the user is told.
pub fn load_config_file(config_path: &Path) -> (AppConfig, Vec<ConfigError>) {
    let mut warnings: Vec<ConfigError> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            });
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            });
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);
    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }
    (config, warnings)
}

/// Check each field against its named bounds, accumulating every problem.
fn validate(raw: RawConfig, warnings: &mut Vec<ConfigError>) -> AppConfig {
    let mut config = AppConfig {
        registry_path: non_empty_path(raw.registry.path),
        strings_path: non_empty_path(raw.strings.path),
        ..AppConfig::default()
    };

    // -- Input: max_file_size_bytes --
    if let Some(size) = raw.input.max_file_size_bytes {
        if (constants::MIN_MAX_INPUT_FILE_SIZE..=constants::ABSOLUTE_MAX_INPUT_FILE_SIZE)
            .contains(&size)
        {
            config.max_file_size = size;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[input] max_file_size_bytes".to_string(),
                value: size.to_string(),
                expected: format!(
                    "{}-{} (using default {})",
                    constants::MIN_MAX_INPUT_FILE_SIZE,
                    constants::ABSOLUTE_MAX_INPUT_FILE_SIZE,
                    constants::DEFAULT_MAX_INPUT_FILE_SIZE,
                ),
            });
        }
    }

    // -- Analysis: worker_threads --
    if let Some(threads) = raw.analysis.worker_threads {
        if threads <= constants::MAX_WORKER_THREADS {
            config.worker_threads = threads;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[analysis] worker_threads".to_string(),
                value: threads.to_string(),
                expected: format!(
                    "0-{} (using default {})",
                    constants::MAX_WORKER_THREADS,
                    constants::DEFAULT_WORKER_THREADS,
                ),
            });
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[logging] level".to_string(),
                value: level,
                expected: format!(
                    "one of error, warn, info, debug, trace (using default {})",
                    constants::DEFAULT_LOG_LEVEL
                ),
            });
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file);
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(content: &str) -> (AppConfig, Vec<ConfigError>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), content).unwrap();
        load_config(dir.path())
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config() {
        let (config, warnings) = load(
            r#"
[registry]
path = "/srv/mods.json"

[strings]
path = ""

[input]
max_file_size_bytes = 2048

[analysis]
worker_threads = 4

[logging]
level = "debug"
file = "crashsleuth.log"
"#,
        );
        assert!(warnings.is_empty());
        assert_eq!(config.registry_path, Some(PathBuf::from("/srv/mods.json")));
        assert_eq!(config.strings_path, None);
        assert_eq!(config.max_file_size, 2048);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file.as_deref(), Some("crashsleuth.log"));
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let (config, warnings) = load(
            "[input]\nmax_file_size_bytes = 10\n[analysis]\nworker_threads = 1000\n[logging]\nlevel = \"loud\"\n",
        );
        assert_eq!(warnings.len(), 3);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, ConfigError::ValueOutOfRange { .. })));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unparseable_config_reports_error() {
        let (config, warnings) = load("[input\nmax_file_size_bytes = ");
        assert_eq!(config, AppConfig::default());
        assert!(matches!(warnings[0], ConfigError::TomlParse { .. }));
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let (_, warnings) = load("[ui]\ntheme = \"dark\"\n");
        assert!(warnings.is_empty());
    }
}
