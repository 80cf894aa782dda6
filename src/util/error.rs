// CrashSleuth - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation.
//
// None of these can surface from rule evaluation: the engine is infallible
// and every error here belongs to an I/O or configuration boundary.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all CrashSleuth operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CrashSleuthError {
    /// Mod registry loading failed.
    Registry(RegistryError),

    /// Message template loading failed.
    Strings(StringsError),

    /// Facts document loading failed.
    Facts(FactsError),

    /// Report export failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for CrashSleuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "Registry error: {e}"),
            Self::Strings(e) => write!(f, "Strings error: {e}"),
            Self::Facts(e) => write!(f, "Facts error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for CrashSleuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            Self::Strings(e) => Some(e),
            Self::Facts(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

/// Errors related to loading the mod registry.
#[derive(Debug)]
pub enum RegistryError {
    /// JSON could not be parsed into registry entries.
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Registry file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// I/O error reading the registry file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonParse { path, source } => {
                write!(f, "Failed to parse registry '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Registry '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "I/O error reading registry '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JsonParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RegistryError> for CrashSleuthError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Strings errors
// ---------------------------------------------------------------------------

/// Errors related to loading message templates.
#[derive(Debug)]
pub enum StringsError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A template value is not a string (e.g. a number or a nested table).
    NotAString { path: PathBuf, key: String },

    /// Strings file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// I/O error reading a strings file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for StringsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::NotAString { path, key } => write!(
                f,
                "'{}': template '{key}' is not a string",
                path.display()
            ),
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Strings file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading strings '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for StringsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StringsError> for CrashSleuthError {
    fn from(e: StringsError) -> Self {
        Self::Strings(e)
    }
}

// ---------------------------------------------------------------------------
// Facts errors
// ---------------------------------------------------------------------------

/// Errors related to loading a facts document or its raw log.
#[derive(Debug)]
pub enum FactsError {
    /// JSON could not be parsed into a facts snapshot.
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Input file exceeds the configured maximum size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// I/O error reading the facts document or the raw log.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for FactsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonParse { path, source } => {
                write!(f, "'{}': invalid facts document: {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "'{}' is {size} bytes, exceeds maximum of {max_size} bytes. \
                 Raise [input] max_file_size_bytes in config if this is expected.",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FactsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JsonParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FactsError> for CrashSleuthError {
    fn from(e: FactsError) -> Self {
        Self::Facts(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the rendered report.
    Io { target: String, source: io::Error },

    /// JSON serialisation error.
    Json {
        target: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { target, source } => {
                write!(f, "Export I/O error '{target}': {source}")
            }
            Self::Json { target, source } => {
                write!(f, "JSON export error '{target}': {source}")
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for CrashSleuthError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for CrashSleuthError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for CrashSleuth results.
pub type Result<T> = std::result::Result<T, CrashSleuthError>;
