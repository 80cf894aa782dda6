// CrashSleuth - app/registry_mgr.rs
//
// Loads the mod registry JSON and the message templates from disk.
// Templates come from the table embedded in the binary, with an optional
// user TOML file overriding individual keys.

use crate::core::model::ModRegistry;
use crate::core::strings::StringTable;
use crate::platform::fs::{read_limited, ReadFailure};
use crate::util::constants;
use crate::util::error::{RegistryError, StringsError};
use std::path::Path;

/// Load the mod registry from a JSON array.
///
/// A missing file is not an error: evaluation proceeds with an empty
/// registry, so every installed mod takes the "unrecognized" path.
pub fn load_registry(path: &Path, max_size: u64) -> Result<ModRegistry, RegistryError> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "Mod registry not found; continuing with an empty registry"
        );
        return Ok(ModRegistry::default());
    }

    let content = read_limited(path, max_size).map_err(|e| match e {
        ReadFailure::TooLarge { size, max_size } => RegistryError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        },
        ReadFailure::Io(source) => RegistryError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let registry = parse_registry(&content, path)?;
    tracing::info!(path = %path.display(), mods = registry.len(), "Loaded mod registry");
    Ok(registry)
}

/// Parse registry JSON. `source_path` is used for error messages only.
pub fn parse_registry(content: &str, source_path: &Path) -> Result<ModRegistry, RegistryError> {
    serde_json::from_str(content).map_err(|e| RegistryError::JsonParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Load the template store: built-in templates first, then user overrides.
///
/// A broken override file is logged and skipped (non-fatal); the built-in
/// templates are still used. Returns the table and any non-fatal errors.
pub fn load_strings(user_path: Option<&Path>) -> (StringTable, Vec<StringsError>) {
    let mut table = StringTable::builtin();
    let mut errors = Vec::new();

    tracing::info!(builtin_count = table.len(), "Loaded built-in strings");

    let Some(path) = user_path else {
        return (table, errors);
    };

    match load_user_strings(path) {
        Ok(overrides) => {
            tracing::info!(
                path = %path.display(),
                overrides = overrides.len(),
                "User strings override built-in"
            );
            table.merge(overrides);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Skipping user strings file");
            errors.push(e);
        }
    }

    (table, errors)
}

fn load_user_strings(path: &Path) -> Result<StringTable, StringsError> {
    let content = read_limited(path, constants::MAX_STRINGS_FILE_SIZE).map_err(|e| match e {
        ReadFailure::TooLarge { size, max_size } => StringsError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        },
        ReadFailure::Io(source) => StringsError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    StringTable::from_toml(&content, path)
}
