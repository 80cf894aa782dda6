// CrashSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no platform
// dependencies.
//
// These types are the shared vocabulary across all layers.

use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Facts (immutable snapshot of one log)
// =============================================================================

/// Operating system the game ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    #[serde(alias = "mac", alias = "osx")]
    MacOs,
    Linux,
    #[serde(other)]
    Other,
}

/// Mod loader the instance was launched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModLoader {
    Vanilla,
    Fabric,
    Forge,
    Quilt,
}

impl ModLoader {
    /// Human-readable name, as it appears in report messages.
    pub fn label(&self) -> &'static str {
        match self {
            ModLoader::Vanilla => "Vanilla",
            ModLoader::Fabric => "Fabric",
            ModLoader::Forge => "Forge",
            ModLoader::Quilt => "Quilt",
        }
    }
}

impl std::fmt::Display for ModLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Attributes extracted from one log by the external log provider.
///
/// Produced once per log and never mutated during evaluation. Every field is
/// optional in the serialised form so partial extractions still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Facts {
    /// Full Minecraft version ("1.16.1"), if the provider found one.
    pub minecraft_version: Option<String>,

    /// Major Java version the game ran on.
    pub major_java_version: Option<u32>,

    pub operating_system: Option<OperatingSystem>,

    pub mod_loader: Option<ModLoader>,

    /// Fabric Loader version string ("0.14.12").
    pub fabric_version: Option<String>,

    /// Launcher name as reported in the log ("MultiMC", "Prism Launcher", ...).
    pub launcher: Option<String>,

    pub is_prism: bool,

    pub is_multimc_or_fork: bool,

    /// Instance `.minecraft` folder path.
    pub minecraft_folder: Option<String>,

    /// Maximum heap allocation in MB.
    pub max_allocated: Option<u32>,

    /// Raw mod filenames in load order. Duplicates are kept.
    pub mods: Vec<String>,

    /// Full raw log text.
    #[serde(rename = "content")]
    pub raw_content: String,

    /// JVM arguments the game was launched with.
    pub java_arguments: Vec<String>,
}

impl Facts {
    /// Major.minor form of the Minecraft version ("1.19.2" -> "1.19").
    pub fn short_version(&self) -> Option<String> {
        let version = self.minecraft_version.as_deref()?;
        let mut parts = version.splitn(3, '.');
        match (parts.next(), parts.next()) {
            (Some(major), Some(minor)) => Some(format!("{major}.{minor}")),
            (Some(major), None) => Some(major.to_string()),
            _ => None,
        }
    }

    /// True when the short version is `1.N` for some N in `range`.
    pub fn short_version_in(&self, range: std::ops::RangeInclusive<u32>) -> bool {
        self.short_version()
            .and_then(|v| v.strip_prefix("1.").and_then(|m| m.parse::<u32>().ok()))
            .is_some_and(|minor| range.contains(&minor))
    }

    /// True when the Minecraft version is exactly `version`.
    pub fn is_minecraft(&self, version: &str) -> bool {
        self.minecraft_version.as_deref() == Some(version)
    }

    /// Case-sensitive substring search over the raw log text.
    pub fn has_content(&self, needle: &str) -> bool {
        self.raw_content.contains(needle)
    }

    /// Regex search over the raw log text.
    pub fn matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.raw_content)
    }

    /// Case-insensitive substring search over the raw mod filenames.
    pub fn has_mod(&self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        self.mods.iter().any(|m| m.to_lowercase().contains(&fragment))
    }

    /// Case-insensitive substring search over the JVM arguments.
    pub fn has_java_argument(&self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        self.java_arguments
            .iter()
            .any(|a| a.to_lowercase().contains(&fragment))
    }

    pub fn is_os(&self, os: OperatingSystem) -> bool {
        self.operating_system == Some(os)
    }

    pub fn is_loader(&self, loader: ModLoader) -> bool {
        self.mod_loader == Some(loader)
    }

    /// Number of newline characters in the raw log.
    pub fn line_count(&self) -> usize {
        self.raw_content.matches('\n').count()
    }
}

// =============================================================================
// Mod registry
// =============================================================================

/// One release file of a registry mod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Release file name as published.
    #[serde(rename = "name")]
    pub display_name: String,

    #[serde(rename = "version")]
    pub version_string: String,

    /// Download page URL.
    #[serde(rename = "page")]
    pub download_page: String,

    /// Range expressions of supported Minecraft versions. Each string may
    /// hold several whitespace-separated tokens (">=1.16 <=1.16.5").
    #[serde(default)]
    pub game_versions: Vec<String>,
}

/// A mod known to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModRegistryEntry {
    pub name: String,

    /// Mod identifiers this mod cannot be installed alongside.
    #[serde(default)]
    pub incompatible: Option<Vec<String>>,

    /// Releases in publication order.
    #[serde(default)]
    pub files: Vec<ReleaseDescriptor>,
}

/// Read-only catalog of known mods. Iteration order is significant: metadata
/// resolution returns the first matching entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModRegistry {
    entries: Vec<ModRegistryEntry>,
}

impl ModRegistry {
    pub fn new(entries: Vec<ModRegistryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ModRegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Severity channels
// =============================================================================

/// Report channels, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    TopInfo,
    Error,
    Warning,
    Note,
    Info,
}

impl Channel {
    /// Number of channels.
    pub const COUNT: usize = 5;

    /// Returns all variants in rendering order.
    pub fn all() -> &'static [Channel; Channel::COUNT] {
        &[
            Channel::TopInfo,
            Channel::Error,
            Channel::Warning,
            Channel::Note,
            Channel::Info,
        ]
    }

    /// Position in rendering order; also the index into per-channel storage.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Template namespace for this channel ("error" -> "error.<key>").
    pub fn namespace(&self) -> &'static str {
        match self {
            Channel::TopInfo => "top_info",
            Channel::Error => "error",
            Channel::Warning => "warning",
            Channel::Note => "note",
            Channel::Info => "info",
        }
    }

    /// Wrap resolved message text in this channel's glyph and markup.
    pub fn decorate(&self, text: &str) -> String {
        use crate::util::constants::*;
        match self {
            Channel::TopInfo => format!("{GLYPH_TOP_INFO} **{text}**"),
            Channel::Error => format!("{GLYPH_ERROR} {text}"),
            Channel::Warning => format!("{GLYPH_WARNING} {text}"),
            Channel::Note => format!("{GLYPH_NOTE} {text}"),
            Channel::Info => format!("{GLYPH_INFO} {text}"),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.namespace())
    }
}
