// CrashSleuth - core/version.rs
//
// Mod metadata resolution and release lookup against the mod registry.
// Core layer: pure logic over an in-memory registry snapshot.
//
// Version parsing never fails loudly. Anything that does not parse is
// treated as "no match" at the call site.

use crate::core::model::{ModRegistry, ModRegistryEntry, ReleaseDescriptor};
use semver::{Comparator, Version};

/// Filename substrings rewritten before matching, applied after lowercasing.
const FILENAME_ALIASES: &[(&str, &str)] = &[("optifine", "optifabric")];

/// Registry names whose normalised form is corrected to what their jar
/// files are actually called.
const REGISTRY_NAME_ALIASES: &[(&str, &str)] = &[
    ("legacyplanarfog", "zbufferfog"),
    ("dynamicfps", "dynamicmenufps"),
];

/// Resolves raw mod filenames to registry entries.
///
/// Registry names are normalised once at construction; the resolver can be
/// shared across threads for as long as the registry it borrows.
#[derive(Debug)]
pub struct VersionResolver<'r> {
    registry: &'r ModRegistry,
    normalised_names: Vec<String>,
}

impl<'r> VersionResolver<'r> {
    pub fn new(registry: &'r ModRegistry) -> Self {
        let normalised_names = registry
            .entries()
            .iter()
            .map(|entry| normalise_registry_name(&entry.name))
            .collect();
        Self {
            registry,
            normalised_names,
        }
    }

    pub fn registry(&self) -> &'r ModRegistry {
        self.registry
    }

    /// Find the registry entry for a mod filename.
    ///
    /// Returns the first entry, in registry order, whose normalised name is a
    /// substring of the normalised filename. Entries whose name normalises to
    /// nothing are skipped, since they would claim every file.
    pub fn resolve_metadata(&self, filename: &str) -> Option<&'r ModRegistryEntry> {
        let filename = normalise_filename(filename);
        self.normalised_names
            .iter()
            .zip(self.registry.entries())
            .find(|(name, _)| !name.is_empty() && filename.contains(name.as_str()))
            .map(|(_, entry)| entry)
    }

    /// Find the release of `entry` that best fits `minecraft_version`.
    ///
    /// Files are scanned in order; every range token of every `game_versions`
    /// string is tested. A token that contains the literal version string
    /// returns its file immediately. Otherwise the last file with any matching
    /// token wins, which is registry order rather than highest version.
    pub fn latest_release<'e>(
        entry: &'e ModRegistryEntry,
        minecraft_version: Option<&str>,
    ) -> Option<&'e ReleaseDescriptor> {
        let literal = minecraft_version?;
        let version = parse_minecraft_version(literal)?;

        let mut latest_match = None;
        for file in &entry.files {
            for token in file.game_versions.iter().flat_map(|g| g.split_whitespace()) {
                if token_matches(token, &version) == Some(true) {
                    latest_match = Some(file);
                    if token.contains(literal) {
                        return latest_match;
                    }
                }
            }
        }
        latest_match
    }
}

/// Lowercase, apply filename aliases, drop separators (space, '-', '+', '_').
pub fn normalise_filename(filename: &str) -> String {
    let mut name = filename.to_lowercase();
    for (from, to) in FILENAME_ALIASES {
        name = name.replace(from, to);
    }
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+' | '_'))
        .collect()
}

/// Lowercase, drop separators (space, '-', '_'), apply registry aliases.
pub fn normalise_registry_name(name: &str) -> String {
    let name: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect();
    REGISTRY_NAME_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| to.to_string())
        .unwrap_or(name)
}

/// Parse a Minecraft version, padding "major.minor" with ".0".
pub fn parse_minecraft_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    if raw.matches('.').count() == 1 {
        Version::parse(&format!("{raw}.0")).ok()
    } else {
        Version::parse(raw).ok()
    }
}

/// Lenient version parse for loader and mod versions ("0.14", "13.3",
/// "v0.14.12+build.1"). Missing components are zero-filled.
pub fn parse_loose(raw: &str) -> Option<Version> {
    let cleaned = raw.trim().trim_start_matches('v');
    if let Ok(v) = Version::parse(cleaned) {
        return Some(v);
    }

    let (core, rest) = match cleaned.find(&['-', '+'][..]) {
        Some(pos) => cleaned.split_at(pos),
        None => (cleaned, ""),
    };
    let padded = match core.matches('.').count() {
        0 => format!("{core}.0.0{rest}"),
        1 => format!("{core}.0{rest}"),
        _ => return None,
    };
    Version::parse(&padded).ok()
}

/// Test one range token (">=1.16", "1.16.1", "1.19.x", "!=1.17") against a
/// version. A bare version means equality. Returns `None` when the token
/// does not parse.
pub fn token_matches(token: &str, version: &Version) -> Option<bool> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(rest) = token.strip_prefix("!=") {
        return exact(rest)
            .and_then(|c| Comparator::parse(&c).ok())
            .map(|c| !c.matches(version));
    }

    let normalised = if let Some(rest) = token.strip_prefix("==") {
        exact(rest)?
    } else if token.starts_with(|c: char| c.is_ascii_digit()) {
        exact(token)?
    } else {
        token.to_string()
    };
    Comparator::parse(&normalised).ok().map(|c| c.matches(version))
}

/// Equality comparator text for a version that may contain wildcards.
fn exact(version: &str) -> Option<String> {
    let version = version.trim();
    if version.is_empty() {
        return None;
    }
    if version.contains(&['x', 'X', '*'][..]) {
        Some(version.to_string())
    } else {
        Some(format!("={version}"))
    }
}
