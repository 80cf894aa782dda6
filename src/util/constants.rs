// CrashSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "CrashSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "CrashSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Report layout
// =============================================================================

/// Number of rendered entries (primary entries and add-ons alike) per page.
///
/// The delivery layer sizes its messages around this value, so it is not
/// configurable.
pub const ENTRIES_PER_PAGE: usize = 9;

/// Glyph prefixed to every top-info entry. Top-info text is also wrapped in bold.
pub const GLYPH_TOP_INFO: &str = "‼️";

/// Glyph prefixed to every error entry.
pub const GLYPH_ERROR: &str = "<:dangerkekw:1123554236626636880>";

/// Glyph prefixed to every warning entry.
pub const GLYPH_WARNING: &str = "<:warningkekw:1123563914454634546>";

/// Glyph prefixed to every note entry.
pub const GLYPH_NOTE: &str = "<:kekw:1123554521738657842>";

/// Glyph prefixed to every info entry.
pub const GLYPH_INFO: &str = "<:infokekw:1123567743355060344>";

/// Glyph prefixed to every add-on. Add-on text is also wrapped in italics.
pub const GLYPH_ADD_ON: &str = "<:reply:1121924702756143234>";

/// Namespace under which add-on templates are looked up.
pub const ADD_ON_NAMESPACE: &str = "add";

/// Divider printed between pages by the plain-text exporter.
pub const PAGE_DIVIDER: &str = "----------------------------------------";

// =============================================================================
// Rule thresholds
// =============================================================================

/// More outdated mods than this collapse into one aggregated error.
pub const MAX_INDIVIDUAL_OUTDATED_MODS: usize = 5;

/// Logs with fewer lines than this get the "short log" remediation add-ons
/// for access-violation exit codes.
pub const SHORT_LOG_LINE_LIMIT: usize = 500;

/// Upper bound (inclusive) on the number of suspected mods the fallback
/// attribution names. Above it, nothing is reported.
pub const MAX_ATTRIBUTED_MODS: usize = 5;

/// Anticheat lists longer than this are abbreviated to their first two names.
pub const MAX_LISTED_ANTICHEAT_MODS: usize = 5;

/// Offset between a class file major version and the Java release it targets.
pub const CLASS_FILE_VERSION_OFFSET: i64 = 44;

// =============================================================================
// Memory allocation thresholds (MB)
// =============================================================================

/// Below this (without Shenandoah) an allocation is low enough to explain crashes.
pub const RAM_LOW_LIMIT: u32 = 1900;

/// Below this (without Shenandoah) an allocation is a warning.
pub const RAM_VERY_LOW_LIMIT: u32 = 1200;

/// Shenandoah-adjusted equivalent of `RAM_LOW_LIMIT`.
pub const RAM_LOW_LIMIT_SHENANDOAH: u32 = 1200;

/// Shenandoah-adjusted equivalent of `RAM_VERY_LOW_LIMIT`.
pub const RAM_VERY_LOW_LIMIT_SHENANDOAH: u32 = 850;

/// Above this a speedrun instance is badly over-allocated (error).
pub const RAM_EXCESSIVE_LIMIT: u32 = 10_000;

/// Above this a speedrun instance is over-allocated (warning).
pub const RAM_HIGH_LIMIT: u32 = 4800;

/// Above this a speedrun instance is slightly over-allocated (note).
pub const RAM_ELEVATED_LIMIT: u32 = 3500;

// =============================================================================
// Input limits
// =============================================================================

/// Default maximum size of a facts, log, or registry file in bytes.
pub const DEFAULT_MAX_INPUT_FILE_SIZE: u64 = 32 * 1024 * 1024; // 32 MiB

/// Minimum user-configurable input file size limit.
pub const MIN_MAX_INPUT_FILE_SIZE: u64 = 1024; // 1 KiB

/// Maximum user-configurable input file size limit.
pub const ABSOLUTE_MAX_INPUT_FILE_SIZE: u64 = 256 * 1024 * 1024; // 256 MiB

/// Maximum size of a user strings override file in bytes.
pub const MAX_STRINGS_FILE_SIZE: u64 = 1024 * 1024; // 1 MiB

/// Default number of worker threads for batch evaluation.
/// 0 means auto-detect (use available CPU cores).
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Maximum user-configurable worker thread count.
pub const MAX_WORKER_THREADS: usize = 64;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default registry file name (stored in the platform data directory).
pub const REGISTRY_FILE_NAME: &str = "mods.json";
