// CrashSleuth - core/rules/tables.rs
//
// Immutable mod lists consulted by the rule battery.

use crate::core::model::Facts;

/// Mods that refuse to load on Java older than 17.
pub const JAVA_17_MODS: &[&str] = &[
    "antiresourcereload",
    "serversiderng",
    "setspawnmod",
    "peepopractice",
    "areessgee",
];

/// Filename fragments never reported as outdated. Either the registry cannot
/// tell their versions apart or the pinned build is the one to use.
pub const ASSUME_AS_LATEST: &[&str] = &[
    "sodiummac",
    "serversiderng",
    "lazystronghold",
    "krypton",
    "sodium-fabric-mc1.16.5-0.2.0+build.4",
    "optifine",
    "sodium-extra",
    "biomethreadlocalfix",
    "forceport",
    "sleepbackground-3.8-1.8.x-1.12.x",
    "tab-focus",
];

/// Filename fragments accepted even when the registry does not know them.
pub const ASSUME_AS_LEGAL: &[&str] = &["mcsrranked", "mangodfps", "serversiderng"];

/// Mods whose presence marks a speedrunning setup.
pub const MCSR_MODS: &[&str] = &[
    "worldpreview",
    "anchiale",
    "sleepbackground",
    "StatsPerWorld",
    "z-buffer-fog",
    "tab-focus",
    "setspawn",
    "SpeedRunIGT",
    "standardsettings",
    "forceport",
    "lazystronghold",
    "antiresourcereload",
    "extra-options",
    "chunkcacher",
    "serverSideRNG",
    "peepopractice",
    "fast-reset",
    "mcsrranked",
];

/// True for logs from a speedrunning setup: any speedrun mod is installed, or
/// the game is 1.16.1.
pub fn is_mcsr_log(facts: &Facts) -> bool {
    MCSR_MODS.iter().any(|m| facts.has_mod(m)) || facts.is_minecraft("1.16.1")
}

/// True if `filename` contains any of `fragments` (case-insensitive).
pub fn matches_any(filename: &str, fragments: &[&str]) -> bool {
    let filename = filename.to_lowercase();
    fragments.iter().any(|f| filename.contains(f))
}
