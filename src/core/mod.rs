// CrashSleuth - core/mod.rs
//
// Core business logic layer.
// Dependencies: serde, regex, semver, toml (template parsing from strings).
// Must NOT depend on: platform, app, or touch the filesystem.

pub mod export;
pub mod model;
pub mod report;
pub mod rules;
pub mod strings;
pub mod version;
