// CrashSleuth - app/mod.rs
//
// Application layer: registry and template loading, evaluation of one or
// many inputs.
// Dependencies: core and platform layers.

pub mod diagnose;
pub mod registry_mgr;
