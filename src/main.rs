// CrashSleuth - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Registry and template loading (built-in + user overrides)
// 4. Evaluation of every input and report output

use clap::Parser;
use crashsleuth::app::diagnose::{DiagnoseInput, Diagnoser};
use crashsleuth::app::registry_mgr;
use crashsleuth::core::export;
use crashsleuth::core::rules::RuleEngine;
use crashsleuth::platform::config::{load_config, PlatformPaths};
use crashsleuth::util;
use crashsleuth::util::error::CrashSleuthError;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "crashsleuth", version, about)]
struct Cli {
    /// Facts documents (JSON) extracted from crash logs.
    #[arg(required = true)]
    facts: Vec<PathBuf>,

    /// Raw log file replacing the document's content (single input only).
    #[arg(short = 'l', long = "log")]
    log: Option<PathBuf>,

    /// Mod registry JSON (overrides config and the platform default).
    #[arg(short = 'r', long = "registry")]
    registry: Option<PathBuf>,

    /// Template override TOML (overrides config).
    #[arg(short = 's', long = "strings")]
    strings: Option<PathBuf>,

    /// Print reports as JSON instead of pages.
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log.is_some() && cli.facts.len() > 1 {
        eprintln!("Error: --log can only be used with a single facts document");
        return ExitCode::from(2);
    }

    let platform_paths = PlatformPaths::resolve();
    let (config, config_warnings) = load_config(&platform_paths.config_dir);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        inputs = cli.facts.len(),
        "CrashSleuth starting"
    );
    for warning in &config_warnings {
        tracing::warn!(%warning, "Config problem");
        eprintln!("Warning: {warning}");
    }

    // Precedence: CLI flag > config file > platform default.
    let registry_path = cli
        .registry
        .clone()
        .or_else(|| config.registry_path.clone())
        .unwrap_or_else(|| platform_paths.default_registry());
    let registry = match registry_mgr::load_registry(&registry_path, config.max_file_size) {
        Ok(registry) => registry,
        Err(e) => {
            let e = CrashSleuthError::from(e);
            tracing::error!(error = %e, "Failed to load mod registry");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let strings_path = cli.strings.clone().or_else(|| config.strings_path.clone());
    let (strings, strings_errors) = registry_mgr::load_strings(strings_path.as_deref());
    for e in strings_errors.into_iter().map(CrashSleuthError::from) {
        eprintln!("Warning: {e}");
    }

    let engine = RuleEngine::new();
    tracing::debug!(rules = engine.len(), "Rule battery ready");

    let inputs: Vec<DiagnoseInput> = cli
        .facts
        .iter()
        .map(|path| DiagnoseInput {
            facts_path: path.clone(),
            log_path: cli.log.clone(),
        })
        .collect();

    let diagnoser = Diagnoser::new(&engine, &registry, &strings, config.max_file_size);
    let results = diagnoser.diagnose_many(&inputs, config.worker_threads);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let multiple = results.len() > 1;
    let mut failed = false;

    for result in results {
        let diagnosis = match result {
            Ok(d) => d,
            Err(e) => {
                let e = CrashSleuthError::from(e);
                tracing::error!(error = %e, "Input failed to load");
                eprintln!("Error: {e}");
                failed = true;
                continue;
            }
        };

        let written = if cli.json {
            export::export_json(&diagnosis.report, &mut out, "stdout").map(|_| ())
        } else {
            if multiple {
                let _ = writeln!(out, "== {} ==", diagnosis.source.display());
            }
            let pages = export::render_pages(&diagnosis.report);
            if pages.is_empty() {
                let _ = writeln!(out, "No issues found.");
            }
            export::export_text(&pages, &mut out, "stdout").map(|_| ())
        };

        if let Err(e) = written.map_err(CrashSleuthError::from) {
            tracing::error!(error = %e, "Failed to write report");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
