// CrashSleuth - app/diagnose.rs
//
// Loads facts documents and runs the rule engine over them.
//
// Batch evaluation fans out across a rayon pool. Every evaluation reads the
// same registry, resolver and template store; none of them is mutated, so
// no coordination is needed beyond collecting results in input order.

use crate::core::model::{Facts, ModRegistry};
use crate::core::report::IssueReport;
use crate::core::rules::RuleEngine;
use crate::core::strings::TemplateStore;
use crate::core::version::VersionResolver;
use crate::platform::fs::{read_limited, ReadFailure};
use crate::util::error::FactsError;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One facts document to evaluate, optionally with its raw log in a
/// separate file.
#[derive(Debug, Clone)]
pub struct DiagnoseInput {
    pub facts_path: PathBuf,

    /// Replaces the document's `content` when set.
    pub log_path: Option<PathBuf>,
}

impl DiagnoseInput {
    pub fn new(facts_path: impl Into<PathBuf>) -> Self {
        Self {
            facts_path: facts_path.into(),
            log_path: None,
        }
    }
}

/// Result of evaluating one input.
#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub source: PathBuf,
    pub report: IssueReport,
    pub elapsed: Duration,
}

/// Shared, read-only state for a batch of evaluations.
pub struct Diagnoser<'a> {
    engine: &'a RuleEngine,
    resolver: VersionResolver<'a>,
    store: &'a dyn TemplateStore,
    max_file_size: u64,
}

fn facts_read_error(path: &Path, failure: ReadFailure) -> FactsError {
    match failure {
        ReadFailure::TooLarge { size, max_size } => FactsError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        },
        ReadFailure::Io(source) => FactsError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Read a facts document, replacing its raw log with `log_path` if given.
pub fn load_facts(
    facts_path: &Path,
    log_path: Option<&Path>,
    max_file_size: u64,
) -> Result<Facts, FactsError> {
    let content =
        read_limited(facts_path, max_file_size).map_err(|e| facts_read_error(facts_path, e))?;
    let mut facts: Facts = serde_json::from_str(&content).map_err(|e| FactsError::JsonParse {
        path: facts_path.to_path_buf(),
        source: e,
    })?;

    if let Some(log_path) = log_path {
        facts.raw_content =
            read_limited(log_path, max_file_size).map_err(|e| facts_read_error(log_path, e))?;
    }

    tracing::debug!(
        path = %facts_path.display(),
        mods = facts.mods.len(),
        lines = facts.line_count(),
        "Facts loaded"
    );
    Ok(facts)
}

impl<'a> Diagnoser<'a> {
    pub fn new(
        engine: &'a RuleEngine,
        registry: &'a ModRegistry,
        store: &'a dyn TemplateStore,
        max_file_size: u64,
    ) -> Self {
        Self {
            engine,
            resolver: VersionResolver::new(registry),
            store,
            max_file_size,
        }
    }

    /// Evaluate one snapshot, timing the run.
    pub fn diagnose_one(&self, facts: &Facts) -> (IssueReport, Duration) {
        let start = Instant::now();
        let report = self.engine.evaluate_with(facts, &self.resolver, self.store);
        let elapsed = start.elapsed();
        tracing::debug!(
            amount = report.amount(),
            elapsed_us = elapsed.as_micros() as u64,
            "Diagnosis complete"
        );
        (report, elapsed)
    }

    fn diagnose_input(&self, input: &DiagnoseInput) -> Result<Diagnosis, FactsError> {
        let facts = load_facts(
            &input.facts_path,
            input.log_path.as_deref(),
            self.max_file_size,
        )?;
        let (report, elapsed) = self.diagnose_one(&facts);
        Ok(Diagnosis {
            source: input.facts_path.clone(),
            report,
            elapsed,
        })
    }

    /// Load and evaluate every input in parallel.
    ///
    /// Results come back in input order. `worker_threads` of 0 uses one
    /// worker per CPU core.
    pub fn diagnose_many(
        &self,
        inputs: &[DiagnoseInput],
        worker_threads: usize,
    ) -> Vec<Result<Diagnosis, FactsError>> {
        let run = || -> Vec<Result<Diagnosis, FactsError>> {
            inputs
                .par_iter()
                .map(|input| self.diagnose_input(input))
                .collect()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                tracing::warn!(error = %e, "Could not build worker pool; using the global pool");
                run()
            }
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(
            inputs = inputs.len(),
            failed,
            workers = worker_threads,
            "Batch evaluation complete"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::strings::StringTable;
    use crate::util::constants;

    fn write_facts(dir: &Path, name: &str, json: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_load_facts_with_log_override() {
        let dir = tempfile::tempdir().unwrap();
        let facts_path = write_facts(
            dir.path(),
            "facts.json",
            r#"{"minecraft_version": "1.16.1", "operating_system": "windows", "content": "old"}"#,
        );
        let log_path = dir.path().join("latest.log");
        std::fs::write(&log_path, "line one\nline two\n").unwrap();

        let facts = load_facts(&facts_path, Some(&log_path), 4096).unwrap();
        assert_eq!(facts.minecraft_version.as_deref(), Some("1.16.1"));
        assert_eq!(facts.raw_content, "line one\nline two\n");
        assert_eq!(facts.line_count(), 2);
    }

    #[test]
    fn test_load_facts_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_facts(dir.path(), "bad.json", "{\"mods\": 5}");
        assert!(matches!(
            load_facts(&bad, None, 4096),
            Err(FactsError::JsonParse { .. })
        ));

        let good = write_facts(dir.path(), "good.json", "{}");
        let missing_log = dir.path().join("missing.log");
        match load_facts(&good, Some(&missing_log), 4096) {
            Err(FactsError::Io { path, .. }) => assert_eq!(path, missing_log),
            other => panic!("expected Io error, got {other:?}"),
        }

        let big = write_facts(dir.path(), "big.json", &format!("{{\"content\": \"{}\"}}", "x".repeat(2048)));
        assert!(matches!(
            load_facts(&big, None, 1024),
            Err(FactsError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_diagnose_many_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let java = write_facts(
            dir.path(),
            "java.json",
            r#"{"content": "java.lang.UnsupportedClassVersionError: class file version 61.0"}"#,
        );
        let broken = write_facts(dir.path(), "broken.json", "not json");
        let empty = write_facts(dir.path(), "empty.json", "{}");

        let engine = RuleEngine::new();
        let registry = ModRegistry::default();
        let store = StringTable::builtin();
        let diagnoser = Diagnoser::new(
            &engine,
            &registry,
            &store,
            constants::DEFAULT_MAX_INPUT_FILE_SIZE,
        );

        let inputs: Vec<DiagnoseInput> = [&java, &broken, &empty]
            .into_iter()
            .map(|p| DiagnoseInput::new(p.clone()))
            .collect();
        let results = diagnoser.diagnose_many(&inputs, 2);

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.source, java);
        assert!(first.report.has_any());
        assert!(results[1].is_err());
        assert!(!results[2].as_ref().unwrap().report.has_any());
    }
}
