// CrashSleuth - core/rules/mod.rs
//
// Rule engine: one ordered, deterministic pass over a Facts snapshot.
// Core layer: pure logic, no I/O.
//
// Every rule runs exactly once per evaluation, in registration order. A rule
// sees the facts, the version resolver and a snapshot of session state, and
// returns a Verdict (emissions plus an optional latch request). The engine
// applies verdicts to a ReportBuilder in order, so report order equals rule
// order. The `found_crash_cause` latch only ever goes false -> true.

/// Compile a built-in pattern once and cache it for the process lifetime.
///
/// Patterns are literals covered by rule unit tests, so a bad pattern shows
/// up as a failing test rather than at runtime.
macro_rules! static_regex {
    ($pattern:expr) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($pattern).expect("invalid built-in rule pattern"))
    }};
}
pub(crate) use static_regex;

pub mod crashes;
pub mod fabric;
pub mod fallback;
pub mod inventory;
pub mod java;
pub mod loader;
pub mod memory;
pub mod mods;
pub mod pairs;
pub mod privacy;
pub mod ranked;
pub mod signatures;
pub mod tables;

use crate::core::model::{Channel, Facts, ModRegistry};
use crate::core::report::{IssueReport, ReportBuilder};
use crate::core::strings::TemplateStore;
use crate::core::version::VersionResolver;
use inventory::Inventory;

// =============================================================================
// Rule contract
// =============================================================================

/// Read-only view handed to every rule.
pub struct RuleContext<'a> {
    pub facts: &'a Facts,
    pub resolver: &'a VersionResolver<'a>,

    /// Latch state as of the start of this rule.
    pub found_crash_cause: bool,

    /// True when the log comes from a speedrunning setup.
    pub is_mcsr_log: bool,

    /// Phase A results, computed before any rule runs.
    pub inventory: &'a Inventory,
}

impl RuleContext<'_> {
    /// Add-on key for the Fabric install guide matching the launcher.
    pub fn fabric_guide(&self) -> &'static str {
        if self.facts.is_prism {
            "fabric_guide_prism"
        } else {
            "fabric_guide_mmc"
        }
    }

    /// Add-on key for the RAM allocation guide matching the launcher.
    pub fn ram_guide(&self) -> &'static str {
        if self.facts.is_multimc_or_fork {
            "allocate_ram_guide_mmc"
        } else {
            "allocate_ram_guide"
        }
    }

    /// True when the Fabric guide applies to this Minecraft version (1.14 - 1.23).
    pub fn fabric_guide_applies(&self) -> bool {
        self.facts.short_version_in(14..=23)
    }

    /// Name and download page of the newest fitting release of a registry
    /// mod, looked up by filename fragment.
    pub fn download_link(&self, fragment: &str) -> Option<(String, String)> {
        let entry = self.resolver.resolve_metadata(fragment)?;
        let release =
            VersionResolver::latest_release(entry, self.facts.minecraft_version.as_deref())?;
        Some((entry.name.clone(), release.download_page.clone()))
    }
}

/// One heuristic in the battery.
pub trait Rule: Send + Sync {
    /// Stable identifier, used in logs and tests.
    fn id(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext) -> Verdict;
}

/// A rule backed by a plain function.
pub struct FnRule {
    id: &'static str,
    check: fn(&RuleContext) -> Verdict,
}

impl FnRule {
    pub const fn new(id: &'static str, check: fn(&RuleContext) -> Verdict) -> Self {
        Self { id, check }
    }
}

impl Rule for FnRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn check(&self, ctx: &RuleContext) -> Verdict {
        (self.check)(ctx)
    }
}

// =============================================================================
// Verdicts
// =============================================================================

/// An add-on request: template key under "add." plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOn {
    pub key: String,
    pub args: Vec<String>,
}

/// A primary entry request with the add-ons to attach to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub channel: Channel,
    pub key: String,
    pub args: Vec<String>,
    pub add_ons: Vec<AddOn>,
}

impl Emission {
    /// Append a positional argument for the primary template.
    pub fn arg(&mut self, value: impl ToString) -> &mut Self {
        self.args.push(value.to_string());
        self
    }

    /// Attach an add-on without arguments.
    pub fn add(&mut self, key: impl Into<String>) -> &mut Self {
        self.add_with(key, Vec::new())
    }

    pub fn add_with(&mut self, key: impl Into<String>, args: Vec<String>) -> &mut Self {
        self.add_ons.push(AddOn {
            key: key.into(),
            args,
        });
        self
    }
}

/// Outcome of one rule: what to report and whether the crash cause was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub emissions: Vec<Emission>,
    pub found_cause: bool,
}

impl Verdict {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty() && !self.found_cause
    }

    pub fn emit(&mut self, channel: Channel, key: impl Into<String>) -> &mut Emission {
        self.emissions.push(Emission {
            channel,
            key: key.into(),
            args: Vec::new(),
            add_ons: Vec::new(),
        });
        let last = self.emissions.len() - 1;
        &mut self.emissions[last]
    }

    pub fn error(&mut self, key: impl Into<String>) -> &mut Emission {
        self.emit(Channel::Error, key)
    }

    pub fn warning(&mut self, key: impl Into<String>) -> &mut Emission {
        self.emit(Channel::Warning, key)
    }

    pub fn note(&mut self, key: impl Into<String>) -> &mut Emission {
        self.emit(Channel::Note, key)
    }

    pub fn info(&mut self, key: impl Into<String>) -> &mut Emission {
        self.emit(Channel::Info, key)
    }

    /// Request the `found_crash_cause` latch.
    pub fn set_cause(&mut self) {
        self.found_cause = true;
    }

    /// Keys of all primary emissions, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.emissions.iter().map(|e| e.key.as_str()).collect()
    }

    fn apply(self, builder: &mut ReportBuilder<'_>) {
        for emission in self.emissions {
            let handle = builder.emit(emission.channel, &emission.key, &emission.args);
            for add_on in emission.add_ons {
                builder.add_on(handle, &add_on.key, &add_on.args);
            }
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Ordered rule battery.
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    /// Engine with the full built-in battery.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule identifiers in evaluation order.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Evaluate one log against a registry snapshot.
    ///
    /// Infallible: malformed versions, missing matches and unresolved mods
    /// all degrade to "no diagnosis" for the rule concerned.
    pub fn evaluate(
        &self,
        facts: &Facts,
        registry: &ModRegistry,
        store: &dyn TemplateStore,
    ) -> IssueReport {
        let resolver = VersionResolver::new(registry);
        self.evaluate_with(facts, &resolver, store)
    }

    /// Evaluate with a resolver the caller already built (and may share
    /// across evaluations).
    pub fn evaluate_with(
        &self,
        facts: &Facts,
        resolver: &VersionResolver<'_>,
        store: &dyn TemplateStore,
    ) -> IssueReport {
        let is_mcsr_log = tables::is_mcsr_log(facts);
        let inventory = Inventory::scan(facts, resolver, is_mcsr_log);
        tracing::debug!(
            rules = self.rules.len(),
            mods = facts.mods.len(),
            is_mcsr_log,
            illegal = inventory.illegal.len(),
            outdated = inventory.outdated.len(),
            duplicates = inventory.duplicates.len(),
            "Mod inventory scanned"
        );

        let mut builder = ReportBuilder::new(store);
        let mut found_crash_cause = false;

        for rule in &self.rules {
            let ctx = RuleContext {
                facts,
                resolver,
                found_crash_cause,
                is_mcsr_log,
                inventory: &inventory,
            };
            let verdict = rule.check(&ctx);
            if verdict.is_empty() {
                continue;
            }

            tracing::trace!(
                rule = rule.id(),
                emissions = verdict.emissions.len(),
                "Rule fired"
            );
            if verdict.found_cause && !found_crash_cause {
                tracing::debug!(rule = rule.id(), "Crash cause found");
                found_crash_cause = true;
            }
            verdict.apply(&mut builder);
        }

        tracing::debug!(
            amount = builder.amount(),
            found_crash_cause,
            "Evaluation complete"
        );
        builder.finish()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in battery, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    fn f(id: &'static str, check: fn(&RuleContext) -> Verdict) -> Box<dyn Rule> {
        Box::new(FnRule::new(id, check))
    }
    fn s(signature: &'static signatures::Signature) -> Box<dyn Rule> {
        Box::new(signatures::SignatureRule(signature))
    }

    vec![
        f("session_token", privacy::session_token),
        f("username", privacy::username),
        f("mod_inventory", inventory::report),
        f("mac_sodium", mods::mac_sodium),
        f("java_17_mods", java::java_17_mods),
        f("java_17_minecraft", java::java_17_minecraft),
        f("class_file_version", java::class_file_version),
        f("heap_reservation", java::heap_reservation),
        f("java_bitness", java::bitness),
        f("missing_java", java::missing_java),
        s(&signatures::HEADLESS_JAVA),
        f("broken_java", java::broken_java),
        f("fabric_loader", fabric::loader_health),
        f("other_loader", loader::other_loader),
        f("no_loader", loader::no_loader),
        f("wrong_loader", loader::wrong_loader),
        f("ram_allocation", memory::ram_allocation),
        f("instance_folder", crashes::instance_folder),
        f("phosphor", mods::phosphor),
        s(&signatures::ASSETS_INDEX),
        s(&signatures::ID_LIMIT),
        s(&signatures::MAC_TOO_NEW_JAVA),
        f("graphics_crash", crashes::graphics),
        s(&signatures::INTEL_HD2000),
        s(&signatures::NVIDIA_FLATPAK),
        s(&signatures::FORGE_JAVA_BUG),
        s(&signatures::FORGE_MAC),
        f("system_libraries", crashes::system_libraries),
        f("required_mods", mods::required_mods),
        f("fabric_api", mods::fabric_api),
        s(&signatures::LOCKED_LIBS),
        f("directory_creation", crashes::directory_creation),
        f("sodium_crash", mods::sodium_crash),
        f("voyager", mods::voyager),
        s(&signatures::LITHIUM),
        f("log_spam", mods::log_spam),
        f("ssrng_current", mods::ssrng_current),
        f("ssrng_old", mods::ssrng_old),
        f("access_violation_exit", crashes::access_violation_exit),
        f("heap_corruption_exit", crashes::heap_corruption_exit),
        f("autoreset", mods::autoreset),
        f("offline_launch", crashes::offline_launch),
        f("prism_java", java::prism_java),
        s(&signatures::ABSTRACT_LOGGER),
        s(&signatures::FORGE_TOO_NEW_JAVA),
        f("forge_random", loader::forge_random),
        f("ranked_anticheat", ranked::anticheat),
        s(&signatures::RANKED_RESOURCEPACK),
        f("optifine_pairs", pairs::optifine),
        f("esimod_pairs", pairs::esimod),
        s(&signatures::AREESSGEE),
        f("srigt_stronghold_trainer", pairs::srigt_stronghold_trainer),
        f("continuity_indium", pairs::continuity_indium),
        f("worldpreview_carpet", pairs::worldpreview_carpet),
        f("disk_space", crashes::disk_space),
        f("mappings", fabric::mappings),
        f("dot_fabric", fabric::dot_fabric),
        f("crash_attribution", fallback::attribution),
    ]
}

// =============================================================================
// Test helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Run a single rule against facts with an empty registry.
    pub fn run(check: fn(&RuleContext) -> Verdict, facts: &Facts) -> Verdict {
        run_latched(check, facts, false)
    }

    pub fn run_latched(check: fn(&RuleContext) -> Verdict, facts: &Facts, latched: bool) -> Verdict {
        let registry = ModRegistry::default();
        run_with(check, facts, &registry, latched)
    }

    pub fn run_with(
        check: fn(&RuleContext) -> Verdict,
        facts: &Facts,
        registry: &ModRegistry,
        latched: bool,
    ) -> Verdict {
        let resolver = VersionResolver::new(registry);
        let is_mcsr_log = tables::is_mcsr_log(facts);
        let inventory = Inventory::scan(facts, &resolver, is_mcsr_log);
        let ctx = RuleContext {
            facts,
            resolver: &resolver,
            found_crash_cause: latched,
            is_mcsr_log,
            inventory: &inventory,
        };
        check(&ctx)
    }

    pub fn log(content: &str) -> Facts {
        Facts {
            raw_content: content.to_string(),
            ..Facts::default()
        }
    }

    pub fn with_mods(mods: &[&str]) -> Facts {
        Facts {
            mods: mods.iter().map(|m| m.to_string()).collect(),
            ..Facts::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::core::model::{ModLoader, ModRegistryEntry, ReleaseDescriptor};
    use crate::core::strings::StringTable;

    fn registry() -> ModRegistry {
        let entry = |name: &str, version: &str| ModRegistryEntry {
            name: name.to_string(),
            incompatible: None,
            files: vec![ReleaseDescriptor {
                display_name: format!("{name}-{version}+1.16.1.jar"),
                version_string: version.to_string(),
                download_page: format!("https://example.invalid/{name}"),
                game_versions: vec!["1.16.1".to_string()],
            }],
        };
        ModRegistry::new(vec![
            entry("alpha", "2.0"),
            entry("bravo", "2.0"),
            entry("charlie", "2.0"),
            entry("delta", "2.0"),
            entry("echo", "2.0"),
            entry("foxtrot", "2.0"),
        ])
    }

    fn outdated_facts(count: usize) -> Facts {
        let names = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];
        Facts {
            minecraft_version: Some("1.16.1".to_string()),
            mod_loader: Some(ModLoader::Fabric),
            mods: names[..count]
                .iter()
                .map(|n| format!("{n}-1.0+1.16.1.jar"))
                .collect(),
            ..Facts::default()
        }
    }

    #[test]
    fn test_empty_facts_produce_no_diagnosis() {
        let report = RuleEngine::new().evaluate(
            &Facts::default(),
            &ModRegistry::default(),
            &StringTable::builtin(),
        );
        assert!(!report.has_any());
    }

    #[test]
    fn test_rule_ids_are_unique() {
        let engine = RuleEngine::new();
        let mut ids = engine.rule_ids();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(engine.rule_ids()[0], "session_token");
        assert_eq!(engine.rule_ids().last(), Some(&"crash_attribution"));
    }

    #[test]
    fn test_six_outdated_mods_aggregate() {
        let report = RuleEngine::new().evaluate(
            &outdated_facts(6),
            &registry(),
            &StringTable::builtin(),
        );
        assert_eq!(report.entries(Channel::Error).len(), 1);
        assert!(report.entries(Channel::Error)[0].text.contains("`6`"));
        assert_eq!(report.entries(Channel::Error)[0].add_ons.len(), 1);
        assert!(report.entries(Channel::Warning).is_empty());
    }

    #[test]
    fn test_five_outdated_mods_warn_individually() {
        let report = RuleEngine::new().evaluate(
            &outdated_facts(5),
            &registry(),
            &StringTable::builtin(),
        );
        assert!(report.entries(Channel::Error).is_empty());
        assert_eq!(report.entries(Channel::Warning).len(), 5);
        assert!(report.entries(Channel::Warning)[0]
            .text
            .contains("https://example.invalid/alpha"));
    }

    #[test]
    fn test_latch_suppresses_later_gated_rule() {
        // Both the Java 17 text and a class file mismatch are present; only
        // the earlier rule may report.
        let facts = log(
            "Minecraft 1.18 require the use of Java 17\n\
             java.lang.UnsupportedClassVersionError: class file version 61.0\n",
        );
        let report =
            RuleEngine::new().evaluate(&facts, &ModRegistry::default(), &StringTable::builtin());
        let errors = report.entries(Channel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("Java 17 or newer"));
        assert!(!errors[0].text.contains("`Java 17`"));
    }

    #[test]
    fn test_custom_rule_list_runs_in_order() {
        fn first(_: &RuleContext) -> Verdict {
            let mut v = Verdict::none();
            v.note("first");
            v.set_cause();
            v
        }
        fn second(ctx: &RuleContext) -> Verdict {
            let mut v = Verdict::none();
            if ctx.found_crash_cause {
                v.note("second_saw_latch");
            }
            v
        }
        let engine = RuleEngine::with_rules(vec![
            Box::new(FnRule::new("first", first)),
            Box::new(FnRule::new("second", second)),
        ]);
        let report = engine.evaluate(&Facts::default(), &ModRegistry::default(), &StringTable::new());
        let notes: Vec<&str> = report.rendered_lines(Channel::Note).collect();
        assert_eq!(notes.len(), 2);
        assert!(notes[0].ends_with("first"));
        assert!(notes[1].ends_with("second_saw_latch"));
    }

    #[test]
    fn test_verdict_builder_chains() {
        let mut v = Verdict::none();
        assert!(v.is_empty());
        v.error("mod_download_needed")
            .arg("Sodium")
            .add("update_mods")
            .add_with("mod_download", vec!["Sodium".into(), "page".into()]);
        assert_eq!(v.keys(), vec!["mod_download_needed"]);
        assert_eq!(v.emissions[0].args, vec!["Sodium".to_string()]);
        assert_eq!(v.emissions[0].add_ons.len(), 2);
        assert!(!v.found_cause);
    }

    #[test]
    fn test_context_helpers() {
        let mut facts = with_mods(&[]);
        facts.is_prism = true;
        facts.minecraft_version = Some("1.16.1".to_string());
        let verdict = run(
            |ctx| {
                let mut v = Verdict::none();
                if ctx.fabric_guide_applies() {
                    v.note(ctx.fabric_guide());
                }
                v.note(ctx.ram_guide());
                v
            },
            &facts,
        );
        assert_eq!(verdict.keys(), vec!["fabric_guide_prism", "allocate_ram_guide"]);
    }
}
