// CrashSleuth - core/rules/fabric.rs
//
// Fabric Loader health: loader too old for the runtime, SpeedRunIGT builds
// that break on newer loaders, version tiers, missing mappings and a broken
// `.fabric` cache.

use super::{static_regex, RuleContext, Verdict};
use crate::core::model::ModLoader;
use crate::core::version::parse_loose;
use semver::{BuildMetadata, Version};

const CLASS_MAJOR_SIGNATURES: &[&str] = &[
    "java.lang.IllegalArgumentException: Unsupported class file major version ",
    "java.lang.IllegalArgumentException: Class file major version ",
];

/// Parse a version for ordering; build metadata is dropped so "+build.N"
/// suffixes do not affect comparisons.
fn comparable(raw: &str) -> Option<Version> {
    let mut version = parse_loose(raw)?;
    version.build = BuildMetadata::EMPTY;
    Some(version)
}

/// Highest SpeedRunIGT version among the installed jars
/// ("SpeedRunIGT-13.2+1.16.1.jar" -> 13.2).
fn highest_speedrunigt(mods: &[String]) -> Option<Version> {
    let pattern = static_regex!(r"-(\d+(?:\.\d+)?)\+");
    mods.iter()
        .filter(|m| m.to_lowercase().contains("speedrunigt"))
        .filter_map(|m| pattern.captures(m).and_then(|caps| comparable(&caps[1])))
        .max()
}

/// Loader rejected the runtime's class files, otherwise the Fabric Loader
/// version checks.
pub fn loader_health(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    let guide = ctx.fabric_guide();
    let update = || vec!["update".to_string()];

    if CLASS_MAJOR_SIGNATURES.iter().any(|s| facts.has_content(s)) {
        let loader = facts.mod_loader.map_or("mod", |l| l.label());
        let emission = verdict
            .error("new_java_old_fabric_crash")
            .arg(loader)
            .arg(loader);
        if ctx.fabric_guide_applies() {
            emission.add_with(guide, update());
        }
        verdict.set_cause();
        return verdict;
    }

    if !facts.is_loader(ModLoader::Fabric) {
        return verdict;
    }
    let Some(fabric) = facts.fabric_version.as_deref().and_then(comparable) else {
        return verdict;
    };

    if let Some(srigt) = highest_speedrunigt(&facts.mods) {
        if srigt < Version::new(13, 3, 0) && fabric > Version::new(0, 14, 14) {
            let emission = verdict.error("incompatible_srigt");
            if !facts.is_minecraft("1.16.1") {
                emission.add("incompatible_srigt_alternative");
            }
            verdict.set_cause();
        }
    }

    if facts.has_content(
        "java.lang.ClassNotFoundException: can't find class com.llamalad7.mixinextras.MixinExtrasBootstrap",
    ) {
        verdict.error("old_fabric_crash").add_with(guide, update());
        verdict.set_cause();
        return verdict;
    }

    let guide_applies = ctx.fabric_guide_applies();
    if fabric < Version::new(0, 13, 3) {
        let emission = verdict.error("really_old_fabric");
        if guide_applies {
            emission.add_with(guide, update());
        }
    } else if fabric < Version::new(0, 14, 12) {
        let emission = verdict.warning("relatively_old_fabric");
        if guide_applies {
            emission.add_with(guide, update());
        }
    } else if fabric < Version::new(0, 14, 14) {
        verdict.note("old_fabric").add_with(guide, update());
    } else if fabric == Version::new(0, 14, 15) || fabric == Version::new(0, 14, 16) {
        let emission = verdict.error("broken_fabric");
        if guide_applies {
            emission.add_with(guide, update());
        }
    }
    verdict
}

/// Intermediary mappings missing: a modpack made for Legacy Fabric, or an
/// incomplete download.
pub fn mappings(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if !facts.has_content("Mappings not present!") {
        return verdict;
    }
    if !facts.short_version_in(14..=28) && facts.is_loader(ModLoader::Fabric) {
        verdict.error("legacy_fabric_modpack");
        verdict.set_cause();
    } else {
        verdict
            .warning("no_mappings")
            .arg(if facts.is_prism { "" } else { " Instance" });
    }
    verdict
}

/// Fabric networking mixin failure from a corrupted `.fabric` cache.
pub fn dot_fabric(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if !ctx.found_crash_cause
        && ctx
            .facts
            .has_content("ERROR]: Mixin apply for mod fabric-networking-api-v1 failed")
    {
        verdict.error("delete_dot_fabric");
    }
    verdict
}
