// CrashSleuth - core/rules/loader.rs
//
// Mod loader triangulation: the loader the launcher reports against the
// loader the installed mods were built for.

use super::tables::MCSR_MODS;
use super::{RuleContext, Verdict};
use crate::core::model::ModLoader;

/// Forge or Quilt in use; an error for speedrun setups.
pub fn other_loader(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let Some(loader) = ctx.facts.mod_loader else {
        return verdict;
    };
    if matches!(loader, ModLoader::Fabric | ModLoader::Vanilla) {
        return verdict;
    }

    if ctx.is_mcsr_log {
        let emission = verdict.error("using_other_loader_mcsr").arg(loader.label());
        if ctx.fabric_guide_applies() {
            emission.add_with(ctx.fabric_guide(), vec!["install".to_string()]);
        }
        verdict.set_cause();
    } else {
        verdict.note("using_other_loader").arg(loader.label());
    }
    verdict
}

/// Mods installed on a vanilla launch.
pub fn no_loader(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if !facts.mods.is_empty() && facts.is_loader(ModLoader::Vanilla) {
        let emission = verdict.error("no_loader");
        if ctx.fabric_guide_applies() {
            emission.add_with(ctx.fabric_guide(), vec!["install".to_string()]);
        }
    }
    verdict
}

/// Mods built for one loader launched on another.
pub fn wrong_loader(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.found_crash_cause {
        return verdict;
    }
    let facts = ctx.facts;
    let has_fabric_mod = MCSR_MODS.iter().any(|m| facts.has_mod(m)) || facts.has_mod("fabric");
    let has_quilt_mod = facts.has_mod("quilt");
    let has_forge_mod = facts.has_mod("forge");

    let mismatch = if has_forge_mod && !has_quilt_mod && !has_fabric_mod {
        match facts.mod_loader {
            Some(ModLoader::Fabric) => Some(("Forge", "Fabric")),
            Some(ModLoader::Quilt) => Some(("Forge", "Quilt")),
            _ => None,
        }
    } else if has_fabric_mod && !has_forge_mod && facts.is_loader(ModLoader::Forge) {
        Some(("Fabric", "Forge"))
    } else if has_quilt_mod && !has_forge_mod && facts.is_loader(ModLoader::Forge) {
        Some(("Quilt", "Forge"))
    } else {
        None
    };

    if let Some((mods_for, launched_with)) = mismatch {
        verdict.error("rong_modloader").arg(mods_for).arg(launched_with);
        verdict.set_cause();
    }
    verdict
}

/// Forge installs that failed in ways only a reinstall fixes.
pub fn forge_random(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if ctx.found_crash_cause || !facts.is_loader(ModLoader::Forge) {
        return verdict;
    }
    if facts.has_content("Unable to detect the forge installer!") {
        verdict.error("random_forge_crash_1");
    }
    if facts.has_content("java.lang.NoClassDefFoundError: cpw/mods/modlauncher/Launcher") {
        verdict.error("random_forge_crash_2");
    }
    verdict
}
