// CrashSleuth - core/rules/pairs.rs
//
// Hand-maintained pairs of mods that cannot be installed together, beyond
// what the registry declares.

use super::{RuleContext, Verdict};

/// Mods that break when installed next to esimod.
const ESIMOD_CONFLICTS: &[&str] = &["serverSideRNG", "SpeedRunIGT", "WorldPreview", "mcsrranked"];

fn incompatible(verdict: &mut Verdict, first: &str, second: &str) {
    verdict.error("incompatible_mod").arg(first).arg(second);
}

pub fn optifine(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if !facts.has_mod("optifine") {
        return verdict;
    }
    if facts.has_mod("worldpreview") {
        incompatible(&mut verdict, "Optifine", "WorldPreview");
        verdict.set_cause();
    }
    if facts.has_mod("z-buffer-fog") && ctx.fabric_guide_applies() {
        incompatible(&mut verdict, "Optifine", "z-buffer-fog");
        verdict.set_cause();
    }
    verdict
}

pub fn esimod(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if !facts.has_mod("esimod") {
        return verdict;
    }
    for other in ESIMOD_CONFLICTS.iter().filter(|m| facts.has_mod(m)) {
        incompatible(&mut verdict, "esimod", other);
    }
    verdict
}

pub fn srigt_stronghold_trainer(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.facts.has_mod("speedrunigt") && ctx.facts.has_mod("stronghold-trainer") {
        incompatible(&mut verdict, "SpeedRunIGT", "Stronghold Trainer");
        verdict.set_cause();
    }
    verdict
}

/// Continuity needs Indium to render on Sodium.
pub fn continuity_indium(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if facts.has_mod("continuity") && facts.has_mod("sodium") && !facts.has_mod("indium") {
        verdict
            .error("missing_dependency")
            .arg("continuity")
            .arg("indium");
        verdict.set_cause();
    }
    verdict
}

pub fn worldpreview_carpet(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.facts.has_mod("worldpreview") && ctx.facts.has_mod("carpet") {
        incompatible(&mut verdict, "WorldPreview", "carpet");
        verdict.set_cause();
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run, with_mods};
    use super::*;

    #[test]
    fn test_optifine_pairs() {
        let mut facts = with_mods(&["OptiFine_1.16.1_HD_U_G1.jar", "worldpreview-3.0.jar", "z-buffer-fog-1.0.jar"]);
        facts.minecraft_version = Some("1.16.1".to_string());
        let verdict = run(optifine, &facts);
        assert_eq!(verdict.emissions.len(), 2);
        assert_eq!(verdict.emissions[1].args, vec!["Optifine", "z-buffer-fog"]);
        assert!(verdict.found_cause);

        facts.minecraft_version = Some("1.8.9".to_string());
        assert_eq!(run(optifine, &facts).emissions.len(), 1);
    }

    #[test]
    fn test_esimod_pairs_do_not_set_cause() {
        let facts = with_mods(&["esimod-1.0.jar", "SpeedRunIGT-13.3.jar", "mcsrranked-1.4.jar"]);
        let verdict = run(esimod, &facts);
        assert_eq!(verdict.emissions.len(), 2);
        assert_eq!(verdict.emissions[0].args, vec!["esimod", "SpeedRunIGT"]);
        assert!(!verdict.found_cause);
    }

    #[test]
    fn test_continuity_without_indium() {
        let mut facts = with_mods(&["continuity-2.0.jar", "sodium-0.4.jar"]);
        assert_eq!(run(continuity_indium, &facts).keys(), vec!["missing_dependency"]);
        facts.mods.push("indium-1.0.jar".to_string());
        assert!(run(continuity_indium, &facts).is_empty());
    }

    #[test]
    fn test_simple_pairs() {
        let facts = with_mods(&["worldpreview-3.0.jar", "fabric-carpet-1.4.jar"]);
        assert_eq!(run(worldpreview_carpet, &facts).emissions[0].args, vec!["WorldPreview", "carpet"]);

        let facts = with_mods(&["SpeedRunIGT-13.3.jar", "stronghold-trainer-1.0.jar"]);
        assert!(run(srigt_stronghold_trainer, &facts).found_cause);
    }
}
