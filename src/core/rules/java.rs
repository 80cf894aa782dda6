// CrashSleuth - core/rules/java.rs
//
// Java runtime compatibility: required versions, class file mismatches,
// 32-bit and broken installations, launcher-reported Java mismatches.

use super::tables::JAVA_17_MODS;
use super::{static_regex, RuleContext, Verdict};
use crate::core::model::{ModLoader, OperatingSystem};
use crate::util::constants::CLASS_FILE_VERSION_OFFSET;

/// Speedrun mods that need Java 17 on an older runtime.
pub fn java_17_mods(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    let Some(java) = facts.major_java_version else {
        return verdict;
    };
    if java >= 17 || facts.short_version().as_deref() == Some("1.12") {
        return verdict;
    }

    let mut wrong_mods: Vec<&str> = Vec::new();
    for needed in JAVA_17_MODS {
        for installed in &facts.mods {
            if installed.to_lowercase().contains(needed) {
                wrong_mods.push(*needed);
            }
        }
    }
    if wrong_mods.is_empty() {
        return verdict;
    }

    let single = wrong_mods.len() == 1;
    verdict
        .error("need_java_17_mods")
        .arg(if single { "a mod" } else { "mods" })
        .arg(wrong_mods.join("`, `"))
        .arg(if single { "s" } else { "" })
        .arg(format!(", but you're using `Java {java}`"))
        .add("java_update_guide");
    verdict.set_cause();
    verdict
}

/// The game itself refuses to start on an old runtime.
pub fn java_17_minecraft(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if !ctx.found_crash_cause && ctx.facts.has_content("require the use of Java 17") {
        verdict.error("need_java_17_mc").add("java_update_guide");
        verdict.set_cause();
    }
    verdict
}

/// Class file or mixin compatibility level newer than the runtime. When both
/// signatures are present the higher Java version wins.
pub fn class_file_version(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.found_crash_cause {
        return verdict;
    }
    let content = &ctx.facts.raw_content;

    let mut needed: Option<i64> = None;
    if ctx.facts.has_content("java.lang.UnsupportedClassVersionError") {
        needed = static_regex!(r"class file version (\d+\.\d+)")
            .captures(content)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(|class_version| class_version.round() as i64 - CLASS_FILE_VERSION_OFFSET);
    }

    let compatibility = static_regex!(r"The requested compatibility level (JAVA_\d+) could not be set.")
        .captures(content)
        .and_then(|caps| caps[1].split('_').nth(1).and_then(|n| n.parse::<i64>().ok()));
    if let Some(level) = compatibility {
        if needed.map_or(true, |current| level > current) {
            needed = Some(level);
        }
    }

    if let Some(version) = needed {
        verdict
            .error("need_new_java")
            .arg(version)
            .add("java_update_guide");
        verdict.set_cause();
    }
    verdict
}

/// The JVM could not reserve the requested heap: a 32-bit runtime.
pub fn heap_reservation(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if !ctx.found_crash_cause
        && (facts.has_content("Could not reserve enough space for ")
            || facts.has_content("Invalid maximum heap size: "))
    {
        verdict.error("32_bit_java_crash").add("java_update_guide");
        verdict.set_cause();
    }
    verdict
}

/// Launcher asking for a 64-bit runtime, or MultiMC on macOS.
///
/// Logs from the mcwrap.py wrapper are skipped entirely.
pub fn bitness(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    let on_mac = facts.is_os(OperatingSystem::MacOs);

    if facts.has_content("mcwrap.py") {
        return verdict;
    }
    if !ctx.found_crash_cause && facts.has_content("You might want to install a 64bit Java version") {
        if on_mac {
            verdict.error("arm_java_multimc").add("mac_setup_guide");
        } else {
            verdict.error("32_bit_java").add("java_update_guide");
        }
        verdict.set_cause();
    } else if on_mac
        && facts
            .launcher
            .as_deref()
            .is_some_and(|l| l.eq_ignore_ascii_case("multimc"))
    {
        verdict.note("use_prism").add("mac_setup_guide");
    }
    verdict
}

/// No Java path configured at all.
pub fn missing_java(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.facts.has_content("The java binary \"\" couldn't be found.") {
        verdict.error("no_java").add("java_update_guide");
        verdict.set_cause();
    }
    verdict
}

const BROKEN_JAVA_SIGNATURES: &[&str] = &[
    "Could not start java:\n\n\nCheck your MultiMC Java settings.",
    "Incompatible magic value 0 in class file sun/security/provider/SunEntries",
    "Assertion `version->filename == NULL || ! _dl_name_match_p (version->filename, map)' failed",
];

/// A configured Java installation that cannot run.
pub fn broken_java(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.found_crash_cause {
        return verdict;
    }
    let facts = ctx.facts;
    let broken = BROKEN_JAVA_SIGNATURES.iter().any(|s| facts.has_content(s))
        || facts.matches(static_regex!(r#"The java binary "(.+)" couldn't be found."#));
    if broken {
        verdict.error("broken_java").add("java_update_guide");
        verdict.set_cause();
    }
    verdict
}

/// Prism's own Java compatibility check refused to launch.
///
/// Switching Java is only advised when the game really needs a newer
/// runtime (1.17+ on Java < 17) or the loader is Forge; otherwise the
/// check itself is at fault.
pub fn prism_java(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    let pattern = static_regex!(
        r"This instance is not compatible with Java version (\d+)\.\nPlease switch to one of the following Java versions for this instance:\nJava version (\d+)"
    );
    let Some(caps) = pattern.captures(&facts.raw_content) else {
        return verdict;
    };
    let current = &caps[1];
    let compatible = &caps[2];

    let switch_java = if facts.short_version_in(17..=26) {
        current.parse::<u32>().map_or(true, |v| v < 17)
    } else {
        facts.is_loader(ModLoader::Forge)
    };

    if switch_java {
        let installer = match facts.operating_system {
            Some(OperatingSystem::Windows) => " (download the .msi file)",
            Some(OperatingSystem::MacOs) => " (download the .pkg file)",
            _ => "",
        };
        verdict
            .error("incorrect_java_prism")
            .arg(current)
            .arg(compatible)
            .arg(compatible)
            .arg(installer)
            .arg(compatible);
    } else {
        verdict.error("java_comp_check");
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::super::testing::{log, run, run_latched, with_mods};
    use super::*;

    #[test]
    fn test_java_17_mods_lists_each_match() {
        let mut facts = with_mods(&["antiresourcereload-1.0.jar", "SetSpawnMod-2.jar", "sodium.jar"]);
        facts.major_java_version = Some(8);
        let verdict = run(java_17_mods, &facts);
        assert!(verdict.found_cause);
        let args = &verdict.emissions[0].args;
        assert_eq!(args[0], "mods");
        assert_eq!(args[1], "antiresourcereload`, `setspawnmod");
        assert_eq!(args[2], "");
        assert_eq!(args[3], ", but you're using `Java 8`");
    }

    #[test]
    fn test_java_17_mods_skipped_on_new_java_or_1_12() {
        let mut facts = with_mods(&["antiresourcereload-1.0.jar"]);
        facts.major_java_version = Some(17);
        assert!(run(java_17_mods, &facts).is_empty());

        facts.major_java_version = Some(8);
        facts.minecraft_version = Some("1.12.2".to_string());
        assert!(run(java_17_mods, &facts).is_empty());

        facts.minecraft_version = None;
        let verdict = run(java_17_mods, &facts);
        assert_eq!(verdict.emissions[0].args[0], "a mod");
        assert_eq!(verdict.emissions[0].args[2], "s");
    }

    #[test]
    fn test_class_file_version_takes_higher_request() {
        let facts = log(
            "java.lang.UnsupportedClassVersionError: class file version 60.0\n\
             The requested compatibility level JAVA_17 could not be set.",
        );
        let verdict = run(class_file_version, &facts);
        assert_eq!(verdict.emissions[0].args, vec!["17".to_string()]);

        let facts = log("java.lang.UnsupportedClassVersionError: class file version 61.0");
        assert_eq!(run(class_file_version, &facts).emissions[0].args, vec!["17".to_string()]);
    }

    #[test]
    fn test_class_file_version_without_error_class_ignores_number() {
        let facts = log("class file version 61.0");
        assert!(run(class_file_version, &facts).is_empty());
    }

    #[test]
    fn test_gated_java_rules_respect_latch() {
        let facts = log("require the use of Java 17\nCould not reserve enough space for 2GB");
        assert!(run_latched(java_17_minecraft, &facts, true).is_empty());
        assert!(run_latched(heap_reservation, &facts, true).is_empty());
        assert_eq!(run(heap_reservation, &facts).keys(), vec!["32_bit_java_crash"]);
    }

    #[test]
    fn test_bitness_branches() {
        let mut facts = log("You might want to install a 64bit Java version");
        assert_eq!(run(bitness, &facts).keys(), vec!["32_bit_java"]);

        facts.operating_system = Some(OperatingSystem::MacOs);
        assert_eq!(run(bitness, &facts).keys(), vec!["arm_java_multimc"]);

        facts.raw_content = "launched via mcwrap.py".to_string();
        facts.launcher = Some("MultiMC".to_string());
        assert!(run(bitness, &facts).is_empty());

        facts.raw_content.clear();
        assert_eq!(run(bitness, &facts).keys(), vec!["use_prism"]);
    }

    #[test]
    fn test_missing_and_broken_java() {
        let facts = log("The java binary \"\" couldn't be found.");
        assert_eq!(run(missing_java, &facts).keys(), vec!["no_java"]);
        // An empty path does not match the broken-binary pattern.
        assert!(run(broken_java, &facts).is_empty());

        let facts = log("The java binary \"/usr/bin/java\" couldn't be found.");
        assert_eq!(run(broken_java, &facts).keys(), vec!["broken_java"]);

        let facts = log("Incompatible magic value 0 in class file sun/security/provider/SunEntries");
        assert_eq!(run(broken_java, &facts).keys(), vec!["broken_java"]);
        assert!(run_latched(broken_java, &facts, true).is_empty());
    }

    const PRISM_MISMATCH: &str = "This instance is not compatible with Java version 8.\n\
        Please switch to one of the following Java versions for this instance:\n\
        Java version 17";

    #[test]
    fn test_prism_java_switch_advised_for_new_game() {
        let mut facts = log(PRISM_MISMATCH);
        facts.minecraft_version = Some("1.19.2".to_string());
        facts.operating_system = Some(OperatingSystem::Windows);
        let verdict = run(prism_java, &facts);
        assert_eq!(verdict.keys(), vec!["incorrect_java_prism"]);
        assert_eq!(
            verdict.emissions[0].args,
            vec!["8", "17", "17", " (download the .msi file)", "17"]
        );
        assert!(!verdict.found_cause);
    }

    #[test]
    fn test_prism_java_check_blamed_otherwise() {
        let mut facts = log(PRISM_MISMATCH);
        facts.minecraft_version = Some("1.16.1".to_string());
        assert_eq!(run(prism_java, &facts).keys(), vec!["java_comp_check"]);

        facts.mod_loader = Some(ModLoader::Forge);
        assert_eq!(run(prism_java, &facts).keys(), vec!["incorrect_java_prism"]);
    }
}
