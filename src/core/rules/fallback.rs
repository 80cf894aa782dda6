// CrashSleuth - core/rules/fallback.rs
//
// Last-resort crash attribution, used only when no earlier rule explained
// the crash.
//
// Mod ids named by mixin failures are collected first. Then the crash
// section of the log is searched for a reduced, alphabetic fragment of
// every installed mod's filename. One suspect is named directly; two to
// five are listed; more than that says nothing useful and is dropped.

use super::tables::MCSR_MODS;
use super::{static_regex, RuleContext, Verdict};
use crate::util::constants::MAX_ATTRIBUTED_MODS;
use regex::Regex;

/// Tokens that say nothing about which mod a filename belongs to. Removed
/// in this order, so "mc" is gone before "mod" is considered.
const NOISE_TOKENS: &[&str] = &[
    ".", "fabric", "forge", "quilt", "v", "mc", "mod", "backport", "snapshot", "build", "prism",
];

fn mixin_patterns() -> [&'static Regex; 3] {
    [
        static_regex!(r"ERROR\]: Mixin apply for mod ([\w\-+]+) failed"),
        static_regex!(r"from mod ([\w\-+]+) failed injection check"),
        static_regex!(r"due to errors, provided by '([\w\-+]+)'"),
    ]
}

/// Reduce a mod filename to the part that names the mod
/// ("sodium-fabric-mc1.16.5-0.2.0+build.4.jar" -> "sodium").
///
/// Filename parts are kept while they carry at least two letters once noise
/// tokens and digits are stripped; the first part that strips to nothing
/// ends the name.
pub fn mod_fragment(filename: &str) -> String {
    let lowered = filename.to_lowercase().replace(".jar", "");
    let separated: String = lowered
        .chars()
        .map(|c| if matches!(c, '+' | '_' | '=' | ',' | ' ') { '-' } else { c })
        .collect();

    let mut fragment = String::new();
    for part in separated.split('-') {
        let mut stripped = part.to_string();
        for token in NOISE_TOKENS {
            stripped = stripped.replace(token, "");
        }
        stripped.retain(|c| !c.is_ascii_digit());

        if stripped.is_empty() {
            break;
        }
        if stripped.chars().count() > 1 {
            fragment.push_str(part);
        }
    }
    fragment
}

pub fn attribution(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.found_crash_cause {
        return verdict;
    }
    let facts = ctx.facts;
    let mut suspects: Vec<String> = Vec::new();

    for pattern in mixin_patterns() {
        let Some(caps) = pattern.captures(&facts.raw_content) else {
            continue;
        };
        let mod_id = caps[1].to_lowercase();
        let installed: Vec<&String> = facts
            .mods
            .iter()
            .filter(|m| m.to_lowercase().contains(&mod_id))
            .collect();
        if installed.is_empty() {
            suspects.push(caps[1].to_string());
        } else {
            suspects.extend(installed.into_iter().cloned());
        }
    }

    let crash_section = static_regex!(
        r"(?s)Minecraft has crashed!.*|Failed to start Minecraft:.*|Unable to launch\n.*|Exception caught from launcher\n.*|---- Minecraft Crash Report ----.*A detailed walkthrough of the error"
    );
    if let Some(section) = crash_section.find(&facts.raw_content) {
        let stacktrace = section.as_str().to_lowercase();
        if !stacktrace.contains("this is not a error") {
            if facts.mods.is_empty() {
                for known in MCSR_MODS {
                    let needle = known.replace('-', "").to_lowercase();
                    let listed = suspects
                        .iter()
                        .any(|s| s.as_str() == *known || *s == known.to_lowercase());
                    if stacktrace.contains(&needle) && !listed {
                        suspects.push(known.to_string());
                    }
                }
            } else {
                for filename in &facts.mods {
                    let fragment = mod_fragment(filename);
                    if fragment.chars().count() > 2
                        && stacktrace.contains(&fragment)
                        && !suspects.contains(filename)
                    {
                        suspects.push(filename.clone());
                    }
                }
            }
        }
    }

    match suspects.len() {
        0 => {}
        1 => {
            verdict.error("mod_crash").arg(&suspects[0]);
        }
        n if n <= MAX_ATTRIBUTED_MODS => {
            verdict.error("mods_crash").arg(suspects.join("; "));
        }
        n => {
            tracing::trace!(suspects = n, "Too many crash suspects to attribute");
        }
    }
    verdict
}
