// CrashSleuth - core/rules/crashes.rs
//
// Crash signatures that need more than a literal match: graphics driver
// failures, native exit codes with remediation chains, system libraries,
// filesystem problems.

use super::{static_regex, RuleContext, Verdict};
use crate::util::constants::SHORT_LOG_LINE_LIMIT;

/// Instance folder in a synced, protected or temporary location.
pub fn instance_folder(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let Some(folder) = ctx.facts.minecraft_folder.as_deref() else {
        return verdict;
    };
    if folder.contains("OneDrive") {
        verdict.note("onedrive");
    }
    if folder.contains("C:/Program Files") {
        verdict.note("program_files");
    }
    // WinRAR extracts to "Rar$..." temp folders when run from the archive.
    if folder.contains("Rar$") {
        verdict
            .error("need_to_extract_from_zip")
            .arg(ctx.facts.launcher.as_deref().unwrap_or("the launcher"));
    }
    verdict
}

/// Unaccelerated pixel format or an Intel ICD fault, otherwise a generic
/// native access violation.
pub fn graphics(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    let has_srigt = facts.has_mod("speedrunigt");
    let intel_icd = static_regex!(r"C  \[(ig[0-9]+icd[0-9]+\.dll)[+ ](0x[0-9a-f]+)\]");

    if facts.has_content("Pixel format not accelerated") || facts.matches(intel_icd) {
        if has_srigt {
            verdict.error("eav_crash").add("eav_crash_srigt");
        } else {
            verdict.error("gl_pixel_format");
        }
    } else if facts.has_content("A fatal error has been detected by the Java Runtime Environment")
        || facts.has_content("EXCEPTION_ACCESS_VIOLATION")
    {
        let emission = verdict.error("eav_crash");
        for step in 1..=5 {
            emission.add(format!("eav_crash_{step}"));
        }
        if has_srigt {
            emission.add("eav_crash_srigt");
        }
        emission.add("eav_crash_disclaimer");
    }
    verdict
}

/// The launcher was told to use the system GLFW and/or OpenAL.
pub fn system_libraries(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    let libs: Vec<&str> = ["GLFW", "OpenAL"]
        .into_iter()
        .filter(|lib| facts.has_content(&format!("Using system {lib}")))
        .collect();
    let described = match libs.as_slice() {
        [one] => format!("{one} installation"),
        [first, second] => format!("{first} and {second} installations"),
        _ => return verdict,
    };

    if facts.has_content("Failed to locate library:") {
        verdict
            .error("builtin_lib_crash")
            .arg(&described)
            .arg(facts.launcher.as_deref().unwrap_or("your launcher"))
            .arg(if facts.is_prism { " > Tweaks" } else { "" });
        verdict.set_cause();
    } else {
        verdict.note("builtin_lib_recommendation").arg(described);
    }
    verdict
}

/// The game could not create one of its directories.
pub fn directory_creation(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.facts.matches(static_regex!(
        r"java\.io\.IOException: Directory '(.+?)' could not be created"
    )) {
        verdict.error("try_admin_launch");
    }
    verdict
}

/// Exit code -1073741819 (0xC0000005): native access violation.
pub fn access_violation_exit(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if !facts.has_content(" -1073741819")
        && !facts.has_content(
            "The instruction at 0x%p referenced memory at 0x%p. The memory could not be %s.",
        )
    {
        return verdict;
    }

    let emission = verdict.error("exitcode").arg("-1073741819");
    emission.add("exitcode_1073741819_1").add("exitcode_1073741819_2");
    if facts.line_count() < SHORT_LOG_LINE_LIMIT {
        if facts.has_mod("sodium") && !facts.has_mod("sodiummac") {
            emission.add("exitcode_1073741819_3");
        }
        emission.add("exitcode_1073741819_4");
    }
    emission.add("exitcode_1073741819_5");
    verdict
}

/// Exit code -1073740791 (0xC0000409): stack buffer overrun.
pub fn heap_corruption_exit(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if !facts.has_content(" -1073740791") {
        return verdict;
    }

    let emission = verdict.error("exitcode").arg("-1073740791");
    emission.add("exitcode_1073741819_2");
    if facts.line_count() < SHORT_LOG_LINE_LIMIT {
        emission.add("exitcode_1073741819_4");
    }
    emission.add("exitcode_1073741819_5");
    verdict
}

/// Offline launch of an instance whose assets were never downloaded.
pub fn offline_launch(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if facts.has_content("Launched instance in offline mode") && facts.has_content("(missing)\n") {
        verdict
            .error("online_launch_required")
            .arg(if facts.is_prism { "" } else { " Instance" });
        verdict.set_cause();
    }
    verdict
}

/// Full disk. A chunk store failure only counts when nothing else explains
/// the crash; the Windows disk-full message always counts.
pub fn disk_space(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if (!ctx.found_crash_cause && facts.has_content("Failed to store chunk"))
        || facts.has_content("There is not enough space on the disk")
    {
        verdict.error("out_of_disk_space");
    }
    verdict
}
