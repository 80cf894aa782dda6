// CrashSleuth - core/rules/mods.rs
//
// Checks tied to specific mods: wrong builds, known crashes, missing
// dependencies and mods that are not allowed in speedruns.

use super::{static_regex, RuleContext, Verdict};
use crate::core::model::OperatingSystem;

/// Attach a registry download link for `fragment` to the last emission, if
/// the registry knows a release for this game version.
fn add_download_link(verdict: &mut Verdict, ctx: &RuleContext, fragment: &str) {
    let Some((name, page)) = ctx.download_link(fragment) else {
        return;
    };
    if let Some(emission) = verdict.emissions.last_mut() {
        emission.add_with("mod_download", vec![name, page]);
    }
}

/// Regular Sodium builds crash on macOS.
pub fn mac_sodium(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if facts.is_os(OperatingSystem::MacOs)
        && (facts.has_mod("sodium-1.16.1-v1") || facts.has_mod("sodium-1.16.1-v2"))
    {
        verdict.error("not_using_mac_sodium");
    }
    verdict
}

/// Phosphor has been superseded by Starlight.
pub fn phosphor(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.facts.has_mod("phosphor") && !ctx.facts.is_minecraft("1.12.2") {
        verdict.note("starlight_better");
        add_download_link(&mut verdict, ctx, "starlight");
    }
    verdict
}

/// Fabric's "requires <version> of <mod>," dependency errors.
pub fn required_mods(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let pattern = static_regex!(r"requires (.*?) of (\w+),");
    for caps in pattern.captures_iter(&ctx.facts.raw_content) {
        let mod_id = &caps[2];
        if mod_id.eq_ignore_ascii_case("fabric") {
            verdict.error("requires_fabric_api");
        } else {
            verdict.error("requires_mod").arg(mod_id);
        }
    }
    verdict
}

/// Fabric API is banned in most speedrun categories.
pub fn fabric_api(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.is_mcsr_log && ctx.facts.has_mod("fabric-api") {
        verdict.warning("using_fabric_api");
    }
    verdict
}

/// Known Sodium crashes: an outdated build, or a corrupted options file.
pub fn sodium_crash(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if facts.has_content(
        "java.lang.NullPointerException: Cannot invoke \"net.minecraft.class_2680.method_26213()\" because \"state\" is null",
    ) {
        verdict.error("old_sodium_crash");
        add_download_link(&mut verdict, ctx, "sodium");
        verdict.set_cause();
    } else if facts.has_content("me.jellysquid.mods.sodium.client.SodiumClientMod.options") {
        verdict.error("sodium_config_crash");
        verdict.set_cause();
    }
    verdict
}

/// 1.16 concurrent modification crash that Voyager fixes.
///
/// The harmless concurrent modification some threads log at shutdown is
/// removed before searching.
pub fn voyager(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if facts.short_version().as_deref() != Some("1.16") || facts.has_mod("voyager") {
        return verdict;
    }
    let harmless = static_regex!(
        r#"Uncaught exception in thread "Thread-\d+"\njava\.util\.ConcurrentModificationException: null"#
    );
    let remaining = harmless.replace_all(&facts.raw_content, "");
    if remaining.contains("java.util.ConcurrentModificationException") {
        verdict.error("no_voyager_crash");
    }
    verdict
}

const LOG_SPAM_SIGNATURES: &[&str] = &[
    "Using missing texture, unable to load",
    "Exception loading blockstate definition",
    "Unable to load model",
    "java.lang.NullPointerException: Cannot invoke \"com.mojang.authlib.minecraft.MinecraftProfileTexture.getHash()\" because \"?\" is null",
    " to profiler if profiler tick hasn't started - missing ",
];

/// Harmless spam that speedrunners often mistake for the problem.
pub fn log_spam(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.is_mcsr_log && LOG_SPAM_SIGNATURES.iter().any(|s| ctx.facts.has_content(s)) {
        verdict.info("log_spam");
    }
    verdict
}

/// Current ServerSideRNG is only legal in some categories.
pub fn ssrng_current(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    if ctx.facts.has_mod("serversiderng-9") {
        verdict.warning("using_ssrng");
    }
    verdict
}

/// Old ServerSideRNG builds, otherwise the Starlight lighting crash,
/// otherwise exit code -805306369.
pub fn ssrng_old(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if (1..=8).any(|build| facts.has_mod(&format!("serversiderng-{build}"))) {
        verdict.error("using_old_ssrng");
    } else if facts.has_content("Failed to light chunk")
        && facts.has_content("net.minecraft.class_148: Feature placement")
        && facts.has_content("java.lang.ArrayIndexOutOfBoundsException")
    {
        verdict.info("starlight_crash");
    } else if (!ctx.found_crash_cause && facts.has_content(" -805306369"))
        || facts.has_content("java.lang.ArithmeticException")
    {
        verdict.warning("exitcode_805306369");
    }
    verdict
}

/// AutoReset was replaced by Atum.
pub fn autoreset(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if facts.has_mod("autoreset") || facts.has_content("the mods atum and autoreset") {
        verdict.error("autoreset_user");
        add_download_link(&mut verdict, ctx, "atum");
        verdict.set_cause();
    }
    verdict
}
