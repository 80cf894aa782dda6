// CrashSleuth - core/rules/ranked.rs
//
// MCSR Ranked anticheat verifier report.
//
// The report sits between a fixed banner and the first anticheat stack
// frame, and holds up to three sections, each a list of "[mod]" lines. The
// verifier prints them as not-whitelisted, wrong files, wrong versions, so
// they are split off from the end. Missing sections yield empty lists.

use super::{static_regex, RuleContext, Verdict};
use crate::util::constants::MAX_LISTED_ANTICHEAT_MODS;

const REPORT_BANNER: &str = "Incompatible mod set found! READ THE BELOW LINES!";
const REPORT_END: &str = "at com.mcsr.projectelo.anticheat";

const WRONG_VERSIONS_HEADER: &str =
    "These Fabric Mods are whitelisted but different version! Make sure to update these!";
const WRONG_FILES_HEADER: &str = "These Fabric Mods are whitelisted and you seem to be using the correct version but the files do not match. Try downloading these files again!";
const NOT_WHITELISTED_HEADER: &str =
    "These Fabric Mods are not whitelisted! You should delete these from Minecraft.";

/// Mod lists parsed from one verifier report.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnticheatReport {
    pub wrong_versions: Vec<String>,
    pub wrong_files: Vec<String>,
    pub not_whitelisted: Vec<String>,
}

impl AnticheatReport {
    /// Extract the report from a raw log, if one is present.
    pub fn parse(content: &str) -> Option<Self> {
        let start = content.find(REPORT_BANNER)? + REPORT_BANNER.len();
        let length = content[start..].find(REPORT_END)?;
        let body = content[start..start + length].trim().replace('\t', "");

        let mut report = AnticheatReport::default();
        let (rest, section) = split_section(&body, WRONG_VERSIONS_HEADER);
        report.wrong_versions = bracketed(section);
        let (rest, section) = split_section(rest, WRONG_FILES_HEADER);
        report.wrong_files = bracketed(section);
        let (_, section) = split_section(rest, NOT_WHITELISTED_HEADER);
        report.not_whitelisted = bracketed(section)
            .into_iter()
            .map(|m| if m == "fabric" { "Fabric API".to_string() } else { m })
            .collect();

        Some(report)
    }
}

/// Text before the first `header`, and the section between the first and
/// second occurrence of it.
fn split_section<'a>(text: &'a str, header: &str) -> (&'a str, &'a str) {
    let mut parts = text.split(header);
    let before = parts.next().unwrap_or_default();
    match parts.next() {
        Some(section) => (before, section),
        None => (text, ""),
    }
}

/// First "[...]" group of every line.
fn bracketed(section: &str) -> Vec<String> {
    let pattern = static_regex!(r"\[(.*?)\]");
    section
        .split('\n')
        .filter_map(|line| pattern.captures(line).map(|caps| caps[1].to_string()))
        .collect()
}

/// Subject phrase and pronoun for a mod list: "a mod `x` that is" / "it",
/// or "`n` mods (`a, b`) that are" / "them", abbreviated past the limit.
fn describe(mods: &[String], singular_verb: &str, plural_verb: &str) -> Option<(String, &'static str)> {
    match mods {
        [] => None,
        [only] => Some((format!("a mod `{only}` that {singular_verb}"), "it")),
        [first, second, ..] if mods.len() > MAX_LISTED_ANTICHEAT_MODS => Some((
            format!("`{}` mods (`{first}, {second}, ...`) that {plural_verb}", mods.len()),
            "them",
        )),
        _ => Some((
            format!("`{}` mods (`{}`) that {plural_verb}", mods.len(), mods.join(", ")),
            "them",
        )),
    }
}

pub fn anticheat(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let Some(report) = AnticheatReport::parse(&ctx.facts.raw_content) else {
        return verdict;
    };
    verdict.set_cause();

    if let Some((subject, pronoun)) = describe(&report.wrong_versions, "is", "are") {
        verdict
            .error("ranked_rong_versions")
            .arg(subject)
            .arg(pronoun)
            .add("update_mods_ranked");
    }
    if let Some((subject, pronoun)) = describe(&report.wrong_files, "seems", "seem") {
        verdict
            .error("ranked_rong_files")
            .arg(subject)
            .arg(pronoun)
            .add("update_mods_ranked");
    }
    if let Some((subject, pronoun)) = describe(&report.not_whitelisted, "is", "are") {
        verdict.error("ranked_rong_mods").arg(subject).arg(pronoun);
    }
    verdict
}
