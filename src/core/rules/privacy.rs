// CrashSleuth - core/rules/privacy.rs
//
// Checks for personal data leaking through a shared log.

use super::{static_regex, RuleContext, Verdict};

/// User names that do not identify anyone.
const GENERIC_USER_NAMES: &[&str] = &["user", "admin", "********"];

/// Session token printed in clear text (the redacted form starts with '<').
pub fn session_token(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    if facts.has_content("(Session ID is token:") && !facts.has_content("(Session ID is token:<") {
        verdict.error("leaked_session_id_token");
    }
    verdict
}

/// Home directory path exposing a real account name.
pub fn username(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let home = static_regex!(r"/(Users|home)/([^/]+)/");
    let leaked = home
        .captures(&ctx.facts.raw_content)
        .and_then(|caps| caps.get(2))
        .is_some_and(|name| !GENERIC_USER_NAMES.contains(&name.as_str().to_lowercase().as_str()));
    if leaked {
        verdict.info("leaked_username");
    }
    verdict
}
