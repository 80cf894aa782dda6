// CrashSleuth - core/rules/memory.rs
//
// Heap allocation checks. Shenandoah needs less headroom, so its presence
// lowers the "too little" thresholds.

use super::{RuleContext, Verdict};
use crate::util::constants::{
    RAM_ELEVATED_LIMIT, RAM_EXCESSIVE_LIMIT, RAM_HIGH_LIMIT, RAM_LOW_LIMIT,
    RAM_LOW_LIMIT_SHENANDOAH, RAM_VERY_LOW_LIMIT, RAM_VERY_LOW_LIMIT_SHENANDOAH,
};

pub fn ram_allocation(ctx: &RuleContext) -> Verdict {
    let mut verdict = Verdict::none();
    let facts = ctx.facts;
    let guide = ctx.ram_guide();
    let out_of_memory =
        facts.has_content("OutOfMemoryError") || facts.has_content("GL error GL_OUT_OF_MEMORY");

    let Some(allocated) = facts.max_allocated else {
        if out_of_memory {
            verdict.error("too_little_ram_crash").add(guide);
        }
        return verdict;
    };

    let (low, very_low) = if facts.has_java_argument("shenandoah") {
        (RAM_LOW_LIMIT_SHENANDOAH, RAM_VERY_LOW_LIMIT_SHENANDOAH)
    } else {
        (RAM_LOW_LIMIT, RAM_VERY_LOW_LIMIT)
    };

    if (allocated < low && facts.has_content(" -805306369")) || out_of_memory {
        verdict.error("too_little_ram_crash").add(guide);
        verdict.set_cause();
    } else if allocated < very_low {
        verdict.warning("too_little_ram").add(guide);
    } else if allocated < low {
        verdict.note("too_little_ram").add(guide);
    }

    // Newer versions legitimately want more memory.
    if ctx.is_mcsr_log && !facts.short_version_in(18..=27) {
        if allocated > RAM_EXCESSIVE_LIMIT {
            verdict.error("too_much_ram").add(guide);
        } else if allocated > RAM_HIGH_LIMIT {
            verdict.warning("too_much_ram").add(guide);
        } else if allocated > RAM_ELEVATED_LIMIT {
            verdict.note("too_much_ram").add(guide);
        }
    }
    verdict
}
