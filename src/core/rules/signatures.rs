// CrashSleuth - core/rules/signatures.rs
//
// Table-driven rules: a fixed diagnosis for one or more literal log lines.

use super::{Rule, RuleContext, Verdict};
use crate::core::model::Channel;

/// How the needles of a signature combine.
#[derive(Debug, Clone, Copy)]
pub enum Needles {
    /// Fires when any needle is present.
    Any(&'static [&'static str]),
    /// Fires only when every needle is present.
    All(&'static [&'static str]),
}

impl Needles {
    fn found_in(&self, content: &str) -> bool {
        match self {
            Needles::Any(needles) => needles.iter().any(|n| content.contains(n)),
            Needles::All(needles) => needles.iter().all(|n| content.contains(n)),
        }
    }
}

/// A literal crash signature and the diagnosis it maps to.
#[derive(Debug)]
pub struct Signature {
    pub id: &'static str,
    pub needles: Needles,
    pub channel: Channel,
    pub key: &'static str,
    pub args: &'static [&'static str],
    pub add_on: Option<&'static str>,
    /// Whether a match explains the crash.
    pub sets_cause: bool,
}

impl Signature {
    const fn error(id: &'static str, needles: Needles, key: &'static str) -> Self {
        Self {
            id,
            needles,
            channel: Channel::Error,
            key,
            args: &[],
            add_on: None,
            sets_cause: false,
        }
    }

    const fn with_add_on(mut self, add_on: &'static str) -> Self {
        self.add_on = Some(add_on);
        self
    }

    const fn with_args(mut self, args: &'static [&'static str]) -> Self {
        self.args = args;
        self
    }

    const fn in_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    const fn causal(mut self) -> Self {
        self.sets_cause = true;
        self
    }
}

/// Rule wrapper for a static signature.
pub struct SignatureRule(pub &'static Signature);

impl Rule for SignatureRule {
    fn id(&self) -> &'static str {
        self.0.id
    }

    fn check(&self, ctx: &RuleContext) -> Verdict {
        let signature = self.0;
        let mut verdict = Verdict::none();
        if !signature.needles.found_in(&ctx.facts.raw_content) {
            return verdict;
        }

        let emission = verdict.emit(signature.channel, signature.key);
        for arg in signature.args {
            emission.arg(arg);
        }
        if let Some(add_on) = signature.add_on {
            emission.add(add_on);
        }
        if signature.sets_cause {
            verdict.set_cause();
        }
        verdict
    }
}

pub static HEADLESS_JAVA: Signature = Signature::error(
    "headless_java",
    Needles::Any(&[
        "java.awt.AWTError: Assistive Technology not found: org.GNOME.Accessibility.AtkWrapper",
    ]),
    "headless_java",
)
.causal();

pub static ASSETS_INDEX: Signature = Signature::error(
    "assets_index",
    Needles::Any(&["Failed to download the assets index"]),
    "assets_index_fail",
);

pub static ID_LIMIT: Signature = Signature::error(
    "id_limit",
    Needles::Any(&["Invalid id 4096 - maximum id range exceeded"]),
    "exceeded_id_limit",
);

pub static MAC_TOO_NEW_JAVA: Signature = Signature::error(
    "mac_too_new_java",
    Needles::Any(&["NSWindow drag regions should only be invalidated on the Main Thread"]),
    "mac_too_new_java",
);

pub static INTEL_HD2000: Signature = Signature::error(
    "intel_hd2000",
    Needles::Any(&["WGL_ARB_create_context_profile is unavailable"]),
    "intel_hd2000",
)
.with_add_on("intell_hd2000_info");

pub static NVIDIA_FLATPAK: Signature = Signature::error(
    "nvidia_flatpak",
    Needles::Any(&[
        "org.lwjgl.LWJGLException: Could not choose GLX13 config",
        "GLFW error 65545: GLX: Failed to find a suitable GLXFBConfig",
    ]),
    "outdated_nvidia_flatpack_driver",
);

pub static FORGE_JAVA_BUG: Signature = Signature::error(
    "forge_java_bug",
    Needles::Any(&[
        "java.lang.NoSuchMethodError: sun.security.util.ManifestEntryVerifier.<init>(Ljava/util/jar/Manifest;)V",
    ]),
    "forge_java_bug",
)
.causal();

pub static FORGE_MAC: Signature = Signature::error(
    "forge_mac",
    Needles::Any(&[
        "java.lang.IllegalStateException: GLFW error before init: [0x10008]Cocoa: Failed to find service port for display",
    ]),
    "incompatible_forge_mac",
)
.causal();

pub static LOCKED_LIBS: Signature = Signature::error(
    "locked_libs",
    Needles::Any(&["Couldn't extract native jar"]),
    "locked_libs",
);

pub static LITHIUM: Signature = Signature::error(
    "lithium_crash",
    Needles::All(&[
        "java.lang.IllegalStateException: Adding Entity listener a second time",
        "me.jellysquid.mods.lithium.common.entity.tracker.nearby",
    ]),
    "lithium_crash",
)
.in_channel(Channel::Info)
.causal();

pub static ABSTRACT_LOGGER: Signature = Signature::error(
    "abstract_logger",
    Needles::Any(&["java.lang.ClassNotFoundException: org.apache.logging.log4j.spi.AbstractLogger"]),
    "no_abstract_logger",
);

pub static FORGE_TOO_NEW_JAVA: Signature = Signature::error(
    "forge_too_new_java",
    Needles::Any(&["ClassLoaders$AppClassLoader cannot be cast to class java.net.URLClassLoader"]),
    "forge_too_new_java",
)
.causal();

pub static RANKED_RESOURCEPACK: Signature = Signature::error(
    "ranked_resourcepack",
    Needles::Any(&["com.mcsr.projectelo.anticheat.file.verifiers.ResourcePackVerifier"]),
    "ranked_resourcepack_crash",
)
.causal();

pub static AREESSGEE: Signature = Signature::error(
    "areessgee_peepopractice",
    Needles::Any(&[
        "Mixin apply for mod areessgee failed areessgee.mixins.json:nether.StructureFeatureMixin from mod areessgee -> net.minecraft.class_3195",
    ]),
    "incompatible_mod",
)
.with_args(&["AreEssGee", "peepoPractice"])
.causal();
