// CrashSleuth - core/rules/inventory.rs
//
// Phase A: one pass over the installed mods before any heuristic runs.
//
// Resolves every mod filename against the registry and sorts it into the
// session lists (duplicates, unrecognised, outdated, declared
// incompatibilities). The summary is reported by `report`, which sits third
// in the battery so it follows the privacy checks.

use super::tables::{matches_any, ASSUME_AS_LATEST, ASSUME_AS_LEGAL};
use super::{RuleContext, Verdict};
use crate::core::model::Facts;
use crate::core::version::VersionResolver;
use crate::util::constants::MAX_INDIVIDUAL_OUTDATED_MODS;

/// A resolved mod that is behind the newest release for this game version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedMod {
    /// Registry display name.
    pub name: String,
    pub download_page: String,
}

/// Session lists built by the inventory scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Lowercased registry names seen more than once, one item per repeat.
    pub duplicates: Vec<String>,

    /// Raw filenames the registry does not know.
    pub illegal: Vec<String>,

    pub outdated: Vec<OutdatedMod>,

    /// Registry name -> declared incompatible mod ids, in first-seen order.
    pub incompatibilities: Vec<(String, Vec<String>)>,
}

impl Inventory {
    pub fn scan(facts: &Facts, resolver: &VersionResolver<'_>, is_mcsr_log: bool) -> Self {
        let mut inventory = Inventory::default();
        let mut checked: Vec<String> = Vec::new();

        for filename in &facts.mods {
            let Some(entry) = resolver.resolve_metadata(filename) else {
                if !matches_any(filename, ASSUME_AS_LEGAL) {
                    inventory.illegal.push(filename.clone());
                }
                continue;
            };
            if !is_mcsr_log {
                continue;
            }

            if let Some(declared) = &entry.incompatible {
                inventory.merge_incompatibilities(&entry.name, declared);
            }

            let lower = entry.name.to_lowercase();
            if checked.contains(&lower) && lower != "optifabric" {
                inventory.duplicates.push(lower);
            } else {
                checked.push(lower);
            }

            let latest =
                VersionResolver::latest_release(entry, facts.minecraft_version.as_deref());
            if let Some(latest) = latest {
                let up_to_date = latest.display_name == *filename
                    || filename.contains(latest.version_string.as_str());
                if !up_to_date && !matches_any(filename, ASSUME_AS_LATEST) {
                    inventory.outdated.push(OutdatedMod {
                        name: entry.name.clone(),
                        download_page: latest.download_page.clone(),
                    });
                }
            }
        }

        inventory
    }

    /// Record `declared` under `name`, creating the list on first sight.
    /// Ids already recorded for `name` are not repeated.
    fn merge_incompatibilities(&mut self, name: &str, declared: &[String]) {
        let position = match self.incompatibilities.iter().position(|(n, _)| n == name) {
            Some(position) => position,
            None => {
                self.incompatibilities.push((name.to_string(), Vec::new()));
                self.incompatibilities.len() - 1
            }
        };
        let ids = &mut self.incompatibilities[position].1;
        for id in declared {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
}

/// Report the inventory: duplicates, unrecognised mods, outdated mods and
/// incompatible pairs that are actually installed together.
pub fn report(ctx: &RuleContext) -> Verdict {
    let inventory = ctx.inventory;
    let mut verdict = Verdict::none();

    for name in &inventory.duplicates {
        verdict.note("duplicate_mod").arg(name);
    }

    match inventory.illegal.as_slice() {
        [] => {}
        [single] => {
            verdict
                .note("amount_illegal_mods")
                .arg(1)
                .arg(format!(" (`{single}`)"));
        }
        many => {
            verdict.note("amount_illegal_mods").arg(many.len()).arg("s");
        }
    }

    if inventory.outdated.len() > MAX_INDIVIDUAL_OUTDATED_MODS {
        verdict
            .error("amount_outdated_mods")
            .arg(inventory.outdated.len())
            .add("update_mods");
    } else {
        for outdated in &inventory.outdated {
            verdict
                .warning("outdated_mod")
                .arg(&outdated.name)
                .arg(&outdated.download_page);
        }
    }

    for (name, ids) in &inventory.incompatibilities {
        for id in ids.iter().filter(|id| ctx.facts.has_mod(id)) {
            verdict.error("incompatible_mod").arg(name).arg(id);
        }
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::super::testing::{run_with, with_mods};
    use super::*;
    use crate::core::model::{ModRegistry, ModRegistryEntry, ReleaseDescriptor};

    fn entry(name: &str, incompatible: Option<&[&str]>, version: &str) -> ModRegistryEntry {
        ModRegistryEntry {
            name: name.to_string(),
            incompatible: incompatible.map(|ids| ids.iter().map(|i| i.to_string()).collect()),
            files: vec![ReleaseDescriptor {
                display_name: format!("{}-{version}.jar", name.to_lowercase()),
                version_string: version.to_string(),
                download_page: format!("https://example.invalid/{name}"),
                game_versions: vec![">=1.16 <=1.16.5".to_string()],
            }],
        }
    }

    fn registry() -> ModRegistry {
        ModRegistry::new(vec![
            entry("WorldPreview", Some(&["carpet", "optifabric"]), "3.0"),
            entry("SpeedRunIGT", None, "13.3"),
            entry("Carpet", None, "1.4"),
        ])
    }

    fn mcsr(mods: &[&str]) -> Facts {
        let mut facts = with_mods(mods);
        facts.minecraft_version = Some("1.16.1".to_string());
        facts
    }

    fn scan(facts: &Facts, registry: &ModRegistry) -> Inventory {
        let resolver = VersionResolver::new(registry);
        Inventory::scan(facts, &resolver, super::super::tables::is_mcsr_log(facts))
    }

    #[test]
    fn test_unrecognised_mods_are_illegal_unless_allow_listed() {
        let registry = registry();
        let inventory = scan(
            &mcsr(&["mystery-1.0.jar", "mcsrranked-1.4.jar", "worldpreview-3.0.jar"]),
            &registry,
        );
        assert_eq!(inventory.illegal, vec!["mystery-1.0.jar".to_string()]);
    }

    #[test]
    fn test_single_and_plural_illegal_note() {
        let registry = registry();
        let one = run_with(report, &mcsr(&["mystery.jar"]), &registry, false);
        assert_eq!(one.emissions[0].args, vec!["1".to_string(), " (`mystery.jar`)".to_string()]);

        let two = run_with(report, &mcsr(&["a.jar", "b.jar"]), &registry, false);
        assert_eq!(two.emissions[0].args, vec!["2".to_string(), "s".to_string()]);
    }

    #[test]
    fn test_outdated_detection_and_up_to_date_by_version() {
        let registry = registry();
        let inventory = scan(
            &mcsr(&["worldpreview-2.0.jar", "SpeedRunIGT-13.3+1.16.1.jar"]),
            &registry,
        );
        assert_eq!(inventory.outdated.len(), 1);
        assert_eq!(inventory.outdated[0].name, "WorldPreview");
        assert_eq!(inventory.outdated[0].download_page, "https://example.invalid/WorldPreview");
    }

    #[test]
    fn test_non_speedrun_log_skips_version_checks() {
        let registry = registry();
        let mut facts = with_mods(&["carpet-1.0.jar"]);
        facts.minecraft_version = Some("1.16.5".to_string());
        let inventory = scan(&facts, &registry);
        assert!(inventory.outdated.is_empty());
        assert!(inventory.illegal.is_empty());
    }

    #[test]
    fn test_duplicates_reported_once_per_repeat() {
        let registry = registry();
        let inventory = scan(
            &mcsr(&["worldpreview-3.0.jar", "WorldPreview-3.0 (1).jar"]),
            &registry,
        );
        assert_eq!(inventory.duplicates, vec!["worldpreview".to_string()]);
    }

    #[test]
    fn test_incompatibilities_populate_on_first_sight() {
        let registry = registry();
        let facts = mcsr(&["worldpreview-3.0.jar", "carpet-1.4.jar", "worldpreview-3.0.jar"]);
        let inventory = scan(&facts, &registry);
        assert_eq!(
            inventory.incompatibilities,
            vec![(
                "WorldPreview".to_string(),
                vec!["carpet".to_string(), "optifabric".to_string()]
            )]
        );

        let verdict = run_with(report, &facts, &registry, false);
        let errors: Vec<&Vec<String>> = verdict
            .emissions
            .iter()
            .filter(|e| e.key == "incompatible_mod")
            .map(|e| &e.args)
            .collect();
        assert_eq!(errors, vec![&vec!["WorldPreview".to_string(), "carpet".to_string()]]);
    }
}
