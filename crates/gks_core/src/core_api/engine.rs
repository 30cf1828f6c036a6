use std::path::Path;

use crate::cases::create_case;
use crate::config::{
    self, DEFAULT_BARTERS_JSON, DEFAULT_CASES_JSON, DEFAULT_CONFIG_JSON, ModConfig,
    NamedBarter, NamedCase,
};
use crate::debug::{self, MissingKey};
use crate::item_tweaks::{
    adjust_item_properties, restore_missing_grid_filters, set_labs_card_raid_limit,
};
use crate::key_usage::{KeyUse, consume_entry_key};
use crate::migration::{ContainerSpec, MigrationOutcome, Migrator, RemapTable, TemplateIndex};
use crate::schema::{Database, Profile};
use crate::traders::push_supportive_barters;

use super::error::CoreError;
use super::well_known_ids::LABS_CARD_RAID_LIMIT;

/// What `post_db_load` changed in the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub cases: Vec<String>,
    pub barters: usize,
    pub keys_adjusted: usize,
    pub grid_filters_restored: usize,
    pub labs_limit_set: bool,
}

/// The mod as the host sees it: configured once, then driven through the host's load and
/// session hooks.
#[derive(Debug)]
pub struct GildedKeyStorage {
    config: ModConfig,
    cases: Vec<NamedCase>,
    barters: Vec<NamedBarter>,
    remap: &'static RemapTable,
    containers: Vec<ContainerSpec>,
    index: TemplateIndex,
}

impl GildedKeyStorage {
    pub fn new(config: ModConfig, cases: Vec<NamedCase>, barters: Vec<NamedBarter>) -> Self {
        let remap = RemapTable::builtin();
        let containers = cases
            .iter()
            .map(|(_, case)| ContainerSpec {
                template_id: remap.remap(&case.id).to_string(),
                kind: case.case_type,
            })
            .collect();
        Self {
            config,
            cases,
            barters,
            remap,
            containers,
            index: TemplateIndex::new(),
        }
    }

    /// Configuration embedded in the crate.
    pub fn with_defaults() -> Result<Self, CoreError> {
        Ok(Self::new(
            ModConfig::from_layers(DEFAULT_CONFIG_JSON, "{}")?,
            config::parse_cases(DEFAULT_CASES_JSON)?,
            config::parse_barters(DEFAULT_BARTERS_JSON)?,
        ))
    }

    /// Configuration from a mod `config/` directory.
    pub fn load(config_dir: &Path) -> Result<Self, CoreError> {
        Ok(Self::new(
            ModConfig::load(config_dir)?,
            config::load_cases(config_dir)?,
            config::load_barters(config_dir)?,
        ))
    }

    pub fn config(&self) -> &ModConfig {
        &self.config
    }

    pub fn cases(&self) -> &[NamedCase] {
        &self.cases
    }

    pub fn containers(&self) -> &[ContainerSpec] {
        &self.containers
    }

    pub fn template_index(&self) -> &TemplateIndex {
        &self.index
    }

    /// Patches the freshly loaded database and indexes the case layouts for migration.
    pub fn post_db_load(&mut self, db: &mut Database) -> Result<PatchReport, CoreError> {
        tracing::info!("Gilded Key Storage: mod loading");
        let mut report = PatchReport {
            grid_filters_restored: restore_missing_grid_filters(db),
            ..PatchReport::default()
        };

        for (name, case) in &self.cases {
            tracing::debug!("creating case {name}");
            report.cases.push(create_case(db, &self.config, case, self.remap)?);
        }
        report.barters = push_supportive_barters(db, &self.barters)?;
        report.keys_adjusted = adjust_item_properties(db, &self.config);
        report.labs_limit_set = set_labs_card_raid_limit(db, LABS_CARD_RAID_LIMIT);

        self.index = TemplateIndex::from_database(
            db,
            self.containers.iter().map(|spec| spec.template_id.as_str()),
        )?;

        if self.config.debug.log_missing_keys {
            let missing = self.missing_keys(db);
            tracing::info!("{} keys missing from config", missing.len());
            for key in &missing {
                tracing::info!("{} {}", key.id, key.name.as_deref().unwrap_or("<unnamed>"));
            }
        }
        Ok(report)
    }

    pub fn migrator(&self) -> Migrator<'_> {
        Migrator::new(self.remap, &self.index, &self.containers)
    }

    /// Session start, ahead of the host's own handling. Never fails: a migration that cannot
    /// complete leaves the inventory as it was.
    pub fn game_start(&self, profile: &mut Profile) -> MigrationOutcome {
        let outcome = self.migrator().migrate(profile);

        let flags = &self.config.debug;
        if flags.force_remove_debug_items_on_start {
            debug::remove_debug_items(profile);
        }
        if flags.give_profile_all_keys {
            debug::give_all_keys_and_cases(profile, &self.cases, self.remap);
        }
        outcome
    }

    pub fn logout(&self, profile: &mut Profile) -> usize {
        let flags = &self.config.debug;
        if flags.give_profile_all_keys && !flags.force_remove_debug_items_on_start {
            debug::remove_debug_items(profile)
        } else {
            0
        }
    }

    pub fn use_entry_key(&self, profile: &mut Profile, db: &Database, key_id: &str) -> KeyUse {
        match profile
            .characters
            .pmc
            .as_mut()
            .and_then(|pmc| pmc.inventory.as_mut())
        {
            Some(inventory) => consume_entry_key(inventory, db, key_id),
            None => KeyUse::NotFound,
        }
    }

    pub fn missing_keys(&self, db: &Database) -> Vec<MissingKey> {
        debug::missing_keys(db, &self.cases)
    }
}
