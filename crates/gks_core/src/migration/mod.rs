//! Repairs a player's inventory after the mod changed case identifiers or layouts.
//!
//! One call walks `Idle -> Remapping -> Reconciling(case) -> Committed`, or ends in
//! `RolledBack` when any case cannot be reconciled. The remap of legacy `_tpl` values is
//! kept either way; slot and location edits are all-or-nothing.

mod grids;
mod remap;
mod slots;
mod snapshot;
mod template_index;

pub use grids::reconcile_grids;
pub use remap::RemapTable;
pub use slots::reconcile_slots;
pub use snapshot::InventorySnapshot;
pub use template_index::{AllowList, ContainerTemplate, GridSchema, SlotSchema, TemplateIndex};

use crate::config::CaseKind;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::schema::{Item, Profile};

/// A case the migration knows about, in the order it is declared in the case config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub template_id: String,
    pub kind: CaseKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub remapped: usize,
    pub moved: usize,
    pub containers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The profile has no PMC inventory yet.
    Skipped,
    Committed(MigrationReport),
    /// Slot/location edits were undone; `remapped` legacy ids stay rewritten.
    RolledBack { remapped: usize, error: CoreError },
}

impl MigrationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Migrator<'a> {
    remap: &'a RemapTable,
    index: &'a TemplateIndex,
    containers: &'a [ContainerSpec],
}

impl<'a> Migrator<'a> {
    pub fn new(
        remap: &'a RemapTable,
        index: &'a TemplateIndex,
        containers: &'a [ContainerSpec],
    ) -> Self {
        Self {
            remap,
            index,
            containers,
        }
    }

    pub fn migrate(&self, profile: &mut Profile) -> MigrationOutcome {
        let Some(inventory) = profile
            .characters
            .pmc
            .as_mut()
            .and_then(|pmc| pmc.inventory.as_mut())
        else {
            tracing::debug!("profile has no inventory yet, nothing to migrate");
            return MigrationOutcome::Skipped;
        };
        let items = &mut inventory.items;

        let remapped = self.remap.apply(items);
        if remapped > 0 {
            tracing::info!("updated {remapped} legacy case ids");
        }

        let snapshot = InventorySnapshot::take(items);
        match self.reconcile_all(items) {
            Ok(moved) => {
                drop(snapshot);
                MigrationOutcome::Committed(MigrationReport {
                    remapped,
                    moved,
                    containers: self.containers.len(),
                })
            }
            Err(error) => {
                tracing::error!("{error}; restoring inventory");
                snapshot.restore(items);
                MigrationOutcome::RolledBack { remapped, error }
            }
        }
    }

    fn reconcile_all(&self, items: &mut [Item]) -> Result<usize, CoreError> {
        let mut moved = 0;
        for spec in self.containers {
            let instances: Vec<String> = items
                .iter()
                .filter(|item| item.tpl == spec.template_id)
                .map(|item| item.id.clone())
                .collect();
            if instances.is_empty() {
                continue;
            }
            let template = self.index.template_for(&spec.template_id)?;

            for instance in &instances {
                moved += match (spec.kind, template) {
                    (CaseKind::Slots, ContainerTemplate::Slots(slots)) => {
                        reconcile_slots(items, instance, slots, self.index)?
                    }
                    (CaseKind::Grid, ContainerTemplate::Grids(grids)) => {
                        reconcile_grids(items, instance, grids, self.index)?
                    }
                    _ => {
                        return Err(CoreError::new(
                            CoreErrorCode::UnknownTemplate,
                            format!(
                                "template {} does not have the {:?} layout its config declares",
                                spec.template_id, spec.kind
                            ),
                        ));
                    }
                };
            }
        }
        Ok(moved)
    }
}
