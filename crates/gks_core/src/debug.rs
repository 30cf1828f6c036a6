//! Developer helpers: report keys no case covers, and stock a profile with every key and case.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::config::{CaseKind, NamedCase};
use crate::core_api::well_known_ids::IGNORED_KEYS;
use crate::item_tweaks::key_templates;
use crate::migration::RemapTable;
use crate::schema::{Database, GridLocation, Item, ItemLocation, Profile};

pub const DEBUG_ID_SUFFIX: &str = "_gilded_debug_id";
const DEBUG_ROW_WIDTH: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingKey {
    pub id: String,
    pub name: Option<String>,
}

/// Non-quest keys that no slot case has a slot for, skipping the known unused ones.
pub fn missing_keys(db: &Database, cases: &[NamedCase]) -> Vec<MissingKey> {
    let covered: BTreeSet<&str> = cases
        .iter()
        .filter(|(_, case)| case.case_type == CaseKind::Slots)
        .flat_map(|(_, case)| case.slot_ids.iter().map(String::as_str))
        .collect();
    let english = db.locales.global.get("en");

    key_templates(db)
        .into_iter()
        .filter(|id| !covered.contains(id.as_str()) && !IGNORED_KEYS.contains(&id.as_str()))
        .filter(|id| db.item(id).and_then(|item| item.props.quest_item) != Some(true))
        .map(|id| MissingKey {
            name: english.and_then(|locale| locale.get(&format!("{id} Name")).cloned()),
            id,
        })
        .collect()
}

/// Every distinct key any slot case holds, followed by the cases themselves.
pub fn debug_item_templates(cases: &[NamedCase], remap: &RemapTable) -> Vec<String> {
    let keys = cases
        .iter()
        .filter(|(_, case)| case.case_type == CaseKind::Slots)
        .flat_map(|(_, case)| case.slot_ids.iter().cloned());
    let case_ids = cases
        .iter()
        .map(|(_, case)| remap.remap(&case.id).to_string());

    let mut seen = BTreeSet::new();
    keys.chain(case_ids)
        .filter(|tpl| seen.insert(tpl.clone()))
        .collect()
}

/// Drops one of every key and case into the stash, ten to a row. Returns `None` for a profile
/// that has not been loaded into the stash once yet.
pub fn give_all_keys_and_cases(
    profile: &mut Profile,
    cases: &[NamedCase],
    remap: &RemapTable,
) -> Option<usize> {
    let Some(pmc) = profile.characters.pmc.as_mut() else {
        tracing::warn!("new profile: load into the stash once before requesting debug items");
        return None;
    };
    let Some(inventory) = pmc.inventory.as_mut() else {
        tracing::warn!("new profile: load into the stash once before requesting debug items");
        return None;
    };
    let stash = inventory.stash.clone()?;

    let (mut x, mut y) = (0, 0);
    let mut given = 0;
    for tpl in debug_item_templates(cases, remap) {
        x += 1;
        if x >= DEBUG_ROW_WIDTH {
            x = 0;
            y += 1;
        }

        let id = format!("{tpl}{DEBUG_ID_SUFFIX}");
        if inventory.items.iter().any(|item| item.id == id) {
            continue;
        }
        let mut item = Item::new(id, tpl.clone());
        item.parent_id = Some(stash.clone());
        item.slot_id = Some("hideout".to_string());
        item.location = Some(ItemLocation::Grid(GridLocation {
            is_searched: Some(true),
            ..GridLocation::at(x, y)
        }));
        inventory.items.push(item);
        pmc.encyclopedia
            .get_or_insert_with(Default::default)
            .insert(tpl, Value::Bool(true));
        given += 1;
    }
    Some(given)
}

/// Removes everything `give_all_keys_and_cases` added. Returns the number of items removed.
pub fn remove_debug_items(profile: &mut Profile) -> usize {
    let Some(inventory) = profile
        .characters
        .pmc
        .as_mut()
        .and_then(|pmc| pmc.inventory.as_mut())
    else {
        return 0;
    };
    let before = inventory.items.len();
    inventory
        .items
        .retain(|item| !item.id.contains(DEBUG_ID_SUFFIX));
    before - inventory.items.len()
}
