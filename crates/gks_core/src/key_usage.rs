//! Using a key to enter a map. The host normally deletes the key outright; here a key only
//! loses one use and disappears once it runs out, wherever it is stored in the equipment.

use crate::core_api::well_known_ids::base_class;
use crate::schema::{Database, Inventory, KeyUpd, Upd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyUse {
    /// No key id was supplied.
    NoKey,
    /// The id is not on the player's equipment.
    NotFound,
    /// The key has no use limit.
    Unlimited,
    Used { usages: u32, maximum: u32 },
    /// The item (and anything inside it) was removed: either its last use or not a key.
    Discarded { removed: usize },
}

pub fn consume_entry_key(inventory: &mut Inventory, db: &Database, key_id: &str) -> KeyUse {
    if key_id.is_empty() {
        return KeyUse::NoKey;
    }
    let Some(equipment) = inventory.equipment.as_deref() else {
        return KeyUse::NotFound;
    };
    let on_equipment = inventory
        .descendant_ids(equipment)
        .iter()
        .skip(1)
        .any(|id| id == key_id);
    if !on_equipment {
        return KeyUse::NotFound;
    }
    let Some(position) = inventory.items.iter().position(|item| item.id == key_id) else {
        return KeyUse::NotFound;
    };

    let tpl = inventory.items[position].tpl.clone();
    if db.is_of_base_class(&tpl, base_class::KEY) {
        let maximum = db
            .item(&tpl)
            .and_then(|template| template.props.maximum_number_of_usage)
            .unwrap_or(0);
        if maximum == 0 {
            return KeyUse::Unlimited;
        }

        let key = &mut inventory.items[position];
        let usage = key
            .upd
            .get_or_insert_with(Upd::default)
            .key
            .get_or_insert_with(KeyUpd::default);
        usage.number_of_usages += 1;
        let usages = usage.number_of_usages;
        if usages < maximum {
            tracing::debug!("key {key_id} used {usages}/{maximum}");
            return KeyUse::Used { usages, maximum };
        }
    }

    let removed = discard(inventory, key_id);
    tracing::debug!("discarded entry item {key_id} ({removed} records)");
    KeyUse::Discarded { removed }
}

fn discard(inventory: &mut Inventory, root_id: &str) -> usize {
    let doomed = inventory.descendant_ids(root_id);
    let before = inventory.items.len();
    inventory
        .items
        .retain(|item| !doomed.iter().any(|id| *id == item.id));
    before - inventory.items.len()
}
