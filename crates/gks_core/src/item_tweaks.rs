use std::collections::BTreeSet;

use crate::config::ModConfig;
use crate::core_api::well_known_ids::{base_class, item_tpl};
use crate::schema::{Database, ItemFilter};

/// Key properties (weight, use limit, insurance, discard limit) and the secure container
/// key exclusions. Returns the number of key templates touched.
pub fn adjust_item_properties(db: &mut Database, config: &ModConfig) -> usize {
    let keys = key_templates(db);
    let secure_containers: BTreeSet<String> = db
        .templates
        .items
        .values()
        .filter(|item| item.is_item() && db.is_of_base_class(&item.id, base_class::MOB_CONTAINER))
        .map(|item| item.id.clone())
        .collect();

    for item in db.templates.items.values_mut() {
        if !item.is_item() {
            continue;
        }
        let props = &mut item.props;

        if keys.contains(&item.id) {
            if config.weightless_keys {
                props.weight = Some(0.0);
            }
            props.insurance_disabled = Some(!config.key_insurance_enabled);
            if config.no_key_use_limit && !config.is_finite_key(&item.id) {
                props.maximum_number_of_usage = Some(0);
            }
            if config.keys_are_discardable {
                // The host flags uninsurable keys with DiscardLimit 0; keep that meaning.
                if props.discard_limit == Some(0) {
                    props.insurance_disabled = Some(true);
                }
                props.discard_limit = Some(-1);
            }
        }

        if config.all_keys_in_secure && secure_containers.contains(&item.id) {
            for grid in props.grids.iter_mut().flatten() {
                if let Some(filter) = grid.first_filter_mut() {
                    filter.excluded_filter.retain(|tpl| !keys.contains(tpl));
                }
            }
        }
    }

    keys.len()
}

/// Puts back the catch-all grid filter other mods sometimes strip from backpacks, vests and
/// secure containers. Returns the number of grids repaired.
pub fn restore_missing_grid_filters(db: &mut Database) -> usize {
    let targets: BTreeSet<String> = db
        .templates
        .items
        .values()
        .filter(|item| item.is_item())
        .filter(|item| {
            item.parent == base_class::BACKPACK
                || item.parent == base_class::VEST
                || (db.is_of_base_class(&item.id, base_class::MOB_CONTAINER)
                    && item.id != item_tpl::SECURE_CONTAINER_BOSS)
        })
        .map(|item| item.id.clone())
        .collect();

    let mut repaired = 0;
    for id in &targets {
        let Some(item) = db.templates.items.get_mut(id) else {
            continue;
        };
        for grid in item.grids_mut() {
            if grid.first_filter().is_none() {
                grid.props.filters = vec![ItemFilter::allowing(
                    vec![base_class::ITEM.to_string()],
                    Vec::new(),
                )];
                repaired += 1;
            }
        }
    }
    if repaired > 0 {
        tracing::info!("restored {repaired} missing container grid filters");
    }
    repaired
}

/// Raises the lobby/raid carry limit of the Labs access keycard.
pub fn set_labs_card_raid_limit(db: &mut Database, limit: u32) -> bool {
    let Some(restrictions) = db.globals.config.restrictions_in_raid.as_mut() else {
        return false;
    };
    let mut found = false;
    for restriction in restrictions
        .iter_mut()
        .filter(|restriction| restriction.template_id == item_tpl::KEYCARD_TERRAGROUP_LABS_ACCESS)
    {
        restriction.max_in_lobby = limit;
        restriction.max_in_raid = limit;
        found = true;
    }
    found
}

pub(crate) fn key_templates(db: &Database) -> BTreeSet<String> {
    db.templates
        .items
        .values()
        .filter(|item| item.is_item() && db.is_of_base_class(&item.id, base_class::KEY))
        .map(|item| item.id.clone())
        .collect()
}
