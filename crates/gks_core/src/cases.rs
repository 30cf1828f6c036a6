//! Builds the case templates and registers them with the handbook, locales, traders and the
//! containers they may (or may not) be stored in.

use crate::config::{CaseConfig, CaseKind, ModConfig};
use crate::core_api::well_known_ids::{HANDBOOK_GEAR_CASES, base_class, item_tpl};
use crate::core_api::{CoreError, CoreErrorCode};
use crate::migration::RemapTable;
use crate::schema::{
    Database, Grid, GridProps, HandbookItem, ItemFilter, Slot, SlotProps, TemplateItem,
};
use crate::traders::push_to_trader;

/// Adds one case to the database and returns its canonical template id.
pub fn create_case(
    db: &mut Database,
    config: &ModConfig,
    case: &CaseConfig,
    remap: &RemapTable,
) -> Result<String, CoreError> {
    let template_id = remap.remap(&case.id).to_string();
    let base_tpl = match case.case_type {
        CaseKind::Grid => item_tpl::CONTAINER_SICC,
        CaseKind::Slots => item_tpl::MOUNT_STRIKE_INDUSTRIES_KEYMOD_4_INCH_RAIL,
    };
    let mut item = db.item(base_tpl).cloned().ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::UnknownTemplate,
            format!(
                "base template {base_tpl} for {} is missing from the database",
                case.item_name
            ),
        )
    })?;

    item.id = template_id.clone();
    item.name = case.item_name.clone();
    item.props.is_always_available_for_insurance = Some(true);
    item.props.discard_limit = Some(-1);
    item.props.prefab.get_or_insert_default().path = format!("CaseBundles/{}.bundle", case.id);
    match case.case_type {
        CaseKind::Grid => item.props.grids = Some(build_grids(&template_id, case, remap)),
        CaseKind::Slots => {
            item.props.slots = Some(build_slots(&template_id, case));
            if case.sound.is_some() {
                item.props.item_sound = case.sound.clone();
            }
        }
    }
    item.props.width = Some(case.external_size.width);
    item.props.height = Some(case.external_size.height);
    item.props.can_sell_on_ragfair = Some(!config.cases_flea_banned);
    item.props.insurance_disabled = Some(!config.cases_insurance_enabled);
    db.templates.items.insert(template_id.clone(), item);

    for locale in db.locales.global.values_mut() {
        locale.insert(format!("{template_id} Name"), case.item_name.clone());
        locale.insert(format!("{template_id} ShortName"), case.item_short_name.clone());
        locale.insert(
            format!("{template_id} Description"),
            case.item_description.clone(),
        );
    }

    let handbook = &mut db.templates.handbook.items;
    handbook.retain(|entry| entry.id != template_id);
    handbook.push(HandbookItem {
        id: template_id.clone(),
        parent_id: HANDBOOK_GEAR_CASES.to_string(),
        price: case.flea_price,
    });

    allow_into_containers(db, config, &template_id);
    push_to_trader(db, &case.offer, &template_id)?;

    tracing::info!("created {} as {template_id}", case.item_name);
    Ok(template_id)
}

/// First 20 characters of the case id followed by a 4-digit hex ordinal. Grid and slot ids
/// must come out the same on every server start.
fn derived_id(template_id: &str, ordinal: usize) -> String {
    let prefix: String = template_id.chars().take(20).collect();
    format!("{prefix:0<20}{ordinal:04x}")
}

fn build_grids(template_id: &str, case: &CaseConfig, remap: &RemapTable) -> Vec<Grid> {
    case.grids
        .iter()
        .enumerate()
        .map(|(index, grid)| {
            let mut included = remap.remap_all(&grid.included_filter);
            if included.is_empty() {
                included.push(base_class::ITEM.to_string());
            }
            Grid {
                name: format!("column{index}"),
                id: derived_id(template_id, index),
                parent: template_id.to_string(),
                props: GridProps {
                    filters: vec![ItemFilter::allowing(
                        included,
                        remap.remap_all(&grid.excluded_filter),
                    )],
                    cells_h: grid.width,
                    cells_v: grid.height,
                    ..GridProps::default()
                },
                extra: Default::default(),
            }
        })
        .collect()
}

fn build_slots(template_id: &str, case: &CaseConfig) -> Vec<Slot> {
    case.slot_ids
        .iter()
        .enumerate()
        .map(|(index, key_tpl)| Slot {
            name: format!("mod_mount_{index}"),
            id: derived_id(template_id, 0x100 + index),
            parent: template_id.to_string(),
            props: SlotProps {
                filters: vec![ItemFilter::allowing(vec![key_tpl.clone()], Vec::new())],
                ..SlotProps::default()
            },
            required: false,
            merge_slot_with_children: false,
            extra: Default::default(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterSide {
    Include,
    Exclude,
}

/// Applies the storage rules for a case to every other container template.
pub fn allow_into_containers(db: &mut Database, config: &ModConfig, case_tpl: &str) {
    for item in db.templates.items.values_mut() {
        if !item.is_item() {
            continue;
        }
        let is_boss_container = item.id == item_tpl::SECURE_CONTAINER_BOSS;

        if !config.allow_in_backpacks && item.parent == base_class::BACKPACK && !is_boss_container
        {
            add_to_grid_filters(item, case_tpl, FilterSide::Exclude);
        }
        if config.allow_in_secure_containers
            && item.parent == base_class::MOB_CONTAINER
            && !is_boss_container
        {
            add_to_grid_filters(item, case_tpl, FilterSide::Include);
        }
        if config.case_disallowed_in.contains(&item.id) {
            add_to_grid_filters(item, case_tpl, FilterSide::Exclude);
        }
        if config.case_allowed_in.contains(&item.id) {
            add_to_grid_filters(item, case_tpl, FilterSide::Include);
        }
        if config.allow_cases_in_special
            && (item.id == item_tpl::POCKETS_1X4_SPECIAL || item.id == item_tpl::POCKETS_1X4_TUE)
        {
            for slot in item.props.slots.iter_mut().flatten() {
                if let Some(filter) = slot.props.filters.first_mut() {
                    push_unique(&mut filter.filter, case_tpl);
                }
            }
        }
    }
}

fn add_to_grid_filters(item: &mut TemplateItem, case_tpl: &str, side: FilterSide) {
    for grid in item.grids_mut() {
        let Some(filter) = grid.first_filter_mut() else {
            continue;
        };
        match side {
            FilterSide::Include => push_unique(&mut filter.filter, case_tpl),
            FilterSide::Exclude => push_unique(&mut filter.excluded_filter, case_tpl),
        }
    }
}

fn push_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.to_string());
    }
}
