use std::collections::{BTreeMap, BTreeSet};

use crate::core_api::well_known_ids::item_tpl::KEYCARD_TERRAGROUP_LABS_ACCESS;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::schema::Item;

use super::template_index::{SlotSchema, TemplateIndex};

/// A release once stacked several Labs keycards into one slot. When one of them has to move
/// it must not land in a slot another keycard of the same template started out in.
const UNSTACK_TEMPLATE: &str = KEYCARD_TERRAGROUP_LABS_ACCESS;

/// Gives every child of `container_id` its own slot whose filter accepts it.
///
/// A slot is kept by the first child, in list order, that sits in it with a template the slot
/// accepts. Every other child moves to the first accepting slot that no keeper holds and no
/// earlier move has taken. Returns the number of children moved.
pub fn reconcile_slots(
    items: &mut [Item],
    container_id: &str,
    slots: &[SlotSchema],
    index: &TemplateIndex,
) -> Result<usize, CoreError> {
    let children: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.parent_id.as_deref() == Some(container_id))
        .map(|(position, _)| position)
        .collect();

    // Slot name to the first child sitting there with a template the slot accepts.
    let mut keepers: BTreeMap<String, usize> = BTreeMap::new();
    for &child in &children {
        let Some(name) = &items[child].slot_id else {
            continue;
        };
        let accepted = slots
            .iter()
            .any(|slot| slot.name == *name && index.accepts(&slot.filter, &items[child].tpl));
        if accepted && !keepers.contains_key(name) {
            keepers.insert(name.clone(), child);
        }
    }
    let unstack_origins: BTreeSet<String> = children
        .iter()
        .filter(|&&child| items[child].tpl == UNSTACK_TEMPLATE)
        .filter_map(|&child| items[child].slot_id.clone())
        .collect();
    let mut placed: BTreeSet<String> = BTreeSet::new();
    let mut moved = 0;

    for &child in &children {
        let tpl = items[child].tpl.clone();
        let current = items[child].slot_id.clone();

        if let Some(name) = &current {
            if keepers.get(name) == Some(&child) {
                placed.insert(name.clone());
                continue;
            }
        }

        let is_free = |slot: &SlotSchema| {
            !placed.contains(&slot.name)
                && !keepers.contains_key(&slot.name)
                && !(tpl == UNSTACK_TEMPLATE && unstack_origins.contains(&slot.name))
        };
        let Some(target) = slots
            .iter()
            .find(|slot| index.accepts(&slot.filter, &tpl) && is_free(slot))
        else {
            return Err(no_slot_error(container_id, &tpl, slots, index));
        };

        placed.insert(target.name.clone());
        if current.as_deref() != Some(target.name.as_str()) {
            tracing::debug!(
                "moving {} in {container_id} from {} to {}",
                items[child].id,
                current.as_deref().unwrap_or("<none>"),
                target.name
            );
            items[child].slot_id = Some(target.name.clone());
            moved += 1;
        }
    }

    Ok(moved)
}

fn no_slot_error(
    container_id: &str,
    tpl: &str,
    slots: &[SlotSchema],
    index: &TemplateIndex,
) -> CoreError {
    if slots.iter().any(|slot| index.accepts(&slot.filter, tpl)) {
        CoreError::new(
            CoreErrorCode::CapacityExhausted,
            format!("no free slot for {tpl} in {container_id}"),
        )
    } else {
        CoreError::new(
            CoreErrorCode::IncompatibleChild,
            format!("no slot in {container_id} accepts {tpl}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::reconcile_slots;
    use crate::core_api::CoreErrorCode;
    use crate::core_api::well_known_ids::item_tpl::KEYCARD_TERRAGROUP_LABS_ACCESS as LABS;
    use crate::migration::template_index::{AllowList, SlotSchema, TemplateIndex};
    use crate::schema::Item;

    fn slot(name: &str, tpl: &str) -> SlotSchema {
        SlotSchema {
            name: name.to_string(),
            filter: AllowList::only([tpl]),
        }
    }

    fn child(id: &str, tpl: &str, slot_id: &str) -> Item {
        let mut item = Item::new(id, tpl);
        item.parent_id = Some("case".to_string());
        item.slot_id = Some(slot_id.to_string());
        item
    }

    fn slot_of<'a>(items: &'a [Item], id: &str) -> &'a str {
        items
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.slot_id.as_deref())
            .expect("child should have a slot")
    }

    #[test]
    fn valid_layout_is_left_alone() {
        let slots = vec![slot("mod_mount_0", "a"), slot("mod_mount_1", "b")];
        let mut items = vec![child("1", "a", "mod_mount_0"), child("2", "b", "mod_mount_1")];
        let before = items.clone();

        let moved = reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect("layout is valid");
        assert_eq!(moved, 0);
        assert_eq!(items, before);
    }

    #[test]
    fn key_in_a_reordered_slot_follows_its_filter() {
        // An update swapped the slot order of the two keys.
        let slots = vec![slot("mod_mount_0", "b"), slot("mod_mount_1", "a")];
        let mut items = vec![child("1", "a", "mod_mount_0"), child("2", "b", "mod_mount_1")];

        let moved = reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect("both keys fit");
        assert_eq!(moved, 2);
        assert_eq!(slot_of(&items, "1"), "mod_mount_1");
        assert_eq!(slot_of(&items, "2"), "mod_mount_0");
    }

    #[test]
    fn rotated_keys_each_move_to_their_own_slot() {
        let slots = vec![
            slot("mod_mount_0", "a"),
            slot("mod_mount_1", "b"),
            slot("mod_mount_2", "c"),
        ];
        let mut items = vec![
            child("1", "a", "mod_mount_1"),
            child("2", "b", "mod_mount_2"),
            child("3", "c", "mod_mount_0"),
        ];

        let moved = reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect("every key has a slot");
        assert_eq!(moved, 3);
        assert_eq!(slot_of(&items, "1"), "mod_mount_0");
        assert_eq!(slot_of(&items, "2"), "mod_mount_1");
        assert_eq!(slot_of(&items, "3"), "mod_mount_2");
    }

    #[test]
    fn second_of_two_stacked_children_moves_to_next_free_slot() {
        let slots = vec![
            slot("mod_mount_0", "a"),
            slot("mod_mount_1", "b"),
            slot("mod_mount_2", "a"),
        ];
        let mut items = vec![child("1", "a", "mod_mount_0"), child("2", "a", "mod_mount_0")];

        let moved = reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect("a second slot accepts the template");
        assert_eq!(moved, 1);
        assert_eq!(slot_of(&items, "1"), "mod_mount_0");
        assert_eq!(slot_of(&items, "2"), "mod_mount_2");
    }

    #[test]
    fn stacked_children_without_spare_slot_fail_naming_template() {
        let slots = vec![
            slot("mod_mount_0", "a"),
            slot("mod_mount_1", "b"),
            slot("mod_mount_2", "c"),
        ];
        let mut items = vec![child("1", "a", "mod_mount_0"), child("2", "a", "mod_mount_0")];

        let err = reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect_err("only one slot takes template a");
        assert_eq!(err.code, CoreErrorCode::CapacityExhausted);
        assert!(err.message.contains(" a "), "{}", err.message);
    }

    #[test]
    fn child_no_slot_accepts_is_incompatible() {
        let slots = vec![slot("mod_mount_0", "a")];
        let mut items = vec![child("1", "z", "mod_mount_0")];

        let err = reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect_err("z fits nowhere");
        assert_eq!(err.code, CoreErrorCode::IncompatibleChild);
        assert!(err.message.contains('z'));
    }

    #[test]
    fn moving_child_does_not_take_a_slot_a_later_sibling_holds() {
        let slots = vec![
            slot("mod_mount_0", "a"),
            slot("mod_mount_1", "a"),
            slot("mod_mount_2", "a"),
        ];
        let mut items = vec![
            child("1", "a", "mod_mount_0"),
            child("2", "a", "mod_mount_0"),
            child("3", "a", "mod_mount_1"),
        ];

        reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect("three slots for three children");
        assert_eq!(slot_of(&items, "2"), "mod_mount_2");
        assert_eq!(slot_of(&items, "3"), "mod_mount_1");
    }

    #[test]
    fn stacked_labs_keycards_are_spread_over_free_slots() {
        let slots = vec![
            slot("mod_mount_0", LABS),
            slot("mod_mount_1", LABS),
            slot("mod_mount_2", LABS),
            slot("mod_mount_3", "red"),
        ];
        let mut items = vec![
            child("1", LABS, "mod_mount_0"),
            child("2", LABS, "mod_mount_0"),
            child("3", LABS, "mod_mount_0"),
            child("4", "red", "mod_mount_3"),
        ];

        let moved = reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new())
            .expect("three labs slots for three keycards");
        assert_eq!(moved, 2);
        assert_eq!(slot_of(&items, "1"), "mod_mount_0");
        assert_eq!(slot_of(&items, "2"), "mod_mount_1");
        assert_eq!(slot_of(&items, "3"), "mod_mount_2");
        assert_eq!(slot_of(&items, "4"), "mod_mount_3");
    }

    #[test]
    fn other_containers_are_not_touched() {
        let slots = vec![slot("mod_mount_0", "a")];
        let mut stranger = child("9", "a", "mod_mount_0");
        stranger.parent_id = Some("other_case".to_string());
        let mut items = vec![child("1", "a", "mod_mount_0"), stranger.clone()];

        reconcile_slots(&mut items, "case", &slots, &TemplateIndex::new()).expect("valid");
        assert_eq!(items[1], stranger);
    }
}
