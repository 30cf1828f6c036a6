mod common;

use common::*;
use gks_core::debug::{self, DEBUG_ID_SUFFIX, MissingKey};
use gks_core::key_usage::KeyUse;
use gks_core::migration::RemapTable;
use gks_core::schema::{Item, KeyUpd, Profile, Upd};

fn debug_items(profile: &Profile) -> Vec<&Item> {
    items(profile)
        .iter()
        .filter(|item| item.id.ends_with(DEBUG_ID_SUFFIX))
        .collect()
}

#[test]
fn missing_keys_lists_only_uncovered_regular_keys() {
    let (storage, db) = loaded_with("{}");
    assert_eq!(
        storage.missing_keys(&db),
        vec![MissingKey {
            id: UNLISTED_KEY.to_string(),
            name: Some("Unlisted key".to_string()),
        }]
    );
}

#[test]
fn debug_templates_are_keys_then_cases_without_repeats() {
    let storage = storage_with("{}");
    let templates = debug::debug_item_templates(storage.cases(), RemapTable::builtin());

    assert_eq!(templates.len(), 15);
    assert_eq!(templates[0], LABS_CARD);
    assert_eq!(templates[1], RED_CARD);
    assert_eq!(&templates[10..], ALL_CASES);
}

#[test]
fn give_all_places_items_in_rows_of_ten_and_is_repeatable() {
    let storage = storage_with("{}");
    let mut profile = profile();

    let given =
        debug::give_all_keys_and_cases(&mut profile, storage.cases(), RemapTable::builtin());
    assert_eq!(given, Some(15));

    let added = debug_items(&profile);
    assert_eq!(added.len(), 15);
    assert!(added.iter().all(|item| item.parent_id.as_deref() == Some("stash")));
    assert!(added.iter().all(|item| item.slot_id.as_deref() == Some("hideout")));
    assert_eq!(cell(added[0]), (1, 0));
    assert_eq!(cell(added[8]), (9, 0));
    assert_eq!(cell(added[9]), (0, 1));
    assert_eq!(cell(added[14]), (5, 1));
    assert_eq!(added[0].grid_location().and_then(|location| location.is_searched), Some(true));
    assert_eq!(added[0].id, format!("{LABS_CARD}{DEBUG_ID_SUFFIX}"));

    let encyclopedia = profile
        .characters
        .pmc
        .as_ref()
        .and_then(|pmc| pmc.encyclopedia.as_ref())
        .expect("encyclopedia");
    assert_eq!(encyclopedia.get(POUCH), Some(&serde_json::Value::Bool(true)));
    assert_eq!(encyclopedia.len(), 15);

    let again =
        debug::give_all_keys_and_cases(&mut profile, storage.cases(), RemapTable::builtin());
    assert_eq!(again, Some(0));
    assert_eq!(debug_items(&profile).len(), 15);

    assert_eq!(debug::remove_debug_items(&mut profile), 15);
    assert!(debug_items(&profile).is_empty());
}

#[test]
fn give_all_needs_a_stash() {
    let storage = storage_with("{}");
    let mut fresh = Profile::default();
    assert_eq!(
        debug::give_all_keys_and_cases(&mut fresh, storage.cases(), RemapTable::builtin()),
        None
    );
    assert_eq!(debug::remove_debug_items(&mut fresh), 0);
}

#[test]
fn debug_flags_drive_game_start_and_logout() {
    let (storage, _db) = loaded_with(r#"{ "debug": { "give_profile_all_keys": true } }"#);
    let mut profile = profile();

    assert!(storage.game_start(&mut profile).is_committed());
    assert_eq!(debug_items(&profile).len(), 15);

    assert_eq!(storage.logout(&mut profile), 15);
    assert!(debug_items(&profile).is_empty());
}

#[test]
fn forced_cleanup_runs_at_start_instead_of_logout() {
    let (storage, _db) =
        loaded_with(r#"{ "debug": { "force_remove_debug_items_on_start": true } }"#);
    let mut profile = profile();
    let seeder = storage_with("{}");
    debug::give_all_keys_and_cases(&mut profile, seeder.cases(), RemapTable::builtin());

    storage.game_start(&mut profile);
    assert!(debug_items(&profile).is_empty());
    assert_eq!(storage.logout(&mut profile), 0);
}

#[test]
fn entry_key_without_use_limit_is_kept() {
    let (storage, db) = loaded_with("{}");
    let mut profile = profile();
    let before = profile.clone();

    assert_eq!(
        storage.use_entry_key(&mut profile, &db, "shore_key"),
        KeyUse::Unlimited
    );
    assert_eq!(profile, before);
}

#[test]
fn entry_key_with_use_limit_counts_down_then_disappears() {
    let (storage, db) = loaded_with(r#"{ "no_key_use_limit": false }"#);
    let mut profile = profile();

    assert_eq!(
        storage.use_entry_key(&mut profile, &db, "shore_key"),
        KeyUse::Used {
            usages: 4,
            maximum: 40
        }
    );
    let key = item(&profile, "shore_key");
    let upd = key.upd.as_ref().expect("upd");
    assert_eq!(upd.key, Some(KeyUpd { number_of_usages: 4 }));
    assert_eq!(upd.extra.get("SpawnedInSession"), Some(&serde_json::json!(false)));

    let pmc = profile.characters.pmc.as_mut().expect("pmc");
    let inventory = pmc.inventory.as_mut().expect("inventory");
    let key = inventory
        .items
        .iter_mut()
        .find(|item| item.id == "shore_key")
        .expect("key");
    key.upd = Some(Upd {
        key: Some(KeyUpd {
            number_of_usages: 39,
        }),
        ..Upd::default()
    });

    assert_eq!(
        storage.use_entry_key(&mut profile, &db, "shore_key"),
        KeyUse::Discarded { removed: 1 }
    );
    assert!(items(&profile).iter().all(|item| item.id != "shore_key"));
}

#[test]
fn stashed_keys_cannot_be_used_to_enter() {
    let (storage, db) = loaded_with("{}");
    let mut profile = profile();
    assert_eq!(
        storage.use_entry_key(&mut profile, &db, "factory_key"),
        KeyUse::NotFound
    );
    assert_eq!(storage.use_entry_key(&mut profile, &db, ""), KeyUse::NoKey);
    assert_eq!(
        storage.use_entry_key(&mut Profile::default(), &db, "shore_key"),
        KeyUse::NotFound
    );
}
