#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use gks_core::config::{self, DEFAULT_BARTERS_JSON, DEFAULT_CASES_JSON, DEFAULT_CONFIG_JSON};
use gks_core::config::ModConfig;
use gks_core::core_api::GildedKeyStorage;
use gks_core::schema::{Database, Item, Profile};

pub const POUCH: &str = "661cb36922c9e10dc2d9514b";
pub const KEYCARD_CASE: &str = "661cb36f5441dc730e28bcb0";
pub const KEYCHAIN_1: &str = "661cb372e5eb56290da76c3e";
pub const KEYCHAIN_2: &str = "661cb3743bf00d3d145518b3";
pub const KEYCHAIN_3: &str = "661cb376b16226f648eb0cdc";
pub const ALL_CASES: [&str; 5] = [POUCH, KEYCARD_CASE, KEYCHAIN_1, KEYCHAIN_2, KEYCHAIN_3];

pub const FACTORY_KEY: &str = "5448ba0b4bdc2d02308b456c";
pub const MARKED_KEY: &str = "5780cf7f2459777de4559322";
pub const SHORELINE_KEY: &str = "5937ee6486f77408994ba448";
pub const UNLISTED_KEY: &str = "63a39e1d234195315d4020bd";
pub const LABS_CARD: &str = "5c94bbff86f7747ee735c08f";
pub const RED_CARD: &str = "5c1d0efb86f7744baf2e7b7b";

pub const SECURE_ALPHA: &str = "544a11ac4bdc2d470e8b456a";
pub const SECURE_BOSS: &str = "5c0a794586f77461c458f892";
pub const SPECIAL_POCKETS: &str = "627a4e6b255f7527fb05a0f6";
pub const BACKPACK: &str = "5ab8ebf186f7742d8b372e80";
pub const RIG: &str = "5e4abfed86f77406a2713cf7";

pub const MECHANIC: &str = "5a7c2eca46aef81a7ca2145d";
pub const THERAPIST: &str = "54cb57776803fa99248b456e";

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

pub fn fixture_path(name: &str) -> PathBuf {
    workspace_root().join("tests/fixtures").join(name)
}

fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

pub fn database() -> Database {
    serde_json::from_str(&read_fixture("database.json")).expect("database fixture should parse")
}

pub fn profile() -> Profile {
    serde_json::from_str(&read_fixture("profile.json")).expect("profile fixture should parse")
}

/// Bundled cases and barters with `user_config` laid over the default toggles.
pub fn storage_with(user_config: &str) -> GildedKeyStorage {
    let config =
        ModConfig::from_layers(DEFAULT_CONFIG_JSON, user_config).expect("config should parse");
    GildedKeyStorage::new(
        config,
        config::parse_cases(DEFAULT_CASES_JSON).expect("bundled cases should parse"),
        config::parse_barters(DEFAULT_BARTERS_JSON).expect("bundled barters should parse"),
    )
}

/// A storage whose `post_db_load` has run against the fixture database.
pub fn loaded_with(user_config: &str) -> (GildedKeyStorage, Database) {
    let mut storage = storage_with(user_config);
    let mut db = database();
    storage
        .post_db_load(&mut db)
        .expect("fixture database should patch");
    (storage, db)
}

pub fn items(profile: &Profile) -> &[Item] {
    &profile
        .characters
        .pmc
        .as_ref()
        .and_then(|pmc| pmc.inventory.as_ref())
        .expect("profile should have an inventory")
        .items
}

pub fn item<'a>(profile: &'a Profile, id: &str) -> &'a Item {
    items(profile)
        .iter()
        .find(|item| item.id == id)
        .unwrap_or_else(|| panic!("item {id} should be in the inventory"))
}

pub fn cell(item: &Item) -> (u32, u32) {
    let location = item.grid_location().expect("item should have a grid location");
    (location.x, location.y)
}
