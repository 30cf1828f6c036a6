//! Template, base class and trader identifiers of the host item database that the mod
//! refers to by value. These are stable across client updates unless noted.

/// Base class identifiers (`_parent` chain targets).
pub mod base_class {
    pub const ITEM: &str = "54009119af1c881c07000029";
    pub const KEY: &str = "543be5e94bdc2df1348b4568";
    pub const BACKPACK: &str = "5448e53e4bdc2d60728b4567";
    pub const VEST: &str = "5448e5284bdc2dcb718b4567";
    pub const MOB_CONTAINER: &str = "5448bf274bdc2dfc2f8b456a";
}

/// Concrete item templates.
pub mod item_tpl {
    pub const KEYCARD_TERRAGROUP_LABS_ACCESS: &str = "5c94bbff86f7747ee735c08f";
    pub const CONTAINER_SICC: &str = "5d235bb686f77443f4331278";
    pub const MOUNT_STRIKE_INDUSTRIES_KEYMOD_4_INCH_RAIL: &str = "5a9d56c8a2750c0032157146";
    pub const SECURE_CONTAINER_BOSS: &str = "5c0a794586f77461c458f892";
    pub const POCKETS_1X4_SPECIAL: &str = "627a4e6b255f7527fb05a0f6";
    pub const POCKETS_1X4_TUE: &str = "65e080be269cbd5c5005e529";
}

pub const HANDBOOK_GEAR_CASES: &str = "5b5f6fa186f77409407a7eb7";

/// Labs keycards may be carried in bulk so the keycard case can be filled.
pub const LABS_CARD_RAID_LIMIT: u32 = 9;

// Nickname used in case/barter config -> trader id.
#[rustfmt::skip]
const TRADERS: &[(&str, &str)] = &[
    ("mechanic",    "5a7c2eca46aef81a7ca2145d"),
    ("skier",       "58330581ace78e27b8b10cee"),
    ("peacekeeper", "5935c25fb3acc3127c3d8cd9"),
    ("therapist",   "54cb57776803fa99248b456e"),
    ("prapor",      "54cb50c76803fa8b248b4571"),
    ("jaeger",      "5c0647fdd443bc2504c2d371"),
    ("ragman",      "5ac3b934156ae10c4430e83c"),
];

/// Resolves a trader nickname; anything else is assumed to already be a trader id.
pub fn trader_id(name: &str) -> &str {
    TRADERS
        .iter()
        .find(|(nickname, _)| *nickname == name)
        .map(|(_, id)| *id)
        .unwrap_or(name)
}

// Legacy case identifiers (pre-MongoID releases) and their canonical replacements.
#[rustfmt::skip]
pub(crate) const LEGACY_CASE_IDS: &[(&str, &str)] = &[
    ("Golden_Key_Pouch",    "661cb36922c9e10dc2d9514b"),
    ("Golden_Keycard_Case", "661cb36f5441dc730e28bcb0"),
    ("Golden_Keychain1",    "661cb372e5eb56290da76c3e"),
    ("Golden_Keychain2",    "661cb3743bf00d3d145518b3"),
    ("Golden_Keychain3",    "661cb376b16226f648eb0cdc"),
];

// Keys present in the database with no use or drop source. Recheck every client update.
#[rustfmt::skip]
pub const IGNORED_KEYS: &[&str] = &[
    "5671446a4bdc2d97058b4569",
    "57518f7724597720a31c09ab",
    "57518fd424597720c85dbaaa",
    "5751916f24597720a27126df",
    "5751961824597720a31c09ac",
    "590de4a286f77423d9312a32",
    "590de52486f774226a0c24c2",
    "61a6446f4b5f8b70f451b166",
    "63a39ddda3a2b32b5f6e007a",
    "63a39e0f64283b5e9c56b282",
    "63a39e5b234195315d4020bf",
    "63a39e6acd6db0635c1975fe",
    "63a71f1a0aa9fb29da61c537",
    "63a71f3b0aa9fb29da61c539",
    "658199a0490414548c0fa83b",
    "6582dc63cafcd9485374dbc5",
];
