//! Mod configuration: user toggles plus the case and barter definitions.
//!
//! The toggles live in two JSON files next to each other: `config.default.json`, shipped
//! with the mod, and `config.json`, owned by the user. A missing user file is seeded from
//! the default one. The effective config is the default object with the user's top-level
//! keys laid over it, so new toggles keep their default value for old user files.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::schema::BarterCost;

pub const DEFAULT_CONFIG_JSON: &str = include_str!("../config/config.default.json");
pub const DEFAULT_CASES_JSON: &str = include_str!("../config/cases.json");
pub const DEFAULT_BARTERS_JSON: &str = include_str!("../config/barters.json");

pub const DEFAULT_CONFIG_FILE: &str = "config.default.json";
pub const USER_CONFIG_FILE: &str = "config.json";
pub const CASES_FILE: &str = "cases.json";
pub const BARTERS_FILE: &str = "barters.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModConfig {
    pub weightless_keys: bool,
    pub key_insurance_enabled: bool,
    pub no_key_use_limit: bool,
    pub use_finite_keys_list: bool,
    pub finite_keys_list: Vec<String>,
    pub keys_are_discardable: bool,
    pub all_keys_in_secure: bool,
    pub cases_flea_banned: bool,
    pub cases_insurance_enabled: bool,
    pub allow_in_backpacks: bool,
    pub allow_in_secure_containers: bool,
    pub allow_cases_in_special: bool,
    pub case_allowed_in: Vec<String>,
    pub case_disallowed_in: Vec<String>,
    pub debug: DebugConfig,
}

impl Default for ModConfig {
    fn default() -> Self {
        Self {
            weightless_keys: true,
            key_insurance_enabled: false,
            no_key_use_limit: true,
            use_finite_keys_list: false,
            finite_keys_list: Vec::new(),
            keys_are_discardable: true,
            all_keys_in_secure: false,
            cases_flea_banned: true,
            cases_insurance_enabled: true,
            allow_in_backpacks: true,
            allow_in_secure_containers: true,
            allow_cases_in_special: true,
            case_allowed_in: Vec::new(),
            case_disallowed_in: Vec::new(),
            debug: DebugConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_missing_keys: bool,
    pub give_profile_all_keys: bool,
    pub force_remove_debug_items_on_start: bool,
}

impl ModConfig {
    /// Loads `config.default.json` + `config.json` from `dir`, seeding the user file first
    /// when it does not exist yet.
    pub fn load(dir: &Path) -> Result<Self, CoreError> {
        let default_path = dir.join(DEFAULT_CONFIG_FILE);
        let user_path = dir.join(USER_CONFIG_FILE);

        if !user_path.exists() {
            fs::copy(&default_path, &user_path).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!(
                        "failed to seed {} from {}: {e}",
                        user_path.display(),
                        default_path.display()
                    ),
                )
            })?;
            tracing::info!("created {} from defaults", user_path.display());
        }

        let defaults = read_text(&default_path)?;
        let user = read_text(&user_path)?;
        Self::from_layers(&defaults, &user)
    }

    /// Shallow merge: every top-level key of `user` replaces the one in `defaults`.
    pub fn from_layers(defaults: &str, user: &str) -> Result<Self, CoreError> {
        let mut merged = parse_object(defaults, "default config")?;
        merged.extend(parse_object(user, "user config")?);
        serde_json::from_value(Value::Object(merged)).map_err(|e| {
            CoreError::new(CoreErrorCode::InvalidConfig, format!("invalid config: {e}"))
        })
    }

    /// Whether a key keeps its use limit despite `no_key_use_limit`.
    pub fn is_finite_key(&self, tpl: &str) -> bool {
        self.use_finite_keys_list && self.finite_keys_list.iter().any(|id| id == tpl)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CaseKind {
    /// Grid case cloned from the SICC case.
    #[serde(rename = "container")]
    Grid,
    /// Discrete-slot case cloned from a rail mount, one key per slot.
    #[serde(rename = "slots")]
    Slots,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseConfig {
    /// Legacy identifier; also the bundle file name.
    pub id: String,
    pub case_type: CaseKind,
    pub item_name: String,
    pub item_short_name: String,
    pub item_description: String,
    #[serde(rename = "ExternalSize")]
    pub external_size: ExternalSize,
    #[serde(rename = "Grids", default)]
    pub grids: Vec<GridConfig>,
    #[serde(default)]
    pub slot_ids: Vec<String>,
    #[serde(default)]
    pub sound: Option<String>,
    pub flea_price: f64,
    #[serde(flatten)]
    pub offer: TraderOffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExternalSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub included_filter: Vec<String>,
    #[serde(default)]
    pub excluded_filter: Vec<String>,
}

/// How an item is sold: which trader, stock, loyalty level and barter cost.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraderOffer {
    pub trader: String,
    #[serde(default)]
    pub unlimited_stock: bool,
    #[serde(default)]
    pub stock_amount: u64,
    #[serde(default)]
    pub barter: Vec<BarterCost>,
    #[serde(default = "default_loyalty_level")]
    pub trader_loyalty_level: u32,
}

fn default_loyalty_level() -> u32 {
    1
}

/// A supportive barter for an existing item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BarterConfig {
    pub id: String,
    #[serde(flatten)]
    pub offer: TraderOffer,
}

pub type NamedCase = (String, CaseConfig);
pub type NamedBarter = (String, BarterConfig);

pub fn parse_cases(json: &str) -> Result<Vec<NamedCase>, CoreError> {
    let cases: Vec<NamedCase> = parse_ordered(json, "cases")?;
    for (name, case) in &cases {
        validate_case(name, case)?;
    }
    Ok(cases)
}

pub fn parse_barters(json: &str) -> Result<Vec<NamedBarter>, CoreError> {
    parse_ordered(json, "barters")
}

pub fn load_cases(dir: &Path) -> Result<Vec<NamedCase>, CoreError> {
    parse_cases(&read_text(&dir.join(CASES_FILE))?)
}

pub fn load_barters(dir: &Path) -> Result<Vec<NamedBarter>, CoreError> {
    parse_barters(&read_text(&dir.join(BARTERS_FILE))?)
}

fn validate_case(name: &str, case: &CaseConfig) -> Result<(), CoreError> {
    let empty = match case.case_type {
        CaseKind::Grid => case.grids.is_empty(),
        CaseKind::Slots => case.slot_ids.is_empty(),
    };
    if empty {
        return Err(CoreError::new(
            CoreErrorCode::InvalidConfig,
            format!("case {name:?} declares no grids or slots"),
        ));
    }
    if case
        .grids
        .iter()
        .any(|grid| grid.width == 0 || grid.height == 0)
    {
        return Err(CoreError::new(
            CoreErrorCode::InvalidConfig,
            format!("case {name:?} has a grid with a zero dimension"),
        ));
    }
    Ok(())
}

// Object key order is the declared order; serde_json is built with `preserve_order`.
fn parse_ordered<T: DeserializeOwned>(
    json: &str,
    what: &str,
) -> Result<Vec<(String, T)>, CoreError> {
    parse_object(json, what)?
        .into_iter()
        .map(|(name, value)| {
            serde_json::from_value(value)
                .map(|parsed| (name.clone(), parsed))
                .map_err(|e| {
                    CoreError::new(
                        CoreErrorCode::InvalidConfig,
                        format!("invalid {what} entry {name:?}: {e}"),
                    )
                })
        })
        .collect()
}

fn parse_object(json: &str, what: &str) -> Result<Map<String, Value>, CoreError> {
    match serde_json::from_str(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CoreError::new(
            CoreErrorCode::InvalidConfig,
            format!("{what} must be a JSON object"),
        )),
        Err(e) => Err(CoreError::new(
            CoreErrorCode::Parse,
            format!("failed to parse {what}: {e}"),
        )),
    }
}

fn read_text(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to read {}: {e}", path.display()),
        )
    })
}
