use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::profile::Item;

/// The slice of the host's database tables the mod reads or patches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub templates: Templates,
    #[serde(default)]
    pub traders: BTreeMap<String, Trader>,
    #[serde(default)]
    pub locales: Locales,
    #[serde(default)]
    pub globals: Globals,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Database {
    pub fn item(&self, tpl: &str) -> Option<&TemplateItem> {
        self.templates.items.get(tpl)
    }

    /// True when `tpl` is `base` or has it somewhere up its `_parent` chain.
    pub fn is_of_base_class(&self, tpl: &str, base: &str) -> bool {
        let mut current = tpl;
        // The chain is a tree rooted at an empty parent; the bound guards against cycles.
        for _ in 0..=self.templates.items.len() {
            if current == base {
                return true;
            }
            match self.templates.items.get(current) {
                Some(item) if !item.parent.is_empty() => current = &item.parent,
                _ => return false,
            }
        }
        false
    }

    /// `Item`-typed template that also descends from `base`.
    pub fn is_item_of_base_class(&self, tpl: &str, base: &str) -> bool {
        self.item(tpl).is_some_and(TemplateItem::is_item) && self.is_of_base_class(tpl, base)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Templates {
    #[serde(default)]
    pub items: BTreeMap<String, TemplateItem>,
    #[serde(default)]
    pub handbook: Handbook,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Handbook {
    #[serde(rename = "Items", default)]
    pub items: Vec<HandbookItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HandbookItem {
    pub id: String,
    pub parent_id: String,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_name", default)]
    pub name: String,
    #[serde(rename = "_parent", default)]
    pub parent: String,
    /// `"Item"` or `"Node"`.
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(rename = "_props", default)]
    pub props: ItemProps,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateItem {
    pub fn is_item(&self) -> bool {
        self.kind == "Item"
    }

    pub fn grids_mut(&mut self) -> impl Iterator<Item = &mut Grid> {
        self.props.grids.iter_mut().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grids: Option<Vec<Grid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<Slot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefab: Option<Prefab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_always_available_for_insurance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_number_of_usage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_sell_on_ragfair: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_item: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_sound: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub rcid: String,
}

/// Allow-list plus exclusions, as stored in `filters[0]` of a grid or slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(rename = "Filter", default)]
    pub filter: Vec<String>,
    #[serde(rename = "ExcludedFilter", default)]
    pub excluded_filter: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemFilter {
    pub fn allowing(filter: Vec<String>, excluded_filter: Vec<String>) -> Self {
        Self {
            filter,
            excluded_filter,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(rename = "_name")]
    pub name: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_parent")]
    pub parent: String,
    #[serde(rename = "_props")]
    pub props: GridProps,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Grid {
    pub fn first_filter(&self) -> Option<&ItemFilter> {
        self.props.filters.first()
    }

    pub fn first_filter_mut(&mut self) -> Option<&mut ItemFilter> {
        self.props.filters.first_mut()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProps {
    #[serde(default)]
    pub filters: Vec<ItemFilter>,
    #[serde(rename = "cellsH", default)]
    pub cells_h: u32,
    #[serde(rename = "cellsV", default)]
    pub cells_v: u32,
    #[serde(default)]
    pub min_count: u32,
    #[serde(default)]
    pub max_count: u32,
    #[serde(default)]
    pub max_weight: f64,
    #[serde(default)]
    pub is_sorting_table: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(rename = "_name")]
    pub name: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_parent")]
    pub parent: String,
    #[serde(rename = "_props", default)]
    pub props: SlotProps,
    #[serde(rename = "_required", default)]
    pub required: bool,
    #[serde(rename = "_mergeSlotWithChildren", default)]
    pub merge_slot_with_children: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotProps {
    #[serde(default)]
    pub filters: Vec<ItemFilter>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assort: Option<TraderAssort>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraderAssort {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub barter_scheme: BTreeMap<String, Vec<Vec<BarterCost>>>,
    #[serde(default)]
    pub loyal_level_items: BTreeMap<String, u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarterCost {
    #[serde(rename = "_tpl")]
    pub tpl: String,
    pub count: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Locales {
    /// Language code -> locale key -> text.
    #[serde(default)]
    pub global: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Globals {
    #[serde(default)]
    pub config: GlobalsConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalsConfig {
    #[serde(
        rename = "RestrictionsInRaid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub restrictions_in_raid: Option<Vec<RaidRestriction>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaidRestriction {
    pub template_id: String,
    #[serde(default)]
    pub max_in_lobby: u32,
    #[serde(default)]
    pub max_in_raid: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Database;

    fn tiny_database() -> Database {
        serde_json::from_value(json!({
            "templates": { "items": {
                "root": { "_id": "root", "_name": "Item", "_parent": "", "_type": "Node" },
                "keys": { "_id": "keys", "_name": "Key", "_parent": "root", "_type": "Node" },
                "k1": { "_id": "k1", "_name": "key_1", "_parent": "keys", "_type": "Item",
                        "_props": { "Weight": 0.01, "MaximumNumberOfUsage": 10, "Unknown": [1] } }
            }}
        }))
        .expect("database should parse")
    }

    #[test]
    fn base_class_walks_parent_chain() {
        let db = tiny_database();
        assert!(db.is_of_base_class("k1", "keys"));
        assert!(db.is_of_base_class("k1", "root"));
        assert!(db.is_of_base_class("keys", "keys"));
        assert!(!db.is_of_base_class("keys", "k1"));
        assert!(!db.is_of_base_class("missing", "root"));
        assert!(db.is_item_of_base_class("k1", "keys"));
        assert!(!db.is_item_of_base_class("keys", "root"));
    }

    #[test]
    fn unknown_props_survive_round_trip() {
        let db = tiny_database();
        let written = serde_json::to_value(&db).expect("database should serialize");
        let props = &written["templates"]["items"]["k1"]["_props"];
        assert_eq!(props["Unknown"], json!([1]));
        assert_eq!(props["MaximumNumberOfUsage"], json!(10));
        assert!(props.get("Grids").is_none());
    }
}
