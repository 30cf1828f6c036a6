use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A full player profile as persisted by the host. Only the PMC inventory is modeled;
/// everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub characters: Characters,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Characters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmc: Option<PmcCharacter>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PmcCharacter {
    #[serde(rename = "Inventory", default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,
    #[serde(
        rename = "Encyclopedia",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub encyclopedia: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Inventory {
    /// Direct children of `parent_id`, in list order.
    pub fn children_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.parent_id.as_deref() == Some(parent_id))
    }

    /// Ids of `root_id` and everything nested below it, root first.
    pub fn descendant_ids(&self, root_id: &str) -> Vec<String> {
        let mut out = vec![root_id.to_string()];
        let mut cursor = 0;
        while cursor < out.len() {
            let parent = out[cursor].clone();
            out.extend(self.children_of(&parent).map(|child| child.id.clone()));
            cursor += 1;
        }
        out
    }
}

/// One record of the flat item list. Shared by profiles and trader assortments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_tpl")]
    pub tpl: String,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "slotId", default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ItemLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upd: Option<Upd>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn new(id: impl Into<String>, tpl: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tpl: tpl.into(),
            parent_id: None,
            slot_id: None,
            location: None,
            upd: None,
            extra: Map::new(),
        }
    }

    pub fn grid_location(&self) -> Option<&GridLocation> {
        match &self.location {
            Some(ItemLocation::Grid(location)) => Some(location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemLocation {
    Grid(GridLocation),
    /// Cartridge position inside a magazine.
    Index(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLocation {
    pub x: u32,
    pub y: u32,
    pub r: Rotation,
    #[serde(rename = "isSearched", default, skip_serializing_if = "Option::is_none")]
    pub is_searched: Option<bool>,
}

impl GridLocation {
    pub fn at(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            r: Rotation::Horizontal,
            is_searched: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Rotation {
    #[default]
    Horizontal,
    Vertical,
}

impl<'de> Deserialize<'de> for Rotation {
    // Older profiles store the rotation as 0/1.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Index(u8),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) if name == "Horizontal" => Ok(Rotation::Horizontal),
            Raw::Name(name) if name == "Vertical" => Ok(Rotation::Vertical),
            Raw::Index(0) => Ok(Rotation::Horizontal),
            Raw::Index(1) => Ok(Rotation::Vertical),
            Raw::Name(other) => Err(serde::de::Error::custom(format!(
                "unknown rotation {other:?}"
            ))),
            Raw::Index(other) => Err(serde::de::Error::custom(format!(
                "unknown rotation index {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upd {
    #[serde(rename = "Key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyUpd>,
    #[serde(
        rename = "UnlimitedCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unlimited_count: Option<bool>,
    #[serde(
        rename = "StackObjectsCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stack_objects_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyUpd {
    #[serde(rename = "NumberOfUsages", default)]
    pub number_of_usages: u32,
}
