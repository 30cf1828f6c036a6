use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::core_api::well_known_ids::LEGACY_CASE_IDS;
use crate::schema::Item;

/// Legacy template identifier -> canonical identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    entries: BTreeMap<String, String>,
}

static BUILTIN: OnceLock<RemapTable> = OnceLock::new();

impl RemapTable {
    /// The table of every case id the mod has shipped under before the MongoID switch.
    pub fn builtin() -> &'static RemapTable {
        BUILTIN.get_or_init(|| Self::from_pairs(LEGACY_CASE_IDS.iter().copied()))
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(old, new)| (old.to_string(), new.to_string()))
                .collect(),
        }
    }

    pub fn remap<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn is_legacy(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Rewrites every legacy `_tpl` in place; returns how many records changed.
    pub fn apply(&self, items: &mut [Item]) -> usize {
        let mut changed = 0;
        for item in items.iter_mut() {
            if let Some(canonical) = self.entries.get(&item.tpl) {
                item.tpl = canonical.clone();
                changed += 1;
            }
        }
        changed
    }

    pub fn remap_all(&self, ids: &[String]) -> Vec<String> {
        ids.iter().map(|id| self.remap(id).to_string()).collect()
    }
}
