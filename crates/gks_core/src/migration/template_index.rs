use std::collections::BTreeMap;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::schema::{Database, ItemFilter, TemplateItem};

/// What a slot or grid will hold. Entries may name a template or any of its base classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    pub allowed: Vec<String>,
    pub excluded: Vec<String>,
}

impl AllowList {
    pub fn only<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            excluded: Vec::new(),
        }
    }

    fn from_filters(filters: &[ItemFilter]) -> Self {
        filters
            .first()
            .map(|filter| Self {
                allowed: filter.filter.clone(),
                excluded: filter.excluded_filter.clone(),
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSchema {
    pub name: String,
    pub filter: AllowList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSchema {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub filter: AllowList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerTemplate {
    Slots(Vec<SlotSchema>),
    Grids(Vec<GridSchema>),
}

impl ContainerTemplate {
    /// Slots win over grids; a template with neither is not a container.
    pub fn from_template_item(item: &TemplateItem) -> Option<Self> {
        if let Some(slots) = item.props.slots.as_ref().filter(|slots| !slots.is_empty()) {
            return Some(Self::Slots(
                slots
                    .iter()
                    .map(|slot| SlotSchema {
                        name: slot.name.clone(),
                        filter: AllowList::from_filters(&slot.props.filters),
                    })
                    .collect(),
            ));
        }

        let grids = item.props.grids.as_ref().filter(|grids| !grids.is_empty())?;
        Some(Self::Grids(
            grids
                .iter()
                .map(|grid| GridSchema {
                    name: grid.name.clone(),
                    width: grid.props.cells_h,
                    height: grid.props.cells_v,
                    filter: AllowList::from_filters(&grid.props.filters),
                })
                .collect(),
        ))
    }
}

/// Read-only container schemas keyed by canonical template id, plus the `_parent` links
/// needed to match base-class filter entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateIndex {
    templates: BTreeMap<String, ContainerTemplate>,
    parents: BTreeMap<String, String>,
}

impl TemplateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, template: ContainerTemplate) {
        self.templates.insert(id.into(), template);
    }

    pub fn set_parent(&mut self, tpl: impl Into<String>, parent: impl Into<String>) {
        self.parents.insert(tpl.into(), parent.into());
    }

    /// Indexes the given container templates out of a (patched) database.
    pub fn from_database<'a>(
        db: &Database,
        container_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CoreError> {
        let mut index = Self::new();
        for id in container_ids {
            let item = db.item(id).ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::UnknownTemplate,
                    format!("container template {id} is not in the item database"),
                )
            })?;
            let template = ContainerTemplate::from_template_item(item).ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::UnknownTemplate,
                    format!("template {id} has neither slots nor grids"),
                )
            })?;
            index.insert(id, template);
        }

        index.parents = db
            .templates
            .items
            .values()
            .filter(|item| !item.parent.is_empty())
            .map(|item| (item.id.clone(), item.parent.clone()))
            .collect();
        Ok(index)
    }

    pub fn template_for(&self, container_id: &str) -> Result<&ContainerTemplate, CoreError> {
        self.templates.get(container_id).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::UnknownTemplate,
                format!("no container template indexed for {container_id}"),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// `tpl` itself followed by its base classes, nearest first.
    fn lineage<'a>(&'a self, tpl: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let mut next = Some(tpl);
        let mut remaining = self.parents.len() + 1;
        std::iter::from_fn(move || {
            let current = next.take()?;
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            next = self.parents.get(current).map(String::as_str);
            Some(current)
        })
    }

    pub fn accepts(&self, filter: &AllowList, tpl: &str) -> bool {
        let mut allowed = false;
        for class in self.lineage(tpl) {
            if filter.excluded.iter().any(|id| id == class) {
                return false;
            }
            allowed |= filter.allowed.iter().any(|id| id == class);
        }
        allowed
    }
}
