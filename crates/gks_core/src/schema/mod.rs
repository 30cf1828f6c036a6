//! Serde models of the host server's JSON tables. Fields the mod never touches are kept in
//! `extra` maps so documents survive a load/patch/save cycle unchanged.

mod database;
mod profile;

pub use database::{
    BarterCost, Database, Globals, GlobalsConfig, Grid, GridProps, Handbook, HandbookItem,
    ItemFilter, ItemProps, Locales, Prefab, RaidRestriction, Slot, SlotProps, TemplateItem,
    Templates, Trader, TraderAssort,
};
pub use profile::{
    Characters, GridLocation, Inventory, Item, ItemLocation, KeyUpd, PmcCharacter, Profile,
    Rotation, Upd,
};
