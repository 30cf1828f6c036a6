//! Server-side logic of the Gilded Key Storage mod: golden key cases injected into the item
//! database, trader listings, key property tweaks, and the profile migration that keeps
//! players' cases valid across mod updates.

pub mod cases;
pub mod config;
pub mod core_api;
pub mod debug;
pub mod item_tweaks;
pub mod key_usage;
pub mod migration;
pub mod schema;
pub mod traders;
