mod engine;
mod error;
pub mod well_known_ids;

pub use engine::{GildedKeyStorage, PatchReport};
pub use error::{CoreError, CoreErrorCode};
