use crate::schema::Item;

/// Independent copy of a profile's item list, held for the length of one migration.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySnapshot {
    items: Vec<Item>,
}

impl InventorySnapshot {
    pub fn take(items: &[Item]) -> Self {
        Self {
            items: items.to_vec(),
        }
    }

    /// Puts the captured list back, discarding whatever `items` holds now.
    pub fn restore(self, items: &mut Vec<Item>) {
        *items = self.items;
    }
}
