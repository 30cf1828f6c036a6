use crate::config::{NamedBarter, TraderOffer};
use crate::core_api::well_known_ids::trader_id;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::schema::{Database, Item, Upd};

const ASSORT_ROOT: &str = "hideout";

/// Lists `item_id` in the offer's trader assortment with its barter cost and loyalty level.
/// Re-running replaces the previous listing instead of adding a second one.
pub fn push_to_trader(
    db: &mut Database,
    offer: &TraderOffer,
    item_id: &str,
) -> Result<(), CoreError> {
    let trader_key = trader_id(&offer.trader);
    let trader = db.traders.get_mut(trader_key).ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::UnknownTrader,
            format!("trader {:?} ({trader_key}) is not in the database", offer.trader),
        )
    })?;
    let assort = trader.assort.get_or_insert_with(Default::default);

    let mut listing = Item::new(item_id, item_id);
    listing.parent_id = Some(ASSORT_ROOT.to_string());
    listing.slot_id = Some(ASSORT_ROOT.to_string());
    listing.upd = Some(Upd {
        unlimited_count: Some(offer.unlimited_stock),
        stack_objects_count: Some(offer.stock_amount),
        ..Upd::default()
    });
    assort.items.retain(|existing| existing.id != item_id);
    assort.items.push(listing);

    assort
        .barter_scheme
        .insert(item_id.to_string(), vec![offer.barter.clone()]);
    assort
        .loyal_level_items
        .insert(item_id.to_string(), offer.trader_loyalty_level);
    Ok(())
}

pub fn push_supportive_barters(
    db: &mut Database,
    barters: &[NamedBarter],
) -> Result<usize, CoreError> {
    for (name, barter) in barters {
        push_to_trader(db, &barter.offer, &barter.id)?;
        tracing::debug!("added barter {name} for {}", barter.id);
    }
    Ok(barters.len())
}
