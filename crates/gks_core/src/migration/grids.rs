use std::collections::BTreeSet;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::schema::{GridLocation, Item, ItemLocation};

use super::template_index::{GridSchema, TemplateIndex};

/// Back-fills a cell for every child of `container_id` that has no `location`.
///
/// Each such child goes to the first grid whose filter accepts it, at the first cell in
/// row-major order that no sibling occupies. Every item counts as 1x1 and occupancy is the
/// bare (x, y) pair across the whole container. Children that already have a location are
/// never moved. Returns the number of children placed.
pub fn reconcile_grids(
    items: &mut [Item],
    container_id: &str,
    grids: &[GridSchema],
    index: &TemplateIndex,
) -> Result<usize, CoreError> {
    let children: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.parent_id.as_deref() == Some(container_id))
        .map(|(position, _)| position)
        .collect();

    let mut occupied: BTreeSet<(u32, u32)> = children
        .iter()
        .filter_map(|&child| items[child].grid_location())
        .map(|location| (location.x, location.y))
        .collect();
    let mut placed = 0;

    for &child in &children {
        if items[child].location.is_some() {
            continue;
        }
        let tpl = items[child].tpl.clone();

        let grid = grids
            .iter()
            .find(|grid| index.accepts(&grid.filter, &tpl))
            .ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::IncompatibleChild,
                    format!("no grid in {container_id} accepts {tpl}"),
                )
            })?;

        let (x, y) = first_free_cell(grid, &occupied).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::CapacityExhausted,
                format!("no free cell for {tpl} in {container_id}/{}", grid.name),
            )
        })?;

        tracing::debug!(
            "placing {} in {container_id} from {} to {} X: {x} Y: {y}",
            items[child].id,
            items[child].slot_id.as_deref().unwrap_or("<none>"),
            grid.name
        );
        occupied.insert((x, y));
        items[child].location = Some(ItemLocation::Grid(GridLocation::at(x, y)));
        items[child].slot_id = Some(grid.name.clone());
        placed += 1;
    }

    Ok(placed)
}

fn first_free_cell(grid: &GridSchema, occupied: &BTreeSet<(u32, u32)>) -> Option<(u32, u32)> {
    (0..grid.height)
        .flat_map(|y| (0..grid.width).map(move |x| (x, y)))
        .find(|cell| !occupied.contains(cell))
}
