use std::collections::{HashMap, HashSet};

use crate::geometry::Point;
use crate::ids::ItemId;
use crate::item::{InventoryItemRef, LayoutRecord, DEFAULT_X, DEFAULT_Y};

/// Merge the owned-item catalog with a previously saved layout.
///
/// Spatial state (`x`, `y`, `scale`, `container`) comes from `persisted`;
/// presentation metadata comes from `inventory`. Persisted records whose ids
/// are no longer owned pass through untouched. Owned items with no record get
/// a default warehouse record, appended in inventory order. Nothing is ever
/// removed.
pub fn reconcile(
    inventory: &[InventoryItemRef],
    persisted: Option<&[LayoutRecord]>,
) -> Vec<LayoutRecord> {
    reconcile_at(inventory, persisted, Point::new(DEFAULT_X, DEFAULT_Y))
}

/// [`reconcile`] with new records placed at `default_at`.
pub fn reconcile_at(
    inventory: &[InventoryItemRef],
    persisted: Option<&[LayoutRecord]>,
    default_at: Point,
) -> Vec<LayoutRecord> {
    let Some(persisted) = persisted else {
        return defaults_for(inventory, &HashSet::new(), default_at);
    };

    let by_id: HashMap<&ItemId, &InventoryItemRef> =
        inventory.iter().map(|item| (&item.id, item)).collect();

    let mut merged = Vec::with_capacity(persisted.len() + inventory.len());
    let mut present: HashSet<&ItemId> = HashSet::with_capacity(persisted.len());
    for record in persisted {
        if !present.insert(&record.id) {
            continue;
        }
        let mut record = record.clone();
        if let Some(item) = by_id.get(&record.id) {
            record.refresh_metadata(item);
        }
        merged.push(record);
    }

    merged.extend(defaults_for(inventory, &present, default_at));
    merged
}

fn defaults_for(
    inventory: &[InventoryItemRef],
    present: &HashSet<&ItemId>,
    default_at: Point,
) -> Vec<LayoutRecord> {
    let mut added: HashSet<&ItemId> = HashSet::new();
    inventory
        .iter()
        .filter(|item| !present.contains(&item.id) && added.insert(&item.id))
        .map(|item| LayoutRecord::warehoused_at(item, default_at))
        .collect()
}
