use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::ItemId;
use crate::item::{Container, LayoutRecord};

/// The persisted form of a user's layout: the two partitioned lists, in
/// display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub tank_items: Vec<LayoutRecord>,
    pub warehouse_items: Vec<LayoutRecord>,
}

impl LayoutSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition a flat record list by container, preserving relative order.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a LayoutRecord>) -> Self {
        let mut snapshot = Self::new();
        for record in records {
            match record.container {
                Container::Tank => snapshot.tank_items.push(record.clone()),
                Container::Warehouse => snapshot.warehouse_items.push(record.clone()),
            }
        }
        snapshot
    }

    /// Flatten back into one list, tank items first.
    ///
    /// List membership wins over a record's own `container` field, and an id
    /// that appears twice keeps only its first occurrence, so the result
    /// always satisfies partition exclusivity.
    pub fn into_records(self) -> Vec<LayoutRecord> {
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut records = Vec::with_capacity(self.len());
        let tagged = self
            .tank_items
            .into_iter()
            .map(|r| (r, Container::Tank))
            .chain(self.warehouse_items.into_iter().map(|r| (r, Container::Warehouse)));
        for (mut record, container) in tagged {
            if !seen.insert(record.id.clone()) {
                continue;
            }
            record.container = container;
            records.push(record);
        }
        records
    }

    pub fn len(&self) -> usize {
        self.tank_items.len() + self.warehouse_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &ItemId) -> Option<&LayoutRecord> {
        self.tank_items
            .iter()
            .chain(self.warehouse_items.iter())
            .find(|r| &r.id == id)
    }

    pub fn tank_contains(&self, id: &ItemId) -> bool {
        self.tank_items.iter().any(|r| &r.id == id)
    }

    pub fn warehouse_contains(&self, id: &ItemId) -> bool {
        self.warehouse_items.iter().any(|r| &r.id == id)
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, CoreError> {
        rmp_serde::to_vec_named(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, CoreError> {
        rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

/// BLAKE3 digest of an encoded snapshot, stored next to the payload.
pub fn payload_checksum(payload: &[u8]) -> [u8; 32] {
    *blake3::hash(payload).as_bytes()
}
