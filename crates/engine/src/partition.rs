use std::collections::HashMap;

use aquarium_core::{Container, ItemId, LayoutRecord, LayoutSnapshot};

/// The in-memory layout: one record per item in a stable order, indexed by id.
///
/// Each record carries its own container, so an id can never sit in both
/// partitions at once.
#[derive(Debug, Default)]
pub struct TankLayout {
    records: Vec<LayoutRecord>,
    index: HashMap<ItemId, usize>,
}

impl TankLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<LayoutRecord>) -> Self {
        let mut layout = Self::new();
        layout.replace(records);
        layout
    }

    /// Swap in a new record list. Later duplicates of an id are dropped.
    pub fn replace(&mut self, records: Vec<LayoutRecord>) {
        self.records.clear();
        self.index.clear();
        for record in records {
            if self.index.contains_key(&record.id) {
                continue;
            }
            self.index.insert(record.id.clone(), self.records.len());
            self.records.push(record);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn get(&self, id: &ItemId) -> Option<&LayoutRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut LayoutRecord> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.records[i]),
            None => None,
        }
    }

    pub fn records(&self) -> &[LayoutRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn tank(&self) -> impl Iterator<Item = &LayoutRecord> {
        self.records.iter().filter(|r| r.container == Container::Tank)
    }

    pub fn warehouse(&self) -> impl Iterator<Item = &LayoutRecord> {
        self.records.iter().filter(|r| r.container == Container::Warehouse)
    }

    /// Move an item into the tank at `(x, y)`. Returns false for unknown ids.
    pub fn place_in_tank(&mut self, id: &ItemId, x: f64, y: f64) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        record.container = Container::Tank;
        record.x = x;
        record.y = y;
        true
    }

    /// Move an item to the warehouse, keeping its last tank position and scale.
    pub fn send_to_warehouse(&mut self, id: &ItemId) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        record.container = Container::Warehouse;
        true
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::from_records(&self.records)
    }
}
