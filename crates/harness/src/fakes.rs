use std::collections::HashMap;

use aquarium_core::{ids::UserId, InventoryItemRef, LayoutSnapshot};
use aquarium_engine::{Notification, NotificationKind, Notifier};
use aquarium_storage::{InventoryStore, LayoutStore, StorageError};

/// In-memory inventory service.
#[derive(Debug, Default)]
pub struct FakeInventory {
    items: HashMap<UserId, Vec<InventoryItemRef>>,
    pub fail_reads: bool,
}

impl FakeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, user_id: UserId, items: Vec<InventoryItemRef>) {
        self.items.insert(user_id, items);
    }

    pub fn grant(&mut self, user_id: UserId, item: InventoryItemRef) {
        self.items.entry(user_id).or_default().push(item);
    }

    pub fn revoke(&mut self, user_id: UserId, id: &str) {
        if let Some(items) = self.items.get_mut(&user_id) {
            items.retain(|i| i.id.as_str() != id);
        }
    }
}

impl InventoryStore for FakeInventory {
    fn get_owned_items(&self, user_id: UserId) -> Result<Vec<InventoryItemRef>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable("inventory service down".into()));
        }
        Ok(self.items.get(&user_id).cloned().unwrap_or_default())
    }
}

/// In-memory layout store that records every write and can be told to fail.
#[derive(Debug, Default)]
pub struct FakeLayoutStore {
    layouts: HashMap<UserId, LayoutSnapshot>,
    puts: Vec<(UserId, LayoutSnapshot)>,
    pub fail_reads: bool,
    /// Number of upcoming writes to reject.
    pub fail_puts: usize,
    /// Reject every write until cleared.
    pub offline: bool,
    pub failed_puts: usize,
}

impl FakeLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a saved layout without recording it as a write.
    pub fn seed(&mut self, user_id: UserId, snapshot: LayoutSnapshot) {
        self.layouts.insert(user_id, snapshot);
    }

    pub fn stored(&self, user_id: UserId) -> Option<&LayoutSnapshot> {
        self.layouts.get(&user_id)
    }

    /// Every successful write, in arrival order.
    pub fn puts(&self) -> &[(UserId, LayoutSnapshot)] {
        &self.puts
    }

    pub fn last_put(&self) -> Option<&LayoutSnapshot> {
        self.puts.last().map(|(_, snapshot)| snapshot)
    }
}

impl LayoutStore for FakeLayoutStore {
    fn get_layout(&self, user_id: UserId) -> Result<Option<LayoutSnapshot>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable("layout service down".into()));
        }
        Ok(self.layouts.get(&user_id).cloned())
    }

    fn put_layout(&mut self, user_id: UserId, snapshot: &LayoutSnapshot) -> Result<(), StorageError> {
        if self.offline || self.fail_puts > 0 {
            self.fail_puts = self.fail_puts.saturating_sub(1);
            self.failed_puts += 1;
            return Err(StorageError::Unavailable("layout service down".into()));
        }
        self.layouts.insert(user_id, snapshot.clone());
        self.puts.push((user_id, snapshot.clone()));
        Ok(())
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notifications: Vec<Notification>,
}

impl RecordingNotifier {
    pub fn of_kind(&self, kind: NotificationKind) -> Vec<&Notification> {
        self.notifications.iter().filter(|n| n.kind == kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
