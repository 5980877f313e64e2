use std::cell::RefCell;
use std::rc::Rc;

use aquarium_core::{ids::UserId, InventoryItemRef, LayoutSnapshot};

use crate::error::StorageError;

/// Read side of the inventory service: what a user currently owns.
pub trait InventoryStore {
    fn get_owned_items(&self, user_id: UserId) -> Result<Vec<InventoryItemRef>, StorageError>;
}

/// Per-user layout persistence. `put_layout` replaces the whole record.
pub trait LayoutStore {
    /// `Ok(None)` when the user has never saved a layout.
    fn get_layout(&self, user_id: UserId) -> Result<Option<LayoutSnapshot>, StorageError>;

    fn put_layout(&mut self, user_id: UserId, snapshot: &LayoutSnapshot) -> Result<(), StorageError>;
}

// Shared handles let one backend serve both roles (and let callers keep
// access to a store they handed to an engine).
impl<T: InventoryStore> InventoryStore for Rc<RefCell<T>> {
    fn get_owned_items(&self, user_id: UserId) -> Result<Vec<InventoryItemRef>, StorageError> {
        self.borrow().get_owned_items(user_id)
    }
}

impl<T: LayoutStore> LayoutStore for Rc<RefCell<T>> {
    fn get_layout(&self, user_id: UserId) -> Result<Option<LayoutSnapshot>, StorageError> {
        self.borrow().get_layout(user_id)
    }

    fn put_layout(&mut self, user_id: UserId, snapshot: &LayoutSnapshot) -> Result<(), StorageError> {
        self.borrow_mut().put_layout(user_id, snapshot)
    }
}
