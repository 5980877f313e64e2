use aquarium_core::{Clock, SystemClock};
use aquarium_storage::{InventoryStore, LayoutStore};

use crate::notify::{LogNotifier, Notifier};

/// The collaborators an engine talks to, handed over at construction.
pub struct AquariumContext {
    pub inventory: Box<dyn InventoryStore>,
    pub layouts: Box<dyn LayoutStore>,
    pub notifier: Box<dyn Notifier>,
    pub clock: Box<dyn Clock>,
}

impl AquariumContext {
    /// Context with log-only notifications and wall-clock time.
    pub fn new(inventory: Box<dyn InventoryStore>, layouts: Box<dyn LayoutStore>) -> Self {
        Self {
            inventory,
            layouts,
            notifier: Box::new(LogNotifier),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
