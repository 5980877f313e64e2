use std::cell::RefCell;
use std::rc::Rc;

use aquarium_core::{ids::UserId, InventoryItemRef, ItemKind, LayoutSnapshot, ManualClock};
use aquarium_engine::{
    AquariumContext, AquariumEngine, EngineConfig, FlushReport, LoadOutcome, Notification, StaticIdentity,
};

use crate::fakes::{FakeInventory, FakeLayoutStore, RecordingNotifier};

/// Roughly one frame at 60 Hz.
pub const FRAME_MS: u64 = 16;

pub const START_MS: u64 = 1_700_000_000_000;

pub fn creature(id: &str) -> InventoryItemRef {
    InventoryItemRef::new(id, ItemKind::Creature, display_name(id), format!("sprites/{id}.png"))
}

pub fn decoration(id: &str) -> InventoryItemRef {
    InventoryItemRef::new(id, ItemKind::Decoration, display_name(id), format!("sprites/{id}.png"))
}

fn display_name(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => String::new(),
    }
}

/// An engine wired to in-memory fakes, with handles kept for inspection.
pub struct TestTank {
    pub engine: AquariumEngine,
    pub user: UserId,
    pub inventory: Rc<RefCell<FakeInventory>>,
    pub layouts: Rc<RefCell<FakeLayoutStore>>,
    pub notifier: Rc<RefCell<RecordingNotifier>>,
    pub clock: ManualClock,
}

impl Default for TestTank {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTank {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default().with_seed(42))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let inventory = Rc::new(RefCell::new(FakeInventory::new()));
        let layouts = Rc::new(RefCell::new(FakeLayoutStore::new()));
        let notifier = Rc::new(RefCell::new(RecordingNotifier::default()));
        let clock = ManualClock::new(START_MS);
        let ctx = AquariumContext::new(Box::new(inventory.clone()), Box::new(layouts.clone()))
            .with_notifier(Box::new(notifier.clone()))
            .with_clock(Box::new(clock.clone()));
        Self {
            engine: AquariumEngine::new(config, ctx),
            user: UserId::new(),
            inventory,
            layouts,
            notifier,
            clock,
        }
    }

    /// Replace what the user owns.
    pub fn owns(&self, items: Vec<InventoryItemRef>) {
        self.inventory.borrow_mut().set(self.user, items);
    }

    /// Seed a previously saved layout.
    pub fn saved(&self, snapshot: LayoutSnapshot) {
        self.layouts.borrow_mut().seed(self.user, snapshot);
    }

    pub fn load(&mut self) -> LoadOutcome {
        let identity = StaticIdentity::signed_in(self.user);
        self.engine.load(&identity)
    }

    /// Advance the clock by one frame and tick, `n` times. Returns the
    /// summed flush reports.
    pub fn frames(&mut self, n: usize) -> FlushReport {
        let mut total = FlushReport::default();
        for _ in 0..n {
            self.clock.advance(FRAME_MS);
            let report = self.engine.tick();
            total.written += report.written;
            total.failed += report.failed;
            total.first_failures += report.first_failures;
            total.superseded += report.superseded;
            total.abandoned += report.abandoned;
        }
        total
    }

    /// All snapshots the store accepted, oldest first.
    pub fn puts(&self) -> Vec<LayoutSnapshot> {
        self.layouts.borrow().puts().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn stored(&self) -> Option<LayoutSnapshot> {
        self.layouts.borrow().stored(self.user).cloned()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.borrow().notifications.clone()
    }
}
