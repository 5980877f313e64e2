pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod notify;
pub mod partition;
pub mod patrol;
pub mod pointer;
pub mod writeback;

pub use config::{EngineConfig, PatrolConfig, RetryPolicy};
pub use context::AquariumContext;
pub use error::EngineError;
pub use identity::{IdentityProvider, Session, StaticIdentity};
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier};
pub use patrol::{Facing, SwimState};
pub use pointer::{DragOrigin, DropOutcome, PointerSession};
pub use writeback::FlushReport;

use std::collections::BTreeMap;

use rand::{rngs::StdRng, SeedableRng};

use aquarium_core::{
    ids::{ItemId, UserId},
    reconcile_at, InventoryItemRef, ItemKind, LayoutRecord, LayoutSnapshot, Point, ScaleStep, Viewport,
};

use crate::partition::TankLayout;
use crate::writeback::WriteBackQueue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No valid session: nothing was read and the tank is empty.
    NoIdentity,
    Loaded {
        user_id: UserId,
        items: usize,
        in_tank: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// A creature swimming on its own.
    IdlePatrolling,
    /// A decoration at rest.
    IdleStatic,
    Dragging,
}

/// Everything a renderer needs to draw one tank item.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub display_name: Option<String>,
    pub image_ref: Option<String>,
    pub position: Point,
    pub scale: f64,
    /// Swim direction for patrolling creatures.
    pub facing: Option<Facing>,
    pub state: InteractionState,
    pub selected: bool,
}

/// The aquarium layout engine.
///
/// Owns the reconciled layout for the signed-in user, per-creature swim
/// state, the current selection and pointer session, and the write-back
/// queue. Driven from one thread: gestures as they happen, `tick` once per
/// display frame.
pub struct AquariumEngine {
    config: EngineConfig,
    ctx: AquariumContext,
    user: Option<UserId>,
    inventory: Vec<InventoryItemRef>,
    layout: TankLayout,
    swims: BTreeMap<ItemId, SwimState>,
    selection: Option<ItemId>,
    session: Option<PointerSession>,
    viewport: Option<Viewport>,
    writes: WriteBackQueue,
    rng: StdRng,
}

impl AquariumEngine {
    pub fn new(config: EngineConfig, ctx: AquariumContext) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            viewport: Some(config.viewport),
            writes: WriteBackQueue::new(config.retry),
            config,
            ctx,
            user: None,
            inventory: Vec::new(),
            layout: TankLayout::new(),
            swims: BTreeMap::new(),
            selection: None,
            session: None,
            rng,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user
    }

    pub fn is_loaded(&self) -> bool {
        self.user.is_some()
    }

    fn require_user(&self) -> Result<UserId, EngineError> {
        self.user.ok_or(EngineError::NotLoaded)
    }

    fn now(&self) -> aquarium_core::Millis {
        self.ctx.clock.now_ms()
    }

    // ========================================================================
    // Loading and reconciliation
    // ========================================================================

    /// Resolve the identity, fetch inventory and saved layout, and reconcile.
    ///
    /// Read failures are logged and treated as "nothing saved". While writes
    /// for the user are still unflushed, the newest queued snapshot stands in
    /// for the persisted one so those changes are not reverted, even after a
    /// switch to another user and back.
    pub fn load(&mut self, identity: &dyn IdentityProvider) -> LoadOutcome {
        let Some(user_id) = identity.authenticated_user() else {
            tracing::debug!("no authenticated user; aquarium stays empty");
            self.user = None;
            self.inventory.clear();
            self.layout.clear();
            self.swims.clear();
            self.selection = None;
            self.session = None;
            return LoadOutcome::NoIdentity;
        };

        let inventory = self.fetch_inventory(user_id);
        let persisted: Option<Vec<LayoutRecord>> = match self.writes.latest_for(user_id) {
            Some(pending) => {
                tracing::debug!(user = %user_id, "unflushed writes pending; using newest queued layout");
                Some(pending.clone().into_records())
            }
            None => self.fetch_layout(user_id).map(LayoutSnapshot::into_records),
        };

        let merged = reconcile_at(&inventory, persisted.as_deref(), self.config.default_position);
        self.user = Some(user_id);
        self.inventory = inventory;
        self.layout.replace(merged);
        self.selection = None;
        self.session = None;
        self.swims.clear();
        self.mount_swimmers();

        let in_tank = self.layout.tank().count();
        tracing::info!(user = %user_id, items = self.layout.len(), in_tank, "aquarium loaded");
        LoadOutcome::Loaded {
            user_id,
            items: self.layout.len(),
            in_tank,
        }
    }

    /// Re-read the inventory (after a purchase, say) and reconcile it against
    /// the current in-memory layout. Returns how many records were added.
    pub fn refresh_inventory(&mut self) -> Result<usize, EngineError> {
        let user_id = self.require_user()?;
        let inventory = self.fetch_inventory(user_id);
        let before = self.layout.len();
        let merged = reconcile_at(&inventory, Some(self.layout.records()), self.config.default_position);
        self.inventory = inventory;
        self.layout.replace(merged);
        self.mount_swimmers();
        let added = self.layout.len() - before;
        tracing::debug!(user = %user_id, added, "inventory refreshed");
        Ok(added)
    }

    fn fetch_inventory(&self, user_id: UserId) -> Vec<InventoryItemRef> {
        match self.ctx.inventory.get_owned_items(user_id) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(user = %user_id, error = %e, "inventory read failed; using empty inventory");
                Vec::new()
            }
        }
    }

    fn fetch_layout(&self, user_id: UserId) -> Option<LayoutSnapshot> {
        match self.ctx.layouts.get_layout(user_id) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(user = %user_id, error = %e, "layout read failed; starting from defaults");
                None
            }
        }
    }

    /// Give every tank creature that lacks one a fresh swim state, and drop
    /// swim states for anything no longer swimming.
    fn mount_swimmers(&mut self) {
        let now = self.now();
        let dragging = self.session.as_ref().map(|s| s.item().clone());
        let layout = &self.layout;
        self.swims
            .retain(|id, _| layout.get(id).is_some_and(|r| r.in_tank() && r.kind.is_creature()));
        for record in self.layout.tank() {
            if !record.kind.is_creature()
                || self.swims.contains_key(&record.id)
                || dragging.as_ref() == Some(&record.id)
            {
                continue;
            }
            let swim = SwimState::seed(Point::new(record.x, record.y), now, &self.config.patrol, &mut self.rng);
            self.swims.insert(record.id.clone(), swim);
        }
    }

    fn restart_swim(&mut self, id: &ItemId, anchor: Point) {
        let now = self.now();
        let swim = SwimState::seed(anchor, now, &self.config.patrol, &mut self.rng);
        self.swims.insert(id.clone(), swim);
    }

    // ========================================================================
    // Partition
    // ========================================================================

    /// Put an owned item in the tank at `(x, y)`. Coordinates are expected to
    /// be clamped already; pointer sessions do that.
    pub fn place_in_tank(&mut self, id: &ItemId, x: f64, y: f64) -> Result<bool, EngineError> {
        self.require_user()?;
        if !self.layout.place_in_tank(id, x, y) {
            tracing::debug!(item = %id, "place_in_tank: unknown item ignored");
            return Ok(false);
        }
        let Some(record) = self.layout.get(id) else {
            return Ok(false);
        };
        let is_creature = record.kind.is_creature();
        let message = format!("{} was added to your tank", record.label());
        if is_creature {
            self.restart_swim(id, Point::new(x, y));
        }
        self.enqueue_write();
        tracing::info!(item = %id, x, y, "placed in tank");
        self.ctx.notifier.notify(Notification::success(message));
        Ok(true)
    }

    /// Return an item to the warehouse. Position and scale are kept so the
    /// next placement can reuse them.
    pub fn send_to_warehouse(&mut self, id: &ItemId) -> Result<bool, EngineError> {
        self.require_user()?;
        if !self.layout.send_to_warehouse(id) {
            tracing::debug!(item = %id, "send_to_warehouse: unknown item ignored");
            return Ok(false);
        }
        self.swims.remove(id);
        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        }
        if self.session.as_ref().is_some_and(|s| s.item() == id) {
            self.session = None;
        }
        self.enqueue_write();
        tracing::debug!(item = %id, "sent to warehouse");
        Ok(true)
    }

    // ========================================================================
    // Selection, scaling, removal
    // ========================================================================

    /// Toggle selection of a tank item. Selecting one item deselects any other.
    pub fn click(&mut self, id: &ItemId) -> Result<bool, EngineError> {
        self.require_user()?;
        if !self.layout.get(id).is_some_and(LayoutRecord::in_tank) {
            tracing::debug!(item = %id, "click on item not in tank ignored");
            return Ok(false);
        }
        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        } else {
            self.selection = Some(id.clone());
        }
        Ok(true)
    }

    pub fn selected(&self) -> Option<&ItemId> {
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Scroll over a tank item. Returns whether the scale changed.
    pub fn wheel(&mut self, id: &ItemId, delta_y: f64) -> Result<bool, EngineError> {
        self.require_user()?;
        let Some(step) = ScaleStep::from_wheel_delta(delta_y) else {
            return Ok(false);
        };
        let policy = self.config.scale;
        Ok(self.rescale(id, |scale| policy.apply_wheel(scale, step)))
    }

    pub fn grow_selected(&mut self) -> Result<bool, EngineError> {
        self.step_selected(ScaleStep::Grow)
    }

    pub fn shrink_selected(&mut self) -> Result<bool, EngineError> {
        self.step_selected(ScaleStep::Shrink)
    }

    fn step_selected(&mut self, step: ScaleStep) -> Result<bool, EngineError> {
        self.require_user()?;
        let Some(id) = self.selection.clone() else {
            return Ok(false);
        };
        let policy = self.config.scale;
        Ok(self.rescale(&id, |scale| policy.apply_button(scale, step)))
    }

    fn rescale(&mut self, id: &ItemId, f: impl FnOnce(f64) -> f64) -> bool {
        let Some(record) = self.layout.get_mut(id).filter(|r| r.in_tank()) else {
            tracing::debug!(item = %id, "rescale on item not in tank ignored");
            return false;
        };
        let scale = f(record.scale);
        if scale == record.scale {
            return false;
        }
        record.scale = scale;
        self.enqueue_write();
        true
    }

    /// Send the selected item back to the warehouse.
    pub fn remove_selected(&mut self) -> Result<bool, EngineError> {
        self.require_user()?;
        match self.selection.take() {
            Some(id) => self.send_to_warehouse(&id),
            None => Ok(false),
        }
    }

    // ========================================================================
    // Pointer sessions
    // ========================================================================

    /// Press on a tank item and start moving it. Patrol stops immediately.
    pub fn begin_drag(&mut self, id: &ItemId, cursor: Point) -> Result<bool, EngineError> {
        self.require_user()?;
        let Some(record) = self.layout.get(id).filter(|r| r.in_tank()) else {
            tracing::debug!(item = %id, "drag on item not in tank ignored");
            return Ok(false);
        };
        let start = self.rendered_position(record);
        self.cancel_drag();
        self.swims.remove(id);
        self.session = Some(PointerSession::on_session_start(id.clone(), DragOrigin::Tank { start }, cursor));
        Ok(true)
    }

    /// Pick an item out of the warehouse picker.
    pub fn begin_placement(&mut self, id: &ItemId, cursor: Point) -> Result<bool, EngineError> {
        self.require_user()?;
        if !self.layout.get(id).is_some_and(|r| !r.in_tank()) {
            tracing::debug!(item = %id, "placement of item not in warehouse ignored");
            return Ok(false);
        }
        self.cancel_drag();
        self.session = Some(PointerSession::on_session_start(id.clone(), DragOrigin::Warehouse, cursor));
        Ok(true)
    }

    /// Follow the pointer. Returns the clamped center, or `None` when no
    /// session is active.
    pub fn drag_move(&mut self, cursor: Point) -> Result<Option<Point>, EngineError> {
        self.require_user()?;
        let viewport = self.drag_viewport();
        let margin = self.config.drag_margin;
        Ok(self
            .session
            .as_mut()
            .map(|session| session.on_session_move(cursor, viewport, margin)))
    }

    /// Release the pointer. The session always ends, even when the pointer
    /// is outside the tank.
    pub fn end_drag(&mut self, cursor: Point) -> Result<Option<DropOutcome>, EngineError> {
        self.require_user()?;
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let outcome = session.on_session_end(cursor, self.drag_viewport(), self.config.drag_margin);
        match &outcome {
            DropOutcome::Placed { id, at } => {
                self.place_in_tank(id, at.x, at.y)?;
            }
            DropOutcome::Moved { id, at } => self.finish_move(id, *at),
            DropOutcome::Cancelled { id } => {
                tracing::debug!(item = %id, "placement dropped outside the tank");
            }
        }
        Ok(Some(outcome))
    }

    /// Abandon the active session without changing the layout.
    pub fn cancel_drag(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let DragOrigin::Tank { start } = session.origin() {
            let id = session.item().clone();
            if self.layout.get(&id).is_some_and(|r| r.in_tank() && r.kind.is_creature()) {
                self.restart_swim(&id, start);
            }
        }
    }

    pub fn session(&self) -> Option<&PointerSession> {
        self.session.as_ref()
    }

    fn finish_move(&mut self, id: &ItemId, at: Point) {
        let Some(record) = self.layout.get_mut(id) else {
            return;
        };
        let moved = record.x != at.x || record.y != at.y;
        record.x = at.x;
        record.y = at.y;
        let is_creature = record.kind.is_creature();
        if is_creature {
            self.restart_swim(id, at);
        }
        if moved {
            self.enqueue_write();
        }
    }

    fn drag_viewport(&self) -> Viewport {
        self.viewport.unwrap_or(self.config.viewport)
    }

    // ========================================================================
    // Frame driver and write-back
    // ========================================================================

    /// `None` when the viewport has no resolvable size; patrol pauses.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// One display frame: advance every patrolling creature, then flush due
    /// writes.
    pub fn tick(&mut self) -> FlushReport {
        let now = self.now();
        if let Some(viewport) = self.viewport {
            for swim in self.swims.values_mut() {
                swim.step(now, viewport, &self.config.patrol, &mut self.rng);
            }
        }
        self.flush_at(now)
    }

    /// Flush due writes without advancing animation.
    pub fn flush_writes(&mut self) -> FlushReport {
        let now = self.now();
        self.flush_at(now)
    }

    fn flush_at(&mut self, now: aquarium_core::Millis) -> FlushReport {
        if self.writes.is_empty() {
            return FlushReport::default();
        }
        let report = self.writes.flush(self.ctx.layouts.as_mut(), now);
        if report.first_failures > 0 {
            self.ctx.notifier.notify(Notification::error(notify::SAVE_FAILED_MESSAGE));
        }
        report
    }

    fn enqueue_write(&mut self) {
        let Some(user_id) = self.user else {
            return;
        };
        let now = self.now();
        let seq = self.writes.enqueue(user_id, self.layout.snapshot(), now);
        tracing::debug!(user = %user_id, seq, "layout write queued");
    }

    /// True while some layout change has not been confirmed by the store.
    pub fn has_unflushed_writes(&self) -> bool {
        self.writes.is_dirty()
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn inventory(&self) -> &[InventoryItemRef] {
        &self.inventory
    }

    pub fn records(&self) -> &[LayoutRecord] {
        self.layout.records()
    }

    pub fn record(&self, id: &ItemId) -> Option<&LayoutRecord> {
        self.layout.get(id)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.layout.snapshot()
    }

    pub fn swim_state(&self, id: &ItemId) -> Option<&SwimState> {
        self.swims.get(id)
    }

    pub fn warehouse_items(&self) -> Vec<&LayoutRecord> {
        self.layout.warehouse().collect()
    }

    pub fn item_state(&self, id: &ItemId) -> Option<InteractionState> {
        let record = self.layout.get(id)?;
        if self.session.as_ref().is_some_and(|s| s.item() == id) {
            return Some(InteractionState::Dragging);
        }
        if !record.in_tank() {
            return None;
        }
        Some(if self.swims.contains_key(id) {
            InteractionState::IdlePatrolling
        } else {
            InteractionState::IdleStatic
        })
    }

    fn rendered_position(&self, record: &LayoutRecord) -> Point {
        if let Some(session) = self.session.as_ref().filter(|s| s.item() == &record.id) {
            return session.center();
        }
        match self.swims.get(&record.id) {
            Some(swim) => swim.pos,
            None => Point::new(record.x, record.y),
        }
    }

    /// Render list for the tank, in layout order.
    pub fn tank_items(&self) -> Vec<RenderItem> {
        self.layout
            .tank()
            .map(|record| RenderItem {
                id: record.id.clone(),
                kind: record.kind,
                display_name: record.display_name.clone(),
                image_ref: record.image_ref.clone(),
                position: self.rendered_position(record),
                scale: record.scale,
                facing: self.swims.get(&record.id).map(|s| s.facing),
                state: self.item_state(&record.id).unwrap_or(InteractionState::IdleStatic),
                selected: self.selection.as_ref() == Some(&record.id),
            })
            .collect()
    }
}
