use aquarium_core::{ItemId, Point, Viewport};

/// Where a pointer session picked its item up from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOrigin {
    /// Dragged out of the warehouse picker; not in the tank yet.
    Warehouse,
    /// Repositioning an item already in the tank. `start` is where it was
    /// rendered when the press began.
    Tank { start: Point },
}

/// What releasing the pointer resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Placed { id: ItemId, at: Point },
    Moved { id: ItemId, at: Point },
    /// Warehouse drag released outside the tank.
    Cancelled { id: ItemId },
}

/// One press-move-release gesture on a single item.
///
/// Placement from the warehouse and repositioning inside the tank share this
/// type; only the origin and the drop resolution differ.
#[derive(Debug, Clone)]
pub struct PointerSession {
    item: ItemId,
    origin: DragOrigin,
    grab_offset: (f64, f64),
    center: Point,
}

impl PointerSession {
    /// Start a session. For tank items the grab offset keeps the item from
    /// jumping under the cursor; warehouse items are centered on it.
    pub fn on_session_start(item: ItemId, origin: DragOrigin, cursor: Point) -> Self {
        let (grab_offset, center) = match origin {
            DragOrigin::Warehouse => ((0.0, 0.0), cursor),
            DragOrigin::Tank { start } => (start.offset_to(cursor), start),
        };
        Self { item, origin, grab_offset, center }
    }

    /// Follow the cursor, keeping the center `margin` pixels inside the viewport.
    pub fn on_session_move(&mut self, cursor: Point, viewport: Viewport, margin: f64) -> Point {
        let raw = Point::new(cursor.x - self.grab_offset.0, cursor.y - self.grab_offset.1);
        self.center = viewport.clamp_center(raw, margin);
        self.center
    }

    /// Finish the session at `cursor`. Always ends the session, wherever the
    /// pointer is.
    pub fn on_session_end(mut self, cursor: Point, viewport: Viewport, margin: f64) -> DropOutcome {
        let at = self.on_session_move(cursor, viewport, margin);
        match self.origin {
            DragOrigin::Warehouse if !viewport.contains(cursor) => DropOutcome::Cancelled { id: self.item },
            DragOrigin::Warehouse => DropOutcome::Placed { id: self.item, at },
            DragOrigin::Tank { .. } => DropOutcome::Moved { id: self.item, at },
        }
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn origin(&self) -> DragOrigin {
        self.origin
    }

    pub fn center(&self) -> Point {
        self.center
    }
}
