pub mod clock;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod item;
pub mod layout;
pub mod reconcile;
pub mod scale;

pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use error::CoreError;
pub use geometry::{Point, Viewport};
pub use ids::*;
pub use item::{Container, InventoryItemRef, ItemKind, LayoutRecord};
pub use layout::LayoutSnapshot;
pub use reconcile::{reconcile, reconcile_at};
pub use scale::{ScalePolicy, ScaleStep};
