use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::Point;
use crate::ids::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Creature,
    Decoration,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creature => "creature",
            Self::Decoration => "decoration",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "creature" => Ok(Self::Creature),
            "decoration" => Ok(Self::Decoration),
            _ => Err(CoreError::InvalidData(format!("unknown item kind: {s}"))),
        }
    }

    pub fn is_creature(&self) -> bool {
        matches!(self, Self::Creature)
    }
}

/// Which side of the tank/warehouse partition a record lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    Tank,
    Warehouse,
}

impl Container {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tank => "tank",
            Self::Warehouse => "warehouse",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "tank" => Ok(Self::Tank),
            "warehouse" => Ok(Self::Warehouse),
            _ => Err(CoreError::InvalidData(format!("unknown container: {s}"))),
        }
    }
}

/// An owned item as reported by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemRef {
    pub id: ItemId,
    pub kind: ItemKind,
    pub display_name: String,
    pub image_ref: String,
}

impl InventoryItemRef {
    pub fn new(
        id: impl Into<ItemId>,
        kind: ItemKind,
        display_name: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            display_name: display_name.into(),
            image_ref: image_ref.into(),
        }
    }
}

/// Persisted spatial and partition state for one owned item.
///
/// `x`/`y` are the center point in viewport pixels. `display_name` and
/// `image_ref` are a cached copy of the inventory metadata and are refreshed
/// on every reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub id: ItemId,
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub container: Container,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

pub const DEFAULT_X: f64 = 400.0;
pub const DEFAULT_Y: f64 = 300.0;
pub const DEFAULT_SCALE: f64 = 1.0;

impl LayoutRecord {
    /// A freshly owned item: in the warehouse, centered, unscaled.
    pub fn default_for(item: &InventoryItemRef) -> Self {
        Self::warehoused_at(item, Point::new(DEFAULT_X, DEFAULT_Y))
    }

    /// A freshly owned item in the warehouse, remembering `at` as the spot
    /// it will take when first placed without a drag.
    pub fn warehoused_at(item: &InventoryItemRef, at: Point) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind,
            x: at.x,
            y: at.y,
            scale: DEFAULT_SCALE,
            container: Container::Warehouse,
            display_name: Some(item.display_name.clone()),
            image_ref: Some(item.image_ref.clone()),
        }
    }

    pub fn in_tank(&self) -> bool {
        self.container == Container::Tank
    }

    /// True when position, scale and container all match `other`.
    pub fn same_placement(&self, other: &LayoutRecord) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.scale == other.scale
            && self.container == other.container
    }

    pub fn refresh_metadata(&mut self, item: &InventoryItemRef) {
        self.kind = item.kind;
        self.display_name = Some(item.display_name.clone());
        self.image_ref = Some(item.image_ref.clone());
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_container_parse_roundtrip() {
        for kind in [ItemKind::Creature, ItemKind::Decoration] {
            assert_eq!(ItemKind::parse(kind.as_str()).unwrap(), kind);
        }
        for container in [Container::Tank, Container::Warehouse] {
            assert_eq!(Container::parse(container.as_str()).unwrap(), container);
        }
        assert!(ItemKind::parse("plant").is_err());
        assert!(Container::parse("attic").is_err());
    }

    #[test]
    fn default_record_is_warehoused_at_center() {
        let item = InventoryItemRef::new("octopus", ItemKind::Creature, "Octopus", "img/octopus.png");
        let record = LayoutRecord::default_for(&item);
        assert_eq!(record.container, Container::Warehouse);
        assert_eq!((record.x, record.y, record.scale), (400.0, 300.0, 1.0));
        assert_eq!(record.label(), "Octopus");
    }
}
