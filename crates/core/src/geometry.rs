use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_to(&self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }
}

/// Size of the rendered aquarium in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    /// Clamp a center point so it keeps `margin` pixels from every edge.
    pub fn clamp_center(&self, p: Point, margin: f64) -> Point {
        Point::new(
            clamp_axis(p.x, margin, self.width - margin),
            clamp_axis(p.y, margin, self.height - margin),
        )
    }
}

/// Clamp into `[min, max]`; a viewport narrower than two margins collapses
/// to its midpoint instead of producing an inverted range.
fn clamp_axis(v: f64, min: f64, max: f64) -> f64 {
    if max < min {
        return (min + max) * 0.5;
    }
    v.clamp(min, max)
}
