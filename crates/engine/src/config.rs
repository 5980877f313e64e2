use serde::{Deserialize, Serialize};

use aquarium_core::{Point, ScalePolicy, Viewport};

/// Tuning for autonomous creature motion. Speeds are pixels per frame,
/// intervals are milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Distance from the left/right edge at which a creature turns around.
    pub edge_margin: f64,
    pub min_base_speed: f64,
    pub max_base_speed: f64,
    pub min_speed_factor: f64,
    pub max_speed_factor: f64,
    pub speed_interval_ms: (u64, u64),
    pub bob_amplitude: f64,
    pub bob_interval_ms: (u64, u64),
    /// Fraction of the remaining vertical distance covered each frame.
    pub bob_ease: f64,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            edge_margin: 60.0,
            min_base_speed: 0.5,
            max_base_speed: 1.5,
            min_speed_factor: 0.8,
            max_speed_factor: 1.2,
            speed_interval_ms: (5_000, 13_000),
            bob_amplitude: 4.0,
            bob_interval_ms: (2_000, 5_000),
            bob_ease: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per snapshot, including the first.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `failures` (1-based), doubling each time.
    pub fn backoff_ms(&self, failures: u32) -> u64 {
        let shift = failures.saturating_sub(1).min(16);
        self.initial_backoff_ms.saturating_mul(1 << shift)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: Viewport,
    /// Minimum distance between a dragged item's center and any edge.
    pub drag_margin: f64,
    pub default_position: Point,
    pub scale: ScalePolicy,
    pub patrol: PatrolConfig,
    pub retry: RetryPolicy,
    /// Fixed seed for patrol randomness; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(800.0, 600.0),
            drag_margin: 50.0,
            default_position: Point::new(
                aquarium_core::item::DEFAULT_X,
                aquarium_core::item::DEFAULT_Y,
            ),
            scale: ScalePolicy::default(),
            patrol: PatrolConfig::default(),
            retry: RetryPolicy::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.backoff_ms(1), 500);
        assert_eq!(retry.backoff_ms(2), 1_000);
        assert_eq!(retry.backoff_ms(3), 2_000);
    }

    #[test]
    fn defaults_match_tank_geometry() {
        let config = EngineConfig::default();
        assert_eq!(config.viewport, Viewport::new(800.0, 600.0));
        assert_eq!(config.drag_margin, 50.0);
        assert_eq!(config.patrol.edge_margin, 60.0);
        assert_eq!(config.scale.min, 0.3);
        assert_eq!(config.scale.max, 3.0);
    }
}
