use rand::Rng;

use aquarium_core::{Millis, Point, Viewport};

use crate::config::PatrolConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Whether the sprite should be drawn mirrored.
    pub fn is_mirrored(&self) -> bool {
        matches!(self, Self::Right)
    }
}

/// Ephemeral swim state for one creature in the tank. Never persisted.
#[derive(Debug, Clone)]
pub struct SwimState {
    pub pos: Point,
    pub facing: Facing,
    pub base_speed: f64,
    pub current_speed: f64,
    pub patrol_y: f64,
    pub bob_offset: f64,
    pub last_speed_change_at: Millis,
    pub last_bob_change_at: Millis,
    speed_interval: Millis,
    bob_interval: Millis,
}

impl SwimState {
    /// Fresh patrol anchored at `anchor`, with speed and direction drawn anew.
    pub fn seed<R: Rng>(anchor: Point, now: Millis, config: &PatrolConfig, rng: &mut R) -> Self {
        let base_speed = sample(rng, config.min_base_speed, config.max_base_speed);
        let facing = if rng.gen_bool(0.5) { Facing::Left } else { Facing::Right };
        Self {
            pos: anchor,
            facing,
            base_speed,
            current_speed: base_speed,
            patrol_y: anchor.y,
            bob_offset: 0.0,
            last_speed_change_at: now,
            last_bob_change_at: now,
            speed_interval: interval(rng, config.speed_interval_ms),
            bob_interval: interval(rng, config.bob_interval_ms),
        }
    }

    /// Advance one frame.
    pub fn step<R: Rng>(&mut self, now: Millis, viewport: Viewport, config: &PatrolConfig, rng: &mut R) {
        match self.facing {
            Facing::Left => self.pos.x -= self.current_speed,
            Facing::Right => self.pos.x += self.current_speed,
        }

        let left = config.edge_margin;
        let right = viewport.width - config.edge_margin;
        match self.facing {
            Facing::Left if self.pos.x <= left => {
                self.pos.x = left;
                self.facing = Facing::Right;
            }
            Facing::Right if self.pos.x >= right => {
                self.pos.x = right;
                self.facing = Facing::Left;
            }
            _ => {}
        }

        if now.saturating_sub(self.last_bob_change_at) >= self.bob_interval {
            self.bob_offset = sample(rng, -config.bob_amplitude, config.bob_amplitude);
            self.last_bob_change_at = now;
            self.bob_interval = interval(rng, config.bob_interval_ms);
        }
        let target_y = self.patrol_y + self.bob_offset;
        self.pos.y += (target_y - self.pos.y) * config.bob_ease;

        if now.saturating_sub(self.last_speed_change_at) >= self.speed_interval {
            let factor = sample(rng, config.min_speed_factor, config.max_speed_factor);
            self.current_speed = self.base_speed * factor;
            self.last_speed_change_at = now;
            self.speed_interval = interval(rng, config.speed_interval_ms);
        }
    }
}

fn sample<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

fn interval<R: Rng>(rng: &mut R, (lo, hi): (u64, u64)) -> Millis {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const FRAME_MS: Millis = 16;

    fn swim(anchor: Point, facing: Facing, speed: f64) -> SwimState {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = SwimState::seed(anchor, 0, &PatrolConfig::default(), &mut rng);
        state.facing = facing;
        state.base_speed = speed;
        state.current_speed = speed;
        state
    }

    #[test]
    fn seeded_speed_within_range() {
        let config = PatrolConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let state = SwimState::seed(Point::new(400.0, 300.0), 0, &config, &mut rng);
            assert!((config.min_base_speed..=config.max_base_speed).contains(&state.base_speed));
            assert_eq!(state.current_speed, state.base_speed);
            assert_eq!(state.patrol_y, 300.0);
        }
    }

    #[test]
    fn bounces_off_left_edge() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = swim(Point::new(62.0, 300.0), Facing::Left, 1.5);
        let vp = Viewport::new(800.0, 600.0);
        let config = PatrolConfig::default();

        state.step(FRAME_MS, vp, &config, &mut rng);
        assert_eq!(state.pos.x, 60.5);
        assert_eq!(state.facing, Facing::Left);

        state.step(2 * FRAME_MS, vp, &config, &mut rng);
        assert_eq!(state.pos.x, 60.0);
        assert_eq!(state.facing, Facing::Right);
        assert!(state.facing.is_mirrored());
    }

    #[test]
    fn bounces_off_right_edge() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = swim(Point::new(739.5, 300.0), Facing::Right, 1.0);
        state.step(FRAME_MS, Viewport::new(800.0, 600.0), &PatrolConfig::default(), &mut rng);
        assert_eq!(state.pos.x, 740.0);
        assert_eq!(state.facing, Facing::Left);
    }

    #[test]
    fn x_stays_inside_patrol_band() {
        let mut rng = StdRng::seed_from_u64(4);
        let config = PatrolConfig::default();
        let vp = Viewport::new(800.0, 600.0);
        let mut state = SwimState::seed(Point::new(400.0, 300.0), 0, &config, &mut rng);
        for frame in 1..5_000 {
            state.step(frame * FRAME_MS, vp, &config, &mut rng);
            assert!(state.pos.x >= 60.0 && state.pos.x <= 740.0, "x = {}", state.pos.x);
        }
    }

    #[test]
    fn bob_and_speed_stay_bounded() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = PatrolConfig::default();
        let vp = Viewport::new(800.0, 600.0);
        let mut state = SwimState::seed(Point::new(400.0, 300.0), 0, &config, &mut rng);
        for frame in 1..10_000 {
            state.step(frame * FRAME_MS, vp, &config, &mut rng);
            assert!(state.bob_offset.abs() <= 4.0);
            assert!((state.pos.y - 300.0).abs() <= 4.0);
            assert!(state.current_speed >= state.base_speed * 0.8 - 1e-9);
            assert!(state.current_speed <= state.base_speed * 1.2 + 1e-9);
        }
        // 160 simulated seconds: both timers must have fired at least once.
        assert!(state.last_bob_change_at > 0);
        assert!(state.last_speed_change_at > 0);
    }

    #[test]
    fn vertical_ease_is_two_percent_of_remaining_distance() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut state = swim(Point::new(400.0, 300.0), Facing::Right, 0.0);
        state.bob_offset = 4.0;
        state.step(1, Viewport::new(800.0, 600.0), &PatrolConfig::default(), &mut rng);
        assert!((state.pos.y - 300.08).abs() < 1e-9);
    }
}
