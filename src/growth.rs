//! Lifecycle stage and progress, derived from elapsed game time and speed.

use serde::{Deserialize, Serialize};

use crate::state::Plant;

pub const BASE_WINDOW_MINUTES: f64 = 120.0;
pub const MINUTES_PER_SPEED_POINT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Seed,
    Sprout,
    Vegetative,
    Flowering,
    Harvest,
}

impl GrowthStage {
    pub fn label(self) -> &'static str {
        match self {
            GrowthStage::Seed => "seed",
            GrowthStage::Sprout => "sprout",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::Harvest => "harvest",
        }
    }
}

/// Minutes from planting to full progress: 120 - 10 * speed.
pub fn growth_window(speed: u8) -> f64 {
    let speed = speed.clamp(1, 10) as f64;
    BASE_WINDOW_MINUTES - MINUTES_PER_SPEED_POINT * speed
}

pub fn progress(elapsed_minutes: u64, speed: u8) -> f64 {
    (elapsed_minutes as f64 / growth_window(speed) * 100.0).min(100.0)
}

pub fn stage_for(progress: f64) -> GrowthStage {
    if progress >= 80.0 {
        GrowthStage::Harvest
    } else if progress >= 60.0 {
        GrowthStage::Flowering
    } else if progress >= 30.0 {
        GrowthStage::Vegetative
    } else if progress >= 10.0 {
        GrowthStage::Sprout
    } else {
        GrowthStage::Seed
    }
}

/// Stage and progress of a plant at the given clock value.
pub fn evaluate(plant: &Plant, clock: u64) -> (GrowthStage, f64) {
    let elapsed = clock.saturating_sub(plant.planted_at);
    let progress = progress(elapsed, plant.phenotype.speed);
    (stage_for(progress), progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_shrinks_with_speed() {
        assert_eq!(growth_window(1), 110.0);
        assert_eq!(growth_window(10), 20.0);
        assert_eq!(growth_window(0), 110.0);
        assert_eq!(growth_window(42), 20.0);
    }

    #[test]
    fn progress_is_monotonic_and_saturates() {
        for speed in 1..=10 {
            let mut last = 0.0;
            for minutes in 0..300 {
                let value = progress(minutes, speed);
                assert!(value >= last, "speed {speed} regressed at {minutes}");
                assert!(value <= 100.0);
                last = value;
            }
            assert_eq!(last, 100.0);
        }
    }

    #[test]
    fn stage_thresholds() {
        assert_eq!(stage_for(0.0), GrowthStage::Seed);
        assert_eq!(stage_for(9.99), GrowthStage::Seed);
        assert_eq!(stage_for(10.0), GrowthStage::Sprout);
        assert_eq!(stage_for(45.0), GrowthStage::Vegetative);
        assert_eq!(stage_for(60.0), GrowthStage::Flowering);
        assert_eq!(stage_for(85.0), GrowthStage::Harvest);
        assert_eq!(stage_for(100.0), GrowthStage::Harvest);
    }

    #[test]
    fn stage_preserves_progress_order() {
        let mut last = GrowthStage::Seed;
        for tenth in 0..=1000 {
            let stage = stage_for(tenth as f64 / 10.0);
            assert!(stage >= last);
            last = stage;
        }
    }

    #[test]
    fn speed_five_window() {
        // 70 minute window: 56 minutes is exactly 80%.
        assert_eq!(stage_for(progress(55, 5)), GrowthStage::Flowering);
        assert_eq!(stage_for(progress(56, 5)), GrowthStage::Harvest);
    }
}
