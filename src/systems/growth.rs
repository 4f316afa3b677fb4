use anyhow::Result;
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    growth,
    rng::StreamRng,
    state::GameState,
};

/// Re-derives stage and progress of every live plant from its planting time.
pub struct GrowthSystem;

impl GrowthSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrowthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GrowthSystem {
    fn name(&self) -> &str {
        "growth"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        _rng: &mut StreamRng<'_>,
    ) -> Result<()> {
        for plant in &mut state.plants {
            let (stage, progress) = growth::evaluate(plant, ctx.game_clock);
            if stage != plant.stage {
                debug!(
                    plant = %plant.id,
                    from = plant.stage.label(),
                    to = stage.label(),
                    "stage change"
                );
            }
            plant.stage = stage;
            // Two decimals keeps the persisted value exact through JSON.
            plant.progress = (progress * 100.0).round() / 100.0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Genotype, Phenotype, Tier};
    use crate::growth::GrowthStage;
    use crate::rng::RngManager;
    use crate::state::{EntityId, Plant};

    fn plant(id: u64, speed: u8, planted_at: u64) -> Plant {
        Plant {
            id: EntityId::new(id),
            name: "Test".into(),
            stage: GrowthStage::Seed,
            progress: 0.0,
            genotype: Genotype::new(Tier::Hybrid, Tier::Hybrid, Tier::Hybrid),
            phenotype: Phenotype::new(6, speed, 6),
            planted_at,
            genetics_known: true,
        }
    }

    fn run_at(state: &mut GameState, clock: u64) {
        let mut rng = RngManager::new(1);
        let ctx = SystemContext {
            game_clock: clock,
            minutes_advanced: 0,
        };
        GrowthSystem::new()
            .run(&ctx, state, &mut rng.stream("growth"))
            .unwrap();
    }

    #[test]
    fn every_plant_uses_the_same_clock() {
        let mut state = GameState::new(0);
        state.plants.push(plant(1, 10, 0));
        state.plants.push(plant(2, 1, 0));
        state.plants.push(plant(3, 10, 15));
        run_at(&mut state, 20);
        assert_eq!(state.plants[0].stage, GrowthStage::Harvest);
        assert_eq!(state.plants[0].progress, 100.0);
        assert_eq!(state.plants[1].stage, GrowthStage::Sprout);
        assert_eq!(state.plants[1].progress, 18.18);
        assert_eq!(state.plants[2].stage, GrowthStage::Sprout);
    }

    #[test]
    fn recomputing_is_idempotent() {
        let mut state = GameState::new(0);
        state.plants.push(plant(1, 4, 0));
        run_at(&mut state, 40);
        let first = state.clone();
        run_at(&mut state, 40);
        assert_eq!(state, first);
    }
}
