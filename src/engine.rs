use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    actions::{self, Action, Outcome, Rejection},
    config::GameConfig,
    rng::{RngManager, StreamRng},
    snapshot::SaveStore,
    state::GameState,
    systems::GrowthSystem,
};

pub struct EngineBuilder {
    config: GameConfig,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn with_default_systems(self) -> Self {
        self.with_system(GrowthSystem::new())
    }

    /// Reads the store once; an empty slot starts a new game.
    pub fn build(self, store: impl SaveStore + 'static) -> Result<Engine> {
        self.config.validate().context("Invalid game config")?;
        let state = match store.load().context("Failed to load saved game")? {
            Some(blob) => {
                let state = GameState::from_blob(&blob, self.config.starting_money);
                info!(
                    plants = state.plants.len(),
                    seeds = state.seeds.len(),
                    clock = state.game_clock,
                    "resumed saved game"
                );
                state
            }
            None => {
                info!(money = self.config.starting_money, "starting new game");
                GameState::new(self.config.starting_money)
            }
        };
        // Folding in the clock and id counter keeps a resumed session from
        // replaying the draws of the previous one.
        let rng = match self.config.seed {
            Some(seed) => RngManager::new(seed ^ state.game_clock.rotate_left(32) ^ state.next_id),
            None => RngManager::from_entropy(),
        };
        Ok(Engine {
            state,
            rng,
            systems: self.systems,
            store: Box::new(store),
            config: self.config,
        })
    }
}

/// One game session: the state, its RNG streams, tick systems and the slot
/// the state is persisted to after every change.
pub struct Engine {
    state: GameState,
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    store: Box<dyn SaveStore>,
    config: GameConfig,
}

impl Engine {
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Advances the game clock by one tick's worth of minutes.
    pub fn tick(&mut self) -> Result<TickSummary> {
        self.advance(self.config.tick.minutes_per_tick)
    }

    pub fn run_ticks(&mut self, ticks: u64) -> Result<TickSummary> {
        let minutes = self.config.tick.minutes_per_tick.saturating_mul(ticks);
        self.advance(minutes)
    }

    /// The clock saturates at `u64::MAX` rather than wrapping.
    fn advance(&mut self, minutes: u64) -> Result<TickSummary> {
        let before = self.state.game_clock;
        self.state.game_clock = before.saturating_add(minutes);
        self.run_systems(self.state.game_clock - before)?;
        self.persist()?;
        Ok(self.summary())
    }

    /// Applies a player action. Rejections leave the state and the save untouched.
    pub fn apply(&mut self, action: &Action) -> Result<Result<Outcome, Rejection>> {
        let clock_before = self.state.game_clock;
        let result = {
            let mut rng = self.rng.stream("actions");
            actions::apply(&mut self.state, &self.config, &mut rng, action)
        };
        match &result {
            Ok(outcome) => {
                debug!(?action, ?outcome, "action applied");
                let advanced = self.state.game_clock - clock_before;
                self.run_systems(advanced)?;
                self.persist()?;
            }
            Err(rejection) => warn!(?action, %rejection, "action rejected"),
        }
        Ok(result)
    }

    pub fn save(&mut self) -> Result<()> {
        self.persist()
    }

    pub fn summary(&self) -> TickSummary {
        TickSummary {
            game_clock: self.state.game_clock,
            live_plants: self.state.plants.len(),
            ready_to_harvest: self.state.ready_to_harvest(),
        }
    }

    fn run_systems(&mut self, minutes_advanced: u64) -> Result<()> {
        let ctx = SystemContext {
            game_clock: self.state.game_clock,
            minutes_advanced,
        };
        for system in &mut self.systems {
            let mut stream = self.rng.stream(system.name());
            system
                .run(&ctx, &mut self.state, &mut stream)
                .with_context(|| format!("system '{}' failed", system.name()))?;
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let blob = self.state.to_blob().context("Failed to encode state")?;
        self.store.save(&blob)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub game_clock: u64,
    pub live_plants: usize,
    pub ready_to_harvest: usize,
}

pub struct SystemContext {
    pub game_clock: u64,
    pub minutes_advanced: u64,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        rng: &mut StreamRng<'_>,
    ) -> Result<()>;
}
