pub mod actions;
pub mod breeding;
pub mod catalog;
pub mod config;
pub mod economy;
pub mod engine;
pub mod genetics;
pub mod growth;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod web;

pub use actions::{Action, Outcome, Rejection};
pub use config::{ConfigLoader, GameConfig};
pub use engine::{Engine, EngineBuilder, TickSummary};
pub use state::{EntityId, GameState};
