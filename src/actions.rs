//! Player actions. Every action validates against the current state first and
//! only then mutates, so a rejection leaves the state untouched.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    breeding,
    catalog::{self, Strain},
    config::GameConfig,
    economy::{self, ResearchTier},
    genetics::{Genotype, Phenotype},
    growth::{self, GrowthStage},
    state::{EntityId, GameState, HarvestItem, Plant, SeedStack},
};

pub const MINUTES_PER_HOUR: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    BuySeed { strain: String },
    Plant { seed: EntityId },
    PlantStrain { strain: String },
    Harvest { plant: EntityId },
    Sell { item: EntityId },
    ConvertToSeed { item: EntityId },
    Research { item: EntityId, tier: ResearchTier },
    Crossbreed { first: EntityId, second: EntityId },
    Sleep { hours: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    SeedBought { seed: EntityId, cost: i64 },
    Planted { plant: EntityId },
    Harvested { item: EntityId, quantity: u32 },
    Sold { credited: i64 },
    Converted { seed: EntityId, cost: i64 },
    Researched { item: EntityId, cost: i64 },
    Crossbred { seed: EntityId },
    Slept { minutes: u64 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("need {needed} but only {available} available")]
    InsufficientFunds { needed: i64, available: i64 },
    #[error("no strain named '{0}' in the catalog")]
    UnknownStrain(String),
    #[error("no plant with id {0}")]
    UnknownPlant(EntityId),
    #[error("no seed stack with id {0}")]
    UnknownSeed(EntityId),
    #[error("no harvested item with id {0}")]
    UnknownItem(EntityId),
    #[error("plant {plant} is still at the {} stage", .stage.label())]
    NotReady { plant: EntityId, stage: GrowthStage },
    #[error("seed stack {0} does not hold enough seeds")]
    EmptyStack(EntityId),
    #[error("item {0} has already been researched")]
    AlreadyResearched(EntityId),
}

/// Applies one action. `rng` feeds phenotype sampling and breeding.
pub fn apply<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut R,
    action: &Action,
) -> Result<Outcome, Rejection> {
    match action {
        Action::BuySeed { strain } => buy_seed(state, config, strain),
        Action::Plant { seed } => plant_seed(state, *seed),
        Action::PlantStrain { strain } => plant_strain(state, config, strain),
        Action::Harvest { plant } => harvest(state, *plant),
        Action::Sell { item } => sell(state, config, *item),
        Action::ConvertToSeed { item } => convert_to_seed(state, config, *item),
        Action::Research { item, tier } => research(state, config, *item, *tier),
        Action::Crossbreed { first, second } => crossbreed(state, config, rng, *first, *second),
        Action::Sleep { hours } => Ok(sleep(state, *hours)),
    }
}

fn strain<'a>(config: &'a GameConfig, name: &str) -> Result<&'a Strain, Rejection> {
    catalog::find(&config.catalog, name)
        .ok_or_else(|| Rejection::UnknownStrain(name.to_string()))
}

fn charge(state: &GameState, cost: i64) -> Result<(), Rejection> {
    if state.stats.money < cost {
        return Err(Rejection::InsufficientFunds {
            needed: cost,
            available: state.stats.money,
        });
    }
    Ok(())
}

fn buy_seed(
    state: &mut GameState,
    config: &GameConfig,
    name: &str,
) -> Result<Outcome, Rejection> {
    let strain = strain(config, name)?;
    charge(state, strain.price)?;
    state.stats.money -= strain.price;

    let existing = state.seeds.iter_mut().find(|stack| {
        stack.genetics_known && stack.strain.as_deref() == Some(strain.name.as_str())
    });
    let seed = match existing {
        Some(stack) => {
            stack.quantity += 1;
            stack.id
        }
        None => {
            let id = state.allocate_id();
            state.seeds.push(SeedStack {
                id,
                name: strain.name.clone(),
                quantity: 1,
                genotype: strain.genotype,
                phenotype: strain.phenotype,
                genetics_known: true,
                created_at: state.game_clock,
                strain: Some(strain.name.clone()),
            });
            id
        }
    };
    Ok(Outcome::SeedBought {
        seed,
        cost: strain.price,
    })
}

fn put_in_ground(
    state: &mut GameState,
    name: String,
    genotype: Genotype,
    phenotype: Phenotype,
    genetics_known: bool,
) -> EntityId {
    let id = state.allocate_id();
    state.plants.push(Plant {
        id,
        name,
        stage: GrowthStage::Seed,
        progress: 0.0,
        genotype,
        phenotype,
        planted_at: state.game_clock,
        genetics_known,
    });
    id
}

fn plant_seed(state: &mut GameState, seed: EntityId) -> Result<Outcome, Rejection> {
    let stack = state.seed(seed).ok_or(Rejection::UnknownSeed(seed))?;
    if stack.quantity == 0 {
        return Err(Rejection::EmptyStack(seed));
    }
    let (name, genotype, phenotype, known) = (
        stack.name.clone(),
        stack.genotype,
        stack.phenotype,
        stack.genetics_known,
    );
    state.consume_seeds(seed, 1);
    let plant = put_in_ground(state, name, genotype, phenotype, known);
    Ok(Outcome::Planted { plant })
}

fn plant_strain(
    state: &mut GameState,
    config: &GameConfig,
    name: &str,
) -> Result<Outcome, Rejection> {
    let strain = strain(config, name)?;
    charge(state, strain.price)?;
    state.stats.money -= strain.price;
    let plant = put_in_ground(
        state,
        strain.name.clone(),
        strain.genotype,
        strain.phenotype,
        true,
    );
    Ok(Outcome::Planted { plant })
}

fn harvest(state: &mut GameState, plant_id: EntityId) -> Result<Outcome, Rejection> {
    let plant = state
        .plant(plant_id)
        .ok_or(Rejection::UnknownPlant(plant_id))?;
    let (stage, _) = growth::evaluate(plant, state.game_clock);
    if stage != GrowthStage::Harvest {
        return Err(Rejection::NotReady {
            plant: plant_id,
            stage,
        });
    }

    let plant = plant.clone();
    let quantity = u32::from(plant.phenotype.yield_score.max(1));
    state.plants.retain(|p| p.id != plant_id);
    let item = state.allocate_id();
    state.harvests.push(HarvestItem {
        id: item,
        name: plant.name,
        quantity,
        genotype: plant.genotype,
        phenotype: plant.phenotype,
        researched: plant.genetics_known,
        harvested_at: state.game_clock,
    });

    let stats = &mut state.stats;
    stats.total_harvested += u64::from(quantity);
    stats.best_yield = stats.best_yield.max(plant.phenotype.yield_score);
    stats.best_potency = stats.best_potency.max(plant.phenotype.potency);
    Ok(Outcome::Harvested { item, quantity })
}

fn sell(
    state: &mut GameState,
    config: &GameConfig,
    item_id: EntityId,
) -> Result<Outcome, Rejection> {
    let item = state
        .harvest(item_id)
        .ok_or(Rejection::UnknownItem(item_id))?;
    let credited = economy::sale_value(item, &config.prices);
    state.harvests.retain(|h| h.id != item_id);
    state.stats.money += credited;
    Ok(Outcome::Sold { credited })
}

fn convert_to_seed(
    state: &mut GameState,
    config: &GameConfig,
    item_id: EntityId,
) -> Result<Outcome, Rejection> {
    let item = state
        .harvest(item_id)
        .ok_or(Rejection::UnknownItem(item_id))?;
    let cost = config.prices.seed_conversion;
    charge(state, cost)?;

    let (name, genotype, phenotype, known) = (
        item.name.clone(),
        item.genotype,
        item.phenotype,
        item.researched,
    );
    state.stats.money -= cost;
    state.consume_harvest(item_id, 1);
    let seed = state.allocate_id();
    state.seeds.push(SeedStack {
        id: seed,
        name,
        quantity: 1,
        genotype,
        phenotype,
        genetics_known: known,
        created_at: state.game_clock,
        strain: None,
    });
    Ok(Outcome::Converted { seed, cost })
}

fn research(
    state: &mut GameState,
    config: &GameConfig,
    item_id: EntityId,
    tier: ResearchTier,
) -> Result<Outcome, Rejection> {
    let item = state
        .harvest(item_id)
        .ok_or(Rejection::UnknownItem(item_id))?;
    if item.researched {
        return Err(Rejection::AlreadyResearched(item_id));
    }
    let cost = tier.cost(&config.prices);
    charge(state, cost)?;
    state.stats.money -= cost;
    if let Some(item) = state.harvest_mut(item_id) {
        item.researched = true;
    }
    Ok(Outcome::Researched {
        item: item_id,
        cost,
    })
}

fn crossbreed<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut R,
    first: EntityId,
    second: EntityId,
) -> Result<Outcome, Rejection> {
    let a = state.seed(first).ok_or(Rejection::UnknownSeed(first))?;
    let b = state.seed(second).ok_or(Rejection::UnknownSeed(second))?;
    let needed = if first == second { 2 } else { 1 };
    if a.quantity < needed {
        return Err(Rejection::EmptyStack(first));
    }
    if b.quantity < 1 {
        return Err(Rejection::EmptyStack(second));
    }

    let rate = config.breeding.mutation_rate;
    let genotype = breeding::crossbreed(rng, &a.genotype, &b.genotype, rate);
    let phenotype = genotype.sample_phenotype(rng);
    let generation = state.stats.crossbreeds + 1;
    let name = breeding::offspring_name(&a.name, &b.name, generation);

    state.consume_seeds(first, 1);
    state.consume_seeds(second, 1);
    state.stats.crossbreeds += 1;
    state.stats.experiments += 1;
    let seed = state.allocate_id();
    state.seeds.push(SeedStack {
        id: seed,
        name,
        quantity: 1,
        genotype,
        phenotype,
        genetics_known: false,
        created_at: state.game_clock,
        strain: None,
    });
    Ok(Outcome::Crossbred { seed })
}

fn sleep(state: &mut GameState, hours: u32) -> Outcome {
    let before = state.game_clock;
    state.game_clock = before.saturating_add(u64::from(hours) * MINUTES_PER_HOUR);
    Outcome::Slept {
        minutes: state.game_clock - before,
    }
}
