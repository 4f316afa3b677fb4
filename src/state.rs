//! The game aggregate: every collection, the stats record and the game clock.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::genetics::{Genotype, Phenotype};
use crate::growth::GrowthStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: EntityId,
    pub name: String,
    pub stage: GrowthStage,
    pub progress: f64,
    pub genotype: Genotype,
    pub phenotype: Phenotype,
    pub planted_at: u64,
    #[serde(default)]
    pub genetics_known: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStack {
    pub id: EntityId,
    pub name: String,
    pub quantity: u32,
    pub genotype: Genotype,
    pub phenotype: Phenotype,
    pub genetics_known: bool,
    pub created_at: u64,
    /// Catalog strain this stack was bought as; bred and converted seeds have none.
    #[serde(default)]
    pub strain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestItem {
    pub id: EntityId,
    pub name: String,
    pub quantity: u32,
    pub genotype: Genotype,
    pub phenotype: Phenotype,
    pub researched: bool,
    pub harvested_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub money: i64,
    #[serde(default)]
    pub total_harvested: u64,
    #[serde(default)]
    pub best_yield: u8,
    #[serde(default)]
    pub best_potency: u8,
    #[serde(default)]
    pub experiments: u32,
    #[serde(default)]
    pub crossbreeds: u32,
}

impl GameStats {
    pub fn with_money(money: i64) -> Self {
        Self {
            money,
            total_harvested: 0,
            best_yield: 0,
            best_potency: 0,
            experiments: 0,
            crossbreeds: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub plants: Vec<Plant>,
    pub seeds: Vec<SeedStack>,
    pub harvests: Vec<HarvestItem>,
    pub stats: GameStats,
    pub game_clock: u64,
    pub next_id: u64,
}

impl GameState {
    pub fn new(starting_money: i64) -> Self {
        Self {
            plants: Vec::new(),
            seeds: Vec::new(),
            harvests: Vec::new(),
            stats: GameStats::with_money(starting_money),
            game_clock: 0,
            next_id: 1,
        }
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn plant(&self, id: EntityId) -> Option<&Plant> {
        self.plants.iter().find(|plant| plant.id == id)
    }

    pub fn seed(&self, id: EntityId) -> Option<&SeedStack> {
        self.seeds.iter().find(|seed| seed.id == id)
    }

    pub fn harvest(&self, id: EntityId) -> Option<&HarvestItem> {
        self.harvests.iter().find(|item| item.id == id)
    }

    pub fn harvest_mut(&mut self, id: EntityId) -> Option<&mut HarvestItem> {
        self.harvests.iter_mut().find(|item| item.id == id)
    }

    /// Takes `count` units off a seed stack, dropping the stack once empty.
    /// Callers check the quantity first.
    pub(crate) fn consume_seeds(&mut self, id: EntityId, count: u32) {
        if let Some(stack) = self.seeds.iter_mut().find(|seed| seed.id == id) {
            stack.quantity = stack.quantity.saturating_sub(count);
        }
        self.seeds.retain(|seed| seed.quantity > 0);
    }

    pub(crate) fn consume_harvest(&mut self, id: EntityId, count: u32) {
        if let Some(item) = self.harvest_mut(id) {
            item.quantity = item.quantity.saturating_sub(count);
        }
        self.harvests.retain(|item| item.quantity > 0);
    }

    pub fn ready_to_harvest(&self) -> usize {
        self.plants
            .iter()
            .filter(|plant| plant.stage == GrowthStage::Harvest)
            .count()
    }

    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Decodes a persisted snapshot field by field. Anything missing or
    /// malformed falls back to its starting value instead of failing the load.
    pub fn from_blob(blob: &str, starting_money: i64) -> Self {
        let fresh = Self::new(starting_money);
        let root = match serde_json::from_str::<Value>(blob) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("snapshot is not a JSON object; starting fresh");
                return fresh;
            }
            Err(err) => {
                warn!(%err, "snapshot is not valid JSON; starting fresh");
                return fresh;
            }
        };

        let mut state = Self {
            plants: field(&root, "plants", fresh.plants),
            seeds: field(&root, "seeds", fresh.seeds),
            harvests: field(&root, "harvests", fresh.harvests),
            stats: field(&root, "stats", fresh.stats),
            game_clock: field(&root, "game_clock", fresh.game_clock),
            next_id: field(&root, "next_id", fresh.next_id),
        };
        // Ids of pruned stacks count too, so a loaded save never reissues one.
        state.next_id = state.next_id.max(state.max_id() + 1);
        state.seeds.retain(|seed| seed.quantity > 0);
        state.harvests.retain(|item| item.quantity > 0);
        state
    }

    fn max_id(&self) -> u64 {
        let plants = self.plants.iter().map(|p| p.id.raw());
        let seeds = self.seeds.iter().map(|s| s.id.raw());
        let harvests = self.harvests.iter().map(|h| h.id.raw());
        plants.chain(seeds).chain(harvests).max().unwrap_or(0)
    }
}

fn field<T: DeserializeOwned>(
    root: &serde_json::Map<String, Value>,
    key: &str,
    fallback: T,
) -> T {
    match root.get(key) {
        None | Some(Value::Null) => fallback,
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(field = key, %err, "dropping malformed snapshot field");
                fallback
            }
        },
    }
}
