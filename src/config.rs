use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Strain};

fn default_starting_money() -> i64 {
    1_000
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_minutes_per_tick() -> u64 {
    1
}

fn default_unresearched_unit() -> i64 {
    50
}

fn default_researched_multiplier() -> i64 {
    10
}

fn default_research_basic() -> i64 {
    100
}

fn default_research_premium() -> i64 {
    250
}

fn default_seed_conversion() -> i64 {
    25
}

fn default_mutation_rate() -> f64 {
    0.10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fixed RNG seed; a fresh one is drawn per session when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_starting_money")]
    pub starting_money: i64,
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub prices: PriceConfig,
    #[serde(default)]
    pub breeding: BreedingConfig,
    #[serde(default = "catalog::starter_strains")]
    pub catalog: Vec<Strain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_minutes_per_tick")]
    pub minutes_per_tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "default_unresearched_unit")]
    pub unresearched_unit: i64,
    #[serde(default = "default_researched_multiplier")]
    pub researched_multiplier: i64,
    #[serde(default = "default_research_basic")]
    pub research_basic: i64,
    #[serde(default = "default_research_premium")]
    pub research_premium: i64,
    #[serde(default = "default_seed_conversion")]
    pub seed_conversion: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingConfig {
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            starting_money: default_starting_money(),
            tick: TickConfig::default(),
            prices: PriceConfig::default(),
            breeding: BreedingConfig::default(),
            catalog: catalog::starter_strains(),
        }
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            minutes_per_tick: default_minutes_per_tick(),
        }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            unresearched_unit: default_unresearched_unit(),
            researched_multiplier: default_researched_multiplier(),
            research_basic: default_research_basic(),
            research_premium: default_research_premium(),
            seed_conversion: default_seed_conversion(),
        }
    }
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self {
            mutation_rate: default_mutation_rate(),
        }
    }
}

impl TickConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.is_empty() {
            bail!("catalog must define at least one strain");
        }
        let mut names = HashSet::new();
        for strain in &self.catalog {
            if !names.insert(strain.name.to_ascii_lowercase()) {
                bail!("strain '{}' defined more than once", strain.name);
            }
            if !strain.phenotype.in_bounds() {
                bail!("strain '{}' has a trait score outside 1..=10", strain.name);
            }
            if strain.price < 0 {
                bail!("strain '{}' has a negative price", strain.name);
            }
        }
        let prices = [
            ("unresearched_unit", self.prices.unresearched_unit),
            ("researched_multiplier", self.prices.researched_multiplier),
            ("research_basic", self.prices.research_basic),
            ("research_premium", self.prices.research_premium),
            ("seed_conversion", self.prices.seed_conversion),
        ];
        for (name, value) in prices {
            if value < 0 {
                bail!("prices.{name} must not be negative, got {value}");
            }
        }
        if self.tick.minutes_per_tick == 0 {
            bail!("tick.minutes_per_tick must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.breeding.mutation_rate) {
            bail!(
                "mutation rate must be within [0, 1], got {}",
                self.breeding.mutation_rate
            );
        }
        Ok(())
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GameConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<GameConfig> {
        // An empty document deserializes to unit, not to an empty mapping.
        let config: GameConfig = if text.trim().is_empty() {
            GameConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }
}
