use serde::{Deserialize, Serialize};

use crate::{config::PriceConfig, state::HarvestItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchTier {
    Basic,
    Premium,
}

impl ResearchTier {
    // Both tiers reveal the full phenotype; only the price differs.
    pub fn cost(self, prices: &PriceConfig) -> i64 {
        match self {
            ResearchTier::Basic => prices.research_basic,
            ResearchTier::Premium => prices.research_premium,
        }
    }
}

impl std::str::FromStr for ResearchTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "basic" | "cheap" => Ok(ResearchTier::Basic),
            "premium" => Ok(ResearchTier::Premium),
            other => Err(format!("unknown research tier '{other}'")),
        }
    }
}

/// Price of one unit. Unresearched goods sell at a flat rate whatever their
/// real traits are.
pub fn unit_value(item: &HarvestItem, prices: &PriceConfig) -> i64 {
    if item.researched {
        item.phenotype.yield_score as i64
            * item.phenotype.potency as i64
            * prices.researched_multiplier
    } else {
        prices.unresearched_unit
    }
}

pub fn sale_value(item: &HarvestItem, prices: &PriceConfig) -> i64 {
    unit_value(item, prices) * item.quantity as i64
}
