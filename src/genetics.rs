//! Three-locus genetics: allele-pair tokens, tiers and sampled phenotypes.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneticsError {
    #[error("'{token}' is not a valid {locus} allele pair")]
    UnknownToken { locus: Locus, token: String },
    #[error("genotype '{0}' must have exactly three allele pairs")]
    MalformedGenotype(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locus {
    Yield,
    Speed,
    Potency,
}

impl Locus {
    pub const ALL: [Locus; 3] = [Locus::Yield, Locus::Speed, Locus::Potency];

    fn letter(self) -> char {
        match self {
            Locus::Yield => 'y',
            Locus::Speed => 's',
            Locus::Potency => 'p',
        }
    }

    /// Canonical allele-pair token for a tier at this locus, e.g. `Ss`.
    pub fn token(self, tier: Tier) -> String {
        let lower = self.letter();
        let upper = lower.to_ascii_uppercase();
        match tier {
            Tier::Dominant => format!("{upper}{upper}"),
            Tier::Hybrid => format!("{upper}{lower}"),
            Tier::Recessive => format!("{lower}{lower}"),
        }
    }

    /// Classifies an allele-pair token. Case decides the tier; the letter
    /// must belong to this locus.
    pub fn tier_of(self, token: &str) -> Option<Tier> {
        let mut chars = token.chars();
        let (a, b) = (chars.next()?, chars.next()?);
        if chars.next().is_some() {
            return None;
        }
        let letter = self.letter();
        if a.to_ascii_lowercase() != letter || b.to_ascii_lowercase() != letter {
            return None;
        }
        match (a.is_ascii_uppercase(), b.is_ascii_uppercase()) {
            (true, true) => Some(Tier::Dominant),
            (false, false) => Some(Tier::Recessive),
            _ => Some(Tier::Hybrid),
        }
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Locus::Yield => "yield",
            Locus::Speed => "speed",
            Locus::Potency => "potency",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Dominant,
    Hybrid,
    Recessive,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Dominant, Tier::Hybrid, Tier::Recessive];

    pub fn phenotype_range(self) -> TraitRange {
        match self {
            Tier::Dominant => TraitRange::new(8, 10),
            Tier::Hybrid => TraitRange::new(5, 7),
            Tier::Recessive => TraitRange::new(2, 4),
        }
    }

    /// Re-rolls on every call; phenotypes are fixed by freezing the result,
    /// not by the genotype itself.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        let range = self.phenotype_range();
        rng.gen_range(range.min..=range.max)
    }
}

/// Closed interval of trait scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRange {
    pub min: u8,
    pub max: u8,
}

impl TraitRange {
    pub const FULL: TraitRange = TraitRange {
        min: MIN_SCORE,
        max: MAX_SCORE,
    };

    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn union(self, other: TraitRange) -> TraitRange {
        TraitRange::new(self.min.min(other.min), self.max.max(other.max))
    }
}

/// Range for a raw token; anything unrecognized spans the whole scale.
pub fn phenotype_range(locus: Locus, token: &str) -> TraitRange {
    locus
        .tier_of(token)
        .map(Tier::phenotype_range)
        .unwrap_or(TraitRange::FULL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GenotypeTokens", into = "GenotypeTokens")]
pub struct Genotype {
    pub yield_tier: Tier,
    pub speed: Tier,
    pub potency: Tier,
}

impl Genotype {
    pub fn new(yield_tier: Tier, speed: Tier, potency: Tier) -> Self {
        Self {
            yield_tier,
            speed,
            potency,
        }
    }

    /// Parses the whitespace-separated form, e.g. `YY Ss pp`.
    pub fn parse(text: &str) -> Result<Self, GeneticsError> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let [y, s, p] = parts.as_slice() else {
            return Err(GeneticsError::MalformedGenotype(text.to_string()));
        };
        GenotypeTokens {
            yield_token: y.to_string(),
            speed: s.to_string(),
            potency: p.to_string(),
        }
        .try_into()
    }

    pub fn tier(&self, locus: Locus) -> Tier {
        match locus {
            Locus::Yield => self.yield_tier,
            Locus::Speed => self.speed,
            Locus::Potency => self.potency,
        }
    }

    pub fn set_tier(&mut self, locus: Locus, tier: Tier) {
        match locus {
            Locus::Yield => self.yield_tier = tier,
            Locus::Speed => self.speed = tier,
            Locus::Potency => self.potency = tier,
        }
    }

    pub fn sample_phenotype<R: Rng + ?Sized>(&self, rng: &mut R) -> Phenotype {
        Phenotype {
            yield_score: self.yield_tier.sample(rng),
            speed: self.speed.sample(rng),
            potency: self.potency.sample(rng),
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            Locus::Yield.token(self.yield_tier),
            Locus::Speed.token(self.speed),
            Locus::Potency.token(self.potency)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GenotypeTokens {
    #[serde(rename = "yield")]
    yield_token: String,
    speed: String,
    potency: String,
}

impl TryFrom<GenotypeTokens> for Genotype {
    type Error = GeneticsError;

    fn try_from(tokens: GenotypeTokens) -> Result<Self, Self::Error> {
        let classify = |locus: Locus, token: &str| {
            locus
                .tier_of(token)
                .ok_or_else(|| GeneticsError::UnknownToken {
                    locus,
                    token: token.to_string(),
                })
        };
        Ok(Genotype {
            yield_tier: classify(Locus::Yield, &tokens.yield_token)?,
            speed: classify(Locus::Speed, &tokens.speed)?,
            potency: classify(Locus::Potency, &tokens.potency)?,
        })
    }
}

impl From<Genotype> for GenotypeTokens {
    fn from(genotype: Genotype) -> Self {
        Self {
            yield_token: Locus::Yield.token(genotype.yield_tier),
            speed: Locus::Speed.token(genotype.speed),
            potency: Locus::Potency.token(genotype.potency),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phenotype {
    #[serde(rename = "yield")]
    pub yield_score: u8,
    pub speed: u8,
    pub potency: u8,
}

impl Phenotype {
    pub fn new(yield_score: u8, speed: u8, potency: u8) -> Self {
        Self {
            yield_score,
            speed,
            potency,
        }
    }

    pub fn score(&self, locus: Locus) -> u8 {
        match locus {
            Locus::Yield => self.yield_score,
            Locus::Speed => self.speed,
            Locus::Potency => self.potency,
        }
    }

    pub fn in_bounds(&self) -> bool {
        Locus::ALL
            .iter()
            .all(|locus| TraitRange::FULL.contains(self.score(*locus)))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn samples_stay_inside_tier_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for tier in Tier::ALL {
            let range = tier.phenotype_range();
            for _ in 0..1000 {
                let value = tier.sample(&mut rng);
                assert!(range.contains(value), "{tier:?} sampled {value}");
            }
        }
    }

    #[test]
    fn samples_cover_whole_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = [false; 11];
        for _ in 0..300 {
            seen[Tier::Hybrid.sample(&mut rng) as usize] = true;
        }
        assert!(seen[5] && seen[6] && seen[7]);
    }

    #[test]
    fn tokens_classify_by_case() {
        assert_eq!(Locus::Yield.tier_of("YY"), Some(Tier::Dominant));
        assert_eq!(Locus::Yield.tier_of("Yy"), Some(Tier::Hybrid));
        assert_eq!(Locus::Yield.tier_of("yY"), Some(Tier::Hybrid));
        assert_eq!(Locus::Yield.tier_of("yy"), Some(Tier::Recessive));
        assert_eq!(Locus::Speed.tier_of("YY"), None);
        assert_eq!(Locus::Potency.tier_of("PPP"), None);
        assert_eq!(Locus::Potency.tier_of("P"), None);
    }

    #[test]
    fn unknown_token_gets_full_range() {
        assert_eq!(phenotype_range(Locus::Speed, "??"), TraitRange::new(1, 10));
        assert_eq!(phenotype_range(Locus::Speed, "Ss"), TraitRange::new(5, 7));
    }

    #[test]
    fn genotype_parse_and_display_agree() {
        let genotype = Genotype::parse("YY Ss pp").unwrap();
        assert_eq!(
            genotype,
            Genotype::new(Tier::Dominant, Tier::Hybrid, Tier::Recessive)
        );
        assert_eq!(genotype.to_string(), "YY Ss pp");
        assert!(Genotype::parse("YY Ss").is_err());
        assert!(Genotype::parse("YY Ss qq").is_err());
    }

    #[test]
    fn genotype_serializes_as_tokens() {
        let genotype = Genotype::new(Tier::Hybrid, Tier::Dominant, Tier::Recessive);
        let json = serde_json::to_value(genotype).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"yield": "Yy", "speed": "SS", "potency": "pp"})
        );
        let bad = serde_json::json!({"yield": "Yy", "speed": "XX", "potency": "pp"});
        assert!(serde_json::from_value::<Genotype>(bad).is_err());
    }

    #[test]
    fn sampled_phenotype_follows_each_locus() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let genotype = Genotype::new(Tier::Dominant, Tier::Recessive, Tier::Hybrid);
        for _ in 0..100 {
            let phenotype = genotype.sample_phenotype(&mut rng);
            assert!((8..=10).contains(&phenotype.yield_score));
            assert!((2..=4).contains(&phenotype.speed));
            assert!((5..=7).contains(&phenotype.potency));
        }
    }
}
