//! Per-locus inheritance with random mutation.

use rand::Rng;
use serde::Serialize;

use crate::genetics::{Genotype, Locus, Tier, TraitRange};

pub const DEFAULT_MUTATION_RATE: f64 = 0.10;

/// Each locus comes from either parent with equal odds, then independently
/// mutates to a uniformly drawn tier with probability `mutation_rate`.
pub fn crossbreed<R: Rng + ?Sized>(
    rng: &mut R,
    a: &Genotype,
    b: &Genotype,
    mutation_rate: f64,
) -> Genotype {
    let mut child = *a;
    for locus in Locus::ALL {
        let inherited = if rng.gen_bool(0.5) {
            a.tier(locus)
        } else {
            b.tier(locus)
        };
        let tier = if rng.gen_bool(mutation_rate.clamp(0.0, 1.0)) {
            Tier::ALL[rng.gen_range(0..Tier::ALL.len())]
        } else {
            inherited
        };
        child.set_tier(locus, tier);
    }
    child
}

/// Offspring name: first word of each parent plus the filial generation count.
pub fn offspring_name(a: &str, b: &str, generation: u32) -> String {
    let head = |name: &str| name.split_whitespace().next().unwrap_or("Seed").to_string();
    format!("{} × {} F{}", head(a), head(b), generation)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreedingPreview {
    #[serde(rename = "yield")]
    pub yield_range: TraitRange,
    pub speed: TraitRange,
    pub potency: TraitRange,
}

/// Score ranges an unmutated child can land in.
pub fn breeding_preview(a: &Genotype, b: &Genotype) -> BreedingPreview {
    let span = |locus: Locus| {
        a.tier(locus)
            .phenotype_range()
            .union(b.tier(locus).phenotype_range())
    };
    BreedingPreview {
        yield_range: span(Locus::Yield),
        speed: span(Locus::Speed),
        potency: span(Locus::Potency),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    const DRAWS: usize = 20_000;

    fn dominant() -> Genotype {
        Genotype::new(Tier::Dominant, Tier::Dominant, Tier::Dominant)
    }

    fn recessive() -> Genotype {
        Genotype::new(Tier::Recessive, Tier::Recessive, Tier::Recessive)
    }

    fn dominant_share(rng: &mut ChaCha8Rng, a: &Genotype, b: &Genotype) -> [f64; 3] {
        let mut counts = [0usize; 3];
        for _ in 0..DRAWS {
            let child = crossbreed(rng, a, b, DEFAULT_MUTATION_RATE);
            for (slot, locus) in Locus::ALL.iter().enumerate() {
                if child.tier(*locus) == Tier::Dominant {
                    counts[slot] += 1;
                }
            }
        }
        counts.map(|c| c as f64 / DRAWS as f64)
    }

    #[test]
    fn identical_parents_without_mutation_breed_true() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let parent = Genotype::new(Tier::Hybrid, Tier::Dominant, Tier::Recessive);
        for _ in 0..200 {
            assert_eq!(crossbreed(&mut rng, &parent, &parent, 0.0), parent);
        }
    }

    #[test]
    fn dominant_share_matches_model() {
        // 0.9 * 0.5 inherited + 0.1 * 1/3 mutated.
        let expected = 0.45 + 0.1 / 3.0;
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for share in dominant_share(&mut rng, &dominant(), &recessive()) {
            assert!((share - expected).abs() < 0.02, "share {share}");
        }
    }

    #[test]
    fn parent_order_does_not_change_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let forward = dominant_share(&mut rng, &dominant(), &recessive());
        let backward = dominant_share(&mut rng, &recessive(), &dominant());
        for (f, b) in forward.iter().zip(backward.iter()) {
            assert!((f - b).abs() < 0.02, "{f} vs {b}");
        }
    }

    #[test]
    fn full_mutation_reaches_every_tier() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let parent = dominant();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(crossbreed(&mut rng, &parent, &parent, 1.0).speed);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn preview_spans_both_parents() {
        let a = Genotype::new(Tier::Dominant, Tier::Hybrid, Tier::Recessive);
        let b = Genotype::new(Tier::Recessive, Tier::Hybrid, Tier::Recessive);
        let preview = breeding_preview(&a, &b);
        assert_eq!(preview.yield_range, TraitRange::new(2, 10));
        assert_eq!(preview.speed, TraitRange::new(5, 7));
        assert_eq!(preview.potency, TraitRange::new(2, 4));
    }

    #[test]
    fn names_use_first_words() {
        assert_eq!(
            offspring_name("Meadow Gold", "Violet Haze", 3),
            "Meadow × Violet F3"
        );
        assert_eq!(offspring_name("", "Ironroot", 1), "Seed × Ironroot F1");
    }
}
