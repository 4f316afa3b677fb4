use serde::{Deserialize, Serialize};

use crate::genetics::{Genotype, Phenotype, Tier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strain {
    pub name: String,
    pub genotype: Genotype,
    pub phenotype: Phenotype,
    pub price: i64,
}

struct StrainDefinition {
    name: &'static str,
    genotype: (Tier, Tier, Tier),
    phenotype: (u8, u8, u8),
    price: i64,
}

const STARTER_STRAINS: &[StrainDefinition] = &[
    StrainDefinition {
        name: "Meadow Gold",
        genotype: (Tier::Dominant, Tier::Hybrid, Tier::Recessive),
        phenotype: (9, 6, 3),
        price: 120,
    },
    StrainDefinition {
        name: "Quickstem",
        genotype: (Tier::Recessive, Tier::Dominant, Tier::Hybrid),
        phenotype: (3, 9, 6),
        price: 100,
    },
    StrainDefinition {
        name: "Violet Haze",
        genotype: (Tier::Hybrid, Tier::Recessive, Tier::Dominant),
        phenotype: (6, 3, 9),
        price: 150,
    },
    StrainDefinition {
        name: "Ironroot",
        genotype: (Tier::Hybrid, Tier::Hybrid, Tier::Hybrid),
        phenotype: (6, 6, 6),
        price: 90,
    },
    StrainDefinition {
        name: "Sunburst Royale",
        genotype: (Tier::Dominant, Tier::Dominant, Tier::Hybrid),
        phenotype: (8, 8, 7),
        price: 400,
    },
];

pub fn starter_strains() -> Vec<Strain> {
    STARTER_STRAINS
        .iter()
        .map(|def| Strain {
            name: def.name.to_string(),
            genotype: Genotype::new(def.genotype.0, def.genotype.1, def.genotype.2),
            phenotype: Phenotype::new(def.phenotype.0, def.phenotype.1, def.phenotype.2),
            price: def.price,
        })
        .collect()
}

pub fn find<'a>(catalog: &'a [Strain], name: &str) -> Option<&'a Strain> {
    catalog
        .iter()
        .find(|strain| strain.name.eq_ignore_ascii_case(name))
}
