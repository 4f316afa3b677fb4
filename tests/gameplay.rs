use cultivar::{
    actions::{Action, Outcome},
    config::{ConfigLoader, GameConfig},
    economy::ResearchTier,
    engine::{Engine, EngineBuilder},
    growth::GrowthStage,
    snapshot::{FileStore, MemoryStore, SaveStore},
    state::{EntityId, GameState},
};
use tempfile::tempdir;

fn config() -> GameConfig {
    ConfigLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("configs/greenhouse.yaml")
        .expect("sample config loads")
}

fn engine_with(store: impl SaveStore + 'static) -> Engine {
    EngineBuilder::new(config())
        .with_default_systems()
        .build(store)
        .expect("engine builds")
}

fn apply(engine: &mut Engine, action: Action) -> Outcome {
    engine
        .apply(&action)
        .expect("store writes succeed")
        .unwrap_or_else(|rejection| panic!("{action:?} rejected: {rejection}"))
}

fn buy(engine: &mut Engine, strain: &str) -> EntityId {
    match apply(
        engine,
        Action::BuySeed {
            strain: strain.into(),
        },
    ) {
        Outcome::SeedBought { seed, .. } => seed,
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn grow_harvest_research_and_sell() {
    let mut engine = engine_with(MemoryStore::new());
    let seed = buy(&mut engine, "Meadow Gold");
    let Outcome::Planted { plant } = apply(&mut engine, Action::Plant { seed }) else {
        panic!("planting failed");
    };

    // Speed 6: 60 minute window, harvestable from minute 48.
    engine.run_ticks(30).unwrap();
    let early = engine.apply(&Action::Harvest { plant }).unwrap();
    assert!(early.is_err());
    assert_eq!(
        engine.state().plant(plant).map(|p| p.stage),
        Some(GrowthStage::Vegetative)
    );

    engine.run_ticks(20).unwrap();
    assert_eq!(engine.summary().ready_to_harvest, 1);
    let Outcome::Harvested { item, quantity } = apply(&mut engine, Action::Harvest { plant })
    else {
        panic!("harvest failed");
    };
    assert_eq!(quantity, 9);

    // Bought strains arrive with known genetics, so goods are already researched.
    let rejected = engine
        .apply(&Action::Research {
            item,
            tier: ResearchTier::Basic,
        })
        .unwrap();
    assert!(rejected.is_err());

    let money_before = engine.state().stats.money;
    let Outcome::Sold { credited } = apply(&mut engine, Action::Sell { item }) else {
        panic!("sale failed");
    };
    assert_eq!(credited, 9 * 3 * 10 * 9);
    assert_eq!(engine.state().stats.money, money_before + credited);
    assert_eq!(engine.state().stats.total_harvested, 9);
}

#[test]
fn bred_lineage_sells_blind_until_researched() {
    let mut engine = engine_with(MemoryStore::new());
    let a = buy(&mut engine, "Violet Haze");
    let b = buy(&mut engine, "Quickstem");
    let Outcome::Crossbred { seed } = apply(
        &mut engine,
        Action::Crossbreed {
            first: a,
            second: b,
        },
    ) else {
        panic!("cross failed");
    };
    assert_eq!(engine.state().seeds.len(), 1);
    assert!(!engine.state().seed(seed).unwrap().genetics_known);
    assert_eq!(engine.state().stats.crossbreeds, 1);
    assert_eq!(engine.state().stats.experiments, 1);

    let Outcome::Planted { plant } = apply(&mut engine, Action::Plant { seed }) else {
        panic!("planting failed");
    };
    apply(&mut engine, Action::Sleep { hours: 2 });
    let Outcome::Harvested { item, quantity } = apply(&mut engine, Action::Harvest { plant })
    else {
        panic!("harvest failed");
    };
    assert!(!engine.state().harvest(item).unwrap().researched);

    apply(
        &mut engine,
        Action::Research {
            item,
            tier: ResearchTier::Premium,
        },
    );
    let phenotype = engine.state().harvest(item).unwrap().phenotype;
    let Outcome::Sold { credited } = apply(&mut engine, Action::Sell { item }) else {
        panic!("sale failed");
    };
    assert_eq!(
        credited,
        i64::from(phenotype.yield_score) * i64::from(phenotype.potency) * 10 * i64::from(quantity)
    );
}

#[test]
fn save_file_round_trips_reachable_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("save.json");

    let snapshot = {
        let mut engine = engine_with(FileStore::new(&path));
        let a = buy(&mut engine, "Ironroot");
        buy(&mut engine, "Ironroot");
        let b = buy(&mut engine, "Meadow Gold");
        apply(
            &mut engine,
            Action::Crossbreed {
                first: a,
                second: b,
            },
        );
        apply(&mut engine, Action::Plant { seed: a });
        apply(
            &mut engine,
            Action::PlantStrain {
                strain: "Quickstem".into(),
            },
        );
        engine.run_ticks(17).unwrap();
        engine.state().clone()
    };

    let resumed = engine_with(FileStore::new(&path));
    assert_eq!(resumed.state(), &snapshot);

    let blob = snapshot.to_blob().unwrap();
    assert_eq!(GameState::from_blob(&blob, 0), snapshot);
}

#[test]
fn corrupt_save_starts_fresh() {
    let store = MemoryStore::with_blob("{ this is not json");
    let engine = engine_with(store);
    assert_eq!(engine.state(), &GameState::new(1_000));
}

#[test]
fn clock_moves_by_ticks_and_sleep() {
    let mut engine = engine_with(MemoryStore::new());
    engine.tick().unwrap();
    engine.run_ticks(4).unwrap();
    apply(&mut engine, Action::Sleep { hours: 3 });
    assert_eq!(engine.state().game_clock, 5 + 180);
}
