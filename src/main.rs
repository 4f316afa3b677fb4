use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cultivar::{
    actions::{Action, Outcome},
    breeding,
    config::{ConfigLoader, GameConfig},
    economy::{self, ResearchTier},
    engine::{Engine, EngineBuilder},
    snapshot::FileStore,
    state::EntityId,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Plant breeding and farming simulator")]
struct Cli {
    /// Save slot the game is loaded from and written back to
    #[arg(long, global = true, default_value = "cultivar_save.json")]
    save: PathBuf,

    /// Optional YAML config (prices, tick cadence, catalog)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show money, plants, seeds and harvested goods
    Status,
    /// List the strains for sale
    Catalog,
    /// Buy one seed of a catalog strain
    Buy { strain: String },
    /// Plant a seed from inventory, or buy and plant a strain directly
    Plant {
        seed: Option<u64>,
        #[arg(long, conflicts_with = "seed")]
        strain: Option<String>,
    },
    /// Harvest a fully grown plant
    Harvest { plant: u64 },
    /// Sell a whole stack of harvested goods
    Sell { item: u64 },
    /// Turn one unit of harvested goods back into a seed
    Convert { item: u64 },
    /// Pay to reveal the traits of harvested goods
    Research {
        item: u64,
        #[arg(long, default_value = "basic")]
        tier: ResearchTier,
    },
    /// Cross two seed stacks
    Crossbreed { first: u64, second: u64 },
    /// Show the trait ranges a cross could produce
    Preview { first: u64, second: u64 },
    /// Skip ahead a number of in-game hours
    Sleep { hours: u32 },
    /// Advance the clock by a number of ticks
    Tick {
        #[arg(default_value_t = 1)]
        count: u64,
    },
    /// Run the JSON action API with a real-time tick
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => GameConfig::default(),
    };
    let mut engine = EngineBuilder::new(config)
        .with_default_systems()
        .build(FileStore::new(&cli.save))?;

    let action = match cli.command {
        Command::Status => {
            print_status(&engine);
            return Ok(());
        }
        Command::Catalog => {
            for strain in &engine.config().catalog {
                println!(
                    "{:<18} {}  yield {:>2}  speed {:>2}  potency {:>2}  ${}",
                    strain.name,
                    strain.genotype,
                    strain.phenotype.yield_score,
                    strain.phenotype.speed,
                    strain.phenotype.potency,
                    strain.price
                );
            }
            return Ok(());
        }
        Command::Preview { first, second } => {
            let state = engine.state();
            let (Some(a), Some(b)) = (
                state.seed(EntityId::new(first)),
                state.seed(EntityId::new(second)),
            ) else {
                println!("Both seed stacks must exist.");
                return Ok(());
            };
            let preview = breeding::breeding_preview(&a.genotype, &b.genotype);
            println!(
                "yield {}-{}  speed {}-{}  potency {}-{}",
                preview.yield_range.min,
                preview.yield_range.max,
                preview.speed.min,
                preview.speed.max,
                preview.potency.min,
                preview.potency.max
            );
            return Ok(());
        }
        Command::Tick { count } => {
            let summary = engine.run_ticks(count)?;
            println!(
                "Clock at minute {}; {} of {} plants ready to harvest.",
                summary.game_clock, summary.ready_to_harvest, summary.live_plants
            );
            return Ok(());
        }
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new()?;
            let server = WebServerConfig { engine, host, port };
            return runtime.block_on(web::run(server));
        }
        Command::Buy { strain } => Action::BuySeed { strain },
        Command::Plant { seed, strain } => match (seed, strain) {
            (Some(seed), _) => Action::Plant {
                seed: EntityId::new(seed),
            },
            (None, Some(strain)) => Action::PlantStrain { strain },
            (None, None) => {
                println!("Name a seed id or pass --strain.");
                return Ok(());
            }
        },
        Command::Harvest { plant } => Action::Harvest {
            plant: EntityId::new(plant),
        },
        Command::Sell { item } => Action::Sell {
            item: EntityId::new(item),
        },
        Command::Convert { item } => Action::ConvertToSeed {
            item: EntityId::new(item),
        },
        Command::Research { item, tier } => Action::Research {
            item: EntityId::new(item),
            tier,
        },
        Command::Crossbreed { first, second } => Action::Crossbreed {
            first: EntityId::new(first),
            second: EntityId::new(second),
        },
        Command::Sleep { hours } => Action::Sleep { hours },
    };

    match engine.apply(&action)? {
        Ok(outcome) => println!("{}", describe(&outcome)),
        Err(rejection) => println!("Nothing happened: {rejection}."),
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::SeedBought { seed, cost } => format!("Bought a seed for ${cost} (stack {seed})."),
        Outcome::Planted { plant } => format!("Planted as plant {plant}."),
        Outcome::Harvested { item, quantity } => {
            format!("Harvested {quantity} units into item {item}.")
        }
        Outcome::Sold { credited } => format!("Sold for ${credited}."),
        Outcome::Converted { seed, cost } => format!("Converted into seed {seed} for ${cost}."),
        Outcome::Researched { item, cost } => format!("Researched item {item} for ${cost}."),
        Outcome::Crossbred { seed } => format!("New seed {seed} with unknown genetics."),
        Outcome::Slept { minutes } => format!("Slept for {} hours.", minutes / 60),
    }
}

fn print_status(engine: &Engine) {
    let state = engine.state();
    let stats = &state.stats;
    println!(
        "${}  | minute {} | harvested {} | best yield {} | best potency {} | crosses {}",
        stats.money,
        state.game_clock,
        stats.total_harvested,
        stats.best_yield,
        stats.best_potency,
        stats.crossbreeds
    );

    println!("Plants:");
    for plant in &state.plants {
        println!(
            "  [{}] {:<22} {:<10} {:>6.2}%",
            plant.id,
            plant.name,
            plant.stage.label(),
            plant.progress
        );
    }

    println!("Seeds:");
    for seed in &state.seeds {
        let genetics = if seed.genetics_known {
            format!(
                "{}  Y{} S{} P{}",
                seed.genotype,
                seed.phenotype.yield_score,
                seed.phenotype.speed,
                seed.phenotype.potency
            )
        } else {
            "genetics unknown".to_string()
        };
        println!(
            "  [{}] {:<22} x{:<3} {}",
            seed.id, seed.name, seed.quantity, genetics
        );
    }

    println!("Harvested:");
    for item in &state.harvests {
        let value = economy::sale_value(item, &engine.config().prices);
        let traits = if item.researched {
            format!("Y{} P{}", item.phenotype.yield_score, item.phenotype.potency)
        } else {
            "unresearched".to_string()
        };
        println!(
            "  [{}] {:<22} x{:<3} {:<14} worth ${}",
            item.id, item.name, item.quantity, traits, value
        );
    }
}
