use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use biosim::{scenario::ScenarioLoader, Species};

#[derive(Debug, Parser)]
#[command(author, version, about = "BioSim island ecosystem runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/small_island.yaml")]
    scenario: PathBuf,

    /// Override year count (uses scenario default when omitted)
    #[arg(long)]
    years: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. `debug` or `biosim::island=trace`
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(cli_level: Option<&str>, scenario_level: &str) {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(scenario_level)),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    init_logging(cli.log_level.as_deref(), &scenario.logging.level);

    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    let years = scenario.years(cli.years);
    let mut engine = scenario
        .build_engine()
        .with_context(|| format!("Failed to set up scenario '{}'", scenario.name))?;

    engine.run_with_hook(years, |snapshot| {
        info!(
            year = snapshot.year,
            herbivores = snapshot.per_species.herbivores,
            carnivores = snapshot.per_species.carnivores,
            "annual summary"
        );
    })?;

    let snapshot = engine.snapshot()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "Scenario '{}' completed for {} years. Herbivores: {}, Carnivores: {}",
            scenario.name,
            years,
            snapshot.per_species.get(Species::Herbivore),
            snapshot.per_species.get(Species::Carnivore)
        );
    }
    Ok(())
}
