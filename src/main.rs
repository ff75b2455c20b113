use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use econoville::{
    commands::Command,
    engine::{EngineBuilder, EngineSettings},
    scenario::ScenarioLoader,
    snapshot::{export_history, save_world},
    tech::TechKey,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Econoville village economy simulator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/village.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the HTTP interface instead of running headless
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Write the yearly history CSV here after a headless run
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Technologies to buy before a headless run, e.g. `--unlock three_field`
    #[arg(long = "unlock", value_name = "TECH")]
    unlock: Vec<TechKey>,

    /// Save file path, written after a headless run and used by the server
    #[arg(long, default_value = "saves/village.json")]
    save: PathBuf,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    init_logging(&scenario.logging.level);

    if let Some(interval) = cli.snapshot_interval {
        scenario.snapshot_interval_ticks = interval;
    }

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
        return runtime.block_on(web::run(WebServerConfig {
            scenario,
            snapshot_dir: cli.snapshot_dir,
            save_path: cli.save,
            host: cli.host,
            port: cli.port,
        }));
    }

    let mut setup_rng = ChaCha8Rng::seed_from_u64(scenario.seed);
    let mut world = scenario.build_world(&mut setup_rng);
    let ticks = scenario.ticks(cli.ticks);
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: scenario.snapshot_interval_ticks,
        snapshot_dir: Some(cli.snapshot_dir.unwrap_or_else(|| PathBuf::from("snapshots"))),
    };
    let mut engine = EngineBuilder::new(settings).with_village_systems().build();

    for &key in &cli.unlock {
        engine
            .apply_command(&mut world, Command::UnlockTech { key })
            .with_context(|| format!("Failed to unlock {key}"))?;
    }

    let ran = engine.run(&mut world, ticks)?;
    info!(
        scenario = %scenario.name,
        ticks = ran,
        year = world.clock.year,
        pop = world.population.pop,
        deaths = world.population.total_deaths,
        victory = world.victory_reached,
        "run complete"
    );

    if let Some(path) = &cli.export_csv {
        export_history(path, &world.history)
            .with_context(|| format!("Failed to export history to {}", path.display()))?;
    }
    save_world(&cli.save, &scenario.name, &world)
        .with_context(|| format!("Failed to save to {}", cli.save.display()))?;
    Ok(())
}
