use blackjack_sim::prelude::*;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "blackjack_sim",
    about = "Simulate card counting strategies over many independent blackjack sessions"
)]
struct Args {
    /// JSON file with a `simulator` section and a list of `strategies`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sessions per strategy, overrides the config file
    #[arg(short, long)]
    sessions: Option<u32>,

    /// Maximum rounds per session, overrides the config file
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Base seed, session i of every strategy is shuffled with seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Write the summaries as JSON instead of text tables
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    simulator: BlackjackSimulatorConfig,
    strategies: Vec<StrategyConfig>,
}

/// Hi-Lo, Hi-Opt II and Zen Count with deviations, plus Hi-Lo played by basic strategy alone.
fn default_strategies() -> Vec<StrategyConfig> {
    let hi_lo = StrategyConfig::default();
    vec![
        StrategyConfig {
            label: "HiLo basic strategy".to_string(),
            use_deviations: false,
            ..hi_lo.clone()
        },
        hi_lo.clone(),
        StrategyConfig {
            label: "HiOptII".to_string(),
            count_system: "HiOptII".to_string(),
            ..hi_lo.clone()
        },
        StrategyConfig {
            label: "Zen Count".to_string(),
            count_system: "Zen Count".to_string(),
            ..hi_lo
        },
    ]
}

fn run(args: Args) -> Result<(), SimulationError> {
    let file = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<ConfigFile>(&text)?
        }
        None => ConfigFile::default(),
    };

    let mut builder = BlackjackSimulatorConfig::new();
    builder
        .num_sessions(args.sessions.unwrap_or(file.simulator.num_sessions))
        .rounds_per_session(args.rounds.unwrap_or(file.simulator.rounds_per_session))
        .seed(args.seed.unwrap_or(file.simulator.seed))
        .silent(file.simulator.silent)
        .game(file.simulator.game);
    let config = builder.build();

    let strategies = if file.strategies.is_empty() {
        default_strategies()
    } else {
        file.strategies
    };

    let mut simulator_builder = MulStrategyBlackjackSimulator::new(config);
    for strategy in strategies {
        simulator_builder.simulation(strategy);
    }
    let simulator = simulator_builder.build()?;
    log::info!(
        "running {} strategies, {} sessions of up to {} rounds each",
        simulator.num_simulations(),
        config.num_sessions,
        config.rounds_per_session
    );

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    simulator.run(std::io::stdout(), format)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
