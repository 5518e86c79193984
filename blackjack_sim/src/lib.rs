pub mod write;

use blackjack_lib::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::io::Write;
use std::iter::FromIterator;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
pub use write::OutputFormat;

pub mod prelude {
    pub use super::{
        BlackjackSimulator, BlackjackSimulatorConfig, BlackjackSimulatorConfigBuilder,
        MulStrategyBlackjackSimulator, MulStrategyBlackjackSimulatorBuilder, OutputFormat,
        SimulationError, SimulationSummary, StrategyConfig,
    };
}

/// Errors raised while driving simulations.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("game error: {0}")]
    Game(#[from] BlackjackGameError),
    #[error("failed to send a summary to the writer: {0}")]
    Sending(String),
    #[error("failed to write summaries: {0}")]
    Write(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("simulation thread for {0} panicked")]
    ThreadPanicked(String),
}

/// Simple struct for recording all of the interesting data points accumulated during a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub label: String,
    pub sessions: u32,
    pub rounds: u32,
    pub wins: u32,
    pub pushes: u32,
    pub losses: u32,
    pub player_blackjacks: u32,
    pub busts: u32,
    pub doubles: u32,
    pub insurance_won: u32,
    pub insurance_lost: u32,
    pub early_endings: u32,
    pub voided_rounds: u32,
    pub winnings: f64,
}

impl SimulationSummary {
    pub fn new<S: Into<String>>(label: S) -> Self {
        SimulationSummary {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Adds the tallies of a single player, `winnings` is its net change in bankroll.
    pub fn record_player(&mut self, stats: &PlayerStats, winnings: f64) {
        self.rounds += stats.rounds;
        self.wins += stats.wins;
        self.pushes += stats.pushes;
        self.losses += stats.losses;
        self.player_blackjacks += stats.blackjacks;
        self.busts += stats.busts;
        self.doubles += stats.doubles;
        self.insurance_won += stats.insurance_won;
        self.insurance_lost += stats.insurance_lost;
        self.winnings += winnings;
    }

    /// Folds another summary for the same strategy into this one.
    pub fn merge(&mut self, other: &SimulationSummary) {
        self.sessions += other.sessions;
        self.rounds += other.rounds;
        self.wins += other.wins;
        self.pushes += other.pushes;
        self.losses += other.losses;
        self.player_blackjacks += other.player_blackjacks;
        self.busts += other.busts;
        self.doubles += other.doubles;
        self.insurance_won += other.insurance_won;
        self.insurance_lost += other.insurance_lost;
        self.early_endings += other.early_endings;
        self.voided_rounds += other.voided_rounds;
        self.winnings += other.winnings;
    }

    fn ratio(&self, n: u32) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            n as f64 / self.rounds as f64
        }
    }

    /// Average net winnings per settled round.
    pub fn winnings_per_round(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.winnings / self.rounds as f64
        }
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        write!(
            f,
            "{}{}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n",
            "strategy: ",
            self.label,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "total hands played",
            self.rounds,
            "winnings",
            self.winnings,
            "number of player blackjacks",
            self.player_blackjacks,
            "number of busts",
            self.busts,
            "number of doubles",
            self.doubles,
            "insurance won / lost",
            format!("{} / {}", self.insurance_won, self.insurance_lost),
            "number of early endings",
            self.early_endings,
            "number of voided rounds",
            self.voided_rounds,
            "win percentage",
            self.ratio(self.wins),
            "push percentage",
            self.ratio(self.pushes),
            "loss percentage",
            self.ratio(self.losses),
            "average winnings per hand",
            self.winnings_per_round()
        )
    }
}

/// How one strategy plays and bets. Every session of the strategy seats a single player built
/// from this description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub label: String,
    /// Name of a registered counting system, see `CountTable::names`.
    pub count_system: String,
    pub use_deviations: bool,
    pub bankroll: f64,
    pub min_bet: f64,
    pub margin: f64,
    pub max_units: u32,
    pub splits: bool,
}

impl StrategyConfig {
    pub fn count_table(&self) -> Result<CountTable, SimulationError> {
        CountTable::by_name(&self.count_system).ok_or_else(|| {
            SimulationError::Config(format!(
                "unknown counting system '{}', available: {}",
                self.count_system,
                CountTable::names().join(", ")
            ))
        })
    }

    pub fn player_strategy(&self) -> Result<PlayerStrategy, SimulationError> {
        let basic = if self.splits {
            BasicStrategy::new()
        } else {
            BasicStrategy::without_splits()
        };
        let deviations = if self.use_deviations {
            DeviationTable::illustrious_18()
        } else {
            DeviationTable::new()
        };
        let bet_ramp = BetRamp::margin(self.min_bet, self.margin, self.max_units)?;
        Ok(PlayerStrategy::new(basic, deviations, bet_ramp))
    }
}

impl Default for StrategyConfig {
    /// Hi-Lo with the Illustrious 18 and a margin ramp of 3, betting 5 to 60.
    fn default() -> Self {
        StrategyConfig {
            label: "HiLo".to_string(),
            count_system: "HiLo".to_string(),
            use_deviations: true,
            bankroll: 500.0,
            min_bet: 5.0,
            margin: 3.0,
            max_units: 4,
            splits: false,
        }
    }
}

/// Struct for running a number of independent sessions of a single strategy.
/// Session `i` deals from a shoe shuffled with seed `seed + i`, so every run is reproducible.
pub struct BlackjackSimulator {
    label: String,
    config: BlackjackSimulatorConfig,
    game_config: GameConfig,
    strategy: Arc<PlayerStrategy>,
    use_deviations: bool,
    starting_bankroll: f64,
    summary: SimulationSummary,
}

impl BlackjackSimulator {
    pub fn new(
        config: BlackjackSimulatorConfig,
        strategy: &StrategyConfig,
    ) -> Result<Self, SimulationError> {
        let mut game_config = config.game;
        game_config.count_table = strategy.count_table()?;
        game_config.validate()?;
        if !(strategy.bankroll > 0.0) {
            return Err(SimulationError::Config(format!(
                "{}: starting bankroll must be positive",
                strategy.label
            )));
        }
        Ok(BlackjackSimulator {
            label: strategy.label.clone(),
            config,
            game_config,
            strategy: Arc::new(strategy.player_strategy()?),
            use_deviations: strategy.use_deviations,
            starting_bankroll: strategy.bankroll,
            summary: SimulationSummary::new(strategy.label.clone()),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Plays one session and returns its summary, which is also folded into the running total.
    /// A session ends early once the bankroll can no longer cover the minimum bet.
    pub fn run_session(&mut self, session: u32) -> Result<SimulationSummary, SimulationError> {
        let seed = self.config.seed.wrapping_add(session as u64);
        let mut game = Game::with_seed(self.game_config, seed)?;
        game.shuffle_shoe()?;
        game.add_player(Player::new(
            self.starting_bankroll,
            Arc::clone(&self.strategy),
            self.use_deviations,
        ))?;

        let mut summary = SimulationSummary::new(self.label.clone());
        summary.sessions = 1;
        for _ in 0..self.config.rounds_per_session {
            game.reseat_resolved_players()?;
            let player = game.get_player_at(0)?;
            if player.bankroll() < player.min_bet() {
                summary.early_endings += 1;
                break;
            }
            match game.play_round() {
                Ok(()) => {}
                Err(BlackjackGameError::NotImplemented(feature)) => {
                    log::warn!("{}: round voided, {} is not supported", self.label, feature);
                    summary.voided_rounds += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        game.reseat_resolved_players()?;

        let player = game.remove_player(0)?;
        summary.record_player(player.stats(), player.bankroll() - self.starting_bankroll);
        log::debug!(
            "{}: session {} finished with bankroll {:.2}",
            self.label,
            session,
            player.bankroll()
        );
        if !self.config.silent {
            println!("session #{}\n{}", session + 1, summary);
        }
        self.summary.merge(&summary);
        Ok(summary)
    }

    /// Runs every configured session.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        for session in 0..self.config.num_sessions {
            self.run_session(session)?;
        }
        Ok(())
    }

    /// Totals over every session run since the last reset.
    pub fn summary(&self) -> &SimulationSummary {
        &self.summary
    }

    pub fn reset(&mut self) {
        self.summary = SimulationSummary::new(self.label.clone());
    }
}

/// Messages sent from a simulation thread to the writer thread.
#[derive(Debug)]
pub enum SummaryMessage {
    Session { id: usize, summary: SimulationSummary },
    Finished { id: usize },
}

/// This struct is for testing multiple strategies at once, each strategy is simulated on its own
/// thread with the same table configuration.
pub struct MulStrategyBlackjackSimulator {
    simulations: Vec<BlackjackSimulator>,
    pub config: BlackjackSimulatorConfig,
}

impl MulStrategyBlackjackSimulator {
    /// Method that returns a new `MulStrategyBlackjackSimulatorBuilder` object.
    pub fn new(config: BlackjackSimulatorConfig) -> MulStrategyBlackjackSimulatorBuilder {
        MulStrategyBlackjackSimulatorBuilder {
            strategies: vec![],
            config,
        }
    }

    pub fn num_simulations(&self) -> usize {
        self.simulations.len()
    }

    /// Runs every strategy on a new thread. Session summaries are sent to a writer thread which
    /// totals them per strategy and writes the totals to `writer` in the order the strategies
    /// were added. Returns the totals in the same order. The simulator is consumed, fails with
    /// `Config` if no strategy was added.
    pub fn run<W: Write + Send + 'static>(
        self,
        writer: W,
        format: OutputFormat,
    ) -> Result<Vec<SimulationSummary>, SimulationError> {
        if self.simulations.is_empty() {
            return Err(SimulationError::Config(
                "no strategies to simulate".to_string(),
            ));
        }
        let (sender, receiver) = mpsc::channel::<SummaryMessage>();
        let ids = HashSet::from_iter(1..=self.simulations.len());
        let write_handle =
            thread::spawn(move || write::write_summaries(receiver, ids, writer, format));

        let mut handles = vec![];
        let num_sessions = self.config.num_sessions;
        for (i, mut simulation) in self.simulations.into_iter().enumerate() {
            let id = i + 1;
            let sender = sender.clone();
            let label = simulation.label().to_string();
            let handle = thread::spawn(move || -> Result<(), SimulationError> {
                for session in 0..num_sessions {
                    let summary = simulation.run_session(session)?;
                    sender
                        .send(SummaryMessage::Session { id, summary })
                        .map_err(|e| SimulationError::Sending(e.to_string()))?;
                }
                sender
                    .send(SummaryMessage::Finished { id })
                    .map_err(|e| SimulationError::Sending(e.to_string()))
            });
            handles.push((label, handle));
        }
        // the writer stops once every simulation thread has dropped its sender
        drop(sender);

        let mut first_error = None;
        for (label, handle) in handles {
            let result = handle
                .join()
                .unwrap_or_else(|_| Err(SimulationError::ThreadPanicked(label.clone())));
            if let Err(e) = result {
                log::error!("simulation {} failed: {}", label, e);
                first_error.get_or_insert(e);
            }
        }

        let summaries = write_handle
            .join()
            .unwrap_or_else(|_| Err(SimulationError::ThreadPanicked("writer".to_string())))?;
        match first_error {
            Some(e) => Err(e),
            None => Ok(summaries),
        }
    }
}

/// Struct for building a `MulStrategyBlackjackSimulator` object
pub struct MulStrategyBlackjackSimulatorBuilder {
    strategies: Vec<StrategyConfig>,
    config: BlackjackSimulatorConfig,
}

impl MulStrategyBlackjackSimulatorBuilder {
    /// Adds a strategy, the table and session settings come from the simulator's configuration.
    pub fn simulation(&mut self, strategy: StrategyConfig) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    /// Builds a `MulStrategyBlackjackSimulator`, failing if any strategy is misconfigured.
    pub fn build(&mut self) -> Result<MulStrategyBlackjackSimulator, SimulationError> {
        let simulations = self
            .strategies
            .iter()
            .map(|s| BlackjackSimulator::new(self.config, s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MulStrategyBlackjackSimulator {
            simulations,
            config: self.config,
        })
    }
}

/// Struct for configuring how strategies are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackSimulatorConfig {
    pub num_sessions: u32,
    pub rounds_per_session: u32,
    pub seed: u64,
    pub silent: bool,
    pub game: GameConfig,
}

impl BlackjackSimulatorConfig {
    /// Associated method for returning a new `BlackjackSimulatorConfigBuilder` object.
    pub fn new() -> BlackjackSimulatorConfigBuilder {
        BlackjackSimulatorConfigBuilder::default()
    }
}

impl Default for BlackjackSimulatorConfig {
    /// 100 sessions of 400 rounds each at a default table, seeded from 0.
    fn default() -> Self {
        BlackjackSimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `BlackjackSimulatorConfig`
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackjackSimulatorConfigBuilder {
    num_sessions: Option<u32>,
    rounds_per_session: Option<u32>,
    seed: Option<u64>,
    silent: Option<bool>,
    game: Option<GameConfig>,
}

impl BlackjackSimulatorConfigBuilder {
    /// Method for setting the number of independent sessions run per strategy.
    pub fn num_sessions(&mut self, n: u32) -> &mut Self {
        self.num_sessions = Some(n);
        self
    }

    /// Method for setting the maximum number of rounds played in each session.
    pub fn rounds_per_session(&mut self, rounds: u32) -> &mut Self {
        self.rounds_per_session = Some(rounds);
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// If set to false every session's summary is printed as it finishes.
    pub fn silent(&mut self, silent: bool) -> &mut Self {
        self.silent = Some(silent);
        self
    }

    /// Method for setting the table rules, the count table of each strategy overrides the one given here.
    pub fn game(&mut self, game: GameConfig) -> &mut Self {
        self.game = Some(game);
        self
    }

    pub fn build(&mut self) -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig {
            num_sessions: self.num_sessions.unwrap_or(100),
            rounds_per_session: self.rounds_per_session.unwrap_or(400),
            seed: self.seed.unwrap_or(0),
            silent: self.silent.unwrap_or(true),
            game: self.game.unwrap_or_default(),
        }
    }
}
