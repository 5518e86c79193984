use crate::shoe::CARDS_PER_DECK;
use crate::{BlackjackGameError, CountTable};
use serde::{Deserialize, Serialize};

/// Table rules for a game. Immutable once built, every `Game` owns its own copy so independent
/// games never share configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_decks: usize,
    /// Reshuffle before the next round once fewer cards than this remain.
    pub cut_threshold: usize,
    pub blackjack_payout: f64,
    pub count_table: CountTable,
    /// Players using deviations take insurance at or above this true count.
    pub insurance_index: f64,
    pub dealer_hits_soft_17: bool,
}

impl GameConfig {
    /// Returns a new `GameConfigBuilder`, any value left unset takes its default.
    pub fn builder() -> GameConfigBuilder {
        GameConfigBuilder::default()
    }

    /// Checks that the rules describe a playable game.
    pub fn validate(&self) -> Result<(), BlackjackGameError> {
        if self.num_decks == 0 {
            return Err(BlackjackGameError::invalid_config(
                "a shoe needs at least one deck",
            ));
        }
        if self.cut_threshold > self.num_decks * CARDS_PER_DECK {
            return Err(BlackjackGameError::invalid_config(format!(
                "cut threshold {} exceeds the {} cards in a {} deck shoe",
                self.cut_threshold,
                self.num_decks * CARDS_PER_DECK,
                self.num_decks
            )));
        }
        if !(self.blackjack_payout > 0.0) {
            return Err(BlackjackGameError::invalid_config(format!(
                "blackjack payout must be positive, got {}",
                self.blackjack_payout
            )));
        }
        self.count_table.validate()
    }
}

impl Default for GameConfig {
    /// Six decks cut at 260 cards, 3:2 blackjacks, Hi-Lo, insurance at +3, dealer stands on soft 17.
    fn default() -> Self {
        GameConfig {
            num_decks: 6,
            cut_threshold: 260,
            blackjack_payout: 1.5,
            count_table: CountTable::hi_lo(),
            insurance_index: 3.0,
            dealer_hits_soft_17: false,
        }
    }
}

/// Struct to implement the builder pattern for `GameConfig`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameConfigBuilder {
    num_decks: Option<usize>,
    cut_threshold: Option<usize>,
    blackjack_payout: Option<f64>,
    count_table: Option<CountTable>,
    insurance_index: Option<f64>,
    dealer_hits_soft_17: Option<bool>,
}

impl GameConfigBuilder {
    pub fn num_decks(&mut self, decks: usize) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    pub fn cut_threshold(&mut self, cards: usize) -> &mut Self {
        self.cut_threshold = Some(cards);
        self
    }

    pub fn blackjack_payout(&mut self, payout: f64) -> &mut Self {
        self.blackjack_payout = Some(payout);
        self
    }

    pub fn count_table(&mut self, table: CountTable) -> &mut Self {
        self.count_table = Some(table);
        self
    }

    pub fn insurance_index(&mut self, index: f64) -> &mut Self {
        self.insurance_index = Some(index);
        self
    }

    /// Sets whether the dealer must hit soft 17, default is false.
    pub fn dealer_hits_soft_17(&mut self, hits: bool) -> &mut Self {
        self.dealer_hits_soft_17 = Some(hits);
        self
    }

    /// Builds and validates a `GameConfig`.
    pub fn build(&mut self) -> Result<GameConfig, BlackjackGameError> {
        let default = GameConfig::default();
        let config = GameConfig {
            num_decks: self.num_decks.unwrap_or(default.num_decks),
            cut_threshold: self.cut_threshold.unwrap_or(default.cut_threshold),
            blackjack_payout: self.blackjack_payout.unwrap_or(default.blackjack_payout),
            count_table: self.count_table.unwrap_or(default.count_table),
            insurance_index: self.insurance_index.unwrap_or(default.insurance_index),
            dealer_hits_soft_17: self
                .dealer_hits_soft_17
                .unwrap_or(default.dealer_hits_soft_17),
        };
        config.validate()?;
        Ok(config)
    }
}
