//! Core of a card counting blackjack simulation: the shoe and its running count, dealer and
//! player decisions, and the round state machine that settles bets.

pub mod card;
pub mod config;
pub mod count;
pub mod dealer;
pub mod error;
pub mod game;
pub mod participant;
pub mod player;
pub mod shoe;
pub mod strategy;

pub use card::{Card, Suit};
pub use config::{GameConfig, GameConfigBuilder};
pub use count::CountTable;
pub use dealer::{Dealer, DealerState};
pub use error::BlackjackGameError;
pub use game::{Game, RoundPhase};
pub use participant::{Action, Hand, HandShape, Participant};
pub use player::{Outcome, Player, PlayerStats};
pub use shoe::{Shoe, CARDS_PER_DECK};
pub use strategy::{
    BasicStrategy, BetRamp, BetStep, DeviationTable, IndexPlay, PlayerStrategy, Trigger,
};

pub mod prelude {
    pub use super::{
        Action, BasicStrategy, BetRamp, BlackjackGameError, Card, CountTable, Dealer,
        DeviationTable, Game, GameConfig, Hand, HandShape, Outcome, Participant, Player,
        PlayerStats, PlayerStrategy, RoundPhase, Shoe, Suit,
    };
}
