use crate::participant::HandShape;
use thiserror::Error;

/// Errors produced by the blackjack core. None of them are retried internally,
/// every error propagates to the immediate caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlackjackGameError {
    /// A card rank outside of `1..=13`.
    #[error("invalid card rank {0}, expected a value in 1..=13")]
    InvalidRank(u8),

    /// An operation was invoked outside of the round state it is valid in.
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("no player at index {index}, only {len} active player(s)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The shoe ran out of cards mid round, the cut threshold policy was not honored.
    #[error("attempted to deal from an empty shoe")]
    EmptyShoe,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no strategy entry for {shape} against dealer up card {upcard}")]
    MissingStrategyEntry { shape: HandShape, upcard: u8 },
}

impl BlackjackGameError {
    pub(crate) fn illegal_state<S: Into<String>>(message: S) -> Self {
        BlackjackGameError::IllegalState(message.into())
    }

    pub(crate) fn invalid_config<S: Into<String>>(message: S) -> Self {
        BlackjackGameError::InvalidConfig(message.into())
    }
}
