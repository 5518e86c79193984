use crate::BlackjackGameError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The four suits of a standard deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn symbol(&self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }
}

impl Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Returns the display symbol for a raw rank, `1` is the ace and `13` the king.
pub fn rank_display(rank: u8) -> Result<&'static str, BlackjackGameError> {
    match rank {
        1 => Ok("A"),
        2 => Ok("2"),
        3 => Ok("3"),
        4 => Ok("4"),
        5 => Ok("5"),
        6 => Ok("6"),
        7 => Ok("7"),
        8 => Ok("8"),
        9 => Ok("9"),
        10 => Ok("T"),
        11 => Ok("J"),
        12 => Ok("Q"),
        13 => Ok("K"),
        _ => Err(BlackjackGameError::InvalidRank(rank)),
    }
}

/// Returns the blackjack value of a raw rank. Aces count as 11, face cards as 10.
pub fn blackjack_value(rank: u8) -> Result<u8, BlackjackGameError> {
    match rank {
        1 => Ok(11),
        2..=10 => Ok(rank),
        11..=13 => Ok(10),
        _ => Err(BlackjackGameError::InvalidRank(rank)),
    }
}

/// An immutable playing card. The rank is validated on construction so every `Card` in
/// circulation has a rank in `1..=13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCard")]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    /// Builds a new card, fails with `InvalidRank` if `rank` is not in `1..=13`.
    pub fn new(suit: Suit, rank: u8) -> Result<Card, BlackjackGameError> {
        // rank_display and blackjack_value share the same domain, either one validates
        rank_display(rank)?;
        Ok(Card { rank, suit })
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn is_ace(&self) -> bool {
        self.rank == 1
    }

    /// Display rank of the card, i.e. "A", "2", ..., "T", "J", "Q", "K".
    pub fn rank_display(&self) -> &'static str {
        rank_display(self.rank).unwrap_or("?")
    }

    /// Blackjack value of the card with the ace counted high.
    pub fn blackjack_value(&self) -> u8 {
        blackjack_value(self.rank).unwrap_or(0)
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank_display(), self.suit)
    }
}

#[derive(Deserialize)]
struct RawCard {
    rank: u8,
    suit: Suit,
}

impl TryFrom<RawCard> for Card {
    type Error = BlackjackGameError;

    fn try_from(raw: RawCard) -> Result<Self, Self::Error> {
        Card::new(raw.suit, raw.rank)
    }
}
