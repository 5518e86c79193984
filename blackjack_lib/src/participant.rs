//! The capabilities shared by the dealer and the players: an ordered hand of cards, the blackjack
//! total of that hand and a flag marking the participant as removed from active play.

use crate::{BlackjackGameError, Card};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The decisions a participant can take on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Double => "double down",
            Action::Split => "split",
        };
        write!(f, "{}", name)
    }
}

/// The shape of a hand as far as strategy lookups are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandShape {
    /// No ace counted as eleven.
    Hard(u8),
    /// At least one ace still counted as eleven.
    Soft(u8),
    /// Two cards of the same blackjack value, holds the value of one card.
    Pair(u8),
}

impl Display for HandShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandShape::Hard(t) => write!(f, "hard {}", t),
            HandShape::Soft(t) => write!(f, "soft {}", t),
            HandShape::Pair(v) => write!(f, "pair of {}s", v),
        }
    }
}

/// An ordered hand of cards plus the inactive flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
    inactive: bool,
}

impl Hand {
    pub fn new() -> Hand {
        Hand::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Blackjack total together with the number of aces still counted as eleven.
    /// Every ace starts at eleven and is re-valued to one, one at a time, while the total exceeds 21.
    fn total_and_soft_aces(&self) -> (u8, usize) {
        let mut total: u32 = self.cards.iter().map(|c| c.blackjack_value() as u32).sum();
        let mut high_aces = self.cards.iter().filter(|c| c.is_ace()).count();
        while total > 21 && high_aces > 0 {
            total -= 10;
            high_aces -= 1;
        }
        (u8::try_from(total).unwrap_or(u8::MAX), high_aces)
    }

    pub fn total(&self) -> u8 {
        self.total_and_soft_aces().0
    }

    pub fn is_soft(&self) -> bool {
        let (total, high_aces) = self.total_and_soft_aces();
        high_aces > 0 && total <= 21
    }

    pub fn is_busted(&self) -> bool {
        self.total() > 21
    }

    /// An initial two card hand totalling 21.
    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && self.total() == 21
    }

    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].blackjack_value() == self.cards[1].blackjack_value()
    }

    pub fn shape(&self) -> HandShape {
        if self.is_pair() {
            HandShape::Pair(self.cards[0].blackjack_value())
        } else {
            self.total_shape()
        }
    }

    /// Hard or soft total, pairs are read as their total.
    pub fn total_shape(&self) -> HandShape {
        let (total, high_aces) = self.total_and_soft_aces();
        if high_aces > 0 {
            HandShape::Soft(total)
        } else {
            HandShape::Hard(total)
        }
    }

    pub fn is_inactive(&self) -> bool {
        self.inactive
    }

    pub fn set_inactive(&mut self, inactive: bool) {
        self.inactive = inactive;
    }

    /// Empties the hand and returns the participant to active play.
    pub fn clear(&mut self) {
        self.cards.clear();
        self.inactive = false;
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{}", cards)
    }
}

/// Implemented by both the dealer and the player. Each owns its own `Hand`, everything else
/// comes from the provided methods.
pub trait Participant {
    fn hand(&self) -> &Hand;

    fn hand_mut(&mut self) -> &mut Hand;

    fn add_card_to_hand(&mut self, card: Card) {
        self.hand_mut().push(card);
    }

    fn card_at(&self, i: usize) -> Result<&Card, BlackjackGameError> {
        let cards = self.hand().cards();
        cards.get(i).ok_or(BlackjackGameError::IndexOutOfRange {
            index: i,
            len: cards.len(),
        })
    }

    fn calc_hand_total(&self) -> u8 {
        self.hand().total()
    }

    fn has_blackjack(&self) -> bool {
        self.hand().is_natural()
    }

    fn is_inactive(&self) -> bool {
        self.hand().is_inactive()
    }

    fn set_inactive(&mut self, inactive: bool) {
        self.hand_mut().set_inactive(inactive);
    }
}
