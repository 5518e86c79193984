//! Per rank count tables for the balanced card counting systems supported by the shoe.

use crate::{BlackjackGameError, Card};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Maps each rank to the amount the running count changes by when a card of that rank leaves the shoe.
/// Index `0` holds the delta for the ace, index `12` the delta for the king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountTable {
    deltas: [i32; 13],
}

impl CountTable {
    pub fn new(deltas: [i32; 13]) -> CountTable {
        CountTable { deltas }
    }

    /// Hi-Lo: +1 for 2 through 6, 0 for 7 through 9, -1 for tens and aces.
    pub fn hi_lo() -> CountTable {
        CountTable::new([-1, 1, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1])
    }

    /// Looks up one of the registered counting systems by name.
    pub fn by_name<S: AsRef<str>>(name: S) -> Option<CountTable> {
        COUNTING_SYSTEMS.get(name.as_ref()).copied()
    }

    /// Names of every registered counting system, sorted.
    pub fn names() -> Vec<&'static str> {
        let mut names = COUNTING_SYSTEMS.keys().copied().collect::<Vec<&str>>();
        names.sort_unstable();
        names
    }

    pub fn delta(&self, card: &Card) -> i32 {
        self.deltas[(card.rank() - 1) as usize]
    }

    pub fn deltas(&self) -> &[i32; 13] {
        &self.deltas
    }

    /// Sum of the deltas over one full 52 card deck.
    pub fn deck_sum(&self) -> i32 {
        4 * self.deltas.iter().sum::<i32>()
    }

    /// A balanced system returns to zero after a full deck has been counted.
    pub fn is_balanced(&self) -> bool {
        self.deck_sum() == 0
    }

    pub fn validate(&self) -> Result<(), BlackjackGameError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(BlackjackGameError::invalid_config(format!(
                "count table {} is unbalanced, a full deck sums to {}",
                self,
                self.deck_sum()
            )))
        }
    }
}

impl Default for CountTable {
    fn default() -> Self {
        CountTable::hi_lo()
    }
}

impl Display for CountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = self
            .deltas
            .iter()
            .zip("A23456789TJQK".chars())
            .map(|(d, r)| format!("{}:{:+}", r, d))
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "[{}]", body)
    }
}

lazy_static! {
    static ref COUNTING_SYSTEMS: HashMap<&'static str, CountTable> = {
        let mut systems = HashMap::new();
        systems.insert("HiLo", CountTable::hi_lo());
        systems.insert(
            "HiOptI",
            CountTable::new([0, 0, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1]),
        );
        systems.insert(
            "HiOptII",
            CountTable::new([0, 1, 1, 2, 2, 1, 1, 0, 0, -2, -2, -2, -2]),
        );
        systems.insert(
            "OmegaII",
            CountTable::new([0, 1, 1, 2, 2, 2, 1, 0, -1, -2, -2, -2, -2]),
        );
        systems.insert(
            "Zen Count",
            CountTable::new([-1, 1, 1, 2, 2, 2, 1, 0, 0, -2, -2, -2, -2]),
        );
        systems
    };
}
