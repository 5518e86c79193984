//! Lookup tables a player consults on their turn and when betting: basic strategy,
//! count based index plays and the bet ramp.

use crate::participant::{Action, Hand, HandShape};
use crate::BlackjackGameError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Dealer up card values run from 2 to 11, the ace counts as 11.
const UPCARDS: std::ops::RangeInclusive<u8> = 2..=11;

/// Strict basic strategy for a multi deck shoe where the dealer stands on soft 17.
/// Lookups are keyed on the player's hand and the blackjack value of the dealer's up card.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicStrategy {
    hard_totals: HashMap<(u8, u8), Action>,
    soft_totals: HashMap<(u8, u8), Action>,
    pair_splits: HashSet<(u8, u8)>,
}

impl BasicStrategy {
    /// Helper for populating the lookup tables.
    fn build_lookup_tables() -> (
        HashMap<(u8, u8), Action>,
        HashMap<(u8, u8), Action>,
        HashSet<(u8, u8)>,
    ) {
        let mut hard_totals = HashMap::new();
        for i in 4..=21 {
            for j in UPCARDS {
                let option = match i {
                    9 => match j {
                        3..=6 => Action::Double,
                        _ => Action::Hit,
                    },
                    10 => match j {
                        2..=9 => Action::Double,
                        _ => Action::Hit,
                    },
                    11 => match j {
                        11 => Action::Hit,
                        _ => Action::Double,
                    },
                    12 => match j {
                        4..=6 => Action::Stand,
                        _ => Action::Hit,
                    },
                    13..=16 => match j {
                        2..=6 => Action::Stand,
                        _ => Action::Hit,
                    },
                    17..=21 => Action::Stand,
                    _ => Action::Hit,
                };
                hard_totals.insert((i, j), option);
            }
        }

        // Soft totals i.e. an ace still counted as eleven. Soft 12 is only reachable with a pair of aces.
        let mut soft_totals = HashMap::new();
        for i in 12..=21 {
            for j in UPCARDS {
                let option = match i {
                    13 | 14 => match j {
                        5 | 6 => Action::Double,
                        _ => Action::Hit,
                    },
                    15 | 16 => match j {
                        4..=6 => Action::Double,
                        _ => Action::Hit,
                    },
                    17 => match j {
                        3..=6 => Action::Double,
                        _ => Action::Hit,
                    },
                    18 => match j {
                        3..=6 => Action::Double,
                        2 | 7 | 8 => Action::Stand,
                        _ => Action::Hit,
                    },
                    19..=21 => Action::Stand,
                    _ => Action::Hit,
                };
                soft_totals.insert((i, j), option);
            }
        }

        // Pairs that should be split, every other pair is played as its total
        let mut pair_splits = HashSet::new();
        for i in 2..=11 {
            for j in UPCARDS {
                let split = match i {
                    2 | 3 | 7 => (2..=7).contains(&j),
                    4 => j == 5 || j == 6,
                    6 => (2..=6).contains(&j),
                    8 | 11 => true,
                    9 => matches!(j, 2..=6 | 8 | 9),
                    _ => false,
                };
                if split {
                    pair_splits.insert((i, j));
                }
            }
        }

        (hard_totals, soft_totals, pair_splits)
    }

    pub fn new() -> BasicStrategy {
        let (hard_totals, soft_totals, pair_splits) = BasicStrategy::build_lookup_tables();
        BasicStrategy {
            hard_totals,
            soft_totals,
            pair_splits,
        }
    }

    /// Basic strategy with every split removed, pairs are played as their hard or soft total.
    pub fn without_splits() -> BasicStrategy {
        let (hard_totals, soft_totals, _) = BasicStrategy::build_lookup_tables();
        BasicStrategy {
            hard_totals,
            soft_totals,
            pair_splits: HashSet::new(),
        }
    }

    /// Replaces a single entry of the table, `shape` picks which table is changed.
    /// For a pair, `Action::Split` adds a split and anything else removes it.
    pub fn set(&mut self, shape: HandShape, upcard: u8, action: Action) {
        match shape {
            HandShape::Hard(t) => {
                self.hard_totals.insert((t, upcard), action);
            }
            HandShape::Soft(t) => {
                self.soft_totals.insert((t, upcard), action);
            }
            HandShape::Pair(v) if action == Action::Split => {
                self.pair_splits.insert((v, upcard));
            }
            HandShape::Pair(v) => {
                self.pair_splits.remove(&(v, upcard));
            }
        }
    }

    /// Looks up the basic strategy action for `hand` against the dealer's up card value.
    pub fn decide(&self, hand: &Hand, upcard: u8) -> Result<Action, BlackjackGameError> {
        if let HandShape::Pair(v) = hand.shape() {
            if self.pair_splits.contains(&(v, upcard)) {
                return Ok(Action::Split);
            }
        }

        let shape = hand.total_shape();
        let option = match shape {
            HandShape::Hard(t) => self.hard_totals.get(&(t, upcard)),
            HandShape::Soft(t) => self.soft_totals.get(&(t, upcard)),
            HandShape::Pair(_) => None,
        };
        option
            .copied()
            .ok_or(BlackjackGameError::MissingStrategyEntry { shape, upcard })
    }
}

impl Default for BasicStrategy {
    fn default() -> Self {
        BasicStrategy::new()
    }
}

/// Doubling is only allowed on the first two cards. Past that a double becomes a hit,
/// or a stand for soft 18 and above.
pub fn playable_action(action: Action, hand: &Hand) -> Action {
    if action != Action::Double || hand.len() == 2 {
        return action;
    }
    match hand.total_shape() {
        HandShape::Soft(t) if t >= 18 => Action::Stand,
        _ => Action::Hit,
    }
}

/// Which side of its index an index play fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    AtOrAbove,
    Below,
}

/// A count based deviation from basic strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexPlay {
    pub shape: HandShape,
    pub upcard: u8,
    pub index: f64,
    pub trigger: Trigger,
    pub action: Action,
}

impl IndexPlay {
    pub fn fires(&self, true_count: f64) -> bool {
        match self.trigger {
            Trigger::AtOrAbove => true_count >= self.index,
            Trigger::Below => true_count < self.index,
        }
    }
}

/// Index plays keyed by hand shape and dealer up card value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<IndexPlay>", into = "Vec<IndexPlay>")]
pub struct DeviationTable {
    plays: HashMap<(HandShape, u8), IndexPlay>,
}

impl DeviationTable {
    pub fn new() -> DeviationTable {
        DeviationTable::default()
    }

    /// The Illustrious 18 index plays for a stand on soft 17 shoe. Insurance is configured
    /// on the game, and the two ten-ten splits are left out since splitting is not played.
    pub fn illustrious_18() -> DeviationTable {
        use Action::*;
        use HandShape::Hard;
        use Trigger::*;

        let plays = [
            (Hard(16), 10, 0.0, AtOrAbove, Stand),
            (Hard(15), 10, 4.0, AtOrAbove, Stand),
            (Hard(10), 10, 4.0, AtOrAbove, Double),
            (Hard(12), 3, 2.0, AtOrAbove, Stand),
            (Hard(12), 2, 3.0, AtOrAbove, Stand),
            (Hard(11), 11, 1.0, AtOrAbove, Double),
            (Hard(9), 2, 1.0, AtOrAbove, Double),
            (Hard(10), 11, 4.0, AtOrAbove, Double),
            (Hard(9), 7, 3.0, AtOrAbove, Double),
            (Hard(16), 9, 5.0, AtOrAbove, Stand),
            (Hard(13), 2, -1.0, Below, Hit),
            (Hard(12), 4, 0.0, Below, Hit),
            (Hard(12), 5, -2.0, Below, Hit),
            (Hard(12), 6, -1.0, Below, Hit),
            (Hard(13), 3, -2.0, Below, Hit),
        ];

        plays
            .into_iter()
            .map(|(shape, upcard, index, trigger, action)| IndexPlay {
                shape,
                upcard,
                index,
                trigger,
                action,
            })
            .collect::<Vec<IndexPlay>>()
            .into()
    }

    pub fn insert(&mut self, play: IndexPlay) {
        self.plays.insert((play.shape, play.upcard), play);
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    /// Returns the deviating action for `hand` if one of its index plays fires at `true_count`.
    /// A pair entry is consulted first. Totals are only consulted when basic strategy does not split,
    /// a pair being split is never overridden by a total's index.
    pub fn lookup(
        &self,
        hand: &Hand,
        upcard: u8,
        true_count: f64,
        basic: Action,
    ) -> Option<Action> {
        let mut shapes = vec![hand.shape()];
        if basic != Action::Split && hand.total_shape() != hand.shape() {
            shapes.push(hand.total_shape());
        }
        shapes
            .into_iter()
            .filter_map(|shape| self.plays.get(&(shape, upcard)))
            .next()
            .filter(|play| play.fires(true_count))
            .map(|play| play.action)
    }
}

impl From<Vec<IndexPlay>> for DeviationTable {
    fn from(plays: Vec<IndexPlay>) -> Self {
        let mut table = DeviationTable::new();
        for play in plays {
            table.insert(play);
        }
        table
    }
}

impl From<DeviationTable> for Vec<IndexPlay> {
    fn from(table: DeviationTable) -> Self {
        table.plays.into_values().collect()
    }
}

/// One step of a bet ramp: `bet` is wagered once the true count is strictly above `above`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetStep {
    pub above: f64,
    pub bet: f64,
}

/// Sizes bets from the true count. The minimum bet is wagered at or below a true count of zero,
/// and a higher true count never yields a smaller bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBetRamp")]
pub struct BetRamp {
    min_bet: f64,
    steps: Vec<BetStep>,
}

#[derive(Deserialize)]
struct RawBetRamp {
    min_bet: f64,
    #[serde(default)]
    steps: Vec<BetStep>,
}

impl TryFrom<RawBetRamp> for BetRamp {
    type Error = BlackjackGameError;

    fn try_from(raw: RawBetRamp) -> Result<Self, Self::Error> {
        BetRamp::new(raw.min_bet, raw.steps)
    }
}

impl BetRamp {
    /// Builds a ramp, fails with `InvalidConfig` if the steps could ever lower the bet.
    pub fn new(min_bet: f64, steps: Vec<BetStep>) -> Result<BetRamp, BlackjackGameError> {
        if !(min_bet > 0.0) {
            return Err(BlackjackGameError::invalid_config(format!(
                "minimum bet must be positive, got {}",
                min_bet
            )));
        }
        let mut previous = BetStep {
            above: f64::NEG_INFINITY,
            bet: min_bet,
        };
        for step in steps.iter() {
            if step.above < 0.0 {
                return Err(BlackjackGameError::invalid_config(
                    "bet ramp steps must start at a true count of zero or above",
                ));
            }
            if step.above <= previous.above || step.bet < previous.bet {
                return Err(BlackjackGameError::invalid_config(format!(
                    "bet ramp step {:?} lowers the bet or is out of order",
                    step
                )));
            }
            previous = *step;
        }
        Ok(BetRamp { min_bet, steps })
    }

    /// A flat ramp that always bets the minimum.
    pub fn flat(min_bet: f64) -> Result<BetRamp, BlackjackGameError> {
        BetRamp::new(min_bet, vec![])
    }

    /// Margin based ramp: for a positive true count the bet is `min_bet * margin * ceil(true_count)`,
    /// capped at `max_units` steps and never below the minimum bet.
    pub fn margin(min_bet: f64, margin: f64, max_units: u32) -> Result<BetRamp, BlackjackGameError> {
        let steps = (1..=max_units)
            .map(|k| BetStep {
                above: (k - 1) as f64,
                bet: f64::max(min_bet, min_bet * margin * (k as f64)),
            })
            .collect();
        BetRamp::new(min_bet, steps)
    }

    pub fn min_bet(&self) -> f64 {
        self.min_bet
    }

    pub fn bet_for(&self, true_count: f64) -> f64 {
        self.steps
            .iter()
            .rev()
            .find(|step| true_count > step.above)
            .map(|step| step.bet)
            .unwrap_or(self.min_bet)
    }
}

/// Everything a player consults to play and bet, shared between players behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStrategy {
    pub basic: BasicStrategy,
    pub deviations: DeviationTable,
    pub bet_ramp: BetRamp,
}

impl PlayerStrategy {
    pub fn new(basic: BasicStrategy, deviations: DeviationTable, bet_ramp: BetRamp) -> Self {
        PlayerStrategy {
            basic,
            deviations,
            bet_ramp,
        }
    }
}
