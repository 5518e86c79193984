use crate::participant::{Action, Hand, Participant};
use crate::strategy::{playable_action, PlayerStrategy};
use crate::BlackjackGameError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

/// How a player's main bet was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Blackjack,
    Win,
    Push,
    Loss,
}

impl Outcome {
    /// Net winnings per unit staked.
    pub fn net_multiplier(&self, blackjack_payout: f64) -> f64 {
        match self {
            Outcome::Blackjack => blackjack_payout,
            Outcome::Win => 1.0,
            Outcome::Push => 0.0,
            Outcome::Loss => -1.0,
        }
    }
}

/// Running tallies for a single player, read by reporting layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub rounds: u32,
    pub wins: u32,
    pub pushes: u32,
    pub losses: u32,
    pub blackjacks: u32,
    pub busts: u32,
    pub doubles: u32,
    pub insurance_won: u32,
    pub insurance_lost: u32,
    pub net_winnings: f64,
}

/// A counting player. Bets are sized from the true count and decisions follow basic strategy,
/// overridden by index plays when deviations are enabled.
///
/// Bets are escrowed: placing a bet moves it out of the bankroll, settling it returns the stake
/// together with the net winnings.
#[derive(Debug, Clone)]
pub struct Player {
    hand: Hand,
    strategy: Arc<PlayerStrategy>,
    use_deviations: bool,
    bankroll: f64,
    current_bet: f64,
    stats: PlayerStats,
}

impl Player {
    pub fn new(bankroll: f64, strategy: Arc<PlayerStrategy>, use_deviations: bool) -> Player {
        Player {
            hand: Hand::new(),
            strategy,
            use_deviations,
            bankroll,
            current_bet: 0.0,
            stats: PlayerStats::default(),
        }
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn current_bet(&self) -> f64 {
        self.current_bet
    }

    pub fn using_deviations(&self) -> bool {
        self.use_deviations
    }

    pub fn strategy(&self) -> &PlayerStrategy {
        &self.strategy
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// The smallest bet this player's ramp will ever place.
    pub fn min_bet(&self) -> f64 {
        self.strategy.bet_ramp.min_bet()
    }

    /// Sizes and places the bet for the coming round from the true count observed before the deal.
    /// Fails with `IllegalState` if the previous bet has not been settled yet.
    pub fn place_bet(&mut self, true_count: f64) -> Result<f64, BlackjackGameError> {
        if self.current_bet > 0.0 {
            return Err(BlackjackGameError::illegal_state(format!(
                "player already has an unsettled bet of {:.2}",
                self.current_bet
            )));
        }
        let bet = self.strategy.bet_ramp.bet_for(true_count);
        self.bankroll -= bet;
        self.current_bet = bet;
        Ok(bet)
    }

    /// Decides how to play the current hand against the dealer's up card value (2 through 11).
    pub fn decide_action(
        &self,
        true_count: f64,
        dealer_upcard: u8,
    ) -> Result<Action, BlackjackGameError> {
        let basic = self.strategy.basic.decide(&self.hand, dealer_upcard)?;
        let mut action = basic;
        if self.use_deviations {
            if let Some(deviation) =
                self.strategy
                    .deviations
                    .lookup(&self.hand, dealer_upcard, true_count, basic)
            {
                action = deviation;
            }
        }
        Ok(playable_action(action, &self.hand))
    }

    /// True if this player takes insurance at the given true count.
    pub fn wants_insurance(&self, true_count: f64, insurance_index: f64) -> bool {
        self.use_deviations && true_count >= insurance_index
    }

    /// Settles an insurance side bet of half the current bet. A win credits the full current bet,
    /// a loss debits half of it.
    pub fn resolve_insurance(&mut self, dealer_has_ten: bool) -> f64 {
        let net = if dealer_has_ten {
            self.stats.insurance_won += 1;
            self.current_bet
        } else {
            self.stats.insurance_lost += 1;
            -self.current_bet / 2.0
        };
        self.bankroll += net;
        self.stats.net_winnings += net;
        net
    }

    /// Moves a second stake equal to the current bet out of the bankroll.
    pub fn double_down(&mut self) {
        self.bankroll -= self.current_bet;
        self.current_bet *= 2.0;
        self.stats.doubles += 1;
    }

    /// Settles the current bet, returning the net amount won (negative when lost).
    pub fn resolve_bet(&mut self, outcome: Outcome, blackjack_payout: f64) -> f64 {
        let net = self.current_bet * outcome.net_multiplier(blackjack_payout);
        self.bankroll += self.current_bet + net;
        self.current_bet = 0.0;

        self.stats.rounds += 1;
        self.stats.net_winnings += net;
        match outcome {
            Outcome::Blackjack => {
                self.stats.blackjacks += 1;
                self.stats.wins += 1;
            }
            Outcome::Win => self.stats.wins += 1,
            Outcome::Push => self.stats.pushes += 1,
            Outcome::Loss => self.stats.losses += 1,
        }
        net
    }

    /// Marks the player as busted, the bet is lost.
    pub fn bust(&mut self) -> f64 {
        self.set_inactive(true);
        self.stats.busts += 1;
        self.resolve_bet(Outcome::Loss, 0.0)
    }

    /// Returns an unsettled stake to the bankroll, used when a round is voided.
    pub fn refund_bet(&mut self) {
        self.bankroll += self.current_bet;
        self.current_bet = 0.0;
    }

    /// Clears the hand and returns the player to active play.
    pub fn reset_hand(&mut self) {
        self.hand.clear();
    }
}

impl Participant for Player {
    fn hand(&self) -> &Hand {
        &self.hand
    }

    fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<21}{}\n\
                   {:<21}{}\n\
                   {:<21}${:.2}\n\
                   {:<21}${:.2}\n\
                   {:<21}{}",
            "hand:",
            self.hand,
            "hand value:",
            self.hand.total(),
            "bet:",
            self.current_bet,
            "bankroll:",
            self.bankroll,
            "deviations:",
            self.use_deviations,
        )
    }
}
