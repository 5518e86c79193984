//! Orchestrates rounds of blackjack between a dealer and any number of counting players.
//!
//! A round moves through `Idle -> Betting -> Dealing -> Insurance -> PlayerTurns -> DealerTurn ->
//! Settlement -> Idle`. Each step is a separate method so a driver can observe the table between
//! steps, calling one out of order fails with `IllegalState`.

use crate::participant::{Action, Participant};
use crate::player::Outcome;
use crate::{BlackjackGameError, Dealer, GameConfig, Player, Shoe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Display;

/// The last step of the round that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Betting,
    Dealing,
    Insurance,
    PlayerTurns,
    DealerTurn,
    Settlement,
}

impl Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single table: the shoe, the dealer and the seated players, plus the random source used
/// for every shuffle.
pub struct Game<R: Rng = StdRng> {
    config: GameConfig,
    shoe: Shoe,
    dealer: Dealer,
    active_players: Vec<Player>,
    resolved_players: Vec<Player>,
    /// For each resolved player, its index in the active roster left behind when it was resolved.
    resolved_seats: Vec<usize>,
    round_in_progress: bool,
    phase: RoundPhase,
    rng: R,
}

impl Game<StdRng> {
    /// Builds a game whose shuffles are reproducible from `seed`.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, BlackjackGameError> {
        Game::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    /// Builds a game with a full, unshuffled shoe. Call `shuffle_shoe` before the first round.
    pub fn new(config: GameConfig, rng: R) -> Result<Self, BlackjackGameError> {
        let shoe = Shoe::new(config.num_decks, config.cut_threshold, config.count_table);
        Game::with_shoe(config, shoe, rng)
    }

    /// Builds a game around an existing shoe, e.g. one stacked with `Shoe::from_cards`.
    pub fn with_shoe(config: GameConfig, shoe: Shoe, rng: R) -> Result<Self, BlackjackGameError> {
        config.validate()?;
        Ok(Game {
            dealer: Dealer::new(config.dealer_hits_soft_17),
            config,
            shoe,
            active_players: vec![],
            resolved_players: vec![],
            resolved_seats: vec![],
            round_in_progress: false,
            phase: RoundPhase::Idle,
            rng,
        })
    }

    fn expect_phase(&self, expected: RoundPhase, operation: &str) -> Result<(), BlackjackGameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(BlackjackGameError::illegal_state(format!(
                "cannot {} in phase {}, expected {}",
                operation, self.phase, expected
            )))
        }
    }

    fn expect_no_round(&self, operation: &str) -> Result<(), BlackjackGameError> {
        if self.round_in_progress {
            Err(BlackjackGameError::illegal_state(format!(
                "cannot {} during a round",
                operation
            )))
        } else {
            Ok(())
        }
    }

    /// Shuffles the cards remaining in the shoe with the injected random source.
    pub fn shuffle_shoe(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_no_round("shuffle the shoe")?;
        self.shoe.shuffle(&mut self.rng);
        Ok(())
    }

    /// Seats a player at the end of the roster with an empty hand.
    pub fn add_player(&mut self, mut player: Player) -> Result<(), BlackjackGameError> {
        self.expect_no_round("add a player")?;
        player.reset_hand();
        self.active_players.push(player);
        Ok(())
    }

    pub fn remove_player(&mut self, i: usize) -> Result<Player, BlackjackGameError> {
        self.expect_no_round("remove a player")?;
        if i >= self.active_players.len() {
            return Err(BlackjackGameError::IndexOutOfRange {
                index: i,
                len: self.active_players.len(),
            });
        }
        Ok(self.active_players.remove(i))
    }

    /// Starts a round. Reshuffles first if the shoe has passed the cut threshold, then every
    /// active player bets from the true count observed before any card is dealt.
    pub fn place_bets(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_phase(RoundPhase::Idle, "place bets")?;
        if self.shoe.needs_reshuffle() {
            self.shoe.reshuffle(&mut self.rng);
        }
        self.round_in_progress = true;

        let true_count = self.shoe.calc_true_count();
        for player in self.active_players.iter_mut() {
            let bet = player.place_bet(true_count)?;
            log::trace!("bet {:.2} at true count {:.2}", bet, true_count);
        }
        self.phase = RoundPhase::Betting;
        Ok(())
    }

    /// Deals one card to each player, then the dealer's up card, then a second card to each
    /// player and finally the dealer's hole card.
    pub fn deal_round(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_phase(RoundPhase::Betting, "deal")?;
        for _ in 0..2 {
            for player in self.active_players.iter_mut() {
                player.add_card_to_hand(self.shoe.deal_card()?);
            }
            self.dealer.add_card_to_hand(self.shoe.deal_card()?);
        }
        self.phase = RoundPhase::Dealing;
        Ok(())
    }

    /// Settles insurance when the dealer shows an ace. Players using deviations insure at or above
    /// the configured index, the side bet is settled at once by peeking at the hole card.
    pub fn handle_insurance(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_phase(RoundPhase::Dealing, "handle insurance")?;
        if self.dealer.upcard().map_or(false, |c| c.is_ace()) {
            let true_count = self.shoe.calc_true_count();
            let dealer_has_ten = self
                .dealer
                .peek_hole_card()
                .map_or(false, |c| c.blackjack_value() == 10);
            for player in self.active_players.iter_mut() {
                if player.wants_insurance(true_count, self.config.insurance_index) {
                    let net = player.resolve_insurance(dealer_has_ten);
                    log::debug!(
                        "insurance at true count {:.2} settled for {:+.2}",
                        true_count,
                        net
                    );
                }
            }
        }
        self.phase = RoundPhase::Insurance;
        Ok(())
    }

    /// Plays one player's turn to completion.
    fn play_turn(
        shoe: &mut Shoe,
        player: &mut Player,
        dealer_upcard: u8,
        blackjack_payout: f64,
    ) -> Result<(), BlackjackGameError> {
        if player.has_blackjack() {
            let net = player.resolve_bet(Outcome::Blackjack, blackjack_payout);
            player.set_inactive(true);
            log::debug!("player blackjack paid {:.2}", net);
            return Ok(());
        }

        loop {
            let action = player.decide_action(shoe.calc_true_count(), dealer_upcard)?;
            log::trace!(
                "player {} with {} against {}",
                action,
                player.calc_hand_total(),
                dealer_upcard
            );
            match action {
                Action::Hit => {
                    player.add_card_to_hand(shoe.deal_card()?);
                    if player.calc_hand_total() > 21 {
                        player.bust();
                        return Ok(());
                    }
                }
                Action::Double => {
                    player.double_down();
                    player.add_card_to_hand(shoe.deal_card()?);
                    if player.calc_hand_total() > 21 {
                        player.bust();
                    }
                    return Ok(());
                }
                Action::Stand => return Ok(()),
                Action::Split => return Err(BlackjackGameError::NotImplemented("splitting a pair")),
            }
        }
    }

    /// Lets each active player act in registration order. Afterwards players that busted or were
    /// paid a natural leave the active roster for the resolved list, order is preserved in both.
    pub fn players_play_round(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_phase(RoundPhase::Insurance, "play the players' turns")?;
        let dealer_upcard = self
            .dealer
            .upcard()
            .map(|c| c.blackjack_value())
            .ok_or_else(|| BlackjackGameError::illegal_state("the dealer has no up card"))?;

        for player in self.active_players.iter_mut() {
            Self::play_turn(
                &mut self.shoe,
                player,
                dealer_upcard,
                self.config.blackjack_payout,
            )?;
        }

        let mut active = Vec::with_capacity(self.active_players.len());
        for player in std::mem::take(&mut self.active_players) {
            if player.is_inactive() {
                self.resolved_seats.push(active.len());
                self.resolved_players.push(player);
            } else {
                active.push(player);
            }
        }
        self.active_players = active;
        self.phase = RoundPhase::PlayerTurns;
        Ok(())
    }

    /// Reveals the hole card and plays the dealer's hand, skipped when no player is left to beat.
    pub fn dealer_play_round(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_phase(RoundPhase::PlayerTurns, "play the dealer's turn")?;
        self.dealer.reveal_hole_card();
        if !self.active_players.is_empty() {
            loop {
                match self.dealer.decide_action() {
                    Action::Hit => {
                        self.dealer.add_card_to_hand(self.shoe.deal_card()?);
                        if self.dealer.calc_hand_total() > 21 {
                            self.dealer.set_inactive(true);
                            break;
                        }
                    }
                    Action::Stand => break,
                    action @ (Action::Double | Action::Split) => {
                        return Err(BlackjackGameError::illegal_state(format!(
                            "the dealer cannot {}",
                            action
                        )))
                    }
                }
            }
            log::trace!("dealer finished with {}", self.dealer);
        }
        self.phase = RoundPhase::DealerTurn;
        Ok(())
    }

    /// Settles every player still in the active roster against the dealer's final hand.
    pub fn resolve_bets(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_phase(RoundPhase::DealerTurn, "resolve bets")?;
        let dealer_busted = self.dealer.is_inactive();
        let dealer_total = self.dealer.calc_hand_total();
        for player in self.active_players.iter_mut() {
            let player_total = player.calc_hand_total();
            let outcome = if dealer_busted || player_total > dealer_total {
                Outcome::Win
            } else if player_total < dealer_total {
                Outcome::Loss
            } else {
                Outcome::Push
            };
            let net = player.resolve_bet(outcome, self.config.blackjack_payout);
            log::debug!(
                "{:?}: player {} against dealer {}, net {:+.2}",
                outcome,
                player_total,
                dealer_total,
                net
            );
        }
        self.phase = RoundPhase::Settlement;
        Ok(())
    }

    /// Ends the round and readies the table for the next one. Called before settlement, the round
    /// is voided and every unsettled stake is returned. The resolved players are left untouched.
    pub fn clean_up(&mut self) {
        if self.round_in_progress && self.phase != RoundPhase::Settlement {
            log::warn!("voiding round abandoned in phase {}", self.phase);
            for player in self.active_players.iter_mut() {
                player.refund_bet();
            }
        }
        for player in self.active_players.iter_mut() {
            player.reset_hand();
        }
        self.dealer.reset();
        self.round_in_progress = false;
        self.phase = RoundPhase::Idle;
    }

    fn run_round(&mut self) -> Result<(), BlackjackGameError> {
        self.place_bets()?;
        self.deal_round()?;
        self.handle_insurance()?;
        self.players_play_round()?;
        self.dealer_play_round()?;
        self.resolve_bets()
    }

    /// Plays a complete round. On error the round is voided before the error is returned.
    pub fn play_round(&mut self) -> Result<(), BlackjackGameError> {
        let result = self.run_round();
        self.clean_up();
        result
    }

    pub fn num_players(&self) -> usize {
        self.active_players.len()
    }

    pub fn get_player_at(&self, i: usize) -> Result<&Player, BlackjackGameError> {
        self.active_players
            .get(i)
            .ok_or(BlackjackGameError::IndexOutOfRange {
                index: i,
                len: self.active_players.len(),
            })
    }

    pub fn players(&self) -> &[Player] {
        &self.active_players
    }

    pub fn get_dealer(&self) -> &Dealer {
        &self.dealer
    }

    /// Players that left the active roster, in the order they left it.
    pub fn resolved_players(&self) -> &[Player] {
        &self.resolved_players
    }

    /// Hands the resolved players over to the caller, leaving the list empty.
    pub fn take_resolved_players(&mut self) -> Vec<Player> {
        self.resolved_seats.clear();
        std::mem::take(&mut self.resolved_players)
    }

    /// Seats every resolved player again at the seat it left, restoring the roster order of
    /// the rounds they were resolved in. Seats past the end of a roster that has since shrunk
    /// through `remove_player` are clamped to the end.
    pub fn reseat_resolved_players(&mut self) -> Result<(), BlackjackGameError> {
        self.expect_no_round("reseat players")?;
        let seats = std::mem::take(&mut self.resolved_seats);
        let players = std::mem::take(&mut self.resolved_players);
        for (seat, mut player) in seats.into_iter().zip(players).rev() {
            player.reset_hand();
            let seat = seat.min(self.active_players.len());
            self.active_players.insert(seat, player);
        }
        Ok(())
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn round_in_progress(&self) -> bool {
        self.round_in_progress
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::strategy::{BasicStrategy, BetRamp, DeviationTable, PlayerStrategy};
    use crate::{Card, CountTable, Suit};
    use std::sync::Arc;

    const BET: f64 = 10.0;

    fn cards(ranks: &[u8]) -> Vec<Card> {
        ranks
            .iter()
            .enumerate()
            .map(|(i, &rank)| Card::new(Suit::ALL[i % 4], rank).unwrap())
            .collect()
    }

    fn stacked_config() -> GameConfig {
        GameConfig::builder()
            .num_decks(1)
            .cut_threshold(0)
            .build()
            .unwrap()
    }

    /// A game whose shoe deals `ranks` in order, front first.
    fn stacked_game(ranks: &[u8]) -> Game {
        let config = stacked_config();
        let shoe = Shoe::from_cards(1, 0, config.count_table, cards(ranks));
        Game::with_shoe(config, shoe, StdRng::seed_from_u64(0)).unwrap()
    }

    fn flat_player(bankroll: f64, use_deviations: bool) -> Player {
        let strategy = PlayerStrategy::new(
            BasicStrategy::new(),
            DeviationTable::illustrious_18(),
            BetRamp::flat(BET).unwrap(),
        );
        Player::new(bankroll, Arc::new(strategy), use_deviations)
    }

    #[test]
    fn test_add_player_during_round_fails() {
        let mut game = stacked_game(&[10, 9, 8, 7, 6, 5]);
        game.add_player(flat_player(100.0, false)).unwrap();
        game.place_bets().unwrap();
        assert!(game.round_in_progress());
        assert!(matches!(
            game.add_player(flat_player(100.0, false)),
            Err(BlackjackGameError::IllegalState(_))
        ));
        assert!(game.remove_player(0).is_err());
        assert_eq!(game.num_players(), 1);
    }

    #[test]
    fn test_get_player_at_out_of_range() {
        let mut game = stacked_game(&[]);
        game.add_player(flat_player(100.0, false)).unwrap();
        assert!(game.get_player_at(0).is_ok());
        assert_eq!(
            game.get_player_at(1).err(),
            Some(BlackjackGameError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_operations_out_of_order_fail() {
        let mut game = stacked_game(&[10, 9, 8, 7]);
        game.add_player(flat_player(100.0, false)).unwrap();
        assert!(matches!(
            game.deal_round(),
            Err(BlackjackGameError::IllegalState(_))
        ));
        assert!(game.resolve_bets().is_err());
        game.place_bets().unwrap();
        assert!(game.place_bets().is_err());
        assert!(game.shuffle_shoe().is_err());
    }

    #[test]
    fn test_hit_to_21_and_win() {
        // player 10, dealer 7, player 6, dealer hole 5, player hits a 5, dealer draws a 6
        let mut game = stacked_game(&[10, 7, 6, 5, 5, 6]);
        game.add_player(flat_player(100.0, false)).unwrap();

        game.place_bets().unwrap();
        game.deal_round().unwrap();
        assert_eq!(game.get_dealer().upcard().map(|c| c.rank()), Some(7));
        assert_eq!(game.get_player_at(0).unwrap().calc_hand_total(), 16);
        assert_eq!(game.get_player_at(0).unwrap().decide_action(0.0, 7), Ok(Action::Hit));

        game.handle_insurance().unwrap();
        game.players_play_round().unwrap();
        assert_eq!(game.get_player_at(0).unwrap().calc_hand_total(), 21);

        game.dealer_play_round().unwrap();
        assert_eq!(game.get_dealer().calc_hand_total(), 18);
        assert!(!game.get_dealer().is_inactive());

        game.resolve_bets().unwrap();
        let player = game.get_player_at(0).unwrap();
        assert_eq!(player.bankroll(), 100.0 + BET);
        assert_eq!(player.current_bet(), 0.0);
        assert_eq!(player.stats().wins, 1);

        game.clean_up();
        assert_eq!(game.phase(), RoundPhase::Idle);
        assert!(!game.round_in_progress());
        assert!(game.get_player_at(0).unwrap().hand().is_empty());
        assert!(game.get_dealer().hand().is_empty());
    }

    #[test]
    fn test_push_leaves_bankroll_unchanged() {
        let mut game = stacked_game(&[10, 10, 13, 12]);
        game.add_player(flat_player(100.0, false)).unwrap();
        game.play_round().unwrap();
        let player = game.get_player_at(0).unwrap();
        assert_eq!(player.bankroll(), 100.0);
        assert_eq!(player.stats().pushes, 1);
    }

    #[test]
    fn test_insurance_pays_current_bet_when_hole_card_is_ten() {
        // eight fives are dealt before the game starts, pushing the count to +8
        let config = stacked_config();
        let mut ranks = vec![5; 8];
        ranks.extend([9, 1, 9, 13, 2, 2]);
        let mut shoe = Shoe::from_cards(1, 0, config.count_table, cards(&ranks));
        for _ in 0..8 {
            shoe.deal_card().unwrap();
        }
        let mut game = Game::with_shoe(config, shoe, StdRng::seed_from_u64(0)).unwrap();
        game.add_player(flat_player(100.0, true)).unwrap();

        game.place_bets().unwrap();
        game.deal_round().unwrap();
        assert!(game.shoe().calc_true_count() >= config.insurance_index);
        assert_eq!(game.get_dealer().to_string(), "AD ??");

        let before = game.get_player_at(0).unwrap().bankroll();
        game.handle_insurance().unwrap();
        let player = game.get_player_at(0).unwrap();
        assert_eq!(player.bankroll(), before + player.current_bet());
        assert_eq!(player.stats().insurance_won, 1);
        // the peek does not reveal the hole card
        assert_eq!(game.get_dealer().to_string(), "AD ??");

        // the dealer's blackjack still beats the player's 18
        game.players_play_round().unwrap();
        game.dealer_play_round().unwrap();
        game.resolve_bets().unwrap();
        assert_eq!(game.get_player_at(0).unwrap().bankroll(), 100.0);
    }

    #[test]
    fn test_insurance_loses_half_bet() {
        let config = stacked_config();
        // two players on tens, the dealer shows an ace over a seven
        let mut ranks = vec![4; 10];
        ranks.extend([10, 10, 1, 10, 10, 7, 2, 2]);
        let mut shoe = Shoe::from_cards(1, 0, config.count_table, cards(&ranks));
        for _ in 0..10 {
            shoe.deal_card().unwrap();
        }
        let mut game = Game::with_shoe(config, shoe, StdRng::seed_from_u64(0)).unwrap();
        game.add_player(flat_player(100.0, true)).unwrap();
        game.add_player(flat_player(100.0, false)).unwrap();

        game.place_bets().unwrap();
        game.deal_round().unwrap();
        game.handle_insurance().unwrap();
        assert_eq!(game.get_player_at(0).unwrap().bankroll(), 100.0 - BET - BET / 2.0);
        // basic strategy players never insure
        assert_eq!(game.get_player_at(1).unwrap().bankroll(), 100.0 - BET);
    }

    #[test]
    fn test_natural_is_paid_and_dealer_turn_skipped() {
        let mut game = stacked_game(&[1, 9, 13, 7, 10]);
        game.add_player(flat_player(100.0, false)).unwrap();
        game.place_bets().unwrap();
        game.deal_round().unwrap();
        game.handle_insurance().unwrap();
        game.players_play_round().unwrap();

        assert_eq!(game.num_players(), 0);
        assert_eq!(game.resolved_players().len(), 1);
        let resolved = &game.resolved_players()[0];
        assert_eq!(resolved.bankroll(), 100.0 + 1.5 * BET);
        assert_eq!(resolved.stats().blackjacks, 1);

        game.dealer_play_round().unwrap();
        assert_eq!(game.get_dealer().hand().len(), 2);
        assert_eq!(game.shoe().cards_remaining(), 1);
        game.resolve_bets().unwrap();
        game.clean_up();

        // the resolved list belongs to the caller
        assert_eq!(game.resolved_players().len(), 1);
        game.reseat_resolved_players().unwrap();
        assert_eq!(game.num_players(), 1);
        assert!(game.get_player_at(0).unwrap().hand().is_empty());
        assert!(!game.get_player_at(0).unwrap().is_inactive());
    }

    #[test]
    fn test_busted_players_are_partitioned_in_order() {
        // three players and a dealer showing 7, the first player hits 16 and busts
        let mut game = stacked_game(&[10, 10, 10, 7, 6, 8, 9, 10, 10]);
        for bankroll in [100.0, 200.0, 300.0] {
            game.add_player(flat_player(bankroll, false)).unwrap();
        }
        game.place_bets().unwrap();
        game.deal_round().unwrap();
        game.handle_insurance().unwrap();
        game.players_play_round().unwrap();

        assert_eq!(game.num_players(), 2);
        assert_eq!(game.get_player_at(0).unwrap().bankroll(), 200.0 - BET);
        assert_eq!(game.get_player_at(1).unwrap().bankroll(), 300.0 - BET);
        let busted = &game.resolved_players()[0];
        assert_eq!(busted.bankroll(), 100.0 - BET);
        assert_eq!(busted.stats().busts, 1);

        game.dealer_play_round().unwrap();
        assert_eq!(game.get_dealer().calc_hand_total(), 17);
        game.resolve_bets().unwrap();
        assert_eq!(game.get_player_at(0).unwrap().bankroll(), 200.0 + BET);
        assert_eq!(game.get_player_at(1).unwrap().bankroll(), 300.0 + BET);
    }

    #[test]
    fn test_reseat_restores_registration_order() {
        // seat 0 is paid a natural, seat 1 busts, seat 2 stands on 19 against a dealer 17
        let mut game = stacked_game(&[1, 10, 10, 7, 13, 6, 9, 10, 10]);
        for bankroll in [100.0, 200.0, 300.0] {
            game.add_player(flat_player(bankroll, false)).unwrap();
        }
        game.play_round().unwrap();
        assert_eq!(game.num_players(), 1);
        assert_eq!(game.resolved_players().len(), 2);

        game.reseat_resolved_players().unwrap();
        assert!(game.resolved_players().is_empty());
        let bankrolls: Vec<f64> = game.players().iter().map(|p| p.bankroll()).collect();
        assert_eq!(
            bankrolls,
            vec![100.0 + 1.5 * BET, 200.0 - BET, 300.0 + BET]
        );
        assert!(game.players().iter().all(|p| p.hand().is_empty()));
    }

    #[test]
    fn test_reseat_across_rounds() {
        // round one: seat 1 busts. round two: the last seat busts
        let mut game = stacked_game(&[
            10, 10, 10, 7, 9, 6, 9, 10, 10, // round one
            10, 10, 7, 9, 6, 10, 10, // round two
        ]);
        for bankroll in [100.0, 200.0, 300.0] {
            game.add_player(flat_player(bankroll, false)).unwrap();
        }
        game.play_round().unwrap();
        assert_eq!(game.num_players(), 2);
        game.play_round().unwrap();
        assert_eq!(game.num_players(), 1);

        game.reseat_resolved_players().unwrap();
        let bankrolls: Vec<f64> = game.players().iter().map(|p| p.bankroll()).collect();
        assert_eq!(
            bankrolls,
            vec![100.0 + BET + BET, 200.0 - BET, 300.0 + BET - BET]
        );
    }

    #[test]
    fn test_dealer_hits_soft_seventeen_when_configured() {
        let config = GameConfig::builder()
            .num_decks(1)
            .cut_threshold(0)
            .dealer_hits_soft_17(true)
            .build()
            .unwrap();
        // player stands on 18, dealer's soft 17 draws a ten to hard 17 and stands
        let shoe = Shoe::from_cards(1, 0, config.count_table, cards(&[10, 1, 8, 6, 10, 5]));
        let mut game = Game::with_shoe(config, shoe, StdRng::seed_from_u64(0)).unwrap();
        game.add_player(flat_player(100.0, false)).unwrap();
        game.place_bets().unwrap();
        game.deal_round().unwrap();
        game.handle_insurance().unwrap();
        game.players_play_round().unwrap();
        game.dealer_play_round().unwrap();

        assert_eq!(game.get_dealer().hand().len(), 3);
        assert_eq!(game.get_dealer().calc_hand_total(), 17);
        assert_eq!(game.get_dealer().state(), crate::DealerState::Done);
        assert_eq!(game.shoe().cards_remaining(), 1);
        game.resolve_bets().unwrap();
        assert_eq!(game.get_player_at(0).unwrap().bankroll(), 100.0 + BET);
    }

    #[test]
    fn test_double_down_against_busting_dealer() {
        // player 6 and 5 against a dealer 6, doubles into a ten, dealer 16 draws a ten
        let mut game = stacked_game(&[6, 6, 5, 10, 10, 10]);
        game.add_player(flat_player(100.0, false)).unwrap();
        game.play_round().unwrap();

        let player = game.get_player_at(0).unwrap();
        assert_eq!(player.bankroll(), 100.0 + 2.0 * BET);
        assert_eq!(player.stats().doubles, 1);
    }

    #[test]
    fn test_split_is_not_implemented_and_round_is_voided() {
        let mut game = stacked_game(&[8, 10, 8, 7, 10, 10]);
        game.add_player(flat_player(100.0, false)).unwrap();
        assert_eq!(
            game.play_round(),
            Err(BlackjackGameError::NotImplemented("splitting a pair"))
        );

        assert_eq!(game.phase(), RoundPhase::Idle);
        assert_eq!(game.num_players(), 1);
        let player = game.get_player_at(0).unwrap();
        assert_eq!(player.bankroll(), 100.0);
        assert_eq!(player.current_bet(), 0.0);
        assert!(player.hand().is_empty());
    }

    #[test]
    fn test_empty_shoe_mid_round() {
        let mut game = stacked_game(&[10, 7, 6]);
        game.add_player(flat_player(100.0, false)).unwrap();
        game.place_bets().unwrap();
        assert_eq!(game.deal_round(), Err(BlackjackGameError::EmptyShoe));
        game.clean_up();
        assert_eq!(game.get_player_at(0).unwrap().bankroll(), 100.0);
    }

    #[test]
    fn test_place_bets_reshuffles_past_the_cut() {
        let config = GameConfig::builder()
            .num_decks(1)
            .cut_threshold(20)
            .build()
            .unwrap();
        let shoe = Shoe::from_cards(1, 20, CountTable::hi_lo(), cards(&[2, 3, 4, 5, 6]));
        let mut game = Game::with_shoe(config, shoe, StdRng::seed_from_u64(5)).unwrap();
        game.add_player(flat_player(100.0, false)).unwrap();
        assert!(game.shoe().needs_reshuffle());

        game.place_bets().unwrap();
        assert_eq!(game.shoe().cards_remaining(), 52);
        assert_eq!(game.shoe().running_count(), 0);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let strategy = Arc::new(PlayerStrategy::new(
            BasicStrategy::without_splits(),
            DeviationTable::illustrious_18(),
            BetRamp::margin(5.0, 2.0, 6).unwrap(),
        ));
        let run = |seed: u64| {
            let mut game = Game::with_seed(GameConfig::default(), seed).unwrap();
            game.add_player(Player::new(1000.0, Arc::clone(&strategy), true))
                .unwrap();
            game.shuffle_shoe().unwrap();
            for _ in 0..200 {
                game.play_round().unwrap();
                game.reseat_resolved_players().unwrap();
            }
            let player = game.get_player_at(0).unwrap();
            (player.bankroll(), player.stats().clone())
        };

        let (first, first_stats) = run(11);
        let (second, second_stats) = run(11);
        assert_eq!(first, second);
        assert_eq!(first_stats, second_stats);
        assert_eq!(first_stats.rounds, 200);
    }
}
