use crate::participant::{Action, Hand, Participant};
use crate::Card;
use std::fmt::Display;

/// The two states of the dealer's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerState {
    Acting,
    Done,
}

/// The dealer. Hits below 17 and stands otherwise, optionally hitting soft 17.
#[derive(Debug, Clone)]
pub struct Dealer {
    hand: Hand,
    state: DealerState,
    hole_card_revealed: bool,
    hits_soft_seventeen: bool,
}

impl Dealer {
    pub fn new(hits_soft_seventeen: bool) -> Dealer {
        Dealer {
            hand: Hand::new(),
            state: DealerState::Acting,
            hole_card_revealed: false,
            hits_soft_seventeen,
        }
    }

    /// Decides the dealer's next action. Once the dealer stands its state becomes `Done`.
    pub fn decide_action(&mut self) -> Action {
        let total = self.hand.total();
        let soft_seventeen = total == 17 && self.hand.is_soft();
        if total < 17 || (self.hits_soft_seventeen && soft_seventeen) {
            Action::Hit
        } else {
            self.state = DealerState::Done;
            Action::Stand
        }
    }

    pub fn state(&self) -> DealerState {
        self.state
    }

    /// The first card dealt to the dealer, visible to every player.
    pub fn upcard(&self) -> Option<&Card> {
        self.hand.cards().first()
    }

    /// Looks at the hole card without revealing it, used to settle insurance.
    pub(crate) fn peek_hole_card(&self) -> Option<&Card> {
        self.hand.cards().get(1)
    }

    pub fn reveal_hole_card(&mut self) {
        self.hole_card_revealed = true;
    }

    pub fn hole_card_revealed(&self) -> bool {
        self.hole_card_revealed
    }

    /// Returns the dealer to an empty hand, ready for the next round.
    pub fn reset(&mut self) {
        self.hand.clear();
        self.state = DealerState::Acting;
        self.hole_card_revealed = false;
    }
}

impl Participant for Dealer {
    fn hand(&self) -> &Hand {
        &self.hand
    }

    fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }
}

impl Display for Dealer {
    /// Shows the public view of the dealer's hand, the hole card stays hidden until revealed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hole_card_revealed {
            return write!(f, "{} ({})", self.hand, self.hand.total());
        }
        let visible = self
            .hand
            .cards()
            .iter()
            .enumerate()
            .map(|(i, c)| if i == 1 { "??".to_string() } else { c.to_string() })
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{}", visible)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Suit;

    fn dealer_with(ranks: &[u8], hits_soft_seventeen: bool) -> Dealer {
        let mut dealer = Dealer::new(hits_soft_seventeen);
        for &rank in ranks {
            dealer.add_card_to_hand(Card::new(Suit::Clubs, rank).unwrap());
        }
        dealer
    }

    #[test]
    fn test_dealer_hits_below_seventeen() {
        let mut dealer = dealer_with(&[10, 6], false);
        assert_eq!(dealer.decide_action(), Action::Hit);
        assert_eq!(dealer.state(), DealerState::Acting);

        dealer.add_card_to_hand(Card::new(Suit::Hearts, 2).unwrap());
        assert_eq!(dealer.decide_action(), Action::Stand);
        assert_eq!(dealer.state(), DealerState::Done);
    }

    #[test]
    fn test_soft_seventeen() {
        assert_eq!(dealer_with(&[1, 6], false).decide_action(), Action::Stand);
        assert_eq!(dealer_with(&[1, 6], true).decide_action(), Action::Hit);
        assert_eq!(dealer_with(&[10, 7], true).decide_action(), Action::Stand);
        assert_eq!(dealer_with(&[1, 7], true).decide_action(), Action::Stand);
    }

    #[test]
    fn test_hole_card_hidden_until_revealed() {
        let mut dealer = dealer_with(&[1, 13], false);
        assert_eq!(dealer.to_string(), "AC ??");
        assert_eq!(dealer.peek_hole_card().map(|c| c.rank()), Some(13));
        assert_eq!(dealer.to_string(), "AC ??");

        dealer.reveal_hole_card();
        assert_eq!(dealer.to_string(), "AC KC (21)");

        dealer.reset();
        assert!(dealer.upcard().is_none());
        assert!(!dealer.hole_card_revealed());
        assert_eq!(dealer.state(), DealerState::Acting);
    }
}
