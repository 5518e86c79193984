use crate::{BlackjackGameError, Card, CountTable, Suit};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt::Display;

pub const CARDS_PER_DECK: usize = 52;

/// The pool of cards in play, built from `num_decks` standard decks.
/// The shoe keeps an exact running count: it always equals the sum of the count deltas of every
/// card dealt since the shoe was last rebuilt.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: VecDeque<Card>,
    num_decks: usize,
    cut_threshold: usize,
    count_table: CountTable,
    running_count: i32,
}

impl Shoe {
    /// Builds a shoe holding `num_decks` full decks in rank order, with a running count of zero.
    /// The shoe is not shuffled.
    pub fn new(num_decks: usize, cut_threshold: usize, count_table: CountTable) -> Shoe {
        let mut shoe = Shoe {
            cards: VecDeque::with_capacity(num_decks * CARDS_PER_DECK),
            num_decks,
            cut_threshold,
            count_table,
            running_count: 0,
        };
        shoe.init();
        shoe
    }

    /// Builds a shoe that deals exactly `cards`, front first. Useful for replaying a known order.
    pub fn from_cards<I: IntoIterator<Item = Card>>(
        num_decks: usize,
        cut_threshold: usize,
        count_table: CountTable,
        cards: I,
    ) -> Shoe {
        Shoe {
            cards: cards.into_iter().collect(),
            num_decks,
            cut_threshold,
            count_table,
            running_count: 0,
        }
    }

    /// Rebuilds the shoe to its full composition and resets the running count.
    pub fn init(&mut self) {
        self.cards.clear();
        for _ in 0..self.num_decks {
            for suit in Suit::ALL {
                for rank in 1..=13 {
                    // ranks 1..=13 are always valid
                    if let Ok(card) = Card::new(suit, rank) {
                        self.cards.push_back(card);
                    }
                }
            }
        }
        self.running_count = 0;
    }

    /// Randomizes the order of the remaining cards. Composition and running count are untouched.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// Rebuilds the shoe and shuffles it.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.init();
        self.shuffle(rng);
        log::debug!(
            "reshuffled {} deck shoe, {} cards",
            self.num_decks,
            self.cards.len()
        );
    }

    /// Removes the next card from the front of the shoe and counts it.
    pub fn deal_card(&mut self) -> Result<Card, BlackjackGameError> {
        let card = self.cards.pop_front().ok_or(BlackjackGameError::EmptyShoe)?;
        self.running_count += self.count_table.delta(&card);
        log::trace!(
            "dealt {}, running count {}, {} cards remaining",
            card,
            self.running_count,
            self.cards.len()
        );
        Ok(card)
    }

    /// Number of decks left in the shoe, rounded up and never less than one.
    pub fn decks_remaining(&self) -> usize {
        usize::max(1, (self.cards.len() + CARDS_PER_DECK - 1) / CARDS_PER_DECK)
    }

    /// The running count normalized by the decks remaining. Computed on every call.
    pub fn calc_true_count(&self) -> f64 {
        (self.running_count as f64) / (self.decks_remaining() as f64)
    }

    /// True once fewer cards than the cut threshold remain.
    pub fn needs_reshuffle(&self) -> bool {
        self.cards.len() < self.cut_threshold
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn cards_remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn num_decks(&self) -> usize {
        self.num_decks
    }

    pub fn cut_threshold(&self) -> usize {
        self.cut_threshold
    }

    pub fn count_table(&self) -> &CountTable {
        &self.count_table
    }

    /// Iterates over the remaining cards in dealing order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

impl Display for Shoe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = "cards remaining:".len() + 4;
        write!(
            f,
            "{:<width$}{}\n{:<width$}{}\n{:<width$}{:.2}",
            "cards remaining:",
            self.cards.len(),
            "running count:",
            self.running_count,
            "true count:",
            self.calc_true_count(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(shoe: &Shoe) -> Vec<Card> {
        let mut cards = shoe.cards().copied().collect::<Vec<Card>>();
        cards.sort();
        cards
    }

    #[test]
    fn test_init_holds_full_composition() {
        for decks in 1..=8 {
            let shoe = Shoe::new(decks, 0, CountTable::hi_lo());
            assert_eq!(shoe.cards_remaining(), CARDS_PER_DECK * decks);
            assert_eq!(shoe.running_count(), 0);
            let aces = shoe.cards().filter(|c| c.is_ace()).count();
            assert_eq!(aces, 4 * decks);
        }
    }

    #[test]
    fn test_dealing_full_deck_returns_count_to_zero() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut shoe = Shoe::new(1, 0, CountTable::hi_lo());
        shoe.shuffle(&mut rng);
        for _ in 0..CARDS_PER_DECK {
            shoe.deal_card().unwrap();
        }
        assert_eq!(shoe.running_count(), 0);
        assert!(shoe.is_empty());
        assert_eq!(shoe.deal_card(), Err(BlackjackGameError::EmptyShoe));
    }

    #[test]
    fn test_running_count_tracks_dealt_cards() {
        let mut rng = StdRng::seed_from_u64(3);
        let table = CountTable::hi_lo();
        let mut shoe = Shoe::new(2, 0, table);
        shoe.shuffle(&mut rng);
        let mut expected = 0;
        for _ in 0..40 {
            let card = shoe.deal_card().unwrap();
            expected += table.delta(&card);
            assert_eq!(shoe.running_count(), expected);
        }
        assert_eq!(shoe.cards_remaining(), 2 * CARDS_PER_DECK - 40);
    }

    #[test]
    fn test_true_count() {
        let table = CountTable::hi_lo();
        let low = |n: usize| (0..n).map(|i| Card::new(Suit::ALL[i % 4], 5).unwrap());

        // five low cards dealt out of a stacked shoe with 60 cards, two decks remain after dealing
        let cards = low(60).collect::<Vec<Card>>();
        let mut shoe = Shoe::from_cards(2, 0, table, cards);
        for _ in 0..5 {
            shoe.deal_card().unwrap();
        }
        assert_eq!(shoe.decks_remaining(), 2);
        assert_eq!(shoe.calc_true_count(), 2.5);

        // down to a single deck, the true count equals the running count
        for _ in 0..5 {
            shoe.deal_card().unwrap();
        }
        assert_eq!(shoe.decks_remaining(), 1);
        assert_eq!(shoe.calc_true_count(), shoe.running_count() as f64);

        // recomputed on every call, never divided by less than one deck
        while !shoe.is_empty() {
            shoe.deal_card().unwrap();
        }
        assert_eq!(shoe.decks_remaining(), 1);
        assert_eq!(shoe.calc_true_count(), 60.0);
    }

    #[test]
    fn test_true_count_sign_matches_running_count() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut shoe = Shoe::new(6, 0, CountTable::hi_lo());
        shoe.shuffle(&mut rng);
        while !shoe.is_empty() {
            shoe.deal_card().unwrap();
            let (rc, tc) = (shoe.running_count(), shoe.calc_true_count());
            if rc == 0 {
                assert_eq!(tc, 0.0);
            } else {
                assert_eq!(rc.signum() as f64, tc.signum());
            }
        }
    }

    #[test]
    fn test_shuffle_preserves_composition() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut shoe = Shoe::new(6, 0, CountTable::hi_lo());
        let before = sorted(&shoe);
        let order_before = shoe.cards().copied().collect::<Vec<Card>>();
        shoe.shuffle(&mut rng);
        let order_after = shoe.cards().copied().collect::<Vec<Card>>();
        assert_ne!(order_before, order_after);
        assert_eq!(before, sorted(&shoe));
        assert_eq!(shoe.running_count(), 0);
    }

    #[test]
    fn test_shuffle_is_reproducible_for_a_seed() {
        let mut first = Shoe::new(2, 0, CountTable::hi_lo());
        let mut second = Shoe::new(2, 0, CountTable::hi_lo());
        first.shuffle(&mut StdRng::seed_from_u64(7));
        second.shuffle(&mut StdRng::seed_from_u64(7));
        assert!(first.cards().eq(second.cards()));
    }

    #[test]
    fn test_needs_reshuffle_and_reshuffle() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut shoe = Shoe::new(1, 20, CountTable::hi_lo());
        shoe.shuffle(&mut rng);
        while !shoe.needs_reshuffle() {
            shoe.deal_card().unwrap();
        }
        assert_eq!(shoe.cards_remaining(), 19);

        shoe.reshuffle(&mut rng);
        assert!(!shoe.needs_reshuffle());
        assert_eq!(shoe.cards_remaining(), CARDS_PER_DECK);
        assert_eq!(shoe.running_count(), 0);
    }
}
