use super::{Card, Rank};

const BUST_LIMIT: u16 = 21;

/// The cards one participant holds in the current round, with the score derived from them.
/// The score is recomputed from every card each time cards arrive, so it never goes stale.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
    score: u16,
    usable_high_card: bool,
    bust: bool,
}

impl Hand {
    pub fn new() -> Hand {
        Default::default()
    }

    /// Replaces the hand with the given cards.
    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.rescore();
    }

    /// Adds the given cards to the hand.
    pub fn receive_cards(&mut self, cards: Vec<Card>) {
        self.cards.extend(cards);
        self.rescore();
    }

    pub fn get_cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn score(&self) -> u16 {
        self.score
    }

    pub fn usable_high_card(&self) -> bool {
        self.usable_high_card
    }

    pub fn bust(&self) -> bool {
        self.bust
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.score = 0;
        self.usable_high_card = false;
        self.bust = false;
    }

    fn rescore(&mut self) {
        let (score, usable_high_card) = score_cards(&self.cards);
        self.score = score;
        self.usable_high_card = usable_high_card;
        self.bust = self.bust || score > BUST_LIMIT;
    }
}

/// Scores a hand. At most one Ace counts as 11, and only if that keeps the total at 21 or below.
/// Returns the total and whether an Ace is counted as 11.
pub fn score_cards(cards: &[Card]) -> (u16, bool) {
    let (aces, non_aces): (Vec<&Card>, Vec<&Card>) =
        cards.iter().partition(|card| card.rank == Rank::Ace);
    let sum: u16 = non_aces
        .iter()
        .map(|card| card.blackjack_value() as u16)
        .sum();
    let number_of_aces = aces.len() as u16;

    if number_of_aces == 0 {
        return (sum, false);
    }
    let soft_total = sum + 11 + (number_of_aces - 1);
    if soft_total <= BUST_LIMIT {
        (soft_total, true)
    } else {
        (sum + number_of_aces, false)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::simulation::Suit;

    fn cards(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|rank| Card::new(*rank, Suit::Spade)).collect()
    }

    fn non_ace_rank() -> impl Strategy<Value = Rank> {
        prop::sample::select(vec![
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
        ])
    }

    #[test]
    fn empty_hand_scores_zero() {
        assert_eq!(score_cards(&[]), (0, false));
        let hand = Hand::new();
        assert_eq!(hand.score(), 0);
        assert!(!hand.bust());
    }

    #[test]
    fn face_cards_count_ten() {
        assert_eq!(
            score_cards(&cards(&[Rank::Jack, Rank::Queen])),
            (20, false)
        );
        assert_eq!(score_cards(&cards(&[Rank::King, Rank::Two])), (12, false));
    }

    #[test]
    fn single_ace_is_high_when_it_fits() {
        assert_eq!(score_cards(&cards(&[Rank::Ace, Rank::Ten])), (21, true));
        assert_eq!(
            score_cards(&cards(&[Rank::Ace, Rank::Six, Rank::Four])),
            (21, true)
        );
        assert_eq!(
            score_cards(&cards(&[Rank::Ace, Rank::Six, Rank::Five])),
            (12, false)
        );
    }

    #[test]
    fn two_aces_score_twelve() {
        assert_eq!(score_cards(&cards(&[Rank::Ace, Rank::Ace])), (12, true));
        assert_eq!(
            score_cards(&cards(&[Rank::Ace, Rank::Ace, Rank::Nine])),
            (21, true)
        );
        assert_eq!(
            score_cards(&cards(&[Rank::Ace, Rank::Ace, Rank::Ten])),
            (12, false)
        );
    }

    #[test]
    fn adding_a_card_rescores_the_whole_hand() {
        let mut hand = Hand::new();
        hand.set_cards(cards(&[Rank::Ace, Rank::Five]));
        assert_eq!((hand.score(), hand.usable_high_card()), (16, true));
        hand.receive_cards(cards(&[Rank::Ten]));
        assert_eq!((hand.score(), hand.usable_high_card()), (16, false));
        assert!(!hand.bust());
    }

    #[test]
    fn bust_is_flagged_and_cleared_only_by_clear() {
        let mut hand = Hand::new();
        hand.set_cards(cards(&[Rank::Ten, Rank::Five]));
        hand.receive_cards(cards(&[Rank::Eight]));
        assert_eq!(hand.score(), 23);
        assert!(hand.bust());
        hand.receive_cards(cards(&[Rank::Two]));
        assert!(hand.bust());
        hand.clear();
        assert!(!hand.bust());
        assert!(hand.get_cards().is_empty());
        assert_eq!(hand.score(), 0);
    }

    proptest! {
        #[test]
        fn hands_without_aces_score_their_sum(ranks in prop::collection::vec(non_ace_rank(), 0..12)) {
            let hand = cards(&ranks);
            let sum: u16 = hand.iter().map(|card| card.blackjack_value() as u16).sum();
            prop_assert_eq!(score_cards(&hand), (sum, false));
        }

        #[test]
        fn single_ace_follows_the_soft_rule(ranks in prop::collection::vec(non_ace_rank(), 1..4)) {
            let mut hand = cards(&ranks);
            let sum: u16 = hand.iter().map(|card| card.blackjack_value() as u16).sum();
            hand.push(Card::new(Rank::Ace, Suit::Heart));
            if sum <= 10 {
                prop_assert_eq!(score_cards(&hand), (sum + 11, true));
            } else {
                prop_assert_eq!(score_cards(&hand), (sum + 1, false));
            }
        }
    }
}
