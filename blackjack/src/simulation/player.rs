use std::collections::HashMap;

use super::{hand::Hand, Card};
use crate::{Outcome, Rule};

/// Caller supplied key of a round. Uniqueness is up to the caller.
pub type GameId = u64;

/// The name the dealer sits under.
pub const DEALER_NAME: &str = "Dealer";

/// The state every participant keeps: its hand for the current round and its results so far.
#[derive(Debug, Clone, Default)]
pub struct Seat {
    name: String,
    hand: Hand,
    /// Grows by one entry per round played. Use `take_outcomes` to evict.
    outcomes: HashMap<GameId, Outcome>,
}

impl Seat {
    pub fn new(name: &str) -> Self {
        Seat {
            name: String::from(name),
            hand: Hand::new(),
            outcomes: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn record_outcome(&mut self, game_id: GameId, outcome: Outcome) {
        self.outcomes.insert(game_id, outcome);
    }

    pub fn outcomes(&self) -> &HashMap<GameId, Outcome> {
        &self.outcomes
    }

    pub fn take_outcomes(&mut self) -> HashMap<GameId, Outcome> {
        std::mem::take(&mut self.outcomes)
    }
}

/// Everything the round controller needs from a participant. Implementors only provide their
/// seat and their decision; the rest has sensible defaults.
pub trait Player {
    fn seat(&self) -> &Seat;
    fn seat_mut(&mut self) -> &mut Seat;

    /// Returns true to take one more card.
    fn hit_or_stay(&mut self, dealer_face_up: Card) -> bool;

    fn name(&self) -> &str {
        self.seat().name()
    }

    fn hand(&self) -> &Hand {
        self.seat().hand()
    }

    /// Takes the initial cards of a round.
    fn get_hand(&mut self, cards: Vec<Card>) {
        self.seat_mut().hand_mut().set_cards(cards);
    }

    fn add_card(&mut self, cards: Vec<Card>) {
        self.seat_mut().hand_mut().receive_cards(cards);
    }

    fn score(&self) -> u16 {
        self.hand().score()
    }

    fn bust(&self) -> bool {
        self.hand().bust()
    }

    /// Records the result of a round. Called exactly once per round, after the hand is final.
    fn update_outcome(&mut self, game_id: GameId, outcome: Outcome) {
        self.seat_mut().record_outcome(game_id, outcome);
    }

    fn outcome(&self, game_id: GameId) -> Option<Outcome> {
        self.seat().outcomes().get(&game_id).copied()
    }

    fn take_outcomes(&mut self) -> HashMap<GameId, Outcome> {
        self.seat_mut().take_outcomes()
    }

    /// Drops the hand at the end of a round. Outcomes are kept.
    fn clear_hand(&mut self) {
        self.seat_mut().hand_mut().clear();
    }
}

/// The house. Shows its first card and hits while its score is at most the hit limit.
#[derive(Debug, Clone)]
pub struct Dealer {
    seat: Seat,
    hit_limit: u16,
    face_up: Option<Card>,
}

impl Dealer {
    pub fn new(rule: &Rule) -> Self {
        Dealer {
            seat: Seat::new(DEALER_NAME),
            hit_limit: rule.dealer_hit_limit,
            face_up: None,
        }
    }

    pub fn face_up(&self) -> Option<Card> {
        self.face_up
    }
}

impl Player for Dealer {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn hit_or_stay(&mut self, _dealer_face_up: Card) -> bool {
        self.score() <= self.hit_limit
    }

    fn get_hand(&mut self, cards: Vec<Card>) {
        self.face_up = cards.first().copied();
        self.seat.hand_mut().set_cards(cards);
    }

    fn clear_hand(&mut self) {
        self.face_up = None;
        self.seat.hand_mut().clear();
    }
}
