use std::ops::{Index, IndexMut};

use crate::simulation::{hand::Hand, Card};

/// The largest score a learning agent can observe. A player only decides while not bust
/// (score <= 21), and one more card adds at most 10.
pub const MAX_SCORE: u8 = 31;
const NUMBER_OF_SCORES: usize = MAX_SCORE as usize + 1;
const NUMBER_OF_UP_CARDS: usize = 10;
pub const NUMBER_OF_STATES: usize = NUMBER_OF_SCORES * NUMBER_OF_UP_CARDS * 2;

/// What a learning agent sees when deciding: its own score, the dealer's face-up card in
/// blackjack value (Ace is 1) and whether an Ace is currently counted as 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    score: u8,
    dealer_up_card: u8,
    usable_high_card: bool,
}

impl State {
    pub fn new(score: u8, dealer_up_card: u8, usable_high_card: bool) -> Self {
        if score > MAX_SCORE {
            panic!("Invalid score! It must be in [0, {}]", MAX_SCORE)
        }
        if dealer_up_card == 0 || dealer_up_card > 10 {
            panic!("Invalid dealer up card! It must be in [1, 10]")
        }
        State {
            score,
            dealer_up_card,
            usable_high_card,
        }
    }

    /// Reads the state off a hand and the dealer's face-up card.
    pub fn observe(hand: &Hand, dealer_face_up: Card) -> Self {
        let score = u8::try_from(hand.score()).unwrap_or(u8::MAX);
        State::new(
            score,
            dealer_face_up.blackjack_value(),
            hand.usable_high_card(),
        )
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn dealer_up_card(&self) -> u8 {
        self.dealer_up_card
    }

    pub fn usable_high_card(&self) -> bool {
        self.usable_high_card
    }

    /// Every state, in table order.
    pub fn all() -> impl Iterator<Item = State> {
        (0..=MAX_SCORE).flat_map(|score| {
            (1..=10).flat_map(move |up| {
                [false, true]
                    .into_iter()
                    .map(move |usable| State::new(score, up, usable))
            })
        })
    }

    fn index(&self) -> usize {
        (self.score as usize * NUMBER_OF_UP_CARDS + (self.dealer_up_card - 1) as usize) * 2
            + self.usable_high_card as usize
    }
}

/// This struct provide a convenient way to use State as the index of a fixed size array.
/// Every state owns exactly one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct StateArray<T> {
    data: Vec<T>,
}

impl<T> StateArray<T> {
    /// Fills every slot by calling `f` once per state, in table order.
    pub fn from_fn<F: FnMut(State) -> T>(f: F) -> Self {
        let data: Vec<T> = State::all().map(f).collect();
        StateArray { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (State, &T)> {
        State::all().zip(self.data.iter())
    }
}

impl<T> Index<State> for StateArray<T> {
    type Output = T;
    fn index(&self, index: State) -> &Self::Output {
        &self.data[index.index()]
    }
}

impl<T> IndexMut<State> for StateArray<T> {
    fn index_mut(&mut self, index: State) -> &mut Self::Output {
        &mut self.data[index.index()]
    }
}
