use rand::seq::SliceRandom;
use rand::Rng;
use strum::IntoEnumIterator;
use tracing::trace;

use super::{Card, Rank, Suit};
use crate::BlackjackError;

/// Represents a deck in the real world. Cards are either still in the deck or have been dealt;
/// together they always make up the cards the deck was built with.
#[derive(Debug, Clone)]
pub struct Deck {
    remaining: Vec<Card>,
    dealt: Vec<Card>,
}

impl Deck {
    /// Creates a deck from the given cards. The first card is the next one dealt.
    pub fn new(cards: Vec<Card>) -> Deck {
        Deck {
            remaining: cards,
            dealt: Vec::new(),
        }
    }

    /// Creates a single ordered 52-card deck.
    pub fn standard() -> Deck {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::iter() {
            for rank in Rank::iter() {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck::new(cards)
    }

    /// Shuffles the remaining cards `times` times. One uniform shuffle is already a uniform
    /// permutation; repeating it changes nothing statistically.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, times: u8, rng: &mut R) {
        for _ in 0..times {
            self.remaining.shuffle(rng);
        }
    }

    /// Deals the first `n` remaining cards in order. Fails without touching the deck if fewer
    /// than `n` cards remain.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, BlackjackError> {
        if n > self.remaining.len() {
            return Err(BlackjackError::InsufficientCards {
                requested: n,
                remaining: self.remaining.len(),
            });
        }
        let cards: Vec<Card> = self.remaining.drain(..n).collect();
        self.dealt.extend_from_slice(&cards);
        trace!(n, remaining = self.remaining.len(), "dealt cards");
        Ok(cards)
    }

    /// Returns every dealt card to the bottom of the deck.
    pub fn reclaim(&mut self) {
        self.remaining.append(&mut self.dealt);
    }

    pub fn remaining(&self) -> &[Card] {
        &self.remaining
    }

    pub fn dealt(&self) -> &[Card] {
        &self.dealt
    }

    /// Number of cards the deck was built with.
    pub fn size(&self) -> usize {
        self.remaining.len() + self.dealt.len()
    }
}
