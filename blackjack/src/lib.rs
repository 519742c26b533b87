mod error;
pub mod learning;
pub mod simulation;
mod statearray;
pub mod strategy;

use std::str::FromStr;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

pub use error::BlackjackError;
pub use statearray::{State, StateArray, MAX_SCORE, NUMBER_OF_STATES};

/// Table rules shared by the round controller and the dealer.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// How many uniform shuffles are applied to the deck before each deal. Any value above 1 is
    /// statistically the same as 1; the knob only exists to reproduce shuffle-count setups.
    pub shuffle_times: u8,
    /// The dealer hits while its score is less than or equal to this.
    pub dealer_hit_limit: u16,
    pub both_bust_policy: BothBustPolicy,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            shuffle_times: 5,
            dealer_hit_limit: 17,
            both_bust_policy: BothBustPolicy::Draw,
        }
    }
}

/// What happens when a player and the dealer both bust.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum BothBustPolicy {
    /// Both sides score 0.
    Draw,
    /// Both sides score -1.
    BothLose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Hit = 0,
    Stay = 1,
}

impl Action {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn other(self) -> Action {
        match self {
            Action::Hit => Action::Stay,
            Action::Stay => Action::Hit,
        }
    }

    pub fn is_hit(self) -> bool {
        self == Action::Hit
    }
}

impl From<bool> for Action {
    fn from(hit: bool) -> Self {
        if hit {
            Action::Hit
        } else {
            Action::Stay
        }
    }
}

impl FromStr for Action {
    type Err = BlackjackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit" => Ok(Action::Hit),
            "stay" => Ok(Action::Stay),
            other => Err(BlackjackError::InvalidInput(other.to_string())),
        }
    }
}

/// The result of one round for one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Lose = -1,
    Draw = 0,
    Win = 1,
}

impl Outcome {
    pub fn value(self) -> i8 {
        self as i8
    }

    /// The return an agent learns from.
    pub fn reward(self) -> f64 {
        self.value() as f64
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_action_ignores_case_and_whitespace() {
        assert_eq!("HIT".parse::<Action>().unwrap(), Action::Hit);
        assert_eq!(" stay\n".parse::<Action>().unwrap(), Action::Stay);
        assert!(matches!(
            "double".parse::<Action>(),
            Err(BlackjackError::InvalidInput(_))
        ));
    }

    #[test]
    fn parse_both_bust_policy() {
        let policy: BothBustPolicy = "BothLose".parse().unwrap();
        assert_eq!(policy, BothBustPolicy::BothLose);
        assert!("Nobody".parse::<BothBustPolicy>().is_err());
    }

    #[test]
    fn outcome_values() {
        assert_eq!(Outcome::Win.value(), 1);
        assert_eq!(Outcome::Draw.value(), 0);
        assert_eq!(Outcome::Lose.reward(), -1.0);
    }
}
