use rand::Rng;

use crate::{Action, State, StateArray};

/// Picks the action with the larger value. Equal values favor `Hit`.
pub fn best_action(values: &[f64; 2]) -> Action {
    if values[Action::Hit.index()] >= values[Action::Stay.index()] {
        Action::Hit
    } else {
        Action::Stay
    }
}

/// How a Monte-Carlo agent acts in a state and how it improves after learning.
pub trait Policy {
    fn choose<R: Rng + ?Sized>(&self, state: State, rng: &mut R) -> Action;

    /// Re-derives the policy at `state` from its freshly updated action values.
    fn improve(&mut self, state: State, action_values: &[f64; 2]);

    /// The action this policy favors at `state`.
    fn preferred(&self, state: State) -> Action;
}

/// One deterministic action per state.
#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    actions: StateArray<Action>,
}

impl GreedyPolicy {
    /// Starts with an independent coin flip per state.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        GreedyPolicy {
            actions: StateArray::from_fn(|_| Action::from(rng.gen_bool(0.5))),
        }
    }

    pub fn actions(&self) -> &StateArray<Action> {
        &self.actions
    }
}

impl Policy for GreedyPolicy {
    fn choose<R: Rng + ?Sized>(&self, state: State, _rng: &mut R) -> Action {
        self.actions[state]
    }

    fn improve(&mut self, state: State, action_values: &[f64; 2]) {
        self.actions[state] = best_action(action_values);
    }

    fn preferred(&self, state: State) -> Action {
        self.actions[state]
    }
}

/// A probability over {hit, stay} per state. After improvement the best action gets
/// `1 - epsilon + epsilon / 2` and the other `epsilon / 2`.
#[derive(Debug, Clone)]
pub struct SoftPolicy {
    epsilon: f64,
    probabilities: StateArray<[f64; 2]>,
}

impl SoftPolicy {
    /// Starts with an independent random distribution per state. Panics if `epsilon` is not in
    /// [0, 1].
    pub fn random<R: Rng + ?Sized>(epsilon: f64, rng: &mut R) -> Self {
        if !(0.0..=1.0).contains(&epsilon) {
            panic!("Invalid epsilon! It must be in [0, 1]")
        }
        let probabilities = StateArray::from_fn(|_| {
            let hit: f64 = rng.gen();
            let stay: f64 = rng.gen();
            let total = hit + stay;
            if total == 0.0 {
                [0.5, 0.5]
            } else {
                let hit = hit / total;
                [hit, 1.0 - hit]
            }
        });
        SoftPolicy {
            epsilon,
            probabilities,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn probabilities(&self) -> &StateArray<[f64; 2]> {
        &self.probabilities
    }
}

impl Policy for SoftPolicy {
    fn choose<R: Rng + ?Sized>(&self, state: State, rng: &mut R) -> Action {
        let hit = self.probabilities[state][Action::Hit.index()];
        Action::from(rng.gen::<f64>() < hit)
    }

    fn improve(&mut self, state: State, action_values: &[f64; 2]) {
        let best = best_action(action_values);
        let explore = self.epsilon / 2.0;
        let probabilities = &mut self.probabilities[state];
        probabilities[best.other().index()] = explore;
        probabilities[best.index()] = 1.0 - explore;
    }

    fn preferred(&self, state: State) -> Action {
        best_action(&self.probabilities[state])
    }
}
