use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use super::policy::{GreedyPolicy, Policy, SoftPolicy};
use crate::{
    simulation::{
        player::{GameId, Player, Seat},
        Card,
    },
    Action, Outcome, State, StateArray,
};

/// A player that learns hit/stay by Monte-Carlo control. Every state-action pair visited in a
/// round moves toward that round's single final reward; the policy is then re-derived at those
/// states. Action values and policy live across rounds, the episode only for one round.
pub struct MonteCarloAgent<P: Policy> {
    seat: Seat,
    learning_rate: f64,
    action_values: StateArray<[f64; 2]>,
    policy: P,
    /// Most recent decision first.
    episode: VecDeque<(State, Action)>,
    rng: StdRng,
}

pub type GreedyAgent = MonteCarloAgent<GreedyPolicy>;
pub type SoftAgent = MonteCarloAgent<SoftPolicy>;

impl MonteCarloAgent<GreedyPolicy> {
    pub fn greedy(name: &str, learning_rate: f64, mut rng: StdRng) -> Self {
        let action_values = random_action_values(&mut rng);
        let policy = GreedyPolicy::random(&mut rng);
        MonteCarloAgent::with_tables(name, learning_rate, action_values, policy, rng)
    }
}

impl MonteCarloAgent<SoftPolicy> {
    pub fn soft(name: &str, learning_rate: f64, epsilon: f64, mut rng: StdRng) -> Self {
        let action_values = random_action_values(&mut rng);
        let policy = SoftPolicy::random(epsilon, &mut rng);
        MonteCarloAgent::with_tables(name, learning_rate, action_values, policy, rng)
    }
}

impl<P: Policy> MonteCarloAgent<P> {
    /// Builds an agent from existing tables, e.g. ones learned earlier.
    /// Panics if `learning_rate` is not in (0, 1].
    pub fn with_tables(
        name: &str,
        learning_rate: f64,
        action_values: StateArray<[f64; 2]>,
        policy: P,
        rng: StdRng,
    ) -> Self {
        if !(learning_rate > 0.0 && learning_rate <= 1.0) {
            panic!("Invalid learning rate! It must be in (0, 1]")
        }
        MonteCarloAgent {
            seat: Seat::new(name),
            learning_rate,
            action_values,
            policy,
            episode: VecDeque::new(),
            rng,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn action_value(&self, state: State, action: Action) -> f64 {
        self.action_values[state][action.index()]
    }

    pub fn action_values(&self) -> &StateArray<[f64; 2]> {
        &self.action_values
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn episode(&self) -> impl Iterator<Item = &(State, Action)> {
        self.episode.iter()
    }

    /// Moves the value of every pair in the episode toward `reward`, re-derives the policy at the
    /// visited states and starts a fresh episode. Returns the largest change made to any value.
    pub fn learn_from_episode(&mut self, reward: f64) -> f64 {
        let mut largest_change: f64 = 0.0;
        for (state, action) in self.episode.drain(..) {
            let values = &mut self.action_values[state];
            let change = self.learning_rate * (reward - values[action.index()]);
            values[action.index()] += change;
            largest_change = largest_change.max(change.abs());
            trace!(
                score = state.score(),
                up = state.dealer_up_card(),
                usable = state.usable_high_card(),
                ?action,
                value = values[action.index()],
                "updated action value"
            );
            self.policy.improve(state, values);
        }
        largest_change
    }
}

impl<P: Policy> Player for MonteCarloAgent<P> {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn hit_or_stay(&mut self, dealer_face_up: Card) -> bool {
        let state = State::observe(self.seat.hand(), dealer_face_up);
        let action = self.policy.choose(state, &mut self.rng);
        self.episode.push_front((state, action));
        action.is_hit()
    }

    fn update_outcome(&mut self, game_id: GameId, outcome: Outcome) {
        self.seat.record_outcome(game_id, outcome);
        self.learn_from_episode(outcome.reward());
    }

    /// A round that ended without an outcome teaches nothing, so its trace is dropped with the
    /// cards.
    fn clear_hand(&mut self) {
        self.episode.clear();
        self.seat.hand_mut().clear();
    }
}

/// Independent uniform values in [0, 1) for every state-action pair.
fn random_action_values<R: Rng + ?Sized>(rng: &mut R) -> StateArray<[f64; 2]> {
    StateArray::from_fn(|_| [rng.gen(), rng.gen()])
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{
        simulation::{deck::Deck, player::Dealer, Game, Rank, Suit},
        Rule,
    };

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Diamond)
    }

    #[test]
    fn initial_values_are_in_unit_interval() {
        let agent = GreedyAgent::greedy("g", 0.1, StdRng::seed_from_u64(1));
        for (_, values) in agent.action_values().iter() {
            assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
        }
    }

    #[test]
    fn same_seed_gives_same_tables() {
        let a = SoftAgent::soft("a", 0.1, 0.1, StdRng::seed_from_u64(9));
        let b = SoftAgent::soft("b", 0.1, 0.1, StdRng::seed_from_u64(9));
        assert_eq!(a.action_values(), b.action_values());
        assert_eq!(a.policy().probabilities(), b.policy().probabilities());
    }

    #[test]
    fn decisions_are_recorded_most_recent_first() {
        let mut agent = GreedyAgent::greedy("g", 0.1, StdRng::seed_from_u64(2));
        let up = card(Rank::Nine);
        agent.get_hand(vec![card(Rank::Two), card(Rank::Three)]);
        let first = agent.hit_or_stay(up);
        agent.add_card(vec![card(Rank::Ace)]);
        let second = agent.hit_or_stay(up);

        let episode: Vec<(State, Action)> = agent.episode().copied().collect();
        assert_eq!(
            episode,
            vec![
                (State::new(16, 9, true), Action::from(second)),
                (State::new(5, 9, false), Action::from(first)),
            ]
        );
    }

    #[test]
    fn outcome_updates_every_visited_pair() {
        let mut agent = GreedyAgent::greedy("g", 0.25, StdRng::seed_from_u64(3));
        let up = card(Rank::King);
        agent.get_hand(vec![card(Rank::Ten), card(Rank::Two)]);
        let first_state = State::new(12, 10, false);
        let first_action = Action::from(agent.hit_or_stay(up));
        agent.add_card(vec![card(Rank::Three)]);
        let second_state = State::new(15, 10, false);
        let second_action = Action::from(agent.hit_or_stay(up));

        let before_first = agent.action_value(first_state, first_action);
        let before_second = agent.action_value(second_state, second_action);
        let untouched = agent.action_value(first_state, first_action.other());

        agent.update_outcome(7, Outcome::Win);

        let expected_first = before_first + 0.25 * (1.0 - before_first);
        let expected_second = before_second + 0.25 * (1.0 - before_second);
        assert!((agent.action_value(first_state, first_action) - expected_first).abs() < 1e-12);
        assert!((agent.action_value(second_state, second_action) - expected_second).abs() < 1e-12);
        assert_eq!(agent.action_value(first_state, first_action.other()), untouched);
        assert_eq!(agent.episode().count(), 0);
        assert_eq!(agent.outcome(7), Some(Outcome::Win));
    }

    #[test]
    fn greedy_policy_follows_updated_values() {
        let mut agent = GreedyAgent::greedy("g", 1.0, StdRng::seed_from_u64(4));
        let up = card(Rank::Six);
        let state = State::new(20, 6, false);
        agent.get_hand(vec![card(Rank::Ten), card(Rank::Queen)]);
        let action = Action::from(agent.hit_or_stay(up));

        // A learning rate of 1 replaces the value with the reward.
        agent.update_outcome(1, Outcome::Lose);
        assert_eq!(agent.action_value(state, action), -1.0);
        assert_eq!(agent.policy().preferred(state), action.other());
    }

    #[test]
    fn soft_policy_stays_normalized_after_updates() {
        let mut agent = SoftAgent::soft("s", 0.5, 0.1, StdRng::seed_from_u64(5));
        let up = card(Rank::Ace);
        let state = State::new(13, 1, false);
        for game_id in 0..20 {
            agent.get_hand(vec![card(Rank::Nine), card(Rank::Four)]);
            agent.hit_or_stay(up);
            agent.update_outcome(game_id, Outcome::Draw);
            agent.clear_hand();
            let probabilities = agent.policy().probabilities()[state];
            assert!((probabilities[0] + probabilities[1] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn repeated_reward_shrinks_updates() {
        let mut agent = GreedyAgent::greedy("g", 0.1, StdRng::seed_from_u64(6));
        let up = card(Rank::Seven);
        let mut last_change = f64::INFINITY;
        for game_id in 0..200 {
            agent.get_hand(vec![card(Rank::Ten), card(Rank::Eight)]);
            agent.hit_or_stay(up);
            agent.seat_mut().record_outcome(game_id, Outcome::Win);
            let change = agent.learn_from_episode(Outcome::Win.reward());
            agent.clear_hand();
            assert!(change <= last_change + 1e-12);
            last_change = change;
        }
        assert!(last_change < 1e-3);
    }

    #[test]
    fn failed_round_leaves_no_trace_to_learn_from() {
        let rule = Rule {
            shuffle_times: 0,
            ..Default::default()
        };
        let deck = Deck::new(
            [Rank::Two, Rank::Three, Rank::Four, Rank::Five]
                .into_iter()
                .map(card)
                .collect(),
        );
        let mut game = Game::new(&rule, deck, StdRng::seed_from_u64(0));
        let mut dealer = Dealer::new(&rule);
        let mut agent = GreedyAgent::greedy("g", 0.5, StdRng::seed_from_u64(7));
        let before = agent.action_values().clone();

        let mut players: [&mut dyn Player; 1] = [&mut agent];
        // Whether the agent hits or stays, the four cards run out during the round.
        assert!(game
            .play_round(1, &mut players, &mut dealer, &mut ())
            .is_err());

        assert_eq!(agent.episode().count(), 0);
        assert_eq!(agent.score(), 0);
        assert_eq!(agent.outcome(1), None);
        assert_eq!(agent.action_values(), &before);
    }

    #[test]
    fn clearing_the_hand_drops_the_episode() {
        let mut agent = SoftAgent::soft("s", 0.1, 0.1, StdRng::seed_from_u64(8));
        agent.get_hand(vec![card(Rank::Two), card(Rank::Three)]);
        agent.hit_or_stay(card(Rank::Nine));
        assert_eq!(agent.episode().count(), 1);

        agent.clear_hand();
        assert_eq!(agent.episode().count(), 0);
        assert!(agent.hand().get_cards().is_empty());
    }

    #[test]
    fn training_against_the_dealer_keeps_values_bounded() {
        let rule = Rule::default();
        let mut game = Game::new(&rule, Deck::standard(), StdRng::seed_from_u64(10));
        let mut dealer = Dealer::new(&rule);
        let mut greedy = GreedyAgent::greedy("greedy", 0.05, StdRng::seed_from_u64(11));
        let mut soft = SoftAgent::soft("soft", 0.05, 0.1, StdRng::seed_from_u64(12));

        for game_id in 0..5000 {
            let mut players: [&mut dyn Player; 2] = [&mut greedy, &mut soft];
            game.play_round(game_id, &mut players, &mut dealer, &mut ())
                .unwrap();
        }

        for agent_values in [greedy.action_values(), soft.action_values()] {
            for (_, values) in agent_values.iter() {
                assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
            }
        }
        assert_eq!(greedy.seat().outcomes().len(), 5000);
        assert_eq!(greedy.episode().count(), 0);
        // Standing on 20 beats the dealer far more often than hitting it.
        let state = State::new(20, 10, false);
        assert_eq!(greedy.policy().preferred(state), Action::Stay);
    }
}
