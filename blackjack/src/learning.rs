//! Tabular Monte-Carlo control for the hit/stay decision.

pub mod agent;
pub mod policy;

pub use agent::{GreedyAgent, MonteCarloAgent, SoftAgent};
pub use policy::{best_action, GreedyPolicy, Policy, SoftPolicy};
