use blackjack::{
    learning::{GreedyAgent, SoftAgent},
    simulation::player::{Player, DEALER_NAME},
    strategy::{BenchmarkPlayer, BenchmarkStrategy, ProbabilityPlayer},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value: {0}")]
    InvalidValue(#[from] serde::de::value::Error),

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("player name {0:?} is taken by the dealer or another player")]
    NameTaken(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub trainer: ConfigTrainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub shuffle_times: u8,
    pub dealer_hit_limit: u16,
    pub both_bust_policy: String,
}

impl TryInto<blackjack::Rule> for ConfigRule {
    type Error = serde::de::value::Error;

    fn try_into(self) -> Result<blackjack::Rule, Self::Error> {
        let blackjack_rule = blackjack::Rule {
            shuffle_times: self.shuffle_times,
            dealer_hit_limit: self.dealer_hit_limit,
            both_bust_policy: self.both_bust_policy.parse()?,
        };

        Ok(blackjack_rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigTrainer {
    pub rounds: u64,
    pub report_every: u64,
    pub seed: Option<u64>,
    pub players: Vec<ConfigPlayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPlayer {
    pub name: String,
    /// One of Greedy, Soft, Probability, Random, Hit, Stay.
    pub kind: String,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_hit_probability")]
    pub hit_probability: f64,
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_epsilon() -> f64 {
    0.1
}

fn default_hit_probability() -> f64 {
    ProbabilityPlayer::DEFAULT_HIT_PROBABILITY
}

/// A configured seat at the table. Learning agents stay concrete so their tables can be read
/// back after training.
pub enum TablePlayer {
    Greedy(GreedyAgent),
    Soft(SoftAgent),
    Probability(ProbabilityPlayer),
    Benchmark(BenchmarkPlayer),
}

impl TablePlayer {
    pub fn as_player_mut(&mut self) -> &mut dyn Player {
        match self {
            TablePlayer::Greedy(agent) => agent,
            TablePlayer::Soft(agent) => agent,
            TablePlayer::Probability(player) => player,
            TablePlayer::Benchmark(player) => player,
        }
    }

    pub fn as_player(&self) -> &dyn Player {
        match self {
            TablePlayer::Greedy(agent) => agent,
            TablePlayer::Soft(agent) => agent,
            TablePlayer::Probability(player) => player,
            TablePlayer::Benchmark(player) => player,
        }
    }
}

/// Seeds a random source. The same base seed always gives the same stream per stream index.
pub fn make_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

/// Builds a player from its config. `stream` picks the player's own random stream.
pub fn build_player(
    config: &ConfigPlayer,
    seed: Option<u64>,
    stream: u64,
) -> Result<TablePlayer, ConfigError> {
    let rng = make_rng(seed, stream);
    let player = match config.kind.as_str() {
        "Greedy" | "Soft" if !(config.learning_rate > 0.0 && config.learning_rate <= 1.0) => {
            return Err(ConfigError::OutOfRange {
                field: "learning_rate",
                value: config.learning_rate,
            });
        }
        "Soft" if !(0.0..=1.0).contains(&config.epsilon) => {
            return Err(ConfigError::OutOfRange {
                field: "epsilon",
                value: config.epsilon,
            });
        }
        "Probability" if !(0.0..=1.0).contains(&config.hit_probability) => {
            return Err(ConfigError::OutOfRange {
                field: "hit_probability",
                value: config.hit_probability,
            });
        }
        "Greedy" => TablePlayer::Greedy(GreedyAgent::greedy(
            &config.name,
            config.learning_rate,
            rng,
        )),
        "Soft" => TablePlayer::Soft(SoftAgent::soft(
            &config.name,
            config.learning_rate,
            config.epsilon,
            rng,
        )),
        "Probability" => TablePlayer::Probability(ProbabilityPlayer::new(
            &config.name,
            config.hit_probability,
            rng,
        )),
        other => {
            let strategy: BenchmarkStrategy = other.parse()?;
            TablePlayer::Benchmark(BenchmarkPlayer::new(&config.name, strategy, rng))
        }
    };
    Ok(player)
}

/// Builds every configured player in seat order. Player `i` draws from random stream `i + 1`;
/// stream 0 is left for the table. Names must be unique and must not be the dealer's.
pub fn build_players(trainer: &ConfigTrainer) -> Result<Vec<TablePlayer>, ConfigError> {
    let mut players: Vec<TablePlayer> = Vec::with_capacity(trainer.players.len());
    for (i, config) in trainer.players.iter().enumerate() {
        let taken = config.name == DEALER_NAME
            || players
                .iter()
                .any(|player| player.as_player().name() == config.name);
        if taken {
            return Err(ConfigError::NameTaken(config.name.clone()));
        }
        players.push(build_player(config, trainer.seed, i as u64 + 1)?);
    }
    Ok(players)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> Result<Config, ConfigError> {
    let file_content = fs::read_to_string(filename).map_err(|source| ConfigError::Io {
        path: String::from(filename),
        source,
    })?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPICAL_CONFIG: &str = r#"
rule:
  shuffle_times: 5
  dealer_hit_limit: 17
  both_bust_policy: Draw
trainer:
  rounds: 1000
  report_every: 100
  seed: 42
  players:
    - name: greedy
      kind: Greedy
      learning_rate: 0.05
    - name: soft
      kind: Soft
      epsilon: 0.2
    - name: coin
      kind: Random
"#;

    fn get_typical_config_rule() -> ConfigRule {
        ConfigRule {
            shuffle_times: 5,
            dealer_hit_limit: 17,
            both_bust_policy: String::from("BothLose"),
        }
    }

    #[test]
    fn can_convert_rule() {
        let config_rule = get_typical_config_rule();
        let converted_rule: blackjack::Rule = config_rule.try_into().unwrap();
        assert_eq!(converted_rule.shuffle_times, 5);
        assert_eq!(converted_rule.dealer_hit_limit, 17);
        assert_eq!(
            converted_rule.both_bust_policy,
            blackjack::BothBustPolicy::BothLose
        );
    }

    #[test]
    fn should_return_error_when_converting_rule() {
        let mut config_rule = get_typical_config_rule();
        config_rule.both_bust_policy = String::from("Not a policy");
        let convert_result: Result<blackjack::Rule, serde::de::value::Error> =
            config_rule.try_into();
        assert!(convert_result.is_err());
    }

    #[test]
    fn can_parse_config_with_defaults() {
        let config = parse_config(TYPICAL_CONFIG).unwrap();
        assert_eq!(config.trainer.rounds, 1000);
        assert_eq!(config.trainer.seed, Some(42));
        assert_eq!(config.trainer.players.len(), 3);
        assert_eq!(config.trainer.players[0].learning_rate, 0.05);
        assert_eq!(config.trainer.players[1].learning_rate, 0.01);
        assert_eq!(config.trainer.players[1].epsilon, 0.2);
        assert_eq!(config.trainer.players[2].hit_probability, 0.9);
    }

    #[test]
    fn builds_every_kind_of_player() {
        let config = parse_config(TYPICAL_CONFIG).unwrap();
        let players: Vec<TablePlayer> = config
            .trainer
            .players
            .iter()
            .enumerate()
            .map(|(i, player)| build_player(player, config.trainer.seed, i as u64).unwrap())
            .collect();
        assert!(matches!(players[0], TablePlayer::Greedy(_)));
        assert!(matches!(players[1], TablePlayer::Soft(_)));
        assert!(matches!(players[2], TablePlayer::Benchmark(_)));
        assert_eq!(players[2].as_player().name(), "coin");
    }

    #[test]
    fn unknown_player_kind_is_rejected() {
        let config = ConfigPlayer {
            name: String::from("x"),
            kind: String::from("Counter"),
            learning_rate: 0.01,
            epsilon: 0.1,
            hit_probability: 0.9,
        };
        assert!(matches!(
            build_player(&config, Some(1), 0),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    fn player_config(kind: &str) -> ConfigPlayer {
        ConfigPlayer {
            name: String::from("x"),
            kind: String::from(kind),
            learning_rate: default_learning_rate(),
            epsilon: default_epsilon(),
            hit_probability: default_hit_probability(),
        }
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        for (kind, learning_rate) in [("Greedy", 0.0), ("Greedy", 1.5), ("Soft", -0.1)] {
            let config = ConfigPlayer {
                learning_rate,
                ..player_config(kind)
            };
            assert!(matches!(
                build_player(&config, Some(1), 0),
                Err(ConfigError::OutOfRange { field: "learning_rate", value }) if value == learning_rate
            ));
        }

        let config = ConfigPlayer {
            epsilon: 1.2,
            ..player_config("Soft")
        };
        assert!(matches!(
            build_player(&config, Some(1), 0),
            Err(ConfigError::OutOfRange { field: "epsilon", .. })
        ));

        let config = ConfigPlayer {
            hit_probability: f64::NAN,
            ..player_config("Probability")
        };
        assert!(matches!(
            build_player(&config, Some(1), 0),
            Err(ConfigError::OutOfRange { field: "hit_probability", .. })
        ));
    }

    #[test]
    fn boundary_numbers_are_accepted() {
        let config = ConfigPlayer {
            learning_rate: 1.0,
            epsilon: 0.0,
            ..player_config("Soft")
        };
        assert!(matches!(
            build_player(&config, Some(1), 0),
            Ok(TablePlayer::Soft(_))
        ));

        // Benchmark players ignore the learning numbers.
        let config = ConfigPlayer {
            learning_rate: 0.0,
            ..player_config("Stay")
        };
        assert!(build_player(&config, Some(1), 0).is_ok());
    }

    #[test]
    fn build_players_rejects_taken_names() {
        let mut config = parse_config(TYPICAL_CONFIG).unwrap();
        assert_eq!(build_players(&config.trainer).unwrap().len(), 3);

        config.trainer.players[2].name = String::from("Dealer");
        assert!(matches!(
            build_players(&config.trainer),
            Err(ConfigError::NameTaken(name)) if name == "Dealer"
        ));

        config.trainer.players[2].name = String::from("greedy");
        assert!(matches!(
            build_players(&config.trainer),
            Err(ConfigError::NameTaken(name)) if name == "greedy"
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            parse_config_from_file("/nonexistent/blackjack_rl.yml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
