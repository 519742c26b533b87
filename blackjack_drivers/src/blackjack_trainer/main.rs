use std::error::Error;

use blackjack_drivers::parse_config_from_file;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod training;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_rl.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Number of rounds to play, instead of the one in the config file
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Seed for every random source, instead of the one in the config file
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = CommandLineArgs::parse();
    if args.config == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().ok_or("Cannot find home directory")?;
        let config_file_path = home_dir.join(".blackjack_rl.yml");
        if !config_file_path.exists() {
            return Err("Config file not exists".into());
        }
        if config_file_path.is_dir() {
            return Err("This should be a path rather than a directory".into());
        }
        args.config = config_file_path.to_string_lossy().into_owned();
    }
    let args = args;

    let mut config = parse_config_from_file(&args.config)?;
    if let Some(rounds) = args.rounds {
        config.trainer.rounds = rounds;
    }
    if args.seed.is_some() {
        config.trainer.seed = args.seed;
    }
    info!(config = %args.config, rounds = config.trainer.rounds, seed = ?config.trainer.seed, "training");

    let rule: blackjack::Rule = config.rule.try_into()?;
    let players = training::train(&rule, &config.trainer)?;
    training::print_learned_policies(&players);
    Ok(())
}
