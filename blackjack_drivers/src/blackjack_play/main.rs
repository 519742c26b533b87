use std::error::Error;
use std::io;

use blackjack::{
    simulation::{
        deck::Deck,
        player::{Dealer, GameId, Player},
        Game, GameEventHandler,
    },
    strategy::HumanPlayer,
    Outcome, Rule,
};
use blackjack_drivers::make_rng;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// Your name at the table
    #[arg(short, long, default_value_t = String::from("Player"))]
    name: String,

    /// Number of rounds to play
    #[arg(short, long, default_value_t = 5)]
    rounds: u64,

    /// Seed for shuffling
    #[arg(short, long)]
    seed: Option<u64>,
}

struct Reporter;

impl GameEventHandler for Reporter {
    fn on_round_begin(&mut self, game_id: GameId, _deck: &Deck) {
        println!("Game #{}", game_id);
    }

    fn on_bust(&mut self, player: &dyn Player) {
        println!("{} busts with {}", player.name(), player.score());
    }

    fn on_outcome(
        &mut self,
        _game_id: GameId,
        player: &dyn Player,
        player_outcome: Outcome,
        dealer: &Dealer,
        dealer_outcome: Outcome,
    ) {
        print!("Dealer cards:");
        for card in dealer.hand().get_cards() {
            print!(" {}", card);
        }
        println!();
        println!(
            "{}: {} ({})   {}: {} ({})",
            player.name(),
            player_outcome,
            player.score(),
            dealer.name(),
            dealer_outcome,
            dealer.score()
        );
        println!("----------------------------------------------------");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = CommandLineArgs::parse();
    let rule = Rule::default();
    let mut game = Game::new(&rule, Deck::standard(), make_rng(args.seed, 0));
    let mut dealer = Dealer::new(&rule);
    let mut human = HumanPlayer::new(&args.name, io::stdin().lock(), io::stdout());

    for game_id in 0..args.rounds {
        let mut players: [&mut dyn Player; 1] = [&mut human];
        game.play_round(game_id, &mut players, &mut dealer, &mut Reporter)?;
    }

    let total: i64 = human
        .seat()
        .outcomes()
        .values()
        .map(|outcome| outcome.value() as i64)
        .sum();
    println!("{} finished {} rounds with {}", args.name, args.rounds, total);
    Ok(())
}
