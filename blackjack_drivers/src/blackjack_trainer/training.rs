use std::collections::HashMap;
use std::error::Error;

use self::private::Statistics;
use blackjack::{
    learning::Policy,
    simulation::{
        deck::Deck,
        player::{Dealer, GameId, Player},
        Game, GameEventHandler,
    },
    Action, Outcome, State,
};
use blackjack_drivers::{build_players, make_rng, ConfigTrainer, TablePlayer};
use tracing::info;

mod private {
    use blackjack::Outcome;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct Statistics {
        wins: u64,
        draws: u64,
        losses: u64,

        last_rounds: u64,
        last_total: i64,
    }

    impl Statistics {
        pub fn record(&mut self, outcome: Outcome) {
            match outcome {
                Outcome::Win => self.wins += 1,
                Outcome::Draw => self.draws += 1,
                Outcome::Lose => self.losses += 1,
            }
        }

        pub fn get_rounds(&self) -> u64 {
            self.wins + self.draws + self.losses
        }

        pub fn get_total(&self) -> i64 {
            self.wins as i64 - self.losses as i64
        }

        pub fn get_win_rate(&self) -> f64 {
            self.wins as f64 / self.get_rounds().max(1) as f64
        }

        pub fn get_draw_rate(&self) -> f64 {
            self.draws as f64 / self.get_rounds().max(1) as f64
        }

        /// Average outcome since the last call.
        pub fn get_recent_average(&mut self) -> f64 {
            let rounds = self.get_rounds() - self.last_rounds;
            let total = self.get_total() - self.last_total;
            self.last_rounds = self.get_rounds();
            self.last_total = self.get_total();
            total as f64 / rounds.max(1) as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Handler {
    rounds: u64,
    busts: HashMap<String, u64>,
    stats: Vec<(String, Statistics)>,
}

impl Handler {
    fn stats_for(&mut self, name: &str) -> &mut Statistics {
        let index = match self.stats.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.stats.push((String::from(name), Statistics::default()));
                self.stats.len() - 1
            }
        };
        &mut self.stats[index].1
    }

    fn report(&mut self) {
        for (name, stat) in self.stats.iter_mut() {
            let busts = self.busts.get(name.as_str()).copied().unwrap_or(0);
            let recent_average = stat.get_recent_average();
            info!(
                rounds = self.rounds,
                player = %name,
                win_rate = stat.get_win_rate(),
                draw_rate = stat.get_draw_rate(),
                recent_average,
                total = stat.get_total(),
                busts,
                "progress"
            );
        }
    }
}

impl GameEventHandler for Handler {
    fn on_bust(&mut self, player: &dyn Player) {
        *self.busts.entry(String::from(player.name())).or_insert(0) += 1;
    }

    fn on_outcome(
        &mut self,
        _game_id: GameId,
        player: &dyn Player,
        player_outcome: Outcome,
        dealer: &Dealer,
        dealer_outcome: Outcome,
    ) {
        self.stats_for(player.name()).record(player_outcome);
        self.stats_for(dealer.name()).record(dealer_outcome);
    }

    fn on_round_end(&mut self, _game_id: GameId) {
        self.rounds += 1;
    }
}

/// Plays the configured number of rounds and returns the players with what they learned.
pub fn train(
    rule: &blackjack::Rule,
    trainer_config: &ConfigTrainer,
) -> Result<Vec<TablePlayer>, Box<dyn Error>> {
    let mut players = build_players(trainer_config)?;
    let mut game = Game::new(rule, Deck::standard(), make_rng(trainer_config.seed, 0));
    let mut dealer = Dealer::new(rule);
    info!(
        shuffle_times = game.rule().shuffle_times,
        dealer_hit_limit = game.rule().dealer_hit_limit,
        both_bust_policy = ?game.rule().both_bust_policy,
        "table ready"
    );
    for player in &players {
        log_seat(player);
    }
    let mut handler: Handler = Default::default();

    for game_id in 0..trainer_config.rounds {
        let mut seats: Vec<&mut dyn Player> = players
            .iter_mut()
            .map(TablePlayer::as_player_mut)
            .collect();
        game.play_round(game_id, &mut seats, &mut dealer, &mut handler)?;

        // The handler already counted this round.
        for seat in seats.iter_mut() {
            seat.take_outcomes();
        }
        dealer.take_outcomes();

        if trainer_config.report_every > 0 && handler.rounds % trainer_config.report_every == 0 {
            handler.report();
        }
    }

    Ok(players)
}

fn log_seat(player: &TablePlayer) {
    let name = player.as_player().name();
    match player {
        TablePlayer::Greedy(agent) => {
            info!(player = name, learning_rate = agent.learning_rate(), "greedy agent seated")
        }
        TablePlayer::Soft(agent) => info!(
            player = name,
            learning_rate = agent.learning_rate(),
            epsilon = agent.policy().epsilon(),
            "soft agent seated"
        ),
        TablePlayer::Probability(_) => info!(player = name, "probability player seated"),
        TablePlayer::Benchmark(benchmark) => {
            info!(player = name, strategy = ?benchmark.strategy(), "benchmark player seated")
        }
    }
}

pub fn print_learned_policies(players: &[TablePlayer]) {
    for player in players {
        match player {
            TablePlayer::Greedy(agent) => {
                let header = format!(
                    "Policy learned by {} (greedy, learning rate {})",
                    agent.name(),
                    agent.learning_rate()
                );
                print_policy_charts(&header, agent.policy());
            }
            TablePlayer::Soft(agent) => {
                let header = format!(
                    "Policy learned by {} (soft, learning rate {}, epsilon {})",
                    agent.name(),
                    agent.learning_rate(),
                    agent.policy().epsilon()
                );
                print_policy_charts(&header, agent.policy());
            }
            _ => {}
        }
    }
}

/// Prints the favored action per hand and dealer up card, hard hands first, then soft hands.
fn print_policy_charts<P: Policy>(header: &str, policy: &P) {
    println!("{}", header);
    for (title, usable_high_card, scores) in [("Hard", false, 4..=21), ("Soft", true, 12..=21)] {
        println!("{} hands", title);
        print!("    ");
        for up in 1..=10 {
            print!(" {}", up_card_symbol(up));
        }
        println!();
        for score in scores {
            print!("{:>3} ", score);
            for up in 1..=10 {
                let state = State::new(score, up, usable_high_card);
                let symbol = match policy.preferred(state) {
                    Action::Hit => 'H',
                    Action::Stay => 'S',
                };
                print!(" {}", symbol);
            }
            println!();
        }
    }
    println!("----------------------------------------------------");
}

fn up_card_symbol(up: u8) -> char {
    match up {
        1 => 'A',
        10 => 'T',
        up => char::from(b'0' + up),
    }
}
