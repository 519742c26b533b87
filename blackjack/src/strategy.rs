use std::io::{BufRead, Write};

use rand::rngs::StdRng;
use rand::Rng;
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use tracing::warn;

use crate::{
    simulation::{
        player::{Player, Seat},
        Card,
    },
    Action,
};

/// Hits with a fixed probability, whatever the table shows.
pub struct ProbabilityPlayer {
    seat: Seat,
    hit_probability: f64,
    rng: StdRng,
}

impl ProbabilityPlayer {
    pub const DEFAULT_HIT_PROBABILITY: f64 = 0.9;

    /// Panics if `hit_probability` is not in [0, 1].
    pub fn new(name: &str, hit_probability: f64, rng: StdRng) -> Self {
        if !(0.0..=1.0).contains(&hit_probability) {
            panic!("Invalid hit probability! It must be in [0, 1]")
        }
        ProbabilityPlayer {
            seat: Seat::new(name),
            hit_probability,
            rng,
        }
    }
}

impl Player for ProbabilityPlayer {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn hit_or_stay(&mut self, _dealer_face_up: Card) -> bool {
        self.rng.gen_bool(self.hit_probability)
    }
}

/// Fixed strategies to compare learning agents against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum BenchmarkStrategy {
    Random,
    Hit,
    Stay,
}

pub struct BenchmarkPlayer {
    seat: Seat,
    strategy: BenchmarkStrategy,
    rng: StdRng,
}

impl BenchmarkPlayer {
    pub fn new(name: &str, strategy: BenchmarkStrategy, rng: StdRng) -> Self {
        BenchmarkPlayer {
            seat: Seat::new(name),
            strategy,
            rng,
        }
    }

    pub fn strategy(&self) -> BenchmarkStrategy {
        self.strategy
    }
}

impl Player for BenchmarkPlayer {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn hit_or_stay(&mut self, _dealer_face_up: Card) -> bool {
        match self.strategy {
            BenchmarkStrategy::Random => self.rng.gen_bool(0.5),
            BenchmarkStrategy::Hit => true,
            BenchmarkStrategy::Stay => false,
        }
    }
}

/// A person at the table. Shows the hand and asks until it reads `hit` or `stay`.
pub struct HumanPlayer<R: BufRead, W: Write> {
    seat: Seat,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(name: &str, input: R, output: W) -> Self {
        HumanPlayer {
            seat: Seat::new(name),
            input,
            output,
        }
    }

    fn show_table(&mut self, dealer_face_up: Card) -> std::io::Result<()> {
        let hand = self.seat.hand();
        let cards: Vec<String> = hand.get_cards().iter().map(|card| card.to_string()).collect();
        writeln!(self.output, "--------------")?;
        writeln!(self.output, "Dealer shows: {}", dealer_face_up)?;
        writeln!(self.output, "Your hand is: {}", cards.join(" "))?;
        writeln!(self.output, "Your score is: {}", hand.score())?;
        writeln!(self.output, "--------------")
    }

    /// Keeps asking until a valid answer arrives. Returns None once the input is closed.
    fn ask(&mut self) -> std::io::Result<Option<Action>> {
        loop {
            write!(self.output, "Do you want to hit or stay? ")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.parse::<Action>() {
                Ok(action) => return Ok(Some(action)),
                Err(err) => writeln!(self.output, "{}", err)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Player for HumanPlayer<R, W> {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn hit_or_stay(&mut self, dealer_face_up: Card) -> bool {
        let answer = self
            .show_table(dealer_face_up)
            .and_then(|_| self.ask());
        match answer {
            Ok(Some(action)) => action.is_hit(),
            Ok(None) => {
                warn!(player = self.seat.name(), "input closed, staying");
                false
            }
            Err(err) => {
                warn!(player = self.seat.name(), %err, "cannot talk to player, staying");
                false
            }
        }
    }
}
