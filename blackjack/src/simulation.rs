pub mod deck;
pub mod hand;
pub mod player;

use blackjack_macros::allowed_phase;
use rand::rngs::StdRng;
use strum_macros::EnumIter;
use tracing::{debug, warn};

use crate::{BlackjackError, BothBustPolicy, Outcome, Rule};

use self::{
    deck::Deck,
    player::{Dealer, GameId, Player},
};

const INITIAL_CARDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// Represents a card in the real world with a suit and a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    /// 1 stands for A. 10 stands for 10, J, Q and K.
    pub fn blackjack_value(&self) -> u8 {
        match self.rank {
            Rank::Ace => 1,
            Rank::Jack | Rank::Queen | Rank::King => 10,
            rank => rank as u8,
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        };
        let value = match self.rank {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        };
        write!(f, "{}{}", suit, value)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.suit as u8 * 13 + card.rank as u8 - Rank::Two as u8
    }
}

/// The step of a round that is due next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Shuffle and deal the initial cards.
    NotStarted,
    /// Players take their turns.
    Dealt,
    /// Set while players are taking their turns.
    PlayersActing,
    /// The dealer takes its turn.
    DealerActing,
    /// Every hand is final; outcomes are due.
    Resolved,
    /// Outcomes are recorded; cards go back to the deck.
    Reset,
}

/// Observes a round as it is played. Every method defaults to doing nothing.
pub trait GameEventHandler {
    fn on_round_begin(&mut self, _game_id: GameId, _deck: &Deck) {}
    fn on_deal_cards(&mut self, _player: &dyn Player) {}
    fn on_decision(&mut self, _player: &dyn Player, _hit: bool) {}
    fn on_bust(&mut self, _player: &dyn Player) {}
    fn on_outcome(
        &mut self,
        _game_id: GameId,
        _player: &dyn Player,
        _player_outcome: Outcome,
        _dealer: &Dealer,
        _dealer_outcome: Outcome,
    ) {
    }
    fn on_round_end(&mut self, _game_id: GameId) {}
}

impl GameEventHandler for () {}

/// Runs rounds at one table. The table owns the deck and the shuffling source; players and the
/// dealer are lent to it for each round so the caller keeps their learned state.
pub struct Game {
    rule: Rule,
    deck: Deck,
    rng: StdRng,
    current_game_phase: GamePhase,
}

impl Game {
    pub fn new(rule: &Rule, deck: Deck, rng: StdRng) -> Self {
        Game {
            rule: *rule,
            deck,
            rng,
            current_game_phase: GamePhase::NotStarted,
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn phase(&self) -> GamePhase {
        self.current_game_phase
    }

    /// Plays one full round: deal, players in order, dealer, outcomes, reset.
    /// Afterwards every participant has an outcome for `game_id` and no cards.
    pub fn play_round<H: GameEventHandler>(
        &mut self,
        game_id: GameId,
        players: &mut [&mut dyn Player],
        dealer: &mut Dealer,
        handler: &mut H,
    ) -> Result<(), BlackjackError> {
        handler.on_round_begin(game_id, &self.deck);
        let result = self.play_round_steps(game_id, players, dealer, handler);
        if let Err(err) = result {
            if !matches!(err, BlackjackError::WrongPhase { .. }) {
                warn!(game_id, %err, "round failed, abandoning it");
                self.abandon_round(players, dealer);
            }
            return Err(err);
        }
        handler.on_round_end(game_id);
        Ok(())
    }

    fn play_round_steps<H: GameEventHandler>(
        &mut self,
        game_id: GameId,
        players: &mut [&mut dyn Player],
        dealer: &mut Dealer,
        handler: &mut H,
    ) -> Result<(), BlackjackError> {
        self.deal_initial_cards(players, dealer, handler)?;
        self.play_players(players, dealer, handler)?;
        self.play_dealer(dealer, handler)?;
        self.resolve_outcomes(game_id, players, dealer, handler)?;
        self.reset_round(players, dealer)
    }

    /// Can be called at any phase.
    /// Drops the round in progress: every card goes back to the deck, every hand is emptied and
    /// the table is ready to deal again. Outcomes already recorded are kept.
    pub fn abandon_round(&mut self, players: &mut [&mut dyn Player], dealer: &mut Dealer) {
        self.deck.reclaim();
        for player in players.iter_mut() {
            player.clear_hand();
        }
        dealer.clear_hand();
        self.current_game_phase = GamePhase::NotStarted;
    }

    /// Can be called at NotStarted phase.
    /// Shuffles, then deals two cards to each player in order and two to the dealer last.
    /// The dealer's first card becomes its face-up card.
    #[allowed_phase(NotStarted)]
    pub fn deal_initial_cards<H: GameEventHandler>(
        &mut self,
        players: &mut [&mut dyn Player],
        dealer: &mut Dealer,
        handler: &mut H,
    ) -> Result<(), BlackjackError> {
        self.deck.shuffle(self.rule.shuffle_times, &mut self.rng);

        let needed = INITIAL_CARDS * (players.len() + 1);
        if needed > self.deck.remaining().len() {
            return Err(BlackjackError::InsufficientCards {
                requested: needed,
                remaining: self.deck.remaining().len(),
            });
        }

        for player in players.iter_mut() {
            let cards = self.deck.deal(INITIAL_CARDS)?;
            player.get_hand(cards);
            debug!(player = player.name(), score = player.score(), "dealt");
            handler.on_deal_cards(&**player);
        }
        let cards = self.deck.deal(INITIAL_CARDS)?;
        dealer.get_hand(cards);
        debug!(player = dealer.name(), score = dealer.score(), "dealt");
        handler.on_deal_cards(&*dealer);

        self.current_game_phase = GamePhase::Dealt;
        Ok(())
    }

    /// Can be called at Dealt phase.
    /// Each player in turn keeps hitting until it stays or busts.
    #[allowed_phase(Dealt)]
    pub fn play_players<H: GameEventHandler>(
        &mut self,
        players: &mut [&mut dyn Player],
        dealer: &Dealer,
        handler: &mut H,
    ) -> Result<(), BlackjackError> {
        let face_up = face_up_card(dealer)?;
        self.current_game_phase = GamePhase::PlayersActing;
        for player in players.iter_mut() {
            play_turn(&mut self.deck, &mut **player, face_up, handler)?;
        }
        self.current_game_phase = GamePhase::DealerActing;
        Ok(())
    }

    /// Can be called at DealerActing phase.
    #[allowed_phase(DealerActing)]
    pub fn play_dealer<H: GameEventHandler>(
        &mut self,
        dealer: &mut Dealer,
        handler: &mut H,
    ) -> Result<(), BlackjackError> {
        let face_up = face_up_card(dealer)?;
        play_turn(&mut self.deck, dealer, face_up, handler)?;
        self.current_game_phase = GamePhase::Resolved;
        Ok(())
    }

    /// Can be called at Resolved phase.
    /// Compares each player with the dealer and records the result on both sides.
    #[allowed_phase(Resolved)]
    pub fn resolve_outcomes<H: GameEventHandler>(
        &mut self,
        game_id: GameId,
        players: &mut [&mut dyn Player],
        dealer: &mut Dealer,
        handler: &mut H,
    ) -> Result<(), BlackjackError> {
        for player in players.iter_mut() {
            let (player_outcome, dealer_outcome) = resolve_outcome(
                player.score(),
                player.bust(),
                dealer.score(),
                dealer.bust(),
                self.rule.both_bust_policy,
            );
            player.update_outcome(game_id, player_outcome);
            dealer.update_outcome(game_id, dealer_outcome);
            debug!(
                game_id,
                player = player.name(),
                score = player.score(),
                outcome = player_outcome.value(),
                dealer_score = dealer.score(),
                "resolved"
            );
            handler.on_outcome(game_id, &**player, player_outcome, dealer, dealer_outcome);
        }
        self.current_game_phase = GamePhase::Reset;
        Ok(())
    }

    /// Can be called at Reset phase.
    /// Returns every card to the deck and empties every hand. Outcomes are kept.
    #[allowed_phase(Reset)]
    pub fn reset_round(
        &mut self,
        players: &mut [&mut dyn Player],
        dealer: &mut Dealer,
    ) -> Result<(), BlackjackError> {
        self.deck.reclaim();
        for player in players.iter_mut() {
            player.clear_hand();
        }
        dealer.clear_hand();
        self.current_game_phase = GamePhase::NotStarted;
        Ok(())
    }
}

/// Decides the result for a player and for the dealer. Ties go to the dealer.
pub fn resolve_outcome(
    player_score: u16,
    player_bust: bool,
    dealer_score: u16,
    dealer_bust: bool,
    both_bust_policy: BothBustPolicy,
) -> (Outcome, Outcome) {
    match (player_bust, dealer_bust) {
        (true, true) => match both_bust_policy {
            BothBustPolicy::Draw => (Outcome::Draw, Outcome::Draw),
            BothBustPolicy::BothLose => (Outcome::Lose, Outcome::Lose),
        },
        (true, false) => (Outcome::Lose, Outcome::Win),
        (false, true) => (Outcome::Win, Outcome::Lose),
        (false, false) if player_score > dealer_score => (Outcome::Win, Outcome::Lose),
        (false, false) => (Outcome::Lose, Outcome::Win),
    }
}

fn face_up_card(dealer: &Dealer) -> Result<Card, BlackjackError> {
    dealer
        .face_up()
        .ok_or(BlackjackError::Internal("dealer has no face-up card"))
}

fn play_turn<H: GameEventHandler>(
    deck: &mut Deck,
    player: &mut dyn Player,
    face_up: Card,
    handler: &mut H,
) -> Result<(), BlackjackError> {
    while !player.bust() {
        let hit = player.hit_or_stay(face_up);
        debug!(player = player.name(), score = player.score(), hit, "decision");
        handler.on_decision(&*player, hit);
        if !hit {
            break;
        }
        player.add_card(deck.deal(1)?);
        if player.bust() {
            debug!(player = player.name(), score = player.score(), "bust");
            handler.on_bust(&*player);
        }
    }
    Ok(())
}
