use color_eyre::eyre::{
    Report,
    eyre,
};
use rand::Rng;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "piedra")]
    Rock,
    #[serde(rename = "papel")]
    Paper,
    #[serde(rename = "tijera")]
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Move {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "piedra" | "rock" => Ok(Move::Rock),
            "papel" | "paper" => Ok(Move::Paper),
            "tijera" | "scissors" => Ok(Move::Scissors),
            other => Err(eyre!(
                "Unknown move '{other}'; expected rock, paper or scissors"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "Ganaste")]
    Win,
    #[serde(rename = "Perdiste")]
    Loss,
    #[serde(rename = "Empate")]
    Draw,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Draw => "Draw",
        }
    }
}

/// Outcome of `user` against `computer`, from the user's side.
pub fn judge(user: Move, computer: Move) -> Outcome {
    if user == computer {
        Outcome::Draw
    } else if user.beats() == computer {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

/// Source of the computer's moves.
pub trait Opponent {
    fn next_move(&mut self) -> Move;
}

#[derive(Debug)]
pub struct RandomOpponent<R> {
    rng: R,
}

impl<R: Rng> RandomOpponent<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomOpponent<rand::rngs::ThreadRng> {
    pub fn from_thread_rng() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: Rng> Opponent for RandomOpponent<R> {
    fn next_move(&mut self) -> Move {
        Move::ALL[self.rng.random_range(0..Move::ALL.len())]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedOpponent(pub Move);

impl Opponent for FixedOpponent {
    fn next_move(&mut self) -> Move {
        self.0
    }
}

impl<O: Opponent + ?Sized> Opponent for Box<O> {
    fn next_move(&mut self) -> Move {
        (**self).next_move()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RoundResolution {
    pub computer_move: Move,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub struct RoundEngine<O> {
    opponent: O,
}

impl<O: Opponent> RoundEngine<O> {
    pub fn new(opponent: O) -> Self {
        Self { opponent }
    }

    pub fn decide_outcome(&mut self, user_move: Move) -> RoundResolution {
        let computer_move = self.opponent.next_move();
        RoundResolution {
            computer_move,
            outcome: judge(user_move, computer_move),
        }
    }
}
