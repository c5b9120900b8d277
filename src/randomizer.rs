use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::piece::{Piece, Tetromino};

/// Supplies the next falling piece to a session.
pub trait PieceSource {
    fn next_piece(&mut self) -> Piece;
    /// The piece `next_piece` will hand out, without consuming it.
    fn preview(&self) -> &Piece;
}

#[derive(Clone, Serialize, Deserialize, Tsify, Debug, PartialEq, Eq)]
pub enum RandomizerKind {
    TrueRandom { seed: Option<u64> },
    SevenBag { seed: Option<u64> },
    SinglePiece { piece: Tetromino },
}

impl Default for RandomizerKind {
    fn default() -> Self {
        RandomizerKind::TrueRandom { seed: None }
    }
}

pub trait Randomizer {
    fn next(&mut self) -> Tetromino;
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Uniform pick over the seven shapes.
pub struct TrueRandom {
    rng: StdRng,
}

impl TrueRandom {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: rng_from(seed) }
    }
}

impl Randomizer for TrueRandom {
    fn next(&mut self) -> Tetromino {
        let all = Tetromino::all();
        all[self.rng.gen_range(0..all.len())]
    }
}

pub struct SinglePiece {
    piece: Tetromino,
}

impl Randomizer for SinglePiece {
    fn next(&mut self) -> Tetromino {
        self.piece
    }
}

pub struct SevenBag {
    rng: StdRng,
    bag: Vec<Tetromino>,
}

impl SevenBag {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: rng_from(seed),
            bag: Vec::new(),
        }
    }

    fn refill(&mut self) {
        self.bag = Tetromino::all().to_vec();
        self.bag.shuffle(&mut self.rng);
    }
}

impl Randomizer for SevenBag {
    fn next(&mut self) -> Tetromino {
        if self.bag.is_empty() {
            self.refill();
        }
        match self.bag.pop() {
            Some(piece) => piece,
            None => Tetromino::all()[0],
        }
    }
}

pub fn randomizer_from_kind(kind: &RandomizerKind) -> Box<dyn Randomizer> {
    match *kind {
        RandomizerKind::TrueRandom { seed } => Box::new(TrueRandom::new(seed)),
        RandomizerKind::SevenBag { seed } => Box::new(SevenBag::new(seed)),
        RandomizerKind::SinglePiece { piece } => Box::new(SinglePiece { piece }),
    }
}

/// Randomizer-backed source with one piece prefetched for the preview pane.
pub struct PieceQueue {
    randomizer: Box<dyn Randomizer>,
    next: Piece,
}

impl PieceQueue {
    pub fn new(mut randomizer: Box<dyn Randomizer>) -> Self {
        let next = Piece::new(randomizer.next());
        Self { randomizer, next }
    }

    pub fn from_kind(kind: &RandomizerKind) -> Self {
        Self::new(randomizer_from_kind(kind))
    }
}

impl PieceSource for PieceQueue {
    fn next_piece(&mut self) -> Piece {
        let following = Piece::new(self.randomizer.next());
        std::mem::replace(&mut self.next, following)
    }

    fn preview(&self) -> &Piece {
        &self.next
    }
}
