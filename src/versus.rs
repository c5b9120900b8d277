use serde::Serialize;
use tsify::Tsify;

use crate::grid::Grid;
use crate::input::{self, KeyBindings, KeyEventKind};
use crate::log;
use crate::piece::Point;
use crate::randomizer::{PieceQueue, PieceSource, RandomizerKind};
use crate::session::{DropSpeed, Lock, PieceSession, SessionStats};
use crate::settings::GameSettings;

/// Fill colors indexed by `color_id - 1`.
pub const PALETTE: [&str; 7] = [
    "#FF0D72", "#0DC2FF", "#0DFF72", "#F538FF", "#FF8E0D", "#FFE138", "#3877FF",
];

/// Receives `(player, score)` whenever a player's displayed score may change.
pub type ScoreSink = Box<dyn FnMut(usize, u32)>;

#[derive(Serialize, Tsify, Debug, Clone, PartialEq)]
pub struct MatrixView {
    pub width: usize,
    pub height: usize,
    pub rows: Vec<Vec<u8>>,
}

#[derive(Serialize, Tsify, Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub arena: MatrixView,
    pub piece: MatrixView,
    pub pos: Point,
    pub score: u32,
    pub speed: DropSpeed,
    pub stats: SessionStats,
}

#[derive(Serialize, Tsify, Debug, Clone, PartialEq)]
pub struct FrameView {
    pub players: Vec<PlayerView>,
    pub preview: MatrixView,
    pub palette: Vec<String>,
}

struct Seat {
    session: PieceSession,
    bindings: KeyBindings,
}

/// Independent sessions fed from one shared piece queue.
pub struct Versus {
    seats: Vec<Seat>,
    queue: PieceQueue,
    score_sinks: Vec<ScoreSink>,
}

impl Versus {
    pub fn new(settings: &GameSettings) -> Result<Self, String> {
        settings.validate()?;
        let mut queue = PieceQueue::from_kind(&settings.randomizer);
        let seats = (0..settings.players)
            .map(|idx| Seat {
                session: PieceSession::new(
                    Grid::new(settings.width, settings.height),
                    settings.timing(),
                    &mut queue,
                ),
                bindings: settings.bindings_for(idx),
            })
            .collect();
        Ok(Self {
            seats,
            queue,
            score_sinks: Vec::new(),
        })
    }

    pub fn players(&self) -> usize {
        self.seats.len()
    }

    pub fn session(&self, idx: usize) -> Option<&PieceSession> {
        self.seats.get(idx).map(|s| &s.session)
    }

    pub fn on_score(&mut self, sink: ScoreSink) {
        self.score_sinks.push(sink);
    }

    pub fn set_bindings(&mut self, idx: usize, bindings: KeyBindings) -> Result<(), String> {
        let seat = self
            .seats
            .get_mut(idx)
            .ok_or_else(|| format!("invalid player index {idx}"))?;
        seat.bindings = bindings;
        Ok(())
    }

    /// Swaps the piece stream. Pieces already in play are kept.
    pub fn set_randomizer(&mut self, kind: &RandomizerKind) {
        self.queue = PieceQueue::from_kind(kind);
    }

    pub fn tick(&mut self, dt_ms: f32) {
        for idx in 0..self.seats.len() {
            if let Some(lock) = self.seats[idx].session.update(dt_ms, &mut self.queue) {
                self.on_lock(idx, lock);
            }
        }
    }

    pub fn key_event(&mut self, code: &str, kind: KeyEventKind) {
        for idx in 0..self.seats.len() {
            let Some(action) = self.seats[idx].bindings.action(code) else {
                continue;
            };
            let lock = input::apply(&mut self.seats[idx].session, action, kind, &mut self.queue);
            if let Some(lock) = lock {
                self.on_lock(idx, lock);
            }
        }
    }

    fn on_lock(&mut self, idx: usize, lock: Lock) {
        if lock.board_reset {
            log(&format!("[p{}] spawn blocked, board cleared", idx + 1));
        } else if lock.points > 0 {
            log(&format!("[p{}] +{} -> {}", idx + 1, lock.points, lock.score));
        }
        for sink in self.score_sinks.iter_mut() {
            sink(idx, lock.score);
        }
    }

    pub fn snapshot(&self) -> FrameView {
        let players = self
            .seats
            .iter()
            .map(|seat| {
                let session = &seat.session;
                let grid = session.grid();
                PlayerView {
                    arena: MatrixView {
                        width: grid.width(),
                        height: grid.height(),
                        rows: grid.rows().map(|r| r.to_vec()).collect(),
                    },
                    piece: MatrixView {
                        width: session.piece().width(),
                        height: session.piece().height(),
                        rows: session.piece().rows(),
                    },
                    pos: session.pos(),
                    score: session.score(),
                    speed: session.speed(),
                    stats: session.stats(),
                }
            })
            .collect();
        let preview = self.queue.preview();
        FrameView {
            players,
            preview: MatrixView {
                width: preview.width(),
                height: preview.height(),
                rows: preview.rows(),
            },
            palette: PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}
