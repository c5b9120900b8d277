use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::grid::Grid;
use crate::piece::{Piece, Point, Turn};
use crate::randomizer::PieceSource;
use crate::settings::DropTiming;

#[derive(Clone, Copy, Serialize, Deserialize, Tsify, Debug, PartialEq, Eq)]
pub enum DropSpeed {
    Slow,
    Fast,
}

/// What happened when the active piece could not fall any further.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lock {
    pub points: u32,
    pub score: u32,
    /// The next piece collided at spawn, so the board and score were wiped.
    pub board_reset: bool,
}

#[derive(Clone, Copy, Serialize, Tsify, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub pieces: u32,
    pub board_resets: u32,
    pub best_score: u32,
}

/// One player's falling piece, board and drop timer.
pub struct PieceSession {
    grid: Grid,
    piece: Piece,
    pos: Point,
    score: u32,
    drop_counter: f32,
    speed: DropSpeed,
    timing: DropTiming,
    stats: SessionStats,
}

impl PieceSession {
    pub fn new(grid: Grid, timing: DropTiming, source: &mut dyn PieceSource) -> Self {
        let mut session = Self {
            grid,
            piece: source.next_piece(),
            pos: Point::default(),
            score: 0,
            drop_counter: 0.0,
            speed: DropSpeed::Slow,
            timing,
            stats: SessionStats::default(),
        };
        session.spawn();
        session
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn speed(&self) -> DropSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: DropSpeed) {
        self.speed = speed;
    }

    pub fn drop_interval(&self) -> f32 {
        match self.speed {
            DropSpeed::Slow => self.timing.slow_ms,
            DropSpeed::Fast => self.timing.fast_ms,
        }
    }

    pub fn drop_counter(&self) -> f32 {
        self.drop_counter
    }

    fn collides(&self) -> bool {
        self.grid.collides(&self.piece, self.pos)
    }

    /// Spawns the next piece centred on the top row. Returns true when it
    /// landed on existing blocks, in which case the board and score are wiped.
    pub fn reset(&mut self, source: &mut dyn PieceSource) -> bool {
        self.piece = source.next_piece();
        self.spawn()
    }

    fn spawn(&mut self) -> bool {
        self.pos.y = 0;
        self.pos.x = (self.grid.width() / 2) as i32 - (self.piece.width() / 2) as i32;
        if self.collides() {
            self.grid.clear();
            self.score = 0;
            self.stats.board_resets += 1;
            return true;
        }
        false
    }

    /// Shifts one column; a blocked shift leaves the piece where it was.
    pub fn move_piece(&mut self, dir: i32) -> bool {
        self.pos.x += dir;
        if self.collides() {
            self.pos.x -= dir;
            return false;
        }
        true
    }

    pub fn drop(&mut self, source: &mut dyn PieceSource) -> Option<Lock> {
        self.drop_counter = 0.0;
        self.pos.y += 1;
        if !self.collides() {
            return None;
        }
        self.pos.y -= 1;
        self.grid.merge(&self.piece, self.pos);
        self.stats.pieces += 1;
        // Spawn happens before the sweep, so a lock that fills the spawn area
        // resets the board even if it also completes rows.
        let board_reset = self.reset(source);
        let points = self.grid.sweep();
        self.score += points;
        self.stats.best_score = self.stats.best_score.max(self.score);
        Some(Lock {
            points,
            score: self.score,
            board_reset,
        })
    }

    /// Rotates a quarter turn, then tries the columns `+1, -1, +2, -2, ...`
    /// away from the start until the piece fits. Gives up and restores the
    /// old orientation once the next shift would be wider than the piece.
    pub fn rotate(&mut self, dir: i32) -> bool {
        let original_x = self.pos.x;
        let turn = Turn::from_dir(dir);
        let rotated = self.piece.rotated(turn);
        let previous = std::mem::replace(&mut self.piece, rotated);
        let mut offset: i32 = 1;
        while self.collides() {
            self.pos.x += offset;
            offset = -(offset + offset.signum());
            if offset.unsigned_abs() as usize > self.piece.width() {
                self.piece = previous;
                self.pos.x = original_x;
                return false;
            }
        }
        true
    }

    pub fn update(&mut self, dt_ms: f32, source: &mut dyn PieceSource) -> Option<Lock> {
        self.drop_counter += dt_ms;
        if self.drop_counter > self.drop_interval() {
            return self.drop(source);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Tetromino;
    use crate::randomizer::tests::Scripted;

    fn session(width: usize, height: usize, kinds: &[Tetromino]) -> (PieceSession, Scripted) {
        let mut source = Scripted::of(kinds);
        let session = PieceSession::new(Grid::new(width, height), DropTiming::default(), &mut source);
        (session, source)
    }

    fn fill_row_except(session: &mut PieceSession, y: i32, gap: &[i32]) {
        for x in 0..session.grid.width() as i32 {
            if !gap.contains(&x) {
                session.grid.set(x, y, 9);
            }
        }
    }

    #[test]
    fn spawn_is_centred_on_the_top_row() {
        let (s, _) = session(12, 20, &[Tetromino::O]);
        assert_eq!(s.pos(), Point::new(5, 0));
        let (s, _) = session(12, 20, &[Tetromino::T]);
        assert_eq!(s.pos(), Point::new(5, 0));
        let (s, _) = session(12, 20, &[Tetromino::I]);
        assert_eq!(s.pos(), Point::new(4, 0));
    }

    #[test]
    fn move_is_blocked_by_walls() {
        let (mut s, _) = session(4, 6, &[Tetromino::O]);
        assert_eq!(s.pos().x, 1);
        assert!(s.move_piece(-1));
        assert_eq!(s.pos().x, 0);
        assert!(!s.move_piece(-1));
        assert_eq!(s.pos().x, 0);
        assert!(s.move_piece(1));
        assert!(s.move_piece(1));
        assert!(!s.move_piece(1));
        assert_eq!(s.pos().x, 2);
    }

    #[test]
    fn move_is_blocked_by_settled_blocks() {
        let (mut s, _) = session(6, 6, &[Tetromino::O]);
        s.grid.set(1, 1, 9);
        assert_eq!(s.pos().x, 2);
        assert!(!s.move_piece(-1));
        assert_eq!(s.pos().x, 2);
    }

    #[test]
    fn o_piece_locks_on_the_floor() {
        let (mut s, mut source) = session(12, 20, &[Tetromino::O, Tetromino::T]);
        let mut drops = 0;
        let lock = loop {
            let before = s.pos();
            if let Some(lock) = s.drop(&mut source) {
                assert_eq!(before.y, 20 - 2);
                break lock;
            }
            drops += 1;
        };
        assert_eq!(drops, 18);
        assert_eq!(lock, Lock { points: 0, score: 0, board_reset: false });
        let bottom: Vec<u8> = s.grid().rows().last().unwrap().to_vec();
        for (x, &c) in bottom.iter().enumerate() {
            assert_eq!(c, if x == 5 || x == 6 { 2 } else { 0 }, "column {x}");
        }
        assert_eq!(s.piece().kind(), Some(Tetromino::T));
        assert_eq!(s.pos(), Point::new(5, 0));
        assert_eq!(s.stats().pieces, 1);
    }

    #[test]
    fn completing_a_row_scores_ten() {
        let (mut s, mut source) = session(4, 6, &[Tetromino::O]);
        fill_row_except(&mut s, 5, &[1, 2]);
        fill_row_except(&mut s, 4, &[0, 1, 2]);
        while s.drop(&mut source).is_none() {}
        assert_eq!(s.score(), 10);
        let rows: Vec<_> = s.grid().rows().map(|r| r.to_vec()).collect();
        assert_eq!(rows[0], vec![0, 0, 0, 0]);
        assert_eq!(rows[5], vec![0, 2, 2, 9]);
    }

    #[test]
    fn two_rows_in_one_lock_score_thirty() {
        let (mut s, mut source) = session(4, 6, &[Tetromino::O]);
        fill_row_except(&mut s, 5, &[1, 2]);
        fill_row_except(&mut s, 4, &[1, 2]);
        let lock = loop {
            if let Some(lock) = s.drop(&mut source) {
                break lock;
            }
        };
        assert_eq!(lock.points, 30);
        assert_eq!(s.score(), 30);
        assert!(s.grid().is_empty());
    }

    #[test]
    fn spawning_into_a_full_board_wipes_it() {
        let (mut s, mut source) = session(4, 4, &[Tetromino::O]);
        s.score = 120;
        for y in 0..4 {
            fill_row_except(&mut s, y, &[]);
        }
        assert!(s.reset(&mut source));
        assert!(s.grid().is_empty());
        assert_eq!(s.score(), 0);
        assert_eq!(s.stats().board_resets, 1);
    }

    #[test]
    fn locking_into_the_spawn_area_resets_before_sweeping() {
        let (mut s, mut source) = session(4, 3, &[Tetromino::O]);
        s.score = 50;
        // The O falls one row and completes row 2, but its upper half stays
        // in the spawn area.
        fill_row_except(&mut s, 2, &[1, 2]);
        assert_eq!(s.drop(&mut source), None);
        let lock = s.drop(&mut source).unwrap();
        assert!(lock.board_reset);
        assert_eq!(lock.points, 0);
        assert_eq!(lock.score, 0);
        assert!(s.grid().is_empty());
    }

    #[test]
    fn drop_resets_the_counter_even_without_locking() {
        let (mut s, mut source) = session(12, 20, &[Tetromino::T]);
        assert_eq!(s.update(400.0, &mut source), None);
        assert_eq!(s.drop_counter(), 400.0);
        assert_eq!(s.drop(&mut source), None);
        assert_eq!(s.drop_counter(), 0.0);
    }

    #[test]
    fn update_drops_only_after_the_interval_is_exceeded() {
        let (mut s, mut source) = session(12, 20, &[Tetromino::T]);
        s.update(1000.0, &mut source);
        assert_eq!(s.pos().y, 0, "equal to the interval is not enough");
        s.update(1.0, &mut source);
        assert_eq!(s.pos().y, 1);
        assert_eq!(s.drop_counter(), 0.0);

        s.set_speed(DropSpeed::Fast);
        assert_eq!(s.drop_interval(), 60.0);
        s.update(61.0, &mut source);
        assert_eq!(s.pos().y, 2);
    }

    #[test]
    fn rotation_in_open_space_keeps_position() {
        let (mut s, _) = session(12, 20, &[Tetromino::T]);
        s.pos.y = 5;
        assert!(s.rotate(1));
        assert_eq!(s.pos(), Point::new(5, 5));
        assert_eq!(s.piece(), &Piece::new(Tetromino::T).rotated(Turn::Cw));
    }

    #[test]
    fn rotation_against_the_wall_kicks_inward() {
        let (mut s, _) = session(12, 20, &[Tetromino::I]);
        s.pos.y = 5;
        // Vertical I occupies matrix column 1; park it on the left wall.
        while s.move_piece(-1) {}
        assert_eq!(s.pos().x, -1);
        assert!(s.rotate(1));
        // Horizontal I occupies matrix row 1 across all four columns.
        assert_eq!(s.pos().x, 0);
        assert!(!s.grid().collides(s.piece(), s.pos()));
    }

    #[test]
    fn kick_tries_alternating_offsets() {
        let (mut s, _) = session(12, 20, &[Tetromino::I]);
        s.pos.y = 5;
        // Flush right the column sits at x + 1 == 11.
        while s.move_piece(1) {}
        assert_eq!(s.pos().x, 10);
        assert!(s.move_piece(-1));
        assert!(s.rotate(-1));
        // 9 and 10 both overhang the wall; one column left of the start is 8.
        assert_eq!(s.pos().x, 8);
        assert!(!s.grid().collides(s.piece(), s.pos()));
    }

    #[test]
    fn kick_gives_up_once_wider_than_the_piece() {
        let (mut s, _) = session(12, 20, &[Tetromino::I]);
        s.pos.y = 5;
        while s.move_piece(1) {}
        let before = s.piece().clone();
        // Tries 10, 11, 9 and 12; reaching 8 would shift by more than the width.
        assert!(!s.rotate(-1));
        assert_eq!(s.pos().x, 10);
        assert_eq!(s.piece(), &before);
    }

    #[test]
    fn impossible_rotation_reverts_completely() {
        let (mut s, _) = session(5, 8, &[Tetromino::I]);
        s.pos.y = 2;
        // Box the vertical I into a one-wide shaft.
        let shaft = s.pos().x + 1;
        for y in 0..8 {
            for x in 0..5 {
                if x != shaft {
                    s.grid.set(x, y, 9);
                }
            }
        }
        let before_piece = s.piece().clone();
        let before_pos = s.pos();
        assert!(!s.rotate(1));
        assert_eq!(s.piece(), &before_piece);
        assert_eq!(s.pos(), before_pos);
        assert!(!s.rotate(-1));
        assert_eq!(s.pos(), before_pos);
    }
}
