use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::randomizer::PieceSource;
use crate::session::{DropSpeed, Lock, PieceSession};

/// Key codes (`KeyboardEvent.code`) driving one session.
#[derive(Clone, Serialize, Deserialize, Tsify, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    pub move_left: String,
    pub move_right: String,
    pub rotate_ccw: String,
    pub rotate_cw: String,
    pub soft_drop: String,
}

impl KeyBindings {
    pub fn defaults() -> Vec<KeyBindings> {
        vec![Self::for_player(0), Self::for_player(1)]
    }

    /// Left hand for the first player, right hand for the second; anyone
    /// else starts unbound.
    pub fn for_player(player: usize) -> KeyBindings {
        let codes = match player {
            0 => ["KeyA", "KeyD", "KeyQ", "KeyE", "KeyS"],
            1 => ["KeyJ", "KeyL", "KeyU", "KeyO", "KeyK"],
            _ => return Self::unbound(),
        };
        let [move_left, move_right, rotate_ccw, rotate_cw, soft_drop] = codes.map(String::from);
        KeyBindings {
            move_left,
            move_right,
            rotate_ccw,
            rotate_cw,
            soft_drop,
        }
    }

    pub fn unbound() -> KeyBindings {
        KeyBindings {
            move_left: String::new(),
            move_right: String::new(),
            rotate_ccw: String::new(),
            rotate_cw: String::new(),
            soft_drop: String::new(),
        }
    }

    pub fn action(&self, code: &str) -> Option<Action> {
        if code.is_empty() {
            return None;
        }
        if code == self.move_left {
            Some(Action::MoveLeft)
        } else if code == self.move_right {
            Some(Action::MoveRight)
        } else if code == self.rotate_ccw {
            Some(Action::RotateCcw)
        } else if code == self.rotate_cw {
            Some(Action::RotateCw)
        } else if code == self.soft_drop {
            Some(Action::SoftDrop)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateCcw,
    RotateCw,
    SoftDrop,
}

/// Applies one key transition to a session. Only the soft-drop key reacts to
/// release; pressing it drops immediately and switches to the fast interval.
pub fn apply(
    session: &mut PieceSession,
    action: Action,
    kind: KeyEventKind,
    source: &mut dyn PieceSource,
) -> Option<Lock> {
    match (action, kind) {
        (Action::MoveLeft, KeyEventKind::Down) => {
            session.move_piece(-1);
            None
        }
        (Action::MoveRight, KeyEventKind::Down) => {
            session.move_piece(1);
            None
        }
        (Action::RotateCcw, KeyEventKind::Down) => {
            session.rotate(-1);
            None
        }
        (Action::RotateCw, KeyEventKind::Down) => {
            session.rotate(1);
            None
        }
        (Action::SoftDrop, KeyEventKind::Down) => {
            // Key repeat must not keep forcing drops.
            if session.speed() == DropSpeed::Fast {
                return None;
            }
            let lock = session.drop(source);
            session.set_speed(DropSpeed::Fast);
            lock
        }
        (Action::SoftDrop, KeyEventKind::Up) => {
            session.set_speed(DropSpeed::Slow);
            None
        }
        (_, KeyEventKind::Up) => None,
    }
}
