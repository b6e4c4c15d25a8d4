//! Raw input to game commands
//!
//! Keys, touch swipes, mouse drags and buttons all decode to an
//! [`InputAction`]. Anything unrecognised decodes to `None`.

use glam::Vec2;

use crate::consts::SWIPE_THRESHOLD;
use crate::settings::ModeKind;
use crate::sim::{Command, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Move(Direction),
    Undo,
    Restart,
    /// Keep playing after a win
    Continue,
    SetBoardSize(usize),
    SetMode(ModeKind),
}

impl InputAction {
    /// The state-machine command, for actions the game core handles itself
    pub fn as_command(&self) -> Option<Command> {
        match self {
            InputAction::Move(dir) => Some(Command::Move(*dir)),
            InputAction::Undo => Some(Command::Undo),
            InputAction::Continue => Some(Command::Continue),
            _ => None,
        }
    }
}

/// Decode a `KeyboardEvent.key`. `modifier` is Ctrl or Cmd.
pub fn decode_key(key: &str, modifier: bool) -> Option<InputAction> {
    match key {
        "ArrowUp" => Some(InputAction::Move(Direction::Up)),
        "ArrowDown" => Some(InputAction::Move(Direction::Down)),
        "ArrowLeft" => Some(InputAction::Move(Direction::Left)),
        "ArrowRight" => Some(InputAction::Move(Direction::Right)),
        "z" | "Z" if modifier => Some(InputAction::Undo),
        _ => None,
    }
}

/// Decode a swipe or drag from `start` to `end` (screen coordinates, y down).
/// Short gestures are noise; otherwise the dominant axis wins.
pub fn decode_swipe(start: Vec2, end: Vec2) -> Option<Direction> {
    let delta = end - start;
    let abs = delta.abs();
    if abs.max_element() < SWIPE_THRESHOLD {
        return None;
    }

    if abs.x > abs.y {
        Some(if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else {
        Some(if delta.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        })
    }
}

/// Decode a click on one of the game's buttons or option chips.
/// `data` is the chip's `data-size` / `data-mode` attribute, if any.
pub fn decode_button(id: &str, data: Option<&str>) -> Option<InputAction> {
    match id {
        "btn-restart" | "btn-restart-modal" => Some(InputAction::Restart),
        "btn-undo" => Some(InputAction::Undo),
        "btn-continue-modal" => Some(InputAction::Continue),
        "size-btns" => data?
            .parse()
            .ok()
            .filter(|&size| crate::Settings::is_valid_board_size(size))
            .map(InputAction::SetBoardSize),
        "mode-btns" => ModeKind::from_str(data?).map(InputAction::SetMode),
        _ => None,
    }
}

/// Tracks one touch or mouse-drag gesture from press to release
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<Vec2>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some(Vec2::new(x, y));
    }

    /// Finish the gesture. Returns a direction if it was a real swipe.
    pub fn end(&mut self, x: f32, y: f32) -> Option<Direction> {
        let start = self.start.take()?;
        decode_swipe(start, Vec2::new(x, y))
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }
}
