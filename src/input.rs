//! Key identifiers to game commands.
//!
//! Accepts browser-style arrow names (`ArrowLeft`), plain words (`left`),
//! WASD and vi keys. Anything else maps to `None` and is ignored by the
//! session.

use crate::engine::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    NewGame,
    Quit,
}

pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key.trim().to_ascii_lowercase().as_str() {
        "arrowleft" | "left" | "a" | "h" => Some(Direction::Left),
        "arrowright" | "right" | "d" | "l" => Some(Direction::Right),
        "arrowup" | "up" | "w" | "k" => Some(Direction::Up),
        "arrowdown" | "down" | "s" | "j" => Some(Direction::Down),
        _ => None,
    }
}

pub fn command_for_key(key: &str) -> Option<Command> {
    if let Some(dir) = direction_for_key(key) {
        return Some(Command::Move(dir));
    }
    match key.trim().to_ascii_lowercase().as_str() {
        "n" | "new" => Some(Command::NewGame),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}
