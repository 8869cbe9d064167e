//! # Input Module
//!
//! Parses text commands typed at the interactive prompt into player input.

use crate::{Direction, UndercroftError, UndercroftResult};

/// Input handler for processing player commands.
///
/// Accepts compass words, their first letters, arrow words and optionally
/// Vi-style movement keys (hjkl).
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{Direction, InputHandler, PlayerInput};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.parse("n").unwrap(), PlayerInput::Move(Direction::North));
    /// assert_eq!(input_handler.parse("new 7").unwrap(), PlayerInput::NewSeed(Some(7)));
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Parses one line of input. Blank lines and unknown words are errors.
    pub fn parse(&self, line: &str) -> UndercroftResult<PlayerInput> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(UndercroftError::InvalidAction("Empty command".to_string()));
        };
        let command = command.to_ascii_lowercase();

        if let Some(direction) = self.parse_direction(&command) {
            return Ok(PlayerInput::Move(direction));
        }

        let input = match command.as_str() {
            "map" | "m" => PlayerInput::ShowMap,
            "room" | "look" | "r" => PlayerInput::ShowRoom,
            "clear" | "fight" | "c" => PlayerInput::ClearRoom,
            "open" | "loot" | "o" => PlayerInput::OpenContainer,
            "new" => {
                let seed = match words.next() {
                    Some(word) => Some(word.parse::<u64>().map_err(|_| {
                        UndercroftError::InvalidAction(format!("'{word}' is not a seed"))
                    })?),
                    None => None,
                };
                PlayerInput::NewSeed(seed)
            }
            "restart" => PlayerInput::Restart,
            "help" | "?" => PlayerInput::Help,
            "quit" | "exit" | "q" => PlayerInput::Quit,
            _ => {
                return Err(UndercroftError::InvalidAction(format!(
                    "Unknown command '{command}', type 'help' for a list"
                )))
            }
        };
        Ok(input)
    }

    fn parse_direction(&self, word: &str) -> Option<Direction> {
        let direction = match word {
            "n" | "north" | "up" => Direction::North,
            "s" | "south" | "down" => Direction::South,
            "e" | "east" | "right" => Direction::East,
            "w" | "west" | "left" => Direction::West,
            "k" if self.vi_keys_enabled => Direction::North,
            "j" if self.vi_keys_enabled => Direction::South,
            "l" if self.vi_keys_enabled => Direction::East,
            "h" if self.vi_keys_enabled => Direction::West,
            _ => return None,
        };
        Some(direction)
    }

    /// Help text listing every command.
    pub fn help_text(&self) -> String {
        let mut lines = vec![
            "Commands:",
            "  n/s/e/w, north/south/east/west   move through a door",
            "  up/down/left/right               move",
        ];
        if self.vi_keys_enabled {
            lines.push("  h/j/k/l                          move (Vi keys)");
        }
        lines.extend([
            "  map                              show the minimap",
            "  room                             show the current room",
            "  clear                            defeat the enemies here",
            "  open                             open the room's container",
            "  new [seed]                       generate a new dungeon",
            "  restart                          regenerate from the same seed",
            "  help                             show this help",
            "  quit                             leave",
        ]);
        lines.join("\n")
    }
}

/// Player input types that can be processed by the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Walk through the door in a direction
    Move(Direction),
    /// Defeat whatever is in the current room
    ClearRoom,
    /// Open the current room's container
    OpenContainer,
    ShowMap,
    ShowRoom,
    /// Generate a new dungeon, optionally from a given seed
    NewSeed(Option<u64>),
    /// Regenerate the current dungeon from its seed
    Restart,
    /// Show help information
    Help,
    /// Quit the game
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_handler_creation() {
        let handler = InputHandler::new();
        assert!(handler.vi_keys_enabled);
    }

    #[test]
    fn test_movement_words() {
        let handler = InputHandler::new();
        assert_eq!(handler.parse("north").unwrap(), PlayerInput::Move(Direction::North));
        assert_eq!(handler.parse("S").unwrap(), PlayerInput::Move(Direction::South));
        assert_eq!(handler.parse("  e ").unwrap(), PlayerInput::Move(Direction::East));
        assert_eq!(handler.parse("west").unwrap(), PlayerInput::Move(Direction::West));
        assert_eq!(handler.parse("left").unwrap(), PlayerInput::Move(Direction::West));
        assert_eq!(handler.parse("up").unwrap(), PlayerInput::Move(Direction::North));
    }

    #[test]
    fn test_compass_letters() {
        let handler = InputHandler::new();
        assert_eq!(handler.parse("n").unwrap(), PlayerInput::Move(Direction::North));
        assert_eq!(handler.parse("s").unwrap(), PlayerInput::Move(Direction::South));
        assert_eq!(handler.parse("e").unwrap(), PlayerInput::Move(Direction::East));
        assert_eq!(handler.parse("w").unwrap(), PlayerInput::Move(Direction::West));
        assert_eq!(handler.parse("W").unwrap(), PlayerInput::Move(Direction::West));
    }

    #[test]
    fn test_vi_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.parse("h").unwrap(), PlayerInput::Move(Direction::West));
        assert_eq!(handler.parse("k").unwrap(), PlayerInput::Move(Direction::North));

        handler.vi_keys_enabled = false;
        assert!(handler.parse("h").is_err());
    }

    #[test]
    fn test_commands() {
        let handler = InputHandler::new();
        assert_eq!(handler.parse("map").unwrap(), PlayerInput::ShowMap);
        assert_eq!(handler.parse("room").unwrap(), PlayerInput::ShowRoom);
        assert_eq!(handler.parse("clear").unwrap(), PlayerInput::ClearRoom);
        assert_eq!(handler.parse("open").unwrap(), PlayerInput::OpenContainer);
        assert_eq!(handler.parse("new").unwrap(), PlayerInput::NewSeed(None));
        assert_eq!(handler.parse("new 42").unwrap(), PlayerInput::NewSeed(Some(42)));
        assert_eq!(handler.parse("restart").unwrap(), PlayerInput::Restart);
        assert_eq!(handler.parse("help").unwrap(), PlayerInput::Help);
        assert_eq!(handler.parse("QUIT").unwrap(), PlayerInput::Quit);
    }

    #[test]
    fn test_invalid_input() {
        let handler = InputHandler::new();
        assert!(handler.parse("").is_err());
        assert!(handler.parse("dance").is_err());
        assert!(handler.parse("a").is_err());
        assert!(handler.parse("new banana").is_err());
    }

    #[test]
    fn test_help_mentions_every_command() {
        let help = InputHandler::new().help_text();
        for word in ["map", "room", "clear", "open", "new", "restart", "quit"] {
            assert!(help.contains(word), "help is missing {word}");
        }
    }
}
