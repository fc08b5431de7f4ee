use crate::infrastructure::error::{CliError, Result};
use tictactoe_session_core::CELL_COUNT;

pub const HELP: &str = "Commands: 0-8 play a cell | r rematch | say <text> chat | b board | q quit";

/// A line typed by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Play(u8),
    Rematch,
    Say(String),
    ShowBoard,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Result<Input> {
    let line = line.trim();

    if let Some(text) = line.strip_prefix("say ") {
        let text = text.trim();
        if text.is_empty() {
            return Err(CliError::InvalidInput("Nothing to say".to_string()));
        }
        return Ok(Input::Say(text.to_string()));
    }

    match line {
        "r" | "rematch" => Ok(Input::Rematch),
        "b" | "board" => Ok(Input::ShowBoard),
        "h" | "help" | "?" => Ok(Input::Help),
        "q" | "quit" | "exit" => Ok(Input::Quit),
        _ => match line.parse::<u8>() {
            Ok(cell) if usize::from(cell) < CELL_COUNT => Ok(Input::Play(cell)),
            _ => Err(CliError::InvalidInput(format!(
                "'{}' is not a command or a cell 0-{}",
                line,
                CELL_COUNT - 1
            ))),
        },
    }
}
