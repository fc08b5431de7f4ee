mod board_steps;
mod replay_steps;
mod room_steps;

use tictactoe_session_core::Mark;

pub fn parse_mark(text: &str) -> Mark {
    match text {
        "X" => Mark::X,
        "O" => Mark::O,
        other => panic!("'{}' is not a mark", other),
    }
}
