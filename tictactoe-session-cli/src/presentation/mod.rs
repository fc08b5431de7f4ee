mod board_view;
mod input;

pub use board_view::{render_board, render_event, render_history};
pub use input::{parse_input, Input, HELP};
