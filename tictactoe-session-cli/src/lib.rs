pub mod infrastructure;
pub mod presentation;

pub use infrastructure::{CliError, LogConfig, Result};
pub use presentation::{parse_input, render_board, render_event, render_history, Input};
