use tictactoe_session_core::{Board, GameOutcome, Mark, MemberId, Move, SessionEvent};

/// Board as indented text; empty cells show their index
pub fn render_board(board: &Board) -> String {
    board
        .to_string()
        .lines()
        .map(|line| format!("    {}\n", line))
        .collect()
}

/// Accepted moves in order, e.g. `Moves: X@4 O@0`
pub fn render_history(moves: &[Move]) -> String {
    if moves.is_empty() {
        return "No moves yet".to_string();
    }

    let played: Vec<String> = moves
        .iter()
        .map(|mv| format!("{}@{}", mv.mark, mv.cell))
        .collect();
    format!("Moves: {}", played.join(" "))
}

/// One line (or a board) describing an event from `local`'s point of view
///
/// Returns `None` for events that need no output.
pub fn render_event(
    event: &SessionEvent,
    local: &MemberId,
    local_mark: Option<Mark>,
) -> Option<String> {
    let text = match event {
        SessionEvent::RoleAssigned { member, mark } if member == local => {
            format!("You play {}", mark)
        }
        SessionEvent::RoleAssigned { member, mark } => format!("{} plays {}", member, mark),
        SessionEvent::SpectatorJoined { member } if member == local => {
            "Both seats are taken, you are watching".to_string()
        }
        SessionEvent::SpectatorJoined { member } => format!("{} is watching", member),
        SessionEvent::GameStarted { first_mark } => format!("New game, {} moves first", first_mark),
        SessionEvent::GameReset => "Game reset".to_string(),
        SessionEvent::BoardChanged { board } => render_board(board),
        SessionEvent::TurnChanged { mark } if Some(*mark) == local_mark => {
            "Your move (0-8)".to_string()
        }
        SessionEvent::TurnChanged { .. } if local_mark.is_some() => return None,
        SessionEvent::TurnChanged { mark } => format!("{} to move", mark),
        SessionEvent::GameEnded {
            outcome: GameOutcome::Won(mark),
        } => format!("{} wins! Type 'r' for a rematch", mark),
        SessionEvent::GameEnded {
            outcome: GameOutcome::Draw,
        } => "Draw! Type 'r' for a rematch".to_string(),
        SessionEvent::WaitingForOpponent => "Waiting for an opponent...".to_string(),
        SessionEvent::ChatReceived { from, text } => format!("<{}> {}", from, text),
    };

    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_board() {
        let rendered = render_board(&Board::new());
        assert!(rendered.starts_with("     0 | 1 | 2"));
        assert_eq!(rendered.lines().count(), 5);
    }

    #[test]
    fn test_render_marks() {
        let mut board = Board::new();
        board.place(4, Mark::X).unwrap();

        let rendered = render_board(&board);
        assert!(rendered.contains(" 3 | X | 5 "));
    }

    #[test]
    fn test_render_history() {
        assert_eq!(render_history(&[]), "No moves yet");

        let moves = vec![
            Move {
                mark: Mark::X,
                cell: 4,
                player: MemberId::from("alice"),
            },
            Move {
                mark: Mark::O,
                cell: 0,
                player: MemberId::from("bob"),
            },
        ];
        assert_eq!(render_history(&moves), "Moves: X@4 O@0");
    }

    #[test]
    fn test_role_from_own_perspective() {
        let me = MemberId::from("alice");
        let event = SessionEvent::RoleAssigned {
            member: me.clone(),
            mark: Mark::X,
        };
        assert_eq!(render_event(&event, &me, None).as_deref(), Some("You play X"));

        let other = SessionEvent::RoleAssigned {
            member: MemberId::from("bob"),
            mark: Mark::O,
        };
        assert_eq!(render_event(&other, &me, None).as_deref(), Some("bob plays O"));
    }

    #[test]
    fn test_chat_line() {
        let event = SessionEvent::ChatReceived {
            from: MemberId::from("bob"),
            text: "gg".to_string(),
        };
        assert_eq!(
            render_event(&event, &MemberId::from("alice"), Some(Mark::X)).as_deref(),
            Some("<bob> gg")
        );
    }

    #[test]
    fn test_turn_prompt_only_for_own_turn() {
        let me = MemberId::from("alice");
        let x_turn = SessionEvent::TurnChanged { mark: Mark::X };
        let o_turn = SessionEvent::TurnChanged { mark: Mark::O };

        assert_eq!(
            render_event(&x_turn, &me, Some(Mark::X)).as_deref(),
            Some("Your move (0-8)")
        );
        assert_eq!(render_event(&o_turn, &me, Some(Mark::X)), None);
        assert_eq!(render_event(&o_turn, &me, None).as_deref(), Some("O to move"));
    }
}
