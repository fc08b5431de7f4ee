use super::parse_mark;
use cucumber::{given, then, when};
use tictactoe_session_core::{GameStateMachine, Mark, MemberId, Move};
use tictactoe_session_tests::GameWorld;

#[given(expr = "two fresh state machines {string} and {string}")]
async fn fresh_machines(world: &mut GameWorld, left: String, right: String) {
    for name in [left, right] {
        let mut machine = GameStateMachine::new();
        machine.start(Mark::X);
        world.machines.insert(name, machine);
    }
}

#[when(expr = "both apply the moves {string}")]
async fn both_apply(world: &mut GameWorld, moves: String) {
    let moves: Vec<Move> = moves
        .split(',')
        .map(|entry| {
            let (mark, cell) = entry.trim().split_once('@').expect("mark@cell");
            let mark = parse_mark(mark);
            Move {
                mark,
                cell: cell.parse().expect("cell index"),
                player: MemberId::from(mark.to_string()),
            }
        })
        .collect();

    for machine in world.machines.values_mut() {
        for mv in &moves {
            machine.apply_move(mv).expect("move should apply");
        }
    }
}

#[then("both boards are identical")]
async fn boards_identical(world: &mut GameWorld) {
    let mut machines = world.machines.values();
    let first = machines.next().expect("a machine");
    for other in machines {
        assert_eq!(other.board(), first.board());
        assert_eq!(other.history(), first.history());
    }
}

#[then(expr = "both expect {word} to move next")]
async fn both_expect(world: &mut GameWorld, mark: String) {
    let mark = parse_mark(&mark);
    for machine in world.machines.values() {
        assert_eq!(machine.current_mark(), mark);
    }
}
