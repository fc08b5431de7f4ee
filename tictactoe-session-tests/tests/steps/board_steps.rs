use super::parse_mark;
use cucumber::then;
use tictactoe_session_core::{Cell, GameStatus};
use tictactoe_session_tests::GameWorld;

#[then(expr = "{string} plays {word} on every replica")]
async fn plays_mark_everywhere(world: &mut GameWorld, name: String, mark: String) {
    let mark = parse_mark(&mark);
    let member = name.as_str().into();

    for replica in &world.replicas {
        assert_eq!(
            replica.session().roles().mark_of(&member),
            Some(mark),
            "{} disagrees about {}'s mark",
            replica.local(),
            name
        );
    }
}

#[then(expr = "{string} holds no role")]
async fn holds_no_role(world: &mut GameWorld, name: String) {
    assert_eq!(world.mark_of(&name), None);
}

#[then("the game is in progress on every replica")]
async fn in_progress_everywhere(world: &mut GameWorld) {
    for replica in &world.replicas {
        assert_eq!(replica.session().game().status(), GameStatus::InProgress);
    }
}

#[then(expr = "the game status is {string} on every replica")]
async fn status_everywhere(world: &mut GameWorld, status: String) {
    for replica in &world.replicas {
        assert_eq!(
            replica.session().game().status().to_string(),
            status,
            "status on {}",
            replica.local()
        );
    }
}

#[then(regex = r"^it is (X|O)'s turn on every replica$")]
async fn turn_everywhere(world: &mut GameWorld, mark: String) {
    let mark = parse_mark(&mark);
    for replica in &world.replicas {
        assert_eq!(replica.session().game().current_mark(), mark);
    }
}

#[then(expr = "cell {int} holds {word} on every replica")]
async fn cell_everywhere(world: &mut GameWorld, cell: u8, mark: String) {
    let mark = parse_mark(&mark);
    for replica in &world.replicas {
        assert_eq!(
            replica.session().game().board().get(cell),
            Some(Cell::Marked(mark))
        );
    }
}

#[then("the board is empty on every replica")]
async fn board_empty_everywhere(world: &mut GameWorld) {
    for replica in &world.replicas {
        assert_eq!(
            replica.session().game().board().marked_count(),
            0,
            "board on {}",
            replica.local()
        );
    }
}

#[then(regex = r"^(\d+) cells? (?:is|are) marked on every replica$")]
async fn marked_everywhere(world: &mut GameWorld, count: usize) {
    for replica in &world.replicas {
        assert_eq!(
            replica.session().game().board().marked_count(),
            count,
            "board on {}",
            replica.local()
        );
    }
}

#[then("all replicas agree on the board")]
async fn replicas_agree(world: &mut GameWorld) {
    let first = world.replicas[0].session().game();
    for replica in &world.replicas[1..] {
        let game = replica.session().game();
        assert_eq!(game.board(), first.board());
        assert_eq!(game.turn(), first.turn());
    }
}

#[then(expr = "the last action failed with {string}")]
async fn last_action_failed(world: &mut GameWorld, fragment: String) {
    let error = world
        .last_error
        .as_ref()
        .expect("an action should have failed")
        .to_string();
    assert!(
        error.to_lowercase().contains(&fragment.to_lowercase()),
        "'{}' does not mention '{}'",
        error,
        fragment
    );
}

#[then(expr = "{string} dropped the last message")]
async fn dropped_last(world: &mut GameWorld, name: String) {
    let routed = world.last_routed(&name);
    assert!(routed.starts_with("dropped"), "{} routed it as {}", name, routed);
}

#[then(expr = "{string} routed the last message as {string}")]
async fn routed_as(world: &mut GameWorld, name: String, expected: String) {
    assert_eq!(world.last_routed(&name), expected);
}
