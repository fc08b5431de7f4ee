use cucumber::gherkin::Step;
use cucumber::{given, when};
use tictactoe_session_tests::GameWorld;

// ===== Membership =====

#[given(expr = "{string} joins the room")]
async fn has_joined(world: &mut GameWorld, name: String) {
    world.join(&name);
}

#[when(expr = "{string} joins the room")]
async fn joins(world: &mut GameWorld, name: String) {
    world.join(&name);
}

#[when(expr = "{string} joins the room before seeing the others")]
async fn joins_unseeded(world: &mut GameWorld, name: String) {
    world.join_unseeded(&name);
}

#[when(expr = "{string} leaves the room")]
async fn leaves(world: &mut GameWorld, name: String) {
    world.leave(&name);
}

// ===== Moves =====

#[given(expr = "{string} plays cell {int}")]
async fn has_played(world: &mut GameWorld, name: String, cell: u8) {
    assert!(
        world.play(&name, cell).is_some(),
        "{} could not play {}: {:?}",
        name,
        cell,
        world.last_error
    );
}

#[when(expr = "{string} plays cell {int}")]
async fn plays(world: &mut GameWorld, name: String, cell: u8) {
    world.play(&name, cell);
}

#[given(expr = "the moves {string} are played")]
async fn have_played_sequence(world: &mut GameWorld, moves: String) {
    play_sequence(world, &moves);
}

#[when(expr = "the moves {string} are played")]
async fn plays_sequence(world: &mut GameWorld, moves: String) {
    play_sequence(world, &moves);
}

fn play_sequence(world: &mut GameWorld, moves: &str) {
    for entry in moves.split(',') {
        let (name, cell) = entry
            .trim()
            .split_once(':')
            .unwrap_or_else(|| panic!("Expected name:cell, got '{}'", entry));
        let cell: u8 = cell.parse().expect("cell index");

        assert!(
            world.play(name, cell).is_some(),
            "{} could not play {}: {:?}",
            name,
            cell,
            world.last_error
        );
    }
}

#[when(expr = "{string} requests a rematch")]
async fn requests_rematch(world: &mut GameWorld, name: String) {
    world.request_rematch(&name);
}

// ===== Raw traffic =====

#[when(expr = "{string} receives a raw message from {string}:")]
async fn receives_raw(world: &mut GameWorld, step: &Step, to: String, from: String) {
    let payload = step.docstring.as_ref().expect("docstring payload").trim();
    world.deliver_raw(&to, &from, payload.as_bytes());
}

#[given("the network is partitioned")]
async fn partitioned(world: &mut GameWorld) {
    world.partition();
}

#[when("the network heals")]
async fn heals(world: &mut GameWorld) {
    world.heal();
}
