//! Ship selection and placement rules, driven through the state machine.

use broadside::{Cell, Event, Game, Notice, Output, ShipClass, UiEvent};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn game() -> (Game, SmallRng) {
    let mut game = Game::new("Alice", true);
    let mut rng = SmallRng::seed_from_u64(7);
    game.handle(Event::Connected, &mut rng);
    (game, rng)
}

fn ui(game: &mut Game, rng: &mut SmallRng, event: UiEvent) -> Vec<Output> {
    game.handle(Event::Ui(event), rng)
}

fn select(game: &mut Game, rng: &mut SmallRng, class: ShipClass) -> Vec<Output> {
    ui(game, rng, UiEvent::SelectShip(class))
}

fn place(game: &mut Game, rng: &mut SmallRng, row: u8, col: u8) -> Vec<Output> {
    ui(game, rng, UiEvent::PlaceCell { row, col })
}

fn sends(outputs: &[Output]) -> usize {
    outputs
        .iter()
        .filter(|o| matches!(o, Output::Send(_)))
        .count()
}

#[test]
fn small_ship_placement_scenario() {
    let (mut game, mut rng) = game();
    select(&mut game, &mut rng, ShipClass::Small);
    place(&mut game, &mut rng, 0, 0);
    let outputs = place(&mut game, &mut rng, 0, 1);

    assert_eq!(game.my_grid().get(0, 0).unwrap(), Cell::Ship);
    assert_eq!(game.my_grid().get(0, 1).unwrap(), Cell::Ship);
    assert_eq!(game.tally().placed(ShipClass::Small), 1);
    assert!(game.session().is_none(), "session discarded on completion");
    assert!(outputs
        .iter()
        .any(|o| matches!(o, Output::Ui(Notice::ShipQuota { small: 0, .. }))));

    // quota met: further Small selection is rejected and changes nothing
    let outputs = select(&mut game, &mut rng, ShipClass::Small);
    assert_eq!(game.tally().placed(ShipClass::Small), 1);
    assert!(game.session().is_none());
    assert!(outputs
        .iter()
        .any(|o| matches!(o, Output::Ui(Notice::Status(s)) if s.contains("already placed"))));
}

#[test]
fn completed_ship_is_one_contiguous_run() {
    let (mut game, mut rng) = game();
    select(&mut game, &mut rng, ShipClass::Large);
    for col in [3, 2, 1, 0] {
        place(&mut game, &mut rng, 5, col);
    }
    let ship = &game.ships()[0];
    assert_eq!(ship.cells().len(), ShipClass::Large.size() as usize);
    assert!(ship.cells().iter().all(|&(r, _)| r == 5), "single axis");
    for pair in ship.cells().windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!(a.0.abs_diff(b.0) + a.1.abs_diff(b.1), 1, "adjacent in sequence");
    }
}

#[test]
fn second_cell_locks_the_axis() {
    let (mut game, mut rng) = game();
    select(&mut game, &mut rng, ShipClass::Medium);
    place(&mut game, &mut rng, 4, 4);
    place(&mut game, &mut rng, 4, 5);
    // vertical extension now rejected
    place(&mut game, &mut rng, 5, 5);
    assert_eq!(game.my_grid().get(5, 5).unwrap(), Cell::Empty);
    place(&mut game, &mut rng, 4, 6);
    assert_eq!(game.tally().placed(ShipClass::Medium), 1);
}

#[test]
fn diagonal_and_detached_cells_rejected() {
    let (mut game, mut rng) = game();
    select(&mut game, &mut rng, ShipClass::Small);
    place(&mut game, &mut rng, 2, 2);
    place(&mut game, &mut rng, 3, 3);
    assert_eq!(game.my_grid().get(3, 3).unwrap(), Cell::Empty);
    place(&mut game, &mut rng, 2, 6);
    assert_eq!(game.my_grid().get(2, 6).unwrap(), Cell::Empty);
    assert_eq!(game.session().unwrap().placed(), 1);
}

#[test]
fn occupied_and_duplicate_cells_rejected() {
    let (mut game, mut rng) = game();
    select(&mut game, &mut rng, ShipClass::Small);
    place(&mut game, &mut rng, 0, 0);
    place(&mut game, &mut rng, 0, 1);
    // overlap with the finished small ship
    select(&mut game, &mut rng, ShipClass::Medium);
    place(&mut game, &mut rng, 0, 0);
    assert_eq!(game.session().unwrap().placed(), 0);
    // duplicate click inside one session is silently ignored
    place(&mut game, &mut rng, 1, 0);
    place(&mut game, &mut rng, 1, 0);
    assert_eq!(game.session().unwrap().placed(), 1);
}

#[test]
fn selecting_mid_placement_is_rejected() {
    let (mut game, mut rng) = game();
    select(&mut game, &mut rng, ShipClass::Medium);
    place(&mut game, &mut rng, 1, 1);
    let outputs = select(&mut game, &mut rng, ShipClass::Large);
    assert!(outputs
        .iter()
        .any(|o| matches!(o, Output::Ui(Notice::Status(s)) if s.contains("Finish placing"))));
    // the in-progress medium session survives
    assert_eq!(game.session().unwrap().class(), ShipClass::Medium);
    assert_eq!(game.session().unwrap().placed(), 1);
}

#[test]
fn clear_current_reverts_only_the_open_session() {
    let (mut game, mut rng) = game();
    select(&mut game, &mut rng, ShipClass::Small);
    place(&mut game, &mut rng, 0, 0);
    place(&mut game, &mut rng, 0, 1);
    select(&mut game, &mut rng, ShipClass::Medium);
    place(&mut game, &mut rng, 3, 3);
    ui(&mut game, &mut rng, UiEvent::ClearCurrent);

    assert_eq!(game.my_grid().get(3, 3).unwrap(), Cell::Empty);
    assert_eq!(game.my_grid().get(0, 0).unwrap(), Cell::Ship, "placed ship kept");
    assert_eq!(game.tally().placed(ShipClass::Small), 1);
    assert!(game.session().is_none());
}

#[test]
fn clear_all_wipes_ships_counts_and_readiness() {
    let (mut game, mut rng) = game();
    place_full_fleet(&mut game, &mut rng);
    ui(&mut game, &mut rng, UiEvent::ToggleReady);
    assert!(game.is_ready());

    ui(&mut game, &mut rng, UiEvent::ClearAll);
    assert!(!game.is_ready());
    assert!(game.ships().is_empty());
    assert!(!game.tally().complete());
    assert_eq!(game.my_grid().count(Cell::Ship), 0);
}

#[test]
fn ready_requires_full_fleet() {
    let (mut game, mut rng) = game();
    let outputs = ui(&mut game, &mut rng, UiEvent::ToggleReady);
    assert!(!game.is_ready());
    assert!(outputs
        .iter()
        .any(|o| matches!(o, Output::Ui(Notice::Status(s)) if s.contains("Place all ships"))));

    place_full_fleet(&mut game, &mut rng);
    let outputs = ui(&mut game, &mut rng, UiEvent::ToggleReady);
    assert!(game.is_ready());
    // name announcement plus READY go out together
    assert_eq!(sends(&outputs), 2);
}

#[test]
fn placement_blocked_while_ready() {
    let (mut game, mut rng) = game();
    place_full_fleet(&mut game, &mut rng);
    ui(&mut game, &mut rng, UiEvent::ToggleReady);
    let before = game.my_grid().clone();
    select(&mut game, &mut rng, ShipClass::Small);
    place(&mut game, &mut rng, 7, 7);
    assert_eq!(game.my_grid(), &before);
}

fn place_full_fleet(game: &mut Game, rng: &mut SmallRng) {
    let ships: [(ShipClass, u8, &[u8]); 4] = [
        (ShipClass::Small, 0, &[0, 1]),
        (ShipClass::Medium, 2, &[0, 1, 2]),
        (ShipClass::Medium, 4, &[0, 1, 2]),
        (ShipClass::Large, 6, &[0, 1, 2, 3]),
    ];
    for (class, row, cols) in ships {
        select(game, rng, class);
        for &col in cols {
            place(game, rng, row, col);
        }
    }
    assert!(game.tally().complete());
}
