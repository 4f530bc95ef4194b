//! Tests that involve cars moving around small hand-built grids.

use assert_approx_eq::assert_approx_eq;
use traffic_grid::{
    find_path, CarAttributes, CarId, Cell, DestinationId, Heading, LightState, SimConfig,
    Simulation,
};

fn sim(width: i32, height: i32) -> Simulation {
    let config = SimConfig {
        seed: Some(0),
        ..Default::default()
    };
    Simulation::new(width, height, &config)
}

fn add_car(sim: &mut Simulation, cell: Cell, destination: DestinationId, greediness: f64) -> CarId {
    sim.add_car(&CarAttributes { destination, greediness }, cell)
        .unwrap()
}

fn cell_of(sim: &Simulation, car: CarId) -> Cell {
    sim.get_car(car).unwrap().cell()
}

fn path_of(sim: &Simulation, car: CarId) -> Vec<Cell> {
    sim.get_car(car).unwrap().path().collect()
}

/// Builds a one-lane corridor along `y = 1`, walled in by obstacles.
fn corridor(width: i32) -> Simulation {
    let mut sim = sim(width, 3);
    for x in 0..width {
        sim.add_obstacle(Cell::new(x, 0));
        sim.add_obstacle(Cell::new(x, 2));
    }
    sim
}

/// Test that an unobstructed car heads straight along the diagonal.
#[test]
fn open_grid_uses_diagonals() {
    let mut sim = sim(5, 5);
    let dst = sim.add_destination(Cell::new(4, 4)).unwrap();
    let car = add_car(&mut sim, Cell::new(0, 0), dst, 0.0);

    sim.step_ordered(&[car]);
    let path = path_of(&sim, car);
    assert_eq!(path, (1..=4).map(|i| Cell::new(i, i)).collect::<Vec<_>>());
    assert_eq!(cell_of(&sim, car), Cell::new(0, 0));

    let (_, cost) = find_path(sim.grid(), Cell::new(0, 0), Cell::new(4, 4), |_, _| true, &[]).unwrap();
    assert_approx_eq!(cost, 4.0 * (1.0 + (2f64.sqrt() - 1.0)));

    for i in 1..=4 {
        sim.step_ordered(&[car]);
        assert_eq!(cell_of(&sim, car), Cell::new(i, i));
    }
    sim.step_ordered(&[car]);
    assert!(sim.get_car(car).is_none());
    assert_eq!(sim.stats().moves, 4);
    assert_eq!(sim.completed_trips(), 1);
    assert_eq!(sim.active_cars(), 0);
}

/// Test that a car facing an obstacle on a one-way road waits without a path.
#[test]
fn blocked_corridor_has_no_path() {
    let mut sim = corridor(5);
    for x in 0..4 {
        sim.add_road(Cell::new(x, 1), Heading::Right);
    }
    sim.add_obstacle(Cell::new(1, 1));
    let dst = sim.add_destination(Cell::new(4, 1)).unwrap();
    let car = add_car(&mut sim, Cell::new(0, 1), dst, 0.0);

    for frame in 1..=10 {
        sim.step_ordered(&[car]);
        assert_eq!(cell_of(&sim, car), Cell::new(0, 1));
        assert!(path_of(&sim, car).is_empty());
        assert_eq!(sim.stats().failed_paths, frame);
    }
    assert_eq!(sim.active_cars(), 1);
}

/// Builds two one-way roads meeting at a destination in `(2, 2)`,
/// with a car at the end of each.
fn merge() -> (Simulation, CarId, CarId) {
    let mut sim = sim(5, 3);
    for cell in [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (0, 1), (4, 1), (0, 2), (1, 2), (3, 2), (4, 2)] {
        sim.add_obstacle(cell.into());
    }
    sim.add_road(Cell::new(1, 1), Heading::Right);
    sim.add_road(Cell::new(2, 1), Heading::Up);
    sim.add_road(Cell::new(3, 1), Heading::Left);
    let dst = sim.add_destination(Cell::new(2, 2)).unwrap();
    let a = add_car(&mut sim, Cell::new(1, 1), dst, 0.0);
    let b = add_car(&mut sim, Cell::new(3, 1), dst, 0.0);
    (sim, a, b)
}

/// Test that the first car to move takes a contested cell and the second waits.
#[test]
fn first_car_takes_contested_cell() {
    let (mut sim, a, b) = merge();
    sim.step_ordered(&[a, b]);
    assert_eq!(path_of(&sim, a), vec![Cell::new(2, 2)]);
    assert_eq!(path_of(&sim, b), vec![Cell::new(2, 2)]);

    sim.step_ordered(&[a, b]);
    assert_eq!(cell_of(&sim, a), Cell::new(2, 2));
    assert_eq!(cell_of(&sim, b), Cell::new(3, 1));
    assert_eq!(path_of(&sim, b), vec![Cell::new(2, 2)]);
    assert_eq!(sim.stats().waits, 1);

    // `a` leaves the cell as it arrives, so `b` can follow in the same step
    sim.step_ordered(&[a, b]);
    assert!(sim.get_car(a).is_none());
    assert_eq!(cell_of(&sim, b), Cell::new(2, 2));

    sim.step_ordered(&[b]);
    assert_eq!(sim.completed_trips(), 2);
    assert_eq!(sim.active_cars(), 0);
}

/// Test that the activation order decides who wins the contested cell.
#[test]
fn activation_order_decides_contested_cell() {
    let (mut sim, a, b) = merge();
    sim.step_ordered(&[a, b]);
    sim.step_ordered(&[b, a]);
    assert_eq!(cell_of(&sim, b), Cell::new(2, 2));
    assert_eq!(cell_of(&sim, a), Cell::new(1, 1));
}

/// Test that a car waits at a red light until enough traffic turns it green.
#[test]
fn red_light_holds_traffic() {
    let mut sim = corridor(5);
    for x in 0..4 {
        sim.add_road(Cell::new(x, 1), Heading::Right);
    }
    let light = sim.add_light(Cell::new(2, 1), false).unwrap();
    let dst = sim.add_destination(Cell::new(4, 1)).unwrap();
    let a = add_car(&mut sim, Cell::new(0, 1), dst, 0.0);

    sim.step_ordered(&[a]);
    sim.step_ordered(&[a]);
    assert_eq!(cell_of(&sim, a), Cell::new(1, 1));

    for _ in 0..4 {
        sim.step_ordered(&[a]);
        assert_eq!(cell_of(&sim, a), Cell::new(1, 1));
        assert_eq!(sim.get_light(light).unwrap().state(), LightState::Red);
    }
    assert_eq!(sim.get_light(light).unwrap().heading(), Some(Heading::Right));
    assert_eq!(sim.stats().red_lights, 4);

    // A second car queues up behind, which is enough to turn the light green
    let b = add_car(&mut sim, Cell::new(0, 1), dst, 0.0);
    sim.step_ordered(&[a, b]);
    assert_eq!(sim.get_light(light).unwrap().state(), LightState::Green);
    assert_eq!(cell_of(&sim, a), Cell::new(2, 1));
}

/// Test that a car stuck behind a parked car reroutes once its patience runs out.
#[test]
fn stuck_car_routes_around_blockage() {
    let mut sim = sim(5, 2);
    let dst = sim.add_destination(Cell::new(4, 0)).unwrap();
    let car = add_car(&mut sim, Cell::new(0, 0), dst, 0.75);
    // Never activated, so it never moves
    let _parked = add_car(&mut sim, Cell::new(1, 0), dst, 0.0);
    assert_eq!(sim.get_car(car).unwrap().patience(), 4);

    sim.step_ordered(&[car]);
    assert_eq!(path_of(&sim, car)[0], Cell::new(1, 0));

    for _ in 0..2 {
        sim.step_ordered(&[car]);
        assert_eq!(cell_of(&sim, car), Cell::new(0, 0));
        assert!(!sim.get_car(car).unwrap().is_stuck());
    }
    assert_eq!(sim.stats().waits, 2);

    sim.step_ordered(&[car]);
    assert!(sim.get_car(car).unwrap().is_stuck());
    assert_eq!(cell_of(&sim, car), Cell::new(1, 1));
    assert_eq!(sim.stats().stuck_events, 1);
}

/// Test that a stuck car with no way around stays put without a path.
#[test]
fn stuck_car_without_detour_stays_put() {
    let mut sim = sim(3, 1);
    let dst = sim.add_destination(Cell::new(2, 0)).unwrap();
    let car = add_car(&mut sim, Cell::new(0, 0), dst, 0.75);
    let _parked = add_car(&mut sim, Cell::new(1, 0), dst, 0.0);

    for _ in 0..3 {
        sim.step_ordered(&[car]);
    }
    assert!(!sim.get_car(car).unwrap().is_stuck());
    assert_eq!(sim.stats().failed_paths, 0);

    sim.add_obstacle(Cell::new(1, 0));
    sim.step_ordered(&[car]);
    assert!(sim.get_car(car).unwrap().is_stuck());
    assert_eq!(cell_of(&sim, car), Cell::new(0, 0));
    assert!(path_of(&sim, car).is_empty());
    assert_eq!(sim.stats().failed_paths, 1);
    assert_eq!(sim.stats().stuck_events, 1);
    assert_eq!(sim.stats().moves, 0);
}

/// Test that a stuck car won't take a detour into a road facing the wrong way,
/// and plans around that road instead.
#[test]
fn stuck_car_rejects_detour_against_road() {
    let mut sim = sim(3, 2);
    // Leaving (1, 1) towards (2, 0) is fine, but entering it from below is not
    sim.add_road(Cell::new(1, 1), Heading::Down);
    let dst = sim.add_destination(Cell::new(2, 0)).unwrap();
    let car = add_car(&mut sim, Cell::new(0, 0), dst, 0.75);
    let _parked = add_car(&mut sim, Cell::new(1, 0), dst, 0.0);

    for _ in 0..3 {
        sim.step_ordered(&[car]);
    }
    assert_eq!(sim.stats().replans, 1);

    sim.step_ordered(&[car]);
    assert!(sim.get_car(car).unwrap().is_stuck());
    assert_eq!(cell_of(&sim, car), Cell::new(0, 0));
    // One plan went through (1, 1), the next one avoided it
    assert_eq!(sim.stats().replans, 3);
    assert_eq!(path_of(&sim, car), vec![Cell::new(1, 0), Cell::new(2, 0)]);
    assert_eq!(sim.stats().stuck_events, 1);
    assert_eq!(sim.stats().moves, 0);
}

/// Test that a car on someone else's destination replans instead of moving.
#[test]
fn foreign_destination_forces_replan() {
    let mut sim = sim(5, 1);
    let theirs = sim.add_destination(Cell::new(1, 0)).unwrap();
    let mine = sim.add_destination(Cell::new(4, 0)).unwrap();
    assert_ne!(theirs, mine);
    let car = add_car(&mut sim, Cell::new(1, 0), mine, 0.0);

    sim.step_ordered(&[car]);
    assert_eq!(cell_of(&sim, car), Cell::new(1, 0));
    let path = path_of(&sim, car);
    assert_eq!(path, vec![Cell::new(2, 0), Cell::new(3, 0), Cell::new(4, 0)]);
    assert!(!path.contains(&Cell::new(1, 0)));
    assert_eq!(sim.stats().replans, 1);
    assert_eq!(sim.stats().reroutes, 1);
    assert_eq!(sim.completed_trips(), 0);
}

/// Test that a road turned by a light makes cars abandon a stale path.
#[test]
fn stale_path_is_rerouted() {
    let mut sim = sim(4, 3);
    // The light in (2, 1) starts out on a vertical road, then turns to face left.
    for cell in [(1, 1), (3, 1)] {
        sim.add_road(cell.into(), Heading::Left);
    }
    sim.add_road(Cell::new(2, 1), Heading::Vertical);
    let dst = sim.add_destination(Cell::new(2, 2)).unwrap();
    let car = add_car(&mut sim, Cell::new(2, 0), dst, 0.0);

    // Planned before the light exists, straight up through the vertical road
    sim.step_ordered(&[car]);
    assert_eq!(path_of(&sim, car), vec![Cell::new(2, 1), Cell::new(2, 2)]);

    sim.add_light(Cell::new(2, 1), true);
    sim.step_ordered(&[car]);
    assert_eq!(sim.grid().road(Cell::new(2, 1)), Some(Heading::Left));
    assert_eq!(cell_of(&sim, car), Cell::new(2, 0));
    assert_eq!(sim.stats().replans, 2);
    assert_eq!(sim.stats().reroutes, 1);
    assert!(!path_of(&sim, car).is_empty());
}
