use soft_life::{Automaton, RuleKind};

fn empty_world(width: u32, height: u32) -> Automaton {
    let mut world = Automaton::new(width, height, RuleKind::Conway).expect("construction");
    world.clear();
    world
}

fn set_cells(world: &mut Automaton, cells: &[(i64, i64)]) {
    for &(x, y) in cells {
        world.set_cell(x, y, 1.0);
    }
}

fn assert_alive(world: &Automaton, x: i64, y: i64) {
    assert!(
        world.get_cell(x, y) >= 0.5,
        "expected live cell at ({x}, {y})"
    );
}

fn assert_dead(world: &Automaton, x: i64, y: i64) {
    assert!(
        world.get_cell(x, y) < 0.5,
        "expected dead cell at ({x}, {y})"
    );
}

#[test]
fn block_is_a_still_life() {
    let mut world = empty_world(8, 8);
    let block = [(1, 1), (2, 1), (1, 2), (2, 2)];
    set_cells(&mut world, &block);

    world.advance_n(3);

    assert_eq!(world.mass(), 4.0);
    for &(x, y) in &block {
        assert_alive(&world, x, y);
    }
}

#[test]
fn blinker_oscillates_with_period_two() {
    let mut world = empty_world(8, 8);
    set_cells(&mut world, &[(1, 2), (2, 2), (3, 2)]);

    world.advance();
    assert_alive(&world, 2, 1);
    assert_alive(&world, 2, 2);
    assert_alive(&world, 2, 3);
    assert_dead(&world, 1, 2);
    assert_dead(&world, 3, 2);
    assert_eq!(world.mass(), 3.0);

    world.advance();
    assert_alive(&world, 1, 2);
    assert_alive(&world, 2, 2);
    assert_alive(&world, 3, 2);
}

#[test]
fn glider_translates_diagonally() {
    let mut world = empty_world(32, 32);
    let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
    set_cells(&mut world, &glider);

    // One full glider period moves the pattern one cell down-right.
    world.advance_n(4);

    assert_eq!(world.mass(), 5.0);
    for &(x, y) in &glider {
        assert_alive(&world, x + 1, y + 1);
    }
}

#[test]
fn glider_crosses_the_seam() {
    let mut world = empty_world(8, 8);
    let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
    set_cells(&mut world, &glider);

    // 8 periods: a full lap on an 8x8 torus, back to the start.
    world.advance_n(32);

    assert_eq!(world.mass(), 5.0);
    for &(x, y) in &glider {
        assert_alive(&world, x, y);
    }
}

#[test]
fn lonely_and_crowded_cells_die() {
    let mut world = empty_world(8, 8);
    // Isolated cell.
    set_cells(&mut world, &[(5, 5)]);
    world.advance();
    assert_dead(&world, 5, 5);

    // Full world: every cell has 8 neighbours, all die.
    let mut world = empty_world(6, 6);
    for y in 0..6 {
        for x in 0..6 {
            world.set_cell(x, y, 1.0);
        }
    }
    world.advance();
    assert_eq!(world.mass(), 0.0);
}

#[test]
fn field_stays_strictly_binary() {
    let mut world = Automaton::new(24, 24, RuleKind::Conway).expect("construction");
    world.advance_n(5);
    assert!(world
        .field()
        .current()
        .iter()
        .all(|&v| v == 0.0 || v == 1.0));
}
