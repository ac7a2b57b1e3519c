use crate::util::*;

/// Runs a list of statements and returns the machine.
fn draw(sources: &[ &str ]) -> Machine<Recorder> {
    let mut program = program();
    push(&mut program, Program::ID, sources);
    run(&program)
}

fn turtle(machine: &Machine<Recorder>) -> Turtle {
    machine.host().turtle().unwrap()
}

#[test]
fn initial_state() {
    let machine = draw(&[ ]);
    assert_eq!(turtle(&machine), Turtle { x: 500, y: 500, direction: 0, angles: 360, thickness: 2, colour: 0 });
    assert!(machine.host().drawings().is_empty());
}

#[test]
fn forward_draws() {
    let machine = draw(&[ "forward(100)" ]);
    assert_eq!(machine.host().lines(), vec![ ((500, 500), (500, 400)) ]);
    let machine = draw(&[ "back(20)" ]);
    assert_eq!(machine.host().lines(), vec![ ((500, 500), (500, 520)) ]);
}

#[test]
fn turning() {
    let machine = draw(&[ "right(90)", "forward(10)", "left(180)", "forward(20)" ]);
    assert_eq!(machine.host().lines(), vec![ ((500, 500), (510, 500)), ((510, 500), (490, 500)) ]);
    assert_eq!(turtle(&machine).direction, 270);
}

#[test]
fn direction_wraps() {
    let machine = draw(&[ "right(450)" ]);
    assert_eq!(turtle(&machine).direction, 90);
    let machine = draw(&[ "left(30)" ]);
    assert_eq!(turtle(&machine).direction, 330);
    let machine = draw(&[ "direction(-90)" ]);
    assert_eq!(turtle(&machine).direction, 270);
}

#[test]
fn angle_units() {
    let machine = draw(&[ "angles(4)", "right(1)", "forward(10)" ]);
    assert_eq!(machine.host().lines(), vec![ ((500, 500), (510, 500)) ]);
    let machine = draw(&[ "direction(90)", "angles(4)" ]);
    assert_eq!(turtle(&machine).direction, 1);
    assert_eq!(turtle(&machine).angles, 4);
}

#[test]
fn zero_angles_fail() {
    let mut program = program();
    push(&mut program, Program::ID, &[ "angles(0)" ]);
    let (machine, error) = run_error(&program);
    assert_eq!(error.kind(), RuntimeErrorKind::AngleZero);
    assert_eq!(machine.host().errors(), vec![ "Angles cannot be set to zero." ]);
}

#[test]
fn diagonal_rounding() {
    let machine = draw(&[ "right(45)", "forward(100)" ]);
    assert_eq!(machine.host().lines(), vec![ ((500, 500), (571, 429)) ]);
}

#[test]
fn thickness_zero_moves_without_drawing() {
    let machine = draw(&[ "thickness(0)", "forward(50)", "thickness(3)", "forward(50)" ]);
    assert_eq!(machine.host().lines(), vec![ ((500, 450), (500, 400)) ]);
    assert!(matches!(machine.host().drawings()[0], Draw::Line { thickness: 3, .. }));
}

#[test]
fn absolute_movement() {
    let machine = draw(&[ "setxy(10, 20)", "drawxy(5, 5)", "movexy(5, 0)", "setx(0)", "sety(0)" ]);
    assert_eq!(machine.host().lines(), vec![ ((10, 20), (15, 25)) ]);
    assert_eq!((turtle(&machine).x, turtle(&machine).y), (0, 0));
    let machine = draw(&[ "setxy(1, 1)", "right(90)", "home" ]);
    assert_eq!((turtle(&machine).x, turtle(&machine).y, turtle(&machine).direction), (500, 500, 0));
}

#[test]
fn turning_towards_points() {
    let machine = draw(&[ "turnxy(600, 500)" ]);
    assert_eq!(turtle(&machine).direction, 90);
    let machine = draw(&[ "turnxy(500, 600)" ]);
    assert_eq!(turtle(&machine).direction, 180);
}

#[test]
fn colours() {
    let machine = draw(&[ "colour(rgb(2))", "forward(10)" ]);
    assert_eq!(turtle(&machine).colour, 0xFF0000);
    assert!(matches!(machine.host().drawings()[0], Draw::Line { colour: 0xFF0000, .. }));
    let mut program = program();
    global(&mut program, "c", Type::integer);
    push(&mut program, Program::ID, &[ "c = mixcols(rgb(2), rgb(3), 1, 1)" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "c"), 0x800080);
}

#[test]
fn polygons() {
    let machine = draw(&[ "setxy(0, 0)", "setxy(10, 0)", "setxy(10, 10)", "polygon(3)" ]);
    assert_eq!(machine.host().drawings().last(), Some(&&Draw::Polygon { points: vec![ (0, 0), (10, 0), (10, 10) ], colour: 0, thickness: 2, closed: true, fill: false }));
    let machine = draw(&[ "setxy(0, 0)", "setxy(10, 0)", "forget(1)", "polyline(2)" ]);
    assert_eq!(machine.host().drawings().last(), Some(&&Draw::Polygon { points: vec![ (500, 500), (0, 0) ], colour: 0, thickness: 2, closed: false, fill: false }));
}

#[test]
fn shapes() {
    let machine = draw(&[ "colour(rgb(1))", "circle(20)", "ellblot(10, 5)", "box(30, 20, rgb(3), true)", "box(1, 1, 0, false)" ]);
    let drawings = machine.host().drawings();
    assert_eq!(drawings[0], &Draw::Arc { centre: (500, 500), x_radius: 20, y_radius: 20, colour: 0x228B22, thickness: 2, fill: false });
    assert_eq!(drawings[1], &Draw::Arc { centre: (500, 500), x_radius: 10, y_radius: 5, colour: 0x228B22, thickness: 2, fill: true });
    assert_eq!(drawings[2], &Draw::Box { corner: (500, 500), width: 30, height: 20, colour: 0x0000FF, border: Some(0x228B22), thickness: 2 });
    assert!(matches!(drawings[3], Draw::Box { border: None, .. }));
}

#[test]
fn text_and_pixels() {
    let machine = draw(&[ "font(2, 20)", "display('Hi')", "pixset(1, 2, rgb(49))", "blank(rgb(50))", "fill(rgb(4), 0)" ]);
    let drawings = machine.host().drawings();
    assert_eq!(drawings[0], &Draw::Text { at: (500, 500), text: "Hi".to_string(), colour: 0, font: 2, size: 20 });
    assert_eq!(drawings[1], &Draw::Pixel { at: (1, 2), colour: 0xFFFFFF });
    assert_eq!(drawings[2], &Draw::Blank { colour: 0x000000 });
    assert_eq!(drawings[3], &Draw::Fill { at: (500, 500), colour: 0xFFFF00, boundary: 0 });
}

#[test]
fn turtle_variables() {
    let mut program = program();
    global(&mut program, "x", Type::integer);
    push(&mut program, Program::ID, &[ "turtx = 100", "turtd = 90", "forward(10)", "x = turtx + turty" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "x"), 610);
}

#[test]
fn canvas_geometry() {
    let machine = draw(&[ "canvas(0, 0, 400, 300)", "resolution(40, 30)", "home" ]);
    let messages = machine.host().messages();
    assert!(messages.contains(&Message::Canvas { x: 0, y: 0, width: 400, height: 300 }));
    assert!(messages.contains(&Message::Resolution { width: 40, height: 30, doubled: true }));
    assert_eq!((turtle(&machine).x, turtle(&machine).y), (200, 150));
}

#[test]
fn pseudo_real_math() {
    let mut program = program();
    for name in [ "a", "b", "c", "d", "e", "f", "g", "h" ] {
        global(&mut program, name, Type::integer);
    }
    push(&mut program, Program::ID, &[
        "a = sqrt(2, 1, 1000)",
        "b = sin(30, 1, 1000)",
        "c = hypot(3, 4, 1)",
        "d = pi(10000)",
        "e = root(8, 1, 3, 1)",
        "f = power(2, 1, 10, 1)",
        "g = divmult(7, 2, 10)",
        "h = arctan(1, 1, 1)",
    ]);
    let machine = run(&program);
    let values: Vec<Value> = [ "a", "b", "c", "d", "e", "f", "g", "h" ].iter().map(|name| read(&machine, &program, name)).collect();
    assert_eq!(values, vec![ 1414, 500, 5, 31416, 2, 1024, 35, 45 ]);
}

#[test]
fn pseudo_real_errors() {
    for (source, kind) in [ ("n = sqrt(1, 0, 1)", RuntimeErrorKind::DivisionByZero), ("n = ln(0, 1, 1)", RuntimeErrorKind::InvalidResult) ] {
        let mut program = program();
        global(&mut program, "n", Type::integer);
        push(&mut program, Program::ID, &[ source ]);
        let (_, error) = run_error(&program);
        assert_eq!(error.kind(), kind, "{}", source);
    }
}

#[test]
fn drawing_budget() {
    let mut program = program();
    let i = global(&mut program, "i", Type::integer);
    push_for(&mut program, Program::ID, i, "1", "10", &[ "forward(10)" ]);
    let bytecode = compile(&program).unwrap();
    let mut machine = Machine::new(Recorder::new());
    machine.run(bytecode, options()).unwrap();
    assert_eq!(machine.tick(), Ok(MachineState::Running));
    assert_eq!(machine.host().lines().len(), 4);
    assert_eq!(machine.tick(), Ok(MachineState::Running));
    assert_eq!(machine.host().lines().len(), 8);
    assert_eq!(machine.run_to_end(), Ok(MachineState::Stopped));
    assert_eq!(machine.host().lines().len(), 10);
}

#[test]
fn instruction_budget() {
    let ldin = OpCode::ldin as Value;
    let mut machine = Machine::new(Recorder::new());
    let options = Options { code_count_max: 5, ..options() };
    machine.run(Bytecode::from_values(vec![ vec![ ldin, 1, ldin, 2, ldin, 3, ldin, 4, ldin, 5, ldin, 6, ldin, 7 ] ]), options).unwrap();
    assert_eq!(machine.tick(), Ok(MachineState::Running));
    assert_eq!(machine.stack_depth(), 5);
    assert_eq!(machine.pc(), (0, 10));
    assert_eq!(machine.run_to_end(), Ok(MachineState::Stopped));
    assert_eq!(machine.stack_depth(), 7);
}
