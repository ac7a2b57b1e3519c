use crate::util::*;

/// Declares `fact(n)`, computing factorials recursively.
fn factorial(program: &mut Program) -> RoutineId {
    let fact = program.add_subroutine(Program::ID, "fact", RoutineKind::Function, Some(Type::integer));
    program.add_variable(fact, Variable::parameter("n", Type::integer));
    let condition = expression(program, fact, "n <= 1");
    let then_branch = vec![ statement(program, fact, "return 1") ];
    let else_branch = vec![ statement(program, fact, "return n * fact(n - 1)") ];
    let result = typecheck::if_statement(condition, then_branch, else_branch, Position(0)).unwrap();
    program.push_statement(fact, result);
    fact
}

#[test]
fn recursion() {
    let mut program = program();
    global(&mut program, "x", Type::integer);
    factorial(&mut program);
    push(&mut program, Program::ID, &[ "x = fact(5)" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "x"), 120);
    assert_eq!(machine.arena_depth(), 0);
    assert_eq!(machine.stack_depth(), 0);
}

#[test]
fn calls_restore_frame_and_stack() {
    let mut program = program();
    global(&mut program, "x", Type::integer);
    factorial(&mut program);
    push(&mut program, Program::ID, &[ "x = fact(3)" ]);
    let bytecode = compile(&program).unwrap();
    let mut machine = Machine::new(Recorder::new());
    machine.run(bytecode, options()).unwrap();
    // the setup line's first instruction moves the arena past the globals
    assert_eq!(machine.next_instruction().and_then(|instruction| instruction.opcode), Some(OpCode::glob));
    machine.step().unwrap();
    let initial_frame_base = machine.frame_base();
    assert_eq!(initial_frame_base, GLOBAL_BASE as Value + 1);
    let mut calls = Vec::new();
    let mut depth_max = 0;
    while machine.state() == MachineState::Running {
        let opcode = machine.next_instruction().and_then(|instruction| instruction.opcode);
        if opcode == Some(OpCode::subr) {
            calls.push((machine.frame_base(), machine.stack_depth()));
        }
        machine.step().unwrap();
        if opcode == Some(OpCode::retn) {
            let (frame_base, stack_depth) = calls.pop().unwrap();
            assert_eq!(machine.frame_base(), frame_base);
            assert_eq!(machine.stack_depth(), stack_depth);
        }
        depth_max = depth_max.max(calls.len());
    }
    assert_eq!(depth_max, 3);
    assert!(calls.is_empty());
    assert_eq!(machine.frame_base(), initial_frame_base);
    assert_eq!(read(&machine, &program, "x"), 6);
}

#[test]
fn reference_parameters() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    let bump = program.add_subroutine(Program::ID, "bump", RoutineKind::Procedure, None);
    program.add_variable(bump, Variable::reference("target", Type::integer));
    push(&mut program, bump, &[ "target = target + 1" ]);
    push(&mut program, Program::ID, &[ "n = 5", "bump(n)", "bump(n)" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "n"), 7);
}

#[test]
fn value_parameters_are_copies() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    global(&mut program, "t", Type::string);
    let change = program.add_subroutine(Program::ID, "change", RoutineKind::Procedure, None);
    program.add_variable(change, Variable::parameter("a", Type::integer));
    program.add_variable(change, Variable::parameter("s", Type::string));
    push(&mut program, change, &[ "a = a * 2", "s = s + '!'", "write(s)" ]);
    push(&mut program, Program::ID, &[ "n = 4", "t = 'hi'", "change(n, t)", "write(t)" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "n"), 4);
    assert_eq!(read_string(&machine, &program, "t"), "hi");
    assert_eq!(machine.host().output(), "hi!hi");
}

#[test]
fn parameter_order() {
    let mut program = program();
    global(&mut program, "x", Type::integer);
    let combine = program.add_subroutine(Program::ID, "combine", RoutineKind::Function, Some(Type::integer));
    program.add_variable(combine, Variable::parameter("a", Type::integer));
    program.add_variable(combine, Variable::parameter("b", Type::integer));
    program.add_variable(combine, Variable::parameter("c", Type::integer));
    push(&mut program, combine, &[ "return a * 100 + b * 10 + c" ]);
    push(&mut program, Program::ID, &[ "x = combine(1, 2, 3)" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "x"), 123);
}

#[test]
fn string_results() {
    let mut program = program();
    global(&mut program, "s", Type::string);
    let greet = program.add_subroutine(Program::ID, "greet", RoutineKind::Function, Some(Type::string));
    program.add_variable(greet, Variable::parameter("name", Type::string));
    push(&mut program, greet, &[ "return 'Hello ' + name" ]);
    push(&mut program, Program::ID, &[ "s = greet('Bob')", "s = s + '.'" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "Hello Bob.");
}

#[test]
fn early_return() {
    let mut program = program();
    global(&mut program, "x", Type::integer);
    let first = program.add_subroutine(Program::ID, "first", RoutineKind::Function, Some(Type::integer));
    push(&mut program, first, &[ "return 1", "return 2" ]);
    let skip = program.add_subroutine(Program::ID, "skip", RoutineKind::Procedure, None);
    push(&mut program, skip, &[ "x = x + 10", "return", "x = x + 100" ]);
    push(&mut program, Program::ID, &[ "x = first", "skip" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "x"), 11);
}

#[test]
fn array_reference_parameters() {
    let mut program = program();
    program.add_variable(Program::ID, Variable::array("list", Type::integer, vec![ Dimension::new(1, 3) ]));
    global(&mut program, "total", Type::integer);
    let setall = program.add_subroutine(Program::ID, "setall", RoutineKind::Procedure, None);
    program.add_variable(setall, Variable::reference("items", Type::integer).with_dimensions(vec![ Dimension::new(1, 3) ]));
    let i = program.add_variable(setall, Variable::new("i", Type::integer));
    push_for(&mut program, setall, i, "1", "3", &[ "items[i] = i * 10" ]);
    push(&mut program, Program::ID, &[ "setall(list)", "total = list[1] + list[2] + list[3]" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "total"), 60);
}

#[test]
fn nested_routines_see_globals() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    let outer = program.add_subroutine(Program::ID, "outer", RoutineKind::Procedure, None);
    let inner = program.add_subroutine(outer, "inner", RoutineKind::Procedure, None);
    push(&mut program, inner, &[ "n = n * 3" ]);
    push(&mut program, outer, &[ "n = n + 1", "inner", "inner" ]);
    push(&mut program, Program::ID, &[ "n = 1", "outer" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "n"), 18);
}

#[test]
fn local_variables_start_cleared() {
    let mut program = program();
    global(&mut program, "x", Type::integer);
    let count = program.add_subroutine(Program::ID, "count", RoutineKind::Function, Some(Type::integer));
    program.add_variable(count, Variable::new("local", Type::integer));
    push(&mut program, count, &[ "local = local + 1", "return local" ]);
    push(&mut program, Program::ID, &[ "x = count + count" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "x"), 2);
}

#[test]
fn unbounded_recursion_overflows() {
    let mut program = program();
    let down = program.add_subroutine(Program::ID, "down", RoutineKind::Procedure, None);
    program.add_variable(down, Variable::new("local", Type::integer));
    push(&mut program, down, &[ "down" ]);
    push(&mut program, Program::ID, &[ "down" ]);
    let (machine, error) = run_error(&program);
    assert_eq!(error.kind(), RuntimeErrorKind::StackOverflow);
    assert_eq!(machine.state(), MachineState::Stopped);
}
