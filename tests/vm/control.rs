use crate::util::*;

#[test]
fn counting_loop() {
    let mut program = program();
    let i = global(&mut program, "i", Type::integer);
    global(&mut program, "count", Type::integer);
    push_for(&mut program, Program::ID, i, "1", "5", &[ "count = count + 1" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "count"), 5);
    assert_eq!(read(&machine, &program, "i"), 6);
}

#[test]
fn counting_loop_downwards() {
    let mut program = program();
    let i = global(&mut program, "i", Type::integer);
    global(&mut program, "digits", Type::integer);
    let body = vec![ statement(&program, Program::ID, "digits = digits * 10 + i") ];
    let (start, end, step) = (expression(&program, Program::ID, "3"), expression(&program, Program::ID, "1"), expression(&program, Program::ID, "-1"));
    let result = typecheck::for_statement(&program, Program::ID, i, start, end, &step, body, Position(0)).unwrap();
    program.push_statement(Program::ID, result);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "digits"), 321);
}

#[test]
fn empty_counting_loop() {
    let mut program = program();
    let i = global(&mut program, "i", Type::integer);
    global(&mut program, "count", Type::integer);
    push_for(&mut program, Program::ID, i, "5", "1", &[ "count = count + 1" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "count"), 0);
}

#[test]
fn while_and_repeat() {
    let mut program = program();
    global(&mut program, "a", Type::integer);
    global(&mut program, "b", Type::integer);
    let body = vec![ statement(&program, Program::ID, "a = a + 3") ];
    let result = typecheck::while_statement(expression(&program, Program::ID, "a < 10"), body, Position(0)).unwrap();
    program.push_statement(Program::ID, result);
    let body = vec![ statement(&program, Program::ID, "b = b + 1") ];
    let result = typecheck::repeat_statement(body, expression(&program, Program::ID, "b >= 3"), Position(0)).unwrap();
    program.push_statement(Program::ID, result);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "a"), 12);
    assert_eq!(read(&machine, &program, "b"), 3);
}

#[test]
fn branching() {
    for (x, expected) in [ (5, 1), (0, -1), (-3, -1) ] {
        let mut program = program();
        global(&mut program, "x", Type::integer);
        global(&mut program, "y", Type::integer);
        push(&mut program, Program::ID, &[ &format!("x = {}", x) ]);
        let condition = expression(&program, Program::ID, "x > 0");
        let then_branch = vec![ statement(&program, Program::ID, "y = 1") ];
        let else_branch = vec![ statement(&program, Program::ID, "y = -1") ];
        let result = typecheck::if_statement(condition, then_branch, else_branch, Position(0)).unwrap();
        program.push_statement(Program::ID, result);
        let machine = run(&program);
        assert_eq!(read(&machine, &program, "y"), expected, "x = {}", x);
    }
}

#[test]
fn integer_arithmetic() {
    let mut program = program();
    for name in [ "a", "b", "c", "d", "e", "f" ] {
        global(&mut program, name, Type::integer);
    }
    global(&mut program, "t", Type::boolean);
    push(&mut program, Program::ID, &[
        "a = 17 div 5",
        "b = -17 mod 5",
        "c = 7 divr 2",
        "d = maxint + 1",
        "e = max(3, 9) - min(3, 9) * abs(-2)",
        "f = sign(-12) + (6 xor 3)",
        "t = 3 < 4",
    ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "a"), 3);
    assert_eq!(read(&machine, &program, "b"), -2);
    assert_eq!(read(&machine, &program, "c"), 4);
    assert_eq!(read(&machine, &program, "d"), i32::MIN);
    assert_eq!(read(&machine, &program, "e"), 3);
    assert_eq!(read(&machine, &program, "f"), 4);
    assert_eq!(read(&machine, &program, "t"), TRUE);
}

#[test]
fn division_by_zero() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    global(&mut program, "x", Type::integer);
    push(&mut program, Program::ID, &[ "n = 0", "x = 5 div n", "x = 1" ]);
    let (machine, error) = run_error(&program);
    assert_eq!(error.kind(), RuntimeErrorKind::DivisionByZero);
    assert_eq!(machine.state(), MachineState::Stopped);
    assert_eq!(machine.host().errors(), vec![ "Division by zero." ]);
    assert_eq!(read(&machine, &program, "x"), 0);
}

#[test]
fn zero_angles_halt() {
    let (machine, result) = run_lines(vec![
        vec![ OpCode::ldin as Value, 0, OpCode::angl as Value, OpCode::ldin as Value, 9, OpCode::halt as Value ],
    ]);
    let error = result.unwrap_err();
    assert_eq!(error.kind(), RuntimeErrorKind::AngleZero);
    assert_eq!((error.line(), error.position()), (0, 2));
    assert_eq!(machine.state(), MachineState::Stopped);
    assert_eq!(machine.host().errors(), vec![ "Angles cannot be set to zero." ]);
    assert_eq!(machine.stack_depth(), 0);
    assert!(matches!(machine.host().messages().last(), Some(Message::Error { kind: RuntimeErrorKind::AngleZero, .. })));
}

#[test]
fn running_past_the_end() {
    let (machine, result) = run_lines(vec![ vec![ OpCode::ldin as Value, 1 ], vec![ ] ]);
    assert_eq!(result, Ok(MachineState::Stopped));
    assert_eq!(machine.stack_depth(), 1);
    assert!(machine.host().errors().is_empty());
    assert_eq!(machine.host().messages().last(), Some(&Message::Halted));
}

#[test]
fn invalid_code() {
    let (_, result) = run_lines(vec![ vec![ OpCode::jump as Value, 7 ] ]);
    assert_eq!(result.unwrap_err().kind(), RuntimeErrorKind::InvalidJump(7));
    let (_, result) = run_lines(vec![ vec![ 9999 ] ]);
    assert_eq!(result.unwrap_err().kind(), RuntimeErrorKind::InvalidOpCode(9999));
    let (_, result) = run_lines(vec![ vec![ OpCode::ldin as Value ] ]);
    assert_eq!(result.unwrap_err().kind(), RuntimeErrorKind::InvalidOpCode(OpCode::ldin as Value));
    let (_, result) = run_lines(vec![ vec![ OpCode::plus as Value ] ]);
    assert_eq!(result.unwrap_err().kind(), RuntimeErrorKind::StackUnderflow);
}

#[test]
fn stack_manipulation() {
    let (machine, result) = run_lines(vec![
        vec![ OpCode::ldin as Value, 1, OpCode::ldin as Value, 2, OpCode::ldin as Value, 3, OpCode::rota as Value ],
        vec![ OpCode::dupl as Value, OpCode::swap as Value, OpCode::dump as Value ],
    ]);
    assert_eq!(result, Ok(MachineState::Stopped));
    let dump = machine.host().messages().iter().find_map(|m| match m { Message::MemoryDump(dump) => Some(dump.clone()), _ => None }).unwrap();
    assert_eq!(dump.stack, vec![ 2, 3, 1, 1 ]);
}

#[test]
fn arrays() {
    let mut program = program();
    let i = global(&mut program, "i", Type::integer);
    program.add_variable(Program::ID, Variable::array("list", Type::integer, vec![ Dimension::new(1, 3) ]));
    global(&mut program, "total", Type::integer);
    push_for(&mut program, Program::ID, i, "1", "3", &[ "list[i] = i * i" ]);
    push(&mut program, Program::ID, &[ "total = list[1] + list[2] + list[3]" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "total"), 14);
}

#[test]
fn arrays_with_offset_start() {
    let mut program = program();
    program.add_variable(Program::ID, Variable::array("list", Type::integer, vec![ Dimension::new(-2, 5) ]));
    global(&mut program, "total", Type::integer);
    push(&mut program, Program::ID, &[ "list[-2] = 4", "list[2] = 5", "total = list[-2] * list[2]" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "total"), 20);
}

#[test]
fn array_index_out_of_range() {
    for index in [ "0", "4" ] {
        let mut program = program();
        program.add_variable(Program::ID, Variable::array("list", Type::integer, vec![ Dimension::new(1, 3) ]));
        push(&mut program, Program::ID, &[ &format!("list[{}] = 1", index) ]);
        let (machine, error) = run_error(&program);
        assert_eq!(error.kind(), RuntimeErrorKind::IndexOutOfRange);
        assert_eq!(machine.host().errors(), vec![ "Array index out of range." ]);
    }
}

#[test]
fn string_arrays() {
    let mut program = program();
    program.add_variable(Program::ID, Variable::array("names", Type::string, vec![ Dimension::new(1, 2) ]));
    global(&mut program, "s", Type::string);
    push(&mut program, Program::ID, &[ "names[1] = 'ada'", "names[2] = names[1] + '!'", "s = names[2]" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "ada!");
}

#[test]
fn file_operations_fail() {
    let mut program = program();
    global(&mut program, "b", Type::boolean);
    push(&mut program, Program::ID, &[ "b = fileexists('notes.txt')" ]);
    let (machine, error) = run_error(&program);
    assert_eq!(error.kind(), RuntimeErrorKind::NotImplemented);
    assert_eq!(machine.host().errors(), vec![ "File processing has not been implemented." ]);
}

#[test]
fn halt_statement() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "n = 1", "halt", "n = 2" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "n"), 1);
    assert_eq!(machine.state(), MachineState::Stopped);
}
