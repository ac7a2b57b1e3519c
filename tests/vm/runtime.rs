use crate::util::*;

/// Starts a program and runs it until it stops or suspends.
fn start(program: &Program) -> Machine<Recorder> {
    let bytecode = compile(program).unwrap();
    let mut machine = Machine::new(Recorder::new());
    machine.run(bytecode, options()).unwrap();
    machine.run_to_end().unwrap();
    machine
}

fn suspension(machine: &Machine<Recorder>) -> Suspension {
    match machine.state() {
        MachineState::Suspended(suspension) => suspension,
        other => panic!("Expected a suspended machine, machine is {:?}", other),
    }
}

fn type_text(machine: &mut Machine<Recorder>, text: &str) {
    for c in text.chars() {
        assert!(!machine.resume(Event::KeyChar(c as Value)));
    }
}

#[test]
fn lifecycle_messages() {
    let mut program = program();
    push(&mut program, Program::ID, &[ "home" ]);
    let machine = start(&program);
    let messages = machine.host().messages();
    assert_eq!(messages[0], Message::Started);
    assert_eq!(messages[1], Message::ShowCanvas);
    assert_eq!(messages.last(), Some(&Message::Halted));
    let bytecode = compile(&program).unwrap();
    let mut machine = Machine::new(Recorder::new());
    machine.run(bytecode, Options { show_canvas_on_run: false, ..options() }).unwrap();
    assert!(!machine.host().messages().contains(&Message::ShowCanvas));
}

#[test]
fn timed_pause() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "pause(100)", "n = 1" ]);
    let mut machine = start(&program);
    let suspended = suspension(&machine);
    assert_eq!(suspended.wait, WaitKind::Delay);
    let (ticket, delay) = machine.host().timer().unwrap();
    assert_eq!((ticket, delay), (suspended.ticket, 100));
    assert_eq!(read(&machine, &program, "n"), 0);
    assert!(!machine.resume(Event::Timeout(ticket + 1)));
    assert!(machine.resume(Event::Timeout(ticket)));
    assert!(!machine.resume(Event::Timeout(ticket)));
    assert_eq!(machine.run_to_end(), Ok(MachineState::Stopped));
    assert_eq!(read(&machine, &program, "n"), 1);
}

#[test]
fn stale_timers_after_halt() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "pause(100)", "n = 1" ]);
    let mut machine = start(&program);
    let (ticket, _) = machine.host().timer().unwrap();
    machine.halt();
    assert_eq!(machine.state(), MachineState::Stopped);
    assert_eq!(machine.host().messages().last(), Some(&Message::Halted));
    assert!(!machine.resume(Event::Timeout(ticket)));
    assert_eq!(machine.state(), MachineState::Stopped);
    assert_eq!(read(&machine, &program, "n"), 0);
}

#[test]
fn already_running() {
    let mut program = program();
    push(&mut program, Program::ID, &[ "pause(100)" ]);
    let mut machine = start(&program);
    let state = machine.state();
    let error = machine.run(compile(&program).unwrap(), options()).unwrap_err();
    assert_eq!(error.kind(), RuntimeErrorKind::AlreadyRunning);
    assert_eq!(error.to_string(), "A program is already running.");
    assert_eq!(machine.state(), state);
}

#[test]
fn read_line() {
    let mut program = program();
    global(&mut program, "s", Type::string);
    push(&mut program, Program::ID, &[ "s = readln", "write(s)" ]);
    let mut machine = start(&program);
    assert_eq!(suspension(&machine).wait, WaitKind::ReadLine);
    assert_eq!(machine.host().timer(), None);
    type_text(&mut machine, "hi");
    assert!(machine.resume(Event::KeyChar(13)));
    assert_eq!(machine.run_to_end(), Ok(MachineState::Stopped));
    assert_eq!(read_string(&machine, &program, "s"), "hi");
    assert_eq!(machine.host().output(), "hi");
    assert_eq!(machine.host().console(), "");
}

#[test]
fn read_line_echo() {
    let mut program = program();
    global(&mut program, "s", Type::string);
    push(&mut program, Program::ID, &[ "keyecho(true)", "s = readln" ]);
    let mut machine = start(&program);
    type_text(&mut machine, "ok");
    assert!(machine.resume(Event::KeyChar(13)));
    machine.run_to_end().unwrap();
    assert_eq!(read_string(&machine, &program, "s"), "ok");
    assert_eq!(machine.host().console(), "ok\n");
}

#[test]
fn keyboard_buffer() {
    let mut program = program();
    global(&mut program, "s", Type::string);
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "keybuffer(4)", "pause(10)", "s = read(2)", "n = keybuflen" ]);
    let mut machine = start(&program);
    type_text(&mut machine, "abcdef");
    let (ticket, _) = machine.host().timer().unwrap();
    assert!(machine.resume(Event::Timeout(ticket)));
    machine.run_to_end().unwrap();
    assert_eq!(read_string(&machine, &program, "s"), "ab");
    assert_eq!(read(&machine, &program, "n"), 2);
}

#[test]
fn detect_key() {
    let mut program = program();
    global(&mut program, "b", Type::boolean);
    push(&mut program, Program::ID, &[ "b = detect(65, 500)" ]);
    let mut machine = start(&program);
    let suspended = suspension(&machine);
    assert_eq!(suspended.wait, WaitKind::Detect { key: 65 });
    assert_eq!(machine.host().timer(), Some((suspended.ticket, 500)));
    assert!(!machine.resume(Event::KeyDown(66)));
    assert!(machine.resume(Event::KeyDown(65)));
    machine.run_to_end().unwrap();
    assert_eq!(read(&machine, &program, "b"), TRUE);
}

#[test]
fn detect_timeout() {
    let mut program = program();
    global(&mut program, "b", Type::boolean);
    push(&mut program, Program::ID, &[ "b = detect(65, 500)" ]);
    let mut machine = start(&program);
    let (ticket, _) = machine.host().timer().unwrap();
    assert!(machine.resume(Event::Timeout(ticket)));
    machine.run_to_end().unwrap();
    assert_eq!(read(&machine, &program, "b"), FALSE);
    assert_eq!(machine.state(), MachineState::Stopped);
}

#[test]
fn key_state() {
    let mut program = program();
    global(&mut program, "b", Type::boolean);
    global(&mut program, "k", Type::integer);
    global(&mut program, "j", Type::integer);
    push(&mut program, Program::ID, &[ "pause(1)", "b = keydown(65)", "k = lastkey", "pause(1)", "j = lastkey" ]);
    let mut machine = start(&program);
    machine.resume(Event::KeyDown(65));
    let (ticket, _) = machine.host().timer().unwrap();
    assert!(machine.resume(Event::Timeout(ticket)));
    machine.run_to_end().unwrap();
    machine.resume(Event::KeyUp(65));
    let (ticket, _) = machine.host().timer().unwrap();
    assert!(machine.resume(Event::Timeout(ticket)));
    machine.run_to_end().unwrap();
    assert_eq!(read(&machine, &program, "b"), TRUE);
    assert_eq!(read(&machine, &program, "k"), 65);
    assert_eq!(read(&machine, &program, "j"), -65);
}

#[test]
fn pointer_state() {
    let mut program = program();
    for name in [ "x", "y", "c", "d" ] {
        global(&mut program, name, Type::integer);
    }
    push(&mut program, Program::ID, &[ "d = mousex", "pause(1)", "x = mousex", "y = mousey", "c = click" ]);
    let mut machine = start(&program);
    assert!(!machine.resume(Event::PointerMove(30, 40)));
    assert!(!machine.resume(Event::PointerDown(1)));
    let (ticket, _) = machine.host().timer().unwrap();
    machine.resume(Event::Timeout(ticket));
    machine.run_to_end().unwrap();
    assert_eq!(read(&machine, &program, "d"), -1);
    assert_eq!((read(&machine, &program, "x"), read(&machine, &program, "y")), (30, 40));
    assert_eq!(read(&machine, &program, "c"), 1);
}

#[test]
fn elapsed_time() {
    let mut program = program();
    global(&mut program, "t", Type::integer);
    global(&mut program, "u", Type::integer);
    push(&mut program, Program::ID, &[ "pause(250)", "t = time", "timeset(100)", "u = time" ]);
    let mut machine = start(&program);
    machine.host_mut().advance(250);
    let (ticket, _) = machine.host().timer().unwrap();
    machine.resume(Event::Timeout(ticket));
    machine.run_to_end().unwrap();
    assert_eq!(read(&machine, &program, "t"), 250);
    assert_eq!(read(&machine, &program, "u"), 100);
}

#[test]
fn pausing() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "n = 1" ]);
    let mut machine = Machine::new(Recorder::new());
    machine.run(compile(&program).unwrap(), options()).unwrap();
    machine.pause();
    assert!(machine.is_paused());
    assert_eq!(machine.run_to_end(), Ok(MachineState::Running));
    assert_eq!(machine.tick(), Ok(MachineState::Running));
    assert_eq!(read(&machine, &program, "n"), 0);
    machine.unpause();
    assert_eq!(machine.run_to_end(), Ok(MachineState::Stopped));
    assert_eq!(read(&machine, &program, "n"), 1);
    let messages = machine.host().messages();
    assert!(messages.contains(&Message::Paused));
    assert!(messages.contains(&Message::Unpaused));
}

#[test]
fn random_numbers_follow_the_seed() {
    let mut program = program();
    global(&mut program, "a", Type::integer);
    global(&mut program, "b", Type::integer);
    push(&mut program, Program::ID, &[ "a = random(1000)", "b = random(1000)" ]);
    let first = run(&program);
    let second = run(&program);
    let values = |machine: &Machine<Recorder>| (read(machine, &program, "a"), read(machine, &program, "b"));
    assert_eq!(values(&first), values(&second));
    assert!((0..1000).contains(&values(&first).0));
    assert!((0..1000).contains(&values(&first).1));
}

#[test]
fn memory_dump() {
    let mut program = program();
    let n = global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "n = 42", "dump" ]);
    let mut machine = run(&program);
    let dump = machine.host().messages().iter().find_map(|m| match m { Message::MemoryDump(dump) => Some(dump.clone()), _ => None }).unwrap();
    assert_eq!(dump.globals[address(&program, n) as usize], 42);
    assert_eq!(dump.globals[1 .. 3], [ 500, 500 ]);
    assert!(dump.stack.is_empty());
    machine.host_mut().take();
    machine.dump();
    assert!(matches!(machine.host().messages(), [ Message::MemoryDump(_) ]));
}

#[test]
fn message_serialization() {
    let json = serde_json::to_value(Message::Timer { ticket: 3, delay: 50 }).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "timer", "data": { "ticket": 3, "delay": 50 } }));
    let json = serde_json::to_value(Message::Halted).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "halted" }));
    let error = Message::Error { message: "Division by zero.".to_string(), kind: RuntimeErrorKind::DivisionByZero };
    let json = serde_json::to_value(error).unwrap();
    assert_eq!(json["data"]["message"], "Division by zero.");
    assert_eq!(json["data"]["kind"]["kind"], "divisionByZero");
    let json = serde_json::to_value(Message::Draw(Draw::Pixel { at: (1, 2), colour: 3 })).unwrap();
    assert_eq!(json["data"]["shape"], "pixel");
}

#[test]
fn options_deserialization() {
    let options: Options = serde_json::from_str(r#"{ "drawCountMax": 10, "seed": 7 }"#).unwrap();
    assert_eq!(options, Options { draw_count_max: 10, seed: Some(7), ..Options::default() });
    let options: Options = serde_json::from_str("{}").unwrap();
    assert_eq!(options, Options::default());
    assert_eq!(options.code_count_max, 100_000);
    assert_eq!(options.stack_size, 20_000);
    assert!(options.show_canvas_on_run);
}

#[test]
fn run_convenience() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "n = 6 * 7" ]);
    let machine = turtle_pcode::run(&program, Recorder::new(), options()).unwrap();
    assert_eq!(machine.state(), MachineState::Stopped);
    assert_eq!(read(&machine, &program, "n"), 42);
}

#[test]
fn program_files() {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "n = 6 * 7" ]);
    let file = ProgramFile::new(Language::Pascal, "answer", "n := 6 * 7;", compile(&program).unwrap());
    let json = file.to_json().unwrap();
    let loaded = ProgramFile::from_json(&json).unwrap();
    assert_eq!(loaded, file);
    let mut machine = Machine::new(Recorder::new());
    machine.run(loaded.pcode, options()).unwrap();
    machine.run_to_end().unwrap();
    assert_eq!(read(&machine, &program, "n"), 42);
    let broken = ProgramFile::new(Language::Pascal, "broken", "", Bytecode::from_values(vec![ vec![ OpCode::jump as Value, 9 ] ]));
    let json = broken.to_json_pretty().unwrap();
    assert!(matches!(ProgramFile::from_json(&json), Err(Error::InvalidBytecode(_))));
    assert!(matches!(ProgramFile::from_json("{ \"language\": \"Pascal\" }"), Err(Error::FileError(_))));
}
