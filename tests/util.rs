#![allow(dead_code)]

pub use turtle_pcode::config::{Value, GLOBAL_BASE, TRUE, FALSE};
pub use turtle_pcode::Error;
pub use turtle_pcode::bytecode::{Bytecode, Language, Line, OpCode, ProgramFile};
pub use turtle_pcode::shared::{types::Type, typed_ids::{RoutineId, VariableRef}};
pub use turtle_pcode::tree::*;
pub use turtle_pcode::compiler::{compile, typecheck, CompileError, CompileErrorKind};
pub use turtle_pcode::compiler::parser::{parse_expression, parse_statement, parse_constant};
pub use turtle_pcode::runtime::*;

/// Creates an empty Pascal program.
pub fn program() -> Program {
    Program::new(Language::Pascal, "test")
}

/// Declares a scalar variable of the program.
pub fn global(program: &mut Program, name: &str, ty: Type) -> VariableRef {
    program.add_variable(Program::ID, Variable::new(name, ty))
}

/// Parses a statement in the scope of `routine`, panicking on errors.
pub fn statement(program: &Program, routine: RoutineId, source: &str) -> Statement {
    match parse_statement(program, routine, source) {
        Ok(statement) => statement,
        Err(error) => panic!("Failed to parse '{}': {}", source, error),
    }
}

/// Parses an expression in the scope of `routine`, panicking on errors.
pub fn expression(program: &Program, routine: RoutineId, source: &str) -> Expression {
    match parse_expression(program, routine, source) {
        Ok(expression) => expression,
        Err(error) => panic!("Failed to parse '{}': {}", source, error),
    }
}

/// Appends parsed statements to the body of `routine`.
pub fn push(program: &mut Program, routine: RoutineId, sources: &[ &str ]) {
    for source in sources {
        let statement = statement(program, routine, source);
        program.push_statement(routine, statement);
    }
}

/// Appends a counting loop over `variable` with a body of parsed statements.
pub fn push_for(program: &mut Program, routine: RoutineId, variable: VariableRef, from: &str, to: &str, body: &[ &str ]) {
    let start = expression(program, routine, from);
    let end = expression(program, routine, to);
    let step = Expression::literal(LiteralValue::Integer(1), Position(0));
    let body = body.iter().map(|source| statement(program, routine, source)).collect();
    let result = typecheck::for_statement(program, routine, variable, start, end, &step, body, Position(0)).unwrap();
    program.push_statement(routine, result);
}

/// Options with a fixed seed.
pub fn options() -> Options {
    Options { seed: Some(1), ..Options::default() }
}

/// Compiles and runs a program until it stops or suspends, panicking on errors.
pub fn run(program: &Program) -> Machine<Recorder> {
    let bytecode = compile(program).unwrap_or_else(|error| panic!("Compilation failed: {}", error));
    let mut machine = Machine::new(Recorder::new());
    machine.run(bytecode, options()).unwrap();
    if let Err(error) = machine.run_to_end() {
        panic!("Runtime error: {} at line {}", error, error.line());
    }
    machine
}

/// Compiles and runs a program, returning the runtime error it stops with.
pub fn run_error(program: &Program) -> (Machine<Recorder>, RuntimeError) {
    let bytecode = compile(program).unwrap_or_else(|error| panic!("Compilation failed: {}", error));
    let mut machine = Machine::new(Recorder::new());
    machine.run(bytecode, options()).unwrap();
    match machine.run_to_end() {
        Ok(state) => panic!("Expected a runtime error, machine is {:?}", state),
        Err(error) => (machine, error),
    }
}

/// Runs raw bytecode lines until the machine stops, suspends or fails.
pub fn run_lines(lines: Vec<Vec<Value>>) -> (Machine<Recorder>, RuntimeResult<MachineState>) {
    let mut machine = Machine::new(Recorder::new());
    machine.run(Bytecode::from_values(lines), options()).unwrap();
    let result = machine.run_to_end();
    (machine, result)
}

/// Address of a program variable.
pub fn address(program: &Program, variable: VariableRef) -> Value {
    (GLOBAL_BASE + program.main().variable_offset(variable.index)) as Value
}

/// Reads a scalar program variable.
pub fn read(machine: &Machine<Recorder>, program: &Program, name: &str) -> Value {
    let variable = program.find_variable(Program::ID, name).unwrap();
    machine.peek(address(program, variable)).unwrap()
}

/// Reads the string a program variable points to.
pub fn read_string(machine: &Machine<Recorder>, program: &Program, name: &str) -> String {
    let pointer = read(machine, program, name);
    let length = machine.peek(pointer + 1).unwrap();
    (0..length).map(|i| char::from_u32(machine.peek(pointer + 2 + i).unwrap() as u32).unwrap()).collect()
}

/// Opcodes of every line of the bytecode.
pub fn opcodes(bytecode: &Bytecode) -> Vec<Vec<OpCode>> {
    bytecode.lines().iter().map(Line::opcodes).collect()
}
