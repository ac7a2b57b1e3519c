use crate::util::*;

/// Runs `s = <source>` and returns the resulting string.
fn string(source: &str) -> String {
    let mut program = program();
    global(&mut program, "s", Type::string);
    push(&mut program, Program::ID, &[ &format!("s = {}", source) ]);
    let machine = run(&program);
    read_string(&machine, &program, "s")
}

/// Runs `n = <source>` and returns the resulting integer.
fn integer(source: &str) -> Value {
    let mut program = program();
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ &format!("n = {}", source) ]);
    let machine = run(&program);
    read(&machine, &program, "n")
}

#[test]
fn concatenation() {
    let mut program = program();
    global(&mut program, "s", Type::string);
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "s = 'abc'", "s = s + 'def'", "n = length(s)" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "abcdef");
    assert_eq!(read(&machine, &program, "n"), 6);
}

#[test]
fn substrings() {
    assert_eq!(string("copy('turtle', 2, 3)"), "urt");
    assert_eq!(string("copy('turtle', 5, 10)"), "le");
    assert_eq!(string("delete('turtle', 1, 3)"), "tle");
    assert_eq!(string("insert('tle', 'tur', 1)"), "turtle");
    assert_eq!(string("insert('tur', 'tle', 99)"), "turtle");
    assert_eq!(integer("pos('rt', 'turtle')"), 3);
    assert_eq!(integer("pos('x', 'turtle')"), 0);
}

#[test]
fn transformations() {
    assert_eq!(string("replace('a-b-c', '-', '+', 0)"), "a+b+c");
    assert_eq!(string("replace('a-b-c', '-', '', 1)"), "ab-c");
    assert_eq!(string("pad('7', '0', 3)"), "007");
    assert_eq!(string("pad('7', '.', -3)"), "7..");
    assert_eq!(string("trim('  x y  ')"), "x y");
    assert_eq!(string("uppercase('MixEd')"), "MIXED");
    assert_eq!(string("lowercase('MixEd')"), "mixed");
}

#[test]
fn conversions() {
    assert_eq!(string("str(-42)"), "-42");
    assert_eq!(string("hex(255, 4)"), "00FF");
    assert_eq!(string("qstr(2, 3, 2)"), "0.67");
    assert_eq!(integer("val('#1F', 0)"), 31);
    assert_eq!(integer("val(' 12 ', 0)"), 12);
    assert_eq!(integer("val('x', -1)"), -1);
    assert_eq!(integer("qval('1.5', 10, 0)"), 15);
    assert_eq!(integer("qval('abc', 10, 7)"), 7);
    assert_eq!(integer("ord('A')"), 65);
    assert_eq!(string("chr(66)"), "B");
}

#[test]
fn comparisons() {
    let mut program = program();
    for name in [ "a", "b", "c" ] {
        global(&mut program, name, Type::boolean);
    }
    push(&mut program, Program::ID, &[ "a = 'abc' < 'abd'", "b = 'abc' = 'ab' + 'c'", "c = 'b' <= 'a'" ]);
    let machine = run(&program);
    assert_eq!(read(&machine, &program, "a"), TRUE);
    assert_eq!(read(&machine, &program, "b"), TRUE);
    assert_eq!(read(&machine, &program, "c"), FALSE);
}

#[test]
fn character_indexing() {
    let mut program = program();
    global(&mut program, "s", Type::string);
    global(&mut program, "c", Type::character);
    global(&mut program, "n", Type::integer);
    push(&mut program, Program::ID, &[ "s = 'cat'", "c = s[1]", "s[1] = 'b'", "n = ord(c)" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "bat");
    assert_eq!(read(&machine, &program, "n"), 99);
}

#[test]
fn string_index_out_of_range() {
    for source in [ "c = s[4]", "s[0] = 'x'" ] {
        let mut program = program();
        global(&mut program, "s", Type::string);
        global(&mut program, "c", Type::character);
        push(&mut program, Program::ID, &[ "s = 'cat'", source ]);
        let (machine, error) = run_error(&program);
        assert_eq!(error.kind(), RuntimeErrorKind::StringIndexOutOfRange, "{}", source);
        assert_eq!(machine.host().errors(), vec![ "String index out of range." ]);
    }
}

#[test]
fn assignment_truncates_to_capacity() {
    let mut program = program();
    program.add_variable(Program::ID, Variable::new("s", Type::string).with_length(3));
    push(&mut program, Program::ID, &[ "s = 'abcdef'" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "abc");
}

#[test]
fn assignment_copies() {
    let mut program = program();
    global(&mut program, "s", Type::string);
    global(&mut program, "t", Type::string);
    push(&mut program, Program::ID, &[ "s = 'one'", "t = s", "s[1] = 'O'" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "One");
    assert_eq!(read_string(&machine, &program, "t"), "one");
}

#[test]
fn output() {
    let mut program = program();
    push(&mut program, Program::ID, &[ "write('hi')", "writeline('!')", "write(str(3))", "clearoutput", "write('x')" ]);
    let machine = run(&program);
    assert_eq!(machine.host().output(), "x");
    let mut program = self::program();
    push(&mut program, Program::ID, &[ "write('hi')", "writeline('!')", "console('c')" ]);
    let machine = run(&program);
    assert_eq!(machine.host().output(), "hi!\n");
    assert_eq!(machine.host().console(), "c");
}

#[test]
fn temporary_strings_are_reclaimed() {
    let mut program = program();
    let i = global(&mut program, "i", Type::integer);
    global(&mut program, "s", Type::string);
    push(&mut program, Program::ID, &[ "s = 'start'" ]);
    let used = {
        let machine = run(&program);
        machine.heap_used()
    };
    push_for(&mut program, Program::ID, i, "1", "500", &[ "s = str(i) + uppercase('abc')" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "500ABC");
    assert_eq!(machine.heap_used(), used);
}

#[test]
fn subroutine_strings_are_reclaimed() {
    let mut program = program();
    let i = global(&mut program, "i", Type::integer);
    global(&mut program, "s", Type::string);
    let shout = program.add_subroutine(Program::ID, "shout", RoutineKind::Function, Some(Type::string));
    program.add_variable(shout, Variable::parameter("text", Type::string));
    push(&mut program, shout, &[ "return uppercase(text) + '!'" ]);
    push(&mut program, Program::ID, &[ "s = shout('a')" ]);
    let used = {
        let machine = run(&program);
        machine.heap_used()
    };
    push_for(&mut program, Program::ID, i, "1", "200", &[ "s = shout('b')" ]);
    let machine = run(&program);
    assert_eq!(read_string(&machine, &program, "s"), "B!");
    assert_eq!(machine.heap_used(), used);
}
