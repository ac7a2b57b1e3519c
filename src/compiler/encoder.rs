//! Lowers a checked program tree into bytecode lines.

use crate::config::{Value, Address, LineIndex, TURTLE_BASE, TURTLE_SLOTS, GLOBAL_BASE, KEYBUFFER_SIZE, RESULT_STRING_LENGTH, MAX_FRAME_SIZE, FALSE};
use crate::shared::{types::Type, typed_ids::{RoutineId, VariableRef}};
use crate::bytecode::{Bytecode, Line, OpCode, Writer, Placeholder};
use crate::tree::*;
use crate::compiler::error::{CompileError, CompileResult, OptionToCompileError};

/// Where a variable's cell lives.
#[derive(Copy, Clone, Debug)]
enum Slot {
    Turtle(usize),
    Global(Address),
    Local(usize),
}

/// Memory region initialised by a start line.
#[derive(Copy, Clone, Debug)]
enum Region {
    Global,
    Frame,
}

impl Region {
    /// Stores the top of the stack in the cell at `offset` of the region.
    fn store(self: Self, line: &mut Line, offset: usize) {
        match self {
            Region::Global => line.stvg((GLOBAL_BASE + offset) as Value),
            Region::Frame => line.stvv(offset as Value),
        };
    }
    /// Stores a constant in the cell at `offset` of the region.
    fn store_value(self: Self, line: &mut Line, offset: usize, value: Value) {
        line.ldin(value);
        self.store(line, offset);
    }
    /// Writes array headers and allocates string buffers for a variable (or array element) at `offset`.
    fn initialise(self: Self, line: &mut Line, offset: usize, ty: Type, string_length: usize, dimensions: &[Dimension]) {
        match dimensions.first() {
            Some(first) => {
                self.store_value(line, offset, first.length as Value);
                self.store_value(line, offset + 1, first.start);
                if ty != Type::string && dimensions.len() == 1 {
                    return;
                }
                for element in Variable::elements(ty, dimensions) {
                    self.initialise(line, offset + element.offset, ty, string_length, &element.dimensions);
                }
            }
            None if ty == Type::string => {
                line.ldin(string_length as Value);
                line.hstr();
                self.store(line, offset);
            }
            None => { }
        }
    }
}

/// Checks that a frame or the global region fits the machine's memory.
fn region_length(routine: &str, length: usize) -> CompileResult<Value> {
    if length > MAX_FRAME_SIZE {
        Err(CompileError::ice(format!("Frame of '{}' needs {} cells, more than the maximum of {}", routine, length, MAX_FRAME_SIZE)))
    } else {
        Ok(length as Value)
    }
}

/// Expression and simple statement compiler for the body of one routine.
#[derive(Copy, Clone)]
struct Scope<'a> {
    program : &'a Program,
    routine : RoutineId,
}

impl<'a> Scope<'a> {

    /// Returns the variable and the location of its cell.
    fn variable(self: Self, variable: VariableRef) -> CompileResult<(&'a Variable, Slot)> {
        let var = self.program.variable(variable).ice_msg("Unknown variable")?;
        if let Some(slot) = var.turtle_slot {
            return Ok((var, Slot::Turtle(slot)));
        }
        let offset = self.program.routine(variable.routine).ice_msg("Unknown routine")?.variable_offset(variable.index);
        if variable.routine == Program::ID {
            Ok((var, Slot::Global(GLOBAL_BASE + offset)))
        } else if variable.routine == self.routine {
            Ok((var, Slot::Local(offset)))
        } else {
            Err(CompileError::ice(format!("Variable '{}' accessed outside of its routine", var.name)))
        }
    }

    /// Pushes the value of a scalar or the pointer held by a string variable.
    fn compile_load(self: Self, line: &mut Line, var: &Variable, slot: Slot) -> CompileResult {
        if var.is_array() {
            return Err(CompileError::ice(format!("Array '{}' loaded as a value", var.name)));
        }
        match slot {
            Slot::Turtle(slot) => line.ldvt(slot as Value),
            Slot::Global(address) if var.is_indirect() => { line.ldvg(address as Value); line.lptr() }
            Slot::Global(address) => line.ldvg(address as Value),
            Slot::Local(offset) if var.is_indirect() => line.ldvr(offset as Value),
            Slot::Local(offset) => line.ldvv(offset as Value),
        };
        Ok(())
    }

    /// Pops the top of the stack into a scalar variable. Global pointers are handled by the caller.
    fn compile_store(self: Self, line: &mut Line, var: &Variable, slot: Slot) -> CompileResult {
        match slot {
            Slot::Turtle(slot) => line.stvt(slot as Value),
            Slot::Global(_) if var.is_indirect() => return Err(CompileError::ice(format!("Direct store to pointer '{}'", var.name))),
            Slot::Global(address) => line.stvg(address as Value),
            Slot::Local(offset) if var.is_indirect() => line.stvr(offset as Value),
            Slot::Local(offset) => line.stvv(offset as Value),
        };
        Ok(())
    }

    /// Pushes the address of the variable's storage (the array header for arrays).
    fn compile_base(self: Self, line: &mut Line, var: &Variable, slot: Slot) {
        match slot {
            Slot::Turtle(slot) => line.ldin((TURTLE_BASE + slot) as Value),
            Slot::Global(address) if var.is_indirect() => line.ldvg(address as Value),
            Slot::Global(address) => line.ldin(address as Value),
            Slot::Local(offset) if var.is_indirect() => line.ldvv(offset as Value),
            Slot::Local(offset) => line.ldav(offset as Value),
        };
    }

    /// Pushes the range checked address of an array element.
    fn compile_element(self: Self, line: &mut Line, var: &Variable, slot: Slot, index: &Expression) -> CompileResult {
        self.compile_base(line, var, slot);
        self.compile_expression(line, index)?;
        line.test();
        line.elem(var.element_length() as Value);
        Ok(())
    }

    /// Compiles the given expression, leaving its value on the stack.
    fn compile_expression(self: Self, line: &mut Line, item: &Expression) -> CompileResult {
        match item {
            Expression::Literal(literal) => self.compile_literal(line, &literal.value),
            Expression::VariableValue(access) => self.compile_variable(line, access)?,
            Expression::VariableAddress(access) => self.compile_address(line, access)?,
            Expression::FunctionCall(function) => self.compile_call(line, &function.call)?,
            Expression::Compound(compound) => {
                if let Some(left) = &compound.left {
                    self.compile_expression(line, left)?;
                }
                self.compile_expression(line, &compound.right)?;
                line.instruction(compound.operator.opcode());
            }
            Expression::Cast(cast) => {
                self.compile_expression(line, &cast.expression)?;
                match (cast.expression.ty(), cast.ty) {
                    (Type::character, Type::string) => { line.ctos(); },
                    (Type::string, Type::character) => { line.sasc(); },
                    (found, ty) if Type::unifies(ty, found) => { },
                    (found, ty) => return Err(CompileError::ice(format!("Invalid cast from {:?} to {:?}", found, ty))),
                }
            }
        }
        Ok(())
    }

    /// Compiles a literal. Literal `true` is encoded as the program's true value.
    fn compile_literal(self: Self, line: &mut Line, value: &LiteralValue) {
        match value {
            LiteralValue::Boolean(v) => line.ldin(if *v { self.program.true_value } else { FALSE }),
            LiteralValue::Integer(v) => line.ldin(*v),
            LiteralValue::Character(c) => line.ldin(*c as Value),
            LiteralValue::String(s) => line.string(s),
        };
    }

    /// Compiles a variable, array element or string character load.
    fn compile_variable(self: Self, line: &mut Line, access: &VariableAccess) -> CompileResult {
        let (var, slot) = self.variable(access.variable)?;
        match access.indexes.first() {
            None => self.compile_load(line, var, slot)?,
            Some(index) if var.is_array() => {
                self.compile_element(line, var, slot, index)?;
                line.lptr();
            }
            Some(index) => {
                self.compile_load(line, var, slot)?;
                self.compile_expression(line, index)?;
                line.tsti();
                line.cget();
            }
        }
        Ok(())
    }

    /// Compiles the address of a variable or array element.
    fn compile_address(self: Self, line: &mut Line, access: &VariableAccess) -> CompileResult {
        let (var, slot) = self.variable(access.variable)?;
        match access.indexes.first() {
            None => self.compile_base(line, var, slot),
            Some(index) if var.is_array() => self.compile_element(line, var, slot, index)?,
            Some(_) => return Err(CompileError::ice(format!("Address of a character of '{}'", var.name))),
        }
        Ok(())
    }

    /// Compiles a call: arguments left to right, then the built-in's code or a subroutine call.
    fn compile_call(self: Self, line: &mut Line, item: &Call) -> CompileResult {
        for argument in &item.arguments {
            self.compile_expression(line, argument)?;
        }
        match item.target {
            CallTarget::Builtin(builtin) => {
                for &opcode in builtin.code {
                    line.instruction(opcode);
                }
            }
            CallTarget::Subroutine(id) => {
                line.subr(Placeholder(id).to_value());
            }
        }
        Ok(())
    }

    /// Compiles an assignment. Strings are copied into the target's buffer, never aliased.
    fn compile_assignment(self: Self, line: &mut Line, item: &VariableAssignment) -> CompileResult {
        let (var, slot) = self.variable(item.target.variable)?;
        match item.target.indexes.first() {
            None if var.ty == Type::string => {
                self.compile_expression(line, &item.value)?;
                self.compile_load(line, var, slot)?;
                line.cstr();
            }
            None => match slot {
                Slot::Global(address) if var.is_indirect() => {
                    line.ldvg(address as Value);
                    self.compile_expression(line, &item.value)?;
                    line.sptr();
                }
                _ => {
                    self.compile_expression(line, &item.value)?;
                    self.compile_store(line, var, slot)?;
                }
            },
            Some(index) if var.is_array() && var.ty == Type::string => {
                self.compile_expression(line, &item.value)?;
                self.compile_element(line, var, slot, index)?;
                line.lptr();
                line.cstr();
            }
            Some(index) if var.is_array() => {
                self.compile_element(line, var, slot, index)?;
                self.compile_expression(line, &item.value)?;
                line.sptr();
            }
            Some(index) => {
                self.compile_load(line, var, slot)?;
                self.compile_expression(line, index)?;
                line.tsti();
                self.compile_expression(line, &item.value)?;
                line.cset();
            }
        }
        Ok(())
    }
}

/// Bytecode generator state.
struct Encoder<'a> {
    program : &'a Program,
    writer  : Writer,
    /// Start line of each routine, once known.
    starts  : Vec<Option<LineIndex>>,
    /// Jumps of return statements of the current routine, to be patched with its end line.
    returns : Vec<(LineIndex, usize)>,
}

impl<'a> Encoder<'a> {

    fn new(program: &'a Program) -> Self {
        Encoder {
            program,
            writer  : Writer::new(),
            starts  : vec![ None; program.routine_count() ],
            returns : Vec::new(),
        }
    }

    /// Compiles the whole program: global setup, subroutines in declaration order, main body, halt.
    fn compile(self: &mut Self) -> CompileResult {
        let program = self.program;
        self.compile_setup()?;
        for (id, routine) in program.routines().skip(1) {
            self.compile_subroutine(id, routine)?;
        }
        let body = self.writer.len();
        self.starts[Program::ID.into_usize()] = Some(body);
        self.compile_block(Scope { program, routine: Program::ID }, &program.main().statements)?;
        self.fix_heap(body, true);
        self.writer.line().halt();
        Ok(())
    }

    /// Writes the global setup line: global region, turtle defaults, global arrays and strings, keyboard buffer.
    fn compile_setup(self: &mut Self) -> CompileResult {
        let program = self.program;
        let main = program.main();
        let globals = region_length(&main.name, main.variables_length().saturating_add(TURTLE_SLOTS))?;
        let line = self.writer.line();
        line.glob(globals);
        line.home();
        line.ldin(2);
        line.thik();
        line.ldin(360);
        line.angl();
        line.ldin(0);
        line.colr();
        for (index, var) in main.variables.iter().enumerate() {
            if !var.is_turtle() && !var.is_indirect() {
                Region::Global.initialise(line, main.variable_offset(index), var.ty, var.string_length, &var.dimensions);
            }
        }
        line.ldin(KEYBUFFER_SIZE as Value);
        line.bufr();
        line.hfix();
        line.jump(Placeholder(Program::ID).to_value());
        Ok(())
    }

    /// Compiles a subroutine: start line, body and end line.
    fn compile_subroutine(self: &mut Self, id: RoutineId, routine: &'a Routine) -> CompileResult {
        let start = self.writer.len();
        self.starts[id.into_usize()] = Some(start);
        self.returns.clear();

        // claim frame, initialise local arrays and strings, then unpack the arguments from the stack
        let frame_length = region_length(&routine.name, routine.frame_length())?;
        let line = self.writer.line();
        line.pssr(start as Value);
        line.memc(frame_length);
        for (index, var) in routine.variables.iter().enumerate() {
            if !var.is_indirect() && !var.is_turtle() {
                Region::Frame.initialise(line, routine.variable_offset(index), var.ty, var.string_length, &var.dimensions);
            }
        }
        if routine.return_type == Some(Type::string) {
            Region::Frame.initialise(line, routine.result_offset(), Type::string, RESULT_STRING_LENGTH, &[]);
        }
        let parameters: Vec<_> = routine.parameters().collect();
        for &(index, var) in parameters.iter().rev() {
            let offset = routine.variable_offset(index) as Value;
            if var.ty == Type::string && !var.is_reference_parameter {
                line.ldvv(offset);
                line.cstr();
            } else {
                line.stvv(offset);
            }
        }
        line.hfix();

        // body
        let body = self.writer.len();
        self.compile_block(Scope { program: self.program, routine: id }, &routine.statements)?;

        // leave the result on the stack, release the frame and return
        let end = self.writer.len();
        let line = self.writer.line();
        if routine.is_function() {
            line.ldvv(routine.result_offset() as Value);
        }
        line.memr();
        line.plsr();
        line.retn();

        for (line, position) in std::mem::take(&mut self.returns) {
            self.writer.overwrite(line, position, end as Value).ice_msg("Return jump not found")?;
        }
        self.fix_heap(body, false);
        log::debug!("compiled subroutine '{}' at line {}, {} lines", routine.name, start, self.writer.len() - start);
        Ok(())
    }

    /// Appends heap reclamation to the statement lines written since `from`.
    ///
    /// Lines producing temporary strings without calling a subroutine get `hclr`. Main program lines that call
    /// a subroutine get `hrst`, unwinding heap growth of the call.
    fn fix_heap(self: &mut Self, from: LineIndex, main: bool) {
        for line in self.writer.lines_mut(from) {
            let calls = line.contains(OpCode::subr);
            if !calls && line.instructions().any(|i| i.opcode.map_or(false, OpCode::produces_heap_string)) {
                line.insert_before_trailing_jump(OpCode::hclr);
            } else if calls && main {
                line.insert_before_trailing_jump(OpCode::hrst);
            }
        }
    }

    /// Compiles a sequence of statements.
    fn compile_block(self: &mut Self, scope: Scope<'a>, statements: &[Statement]) -> CompileResult {
        for statement in statements {
            self.compile_statement(scope, statement)?;
        }
        Ok(())
    }

    /// Compiles the given statement. Every simple statement occupies one line.
    fn compile_statement(self: &mut Self, scope: Scope<'a>, item: &Statement) -> CompileResult {
        match item {
            Statement::VariableAssignment(assignment) => scope.compile_assignment(self.writer.line(), assignment),
            Statement::ProcedureCall(call) => scope.compile_call(self.writer.line(), call),
            Statement::If(if_statement) => self.compile_if(scope, if_statement),
            Statement::For(for_statement) => self.compile_for(scope, for_statement),
            Statement::Repeat(repeat) => self.compile_repeat(scope, repeat),
            Statement::While(while_statement) => self.compile_while(scope, while_statement),
            Statement::Return(return_statement) => self.compile_return(scope, return_statement),
            Statement::Pass(_) => Ok(()),
        }
    }

    /// Writes a condition line ending in `ifno` with a placeholder target. Returns the jump's line and position.
    fn compile_condition(self: &mut Self, scope: Scope<'a>, condition: &Expression) -> CompileResult<(LineIndex, usize)> {
        let index = self.writer.len();
        let line = self.writer.line();
        scope.compile_expression(line, condition)?;
        Ok((index, line.ifno(Writer::PENDING)))
    }

    /// Sets the target of a previously written jump.
    fn patch(self: &mut Self, (line, position): (LineIndex, usize), target: LineIndex) -> CompileResult {
        self.writer.overwrite(line, position, target as Value).ice_msg("Jump not found").map(|_| ())
    }

    /// Compiles an if statement.
    fn compile_if(self: &mut Self, scope: Scope<'a>, item: &IfStatement) -> CompileResult {

        // compile condition and jump placeholder
        let else_jump = self.compile_condition(scope, &item.condition)?;

        // compile then-branch, followed by a jump over the else-branch if there is one
        self.compile_block(scope, &item.then_branch)?;
        let done_jump = if !item.else_branch.is_empty() {
            let index = self.writer.len();
            Some((index, self.writer.line().jump(Writer::PENDING)))
        } else {
            None
        };

        // go back and point the condition at the else-branch or the remaining code
        let else_code = self.writer.len();
        self.patch(else_jump, else_code)?;

        if let Some(done_jump) = done_jump {
            self.compile_block(scope, &item.else_branch)?;
            let done_code = self.writer.len();
            self.patch(done_jump, done_code)?;
        }
        Ok(())
    }

    /// Compiles a counting loop: initialisation, test, body, change and jump back to the test.
    fn compile_for(self: &mut Self, scope: Scope<'a>, item: &ForStatement) -> CompileResult {
        scope.compile_assignment(self.writer.line(), &item.initialisation)?;
        let test = self.writer.len();
        let exit_jump = self.compile_condition(scope, &item.condition)?;
        self.compile_block(scope, &item.body)?;
        let line = self.writer.line();
        scope.compile_assignment(line, &item.change)?;
        line.jump(test as Value);
        let exit_target = self.writer.len();
        self.patch(exit_jump, exit_target)
    }

    /// Compiles a loop running its body until the condition holds.
    fn compile_repeat(self: &mut Self, scope: Scope<'a>, item: &RepeatStatement) -> CompileResult {
        let start = self.writer.len();
        self.compile_block(scope, &item.body)?;
        let line = self.writer.line();
        scope.compile_expression(line, &item.condition)?;
        line.ifno(start as Value);
        Ok(())
    }

    /// Compiles a while loop.
    fn compile_while(self: &mut Self, scope: Scope<'a>, item: &WhileStatement) -> CompileResult {
        let test = self.writer.len();
        let exit_jump = self.compile_condition(scope, &item.condition)?;
        self.compile_block(scope, &item.body)?;
        self.writer.line().jump(test as Value);
        let exit_target = self.writer.len();
        self.patch(exit_jump, exit_target)
    }

    /// Compiles a return statement: stores the function result and jumps to the end line.
    fn compile_return(self: &mut Self, scope: Scope<'a>, item: &ReturnStatement) -> CompileResult {
        let routine = self.program.routine(item.routine).ice_msg("Unknown routine")?;
        let index = self.writer.len();
        let line = self.writer.line();
        if let Some(value) = &item.value {
            let offset = routine.result_offset() as Value;
            scope.compile_expression(line, value)?;
            if routine.return_type == Some(Type::string) {
                line.ldvv(offset);
                line.cstr();
            } else {
                line.stvv(offset);
            }
        }
        let position = line.jump(Writer::PENDING);
        self.returns.push((index, position));
        Ok(())
    }

    /// Resolves subroutine call placeholders and validates the result.
    fn into_bytecode(self: Self) -> CompileResult<Bytecode> {
        let Encoder { mut writer, starts, .. } = self;
        writer.fix_targets(|Placeholder(id)| starts.get(id.into_usize()).copied().flatten())
            .map_err(|Placeholder(id)| CompileError::ice(format!("Unresolved call to routine {}", id.into_usize())))?;
        let bytecode = writer.into_bytecode();
        bytecode.validate().map_err(|error| CompileError::ice(format!("Invalid bytecode generated: {}", error)))?;
        Ok(bytecode)
    }
}

/// Compiles a checked program tree into bytecode.
pub(super) fn encode(program: &Program) -> CompileResult<Bytecode> {
    let mut encoder = Encoder::new(program);
    encoder.compile()?;
    encoder.into_bytecode()
}
