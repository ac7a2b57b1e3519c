//! Typed constructors for expressions and statements, and validation of finished program trees.
//!
//! Front ends resolve identifiers and then build the tree exclusively through these constructors, which
//! insert coercions and reject ill-typed programs. [`check_program`] re-validates a finished tree before
//! code generation and reports references to nonexistent variables or routines as internal errors.

use crate::shared::{types::{Type, Coercion}, typed_ids::{RoutineId, VariableRef}};
use crate::tree::*;
use crate::compiler::{constant, error::{CompileError, CompileErrorKind as CEK, CompileResult}};

/// Returns `expression` made acceptable where `expected` is required, inserting a cast if necessary.
///
/// A single-character string literal is accepted as a character literal.
pub fn coerce(expected: Type, expression: Expression) -> CompileResult<Expression> {
    if expected == Type::character {
        if let Some(c) = expression.as_literal().and_then(LiteralValue::as_single_char) {
            return Ok(Expression::literal(LiteralValue::Character(c), expression.position()));
        }
    }
    let found = expression.ty();
    match Type::coercion(expected, found) {
        Some(Coercion::Exact) | Some(Coercion::Unify) => Ok(expression),
        Some(Coercion::Cast(ty)) => Ok(Expression::Cast(CastExpression {
            position    : expression.position(),
            ty          : ty,
            expression  : Box::new(expression),
        })),
        None => Err(CompileError::new(&expression, CEK::TypeMismatch { expected, found })),
    }
}

/// Coerces an expression used as a condition.
pub fn condition(expression: Expression) -> CompileResult<Expression> {
    coerce(Type::boolean, expression)
}

/// Creates a binary expression. Operators with a string operand are replaced by their string counterpart.
pub fn binary(operator: Operator, left: Expression, right: Expression, position: Position) -> CompileResult<Expression> {
    use Type::*;
    if operator.is_unary() {
        return Err(CompileError::ice(format!("Unary operator {:?} used as binary operator", operator)));
    }
    let (left_ty, right_ty) = (left.ty(), right.ty());
    let concatenates_chars = operator == Operator::Plus && left_ty == character && right_ty == character;
    let (operator, operand_ty, result_ty) = if left_ty == string || right_ty == string || operator.is_string() || concatenates_chars {
        for (operand, found) in [ (&left, left_ty), (&right, right_ty) ] {
            if found != string && found != character {
                return Err(CompileError::new(operand, CEK::TypeMismatch { expected: string, found }));
            }
        }
        let operator = operator.string_counterpart().ok_or_else(|| CompileError::at(position, CEK::TypeMismatch { expected: integer, found: string }))?;
        (operator, string, if operator == Operator::Scat { string } else { boolean })
    } else if operator == Operator::Eqal || operator == Operator::Noeq {
        let ty = if left_ty == right_ty { left_ty } else if Type::unifies(left_ty, right_ty) { unified(left_ty, right_ty) } else {
            return Err(CompileError::new(&right, CEK::TypeMismatch { expected: left_ty, found: right_ty }));
        };
        (operator, ty, boolean)
    } else if operator.is_comparison() {
        let ty = if left_ty == character && right_ty == character { character } else { integer };
        (operator, ty, boolean)
    } else if operator.is_logical() {
        let ty = if left_ty == boolean || right_ty == boolean {
            boolean
        } else if left_ty == integer || right_ty == integer {
            integer
        } else {
            boolint
        };
        (operator, ty, ty)
    } else {
        (operator, integer, integer)
    };
    let left = coerce(operand_ty, left)?;
    let right = coerce(operand_ty, right)?;
    Ok(Expression::Compound(CompoundExpression {
        position,
        operator,
        left    : Some(Box::new(left)),
        right   : Box::new(right),
        ty      : result_ty,
    }))
}

/// The more specific of two unifying types.
fn unified(a: Type, b: Type) -> Type {
    if a == Type::boolint { b } else { a }
}

/// Creates a unary expression (`-` or `not`).
pub fn unary(operator: Operator, operand: Expression, position: Position) -> CompileResult<Expression> {
    let ty = match operator {
        Operator::Neg => Type::integer,
        Operator::Not => match operand.ty() {
            ty @ (Type::boolean | Type::integer | Type::boolint) => ty,
            found => return Err(CompileError::new(&operand, CEK::TypeMismatch { expected: Type::boolint, found })),
        },
        _ => return Err(CompileError::ice(format!("Binary operator {:?} used as unary operator", operator))),
    };
    let operand = coerce(ty, operand)?;
    Ok(Expression::Compound(CompoundExpression {
        position,
        operator,
        left    : None,
        right   : Box::new(operand),
        ty      : ty,
    }))
}

/// Returns the variable, checking that it exists and is accessible from `from`.
fn accessible<'a>(program: &'a Program, from: RoutineId, variable: VariableRef, position: Position) -> CompileResult<&'a Variable> {
    let var = program.variable(variable).ok_or_else(|| CompileError::at(position, CEK::Unresolved(format!("variable {} of routine {}", variable.index, variable.routine.into_usize()))))?;
    if variable.routine != from && variable.routine != Program::ID {
        return Err(CompileError::at(position, CEK::NonLocalVariable(var.name.clone())));
    }
    Ok(var)
}

/// Builds a checked variable access. Array elements and string characters take exactly one index.
pub fn access(program: &Program, from: RoutineId, variable: VariableRef, indexes: Vec<Expression>, position: Position) -> CompileResult<VariableAccess> {
    let var = accessible(program, from, variable, position)?;
    let ty = match indexes.len() {
        0 => var.ty,
        1 if var.is_array() && var.dimensions.len() > 1 => return Err(CompileError::at(position, CEK::MultiDimensionalIndex(var.name.clone()))),
        1 if var.is_array() => var.ty,
        1 if var.ty == Type::string => Type::character,
        _ if var.is_array() || var.ty == Type::string => return Err(CompileError::at(position, CEK::MultiDimensionalIndex(var.name.clone()))),
        _ => return Err(CompileError::at(position, CEK::NotIndexable(var.name.clone()))),
    };
    let indexes = indexes.into_iter().map(|index| coerce(Type::integer, index)).collect::<CompileResult<Vec<_>>>()?;
    Ok(VariableAccess { position, variable, ty, indexes })
}

/// Creates an expression loading a variable, array element or string character.
pub fn variable_value(program: &Program, from: RoutineId, variable: VariableRef, indexes: Vec<Expression>, position: Position) -> CompileResult<Expression> {
    Ok(Expression::VariableValue(access(program, from, variable, indexes, position)?))
}

/// Creates an expression loading the address of a variable or array element.
pub fn variable_address(program: &Program, from: RoutineId, variable: VariableRef, indexes: Vec<Expression>, position: Position) -> CompileResult<Expression> {
    Ok(Expression::VariableAddress(access(program, from, variable, indexes, position)?))
}

/// A parameter as seen by a caller.
struct Parameter<'a> {
    name        : &'a str,
    ty          : Type,
    reference   : bool,
    array       : bool,
}

/// Returns name and parameters of a call target.
fn signature<'a>(program: &'a Program, target: CallTarget, position: Position) -> CompileResult<(&'a str, Vec<Parameter<'a>>)> {
    match target {
        CallTarget::Builtin(builtin) => Ok((builtin.name, builtin.parameters.iter().map(|&ty| Parameter { name: builtin.name, ty, reference: false, array: false }).collect())),
        CallTarget::Subroutine(id) => {
            let routine = program.routine(id).ok_or_else(|| CompileError::at(position, CEK::Unresolved(format!("routine {}", id.into_usize()))))?;
            let parameters = routine.parameters().map(|(_, v)| Parameter { name: &v.name, ty: v.ty, reference: v.is_reference_parameter, array: v.is_array() }).collect();
            Ok((&routine.name, parameters))
        }
    }
}

/// Creates a checked call. Arguments for reference parameters are turned into variable addresses.
pub fn call(program: &Program, from: RoutineId, target: CallTarget, arguments: Vec<Expression>, position: Position) -> CompileResult<Call> {
    let (name, parameters) = signature(program, target, position)?;
    if arguments.len() != parameters.len() {
        return Err(CompileError::at(position, CEK::ArgumentCount { name: name.to_string(), expected: parameters.len(), found: arguments.len() }));
    }
    let mut checked = Vec::with_capacity(arguments.len());
    for (argument, parameter) in arguments.into_iter().zip(parameters.iter()) {
        if parameter.array && !parameter.reference {
            return Err(CompileError::new(&argument, CEK::ArrayValueParameter(parameter.name.to_string())));
        }
        checked.push(if parameter.reference {
            reference_argument(program, from, argument, parameter)?
        } else {
            coerce(parameter.ty, argument)?
        });
    }
    Ok(Call { position, target, arguments: checked })
}

/// Checks an argument passed to a reference parameter and converts it to an address.
fn reference_argument(program: &Program, from: RoutineId, argument: Expression, parameter: &Parameter<'_>) -> CompileResult<Expression> {
    let access = match argument {
        Expression::VariableValue(access) | Expression::VariableAddress(access) => access,
        other => return Err(CompileError::new(&other, CEK::ReferenceArgument(parameter.name.to_string()))),
    };
    let var = accessible(program, from, access.variable, access.position)?;
    let is_array = var.is_array() && access.indexes.is_empty();
    if is_array != parameter.array || var.is_turtle() || (access.ty == Type::character && var.ty == Type::string) {
        return Err(CompileError::at(access.position, CEK::ReferenceArgument(parameter.name.to_string())));
    }
    if access.ty != parameter.ty && !(Type::unifies(parameter.ty, access.ty) && Type::unifies(access.ty, parameter.ty)) {
        return Err(CompileError::at(access.position, CEK::TypeMismatch { expected: parameter.ty, found: access.ty }));
    }
    Ok(Expression::VariableAddress(access))
}

/// Creates a function call expression.
pub fn function_call(program: &Program, from: RoutineId, target: CallTarget, arguments: Vec<Expression>, position: Position) -> CompileResult<Expression> {
    let ty = match target {
        CallTarget::Builtin(builtin) => builtin.result.ok_or_else(|| CompileError::at(position, CEK::NotAFunction(builtin.name.to_string())))?,
        CallTarget::Subroutine(id) => {
            let routine = program.routine(id).ok_or_else(|| CompileError::at(position, CEK::Unresolved(format!("routine {}", id.into_usize()))))?;
            match (routine.kind, routine.return_type) {
                (RoutineKind::Function, Some(ty)) => ty,
                _ => return Err(CompileError::at(position, CEK::NotAFunction(routine.name.clone()))),
            }
        }
    };
    Ok(Expression::FunctionCall(FunctionCall { call: call(program, from, target, arguments, position)?, ty }))
}

/// Creates a procedure call statement.
pub fn procedure_call(program: &Program, from: RoutineId, target: CallTarget, arguments: Vec<Expression>, position: Position) -> CompileResult<Statement> {
    match target {
        CallTarget::Builtin(builtin) if builtin.is_function() => return Err(CompileError::at(position, CEK::NotAProcedure(builtin.name.to_string()))),
        CallTarget::Subroutine(id) => {
            let routine = program.routine(id).ok_or_else(|| CompileError::at(position, CEK::Unresolved(format!("routine {}", id.into_usize()))))?;
            if routine.kind != RoutineKind::Procedure {
                return Err(CompileError::at(position, CEK::NotAProcedure(routine.name.clone())));
            }
        }
        _ => { }
    }
    Ok(Statement::ProcedureCall(call(program, from, target, arguments, position)?))
}

/// Creates an assignment to a variable, array element or string character.
pub fn assignment(program: &Program, from: RoutineId, variable: VariableRef, indexes: Vec<Expression>, value: Expression, position: Position) -> CompileResult<Statement> {
    Ok(Statement::VariableAssignment(assign(program, from, variable, indexes, value, position)?))
}

fn assign(program: &Program, from: RoutineId, variable: VariableRef, indexes: Vec<Expression>, value: Expression, position: Position) -> CompileResult<VariableAssignment> {
    let target = access(program, from, variable, indexes, position)?;
    let var = accessible(program, from, variable, position)?;
    if var.is_array() && target.indexes.is_empty() {
        return Err(CompileError::at(position, CEK::UnindexedArray(var.name.clone())));
    }
    let value = coerce(target.ty, value)?;
    Ok(VariableAssignment { position, target, value })
}

/// Creates an if statement. An empty else branch means there is none.
pub fn if_statement(condition: Expression, then_branch: Vec<Statement>, else_branch: Vec<Statement>, position: Position) -> CompileResult<Statement> {
    Ok(Statement::If(IfStatement { position, condition: self::condition(condition)?, then_branch, else_branch }))
}

/// Creates a while loop.
pub fn while_statement(condition: Expression, body: Vec<Statement>, position: Position) -> CompileResult<Statement> {
    Ok(Statement::While(WhileStatement { position, condition: self::condition(condition)?, body }))
}

/// Creates a loop running `body` until `condition` holds.
pub fn repeat_statement(body: Vec<Statement>, condition: Expression, position: Position) -> CompileResult<Statement> {
    Ok(Statement::Repeat(RepeatStatement { position, body, condition: self::condition(condition)? }))
}

/// Creates a counting loop from `start` to `end` (inclusive). `step` must evaluate to the constant 1 or -1.
pub fn for_statement(program: &Program, from: RoutineId, variable: VariableRef, start: Expression, end: Expression, step: &Expression, body: Vec<Statement>, position: Position) -> CompileResult<Statement> {
    let var = accessible(program, from, variable, position)?;
    if !Type::unifies(Type::integer, var.ty) || var.is_array() {
        return Err(CompileError::at(position, CEK::TypeMismatch { expected: Type::integer, found: var.ty }));
    }
    let step = match constant::evaluate(step) {
        Ok(LiteralValue::Integer(step @ (1 | -1))) => step,
        _ => return Err(CompileError::new(step, CEK::InvalidLoopStep)),
    };
    let (compare, change) = if step > 0 { (Operator::Lseq, Operator::Plus) } else { (Operator::Mreq, Operator::Subt) };
    let initialisation = assign(program, from, variable, Vec::new(), start, position)?;
    let counter = || variable_value(program, from, variable, Vec::new(), position);
    let condition = binary(compare, counter()?, end, position)?;
    let next = binary(change, counter()?, Expression::literal(LiteralValue::Integer(1), position), position)?;
    let change = assign(program, from, variable, Vec::new(), next, position)?;
    Ok(Statement::For(ForStatement { position, initialisation, condition, change, body }))
}

/// Creates a return statement for the subroutine `from`. Functions must return a value, procedures must not.
pub fn return_statement(program: &Program, from: RoutineId, value: Option<Expression>, position: Position) -> CompileResult<Statement> {
    let routine = program.routine(from).ok_or_else(|| CompileError::at(position, CEK::Unresolved(format!("routine {}", from.into_usize()))))?;
    let value = match (routine.kind, routine.return_type, value) {
        (RoutineKind::Program, _, _) => return Err(CompileError::at(position, CEK::ReturnOutsideFunction)),
        (RoutineKind::Function, Some(ty), Some(value)) => Some(coerce(ty, value)?),
        (RoutineKind::Procedure, None, None) => None,
        _ => return Err(CompileError::at(position, CEK::InvalidReturn(routine.name.clone()))),
    };
    Ok(Statement::Return(ReturnStatement { position, routine: from, value }))
}

/// Validates a finished program tree before code generation.
pub fn check_program(program: &Program) -> CompileResult {
    let count = program.routine_count();
    for (id, routine) in program.routines() {
        if let Some(parent) = routine.parent {
            if parent.into_usize() >= count {
                return Err(CompileError::at(Position(0), CEK::Unresolved(format!("parent of routine '{}'", routine.name))));
            }
        }
        if let Some(&sub) = routine.subroutines.iter().find(|sub| sub.into_usize() >= count) {
            return Err(CompileError::at(Position(0), CEK::Unresolved(format!("routine {}", sub.into_usize()))));
        }
        match (routine.kind, routine.return_type) {
            (RoutineKind::Function, Some(_)) | (RoutineKind::Procedure, None) | (RoutineKind::Program, None) => { },
            _ => return Err(CompileError::ice(format!("Routine '{}' has an invalid return type", routine.name))),
        }
        if id != Program::ID && routine.kind == RoutineKind::Program {
            return Err(CompileError::ice(format!("Subroutine '{}' declared as program", routine.name)));
        }
        for (_, parameter) in routine.parameters() {
            if parameter.is_array() && !parameter.is_reference_parameter {
                return Err(CompileError::at(Position(0), CEK::ArrayValueParameter(parameter.name.clone())));
            }
        }
        let checker = Checker { program, routine: id };
        for statement in &routine.statements {
            checker.statement(statement)?;
        }
    }
    Ok(())
}

/// Validation pass over the statements of one routine.
struct Checker<'a> {
    program : &'a Program,
    routine : RoutineId,
}

impl<'a> Checker<'a> {

    fn statements(self: &Self, statements: &[Statement]) -> CompileResult {
        statements.iter().try_for_each(|statement| self.statement(statement))
    }

    fn statement(self: &Self, statement: &Statement) -> CompileResult {
        match statement {
            Statement::VariableAssignment(assignment) => self.assignment(assignment),
            Statement::ProcedureCall(call) => {
                if let CallTarget::Subroutine(id) = call.target {
                    let routine = self.program.routine(id).ok_or_else(|| CompileError::at(call.position, CEK::Unresolved(format!("routine {}", id.into_usize()))))?;
                    if routine.kind != RoutineKind::Procedure {
                        return Err(CompileError::at(call.position, CEK::NotAProcedure(routine.name.clone())));
                    }
                }
                self.call(call)
            }
            Statement::If(s) => {
                self.condition(&s.condition)?;
                self.statements(&s.then_branch)?;
                self.statements(&s.else_branch)
            }
            Statement::For(s) => {
                self.assignment(&s.initialisation)?;
                self.condition(&s.condition)?;
                self.assignment(&s.change)?;
                self.statements(&s.body)
            }
            Statement::Repeat(s) => {
                self.statements(&s.body)?;
                self.condition(&s.condition)
            }
            Statement::While(s) => {
                self.condition(&s.condition)?;
                self.statements(&s.body)
            }
            Statement::Return(s) => {
                if s.routine != self.routine {
                    return Err(CompileError::ice(format!("Return statement of routine {} placed in routine {}", s.routine.into_usize(), self.routine.into_usize())));
                }
                let routine = self.program.routine(self.routine).ok_or_else(|| CompileError::ice("Missing routine".to_string()))?;
                match (routine.kind, routine.return_type, &s.value) {
                    (RoutineKind::Program, _, _) => Err(CompileError::at(s.position, CEK::ReturnOutsideFunction)),
                    (RoutineKind::Function, Some(ty), Some(value)) => {
                        self.expression(value)?;
                        self.expect(ty, value)
                    }
                    (RoutineKind::Procedure, None, None) => Ok(()),
                    _ => Err(CompileError::at(s.position, CEK::InvalidReturn(routine.name.clone()))),
                }
            }
            Statement::Pass(_) => Ok(()),
        }
    }

    fn assignment(self: &Self, assignment: &VariableAssignment) -> CompileResult {
        let var = self.access(&assignment.target)?;
        if var.is_array() && assignment.target.indexes.is_empty() {
            return Err(CompileError::at(assignment.position, CEK::UnindexedArray(var.name.clone())));
        }
        self.expression(&assignment.value)?;
        self.expect(assignment.target.ty, &assignment.value)
    }

    fn condition(self: &Self, condition: &Expression) -> CompileResult {
        self.expression(condition)?;
        self.expect(Type::boolean, condition)
    }

    /// Checks that `expression` has a type usable where `expected` is required without further casts.
    fn expect(self: &Self, expected: Type, expression: &Expression) -> CompileResult {
        let found = expression.ty();
        if Type::unifies(expected, found) {
            Ok(())
        } else {
            Err(CompileError::new(expression, CEK::TypeMismatch { expected, found }))
        }
    }

    fn access(self: &Self, access: &VariableAccess) -> CompileResult<&'a Variable> {
        let var = accessible(self.program, self.routine, access.variable, access.position)?;
        if access.indexes.len() > 1 || (access.indexes.len() == 1 && var.dimensions.len() > 1) {
            return Err(CompileError::at(access.position, CEK::MultiDimensionalIndex(var.name.clone())));
        }
        if access.indexes.len() == 1 && !var.is_array() && var.ty != Type::string {
            return Err(CompileError::at(access.position, CEK::NotIndexable(var.name.clone())));
        }
        for index in &access.indexes {
            self.expression(index)?;
            self.expect(Type::integer, index)?;
        }
        Ok(var)
    }

    fn call(self: &Self, call: &Call) -> CompileResult {
        let (name, parameters) = signature(self.program, call.target, call.position)?;
        if call.arguments.len() != parameters.len() {
            return Err(CompileError::at(call.position, CEK::ArgumentCount { name: name.to_string(), expected: parameters.len(), found: call.arguments.len() }));
        }
        for (argument, parameter) in call.arguments.iter().zip(parameters.iter()) {
            match (parameter.reference, argument) {
                (true, Expression::VariableAddress(access)) => { self.access(access)?; },
                (true, other) => return Err(CompileError::new(other, CEK::ReferenceArgument(parameter.name.to_string()))),
                (false, argument) => {
                    self.expression(argument)?;
                    self.expect(parameter.ty, argument)?;
                }
            }
        }
        Ok(())
    }

    fn expression(self: &Self, expression: &Expression) -> CompileResult {
        match expression {
            Expression::Literal(_) => Ok(()),
            Expression::VariableAddress(access) => self.access(access).map(|_| ()),
            Expression::VariableValue(access) => {
                let var = self.access(access)?;
                if var.is_array() && access.indexes.is_empty() {
                    Err(CompileError::at(access.position, CEK::UnindexedArray(var.name.clone())))
                } else {
                    Ok(())
                }
            }
            Expression::FunctionCall(function) => {
                if let CallTarget::Subroutine(id) = function.call.target {
                    let routine = self.program.routine(id).ok_or_else(|| CompileError::at(function.call.position, CEK::Unresolved(format!("routine {}", id.into_usize()))))?;
                    if routine.kind != RoutineKind::Function {
                        return Err(CompileError::at(function.call.position, CEK::NotAFunction(routine.name.clone())));
                    }
                }
                self.call(&function.call)
            }
            Expression::Compound(compound) => {
                if let Some(left) = &compound.left {
                    self.expression(left)?;
                }
                self.expression(&compound.right)?;
                let left = compound.left.as_ref().map(|left| left.ty());
                if compound_type(compound.operator, left, compound.right.ty()) != Some(compound.ty) {
                    return Err(CompileError::ice(format!("Operator {:?} on {:?} and {:?} typed as {:?}", compound.operator, left, compound.right.ty(), compound.ty)));
                }
                Ok(())
            }
            Expression::Cast(cast) => {
                self.expression(&cast.expression)?;
                let found = cast.expression.ty();
                match (found, cast.ty) {
                    (Type::character, Type::string) | (Type::string, Type::character) => Ok(()),
                    (found, ty) if Type::unifies(ty, found) => Ok(()),
                    (found, ty) => Err(CompileError::ice(format!("Invalid cast from {:?} to {:?}", found, ty))),
                }
            }
        }
    }
}

/// Result type of an operator applied to operands of the given (already coerced) types, if valid.
fn compound_type(operator: Operator, left: Option<Type>, right: Type) -> Option<Type> {
    use Type::*;
    use Operator::*;
    let left = match (left, operator.is_unary()) {
        (None, true) => return match operator {
            Neg if Type::unifies(integer, right) => Some(integer),
            Not if matches!(right, boolean | integer | boolint) => Some(right),
            _ => None,
        },
        (Some(left), false) => left,
        _ => return None,
    };
    match operator {
        Scat if left == string && right == string => Some(string),
        _ if operator.is_string() => if left == string && right == string { Some(boolean) } else { None },
        Eqal | Noeq if left != string && Type::unifies(left, right) => Some(boolean),
        Less | More | Lseq | Mreq if left == character && right == character => Some(boolean),
        Less | More | Lseq | Mreq if Type::unifies(integer, left) && Type::unifies(integer, right) => Some(boolean),
        And | Or | Xor => [ boolean, integer, boolint ].into_iter().find(|&ty| ty == left || ty == right).or(Some(boolint))
            .filter(|&ty| Type::unifies(ty, left) && Type::unifies(ty, right)),
        Plus | Subt | Mult | Div | Divr | Mod if Type::unifies(integer, left) && Type::unifies(integer, right) => Some(integer),
        _ => None,
    }
}
