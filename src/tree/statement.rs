use crate::shared::typed_ids::RoutineId;
use crate::tree::{Position, Positioned, Expression, VariableAccess, Call};

/// Assignment to a variable, array element or string character.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableAssignment {
    pub position: Position,
    pub target  : VariableAccess,
    pub value   : Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStatement {
    pub position    : Position,
    pub condition   : Expression,
    pub then_branch : Vec<Statement>,
    /// Empty if the statement has no else branch.
    pub else_branch : Vec<Statement>,
}

/// Counting loop, decomposed into primitive parts.
///
/// The body runs while `condition` holds. `change` steps the loop variable by exactly one.
#[derive(Clone, Debug, PartialEq)]
pub struct ForStatement {
    pub position        : Position,
    pub initialisation  : VariableAssignment,
    pub condition       : Expression,
    pub change          : VariableAssignment,
    pub body            : Vec<Statement>,
}

/// Loop running its body until the condition holds.
#[derive(Clone, Debug, PartialEq)]
pub struct RepeatStatement {
    pub position    : Position,
    pub body        : Vec<Statement>,
    pub condition   : Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStatement {
    pub position    : Position,
    pub condition   : Expression,
    pub body        : Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatement {
    pub position: Position,
    /// The routine being returned from.
    pub routine : RoutineId,
    /// The function result.
    pub value   : Option<Expression>,
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    VariableAssignment(VariableAssignment),
    ProcedureCall(Call),
    If(IfStatement),
    For(ForStatement),
    Repeat(RepeatStatement),
    While(WhileStatement),
    Return(ReturnStatement),
    Pass(Position),
}

impl Positioned for Statement {
    fn position(self: &Self) -> Position {
        match self {
            Statement::VariableAssignment(s)    => s.position,
            Statement::ProcedureCall(s)         => s.position,
            Statement::If(s)                    => s.position,
            Statement::For(s)                   => s.position,
            Statement::Repeat(s)                => s.position,
            Statement::While(s)                 => s.position,
            Statement::Return(s)                => s.position,
            Statement::Pass(position)           => *position,
        }
    }
}
