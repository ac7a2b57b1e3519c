use crate::prelude::*;
use crate::config::Value;
use crate::shared::{types::Type, typed_ids::{RoutineId, VariableRef}};
use crate::bytecode::OpCode;
use crate::tree::{Position, Positioned, Builtin};

/// A literal value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralValue {
    Boolean(bool),
    Integer(Value),
    Character(char),
    String(String),
}

impl LiteralValue {
    /// Type of the literal.
    pub fn ty(self: &Self) -> Type {
        match self {
            LiteralValue::Boolean(_)    => Type::boolean,
            LiteralValue::Integer(_)    => Type::integer,
            LiteralValue::Character(_)  => Type::character,
            LiteralValue::String(_)     => Type::string,
        }
    }
    /// Returns the single character of a one-character string literal.
    pub fn as_single_char(self: &Self) -> Option<char> {
        match self {
            LiteralValue::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl Display for LiteralValue {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Boolean(v)    => write!(f, "{}", v),
            LiteralValue::Integer(v)    => write!(f, "{}", v),
            LiteralValue::Character(v)  => write!(f, "{:?}", v),
            LiteralValue::String(v)     => write!(f, "{:?}", v),
        }
    }
}

/// A literal expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    pub position: Position,
    pub value   : LiteralValue,
}

/// Access to a variable, optionally indexed (array element or string character).
#[derive(Clone, Debug, PartialEq)]
pub struct VariableAccess {
    pub position: Position,
    pub variable: VariableRef,
    /// Type of the accessed value (element type for indexed access).
    pub ty      : Type,
    pub indexes : Vec<Expression>,
}

/// Target of a call.
#[derive(Copy, Clone, Debug)]
pub enum CallTarget {
    Builtin(&'static Builtin),
    Subroutine(RoutineId),
}

impl PartialEq for CallTarget {
    fn eq(self: &Self, other: &Self) -> bool {
        match (self, other) {
            (CallTarget::Builtin(a), CallTarget::Builtin(b)) => a.name == b.name,
            (CallTarget::Subroutine(a), CallTarget::Subroutine(b)) => a == b,
            _ => false,
        }
    }
}

/// A call with positional arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub position    : Position,
    pub target      : CallTarget,
    pub arguments   : Vec<Expression>,
}

/// A call to a function in expression position.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    pub call: Call,
    pub ty  : Type,
}

/// A binary or unary operation.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundExpression {
    pub position: Position,
    pub operator: Operator,
    /// Left operand, None for unary operators.
    pub left    : Option<Box<Expression>>,
    pub right   : Box<Expression>,
    pub ty      : Type,
}

/// An explicit type change, inserted by the type checker.
#[derive(Clone, Debug, PartialEq)]
pub struct CastExpression {
    pub position    : Position,
    pub ty          : Type,
    pub expression  : Box<Expression>,
}

/// A typed expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Literal),
    VariableAddress(VariableAccess),
    VariableValue(VariableAccess),
    FunctionCall(FunctionCall),
    Compound(CompoundExpression),
    Cast(CastExpression),
}

impl Expression {
    /// Creates a literal expression.
    pub fn literal(value: LiteralValue, position: Position) -> Self {
        Expression::Literal(Literal { position, value })
    }
    /// Type of the expression.
    pub fn ty(self: &Self) -> Type {
        match self {
            Expression::Literal(l)          => l.value.ty(),
            Expression::VariableAddress(_)  => Type::integer,
            Expression::VariableValue(v)    => v.ty,
            Expression::FunctionCall(f)     => f.ty,
            Expression::Compound(c)         => c.ty,
            Expression::Cast(c)             => c.ty,
        }
    }
    /// Returns the literal value if the expression is a literal.
    pub fn as_literal(self: &Self) -> Option<&LiteralValue> {
        match self {
            Expression::Literal(l) => Some(&l.value),
            _ => None,
        }
    }
}

impl Positioned for Expression {
    fn position(self: &Self) -> Position {
        match self {
            Expression::Literal(l)          => l.position,
            Expression::VariableAddress(v)  => v.position,
            Expression::VariableValue(v)    => v.position,
            Expression::FunctionCall(f)     => f.call.position,
            Expression::Compound(c)         => c.position,
            Expression::Cast(c)             => c.position,
        }
    }
}

/// Operators of compound expressions. Each maps to exactly one opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Eqal, Noeq, Less, More, Lseq, Mreq,
    Plus, Subt, Or, Xor,
    And, Div, Divr, Mod, Mult,
    Neg, Not,
    Seql, Sneq, Sles, Smor, Slse, Smre, Scat,
}

impl Operator {
    /// The instruction implementing the operator.
    pub fn opcode(self: Self) -> OpCode {
        use Operator::*;
        match self {
            Eqal => OpCode::eqal, Noeq => OpCode::noeq, Less => OpCode::less, More => OpCode::more,
            Lseq => OpCode::lseq, Mreq => OpCode::mreq, Plus => OpCode::plus, Subt => OpCode::subt,
            Or   => OpCode::or,   Xor  => OpCode::xor,  And  => OpCode::and,  Div  => OpCode::div,
            Divr => OpCode::divr, Mod  => OpCode::modu, Mult => OpCode::mult, Neg  => OpCode::neg,
            Not  => OpCode::not,  Seql => OpCode::seql, Sneq => OpCode::sneq, Sles => OpCode::sles,
            Smor => OpCode::smor, Slse => OpCode::slse, Smre => OpCode::smre, Scat => OpCode::scat,
        }
    }
    /// The string comparison or concatenation replacing this operator when an operand is a string.
    pub fn string_counterpart(self: Self) -> Option<Operator> {
        use Operator::*;
        match self {
            Eqal => Some(Seql), Noeq => Some(Sneq), Less => Some(Sles), More => Some(Smor),
            Lseq => Some(Slse), Mreq => Some(Smre), Plus => Some(Scat),
            Seql | Sneq | Sles | Smor | Slse | Smre | Scat => Some(self),
            _ => None,
        }
    }
    /// Whether the operator only takes one operand.
    pub fn is_unary(self: Self) -> bool {
        matches!(self, Operator::Neg | Operator::Not)
    }
    /// Whether the operator compares its operands and yields a boolean.
    pub fn is_comparison(self: Self) -> bool {
        use Operator::*;
        matches!(self, Eqal | Noeq | Less | More | Lseq | Mreq | Seql | Sneq | Sles | Smor | Slse | Smre)
    }
    /// Whether the operator works bitwise on booleans or integers.
    pub fn is_logical(self: Self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Xor | Operator::Not)
    }
    /// Whether the operator operates on strings.
    pub fn is_string(self: Self) -> bool {
        use Operator::*;
        matches!(self, Seql | Sneq | Sles | Smor | Slse | Smre | Scat)
    }
    /// Binding strength of binary operators: comparison 0, additive 1, multiplicative 2. Unary operators bind strongest.
    pub fn precedence(self: Self) -> u8 {
        use Operator::*;
        match self {
            Eqal | Noeq | Less | More | Lseq | Mreq | Seql | Sneq | Sles | Smor | Slse | Smre => 0,
            Plus | Subt | Or | Xor | Scat => 1,
            And | Div | Divr | Mod | Mult => 2,
            Neg | Not => 3,
        }
    }
    /// Operator symbol in the neutral expression syntax.
    pub fn symbol(self: Self) -> &'static str {
        use Operator::*;
        match self {
            Eqal | Seql => "=", Noeq | Sneq => "<>", Less | Sles => "<", More | Smor => ">",
            Lseq | Slse => "<=", Mreq | Smre => ">=", Plus | Scat => "+", Subt => "-",
            Or => "or", Xor => "xor", And => "and", Div => "div", Divr => "divr", Mod => "mod",
            Mult => "*", Neg => "-", Not => "not",
        }
    }
}

impl Display for Operator {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
