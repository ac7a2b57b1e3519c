//! Compile time evaluation of constant expressions.

use crate::config::{Value, TRUE, FALSE};
use crate::tree::{Expression, LiteralValue, Operator};
use crate::shared::types::Type;
use crate::compiler::error::{CompileError, CompileErrorKind as CEK, CompileResult};

/// Evaluates an expression consisting only of literals, operators and casts.
///
/// Integer arithmetic wraps like the virtual machine's. Booleans take part in bitwise operators as -1/0.
pub fn evaluate(expression: &Expression) -> CompileResult<LiteralValue> {
    match expression {
        Expression::Literal(literal) => Ok(literal.value.clone()),
        Expression::VariableValue(_) | Expression::VariableAddress(_) => Err(CompileError::new(expression, CEK::NonConstant("a variable reference".to_string()))),
        Expression::FunctionCall(_) => Err(CompileError::new(expression, CEK::NonConstant("a function call".to_string()))),
        Expression::Cast(cast) => {
            let value = evaluate(&cast.expression)?;
            match (cast.ty, value) {
                (Type::string, LiteralValue::Character(c)) => Ok(LiteralValue::String(c.to_string())),
                (Type::character, LiteralValue::String(s)) => Ok(LiteralValue::Character(s.chars().next().unwrap_or('\0'))),
                (_, value) => Ok(value),
            }
        }
        Expression::Compound(compound) => {
            let right = evaluate(&compound.right)?;
            let left = match &compound.left {
                Some(left) => Some(evaluate(left)?),
                None => None,
            };
            apply(compound.operator, left, right, compound.ty).map_err(|message| CompileError::new(expression, CEK::InvalidConstant(message)))
        }
    }
}

/// Numeric value of an integer, boolean or character literal.
fn numeric(value: &LiteralValue) -> Option<Value> {
    match value {
        LiteralValue::Integer(v) => Some(*v),
        LiteralValue::Boolean(b) => Some(if *b { TRUE } else { FALSE }),
        LiteralValue::Character(c) => Some(*c as Value),
        LiteralValue::String(_) => None,
    }
}

fn text(value: &LiteralValue) -> Option<String> {
    match value {
        LiteralValue::String(s) => Some(s.clone()),
        LiteralValue::Character(c) => Some(c.to_string()),
        _ => None,
    }
}

/// Converts a numeric result back to a literal of the expression's type.
fn typed(ty: Type, value: Value) -> LiteralValue {
    match ty {
        Type::boolean => LiteralValue::Boolean(value != 0),
        Type::character => LiteralValue::Character(char::from_u32(value as u32).unwrap_or('\0')),
        _ => LiteralValue::Integer(value),
    }
}

fn apply(operator: Operator, left: Option<LiteralValue>, right: LiteralValue, ty: Type) -> Result<LiteralValue, String> {
    use Operator::*;
    if operator.is_string() {
        let (a, b) = match (left.as_ref().and_then(text), text(&right)) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(format!("invalid operands for '{}'", operator)),
        };
        return Ok(match operator {
            Scat => LiteralValue::String(a + &b),
            Seql => LiteralValue::Boolean(a == b),
            Sneq => LiteralValue::Boolean(a != b),
            Sles => LiteralValue::Boolean(a < b),
            Smor => LiteralValue::Boolean(a > b),
            Slse => LiteralValue::Boolean(a <= b),
            _ => LiteralValue::Boolean(a >= b),
        });
    }
    let b = numeric(&right).ok_or_else(|| format!("invalid operand for '{}'", operator))?;
    if operator.is_unary() {
        return Ok(typed(ty, if operator == Neg { b.wrapping_neg() } else { !b }));
    }
    let a = left.as_ref().and_then(numeric).ok_or_else(|| format!("invalid operand for '{}'", operator))?;
    let result = match operator {
        Eqal => return Ok(LiteralValue::Boolean(a == b)),
        Noeq => return Ok(LiteralValue::Boolean(a != b)),
        Less => return Ok(LiteralValue::Boolean(a < b)),
        More => return Ok(LiteralValue::Boolean(a > b)),
        Lseq => return Ok(LiteralValue::Boolean(a <= b)),
        Mreq => return Ok(LiteralValue::Boolean(a >= b)),
        Plus => a.wrapping_add(b),
        Subt => a.wrapping_sub(b),
        Mult => a.wrapping_mul(b),
        Or   => a | b,
        Xor  => a ^ b,
        And  => a & b,
        Div | Divr | Mod if b == 0 => return Err("division by zero".to_string()),
        Div  => a.wrapping_div(b),
        Mod  => a.wrapping_rem(b),
        Divr => (a as f64 / b as f64 + 0.5).floor() as Value,
        _ => return Err(format!("invalid operator '{}'", operator)),
    };
    Ok(typed(ty, result))
}
