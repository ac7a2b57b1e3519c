//! Pseudo-real math. Every operator takes explicit scale factors and rounds its result back to an integer.

use std::f64::consts::PI;
use crate::config::Value;
use crate::bytecode::OpCode;
use crate::runtime::{Machine, Host, RuntimeErrorKind as RK, error::OpResult};

/// Rounds half up to an integer. Fails if the value is not finite or out of range.
pub(crate) fn round(value: f64) -> OpResult<Value> {
    let rounded = (value + 0.5).floor();
    if rounded.is_finite() && rounded >= Value::MIN as f64 && rounded <= Value::MAX as f64 {
        Ok(rounded as Value)
    } else {
        Err(RK::InvalidResult)
    }
}

/// Divides `a` by `b` as reals.
fn quotient(a: Value, b: Value) -> OpResult<f64> {
    if b == 0 {
        Err(RK::DivisionByZero)
    } else {
        Ok(a as f64 / b as f64)
    }
}

impl<H> Machine<H> where H: Host {

    /// Executes a pseudo-real math instruction.
    pub(crate) fn exec_math(self: &mut Self, opcode: OpCode) -> OpResult {
        use OpCode::*;
        let result = match opcode {
            root | powr => {
                let [ a, b, c, m ] = self.pop_n()?;
                let base = quotient(a, b)?;
                let exponent = match opcode {
                    root if c == 0 => return Err(RK::DivisionByZero),
                    root => 1.0 / c as f64,
                    _ => c as f64,
                };
                base.powf(exponent) * m as f64
            }
            atan => {
                let [ a, b, m ] = self.pop_n()?;
                self.to_angle_units((a as f64).atan2(b as f64)) * m as f64
            }
            pi => {
                let m = self.pop()?;
                PI * m as f64
            }
            hyp => {
                let [ a, b, m ] = self.pop_n()?;
                (a as f64).hypot(b as f64) * m as f64
            }
            _ => {
                let [ a, b, m ] = self.pop_n()?;
                let x = quotient(a, b)?;
                let value = match opcode {
                    divm => x,
                    sqrt => x.sqrt(),
                    log => x.log10(),
                    alog => 10f64.powf(x),
                    ln => x.ln(),
                    exp => x.exp(),
                    sin => self.from_angle_units(x).sin(),
                    cos => self.from_angle_units(x).cos(),
                    tan => self.from_angle_units(x).tan(),
                    asin => self.to_angle_units(x.asin()),
                    acos => self.to_angle_units(x.acos()),
                    _ => return Err(RK::InvalidOpCode(opcode as Value)),
                };
                value * m as f64
            }
        };
        self.push(round(result)?)
    }
}
