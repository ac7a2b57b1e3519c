//! String instructions. Strings are heap buffers of character codes, positions are 1-based.

use crate::config::{Value, TRUE, FALSE};
use crate::bytecode::OpCode;
use crate::runtime::{Machine, Host, RuntimeErrorKind as RK, error::OpResult};
use crate::runtime::math::round;

fn to_text(codes: &[Value]) -> String {
    codes.iter().map(|&c| char::from_u32(c as u32).unwrap_or('\u{FFFD}')).collect()
}

fn to_codes(text: &str) -> Vec<Value> {
    text.chars().map(|c| c as Value).collect()
}

fn is_space(code: Value) -> bool {
    matches!(code, 9 ..= 13 | 32)
}

fn boolean(value: bool) -> Value {
    if value { TRUE } else { FALSE }
}

/// Converts a 1-based start position and a length to a clamped range.
fn range(length: usize, start: Value, count: Value) -> std::ops::Range<usize> {
    let start = (start.max(1) as usize - 1).min(length);
    let end = start.saturating_add(count.max(0) as usize).min(length);
    start .. end
}

/// Position of the first occurrence of `needle` at or after `from`.
fn find(haystack: &[Value], needle: &[Value], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (from ..= haystack.len() - needle.len()).find(|&i| haystack[i .. i + needle.len()] == *needle)
}

/// Replaces up to `count` occurrences of `search`, all if `count <= 0`.
fn replace(text: &[Value], search: &[Value], replacement: &[Value], count: Value) -> Vec<Value> {
    let mut result = Vec::with_capacity(text.len());
    let mut position = 0;
    let mut replaced = 0;
    while count <= 0 || replaced < count {
        match find(text, search, position) {
            Some(found) => {
                result.extend_from_slice(&text[position .. found]);
                result.extend_from_slice(replacement);
                position = found + search.len();
                replaced += 1;
            }
            None => break,
        }
    }
    result.extend_from_slice(&text[position ..]);
    result
}

/// Pads `text` with repetitions of `padding` to `width` characters, on the left for positive widths.
fn pad(text: &[Value], padding: &[Value], width: Value) -> Vec<Value> {
    let target = width.unsigned_abs() as usize;
    if padding.is_empty() || text.len() >= target {
        return text.to_vec();
    }
    let fill: Vec<Value> = padding.iter().cycle().take(target - text.len()).copied().collect();
    if width > 0 {
        [ fill.as_slice(), text ].concat()
    } else {
        [ text, fill.as_slice() ].concat()
    }
}

/// Parses an integer, accepting `#` or `$` prefixed hexadecimal.
fn parse_integer(text: &str) -> Option<Value> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = match digits.strip_prefix('#').or_else(|| digits.strip_prefix('$')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()? as Value,
        None => digits.parse::<Value>().ok()?,
    };
    Some(if negative { value.wrapping_neg() } else { value })
}

impl<H> Machine<H> where H: Host {

    /// Pops a string pointer and returns a copy of its characters.
    fn pop_string(self: &mut Self) -> OpResult<Vec<Value>> {
        let pointer = self.pop()?;
        Ok(self.memory.string(pointer)?.to_vec())
    }

    /// Allocates a new heap string and pushes its pointer.
    pub(crate) fn push_string(self: &mut Self, text: &[Value]) -> OpResult {
        let pointer = self.memory.make_string(text)?;
        self.push(pointer)
    }

    /// Executes a string or conversion instruction.
    pub(crate) fn exec_string(self: &mut Self, opcode: OpCode) -> OpResult {
        use OpCode::*;
        match opcode {
            hstr => {
                let max = self.pop()?;
                let max = usize::try_from(max).map_err(|_| RK::InvalidResult)?;
                let pointer = self.memory.new_string(max)?;
                self.push(pointer)?;
            }
            ctos => {
                let code = self.pop()?;
                self.push_string(&[ code ])?;
            }
            sasc => {
                let string = self.pop_string()?;
                self.push(string.first().copied().unwrap_or(0))?;
            }
            itos => {
                let value = self.pop()?;
                self.push_string(&to_codes(&value.to_string()))?;
            }
            hexs => {
                let [ value, width ] = self.pop_n()?;
                let width = width.clamp(0, 32) as usize;
                self.push_string(&to_codes(&format!("{:0width$X}", value as u32, width = width)))?;
            }
            sval => {
                let default = self.pop()?;
                let string = self.pop_string()?;
                self.push(parse_integer(&to_text(&string)).unwrap_or(default))?;
            }
            qtos => {
                let [ a, b, decimals ] = self.pop_n()?;
                if b == 0 {
                    return Err(RK::DivisionByZero);
                }
                let decimals = decimals.clamp(0, 16) as usize;
                let rendered = format!("{:.*}", decimals, a as f64 / b as f64);
                self.push_string(&to_codes(&rendered))?;
            }
            qval => {
                let [ multiplier, default ] = self.pop_n()?;
                let string = self.pop_string()?;
                let value = to_text(&string).trim().parse::<f64>().ok()
                    .and_then(|real| round(real * multiplier as f64).ok())
                    .unwrap_or(default);
                self.push(value)?;
            }
            scat => {
                let second = self.pop_string()?;
                let first = self.pop_string()?;
                self.push_string(&[ first, second ].concat())?;
            }
            slen => {
                let string = self.pop_string()?;
                self.push(string.len() as Value)?;
            }
            seql | sneq | sles | smor | slse | smre => {
                let second = self.pop_string()?;
                let first = self.pop_string()?;
                let result = match opcode {
                    seql => first == second,
                    sneq => first != second,
                    sles => first < second,
                    smor => first > second,
                    slse => first <= second,
                    _ => first >= second,
                };
                self.push(boolean(result))?;
            }
            lcas | ucas => {
                let string = to_text(&self.pop_string()?);
                let converted = if opcode == lcas { string.to_lowercase() } else { string.to_uppercase() };
                self.push_string(&to_codes(&converted))?;
            }
            copy | dels => {
                let [ start, count ] = self.pop_n()?;
                let string = self.pop_string()?;
                let range = range(string.len(), start, count);
                let result = if opcode == copy {
                    string[range].to_vec()
                } else {
                    [ &string[.. range.start], &string[range.end ..] ].concat()
                };
                self.push_string(&result)?;
            }
            inss => {
                let position = self.pop()?;
                let insertion = self.pop_string()?;
                let string = self.pop_string()?;
                let at = (position.max(1) as usize - 1).min(string.len());
                self.push_string(&[ &string[.. at], &insertion[..], &string[at ..] ].concat())?;
            }
            poss => {
                let string = self.pop_string()?;
                let search = self.pop_string()?;
                self.push(find(&string, &search, 0).map_or(0, |i| i as Value + 1))?;
            }
            repl => {
                let count = self.pop()?;
                let replacement = self.pop_string()?;
                let search = self.pop_string()?;
                let string = self.pop_string()?;
                self.push_string(&replace(&string, &search, &replacement, count))?;
            }
            spad => {
                let width = self.pop()?;
                let padding = self.pop_string()?;
                let string = self.pop_string()?;
                self.push_string(&pad(&string, &padding, width))?;
            }
            trim => {
                let string = self.pop_string()?;
                let start = string.iter().position(|&c| !is_space(c)).unwrap_or(string.len());
                let end = string.iter().rposition(|&c| !is_space(c)).map_or(start, |i| i + 1);
                self.push_string(&string[start .. end])?;
            }
            tsti => {
                let [ pointer, index ] = self.peek_n()?;
                let length = self.memory.string(pointer)?.len();
                if index < 1 || index as usize > length {
                    return Err(RK::StringIndexOutOfRange);
                }
            }
            cget => {
                let index = self.pop()?;
                let string = self.pop_string()?;
                let code = usize::try_from(index.wrapping_sub(1)).ok().and_then(|i| string.get(i).copied()).ok_or(RK::StringIndexOutOfRange)?;
                self.push(code)?;
            }
            cset => {
                let [ pointer, index, code ] = self.pop_n()?;
                let mut string = self.memory.string(pointer)?.to_vec();
                let cell = usize::try_from(index.wrapping_sub(1)).ok().and_then(|i| string.get_mut(i)).ok_or(RK::StringIndexOutOfRange)?;
                *cell = code;
                self.memory.write_string(pointer, &string)?;
            }
            cstr => {
                let [ source, destination ] = self.pop_n()?;
                self.memory.copy_string(source, destination)?;
            }
            _ => return Err(RK::InvalidOpCode(opcode as Value)),
        }
        Ok(())
    }
}
