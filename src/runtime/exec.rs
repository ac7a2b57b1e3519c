//! Instruction fetch, decode and the opcode implementations not covered by the specialised modules.

use crate::config::{Value, LineIndex, TRUE, FALSE, ARRAY_HEADER};
use crate::bytecode::OpCode;
use crate::runtime::{Machine, Host, Message, RuntimeErrorKind as RK, error::OpResult};
use crate::runtime::machine::{MachineState, WaitKind, Canvas};

/// Maximum depth of the return address stack.
const RETURN_STACK_MAX: usize = 10_000;

/// Maximum number of inline operands of any instruction except `lstr`.
const OPERANDS_MAX: usize = 1;

fn boolean(value: bool) -> Value {
    if value { TRUE } else { FALSE }
}

/// Decoded instruction at the program counter.
enum Fetched {
    /// Execution ran past the last line.
    End,
    Instruction { opcode: OpCode, operand: Value, text: Vec<Value> },
}

impl<H> Machine<H> where H: Host {

    /// Decodes the instruction at the program counter and advances it past the instruction.
    fn fetch(self: &mut Self) -> OpResult<Fetched> {
        loop {
            let (line, position) = self.pc;
            let code = match self.code.line(line) {
                Some(code) => code.values(),
                None => return Ok(Fetched::End),
            };
            if position >= code.len() {
                self.pc = (line + 1, 0);
                continue;
            }
            let value = code[position];
            let opcode = OpCode::from_value(value).ok_or(RK::InvalidOpCode(value))?;
            let count = opcode.operand_count(code, position);
            if position + 1 + count > code.len() {
                return Err(RK::InvalidOpCode(value));
            }
            let operands = &code[position + 1 .. position + 1 + count];
            let fetched = match opcode {
                OpCode::lstr => Fetched::Instruction { opcode, operand: operands[0], text: operands[1..].to_vec() },
                _ => {
                    debug_assert!(count <= OPERANDS_MAX);
                    Fetched::Instruction { opcode, operand: operands.first().copied().unwrap_or(0), text: Vec::new() }
                }
            };
            self.pc = (line, position + 1 + count);
            return Ok(fetched);
        }
    }

    /// Fetches and executes one instruction.
    pub(crate) fn exec_step(self: &mut Self) -> OpResult {
        let start = self.pc;
        let (opcode, operand, text) = match self.fetch()? {
            Fetched::End => {
                self.halt();
                return Ok(());
            }
            Fetched::Instruction { opcode, operand, text } => (opcode, operand, text),
        };
        match opcode as Value & 0xF0 {
            0x50 | 0x60 => self.exec_turtle(opcode),
            0x40 => self.exec_math(opcode),
            0x20 if opcode as Value >= OpCode::scat as Value => self.exec_string(opcode),
            0x30 if opcode != OpCode::lstr => self.exec_string(opcode),
            0x00 if opcode as Value >= OpCode::hstr as Value => self.exec_string(opcode),
            0xC0 => Err(RK::NotImplemented),
            _ => self.exec_core(opcode, operand, &text, start),
        }
    }

    /// Executes stack, integer, memory, flow control, runtime, input and output instructions.
    fn exec_core(self: &mut Self, opcode: OpCode, operand: Value, characters: &[Value], start: (LineIndex, usize)) -> OpResult {
        use OpCode::*;
        match opcode {
            // stack operations

            null => { }
            dupl => {
                let [ a ] = self.peek_n()?;
                self.push(a)?;
            }
            swap => {
                let [ a, b ] = self.pop_n()?;
                self.push(b)?;
                self.push(a)?;
            }
            rota => {
                let [ a, b, c ] = self.pop_n()?;
                self.push(b)?;
                self.push(c)?;
                self.push(a)?;
            }
            incr | decr | not | neg | abs | sign => {
                let a = self.pop()?;
                self.push(match opcode {
                    incr => a.wrapping_add(1),
                    decr => a.wrapping_sub(1),
                    not => !a,
                    neg => a.wrapping_neg(),
                    abs => a.wrapping_abs(),
                    _ => a.signum(),
                })?;
            }
            mxin => self.push(Value::MAX)?,
            rand => {
                let range = self.pop()?;
                let value = self.random.next(range);
                self.push(value)?;
            }

            // integer operators

            and | or | xor | eqal | noeq | less | more | lseq | mreq | maxi | mini | plus | subt | mult => {
                let [ a, b ] = self.pop_n()?;
                self.push(match opcode {
                    and => a & b,
                    or => a | b,
                    xor => a ^ b,
                    eqal => boolean(a == b),
                    noeq => boolean(a != b),
                    less => boolean(a < b),
                    more => boolean(a > b),
                    lseq => boolean(a <= b),
                    mreq => boolean(a >= b),
                    maxi => a.max(b),
                    mini => a.min(b),
                    plus => a.wrapping_add(b),
                    subt => a.wrapping_sub(b),
                    _ => a.wrapping_mul(b),
                })?;
            }
            div | modu | divr => {
                let [ a, b ] = self.pop_n()?;
                if b == 0 {
                    return Err(RK::DivisionByZero);
                }
                self.push(match opcode {
                    div => a.wrapping_div(b),
                    modu => a.wrapping_rem(b),
                    _ => crate::runtime::math::round(a as f64 / b as f64)?,
                })?;
            }

            // memory

            lstr => self.push_string(characters)?,
            ldin => self.push(operand)?,
            ldvt => {
                let value = self.load_turtle(operand)?;
                self.push(value)?;
            }
            ldvg => {
                let value = self.memory.load(operand)?;
                self.push(value)?;
            }
            ldvv => {
                let value = self.memory.load(self.memory.local(operand))?;
                self.push(value)?;
            }
            ldvr => {
                let address = self.memory.load(self.memory.local(operand))?;
                let value = self.memory.load(address)?;
                self.push(value)?;
            }
            ldav => {
                let address = self.memory.local(operand);
                self.push(address)?;
            }
            lptr => {
                let address = self.pop()?;
                let value = self.memory.load(address)?;
                self.push(value)?;
            }
            stvt => {
                let value = self.pop()?;
                self.store_turtle(operand, value)?;
            }
            stvg => {
                let value = self.pop()?;
                self.memory.store(operand, value)?;
            }
            stvv => {
                let value = self.pop()?;
                self.memory.store(self.memory.local(operand), value)?;
            }
            stvr => {
                let value = self.pop()?;
                let address = self.memory.load(self.memory.local(operand))?;
                self.memory.store(address, value)?;
            }
            sptr => {
                let [ address, value ] = self.pop_n()?;
                self.memory.store(address, value)?;
            }
            zptr => {
                let [ address, count ] = self.pop_n()?;
                for offset in 0 .. count.max(0) {
                    self.memory.store(address.wrapping_add(offset), 0)?;
                }
            }
            cptr => {
                let [ source, destination, count ] = self.pop_n()?;
                for offset in 0 .. count.max(0) {
                    let value = self.memory.load(source.wrapping_add(offset))?;
                    self.memory.store(destination.wrapping_add(offset), value)?;
                }
            }
            test => {
                let [ base, index ] = self.peek_n()?;
                let count = self.memory.load(base)?;
                let first = self.memory.load(base.wrapping_add(1))?;
                if index < first || index.wrapping_sub(first) >= count {
                    return Err(RK::IndexOutOfRange);
                }
            }
            elem => {
                let [ base, index ] = self.pop_n()?;
                let first = self.memory.load(base.wrapping_add(1))?;
                let offset = index.wrapping_sub(first).wrapping_mul(operand);
                self.push(base.wrapping_add(ARRAY_HEADER as Value).wrapping_add(offset))?;
            }

            // flow control and heap

            jump => self.jump(operand)?,
            ifno => {
                if self.pop()? == FALSE {
                    self.jump(operand)?;
                }
            }
            halt => self.halt(),
            subr => {
                if self.returns.len() >= RETURN_STACK_MAX {
                    return Err(RK::StackOverflow);
                }
                let resume_at = self.pc;
                self.jump(operand)?;
                self.returns.push(resume_at);
            }
            retn => {
                let resume_at = self.returns.pop().ok_or(RK::StackUnderflow)?;
                self.pc = resume_at;
            }
            pssr => self.memory.heap_enter(),
            plsr => { }
            memc => self.memory.claim(operand)?,
            memr => self.memory.release()?,
            glob => {
                let length = usize::try_from(operand).map_err(|_| RK::InvalidAddress(operand))?;
                self.memory.globals(length)?;
            }
            hclr => self.memory.heap_clear(),
            hrst => self.memory.heap_reset(),
            hfix => self.memory.heap_fix(),

            // runtime

            canv => {
                let [ x, y, width, height ] = self.pop_n()?;
                self.canvas = Canvas { x, y, width, height };
                self.host.send(Message::Canvas { x, y, width, height });
            }
            reso => {
                let [ width, height ] = self.pop_n()?;
                let small = self.options.small_size as Value;
                let doubled = width <= small && height <= small;
                self.host.send(Message::Resolution { width, height, doubled });
            }
            udat => {
                let update = self.pop()? != FALSE;
                self.update = update;
                self.host.send(Message::Update(update));
            }
            seed => {
                let reseed = self.pop()?;
                let previous = self.random.reseed(reseed as u32);
                self.push(previous as Value)?;
            }
            dump => self.dump(),
            curs => {
                let cursor = self.pop()?;
                self.host.send(Message::Cursor(cursor));
            }

            // keyboard, pointer and timing

            bufr => {
                let capacity = self.pop()?;
                self.input.create_buffer(capacity);
            }
            kbln => {
                let length = self.input.buffered() as Value;
                self.push(length)?;
            }
            read => {
                let count = self.pop()?;
                let taken = self.input.take(count.max(0) as usize);
                self.push_string(&taken)?;
            }
            rdln => {
                match self.input.take_line() {
                    Some(line) => {
                        if self.input.echo {
                            self.host.send(Message::Console("\n".to_string()));
                        }
                        self.push_string(&line)?;
                    }
                    None => self.suspend(WaitKind::ReadLine, start, None),
                }
            }
            kech => {
                let echo = self.pop()? != FALSE;
                self.input.echo = echo;
            }
            ikey => {
                let code = self.pop()?;
                let down = self.input.is_down(code);
                self.push(boolean(down))?;
            }
            lkey => {
                let code = self.input.last_key();
                self.push(code)?;
            }
            rset => {
                let code = self.pop()?;
                self.input.reset(code);
            }
            dtct => {
                let [ key, delay ] = self.pop_n()?;
                if self.input.is_down(key) {
                    self.push(TRUE)?;
                } else {
                    let resume_at = self.pc;
                    self.suspend(WaitKind::Detect { key }, resume_at, Some(delay.max(0) as u64));
                }
            }
            mosx | mosy | clik => {
                let (x, y, click) = self.input.pointer();
                self.push(match opcode { mosx => x, mosy => y, _ => click })?;
            }
            wait => {
                let delay = self.pop()?;
                let resume_at = self.pc;
                self.suspend(WaitKind::Delay, resume_at, Some(delay.max(0) as u64));
            }
            time => {
                let elapsed = self.host.now().saturating_sub(self.time_origin);
                self.push(elapsed as Value)?;
            }
            tset => {
                let elapsed = self.pop()?;
                self.time_origin = self.host.now().saturating_sub(elapsed.max(0) as u64);
            }

            // console and output

            prnt | cons => {
                let pointer = self.pop()?;
                let string = self.memory.text(pointer)?;
                self.host.send(if opcode == prnt { Message::Output(string) } else { Message::Console(string) });
            }
            newl => self.host.send(Message::Output("\n".to_string())),
            conl => self.host.send(Message::Console("\n".to_string())),
            ocls => self.host.send(Message::OutputClear),
            ccls => self.host.send(Message::ConsoleClear),
            ocol => {
                let colour = self.pop()?;
                self.host.send(Message::OutputColour(colour));
            }
            font => {
                let [ family, size ] = self.pop_n()?;
                self.font = (family, size);
            }
            _ => return Err(RK::InvalidOpCode(opcode as Value)),
        }
        if self.state == MachineState::Stopped {
            ::log::trace!("halted by {}", opcode.mnemonic());
        }
        Ok(())
    }
}
