//! The virtual machine: state, scheduling and the host facing interface.

use crate::config::{Value, LineIndex};
use crate::bytecode::{Bytecode, Instruction};
use crate::runtime::{Options, Host, Message, RuntimeError, RuntimeErrorKind as RK, RuntimeResult, error::OpResult};
use crate::runtime::{memory::Memory, input::Input, random::Random, host::{Draw, Point}};

/// What a suspended program is waiting for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaitKind {
    /// `wait`: a timer.
    Delay,
    /// `rdln`: an Enter key press.
    ReadLine,
    /// `dtct`: the given key or a timer, whichever comes first.
    Detect { key: Value },
}

/// Continuation of a suspended program.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Suspension {
    /// Program counter to continue at.
    pub resume_at   : (LineIndex, usize),
    pub wait        : WaitKind,
    /// Ticket of the timer registered for this suspension. Timeouts with other tickets are stale.
    pub ticket      : u64,
}

/// Current state of the machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MachineState {
    /// No program is running. `run` starts a new one.
    Stopped,
    /// A program is running and continues on the next tick.
    Running,
    /// A program is waiting for an event, see `Machine::resume`.
    Suspended(Suspension),
}

/// Inbound events from the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A timer requested via `Message::Timer` has expired.
    Timeout(u64),
    KeyDown(Value),
    KeyUp(Value),
    /// A character was typed.
    KeyChar(Value),
    PointerMove(Value, Value),
    PointerDown(Value),
    PointerUp(Value),
}

/// Canvas geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Canvas {
    pub x       : Value,
    pub y       : Value,
    pub width   : Value,
    pub height  : Value,
}

/// A bytecode virtual machine reporting to a host.
///
/// The machine runs cooperatively: `tick` executes a bounded batch of instructions and returns. Hosts call it
/// repeatedly (e.g. once per animation frame) while the state is `Running`.
#[derive(Debug)]
pub struct Machine<H> {
    pub(crate) host         : H,
    pub(crate) options      : Options,
    pub(crate) code         : Bytecode,
    pub(crate) pc           : (LineIndex, usize),
    pub(crate) state        : MachineState,
    pub(crate) paused       : bool,
    pub(crate) memory       : Memory,
    pub(crate) stack        : Vec<Value>,
    pub(crate) returns      : Vec<(LineIndex, usize)>,
    pub(crate) coords       : Vec<Point>,
    pub(crate) input        : Input,
    pub(crate) random       : Random,
    pub(crate) canvas       : Canvas,
    /// Canvas text font family and size.
    pub(crate) font         : (Value, Value),
    pub(crate) update       : bool,
    pub(crate) ticket       : u64,
    pub(crate) time_origin  : u64,
    pub(crate) draw_count   : usize,
}

/// Public machine methods.
impl<H> Machine<H> where H: Host {

    /// Creates a stopped machine reporting to the given host.
    pub fn new(host: H) -> Self {
        let options = Options::default();
        Machine {
            memory      : Memory::new(options.stack_size, options.heap_size),
            host,
            options,
            code        : Bytecode::default(),
            pc          : (0, 0),
            state       : MachineState::Stopped,
            paused      : false,
            stack       : Vec::new(),
            returns     : Vec::new(),
            coords      : Vec::new(),
            input       : Input::new(),
            random      : Random::new(0),
            canvas      : Canvas { x: 0, y: 0, width: 1000, height: 1000 },
            font        : (0, 12),
            update      : true,
            ticket      : 0,
            time_origin : 0,
            draw_count  : 0,
        }
    }

    /// Starts running the given program. Fails with `AlreadyRunning` if a program is running or suspended.
    pub fn run(self: &mut Self, code: Bytecode, options: Options) -> RuntimeResult {
        if self.state != MachineState::Stopped {
            return Err(RuntimeError::new(RK::AlreadyRunning, self.pc.0, self.pc.1));
        }
        let now = self.host.now();
        self.memory = Memory::new(options.stack_size, options.heap_size);
        self.random = Random::new(options.seed.unwrap_or(now as u32));
        self.code = code;
        self.pc = (0, 0);
        self.stack.clear();
        self.returns.clear();
        self.coords.clear();
        self.input = Input::new();
        self.canvas = Canvas { x: 0, y: 0, width: 1000, height: 1000 };
        self.font = (0, 12);
        self.update = true;
        self.paused = false;
        self.time_origin = now;
        self.draw_count = 0;
        self.state = MachineState::Running;
        self.options = options;
        log::debug!("machine started: {} lines", self.code.len());
        self.host.send(Message::Started);
        if self.options.show_canvas_on_run {
            self.host.send(Message::ShowCanvas);
        }
        Ok(())
    }

    /// Executes a batch of instructions, bounded by the instruction and drawing budgets.
    pub fn tick(self: &mut Self) -> RuntimeResult<MachineState> {
        self.draw_count = 0;
        let mut count = 0;
        while self.state == MachineState::Running && !self.paused && count < self.options.code_count_max && self.draw_count < self.options.draw_count_max.max(1) {
            self.step_unchecked()?;
            count += 1;
        }
        log::trace!("tick: {} instructions, {} drawings", count, self.draw_count);
        Ok(self.state)
    }

    /// Executes a single instruction.
    pub fn step(self: &mut Self) -> RuntimeResult<MachineState> {
        if self.state == MachineState::Running && !self.paused {
            self.step_unchecked()?;
        }
        Ok(self.state)
    }

    /// Ticks until the program stops, is suspended or paused.
    pub fn run_to_end(self: &mut Self) -> RuntimeResult<MachineState> {
        while self.state == MachineState::Running && !self.paused {
            self.tick()?;
        }
        Ok(self.state)
    }

    /// Stops the program. Outstanding timers become stale.
    pub fn halt(self: &mut Self) {
        if self.state != MachineState::Stopped {
            self.state = MachineState::Stopped;
            self.ticket += 1;
            self.paused = false;
            log::debug!("machine halted at line {}, position {}", self.pc.0, self.pc.1);
            self.host.send(Message::Halted);
        }
    }

    /// Pauses a running program.
    pub fn pause(self: &mut Self) {
        if self.state != MachineState::Stopped && !self.paused {
            self.paused = true;
            self.host.send(Message::Paused);
        }
    }

    /// Continues a paused program.
    pub fn unpause(self: &mut Self) {
        if self.paused {
            self.paused = false;
            self.host.send(Message::Unpaused);
        }
    }

    /// Delivers an inbound event. Returns whether it resumed a suspended program.
    pub fn resume(self: &mut Self, event: Event) -> bool {
        let suspension = match self.state {
            MachineState::Suspended(suspension) => Some(suspension),
            _ => None,
        };
        let (resumes, result) = match (event, suspension.map(|s| (s.wait, s.ticket))) {
            (Event::Timeout(ticket), Some((WaitKind::Delay, expected))) => (ticket == expected, None),
            (Event::Timeout(ticket), Some((WaitKind::Detect { .. }, expected))) => (ticket == expected, Some(0)),
            (Event::Timeout(_), _) => (false, None),
            (Event::KeyDown(code), wait) => {
                self.input.key_down(code);
                match wait {
                    Some((WaitKind::Detect { key }, _)) if key == code => (true, Some(crate::config::TRUE)),
                    _ => (false, None),
                }
            }
            (Event::KeyUp(code), _) => {
                self.input.key_up(code);
                (false, None)
            }
            (Event::KeyChar(code), wait) => {
                if self.input.type_char(code) {
                    if let Some(c) = char::from_u32(code as u32).filter(|_| self.input.echo && code != 13) {
                        self.host.send(Message::Console(c.to_string()));
                    }
                }
                (code == 13 && matches!(wait, Some((WaitKind::ReadLine, _))), None)
            }
            (Event::PointerMove(x, y), _) => {
                self.input.pointer_move(x, y);
                (false, None)
            }
            (Event::PointerDown(button), _) => {
                self.input.pointer_down(button);
                (false, None)
            }
            (Event::PointerUp(button), _) => {
                self.input.pointer_up(button);
                (false, None)
            }
        };
        match suspension {
            Some(suspension) if resumes => {
                if let Some(value) = result {
                    self.stack.push(value);
                }
                self.pc = suspension.resume_at;
                self.state = MachineState::Running;
                self.ticket += 1;
                log::debug!("machine resumed at line {}", self.pc.0);
                true
            }
            _ => false,
        }
    }

    /// Sends a memory dump to the host.
    pub fn dump(self: &mut Self) {
        let dump = self.memory.dump(&self.stack);
        self.host.send(Message::MemoryDump(dump));
    }

    /// The current state.
    pub fn state(self: &Self) -> MachineState {
        self.state
    }

    /// Whether the program is paused.
    pub fn is_paused(self: &Self) -> bool {
        self.paused
    }

    /// The host.
    pub fn host(self: &Self) -> &H {
        &self.host
    }

    /// The host.
    pub fn host_mut(self: &mut Self) -> &mut H {
        &mut self.host
    }

    /// Current frame base (memory cell 0).
    pub fn frame_base(self: &Self) -> Value {
        self.memory.frame_base()
    }

    /// Number of values on the operand stack.
    pub fn stack_depth(self: &Self) -> usize {
        self.stack.len()
    }

    /// Number of claimed subroutine frames.
    pub fn arena_depth(self: &Self) -> usize {
        self.memory.depth()
    }

    /// Number of allocated heap cells.
    pub fn heap_used(self: &Self) -> usize {
        self.memory.heap_used()
    }

    /// Program counter: line and position within the line.
    pub fn pc(self: &Self) -> (LineIndex, usize) {
        self.pc
    }

    /// The instruction executed next.
    pub fn next_instruction(self: &Self) -> Option<Instruction<'_>> {
        let (line, position) = self.pc;
        self.code.line(line)?.instructions().find(|i| i.position == position)
    }

    /// Reads a memory cell.
    pub fn peek(self: &Self, address: Value) -> Option<Value> {
        self.memory.load(address).ok()
    }
}

/// Support methods used by the instruction implementations.
impl<H> Machine<H> where H: Host {

    /// Executes one instruction, halting the machine on error.
    fn step_unchecked(self: &mut Self) -> RuntimeResult {
        let (line, position) = self.pc;
        match self.exec_step() {
            Ok(()) => Ok(()),
            Err(kind) => {
                let error = RuntimeError::new(kind, line, position);
                log::warn!("runtime error at line {}, position {}: {}", line, position, error);
                self.halt();
                self.host.send(Message::Error { message: error.to_string(), kind });
                Err(error)
            }
        }
    }

    /// Pops a value from the operand stack.
    pub(crate) fn pop(self: &mut Self) -> OpResult<Value> {
        self.stack.pop().ok_or(RK::StackUnderflow)
    }

    /// Pops `N` values, returned in the order they were pushed.
    pub(crate) fn pop_n<const N: usize>(self: &mut Self) -> OpResult<[Value; N]> {
        let len = self.stack.len();
        if len < N {
            return Err(RK::StackUnderflow);
        }
        let mut result = [0; N];
        result.copy_from_slice(&self.stack[len - N ..]);
        self.stack.truncate(len - N);
        Ok(result)
    }

    /// Returns the top `N` values without popping them, in the order they were pushed.
    pub(crate) fn peek_n<const N: usize>(self: &Self) -> OpResult<[Value; N]> {
        let len = self.stack.len();
        if len < N {
            return Err(RK::StackUnderflow);
        }
        let mut result = [0; N];
        result.copy_from_slice(&self.stack[len - N ..]);
        Ok(result)
    }

    /// Pushes a value onto the operand stack.
    pub(crate) fn push(self: &mut Self, value: Value) -> OpResult {
        if self.stack.len() >= self.options.stack_size {
            return Err(RK::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    /// Continues at the start of the given line.
    pub(crate) fn jump(self: &mut Self, line: Value) -> OpResult {
        if line < 0 || line as usize >= self.code.len() {
            return Err(RK::InvalidJump(line));
        }
        self.pc = (line as LineIndex, 0);
        Ok(())
    }

    /// Sends a drawing primitive, counting it against the drawing budget.
    pub(crate) fn draw(self: &mut Self, draw: Draw) {
        self.draw_count += 1;
        self.host.send(Message::Draw(draw));
    }

    /// Suspends the program until an event resumes it at `resume_at`. Delays and detection register a timer.
    pub(crate) fn suspend(self: &mut Self, wait: WaitKind, resume_at: (LineIndex, usize), delay: Option<u64>) {
        self.ticket += 1;
        let ticket = self.ticket;
        self.state = MachineState::Suspended(Suspension { resume_at, wait, ticket });
        log::debug!("machine suspended at line {}: {:?}", resume_at.0, wait);
        if let Some(delay) = delay {
            self.host.send(Message::Timer { ticket, delay });
        }
    }
}
