//! Outbound messages and the host interface.

use crate::prelude::*;
use crate::config::Value;
use crate::runtime::RuntimeErrorKind;

/// A point on the virtual canvas.
pub type Point = (Value, Value);

/// The six turtle properties.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Turtle {
    pub x           : Value,
    pub y           : Value,
    /// Direction in angle units, 0 pointing up, increasing clockwise.
    pub direction   : Value,
    /// Angle units in a full turn.
    pub angles      : Value,
    pub thickness   : Value,
    pub colour      : Value,
}

/// A drawing primitive. Coordinates are virtual canvas coordinates, colours are `0xRRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Draw {
    Line { from: Point, to: Point, colour: Value, thickness: Value },
    Polygon { points: Vec<Point>, colour: Value, thickness: Value, closed: bool, fill: bool },
    Arc { centre: Point, x_radius: Value, y_radius: Value, colour: Value, thickness: Value, fill: bool },
    Box { corner: Point, width: Value, height: Value, colour: Value, border: Option<Value>, thickness: Value },
    Pixel { at: Point, colour: Value },
    Fill { at: Point, colour: Value, boundary: Value },
    Blank { colour: Value },
    Text { at: Point, text: String, colour: Value, font: Value, size: Value },
}

/// Memory snapshot sent in response to `dump` or `Machine::dump`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemoryDump {
    /// Frame base, turtle properties and program variables.
    pub globals : Vec<Value>,
    /// Claimed subroutine frames.
    pub frames  : Vec<Value>,
    /// Allocated heap cells.
    pub heap    : Vec<Value>,
    /// Operand stack, bottom first.
    pub stack   : Vec<Value>,
}

/// A message from the machine to its host. Hosts may ignore any message they do not handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Message {
    Started,
    Halted,
    Paused,
    Unpaused,
    /// Bring the canvas to the front.
    ShowCanvas,
    Canvas { x: Value, y: Value, width: Value, height: Value },
    Resolution { width: Value, height: Value, doubled: bool },
    /// Canvas updates suspended (false) or resumed.
    Update(bool),
    Turtle(Turtle),
    Draw(Draw),
    Output(String),
    OutputClear,
    OutputColour(Value),
    Console(String),
    ConsoleClear,
    Cursor(Value),
    MemoryDump(MemoryDump),
    /// Request to call `Machine::resume(Event::Timeout(ticket))` after `delay` milliseconds.
    Timer { ticket: u64, delay: u64 },
    Error { message: String, kind: RuntimeErrorKind },
}

/// Receives the machine's outbound messages and provides the clock.
pub trait Host {
    /// Handles an outbound message.
    fn send(self: &mut Self, message: Message);
    /// Milliseconds elapsed since an arbitrary fixed point.
    fn now(self: &Self) -> u64;
}

/// A host recording all messages, with a manually advanced clock.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    messages: Vec<Message>,
    clock   : u64,
}

impl Recorder {
    /// Creates a new recorder with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }
    /// All messages received so far.
    pub fn messages(self: &Self) -> &[Message] {
        &self.messages
    }
    /// Removes and returns all messages received so far.
    pub fn take(self: &mut Self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
    /// Advances the clock.
    pub fn advance(self: &mut Self, milliseconds: u64) {
        self.clock += milliseconds;
    }
    /// Drawing primitives received so far.
    pub fn drawings(self: &Self) -> Vec<&Draw> {
        self.messages.iter().filter_map(|m| match m { Message::Draw(draw) => Some(draw), _ => None }).collect()
    }
    /// Lines drawn so far.
    pub fn lines(self: &Self) -> Vec<(Point, Point)> {
        self.drawings().into_iter().filter_map(|d| match d { Draw::Line { from, to, .. } => Some((*from, *to)), _ => None }).collect()
    }
    /// Text written to the output since it was last cleared.
    pub fn output(self: &Self) -> String {
        let mut result = String::new();
        for message in &self.messages {
            match message {
                Message::Output(text) => result.push_str(text),
                Message::OutputClear => result.clear(),
                _ => { }
            }
        }
        result
    }
    /// Text written to the console since it was last cleared.
    pub fn console(self: &Self) -> String {
        let mut result = String::new();
        for message in &self.messages {
            match message {
                Message::Console(text) => result.push_str(text),
                Message::ConsoleClear => result.clear(),
                _ => { }
            }
        }
        result
    }
    /// Runtime errors received so far.
    pub fn errors(self: &Self) -> Vec<&str> {
        self.messages.iter().filter_map(|m| match m { Message::Error { message, .. } => Some(message.as_str()), _ => None }).collect()
    }
    /// The most recent turtle state.
    pub fn turtle(self: &Self) -> Option<Turtle> {
        self.messages.iter().rev().find_map(|m| match m { Message::Turtle(turtle) => Some(*turtle), _ => None })
    }
    /// The most recent timer request.
    pub fn timer(self: &Self) -> Option<(u64, u64)> {
        self.messages.iter().rev().find_map(|m| match m { Message::Timer { ticket, delay } => Some((*ticket, *delay)), _ => None })
    }
}

impl Host for Recorder {
    fn send(self: &mut Self, message: Message) {
        self.messages.push(message);
    }
    fn now(self: &Self) -> u64 {
        self.clock
    }
}
