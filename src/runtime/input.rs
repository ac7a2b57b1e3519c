//! Keyboard and pointer state.

use std::collections::VecDeque;
use crate::config::{Value, KEY_CODES, KEYBUFFER_SIZE};

/// Keyboard and pointer state as observed through inbound events.
#[derive(Clone, Debug)]
pub(crate) struct Input {
    keys        : [bool; KEY_CODES],
    /// Code of the last key pressed, negated once released.
    last_key    : Value,
    buffer      : VecDeque<Value>,
    capacity    : usize,
    /// Whether typed characters are echoed to the console.
    pub echo    : bool,
    pointer_x   : Value,
    pointer_y   : Value,
    /// Last pointer button pressed, negated once released.
    click       : Value,
}

impl Input {
    pub fn new() -> Self {
        Input {
            keys        : [false; KEY_CODES],
            last_key    : 0,
            buffer      : VecDeque::new(),
            capacity    : KEYBUFFER_SIZE,
            echo        : false,
            pointer_x   : -1,
            pointer_y   : -1,
            click       : 0,
        }
    }

    fn key_index(code: Value) -> Option<usize> {
        usize::try_from(code).ok().filter(|&index| index < KEY_CODES)
    }

    pub fn key_down(self: &mut Self, code: Value) {
        if let Some(index) = Self::key_index(code) {
            self.keys[index] = true;
        }
        self.last_key = code;
    }

    pub fn key_up(self: &mut Self, code: Value) {
        if let Some(index) = Self::key_index(code) {
            self.keys[index] = false;
        }
        if self.last_key == code {
            self.last_key = -code;
        }
    }

    /// Whether the given key is down.
    pub fn is_down(self: &Self, code: Value) -> bool {
        Self::key_index(code).map_or(false, |index| self.keys[index])
    }

    pub fn last_key(self: &Self) -> Value {
        self.last_key
    }

    /// Resets the state of a key (`rset`).
    pub fn reset(self: &mut Self, code: Value) {
        if let Some(index) = Self::key_index(code) {
            self.keys[index] = false;
        }
        if self.last_key.abs() == code.abs() {
            self.last_key = 0;
        }
    }

    /// Recreates the keyboard buffer with the given capacity (`bufr`).
    pub fn create_buffer(self: &mut Self, capacity: Value) {
        self.capacity = capacity.max(0) as usize;
        self.buffer = VecDeque::with_capacity(self.capacity);
    }

    /// Appends a typed character to the buffer. Returns false if the buffer is full.
    pub fn type_char(self: &mut Self, code: Value) -> bool {
        if self.buffer.len() < self.capacity {
            self.buffer.push_back(code);
            true
        } else {
            false
        }
    }

    /// Number of buffered characters.
    pub fn buffered(self: &Self) -> usize {
        self.buffer.len()
    }

    /// Removes up to `count` characters from the buffer.
    pub fn take(self: &mut Self, count: usize) -> Vec<Value> {
        let count = count.min(self.buffer.len());
        self.buffer.drain(.. count).collect()
    }

    /// Removes a complete line from the buffer, without its terminating Enter.
    pub fn take_line(self: &mut Self) -> Option<Vec<Value>> {
        let end = self.buffer.iter().position(|&c| c == 13)?;
        let line = self.buffer.drain(.. end).collect();
        self.buffer.pop_front();
        Some(line)
    }

    pub fn pointer_move(self: &mut Self, x: Value, y: Value) {
        self.pointer_x = x;
        self.pointer_y = y;
    }

    pub fn pointer_down(self: &mut Self, button: Value) {
        self.click = button;
    }

    pub fn pointer_up(self: &mut Self, button: Value) {
        if self.click == button {
            self.click = -button;
        }
    }

    pub fn pointer(self: &Self) -> (Value, Value, Value) {
        (self.pointer_x, self.pointer_y, self.click)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_taken_without_enter() {
        let mut input = Input::new();
        for c in "ab\rc".chars() {
            assert!(input.type_char(c as Value));
        }
        assert_eq!(input.take_line(), Some(vec![ 'a' as Value, 'b' as Value ]));
        assert_eq!(input.buffered(), 1);
        assert_eq!(input.take_line(), None);
    }

    #[test]
    fn keys_track_release() {
        let mut input = Input::new();
        input.key_down(65);
        assert!(input.is_down(65));
        assert_eq!(input.last_key(), 65);
        input.key_up(65);
        assert!(!input.is_down(65));
        assert_eq!(input.last_key(), -65);
    }

    #[test]
    fn buffer_is_bounded() {
        let mut input = Input::new();
        input.create_buffer(2);
        assert!(input.type_char(1));
        assert!(input.type_char(2));
        assert!(!input.type_char(3));
        assert_eq!(input.take(5), vec![ 1, 2 ]);
    }
}
