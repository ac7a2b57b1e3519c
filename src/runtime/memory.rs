//! Flat machine memory: frame base, globals, frame arena and string heap.

use crate::config::{Value, Address, FRAME_BASE, GLOBAL_BASE, STRING_HEADER, MAX_FRAME_SIZE};
use crate::runtime::{RuntimeErrorKind as RK, error::OpResult, host::MemoryDump};

/// Machine memory.
///
/// Cell 0 holds the current frame base, cells 1 to 6 the turtle properties, followed by the program variables
/// (sized by `glob`). The frame arena follows the global region and spans `stack_size` cells, the heap follows
/// the arena. Heap memory is bump allocated and only reclaimed by watermark resets.
#[derive(Debug)]
pub(crate) struct Memory {
    cells       : Vec<Value>,
    stack_size  : usize,
    heap_size   : usize,
    /// First cell of the frame arena.
    arena_base  : Address,
    /// Next free arena cell.
    arena_top   : Address,
    /// Saved (frame base, arena top) of enclosing frames.
    arena_stack : Vec<(Value, Address)>,
    heap_base   : Address,
    /// Next free heap cell.
    heap_temp   : Address,
    /// Cells below this watermark survive `hclr`.
    heap_perm   : Address,
    /// Heap state when the first subroutine was entered, restored by `hrst`.
    heap_global : Option<Address>,
}

impl Memory {
    /// Creates memory with an empty global region.
    pub fn new(stack_size: usize, heap_size: usize) -> Self {
        let mut memory = Memory {
            cells       : Vec::new(),
            stack_size,
            heap_size,
            arena_base  : GLOBAL_BASE,
            arena_top   : GLOBAL_BASE,
            arena_stack : Vec::new(),
            heap_base   : GLOBAL_BASE,
            heap_temp   : GLOBAL_BASE,
            heap_perm   : GLOBAL_BASE,
            heap_global : None,
        };
        memory.layout(GLOBAL_BASE - 1);
        memory
    }

    /// Sizes the global region to `length` cells after the frame base (`glob`).
    pub fn globals(self: &mut Self, length: usize) -> OpResult {
        if length > MAX_FRAME_SIZE {
            return Err(RK::StackOverflow);
        }
        self.layout(length.max(GLOBAL_BASE - 1));
        Ok(())
    }

    fn layout(self: &mut Self, length: usize) {
        self.arena_base = 1 + length;
        self.arena_top = self.arena_base;
        self.arena_stack.clear();
        self.heap_base = self.arena_base + self.stack_size;
        self.heap_temp = self.heap_base;
        self.heap_perm = self.heap_base;
        self.heap_global = None;
        self.cells.clear();
        self.cells.resize(self.heap_base, 0);
        self.cells[FRAME_BASE] = self.arena_base as Value;
    }

    /// Converts a value to a valid address.
    pub fn address(self: &Self, address: Value) -> OpResult<Address> {
        if address >= 0 && (address as usize) < self.cells.len() {
            Ok(address as Address)
        } else {
            Err(RK::InvalidAddress(address))
        }
    }

    /// Reads the cell at `address`.
    pub fn load(self: &Self, address: Value) -> OpResult<Value> {
        Ok(self.cells[self.address(address)?])
    }

    /// Writes the cell at `address`.
    pub fn store(self: &mut Self, address: Value, value: Value) -> OpResult {
        let address = self.address(address)?;
        self.cells[address] = value;
        Ok(())
    }

    /// Reads a fixed cell of the global region.
    pub fn cell(self: &Self, address: Address) -> Value {
        self.cells[address]
    }

    /// Writes a fixed cell of the global region.
    pub fn set_cell(self: &mut Self, address: Address, value: Value) {
        self.cells[address] = value;
    }

    /// Current frame base.
    pub fn frame_base(self: &Self) -> Value {
        self.cells[FRAME_BASE]
    }

    /// Address of the frame cell at `offset`.
    pub fn local(self: &Self, offset: Value) -> Value {
        self.frame_base().wrapping_add(offset)
    }

    /// Number of claimed frames.
    pub fn depth(self: &Self) -> usize {
        self.arena_stack.len()
    }

    /// Claims a zeroed frame of `length` cells beyond the current arena top and makes it current (`memc`).
    pub fn claim(self: &mut Self, length: Value) -> OpResult {
        let length = usize::try_from(length).map_err(|_| RK::InvalidAddress(length))?;
        let base = self.arena_top;
        if length > MAX_FRAME_SIZE || base + length > self.arena_base + self.stack_size {
            return Err(RK::StackOverflow);
        }
        self.arena_stack.push((self.cells[FRAME_BASE], self.arena_top));
        self.cells[base .. base + length].fill(0);
        self.cells[FRAME_BASE] = base as Value;
        self.arena_top = base + length;
        Ok(())
    }

    /// Releases the current frame, restoring the enclosing frame base (`memr`).
    pub fn release(self: &mut Self) -> OpResult {
        let (frame_base, arena_top) = self.arena_stack.pop().ok_or(RK::InvalidRelease)?;
        self.cells[FRAME_BASE] = frame_base;
        self.arena_top = arena_top;
        Ok(())
    }

    /// Allocates `length` zeroed heap cells.
    pub fn alloc(self: &mut Self, length: usize) -> OpResult<Address> {
        let address = self.heap_temp;
        let end = address + length;
        if end - self.heap_base > self.heap_size {
            return Err(RK::HeapOverflow);
        }
        if end > self.cells.len() {
            self.cells.resize(end, 0);
        }
        self.cells[address .. end].fill(0);
        self.heap_temp = end;
        Ok(address)
    }

    /// Reclaims temporary heap cells (`hclr`).
    pub fn heap_clear(self: &mut Self) {
        self.heap_temp = self.heap_perm;
    }

    /// Makes all heap allocations permanent (`hfix`).
    pub fn heap_fix(self: &mut Self) {
        self.heap_perm = self.heap_temp;
    }

    /// Records the heap state on entering the first subroutine (`pssr`).
    pub fn heap_enter(self: &mut Self) {
        if self.heap_global.is_none() {
            self.heap_global = Some(self.heap_temp);
        }
    }

    /// Unwinds heap growth to the state recorded by `heap_enter` (`hrst`).
    pub fn heap_reset(self: &mut Self) {
        if let Some(heap_global) = self.heap_global {
            self.heap_temp = heap_global;
            self.heap_perm = heap_global;
        }
    }

    /// Number of allocated heap cells.
    pub fn heap_used(self: &Self) -> usize {
        self.heap_temp - self.heap_base
    }

    /// Allocates an empty string buffer holding up to `max` characters.
    pub fn new_string(self: &mut Self, max: usize) -> OpResult<Value> {
        let address = self.alloc(STRING_HEADER + max)?;
        self.cells[address] = max as Value;
        Ok(address as Value)
    }

    /// Allocates a string buffer containing `text`.
    pub fn make_string(self: &mut Self, text: &[Value]) -> OpResult<Value> {
        let pointer = self.new_string(text.len())?;
        self.write_string(pointer, text)?;
        Ok(pointer)
    }

    /// Validates a string pointer, returning the buffer address, capacity and length.
    fn string_header(self: &Self, pointer: Value) -> OpResult<(Address, usize, usize)> {
        let address = self.address(pointer)?;
        if address + 1 >= self.cells.len() {
            return Err(RK::InvalidAddress(pointer));
        }
        let max = self.cells[address];
        let length = self.cells[address + 1];
        if max < 0 || length < 0 || length > max || address + STRING_HEADER + max as usize > self.cells.len() {
            return Err(RK::InvalidAddress(pointer));
        }
        Ok((address, max as usize, length as usize))
    }

    /// The characters of the string at `pointer`.
    pub fn string(self: &Self, pointer: Value) -> OpResult<&[Value]> {
        let (address, _, length) = self.string_header(pointer)?;
        let start = address + STRING_HEADER;
        Ok(&self.cells[start .. start + length])
    }

    /// The string at `pointer` as text.
    pub fn text(self: &Self, pointer: Value) -> OpResult<String> {
        Ok(self.string(pointer)?.iter().map(|&c| char::from_u32(c as u32).unwrap_or('\u{FFFD}')).collect())
    }

    /// Capacity of the string buffer at `pointer`.
    pub fn string_capacity(self: &Self, pointer: Value) -> OpResult<usize> {
        Ok(self.string_header(pointer)?.1)
    }

    /// Replaces the contents of the string buffer at `pointer`, truncating to its capacity.
    pub fn write_string(self: &mut Self, pointer: Value, text: &[Value]) -> OpResult {
        let (address, max, _) = self.string_header(pointer)?;
        let length = text.len().min(max);
        let start = address + STRING_HEADER;
        self.cells[start .. start + length].copy_from_slice(&text[..length]);
        self.cells[address + 1] = length as Value;
        Ok(())
    }

    /// Copies the string at `source` into the buffer at `destination` (`cstr`).
    pub fn copy_string(self: &mut Self, source: Value, destination: Value) -> OpResult {
        let text = self.string(source)?.to_vec();
        self.write_string(destination, &text)
    }

    /// Takes a snapshot of the used memory.
    pub fn dump(self: &Self, stack: &[Value]) -> MemoryDump {
        MemoryDump {
            globals : self.cells[.. self.arena_base].to_vec(),
            frames  : self.cells[self.arena_base .. self.arena_top].to_vec(),
            heap    : self.cells[self.heap_base .. self.heap_temp].to_vec(),
            stack   : stack.to_vec(),
        }
    }
}
