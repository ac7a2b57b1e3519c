//! Instruction table shared by the encoder, the virtual machine and the disassembler.

use crate::config::Value;

impl_opcodes!{

    // 0x00 stack operations and conversions

    /// No operation.
    null() = 0x00,
    /// Duplicates the top stack value.
    dupl() = 0x01,
    /// Swaps the two top stack values.
    swap() = 0x02,
    /// Rotates the top three stack values: `a b c` becomes `b c a`.
    rota() = 0x03,
    /// Increments the top stack value.
    incr() = 0x04,
    /// Decrements the top stack value.
    decr() = 0x05,
    /// Pushes the maximum integer.
    mxin() = 0x06,
    /// Pops `n`, pushes a pseudo-random integer in `0 .. n`.
    rand() = 0x07,
    /// Pops a maximum length, allocates an empty heap string with that capacity and pushes its pointer.
    hstr() = 0x08,
    /// Pops a character code, pushes a new heap string containing that character.
    ctos() = 0x09,
    /// Pops a string pointer, pushes the code of its first character or 0.
    sasc() = 0x0A,
    /// Pops an integer, pushes its decimal representation as a new heap string.
    itos() = 0x0B,
    /// Pops `n` and a minimum width, pushes the hexadecimal representation as a new heap string.
    hexs() = 0x0C,
    /// Pops a string and a default, pushes the string's integer value or the default.
    sval() = 0x0D,
    /// Pops `a`, `b` and a number of decimals, pushes `a/b` rendered with that many decimals as a new heap string.
    qtos() = 0x0E,
    /// Pops a string, a multiplier and a default, pushes the string's real value times the multiplier or the default.
    qval() = 0x0F,

    // 0x10 boolean and integer operators

    /// Bitwise complement. Turns -1/0 booleans into 0/-1.
    not() = 0x10,
    /// Bitwise and.
    and() = 0x11,
    /// Bitwise or.
    or() = 0x12,
    /// Bitwise exclusive or.
    xor() = 0x13,
    /// Pushes -1 if the two top values are equal, otherwise 0.
    eqal() = 0x14,
    /// Pushes -1 if the two top values differ, otherwise 0.
    noeq() = 0x15,
    /// Pushes -1 if `a < b`, otherwise 0.
    less() = 0x16,
    /// Pushes -1 if `a > b`, otherwise 0.
    more() = 0x17,
    /// Pushes -1 if `a <= b`, otherwise 0.
    lseq() = 0x18,
    /// Pushes -1 if `a >= b`, otherwise 0.
    mreq() = 0x19,
    /// Pushes the larger of two values.
    maxi() = 0x1A,
    /// Pushes the smaller of two values.
    mini() = 0x1B,
    /// Addition.
    plus() = 0x1C,
    /// Subtraction.
    subt() = 0x1D,
    /// Negation.
    neg() = 0x1E,
    /// Absolute value.
    abs() = 0x1F,

    // 0x20 integer operators, string comparison

    /// Pushes -1, 0 or 1 according to the sign of the top value.
    sign() = 0x20,
    /// Multiplication.
    mult() = 0x21,
    /// Division rounded to the nearest integer.
    divr() = 0x22,
    /// Integer division truncated towards zero.
    div() = 0x23,
    /// Remainder of truncated division.
    modu() = 0x24,
    /// Pops two strings, pushes their concatenation as a new heap string.
    scat() = 0x25,
    /// Pops a string, pushes its length.
    slen() = 0x26,
    /// String equality.
    seql() = 0x27,
    /// String inequality.
    sneq() = 0x28,
    /// String less than.
    sles() = 0x29,
    /// String greater than.
    smor() = 0x2A,
    /// String less than or equal.
    slse() = 0x2B,
    /// String greater than or equal.
    smre() = 0x2C,
    /// Pops a string, pushes a lowercase copy.
    lcas() = 0x2D,
    /// Pops a string, pushes an uppercase copy.
    ucas() = 0x2E,

    // 0x30 string operators

    /// Pops a string, a start position and a length, pushes the substring.
    copy() = 0x30,
    /// Pops a string, a start position and a length, pushes the string with that range removed.
    dels() = 0x31,
    /// Pops a string, an insertion and a position, pushes the string with the insertion at the position.
    inss() = 0x32,
    /// Pops a search string and a string, pushes the position of the first occurrence or 0.
    poss() = 0x33,
    /// Pops a string, a search string, a replacement and a count, pushes the string with up to count
    /// occurrences replaced (all if count <= 0).
    repl() = 0x34,
    /// Pops a string, a padding string and a width, pushes the string padded on the left (positive width)
    /// or the right (negative width).
    spad() = 0x35,
    /// Pops a string, pushes a copy without leading and trailing spaces.
    trim() = 0x36,
    /// Range check for string element access. Inspects the string and index on top of the stack without popping.
    tsti() = 0x37,
    /// Pops a string and an index, pushes the character code at that position.
    cget() = 0x38,
    /// Pops a string, an index and a character code, stores the character at that position.
    cset() = 0x39,
    /// Pops a source and a destination string, copies as many characters as the destination can hold.
    cstr() = 0x3A,
    /// Pushes a new heap string. Inline operands: character count followed by the character codes.
    lstr(length) = 0x3B,

    // 0x40 pseudo-real math: every operator takes explicit scale factors

    /// Pops `a`, `b`, `m`, pushes `round(a / b * m)`.
    divm() = 0x40,
    /// Pops `a`, `b`, `m`, pushes `round(sqrt(a / b) * m)`.
    sqrt() = 0x41,
    /// Pops `a`, `b`, `m`, pushes `round(sqrt(a² + b²) * m)`.
    hyp() = 0x42,
    /// Pops `a`, `b`, `c`, `m`, pushes `round((a / b) ^ (1 / c) * m)`.
    root() = 0x43,
    /// Pops `a`, `b`, `c`, `m`, pushes `round((a / b) ^ c * m)`.
    powr() = 0x44,
    /// Pops `a`, `b`, `m`, pushes `round(log10(a / b) * m)`.
    log() = 0x45,
    /// Pops `a`, `b`, `m`, pushes `round(10 ^ (a / b) * m)`.
    alog() = 0x46,
    /// Pops `a`, `b`, `m`, pushes `round(ln(a / b) * m)`.
    ln() = 0x47,
    /// Pops `a`, `b`, `m`, pushes `round(e ^ (a / b) * m)`.
    exp() = 0x48,
    /// Pops `a`, `b`, `m`, pushes `round(sin(a / b) * m)` with the angle in the turtle's current units.
    sin() = 0x49,
    /// Pops `a`, `b`, `m`, pushes `round(cos(a / b) * m)` with the angle in the turtle's current units.
    cos() = 0x4A,
    /// Pops `a`, `b`, `m`, pushes `round(tan(a / b) * m)` with the angle in the turtle's current units.
    tan() = 0x4B,
    /// Pops `a`, `b`, `m`, pushes `round(asin(a / b) * m)` in the turtle's current angle units.
    asin() = 0x4C,
    /// Pops `a`, `b`, `m`, pushes `round(acos(a / b) * m)` in the turtle's current angle units.
    acos() = 0x4D,
    /// Pops `a`, `b`, `m`, pushes `round(atan2(a, b) * m)` in the turtle's current angle units.
    atan() = 0x4E,
    /// Pops `m`, pushes `round(pi * m)`.
    pi() = 0x4F,

    // 0x50 turtle movement

    /// Moves the turtle to the centre of the canvas, pointing up.
    home() = 0x50,
    /// Pops a value and sets the turtle's x coordinate.
    setx() = 0x51,
    /// Pops a value and sets the turtle's y coordinate.
    sety() = 0x52,
    /// Pops a value and sets the turtle's direction.
    setd() = 0x53,
    /// Pops a value and sets the number of angle units in a full turn, rescaling the direction.
    angl() = 0x54,
    /// Pops a value and sets the pen thickness.
    thik() = 0x55,
    /// Pops a value and sets the pen colour.
    colr() = 0x56,
    /// Pops `x`, `y` and moves the turtle there without drawing.
    toxy() = 0x57,
    /// Pops `dx`, `dy` and moves the turtle by that offset without drawing.
    mvxy() = 0x58,
    /// Pops `dx`, `dy` and moves the turtle by that offset, drawing a line.
    drxy() = 0x59,
    /// Pops `n` and moves the turtle forward, drawing a line.
    fwrd() = 0x5A,
    /// Pops `n` and moves the turtle backward, drawing a line.
    back() = 0x5B,
    /// Pops `n` and turns the turtle anticlockwise.
    left() = 0x5C,
    /// Pops `n` and turns the turtle clockwise.
    rght() = 0x5D,
    /// Pops `x`, `y` and turns the turtle towards that point.
    turn() = 0x5E,

    // 0x60 drawing and colour

    /// Pops a colour and fills the canvas with it.
    blnk() = 0x60,
    /// Pops `n` and draws a polyline through the last `n` remembered points.
    plin() = 0x61,
    /// Pops a colour and a boundary colour and flood fills from the turtle position.
    fill() = 0x62,
    /// Pops `x`, `y`, a colour and sets that pixel.
    pixs() = 0x63,
    /// Pops a palette index, pushes the colour value.
    rgb() = 0x64,
    /// Pops two colours and two weights, pushes the weighted mix.
    mixc() = 0x65,
    /// Remembers the turtle position in the coordinate buffer.
    rmbr() = 0x66,
    /// Pops `n` and forgets the last `n` remembered points.
    frgt() = 0x67,
    /// Pops `n` and draws a polygon outline through the last `n` remembered points.
    poly() = 0x68,
    /// Pops `n` and draws a filled polygon through the last `n` remembered points.
    pfil() = 0x69,
    /// Pops a radius and draws a circle around the turtle.
    circ() = 0x6A,
    /// Pops a radius and draws a filled circle around the turtle.
    blot() = 0x6B,
    /// Pops two radii and draws an ellipse around the turtle.
    elps() = 0x6C,
    /// Pops two radii and draws a filled ellipse around the turtle.
    eblt() = 0x6D,
    /// Pops width, height, fill colour and a border flag and draws a box from the turtle position.
    rbox() = 0x6E,
    /// Pops a string and writes it on the canvas at the turtle position.
    text() = 0x6F,

    // 0x70 memory and pointers

    /// Pushes an inline literal.
    ldin(value) = 0x70,
    /// Pushes a turtle property.
    ldvt(slot) = 0x71,
    /// Pushes a global variable.
    ldvg(address) = 0x72,
    /// Pushes a variable of the current frame.
    ldvv(offset) = 0x73,
    /// Pushes the value a reference parameter of the current frame points to.
    ldvr(offset) = 0x74,
    /// Pushes the address of a variable of the current frame.
    ldav(offset) = 0x75,
    /// Pops an address, pushes the value stored there.
    lptr() = 0x76,
    /// Pops a value into a turtle property.
    stvt(slot) = 0x77,
    /// Pops a value into a global variable.
    stvg(address) = 0x78,
    /// Pops a value into a variable of the current frame.
    stvv(offset) = 0x79,
    /// Pops a value into the variable a reference parameter of the current frame points to.
    stvr(offset) = 0x7A,
    /// Pops a value and an address, stores the value at the address.
    sptr() = 0x7B,
    /// Pops an address and a count, zeroes that many cells.
    zptr() = 0x7C,
    /// Pops a source address, a destination address and a count, copies that many cells.
    cptr() = 0x7D,
    /// Range check for array element access. Inspects the array address and index on top of the stack without popping.
    test() = 0x7E,
    /// Pops an array address and an index, pushes the address of that element.
    elem(length) = 0x7F,

    // 0x80 flow control and heap

    /// Continues at the given line.
    jump(line) = 0x80,
    /// Pops a value and continues at the given line if it is zero.
    ifno(line) = 0x81,
    /// Halts the machine.
    halt() = 0x82,
    /// Calls the subroutine starting at the given line.
    subr(line) = 0x83,
    /// Returns from a subroutine.
    retn() = 0x84,
    /// Enters the subroutine starting at the given line.
    pssr(line) = 0x85,
    /// Leaves the current subroutine.
    plsr() = 0x86,
    /// Claims a frame of the given size and makes it current.
    memc(length) = 0x87,
    /// Releases the current frame, restoring the enclosing one.
    memr() = 0x88,
    /// Sizes the global region (turtle properties and program variables).
    glob(length) = 0x89,
    /// Reclaims temporary heap strings above the permanent watermark.
    hclr() = 0x8A,
    /// Unwinds heap growth to the state captured when the first subroutine was entered.
    hrst() = 0x8B,
    /// Makes all current heap allocations permanent.
    hfix() = 0x8C,

    // 0x90 runtime and debugging

    /// Pops `x`, `y`, `width`, `height` and sets the virtual canvas.
    canv() = 0x90,
    /// Pops `width`, `height` and sets the canvas resolution.
    reso() = 0x91,
    /// Pops a flag and suspends (0) or resumes canvas updates.
    udat() = 0x92,
    /// Pops a seed, pushes the previous seed and reseeds the random generator.
    seed() = 0x93,
    /// Sends a memory dump to the host.
    dump() = 0x94,
    /// Pops a cursor style and sends it to the host.
    curs() = 0x95,

    // 0xA0 keyboard, pointer and timing

    /// Creates the keyboard buffer. Pops its capacity.
    bufr() = 0xA0,
    /// Pushes the number of characters waiting in the keyboard buffer.
    kbln() = 0xA1,
    /// Pops `n`, pushes up to `n` characters taken from the keyboard buffer as a new heap string.
    read() = 0xA2,
    /// Waits until the keyboard buffer contains a line, pushes it as a new heap string.
    rdln() = 0xA3,
    /// Pops a flag and enables or disables echoing typed characters to the console.
    kech() = 0xA4,
    /// Pops a key code, pushes -1 if that key is down, otherwise 0.
    ikey() = 0xA5,
    /// Pushes the code of the last key pressed, negative once it has been released.
    lkey() = 0xA6,
    /// Pops a key code and resets its state.
    rset() = 0xA7,
    /// Pops a key code and a timeout, waits for the key or the timeout and pushes -1 or 0.
    dtct() = 0xA8,
    /// Pushes the pointer x coordinate.
    mosx() = 0xA9,
    /// Pushes the pointer y coordinate.
    mosy() = 0xAA,
    /// Pushes the last pointer button, negative once it has been released.
    clik() = 0xAB,
    /// Pops a delay in milliseconds and waits.
    wait() = 0xAC,
    /// Pushes the elapsed time in milliseconds.
    time() = 0xAD,
    /// Pops a time in milliseconds and makes it the current elapsed time.
    tset() = 0xAE,

    // 0xB0 console and output

    /// Pops a string and appends it to the output.
    prnt() = 0xB0,
    /// Appends a line break to the output.
    newl() = 0xB1,
    /// Clears the output.
    ocls() = 0xB2,
    /// Pops a colour and sets the output text colour.
    ocol() = 0xB3,
    /// Pops a string and appends it to the console.
    cons() = 0xB4,
    /// Appends a line break to the console.
    conl() = 0xB5,
    /// Clears the console.
    ccls() = 0xB6,
    /// Pops a font family and size for canvas text.
    font() = 0xB7,

    // 0xC0 file processing, not implemented

    /// Opens a file.
    fopn() = 0xC0,
    /// Closes a file.
    fcls() = 0xC1,
    /// Reads a string from a file.
    frds() = 0xC2,
    /// Reads a line from a file.
    frln() = 0xC3,
    /// Writes a string to a file.
    fwrs() = 0xC4,
    /// Writes a line to a file.
    fwln() = 0xC5,
    /// Lists a directory.
    fdir() = 0xC6,
    /// Tests whether a file exists.
    fexs() = 0xC7,
}

impl OpCode {
    /// Whether the first operand is a line index (jump-class instruction).
    pub fn is_jump_class(self: Self) -> bool {
        matches!(self, OpCode::jump | OpCode::ifno | OpCode::subr | OpCode::pssr)
    }

    /// Whether the instruction leaves a new temporary heap string on the stack.
    pub fn produces_heap_string(self: Self) -> bool {
        use OpCode::*;
        matches!(self,
            lstr | ctos | itos | hexs | qtos | scat | lcas | ucas | copy | dels | inss | repl | spad | trim | read | rdln
        )
    }

    /// Whether the instruction belongs to the unimplemented file processing family.
    pub fn is_file_operation(self: Self) -> bool {
        (self as Value) & 0xF0 == 0xC0
    }

    /// Number of operands following the opcode at `position` in `code`, including variable length operands.
    pub fn operand_count(self: Self, code: &[Value], position: usize) -> usize {
        match self {
            OpCode::lstr => 1 + code.get(position + 1).map_or(0, |&n| n.max(0) as usize),
            _ => self.fixed_operands(),
        }
    }
}
