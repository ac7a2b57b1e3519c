//! Colour palette and mixing.

use crate::config::Value;
use crate::runtime::{RuntimeErrorKind as RK, error::OpResult};

/// The predefined colours, addressed 1-based by `rgb`.
pub const PALETTE: [(&str, Value); 50] = [
    ("green", 0x228B22),        ("red", 0xFF0000),          ("blue", 0x0000FF),         ("yellow", 0xFFFF00),
    ("violet", 0x8A2BE2),       ("lime", 0x00FF00),         ("orange", 0xFFAA00),       ("skyblue", 0x00B0FF),
    ("brown", 0x964B00),        ("pink", 0xEE1289),         ("darkgreen", 0x006400),    ("darkred", 0xB22222),
    ("darkblue", 0x000080),     ("ochre", 0xC0B030),        ("indigo", 0x4B0082),       ("olive", 0x808000),
    ("orangered", 0xFF6600),    ("teal", 0x008080),         ("darkbrown", 0x5C4033),    ("magenta", 0xFF00FF),
    ("lightgreen", 0x98FB98),   ("lightred", 0xCD5C5C),     ("lightblue", 0x99BBFF),    ("cream", 0xFFFFBB),
    ("lilac", 0xAE94FF),        ("yellowgreen", 0xAAFF00),  ("peach", 0xFFCCB3),        ("cyan", 0x00FFFF),
    ("lightbrown", 0xAF8651),   ("lightpink", 0xFFB6C1),    ("seagreen", 0x3CB371),     ("maroon", 0x800000),
    ("royal", 0x4169E1),        ("gold", 0xFFC800),         ("purple", 0x800080),       ("emerald", 0x00C957),
    ("salmon", 0xFA8072),       ("turquoise", 0x00BEBE),    ("coffee", 0x926F3F),       ("rose", 0xFF88AA),
    ("greengrey", 0x70A070),    ("redgrey", 0xB49696),      ("bluegrey", 0x8080A0),     ("yellowgrey", 0x909070),
    ("darkgrey", 0x404040),     ("midgrey", 0x808080),      ("lightgrey", 0xA0A0A0),    ("silver", 0xC0C0C0),
    ("white", 0xFFFFFF),        ("black", 0x000000),
];

/// Colour of palette entry `index` (1-based, wrapping).
pub fn palette(index: Value) -> Value {
    PALETTE[(index.wrapping_sub(1)).rem_euclid(PALETTE.len() as Value) as usize].1
}

/// Weighted mix of two colours, channel by channel.
pub fn mix(first: Value, second: Value, first_weight: Value, second_weight: Value) -> OpResult<Value> {
    let total = first_weight as i64 + second_weight as i64;
    if total == 0 {
        return Err(RK::DivisionByZero);
    }
    let channel = |shift: u32| {
        let a = ((first >> shift) & 0xFF) as i64;
        let b = ((second >> shift) & 0xFF) as i64;
        let mixed = (a * first_weight as i64 + b * second_weight as i64) as f64 / total as f64;
        ((mixed + 0.5).floor() as i64).clamp(0, 0xFF) as Value
    };
    Ok((channel(16) << 16) | (channel(8) << 8) | channel(0))
}
