use crate::prelude::*;

/// Machine configuration passed to `Machine::run`.
///
/// Hosts usually load this from their settings, so every field is optional in serialized form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Maximum number of instructions executed per tick.
    pub code_count_max      : usize,
    /// Maximum number of drawing operations per tick.
    pub draw_count_max      : usize,
    /// Size of the frame arena in cells. Also bounds the operand and return stacks.
    pub stack_size          : usize,
    /// Resolutions up to this size in both dimensions are shown with doubled pixels.
    pub small_size          : usize,
    /// Whether the host should bring the canvas to the front when a program starts.
    pub show_canvas_on_run  : bool,
    /// Maximum number of heap cells.
    pub heap_size           : usize,
    /// Fixed seed for the random generator. Derived from the host clock if not set.
    pub seed                : Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            code_count_max      : 100_000,
            draw_count_max      : 4,
            stack_size          : 20_000,
            small_size          : 60,
            show_canvas_on_run  : true,
            heap_size           : 1_000_000,
            seed                : None,
        }
    }
}
