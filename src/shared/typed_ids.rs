use crate::prelude::*;

/// Declares an index newtype for entries of one of the program tree's lists.
macro_rules! impl_typed_id {
    ($name:ident, $doc:expr) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[doc = $doc]
        pub struct $name(u32);
        impl $name {
            pub const fn new(index: usize) -> Self {
                Self(index as u32)
            }
            pub const fn into_usize(self: Self) -> usize {
                self.0 as usize
            }
        }
        impl Debug for $name {
            fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

impl_typed_id!(RoutineId, "Declaration index of a routine. The program itself is routine 0, subroutines are numbered in declaration order.");

impl RoutineId {
    pub const PROGRAM: RoutineId = RoutineId::new(0);
}

/// Reference to a variable: the declaring routine and the variable's position in that routine's variable list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableRef {
    pub routine : RoutineId,
    pub index   : usize,
}

impl VariableRef {
    pub fn new(routine: RoutineId, index: usize) -> Self {
        Self { routine, index }
    }
}
