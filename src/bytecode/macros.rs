/// The `impl_opcodes` macro generates the `OpCode` enum, its metadata and the per-opcode line writers from
/// a list of instruction signatures.
///
/// Each entry has the form `mnemonic(operand, ...) = value`. The operand names only document the inline
/// operands and become the writer's parameter names; stack operands are described in the doc comment.
macro_rules! impl_opcodes {

    (@one $arg:ident) => ( 1 );

    (
        $(
            $( #[ $attr:meta ] )*
            $name:ident ( $( $arg:ident ),* ) = $value:literal
        ),+ $(,)?
    ) => {

        /// Bytecode instructions. Generated from instruction signatures defined via the `impl_opcodes!` macro.
        ///
        /// Opcodes are grouped in families of sixteen: `0x00` stack and conversion, `0x10` boolean and integer,
        /// `0x20` integer and string comparison, `0x30` string, `0x40` pseudo-real math, `0x50` turtle movement,
        /// `0x60` drawing, `0x70` memory, `0x80` flow control and heap, `0x90` runtime, `0xA0` input and timing,
        /// `0xB0` console and output, `0xC0` file processing.
        #[allow(non_camel_case_types)]
        #[repr(i32)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum OpCode {
            $(
                $( #[ $attr ] )*
                $name = $value,
            )+
        }

        impl OpCode {
            /// All opcodes in table order.
            pub const ALL: &'static [OpCode] = &[ $( OpCode::$name, )+ ];

            /// Converts a bytecode value to an opcode.
            pub fn from_value(value: Value) -> Option<Self> {
                match value {
                    $( $value => Some(OpCode::$name), )+
                    _ => None,
                }
            }

            /// Returns the instruction mnemonic.
            pub fn mnemonic(self: Self) -> &'static str {
                match self {
                    $( OpCode::$name => stringify!($name), )+
                }
            }

            /// Converts a mnemonic to an opcode.
            pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
                match mnemonic {
                    $( stringify!($name) => Some(OpCode::$name), )+
                    _ => None,
                }
            }

            /// Number of inline operands that always follow the opcode.
            pub fn fixed_operands(self: Self) -> usize {
                match self {
                    $( OpCode::$name => 0 $( + impl_opcodes!(@one $arg) )*, )+
                }
            }
        }

        /// Bytecode writers. Generated from instruction signatures defined via the `impl_opcodes!` macro.
        #[allow(dead_code)]
        impl crate::bytecode::Line {
            $(
                $( #[ $attr ] )*
                pub(crate) fn $name(self: &mut Self $(, $arg: Value )* ) -> usize {
                    let position = self.code.len();
                    self.code.push(OpCode::$name as Value);
                    $( self.code.push($arg); )*
                    position
                }
            )+
        }
    };
}
