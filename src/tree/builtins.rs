use crate::shared::types::Type;
use crate::bytecode::OpCode;

/// A built-in command: its signature and the instructions implementing it.
///
/// Arguments are pushed left to right, then `code` runs. A function leaves its result on the stack.
#[derive(Debug)]
pub struct Builtin {
    pub name        : &'static str,
    pub parameters  : &'static [Type],
    pub result      : Option<Type>,
    pub code        : &'static [OpCode],
}

/// Generates the built-in command table.
macro_rules! impl_builtins {
    (@result) => { None };
    (@result $result:ident) => { Some(Type::$result) };
    (
        $(
            $name:literal ( $( $param:ident ),* ) $( -> $result:ident )? => [ $( $op:ident ),* ]
        ),+ $(,)?
    ) => {
        /// Built-in commands shared by all surface languages.
        pub static BUILTINS: &[Builtin] = &[
            $(
                Builtin {
                    name        : $name,
                    parameters  : &[ $( Type::$param ),* ],
                    result      : impl_builtins!(@result $( $result )?),
                    code        : &[ $( OpCode::$op ),* ],
                },
            )+
        ];
    };
}

impl_builtins!{
    // turtle
    "home"          ()                                      => [ home ],
    "setx"          (integer)                               => [ setx ],
    "sety"          (integer)                               => [ sety ],
    "setxy"         (integer, integer)                      => [ toxy ],
    "direction"     (integer)                               => [ setd ],
    "angles"        (integer)                               => [ angl ],
    "thickness"     (integer)                               => [ thik ],
    "colour"        (integer)                               => [ colr ],
    "forward"       (integer)                               => [ fwrd ],
    "back"          (integer)                               => [ back ],
    "left"          (integer)                               => [ left ],
    "right"         (integer)                               => [ rght ],
    "turnxy"        (integer, integer)                      => [ turn ],
    "movexy"        (integer, integer)                      => [ mvxy ],
    "drawxy"        (integer, integer)                      => [ drxy ],
    // drawing
    "blank"         (integer)                               => [ blnk ],
    "fill"          (integer, integer)                      => [ fill ],
    "pixset"        (integer, integer, integer)             => [ pixs ],
    "remember"      ()                                      => [ rmbr ],
    "forget"        (integer)                               => [ frgt ],
    "polyline"      (integer)                               => [ plin ],
    "polygon"       (integer)                               => [ poly ],
    "polyfill"      (integer)                               => [ pfil ],
    "circle"        (integer)                               => [ circ ],
    "blot"          (integer)                               => [ blot ],
    "ellipse"       (integer, integer)                      => [ elps ],
    "ellblot"       (integer, integer)                      => [ eblt ],
    "box"           (integer, integer, integer, boolean)    => [ rbox ],
    "display"       (string)                                => [ text ],
    "font"          (integer, integer)                      => [ font ],
    "rgb"           (integer) -> integer                    => [ rgb ],
    "mixcols"       (integer, integer, integer, integer) -> integer => [ mixc ],
    // runtime
    "canvas"        (integer, integer, integer, integer)    => [ canv ],
    "resolution"    (integer, integer)                      => [ reso ],
    "update"        (boolean)                               => [ udat ],
    "randseed"      (integer) -> integer                    => [ seed ],
    "dump"          ()                                      => [ dump ],
    "cursor"        (integer)                               => [ curs ],
    "halt"          ()                                      => [ halt ],
    // integer
    "random"        (integer) -> integer                    => [ rand ],
    "abs"           (integer) -> integer                    => [ abs ],
    "sign"          (integer) -> integer                    => [ sign ],
    "max"           (integer, integer) -> integer           => [ maxi ],
    "min"           (integer, integer) -> integer           => [ mini ],
    "maxint"        () -> integer                           => [ mxin ],
    // pseudo-real
    "divmult"       (integer, integer, integer) -> integer  => [ divm ],
    "sqrt"          (integer, integer, integer) -> integer  => [ sqrt ],
    "hypot"         (integer, integer, integer) -> integer  => [ hyp ],
    "root"          (integer, integer, integer, integer) -> integer => [ root ],
    "power"         (integer, integer, integer, integer) -> integer => [ powr ],
    "log10"         (integer, integer, integer) -> integer  => [ log ],
    "antilog"       (integer, integer, integer) -> integer  => [ alog ],
    "ln"            (integer, integer, integer) -> integer  => [ ln ],
    "antiln"        (integer, integer, integer) -> integer  => [ exp ],
    "sin"           (integer, integer, integer) -> integer  => [ sin ],
    "cos"           (integer, integer, integer) -> integer  => [ cos ],
    "tan"           (integer, integer, integer) -> integer  => [ tan ],
    "arcsin"        (integer, integer, integer) -> integer  => [ asin ],
    "arccos"        (integer, integer, integer) -> integer  => [ acos ],
    "arctan"        (integer, integer, integer) -> integer  => [ atan ],
    "pi"            (integer) -> integer                    => [ pi ],
    // strings
    "length"        (string) -> integer                     => [ slen ],
    "uppercase"     (string) -> string                      => [ ucas ],
    "lowercase"     (string) -> string                      => [ lcas ],
    "copy"          (string, integer, integer) -> string    => [ copy ],
    "delete"        (string, integer, integer) -> string    => [ dels ],
    "insert"        (string, string, integer) -> string     => [ inss ],
    "pos"           (string, string) -> integer             => [ poss ],
    "replace"       (string, string, string, integer) -> string => [ repl ],
    "pad"           (string, string, integer) -> string     => [ spad ],
    "trim"          (string) -> string                      => [ trim ],
    "str"           (integer) -> string                     => [ itos ],
    "hex"           (integer, integer) -> string            => [ hexs ],
    "val"           (string, integer) -> integer            => [ sval ],
    "qstr"          (integer, integer, integer) -> string   => [ qtos ],
    "qval"          (string, integer, integer) -> integer   => [ qval ],
    "chr"           (integer) -> character                  => [ ],
    "ord"           (character) -> integer                  => [ ],
    // keyboard, pointer and timing
    "keybuffer"     (integer)                               => [ bufr ],
    "keybuflen"     () -> integer                           => [ kbln ],
    "keyecho"       (boolean)                               => [ kech ],
    "read"          (integer) -> string                     => [ read ],
    "readln"        () -> string                            => [ rdln ],
    "keydown"       (integer) -> boolean                    => [ ikey ],
    "lastkey"       () -> integer                           => [ lkey ],
    "reset"         (integer)                               => [ rset ],
    "detect"        (integer, integer) -> boolean           => [ dtct ],
    "mousex"        () -> integer                           => [ mosx ],
    "mousey"        () -> integer                           => [ mosy ],
    "click"         () -> integer                           => [ clik ],
    "pause"         (integer)                               => [ wait ],
    "time"          () -> integer                           => [ time ],
    "timeset"       (integer)                               => [ tset ],
    // output and console
    "write"         (string)                                => [ prnt ],
    "writeline"     (string)                                => [ prnt, newl ],
    "newline"       ()                                      => [ newl ],
    "clearoutput"   ()                                      => [ ocls ],
    "outputcolour"  (integer)                               => [ ocol ],
    "console"       (string)                                => [ cons ],
    "consoleline"   (string)                                => [ cons, conl ],
    "clearconsole"  ()                                      => [ ccls ],
    // files
    "fileexists"    (string) -> boolean                     => [ fexs ],
}

impl Builtin {
    /// Whether the command returns a value.
    pub fn is_function(self: &Self) -> bool {
        self.result.is_some()
    }
}

/// Returns the built-in command with the given name (case-insensitive).
pub fn builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}
