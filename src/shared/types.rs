use crate::prelude::*;

/// Semantic type of a variable, constant or expression.
///
/// `boolint` is compiler-internal: "boolean or integer, decided by context". Booleans are
/// represented as integers at runtime, so unifying the two never requires code.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    boolean,
    integer,
    boolint,
    string,
    character,
}

/// How a value of one type is made acceptable where another type is expected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Coercion {
    /// Types are identical.
    Exact,
    /// `boolint` unifies with `boolean` or `integer`, no code is required.
    Unify,
    /// A `CastExpression` to the expected type must be inserted.
    Cast(Type),
}

impl Type {
    /// All types, in declaration order.
    pub const ALL: [Type; 5] = [ Type::boolean, Type::integer, Type::boolint, Type::string, Type::character ];

    /// Returns how a value of type `found` is accepted where `expected` is required, or None if it is a type error.
    ///
    /// Single character string literals are also acceptable as `character`. That case depends on the
    /// expression, not only its type, and is handled by the type checker.
    pub fn coercion(expected: Type, found: Type) -> Option<Coercion> {
        use Type::*;
        match (expected, found) {
            _ if expected == found => Some(Coercion::Exact),
            (string, character) => Some(Coercion::Cast(string)),
            (character, string) => Some(Coercion::Cast(character)),
            (boolint, boolean) | (boolint, integer) | (boolean, boolint) | (integer, boolint) => Some(Coercion::Unify),
            _ => None,
        }
    }

    /// Whether `found` is accepted for `expected` without inserting a cast.
    pub fn unifies(expected: Type, found: Type) -> bool {
        matches!(Type::coercion(expected, found), Some(Coercion::Exact) | Some(Coercion::Unify))
    }

    /// Whether values of the type are heap string pointers.
    pub fn is_string(self: &Self) -> bool {
        *self == Type::string
    }

    /// Whether the type can be tested as a condition.
    pub fn is_condition(self: &Self) -> bool {
        Type::unifies(Type::boolean, *self)
    }

    /// Type name used in error messages.
    pub fn name(self: &Self) -> &'static str {
        match self {
            Type::boolean   => "boolean",
            Type::integer   => "integer",
            Type::boolint   => "boolean or integer",
            Type::string    => "string",
            Type::character => "character",
        }
    }
}

impl Debug for Type {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Display for Type {
    fn fmt(self: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
