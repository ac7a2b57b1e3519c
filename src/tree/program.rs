use crate::prelude::*;
use crate::config::{Value, ARRAY_HEADER, DEFAULT_STRING_LENGTH};
use crate::shared::{types::Type, typed_ids::{RoutineId, VariableRef}};
use crate::bytecode::Language;
use crate::tree::{Statement, LiteralValue, Builtin, builtin};

/// Names of the built-in turtle variables, in slot order.
pub const TURTLE_VARIABLES: [&str; 6] = [ "turtx", "turty", "turtd", "turta", "turtt", "turtc" ];

/// Bounds of one array dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dimension {
    /// Index of the first element.
    pub start   : Value,
    /// Number of elements.
    pub length  : usize,
}

impl Dimension {
    pub fn new(start: Value, length: usize) -> Self {
        Self { start, length }
    }
}

/// A variable (or parameter) declared by a routine.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name                    : String,
    pub ty                      : Type,
    pub dimensions              : Vec<Dimension>,
    pub is_parameter            : bool,
    pub is_reference_parameter  : bool,
    pub is_pointer              : bool,
    /// Slot of a built-in turtle property. Turtle variables occupy no memory in their routine's frame.
    pub turtle_slot             : Option<usize>,
    /// Maximum length of string variables.
    pub string_length           : usize,
}

/// One element of an array variable.
#[derive(Clone, Debug, PartialEq)]
pub struct SubVariable {
    /// Array index of the element.
    pub index       : Value,
    /// Offset of the element relative to the array's first cell.
    pub offset      : usize,
    pub ty          : Type,
    /// Remaining dimensions if the element is itself an array.
    pub dimensions  : Vec<Dimension>,
}

impl Variable {
    /// Creates a scalar variable.
    pub fn new(name: &str, ty: Type) -> Self {
        Variable {
            name                    : name.to_string(),
            ty                      : ty,
            dimensions              : Vec::new(),
            is_parameter            : false,
            is_reference_parameter  : false,
            is_pointer              : false,
            turtle_slot             : None,
            string_length           : DEFAULT_STRING_LENGTH,
        }
    }
    /// Creates an array variable.
    pub fn array(name: &str, ty: Type, dimensions: Vec<Dimension>) -> Self {
        Variable { dimensions, ..Self::new(name, ty) }
    }
    /// Creates a value parameter.
    pub fn parameter(name: &str, ty: Type) -> Self {
        Variable { is_parameter: true, ..Self::new(name, ty) }
    }
    /// Creates a reference parameter.
    pub fn reference(name: &str, ty: Type) -> Self {
        Variable { is_parameter: true, is_reference_parameter: true, ..Self::new(name, ty) }
    }
    /// Creates a built-in turtle variable.
    pub fn turtle(slot: usize) -> Self {
        Variable { turtle_slot: Some(slot), ..Self::new(TURTLE_VARIABLES[slot], Type::integer) }
    }
    /// Sets the maximum string length.
    pub fn with_length(self: Self, string_length: usize) -> Self {
        Variable { string_length, ..self }
    }
    /// Sets the array dimensions.
    pub fn with_dimensions(self: Self, dimensions: Vec<Dimension>) -> Self {
        Variable { dimensions, ..self }
    }
    /// Whether the variable is an array.
    pub fn is_array(self: &Self) -> bool {
        !self.dimensions.is_empty()
    }
    /// Whether the variable's cell holds the address of the actual value.
    pub fn is_indirect(self: &Self) -> bool {
        self.is_reference_parameter || self.is_pointer
    }
    /// Whether the variable is a built-in turtle property.
    pub fn is_turtle(self: &Self) -> bool {
        self.turtle_slot.is_some()
    }
    /// Number of cells occupied by one element of the first dimension.
    pub fn element_length(self: &Self) -> usize {
        Self::dimensions_length(self.dimensions.get(1..).unwrap_or(&[]))
    }
    /// Number of memory cells the variable occupies in its routine's frame.
    pub fn length(self: &Self) -> usize {
        if self.is_turtle() {
            0
        } else if self.is_indirect() {
            1
        } else {
            Self::dimensions_length(&self.dimensions)
        }
    }
    /// The elements of the first dimension of an array variable.
    pub fn sub_variables(self: &Self) -> Vec<SubVariable> {
        Self::elements(self.ty, &self.dimensions)
    }
    /// Number of cells occupied by a value with the given dimensions. Saturates at `usize::MAX`.
    pub(crate) fn dimensions_length(dimensions: &[Dimension]) -> usize {
        match dimensions.split_first() {
            Some((first, rest)) => first.length.checked_mul(Self::dimensions_length(rest))
                .and_then(|elements| elements.checked_add(ARRAY_HEADER))
                .unwrap_or(usize::MAX),
            None => 1,
        }
    }
    /// Enumerates the elements of the first of the given dimensions.
    pub(crate) fn elements(ty: Type, dimensions: &[Dimension]) -> Vec<SubVariable> {
        match dimensions.split_first() {
            Some((first, rest)) => {
                let element_length = Self::dimensions_length(rest);
                (0..first.length).map(|i| SubVariable {
                    index       : first.start + i as Value,
                    offset      : ARRAY_HEADER + i * element_length,
                    ty          : ty,
                    dimensions  : rest.to_vec(),
                }).collect()
            }
            None => Vec::new(),
        }
    }
}

/// A named constant. Its value is evaluated once at compile time.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub name    : String,
    pub ty      : Type,
    pub value   : LiteralValue,
}

impl Constant {
    pub fn new(name: &str, value: LiteralValue) -> Self {
        Constant { name: name.to_string(), ty: value.ty(), value }
    }
}

/// Kind of a routine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoutineKind {
    Program,
    Procedure,
    Function,
}

/// The program or one of its (possibly nested) subroutines.
#[derive(Clone, Debug)]
pub struct Routine {
    pub name        : String,
    pub parent      : Option<RoutineId>,
    pub kind        : RoutineKind,
    pub return_type : Option<Type>,
    pub constants   : Vec<Constant>,
    pub variables   : Vec<Variable>,
    pub subroutines : Vec<RoutineId>,
    pub statements  : Vec<Statement>,
}

impl Routine {
    fn new(name: &str, parent: Option<RoutineId>, kind: RoutineKind, return_type: Option<Type>) -> Self {
        Routine {
            name        : name.to_string(),
            parent,
            kind,
            return_type,
            constants   : Vec::new(),
            variables   : Vec::new(),
            subroutines : Vec::new(),
            statements  : Vec::new(),
        }
    }
    /// Whether the routine is a function.
    pub fn is_function(self: &Self) -> bool {
        self.kind == RoutineKind::Function
    }
    /// Offset of the variable at `index` within the routine's frame: the sum of the lengths of all variables declared before it.
    pub fn variable_offset(self: &Self, index: usize) -> usize {
        Self::cells(&self.variables[..index])
    }
    /// Number of cells occupied by the routine's variables.
    pub fn variables_length(self: &Self) -> usize {
        Self::cells(&self.variables)
    }
    /// Frame offset of a function's result cell.
    pub fn result_offset(self: &Self) -> usize {
        self.variables_length()
    }
    /// Number of cells claimed for the routine's frame.
    pub fn frame_length(self: &Self) -> usize {
        self.variables_length().saturating_add(if self.is_function() { 1 } else { 0 })
    }
    /// Total length of the given variables. Saturates at `usize::MAX`.
    fn cells(variables: &[Variable]) -> usize {
        variables.iter().fold(0usize, |total, v| total.saturating_add(v.length()))
    }
    /// Iterates the routine's parameters in declaration order together with their variable indices.
    pub fn parameters(self: &Self) -> impl Iterator<Item=(usize, &Variable)> {
        self.variables.iter().enumerate().filter(|(_, v)| v.is_parameter)
    }
    /// Number of parameters.
    pub fn parameter_count(self: &Self) -> usize {
        self.parameters().count()
    }
    fn find_variable(self: &Self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name.eq_ignore_ascii_case(name))
    }
    fn find_constant(self: &Self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Result of an identifier lookup.
#[derive(Copy, Clone, Debug)]
pub enum Symbol<'a> {
    Variable(VariableRef),
    Constant(&'a Constant),
    Subroutine(RoutineId),
    Builtin(&'static Builtin),
}

/// A complete program tree: the program routine and all subroutines in declaration order.
#[derive(Clone, Debug)]
pub struct Program {
    pub language    : Language,
    pub name        : String,
    /// Value literal `true` is encoded as. Booleans produced at runtime are always -1.
    pub true_value  : Value,
    routines        : Vec<Routine>,
}

impl Program {
    /// Id of the program routine.
    pub const ID: RoutineId = RoutineId::PROGRAM;

    /// Creates a program with the built-in turtle variables declared.
    pub fn new(language: Language, name: &str) -> Self {
        let mut main = Routine::new(name, None, RoutineKind::Program, None);
        for slot in 0..TURTLE_VARIABLES.len() {
            main.variables.push(Variable::turtle(slot));
        }
        Program {
            language,
            name        : name.to_string(),
            true_value  : if language.positive_true() { 1 } else { -1 },
            routines    : vec![ main ],
        }
    }
    /// Declares a subroutine of `parent` and returns its id.
    pub fn add_subroutine(self: &mut Self, parent: RoutineId, name: &str, kind: RoutineKind, return_type: Option<Type>) -> RoutineId {
        let id = RoutineId::new(self.routines.len());
        self.routines.push(Routine::new(name, Some(parent), kind, return_type));
        self.routines[parent.into_usize()].subroutines.push(id);
        id
    }
    /// Declares a variable or parameter of `routine`.
    pub fn add_variable(self: &mut Self, routine: RoutineId, variable: Variable) -> VariableRef {
        let variables = &mut self.routines[routine.into_usize()].variables;
        variables.push(variable);
        VariableRef::new(routine, variables.len() - 1)
    }
    /// Declares a constant of `routine`.
    pub fn add_constant(self: &mut Self, routine: RoutineId, constant: Constant) {
        self.routines[routine.into_usize()].constants.push(constant);
    }
    /// Appends a statement to the body of `routine`.
    pub fn push_statement(self: &mut Self, routine: RoutineId, statement: Statement) {
        self.routines[routine.into_usize()].statements.push(statement);
    }
    /// Returns the routine with the given id.
    pub fn routine(self: &Self, id: RoutineId) -> Option<&Routine> {
        self.routines.get(id.into_usize())
    }
    /// Returns the routine with the given id.
    pub fn routine_mut(self: &mut Self, id: RoutineId) -> Option<&mut Routine> {
        self.routines.get_mut(id.into_usize())
    }
    /// The program routine.
    pub fn main(self: &Self) -> &Routine {
        &self.routines[0]
    }
    /// Iterates all routines (program first) with their ids.
    pub fn routines(self: &Self) -> impl Iterator<Item=(RoutineId, &Routine)> {
        self.routines.iter().enumerate().map(|(i, r)| (RoutineId::new(i), r))
    }
    /// Number of routines including the program.
    pub fn routine_count(self: &Self) -> usize {
        self.routines.len()
    }
    /// Returns the referenced variable.
    pub fn variable(self: &Self, variable: VariableRef) -> Option<&Variable> {
        self.routine(variable.routine)?.variables.get(variable.index)
    }
    /// Returns the variable of `routine` with the given name.
    pub fn find_variable(self: &Self, routine: RoutineId, name: &str) -> Option<VariableRef> {
        self.routine(routine)?.find_variable(name).map(|index| VariableRef::new(routine, index))
    }
    /// Returns the built-in turtle variable for the given slot.
    pub fn turtle_variable(self: &Self, slot: usize) -> Option<VariableRef> {
        self.main().variables.iter().position(|v| v.turtle_slot == Some(slot)).map(|index| VariableRef::new(Self::ID, index))
    }
    /// Iterates `from` and its enclosing routines, innermost first.
    pub fn scope_chain(self: &Self, from: RoutineId) -> impl Iterator<Item=RoutineId> + '_ {
        std::iter::successors(Some(from), move |&id| self.routine(id).and_then(|r| r.parent))
    }
    /// Resolves an identifier by walking the routine chain outwards, then the built-in commands.
    pub fn lookup(self: &Self, from: RoutineId, name: &str) -> Option<Symbol<'_>> {
        for id in self.scope_chain(from) {
            let routine = self.routine(id)?;
            if let Some(index) = routine.find_variable(name) {
                return Some(Symbol::Variable(VariableRef::new(id, index)));
            }
            if let Some(constant) = routine.find_constant(name) {
                return Some(Symbol::Constant(constant));
            }
            if let Some(&sub) = routine.subroutines.iter().find(|&&sub| self.routines[sub.into_usize()].name.eq_ignore_ascii_case(name)) {
                return Some(Symbol::Subroutine(sub));
            }
        }
        builtin(name).map(Symbol::Builtin)
    }
}
