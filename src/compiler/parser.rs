//! Nom parser for the language-neutral expression syntax.
//!
//! The syntax is used by tools, tests and constant declarations. It follows the shared operator precedence
//! (low to high): comparison `= < <= > >= <>`, additive `+ - or xor`, multiplicative `* and div divr mod`,
//! then unary `-`/`not` and factors (literals, identifiers, calls, `name[index]`, parentheses).
//! Identifiers are resolved through the routine chain and the built-in commands.

use nom::character::complete::{char, digit1, hex_digit1, multispace0, none_of, one_of, satisfy};
use nom::bytes::complete::{tag, tag_no_case, take_while, take_while1};
use nom::combinator::{map, map_res, opt, recognize, not, verify, all_consuming};
use nom::multi::{fold_many0, separated_list0, separated_list1};
use nom::branch::alt;
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use crate::config::Value;
use crate::shared::typed_ids::RoutineId;
use crate::tree::{Program, Symbol, Expression, Statement, LiteralValue, Operator, Position, CallTarget};
use crate::compiler::{constant, typecheck, error::{CompileError, CompileErrorKind as CEK, CompileResult}};

type Input<'a> = &'a str;
type Output<'a, O> = nom::IResult<Input<'a>, O>;

const KEYWORDS: [&str; 10] = [ "and", "or", "xor", "not", "div", "divr", "mod", "true", "false", "return" ];

/// Untyped syntax tree node. `rest` is the length of the input remaining at the node's start.
#[derive(Clone, Debug)]
struct Node {
    rest    : usize,
    syntax  : Syntax,
}

#[derive(Clone, Debug)]
enum Syntax {
    Integer(Value),
    Boolean(bool),
    Text(String),
    Name { name: String, arguments: Option<Vec<Node>>, indexes: Vec<Node> },
    Unary(Operator, Box<Node>),
    Binary(Operator, Box<Node>, Box<Node>),
}

enum StatementSyntax {
    Return(usize, Option<Node>),
    Assignment(Node, Node),
    Call(Node),
}

// whitespace

fn ws<'a, O, F>(parser: F) -> impl FnMut(Input<'a>) -> Output<'a, O> where F: FnMut(Input<'a>) -> Output<'a, O> {
    delimited(multispace0, parser, multispace0)
}

/// Matches a keyword not followed by further identifier characters.
fn keyword<'a>(word: &'static str) -> impl FnMut(Input<'a>) -> Output<'a, Input<'a>> {
    terminated(tag_no_case(word), not(satisfy(|c: char| c.is_alphanumeric() || c == '_')))
}

// identifier ([a-z_][a-z0-9_]*)

fn ident(i: Input<'_>) -> Output<&str> {
    verify(
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_')
        )),
        |name: &str| !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name))
    )(i)
}

// literals

fn integer(i: Input<'_>) -> Output<Value> {
    alt((
        map_res(preceded(one_of("#$"), hex_digit1), |digits: &str| u32::from_str_radix(digits, 16).map(|v| v as Value)),
        map_res(digit1, |digits: &str| digits.parse::<Value>()),
    ))(i)
}

fn single_quoted(i: Input<'_>) -> Output<String> {
    delimited(
        char('\''),
        fold_many0(alt((map(tag("''"), |_| '\''), none_of("'"))), String::new, |mut s, c| { s.push(c); s }),
        char('\'')
    )(i)
}

fn double_quoted(i: Input<'_>) -> Output<String> {
    delimited(
        char('"'),
        fold_many0(alt((map(tag("\"\""), |_| '"'), none_of("\""))), String::new, |mut s, c| { s.push(c); s }),
        char('"')
    )(i)
}

// expression

fn name(i: Input<'_>) -> Output<Node> {
    let rest = i.len();
    map(
        tuple((
            ident,
            opt(delimited(ws(char('(')), separated_list0(char(','), expression), ws(char(')')))),
            opt(delimited(ws(char('[')), separated_list1(char(','), expression), ws(char(']')))),
        )),
        move |(name, arguments, indexes)| Node { rest, syntax: Syntax::Name { name: name.to_string(), arguments, indexes: indexes.unwrap_or_default() } }
    )(i)
}

fn factor(i: Input<'_>) -> Output<Node> {
    let (i, _) = multispace0(i)?;
    let rest = i.len();
    let node = move |syntax| Node { rest, syntax };
    terminated(alt((
        map(integer, move |v| node(Syntax::Integer(v))),
        map(alt((single_quoted, double_quoted)), move |s| node(Syntax::Text(s))),
        map(keyword("true"), move |_| node(Syntax::Boolean(true))),
        map(keyword("false"), move |_| node(Syntax::Boolean(false))),
        delimited(char('('), expression, char(')')),
        name,
    )), multispace0)(i)
}

fn unary(i: Input<'_>) -> Output<Node> {
    let (i, _) = multispace0(i)?;
    let rest = i.len();
    alt((
        map(preceded(char('-'), unary), move |n| Node { rest, syntax: Syntax::Unary(Operator::Neg, Box::new(n)) }),
        map(preceded(keyword("not"), unary), move |n| Node { rest, syntax: Syntax::Unary(Operator::Not, Box::new(n)) }),
        factor,
    ))(i)
}

fn binary_node(operator: Operator, left: Node, right: Node) -> Node {
    Node { rest: left.rest, syntax: Syntax::Binary(operator, Box::new(left), Box::new(right)) }
}

fn multiplicative(i: Input<'_>) -> Output<Node> {
    let (i, init) = unary(i)?;
    fold_many0(
        pair(ws(alt((
            map(char('*'), |_| Operator::Mult),
            map(keyword("and"), |_| Operator::And),
            map(keyword("divr"), |_| Operator::Divr),
            map(keyword("div"), |_| Operator::Div),
            map(keyword("mod"), |_| Operator::Mod),
        ))), unary),
        move || init.clone(),
        |acc, (op, val)| binary_node(op, acc, val)
    )(i)
}

fn additive(i: Input<'_>) -> Output<Node> {
    let (i, init) = multiplicative(i)?;
    fold_many0(
        pair(ws(alt((
            map(char('+'), |_| Operator::Plus),
            map(char('-'), |_| Operator::Subt),
            map(keyword("or"), |_| Operator::Or),
            map(keyword("xor"), |_| Operator::Xor),
        ))), multiplicative),
        move || init.clone(),
        |acc, (op, val)| binary_node(op, acc, val)
    )(i)
}

fn expression(i: Input<'_>) -> Output<Node> {
    let (i, init) = additive(i)?;
    fold_many0(
        pair(ws(alt((
            map(tag("<="), |_| Operator::Lseq),
            map(tag(">="), |_| Operator::Mreq),
            map(tag("<>"), |_| Operator::Noeq),
            map(char('='), |_| Operator::Eqal),
            map(char('<'), |_| Operator::Less),
            map(char('>'), |_| Operator::More),
        ))), additive),
        move || init.clone(),
        |acc, (op, val)| binary_node(op, acc, val)
    )(i)
}

// statement

fn statement(i: Input<'_>) -> Output<StatementSyntax> {
    let (i, _) = multispace0(i)?;
    let rest = i.len();
    ws(alt((
        map(preceded(keyword("return"), opt(expression)), move |value| StatementSyntax::Return(rest, value)),
        map(pair(terminated(name, ws(alt((tag(":="), tag("="))))), expression), |(target, value)| StatementSyntax::Assignment(target, value)),
        map(name, StatementSyntax::Call),
    )))(i)
}

/// Runs a parser on the complete source, converting nom errors into syntax errors.
fn parse_all<'a, O, F>(source: &'a str, parser: F) -> CompileResult<O> where F: FnMut(Input<'a>) -> Output<'a, O> {
    match all_consuming(ws(parser))(source) {
        Ok((_, result)) => Ok(result),
        Err(nom::Err::Error(error)) | Err(nom::Err::Failure(error)) => {
            let position = Position(source.len() - error.input.len());
            let message = match error.input.chars().next() {
                Some(c) => format!("unexpected '{}'", c),
                None => "unexpected end of input".to_string(),
            };
            Err(CompileError::at(position, CEK::Syntax(message)))
        }
        Err(nom::Err::Incomplete(_)) => Err(CompileError::at(Position(source.len()), CEK::Syntax("unexpected end of input".to_string()))),
    }
}

/// Resolves untyped syntax into typed expressions and statements of one routine.
struct Resolver<'a> {
    program : &'a Program,
    from    : RoutineId,
    length  : usize,
}

impl<'a> Resolver<'a> {

    fn position(self: &Self, node: &Node) -> Position {
        Position(self.length - node.rest)
    }

    fn expressions(self: &Self, nodes: Vec<Node>) -> CompileResult<Vec<Expression>> {
        nodes.into_iter().map(|node| self.expression(node)).collect()
    }

    fn expression(self: &Self, node: Node) -> CompileResult<Expression> {
        let position = self.position(&node);
        match node.syntax {
            Syntax::Integer(value) => Ok(Expression::literal(LiteralValue::Integer(value), position)),
            Syntax::Boolean(value) => Ok(Expression::literal(LiteralValue::Boolean(value), position)),
            Syntax::Text(value) => Ok(Expression::literal(LiteralValue::String(value), position)),
            Syntax::Unary(Operator::Neg, operand) if matches!(operand.syntax, Syntax::Integer(_)) => match operand.syntax {
                Syntax::Integer(value) => Ok(Expression::literal(LiteralValue::Integer(value.wrapping_neg()), position)),
                _ => Err(CompileError::ice("Literal expected".to_string())),
            },
            Syntax::Unary(operator, operand) => typecheck::unary(operator, self.expression(*operand)?, position),
            Syntax::Binary(operator, left, right) => typecheck::binary(operator, self.expression(*left)?, self.expression(*right)?, position),
            Syntax::Name { name, arguments, indexes } => {
                let symbol = self.program.lookup(self.from, &name).ok_or_else(|| CompileError::at(position, CEK::UnknownIdentifier(name.clone())))?;
                match symbol {
                    Symbol::Variable(variable) => {
                        if arguments.is_some() {
                            return Err(CompileError::at(position, CEK::NotAFunction(name)));
                        }
                        typecheck::variable_value(self.program, self.from, variable, self.expressions(indexes)?, position)
                    }
                    _ if !indexes.is_empty() => Err(CompileError::at(position, CEK::NotIndexable(name))),
                    Symbol::Constant(constant) => {
                        if arguments.is_some() {
                            return Err(CompileError::at(position, CEK::NotAFunction(name)));
                        }
                        Ok(Expression::literal(constant.value.clone(), position))
                    }
                    Symbol::Subroutine(id) => typecheck::function_call(self.program, self.from, CallTarget::Subroutine(id), self.expressions(arguments.unwrap_or_default())?, position),
                    Symbol::Builtin(builtin) => typecheck::function_call(self.program, self.from, CallTarget::Builtin(builtin), self.expressions(arguments.unwrap_or_default())?, position),
                }
            }
        }
    }

    fn statement(self: &Self, syntax: StatementSyntax) -> CompileResult<Statement> {
        match syntax {
            StatementSyntax::Return(rest, value) => {
                let value = match value {
                    Some(value) => Some(self.expression(value)?),
                    None => None,
                };
                typecheck::return_statement(self.program, self.from, value, Position(self.length - rest))
            }
            StatementSyntax::Assignment(target, value) => {
                let position = self.position(&target);
                let (name, indexes) = match target.syntax {
                    Syntax::Name { name, arguments: None, indexes } => (name, indexes),
                    Syntax::Name { name, .. } => return Err(CompileError::at(position, CEK::ConstantAssignment(name))),
                    _ => return Err(CompileError::ice("Assignment target expected".to_string())),
                };
                match self.program.lookup(self.from, &name) {
                    Some(Symbol::Variable(variable)) => {
                        let indexes = self.expressions(indexes)?;
                        typecheck::assignment(self.program, self.from, variable, indexes, self.expression(value)?, position)
                    }
                    Some(_) => Err(CompileError::at(position, CEK::ConstantAssignment(name))),
                    None => Err(CompileError::at(position, CEK::UnknownIdentifier(name))),
                }
            }
            StatementSyntax::Call(call) => {
                let position = self.position(&call);
                let (name, arguments) = match call.syntax {
                    Syntax::Name { name, arguments, indexes } if indexes.is_empty() => (name, arguments.unwrap_or_default()),
                    Syntax::Name { name, .. } => return Err(CompileError::at(position, CEK::NotAProcedure(name))),
                    _ => return Err(CompileError::ice("Call expected".to_string())),
                };
                let target = match self.program.lookup(self.from, &name) {
                    Some(Symbol::Subroutine(id)) => CallTarget::Subroutine(id),
                    Some(Symbol::Builtin(builtin)) => CallTarget::Builtin(builtin),
                    Some(_) => return Err(CompileError::at(position, CEK::NotAProcedure(name))),
                    None => return Err(CompileError::at(position, CEK::UnknownIdentifier(name))),
                };
                typecheck::procedure_call(self.program, self.from, target, self.expressions(arguments)?, position)
            }
        }
    }
}

/// Parses and resolves an expression in the scope of routine `from`.
pub fn parse_expression(program: &Program, from: RoutineId, source: &str) -> CompileResult<Expression> {
    let node = parse_all(source, expression)?;
    Resolver { program, from, length: source.len() }.expression(node)
}

/// Parses, resolves and evaluates a constant expression.
pub fn parse_constant(program: &Program, from: RoutineId, source: &str) -> CompileResult<LiteralValue> {
    constant::evaluate(&parse_expression(program, from, source)?)
}

/// Parses and resolves a simple statement: an assignment (`name[index] = value`, `:=` is accepted as well),
/// a procedure call or a return statement.
pub fn parse_statement(program: &Program, from: RoutineId, source: &str) -> CompileResult<Statement> {
    let syntax = parse_all(source, statement)?;
    Resolver { program, from, length: source.len() }.statement(syntax)
}
