use std::iter::Peekable;

use crate::{
    ast::{AssignTarget, Expr, Member, Statement},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            binary::compound_assign_operator,
            control::{
                is_if_statement, parse_do_while, parse_for, parse_if, parse_loop, parse_switch,
                parse_try,
            },
            core::{ParseResult, parse_expression},
            declaration::{
                parse_class, parse_enum, parse_function_declaration, parse_interface, parse_struct,
            },
            utils::{
                check, expect, expect_semicolon, parse_call_args, parse_comma_separated,
                parse_identifier, parse_name_list, parse_type_annotation, peek_line,
            },
        },
    },
};

/// Parses a single statement.
///
/// The leading token selects the statement form:
/// - `let`, `const`: declarations and destructuring,
/// - `def name`: a function declaration,
/// - `return`, `break`,
/// - `if` (block form), `loop`, `do`, `for`, `switch`, `try`,
/// - `class`, `interface`, `struct`, `enum Name`,
/// - `use`, `exports`, `super`.
///
/// Anything else is parsed as an expression, which becomes an assignment when
/// followed by `=`, a compound operator, `++` or `--`.
///
/// # Parameters
/// - `tokens`: Token iterator containing `(Token, line)` pairs.
///
/// # Returns
/// A parsed [`Statement`] node.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.peek().copied() else {
        return Err(ParseError::UnexpectedEndOfInput { line: 0 });
    };
    let line = *line;

    match token {
        Token::Let => parse_let(tokens),
        Token::Const => parse_const(tokens),
        Token::Def if is_named_def(tokens) => parse_function_declaration(tokens),
        Token::At => parse_function_declaration(tokens),
        Token::Return => {
            tokens.next();
            let value = if check(tokens, &Token::Semicolon) || check(tokens, &Token::RBrace) {
                None
            } else {
                Some(parse_expression(tokens)?)
            };
            expect_semicolon(tokens)?;
            Ok(Statement::Return { value, line })
        },
        Token::Break => {
            tokens.next();
            expect_semicolon(tokens)?;
            Ok(Statement::Break { line })
        },
        Token::If if is_if_statement(tokens) => parse_if(tokens),
        Token::Loop => parse_loop(tokens),
        Token::Do => parse_do_while(tokens),
        Token::For => parse_for(tokens),
        Token::Switch => parse_switch(tokens),
        Token::Try => parse_try(tokens),
        Token::Class => parse_class(tokens),
        Token::Interface => parse_interface(tokens),
        Token::Struct => parse_struct(tokens),
        Token::Enum if !is_enum_access(tokens) => parse_enum(tokens),
        Token::Use => parse_use(tokens),
        Token::Exports => {
            tokens.next();
            let names = parse_name_list(tokens)?;
            expect_semicolon(tokens)?;
            Ok(Statement::Exports { names, line })
        },
        Token::Super => parse_super(tokens),
        _ => parse_expression_statement(tokens),
    }
}

/// Tests whether a `def` token starts a named declaration rather than an
/// anonymous function expression.
fn is_named_def<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut lookahead = tokens.clone();
    lookahead.next();
    matches!(lookahead.next(), Some((Token::Identifier(_), _)))
}

/// Tests whether an `enum` token starts an `enum::E::M` expression.
fn is_enum_access<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut lookahead = tokens.clone();
    lookahead.next();
    matches!(lookahead.next(), Some((Token::DoubleColon, _)))
}

/// Parses a `let` statement.
///
/// Supported forms:
/// - `let x = e;` and `let x: Type = e;`
/// - `let {a, b} = object;`
/// - `let [a, _, b] = list;`
fn parse_let<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Let, "'let'")?;

    let statement = match tokens.peek() {
        Some((Token::LBrace, _)) => {
            tokens.next();
            let names = parse_comma_separated(tokens, parse_identifier, &Token::RBrace)?;
            expect(tokens, &Token::Equals, "'='")?;
            Statement::DestructureObject { names,
                                           value: parse_expression(tokens)?,
                                           line }
        },
        Some((Token::LBracket, _)) => {
            tokens.next();
            let names = parse_comma_separated(tokens, parse_identifier, &Token::RBracket)?
                            .into_iter()
                            .map(|name| (name != "_").then_some(name))
                            .collect();
            expect(tokens, &Token::Equals, "'='")?;
            Statement::DestructureList { names,
                                         value: parse_expression(tokens)?,
                                         line }
        },
        _ => {
            let name = parse_identifier(tokens)?;
            let type_name = parse_type_annotation(tokens)?;
            expect(tokens, &Token::Equals, "'='")?;
            Statement::Let { name,
                             type_name,
                             value: parse_expression(tokens)?,
                             line }
        },
    };

    expect_semicolon(tokens)?;
    Ok(statement)
}

/// Parses `const NAME = e;`.
fn parse_const<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Const, "'const'")?;
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Equals, "'='")?;
    let value = parse_expression(tokens)?;
    expect_semicolon(tokens)?;

    Ok(Statement::Const { name, value, line })
}

/// Parses `use (a, b) from "path";`.
fn parse_use<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Use, "'use'")?;
    let names = parse_name_list(tokens)?;
    expect(tokens, &Token::From, "'from'")?;
    let path = match tokens.next() {
        Some((Token::Str(path), _)) => path.clone(),
        Some((tok, line)) => {
            return Err(ParseError::Expected { expected: "module path string".to_string(),
                                              found:    format!("{tok:?}"),
                                              line:     *line, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { line }),
    };
    expect_semicolon(tokens)?;

    Ok(Statement::Use { names, path, line })
}

/// Parses `super(Field = e, ...);`.
///
/// Only named arguments are accepted; each one initialises an inherited
/// field.
fn parse_super<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Super, "'super'")?;
    expect(tokens, &Token::LParen, "'(' after 'super'")?;
    let args = parse_call_args(tokens)?;
    if !args.positional.is_empty() {
        return Err(ParseError::Other { message: "super() takes only Field = value arguments".to_string(),
                                       line });
    }
    expect_semicolon(tokens)?;

    Ok(Statement::Super { assignments: args.named,
                          line })
}

/// Parses an expression statement, turning it into an assignment when the
/// expression is followed by an assignment operator.
fn parse_expression_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = peek_line(tokens);
    let expr = parse_expression(tokens)?;

    let statement = match tokens.peek().copied() {
        Some((Token::Equals, _)) => {
            tokens.next();
            Statement::Assign { target: to_assign_target(expr, line)?,
                                value: parse_expression(tokens)?,
                                line }
        },
        Some((Token::PlusPlus | Token::MinusMinus, _)) => {
            let delta = if matches!(tokens.next(), Some((Token::PlusPlus, _))) {
                1
            } else {
                -1
            };
            match expr {
                Expr::Variable { name, .. } => Statement::Increment { name, delta, line },
                _ => {
                    return Err(ParseError::Other { message: "'++' and '--' apply only to variables".to_string(),
                                                   line });
                },
            }
        },
        Some((token, _)) if compound_assign_operator(token).is_some() => {
            let op = tokens.next()
                           .and_then(|(token, _)| compound_assign_operator(token))
                           .ok_or(ParseError::UnexpectedEndOfInput { line })?;
            Statement::CompoundAssign { target: to_assign_target(expr, line)?,
                                        op,
                                        value: parse_expression(tokens)?,
                                        line }
        },
        _ => Statement::Expression { expr, line },
    };

    expect_semicolon(tokens)?;
    Ok(statement)
}

/// Converts the expression on the left of `=` into an assignment target.
///
/// # Errors
/// Returns `ParseError::Other` when the expression does not denote a
/// writable location.
fn to_assign_target(expr: Expr, line: usize) -> ParseResult<AssignTarget> {
    let invalid = || ParseError::Other { message: "Invalid assignment target".to_string(),
                                         line };

    match expr {
        Expr::Variable { name, .. } => Ok(AssignTarget::Name(name)),
        Expr::Index { .. } => {
            let mut indices = Vec::new();
            let mut current = expr;
            loop {
                match current {
                    Expr::Index { target, index, .. } => {
                        indices.push(*index);
                        current = *target;
                    },
                    Expr::Variable { name, .. } => {
                        indices.reverse();
                        return Ok(AssignTarget::Index { name, indices });
                    },
                    _ => return Err(invalid()),
                }
            }
        },
        Expr::ObjectIndex { target, key, .. } => match *target {
            Expr::Variable { name, .. } => Ok(AssignTarget::ObjectKey { name, key: *key }),
            _ => Err(invalid()),
        },
        Expr::MemberChain { receiver,
                            mut segments,
                            .. } => {
            let (Some(Member::Field { name: field }), true) = (segments.pop(), segments.is_empty())
            else {
                return Err(invalid());
            };
            match *receiver {
                Expr::Variable { name, .. } => Ok(AssignTarget::Member { receiver: name,
                                                                         field }),
                Expr::This { .. } => Ok(AssignTarget::ThisField(field)),
                _ => Err(invalid()),
            }
        },
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ast::BinaryOperator, interpreter::lexer::tokenize};

    fn parse(source: &str) -> Statement {
        let tokens = tokenize(source).unwrap();
        parse_statement(&mut tokens.iter().peekable()).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let tokens = tokenize(source).unwrap();
        parse_statement(&mut tokens.iter().peekable()).unwrap_err()
    }

    #[test]
    fn typed_let_records_its_annotation() {
        let Statement::Let { name, type_name, .. } = parse("let x: int = 1;") else {
            panic!("expected let");
        };
        assert_eq!(name, "x");
        assert_eq!(type_name.as_deref(), Some("int"));
    }

    #[test]
    fn list_destructuring_skips_underscores() {
        let Statement::DestructureList { names, .. } = parse("let [a, _, b] = xs;") else {
            panic!("expected list destructuring");
        };
        assert_eq!(names, vec![Some("a".to_string()), None, Some("b".to_string())]);
    }

    #[test]
    fn nested_index_assignment_collects_indices_in_order() {
        let Statement::Assign { target: AssignTarget::Index { name, indices },
                                .. } = parse("grid[1][2] = 0;")
        else {
            panic!("expected index assignment");
        };
        assert_eq!(name, "grid");
        assert_eq!(indices.len(), 2);
        assert!(matches!(indices[0], Expr::Literal { .. }));
    }

    #[test]
    fn member_targets_distinguish_this() {
        assert!(matches!(parse("this->X = 1;"),
                         Statement::Assign { target: AssignTarget::ThisField(_), .. }));
        assert!(matches!(parse("a->X += 1;"),
                         Statement::CompoundAssign { target: AssignTarget::Member { .. },
                                                     op: BinaryOperator::Add,
                                                     .. }));
    }

    #[test]
    fn increment_and_decrement() {
        assert!(matches!(parse("i++;"), Statement::Increment { delta: 1, .. }));
        assert!(matches!(parse("i--;"), Statement::Increment { delta: -1, .. }));
    }

    #[test]
    fn calls_are_not_assignable() {
        assert!(matches!(parse_err("f() = 1;"), ParseError::Other { .. }));
    }

    #[test]
    fn missing_semicolon_is_reported() {
        assert!(matches!(parse_err("let x = 1 let"), ParseError::Expected { .. }));
    }
}
