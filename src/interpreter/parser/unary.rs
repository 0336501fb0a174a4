use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{BinaryOperator, Expr, FunctionDef, LiteralValue, MatchArm, Member, Param, Statement, UnaryOperator},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            binary::parse_additive,
            block::parse_block,
            core::{ParseResult, parse_expression},
            utils::{
                check, consume_if, expect, parse_call_args, parse_comma_separated,
                parse_identifier, parse_params, peek_line,
            },
        },
    },
};

/// Parses a unary expression.
///
/// Supports prefix operators:
/// - `-`  (numeric negation)
/// - `!` and `not` (logical not)
///
/// Unary operators are right-associative, so an input like `!-x` is parsed as
/// `!( -x )`. Exponentiation binds tighter than every prefix operator:
/// `-2 ^ 2` is `-(2 ^ 2)`.
///
/// Grammar:
/// ```text
///     unary := ("-" | "!" | "not") unary
///            | power
/// ```
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
///
/// # Returns
/// An [`Expr::UnaryOp`] or a power expression.
pub(crate) fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let op = match tokens.peek() {
        Some((Token::Minus, _)) => UnaryOperator::Negate,
        Some((Token::Bang | Token::Not, _)) => UnaryOperator::Not,
        _ => return parse_power(tokens),
    };
    let line = peek_line(tokens);
    tokens.next();

    let expr = parse_unary(tokens)?;
    Ok(Expr::UnaryOp { op,
                       expr: Box::new(expr),
                       line })
}

/// Parses exponentiation.
///
/// The exponent is a unary expression, which makes `^` right-associative:
/// `a ^ b ^ c` parses as `a ^ (b ^ c)` and `2 ^ -1` is accepted.
///
/// Grammar: `power := postfix ("^" unary)?`
fn parse_power<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let primary = parse_primary(tokens)?;
    let base = parse_postfix(tokens, primary)?;

    if let Some((Token::Caret, line)) = tokens.peek() {
        let line = *line;
        tokens.next();
        let exponent = parse_unary(tokens)?;
        return Ok(Expr::BinaryOp { left: Box::new(base),
                                   op: BinaryOperator::Pow,
                                   right: Box::new(exponent),
                                   line });
    }
    Ok(base)
}

/// Parses a primary (atomic) expression.
///
/// Primary expressions form the base of the expression grammar and include:
/// - numeric, string and boolean literals
/// - identifiers, struct literals, set literals and generators
/// - parenthesized expressions
/// - list and object literals
/// - anonymous functions (`def (...) { }` and `lambda x: e`)
/// - `new`, `this` and `enum::E::M`
/// - `if` and `match` expressions
///
/// This function does not handle unary operators or postfix operators.
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of a primary expression.
///
/// # Returns
/// The parsed primary [`Expr`] or a `ParseError` on failure.
pub(crate) fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (token, line) = tokens.peek()
                              .copied()
                              .ok_or(ParseError::UnexpectedEndOfInput { line: 0 })?;
    let line = *line;

    match token {
        Token::Integer(_) | Token::Float(_) | Token::Bool(_) | Token::Str(_) => parse_literal(tokens),
        Token::Identifier(_) => parse_identifier_expression(tokens),
        Token::LParen => {
            tokens.next();
            let expr = parse_expression(tokens)?;
            expect(tokens, &Token::RParen, "')'")?;
            Ok(expr)
        },
        Token::LBracket => {
            tokens.next();
            let elements = parse_comma_separated(tokens, parse_expression, &Token::RBracket)?;
            Ok(Expr::List { elements, line })
        },
        Token::LBrace => parse_object_literal(tokens),
        Token::Def => parse_anonymous_def(tokens),
        Token::Lambda => parse_lambda(tokens),
        Token::New => {
            tokens.next();
            let class = parse_identifier(tokens)?;
            expect(tokens, &Token::LParen, "'(' after class name")?;
            let args = parse_call_args(tokens)?;
            Ok(Expr::New { class, args, line })
        },
        Token::This => {
            tokens.next();
            Ok(Expr::This { line })
        },
        Token::Enum => {
            tokens.next();
            expect(tokens, &Token::DoubleColon, "'::' after 'enum'")?;
            let enum_name = parse_identifier(tokens)?;
            expect(tokens, &Token::DoubleColon, "'::' after enum name")?;
            let member = parse_identifier(tokens)?;
            Ok(Expr::EnumAccess { enum_name,
                                  member,
                                  line })
        },
        Token::If => parse_if_expression(tokens),
        Token::Match => parse_match(tokens),
        tok => Err(ParseError::UnexpectedToken { token: format!("{tok:?}"),
                                                 line }),
    }
}

/// Applies postfix operators to an already parsed expression.
///
/// Handles, repeatedly and in any order:
/// - calls `f(args)`, including curried calls `f(a)(b)`
/// - indexing `a[i]` and slicing `a[i:j]`, `a[:j]`, `a[i:]`
/// - object indexing `d{key}` on names and indexed names
/// - member chains `a->Field`, `a->m(args)`
/// - struct paths `p::x::y`
///
/// Consecutive `->` segments and consecutive `::` segments are folded into a
/// single [`Expr::MemberChain`] or [`Expr::StructAccess`] node.
fn parse_postfix<'a, I>(tokens: &mut Peekable<I>, mut node: Expr) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    loop {
        let Some((token, line)) = tokens.peek().copied() else {
            break;
        };
        let line = *line;

        match token {
            Token::LParen => {
                tokens.next();
                let args = parse_call_args(tokens)?;
                node = Expr::Call { callee: Box::new(node),
                                    args,
                                    line };
            },
            Token::LBracket => {
                tokens.next();
                node = parse_index_or_slice(tokens, node, line)?;
            },
            Token::LBrace
                if matches!(node,
                            Expr::Variable { .. } | Expr::Index { .. } | Expr::ObjectIndex { .. }) =>
            {
                tokens.next();
                let key = parse_expression(tokens)?;
                expect(tokens, &Token::RBrace, "'}' after object key")?;
                node = Expr::ObjectIndex { target: Box::new(node),
                                           key: Box::new(key),
                                           line };
            },
            Token::Arrow => {
                tokens.next();
                let name = parse_identifier(tokens)?;
                let member = if consume_if(tokens, &Token::LParen) {
                    Member::Call { name,
                                   args: parse_call_args(tokens)? }
                } else {
                    Member::Field { name }
                };
                node = match node {
                    Expr::MemberChain { receiver,
                                        mut segments,
                                        line, } => {
                        segments.push(member);
                        Expr::MemberChain { receiver,
                                            segments,
                                            line }
                    },
                    other => Expr::MemberChain { receiver: Box::new(other),
                                                 segments: vec![member],
                                                 line },
                };
            },
            Token::DoubleColon => {
                tokens.next();
                let field = parse_identifier(tokens)?;
                node = match node {
                    Expr::StructAccess { base, mut path, line } => {
                        path.push(field);
                        Expr::StructAccess { base, path, line }
                    },
                    other => Expr::StructAccess { base: Box::new(other),
                                                  path: vec![field],
                                                  line },
                };
            },
            _ => break,
        }
    }
    Ok(node)
}

/// Parses the inside of `[...]` after the opening bracket.
///
/// A colon anywhere at the top level turns the index into a slice; either
/// slice bound may be omitted.
fn parse_index_or_slice<'a, I>(tokens: &mut Peekable<I>,
                               target: Expr,
                               line: usize)
                               -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let start = if check(tokens, &Token::Colon) {
        None
    } else {
        Some(Box::new(parse_expression(tokens)?))
    };

    if consume_if(tokens, &Token::Colon) {
        let end = if check(tokens, &Token::RBracket) {
            None
        } else {
            Some(Box::new(parse_expression(tokens)?))
        };
        expect(tokens, &Token::RBracket, "']' after slice")?;
        return Ok(Expr::Slice { target: Box::new(target),
                                start,
                                end,
                                line });
    }

    expect(tokens, &Token::RBracket, "']' after index")?;
    match start {
        Some(index) => Ok(Expr::Index { target: Box::new(target),
                                        index,
                                        line }),
        None => Err(ParseError::Other { message: "Empty index".to_string(),
                                        line }),
    }
}

/// Parses a numeric, string or boolean literal.
fn parse_literal<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let value = match tokens.next() {
        Some((Token::Integer(n), line)) => (LiteralValue::Integer(*n), *line),
        Some((Token::Float(f), line)) => (LiteralValue::Float(*f), *line),
        Some((Token::Bool(b), line)) => (LiteralValue::Bool(*b), *line),
        Some((Token::Str(s), line)) => (LiteralValue::Str(s.clone()), *line),
        Some((tok, line)) => {
            return Err(ParseError::UnexpectedToken { token: format!("{tok:?}"),
                                                     line:  *line, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    };

    Ok(Expr::Literal { value: value.0,
                       line:  value.1, })
}

/// Parses an expression that starts with an identifier.
///
/// Supported forms:
///
/// - `set<a, b, c>`: a set literal,
/// - `generator[body; i = a to b]` and `generator[body; i = a to b, step]`,
/// - `Name{field: value, ...}` and `Name{}`: a struct literal,
/// - a plain variable reference otherwise.
///
/// Calls and every other suffix are handled by [`parse_postfix`].
fn parse_identifier_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = peek_line(tokens);
    let name = parse_identifier(tokens)?;

    if name == "set" && consume_if(tokens, &Token::Less) {
        let elements = parse_comma_separated(tokens, parse_additive, &Token::Greater)?;
        return Ok(Expr::SetLiteral { elements, line });
    }
    if name == "generator" && check(tokens, &Token::LBracket) {
        return parse_generator(tokens, line);
    }
    if check(tokens, &Token::LBrace) && starts_struct_literal(tokens) {
        tokens.next();
        let fields = parse_comma_separated(tokens, parse_field_init, &Token::RBrace)?;
        return Ok(Expr::StructLiteral { name, fields, line });
    }

    Ok(Expr::Variable { name, line })
}

/// Tests whether the `{` at the head of the stream opens a struct literal,
/// that is, whether it is followed by `}` or by `identifier :`.
fn starts_struct_literal<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut lookahead = tokens.clone();
    lookahead.next();
    match lookahead.next() {
        Some((Token::RBrace, _)) => true,
        Some((Token::Identifier(_), _)) => matches!(lookahead.next(), Some((Token::Colon, _))),
        _ => false,
    }
}

/// Parses one `name: value` field initialiser of a struct literal.
fn parse_field_init<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<(String, Expr)>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Colon, "':' after field name")?;
    Ok((name, parse_expression(tokens)?))
}

/// Parses `[body; var = start to end (, step)?]` after the `generator`
/// identifier.
fn parse_generator<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LBracket, "'['")?;
    let body = parse_expression(tokens)?;
    expect(tokens, &Token::Semicolon, "';' after generator body")?;
    let var = parse_identifier(tokens)?;
    expect(tokens, &Token::Equals, "'=' after generator variable")?;
    let start = parse_expression(tokens)?;
    expect(tokens, &Token::To, "'to'")?;
    let end = parse_expression(tokens)?;
    let step = if consume_if(tokens, &Token::Comma) {
        Some(Box::new(parse_expression(tokens)?))
    } else {
        None
    };
    expect(tokens, &Token::RBracket, "']' after generator")?;

    Ok(Expr::Generator { body: Box::new(body),
                         var,
                         start: Box::new(start),
                         end: Box::new(end),
                         step,
                         line })
}

/// Parses an object literal `{key: value, ...}`.
///
/// Keys are bare identifiers, string literals or integer literals; integer
/// keys are stored by their decimal text.
fn parse_object_literal<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::LBrace, "'{'")?;

    let parse_entry = |tokens: &mut Peekable<I>| -> ParseResult<(String, Expr)> {
        let key = match tokens.next() {
            Some((Token::Identifier(k) | Token::Str(k), _)) => k.clone(),
            Some((Token::Integer(n), _)) => n.to_string(),
            Some((tok, line)) => {
                return Err(ParseError::Expected { expected: "object key".to_string(),
                                                  found:    format!("{tok:?}"),
                                                  line:     *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        };
        expect(tokens, &Token::Colon, "':' after object key")?;
        Ok((key, parse_expression(tokens)?))
    };

    let entries = parse_comma_separated(tokens, parse_entry, &Token::RBrace)?;
    Ok(Expr::Object { entries, line })
}

/// Parses an anonymous function `def (params) [ReturnType] { body }`.
fn parse_anonymous_def<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Def, "'def'")?;
    let params = parse_params(tokens)?;
    let return_type = match tokens.peek() {
        Some((Token::Identifier(t), _)) => {
            let t = t.clone();
            tokens.next();
            Some(t)
        },
        _ => None,
    };
    let body = parse_block(tokens)?;

    let def = FunctionDef { name: "lambda".to_string(),
                            params,
                            return_type,
                            body,
                            is_static: false,
                            annotations: Vec::new(),
                            line };
    Ok(Expr::Lambda { def: Rc::new(def),
                      line })
}

/// Parses `lambda a, b: expression`.
///
/// The body is a single expression whose value is returned.
fn parse_lambda<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Lambda, "'lambda'")?;
    let mut params = Vec::new();

    if !consume_if(tokens, &Token::Colon) {
        loop {
            params.push(Param { name:      parse_identifier(tokens)?,
                                type_name: None,
                                default:   None, });
            if consume_if(tokens, &Token::Colon) {
                break;
            }
            expect(tokens, &Token::Comma, "',' or ':' in lambda parameters")?;
        }
    }

    let value = parse_expression(tokens)?;
    let def = FunctionDef { name: "lambda".to_string(),
                            params,
                            return_type: None,
                            body: vec![Statement::Return { value: Some(value),
                                                           line }],
                            is_static: false,
                            annotations: Vec::new(),
                            line };
    Ok(Expr::Lambda { def: Rc::new(def),
                      line })
}

/// Parses a conditional expression `if (condition) a : b`.
fn parse_if_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::If, "'if'")?;
    expect(tokens, &Token::LParen, "'(' after 'if'")?;
    let condition = parse_expression(tokens)?;
    expect(tokens, &Token::RParen, "')'")?;
    let then_branch = parse_expression(tokens)?;
    expect(tokens, &Token::Colon, "':' in conditional expression")?;
    let else_branch = parse_expression(tokens)?;

    Ok(Expr::IfExpr { condition: Box::new(condition),
                      then_branch: Box::new(then_branch),
                      else_branch: Box::new(else_branch),
                      line })
}

/// Parses `match (subject) { pattern => value, ... }`.
///
/// The catch-all arm is written `_ => value` or `else => value`. Commas
/// between arms are optional.
fn parse_match<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Match, "'match'")?;
    expect(tokens, &Token::LParen, "'(' after 'match'")?;
    let subject = parse_expression(tokens)?;
    expect(tokens, &Token::RParen, "')'")?;
    expect(tokens, &Token::LBrace, "'{'")?;

    let mut arms = Vec::new();
    loop {
        match tokens.peek() {
            Some((Token::RBrace, _)) => {
                tokens.next();
                break;
            },
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((Token::Else, _)) => {
                tokens.next();
                expect(tokens, &Token::FatArrow, "'=>'")?;
                arms.push(MatchArm { pattern: None,
                                     value:   parse_expression(tokens)?, });
            },
            Some((Token::Identifier(name), _)) if name == "_" => {
                tokens.next();
                expect(tokens, &Token::FatArrow, "'=>'")?;
                arms.push(MatchArm { pattern: None,
                                     value:   parse_expression(tokens)?, });
            },
            Some(_) => {
                let pattern = parse_expression(tokens)?;
                expect(tokens, &Token::FatArrow, "'=>'")?;
                arms.push(MatchArm { pattern: Some(pattern),
                                     value:   parse_expression(tokens)?, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(Expr::Match { subject: Box::new(subject),
                     arms,
                     line })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::lexer::tokenize;

    fn parse(source: &str) -> Expr {
        let tokens = tokenize(source).unwrap();
        parse_expression(&mut tokens.iter().peekable()).unwrap()
    }

    #[test]
    fn negation_applies_after_power() {
        let Expr::UnaryOp { op, expr, .. } = parse("-2 ^ 2") else {
            panic!("expected unary operation");
        };
        assert_eq!(op, UnaryOperator::Negate);
        assert!(matches!(*expr, Expr::BinaryOp { op: BinaryOperator::Pow, .. }));
    }

    #[test]
    fn member_segments_are_folded() {
        let Expr::MemberChain { segments, .. } = parse("a->B(1)->C") else {
            panic!("expected member chain");
        };
        assert_eq!(segments.len(), 2);
        assert!(matches!(&segments[1], Member::Field { name } if name == "C"));
    }

    #[test]
    fn struct_literal_and_object_index_are_distinguished() {
        assert!(matches!(parse("Point{x: 1, y: 2}"), Expr::StructLiteral { .. }));
        assert!(matches!(parse("d{key}"), Expr::ObjectIndex { .. }));
    }

    #[test]
    fn set_literal_stops_at_closing_angle() {
        let Expr::SetLiteral { elements, .. } = parse("set<1, 2 + 1>") else {
            panic!("expected set literal");
        };
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn slices_accept_open_bounds() {
        assert!(matches!(parse("xs[:2]"), Expr::Slice { start: None, end: Some(_), .. }));
        assert!(matches!(parse("xs[1:]"), Expr::Slice { start: Some(_), end: None, .. }));
    }

    #[test]
    fn lambda_returns_its_expression() {
        let Expr::Lambda { def, .. } = parse("lambda a, b: a + b") else {
            panic!("expected lambda");
        };
        assert_eq!(def.params.len(), 2);
        assert!(matches!(def.body[0], Statement::Return { value: Some(_), .. }));
    }

    #[test]
    fn match_accepts_both_catch_all_spellings() {
        let Expr::Match { arms, .. } = parse("match (x) { 1 => \"one\", _ => \"many\" }") else {
            panic!("expected match");
        };
        assert!(arms[1].pattern.is_none());
        assert!(matches!(parse("match (x) { else => 0 }"), Expr::Match { .. }));
    }
}
