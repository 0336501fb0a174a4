use std::iter::Peekable;

use crate::{
    ast::{CallArgs, Expr, Param},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, parse_expression},
    },
};

/// Consumes the next token if it equals `expected`.
///
/// # Returns
/// The line of the consumed token.
///
/// # Errors
/// Returns `ParseError::Expected` naming `what` when a different token is
/// found, or `UnexpectedEndOfInput` when the stream is exhausted.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    expected: &Token,
                                                    what: &str)
                                                    -> ParseResult<usize>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((tok, line)) if tok == expected => Ok(*line),
        Some((tok, line)) => Err(ParseError::Expected { expected: what.to_string(),
                                                        found:    format!("{tok:?}"),
                                                        line:     *line, }),
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Consumes the next token if it equals `token`.
///
/// # Returns
/// `true` when a token was consumed.
pub(in crate::interpreter::parser) fn consume_if<'a, I>(tokens: &mut Peekable<I>,
                                                        token: &Token)
                                                        -> bool
    where I: Iterator<Item = &'a (Token, usize)>
{
    if let Some((tok, _)) = tokens.peek()
       && tok == token
    {
        tokens.next();
        return true;
    }
    false
}

/// Tests whether the next token equals `token` without consuming it.
pub(in crate::interpreter::parser) fn check<'a, I>(tokens: &mut Peekable<I>, token: &Token) -> bool
    where I: Iterator<Item = &'a (Token, usize)>
{
    matches!(tokens.peek(), Some((tok, _)) if tok == token)
}

/// Returns the line of the next token, or `0` at the end of input.
pub(in crate::interpreter::parser) fn peek_line<'a, I>(tokens: &mut Peekable<I>) -> usize
    where I: Iterator<Item = &'a (Token, usize)>
{
    tokens.peek().map_or(0, |(_, l)| *l)
}

/// Consumes the `;` that terminates a simple statement.
///
/// The terminator may be omitted directly before a closing `}` or at the end
/// of input.
pub(in crate::interpreter::parser) fn expect_semicolon<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.peek() {
        Some((Token::Semicolon, _)) => {
            tokens.next();
            Ok(())
        },
        Some((Token::RBrace, _)) | None => Ok(()),
        Some((tok, line)) => Err(ParseError::Expected { expected: "';'".to_string(),
                                                        found:    format!("{tok:?}"),
                                                        line:     *line, }),
    }
}

/// Parses a comma-separated list of items until a closing token.
///
/// This utility is shared by list literals, parameter lists, argument lists,
/// and every parenthesised name list. It repeatedly calls `parse_item` to
/// parse one element, expecting either:
///
/// - a comma, to continue the list, or
/// - the specified closing token, to end it.
///
/// An immediately encountered closing token produces an empty list. A
/// trailing comma before the closing token is accepted.
///
/// Grammar (simplified): `list := item ("," item)* ","?`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item or closing token.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The token that terminates the list (e.g., `]` or `)`).
///
/// # Returns
/// A vector of parsed items.
///
/// # Errors
/// Returns a `ParseError` if:
/// - an item fails to parse,
/// - an unexpected token is encountered,
/// - the stream ends before the closing token.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    parse_item: impl Fn(&mut Peekable<I>) -> ParseResult<T>,
    closing: &Token)
    -> Result<Vec<T>, ParseError>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut items = Vec::new();
    if consume_if(tokens, closing) {
        return Ok(items);
    }
    loop {
        items.push(parse_item(tokens)?);
        match tokens.peek() {
            Some((Token::Comma, _)) => {
                tokens.next();
                if consume_if(tokens, closing) {
                    break;
                }
            },
            Some((tok, _)) if tok == closing => {
                tokens.next();
                break;
            },
            Some((tok, line)) => {
                return Err(ParseError::UnexpectedToken { token: format!("Expected ',' or {closing:?}, found {tok:?}"),
                                                         line:  *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
    }
    Ok(items)
}

/// Parses a plain identifier and returns its name.
///
/// The next token must be `Token::Identifier`.
///
/// # Errors
/// Returns a `ParseError` if:
/// - the next token is not an identifier,
/// - the input ends unexpectedly.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((Token::Identifier(s), _)) => Ok(s.clone()),
        Some((tok, line)) => {
            Err(ParseError::UnexpectedToken { token: format!("Expected identifier, found {tok:?}"),
                                              line:  *line, })
        },
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Parses a parenthesised, comma-separated list of identifiers, as used by
/// `use (a, b)` and `exports (a, b)`.
pub(in crate::interpreter::parser) fn parse_name_list<'a, I>(tokens: &mut Peekable<I>)
                                                             -> ParseResult<Vec<String>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LParen, "'('")?;
    parse_comma_separated(tokens, parse_identifier, &Token::RParen)
}

/// Parses an optional `: Type` annotation.
///
/// # Returns
/// `Some(type_name)` if a colon was present, `None` otherwise.
pub(in crate::interpreter::parser) fn parse_type_annotation<'a, I>(tokens: &mut Peekable<I>)
                                                                   -> ParseResult<Option<String>>
    where I: Iterator<Item = &'a (Token, usize)>
{
    if consume_if(tokens, &Token::Colon) {
        return parse_identifier(tokens).map(Some);
    }
    Ok(None)
}

/// Parses one parameter: `name`, `name: Type`, `name = default` or
/// `name: Type = default`.
pub(in crate::interpreter::parser) fn parse_param<'a, I>(tokens: &mut Peekable<I>)
                                                         -> ParseResult<Param>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let name = parse_identifier(tokens)?;
    let type_name = parse_type_annotation(tokens)?;
    let default = if consume_if(tokens, &Token::Equals) {
        Some(parse_expression(tokens)?)
    } else {
        None
    };

    Ok(Param { name,
               type_name,
               default })
}

/// Parses a parameter list including its parentheses.
///
/// # Errors
/// Returns `ParseError::Other` when a parameter without a default follows a
/// parameter with one.
pub(in crate::interpreter::parser) fn parse_params<'a, I>(tokens: &mut Peekable<I>)
                                                          -> ParseResult<Vec<Param>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::LParen, "'('")?;
    let params = parse_comma_separated(tokens, parse_param, &Token::RParen)?;

    let mut seen_default = false;
    for param in &params {
        if param.default.is_some() {
            seen_default = true;
        } else if seen_default {
            return Err(ParseError::Other { message: format!("Parameter '{}' without a default follows a defaulted parameter",
                                                            param.name),
                                           line });
        }
    }

    Ok(params)
}

/// Parses call arguments after the opening parenthesis has been consumed.
///
/// An argument of the form `name = expr` is named; every other argument is
/// positional. Positional arguments may not follow named ones.
///
/// Grammar: `args := (arg ("," arg)*)? ")"`, `arg := identifier "=" expression
/// | expression`
pub(in crate::interpreter::parser) fn parse_call_args<'a, I>(tokens: &mut Peekable<I>)
                                                             -> ParseResult<CallArgs>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    enum Arg {
        Positional(Expr),
        Named(String, Expr),
    }

    let parse_arg = |tokens: &mut Peekable<I>| -> ParseResult<Arg> {
        if let Some((Token::Identifier(name), _)) = tokens.peek() {
            let mut lookahead = tokens.clone();
            lookahead.next();
            if let Some((Token::Equals, _)) = lookahead.peek() {
                let name = name.clone();
                tokens.next();
                tokens.next();
                return Ok(Arg::Named(name, parse_expression(tokens)?));
            }
        }
        Ok(Arg::Positional(parse_expression(tokens)?))
    };

    let line = peek_line(tokens);
    let mut args = CallArgs::default();

    for arg in parse_comma_separated(tokens, parse_arg, &Token::RParen)? {
        match arg {
            Arg::Positional(expr) => {
                if !args.named.is_empty() {
                    return Err(ParseError::Other { message: "Positional argument follows named argument".to_string(),
                                                   line });
                }
                args.positional.push(expr);
            },
            Arg::Named(name, expr) => args.named.push((name, expr)),
        }
    }

    Ok(args)
}
