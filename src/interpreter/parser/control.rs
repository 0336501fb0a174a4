use std::iter::Peekable;

use crate::{
    ast::{CatchClause, Expr, Statement},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            block::parse_block,
            core::{ParseResult, parse_expression},
            utils::{check, consume_if, expect, expect_semicolon, parse_identifier},
        },
    },
};

/// Tests whether an `if` token starts a block statement rather than a
/// conditional expression.
///
/// The condition's parentheses are skipped, balancing nested ones; the
/// statement form continues with `{`, the expression form with a value.
pub(in crate::interpreter::parser) fn is_if_statement<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut lookahead = tokens.clone();
    lookahead.next();
    if !matches!(lookahead.next(), Some((Token::LParen, _))) {
        return false;
    }

    let mut depth = 1usize;
    while depth > 0 {
        match lookahead.next() {
            Some((Token::LParen, _)) => depth += 1,
            Some((Token::RParen, _)) => depth -= 1,
            Some(_) => {},
            None => return false,
        }
    }
    matches!(lookahead.next(), Some((Token::LBrace, _)))
}

/// Parses a parenthesised condition: `"(" expression ")"`.
fn parse_condition<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LParen, "'('")?;
    let condition = parse_expression(tokens)?;
    expect(tokens, &Token::RParen, "')'")?;
    Ok(condition)
}

/// Parses an `if` statement with its `elif` and `else` branches.
///
/// `else if (c) { }` is accepted as a synonym for `elif (c) { }`.
///
/// Grammar:
/// ```text
///     if := "if" condition block
///           (("elif" | "else" "if") condition block)*
///           ("else" block)?
/// ```
pub(in crate::interpreter::parser) fn parse_if<'a, I>(tokens: &mut Peekable<I>)
                                                      -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::If, "'if'")?;
    let mut branches = vec![(parse_condition(tokens)?, parse_block(tokens)?)];
    let mut else_branch = None;

    loop {
        if consume_if(tokens, &Token::Elif) {
            branches.push((parse_condition(tokens)?, parse_block(tokens)?));
            continue;
        }
        if consume_if(tokens, &Token::Else) {
            if consume_if(tokens, &Token::If) {
                branches.push((parse_condition(tokens)?, parse_block(tokens)?));
                continue;
            }
            else_branch = Some(parse_block(tokens)?);
        }
        break;
    }

    Ok(Statement::If { branches,
                       else_branch,
                       line })
}

/// Parses `loop (condition) { body }`.
pub(in crate::interpreter::parser) fn parse_loop<'a, I>(tokens: &mut Peekable<I>)
                                                        -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Loop, "'loop'")?;
    let condition = parse_condition(tokens)?;
    let body = parse_block(tokens)?;

    Ok(Statement::Loop { condition,
                         body,
                         line })
}

/// Parses `do { body } while (condition);`.
pub(in crate::interpreter::parser) fn parse_do_while<'a, I>(tokens: &mut Peekable<I>)
                                                            -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Do, "'do'")?;
    let body = parse_block(tokens)?;
    expect(tokens, &Token::While, "'while' after do block")?;
    let condition = parse_condition(tokens)?;
    expect_semicolon(tokens)?;

    Ok(Statement::DoWhile { body,
                            condition,
                            line })
}

/// Parses both `for` forms.
///
/// - `for (x in iterable) { }` iterates a list, string, set or object keys.
/// - `for (i : start to end) { }` counts over an inclusive integer range.
pub(in crate::interpreter::parser) fn parse_for<'a, I>(tokens: &mut Peekable<I>)
                                                       -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::For, "'for'")?;
    expect(tokens, &Token::LParen, "'(' after 'for'")?;
    let var = parse_identifier(tokens)?;

    match tokens.next() {
        Some((Token::In, _)) => {
            let iterable = parse_expression(tokens)?;
            expect(tokens, &Token::RParen, "')'")?;
            let body = parse_block(tokens)?;
            Ok(Statement::ForIn { var,
                                  iterable,
                                  body,
                                  line })
        },
        Some((Token::Colon, _)) => {
            let start = parse_expression(tokens)?;
            expect(tokens, &Token::To, "'to'")?;
            let end = parse_expression(tokens)?;
            expect(tokens, &Token::RParen, "')'")?;
            let body = parse_block(tokens)?;
            Ok(Statement::ForRange { var,
                                     start,
                                     end,
                                     body,
                                     line })
        },
        Some((tok, line)) => Err(ParseError::Expected { expected: "'in' or ':'".to_string(),
                                                        found:    format!("{tok:?}"),
                                                        line:     *line, }),
        None => Err(ParseError::UnexpectedEndOfInput { line }),
    }
}

/// Parses `switch (subject) { case (value) { } ... default { } }`.
///
/// The `default` clause is optional and may appear once, anywhere among the
/// cases.
pub(in crate::interpreter::parser) fn parse_switch<'a, I>(tokens: &mut Peekable<I>)
                                                          -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Switch, "'switch'")?;
    let subject = parse_condition(tokens)?;
    expect(tokens, &Token::LBrace, "'{'")?;

    let mut cases = Vec::new();
    let mut default = None;

    loop {
        match tokens.next() {
            Some((Token::RBrace, _)) => break,
            Some((Token::Case, _)) => {
                let value = parse_condition(tokens)?;
                cases.push((value, parse_block(tokens)?));
            },
            Some((Token::Default, default_line)) => {
                if default.is_some() {
                    return Err(ParseError::Other { message: "Duplicate default clause".to_string(),
                                                   line:    *default_line, });
                }
                default = Some(parse_block(tokens)?);
            },
            Some((tok, line)) => {
                return Err(ParseError::Expected { expected: "'case', 'default' or '}'".to_string(),
                                                  found:    format!("{tok:?}"),
                                                  line:     *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(Statement::Switch { subject,
                           cases,
                           default,
                           line })
}

/// Parses `try { } catch (Kind) { } ... finally { }`.
///
/// A `catch` without a parenthesised kind handles every error, the same as
/// `catch (Exception)`. At least one `catch` or a `finally` is required.
pub(in crate::interpreter::parser) fn parse_try<'a, I>(tokens: &mut Peekable<I>)
                                                       -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Try, "'try'")?;
    let body = parse_block(tokens)?;

    let mut handlers = Vec::new();
    while consume_if(tokens, &Token::Catch) {
        let kind = if check(tokens, &Token::LParen) {
            tokens.next();
            let kind = parse_identifier(tokens)?;
            expect(tokens, &Token::RParen, "')'")?;
            kind
        } else {
            "Exception".to_string()
        };
        handlers.push(CatchClause { kind,
                                    body: parse_block(tokens)? });
    }

    let finally = if consume_if(tokens, &Token::Finally) {
        Some(parse_block(tokens)?)
    } else {
        None
    };

    if handlers.is_empty() && finally.is_none() {
        return Err(ParseError::Other { message: "'try' needs a 'catch' or 'finally' clause".to_string(),
                                       line });
    }

    Ok(Statement::TryCatch { body,
                             handlers,
                             finally,
                             line })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::statement::parse_statement};

    fn parse(source: &str) -> Statement {
        let tokens = tokenize(source).unwrap();
        parse_statement(&mut tokens.iter().peekable()).unwrap()
    }

    #[test]
    fn else_if_is_folded_into_branches() {
        let Statement::If { branches,
                            else_branch,
                            .. } = parse("if (a) { x = 1; } elif (b) { } else if (c) { } else { }")
        else {
            panic!("expected if statement");
        };
        assert_eq!(branches.len(), 3);
        assert!(else_branch.is_some());
    }

    #[test]
    fn if_expression_is_not_a_statement() {
        assert!(matches!(parse("if (a) 1 : 2;"), Statement::Expression { .. }));
    }

    #[test]
    fn both_for_forms_parse() {
        assert!(matches!(parse("for (x in xs) { }"), Statement::ForIn { .. }));
        assert!(matches!(parse("for (i : 1 to 10) { }"), Statement::ForRange { .. }));
    }

    #[test]
    fn switch_collects_cases_and_default() {
        let Statement::Switch { cases, default, .. } =
            parse("switch (x) { case (1) { } case (2) { } default { } }")
        else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert!(default.is_some());
    }

    #[test]
    fn bare_catch_handles_everything() {
        let Statement::TryCatch { handlers, .. } = parse("try { } catch { }") else {
            panic!("expected try");
        };
        assert_eq!(handlers[0].kind, "Exception");
    }
}
