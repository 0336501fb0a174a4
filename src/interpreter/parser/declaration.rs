use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{
        Annotations, ClassDef, EnumDef, FieldDef, FunctionDef, InterfaceDef, InterfaceMethod, StructDef,
        Statement,
    },
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            block::parse_block,
            core::{ParseResult, parse_expression},
            utils::{
                check, consume_if, expect, expect_semicolon, parse_comma_separated,
                parse_identifier, parse_params, parse_type_annotation, peek_line,
            },
        },
    },
};

/// Parses an optional return type written between a parameter list and the
/// body or terminator, as in `def f(x) int { ... }`.
fn parse_return_type<'a, I>(tokens: &mut Peekable<I>) -> Option<String>
    where I: Iterator<Item = &'a (Token, usize)>
{
    if let Some((Token::Identifier(name), _)) = tokens.peek() {
        let name = name.clone();
        tokens.next();
        return Some(name);
    }
    None
}

/// Parses the part of a function definition after `def`: name, parameters,
/// optional return type and body.
fn parse_function_def<'a, I>(tokens: &mut Peekable<I>,
                             is_static: bool,
                             annotations: Annotations)
                             -> ParseResult<FunctionDef>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Def, "'def'")?;
    let name = parse_identifier(tokens)?;
    let params = parse_params(tokens)?;
    let return_type = parse_return_type(tokens);
    let body = parse_block(tokens)?;

    Ok(FunctionDef { name,
                     params,
                     return_type,
                     body,
                     is_static,
                     annotations,
                     line })
}

/// Parses any number of `@annotation(key = value, ...)` prefixes. Later
/// keys replace earlier ones.
///
/// Grammar: `annotation := "@" "annotation" "(" (identifier "=" expression ","?)* ")"`
pub(in crate::interpreter::parser) fn parse_annotations<'a, I>(tokens: &mut Peekable<I>)
                                                               -> ParseResult<Annotations>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut annotations: Annotations = Vec::new();
    while let Some((Token::At, line)) = tokens.peek() {
        let line = *line;
        tokens.next();
        let keyword = parse_identifier(tokens)?;
        if keyword != "annotation" {
            return Err(ParseError::Expected { expected: "'annotation' after '@'".to_string(),
                                              found: keyword,
                                              line });
        }
        expect(tokens, &Token::LParen, "'(' after 'annotation'")?;
        while !consume_if(tokens, &Token::RParen) {
            let key = parse_identifier(tokens)?;
            expect(tokens, &Token::Equals, "'=' in annotation")?;
            let value = parse_expression(tokens)?;
            annotations.retain(|(existing, _)| *existing != key);
            annotations.push((key, value));
            if !check(tokens, &Token::RParen) {
                expect(tokens, &Token::Comma, "',' or ')' in annotation")?;
            }
        }
    }
    Ok(annotations)
}

/// Parses a named function declaration, with any annotations before it.
///
/// Grammar: `function := annotation* "def" identifier params identifier? block`
///
/// # Example
/// ```
/// use fight::{
///     ast::Statement,
///     interpreter::{lexer::tokenize, parser::core::parse_program},
/// };
///
/// let tokens = tokenize("def add(a: int, b: int = 1) int { return a + b; }").unwrap();
/// let program = parse_program(&mut tokens.iter().peekable()).unwrap();
/// let Statement::Function(def) = &program[0] else { panic!() };
/// assert_eq!(def.params.len(), 2);
/// assert_eq!(def.return_type.as_deref(), Some("int"));
/// ```
pub(in crate::interpreter::parser) fn parse_function_declaration<'a, I>(
    tokens: &mut Peekable<I>)
    -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let annotations = parse_annotations(tokens)?;
    Ok(Statement::Function(Rc::new(parse_function_def(tokens, false, annotations)?)))
}

/// Parses a class declaration.
///
/// The body contains `fields { }`, `methods { }` and `init(...) { }`
/// sections in any order; every section may appear more than once.
///
/// Grammar:
/// ```text
///     class   := "class" identifier ("extends" identifier)?
///                ("implements" identifier ("," identifier)*)? "{" section* "}"
///     section := "fields" "{" field* "}"
///              | "methods" "{" (annotation* "static"? function)* "}"
///              | "init" params block
///     field   := annotation* "static"? identifier (":" identifier)? "=" expression ";"
/// ```
pub(in crate::interpreter::parser) fn parse_class<'a, I>(tokens: &mut Peekable<I>)
                                                         -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Class, "'class'")?;
    let name = parse_identifier(tokens)?;

    let parent = if consume_if(tokens, &Token::Extends) {
        Some(parse_identifier(tokens)?)
    } else {
        None
    };

    let mut interfaces = Vec::new();
    if consume_if(tokens, &Token::Implements) {
        interfaces.push(parse_identifier(tokens)?);
        while consume_if(tokens, &Token::Comma) {
            interfaces.push(parse_identifier(tokens)?);
        }
    }

    expect(tokens, &Token::LBrace, "'{' after class header")?;

    let mut class = ClassDef { name,
                               parent,
                               interfaces,
                               fields: Vec::new(),
                               methods: Vec::new(),
                               inits: Vec::new(),
                               line };

    loop {
        match tokens.peek() {
            Some((Token::RBrace, _)) => {
                tokens.next();
                break;
            },
            Some((Token::Semicolon, _)) => {
                tokens.next();
            },
            Some((Token::Fields, _)) => {
                tokens.next();
                parse_fields_section(tokens, &mut class.fields)?;
            },
            Some((Token::Methods, _)) => {
                tokens.next();
                parse_methods_section(tokens, &mut class.methods)?;
            },
            Some((Token::Init, init_line)) => {
                let init_line = *init_line;
                tokens.next();
                let params = parse_params(tokens)?;
                let body = parse_block(tokens)?;
                class.inits.push(Rc::new(FunctionDef { name: "init".to_string(),
                                                       params,
                                                       return_type: None,
                                                       body,
                                                       is_static: false,
                                                       annotations: Vec::new(),
                                                       line: init_line }));
            },
            Some((tok, line)) => {
                return Err(ParseError::Expected { expected: "'fields', 'methods' or 'init'".to_string(),
                                                  found:    format!("{tok:?}"),
                                                  line:     *line, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(Statement::Class(Rc::new(class)))
}

/// Parses the braces of a `fields` section.
fn parse_fields_section<'a, I>(tokens: &mut Peekable<I>, fields: &mut Vec<FieldDef>) -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::LBrace, "'{' after 'fields'")?;

    loop {
        if consume_if(tokens, &Token::RBrace) {
            return Ok(());
        }
        if consume_if(tokens, &Token::Semicolon) {
            continue;
        }
        if tokens.peek().is_none() {
            return Err(ParseError::UnexpectedEndOfInput { line });
        }

        let annotations = parse_annotations(tokens)?;
        let field_line = peek_line(tokens);
        let is_static = consume_if(tokens, &Token::Static);
        let name = parse_identifier(tokens)?;
        let type_name = parse_type_annotation(tokens)?;
        expect(tokens, &Token::Equals, "'=' in field declaration")?;
        let value = parse_expression(tokens)?;
        expect_semicolon(tokens)?;

        fields.push(FieldDef { name,
                               type_name,
                               value,
                               is_static,
                               annotations,
                               line: field_line });
    }
}

/// Parses the braces of a `methods` section.
fn parse_methods_section<'a, I>(tokens: &mut Peekable<I>,
                                methods: &mut Vec<Rc<FunctionDef>>)
                                -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::LBrace, "'{' after 'methods'")?;

    loop {
        if consume_if(tokens, &Token::RBrace) {
            return Ok(());
        }
        if consume_if(tokens, &Token::Semicolon) {
            continue;
        }
        if tokens.peek().is_none() {
            return Err(ParseError::UnexpectedEndOfInput { line });
        }

        let annotations = parse_annotations(tokens)?;
        let is_static = consume_if(tokens, &Token::Static);
        methods.push(Rc::new(parse_function_def(tokens, is_static, annotations)?));
    }
}

/// Parses an interface declaration.
///
/// Each entry is a method prototype: `Name(params) ReturnType?;`.
pub(in crate::interpreter::parser) fn parse_interface<'a, I>(tokens: &mut Peekable<I>)
                                                             -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Interface, "'interface'")?;
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::LBrace, "'{'")?;

    let mut methods = Vec::new();
    loop {
        if consume_if(tokens, &Token::RBrace) {
            break;
        }
        if consume_if(tokens, &Token::Semicolon) {
            continue;
        }
        if tokens.peek().is_none() {
            return Err(ParseError::UnexpectedEndOfInput { line });
        }

        consume_if(tokens, &Token::Def);
        let method_name = parse_identifier(tokens)?;
        let params = parse_params(tokens)?;
        let return_type = parse_return_type(tokens);
        methods.push(InterfaceMethod { name: method_name,
                                       params,
                                       return_type });
    }

    Ok(Statement::Interface(InterfaceDef { name, methods, line }))
}

/// Parses `struct Name { field: Type, other }`.
///
/// Fields are separated by commas or semicolons; the type is optional.
pub(in crate::interpreter::parser) fn parse_struct<'a, I>(tokens: &mut Peekable<I>)
                                                          -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Struct, "'struct'")?;
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::LBrace, "'{'")?;

    let mut fields: Vec<(String, Option<String>)> = Vec::new();
    loop {
        if consume_if(tokens, &Token::RBrace) {
            break;
        }
        if consume_if(tokens, &Token::Comma) || consume_if(tokens, &Token::Semicolon) {
            continue;
        }
        let field_line = peek_line(tokens);
        let field = parse_identifier(tokens)?;
        if fields.iter().any(|(existing, _)| *existing == field) {
            return Err(ParseError::Other { message: format!("Duplicate field '{field}' in struct '{name}'"),
                                           line:    field_line, });
        }
        let type_name = parse_type_annotation(tokens)?;
        fields.push((field, type_name));

        if !check(tokens, &Token::RBrace)
           && !check(tokens, &Token::Comma)
           && !check(tokens, &Token::Semicolon)
        {
            return Err(ParseError::Expected { expected: "',' or '}'".to_string(),
                                              found:    tokens.peek()
                                                              .map_or_else(|| "end of input".to_string(),
                                                                           |(tok, _)| format!("{tok:?}")),
                                              line:     peek_line(tokens), });
        }
    }

    Ok(Statement::Struct(StructDef { name, fields, line }))
}

/// Parses `enum Name { A, B, C }`.
pub(in crate::interpreter::parser) fn parse_enum<'a, I>(tokens: &mut Peekable<I>)
                                                        -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = expect(tokens, &Token::Enum, "'enum'")?;
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::LBrace, "'{'")?;
    let members = parse_comma_separated(tokens, parse_identifier, &Token::RBrace)?;

    Ok(Statement::Enum(EnumDef { name, members, line }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::core::parse_program};

    fn parse(source: &str) -> Vec<Statement> {
        let tokens = tokenize(source).unwrap();
        parse_program(&mut tokens.iter().peekable()).unwrap()
    }

    #[test]
    fn annotations_attach_to_the_next_declaration() {
        let program = parse(r#"
            @annotation(route = "/add", arity = 2)
            def add(a, b) { return a + b; }
            class A {
                fields {
                    @annotation(column = "id") @annotation(primary = true)
                    Id = 0;
                }
                methods {
                    @annotation(pure = true)
                    static def Make() A { return new A(); }
                }
            }"#);
        let Statement::Function(def) = &program[0] else { panic!("expected function") };
        let keys = def.annotations.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["route", "arity"]);

        let Statement::Class(class) = &program[1] else { panic!("expected class") };
        assert_eq!(class.fields[0].annotations.len(), 2);
        assert!(class.methods[0].is_static);
        assert_eq!(class.methods[0].annotations[0].0, "pure");
    }

    #[test]
    fn annotations_need_the_keyword_and_a_declaration() {
        for source in ["@note(a = 1) def f() { }", "@annotation(a = 1) let x = 1;", "@annotation(a) def f() { }"] {
            let tokens = tokenize(source).unwrap();
            assert!(parse_program(&mut tokens.iter().peekable()).is_err(), "{source}");
        }
    }

    #[test]
    fn class_sections_are_collected() {
        let program = parse(r"
            class A extends B implements I, J {
                fields { X: int = 10; static COUNT = 0; }
                methods {
                    def Inc(n: int = 1) void { X += n; }
                    static def Make() A { return new A(); }
                }
                init() { }
                init(a, b) { super(Name = a); X = b; }
            }");
        let Statement::Class(class) = &program[0] else {
            panic!("expected class");
        };
        assert_eq!(class.parent.as_deref(), Some("B"));
        assert_eq!(class.interfaces, vec!["I".to_string(), "J".to_string()]);
        assert_eq!(class.fields.len(), 2);
        assert!(class.fields[1].is_static);
        assert_eq!(class.methods.len(), 2);
        assert!(class.methods[1].is_static);
        assert_eq!(class.inits.len(), 2);
        assert_eq!(class.methods[0].return_type.as_deref(), Some("void"));
    }

    #[test]
    fn interface_prototypes_keep_types() {
        let program = parse("interface Shape { Draw(); Area(scale: float) float; }");
        let Statement::Interface(interface) = &program[0] else {
            panic!("expected interface");
        };
        assert_eq!(interface.methods.len(), 2);
        assert_eq!(interface.methods[1].return_type.as_deref(), Some("float"));
        assert_eq!(interface.methods[1].params[0].type_name.as_deref(), Some("float"));
    }

    #[test]
    fn struct_fields_accept_both_separators() {
        let program = parse("struct P { x: int, y; z }");
        let Statement::Struct(def) = &program[0] else {
            panic!("expected struct");
        };
        assert_eq!(def.fields,
                   vec![("x".to_string(), Some("int".to_string())),
                        ("y".to_string(), None),
                        ("z".to_string(), None)]);
    }

    #[test]
    fn enum_members_in_order() {
        let program = parse("enum Color { Red, Green, Blue }");
        let Statement::Enum(def) = &program[0] else {
            panic!("expected enum");
        };
        assert_eq!(def.members, vec!["Red", "Green", "Blue"]);
    }
}
