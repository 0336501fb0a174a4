use logos::Logos;

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Floating-point literal tokens, such as `3.14`.
    #[regex(r"[0-9]+\.[0-9]+", parse_float)]
    Float(f64),
    /// Integer literal tokens, such as `42`.
    #[regex(r"[0-9]+", parse_integer)]
    Integer(i64),
    /// String literal tokens, such as `"hello ${name}"`.
    #[regex(r#""([^"\\]|\\["\\ntr0])*""#, parse_string)]
    Str(String),
    /// Boolean literal tokens. Both `true` and `True` are accepted.
    #[token("true", |_| true)]
    #[token("True", |_| true)]
    #[token("false", |_| false)]
    #[token("False", |_| false)]
    Bool(bool),
    /// `let`
    #[token("let")]
    Let,
    /// `const`
    #[token("const")]
    Const,
    /// `def`
    #[token("def")]
    Def,
    /// `lambda`
    #[token("lambda")]
    Lambda,
    /// `return`
    #[token("return")]
    Return,
    /// `if`
    #[token("if")]
    If,
    /// `elif`
    #[token("elif")]
    Elif,
    /// `else`
    #[token("else")]
    Else,
    /// `loop`
    #[token("loop")]
    Loop,
    /// `do`
    #[token("do")]
    Do,
    /// `while`
    #[token("while")]
    While,
    /// `break`
    #[token("break")]
    Break,
    /// `for`
    #[token("for")]
    For,
    /// `in`
    #[token("in")]
    In,
    /// `to`
    #[token("to")]
    To,
    /// `class`
    #[token("class")]
    Class,
    /// `init`
    #[token("init")]
    Init,
    /// `new`
    #[token("new")]
    New,
    /// `fields`
    #[token("fields")]
    Fields,
    /// `methods`
    #[token("methods")]
    Methods,
    /// `static`
    #[token("static")]
    Static,
    /// `this`
    #[token("this")]
    This,
    /// `super`
    #[token("super")]
    Super,
    /// `extends`
    #[token("extends")]
    Extends,
    /// `implements`
    #[token("implements")]
    Implements,
    /// `interface`
    #[token("interface")]
    Interface,
    /// `struct`
    #[token("struct")]
    Struct,
    /// `enum`
    #[token("enum")]
    Enum,
    /// `switch`
    #[token("switch")]
    Switch,
    /// `case`
    #[token("case")]
    Case,
    /// `default`
    #[token("default")]
    Default,
    /// `match`
    #[token("match")]
    Match,
    /// `try`
    #[token("try")]
    Try,
    /// `catch`
    #[token("catch")]
    Catch,
    /// `finally`
    #[token("finally")]
    Finally,
    /// `use`
    #[token("use")]
    Use,
    /// `from`
    #[token("from")]
    From,
    /// `exports`
    #[token("exports")]
    Exports,
    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `not`
    #[token("not")]
    Not,
    /// Identifier tokens; variable, function, or type names such as `x` or
    /// `Person`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `# Comments.`
    #[regex(r"#[^\n\r]*", logos::skip, allow_greedy = true)]
    Comment,
    /// ```
    /// /* Multi line comments. */
    /// ```
    #[regex(r"/\*([^*]|\*[^/])*\*/", |lex| {
        let comment      = lex.slice();
        let newlines     = comment.chars().filter(|&c| c == '\n').count();
        lex.extras.line += newlines;
        logos::Skip
    })]
    MultiLineComment,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*=`
    #[token("*=")]
    MulAssign,
    /// `/=`
    #[token("/=")]
    DivAssign,
    /// `++`
    #[token("++")]
    PlusPlus,
    /// `--`
    #[token("--")]
    MinusMinus,
    /// `->`
    #[token("->")]
    Arrow,
    /// `=>`
    #[token("=>")]
    FatArrow,
    /// `::`
    #[token("::")]
    DoubleColon,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `//`
    #[token("//")]
    DoubleSlash,
    /// `/`
    #[token("/")]
    Slash,
    /// `^`
    #[token("^")]
    Caret,
    /// `%`
    #[token("%")]
    Percent,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// `@`, which opens an annotation.
    #[token("@")]
    At,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// `=`
    #[token("=")]
    Equals,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `!`
    #[token("!")]
    Bang,
    /// Line breaks only advance the line counter.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        logos::Skip
    })]
    NewLine,
    /// Spaces, tabs, carriage returns and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number for error reporting and diagnostics.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

/// Parses a floating-point literal from the current token slice.
fn parse_float(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Parses an integer literal from the current token slice.
///
/// Literals that do not fit an `i64` fail to lex.
fn parse_integer(lex: &logos::Lexer<Token>) -> Option<i64> {
    lex.slice().parse().ok()
}

/// Strips the quotes of a string literal and resolves its escapes.
///
/// Recognized escapes are `\n`, `\t`, `\r`, `\0`, `\"` and `\\`. Line
/// breaks inside the literal advance the line counter.
fn parse_string(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    lex.extras.line += slice.chars().filter(|&c| c == '\n').count();

    let inner = &slice[1..slice.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => result.push(other),
            None => {},
        }
    }
    result
}

/// Converts source text into `(token, line)` pairs.
///
/// # Errors
/// Returns the offending slice and its line when a character sequence is not
/// part of the language.
///
/// # Example
/// ```
/// use fight::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("let x = 1;\nx++;").unwrap();
/// assert_eq!(tokens[0], (Token::Let, 1));
/// assert_eq!(tokens[5], (Token::Identifier("x".into()), 2));
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, (String, usize)> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras { line: 1 });

    while let Some(token) = lexer.next() {
        match token {
            Ok(tok) => tokens.push((tok, lexer.extras.line)),
            Err(()) => return Err((lexer.slice().to_string(), lexer.extras.line)),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn string_escapes_are_resolved() {
        let tokens = tokenize(r#""a\n\"b\"""#).unwrap();
        assert_eq!(tokens, vec![(Token::Str("a\n\"b\"".into()), 1)]);
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let tokens = tokenize("# first\n/* a\nb */ x").unwrap();
        assert_eq!(tokens, vec![(Token::Identifier("x".into()), 3)]);
    }

    #[test]
    fn floor_division_is_a_single_token() {
        let tokens = tokenize("7 // 2").unwrap();
        assert_eq!(tokens[1].0, Token::DoubleSlash);
    }

    #[test]
    fn unknown_character_is_reported() {
        assert_eq!(tokenize("let x = ~;"), Err(("~".to_string(), 1)));
    }

    #[test]
    fn annotations_start_with_at() {
        let tokens = tokenize("@annotation(id = 1)").unwrap();
        assert_eq!(tokens[0].0, Token::At);
        assert_eq!(tokens[1].0, Token::Identifier("annotation".into()));
    }
}
