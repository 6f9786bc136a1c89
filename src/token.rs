use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Token {
    pub value: Value,
    pub kind: Kind,
    pub line: usize,
}

impl Token {
    pub fn new(value: impl Into<Value>, kind: Kind, line: usize) -> Self {
        Self {
            value: value.into(),
            kind,
            line,
        }
    }
}

/// Scan-mode output line: `x, IDENTIFIER`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}", self.value, self.kind)
    }
}

/// Integer for NUMBER tokens, the raw lexeme for everything else.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(u64),
    Text(String),
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Kind {
    // Reserved words
    If,
    Then,
    Else,
    End,
    Repeat,
    Until,
    Read,
    Write,

    // Special symbols
    Plus,        // +
    Minus,       // -
    Times,       // *
    Divide,      // /
    Equal,       // =
    Less,        // <
    LParen,      // (
    RParen,      // )
    Semi,        // ;
    Assign,      // :=

    Identifier,
    Number,
}

impl Kind {
    pub fn keyword(ident: &str) -> Option<Kind> {
        match ident {
            "if" => Some(Kind::If),
            "then" => Some(Kind::Then),
            "else" => Some(Kind::Else),
            "end" => Some(Kind::End),
            "repeat" => Some(Kind::Repeat),
            "until" => Some(Kind::Until),
            "read" => Some(Kind::Read),
            "write" => Some(Kind::Write),
            _ => None,
        }
    }

    /// Single-character symbols only; `:=` is recognised by the lexer's
    /// assign state.
    pub fn symbol(ch: char) -> Option<Kind> {
        match ch {
            '+' => Some(Kind::Plus),
            '-' => Some(Kind::Minus),
            '*' => Some(Kind::Times),
            '/' => Some(Kind::Divide),
            '=' => Some(Kind::Equal),
            '<' => Some(Kind::Less),
            '(' => Some(Kind::LParen),
            ')' => Some(Kind::RParen),
            ';' => Some(Kind::Semi),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::If => "IF",
            Kind::Then => "THEN",
            Kind::Else => "ELSE",
            Kind::End => "END",
            Kind::Repeat => "REPEAT",
            Kind::Until => "UNTIL",
            Kind::Read => "READ",
            Kind::Write => "WRITE",
            Kind::Plus => "PLUS",
            Kind::Minus => "MINUS",
            Kind::Times => "TIMES",
            Kind::Divide => "DIVIDE",
            Kind::Equal => "EQUAL",
            Kind::Less => "LESS",
            Kind::LParen => "LPAREN",
            Kind::RParen => "RPAREN",
            Kind::Semi => "SEMI",
            Kind::Assign => "ASSIGN",
            Kind::Identifier => "IDENTIFIER",
            Kind::Number => "NUMBER",
        }
    }

    /// Short form used when tagging a failed `expect`, e.g. `expect then`.
    pub fn lexeme(&self) -> &'static str {
        match self {
            Kind::If => "if",
            Kind::Then => "then",
            Kind::Else => "else",
            Kind::End => "end",
            Kind::Repeat => "repeat",
            Kind::Until => "until",
            Kind::Read => "read",
            Kind::Write => "write",
            Kind::Plus => "+",
            Kind::Minus => "-",
            Kind::Times => "*",
            Kind::Divide => "/",
            Kind::Equal => "=",
            Kind::Less => "<",
            Kind::LParen => "(",
            Kind::RParen => ")",
            Kind::Semi => ";",
            Kind::Assign => ":=",
            Kind::Identifier => "id",
            Kind::Number => "num",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
