use crate::diagnostics::Reporter;
use crate::error::LexicalError;
use crate::token::{Kind, Token, Value};
use std::iter::FusedIterator;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InNumber,
    InIdentifier,
    InAssign,
    InComment,
}

/// Character-level scanner for TINY source.
///
/// The lexer is a small state machine pulled one token at a time. Number and
/// identifier boundaries are only known once the first character that does
/// not belong to the lexeme has been read, so that character is pushed back
/// and read again from `Start`. The input behaves as if it ended with one
/// extra blank, which flushes a lexeme still in progress at end of input.
pub struct Lexer<'a> {
    chars: Chars<'a>,
    pushback: Option<char>,
    padded: bool,
    finished: bool,
    line: usize,
    state: State,
    lexeme: String,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
            pushback: None,
            padded: false,
            finished: false,
            line: 1,
            state: State::Start,
            lexeme: String::new(),
        }
    }

    /// Line reached so far, 1-based.
    pub fn line(&self) -> usize {
        self.line
    }

    fn advance(&mut self) -> Option<char> {
        if let Some(ch) = self.pushback.take() {
            return Some(ch);
        }

        match self.chars.next() {
            Some(ch) => Some(ch),
            None if !self.padded => {
                self.padded = true;
                Some(' ')
            }
            None => None,
        }
    }

    fn push_back(&mut self, ch: char) {
        debug_assert!(self.pushback.is_none());
        self.pushback = Some(ch);
    }

    fn create_token(&self, kind: Kind, value: Value) -> Token {
        let token = Token {
            value,
            kind,
            line: self.line,
        };
        tracing::trace!(kind = %token.kind, value = %token.value, line = token.line, "scanned token");
        token
    }

    fn flush_number(&mut self, reporter: &mut Reporter) -> Token {
        let lexeme = std::mem::take(&mut self.lexeme);
        let value = match lexeme.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                reporter.report(self.line, LexicalError::NumberOutOfRange);
                u64::MAX
            }
        };
        self.create_token(Kind::Number, Value::Number(value))
    }

    fn flush_identifier(&mut self) -> Token {
        let lexeme = std::mem::take(&mut self.lexeme);
        let kind = Kind::keyword(&lexeme).unwrap_or(Kind::Identifier);
        self.create_token(kind, Value::Text(lexeme))
    }

    /// Pulls the next token, or `None` once the input is exhausted.
    ///
    /// Lexical errors go to `reporter` and scanning continues from `Start`.
    pub fn next_token(&mut self, reporter: &mut Reporter) -> Option<Token> {
        if self.finished {
            return None;
        }

        while let Some(ch) = self.advance() {
            match self.state {
                State::Start => match ch {
                    '\n' => self.line += 1,
                    ' ' | '\t' => {}
                    c if c.is_ascii_digit() => {
                        self.lexeme.push(c);
                        self.state = State::InNumber;
                    }
                    c if c.is_ascii_alphabetic() => {
                        self.lexeme.push(c);
                        self.state = State::InIdentifier;
                    }
                    ':' => self.state = State::InAssign,
                    '{' => self.state = State::InComment,
                    c => {
                        if let Some(kind) = Kind::symbol(c) {
                            return Some(self.create_token(kind, Value::Text(c.to_string())));
                        }
                        // Anything else is skipped without a diagnostic.
                    }
                },
                State::InNumber => {
                    if ch.is_ascii_digit() {
                        self.lexeme.push(ch);
                    } else {
                        self.push_back(ch);
                        self.state = State::Start;
                        return Some(self.flush_number(reporter));
                    }
                }
                State::InIdentifier => {
                    if ch.is_ascii_alphabetic() {
                        self.lexeme.push(ch);
                    } else {
                        self.push_back(ch);
                        self.state = State::Start;
                        return Some(self.flush_identifier());
                    }
                }
                State::InAssign => {
                    self.state = State::Start;
                    if ch == '=' {
                        return Some(self.create_token(Kind::Assign, Value::from(":=")));
                    }
                    reporter.report(self.line, LexicalError::IllegalCharacterAfterColon);
                    self.push_back(ch);
                }
                State::InComment => match ch {
                    '}' => self.state = State::Start,
                    '\n' => self.line += 1,
                    _ => {}
                },
            }
        }

        self.finished = true;
        if self.state == State::InComment {
            reporter.report(self.line, LexicalError::UnterminatedComment);
        }
        None
    }
}

/// Lazy token sequence over one source string. Not restartable: scanning
/// again means calling [`tokenize`] again.
pub struct Tokens<'a, 'r> {
    lexer: Lexer<'a>,
    reporter: &'r mut Reporter,
}

impl Iterator for Tokens<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.lexer.next_token(self.reporter)
    }
}

impl FusedIterator for Tokens<'_, '_> {}

pub fn tokenize<'a, 'r>(source: &'a str, reporter: &'r mut Reporter) -> Tokens<'a, 'r> {
    Tokens {
        lexer: Lexer::new(source),
        reporter,
    }
}
