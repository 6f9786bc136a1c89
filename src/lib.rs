//! Scanner and LL(1) parser for the TINY teaching language.
//!
//! [`tokenize`] turns source text into a lazy stream of [`Token`]s and
//! [`parse`] builds a [`ParseTree`] from it. Neither stops on bad input:
//! every lexical and syntax error goes to the caller's [`Reporter`], and the
//! caller decides afterwards whether the result can be trusted.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod tree;

pub use diagnostics::{Diagnostic, Reporter};
pub use lexer::{tokenize, Lexer, Tokens};
pub use parser::{parse, Parser};
pub use token::{Kind, Token, Value};
pub use tree::{Node, NodeId, NodeKind, ParseTree, Shape};
