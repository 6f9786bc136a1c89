use crate::tree::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the `tinyc` binary. Scanning and parsing never fail this way;
/// they record diagnostics instead.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("cannot read {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IOError: {0}")]
    IO(#[from] std::io::Error),

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize parse tree: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("compilation failed with {count} error(s)")]
    Failed { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalError {
    #[error("Unterminated comment")]
    UnterminatedComment,

    #[error("Illegal character after `:`")]
    IllegalCharacterAfterColon,

    #[error("Number out of range")]
    NumberOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// `context` names the production, or `expect <lexeme>` for a failed expect.
    #[error("Unexpected symbol.")]
    UnexpectedSymbol { context: String },

    #[error("Nesting too deep (limit {limit}).")]
    NestingTooDeep { limit: usize },
}

impl SyntaxError {
    pub fn unexpected(context: impl Into<String>) -> Self {
        SyntaxError::UnexpectedSymbol {
            context: context.into(),
        }
    }

    pub fn context(&self) -> Option<&str> {
        match self {
            SyntaxError::UnexpectedSymbol { context } => Some(context.as_str()),
            SyntaxError::NestingTooDeep { .. } => None,
        }
    }
}

/// Anything a [`crate::diagnostics::Reporter`] can record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl CompileError {
    pub fn context(&self) -> Option<&str> {
        match self {
            CompileError::Lexical(_) => None,
            CompileError::Syntax(err) => err.context(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("node {0} already exists in the target tree")]
    DuplicateNode(NodeId),

    #[error("node {0} is the root of its tree")]
    IsRoot(NodeId),

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("cannot merge a tree without a root")]
    EmptyTree,
}
