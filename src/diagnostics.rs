use crate::error::CompileError;
use std::fmt;

/// A line-tagged error recorded by a [`Reporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: CompileError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.error.context() {
            Some(context) => write!(f, "ERROR @ LINE {}:{}: {}", context, self.line, self.error),
            None => write!(f, "ERROR @ LINE {}: {}", self.line, self.error),
        }
    }
}

/// Collects the errors of one compilation.
///
/// Scanning and parsing never stop on an error; they report here and carry
/// on. Whether a compilation succeeded is decided afterwards by looking at
/// [`Reporter::count`]. A reporter may be reused across compilations, in
/// which case the caller is expected to [`Reporter::reset`] it in between.
#[derive(Debug, Clone)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    echo: bool,
}

impl Reporter {
    /// Prints every diagnostic to stderr as soon as it is reported.
    pub fn stderr() -> Self {
        Self {
            diagnostics: Vec::new(),
            echo: true,
        }
    }

    /// Records diagnostics without printing them.
    pub fn buffered() -> Self {
        Self {
            diagnostics: Vec::new(),
            echo: false,
        }
    }

    pub fn report(&mut self, line: usize, error: impl Into<CompileError>) {
        let diagnostic = Diagnostic {
            line,
            error: error.into(),
        };
        tracing::debug!(line, error = %diagnostic.error, "diagnostic reported");

        if self.echo {
            eprintln!("{}", diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stderr()
    }
}
