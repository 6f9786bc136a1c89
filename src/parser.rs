use crate::diagnostics::Reporter;
use crate::error::SyntaxError;
use crate::lexer::Lexer;
use crate::token::{Kind, Token, Value};
use crate::tree::{NodeId, NodeKind, ParseTree};

/// Predictive recursive-descent parser for TINY.
///
/// ```text
/// program        = stmt_sequence
/// stmt_sequence  = statement { ';' statement }
/// statement      = if_stmt | repeat_stmt | assign_stmt | read_stmt | write_stmt
/// if_stmt        = 'if' exp 'then' stmt_sequence [ 'else' stmt_sequence ] 'end'
/// repeat_stmt    = 'repeat' stmt_sequence 'until' exp
/// assign_stmt    = IDENTIFIER ':=' exp
/// read_stmt      = 'read' IDENTIFIER
/// write_stmt     = 'write' exp
/// exp            = simple_exp [ ('<' | '=') simple_exp ]
/// simple_exp     = term { ('+' | '-') term }
/// term           = factor { ('*' | '/') factor }
/// factor         = '(' exp ')' | NUMBER | IDENTIFIER
/// ```
///
/// Tokens are pulled from the lexer one at a time with a single token of
/// lookahead. Errors never stop the parse: a failed `expect` is reported and
/// parsing continues as if the token had been there, and a factor or
/// statement that cannot start is replaced by an `error` node.
///
/// Parenthesised expressions and `if`/`repeat` bodies count towards one
/// nesting depth. A construct that would go deeper than the limit is
/// reported once, skipped as a whole, and replaced by an `error` node.
pub struct Parser<'a, 'r> {
    lexer: Lexer<'a>,
    reporter: &'r mut Reporter,
    current: Option<Token>,
    tree: ParseTree,
    depth: usize,
    max_depth: usize,
}

/// Default limit on nested parentheses and statement blocks.
pub const DEFAULT_MAX_DEPTH: usize = 256;

impl<'a, 'r> Parser<'a, 'r> {
    pub fn new(source: &'a str, reporter: &'r mut Reporter) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token(reporter);

        Self {
            lexer,
            reporter,
            current,
            tree: ParseTree::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses the whole program and returns the tree with its root.
    pub fn parse(mut self) -> (ParseTree, NodeId) {
        let root = self.parse_program();
        self.tree.link_root(root);

        if let Some(token) = &self.current {
            tracing::debug!(line = token.line, kind = %token.kind, "ignoring tokens after program");
        }
        tracing::debug!(
            nodes = self.tree.len(),
            errors = self.reporter.count(),
            "parse finished"
        );

        (self.tree, root)
    }

    fn at(&self) -> Option<Kind> {
        self.current.as_ref().map(|token| token.kind)
    }

    /// Line of the lookahead token, or the last line scanned at end of input.
    fn line(&self) -> usize {
        match &self.current {
            Some(token) => token.line,
            None => self.lexer.line(),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        let next = self.lexer.next_token(self.reporter);
        std::mem::replace(&mut self.current, next)
    }

    fn accept(&mut self, kind: Kind) -> bool {
        if self.at() == Some(kind) {
            self.next_token();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: Kind) -> bool {
        if self.accept(kind) {
            return true;
        }
        self.error(format!("expect {}", kind.lexeme()));
        false
    }

    fn error(&mut self, context: impl Into<String>) {
        let line = self.line();
        self.reporter.report(line, SyntaxError::unexpected(context));
    }

    fn placeholder(&mut self, context: &str) -> NodeId {
        self.error(context);
        self.tree.add_node(NodeKind::Error)
    }

    /// Text of the lookahead token, empty at end of input.
    fn current_text(&self) -> String {
        self.current
            .as_ref()
            .map(|token| token.value.to_string())
            .unwrap_or_default()
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        self.tree.link(parent, child);
    }

    /// Runs `parse` one nesting level deeper.
    fn nested(&mut self, parse: fn(&mut Self) -> NodeId) -> NodeId {
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        node
    }

    fn too_deep(&mut self) -> bool {
        if self.depth < self.max_depth {
            return false;
        }
        let line = self.line();
        self.reporter.report(
            line,
            SyntaxError::NestingTooDeep {
                limit: self.max_depth,
            },
        );
        true
    }

    /// Consumes tokens up to and including the one that balances the
    /// opener under the cursor. Returns the closing kind, if any.
    fn skip_balanced(&mut self, opens: &[Kind], closes: &[Kind]) -> Option<Kind> {
        let mut open = 0usize;
        while let Some(kind) = self.at() {
            self.next_token();
            if opens.contains(&kind) {
                open += 1;
            } else if closes.contains(&kind) {
                open = open.saturating_sub(1);
                if open == 0 {
                    return Some(kind);
                }
            }
        }
        None
    }

    /// Consumes the tokens of one expression without building nodes.
    fn skip_exp(&mut self) {
        let mut parens = 0usize;
        let mut operand = true;

        while let Some(kind) = self.at() {
            match (operand, kind) {
                (true, Kind::Identifier | Kind::Number) => operand = false,
                (true, Kind::LParen) => parens += 1,
                (
                    false,
                    Kind::Plus | Kind::Minus | Kind::Times | Kind::Divide | Kind::Less | Kind::Equal,
                ) => operand = true,
                (false, Kind::RParen) if parens > 0 => parens -= 1,
                _ => break,
            }
            self.next_token();
        }
    }

    /// Replaces an `if` or `repeat` that would nest too deep, including its
    /// `end` or its `until` condition.
    fn skip_block(&mut self) -> NodeId {
        let closer = self.skip_balanced(&[Kind::If, Kind::Repeat], &[Kind::End, Kind::Until]);
        if closer == Some(Kind::Until) {
            self.skip_exp();
        }
        self.tree.add_node(NodeKind::Error)
    }

    fn parse_program(&mut self) -> NodeId {
        self.parse_stmt_sequence()
    }

    fn parse_stmt_sequence(&mut self) -> NodeId {
        let mut root = self.parse_statement();
        let mut wrapper = None;

        while self.accept(Kind::Semi) {
            let sequence = match wrapper {
                Some(sequence) => sequence,
                None => {
                    let sequence = self.tree.add_node(NodeKind::StmtSequence);
                    self.adopt(sequence, root);
                    root = sequence;
                    wrapper = Some(sequence);
                    sequence
                }
            };
            let statement = self.parse_statement();
            self.adopt(sequence, statement);
        }

        root
    }

    fn parse_statement(&mut self) -> NodeId {
        match self.at() {
            Some(Kind::If | Kind::Repeat) if self.too_deep() => self.skip_block(),
            Some(Kind::If) => self.parse_if_stmt(),
            Some(Kind::Repeat) => self.parse_repeat_stmt(),
            Some(Kind::Identifier) => self.parse_assign_stmt(),
            Some(Kind::Read) => self.parse_read_stmt(),
            Some(Kind::Write) => self.parse_write_stmt(),
            _ => self.placeholder("statement"),
        }
    }

    fn parse_if_stmt(&mut self) -> NodeId {
        if !self.accept(Kind::If) {
            return self.placeholder("if_stmt");
        }

        let condition = self.parse_exp();
        let node = self.tree.add_node(NodeKind::If);
        self.adopt(node, condition);

        self.expect(Kind::Then);
        let then_branch = self.nested(Self::parse_stmt_sequence);
        self.adopt(node, then_branch);

        if self.accept(Kind::Else) {
            let else_branch = self.nested(Self::parse_stmt_sequence);
            self.adopt(node, else_branch);
        }
        self.expect(Kind::End);

        node
    }

    fn parse_repeat_stmt(&mut self) -> NodeId {
        if !self.accept(Kind::Repeat) {
            return self.placeholder("repeat_stmt");
        }

        let body = self.nested(Self::parse_stmt_sequence);
        let node = self.tree.add_node(NodeKind::Repeat);
        self.adopt(node, body);

        self.expect(Kind::Until);
        let condition = self.parse_exp();
        self.adopt(node, condition);

        node
    }

    fn parse_assign_stmt(&mut self) -> NodeId {
        let name = self.current_text();
        if !self.accept(Kind::Identifier) {
            return self.placeholder("assign_stmt");
        }

        let node = self.tree.add_node(NodeKind::Assign(name));
        self.expect(Kind::Assign);
        let value = self.parse_exp();
        self.adopt(node, value);

        node
    }

    fn parse_read_stmt(&mut self) -> NodeId {
        if !self.accept(Kind::Read) {
            return self.placeholder("read_stmt");
        }

        // The label keeps whatever stood in the identifier's place.
        let name = self.current_text();
        self.expect(Kind::Identifier);
        self.tree.add_node(NodeKind::Read(name))
    }

    fn parse_write_stmt(&mut self) -> NodeId {
        if !self.accept(Kind::Write) {
            return self.placeholder("write_stmt");
        }

        let value = self.parse_exp();
        let node = self.tree.add_node(NodeKind::Write);
        self.adopt(node, value);

        node
    }

    /// Comparisons do not chain: at most one `<` or `=` per expression.
    fn parse_exp(&mut self) -> NodeId {
        let left = self.parse_simple_exp();

        match self.at() {
            Some(op @ (Kind::Less | Kind::Equal)) => {
                self.next_token();
                self.binary(left, op, Self::parse_simple_exp)
            }
            _ => left,
        }
    }

    fn parse_simple_exp(&mut self) -> NodeId {
        let mut left = self.parse_term();

        while let Some(op @ (Kind::Plus | Kind::Minus)) = self.at() {
            self.next_token();
            left = self.binary(left, op, Self::parse_term);
        }

        left
    }

    fn parse_term(&mut self) -> NodeId {
        let mut left = self.parse_factor();

        while let Some(op @ (Kind::Times | Kind::Divide)) = self.at() {
            self.next_token();
            left = self.binary(left, op, Self::parse_factor);
        }

        left
    }

    /// Builds `op(left, right)`. The operator node is created before the
    /// right operand is parsed, so it always has the smaller id.
    fn binary(&mut self, left: NodeId, op: Kind, right: fn(&mut Self) -> NodeId) -> NodeId {
        let node = self.tree.add_node(NodeKind::Op(op));
        self.adopt(node, left);
        let right = right(self);
        self.adopt(node, right);
        node
    }

    fn parse_factor(&mut self) -> NodeId {
        if self.at() == Some(Kind::LParen) {
            if self.too_deep() {
                self.skip_balanced(&[Kind::LParen], &[Kind::RParen]);
                return self.tree.add_node(NodeKind::Error);
            }
            self.next_token();
            let inner = self.nested(Self::parse_exp);
            self.expect(Kind::RParen);
            return inner;
        }

        let kind = match &self.current {
            Some(Token {
                kind: Kind::Number,
                value: Value::Number(n),
                ..
            }) => NodeKind::Const(*n),
            Some(Token {
                kind: Kind::Identifier,
                value,
                ..
            }) => NodeKind::Id(value.to_string()),
            _ => return self.placeholder("factor"),
        };
        self.next_token();
        self.tree.add_node(kind)
    }
}

/// Parses `source`, reporting every syntax and lexical error to `reporter`.
///
/// Always returns a tree; check `reporter` before trusting it.
pub fn parse(source: &str, reporter: &mut Reporter) -> (ParseTree, NodeId) {
    Parser::new(source, reporter).parse()
}
