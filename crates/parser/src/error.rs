use thiserror::Error;

use crate::ast::Span;
use crate::comments::LineIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub span: Span,
    pub message: String,
}

impl Diag {
    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: DiagKind::Parse,
            span,
            message: message.into(),
        }
    }

    /// `line:col: message`, 1-based.
    pub fn render(&self, lines: &LineIndex) -> String {
        let (line, col) = lines.line_col(self.span.start);
        format!("{line}:{col}: {}", self.message)
    }
}

/// A source unit the parser rejected. Parsing stops at the first syntax
/// error; lexical diagnostics collected before that point are included.
#[derive(Debug, Error)]
#[error("{} syntax error(s), first: {}", .diags.len(), first_message(.diags))]
pub struct ParseFailure {
    pub diags: Vec<Diag>,
}

fn first_message(diags: &[Diag]) -> &str {
    diags.first().map(|d| d.message.as_str()).unwrap_or("unknown")
}

impl ParseFailure {
    /// One `line:col: message` entry per diagnostic, `; `-separated.
    pub fn render(&self, src: &str) -> String {
        let lines = LineIndex::new(src);
        self.diags
            .iter()
            .map(|d| d.render(&lines))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid numeric literal")]
    InvalidNumber,
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}
