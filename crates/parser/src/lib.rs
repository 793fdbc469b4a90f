//! Declaration-level Go parser (Logos lexer + recursive descent).
//!
//! - The lexer uses Logos and implements Go semicolon insertion.
//! - The parser builds an arena AST of top-level declarations with their
//!   doc and line comments attached the way `go/parser` attaches them.
//! - Function bodies and complex initializers are skipped and kept as spans.

pub mod ast;
pub mod comments;
pub mod error;
pub mod lexer;
pub mod parser;
mod parser_support;
pub mod printer;
pub mod walk;

pub use comments::LineIndex;
pub use error::{Diag, DiagKind, ParseFailure};
pub use lexer::{tokenize, Lexer, Tok};
pub use parser::{parse_source, ParsedFile};
pub use walk::{Visitor, Walk};
