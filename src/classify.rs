//! Comment classification: plain documentation, `// +build` constraints,
//! `//go:generate` directives and other `//go:` pragmas.

use crate::ir::{Comment, Constraint, GenerateComment, MagicComment};

pub const PRAGMA_PREFIX: &str = "//go:";
pub const GENERATE_PREFIX: &str = "//go:generate";
pub const BUILD_PREFIX: &str = "// +build";

/// A comment line recognized by its prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Build(Constraint),
    Generate(GenerateComment),
    Magic(MagicComment),
}

/// Recognizes a directive line. `//go:generate` wins over the generic
/// `//go:` prefix.
pub fn directive(text: &str) -> Option<Directive> {
    if let Some(rest) = text.strip_prefix(GENERATE_PREFIX) {
        return Some(Directive::Generate(GenerateComment {
            command: rest.trim().to_owned(),
            raw: text.to_owned(),
        }));
    }
    if let Some(rest) = text.strip_prefix(PRAGMA_PREFIX) {
        return Some(Directive::Magic(MagicComment {
            pragma: rest.trim().to_owned(),
            raw: text.to_owned(),
        }));
    }
    if let Some(rest) = text.strip_prefix(BUILD_PREFIX) {
        return Some(Directive::Build(Constraint {
            options: rest.split_whitespace().map(str::to_owned).collect(),
        }));
    }
    None
}

/// One comment block split into its categories. A block may feed several
/// categories at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub doc: Comment,
    pub constraints: Vec<Constraint>,
    pub magic: Vec<MagicComment>,
    pub generate: Vec<GenerateComment>,
}

/// Classifies the raw text of each comment in a group, in source order.
///
/// Documentation keeps every non-directive comment, trimmed and joined with
/// no separator at all.
pub fn classify<'a>(comments: impl IntoIterator<Item = &'a str>) -> Classified {
    let mut out = Classified::default();
    for text in comments {
        match directive(text) {
            Some(Directive::Build(c)) => out.constraints.push(c),
            Some(Directive::Generate(g)) => out.generate.push(g),
            Some(Directive::Magic(m)) => out.magic.push(m),
            None => out.doc.content.push_str(text.trim()),
        }
    }
    out
}
