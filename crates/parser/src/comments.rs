//! Comment grouping and attachment.
//!
//! Groups and attachment follow `go/parser`:
//! - a group is a run of comments with no token in between, where each
//!   comment starts at most one line below the previous one (zero lines for
//!   a group that starts on the line of the preceding token);
//! - a group starting on the same line as the preceding token is that
//!   token's *line comment* when the next token is on another line;
//! - the last group before a token is that token's *lead comment* when it
//!   ends on the line directly above it and is not a line comment.

use std::collections::HashMap;

use crate::ast::{AstArena, Comment, CommentGroup, CommentGroupId, CommentKind, ListRef, Span};
use crate::lexer::Tok;

/// Byte offset to line/column conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut starts = vec![0u32];
        starts.extend(memchr::memchr_iter(b'\n', src.as_bytes()).map(|i| i as u32 + 1));
        Self { starts }
    }

    /// 0-based line containing `offset`.
    #[inline]
    pub fn line(&self, offset: u32) -> u32 {
        (self.starts.partition_point(|&s| s <= offset) - 1) as u32
    }

    /// 1-based `(line, column)`; columns count bytes.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        let col = offset - self.starts[line as usize] + 1;
        (line + 1, col)
    }

    fn last_line(&self, span: Span) -> u32 {
        self.line(span.end.saturating_sub(1).max(span.start))
    }
}

/// Lead and line comment lookup keyed by token offsets.
#[derive(Debug, Default)]
pub struct CommentIndex {
    lead: HashMap<u32, CommentGroupId>,
    line: HashMap<u32, CommentGroupId>,
    all: ListRef<CommentGroupId>,
}

#[derive(Clone, Copy)]
struct RealTok {
    start: u32,
    end: u32,
    explicit_semi: bool,
}

impl CommentIndex {
    /// Allocates every comment group into `arena` (in source order) and
    /// records which groups are lead or line comments.
    pub fn build(
        arena: &mut AstArena,
        comments: &[(Span, CommentKind)],
        toks: &[(usize, Tok<'_>, usize)],
        lines: &LineIndex,
    ) -> Self {
        // injected semicolons are zero-width and don't separate comments
        let real: Vec<RealTok> = toks
            .iter()
            .filter(|(s, t, e)| !(matches!(t, Tok::Semi) && s == e))
            .map(|(s, t, e)| RealTok {
                start: *s as u32,
                end: *e as u32,
                explicit_semi: matches!(t, Tok::Semi),
            })
            .collect();

        let mut index = CommentIndex::default();
        let mut groups = Vec::new();
        let mut ti = 0usize;
        let mut ci = 0usize;

        while ci < comments.len() {
            let c_start = comments[ci].0.start;
            while ti < real.len() && real[ti].start < c_start {
                ti += 1;
            }
            let prev = ti.checked_sub(1).map(|k| real[k]);
            let next = real.get(ti).copied();

            let run_end = match next {
                Some(n) => {
                    ci + comments[ci..]
                        .iter()
                        .take_while(|(sp, _)| sp.start < n.start)
                        .count()
                }
                None => comments.len(),
            };

            let mut i = ci;
            while i < run_end {
                let trailing = i == ci
                    && prev.is_some_and(|p| {
                        lines.line(p.end.saturating_sub(1)) == lines.line(comments[i].0.start)
                    });
                let slack = if trailing { 0 } else { 1 };

                let mut end_line = lines.last_line(comments[i].0);
                let mut j = i + 1;
                while j < run_end && lines.line(comments[j].0.start) <= end_line + slack {
                    end_line = lines.last_line(comments[j].0);
                    j += 1;
                }

                let gid = alloc_group(arena, &comments[i..j]);
                groups.push(gid);

                if trailing {
                    let is_line_comment = match next {
                        None => true,
                        Some(n) => n.explicit_semi || lines.line(n.start) != end_line,
                    };
                    if let (true, Some(p)) = (is_line_comment, prev) {
                        index.line.insert(p.end, gid);
                    }
                } else if j == run_end {
                    if let Some(n) = next.filter(|n| end_line + 1 == lines.line(n.start)) {
                        index.lead.insert(n.start, gid);
                    }
                }

                i = j;
            }
            ci = run_end;
        }

        index.all = arena.list_comment_group_ids(groups);
        index
    }

    /// Doc comment of the construct whose first token starts at `tok_start`.
    #[inline]
    pub fn lead_for(&self, tok_start: usize) -> Option<CommentGroupId> {
        self.lead.get(&(tok_start as u32)).copied()
    }

    /// Line comment following the token that ends at `tok_end`.
    #[inline]
    pub fn line_after(&self, tok_end: usize) -> Option<CommentGroupId> {
        self.line.get(&(tok_end as u32)).copied()
    }

    #[inline]
    pub fn all(&self) -> ListRef<CommentGroupId> {
        self.all
    }
}

fn alloc_group(arena: &mut AstArena, comments: &[(Span, CommentKind)]) -> CommentGroupId {
    let ids: Vec<_> = comments
        .iter()
        .map(|&(span, kind)| arena.comments.alloc(Comment { kind }, span))
        .collect();
    let span = match (comments.first(), comments.last()) {
        (Some(first), Some(last)) => first.0.to(last.0),
        _ => Span::default(),
    };
    let list = arena.list_comment_ids(ids);
    arena
        .comment_groups
        .alloc(CommentGroup { comments: list }, span)
}
