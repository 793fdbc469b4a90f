use crate::ast::{CommentKind, Span};
use crate::error::{Diag, LexError, LexErrorKind};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

// =============================================================================
// 0. Scanner callbacks
// =============================================================================

#[inline(always)]
fn first_newline_offset(s: &str) -> Option<usize> {
    memchr::memchr2(b'\n', b'\r', s.as_bytes())
}

#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr::memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;
        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }
        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

/// Maximal munch over a numeric literal. Validation happens afterwards in
/// `classify_number`, so `0b2` stays a single (invalid) token.
#[inline]
fn lex_number(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let src = lex.source().as_bytes();
    let start = lex.span().start;
    let hex = src.get(start) == Some(&b'0') && matches!(src.get(start + 1), Some(b'x' | b'X'));

    let mut i = start;
    let mut seen_dot = false;
    while let Some(&b) = src.get(i) {
        let take = match b {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_' => true,
            // don't steal "..."
            b'.' => !seen_dot && src.get(i + 1) != Some(&b'.'),
            b'+' | b'-' => match src[i - 1] {
                b'e' | b'E' => !hex,
                b'p' | b'P' => hex,
                _ => false,
            },
            _ => false,
        };
        if !take {
            break;
        }
        seen_dot |= b == b'.';
        i += 1;
    }

    let already = lex.span().end;
    if i > already {
        lex.bump(i - already);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    Int,
    Float,
    Imag,
}

/// Classifies a munched numeric literal, rejecting malformed digits,
/// dangling exponents, misplaced `_` and hex mantissas without `p`.
pub fn classify_number(text: &str) -> Result<NumKind, LexErrorKind> {
    let (body, imag) = match text.strip_suffix('i') {
        Some(body) => (body, true),
        None => (text, false),
    };
    let bytes = body.as_bytes();
    if bytes.is_empty() || bytes.last() == Some(&b'_') {
        return Err(LexErrorKind::InvalidNumber);
    }

    let (radix, digits): (u32, &[u8]) = match bytes {
        [b'0', b'x' | b'X', rest @ ..] => (16, rest),
        [b'0', b'b' | b'B', rest @ ..] => (2, rest),
        [b'0', b'o' | b'O', rest @ ..] => (8, rest),
        _ => (10, bytes),
    };

    let mut seen_digit = false;
    let mut is_float = false;
    let mut in_exp = false;
    let mut exp_digit = false;
    let mut prev = 0u8;

    for &b in digits {
        match b {
            b'_' => {}
            b'.' if !is_float && !in_exp && (radix == 10 || radix == 16) => is_float = true,
            b'e' | b'E' if radix == 10 && !in_exp => {
                in_exp = true;
                is_float = true;
            }
            b'p' | b'P' if radix == 16 && !in_exp => {
                in_exp = true;
                is_float = true;
            }
            b'+' | b'-' if in_exp && matches!(prev, b'e' | b'E' | b'p' | b'P') => {}
            _ if in_exp => {
                if !b.is_ascii_digit() {
                    return Err(LexErrorKind::InvalidNumber);
                }
                exp_digit = true;
            }
            _ if (b as char).is_digit(radix) => seen_digit = true,
            _ => return Err(LexErrorKind::InvalidNumber),
        }
        prev = b;
    }

    let hex_mantissa_only = radix == 16 && is_float && !in_exp;
    if !seen_digit || (in_exp && !exp_digit) || hex_mantissa_only {
        return Err(LexErrorKind::InvalidNumber);
    }

    Ok(match (imag, is_float) {
        (true, _) => NumKind::Imag,
        (false, true) => NumKind::Float,
        (false, false) => NumKind::Int,
    })
}

// =============================================================================
// 1. Token Definition (RawTok)
// =============================================================================

#[repr(u8)]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\f]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", allow_greedy = true)] LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Declaration keywords
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("func")] KwFunc,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("struct")] KwStruct,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    // Statement keywords; only the semicolon rule cares which one
    #[token("break")] #[token("continue")] #[token("fallthrough")] #[token("return")]
    KwTerminator,
    #[token("case")] #[token("default")] #[token("defer")] #[token("else")] #[token("for")]
    #[token("go")] #[token("goto")] #[token("if")] #[token("range")] #[token("select")]
    #[token("switch")]
    KwStmt,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    #[regex(r"[0-9]|\.[0-9]", lex_number)] Number,

    #[regex(r"`[^`]*`")] RawString,
    #[regex(r#""([^"\\\n\r]|\\[^\n\r])*""#)] String,
    #[regex(r"'([^'\\\n\r]|\\[^\n\r])+'")] Rune,

    #[token("...")] Ellipsis,
    #[token("++")] #[token("--")] IncDec,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("&")] Amp,
    #[token("|")] Pipe,
    #[token("^")] Caret,
    #[token("~")] Tilde,
    #[token("!")] Bang,
    #[token("<<=")] #[token(">>=")] #[token("&^=")] #[token("+=")] #[token("-=")]
    #[token("*=")] #[token("/=")] #[token("%=")] #[token("&=")] #[token("|=")] #[token("^=")]
    #[token("<<")] #[token(">>")] #[token("&^")] #[token("&&")] #[token("||")]
    #[token("==")] #[token("!=")] #[token("<=")] #[token(">=")] #[token(":=")]
    #[token("/")] #[token("%")] #[token("<")] #[token(">")]
    Op,

    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

impl RawTok {
    /// Go spec: a newline after one of these tokens becomes a `;`.
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        matches!(
            self,
            RawTok::Ident
                | RawTok::Number
                | RawTok::Rune
                | RawTok::String
                | RawTok::RawString
                | RawTok::KwTerminator
                | RawTok::IncDec
                | RawTok::RParen
                | RawTok::RBrack
                | RawTok::RBrace
        )
    }

    #[rustfmt::skip]
    fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        match self {
            Self::Ident => Tok::Ident(slice),
            Self::Rune => Tok::Rune(slice),
            Self::String => Tok::Str(slice),
            Self::RawString => Tok::RawStr(slice),
            Self::KwTerminator | Self::KwStmt => Tok::Keyword(slice),
            Self::IncDec | Self::Op => Tok::Op(slice),

            Self::KwChan => Tok::KwChan, Self::KwConst => Tok::KwConst, Self::KwFunc => Tok::KwFunc,
            Self::KwImport => Tok::KwImport, Self::KwInterface => Tok::KwInterface,
            Self::KwMap => Tok::KwMap, Self::KwPackage => Tok::KwPackage,
            Self::KwStruct => Tok::KwStruct, Self::KwType => Tok::KwType, Self::KwVar => Tok::KwVar,

            Self::Ellipsis => Tok::Ellipsis, Self::Arrow => Tok::Arrow, Self::Assign => Tok::Assign,
            Self::Plus => Tok::Plus, Self::Minus => Tok::Minus, Self::Star => Tok::Star,
            Self::Amp => Tok::Amp, Self::Pipe => Tok::Pipe, Self::Caret => Tok::Caret,
            Self::Tilde => Tok::Tilde, Self::Bang => Tok::Bang,

            Self::LParen => Tok::LParen, Self::RParen => Tok::RParen,
            Self::LBrack => Tok::LBrack, Self::RBrack => Tok::RBrack,
            Self::LBrace => Tok::LBrace, Self::RBrace => Tok::RBrace,
            Self::Comma => Tok::Comma, Self::Semi => Tok::Semi,
            Self::Colon => Tok::Colon, Self::Dot => Tok::Dot,

            // Numbers, trivia and BOM are handled by the wrapper
            Self::Number | Self::Newline | Self::LineComment | Self::BlockComment
            | Self::Bom | Self::Error => Tok::Error,
        }
    }
}

// =============================================================================
// 2. Public Token Definition (zero-copy)
// =============================================================================

/// Token as seen by the declaration parser.
///
/// Operators and statement keywords that never matter outside function
/// bodies are folded into `Op` / `Keyword` with their spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum Tok<'input> {
    Ident(&'input str),
    Int(&'input str),
    Float(&'input str),
    Imag(&'input str),
    Rune(&'input str),
    Str(&'input str),
    RawStr(&'input str),

    KwChan,
    KwConst,
    KwFunc,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwStruct,
    KwType,
    KwVar,
    Keyword(&'input str),

    Ellipsis,
    Arrow,
    Assign,
    Plus,
    Minus,
    Star,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    Op(&'input str),

    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    Error,
    /// End of input; never produced by the lexer, appended by the parser.
    Eof,
}

impl Tok<'_> {
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Tok::Str(_) | Tok::RawStr(_))
    }
}

impl std::fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tok::Ident(s) | Tok::Int(s) | Tok::Float(s) | Tok::Imag(s) | Tok::Rune(s)
            | Tok::Str(s) | Tok::RawStr(s) | Tok::Keyword(s) | Tok::Op(s) => *s,
            Tok::KwChan => "chan",
            Tok::KwConst => "const",
            Tok::KwFunc => "func",
            Tok::KwImport => "import",
            Tok::KwInterface => "interface",
            Tok::KwMap => "map",
            Tok::KwPackage => "package",
            Tok::KwStruct => "struct",
            Tok::KwType => "type",
            Tok::KwVar => "var",
            Tok::Ellipsis => "...",
            Tok::Arrow => "<-",
            Tok::Assign => "=",
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Amp => "&",
            Tok::Pipe => "|",
            Tok::Caret => "^",
            Tok::Tilde => "~",
            Tok::Bang => "!",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LBrack => "[",
            Tok::RBrack => "]",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::Comma => ",",
            Tok::Semi => ";",
            Tok::Colon => ":",
            Tok::Dot => ".",
            Tok::Error => "invalid token",
            Tok::Eof => "EOF",
        };
        write!(f, "{s}")
    }
}

// =============================================================================
// 3. Lexer wrapper: semicolon insertion + comment capture + diags
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    comments: Vec<(Span, CommentKind)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            comments: Vec::new(),
            diags: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    /// Comments seen so far, in source order.
    pub fn take_comments(&mut self) -> Vec<(Span, CommentKind)> {
        std::mem::take(&mut self.comments)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let span = Span::new(span.start, span.end);
        self.diags.push(LexError { kind, span }.diag());
    }

    #[inline]
    fn emit_semi_at(&mut self, pos: usize) {
        self.pending = Some((pos, Tok::Semi, pos));
    }

    #[inline]
    fn handle_trivia(&mut self, raw: RawTok, span: &Range<usize>, slice: &str) -> bool {
        match raw {
            RawTok::Newline => {
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    self.emit_semi_at(span.start);
                }
                true
            }
            RawTok::LineComment => {
                self.comments
                    .push((Span::new(span.start, span.end), CommentKind::Line));
                true
            }
            RawTok::BlockComment => {
                self.comments
                    .push((Span::new(span.start, span.end), CommentKind::Block));
                if self.last_can_insert_semi {
                    if let Some(off) = first_newline_offset(slice) {
                        self.last_can_insert_semi = false;
                        self.emit_semi_at(span.start + off);
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            if self.eof_done {
                return None;
            }

            match self.logos.next() {
                None => {
                    // pending ';' (if any) goes out on the next turn
                    self.handle_eof();
                    continue;
                }
                Some(Err(kind)) => return Some(self.handle_lex_error(kind)),
                Some(Ok(raw)) => {
                    if let Some(item) = self.handle_raw_token(raw) {
                        return Some(item);
                    }
                }
            }
        }
    }
}

impl<'src> Lexer<'src> {
    #[inline]
    fn handle_eof(&mut self) {
        self.eof_done = true;
        if self.last_can_insert_semi {
            self.last_can_insert_semi = false;
            self.emit_semi_at(self.src_len);
        }
    }

    #[inline]
    fn handle_lex_error(&mut self, kind: LexErrorKind) -> (usize, Tok<'src>, usize) {
        let span = self.logos.span();
        if kind == LexErrorKind::UnterminatedComment {
            self.comments
                .push((Span::new(span.start, span.end), CommentKind::Block));
        }
        self.push_lex_diag(kind, span.clone());
        self.last_can_insert_semi = false;
        (span.start, Tok::Error, span.end)
    }

    /// `None` means the raw token was trivia and nothing is emitted.
    #[inline]
    fn handle_raw_token(&mut self, raw: RawTok) -> Option<(usize, Tok<'src>, usize)> {
        let span = self.logos.span();
        let slice = self.logos.slice();

        // BOM is only valid as the very first character
        if raw == RawTok::Bom {
            if span.start == 0 {
                return None;
            }
            self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
            self.last_can_insert_semi = false;
            return Some((span.start, Tok::Error, span.end));
        }

        if self.handle_trivia(raw, &span, slice) {
            return None;
        }

        if raw == RawTok::Error {
            self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
            self.last_can_insert_semi = false;
            return Some((span.start, Tok::Error, span.end));
        }

        if raw == RawTok::Number {
            return Some(self.handle_number_token(span, slice));
        }

        self.last_can_insert_semi = raw.can_insert_semicolon();
        Some((span.start, raw.to_token(slice), span.end))
    }

    #[inline]
    fn handle_number_token(
        &mut self,
        span: Range<usize>,
        slice: &'src str,
    ) -> (usize, Tok<'src>, usize) {
        match classify_number(slice) {
            Ok(kind) => {
                self.last_can_insert_semi = true;
                let tok = match kind {
                    NumKind::Int => Tok::Int(slice),
                    NumKind::Float => Tok::Float(slice),
                    NumKind::Imag => Tok::Imag(slice),
                };
                (span.start, tok, span.end)
            }
            Err(kind) => {
                self.push_lex_diag(kind, span.clone());
                self.last_can_insert_semi = false;
                (span.start, Tok::Error, span.end)
            }
        }
    }
}

/// Fully lexed source: tokens (with injected semicolons), comments and
/// lexical diagnostics.
#[derive(Debug)]
pub struct Tokens<'src> {
    pub toks: Vec<(usize, Tok<'src>, usize)>,
    pub comments: Vec<(Span, CommentKind)>,
    pub diags: Vec<Diag>,
}

pub fn tokenize(src: &str) -> Tokens<'_> {
    let mut lx = Lexer::new(src);
    let toks: Vec<_> = lx.by_ref().collect();
    Tokens {
        toks,
        comments: lx.take_comments(),
        diags: lx.take_diags(),
    }
}
