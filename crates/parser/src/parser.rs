//! Hand-written recursive descent over the token vector.
//!
//! Only declarations are parsed structurally. Function bodies and
//! initializers that are not simple operands are skipped with bracket
//! balancing and kept as spans.

use smallvec::SmallVec;

use crate::ast::*;
use crate::comments::{CommentIndex, LineIndex};
use crate::error::{Diag, ParseFailure};
use crate::lexer::{tokenize, Tok};
use crate::parser_support::{resolve_param_list, ParamDecl};

type PResult<T> = Result<T, Diag>;

/// A parsed source unit: the arena, its interner and the root node.
#[derive(Debug)]
pub struct ParsedFile {
    pub arena: AstArena,
    pub interner: Interner,
    pub root: SourceFile,
    pub lines: LineIndex,
    source: Box<str>,
}

impl ParsedFile {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.range()).unwrap_or("")
    }

    #[inline]
    pub fn name(&self, ident: IdentName) -> &str {
        self.interner.resolve(ident.sym)
    }

    pub fn package_name(&self) -> &str {
        self.name(self.root.name)
    }
}

/// Parses one Go source file.
pub fn parse_source(src: &str) -> Result<ParsedFile, ParseFailure> {
    let tokens = tokenize(src);
    if !tokens.diags.is_empty() {
        return Err(ParseFailure {
            diags: tokens.diags,
        });
    }

    let lines = LineIndex::new(src);
    let mut arena = AstArena::new();
    let comments = CommentIndex::build(&mut arena, &tokens.comments, &tokens.toks, &lines);

    let mut toks = tokens.toks;
    toks.push((src.len(), Tok::Eof, src.len()));

    let mut p = Parser {
        toks,
        pos: 0,
        prev_end: 0,
        arena,
        interner: Interner::new(),
        comments,
    };

    match p.parse_file() {
        Ok(root) => Ok(ParsedFile {
            arena: p.arena,
            interner: p.interner,
            root,
            lines,
            source: src.into(),
        }),
        Err(diag) => Err(ParseFailure { diags: vec![diag] }),
    }
}

struct Parser<'src> {
    toks: Vec<(usize, Tok<'src>, usize)>,
    pos: usize,
    /// End of the last consumed token that is not an injected `;`
    prev_end: usize,
    arena: AstArena,
    interner: Interner,
    comments: CommentIndex,
}

// =============================================================================
// Token cursor
// =============================================================================

impl<'src> Parser<'src> {
    #[inline]
    fn peek(&self) -> &Tok<'src> {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, k: usize) -> &Tok<'src> {
        let last = self.toks.len() - 1;
        &self.toks[(self.pos + k).min(last)].1
    }

    #[inline]
    fn start(&self) -> usize {
        self.toks[self.pos].0
    }

    #[inline]
    fn tok_span(&self, k: usize) -> Span {
        let last = self.toks.len() - 1;
        let (s, _, e) = self.toks[(self.pos + k).min(last)];
        Span::new(s, e)
    }

    fn bump(&mut self) -> (usize, Tok<'src>, usize) {
        let tok = self.toks[self.pos].clone();
        if !matches!(tok.1, Tok::Eof) {
            self.pos += 1;
            if tok.0 != tok.2 {
                self.prev_end = tok.2;
            }
        }
        tok
    }

    #[inline]
    fn at(&self, pred: fn(&Tok<'_>) -> bool) -> bool {
        pred(self.peek())
    }

    fn eat(&mut self, pred: fn(&Tok<'_>) -> bool) -> Option<Span> {
        if self.at(pred) {
            let (s, _, e) = self.bump();
            Some(Span::new(s, e))
        } else {
            None
        }
    }

    fn expect(&mut self, pred: fn(&Tok<'_>) -> bool, what: &str) -> PResult<Span> {
        match self.eat(pred) {
            Some(span) => Ok(span),
            None => self.unexpected(what),
        }
    }

    fn unexpected<T>(&self, what: &str) -> PResult<T> {
        Err(Diag::parse(
            self.tok_span(0),
            format!("expected {what}, found {}", self.peek()),
        ))
    }

    /// Declarations end in `;`, which may be omitted before `)` or `}`.
    fn expect_semi(&mut self) -> PResult<()> {
        match self.peek() {
            Tok::Semi => {
                self.bump();
                Ok(())
            }
            Tok::RParen | Tok::RBrace | Tok::Eof => Ok(()),
            _ => self.unexpected("';' or newline"),
        }
    }

    fn ident(&mut self) -> PResult<IdentName> {
        match *self.peek() {
            Tok::Ident(s) => {
                let (start, _, end) = self.bump();
                Ok(IdentName {
                    sym: self.interner.intern(s),
                    pos: Span::new(start, end),
                })
            }
            _ => self.unexpected("identifier"),
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end.max(start))
    }
}

fn is_semi(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Semi)
}
fn is_lparen(t: &Tok<'_>) -> bool {
    matches!(t, Tok::LParen)
}
fn is_rparen(t: &Tok<'_>) -> bool {
    matches!(t, Tok::RParen)
}
fn is_lbrack(t: &Tok<'_>) -> bool {
    matches!(t, Tok::LBrack)
}
fn is_rbrack(t: &Tok<'_>) -> bool {
    matches!(t, Tok::RBrack)
}
fn is_lbrace(t: &Tok<'_>) -> bool {
    matches!(t, Tok::LBrace)
}
fn is_rbrace(t: &Tok<'_>) -> bool {
    matches!(t, Tok::RBrace)
}
fn is_comma(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Comma)
}
fn is_dot(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Dot)
}
fn is_assign(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Assign)
}
fn is_ellipsis(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Ellipsis)
}
fn is_pipe(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Pipe)
}
fn is_eof(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Eof)
}
fn is_package(t: &Tok<'_>) -> bool {
    matches!(t, Tok::KwPackage)
}
fn is_chan(t: &Tok<'_>) -> bool {
    matches!(t, Tok::KwChan)
}
fn is_arrow(t: &Tok<'_>) -> bool {
    matches!(t, Tok::Arrow)
}

/// Tokens that can begin a type (a parenthesized type excluded).
fn starts_type(t: &Tok<'_>) -> bool {
    matches!(
        t,
        Tok::Ident(_)
            | Tok::Star
            | Tok::LBrack
            | Tok::KwMap
            | Tok::KwChan
            | Tok::Arrow
            | Tok::KwStruct
            | Tok::KwInterface
            | Tok::KwFunc
    )
}

/// Tokens that begin a type literal no expression can start with.
fn starts_type_literal(t: &Tok<'_>) -> bool {
    matches!(
        t,
        Tok::LBrack
            | Tok::KwMap
            | Tok::KwChan
            | Tok::Arrow
            | Tok::KwStruct
            | Tok::KwInterface
            | Tok::KwFunc
            | Tok::Tilde
    )
}

/// Tokens that end an expression at bracket depth zero.
fn ends_expr(t: &Tok<'_>) -> bool {
    matches!(
        t,
        Tok::Comma | Tok::Semi | Tok::RParen | Tok::RBrack | Tok::RBrace | Tok::Eof
    )
}

// =============================================================================
// Declarations
// =============================================================================

impl<'src> Parser<'src> {
    fn parse_file(&mut self) -> PResult<SourceFile> {
        let doc = self.comments.lead_for(self.start());
        let package_pos = self.expect(is_package, "'package'")?;
        let name = self.ident()?;
        self.expect_semi()?;

        let mut decls = Vec::new();
        loop {
            let decl = match self.peek() {
                Tok::Eof => break,
                Tok::Semi => {
                    self.bump();
                    continue;
                }
                Tok::KwImport => TopLevelDecl::Gen(self.parse_gen_decl(GenDeclKind::Import)?),
                Tok::KwConst => TopLevelDecl::Gen(self.parse_gen_decl(GenDeclKind::Const)?),
                Tok::KwVar => TopLevelDecl::Gen(self.parse_gen_decl(GenDeclKind::Var)?),
                Tok::KwType => TopLevelDecl::Gen(self.parse_gen_decl(GenDeclKind::Type)?),
                Tok::KwFunc => TopLevelDecl::Func(self.parse_func_decl()?),
                _ => return self.unexpected("declaration"),
            };
            decls.push(decl);
            self.expect_semi()?;
        }

        Ok(SourceFile {
            package_pos,
            name,
            doc,
            comments: self.comments.all(),
            decls: self.arena.list_top_decls(decls),
        })
    }

    fn parse_gen_decl(&mut self, kind: GenDeclKind) -> PResult<GenDeclId> {
        let start = self.start();
        let doc = self.comments.lead_for(start);
        let (s, _, e) = self.bump();
        let kw_pos = Span::new(s, e);

        let mut specs = Vec::new();
        let (l_paren, r_paren) = if let Some(l) = self.eat(is_lparen) {
            while !self.at(is_rparen) {
                if self.at(is_eof) {
                    return self.unexpected("')'");
                }
                let spec_doc = self.comments.lead_for(self.start());
                specs.push(self.parse_spec(kind, spec_doc)?);
                self.expect_semi()?;
            }
            let r = self.expect(is_rparen, "')'")?;
            (Some(l), Some(r))
        } else {
            // ungrouped specs carry no doc of their own; it sits on the GenDecl
            specs.push(self.parse_spec(kind, None)?);
            (None, None)
        };

        let decl = GenDecl {
            doc,
            kw_pos,
            kind,
            l_paren,
            specs: self.arena.list_specs(specs),
            r_paren,
        };
        Ok(self.arena.gen_decls.alloc(decl, self.span_from(start)))
    }

    fn parse_spec(&mut self, kind: GenDeclKind, doc: Option<CommentGroupId>) -> PResult<Spec> {
        match kind {
            GenDeclKind::Import => self.parse_import_spec(doc).map(Spec::Import),
            GenDeclKind::Const | GenDeclKind::Var => self.parse_value_spec(doc).map(Spec::Value),
            GenDeclKind::Type => self.parse_type_spec(doc).map(Spec::Type),
        }
    }

    fn parse_import_spec(&mut self, doc: Option<CommentGroupId>) -> PResult<ImportSpec> {
        let name = match *self.peek() {
            Tok::Dot => Some(ImportName::Dot(self.tok_span(0))),
            Tok::Ident("_") => Some(ImportName::Blank(self.tok_span(0))),
            Tok::Ident(_) => Some(ImportName::Name(self.ident()?)),
            _ => None,
        };
        if matches!(name, Some(ImportName::Dot(_) | ImportName::Blank(_))) {
            self.bump();
        }
        let path = self.string_lit("import path")?;
        Ok(ImportSpec {
            doc,
            name,
            path,
            comment: self.comments.line_after(self.prev_end),
        })
    }

    fn string_lit(&mut self, what: &str) -> PResult<StringLit> {
        if self.peek().is_string() {
            let (s, _, e) = self.bump();
            Ok(StringLit { raw: Span::new(s, e) })
        } else {
            self.unexpected(what)
        }
    }

    fn parse_value_spec(&mut self, doc: Option<CommentGroupId>) -> PResult<ValueSpec> {
        let names = self.ident_list()?;
        let typ = match self.peek() {
            Tok::Assign | Tok::Semi | Tok::RParen | Tok::Eof => None,
            _ => Some(self.parse_type()?),
        };
        let values = if self.eat(is_assign).is_some() {
            self.expr_list()?
        } else {
            ListRef::EMPTY
        };
        Ok(ValueSpec {
            doc,
            names,
            typ,
            values,
            comment: self.comments.line_after(self.prev_end),
        })
    }

    fn parse_type_spec(&mut self, doc: Option<CommentGroupId>) -> PResult<TypeSpec> {
        let name = self.ident()?;
        let type_params = if self.at(is_lbrack) && self.brackets_are_type_params() {
            self.parse_type_params()?
        } else {
            ListRef::EMPTY
        };
        let assign_pos = self.eat(is_assign);
        let typ = self.parse_type()?;
        Ok(TypeSpec {
            doc,
            name,
            type_params,
            assign_pos,
            typ,
            comment: self.comments.line_after(self.prev_end),
        })
    }

    /// `type A[T any] ...` vs. `type A [N]T`, decided like `go/parser`:
    /// the brackets hold type parameters when they start with a name that is
    /// followed by a comma at depth zero, or by something only a constraint
    /// can be. `[N * 2]`, `[len(x)]` and `[a[0]]` stay array lengths, and so
    /// does `[P *C]` without a trailing comma.
    fn brackets_are_type_params(&self) -> bool {
        if !matches!(self.peek_at(1), Tok::Ident(_)) {
            return false;
        }
        let open = self.pos;
        let close = self.matching_close(open);
        if self.has_top_level_comma(open + 1, close) {
            return true;
        }
        let at = |i: usize| &self.toks[i.min(close)].1;
        let after_name = open + 2;
        match at(after_name) {
            Tok::RBrack => false,
            // `[P any]`, `[P pkg.C]`, `[P ~int | ~string]`, `[P interface{...}]`
            t if starts_type_literal(t) && !matches!(t, Tok::LBrack) => true,
            Tok::Ident(_) => true,
            // `[P []int]` vs. the index expression `[a[0]]`
            Tok::LBrack => {
                let inner = self.matching_close(after_name);
                inner == after_name + 1
                    || matches!(at(inner + 1), Tok::Ident(_) | Tok::LParen)
                    || starts_type_literal(at(inner + 1))
            }
            // `[P *[]int]` vs. `[N * 2]`
            Tok::Star => starts_type_literal(at(after_name + 1)),
            // `[P (interface{ M() })]` vs. `[len(x)]`
            Tok::LParen => starts_type_literal(at(after_name + 1)),
            _ => false,
        }
    }

    fn has_top_level_comma(&self, from: usize, to: usize) -> bool {
        let mut depth = 0usize;
        for (_, tok, _) in &self.toks[from.min(to)..to] {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth = depth.saturating_sub(1),
                Tok::Comma if depth == 0 => return true,
                _ => {}
            }
        }
        false
    }

    fn parse_type_params(&mut self) -> PResult<ListRef<FieldId>> {
        self.expect(is_lbrack, "'['")?;
        let mut entries = Vec::new();
        while !self.at(is_rbrack) {
            let start = self.start();
            let name = self.ident()?;
            let entry = if self.at(is_comma) || self.at(is_rbrack) {
                ParamDecl::pending(name)
            } else {
                let typ = self.parse_constraint()?;
                ParamDecl {
                    names: SmallVec::from_elem(name, 1),
                    ellipsis_pos: None,
                    typ: Some(typ),
                    span: self.span_from(start),
                }
            };
            entries.push(entry);
            if self.eat(is_comma).is_none() {
                break;
            }
        }
        self.expect(is_rbrack, "']'")?;
        let fields = resolve_param_list(&mut self.arena, entries);
        Ok(self.arena.list_fields(fields))
    }

    fn parse_func_decl(&mut self) -> PResult<FuncDeclId> {
        let start = self.start();
        let doc = self.comments.lead_for(start);
        let (s, _, e) = self.bump();
        let func_pos = Span::new(s, e);

        let recv = if self.at(is_lparen) {
            let params = self.parse_params()?;
            match self.arena.fields_list(params).first().copied() {
                Some(id) => {
                    let field = self.arena.fields[id];
                    Some(Receiver {
                        name: self.arena.ident_names(field.names).first().copied(),
                        typ: field.typ,
                    })
                }
                None => {
                    return Err(Diag::parse(self.span_from(start), "method has no receiver"));
                }
            }
        } else {
            None
        };

        let name = self.ident()?;
        let type_params = if recv.is_none() && self.at(is_lbrack) {
            self.parse_type_params()?
        } else {
            ListRef::EMPTY
        };
        let signature = self.parse_signature(start)?;
        let body = if self.at(is_lbrace) {
            Some(self.skip_balanced()?)
        } else {
            None
        };

        let decl = FuncDecl {
            doc,
            func_pos,
            recv,
            name,
            type_params,
            signature,
            body,
        };
        Ok(self.arena.funcs.alloc(decl, self.span_from(start)))
    }

    fn ident_list(&mut self) -> PResult<ListRef<IdentName>> {
        let mut names: SmallVec<[IdentName; 4]> = SmallVec::new();
        names.push(self.ident()?);
        while self.eat(is_comma).is_some() {
            names.push(self.ident()?);
        }
        Ok(self.arena.list_ident_names(names))
    }
}

// =============================================================================
// Signatures
// =============================================================================

impl<'src> Parser<'src> {
    fn parse_signature(&mut self, start: usize) -> PResult<SignatureId> {
        let params = self.parse_params()?;
        let results = if self.at(is_lparen) {
            Some(Results::Params(self.parse_params()?))
        } else if self.at(starts_type) {
            Some(Results::Type(self.parse_type()?))
        } else {
            None
        };
        let sig = Signature { params, results };
        Ok(self.arena.signatures.alloc(sig, self.span_from(start)))
    }

    fn parse_params(&mut self) -> PResult<ListRef<FieldId>> {
        self.expect(is_lparen, "'('")?;
        let mut entries = Vec::new();
        while !self.at(is_rparen) {
            entries.push(self.parse_param_entry()?);
            if self.eat(is_comma).is_none() {
                break;
            }
        }
        self.expect(is_rparen, "')'")?;
        let fields = resolve_param_list(&mut self.arena, entries);
        Ok(self.arena.list_fields(fields))
    }

    fn parse_param_entry(&mut self) -> PResult<ParamDecl> {
        let start = self.start();

        if let Tok::Ident(_) = self.peek() {
            // `T[int]` is a generic type when `[` touches the name
            let adjacent_bracket =
                self.at_offset_is(1, is_lbrack) && self.tok_span(0).end == self.tok_span(1).start;
            match self.peek_at(1) {
                Tok::Comma | Tok::RParen => {
                    let name = self.ident()?;
                    return Ok(ParamDecl::pending(name));
                }
                Tok::Dot => {}
                _ if adjacent_bracket => {}
                Tok::Ellipsis => {
                    let name = self.ident()?;
                    let ellipsis_pos = self.eat(is_ellipsis);
                    let typ = self.parse_type()?;
                    return Ok(ParamDecl {
                        names: SmallVec::from_elem(name, 1),
                        ellipsis_pos,
                        typ: Some(typ),
                        span: self.span_from(start),
                    });
                }
                next if starts_type(next) || is_lparen(next) => {
                    let name = self.ident()?;
                    let typ = self.parse_type()?;
                    return Ok(ParamDecl {
                        names: SmallVec::from_elem(name, 1),
                        ellipsis_pos: None,
                        typ: Some(typ),
                        span: self.span_from(start),
                    });
                }
                _ => {}
            }
        }

        let ellipsis_pos = self.eat(is_ellipsis);
        let typ = self.parse_type()?;
        Ok(ParamDecl {
            names: SmallVec::new(),
            ellipsis_pos,
            typ: Some(typ),
            span: self.span_from(start),
        })
    }

    #[inline]
    fn at_offset_is(&self, k: usize, pred: fn(&Tok<'_>) -> bool) -> bool {
        pred(self.peek_at(k))
    }
}

// =============================================================================
// Types
// =============================================================================

impl<'src> Parser<'src> {
    fn parse_type(&mut self) -> PResult<TypeId> {
        let start = self.start();
        let typ = match self.peek() {
            Tok::Ident(_) => self.parse_named_type()?,
            Tok::Star => {
                let star_pos = self.tok_span(0);
                self.bump();
                let elem = self.parse_type()?;
                Type::Pointer { star_pos, elem }
            }
            Tok::LBrack => {
                self.bump();
                if self.eat(is_rbrack).is_some() {
                    Type::Slice {
                        elem: self.parse_type()?,
                    }
                } else if let Some(ell) = self.eat(is_ellipsis) {
                    self.expect(is_rbrack, "']'")?;
                    Type::Array {
                        len: ArrayLen::Ellipsis(ell),
                        elem: self.parse_type()?,
                    }
                } else {
                    let len = self.parse_expr()?;
                    self.expect(is_rbrack, "']'")?;
                    Type::Array {
                        len: ArrayLen::Expr(len),
                        elem: self.parse_type()?,
                    }
                }
            }
            Tok::KwMap => {
                self.bump();
                self.expect(is_lbrack, "'['")?;
                let key = self.parse_type()?;
                self.expect(is_rbrack, "']'")?;
                let val = self.parse_type()?;
                Type::Map { key, val }
            }
            Tok::KwChan => {
                self.bump();
                let dir = if self.eat(is_arrow).is_some() {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    elem: self.parse_type()?,
                }
            }
            Tok::Arrow => {
                self.bump();
                self.expect(is_chan, "'chan'")?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    elem: self.parse_type()?,
                }
            }
            Tok::KwStruct => self.parse_struct_type()?,
            Tok::KwInterface => self.parse_interface_type()?,
            Tok::KwFunc => {
                self.bump();
                Type::Func {
                    sig: self.parse_signature(start)?,
                }
            }
            Tok::LParen => {
                self.bump();
                let typ = self.parse_type()?;
                self.expect(is_rparen, "')'")?;
                Type::Paren { typ }
            }
            _ => return self.unexpected("type"),
        };
        Ok(self.arena.types.alloc(typ, self.span_from(start)))
    }

    fn parse_named_type(&mut self) -> PResult<Type> {
        let first = self.ident()?;
        let (pkg, name) = if self.eat(is_dot).is_some() {
            (Some(first), self.ident()?)
        } else {
            (None, first)
        };
        let args = if self.at(is_lbrack) {
            self.bump();
            let mut args = Vec::new();
            while !self.at(is_rbrack) {
                args.push(self.parse_type()?);
                if self.eat(is_comma).is_none() {
                    break;
                }
            }
            self.expect(is_rbrack, "']'")?;
            self.arena.list_types(args)
        } else {
            ListRef::EMPTY
        };
        Ok(Type::Named { pkg, name, args })
    }

    /// Type-parameter constraint: a type or a union of `~`-terms.
    fn parse_constraint(&mut self) -> PResult<TypeId> {
        let start = self.start();
        let terms = self.parse_type_terms()?;
        if let [TypeTerm::Type { typ }] = *self.arena.type_terms(terms) {
            return Ok(typ);
        }
        let span = self.span_from(start);
        Ok(self.arena.types.alloc(Type::Union { terms }, span))
    }

    fn parse_type_terms(&mut self) -> PResult<ListRef<TypeTerm>> {
        let mut terms = Vec::new();
        loop {
            let term = match self.peek() {
                Tok::Tilde => {
                    let tilde_pos = self.tok_span(0);
                    self.bump();
                    TypeTerm::Tilde {
                        tilde_pos,
                        typ: self.parse_type()?,
                    }
                }
                _ => TypeTerm::Type {
                    typ: self.parse_type()?,
                },
            };
            terms.push(term);
            if self.eat(is_pipe).is_none() {
                break;
            }
        }
        Ok(self.arena.list_type_terms(terms))
    }

    fn parse_struct_type(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(is_lbrace, "'{'")?;
        let mut fields = Vec::new();
        loop {
            match self.peek() {
                Tok::RBrace | Tok::Eof => break,
                Tok::Semi => {
                    self.bump();
                }
                _ => {
                    fields.push(self.parse_struct_field()?);
                    self.expect_semi()?;
                }
            }
        }
        self.expect(is_rbrace, "'}'")?;
        Ok(Type::Struct {
            fields: self.arena.list_fields(fields),
        })
    }

    fn parse_struct_field(&mut self) -> PResult<FieldId> {
        let start = self.start();
        let doc = self.comments.lead_for(start);

        let (names, typ, is_embed) = if self.field_is_embedded() {
            (ListRef::EMPTY, self.parse_type()?, true)
        } else {
            let names = self.ident_list()?;
            (names, self.parse_type()?, false)
        };

        let tag = if self.peek().is_string() {
            Some(self.string_lit("tag")?)
        } else {
            None
        };

        let field = Field {
            names,
            ellipsis_pos: None,
            typ,
            tag,
            is_embed,
            doc,
            comment: self.comments.line_after(self.prev_end),
        };
        Ok(self.arena.fields.alloc(field, self.span_from(start)))
    }

    /// `*T`, `pkg.T`, `T` and `T[A]` alone on a field line are embedded
    /// fields; `Name [N]T` is a named field of array type.
    fn field_is_embedded(&self) -> bool {
        fn ends_field(t: &Tok<'_>) -> bool {
            matches!(t, Tok::Semi | Tok::RBrace | Tok::Eof) || t.is_string()
        }

        match (self.peek(), self.peek_at(1)) {
            (Tok::Star, _) => true,
            (Tok::Ident(_), Tok::Dot) => true,
            (Tok::Ident(_), next) if ends_field(next) => true,
            (Tok::Ident(_), Tok::LBrack) => {
                let close = self.matching_close(self.pos + 1);
                ends_field(&self.toks[(close + 1).min(self.toks.len() - 1)].1)
            }
            _ => false,
        }
    }

    /// Index of the bracket closing the one at `open`.
    fn matching_close(&self, open: usize) -> usize {
        let mut depth = 0usize;
        for (i, (_, tok, _)) in self.toks.iter().enumerate().skip(open) {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i;
                    }
                }
                Tok::Eof => return i,
                _ => {}
            }
        }
        self.toks.len() - 1
    }

    fn parse_interface_type(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(is_lbrace, "'{'")?;
        let mut elems = Vec::new();
        loop {
            match self.peek() {
                Tok::RBrace | Tok::Eof => break,
                Tok::Semi => {
                    self.bump();
                }
                _ => {
                    elems.push(self.parse_interface_elem()?);
                    self.expect_semi()?;
                }
            }
        }
        self.expect(is_rbrace, "'}'")?;
        Ok(Type::Interface {
            elems: self.arena.list_interface_elems(elems),
        })
    }

    fn parse_interface_elem(&mut self) -> PResult<InterfaceElem> {
        let start = self.start();
        let doc = self.comments.lead_for(start);
        if matches!(self.peek(), Tok::Ident(_)) && self.at_offset_is(1, is_lparen) {
            let name = self.ident()?;
            let sig = self.parse_signature(start)?;
            return Ok(InterfaceElem::Method {
                name,
                sig,
                doc,
                comment: self.comments.line_after(self.prev_end),
            });
        }
        let terms = self.parse_type_terms()?;
        Ok(InterfaceElem::Embed {
            terms,
            doc,
            comment: self.comments.line_after(self.prev_end),
        })
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl<'src> Parser<'src> {
    fn expr_list(&mut self) -> PResult<ListRef<ExprId>> {
        let mut exprs = Vec::new();
        loop {
            exprs.push(self.parse_expr()?);
            if self.eat(is_comma).is_none() {
                break;
            }
        }
        Ok(self.arena.list_exprs(exprs))
    }

    /// A simple operand (literal, name, `pkg.Name`, unary over those) that
    /// ends the expression is parsed; anything else becomes `Expr::Opaque`.
    fn parse_expr(&mut self) -> PResult<ExprId> {
        match self.simple_operand_len(self.pos) {
            Some(n) if ends_expr(self.peek_at(n)) => self.parse_simple_operand(),
            _ => self.skip_expr(),
        }
    }

    fn simple_operand_len(&self, at: usize) -> Option<usize> {
        let tok = &self.toks.get(at)?.1;
        match tok {
            Tok::Int(_) | Tok::Float(_) | Tok::Imag(_) | Tok::Rune(_) | Tok::Str(_) | Tok::RawStr(_) => {
                Some(1)
            }
            Tok::Ident(_) => {
                let dotted = matches!(self.toks.get(at + 1), Some((_, Tok::Dot, _)))
                    && matches!(self.toks.get(at + 2), Some((_, Tok::Ident(_), _)));
                Some(if dotted { 3 } else { 1 })
            }
            Tok::Plus | Tok::Minus | Tok::Bang | Tok::Caret | Tok::Star | Tok::Amp | Tok::Arrow => {
                self.simple_operand_len(at + 1).map(|n| n + 1)
            }
            _ => None,
        }
    }

    fn parse_simple_operand(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let expr = match *self.peek() {
            Tok::Int(_) => self.basic_lit(BasicLitKind::Int),
            Tok::Float(_) => self.basic_lit(BasicLitKind::Float),
            Tok::Imag(_) => self.basic_lit(BasicLitKind::Imag),
            Tok::Rune(_) => self.basic_lit(BasicLitKind::Rune),
            Tok::Str(_) | Tok::RawStr(_) => self.basic_lit(BasicLitKind::String),
            Tok::Ident(_) => {
                let first = self.ident()?;
                if self.eat(is_dot).is_some() {
                    let x = self.arena.exprs.alloc(Expr::Ident(first), first.pos);
                    Expr::Selector {
                        expr: x,
                        sel: self.ident()?,
                    }
                } else {
                    Expr::Ident(first)
                }
            }
            ref t => {
                let op = match t {
                    Tok::Plus => UnaryOp::Add,
                    Tok::Minus => UnaryOp::Sub,
                    Tok::Bang => UnaryOp::Not,
                    Tok::Caret => UnaryOp::Xor,
                    Tok::Star => UnaryOp::Deref,
                    Tok::Amp => UnaryOp::Addr,
                    Tok::Arrow => UnaryOp::Recv,
                    _ => return self.unexpected("expression"),
                };
                let op_pos = self.tok_span(0);
                self.bump();
                Expr::Unary {
                    op,
                    op_pos,
                    expr: self.parse_simple_operand()?,
                }
            }
        };
        Ok(self.arena.exprs.alloc(expr, self.span_from(start)))
    }

    fn basic_lit(&mut self, kind: BasicLitKind) -> Expr {
        let (s, _, e) = self.bump();
        Expr::BasicLit(BasicLit {
            kind,
            raw: Span::new(s, e),
        })
    }

    /// Skips to the end of the current expression, balancing brackets.
    fn skip_expr(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let mut depth = 0usize;
        loop {
            let tok = self.peek();
            if depth == 0 && ends_expr(tok) {
                break;
            }
            match tok {
                Tok::Eof => return self.unexpected("end of expression"),
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        if self.prev_end <= start {
            return self.unexpected("expression");
        }
        let span = self.span_from(start);
        Ok(self.arena.exprs.alloc(Expr::Opaque(span), span))
    }

    /// Skips a `{ ... }` block and returns its span, braces included.
    fn skip_balanced(&mut self) -> PResult<Span> {
        let start = self.start();
        let close = self.matching_close(self.pos);
        while self.pos < close {
            self.bump();
        }
        self.expect(is_rbrace, "'}'")?;
        Ok(self.span_from(start))
    }
}
