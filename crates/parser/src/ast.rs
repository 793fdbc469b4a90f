//! # Declaration-level Go AST
//!
//! The tree models what top-level collection needs from a Go source file:
//! the package clause, import/const/var/type declarations, function and
//! method declarations, the complete type grammar, and the comment groups
//! attached to all of them. Function bodies and non-trivial initializers are
//! kept as opaque spans into the source.
//!
//! ## Architecture
//!
//! - **Nodes**: allocated in typed arenas (`SpannedArena<T>`), addressed by `Id<T>`
//! - **Lists**: centralized buffers in `ExtraData`, addressed by `ListRef<T>`
//! - **Spans**: stored in side tables next to the nodes
//! - **Symbols**: identifiers are interned once (`Interner`)
//!
//! Walk/Visitor infrastructure lives in `walk.rs`; `#[derive(WalkAst)]`
//! generates `impl crate::walk::Walk`. Fields marked `#[walk(skip)]` hold
//! attached comment groups, which are visited through `SourceFile::comments`.

use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use goir_ast_derive::WalkAst;
use std::collections::HashMap;

// =============================================================================
// Core Foundation Types
// =============================================================================

/// Byte range into the source file.
///
/// Positions are stored as `u32`, limiting file size to 4GB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= u32::MAX as usize);
        debug_assert!(end <= u32::MAX as usize);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    #[inline]
    pub fn empty_at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Type-safe identifier for arena-allocated nodes.
#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Id<T> {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn to_usize(&self) -> usize {
        self.raw as usize
    }
}

/// Typed reference into a centralized list buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for ListRef<T> {}

impl<T> Clone for ListRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> ListRef<T> {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    const fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

// =============================================================================
// Symbol Interning
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identifier occurrence (interned symbol + source position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct IdentName {
    pub sym: Symbol,
    pub pos: Span,
}

/// String interner; every identifier spelling is stored once per file.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: HashMap<Box<str>, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(s) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.into());
        self.lookup.insert(s.into(), sym);
        sym
    }

    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

// =============================================================================
// Arena Allocation
// =============================================================================

/// Nodes and their spans in parallel vectors.
#[derive(Debug)]
pub struct SpannedArena<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedArena<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedArena<T> {
    #[inline]
    pub fn alloc(&mut self, node: T, span: Span) -> Id<T> {
        let id = Id::from_raw(self.data.len() as u32);
        self.data.push(node);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn get(&self, id: Id<T>) -> &T {
        &self.data[id.to_usize()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.data[id.to_usize()]
    }

    #[inline]
    pub fn span(&self, id: Id<T>) -> Span {
        self.spans[id.to_usize()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<Id<T>> for SpannedArena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &T {
        self.get(id)
    }
}

impl<T> IndexMut<Id<T>> for SpannedArena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        self.get_mut(id)
    }
}

// =============================================================================
// Node IDs
// =============================================================================

pub type GenDeclId = Id<GenDecl>;
pub type FuncDeclId = Id<FuncDecl>;
pub type ExprId = Id<Expr>;
pub type TypeId = Id<Type>;
pub type FieldId = Id<Field>;
pub type SignatureId = Id<Signature>;
pub type CommentId = Id<Comment>;
pub type CommentGroupId = Id<CommentGroup>;

// =============================================================================
// Centralized List Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct ExtraData {
    pub ident_names: Vec<IdentName>,
    pub exprs: Vec<ExprId>,
    pub types: Vec<TypeId>,
    pub fields: Vec<FieldId>,
    pub specs: Vec<Spec>,
    pub top_decls: Vec<TopLevelDecl>,
    pub type_terms: Vec<TypeTerm>,
    pub interface_elems: Vec<InterfaceElem>,
    pub comment_ids: Vec<CommentId>,
    pub comment_group_ids: Vec<CommentGroupId>,
}

// =============================================================================
// Main AST Arena
// =============================================================================

#[derive(Debug, Default)]
pub struct AstArena {
    pub gen_decls: SpannedArena<GenDecl>,
    pub funcs: SpannedArena<FuncDecl>,
    pub exprs: SpannedArena<Expr>,
    pub types: SpannedArena<Type>,
    pub signatures: SpannedArena<Signature>,
    pub fields: SpannedArena<Field>,
    pub comments: SpannedArena<Comment>,
    pub comment_groups: SpannedArena<CommentGroup>,
    pub extras: ExtraData,
}

macro_rules! list_accessors {
    ($($buf:ident: $t:ty => $push:ident, $get:ident;)*) => {
        impl AstArena {
            $(
                pub fn $push(&mut self, items: impl IntoIterator<Item = $t>) -> ListRef<$t> {
                    Self::push_list(&mut self.extras.$buf, items)
                }

                pub fn $get(&self, r: ListRef<$t>) -> &[$t] {
                    &self.extras.$buf[r.range()]
                }
            )*
        }
    };
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn push_list<T>(buf: &mut Vec<T>, items: impl IntoIterator<Item = T>) -> ListRef<T> {
        let start = buf.len();
        buf.extend(items);
        let len = buf.len() - start;
        if len == 0 {
            return ListRef::EMPTY;
        }
        ListRef::new(start as u32, len as u32)
    }
}

list_accessors! {
    ident_names: IdentName => list_ident_names, ident_names;
    exprs: ExprId => list_exprs, exprs_list;
    types: TypeId => list_types, types_list;
    fields: FieldId => list_fields, fields_list;
    specs: Spec => list_specs, specs_list;
    top_decls: TopLevelDecl => list_top_decls, top_decls;
    type_terms: TypeTerm => list_type_terms, type_terms;
    interface_elems: InterfaceElem => list_interface_elems, interface_elems;
    comment_ids: CommentId => list_comment_ids, comment_ids;
    comment_group_ids: CommentGroupId => list_comment_group_ids, comment_group_ids;
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// Comment token; its text is recovered from the source via the arena span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Comment {
    pub kind: CommentKind,
}

/// Run of comments on adjacent lines with no token in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct CommentGroup {
    pub comments: ListRef<CommentId>,
}

// =============================================================================
// Source File (Root Node)
// =============================================================================

/// `SourceFile = PackageClause ";" { ImportDecl ";" } { TopLevelDecl ";" }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct SourceFile {
    pub package_pos: Span,
    pub name: IdentName,
    /// Package doc comment (lead group above `package`)
    #[walk(skip)]
    pub doc: Option<CommentGroupId>,
    /// Every comment group in the file, in source order
    pub comments: ListRef<CommentGroupId>,
    pub decls: ListRef<TopLevelDecl>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum TopLevelDecl {
    Gen(GenDeclId),
    Func(FuncDeclId),
}

/// `import`, `const`, `type` or `var` declaration, single or parenthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct GenDecl {
    #[walk(skip)]
    pub doc: Option<CommentGroupId>,
    pub kw_pos: Span,
    pub kind: GenDeclKind,
    pub l_paren: Option<Span>,
    pub specs: ListRef<Spec>,
    pub r_paren: Option<Span>,
}

impl GenDecl {
    #[inline]
    pub fn is_grouped(&self) -> bool {
        self.l_paren.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GenDeclKind {
    Import,
    Const,
    Type,
    Var,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

/// `ImportSpec = [ "." | PackageName ] ImportPath`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct ImportSpec {
    #[walk(skip)]
    pub doc: Option<CommentGroupId>,
    pub name: Option<ImportName>,
    pub path: StringLit,
    #[walk(skip)]
    pub comment: Option<CommentGroupId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum ImportName {
    /// `import . "pkg"`
    Dot(Span),
    /// `import _ "pkg"`
    Blank(Span),
    /// `import name "pkg"`
    Name(IdentName),
}

/// `IdentifierList [ Type ] [ "=" ExpressionList ]` (const or var)
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct ValueSpec {
    #[walk(skip)]
    pub doc: Option<CommentGroupId>,
    pub names: ListRef<IdentName>,
    pub typ: Option<TypeId>,
    pub values: ListRef<ExprId>,
    #[walk(skip)]
    pub comment: Option<CommentGroupId>,
}

/// `TypeSpec = AliasDecl | TypeDef`
///
/// Type parameters are stored as fields (names + constraint); the list is
/// empty for non-generic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeSpec {
    #[walk(skip)]
    pub doc: Option<CommentGroupId>,
    pub name: IdentName,
    pub type_params: ListRef<FieldId>,
    /// Position of `=` for an alias declaration
    pub assign_pos: Option<Span>,
    pub typ: TypeId,
    #[walk(skip)]
    pub comment: Option<CommentGroupId>,
}

impl TypeSpec {
    #[inline]
    pub fn is_alias(&self) -> bool {
        self.assign_pos.is_some()
    }
}

/// ```text
/// FunctionDecl = "func" FunctionName [ TypeParameters ] Signature [ FunctionBody ]
/// MethodDecl   = "func" Receiver MethodName Signature [ FunctionBody ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct FuncDecl {
    #[walk(skip)]
    pub doc: Option<CommentGroupId>,
    pub func_pos: Span,
    pub recv: Option<Receiver>,
    pub name: IdentName,
    pub type_params: ListRef<FieldId>,
    pub signature: SignatureId,
    /// Body braces included; `None` for external declarations
    pub body: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Receiver {
    pub name: Option<IdentName>,
    pub typ: TypeId,
}

// =============================================================================
// Signatures and Fields
// =============================================================================

/// `Signature = Parameters [ Result ]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Signature {
    pub params: ListRef<FieldId>,
    pub results: Option<Results>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Results {
    /// Parenthesized: `(int, error)`, `(n int)`
    Params(ListRef<FieldId>),
    /// Single bare type: `error`
    Type(TypeId),
}

/// Parameter, result, type parameter or struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Field {
    /// Empty for unnamed parameters and embedded fields
    pub names: ListRef<IdentName>,
    /// `...` of a variadic parameter
    pub ellipsis_pos: Option<Span>,
    pub typ: TypeId,
    /// Struct tag (struct fields only)
    pub tag: Option<StringLit>,
    pub is_embed: bool,
    #[walk(skip)]
    pub doc: Option<CommentGroupId>,
    #[walk(skip)]
    pub comment: Option<CommentGroupId>,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Type {
    /// `Name`, `pkg.Name`, `Name[T, U]`
    Named {
        pkg: Option<IdentName>,
        name: IdentName,
        args: ListRef<TypeId>,
    },

    /// `*T`
    Pointer { star_pos: Span, elem: TypeId },

    /// `[N]T` or `[...]T`
    Array { len: ArrayLen, elem: TypeId },

    /// `[]T`
    Slice { elem: TypeId },

    /// `map[K]V`
    Map { key: TypeId, val: TypeId },

    /// `chan T`, `chan<- T`, `<-chan T`
    Chan { dir: ChanDir, elem: TypeId },

    Struct { fields: ListRef<FieldId> },

    Interface { elems: ListRef<InterfaceElem> },

    /// `func(...) ...`
    Func { sig: SignatureId },

    /// `(T)`
    Paren { typ: TypeId },

    /// Constraint union: `~int | string`
    Union { terms: ListRef<TypeTerm> },

    Bad(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum ArrayLen {
    Expr(ExprId),
    Ellipsis(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum TypeTerm {
    Tilde { tilde_pos: Span, typ: TypeId },
    Type { typ: TypeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum InterfaceElem {
    /// `Method(params) results`
    Method {
        name: IdentName,
        sig: SignatureId,
        #[walk(skip)]
        doc: Option<CommentGroupId>,
        #[walk(skip)]
        comment: Option<CommentGroupId>,
    },

    /// Embedded interface or type-set element: `io.Reader`, `~int | ~string`
    Embed {
        terms: ListRef<TypeTerm>,
        #[walk(skip)]
        doc: Option<CommentGroupId>,
        #[walk(skip)]
        comment: Option<CommentGroupId>,
    },
}

// =============================================================================
// Expressions
// =============================================================================

/// Only the operand shapes top-level collection inspects are modelled;
/// everything else is an opaque span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Expr {
    Ident(IdentName),
    BasicLit(BasicLit),
    /// `x.sel`
    Selector { expr: ExprId, sel: IdentName },
    Unary {
        op: UnaryOp,
        op_pos: Span,
        expr: ExprId,
    },
    Opaque(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: BasicLitKind,
    pub raw: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BasicLitKind {
    Int,
    Float,
    Imag,
    Rune,
    String,
}

impl BasicLitKind {
    /// Token name as the Go toolchain spells it.
    pub const fn token_name(self) -> &'static str {
        match self {
            BasicLitKind::Int => "INT",
            BasicLitKind::Float => "FLOAT",
            BasicLitKind::Imag => "IMAG",
            BasicLitKind::Rune => "CHAR",
            BasicLitKind::String => "STRING",
        }
    }
}

/// Interpreted or raw string literal, quotes included in `raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLit {
    pub raw: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Add,   // +
    Sub,   // -
    Not,   // !
    Xor,   // ^
    Deref, // *
    Addr,  // &
    Recv,  // <-
}

impl UnaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Add => "+",
            UnaryOp::Sub => "-",
            UnaryOp::Not => "!",
            UnaryOp::Xor => "^",
            UnaryOp::Deref => "*",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
        }
    }
}
