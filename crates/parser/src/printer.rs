//! Type and expression printing in `gofmt` spelling.

use std::fmt::Write as _;

use crate::ast::*;
use crate::parser::ParsedFile;

impl ParsedFile {
    /// `gofmt` rendering of a type: `map[string][]*pkg.T`, `chan<- int`,
    /// `func(a int) (int, error)`.
    pub fn type_string(&self, id: TypeId) -> String {
        let mut out = String::new();
        Printer { file: self, out: &mut out }.typ(id);
        out
    }

    pub fn expr_string(&self, id: ExprId) -> String {
        let mut out = String::new();
        Printer { file: self, out: &mut out }.expr(id);
        out
    }
}

struct Printer<'a> {
    file: &'a ParsedFile,
    out: &'a mut String,
}

impl Printer<'_> {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn ident(&mut self, name: IdentName) {
        let file = self.file;
        self.out.push_str(file.name(name));
    }

    fn typ(&mut self, id: TypeId) {
        let file = self.file;
        let arena = &file.arena;
        match arena.types[id] {
            Type::Named { pkg, name, args } => {
                if let Some(pkg) = pkg {
                    self.ident(pkg);
                    self.push(".");
                }
                self.ident(name);
                if !args.is_empty() {
                    self.push("[");
                    self.type_list(arena.types_list(args));
                    self.push("]");
                }
            }
            Type::Pointer { elem, .. } => {
                self.push("*");
                self.typ(elem);
            }
            Type::Array { len, elem } => {
                self.push("[");
                match len {
                    ArrayLen::Expr(e) => self.expr(e),
                    ArrayLen::Ellipsis(_) => self.push("..."),
                }
                self.push("]");
                self.typ(elem);
            }
            Type::Slice { elem } => {
                self.push("[]");
                self.typ(elem);
            }
            Type::Map { key, val } => {
                self.push("map[");
                self.typ(key);
                self.push("]");
                self.typ(val);
            }
            Type::Chan { dir, elem } => {
                self.push(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                // `chan (<-chan T)` keeps its parens
                let recv_elem = dir != ChanDir::Recv
                    && matches!(arena.types[elem], Type::Chan { dir: ChanDir::Recv, .. });
                if recv_elem {
                    self.push("(");
                    self.typ(elem);
                    self.push(")");
                } else {
                    self.typ(elem);
                }
            }
            Type::Struct { fields } => {
                let fields = arena.fields_list(fields);
                if fields.is_empty() {
                    self.push("struct{}");
                    return;
                }
                self.push("struct{ ");
                for (i, &f) in fields.iter().enumerate() {
                    if i > 0 {
                        self.push("; ");
                    }
                    self.field(f);
                    if let Some(tag) = arena.fields[f].tag {
                        self.push(" ");
                        self.push(file.text(tag.raw));
                    }
                }
                self.push(" }");
            }
            Type::Interface { elems } => {
                let elems = arena.interface_elems(elems);
                if elems.is_empty() {
                    self.push("interface{}");
                    return;
                }
                self.push("interface{ ");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.push("; ");
                    }
                    match *elem {
                        InterfaceElem::Method { name, sig, .. } => {
                            self.ident(name);
                            self.signature(sig);
                        }
                        InterfaceElem::Embed { terms, .. } => self.terms(terms),
                    }
                }
                self.push(" }");
            }
            Type::Func { sig } => {
                self.push("func");
                self.signature(sig);
            }
            Type::Paren { typ } => {
                self.push("(");
                self.typ(typ);
                self.push(")");
            }
            Type::Union { terms } => self.terms(terms),
            Type::Bad(_) => {}
        }
    }

    fn type_list(&mut self, ids: &[TypeId]) {
        for (i, &t) in ids.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.typ(t);
        }
    }

    fn terms(&mut self, terms: ListRef<TypeTerm>) {
        let file = self.file;
        let arena = &file.arena;
        for (i, term) in arena.type_terms(terms).iter().enumerate() {
            if i > 0 {
                self.push(" | ");
            }
            match *term {
                TypeTerm::Tilde { typ, .. } => {
                    self.push("~");
                    self.typ(typ);
                }
                TypeTerm::Type { typ } => self.typ(typ),
            }
        }
    }

    fn signature(&mut self, id: SignatureId) {
        let sig = self.file.arena.signatures[id];
        self.params(sig.params);
        match sig.results {
            None => {}
            Some(Results::Type(t)) => {
                self.push(" ");
                self.typ(t);
            }
            Some(Results::Params(list)) => {
                self.push(" ");
                self.params(list);
            }
        }
    }

    fn params(&mut self, list: ListRef<FieldId>) {
        let file = self.file;
        self.push("(");
        for (i, &f) in file.arena.fields_list(list).iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.field(f);
        }
        self.push(")");
    }

    /// `a, b T`, `...T` or an embedded `T`.
    fn field(&mut self, id: FieldId) {
        let file = self.file;
        let field = file.arena.fields[id];
        let names = file.arena.ident_names(field.names);
        for (i, &n) in names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(n);
        }
        if !names.is_empty() {
            self.push(" ");
        }
        if field.ellipsis_pos.is_some() {
            self.push("...");
        }
        self.typ(field.typ);
    }

    fn expr(&mut self, id: ExprId) {
        let file = self.file;
        match file.arena.exprs[id] {
            Expr::Ident(name) => self.ident(name),
            Expr::BasicLit(lit) => self.push(file.text(lit.raw)),
            Expr::Selector { expr, sel } => {
                self.expr(expr);
                self.push(".");
                self.ident(sel);
            }
            Expr::Unary { op, expr, .. } => {
                self.push(op.as_str());
                self.expr(expr);
            }
            Expr::Opaque(span) => {
                let _ = write!(self.out, "{}", file.text(span));
            }
        }
    }
}
