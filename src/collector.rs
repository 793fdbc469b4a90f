//! Per-file declaration collection.
//!
//! [`FileCollector`] walks one parsed file's top-level declarations in a
//! single pass and builds its [`File`] record. Methods go through the
//! [`MethodBinder`] and are attached once the pass is over.

use goir_parser::ast::{
    AstArena, CommentGroupId, Expr, ExprId, FieldId, FuncDeclId, GenDeclId, GenDeclKind,
    ImportName, ImportSpec, InterfaceElem, ListRef, Spec, Type, TypeId, TypeSpec, TypeTerm,
    UnaryOp, ValueSpec,
};
use goir_parser::{ParsedFile, Visitor};
use tracing::{debug, trace};

use crate::binder::MethodBinder;
use crate::classify::{self, Classified};
use crate::ir::{
    Comment, Const, EmbeddedInterface, File, Func, GenerateComment, Import, Interface,
    InterfaceField, MagicComment, Method, Struct, StructField, TypeDefinition, Var,
};
use crate::normalize::Normalizer;

/// Exported names start with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Collects one parsed file into its IR record, named `name`.
pub fn collect_file(name: &str, parsed: &ParsedFile) -> File {
    let mut collector = FileCollector::new(parsed);
    collector.visit_source_file(&parsed.arena, &parsed.root);
    let mut file = collector.finish();
    file.name = name.to_owned();
    debug!(
        file = name,
        package = %file.package,
        structs = file.structs.len(),
        type_defs = file.type_defs.len(),
        interfaces = file.interfaces.len(),
        funcs = file.funcs.len(),
        "collected file"
    );
    file
}

/// Doc-derived annotations shared by every declaration record.
#[derive(Debug, Clone, Default)]
struct Notes {
    doc: Comment,
    comment: Comment,
    magic: Vec<MagicComment>,
    generate: Vec<GenerateComment>,
}

pub struct FileCollector<'f> {
    file: &'f ParsedFile,
    norm: Normalizer<'f>,
    out: File,
    binder: MethodBinder,
}

impl<'f> FileCollector<'f> {
    pub fn new(file: &'f ParsedFile) -> Self {
        Self {
            file,
            norm: Normalizer::new(file),
            out: File {
                package: file.package_name().to_owned(),
                ..Default::default()
            },
            binder: MethodBinder::new(),
        }
    }

    /// Binds parked methods and returns the record. The name is left empty.
    pub fn finish(self) -> File {
        let FileCollector {
            mut out, binder, ..
        } = self;
        binder.bind(&mut out.structs, &mut out.type_defs);
        out
    }

    fn texts(&self, group: CommentGroupId) -> impl Iterator<Item = &'f str> + 'f {
        let file = self.file;
        file.arena
            .comment_ids(file.arena.comment_groups[group].comments)
            .iter()
            .map(move |&c| file.text(file.arena.comments.span(c)))
    }

    fn classify_group(&self, group: Option<CommentGroupId>) -> Classified {
        match group {
            Some(g) => classify::classify(self.texts(g)),
            None => Classified::default(),
        }
    }

    fn notes(&self, doc: Option<CommentGroupId>, comment: Option<CommentGroupId>) -> Notes {
        let lead = self.classify_group(doc);
        Notes {
            doc: lead.doc,
            comment: self.classify_group(comment).doc,
            magic: lead.magic,
            generate: lead.generate,
        }
    }

    fn import(&mut self, spec: ImportSpec) {
        let file = self.file;
        let name = match spec.name {
            None => String::new(),
            Some(ImportName::Dot(_)) => ".".to_owned(),
            Some(ImportName::Blank(_)) => "_".to_owned(),
            Some(ImportName::Name(n)) => file.name(n).to_owned(),
        };
        let notes = self.notes(spec.doc, spec.comment);
        self.out.imports.push(Import {
            name,
            path: file.text(spec.path.raw).to_owned(),
            doc: notes.doc,
            comment: notes.comment,
            magic_comments: notes.magic,
            generate_comments: notes.generate,
        });
    }

    /// Direct literal, or a signed literal such as `-1`.
    fn literal(&self, id: ExprId) -> Option<(&'static str, String)> {
        let file = self.file;
        match file.arena.exprs[id] {
            Expr::BasicLit(lit) => Some((lit.kind.token_name(), file.text(lit.raw).to_owned())),
            Expr::Unary {
                op: op @ (UnaryOp::Sub | UnaryOp::Add),
                expr,
                ..
            } => match file.arena.exprs[expr] {
                Expr::BasicLit(lit) => Some((
                    lit.kind.token_name(),
                    format!("{}{}", op.as_str(), file.text(lit.raw)),
                )),
                _ => None,
            },
            _ => None,
        }
    }

    fn value_spec(&mut self, kind: GenDeclKind, spec: ValueSpec, doc: Option<CommentGroupId>) {
        let file = self.file;
        let values = file.arena.exprs_list(spec.values);
        let notes = self.notes(doc, spec.comment);
        for (i, &ident) in file.arena.ident_names(spec.names).iter().enumerate() {
            let name = file.name(ident);
            if name == "_" {
                continue;
            }
            let Some(&init) = values.get(i) else {
                trace!(name, "no initializer to capture");
                continue;
            };
            let Some((lit_kind, value)) = self.literal(init) else {
                trace!(name, init = %file.expr_string(init), "initializer is not a literal");
                continue;
            };
            let notes = notes.clone();
            match kind {
                GenDeclKind::Const => self.out.consts.push(Const {
                    is_exported: is_exported(name),
                    name: name.to_owned(),
                    kind: lit_kind.to_owned(),
                    value,
                    doc: notes.doc,
                    comment: notes.comment,
                    magic_comments: notes.magic,
                    generate_comments: notes.generate,
                }),
                GenDeclKind::Var => self.out.vars.push(Var {
                    is_exported: is_exported(name),
                    name: name.to_owned(),
                    kind: lit_kind.to_owned(),
                    value,
                    doc: notes.doc,
                    comment: notes.comment,
                    magic_comments: notes.magic,
                    generate_comments: notes.generate,
                }),
                GenDeclKind::Import | GenDeclKind::Type => {}
            }
        }
    }

    fn type_spec(&mut self, spec: TypeSpec, doc: Option<CommentGroupId>) {
        let file = self.file;
        let name = file.name(spec.name).to_owned();
        let exported = is_exported(&name);
        let notes = self.notes(doc, spec.comment);
        match file.arena.types[spec.typ] {
            Type::Struct { fields } => {
                let fields = self.struct_fields(fields);
                self.out.structs.push(Struct {
                    is_exported: exported,
                    name,
                    doc: notes.doc,
                    comment: notes.comment,
                    magic_comments: notes.magic,
                    generate_comments: notes.generate,
                    fields,
                    methods: Vec::new(),
                });
            }
            Type::Interface { elems } => {
                let method_set = self.method_set(elems);
                self.out.interfaces.push(Interface {
                    is_exported: exported,
                    name,
                    doc: notes.doc,
                    comment: notes.comment,
                    method_set,
                    magic_comments: notes.magic,
                    generate_comments: notes.generate,
                });
            }
            Type::Named {
                pkg: None,
                name: target,
                args,
            } if args.is_empty() => {
                self.out.type_defs.push(TypeDefinition {
                    is_exported: exported,
                    name,
                    typ: file.name(target).to_owned(),
                    doc: notes.doc,
                    comment: notes.comment,
                    magic_comments: notes.magic,
                    generate_comments: notes.generate,
                    methods: Vec::new(),
                });
            }
            _ => trace!(name, typ = %file.type_string(spec.typ), "type declaration skipped"),
        }
    }

    /// One record per declared name; an embedded field yields one unnamed record.
    fn struct_fields(&self, list: ListRef<FieldId>) -> Vec<StructField> {
        let file = self.file;
        let mut out = Vec::new();
        for &id in file.arena.fields_list(list) {
            let field = file.arena.fields[id];
            let shape = self.norm.field(field.typ);
            let notes = self.notes(field.doc, field.comment);
            let base = StructField {
                indirect: shape.indirect,
                embed: field.is_embed,
                is_map: shape.is_map,
                is_interface: shape.is_interface,
                is_slice: shape.is_slice,
                is_array: shape.is_array,
                field_type: shape.field_type(),
                array_len: shape.array_len,
                doc: notes.doc,
                comment: notes.comment,
                magic_comments: notes.magic,
                generate_comments: notes.generate,
                tag: field
                    .tag
                    .map(|t| file.text(t.raw).to_owned())
                    .unwrap_or_default(),
                ..Default::default()
            };
            let names = file.arena.ident_names(field.names);
            if names.is_empty() {
                out.push(base);
                continue;
            }
            out.extend(names.iter().map(|&n| {
                let name = file.name(n);
                StructField {
                    name: name.to_owned(),
                    is_exported: is_exported(name),
                    ..base.clone()
                }
            }));
        }
        out
    }

    fn method_set(&self, elems: ListRef<InterfaceElem>) -> Vec<InterfaceField> {
        let file = self.file;
        let mut out = Vec::new();
        for elem in file.arena.interface_elems(elems) {
            match *elem {
                InterfaceElem::Method {
                    name,
                    sig,
                    doc,
                    comment,
                } => {
                    let name = file.name(name);
                    let notes = self.notes(doc, comment);
                    let (params, results) = self.norm.signature(sig);
                    out.push(InterfaceField::Method(Func {
                        is_exported: is_exported(name),
                        name: name.to_owned(),
                        doc: notes.doc,
                        comment: notes.comment,
                        magic_comments: notes.magic,
                        generate_comments: notes.generate,
                        params,
                        results,
                    }));
                }
                InterfaceElem::Embed { terms, .. } => match file.arena.type_terms(terms) {
                    [TypeTerm::Type { typ }] => match file.arena.types[*typ] {
                        Type::Named { name, .. } => {
                            out.push(InterfaceField::Embedded(EmbeddedInterface {
                                is_exported: is_exported(file.name(name)),
                                embed: true,
                                name: file.type_string(*typ),
                            }))
                        }
                        _ => trace!(typ = %file.type_string(*typ), "embedded element skipped"),
                    },
                    _ => trace!("type-set element skipped"),
                },
            }
        }
        out
    }

    /// Receiver type name, and whether it is taken by pointer.
    fn receiver(&self, mut id: TypeId) -> Option<(String, bool)> {
        let mut indirect = false;
        loop {
            match self.file.arena.types[id] {
                Type::Paren { typ } => id = typ,
                Type::Pointer { elem, .. } if !indirect => {
                    indirect = true;
                    id = elem;
                }
                Type::Named {
                    pkg: None, name, ..
                } => return Some((self.file.name(name).to_owned(), indirect)),
                _ => return None,
            }
        }
    }
}

impl<'f> Visitor<'f> for FileCollector<'f> {
    fn visit_comment_group(&mut self, _: &'f AstArena, id: CommentGroupId) {
        let classified = classify::classify(self.texts(id));
        self.out.build_tags.extend(classified.constraints);
        self.out.magic_comments.extend(classified.magic);
        self.out.generate_comments.extend(classified.generate);
        if !classified.doc.is_empty() {
            self.out.comments.push(classified.doc);
        }
    }

    fn visit_gen_decl(&mut self, _: &'f AstArena, id: GenDeclId) {
        let file = self.file;
        let decl = file.arena.gen_decls[id];
        // an ungrouped declaration's doc sits on the keyword
        let fallback = if decl.is_grouped() { None } else { decl.doc };
        for spec in file.arena.specs_list(decl.specs) {
            match *spec {
                Spec::Import(s) => self.import(ImportSpec {
                    doc: s.doc.or(fallback),
                    ..s
                }),
                Spec::Value(s) => self.value_spec(decl.kind, s, s.doc.or(fallback)),
                Spec::Type(s) => self.type_spec(s, s.doc.or(fallback)),
            }
        }
    }

    fn visit_func_decl(&mut self, _: &'f AstArena, id: FuncDeclId) {
        let file = self.file;
        let decl = file.arena.funcs[id];
        let name = file.name(decl.name).to_owned();
        let exported = is_exported(&name);
        let notes = self.notes(decl.doc, None);
        let (params, results) = self.norm.signature(decl.signature);

        let Some(recv) = decl.recv else {
            self.out.funcs.push(Func {
                is_exported: exported,
                name,
                doc: notes.doc,
                comment: notes.comment,
                magic_comments: notes.magic,
                generate_comments: notes.generate,
                params,
                results,
            });
            return;
        };

        let Some((receiver, receiver_indirect)) = self.receiver(recv.typ) else {
            trace!(method = %name, recv = %file.type_string(recv.typ), "receiver type not recognized");
            return;
        };
        let receiver_exported = is_exported(&receiver);
        self.binder.record(
            Method {
                is_exported: exported,
                name,
                doc: notes.doc,
                comment: notes.comment,
                magic_comments: notes.magic,
                generate_comments: notes.generate,
                receiver,
                receiver_indirect,
                params,
                results,
            },
            receiver_exported,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goir_parser::parse_source;
    use pretty_assertions::assert_eq;

    fn collect(src: &str) -> File {
        let parsed = parse_source(src).expect("parse");
        collect_file("test.go", &parsed)
    }

    #[test]
    fn exported_names_start_upper_case() {
        assert!(is_exported("Counter"));
        assert!(is_exported("Ärger"));
        assert!(!is_exported("counter"));
        assert!(!is_exported("_Hidden"));
        assert!(!is_exported(""));
    }

    #[test]
    fn values_pair_names_with_literals() {
        let f = collect(
            "package p\n\nconst (\n\tA, B = 1, \"two\"\n\tC = -3\n\tD = len(\"x\")\n\t_ = 4\n)\n\nvar e = 2.5i\nvar r = 'x'\n",
        );
        let consts: Vec<_> = f
            .consts
            .iter()
            .map(|c| (c.name.as_str(), c.kind.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(
            consts,
            vec![("A", "INT", "1"), ("B", "STRING", "\"two\""), ("C", "INT", "-3")]
        );
        let vars: Vec<_> = f
            .vars
            .iter()
            .map(|v| (v.name.as_str(), v.kind.as_str(), v.is_exported))
            .collect();
        assert_eq!(vars, vec![("e", "IMAG", false), ("r", "CHAR", false)]);
    }

    #[test]
    fn imports_keep_aliases_and_quotes() {
        let f = collect("package p\n\nimport (\n\t\"fmt\"\n\t. \"math\"\n\t_ \"embed\"\n\tstr \"strings\" // strings\n)\n");
        let imports: Vec<_> = f
            .imports
            .iter()
            .map(|i| (i.name.as_str(), i.path.as_str()))
            .collect();
        assert_eq!(
            imports,
            vec![
                ("", "\"fmt\""),
                (".", "\"math\""),
                ("_", "\"embed\""),
                ("str", "\"strings\""),
            ]
        );
        assert_eq!(f.imports[3].comment.content, "// strings");
    }

    #[test]
    fn receivers_unwrap_pointers_and_type_arguments() {
        let f = collect("package p\n\ntype List[T any] struct{ items []T }\n\nfunc (l *List[T]) Len() int { return 0 }\nfunc (List[T]) Empty() bool { return true }\n");
        let list = &f.structs[0];
        assert_eq!(list.methods.len(), 2);
        assert!(list.methods[0].receiver_indirect);
        assert!(!list.methods[1].receiver_indirect);
        assert_eq!(list.methods[1].receiver, "List");
    }

    #[test]
    fn embedded_fields_have_no_name() {
        let f = collect("package p\n\ntype T struct {\n\tsync.Mutex\n\t*Base\n\tA, b int `json:\"a\"`\n}\n");
        let fields = &f.structs[0].fields;
        assert_eq!(fields.len(), 4);
        assert!(fields[0].embed && fields[0].name.is_empty() && !fields[0].is_exported);
        assert!(fields[1].embed && fields[1].indirect);
        assert_eq!(
            (fields[2].name.as_str(), fields[2].is_exported),
            ("A", true)
        );
        assert_eq!(
            (fields[3].name.as_str(), fields[3].is_exported),
            ("b", false)
        );
        assert_eq!(fields[3].tag, "`json:\"a\"`");
    }
}
