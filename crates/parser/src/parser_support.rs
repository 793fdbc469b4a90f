use smallvec::SmallVec;

use crate::ast::{self, Span};

/// One comma-separated entry of a parameter or type-parameter list, before
/// Go's grouping rule is applied.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub names: SmallVec<[ast::IdentName; 2]>,
    pub ellipsis_pos: Option<Span>,
    pub typ: Option<ast::TypeId>,
    pub span: Span,
}

impl ParamDecl {
    /// A lone identifier: a name waiting for a later type, or a type itself.
    pub fn pending(name: ast::IdentName) -> Self {
        Self {
            names: SmallVec::from_elem(name, 1),
            ellipsis_pos: None,
            typ: None,
            span: name.pos,
        }
    }
}

/// Applies Go's parameter grouping: `a, b int` shares one type between the
/// names, while `(int, string)` is a list of unnamed parameters.
///
/// Lone identifiers stay pending until an entry with both a name and a type
/// claims them; pending identifiers that are never claimed are types.
pub fn resolve_param_list(arena: &mut ast::AstArena, params: Vec<ParamDecl>) -> Vec<ast::FieldId> {
    let mut out = Vec::new();
    let mut pending: SmallVec<[ast::IdentName; 4]> = SmallVec::new();
    let mut pending_start: Option<u32> = None;

    for param in params {
        let Some(typ) = param.typ else {
            if pending.is_empty() {
                pending_start = Some(param.span.start);
            }
            pending.extend(param.names);
            continue;
        };

        if param.names.is_empty() {
            // type-only entry: everything pending before it was a type too
            flush_as_types(arena, &mut pending, &mut out);
            pending_start = None;
            out.push(alloc_param(arena, ast::ListRef::EMPTY, param.ellipsis_pos, typ, param.span));
            continue;
        }

        let names: SmallVec<[ast::IdentName; 4]> =
            pending.drain(..).chain(param.names).collect();
        let span = Span {
            start: pending_start.take().unwrap_or(param.span.start),
            end: param.span.end,
        };
        let names_ref = arena.list_ident_names(names);
        out.push(alloc_param(arena, names_ref, param.ellipsis_pos, typ, span));
    }

    flush_as_types(arena, &mut pending, &mut out);
    out
}

fn flush_as_types(
    arena: &mut ast::AstArena,
    pending: &mut SmallVec<[ast::IdentName; 4]>,
    out: &mut Vec<ast::FieldId>,
) {
    for name in pending.drain(..) {
        let typ = named_type_from_ident(arena, name);
        out.push(alloc_param(arena, ast::ListRef::EMPTY, None, typ, name.pos));
    }
}

fn alloc_param(
    arena: &mut ast::AstArena,
    names: ast::ListRef<ast::IdentName>,
    ellipsis_pos: Option<Span>,
    typ: ast::TypeId,
    span: Span,
) -> ast::FieldId {
    let field = ast::Field {
        names,
        ellipsis_pos,
        typ,
        tag: None,
        is_embed: false,
        doc: None,
        comment: None,
    };
    arena.fields.alloc(field, span)
}

fn named_type_from_ident(arena: &mut ast::AstArena, name: ast::IdentName) -> ast::TypeId {
    arena.types.alloc(
        ast::Type::Named {
            pkg: None,
            name,
            args: ast::ListRef::EMPTY,
        },
        name.pos,
    )
}
