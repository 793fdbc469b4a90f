use goir_parser::ast::{GenDeclKind, Spec, TopLevelDecl, Type};
use goir_parser::{parse_source, ParsedFile};
use pretty_assertions::assert_eq;

fn assert_parses(src: &str) -> ParsedFile {
    match parse_source(src) {
        Ok(f) => f,
        Err(f) => panic!("expected parse ok, got: {}", f.render(src)),
    }
}

fn comment_text(f: &ParsedFile, group: Option<goir_parser::ast::CommentGroupId>) -> Vec<String> {
    let Some(group) = group else {
        return Vec::new();
    };
    f.arena
        .comment_ids(f.arena.comment_groups[group].comments)
        .iter()
        .map(|&c| f.text(f.arena.comments.span(c)).to_string())
        .collect()
}

#[test]
fn parses_imports_and_decls() {
    let f = assert_parses(
        r#"
package main

import (
    "fmt"
    . "math"
    _ "net/http"
    str "strings"
)

const (
    A = 1
    B int = 2
)

var (
    x = 1
    y, z int
)

type (
    T = int
    U[T any] struct { F T }
    V interface {
        M(x int) int
        ~int | ~string
    }
)

func main() {
    fmt.Println(Sqrt(4))
}
"#,
    );
    assert_eq!(f.package_name(), "main");
    let kinds: Vec<_> = f
        .arena
        .top_decls(f.root.decls)
        .iter()
        .map(|d| match *d {
            TopLevelDecl::Gen(id) => Some(f.arena.gen_decls[id].kind),
            TopLevelDecl::Func(_) => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(GenDeclKind::Import),
            Some(GenDeclKind::Const),
            Some(GenDeclKind::Var),
            Some(GenDeclKind::Type),
            None,
        ]
    );
}

#[test]
fn skips_function_bodies() {
    let f = assert_parses(
        r#"
package p

func f(x int) int {
    if x < 0 { return -x }
    for i := 0; i < 10; i++ {
        if i == 5 { break }
        continue
    }
    switch x {
    case 0, 1:
        x++
    default:
        x = 3
    }
    select {
    case ch <- x:
        return x
    default:
        return 0
    }
}

func g(a, b, c int, ch chan<- int) {
    _ = a + b*c - (a<<2)
    _ = []int{1,2,3}[0:2:3]
    _ = map[string]int{"a":1, "b":2}["a"]
    _ = f(a, b, c...)
}
"#,
    );
    let bodies: Vec<_> = f
        .arena
        .top_decls(f.root.decls)
        .iter()
        .filter_map(|d| match *d {
            TopLevelDecl::Func(id) => f.arena.funcs[id].body,
            TopLevelDecl::Gen(_) => None,
        })
        .collect();
    assert_eq!(bodies.len(), 2);
    assert!(f.text(bodies[0]).starts_with('{') && f.text(bodies[0]).ends_with('}'));
}

#[test]
fn attaches_doc_and_line_comments() {
    let src = "// Package p does things.\npackage p\n\n// T is documented.\n// Second line.\ntype T struct {\n\t// A doc\n\tA int // A line\n}\n";
    let f = assert_parses(src);
    assert_eq!(comment_text(&f, f.root.doc), vec!["// Package p does things."]);

    let TopLevelDecl::Gen(id) = f.arena.top_decls(f.root.decls)[0] else {
        panic!("expected type decl")
    };
    let decl = f.arena.gen_decls[id];
    assert_eq!(
        comment_text(&f, decl.doc),
        vec!["// T is documented.", "// Second line."]
    );

    let Spec::Type(ts) = f.arena.specs_list(decl.specs)[0] else {
        panic!("expected type spec")
    };
    let Type::Struct { fields } = f.arena.types[ts.typ] else {
        panic!("expected struct")
    };
    let field = f.arena.fields[f.arena.fields_list(fields)[0]];
    assert_eq!(comment_text(&f, field.doc), vec!["// A doc"]);
    assert_eq!(comment_text(&f, field.comment), vec!["// A line"]);
}

#[test]
fn grouped_specs_have_their_own_docs() {
    let src = "package p\n\n// group doc\nconst (\n\t// A doc\n\tA = 1 // A line\n\tB = 2\n)\n";
    let f = assert_parses(src);
    let TopLevelDecl::Gen(id) = f.arena.top_decls(f.root.decls)[0] else {
        panic!("expected const decl")
    };
    let decl = f.arena.gen_decls[id];
    assert!(decl.is_grouped());
    let specs = f.arena.specs_list(decl.specs);
    let (Spec::Value(a), Spec::Value(b)) = (specs[0], specs[1]) else {
        panic!("expected value specs")
    };
    assert_eq!(comment_text(&f, a.doc), vec!["// A doc"]);
    assert_eq!(comment_text(&f, a.comment), vec!["// A line"]);
    assert!(b.doc.is_none() && b.comment.is_none());
}

#[test]
fn methods_keep_receivers() {
    let f = assert_parses("package p\nfunc (c *Counter) Inc() {}\nfunc (List[T]) Len() int { return 0 }\n");
    let recvs: Vec<String> = f
        .arena
        .top_decls(f.root.decls)
        .iter()
        .filter_map(|d| match *d {
            TopLevelDecl::Func(id) => f.arena.funcs[id].recv.map(|r| f.type_string(r.typ)),
            TopLevelDecl::Gen(_) => None,
        })
        .collect();
    assert_eq!(recvs, vec!["*Counter", "List[T]"]);
}

#[test]
fn reports_errors_with_positions() {
    let src = "package p\n\nfunc (\n";
    let err = parse_source(src).unwrap_err();
    assert!(err.render(src).starts_with("4:1:"), "{}", err.render(src));

    let src = "package p\nvar x = 0b2\n";
    let err = parse_source(src).unwrap_err();
    assert_eq!(err.render(src), "2:9: invalid numeric literal");
}
