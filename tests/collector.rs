use std::collections::HashSet;

use goir::collect_file;
use goir::ir::{
    Channel, Comment, Constraint, FieldType, File, InterfaceField, Map, MapValue, ValueType,
};
use goir_parser::parse_source;
use pretty_assertions::assert_eq;

fn collect(src: &str) -> File {
    match parse_source(src) {
        Ok(parsed) => collect_file("unit.go", &parsed),
        Err(f) => panic!("expected parse ok, got: {}", f.render(src)),
    }
}

#[test]
fn pointer_receiver_method_binds_to_struct() {
    let f = collect(
        r#"
package counter

type Counter struct {
    Value int
}

func (c *Counter) Inc() {
    c.Value++
}
"#,
    );
    assert_eq!(f.package, "counter");
    assert_eq!(f.structs.len(), 1);
    let counter = &f.structs[0];
    assert_eq!(counter.name, "Counter");
    assert!(counter.is_exported);
    assert_eq!(counter.methods.len(), 1);
    let inc = &counter.methods[0];
    assert_eq!(inc.name, "Inc");
    assert_eq!(inc.receiver, "Counter");
    assert!(inc.receiver_indirect);
    assert!(f.funcs.is_empty());
    assert!(f.type_defs.is_empty());
}

#[test]
fn slice_field() {
    let f = collect("package p\n\ntype Bag struct {\n\tItems []string\n}\n");
    let items = &f.structs[0].fields[0];
    assert_eq!(items.name, "Items");
    assert!(items.is_slice && !items.is_array);
    assert!(items.array_len.is_empty());
    assert_eq!(items.field_type, Some(FieldType::Name("string".into())));
}

#[test]
fn fixed_array_field() {
    let f = collect("package p\n\ntype Grid struct {\n\tMatrix [4]int\n}\n");
    let matrix = &f.structs[0].fields[0];
    assert!(matrix.is_array && !matrix.is_slice);
    assert_eq!(matrix.array_len, "4");
    assert_eq!(matrix.field_type, Some(FieldType::Name("int".into())));
}

#[test]
fn computed_array_lengths_are_not_type_definitions() {
    let f = collect(
        r#"
package d

const Size = 4

type Block [Size * 2]byte

type C [len(x)]int

type Frame struct {
    Buf [Size * 2]byte
}
"#,
    );
    assert!(f.type_defs.is_empty(), "{:?}", f.type_defs);
    assert_eq!(f.structs.len(), 1);
    let buf = &f.structs[0].fields[0];
    assert_eq!(buf.name, "Buf");
    assert!(buf.is_array);
    assert_eq!(buf.field_type, Some(FieldType::Name("byte".into())));
}

#[test]
fn map_and_channel_descriptors_print_like_the_source() {
    let f = collect(
        r#"
package p

type Router struct {
    handlers map[string]func(w Writer, r *Request) error
    groups   map[string]map[int][]string
    events   <-chan Event
}
"#,
    );
    let printed: Vec<String> = f.structs[0]
        .fields
        .iter()
        .map(|field| match &field.field_type {
            Some(FieldType::Shaped(ValueType::Map(m))) => m.to_string(),
            Some(FieldType::Shaped(ValueType::Chan(c))) => c.to_string(),
            other => panic!("unexpected field type {other:?}"),
        })
        .collect();
    assert_eq!(
        printed,
        vec![
            "map[string]func(w Writer, r *Request) error",
            "map[string]map[int][]string",
            "<-chan Event",
        ]
    );
}

#[test]
fn build_constraint_and_doc_are_independent() {
    let f = collect("// +build linux darwin\n// Package p is documented.\npackage p\n");
    assert_eq!(
        f.build_tags,
        vec![Constraint {
            options: vec!["linux".into(), "darwin".into()]
        }]
    );
    assert_eq!(f.comments, vec![Comment::new("// Package p is documented.")]);
}

#[test]
fn directives_are_routed_at_file_and_decl_level() {
    let f = collect(
        r#"
package p

//go:generate stringer -type=Pill
// Pill is a medicine.
type Pill int

// Hot runs often.
//go:noinline
func Hot() {}
"#,
    );
    assert_eq!(f.generate_comments.len(), 1);
    assert_eq!(f.generate_comments[0].command, "stringer -type=Pill");
    assert_eq!(f.magic_comments.len(), 1);
    assert_eq!(f.magic_comments[0].pragma, "noinline");
    assert_eq!(
        f.comments,
        vec![Comment::new("// Pill is a medicine."), Comment::new("// Hot runs often.")]
    );

    let pill = &f.type_defs[0];
    assert_eq!((pill.name.as_str(), pill.typ.as_str()), ("Pill", "int"));
    assert_eq!(pill.doc.content, "// Pill is a medicine.");
    assert_eq!(pill.generate_comments[0].argv(), vec!["stringer", "-type=Pill"]);

    let hot = &f.funcs[0];
    assert_eq!(hot.doc.content, "// Hot runs often.");
    assert_eq!(hot.magic_comments[0].raw, "//go:noinline");
}

#[test]
fn methods_before_their_type_still_bind() {
    let f = collect(
        r#"
package p

func (d Duration) String() string { return "" }
func (d *Duration) Set(s string) error { return nil }

type Duration int64

func (s *Server) Close() error { return nil }
"#,
    );
    let duration = f.type_defs.iter().find(|t| t.name == "Duration").expect("Duration");
    assert_eq!(duration.typ, "int64");
    let methods: Vec<_> = duration
        .methods
        .iter()
        .map(|m| (m.name.as_str(), m.receiver_indirect))
        .collect();
    assert_eq!(methods, vec![("String", false), ("Set", true)]);

    // Server is declared in another unit: its methods are kept on a
    // method-only type definition.
    let server = f.type_defs.iter().find(|t| t.name == "Server").expect("Server");
    assert!(server.typ.is_empty());
    assert!(server.is_exported);
    assert_eq!(server.methods[0].name, "Close");
    assert_eq!(server.methods[0].results[0].typ, "error");
}

#[test]
fn methods_never_leak_into_funcs() {
    let f = collect(
        r#"
package p

type A struct{}
type B string

func (A) One()  {}
func (*B) Two() {}
func Three()    {}
func (c *C) Four() {}
"#,
    );
    assert_eq!(f.funcs.iter().map(|x| x.name.as_str()).collect::<Vec<_>>(), vec!["Three"]);

    let mut bound = Vec::new();
    for s in &f.structs {
        bound.extend(s.methods.iter().map(|m| (s.name.clone(), m.name.clone())));
    }
    for t in &f.type_defs {
        bound.extend(t.methods.iter().map(|m| (t.name.clone(), m.name.clone())));
    }
    bound.sort();
    assert_eq!(
        bound,
        vec![
            ("A".to_owned(), "One".to_owned()),
            ("B".to_owned(), "Two".to_owned()),
            ("C".to_owned(), "Four".to_owned()),
        ]
    );
}

#[test]
fn declaration_kinds_are_disjoint() {
    let f = collect(
        r#"
package p

type S struct{ X int }
type T = int
type I interface{ M() }
type G[T any] []T
func F() {}
"#,
    );
    let mut seen = HashSet::new();
    let names = f
        .structs
        .iter()
        .map(|s| &s.name)
        .chain(f.type_defs.iter().map(|t| &t.name))
        .chain(f.interfaces.iter().map(|i| &i.name))
        .chain(f.funcs.iter().map(|x| &x.name));
    for name in names {
        assert!(seen.insert(name.clone()), "{name} collected twice");
    }
    assert_eq!(seen.len(), 4);
    assert!(!seen.contains("G"));
}

#[test]
fn collection_is_deterministic() {
    let src = r#"
package p

import "fmt"

const (
    A = 1
    B = "b"
)

type Z struct{ M map[string][]int }
type Y struct{ C chan<- bool }

func (z Z) Print() { fmt.Println(z) }
func (y *Y) Send() {}
func (w W) Lost()  {}
"#;
    let first = serde_json::to_vec(&collect(src)).expect("json");
    let second = serde_json::to_vec(&collect(src)).expect("json");
    assert_eq!(first, second);
}

#[test]
fn interfaces_list_embeds_and_methods() {
    let f = collect(
        r#"
package p

// ReadCloser reads and closes.
type ReadCloser interface {
    io.Reader
    closer
    // Close closes.
    Close() error
    Peek(n int) ([]byte, error)
}
"#,
    );
    let rc = &f.interfaces[0];
    assert_eq!(rc.doc.content, "// ReadCloser reads and closes.");
    assert_eq!(rc.method_set.len(), 4);

    let InterfaceField::Embedded(reader) = &rc.method_set[0] else {
        panic!("expected embed")
    };
    assert!(reader.embed && reader.is_exported);
    assert_eq!(reader.name, "io.Reader");

    let InterfaceField::Embedded(closer) = &rc.method_set[1] else {
        panic!("expected embed")
    };
    assert!(!closer.is_exported);

    let InterfaceField::Method(close) = &rc.method_set[2] else {
        panic!("expected method")
    };
    assert_eq!(close.doc.content, "// Close closes.");
    assert_eq!(close.results.len(), 1);

    let InterfaceField::Method(peek) = &rc.method_set[3] else {
        panic!("expected method")
    };
    assert_eq!(peek.params[0].name.as_deref(), Some("n"));
    let results: Vec<_> = peek.results.iter().map(|v| v.typ.as_str()).collect();
    assert_eq!(results, vec!["[]byte", "error"]);
}

#[test]
fn map_and_channel_fields() {
    let f = collect(
        r#"
package p

type Registry struct {
    byName  map[string]*Entry
    hooks   map[string]func(ctx context.Context) error
    nested  map[string]map[int]bool
    events  <-chan Event
    tags    map[string]string `json:"tags,omitempty"`
}
"#,
    );
    let fields = &f.structs[0].fields;
    assert!(fields.iter().all(|fl| !fl.is_exported));

    assert!(fields[0].is_map);
    assert_eq!(
        fields[0].field_type,
        Some(FieldType::Shaped(ValueType::Map(Map {
            key_type: "string".into(),
            value_type: Some(MapValue::Type("*Entry".into())),
        })))
    );

    let Some(FieldType::Shaped(ValueType::Map(hooks))) = &fields[1].field_type else {
        panic!("expected map")
    };
    let Some(MapValue::Func(hook)) = &hooks.value_type else {
        panic!("expected func value")
    };
    assert_eq!(hook.params[0].typ, "context.Context");
    assert_eq!(hook.results[0].typ, "error");

    let Some(FieldType::Shaped(ValueType::Map(nested))) = &fields[2].field_type else {
        panic!("expected map")
    };
    assert_eq!(
        nested.value_type,
        Some(MapValue::Map(Box::new(Map {
            key_type: "int".into(),
            value_type: Some(MapValue::Literal("bool".into())),
        })))
    );

    assert_eq!(
        fields[3].field_type,
        Some(FieldType::Shaped(ValueType::Chan(Channel {
            typ: "Event".into(),
            recv_only: true,
            send_only: false,
        })))
    );

    assert_eq!(fields[4].tag, "`json:\"tags,omitempty\"`");
}

#[test]
fn field_docs_and_line_comments() {
    let f = collect(
        r#"
package p

type User struct {
    // ID is the primary key.
    //go:embed id.txt
    ID   string // immutable
    Name string
}
"#,
    );
    let id = &f.structs[0].fields[0];
    assert_eq!(id.doc.content, "// ID is the primary key.");
    assert_eq!(id.comment.content, "// immutable");
    assert_eq!(id.magic_comments[0].pragma, "embed id.txt");
    let name = &f.structs[0].fields[1];
    assert!(name.doc.is_empty() && name.comment.is_empty());
}

#[test]
fn only_literal_initializers_are_captured() {
    let f = collect(
        r#"
package p

const Pi = 3.14
const max = -10
var Name = "goir"
var Ready = true
var client = http.Client{}
var (
    width, height = 640, 480
)
"#,
    );
    let consts: Vec<_> = f
        .consts
        .iter()
        .map(|c| (c.name.as_str(), c.kind.as_str(), c.value.as_str(), c.is_exported))
        .collect();
    assert_eq!(
        consts,
        vec![("Pi", "FLOAT", "3.14", true), ("max", "INT", "-10", false)]
    );
    let vars: Vec<_> = f.vars.iter().map(|v| (v.name.as_str(), v.value.as_str())).collect();
    assert_eq!(
        vars,
        vec![("Name", "\"goir\""), ("width", "640"), ("height", "480")]
    );
}
