//! The serialized IR handed to plugins.
//!
//! Field names and omission rules follow the wire schema consumers decode:
//! empty strings, `false` flags and empty lists are left out, so a missing
//! field always means "empty". `output_base` is the one field that is always
//! present.

use std::fmt;
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn is_false(b: &bool) -> bool {
    !*b
}

/// Root document: one per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    #[serde(default)]
    pub output_base: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

/// Everything collected from one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_defs: Vec<TypeDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structs: Vec<Struct>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funcs: Vec<Func>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consts: Vec<Const>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vars: Vec<Var>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_tags: Vec<Constraint>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Local alias, `.` or `_`; empty when the package name is used
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Path literal as written, quotes included
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Const {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Literal kind: `INT`, `FLOAT`, `IMAG`, `CHAR` or `STRING`
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
}

/// Same shape as [`Const`]; kept distinct so the two lists can't be mixed up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Struct {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<StructField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    #[serde(default, skip_serializing_if = "is_false")]
    pub indirect: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub embed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_map: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_interface: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_slice: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_array: bool,
    #[serde(rename = "array_length", default, skip_serializing_if = "String::is_empty")]
    pub array_len: String,
    /// Empty for an embedded field
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
    #[serde(rename = "field_type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// Tag literal as written, backquotes included
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
}

/// A named type over a plain identifier, or a synthetic record holding
/// methods whose receiver type was not declared in the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method_set: Vec<InterfaceField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
}

/// One entry of an interface's method set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterfaceField {
    Embedded(EmbeddedInterface),
    Method(Func),
}

/// `io.Reader` or `Stringer` inside an interface body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedInterface {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    /// Always `true`; tells embeds and methods apart on the wire
    pub embed: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Func {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub doc: Comment,
    #[serde(default, skip_serializing_if = "Comment::is_empty")]
    pub comment: Comment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_comments: Vec<MagicComment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_comments: Vec<GenerateComment>,
    /// Receiver type name without `*` or type arguments
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub receiver_indirect: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<Value>,
}

/// Parameter or result; unnamed ones have no `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub typ: String,
}

// =============================================================================
// Type descriptors
// =============================================================================

/// A struct field's type: a bare identifier, or a shaped descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldType {
    Name(String),
    Shaped(ValueType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ValueType {
    /// `pkg.T` or a pointee name
    Type(String),
    /// Element type of a slice behind a pointer
    Slice(String),
    /// Element type of an array behind a pointer
    Array(String),
    Map(Map),
    Chan(Channel),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<MapValue>,
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map[{}]", self.key_type)?;
        match &self.value_type {
            Some(v) => write!(f, "{v}"),
            None => Ok(()),
        }
    }
}

/// Map value descriptor, tagged by shape so consumers can switch on `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value")]
pub enum MapValue {
    #[serde(rename = "literal")]
    Literal(String),
    #[serde(rename = "type")]
    Type(String),
    /// `[]T` spelled out
    #[serde(rename = "slice")]
    Slice(String),
    /// `[N]T` or `[...]T` spelled out
    #[serde(rename = "array")]
    Array(String),
    #[serde(rename = "map")]
    Map(Box<Map>),
    #[serde(rename = "func")]
    Func(Func),
    #[serde(rename = "interface{}")]
    Interface(String),
    #[serde(rename = "chan")]
    Chan(Channel),
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapValue::Literal(s)
            | MapValue::Type(s)
            | MapValue::Slice(s)
            | MapValue::Array(s)
            | MapValue::Interface(s) => f.write_str(s),
            MapValue::Map(m) => write!(f, "{m}"),
            MapValue::Func(func) => {
                f.write_str("func")?;
                write_signature(f, &func.params, &func.results)
            }
            MapValue::Chan(c) => write!(f, "{c}"),
        }
    }
}

/// `(a, b int, c string) (T, error)`: consecutive names sharing a type are
/// grouped like gofmt prints them.
fn write_signature(f: &mut fmt::Formatter<'_>, params: &[Value], results: &[Value]) -> fmt::Result {
    f.write_str("(")?;
    write_values(f, params)?;
    f.write_str(")")?;
    match results {
        [] => Ok(()),
        [Value { name: None, typ }] => write!(f, " {typ}"),
        _ => {
            f.write_str(" (")?;
            write_values(f, results)?;
            f.write_str(")")
        }
    }
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        let shares_next = values
            .get(i + 1)
            .is_some_and(|next| next.name.is_some() && next.typ == v.typ);
        match &v.name {
            Some(name) if shares_next => f.write_str(name)?,
            Some(name) => write!(f, "{name} {}", v.typ)?,
            None => f.write_str(&v.typ)?,
        }
    }
    Ok(())
}

/// Both direction flags false means a bidirectional channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub recv_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub send_only: bool,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.recv_only, self.send_only) {
            (true, _) => write!(f, "<-chan {}", self.typ),
            (_, true) => write!(f, "chan<- {}", self.typ),
            _ => write!(f, "chan {}", self.typ),
        }
    }
}

// =============================================================================
// Comments and directives
// =============================================================================

/// Normalized comment text: directive lines dropped, the remaining lines
/// trimmed and joined without a separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl Comment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Splits the content back into logical lines for `/* ... */` and
    /// `// ` comments; any other content yields no lines.
    pub fn lines(&self) -> Vec<String> {
        let com = self.content.as_str();
        if com.starts_with("/*") && com.ends_with("*/") {
            let body = com
                .trim_matches(|c| c == '/' || c == '*')
                .replace("\n\n", "\n");
            let body = body.strip_prefix('\n').unwrap_or(&body);
            let body = body.strip_suffix('\n').unwrap_or(body);
            return body.split('\n').map(str::to_owned).collect();
        }
        if let Some(rest) = com.strip_prefix("// ") {
            return rest.split("// ").map(str::to_owned).collect();
        }
        Vec::new()
    }
}

/// `//go:noinline` and friends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicComment {
    /// Text after `//go:`, trimmed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pragma: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw: String,
}

/// `//go:generate <command line>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateComment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("generate directive has no command: {raw}")]
pub struct EmptyCommand {
    pub raw: String,
}

impl GenerateComment {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        self.command.split_whitespace().collect()
    }

    /// A ready-to-run process for the directive's command line.
    pub fn command(&self) -> Result<Command, EmptyCommand> {
        let argv = self.argv();
        let Some((program, args)) = argv.split_first() else {
            return Err(EmptyCommand {
                raw: self.raw.clone(),
            });
        };
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

/// Options of one `// +build` line, e.g. `linux,386` and `darwin,!cgo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", crate::classify::BUILD_PREFIX, self.options.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn value(name: Option<&str>, typ: &str) -> Value {
        Value {
            name: name.map(str::to_owned),
            typ: typ.into(),
        }
    }

    #[test]
    fn descriptors_print_as_go_types() {
        let chans = [
            (Channel { typ: "int".into(), ..Default::default() }, "chan int"),
            (Channel { typ: "Event".into(), recv_only: true, ..Default::default() }, "<-chan Event"),
            (Channel { typ: "[]byte".into(), send_only: true, ..Default::default() }, "chan<- []byte"),
        ];
        for (c, want) in chans {
            assert_eq!(c.to_string(), want);
        }

        let nested = Map {
            key_type: "string".into(),
            value_type: Some(MapValue::Map(Box::new(Map {
                key_type: "int".into(),
                value_type: Some(MapValue::Chan(Channel {
                    typ: "bool".into(),
                    recv_only: true,
                    ..Default::default()
                })),
            }))),
        };
        assert_eq!(nested.to_string(), "map[string]map[int]<-chan bool");
        assert_eq!(MapValue::Slice("[]T".into()).to_string(), "[]T");
    }

    #[test]
    fn func_map_values_keep_their_signature() {
        let func = |params, results| {
            MapValue::Func(Func {
                params,
                results,
                ..Default::default()
            })
        };
        let cases = [
            (func(vec![], vec![]), "func()"),
            (func(vec![value(None, "int")], vec![value(None, "error")]), "func(int) error"),
            (
                func(
                    vec![value(Some("a"), "int"), value(Some("b"), "int"), value(Some("rest"), "...string")],
                    vec![value(None, "string"), value(None, "error")],
                ),
                "func(a, b int, rest ...string) (string, error)",
            ),
            (
                func(vec![], vec![value(Some("n"), "int"), value(Some("err"), "error")]),
                "func() (n int, err error)",
            ),
        ];
        for (v, want) in cases {
            assert_eq!(v.to_string(), want);
        }
    }

    #[test]
    fn empty_fields_are_omitted() {
        let data = Data {
            output_base: String::new(),
            packages: vec![Package {
                name: "p".into(),
                files: vec![File {
                    name: "a.go".into(),
                    package: "p".into(),
                    structs: vec![Struct {
                        name: "s".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "output_base": "",
                "packages": [{
                    "name": "p",
                    "files": [{"name": "a.go", "package": "p", "structs": [{"name": "s"}]}]
                }]
            })
        );
    }

    #[test]
    fn descriptors_are_tagged() {
        let field = StructField {
            is_map: true,
            name: "M".into(),
            field_type: Some(FieldType::Shaped(ValueType::Map(Map {
                key_type: "string".into(),
                value_type: Some(MapValue::Chan(Channel {
                    typ: "int".into(),
                    recv_only: true,
                    send_only: false,
                })),
            }))),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({
                "is_map": true,
                "name": "M",
                "field_type": {
                    "kind": "map",
                    "value": {
                        "key_type": "string",
                        "value_type": {"name": "chan", "value": {"type": "int", "recv_only": true}}
                    }
                }
            })
        );
    }

    #[test]
    fn interface_entries_decode_by_shape() {
        let set: Vec<InterfaceField> = serde_json::from_value(json!([
            {"is_exported": true, "embed": true, "name": "io.Reader"},
            {"is_exported": true, "name": "Close", "results": [{"type": "error"}]}
        ]))
        .unwrap();
        assert!(matches!(&set[0], InterfaceField::Embedded(e) if e.name == "io.Reader"));
        assert!(matches!(&set[1], InterfaceField::Method(f) if f.name == "Close"));
    }

    #[test]
    fn comment_lines() {
        assert_eq!(Comment::new("// a// b").lines(), vec!["a", "b"]);
        assert_eq!(Comment::new("/*\nfirst\n\nsecond\n*/").lines(), vec!["first", "second"]);
        assert!(Comment::new("plain").lines().is_empty());
    }

    #[test]
    fn generate_command_splits_words() {
        let g = GenerateComment {
            command: "stringer -type=Pill".into(),
            raw: "//go:generate stringer -type=Pill".into(),
        };
        assert_eq!(g.argv(), vec!["stringer", "-type=Pill"]);
        let cmd = g.command().unwrap();
        assert_eq!(cmd.get_program(), "stringer");
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), vec!["-type=Pill"]);

        let empty = GenerateComment {
            command: String::new(),
            raw: "//go:generate".into(),
        };
        assert!(empty.command().is_err());
    }

    #[test]
    fn constraint_renders_as_build_line() {
        let c = Constraint {
            options: vec!["linux,386".into(), "darwin,!cgo".into()],
        };
        assert_eq!(c.to_string(), "// +build linux,386 darwin,!cgo");
    }
}
