//! Type expression normalization into the closed IR descriptors.
//!
//! Normalization is best-effort. A shape with no IR descriptor becomes
//! [`Descriptor::Unrecognized`] and serializes as an absent `field_type`.

use goir_parser::ast::{ArrayLen, ChanDir, Expr, FieldId, ListRef, Results, SignatureId, Type, TypeId};
use goir_parser::ParsedFile;
use tracing::trace;

use crate::ir::{Channel, FieldType, Func, Map, MapValue, Value, ValueType};

/// A type shape the IR has no descriptor for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gap {
    pub shape: &'static str,
}

impl Gap {
    fn of(t: &Type) -> Self {
        let shape = match t {
            Type::Named { .. } => "qualified element",
            Type::Pointer { .. } => "pointer",
            Type::Array { .. } => "array",
            Type::Slice { .. } => "slice",
            Type::Map { .. } => "map",
            Type::Chan { .. } => "chan",
            Type::Struct { .. } => "struct",
            Type::Interface { .. } => "interface",
            Type::Func { .. } => "func",
            Type::Paren { .. } => "paren",
            Type::Union { .. } => "union",
            Type::Bad(_) => "bad",
        };
        Self { shape }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    Known(FieldType),
    Unrecognized(Gap),
}

impl Default for Descriptor {
    fn default() -> Self {
        Descriptor::Unrecognized(Gap::default())
    }
}

/// Everything a struct field's type contributes to its IR record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldShape {
    pub descriptor: Descriptor,
    pub indirect: bool,
    pub is_map: bool,
    pub is_slice: bool,
    pub is_array: bool,
    pub is_interface: bool,
    pub array_len: String,
}

impl FieldShape {
    pub fn field_type(&self) -> Option<FieldType> {
        match &self.descriptor {
            Descriptor::Known(t) => Some(t.clone()),
            Descriptor::Unrecognized(_) => None,
        }
    }
}

pub struct Normalizer<'a> {
    file: &'a ParsedFile,
}

impl<'a> Normalizer<'a> {
    pub fn new(file: &'a ParsedFile) -> Self {
        Self { file }
    }

    #[inline]
    fn ty(&self, id: TypeId) -> Type {
        self.file.arena.types[id]
    }

    #[inline]
    fn text(&self, id: TypeId) -> String {
        self.file.type_string(id)
    }

    fn strip_parens(&self, mut id: TypeId) -> TypeId {
        while let Type::Paren { typ } = self.ty(id) {
            id = typ;
        }
        id
    }

    /// Struct field type, in rule order: qualified name, pointer, map,
    /// slice/array, channel, plain name, interface literal.
    pub fn field(&self, id: TypeId) -> FieldShape {
        let id = self.strip_parens(id);
        let mut shape = FieldShape::default();
        shape.descriptor = match self.ty(id) {
            Type::Named { pkg: Some(_), .. } => {
                Descriptor::Known(FieldType::Shaped(ValueType::Type(self.text(id))))
            }
            Type::Pointer { elem, .. } => {
                shape.indirect = true;
                self.pointee(elem)
            }
            Type::Map { key, val } => {
                shape.is_map = true;
                Descriptor::Known(FieldType::Shaped(ValueType::Map(self.map(key, val))))
            }
            Type::Slice { elem } => {
                shape.is_slice = true;
                self.element(elem, &mut shape)
            }
            Type::Array { len, elem } => {
                shape.is_array = true;
                shape.array_len = self.array_len(len);
                self.element(elem, &mut shape)
            }
            Type::Chan { dir, elem } => {
                Descriptor::Known(FieldType::Shaped(ValueType::Chan(self.channel(dir, elem))))
            }
            Type::Named { pkg: None, .. } => Descriptor::Known(FieldType::Name(self.text(id))),
            Type::Interface { .. } => {
                shape.is_interface = true;
                Descriptor::Known(FieldType::Name(self.text(id)))
            }
            other => Descriptor::Unrecognized(Gap::of(&other)),
        };
        if let Descriptor::Unrecognized(gap) = shape.descriptor {
            trace!(shape = gap.shape, typ = %self.text(id), "field type has no descriptor");
        }
        shape
    }

    fn pointee(&self, id: TypeId) -> Descriptor {
        let id = self.strip_parens(id);
        match self.ty(id) {
            Type::Named { .. } => Descriptor::Known(FieldType::Shaped(ValueType::Type(self.text(id)))),
            Type::Slice { elem } => {
                Descriptor::Known(FieldType::Shaped(ValueType::Slice(self.text(elem))))
            }
            Type::Array { elem, .. } => {
                Descriptor::Known(FieldType::Shaped(ValueType::Array(self.text(elem))))
            }
            other => Descriptor::Unrecognized(Gap::of(&other)),
        }
    }

    /// Slice/array element inside a struct field.
    fn element(&self, id: TypeId, shape: &mut FieldShape) -> Descriptor {
        let id = self.strip_parens(id);
        match self.ty(id) {
            Type::Pointer { elem, .. } => {
                shape.indirect = true;
                Descriptor::Known(FieldType::Shaped(ValueType::Type(self.text(elem))))
            }
            Type::Interface { .. } => {
                shape.is_interface = true;
                Descriptor::Known(FieldType::Name(self.text(id)))
            }
            Type::Named { pkg: None, .. } => Descriptor::Known(FieldType::Name(self.text(id))),
            Type::Map { key, val } => {
                Descriptor::Known(FieldType::Shaped(ValueType::Map(self.map(key, val))))
            }
            Type::Chan { dir, elem } => {
                Descriptor::Known(FieldType::Shaped(ValueType::Chan(self.channel(dir, elem))))
            }
            other => Descriptor::Unrecognized(Gap::of(&other)),
        }
    }

    /// Literal or constant-name length; other length expressions are not
    /// captured.
    fn array_len(&self, len: ArrayLen) -> String {
        match len {
            ArrayLen::Ellipsis(_) => "...".to_owned(),
            ArrayLen::Expr(e) => match self.file.arena.exprs[e] {
                Expr::BasicLit(lit) => self.file.text(lit.raw).to_owned(),
                Expr::Ident(name) => self.file.name(name).to_owned(),
                _ => {
                    trace!(len = %self.file.expr_string(e), "array length not captured");
                    String::new()
                }
            },
        }
    }

    pub fn channel(&self, dir: ChanDir, elem: TypeId) -> Channel {
        Channel {
            typ: self.text(elem),
            recv_only: dir == ChanDir::Recv,
            send_only: dir == ChanDir::Send,
        }
    }

    pub fn map(&self, key: TypeId, val: TypeId) -> Map {
        Map {
            key_type: self.text(key),
            value_type: self.map_value(val),
        }
    }

    fn map_value(&self, id: TypeId) -> Option<MapValue> {
        let id = self.strip_parens(id);
        let value = match self.ty(id) {
            Type::Named { pkg: None, .. } => MapValue::Literal(self.text(id)),
            Type::Named { pkg: Some(_), .. } | Type::Pointer { .. } => MapValue::Type(self.text(id)),
            Type::Slice { .. } => MapValue::Slice(self.text(id)),
            Type::Array { .. } => MapValue::Array(self.text(id)),
            Type::Map { key, val } => MapValue::Map(Box::new(self.map(key, val))),
            Type::Func { sig } => {
                let (params, results) = self.signature(sig);
                MapValue::Func(Func {
                    params,
                    results,
                    ..Default::default()
                })
            }
            Type::Interface { .. } => MapValue::Interface(self.text(id)),
            Type::Chan { dir, elem } => MapValue::Chan(self.channel(dir, elem)),
            other => {
                trace!(shape = Gap::of(&other).shape, "map value has no descriptor");
                return None;
            }
        };
        Some(value)
    }

    /// Parameters and results of a signature.
    pub fn signature(&self, id: SignatureId) -> (Vec<Value>, Vec<Value>) {
        let sig = self.file.arena.signatures[id];
        let params = self.values(sig.params);
        let results = match sig.results {
            None => Vec::new(),
            Some(Results::Params(list)) => self.values(list),
            Some(Results::Type(t)) => vec![Value {
                name: None,
                typ: self.text(t),
            }],
        };
        (params, results)
    }

    /// One value per declared name; unnamed entries yield one unnamed value.
    pub fn values(&self, list: ListRef<FieldId>) -> Vec<Value> {
        let arena = &self.file.arena;
        let mut out = Vec::new();
        for &id in arena.fields_list(list) {
            let field = arena.fields[id];
            let typ = if field.ellipsis_pos.is_some() {
                format!("...{}", self.text(field.typ))
            } else {
                self.text(field.typ)
            };
            let names = arena.ident_names(field.names);
            if names.is_empty() {
                out.push(Value { name: None, typ });
                continue;
            }
            out.extend(names.iter().map(|&n| Value {
                name: Some(self.file.name(n).to_owned()),
                typ: typ.clone(),
            }));
        }
        out
    }
}
