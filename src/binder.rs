//! Two-phase method binding.
//!
//! Methods are parked under their receiver type name while a file is
//! scanned, then merged into the owning struct or type definition once the
//! whole declaration list has been seen. Declaration order does not matter.

use std::collections::HashMap;

use la_arena::{Arena, Idx};
use tracing::debug;

use crate::ir::{Method, Struct, TypeDefinition};

#[derive(Debug)]
struct PendingReceiver {
    name: String,
    is_exported: bool,
    methods: Vec<Method>,
}

type PendingId = Idx<PendingReceiver>;

#[derive(Debug, Default)]
pub struct MethodBinder {
    pending: Arena<PendingReceiver>,
    by_name: HashMap<String, PendingId>,
}

impl MethodBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `method` under its receiver type name.
    pub fn record(&mut self, method: Method, receiver_exported: bool) {
        if let Some(&id) = self.by_name.get(&method.receiver) {
            self.pending[id].methods.push(method);
            return;
        }
        let name = method.receiver.clone();
        let id = self.pending.alloc(PendingReceiver {
            name: name.clone(),
            is_exported: receiver_exported,
            methods: vec![method],
        });
        self.by_name.insert(name, id);
    }

    /// Appends each parked method list to the struct, or failing that the
    /// type definition, of the same name. Receivers matching neither become
    /// method-only type definitions, appended in first-seen order.
    pub fn bind(mut self, structs: &mut [Struct], type_defs: &mut Vec<TypeDefinition>) {
        let struct_pos: HashMap<String, usize> = structs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        let def_pos: HashMap<String, usize> = type_defs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();

        let order: Vec<PendingId> = self.pending.iter().map(|(id, _)| id).collect();
        for id in order {
            let pending = &mut self.pending[id];
            let methods = std::mem::take(&mut pending.methods);
            if let Some(&i) = struct_pos.get(&pending.name) {
                debug!(receiver = %pending.name, count = methods.len(), "bound methods to struct");
                structs[i].methods.extend(methods);
            } else if let Some(&i) = def_pos.get(&pending.name) {
                debug!(receiver = %pending.name, count = methods.len(), "bound methods to type");
                type_defs[i].methods.extend(methods);
            } else {
                debug!(receiver = %pending.name, count = methods.len(), "receiver type not declared here");
                type_defs.push(TypeDefinition {
                    is_exported: pending.is_exported,
                    name: std::mem::take(&mut pending.name),
                    methods,
                    ..Default::default()
                });
            }
        }
    }
}
