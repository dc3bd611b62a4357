use std::collections::HashMap;

use generational_arena::{Arena, Index};

use crate::{
    error::{MarshalError, MarshalResult},
    value::Value,
};

/// Per-context table of callables addressable by name.
#[derive(Debug)]
pub struct FunctionTable {
    arena: Arena<Value>,
    names: HashMap<String, Index>,
    limit: Option<usize>,
}

impl FunctionTable {
    pub fn new(limit: Option<usize>) -> Self {
        FunctionTable {
            arena: Arena::new(),
            names: HashMap::new(),
            limit,
        }
    }

    /// Inserts or replaces the callable registered under `name`.
    pub fn register(&mut self, name: &str, function: Value) -> MarshalResult<()> {
        if !function.is_closure() {
            return Err(MarshalError::registration(
                name,
                format!("{} is not callable", function.type_tag()),
            ));
        }

        if let Some(&index) = self.names.get(name) {
            if let Some(slot) = self.arena.get_mut(index) {
                *slot = function;
                return Ok(());
            }
        }

        if let Some(limit) = self.limit {
            if self.names.len() >= limit {
                return Err(MarshalError::registration(
                    name,
                    format!("function table is full ({} entries)", limit),
                ));
            }
        }

        let index = self.arena.insert(function);
        self.names.insert(name.to_string(), index);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.names.get(name).and_then(|index| self.arena.get(*index))
    }

    pub fn unregister(&mut self, name: &str) -> Option<Value> {
        let index = self.names.remove(name)?;
        self.arena.remove(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize { self.names.len() }
    pub fn is_empty(&self) -> bool { self.names.is_empty() }
}
