use std::{collections::HashMap, sync::Arc};

use log::trace;
use parking_lot::RwLock;

use crate::{
    entry::{create_entry, delete_entry, entry_to_value, update_entry, Entry},
    error::MarshalResult,
    runtime::Context,
    value::{ArrayKey, Value},
};

/// Hash table whose slots own entries, shared by reference across threads.
#[derive(Clone, Default)]
pub struct SharedMap {
    slots: Arc<RwLock<HashMap<ArrayKey, Box<Entry>>>>,
}

impl SharedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`. An occupied slot keeps its entry and has
    /// the payload replaced in place.
    pub fn set(&self, ctx: &mut Context, key: impl Into<ArrayKey>, value: &Value) {
        let key = key.into();
        let mut slots = self.slots.write();
        match slots.get_mut(&key) {
            Some(entry) => {
                trace!("shared map: update {} from context {}", key, ctx.id());
                update_entry(ctx, entry, value);
            }
            None => {
                trace!("shared map: insert {} from context {}", key, ctx.id());
                let entry = create_entry(ctx, value);
                slots.insert(key, entry);
            }
        }
    }

    pub fn get(&self, ctx: &mut Context, key: &ArrayKey) -> MarshalResult<Option<Value>> {
        let slots = self.slots.read();
        match slots.get(key) {
            Some(entry) => entry_to_value(ctx, entry).map(Some),
            None => Ok(None),
        }
    }

    pub fn remove(&self, key: &ArrayKey) -> bool {
        let removed = self.slots.write().remove(key);
        match removed {
            Some(entry) => {
                delete_entry(entry);
                true
            }
            None => false,
        }
    }

    pub fn contains_key(&self, key: &ArrayKey) -> bool {
        self.slots.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<ArrayKey> {
        self.slots.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Address of the entry currently held in `key`'s slot.
    pub fn slot_address(&self, key: &ArrayKey) -> Option<*const Entry> {
        self.slots.read().get(key).map(|entry| &**entry as *const Entry)
    }
}
