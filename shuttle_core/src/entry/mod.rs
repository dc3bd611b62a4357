//! Thread-transferable representation of a host value.
//!
//! An `Entry` holds exactly one payload and never points into a context's
//! heap: strings and compounds are owned byte copies, closures carry their
//! own descriptor copy, and queue handles share an independently
//! synchronized structure.

mod scalar;
mod compound;
mod closure;
mod queue_handle;
mod lifecycle;


pub use lifecycle::*;

use crate::runtime::{FunctionDescriptor, MessageQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundKind {
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    SerializedCompound(CompoundKind),
    Closure,
    MessageQueueHandle,
}

#[derive(Debug)]
pub enum EntryValue {
    String(Box<str>),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Serialized { kind: CompoundKind, bytes: Box<[u8]> },
    Closure(Box<FunctionDescriptor>),
    MessageQueue(MessageQueue),
}

impl EntryValue {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryValue::String(_) => EntryKind::String,
            EntryValue::Integer(_) => EntryKind::Integer,
            EntryValue::Float(_) => EntryKind::Float,
            EntryValue::Boolean(_) => EntryKind::Boolean,
            EntryValue::Null => EntryKind::Null,
            EntryValue::Serialized { kind, .. } => EntryKind::SerializedCompound(*kind),
            EntryValue::Closure(_) => EntryKind::Closure,
            EntryValue::MessageQueue(_) => EntryKind::MessageQueueHandle,
        }
    }
}

/// The only unit allowed to cross between contexts. Owned by exactly one
/// container at a time, so it is deliberately not `Clone`.
#[derive(Debug)]
pub struct Entry {
    value: EntryValue,
}

impl Entry {
    pub(crate) fn new(value: EntryValue) -> Self {
        Entry { value }
    }

    pub fn kind(&self) -> EntryKind {
        self.value.kind()
    }

    pub fn value(&self) -> &EntryValue {
        &self.value
    }

    /// Bytes held in the entry's own buffer (string or serialized payload).
    pub fn buffer_len(&self) -> usize {
        match &self.value {
            EntryValue::String(s) => s.len(),
            EntryValue::Serialized { bytes, .. } => bytes.len(),
            _ => 0,
        }
    }

    pub(crate) fn replace(&mut self, value: EntryValue) -> EntryValue {
        std::mem::replace(&mut self.value, value)
    }
}
