use log::{trace, warn};

use crate::{
    entry::{closure, compound, queue_handle, scalar, CompoundKind, Entry, EntryValue},
    error::MarshalResult,
    runtime::Context,
    value::{NativeSlot, Value},
};

fn value_to_entry(ctx: &mut Context, value: &Value) -> MarshalResult<EntryValue> {
    if let Some(entry) = scalar::capture(value) {
        return Ok(entry);
    }
    match value {
        Value::Object(object) => match object.native() {
            NativeSlot::Closure(c) => Ok(closure::capture(ctx, value, c)),
            NativeSlot::MessageQueue(_) => queue_handle::capture(object),
            NativeSlot::None => compound::capture(ctx, value, CompoundKind::Object),
        },
        _ => compound::capture(ctx, value, CompoundKind::Array),
    }
}

fn value_to_entry_or_null(ctx: &mut Context, value: &Value) -> EntryValue {
    match value_to_entry(ctx, value) {
        Ok(entry) => entry,
        Err(err) => {
            warn!(
                "context {}: {} value stored as null: {}",
                ctx.id(),
                value.type_tag(),
                err
            );
            EntryValue::Null
        }
    }
}

/// Converts `value` into a new heap-allocated entry.
///
/// Encoding failures are not reported: the entry is left `Null`. Use
/// `try_create_entry` to observe them.
pub fn create_entry(ctx: &mut Context, value: &Value) -> Box<Entry> {
    let entry = Box::new(Entry::new(value_to_entry_or_null(ctx, value)));
    trace!("context {}: created {:?} entry", ctx.id(), entry.kind());
    entry
}

pub fn try_create_entry(ctx: &mut Context, value: &Value) -> MarshalResult<Box<Entry>> {
    let entry = Box::new(Entry::new(value_to_entry(ctx, value)?));
    trace!("context {}: created {:?} entry", ctx.id(), entry.kind());
    Ok(entry)
}

/// Replaces the payload of `entry` in place, releasing the old one first.
pub fn update_entry(ctx: &mut Context, entry: &mut Entry, value: &Value) {
    delete_entry_value(entry);
    entry.replace(value_to_entry_or_null(ctx, value));
    trace!("context {}: updated entry to {:?}", ctx.id(), entry.kind());
}

/// Materializes `entry` in the calling thread's context. The entry is left
/// untouched and can be materialized again.
pub fn entry_to_value(ctx: &mut Context, entry: &Entry) -> MarshalResult<Value> {
    trace!("context {}: materializing {:?} entry", ctx.id(), entry.kind());
    match entry.value() {
        EntryValue::String(s) => Ok(scalar::materialize_string(s)),
        EntryValue::Integer(i) => Ok(Value::Int(*i)),
        EntryValue::Float(f) => Ok(Value::Float(*f)),
        EntryValue::Boolean(b) => Ok(Value::Bool(*b)),
        EntryValue::Null => Ok(Value::Null),
        EntryValue::Serialized { kind, bytes } => compound::materialize(ctx, *kind, bytes),
        EntryValue::Closure(descriptor) => Ok(closure::materialize(ctx, descriptor)),
        EntryValue::MessageQueue(queue) => queue_handle::materialize(ctx, queue),
    }
}

/// Releases the entry's payload, leaving it `Null`. The entry itself stays
/// allocated for reuse.
pub fn delete_entry_value(entry: &mut Entry) {
    let released = entry.replace(EntryValue::Null);
    trace!("released {:?} payload", released.kind());
    drop(released);
}

/// Releases the payload and the entry itself.
pub fn delete_entry(mut entry: Box<Entry>) {
    delete_entry_value(&mut entry);
    drop(entry);
}
