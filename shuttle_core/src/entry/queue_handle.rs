use crate::{
    entry::EntryValue,
    error::{MarshalError, MarshalResult},
    runtime::{Context, MessageQueue},
    value::{Object, Value},
};

/// Shares the object's queue; the queue contents are not copied.
pub(crate) fn capture(object: &Object) -> MarshalResult<EntryValue> {
    object
        .message_queue()
        .map(EntryValue::MessageQueue)
        .ok_or_else(|| MarshalError::detached_handle(object.class().name()))
}

/// Instantiates the configured queue class through the internal path and
/// points the new object at the entry's queue.
pub(crate) fn materialize(ctx: &Context, queue: &MessageQueue) -> MarshalResult<Value> {
    let class_name = &ctx.config().queue_class;
    let class = ctx.classes().fetch(class_name)?;
    let object = class.instantiate_internal()?;
    object
        .attach_message_queue(queue.clone())
        .map_err(|e| MarshalError::instantiation(class.name(), e.to_string()))?;
    Ok(Value::Object(object))
}
