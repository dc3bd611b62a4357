use crate::{
    entry::{CompoundKind, EntryValue},
    error::{MarshalError, MarshalResult},
    runtime::Context,
    value::Value,
};

/// Encodes an array or generic object with the context's codec and keeps an
/// entry-owned copy of the bytes.
pub(crate) fn capture(ctx: &Context, value: &Value, kind: CompoundKind) -> MarshalResult<EntryValue> {
    let bytes = ctx.codec().serialize(value)?;
    Ok(EntryValue::Serialized {
        kind,
        bytes: bytes.into_boxed_slice(),
    })
}

/// Decodes the stored bytes in the consumer's context. Both compound kinds
/// go through the same codec path; the kind only checks the result.
pub(crate) fn materialize(ctx: &Context, kind: CompoundKind, bytes: &[u8]) -> MarshalResult<Value> {
    let value = ctx.codec().deserialize(bytes, ctx.classes())?;
    match (kind, &value) {
        (CompoundKind::Array, Value::Array(_)) | (CompoundKind::Object, Value::Object(_)) => Ok(value),
        _ => Err(MarshalError::deserialization(format!(
            "expected {:?} payload, decoded {}",
            kind,
            value.type_tag()
        ))),
    }
}
