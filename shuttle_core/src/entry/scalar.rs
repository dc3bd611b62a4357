use std::rc::Rc;

use crate::{entry::EntryValue, value::Value};

/// Copies a primitive into entry form. Strings get a fresh buffer.
pub(crate) fn capture(value: &Value) -> Option<EntryValue> {
    match value {
        Value::Null => Some(EntryValue::Null),
        Value::Bool(b) => Some(EntryValue::Boolean(*b)),
        Value::Int(i) => Some(EntryValue::Integer(*i)),
        Value::Float(f) => Some(EntryValue::Float(*f)),
        Value::Str(s) => Some(EntryValue::String(Box::from(&**s))),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// A live string backed by a fresh buffer; the entry keeps its own.
pub(crate) fn materialize_string(s: &str) -> Value {
    Value::Str(Rc::from(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entry::{entry_to_value, Entry},
        runtime::Context,
    };

    #[test]
    fn test_scalars_roundtrip() {
        let values = [
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(i64::MIN),
            Value::Int(42),
            Value::Float(-0.25),
            Value::string(""),
            Value::string("héllo\0world"),
        ];
        let mut ctx = Context::new();
        for value in values {
            let entry = Entry::new(capture(&value).unwrap());
            assert_eq!(entry_to_value(&mut ctx, &entry).unwrap(), value);
        }
    }

    #[test]
    fn test_strings_never_alias() {
        let original = Value::string("payload");
        let entry = capture(&original).unwrap();
        let EntryValue::String(buffer) = &entry else {
            panic!("expected string payload");
        };

        let first = materialize_string(buffer);
        let second = materialize_string(buffer);
        let addresses = [
            original.as_str().unwrap().as_ptr(),
            buffer.as_ptr(),
            first.as_str().unwrap().as_ptr(),
            second.as_str().unwrap().as_ptr(),
        ];
        for (i, a) in addresses.iter().enumerate() {
            for b in &addresses[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_compounds_are_not_scalars() {
        assert!(capture(&Value::array(Default::default())).is_none());
    }
}
