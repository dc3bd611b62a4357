use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{
    error::{MarshalError, MarshalResult},
    runtime::{ClassTable, NativeKind},
    value::{Array, ArrayKey, NativeSlot, Value},
};

/// The host's native serialization service.
pub trait SerializationCodec {
    fn serialize(&self, value: &Value) -> MarshalResult<Vec<u8>>;
    fn deserialize(&self, bytes: &[u8], classes: &ClassTable) -> MarshalResult<Value>;
}

/// Context-free tree a compound value is flattened into before encoding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SerialNode {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<(ArrayKey, SerialNode)>),
    Object {
        class: String,
        properties: Vec<(ArrayKey, SerialNode)>,
    },
}

/// MessagePack codec over `SerialNode`.
#[derive(Debug, Clone)]
pub struct MsgPackCodec {
    max_depth: usize,
}

impl MsgPackCodec {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn flatten(&self, value: &Value, depth: usize, active: &mut Vec<*const ()>) -> MarshalResult<SerialNode> {
        if depth > self.max_depth {
            return Err(MarshalError::serialization(format!(
                "nesting level too deep (limit {})",
                self.max_depth
            )));
        }

        match value {
            Value::Null => Ok(SerialNode::Null),
            Value::Bool(b) => Ok(SerialNode::Bool(*b)),
            Value::Int(i) => Ok(SerialNode::Int(*i)),
            Value::Float(f) => Ok(SerialNode::Float(*f)),
            Value::Str(s) => Ok(SerialNode::Str(s.to_string())),
            Value::Array(array) => {
                let address = Rc::as_ptr(array) as *const ();
                Self::enter(address, active)?;
                let items = self.flatten_pairs(&array.borrow(), depth, active)?;
                active.pop();
                Ok(SerialNode::Array(items))
            }
            Value::Object(object) => {
                if !matches!(object.native(), NativeSlot::None) {
                    return Err(MarshalError::serialization(format!(
                        "Serialization of '{}' is not allowed",
                        object.class().name()
                    )));
                }
                let address = Rc::as_ptr(object) as *const ();
                Self::enter(address, active)?;
                let properties = self.flatten_pairs(&object.properties(), depth, active)?;
                active.pop();
                Ok(SerialNode::Object {
                    class: object.class().name().to_string(),
                    properties,
                })
            }
        }
    }

    fn flatten_pairs(
        &self,
        array: &Array,
        depth: usize,
        active: &mut Vec<*const ()>,
    ) -> MarshalResult<Vec<(ArrayKey, SerialNode)>> {
        array
            .iter()
            .map(|(k, v)| -> MarshalResult<_> { Ok((k.clone(), self.flatten(v, depth + 1, active)?)) })
            .collect()
    }

    fn enter(address: *const (), active: &mut Vec<*const ()>) -> MarshalResult<()> {
        if active.contains(&address) {
            return Err(MarshalError::serialization("recursive reference in compound value"));
        }
        active.push(address);
        Ok(())
    }

    fn rebuild(&self, node: SerialNode, classes: &ClassTable) -> MarshalResult<Value> {
        match node {
            SerialNode::Null => Ok(Value::Null),
            SerialNode::Bool(b) => Ok(Value::Bool(b)),
            SerialNode::Int(i) => Ok(Value::Int(i)),
            SerialNode::Float(f) => Ok(Value::Float(f)),
            SerialNode::Str(s) => Ok(Value::from(s)),
            SerialNode::Array(items) => {
                let mut array = Array::with_capacity(items.len());
                for (k, v) in items {
                    array.insert(k, self.rebuild(v, classes)?);
                }
                Ok(Value::array(array))
            }
            SerialNode::Object { class, properties } => {
                let class = classes
                    .lookup(&class)
                    .ok_or_else(|| MarshalError::deserialization(format!("class '{}' not found", class)))?;
                if class.native_kind() != NativeKind::Plain {
                    return Err(MarshalError::deserialization(format!(
                        "Unserialization of '{}' is not allowed",
                        class.name()
                    )));
                }
                let object = class
                    .instantiate_internal()
                    .map_err(|e| MarshalError::deserialization(e.to_string()))?;
                {
                    let mut props = object.properties_mut();
                    for (k, v) in properties {
                        props.insert(k, self.rebuild(v, classes)?);
                    }
                }
                Ok(Value::Object(object))
            }
        }
    }
}

impl Default for MsgPackCodec {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_DEPTH)
    }
}

impl SerializationCodec for MsgPackCodec {
    fn serialize(&self, value: &Value) -> MarshalResult<Vec<u8>> {
        let node = self.flatten(value, 0, &mut Vec::new())?;
        rmp_serde::to_vec(&node).map_err(|e| MarshalError::serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8], classes: &ClassTable) -> MarshalResult<Value> {
        let node: SerialNode =
            rmp_serde::from_slice(bytes).map_err(|e| MarshalError::deserialization(e.to_string()))?;
        self.rebuild(node, classes)
    }
}
