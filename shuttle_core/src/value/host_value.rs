use std::{
    cell::{Ref, RefCell, RefMut},
    fmt::{self, Display},
    rc::Rc,
};

use crate::value::{Array, Closure, Object};

/// A live value owned by one execution context.
///
/// Heap variants are `Rc`-backed, so a `Value` is never `Send`: the only way
/// across a thread boundary is through an `Entry`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Array(Rc<RefCell<Array>>),
    Object(Rc<Object>),
}

impl Value {
    // ------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------

    pub fn string(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn array(array: Array) -> Self {
        Value::Array(Rc::new(RefCell::new(array)))
    }

    pub fn object(object: Object) -> Self {
        Value::Object(Rc::new(object))
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    // Type checking
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_closure(&self) -> bool {
        self.as_closure().is_some()
    }

    // Accessors
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<Ref<'_, Array>> {
        match self {
            Value::Array(array) => Some(array.borrow()),
            _ => None,
        }
    }

    pub fn as_array_mut(&self) -> Option<RefMut<'_, Array>> {
        match self {
            Value::Array(array) => Some(array.borrow_mut()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<Object>> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        self.as_object().and_then(|object| object.as_closure())
    }

    /// Address of the heap storage, if any. Used for identity and cycle checks.
    pub fn heap_address(&self) -> Option<*const ()> {
        match self {
            Value::Str(s) => Some(s.as_ptr() as *const ()),
            Value::Array(array) => Some(Rc::as_ptr(array) as *const ()),
            Value::Object(object) => Some(Rc::as_ptr(object) as *const ()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || a.same_state(b),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Array(array) => {
                write!(f, "[")?;
                for (i, (k, v)) in array.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "]")
            }
            Value::Object(object) => write!(f, "#<{}>", object.class().name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrays_compare_structurally() {
        let a = Value::array(Array::from_values([Value::Int(1), Value::string("x")]));
        let b = Value::array(Array::from_values([Value::Int(1), Value::string("x")]));
        assert_eq!(a, b);
        assert_ne!(a.heap_address(), b.heap_address());
    }

    #[test]
    fn test_mixed_kinds_never_equal() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::string("1"), Value::Int(1));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_accessors_match_only_their_variant() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
        assert_eq!(Value::Int(1).as_float(), None);
        assert_eq!(Value::Int(0).as_bool(), None);
        assert!(Value::Null.as_array().is_none());
    }

    #[test]
    fn test_display() {
        let value = Value::array([("a", Value::Int(1))].into_iter().collect());
        assert_eq!(value.to_string(), "[\"a\" => 1]");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
