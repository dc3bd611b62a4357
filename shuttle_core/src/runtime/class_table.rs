use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    error::{MarshalError, MarshalResult},
    runtime::MessageQueue,
    value::{NativeSlot, Object},
};

/// User construction logic, run by `Class::instantiate` after native setup.
pub type Constructor = fn(&Object) -> MarshalResult<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    Plain,
    Closure,
    MessageQueue,
}

pub struct Class {
    name: String,
    parent: Option<Rc<Class>>,
    native: NativeKind,
    is_abstract: bool,
    constructor: Option<Constructor>,
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("native", &self.native)
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            native: NativeKind::Plain,
            is_abstract: false,
            constructor: None,
        }
    }

    pub fn native(name: impl Into<String>, native: NativeKind) -> Self {
        Self {
            native,
            ..Self::new(name)
        }
    }

    /// Subclasses inherit the parent's native kind and constructor.
    pub fn extending(mut self, parent: Rc<Class>) -> Self {
        self.native = parent.native;
        if self.constructor.is_none() {
            self.constructor = parent.constructor;
        }
        self.parent = Some(parent);
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native_kind(&self) -> NativeKind {
        self.native
    }

    pub fn instance_of(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.name.eq_ignore_ascii_case(name) {
                return true;
            }
            current = class.parent.as_deref();
        }
        false
    }

    /// Regular construction: native setup (a queue class gets a fresh queue)
    /// followed by the constructor hook.
    pub fn instantiate(self: &Rc<Self>) -> MarshalResult<Rc<Object>> {
        let slot = match self.empty_slot()? {
            NativeSlot::MessageQueue(_) => NativeSlot::MessageQueue(RefCell::new(Some(MessageQueue::new()))),
            slot => slot,
        };
        let object = Rc::new(Object::with_slot(self.clone(), slot));
        if let Some(constructor) = self.constructor {
            constructor(&object)?;
        }
        Ok(object)
    }

    /// Internal construction: no native setup and no constructor hook. A
    /// queue object built this way is detached until a handle is attached.
    pub fn instantiate_internal(self: &Rc<Self>) -> MarshalResult<Rc<Object>> {
        let slot = self.empty_slot()?;
        Ok(Rc::new(Object::with_slot(self.clone(), slot)))
    }

    fn empty_slot(&self) -> MarshalResult<NativeSlot> {
        if self.is_abstract {
            return Err(MarshalError::instantiation(&self.name, "cannot instantiate abstract class"));
        }
        match self.native {
            NativeKind::Plain => Ok(NativeSlot::None),
            NativeKind::MessageQueue => Ok(NativeSlot::MessageQueue(RefCell::new(None))),
            NativeKind::Closure => Err(MarshalError::instantiation(
                &self.name,
                format!("Instantiation of '{}' is not allowed", self.name),
            )),
        }
    }
}

/// Per-context class registry. Names are case-insensitive.
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: HashMap<String, Rc<Class>>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: Class) -> Rc<Class> {
        let class = Rc::new(class);
        self.classes.insert(class.name.to_ascii_lowercase(), class.clone());
        class
    }

    pub fn unregister(&mut self, name: &str) -> Option<Rc<Class>> {
        self.classes.remove(&name.to_ascii_lowercase())
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<Class>> {
        self.classes.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn fetch(&self, name: &str) -> MarshalResult<Rc<Class>> {
        self.lookup(name).ok_or_else(|| MarshalError::type_lookup(name))
    }

    pub fn len(&self) -> usize { self.classes.len() }
    pub fn is_empty(&self) -> bool { self.classes.is_empty() }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::value::Value;

    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    fn counting_constructor(object: &Object) -> MarshalResult<()> {
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        object.set_property("ready", Value::Bool(true));
        Ok(())
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut table = ClassTable::new();
        table.register(Class::new("Point"));
        assert!(table.lookup("point").is_some());
        assert!(table.lookup("POINT").is_some());
        assert_eq!(table.fetch("Missing").unwrap_err(), MarshalError::type_lookup("Missing"));
    }

    #[test]
    fn test_subclass_inherits_native_kind() {
        let mut table = ClassTable::new();
        let base = table.register(Class::native("MessageQueue", NativeKind::MessageQueue));
        let child = table.register(Class::new("PriorityQueue").extending(base));
        assert_eq!(child.native_kind(), NativeKind::MessageQueue);
        assert!(child.instance_of("messagequeue"));

        let object = child.instantiate().unwrap();
        assert!(object.message_queue().is_some());
    }

    #[test]
    fn test_internal_path_skips_construction() {
        let class = Rc::new(
            Class::native("Hooked", NativeKind::MessageQueue).with_constructor(counting_constructor),
        );
        let before = CONSTRUCTED.load(Ordering::SeqCst);

        let regular = class.instantiate().unwrap();
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), before + 1);
        assert_eq!(regular.get_property("ready"), Some(Value::Bool(true)));
        assert!(regular.message_queue().is_some());

        let internal = class.instantiate_internal().unwrap();
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), before + 1);
        assert_eq!(internal.get_property("ready"), None);
        assert!(internal.message_queue().is_none());
    }

    #[test]
    fn test_closure_and_abstract_classes_refuse_instantiation() {
        let closure = Rc::new(Class::native("Closure", NativeKind::Closure));
        assert!(matches!(closure.instantiate(), Err(MarshalError::Instantiation { .. })));
        assert!(matches!(closure.instantiate_internal(), Err(MarshalError::Instantiation { .. })));

        let shape = Rc::new(Class::new("Shape").abstract_class());
        assert!(matches!(shape.instantiate(), Err(MarshalError::Instantiation { .. })));

        let queue = Rc::new(Class::native("AbstractQueue", NativeKind::MessageQueue).abstract_class());
        assert!(matches!(queue.instantiate(), Err(MarshalError::Instantiation { .. })));
    }
}
