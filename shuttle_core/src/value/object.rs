use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    error::{MarshalError, MarshalResult},
    runtime::{Class, MessageQueue},
    value::{Array, ArrayKey, Closure, Value},
};

/// Storage an object carries beyond its property table.
pub enum NativeSlot {
    None,
    Closure(Closure),
    MessageQueue(RefCell<Option<MessageQueue>>),
}

pub struct Object {
    class: Rc<Class>,
    properties: RefCell<Array>,
    native: NativeSlot,
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let native = match &self.native {
            NativeSlot::None => "none",
            NativeSlot::Closure(_) => "closure",
            NativeSlot::MessageQueue(_) => "message-queue",
        };
        f.debug_struct("Object")
            .field("class", &self.class.name())
            .field("properties", &self.properties.borrow().len())
            .field("native", &native)
            .finish()
    }
}

impl Object {
    pub(crate) fn with_slot(class: Rc<Class>, native: NativeSlot) -> Self {
        Self {
            class,
            properties: RefCell::new(Array::new()),
            native,
        }
    }

    pub(crate) fn new_closure(class: Rc<Class>, closure: Closure) -> Self {
        Self::with_slot(class, NativeSlot::Closure(closure))
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    pub fn native(&self) -> &NativeSlot {
        &self.native
    }

    pub fn properties(&self) -> Ref<'_, Array> {
        self.properties.borrow()
    }

    pub fn properties_mut(&self) -> RefMut<'_, Array> {
        self.properties.borrow_mut()
    }

    pub fn get_property(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(&ArrayKey::from(name)).cloned()
    }

    pub fn set_property(&self, name: &str, value: Value) -> Option<Value> {
        self.properties.borrow_mut().insert(name, value)
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        match &self.native {
            NativeSlot::Closure(closure) => Some(closure),
            _ => None,
        }
    }

    /// The shared queue this object is a handle to, if one is attached.
    pub fn message_queue(&self) -> Option<MessageQueue> {
        match &self.native {
            NativeSlot::MessageQueue(slot) => slot.borrow().clone(),
            _ => None,
        }
    }

    /// Points this queue object at `queue`, releasing the previous handle.
    pub fn attach_message_queue(&self, queue: MessageQueue) -> MarshalResult<()> {
        match &self.native {
            NativeSlot::MessageQueue(slot) => {
                slot.replace(Some(queue));
                Ok(())
            }
            _ => Err(MarshalError::detached_handle(self.class.name())),
        }
    }

    pub(crate) fn same_state(&self, other: &Object) -> bool {
        match (&self.native, &other.native) {
            (NativeSlot::None, NativeSlot::None) => {
                self.class.name().eq_ignore_ascii_case(other.class.name())
                    && *self.properties.borrow() == *other.properties.borrow()
            }
            (NativeSlot::MessageQueue(_), NativeSlot::MessageQueue(_)) => {
                match (self.message_queue(), other.message_queue()) {
                    (Some(a), Some(b)) => a.same_queue(&b),
                    _ => false,
                }
            }
            _ => false,
        }
    }
}
