use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use crate::runtime::{Class, FunctionDescriptor};

/// Native state of a closure object: its own copy of the compiled function
/// plus the class scope it was bound to in the owning context.
#[derive(Debug)]
pub struct Closure {
    descriptor: RefCell<FunctionDescriptor>,
    scope: Option<Rc<Class>>,
}

impl Closure {
    pub fn new(descriptor: FunctionDescriptor, scope: Option<Rc<Class>>) -> Self {
        Self {
            descriptor: RefCell::new(descriptor),
            scope,
        }
    }

    pub fn descriptor(&self) -> Ref<'_, FunctionDescriptor> {
        self.descriptor.borrow()
    }

    pub fn descriptor_mut(&self) -> RefMut<'_, FunctionDescriptor> {
        self.descriptor.borrow_mut()
    }

    pub fn scope(&self) -> Option<&Rc<Class>> {
        self.scope.as_ref()
    }

    pub fn name(&self) -> String {
        self.descriptor.borrow().name.clone()
    }
}
