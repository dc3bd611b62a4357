use std::rc::Rc;

use log::{debug, warn};

use crate::{
    entry::EntryValue,
    runtime::{Context, FunctionDescriptor},
    value::{Closure, Object, Value},
};

/// Deep-copies the closure's descriptor into the entry and pins the live
/// closure in the producing context.
pub(crate) fn capture(ctx: &mut Context, value: &Value, closure: &Closure) -> EntryValue {
    let descriptor = closure.descriptor().clone();
    ctx.retain(value.clone());
    EntryValue::Closure(Box::new(descriptor))
}

/// Builds a closure around a fresh copy of `descriptor` and registers it in
/// the consumer's function table. A failed registration is only logged.
pub(crate) fn materialize(ctx: &mut Context, descriptor: &FunctionDescriptor) -> Value {
    let copy = descriptor.clone();
    let scope = match copy.scope.as_deref() {
        Some(name) => {
            let class = ctx.classes().lookup(name);
            if class.is_none() {
                debug!("context {}: closure scope '{}' not loaded, binding unscoped", ctx.id(), name);
            }
            class
        }
        None => None,
    };

    let object = Rc::new(Object::new_closure(ctx.closure_class().clone(), Closure::new(copy, scope)));
    let name = format!("{}@{:p}", ctx.config().closure_name_prefix, Rc::as_ptr(&object));
    let value = Value::Object(object);

    if let Err(err) = ctx.functions_mut().register(&name, value.clone()) {
        warn!("context {}: {}", ctx.id(), err);
    }
    value
}
