use std::{
    collections::HashMap,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use log::debug;

use crate::{
    config::ContextConfig,
    error::MarshalResult,
    runtime::{Class, ClassTable, FunctionDescriptor, FunctionTable, MsgPackCodec, NativeKind, SerializationCodec},
    value::{Closure, Object, Value},
};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

pub const STD_CLASS: &str = "stdClass";
pub const CLOSURE_CLASS: &str = "Closure";

/// Execution context of one thread: its classes, callables, codec and the
/// values it is keeping alive on behalf of outstanding entries.
pub struct Context {
    id: u64,
    config: ContextConfig,
    classes: ClassTable,
    functions: FunctionTable,
    codec: Box<dyn SerializationCodec>,
    closure_class: Rc<Class>,
    retained: HashMap<*const (), Value>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("classes", &self.classes.len())
            .field("functions", &self.functions.len())
            .field("retained", &self.retained.len())
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        let config = ContextConfig::default();
        let codec = Box::new(MsgPackCodec::new(config.max_depth));
        Self::build(config, codec)
    }

    pub fn with_config(config: ContextConfig) -> MarshalResult<Self> {
        let codec = Box::new(MsgPackCodec::new(config.max_depth));
        Self::with_codec(config, codec)
    }

    pub fn with_codec(config: ContextConfig, codec: Box<dyn SerializationCodec>) -> MarshalResult<Self> {
        config.validate()?;
        Ok(Self::build(config, codec))
    }

    fn build(config: ContextConfig, codec: Box<dyn SerializationCodec>) -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        let mut classes = ClassTable::new();
        classes.register(Class::new(STD_CLASS));
        let closure_class = classes.register(Class::native(CLOSURE_CLASS, NativeKind::Closure));
        classes.register(Class::native(config.queue_class.clone(), NativeKind::MessageQueue));
        let functions = FunctionTable::new(config.function_table_limit);

        debug!("context {}: created (queue class '{}')", id, config.queue_class);

        Context {
            id,
            config,
            classes,
            functions,
            codec,
            closure_class,
            retained: HashMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut ClassTable {
        &mut self.classes
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionTable {
        &mut self.functions
    }

    pub fn codec(&self) -> &dyn SerializationCodec {
        self.codec.as_ref()
    }

    pub fn closure_class(&self) -> &Rc<Class> {
        &self.closure_class
    }

    /// Keeps `value` alive for the lifetime of this context. A heap value is
    /// pinned once no matter how often it is retained.
    pub fn retain(&mut self, value: Value) {
        if let Some(address) = value.heap_address() {
            self.retained.entry(address).or_insert(value);
        }
    }

    pub fn retained(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.retained.values()
    }

    pub fn release_retained(&mut self) -> usize {
        let count = self.retained.len();
        self.retained.clear();
        count
    }

    // ------------------------------------------------------------
    // Value factories
    // ------------------------------------------------------------

    /// Builds a closure value bound to `descriptor`, resolving its scope here.
    pub fn closure(&self, descriptor: FunctionDescriptor) -> Value {
        let scope = descriptor.scope.as_deref().and_then(|name| self.classes.lookup(name));
        let closure = Closure::new(descriptor, scope);
        Value::object(Object::new_closure(self.closure_class.clone(), closure))
    }

    pub fn new_object(&self, class_name: &str) -> MarshalResult<Value> {
        let class = self.classes.fetch(class_name)?;
        Ok(Value::Object(class.instantiate()?))
    }

    /// A queue object with a fresh underlying queue.
    pub fn new_message_queue(&self) -> MarshalResult<Value> {
        self.new_object(&self.config.queue_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarshalError;

    #[test]
    fn test_builtin_classes() {
        let ctx = Context::new();
        assert!(ctx.classes().lookup("stdclass").is_some());
        assert_eq!(ctx.classes().fetch("Closure").unwrap().native_kind(), NativeKind::Closure);
        assert_eq!(
            ctx.classes().fetch("MessageQueue").unwrap().native_kind(),
            NativeKind::MessageQueue
        );
    }

    #[test]
    fn test_context_ids_are_unique() {
        let a = Context::new();
        let b = Context::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_closure_scope_resolves_locally() {
        let mut ctx = Context::new();
        ctx.classes_mut().register(Class::new("Counter"));
        let bound = ctx.closure(FunctionDescriptor::new("{closure}").with_scope("Counter"));
        let unbound = ctx.closure(FunctionDescriptor::new("{closure}").with_scope("Nowhere"));

        assert_eq!(bound.as_closure().unwrap().scope().unwrap().name(), "Counter");
        assert!(unbound.as_closure().unwrap().scope().is_none());
    }

    #[test]
    fn test_custom_queue_class() {
        let ctx = Context::with_config(ContextConfig::default().with_queue_class("Channel")).unwrap();
        let queue = ctx.new_message_queue().unwrap();
        assert!(queue.as_object().unwrap().message_queue().is_some());
        assert!(ctx.classes().lookup("MessageQueue").is_none());
    }

    #[test]
    fn test_queue_class_cannot_shadow_builtins() {
        for name in ["Closure", "stdclass", "STDCLASS", "closure"] {
            let err = Context::with_config(ContextConfig::default().with_queue_class(name)).unwrap_err();
            assert!(matches!(err, MarshalError::Config(_)), "{}", name);
        }
        let err = Context::with_codec(
            ContextConfig::default().with_max_depth(0),
            Box::new(MsgPackCodec::default()),
        )
        .unwrap_err();
        assert!(matches!(err, MarshalError::Config(_)));
    }

    #[test]
    fn test_retain_pins_each_value_once() {
        let mut ctx = Context::new();
        let closure = ctx.closure(FunctionDescriptor::new("{closure}"));
        let other = ctx.closure(FunctionDescriptor::new("{closure}"));
        for _ in 0..50 {
            ctx.retain(closure.clone());
        }
        ctx.retain(other);
        ctx.retain(Value::Int(3));
        assert_eq!(ctx.retained().len(), 2);
        assert_eq!(ctx.release_retained(), 2);
        assert_eq!(ctx.retained().len(), 0);
    }
}
