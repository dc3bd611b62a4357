use serde::{Deserialize, Serialize};

use crate::{
    error::{MarshalError, MarshalResult},
    runtime::{CLOSURE_CLASS, STD_CLASS},
};

pub const DEFAULT_QUEUE_CLASS: &str = "MessageQueue";
pub const DEFAULT_CLOSURE_PREFIX: &str = "Closure";
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Per-context settings. Every thread builds its own `Context` from one of these.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    /// Class instantiated when a message queue handle is materialized.
    pub queue_class: String,
    /// Materialized closures are registered as `"{prefix}@{address}"`.
    pub closure_name_prefix: String,
    /// Nesting limit for the compound codec.
    pub max_depth: usize,
    /// Upper bound on function table entries, `None` for unbounded.
    pub function_table_limit: Option<usize>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            queue_class: DEFAULT_QUEUE_CLASS.to_string(),
            closure_name_prefix: DEFAULT_CLOSURE_PREFIX.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            function_table_limit: None,
        }
    }
}

impl ContextConfig {
    pub fn from_json(source: &str) -> MarshalResult<Self> {
        let config: ContextConfig =
            serde_json::from_str(source).map_err(|e| MarshalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MarshalResult<()> {
        if self.queue_class.trim().is_empty() {
            return Err(MarshalError::Config("queue_class must not be empty".into()));
        }
        if [STD_CLASS, CLOSURE_CLASS]
            .iter()
            .any(|builtin| builtin.eq_ignore_ascii_case(&self.queue_class))
        {
            return Err(MarshalError::Config(format!(
                "queue_class '{}' clashes with a builtin class",
                self.queue_class
            )));
        }
        if self.max_depth == 0 {
            return Err(MarshalError::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_queue_class(mut self, name: impl Into<String>) -> Self {
        self.queue_class = name.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_function_table_limit(mut self, limit: usize) -> Self {
        self.function_table_limit = Some(limit);
        self
    }
}
