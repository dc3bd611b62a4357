pub mod config;
pub mod entry;
pub mod error;
pub mod runtime;
pub mod value;

pub use config::ContextConfig;
pub use entry::{
    create_entry, delete_entry, delete_entry_value, entry_to_value, try_create_entry, update_entry,
    CompoundKind, Entry, EntryKind, EntryValue,
};
pub use error::{MarshalError, MarshalResult};
pub use runtime::{Context, FunctionDescriptor, MessageQueue, SharedMap};
pub use value::{Array, ArrayKey, Value};
