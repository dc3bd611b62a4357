mod function;
mod class_table;
mod function_table;
mod codec;
mod context;
mod message_queue;
mod shared_map;


pub use function::*;
pub use class_table::*;
pub use function_table::*;
pub use codec::*;
pub use context::*;
pub use message_queue::*;
pub use shared_map::*;
