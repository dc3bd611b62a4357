mod host_value;
mod array;
mod object;
mod closure;


pub use host_value::*;
pub use array::*;
pub use object::*;
pub use closure::*;
