mod builtin;
mod dialect;

pub use builtin::*;
pub use dialect::*;
