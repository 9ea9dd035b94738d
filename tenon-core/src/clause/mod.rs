mod clause;
mod combinator;
mod comparison;
mod subquery;
mod where_builder;

pub use clause::*;
pub use combinator::*;
pub use comparison::*;
pub use subquery::*;
pub use where_builder::*;
