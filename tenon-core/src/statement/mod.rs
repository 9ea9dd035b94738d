mod builder;
mod compiled;
mod create;
mod delete;
mod query;
mod update;

pub use builder::*;
pub use compiled::*;
pub use create::*;
pub use delete::*;
pub use query::*;
pub use update::*;
