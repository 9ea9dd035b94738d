mod argument;
mod cache;
mod clause;
mod connection;
mod dialect;
mod error;
mod field;
mod foreign;
mod mapper;
pub mod persister;
mod sql_type;
mod statement;
mod table;
mod util;
mod value;

pub use ::anyhow::Context;
pub use argument::*;
pub use cache::*;
pub use clause::*;
pub use connection::*;
pub use dialect::*;
pub use error::*;
pub use field::*;
pub use foreign::*;
pub use mapper::*;
pub use persister::{Charset, Persister};
pub use sql_type::*;
pub use statement::*;
pub use table::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
