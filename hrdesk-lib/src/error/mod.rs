//! Error types

mod api;
mod persist;
mod schema;

pub use api::*;
pub use persist::*;
pub use schema::*;
