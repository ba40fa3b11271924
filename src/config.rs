//! Layered settings: struct defaults, optional TOML file, `CLICKWHEEL__` environment.

mod load;
mod schema;

pub use schema::*;
