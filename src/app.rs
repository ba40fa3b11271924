//! Application module: the presentation model used by the TUI and runtime.
//!
//! `App` holds view state, `Intent` is the write side of the presentation
//! contract and `PlayerSnapshot` the read side.

mod keys;
mod model;

pub use keys::intent_for_key;
pub use model::*;
