//! Audio output: the production `PlaybackResource`.
//!
//! All sound happens on one thread that owns the `rodio` output stream and
//! a single sink. The controller talks to it through `RodioResource`, which
//! forwards commands over a channel and hands back the thread's events.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioResource;
