//! Documentation that spans crates.

pub mod api;
pub mod dev;
pub mod overview;
pub mod testing;
