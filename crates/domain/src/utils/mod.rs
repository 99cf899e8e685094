//! Domain utilities

pub mod time;
