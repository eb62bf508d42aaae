//! Worker side of the UI loop: executes backend commands off the UI thread.

pub mod commands;
pub mod runtime;
