//! Backend side of the UI: commands queued by the UI and the worker thread
//! that runs them.

pub mod commands;
pub mod runtime;
