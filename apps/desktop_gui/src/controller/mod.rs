//! Controller layer: UI events, command orchestration, and admin upload rules.

pub mod events;
pub mod orchestration;
pub mod uploads;
