//! Controller layer: UI events, error modeling, and effect orchestration.

pub mod events;
pub mod orchestration;
