//! Command implementations

pub mod components;
pub mod decisions;
pub mod model;
pub mod simulate;
