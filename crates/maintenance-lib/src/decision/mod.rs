//! Cost-based maintenance decisions

mod cost;
mod engine;

pub use cost::{CostModel, CostModelDocument, DEFAULT_COST_FAILURE, DEFAULT_COST_FIX, DEFAULT_THRESHOLD};
pub use engine::{decide, decide_all, decide_prediction, expected_failure_cost, Decision};
