// src/plan/mod.rs

//! Request model and argument planning.
//!
//! - [`model`] defines `CommandConfig` / `ExecutionRequest` and their
//!   validation rules.
//! - [`planner`] turns a validated `CommandConfig` into an argument vector.

pub mod model;
pub mod planner;

pub use model::{CommandConfig, ExecutionRequest};
pub use planner::Planner;
