// src/config/mod.rs

//! Job file loading for the command-line front-end.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Validate values and resolve relative paths (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_job_path, load_and_validate, load_from_path};
pub use model::{JobFile, JobSection, RawJobFile, RunnerSection};
pub use validate::parse_duration;
