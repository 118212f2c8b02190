// src/config/mod.rs

//! Configuration loading and validation for probo.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into the benchmark registry: problem identifiers, instance
//!   discovery, TGF/APX pairing (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_and_validate_with, load_from_path};
pub use model::{BenchmarkConfig, BenchmarkSection, RawConfigFile, SamplingSection};
pub use validate::validate_config;
