//! Core types and configuration for samgraft.
//!
//! This crate defines the `samgraft.toml` schema ([`SamgraftConfig`]),
//! the Chalice config store merge ([`merge_stage_config`]), the build
//! environment ([`BuildEnv`]), the container build settings
//! ([`ContainerSpec`]), build output directories ([`BuildOutput`]) and
//! shared error types.

pub mod config;
pub mod container;
pub mod env;
pub mod error;
pub mod output;
pub mod stage;

pub use config::{CONFIG_FILE, ContainerConfig, ProjectConfig, SamgraftConfig};
pub use container::{ContainerSpec, DEFAULT_PYTHON_VERSION, default_image};
pub use env::{BuildEnv, DEFAULT_REGION, REGION_VAR};
pub use error::{Error, Result};
pub use output::{ARCHIVE_FILE, BuildOutput, MANIFEST_FILE};
pub use stage::{CONFIG_STORE_PATH, StageConfig, merge_stage_config, stage_names};
