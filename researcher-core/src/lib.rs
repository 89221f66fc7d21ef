//! Researcher Core - configuration contract, errors and shared utilities
//!
//! This crate owns the environment-variable contract of the deep researcher,
//! the typed configuration built from it, and the infrastructure (errors,
//! logging, retry helpers) shared by the other crates.

pub mod async_utils;
pub mod config;
pub mod env;
pub mod error;
pub mod logging;
pub mod template;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::*;
pub use logging::*;
pub use template::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
