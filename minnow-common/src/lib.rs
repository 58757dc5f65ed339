//! Minnow Common - Shared configuration and statistics types for the Minnow server

pub mod config;
pub mod stats;

pub use config::*;
pub use stats::*;
