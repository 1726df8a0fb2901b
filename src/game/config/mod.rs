//! Config Module
//!
//! Centralized tuning parameters for snapping, previews and structure lookup.

pub mod build_config;

pub use build_config::{BuildConfig, RemovalPolicy};
