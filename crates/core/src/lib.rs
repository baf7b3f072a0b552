//! Core types and shared functionality for rumahsubsidi.
//!
//! This crate provides:
//! - Bounded TTL cache
//! - Unified error types
//! - Configuration structures
//! - Domain model shared by the proxy and its clients

pub mod cache;
pub mod config;
pub mod error;
pub mod model;

pub use cache::TtlCache;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
