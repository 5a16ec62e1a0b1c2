//! Reqcheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading.

pub mod adapters;
pub mod config;
pub mod testing;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use config::{Settings, SettingsError};
pub use testing::ExpectationEvaluator;
