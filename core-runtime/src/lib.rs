//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the media station core:
//! - Logging and tracing infrastructure
//! - Configuration management with fail-fast capability checks
//!
//! ## Overview
//!
//! The catalog and sync crates only depend on bridge traits. This crate is
//! where a host turns concrete bridge implementations and timeouts into a
//! validated [`CoreConfig`](config::CoreConfig), and where the process-wide
//! `tracing` subscriber is installed.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
