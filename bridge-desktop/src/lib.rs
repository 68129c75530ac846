//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `FileSystemAccess` using `tokio::fs`, rooted at the platform data
//!   directory resolved through `dirs`
//!
//! The media app transport has no desktop default: hosts inject the
//! socket implementation matching their media app firmware.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::TokioFileSystem;
//! use std::sync::Arc;
//!
//! let fs = Arc::new(TokioFileSystem::new());
//! let config = CoreConfig::builder().file_system(fs).transport(transport).build()?;
//! ```

mod filesystem;

pub use filesystem::TokioFileSystem;
