//! Workspace placeholder crate.
//!
//! This crate exposes the feature flags that map onto the individual
//! workspace crates. Host applications can depend on `station-workspace` and
//! enable `desktop-shims` instead of wiring `core-service` and
//! `bridge-desktop` by hand.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
