//! Content model of a media station
//!
//! Pure in-memory types. All ids are plain `i32` values handed out by the
//! counters of [`MediaStation`].

pub mod content;
pub mod folder;
pub mod media;
pub mod media_app;
pub mod staging;
pub mod station;
pub mod tag;

pub use content::{Content, DEFAULT_LIGHT_INTENSITY, UNSET_LIGHT_INTENSITY};
pub use folder::{Folder, ROOT_FOLDER_ID};
pub use media::{Media, MediaKind, MediaType, UNCONFIRMED_MEDIA_ID};
pub use media_app::{MediaApp, MediaAppRole};
pub use staging::{CachedMediaEntry, PendingDeleteEntry};
pub use station::MediaStation;
pub use tag::Tag;
