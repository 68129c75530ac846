//! # Core Catalog
//!
//! Content model, persisted catalog document and local repository of the
//! media stations.
//!
//! ## Overview
//!
//! - [`models`]: the in-memory catalog (`MediaStation`, `Folder`,
//!   `Content`, `Media`, `MediaApp`, `Tag`) and its id rules
//! - [`document`]: the camelCase JSON document a station exports to and
//!   imports from
//! - [`repositories`]: `MediaStationRepository`, owner of every station and
//!   of the staged work (media cache, pending-delete ledger)
//! - [`editing`]: services that edit a station through the repository and
//!   stage what the media apps still have to learn about
//!
//! Storage goes through the `FileSystemAccess` bridge, so the crate is
//! platform agnostic.

pub mod document;
pub mod editing;
pub mod error;
pub mod models;
pub mod repositories;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use document::MediaStationDocument;
pub use editing::{ContentService, FolderService, MediaAppService, MediaService, TagService};
pub use error::{CatalogError, Result};
pub use models::{
    CachedMediaEntry, Content, Folder, Media, MediaApp, MediaAppRole, MediaKind, MediaStation,
    MediaType, PendingDeleteEntry, Tag, ROOT_FOLDER_ID, UNCONFIRMED_MEDIA_ID,
};
pub use repositories::MediaStationRepository;
