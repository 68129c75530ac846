//! Media App Transport Abstraction
//!
//! The bidirectional message channel between this client and the media apps
//! of a station. Framing and encoding of the individual commands ("ping",
//! "register", content/media put-get, delete) belong to the implementation;
//! the core only relies on the typed results below.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Privilege level a client registers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// Exclusive controlling client. Only one admin may hold a media app.
    Admin,
    /// Non-exclusive client. Registration is advisory.
    User,
}

impl ClientRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientRole::Admin => "admin",
            ClientRole::User => "user",
        }
    }
}

impl fmt::Display for ClientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer of a media app to a registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The client now holds the requested slot
    Accepted,
    /// Another admin client already holds the media app
    Rejected,
    /// Registered, but the media app reports that an admin currently blocks
    /// user clients. Only meaningful for [`ClientRole::User`].
    AcceptedAdvisoryBlocked,
}

/// Kind of media payload being uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaUploadKind {
    Image,
    Video,
}

/// A staged media payload on its way to a media app
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub kind: MediaUploadKind,
    /// File extension without the leading dot (e.g. `jpeg`, `mp4`)
    pub file_extension: String,
    pub payload: Bytes,
}

/// Transport trait
///
/// Connections are keyed by the media app's IP address. At most one
/// connection per address may be open at a time; opening a second one
/// fails with [`BridgeError::AlreadyConnected`](crate::BridgeError::AlreadyConnected).
///
/// Implementations are not required to bound their own waits: the core
/// wraps every call in a timeout.
#[async_trait]
pub trait MediaAppTransport: Send + Sync {
    /// Host-level reachability check (ICMP echo)
    async fn ping_host(&self, address: &str) -> Result<bool>;

    /// Open the message connection to the media app's service port
    async fn open(&self, address: &str) -> Result<()>;

    /// Close the connection. Closing an address that is not open is a no-op.
    async fn close(&self, address: &str) -> Result<()>;

    /// Application-level ping; resolves to `true` when a pong was received
    async fn ping(&self, address: &str) -> Result<bool>;

    /// Request registration with the given role
    async fn register(&self, address: &str, role: ClientRole) -> Result<RegistrationOutcome>;

    /// Release the registration held on the media app
    async fn unregister(&self, address: &str) -> Result<()>;

    /// Fetch the catalog document currently published on the media app.
    ///
    /// Returns `Ok(None)` when the media app holds no catalog.
    async fn get_contents(&self, address: &str) -> Result<Option<Bytes>>;

    /// Publish a catalog document to the media app
    async fn put_contents(&self, address: &str, contents: Bytes) -> Result<()>;

    /// Upload a media payload.
    ///
    /// Returns the id the media app assigned to the stored file, or `None`
    /// if the media app did not acknowledge the upload with an id.
    async fn put_media(&self, address: &str, upload: MediaUpload) -> Result<Option<i32>>;

    /// Delete a previously uploaded media file by its media-app-assigned id
    async fn delete_media(&self, address: &str, id_on_media_app: i32) -> Result<()>;
}
