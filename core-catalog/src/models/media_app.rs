//! Media apps: the playback devices of a station

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Role of a media app within its station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaAppRole {
    /// Regular playback device
    Default,
    /// Holds the published catalog. Exactly one per station.
    Controller,
}

impl MediaAppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaAppRole::Default => "default",
            MediaAppRole::Controller => "controller",
        }
    }
}

impl FromStr for MediaAppRole {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(MediaAppRole::Default),
            "controller" => Ok(MediaAppRole::Controller),
            _ => Err(CatalogError::invalid_input(
                "role",
                format!("unknown media app role '{}'", s),
            )),
        }
    }
}

impl fmt::Display for MediaAppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaApp {
    pub id: i32,
    pub name: String,
    pub ip: String,
    pub role: MediaAppRole,
}

impl MediaApp {
    pub fn new(id: i32, name: impl Into<String>, ip: impl Into<String>, role: MediaAppRole) -> Self {
        Self {
            id,
            name: name.into(),
            ip: ip.into(),
            role,
        }
    }

    pub fn is_controller(&self) -> bool {
        self.role == MediaAppRole::Controller
    }
}
