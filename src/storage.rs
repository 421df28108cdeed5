use std::path::PathBuf;

use thiserror::Error;

use crate::models::session::SessionRecord;

pub mod json;
pub mod migrations;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load session from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save session to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clear session at '{path}': {source}")]
    ClearFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Session file has a non-numeric version field")]
    InvalidVersion,

    #[error(
        "Session file was created by a newer version of testmagic (version {0}). Please upgrade testmagic to open this file."
    )]
    FutureVersion(u32),

    #[error(
        "Session file has unsupported version {0}. This version of testmagic cannot read this file."
    )]
    UnsupportedVersion(u32),
}

/// Read/write/clear contract for the persisted session record
pub trait SessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>, StorageError>;
    fn save(&self, session: &SessionRecord) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}
