//! Error types for `deck-core`.
//!
//! Store mutations never return these: unknown ids are silent no-ops and
//! persistence failures are logged at the adapter boundary. The error type
//! covers parsing, storage slots, and explicit lookups.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for deck-core operations.
#[derive(Error, Debug)]
pub enum DeckError {
    // === Entity Errors ===
    /// Entity with the specified ID was not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Attempted to add an entity with an ID that already exists.
    #[error("{kind} ID collision: {id}")]
    IdCollision { kind: &'static str, id: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Invalid issue status value.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Invalid priority value.
    #[error("Invalid priority: {priority}")]
    InvalidPriority { priority: String },

    /// Invalid project status value.
    #[error("Invalid project status: {status}")]
    InvalidProjectStatus { status: String },

    /// Invalid user role value.
    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    /// Invalid notification preference value.
    #[error("Invalid notification preference: {value}")]
    InvalidNotifications { value: String },

    /// Invalid store option value (integrity mode, numbering scope).
    #[error("Invalid option {option}: {value}")]
    InvalidOption { option: &'static str, value: String },

    // === Persistence Errors ===
    /// The persisted slot is not a JSON object.
    #[error("Persisted snapshot is malformed: {reason}")]
    MalformedSnapshot { reason: String },

    /// Generic storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage directory could not be used.
    #[error("Storage directory unavailable: {}", path.display())]
    StorageDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage key cannot name a slot inside the data directory.
    #[error("Invalid storage key {key:?}: {reason}")]
    InvalidStorageKey { key: String, reason: &'static str },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeckError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type using `DeckError`.
pub type Result<T> = std::result::Result<T, DeckError>;
