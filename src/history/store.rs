//! Durable persistence of the message list: load, save, clear.
//! The record is a plain JSON array of `{role, content}` pairs at a fixed
//! path, no envelope or versioning.

use crate::history::Message;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write history record: {0}")]
    Write(#[from] io::Error),
    #[error("failed to encode history record: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct ConversationStore {
    path: PathBuf,
}

impl ConversationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted record. A missing or corrupt record is an empty
    /// history; parse failures are logged, never propagated.
    pub fn load(&self) -> Vec<Message> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history read failed");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history record corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and write the full message list. Best-effort: a failure must
    /// not interrupt the in-memory session, so callers log and move on.
    pub fn save(&self, messages: &[Message]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let encoded = serde_json::to_string(messages)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }

    /// Remove the persisted record entirely. Distinct from saving an empty
    /// array, though both load back as "no history".
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
