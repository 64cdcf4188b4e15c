//! File-backed session history, one JSON-lines log per session.
//!
//! Storage location: `<sessions dir>/<session_id>.jsonl`, one `SessionTurn`
//! per line. Used only by the HTTP surface to prepend earlier turns to a new
//! task; the agent loop itself knows nothing about sessions.

use chrono::{DateTime, Utc};
use scoutclaw_core::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Longest accepted session id.
const MAX_SESSION_ID_LEN: usize = 64;

/// One task/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTurn {
    pub task: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionTurn {
    pub fn new(task: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            result: result.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Session logs rooted at a directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Session ids become file names, so only `[A-Za-z0-9_-]` is accepted.
    pub fn validate_id(session_id: &str) -> Result<(), MemoryError> {
        let valid = !session_id.is_empty()
            && session_id.len() <= MAX_SESSION_ID_LEN
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(MemoryError::InvalidSession(session_id.to_string()))
        }
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf, MemoryError> {
        Self::validate_id(session_id)?;
        Ok(self.dir.join(format!("{session_id}.jsonl")))
    }

    /// Load every turn of a session. A missing log is an empty session.
    pub async fn load(&self, session_id: &str) -> Result<Vec<SessionTurn>, MemoryError> {
        let path = self.path_for(session_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(MemoryError::Storage(format!(
                    "Failed to read session log {}: {e}",
                    path.display()
                )));
            }
        };

        let turns: Vec<SessionTurn> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<SessionTurn>(line) {
                Ok(turn) => Some(turn),
                Err(e) => {
                    warn!(error = %e, session = %session_id, "Skipping corrupted session line");
                    None
                }
            })
            .collect();

        debug!(session = %session_id, turns = turns.len(), "Session loaded");
        Ok(turns)
    }

    /// Append one turn to the session log, creating it if needed.
    pub async fn append(&self, session_id: &str, turn: &SessionTurn) -> Result<(), MemoryError> {
        let path = self.path_for(session_id)?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            MemoryError::Storage(format!("Failed to create sessions directory: {e}"))
        })?;

        let mut line = serde_json::to_string(turn)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize session turn: {e}")))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to open session log: {e}")))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to write session log: {e}")))?;
        file.flush()
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to flush session log: {e}")))?;

        Ok(())
    }

    /// Delete a session log. Resetting an unknown session is not an error.
    pub async fn reset(&self, session_id: &str) -> Result<(), MemoryError> {
        let path = self.path_for(session_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(session = %session_id, "Session reset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MemoryError::Storage(format!(
                "Failed to delete session log: {e}"
            ))),
        }
    }
}

/// Prefix `task` with the last `max_turns` turns as plain text.
///
/// With no history the task is returned unchanged.
pub fn render_context(turns: &[SessionTurn], task: &str, max_turns: usize) -> String {
    if turns.is_empty() || max_turns == 0 {
        return task.to_string();
    }

    let start = turns.len().saturating_sub(max_turns);
    let mut out = String::from("Conversation so far:\n");
    for turn in &turns[start..] {
        out.push_str(&format!("User: {}\nAgent: {}\n", turn.task, turn.result));
    }
    out.push_str(&format!("\nCurrent task: {task}"));
    out
}
