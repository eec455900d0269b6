//! Per-user append-only transcript files.
//!
//! One UTF-8 line-oriented file per user id under the data directory, capped
//! to the most recent [`TRANSCRIPT_CAP`] lines after each completed turn.

use crate::error::TranscriptError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt as _;
use tokio::sync::OwnedMutexGuard;

/// Maximum transcript length at rest, in lines.
pub const TRANSCRIPT_CAP: usize = 100;

/// Per-user transcript file store.
///
/// Files are keyed by the stable user id rather than the display name, so two
/// users sharing a name never share a transcript.
pub struct TranscriptStore {
    dir: PathBuf,
    // Serializes read-modify-append-truncate for concurrent events from the
    // same user. Lock entries are never evicted.
    locks: Mutex<HashMap<u64, Arc<tokio::sync::Mutex<()>>>>,
}

impl TranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the single-writer lock for one user's transcript. Hold the
    /// guard across the whole turn.
    pub async fn lock_user(&self, user_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("transcript lock map poisoned");
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }

    fn path_for(&self, user_id: u64) -> PathBuf {
        self.dir.join(format!("{user_id}.txt"))
    }

    /// Read a user's full transcript, creating an empty file on first access.
    pub async fn read(&self, user_id: u64) -> Result<String, TranscriptError> {
        let path = self.path_for(user_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&path, "")
                    .await
                    .map_err(|source| TranscriptError::Rewrite {
                        path: path.clone(),
                        source,
                    })?;
                Ok(String::new())
            }
            Err(source) => Err(TranscriptError::Read { path, source }),
        }
    }

    /// Append one line (newline added here) to a user's transcript.
    pub async fn append_line(&self, user_id: u64, line: &str) -> Result<(), TranscriptError> {
        let path = self.path_for(user_id);
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|source| TranscriptError::Append {
                path: path.clone(),
                source,
            })?;
        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|source| TranscriptError::Append { path, source })?;
        Ok(())
    }

    /// Keep only the most recent `n` lines, discarding older ones silently.
    pub async fn truncate_to_last(&self, user_id: u64, n: usize) -> Result<(), TranscriptError> {
        let path = self.path_for(user_id);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TranscriptError::Read {
                path: path.clone(),
                source,
            })?;

        let lines: Vec<&str> = text.lines().collect();
        if lines.len() <= n {
            return Ok(());
        }

        let mut tail = lines[lines.len() - n..].join("\n");
        tail.push('\n');
        tokio::fs::write(&path, tail)
            .await
            .map_err(|source| TranscriptError::Rewrite { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const ALICE: u64 = 42;

    #[tokio::test]
    async fn test_first_read_creates_empty_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        assert_eq!(store.read(ALICE).await.unwrap(), "");
        assert!(dir.path().join("42.txt").exists());
    }

    #[tokio::test]
    async fn test_appended_lines_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        store.append_line(ALICE, "alice: hello").await.unwrap();
        store.append_line(ALICE, "Gemini: Hi there!").await.unwrap();

        assert_eq!(
            store.read(ALICE).await.unwrap(),
            indoc! {"
                alice: hello
                Gemini: Hi there!
            "}
        );
    }

    #[tokio::test]
    async fn test_truncate_keeps_most_recent_tail() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        for i in 0..102 {
            store.append_line(ALICE, &format!("line {i}")).await.unwrap();
        }
        store.truncate_to_last(ALICE, TRANSCRIPT_CAP).await.unwrap();

        let text = store.read(ALICE).await.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), TRANSCRIPT_CAP);
        assert_eq!(lines[0], "line 2");
        assert_eq!(lines[99], "line 101");
    }

    #[tokio::test]
    async fn test_truncate_below_cap_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        store.append_line(ALICE, "alice: hello").await.unwrap();
        store.truncate_to_last(ALICE, TRANSCRIPT_CAP).await.unwrap();

        assert_eq!(store.read(ALICE).await.unwrap(), "alice: hello\n");
    }

    #[tokio::test]
    async fn test_users_have_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        store.append_line(1, "a: one").await.unwrap();
        store.append_line(2, "b: two").await.unwrap();

        assert_eq!(store.read(1).await.unwrap(), "a: one\n");
        assert_eq!(store.read(2).await.unwrap(), "b: two\n");
    }
}
