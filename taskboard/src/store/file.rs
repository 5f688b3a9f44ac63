//! Directory-backed store
//!
//! Layout under the root directory:
//!
//! ```text
//! boards/{board_id}.json    full board state, replaced atomically
//! boards/{board_id}.lock    advisory lock file, one per board
//! activity/current.jsonl    append-only activity log
//! ```

use super::{BoardStore, LockOptions};
use crate::error::{BoardError, Result};
use crate::types::{BoardId, BoardState, ColumnId, TaskId};
use async_trait::async_trait;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use taskboard_operations::LogEntry;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

/// Store that keeps one JSON file per board
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn boards_dir(&self) -> PathBuf {
        self.root.join("boards")
    }

    pub fn board_path(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.json", id))
    }

    pub fn lock_path(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.lock", id))
    }

    pub fn activity_path(&self) -> PathBuf {
        self.root.join("activity").join("current.jsonl")
    }

    /// Create the directory layout
    pub async fn create_directories(&self) -> Result<()> {
        fs::create_dir_all(self.boards_dir()).await?;
        fs::create_dir_all(self.root.join("activity")).await?;
        Ok(())
    }

    /// Ids of every stored board
    pub async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let dir = self.boards_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(BoardId::from_string(stem));
                }
            }
        }
        Ok(ids)
    }

    async fn find_board<F>(&self, contains: F) -> Result<Option<BoardId>>
    where
        F: Fn(&BoardState) -> bool,
    {
        for id in self.list_board_ids().await? {
            match self.load(&id).await {
                Ok(state) if contains(&state) => return Ok(Some(id)),
                Ok(_) | Err(BoardError::BoardNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    fn try_lock(&self, board_id: &BoardId) -> Result<FileLock> {
        let path = self.lock_path(board_id);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(FileLock {
                board_id: board_id.clone(),
                file,
            }),
            Err(_) => Err(BoardError::LockBusy),
        }
    }
}

/// Held board lock of a [`FileStore`]; releases on drop
#[derive(Debug)]
pub struct FileLock {
    board_id: BoardId,
    file: std::fs::File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[async_trait]
impl BoardStore for FileStore {
    type Guard = FileLock;

    async fn lock_board(&self, board_id: &BoardId, options: LockOptions) -> Result<FileLock> {
        fs::create_dir_all(self.boards_dir()).await?;

        let started = Instant::now();
        loop {
            match self.try_lock(board_id) {
                Ok(lock) => return Ok(lock),
                Err(BoardError::LockBusy) => {
                    let elapsed = started.elapsed();
                    if elapsed >= options.timeout {
                        tracing::debug!(board_id = %board_id, ?elapsed, "board lock timed out");
                        return Err(BoardError::LockTimeout {
                            elapsed_ms: elapsed.as_millis() as u64,
                        });
                    }
                    tokio::time::sleep(options.retry_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn load(&self, board_id: &BoardId) -> Result<BoardState> {
        let path = self.board_path(board_id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BoardError::BoardNotFound {
                    id: board_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, state: &BoardState, guard: &FileLock) -> Result<()> {
        if guard.board_id != state.board.id {
            return Err(BoardError::invalid_value(
                "board_id",
                format!(
                    "lock held for {} but saving {}",
                    guard.board_id, state.board.id
                ),
            ));
        }
        let content = serde_json::to_string_pretty(state)?;
        atomic_write(&self.board_path(state.id()), content.as_bytes()).await
    }

    async fn insert(&self, state: &BoardState, options: LockOptions) -> Result<()> {
        let guard = self.lock_board(state.id(), options).await?;
        if self.board_path(state.id()).exists() {
            return Err(BoardError::duplicate_id("board", state.id().to_string()));
        }
        self.save(state, &guard).await
    }

    async fn remove(&self, board_id: &BoardId, guard: FileLock) -> Result<()> {
        if &guard.board_id != board_id {
            return Err(BoardError::invalid_value(
                "board_id",
                format!("lock held for {} but removing {}", guard.board_id, board_id),
            ));
        }
        match fs::remove_file(self.board_path(board_id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BoardError::BoardNotFound {
                    id: board_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }
        // lock file last, after the board file is gone
        let lock_path = self.lock_path(board_id);
        drop(guard);
        if let Err(e) = fs::remove_file(&lock_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %lock_path.display(), error = %e, "failed to remove lock file");
            }
        }
        Ok(())
    }

    async fn locate_task(&self, task_id: &TaskId) -> Result<Option<BoardId>> {
        self.find_board(|state| state.task(task_id).is_some()).await
    }

    async fn locate_column(&self, column_id: &ColumnId) -> Result<Option<BoardId>> {
        self.find_board(|state| state.column(column_id).is_some())
            .await
    }

    async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        let path = self.activity_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let path = self.activity_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut entries: Vec<LogEntry> = content
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        entries.reverse();

        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}

/// Write through a sibling temp file, then rename over the target
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}
