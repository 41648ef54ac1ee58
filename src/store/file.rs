// src/store/file.rs

//! Store backed by a single JSON document on disk.
//!
//! Every operation re-reads the file, so an operator editing or deleting
//! records from another process (e.g. `buildagent resume`) is picked up on the
//! next read. Read-modify-write cycles hold an exclusive advisory lock on a
//! sidecar `<store>.lock` file from load to save, so handles in different
//! processes never overwrite each other's changes. Each save goes through its
//! own temporary file and a rename.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use fs2::FileExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::records::Records;
use super::{Store, StoreFuture};
use crate::errors::Result;
use crate::types::RecordId;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes lock acquisition within this handle.
    lock: Mutex<()>,
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Held advisory lock; released when the file is closed.
struct StoreLock(File);

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    async fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating store directory {:?}", parent))?;
            }
        }
        Ok(())
    }

    /// Block (off the async workers) until the sidecar lock is held.
    async fn acquire(&self, mode: LockMode) -> Result<StoreLock> {
        self.ensure_parent().await?;
        let lock_path = self.lock_path();

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;
            match mode {
                LockMode::Shared => FileExt::lock_shared(&file)?,
                LockMode::Exclusive => FileExt::lock_exclusive(&file)?,
            }
            Ok(file)
        })
        .await
        .map_err(|e| anyhow!("store lock task failed: {e}"))?
        .with_context(|| format!("locking store {:?}", self.path))?;

        Ok(StoreLock(file))
    }

    async fn load(&self) -> Result<Records> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Records::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "store file missing; starting empty");
                Ok(Records::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, records: &Records) -> Result<()> {
        let contents = serde_json::to_vec_pretty(records)?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, contents)
            .await
            .with_context(|| format!("writing store file {:?}", tmp))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(anyhow::Error::new(e)
                .context(format!("replacing store file {:?}", self.path))
                .into());
        }
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&Records) -> T) -> Result<T> {
        let _guard = self.lock.lock().await;
        let _held = self.acquire(LockMode::Shared).await?;
        let records = self.load().await?;
        Ok(f(&records))
    }

    async fn update<T>(&self, f: impl FnOnce(&mut Records) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().await;
        let _held = self.acquire(LockMode::Exclusive).await?;
        let mut records = self.load().await?;
        let out = f(&mut records)?;
        self.save(&records).await?;
        Ok(out)
    }
}

/// Per-write temporary file next to the store, e.g. `store.json.<uuid>.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
    PathBuf::from(name)
}

impl Store for JsonFileStore {
    fn get<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move { self.read(|records| records.get(id)).await })
    }

    fn merge<'a>(&'a self, id: &'a RecordId, patch: Value) -> StoreFuture<'a, Value> {
        Box::pin(async move { self.update(|records| records.merge(id, patch)).await })
    }

    fn create<'a>(&'a self, table: &'a str, record: Value) -> StoreFuture<'a, RecordId> {
        Box::pin(async move { self.update(|records| records.create(table, record)).await })
    }

    fn delete<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, bool> {
        Box::pin(async move { self.update(|records| Ok(records.delete(id))).await })
    }

    fn list<'a>(&'a self, table: &'a str) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move { self.read(|records| records.list(table)).await })
    }
}
