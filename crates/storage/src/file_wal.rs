// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed write-ahead log
//!
//! One JSON object per line, appended through a buffered writer behind a
//! single mutex. Appends are buffered; [`FileWal::flush`] fsyncs.
//!
//! A crash mid-append can leave the file ending in a partial line. Opening
//! such a log is read-only safe; the first append terminates the fragment
//! with a newline so the new record starts on a line of its own and the
//! fragment replays as a single skipped line.

use crate::entry::WalEntry;
use crate::persistence::{GraphPersistence, PersistenceError, ReplayIter};
use crate::reader::WalReader;
use chrono::Utc;
use mdag_core::{MonadNode, TransitionEdge};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Newline-delimited JSON log on the local filesystem
pub struct FileWal {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
    appended: AtomicU64,
    /// Existing file ends without a newline; set only under the writer lock
    torn_tail: AtomicBool,
}

impl FileWal {
    /// Open a WAL for appending, creating it if missing
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        Self::ensure_parent(path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let torn_tail = ends_mid_line(&mut file)?;
        if torn_tail {
            tracing::warn!(path = %path.display(), "WAL ends in a partial line");
        }
        let wal = Self::from_file(path, file);
        wal.torn_tail.store(torn_tail, Ordering::Relaxed);
        Ok(wal)
    }

    /// Create an empty WAL, truncating any existing file
    pub fn create(path: &Path) -> Result<Self, PersistenceError> {
        Self::ensure_parent(path)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::from_file(path, file))
    }

    fn ensure_parent(path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn from_file(path: &Path, file: File) -> Self {
        Self {
            path: path.to_path_buf(),
            writer: Mutex::new(Some(BufWriter::new(file))),
            appended: AtomicU64::new(0),
            torn_tail: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries appended through this handle
    pub fn appended(&self) -> u64 {
        self.appended.load(Ordering::Relaxed)
    }

    fn append_entry(&self, entry: WalEntry) -> Result<(), PersistenceError> {
        let mut line = entry.to_line()?;
        line.push('\n');

        let mut guard = self.writer.lock();
        let writer = guard.as_mut().ok_or(PersistenceError::Closed)?;
        if self.torn_tail.load(Ordering::Relaxed) {
            writer.write_all(b"\n")?;
            self.torn_tail.store(false, Ordering::Relaxed);
        }
        writer.write_all(line.as_bytes())?;
        self.appended.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// True when the file is non-empty and its last byte is not a newline
fn ends_mid_line(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl GraphPersistence for FileWal {
    fn append_node(&self, node: &MonadNode) -> Result<(), PersistenceError> {
        self.append_entry(WalEntry::for_node(node, Utc::now())?)
    }

    fn append_edge(&self, edge: &TransitionEdge) -> Result<(), PersistenceError> {
        self.append_entry(WalEntry::for_edge(edge, Utc::now())?)
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        let mut guard = self.writer.lock();
        let writer = guard.as_mut().ok_or(PersistenceError::Closed)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        tracing::debug!(path = %self.path.display(), "WAL flushed");
        Ok(())
    }

    fn replay(&self) -> Result<ReplayIter<'_>, PersistenceError> {
        // Make buffered appends visible to the independent reader
        if let Some(writer) = self.writer.lock().as_mut() {
            writer.flush()?;
        }
        let entries = WalReader::open_or_empty(&self.path).entries()?;
        Ok(Box::new(entries))
    }

    fn close(&self) -> Result<(), PersistenceError> {
        let Some(mut writer) = self.writer.lock().take() else {
            return Ok(());
        };
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl Drop for FileWal {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.get_mut().as_mut() {
            if let Err(e) = writer.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to flush WAL on drop");
            }
        }
    }
}

#[cfg(test)]
#[path = "file_wal_tests.rs"]
mod tests;
