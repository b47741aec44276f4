// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of applied table operations
//!
//! One JSON entry per line, numbered from 1. A final line without its
//! newline is a write torn by a crash: replay ignores it and `open` cuts it
//! off before appending.

use crate::TableOperation;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt WAL entry on line {line}: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },
    #[error("WAL entry on line {line} has sequence {found}, expected {expected}")]
    Sequence {
        line: usize,
        expected: u64,
        found: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct WalEntry {
    seq: u64,
    lock: String,
    op: TableOperation,
}

/// Complete entries of a log and the byte length they cover
struct Scan {
    entries: Vec<WalEntry>,
    valid_len: u64,
}

fn scan(path: &Path) -> Result<Scan, WalError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Scan {
                entries: Vec::new(),
                valid_len: 0,
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut entries: Vec<WalEntry> = Vec::new();
    let mut offset = 0;
    let mut valid_len = 0;
    for (index, line) in content.split_inclusive('\n').enumerate() {
        offset += line.len();
        if !line.ends_with('\n') {
            break;
        }
        valid_len = offset;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let number = index + 1;
        let entry: WalEntry = serde_json::from_str(text).map_err(|source| WalError::Corrupt {
            line: number,
            source,
        })?;
        let expected = entries.last().map_or(1, |last| last.seq + 1);
        if entry.seq != expected {
            return Err(WalError::Sequence {
                line: number,
                expected,
                found: entry.seq,
            });
        }
        entries.push(entry);
    }

    Ok(Scan {
        entries,
        valid_len: valid_len as u64,
    })
}

/// Append-only log the durable lock store writes before applying changes
pub struct Wal {
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create a WAL, dropping a torn final entry
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let scan = scan(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() > scan.valid_len {
            file.set_len(scan.valid_len)?;
        }
        let sequence = scan.entries.last().map_or(0, |entry| entry.seq);
        Ok(Self { file, sequence })
    }

    /// Append an operation and sync it to disk
    ///
    /// Returns the entry's sequence number. On error the log is left as it
    /// was, so the same operation can be appended again.
    pub fn append(&mut self, op: &TableOperation) -> Result<u64, WalError> {
        let entry = WalEntry {
            seq: self.sequence + 1,
            lock: op.lock_name().to_string(),
            op: op.clone(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        self.write_or_rollback(line.as_bytes(), |file, bytes| {
            file.write_all(bytes)?;
            file.sync_all()
        })?;
        self.sequence = entry.seq;
        Ok(self.sequence)
    }

    /// Run `write` on the file, cutting it back to its prior length on failure
    fn write_or_rollback(
        &mut self,
        bytes: &[u8],
        write: impl FnOnce(&mut File, &[u8]) -> io::Result<()>,
    ) -> Result<(), WalError> {
        let len = self.file.metadata()?.len();
        if let Err(e) = write(&mut self.file, bytes) {
            self.file.set_len(len)?;
            return Err(e.into());
        }
        Ok(())
    }

    /// Sequence number of the last entry, 0 for an empty log
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Every complete operation in the log, in order
    ///
    /// A missing file replays as empty.
    pub fn replay(path: &Path) -> Result<Vec<TableOperation>, WalError> {
        Ok(scan(path)?.entries.into_iter().map(|entry| entry.op).collect())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
