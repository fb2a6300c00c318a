// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL reader for iterating and validating entries
//!
//! Malformed lines are skipped rather than ending the iteration, so one
//! torn write does not hide the rest of the log. I/O errors end it.

use crate::entry::{decode_line, MalformedLine, WalRecord};
use crate::persistence::PersistenceError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reader over a WAL file; a missing file reads as empty
#[derive(Debug, Clone)]
pub struct WalReader {
    path: PathBuf,
}

impl WalReader {
    pub fn open_or_empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Iterate over decoded records from the start of the file
    pub fn entries(&self) -> Result<WalEntryIter, PersistenceError> {
        WalEntryIter::new(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count valid and skipped lines without building a graph
    pub fn validate(&self) -> Result<WalValidation, PersistenceError> {
        let mut iter = self.entries()?;
        let mut validation = WalValidation::default();

        while let Some((line, decoded)) = iter.next_decoded() {
            match decoded? {
                Ok(_) => validation.valid_entries += 1,
                Err(reason) => {
                    validation.skipped_lines += 1;
                    if validation.first_skipped.is_none() {
                        validation.first_skipped = Some(SkippedLine {
                            line,
                            reason: reason.to_string(),
                        });
                    }
                }
            }
        }

        Ok(validation)
    }
}

/// Validation result for a WAL file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalValidation {
    pub valid_entries: u64,
    pub skipped_lines: u64,
    pub first_skipped: Option<SkippedLine>,
}

impl WalValidation {
    pub fn is_clean(&self) -> bool {
        self.skipped_lines == 0
    }
}

/// A line replay will skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: u64,
    pub reason: String,
}

/// Iterator over WAL records with line tracking
pub struct WalEntryIter {
    reader: Option<BufReader<File>>,
    line_number: u64,
    skipped: u64,
}

impl WalEntryIter {
    fn new(path: &Path) -> Result<Self, PersistenceError> {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            reader,
            line_number: 0,
            skipped: 0,
        })
    }

    /// Lines skipped so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Next non-empty line with its 1-based number, decoded
    fn next_decoded(
        &mut self,
    ) -> Option<(u64, Result<Result<WalRecord, MalformedLine>, PersistenceError>)> {
        let reader = self.reader.as_mut()?;

        loop {
            let mut bytes = Vec::new();
            match reader.read_until(b'\n', &mut bytes) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let decoded = match std::str::from_utf8(&bytes) {
                        Ok(text) if text.trim().is_empty() => continue,
                        Ok(text) => decode_line(text.trim()),
                        Err(_) => Err(MalformedLine::Encoding),
                    };
                    return Some((self.line_number, Ok(decoded)));
                }
                Err(e) => {
                    // Stop after an I/O failure so the stream stays finite
                    self.reader = None;
                    return Some((self.line_number + 1, Err(e.into())));
                }
            }
        }
    }
}

impl Iterator for WalEntryIter {
    type Item = Result<WalRecord, PersistenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (line, decoded) = self.next_decoded()?;
            match decoded {
                Ok(Ok(record)) => return Some(Ok(record)),
                Ok(Err(reason)) => {
                    self.skipped += 1;
                    tracing::warn!(line, %reason, "skipping malformed WAL line");
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
