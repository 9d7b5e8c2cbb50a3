//! File-backed traces.
//!
//! The on-disk format is one access per line: a hexadecimal address (with
//! or without a `0x` prefix) and an `R` or `W` marker, case-insensitive,
//! separated by whitespace. Blank lines are skipped. Anything else stops
//! the trace with a [`TraceError`] naming the 1-based line number.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::common::access::{AccessKind, MemoryAccess};
use crate::common::error::TraceError;

/// Lazy reader over a trace file.
#[derive(Debug)]
pub struct FileTrace {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: u64,
}

impl FileTrace {
    /// Opens a trace file for iteration.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Open`] when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| TraceError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Rewinds to the first line by reopening the file.
    pub fn reset(&mut self) -> Result<(), TraceError> {
        *self = Self::open(&self.path)?;
        Ok(())
    }

    /// An independent reader over the same file, rewound to the start.
    pub fn try_clone(&self) -> Result<Self, TraceError> {
        Self::open(&self.path)
    }

    /// The file this trace reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses one non-blank trace line.
fn parse_line(text: &str, line: u64) -> Result<MemoryAccess, TraceError> {
    let mut parts = text.split_whitespace();
    let (Some(addr_token), Some(kind_token), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(TraceError::Malformed {
            line,
            content: text.to_owned(),
        });
    };

    let digits = addr_token
        .strip_prefix("0x")
        .or_else(|| addr_token.strip_prefix("0X"))
        .unwrap_or(addr_token);
    let address = u64::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
        line,
        token: addr_token.to_owned(),
    })?;

    let kind = AccessKind::from_marker(kind_token).ok_or_else(|| TraceError::BadKind {
        line,
        token: kind_token.to_owned(),
    })?;

    Ok(MemoryAccess { address, kind })
}

impl Iterator for FileTrace {
    type Item = Result<MemoryAccess, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.lines.next()?;
            self.line_no += 1;
            match item {
                Err(source) => {
                    return Some(Err(TraceError::Io {
                        line: self.line_no,
                        source,
                    }));
                }
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(parse_line(trimmed, self.line_no));
                }
            }
        }
    }
}
