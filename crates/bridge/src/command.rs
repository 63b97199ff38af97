//! Durable command FIFO with acknowledged consumption.
//!
//! `poll` reads without consuming; `acknowledge(n)` removes exactly the
//! first `n` entries, keeping anything a producer appended between the
//! read and the acknowledge. Re-polling before an acknowledge returns the
//! same batch, so the at-most-once guarantee holds as long as the caller
//! acknowledges what it applied. A crash between apply and acknowledge
//! re-delivers that batch on restart; that window is accepted and
//! documented rather than papered over with transactional semantics.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::types::ControlCommand;
use crate::write_json_atomic;

#[derive(Debug, Default)]
pub struct MemoryQueue {
    entries: VecDeque<ControlCommand>,
}

impl MemoryQueue {
    pub fn poll(&self) -> Vec<ControlCommand> {
        self.entries.iter().cloned().collect()
    }

    pub fn acknowledge(&mut self, consumed: usize) {
        for _ in 0..consumed {
            if self.entries.pop_front().is_none() {
                break;
            }
        }
    }

    pub fn push(&mut self, command: ControlCommand) {
        self.entries.push_back(command);
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug)]
pub struct FileQueue {
    path: PathBuf,
}

impl FileQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole queue. A missing file is an empty queue; a corrupt
    /// file is logged, discarded, and replaced with an empty queue.
    pub fn poll(&self) -> Result<Vec<ControlCommand>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading command queue {}", self.path.display()))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<ControlCommand>>(&raw) {
            Ok(commands) => Ok(commands),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "corrupt command queue discarded"
                );
                self.write_entries(&[])?;
                Ok(Vec::new())
            }
        }
    }

    /// Drop the first `consumed` entries, preserving entries appended
    /// after the corresponding poll.
    pub fn acknowledge(&mut self, consumed: usize) -> Result<()> {
        if consumed == 0 {
            return Ok(());
        }
        let current = self.poll()?;
        let remaining: Vec<ControlCommand> =
            current.into_iter().skip(consumed).collect();
        self.write_entries(&remaining)
    }

    pub fn push(&mut self, command: ControlCommand) -> Result<()> {
        let mut current = self.poll()?;
        current.push(command);
        self.write_entries(&current)
    }

    fn write_entries(&self, entries: &[ControlCommand]) -> Result<()> {
        write_json_atomic(&self.path, &entries)
    }
}

#[derive(Debug)]
pub enum CommandQueue {
    Memory(MemoryQueue),
    File(FileQueue),
}

impl CommandQueue {
    pub fn memory() -> Self {
        Self::Memory(MemoryQueue::default())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileQueue::new(path))
    }

    pub fn poll(&self) -> Result<Vec<ControlCommand>> {
        match self {
            Self::Memory(q) => Ok(q.poll()),
            Self::File(q) => q.poll(),
        }
    }

    pub fn acknowledge(&mut self, consumed: usize) -> Result<()> {
        match self {
            Self::Memory(q) => {
                q.acknowledge(consumed);
                Ok(())
            }
            Self::File(q) => q.acknowledge(consumed),
        }
    }

    pub fn push(&mut self, command: ControlCommand) -> Result<()> {
        match self {
            Self::Memory(q) => {
                q.push(command);
                Ok(())
            }
            Self::File(q) => q.push(command),
        }
    }
}
