//! Recent planning runs
//!
//! `RunHistory` keeps the newest runs in memory, bounded to a fixed capacity.
//! `HistoryStore` persists it as JSON so the CLI can show runs from earlier
//! invocations.

use chrono::Local;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::planner::{PlanResult, TripRequest};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One completed planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: String,
    pub request: TripRequest,
    pub result: PlanResult,
}

impl RunRecord {
    pub fn new(request: TripRequest, result: PlanResult) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            request,
            result,
        }
    }
}

/// Most-recent-N runs, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct RunHistory {
    capacity: usize,
    runs: VecDeque<RunRecord>,
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LIMIT)
    }
}

impl RunHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            runs: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a run, evicting the oldest once over capacity
    pub fn push(&mut self, record: RunRecord) {
        self.runs.push_front(record);
        self.runs.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunRecord> {
        self.runs.iter()
    }

    /// Run by position, 0 being the newest
    pub fn get(&self, index: usize) -> Option<&RunRecord> {
        self.runs.get(index)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// JSON file holding a `RunHistory`
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    pub fn new(path: PathBuf, limit: usize) -> Self {
        Self { path, limit }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<RunHistory> {
        let mut history = RunHistory::with_capacity(self.limit);
        if !self.path.exists() {
            return Ok(history);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;
        let records: Vec<RunRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history file: {}", self.path.display()))?;

        // Stored newest first; replay oldest first so push keeps the order
        for record in records.into_iter().rev() {
            history.push(record);
        }
        Ok(history)
    }

    pub fn save(&self, history: &RunHistory) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).context("Failed to create history directory")?;

        let records: Vec<&RunRecord> = history.iter().collect();
        let content = serde_json::to_string_pretty(&records).context("Failed to serialize history")?;

        // Write beside the target, then rename over it
        let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temporary history file")?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write history file")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace history file: {}", self.path.display()))?;

        log::info!("Stored {} runs in {}", history.len(), self.path.display());
        Ok(())
    }

    /// Load, push, save
    pub fn append(&self, record: RunRecord) -> Result<RunHistory> {
        let mut history = self.load()?;
        history.push(record);
        self.save(&history)?;
        Ok(history)
    }

    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).context("Failed to remove history file")?;
        Ok(true)
    }
}
