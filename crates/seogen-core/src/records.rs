//! Generation records: one line per completed call.
//!
//! File format: JSONL in `~/.seogen/history/generations.jsonl`
//! - `{"requestType":"keywords","input":"AI","provider":"GEMINI","output":[...],"processTimeMs":812,"timestamp":"..."}`
//!
//! The sink is append-only. The orchestrator writes to it and never reads it
//! back; `page()` exists for the `history` command and endpoint.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ─────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────

/// A single persisted generation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    /// `"keywords"`, `"title"`, `"meta"`, `"content"`, `"all"`, or `"chat"`.
    pub request_type: String,
    /// The topic (or chat message) as submitted.
    pub input: String,
    /// Tag of the provider active when the request started (`"GEMINI"`, ...).
    pub provider: String,
    /// Normalized output.
    pub output: serde_json::Value,
    /// Wall-clock processing time.
    pub process_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// One page of history plus the numbers needed to fetch the others.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryPage {
    /// Newest first.
    pub records: Vec<GenerationRecord>,
    /// Readable records in the whole file.
    pub total: usize,
    /// 1-based page number that was read.
    pub page: usize,
    /// Number of pages at the requested page size.
    pub pages: usize,
}

// ─────────────────────────────────────────────
// Sink
// ─────────────────────────────────────────────

/// Anything that accepts generation records.
pub trait RecordSink: Send + Sync {
    /// Append one record.
    fn append(&self, record: &GenerationRecord) -> std::io::Result<()>;
}

/// Appends records as JSON lines to a single file.
///
/// Writes are serialized through a mutex so concurrent requests never
/// interleave partial lines.
pub struct JsonlRecordSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlRecordSink {
    /// Create a sink writing to `path`. Parent directories are created.
    pub fn new(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one page of records, newest first.
    ///
    /// `page` is 1-based; `0` is treated as `1`. A page past the end is
    /// empty but still reports the total.
    pub fn page(&self, page: usize, limit: usize) -> std::io::Result<HistoryPage> {
        let page = page.max(1);
        let mut records = self.read_all()?;
        let total = records.len();

        records.reverse();
        let records: Vec<GenerationRecord> = records
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(HistoryPage {
            records,
            total,
            page,
            pages: if limit == 0 { 0 } else { total.div_ceil(limit) },
        })
    }

    /// Every readable record in file order. Lines that fail to parse are
    /// skipped with a warning.
    fn read_all(&self) -> std::io::Result<Vec<GenerationRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&self.path)?;
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GenerationRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = idx + 1, error = %e, "skipping unreadable history line"),
            }
        }
        Ok(records)
    }
}

impl RecordSink for JsonlRecordSink {
    fn append(&self, record: &GenerationRecord) -> std::io::Result<()> {
        let mut line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        debug!(
            request_type = %record.request_type,
            path = %self.path.display(),
            "generation record appended"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
