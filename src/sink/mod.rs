//! Append-only result records.
//!
//! The sink is the record of "a script was found and queued/stored". It
//! keeps an in-memory list for the display collaborator to snapshot, and
//! optionally journals each job's terminal record as a JSON line under the
//! storage path (one line per finished job, ideal for piping to `jq` or
//! loading elsewhere).
//!
//! Appends may arrive from any worker thread; ordering across appends is
//! not contractually meaningful, only their content.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::models::{Fingerprint, RecordStatus, ResultRecord};

/// Thread-safe append-only record stream.
pub struct ResultSink {
    records: Mutex<Vec<ResultRecord>>,
    journal: Option<Mutex<File>>,
}

impl ResultSink {
    /// Creates an in-memory sink without a journal.
    pub fn new() -> Self {
        ResultSink {
            records: Mutex::new(Vec::new()),
            journal: None,
        }
    }

    /// Creates a sink that also appends terminal records to a JSONL file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the journal file cannot be opened for
    /// append.
    pub fn with_journal(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(ResultSink {
            records: Mutex::new(Vec::new()),
            journal: Some(Mutex::new(file)),
        })
    }

    /// Appends a record for an accepted job and returns its sequence
    /// number.
    pub fn append(&self, fingerprint: &Fingerprint) -> u64 {
        let mut records = self.lock_records();
        let sequence = records.len() as u64;
        records.push(ResultRecord {
            sequence,
            host: fingerprint.host.clone(),
            url: fingerprint.url.clone(),
            status: RecordStatus::Added,
            content_hash: fingerprint.content_hash.to_hex(),
            observed_at_ms: Utc::now().timestamp_millis(),
        });
        sequence
    }

    /// Moves a record to its terminal status and journals it.
    ///
    /// A record's status changes exactly once after append; a second
    /// completion is logged and ignored.
    pub fn complete(&self, sequence: u64, status: RecordStatus) {
        let journal_entry = {
            let mut records = self.lock_records();
            let Some(record) = records.get_mut(sequence as usize) else {
                log::error!("Completion for unknown result record {sequence}");
                return;
            };
            if record.status != RecordStatus::Added {
                log::error!(
                    "Result record {sequence} already completed as {}; ignoring {status}",
                    record.status
                );
                return;
            }
            record.status = status;
            record.clone()
        };
        self.journal_record(&journal_entry);
    }

    /// Copy of the record stream, for display.
    pub fn snapshot(&self) -> Vec<ResultRecord> {
        self.lock_records().clone()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    /// True when nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.lock_records().is_empty()
    }

    fn journal_record(&self, record: &ResultRecord) {
        let Some(journal) = &self.journal else {
            return;
        };
        match serde_json::to_string(record) {
            Ok(line) => {
                let mut file = journal.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = writeln!(file, "{line}") {
                    log::warn!("Failed to append result record to journal: {e}");
                }
            }
            Err(e) => log::warn!("Failed to serialize result record {}: {e}", record.sequence),
        }
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, Vec<ResultRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResultSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::hash_content;

    fn fingerprint(content: &[u8]) -> Fingerprint {
        Fingerprint {
            host: "example.net".into(),
            url: "https://example.net/app.js".into(),
            content_hash: hash_content(content),
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn append_assigns_increasing_sequence_numbers() {
        let sink = ResultSink::new();
        assert_eq!(sink.append(&fingerprint(b"a")), 0);
        assert_eq!(sink.append(&fingerprint(b"b")), 1);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn complete_changes_status_exactly_once() {
        let sink = ResultSink::new();
        let sequence = sink.append(&fingerprint(b"a"));
        sink.complete(sequence, RecordStatus::Beautified);
        assert_eq!(sink.snapshot()[0].status, RecordStatus::Beautified);

        // The status label never moves again after completion.
        sink.complete(sequence, RecordStatus::Failed);
        assert_eq!(sink.snapshot()[0].status, RecordStatus::Beautified);
    }

    #[test]
    fn complete_for_unknown_sequence_is_ignored() {
        let sink = ResultSink::new();
        sink.complete(42, RecordStatus::Failed);
        assert!(sink.is_empty());
    }

    #[test]
    fn journal_receives_one_line_per_terminal_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let sink = ResultSink::with_journal(&path).unwrap();

        let first = sink.append(&fingerprint(b"a"));
        let second = sink.append(&fingerprint(b"b"));
        sink.complete(first, RecordStatus::Beautified);
        sink.complete(second, RecordStatus::Failed);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["status"], "beautified");
        assert_eq!(parsed["host"], "example.net");
    }

    #[test]
    fn concurrent_appends_are_all_recorded() {
        use std::sync::Arc;

        let sink = Arc::new(ResultSink::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let sink = Arc::clone(&sink);
            handles.push(std::thread::spawn(move || {
                let sequence = sink.append(&fingerprint(format!("content {i}").as_bytes()));
                sink.complete(sequence, RecordStatus::Beautified);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sink.len(), 8);
        assert!(sink
            .snapshot()
            .iter()
            .all(|record| record.status == RecordStatus::Beautified));
    }
}
