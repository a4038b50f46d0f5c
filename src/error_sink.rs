//! Error Sink: a bounded, shared append-only buffer of error records.
//!
//! Writers take a mutex, format `"{path}: {message}"`, append, and release. Exceeding
//! the configured maximum asserts the shared cancellation flag and returns
//! `Overflow` *without* appending the record that pushed it over -- matching the
//! reference implementation's `store_error`.

use std::sync::Mutex;

use crate::ignore_poison::IgnorePoison;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Ok,
    Overflow,
}

pub struct ErrorSink {
    max_errors: usize,
    records: Mutex<Vec<String>>,
}

impl ErrorSink {
    pub fn new(max_errors: u16) -> Self {
        Self {
            max_errors: max_errors as usize,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Record `"{path}: {message}"`. Returns `Overflow` once the sink is full; the
    /// caller is responsible for asserting cancellation and the exit status on that
    /// outcome (kept out of this type so the sink has no dependency on the
    /// cancellation signal).
    pub fn record(&self, path: impl AsRef<str>, message: impl AsRef<str>) -> RecordOutcome {
        let mut guard = self.records.lock_ignore_poison();
        if guard.len() >= self.max_errors {
            return RecordOutcome::Overflow;
        }
        guard.push(format!("{}: {}", path.as_ref(), message.as_ref()));
        RecordOutcome::Ok
    }

    /// Snapshot all recorded errors in insertion order. Intended to be called once,
    /// after every worker has joined.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut self.records.lock_ignore_poison())
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock_ignore_poison().is_empty()
    }
}
