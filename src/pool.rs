//! Worker Pool: a fixed-size array of slots holding in-flight workers.
//!
//! Admission blocks the coordinator until a slot is free. Mirrors the reference C
//! implementation's `tr_find_slot`/`tr_recover_slots`/`tr_finalize` trio almost
//! exactly: a linear scan for an empty slot, a non-blocking reap attempt, then a
//! short sleep and retry. SPEC_FULL.md's OQ-3 records that a blocking admission
//! primitive (semaphore, channel) was considered and deliberately not used -- the
//! polling design is itself the thing under test here.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::worker::WorkerResult;

/// How long `find_slot` sleeps between polls when every slot is occupied and none
/// have completed yet.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A worker result tagged with the discovery-order index of the subdirectory it
/// came from, so the coordinator can restore discovery order even though workers
/// complete in arbitrary order.
pub struct IndexedResult {
    pub index: usize,
    pub result: WorkerResult,
}

pub struct WorkerPool {
    slots: Vec<Option<(usize, JoinHandle<WorkerResult>)>>,
    completed: Vec<IndexedResult>,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, completed: Vec::new() }
    }

    /// Block (via polling) until a slot is free, then spawn `job` into it under
    /// `index`.
    pub fn admit<F>(&mut self, index: usize, job: F)
    where
        F: FnOnce() -> WorkerResult + Send + 'static,
    {
        let slot = self.find_slot();
        let handle = thread::Builder::new()
            .name(format!("subtree-worker-{index}"))
            .spawn(job)
            .expect("failed to spawn subtree worker thread");
        self.slots[slot] = Some((index, handle));
    }

    fn find_slot(&mut self) -> usize {
        loop {
            if let Some(i) = self.slots.iter().position(|s| s.is_none()) {
                return i;
            }
            if let Some(i) = self.reap_one() {
                return i;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Non-blocking: reap the first slot whose thread has finished, recording its
    /// result. Returns that slot's index so the caller can reuse it immediately.
    fn reap_one(&mut self) -> Option<usize> {
        for i in 0..self.slots.len() {
            let finished = matches!(&self.slots[i], Some((_, handle)) if handle.is_finished());
            if finished {
                let (index, handle) = self.slots[i].take().unwrap();
                let result = handle.join().expect("subtree worker thread panicked");
                self.completed.push(IndexedResult { index, result });
                return Some(i);
            }
        }
        None
    }

    /// Block until every in-flight worker has completed, then return all results
    /// (including ones reaped earlier by `admit`), unordered.
    pub fn finalize(mut self) -> Vec<IndexedResult> {
        for slot in self.slots.iter_mut() {
            if let Some((index, handle)) = slot.take() {
                let result = handle.join().expect("subtree worker thread panicked");
                self.completed.push(IndexedResult { index, result });
            }
        }
        self.completed
    }
}
