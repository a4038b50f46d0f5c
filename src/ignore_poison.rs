//! Extension trait to ignore mutex poisoning.
//!
//! A panic in one worker thread while holding the Error Sink's mutex shouldn't
//! invalidate the sink for every other thread -- the worst case is a partially
//! written record, which is tolerable for an error log. This trait replaces the
//! boilerplate `.lock().unwrap_or_else(|e| e.into_inner())` with a readable call.

use std::sync::{Mutex, MutexGuard};

pub trait IgnorePoison<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnorePoison<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}
