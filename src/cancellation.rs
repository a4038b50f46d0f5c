//! Shared cancellation signal.
//!
//! A single monotonic `AtomicBool` (false -> true, never reset during a run) plus an
//! exit-status cell that keeps the *worst* code if multiple threads race to set one.
//! Replaces the reference implementation's `volatile bool exit_now` / `volatile int
//! exit_status` globals with an explicit, `Arc`-shared collaborator (SPEC_FULL.md §9,
//! "Global mutable state").

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

pub struct Cancellation {
    flag: AtomicBool,
    /// 0 means "no failure recorded yet". Anything else is a real exit code.
    exit_status: AtomicU8,
}

impl Cancellation {
    pub fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            exit_status: AtomicU8::new(0),
        }
    }

    /// Assert cancellation and record `code` as the exit status, unless a code of
    /// equal or greater severity is already recorded. Losing a racing write to
    /// `flag` itself is harmless: any set-to-true is sufficient to terminate.
    pub fn trigger(&self, code: u8) {
        self.flag.store(true, Ordering::Relaxed);
        let mut current = self.exit_status.load(Ordering::Relaxed);
        while code > current {
            match self.exit_status.compare_exchange_weak(
                current,
                code,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn exit_status(&self) -> u8 {
        self.exit_status.load(Ordering::Relaxed)
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled() {
        let c = Cancellation::new();
        assert!(!c.is_cancelled());
        assert_eq!(c.exit_status(), 0);
    }

    #[test]
    fn trigger_sets_flag_and_status() {
        let c = Cancellation::new();
        c.trigger(2);
        assert!(c.is_cancelled());
        assert_eq!(c.exit_status(), 2);
    }

    #[test]
    fn worst_code_wins_regardless_of_order() {
        let c = Cancellation::new();
        c.trigger(2);
        c.trigger(3);
        assert_eq!(c.exit_status(), 3);

        let d = Cancellation::new();
        d.trigger(3);
        d.trigger(2);
        assert_eq!(d.exit_status(), 3);
    }
}
