//! Result entry and result tree value types, plus the rollup computation.
//!
//! These are plain owned values -- no pointer-to-pointer indirection threading
//! mutation through worker boundaries, unlike the reference C implementation's
//! `struct tr_args **`. Each worker returns its packed result by move over a channel
//! and the coordinator assembles the tree from owned parts (SPEC_FULL.md §9,
//! "Result tree ownership").

use crate::aggregator::Aggregator;

/// `(path, owner -> bytes pairs)`, produced for the root, for each subdirectory
/// worker, and for the terminal summary.
#[derive(Debug, Clone)]
pub struct ResultEntry {
    pub path: String,
    pub pairs: Vec<(u32, u64)>,
}

impl ResultEntry {
    pub fn new(path: impl Into<String>, pairs: Vec<(u32, u64)>) -> Self {
        Self { path: path.into(), pairs }
    }
}

/// Ordered sequence: `[root, sub_1, ..., sub_k, summary]`.
#[derive(Debug, Clone)]
pub struct ResultTree {
    pub root: ResultEntry,
    pub subdirs: Vec<ResultEntry>,
    pub summary: ResultEntry,
}

impl ResultTree {
    /// Build the summary entry by upserting every `(id, bytes)` pair from `root` and
    /// every `subdirs` entry into a fresh rollup Aggregator. Commutative and
    /// associative, so parallelism never affects the values, only their order.
    pub fn build(root: ResultEntry, subdirs: Vec<ResultEntry>) -> Result<Self, crate::aggregator::Full> {
        let mut rollup = Aggregator::new();
        for entry in std::iter::once(&root).chain(subdirs.iter()) {
            for &(owner_id, bytes) in &entry.pairs {
                rollup.upsert(owner_id, bytes)?;
            }
        }
        let summary = ResultEntry::new("totals", rollup.pack());
        Ok(Self { root, subdirs, summary })
    }

    /// Grand total across every owner in the summary.
    pub fn total(&self) -> u64 {
        self.summary.pairs.iter().map(|&(_, bytes)| bytes).sum()
    }
}
