//! Output adapters: thin renderers over [`crate::result_tree::ResultTree`] and
//! the accumulated error list. Neither adapter touches the traversal engine --
//! they only consume the value types the coordinator already produced.

pub mod json;
pub mod text;

use crate::config::{OutputFormat, OwnerMode};
use crate::coordinator::RunOutcome;
use crate::owner_names;
use crate::result_tree::ResultEntry;

/// Render an entry's `(owner_id, bytes)` pairs into `(owner-key, bytes)` pairs,
/// resolving names when configured. Shared by both adapters so the key
/// computation can't drift between them.
pub(crate) fn owner_keyed_pairs(
    entry: &ResultEntry,
    owner_mode: OwnerMode,
    resolve_names: bool,
) -> Vec<(String, u64)> {
    entry
        .pairs
        .iter()
        .map(|&(owner_id, bytes)| (owner_names::render(owner_id, owner_mode, resolve_names), bytes))
        .collect()
}

pub fn render(outcome: &RunOutcome, format: OutputFormat, owner_mode: OwnerMode, resolve_names: bool, human_readable: bool) -> String {
    match format {
        OutputFormat::Json => json::render(outcome, owner_mode, resolve_names),
        OutputFormat::PlainText => text::render(outcome, owner_mode, resolve_names, human_readable),
    }
}
