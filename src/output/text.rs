//! Plain-text adapter: two sections, "Sub Directories" then "Summaries",
//! followed by a `Total` line. Owner keys are right-justified to 24 characters;
//! sizes are formatted via `-h` if requested.

use std::fmt::Write as _;

use crate::config::OwnerMode;
use crate::coordinator::RunOutcome;
use crate::result_tree::ResultEntry;

use super::owner_keyed_pairs;

const OWNER_COLUMN_WIDTH: usize = 24;

pub fn render(outcome: &RunOutcome, owner_mode: OwnerMode, resolve_names: bool, human_readable: bool) -> String {
    let mut out = String::new();

    let Some(tree) = &outcome.tree else {
        for e in &outcome.errors {
            let _ = writeln!(out, "error: {e}");
        }
        return out;
    };

    if !outcome.errors.is_empty() {
        out.push_str("Errors\n");
        for e in &outcome.errors {
            let _ = writeln!(out, "{e}");
        }
        out.push('\n');
    }

    out.push_str("Sub Directories\n");
    for sub in &tree.subdirs {
        let _ = writeln!(out, "{}", sub.path);
        write_entry(&mut out, sub, owner_mode, resolve_names, human_readable);
    }

    out.push_str("\nSummaries\n");
    write_entry(&mut out, &tree.summary, owner_mode, resolve_names, human_readable);
    let _ = writeln!(out, "{:>width$}  {}", "Total", format_size(tree.total(), human_readable), width = OWNER_COLUMN_WIDTH);

    out
}

fn write_entry(out: &mut String, entry: &ResultEntry, owner_mode: OwnerMode, resolve_names: bool, human_readable: bool) {
    for (key, bytes) in owner_keyed_pairs(entry, owner_mode, resolve_names) {
        let _ = writeln!(out, "{key:>OWNER_COLUMN_WIDTH$}  {}", format_size(bytes, human_readable));
    }
}

/// `B, K, M, G, T, P, E` at 1024-byte steps. Plain decimal bytes when
/// `human_readable` is false.
fn format_size(bytes: u64, human_readable: bool) -> String {
    if !human_readable {
        return bytes.to_string();
    }
    const UNITS: [&str; 7] = ["B", "K", "M", "G", "T", "P", "E"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}{}", UNITS[0])
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}
