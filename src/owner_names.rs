//! Owner id -> name resolution, treated as an external lookup service boundary
//! (SPEC_FULL.md §1/§2.1). Only consulted by the output adapters when `-n` is set;
//! the traversal engine never resolves names.

use crate::config::OwnerMode;

/// Render `owner_id` as a name when resolution succeeds, falling back to the
/// decimal id otherwise.
pub fn render(owner_id: u32, mode: OwnerMode, resolve_names: bool) -> String {
    if owner_id == u32::MAX {
        // The "unrepresentable owner" bucket (see aggregator::Full / OQ-1) has no
        // real id to resolve.
        return owner_id.to_string();
    }
    if !resolve_names {
        return owner_id.to_string();
    }
    match mode {
        OwnerMode::Gid => uzers::get_group_by_gid(owner_id)
            .map(|g| g.name().to_string_lossy().into_owned())
            .unwrap_or_else(|| owner_id.to_string()),
        OwnerMode::Uid => uzers::get_user_by_uid(owner_id)
            .map(|u| u.name().to_string_lossy().into_owned())
            .unwrap_or_else(|| owner_id.to_string()),
    }
}
