//! Owner Aggregator: a small open-addressed map from owner id (GID or UID) to
//! accumulated bytes.
//!
//! Fixed capacity `G = 128`. One instance lives per worker and one in the coordinator;
//! none are ever shared across threads. `G` is deliberately small: real systems rarely
//! attribute space to more than a few dozen owner ids per walk, so overflow is an
//! operational signal worth surfacing loudly rather than a case to silently truncate.

/// Slot capacity. See module docs.
pub const CAPACITY: usize = 128;

/// Sentinel marking an empty slot. Real GID/UID values are assumed to be less than
/// `u32::MAX`; an owner id that is actually `u32::MAX` is diverted to
/// `unrepresentable_bytes` instead of being written into the slot array, so it can
/// never collide with the empty sentinel (see SPEC_FULL.md OQ-1).
const EMPTY: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Slot {
    owner_id: u32,
    bytes: u64,
}

/// Returned by [`Aggregator::upsert`] when all `CAPACITY` slots are occupied by
/// owner ids other than the one being inserted. Fatal for the worker that hit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

/// Bounded open-addressed owner -> bytes map.
pub struct Aggregator {
    slots: Box<[Slot; CAPACITY]>,
    occupied: usize,
    /// Bytes attributed to the unrepresentable `u32::MAX` owner id, tracked outside
    /// the slot array (see [`EMPTY`]).
    unrepresentable_bytes: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            slots: Box::new([Slot { owner_id: EMPTY, bytes: 0 }; CAPACITY]),
            occupied: 0,
            unrepresentable_bytes: 0,
        }
    }

    /// Add `delta_bytes` to the running total for `owner_id`, inserting a new slot if
    /// this is the first time `owner_id` is seen. Fails with [`Full`] only when every
    /// slot is occupied by some other owner id.
    pub fn upsert(&mut self, owner_id: u32, delta_bytes: u64) -> Result<(), Full> {
        if owner_id == EMPTY {
            self.unrepresentable_bytes += delta_bytes;
            return Ok(());
        }

        let home = (owner_id as usize) % CAPACITY;
        let mut i = home;
        loop {
            let slot = &mut self.slots[i];
            if slot.owner_id == owner_id {
                slot.bytes += delta_bytes;
                return Ok(());
            }
            if slot.owner_id == EMPTY {
                slot.owner_id = owner_id;
                slot.bytes = delta_bytes;
                self.occupied += 1;
                return Ok(());
            }
            i = (i + 1) % CAPACITY;
            if i == home {
                return Err(Full);
            }
        }
    }

    /// Walk the table once and emit occupied slots in slot order. The unrepresentable
    /// `u32::MAX` bucket, if non-empty, is appended last under the literal key
    /// `u32::MAX` so its bytes are never silently dropped from a packed result.
    pub fn pack(&self) -> Vec<(u32, u64)> {
        let mut out = Vec::with_capacity(self.occupied + 1);
        for slot in self.slots.iter() {
            if slot.owner_id != EMPTY {
                out.push((slot.owner_id, slot.bytes));
            }
        }
        if self.unrepresentable_bytes > 0 {
            out.push((EMPTY, self.unrepresentable_bytes));
        }
        out
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_accumulates_same_owner() {
        let mut agg = Aggregator::new();
        agg.upsert(1000, 100).unwrap();
        agg.upsert(1000, 50).unwrap();
        assert_eq!(agg.pack(), vec![(1000, 150)]);
    }

    #[test]
    fn upsert_tracks_distinct_owners() {
        let mut agg = Aggregator::new();
        agg.upsert(1000, 10).unwrap();
        agg.upsert(2000, 20).unwrap();
        let mut packed = agg.pack();
        packed.sort();
        assert_eq!(packed, vec![(1000, 10), (2000, 20)]);
    }

    #[test]
    fn upsert_overflows_past_capacity() {
        let mut agg = Aggregator::new();
        for gid in 0..CAPACITY as u32 {
            agg.upsert(gid, 1).unwrap();
        }
        assert_eq!(agg.upsert(CAPACITY as u32, 1), Err(Full));
    }

    #[test]
    fn collisions_probe_linearly() {
        let mut agg = Aggregator::new();
        // These two owner ids collide at the same home slot.
        let a = 3u32;
        let b = a + CAPACITY as u32;
        agg.upsert(a, 5).unwrap();
        agg.upsert(b, 7).unwrap();
        let mut packed = agg.pack();
        packed.sort();
        assert_eq!(packed, vec![(a, 5), (b, 7)]);
    }

    #[test]
    fn max_owner_id_is_diverted_not_collided() {
        let mut agg = Aggregator::new();
        agg.upsert(u32::MAX, 42).unwrap();
        agg.upsert(0, 1).unwrap();
        let mut packed = agg.pack();
        packed.sort();
        assert_eq!(packed, vec![(0, 1), (u32::MAX, 42)]);
    }

    #[test]
    fn empty_aggregator_packs_empty() {
        let agg = Aggregator::new();
        assert!(agg.pack().is_empty());
    }
}
