//! Shared memo of program-address derivations.
//!
//! [`find_program_address`] is pure but may hash up to 256 candidates, so
//! results are kept in a concurrent map keyed by the exact seeds and program.
//! Failures are not cached.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use zoints_core::address::Address;
use zoints_core::error::DerivationError;
use zoints_core::pda::find_program_address;

type CacheKey = (Vec<Vec<u8>>, Address);

/// Read-through cache over [`find_program_address`].
#[derive(Debug, Default)]
pub struct AddressCache {
    entries: DashMap<CacheKey, (Address, u8)>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached [`find_program_address`].
    pub fn find(
        &self,
        seeds: &[&[u8]],
        program_id: &Address,
    ) -> Result<(Address, u8), DerivationError> {
        let key: CacheKey = (seeds.iter().map(|s| s.to_vec()).collect(), *program_id);
        if let Some(found) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(*found);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let found = find_program_address(seeds, program_id)?;
        debug!(address = %found.0, bump = found.1, "derived program address");
        self.entries.insert(key, found);
        Ok(found)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
