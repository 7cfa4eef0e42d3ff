//! Exclusive sector ownership.
//!
//! # Crossing protocol
//!
//! An agent about to cross from sector `A` into a different sector `B` must
//! [`acquire`](SectorLockManager::acquire) `B` first.  Only if that succeeds
//! does the move commit, and in the same commit step `A` is
//! [`release`](SectorLockManager::release)d.  The tick loop is
//! single-threaded, so the acquire/release pair is atomic with respect to
//! every other agent's view of the table.
//!
//! The `Option<SectorId>` arguments let callers pass `sector_of(cell)`
//! straight through: cells outside every sector are never locked.

use rustc_hash::FxHashMap;

use wh_core::{AgentId, SectorId};

/// Sector → owning agent.  A sector has at most one owner at any instant.
#[derive(Clone, Debug, Default)]
pub struct SectorLockManager {
    owners: FxHashMap<SectorId, AgentId>,
}

impl SectorLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current owner of `sector`.
    #[inline]
    pub fn owner(&self, sector: SectorId) -> Option<AgentId> {
        self.owners.get(&sector).copied()
    }

    /// Take ownership of `sector` for `agent`.
    ///
    /// Fails only if another agent holds it.  Passing `None`, or a sector
    /// `agent` already owns, succeeds without changing anything.
    pub fn acquire(&mut self, agent: AgentId, sector: Option<SectorId>) -> bool {
        let Some(sector) = sector else { return true };
        match self.owners.get(&sector) {
            Some(&owner) => owner == agent,
            None => {
                self.owners.insert(sector, agent);
                true
            }
        }
    }

    /// Give up `sector` if `agent` is its owner; otherwise do nothing.
    pub fn release(&mut self, agent: AgentId, sector: Option<SectorId>) {
        let Some(sector) = sector else { return };
        if self.owners.get(&sector) == Some(&agent) {
            self.owners.remove(&sector);
        }
    }

    /// Every currently owned sector, in ascending id order.
    pub fn owned_sectors(&self) -> Vec<SectorId> {
        let mut sectors: Vec<SectorId> = self.owners.keys().copied().collect();
        sectors.sort_unstable();
        sectors
    }

    /// Sectors held by `agent`, in ascending id order.
    pub fn held_by(&self, agent: AgentId) -> Vec<SectorId> {
        let mut sectors: Vec<SectorId> = self
            .owners
            .iter()
            .filter(|&(_, &owner)| owner == agent)
            .map(|(&s, _)| s)
            .collect();
        sectors.sort_unstable();
        sectors
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Drop every lock (episode reset).
    pub fn clear(&mut self) {
        self.owners.clear();
    }
}
