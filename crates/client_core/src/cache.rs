//! Local copy of the remote koder list.
//!
//! The cache has one invalidation rule: any successful mutation invalidates
//! it, and invalidation is always followed by a resync that replaces the whole
//! list. Resyncs carry increasing tickets; a result is applied only when its
//! ticket is newer than the last applied one, so a slow refetch cannot
//! overwrite a fresher list.

use shared::domain::Koder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResyncTicket(u64);

impl ResyncTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncApplied {
    Applied,
    Discarded,
}

#[derive(Debug, Clone)]
pub struct RecordCache {
    records: Vec<Koder>,
    issued: u64,
    applied: u64,
}

impl RecordCache {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            issued: 0,
            applied: 0,
        }
    }

    pub fn records(&self) -> &[Koder] {
        &self.records
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }

    pub fn begin_resync(&mut self) -> ResyncTicket {
        self.issued += 1;
        ResyncTicket(self.issued)
    }

    /// Called after a successful create or delete. The local list is no
    /// longer trusted; the returned ticket must be resolved by a refetch.
    pub fn invalidate(&mut self) -> ResyncTicket {
        self.begin_resync()
    }

    pub fn apply(&mut self, ticket: ResyncTicket, records: Vec<Koder>) -> ResyncApplied {
        if ticket.0 <= self.applied {
            return ResyncApplied::Discarded;
        }
        self.records = records;
        self.applied = ticket.0;
        ResyncApplied::Applied
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new()
    }
}
