use crate::commitment::Digest;
use crate::error::{Result, VotingError};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

type Key = (Uuid, u64);

/// Pending commitments, one per `(voter, poll)` key
///
/// All mutation happens under a single lock acquisition, which is the
/// serialization point preventing two concurrent reveals from both consuming
/// the same commitment.
pub struct CommitmentStore {
    entries: Mutex<HashMap<Key, Digest>>,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record a commitment; at most one may be pending per key
    pub fn put(&self, voter: Uuid, poll_id: u64, digest: Digest) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&(voter, poll_id)) {
            return Err(VotingError::AlreadyCommitted(voter));
        }
        entries.insert((voter, poll_id), digest);
        Ok(())
    }

    /// Consume the commitment for a key iff it matches `expected`
    ///
    /// Compare-and-remove under one lock: a mismatch leaves the stored
    /// commitment untouched, a match clears it so a second reveal finds
    /// nothing to consume.
    pub fn consume(&self, voter: Uuid, poll_id: u64, expected: &Digest) -> Result<()> {
        let mut entries = self.entries.lock();
        let stored = entries
            .get(&(voter, poll_id))
            .ok_or(VotingError::NoCommitment(voter))?;

        if stored != expected {
            return Err(VotingError::CommitmentMismatch(voter));
        }

        entries.remove(&(voter, poll_id));
        Ok(())
    }

    pub fn has_commitment(&self, voter: Uuid, poll_id: u64) -> bool {
        self.entries.lock().contains_key(&(voter, poll_id))
    }
}

impl Default for CommitmentStore {
    fn default() -> Self {
        Self::new()
    }
}
