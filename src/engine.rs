use crate::clock::ClockSource;
use crate::commitment::{CommitmentScheme, Digest};
use crate::error::{Result, VotingError};
use crate::registry::{Authority, Phase, Poll, PollRegistry};
use crate::store::CommitmentStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Engine options
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Permit revealing on behalf of another voter
    ///
    /// When false, the caller must be the voter whose commitment is
    /// consumed. When true, the supplied voter identity keys the lookup and
    /// anyone holding the right `(vote, auxiliary)` pair may trigger the
    /// reveal.
    pub allow_third_party_reveal: bool,
}

/// Final tally of a closed poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResult {
    pub name: String,
    pub description: String,
    pub votes_for: u64,
    pub votes_against: u64,
}

/// Orchestrates the commit-reveal lifecycle
///
/// Holds no poll or commitment state of its own: polls live in the
/// registry, pending commitments in the store. Every operation derives the
/// current phase from the clock at call time.
pub struct VotingEngine<C, S> {
    registry: PollRegistry,
    store: CommitmentStore,
    clock: C,
    scheme: S,
    config: EngineConfig,
}

impl<C: ClockSource, S: CommitmentScheme> VotingEngine<C, S> {
    /// Build an engine and mint the credential for its registry
    pub fn new(clock: C, scheme: S, config: EngineConfig) -> (Self, Authority) {
        let (registry, authority) = PollRegistry::new();
        let engine = Self {
            registry,
            store: CommitmentStore::new(),
            clock,
            scheme,
            config,
        };
        (engine, authority)
    }

    pub fn configure_windows(
        &self,
        credential: &Authority,
        commit_secs: u64,
        reveal_secs: u64,
    ) -> Result<()> {
        self.registry
            .configure_windows(credential, commit_secs, reveal_secs)
    }

    pub fn create_poll(
        &self,
        credential: &Authority,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<u64> {
        self.registry
            .create_poll(credential, name, description, self.clock.now())
    }

    pub fn get_poll(&self, poll_id: u64) -> Result<Poll> {
        self.registry.get_poll(poll_id)
    }

    pub fn list_polls(&self) -> Vec<Poll> {
        self.registry.list_polls()
    }

    pub fn phase_of(&self, poll_id: u64) -> Result<Phase> {
        self.registry.phase_of(poll_id, self.clock.now())
    }

    pub fn has_commitment(&self, voter: Uuid, poll_id: u64) -> bool {
        self.store.has_commitment(voter, poll_id)
    }

    fn require_phase(&self, poll_id: u64, now: DateTime<Utc>, wanted: Phase) -> Result<()> {
        let phase = self.registry.phase_of(poll_id, now)?;
        if phase != wanted {
            return Err(VotingError::WrongPhase(phase));
        }
        Ok(())
    }

    /// Record a voter's commitment during the commit phase
    pub fn commit(&self, poll_id: u64, voter: Uuid, digest: Digest) -> Result<()> {
        self.require_phase(poll_id, self.clock.now(), Phase::Commit)?;
        self.store.put(voter, poll_id, digest)?;

        tracing::info!("Voter {} committed in poll {}", voter, poll_id);
        Ok(())
    }

    /// Disclose a vote and check it against the pending commitment
    ///
    /// On a match the commitment is consumed and the matching counter
    /// incremented, both exactly once. A mismatch or phase failure changes
    /// nothing.
    pub fn reveal(
        &self,
        poll_id: u64,
        caller: Uuid,
        voter: Uuid,
        vote: bool,
        auxiliary: &[u8],
    ) -> Result<()> {
        // one clock reading per call, so the phase seen here is the phase
        // record_vote sees
        let now = self.clock.now();
        self.require_phase(poll_id, now, Phase::Reveal)?;

        if !self.config.allow_third_party_reveal && caller != voter {
            return Err(VotingError::Unauthorized);
        }

        let expected = self.scheme.commit(vote, auxiliary);
        if let Err(err) = self.store.consume(voter, poll_id, &expected) {
            tracing::warn!("Reveal rejected for voter {} in poll {}: {}", voter, poll_id, err);
            return Err(err);
        }

        self.registry.record_vote(poll_id, vote, now)?;

        tracing::info!(
            "Voter {} revealed vote {} in poll {}",
            voter,
            vote,
            poll_id
        );
        Ok(())
    }

    /// Read the final tally once the reveal phase has ended
    ///
    /// Idempotent: repeat calls return the same result and change nothing.
    pub fn finalize(&self, poll_id: u64) -> Result<PollResult> {
        let poll = self.registry.get_poll(poll_id)?;
        if poll.phase_at(self.clock.now()) != Phase::Closed {
            return Err(VotingError::RevealNotFinished(poll_id));
        }

        let result = PollResult {
            name: poll.name,
            description: poll.description,
            votes_for: poll.votes_for,
            votes_against: poll.votes_against,
        };

        tracing::info!(
            "Poll {} closed: '{}' {} for, {} against",
            poll_id,
            result.name,
            result.votes_for,
            result.votes_against
        );
        Ok(result)
    }
}
