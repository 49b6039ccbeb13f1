use crate::error::{Result, VotingError};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Shortest configurable window, in seconds
pub const MIN_WINDOW_SECS: u64 = 120;
/// Longest configurable window, in seconds (3 days)
pub const MAX_WINDOW_SECS: u64 = 259_200;

const DEFAULT_WINDOW_SECS: u64 = 3_600;

/// Lifecycle phase of a poll at a given instant
///
/// Derived from deadlines on demand, never stored. The upper boundary of
/// each phase is inclusive: the instant equal to the commit deadline is the
/// last valid commit instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Commit,
    Reveal,
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Commit => f.write_str("commit"),
            Phase::Reveal => f.write_str("reveal"),
            Phase::Closed => f.write_str("closed"),
        }
    }
}

/// A binary-choice poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub commit_deadline: DateTime<Utc>,
    pub reveal_deadline: DateTime<Utc>,
    pub votes_for: u64,
    pub votes_against: u64,
}

impl Poll {
    pub fn phase_at(&self, now: DateTime<Utc>) -> Phase {
        if now <= self.commit_deadline {
            Phase::Commit
        } else if now <= self.reveal_deadline {
            Phase::Reveal
        } else {
            Phase::Closed
        }
    }
}

/// Credential required for poll creation and window reconfiguration
///
/// Minted once by [`PollRegistry::new`] and checked by id. Holding a
/// reference to this value is what authorizes a caller; there is no ambient
/// owner state.
#[derive(Debug)]
pub struct Authority {
    id: Uuid,
}

impl Authority {
    fn mint() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowConfig {
    commit_window: Duration,
    reveal_window: Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            commit_window: Duration::seconds(DEFAULT_WINDOW_SECS as i64),
            reveal_window: Duration::seconds(DEFAULT_WINDOW_SECS as i64),
        }
    }
}

struct RegistryInner {
    polls: HashMap<u64, Poll>,
    next_id: u64,
    windows: WindowConfig,
}

/// Owns polls, their deadlines and vote counters
pub struct PollRegistry {
    authority_id: Uuid,
    inner: RwLock<RegistryInner>,
}

impl PollRegistry {
    /// Create an empty registry and mint its authority credential
    pub fn new() -> (Self, Authority) {
        let authority = Authority::mint();
        let registry = Self {
            authority_id: authority.id(),
            inner: RwLock::new(RegistryInner {
                polls: HashMap::new(),
                next_id: 0,
                windows: WindowConfig::default(),
            }),
        };
        (registry, authority)
    }

    fn check_authority(&self, credential: &Authority) -> Result<()> {
        if credential.id() != self.authority_id {
            return Err(VotingError::Unauthorized);
        }
        Ok(())
    }

    /// Replace the default windows used for polls created from now on
    ///
    /// Existing polls keep the deadlines they were created with.
    pub fn configure_windows(
        &self,
        credential: &Authority,
        commit_secs: u64,
        reveal_secs: u64,
    ) -> Result<()> {
        self.check_authority(credential)?;

        for secs in [commit_secs, reveal_secs] {
            if !(MIN_WINDOW_SECS..=MAX_WINDOW_SECS).contains(&secs) {
                return Err(VotingError::InvalidWindow(secs));
            }
        }

        let mut inner = self.inner.write();
        inner.windows = WindowConfig {
            commit_window: Duration::seconds(commit_secs as i64),
            reveal_window: Duration::seconds(reveal_secs as i64),
        };

        tracing::info!(
            "Configured windows: commit {}s, reveal {}s",
            commit_secs,
            reveal_secs
        );
        Ok(())
    }

    /// Create a poll with deadlines derived from the current window config
    pub fn create_poll(
        &self,
        credential: &Authority,
        name: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        self.check_authority(credential)?;

        let mut inner = self.inner.write();
        let id = inner.next_id;
        let commit_deadline = now + inner.windows.commit_window;
        let reveal_deadline = commit_deadline + inner.windows.reveal_window;

        let poll = Poll {
            id,
            name: name.into(),
            description: description.into(),
            commit_deadline,
            reveal_deadline,
            votes_for: 0,
            votes_against: 0,
        };

        tracing::info!(
            "Created poll {} '{}' (commit until {}, reveal until {})",
            id,
            poll.name,
            commit_deadline,
            reveal_deadline
        );

        inner.polls.insert(id, poll);
        inner.next_id += 1;
        Ok(id)
    }

    /// Snapshot of a single poll
    pub fn get_poll(&self, poll_id: u64) -> Result<Poll> {
        self.inner
            .read()
            .polls
            .get(&poll_id)
            .cloned()
            .ok_or(VotingError::NotFound(poll_id))
    }

    /// Snapshots of all polls, ordered by id
    pub fn list_polls(&self) -> Vec<Poll> {
        let inner = self.inner.read();
        let mut polls: Vec<Poll> = inner.polls.values().cloned().collect();
        polls.sort_by_key(|p| p.id);
        polls
    }

    pub fn phase_of(&self, poll_id: u64, now: DateTime<Utc>) -> Result<Phase> {
        Ok(self.get_poll(poll_id)?.phase_at(now))
    }

    /// Count one revealed vote; only valid during the reveal phase
    ///
    /// Phase is re-checked under the write lock so a counter can never be
    /// bumped outside the reveal window.
    pub(crate) fn record_vote(&self, poll_id: u64, choice: bool, now: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write();
        let poll = inner
            .polls
            .get_mut(&poll_id)
            .ok_or(VotingError::NotFound(poll_id))?;

        let phase = poll.phase_at(now);
        if phase != Phase::Reveal {
            return Err(VotingError::WrongPhase(phase));
        }

        if choice {
            poll.votes_for += 1;
        } else {
            poll.votes_against += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn window_bounds_are_enforced() {
        let (registry, authority) = PollRegistry::new();

        assert!(registry
            .configure_windows(&authority, MIN_WINDOW_SECS, MAX_WINDOW_SECS)
            .is_ok());

        for (commit, reveal) in [
            (MIN_WINDOW_SECS - 1, MIN_WINDOW_SECS),
            (MIN_WINDOW_SECS, MIN_WINDOW_SECS - 1),
            (MAX_WINDOW_SECS + 1, MIN_WINDOW_SECS),
            (MIN_WINDOW_SECS, MAX_WINDOW_SECS + 1),
            (0, 0),
        ] {
            assert!(matches!(
                registry.configure_windows(&authority, commit, reveal),
                Err(VotingError::InvalidWindow(_))
            ));
        }
    }

    #[test]
    fn foreign_credential_is_rejected() {
        let (registry, _authority) = PollRegistry::new();
        let (_other_registry, forged) = PollRegistry::new();

        assert!(matches!(
            registry.configure_windows(&forged, 120, 120),
            Err(VotingError::Unauthorized)
        ));
        assert!(matches!(
            registry.create_poll(&forged, "x", "y", t0()),
            Err(VotingError::Unauthorized)
        ));
    }

    #[test]
    fn poll_ids_are_sequential_from_zero() {
        let (registry, authority) = PollRegistry::new();

        for expected in 0..3 {
            let id = registry
                .create_poll(&authority, format!("poll {}", expected), "", t0())
                .unwrap();
            assert_eq!(id, expected);
        }
        assert_eq!(registry.list_polls().len(), 3);
    }

    #[test]
    fn deadlines_follow_configured_windows() {
        let (registry, authority) = PollRegistry::new();
        registry.configure_windows(&authority, 120, 240).unwrap();

        let id = registry.create_poll(&authority, "a", "b", t0()).unwrap();
        let poll = registry.get_poll(id).unwrap();

        assert_eq!(poll.commit_deadline, t0() + Duration::seconds(120));
        assert_eq!(poll.reveal_deadline, t0() + Duration::seconds(360));
        assert!(poll.reveal_deadline > poll.commit_deadline);
    }

    #[test]
    fn reconfiguration_leaves_existing_polls_alone() {
        let (registry, authority) = PollRegistry::new();
        registry.configure_windows(&authority, 120, 120).unwrap();

        let first = registry.create_poll(&authority, "a", "", t0()).unwrap();
        registry.configure_windows(&authority, 600, 600).unwrap();
        let second = registry.create_poll(&authority, "b", "", t0()).unwrap();

        let first = registry.get_poll(first).unwrap();
        let second = registry.get_poll(second).unwrap();
        assert_eq!(first.commit_deadline, t0() + Duration::seconds(120));
        assert_eq!(second.commit_deadline, t0() + Duration::seconds(600));
    }

    #[test]
    fn phase_boundaries_are_upper_inclusive() {
        let (registry, authority) = PollRegistry::new();
        registry.configure_windows(&authority, 120, 120).unwrap();
        let id = registry.create_poll(&authority, "p", "", t0()).unwrap();

        let sec = Duration::seconds(1);
        let commit_deadline = t0() + Duration::seconds(120);
        let reveal_deadline = t0() + Duration::seconds(240);

        assert_eq!(registry.phase_of(id, t0()).unwrap(), Phase::Commit);
        assert_eq!(registry.phase_of(id, commit_deadline).unwrap(), Phase::Commit);
        assert_eq!(
            registry.phase_of(id, commit_deadline + sec).unwrap(),
            Phase::Reveal
        );
        assert_eq!(registry.phase_of(id, reveal_deadline).unwrap(), Phase::Reveal);
        assert_eq!(
            registry.phase_of(id, reveal_deadline + sec).unwrap(),
            Phase::Closed
        );
    }

    #[test]
    fn unknown_poll_is_not_found() {
        let (registry, _authority) = PollRegistry::new();
        assert!(matches!(
            registry.get_poll(42),
            Err(VotingError::NotFound(42))
        ));
        assert!(matches!(
            registry.phase_of(42, t0()),
            Err(VotingError::NotFound(42))
        ));
    }

    #[test]
    fn record_vote_requires_reveal_phase() {
        let (registry, authority) = PollRegistry::new();
        registry.configure_windows(&authority, 120, 120).unwrap();
        let id = registry.create_poll(&authority, "p", "", t0()).unwrap();

        assert!(matches!(
            registry.record_vote(id, true, t0()),
            Err(VotingError::WrongPhase(Phase::Commit))
        ));

        let reveal_time = t0() + Duration::seconds(121);
        registry.record_vote(id, true, reveal_time).unwrap();
        registry.record_vote(id, false, reveal_time).unwrap();

        let poll = registry.get_poll(id).unwrap();
        assert_eq!((poll.votes_for, poll.votes_against), (1, 1));
    }
}
