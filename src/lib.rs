//! Commit-reveal binary voting protocol
//!
//! Voters submit a hiding commitment to a yes/no choice while a poll's
//! commit window is open, then disclose the choice during the reveal window,
//! where it is checked against the original commitment. Phases are derived
//! from deadlines and an injected clock on every call; nothing advances them
//! explicitly.
//!
//! Two commitment schemes ship. [`IdentityScheme`] reproduces a reference
//! design whose auxiliary input is the voter's public identity — with a
//! two-value vote domain that lets anyone precompute both candidate digests
//! per voter and read votes straight off published commitments, so it is
//! only suitable for demonstrating the flaw. [`SaltedScheme`] commits over a
//! voter-generated secret instead and is the one to embed.

pub mod clock;
pub mod commitment;
pub mod engine;
pub mod error;
pub mod registry;
pub mod store;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use commitment::{
    generate_secret, CommitmentScheme, Digest, IdentityScheme, SaltedScheme, DIGEST_LEN,
};
pub use engine::{EngineConfig, PollResult, VotingEngine};
pub use error::{Result, VotingError};
pub use registry::{Authority, Phase, Poll, PollRegistry, MAX_WINDOW_SECS, MIN_WINDOW_SECS};
pub use store::CommitmentStore;
