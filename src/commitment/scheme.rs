use super::{Digest, DIGEST_LEN};
use rand::RngCore;
use sha2::{Digest as _, Sha256};

/// Trait for commitment schemes
///
/// A scheme maps a binary vote plus auxiliary input to a fixed-size digest.
/// The auxiliary input is what makes (or fails to make) the commitment
/// hiding: with only two possible votes, any auxiliary value an observer can
/// guess lets them enumerate both candidate digests.
pub trait CommitmentScheme {
    fn commit(&self, vote: bool, auxiliary: &[u8]) -> Digest;

    fn verify(&self, digest: &Digest, vote: bool, auxiliary: &[u8]) -> bool {
        self.commit(vote, auxiliary) == *digest
    }
}

/// Reference scheme: auxiliary input is the voter's public identity
///
/// INSECURE BY CONSTRUCTION. Voter identities are public before any commit
/// is made, so an observer can precompute `commit(true, id)` and
/// `commit(false, id)` for every voter and read the vote straight off the
/// published digest. Kept to reproduce the reference behavior and to drive
/// the test demonstrating the leak; use [`SaltedScheme`] for anything real.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScheme;

impl CommitmentScheme for IdentityScheme {
    fn commit(&self, vote: bool, auxiliary: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update([vote as u8]);
        hasher.update(auxiliary);
        Digest::new(hasher.finalize().into())
    }
}

/// Domain separation tag for the salted scheme
const SALTED_TAG: &[u8] = b"commitpoll/salted-v1";

/// Corrected scheme: auxiliary input is a voter-generated secret
///
/// The secret is unknown to observers until reveal, so neither candidate
/// digest can be enumerated ahead of time. The tag separates these digests
/// from any other use of Sha256 over the same material.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaltedScheme;

impl CommitmentScheme for SaltedScheme {
    fn commit(&self, vote: bool, auxiliary: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(SALTED_TAG);
        hasher.update([vote as u8]);
        hasher.update(auxiliary);
        Digest::new(hasher.finalize().into())
    }
}

/// Random secret for use as salted-scheme auxiliary input
pub fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; DIGEST_LEN];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}
