use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// A fingerprint of an artifact's text.
///
/// Fingerprints are only ever used as a cheap inequality pre-check: two
/// revisions with the same fingerprint are treated as the same revision.
#[derive(
    Debug,
    Display,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    From,
    Into,
)]
#[serde(transparent)]
pub struct Fingerprint(u64);

/// Computes fingerprints for artifact text.
///
/// Any `Fn(&str) -> Fingerprint` is a `Fingerprinter`, which makes it easy to
/// substitute a degenerate hash when exercising collisions.
pub trait Fingerprinter {
    fn fingerprint(&self, text: &str) -> Fingerprint;
}

impl<T> Fingerprinter for T
where
    T: Fn(&str) -> Fingerprint,
{
    fn fingerprint(&self, text: &str) -> Fingerprint {
        self(text)
    }
}

/// The default fingerprinter: the first eight bytes of the BLAKE3 digest of
/// the text, read as a little endian integer.
///
/// Unlike `std`'s `RandomState`, the result is the same in every process and
/// on every platform, so fingerprints written by one run remain meaningful to
/// the next.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3;

impl Fingerprinter for Blake3 {
    fn fingerprint(&self, text: &str) -> Fingerprint {
        let digest = blake3::hash(text.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);

        Fingerprint(u64::from_le_bytes(prefix))
    }
}
