use std::fmt;
use std::ops::{DivAssign, MulAssign};

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use sha2::{Digest, Sha256};

use crate::num3072::Num3072;

/// Size of a set element key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of a finalized digest (and of a serialized accumulator) in bytes.
pub const DIGEST_SIZE: usize = 384;

/// Stretch a 32-byte key into a 3072-bit group element.
///
/// The key is used as a ChaCha20 key with an all-zero nonce and the block
/// counter starting at 0; the first 384 keystream bytes are read as a
/// little-endian integer. Any change to this mapping changes every digest.
fn key_to_element(key: &[u8; KEY_SIZE]) -> Num3072 {
    let mut keystream = [0u8; DIGEST_SIZE];
    let mut cipher = ChaCha20::new(key.into(), (&[0u8; 12]).into());
    cipher.apply_keystream(&mut keystream);
    Num3072::from_le_bytes(&keystream)
}

/// Rejected serialized state: the encoded value is not below the group modulus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverflowError;

impl fmt::Display for OverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "serialized multiset hash state exceeds the field modulus")
    }
}

impl std::error::Error for OverflowError {}

/// An incremental hash of a multiset of 32-byte keys.
///
/// The accumulator keeps the running product of all added elements divided by
/// all removed elements in the multiplicative group modulo the safe prime
/// 2^3072 - 1103717, so elements can be added and removed in any order and the
/// digest only depends on the resulting multiset. Updates are associative as
/// well: disjoint shards can be folded into separate accumulators (possibly on
/// separate threads) and combined afterwards with `*=`, giving the same digest
/// as a single sequential pass.
///
/// Removing an element that was never added produces a well-defined value but
/// no longer describes a multiset; membership is never checked.
#[derive(Clone)]
pub struct MuHash3072 {
    data: Num3072,
}

impl MuHash3072 {
    /// The hash of the empty multiset.
    pub fn new() -> Self {
        Self { data: Num3072::one() }
    }

    /// The hash of the multiset containing `key` once.
    pub fn from_key(key: &[u8; KEY_SIZE]) -> Self {
        Self { data: key_to_element(key) }
    }

    /// Add an arbitrary byte string to the set, keyed by its SHA-256 hash.
    pub fn insert(&mut self, data: &[u8]) {
        let key: [u8; KEY_SIZE] = Sha256::digest(data).into();
        *self *= &MuHash3072::from_key(&key);
    }

    /// Remove an arbitrary byte string from the set, keyed by its SHA-256 hash.
    pub fn remove(&mut self, data: &[u8]) {
        let key: [u8; KEY_SIZE] = Sha256::digest(data).into();
        *self /= &MuHash3072::from_key(&key);
    }

    /// Write the canonical 384-byte little-endian digest of the current set.
    ///
    /// The observable value is unchanged; the accumulator can keep being
    /// updated and finalized afterwards.
    pub fn finalize(&mut self, hash384: &mut [u8; DIGEST_SIZE]) {
        if self.data.is_overflow() {
            self.data.full_reduce();
        }
        hash384.copy_from_slice(&self.data.to_le_bytes());
    }

    /// Serialize the accumulator state. Identical bytes to `finalize`.
    pub fn to_bytes(&self) -> [u8; DIGEST_SIZE] {
        let mut data = self.data;
        if data.is_overflow() {
            data.full_reduce();
        }
        data.to_le_bytes()
    }

    /// Restore an accumulator from `to_bytes` output.
    ///
    /// Only canonical encodings are accepted; values at or above the modulus
    /// are rejected.
    pub fn from_bytes(bytes: &[u8; DIGEST_SIZE]) -> Result<Self, OverflowError> {
        let data = Num3072::from_le_bytes(bytes);
        if data.is_overflow() {
            return Err(OverflowError);
        }
        Ok(Self { data })
    }
}

impl Default for MuHash3072 {
    fn default() -> Self {
        Self::new()
    }
}

/// Union of the two multisets.
impl MulAssign<&MuHash3072> for MuHash3072 {
    fn mul_assign(&mut self, other: &MuHash3072) {
        self.data.multiply(&other.data);
    }
}

/// Difference of the two multisets. The divisor is inverted with one
/// Fermat exponentiation, which makes removal noticeably more expensive
/// than insertion.
impl DivAssign<&MuHash3072> for MuHash3072 {
    fn div_assign(&mut self, other: &MuHash3072) {
        let inverse = other.data.inverse();
        self.data.multiply(&inverse);
    }
}
