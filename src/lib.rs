//! Incremental multiset hash over 32-byte keys (MuHash), with set elements
//! mapped into the multiplicative group modulo the 3072-bit safe prime
//! 2^3072 - 1103717 via 384 bytes of ChaCha20 keystream.
//!
//! Unlike an ordinary hash over a serialized set, the digest is independent of
//! insertion order, elements can be removed again, and accumulators built over
//! shards of the input can be combined into the digest of the whole. See
//! <https://cseweb.ucsd.edu/~mihir/papers/inchash.pdf> for the construction.

mod hash;
mod num3072;

pub use hash::{MuHash3072, OverflowError, DIGEST_SIZE, KEY_SIZE};
