//! Proof-of-work admission.
//!
//! A hash passes when `hash * difficulty` fits in 256 bits, i.e. the hash is
//! below the implicit target `2^256 / difficulty`. The product is built one
//! 64-bit word at a time so no 256-bit integer is ever materialized.

use consensus_core::{Difficulty, Hash};
use pow_math::{cadc, cadd, DefaultMul, WideMul};

/// Checks `hash` against `difficulty` with the build-selected multiplier.
///
/// `difficulty` must be non-zero. Zero is not a meaningful target and callers
/// are expected to reject it before reaching this point.
#[inline]
#[must_use]
pub fn check_hash(hash: &Hash, difficulty: Difficulty) -> bool {
    check_hash_with::<DefaultMul>(hash, difficulty)
}

/// Same as [`check_hash`] with an explicit multiplication implementation.
#[must_use]
pub fn check_hash_with<M: WideMul>(hash: &Hash, difficulty: Difficulty) -> bool {
    debug_assert!(difficulty != 0, "difficulty must be non-zero");
    let words = hash.to_le_u64();

    // The top word decides almost every random hash, so it goes first.
    let (top, high) = M::mul(words[3], difficulty);
    if high != 0 {
        return false;
    }

    let (_, cur) = M::mul(words[0], difficulty);
    let (low, high) = M::mul(words[1], difficulty);
    let carry = cadd(cur, low);
    let cur = high;
    let (low, high) = M::mul(words[2], difficulty);
    let carry = cadc(cur, low, carry);
    let carry = cadc(high, top, carry);
    !carry
}
