//! Fixed-width arithmetic used by the proof-of-work check and the retarget paths.
//!
//! Everything here works on `u64` words: a widening 64x64 -> 128 multiply and the
//! carry helpers used to chain word products together.

mod carry;
mod wide_mul;

pub use carry::{cadc, cadd};
pub use wide_mul::{mul, NativeMul, PortableMul, WideMul};

/// Multiplier selected at build time. The `portable-mul` feature swaps in the
/// 32-bit limb implementation.
#[cfg(not(feature = "portable-mul"))]
pub type DefaultMul = NativeMul;

#[cfg(feature = "portable-mul")]
pub type DefaultMul = PortableMul;
