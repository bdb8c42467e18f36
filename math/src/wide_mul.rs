use crate::DefaultMul;

/// Full-width unsigned 64x64 -> 128 multiplication returning `(low, high)` words.
pub trait WideMul {
    fn mul(a: u64, b: u64) -> (u64, u64);
}

/// Multiplication through the native `u128` type.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeMul;

impl WideMul for NativeMul {
    #[inline]
    fn mul(a: u64, b: u64) -> (u64, u64) {
        let r = (a as u128) * (b as u128);
        (r as u64, (r >> 64) as u64)
    }
}

/// Schoolbook multiplication over 32-bit limbs, no wide integer involved.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortableMul;

impl WideMul for PortableMul {
    #[inline]
    fn mul(a: u64, b: u64) -> (u64, u64) {
        const LOW_MASK: u64 = 0xFFFF_FFFF;

        let a_low = a & LOW_MASK;
        let a_high = a >> 32;
        let b_low = b & LOW_MASK;
        let b_high = b >> 32;

        let res = a_low * b_low;
        let low_res1 = res & LOW_MASK;
        let carry = res >> 32;

        // Each partial product plus a 32-bit carry stays below 2^64.
        let res = a_high * b_low + carry;
        let high_res_high1 = res >> 32;
        let high_res_low1 = res & LOW_MASK;

        let res = a_low * b_high;
        let low_res2 = res & LOW_MASK;
        let carry = res >> 32;

        let res = a_high * b_high + carry;
        let high_res_high2 = res >> 32;
        let high_res_low2 = res & LOW_MASK;

        let r = high_res_low1 + low_res2;
        let carry = r >> 32;
        let low = (r << 32) | low_res1;
        let r = high_res_high1 + high_res_low2 + carry;
        let d3 = r & LOW_MASK;
        let carry = r >> 32;
        let r = high_res_high2 + carry;
        let high = d3 | (r << 32);

        (low, high)
    }
}

/// Multiplies with the build-selected implementation.
#[inline]
pub fn mul(a: u64, b: u64) -> (u64, u64) {
    DefaultMul::mul(a, b)
}
