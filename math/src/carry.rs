/// Returns true when `a + b` carries out of 64 bits.
#[inline]
pub fn cadd(a: u64, b: u64) -> bool {
    a.wrapping_add(b) < a
}

/// Returns true when `a + b + c` carries out of 64 bits.
///
/// The second clause covers `a + b == u64::MAX` with an incoming carry, where the
/// wrapped sum alone does not show the overflow.
#[inline]
pub fn cadc(a: u64, b: u64, c: bool) -> bool {
    let sum = a.wrapping_add(b);
    sum < a || (c && sum == u64::MAX)
}
