//! Single-limb arithmetic primitives.

/// A machine word.
pub type Limb = u64;
/// A fixed-length array of machine words.
pub type Limbs<const N: usize> = [Limb; N];
/// A double-width word holding a full single-limb product.
pub type WideLimb = u128;

/// Computes the full 128-bit product of two limbs.
#[inline(always)]
#[doc(hidden)]
pub const fn widening_mul(a: u64, b: u64) -> u128 {
    a as u128 * b as u128
}

/// Calculate `a + b * c`, returning the lower 64 bits of the result and the
/// upper 64 bits as a carry.
#[inline(always)]
#[doc(hidden)]
pub const fn mac(a: u64, b: u64, c: u64) -> (u64, u64) {
    let tmp = (a as u128) + widening_mul(b, c);
    let carry = (tmp >> 64) as u64;
    (tmp as u64, carry)
}

/// Calculate `a + (b * c) + carry`, returning the least significant digit
/// and the new carry.
#[inline(always)]
#[doc(hidden)]
pub const fn carrying_mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let tmp = (a as u128) + widening_mul(b, c) + (carry as u128);
    let carry = (tmp >> 64) as u64;
    (tmp as u64, carry)
}

/// Calculate `a + b + carry` and return the result and the new carry.
#[inline(always)]
#[doc(hidden)]
pub const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let tmp = a as u128 + b as u128 + carry as u128;
    let carry = (tmp >> 64) as u64;
    (tmp as u64, carry)
}

/// Sets `a = a + b + carry`, and returns the new carry.
#[inline(always)]
#[doc(hidden)]
pub fn adc_for_add_with_carry(a: &mut u64, b: u64, carry: bool) -> bool {
    let (sum, carry1) = a.overflowing_add(b);
    let (sum, carry2) = sum.overflowing_add(carry as u64);
    *a = sum;
    carry1 | carry2
}

/// Calculate `a - b - borrow` and return the result and the new borrow.
pub const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let tmp = (1u128 << 64) + (a as u128) - (b as u128) - (borrow as u128);
    let borrow = if tmp >> 64 == 0 { 1 } else { 0 };
    (tmp as u64, borrow)
}

/// Sets `a = a - b - borrow`, and returns the new borrow.
#[inline(always)]
#[doc(hidden)]
pub fn sbb_for_sub_with_borrow(a: &mut u64, b: u64, borrow: bool) -> bool {
    let (sub, borrow1) = a.overflowing_sub(b);
    let (sub, borrow2) = sub.overflowing_sub(borrow as u64);
    *a = sub;
    borrow1 | borrow2
}

/// Computes `lhs + rhs + carry`, returning the result along with the new
/// carry (0, 1, or 2).
#[inline(always)]
pub const fn ct_adc(lhs: Limb, rhs: Limb, carry: Limb) -> (Limb, Limb) {
    let a = lhs as WideLimb;
    let b = rhs as WideLimb;
    let carry = carry as WideLimb;
    let ret = a + b + carry;
    (ret as Limb, (ret >> Limb::BITS) as Limb)
}

