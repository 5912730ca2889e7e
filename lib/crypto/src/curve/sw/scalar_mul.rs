//! Scalar multiplication over short Weierstrass curves.
//!
//! Two families of routines live here:
//!
//! * Constant-time: [`mul_ct`], [`multi_mul_ct`], [`FixedBaseTable::mul_ct`].
//!   Signed-window (Booth) recoding with full-table masked gathers; the
//!   sequence of group operations depends only on the curve and the scalar
//!   width, never on scalar values.
//! * Variable-time, for public inputs only: [`mul_public`] and
//!   [`double_mul_public`] (signed sliding window). These are deliberately
//!   separate entry points; nothing falls back between the families.

use alloc::vec::Vec;

use num_traits::Zero;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::{Affine, Projective, SWCurveConfig};
use crate::{
    arithmetic::BigInteger,
    ct,
    curve::{AffineRepr, CurveGroup},
    field::{group::AdditiveGroup, prime::PrimeField, Field},
};

/// Window width of the constant-time variable-base routine.
const WINDOW: usize = 5;
/// Window width of the constant-time fixed-base routine.
const FIXED_WINDOW: usize = 7;
/// Window width of the variable-time routines.
const PUBLIC_WINDOW: usize = 5;

/// Extracts the raw Booth window `i` of width `w` from a little-endian
/// scalar encoding: bits `w*i - 1 ..= w*i + w - 1`, with bit `-1` reading
/// as zero.
fn booth_window(bytes: &[u8], i: usize, w: usize) -> u32 {
    let start = (i * w) as isize - 1;
    let mut raw = 0u32;
    for j in 0..=w {
        let bit_index = start + j as isize;
        let bit = if bit_index < 0 {
            0
        } else {
            let bit_index = bit_index as usize;
            if bit_index / 8 < bytes.len() {
                (bytes[bit_index / 8] >> (bit_index % 8)) & 1
            } else {
                0
            }
        };
        raw |= u32::from(bit) << j;
    }
    raw
}

/// Booth-recodes a raw `(w + 1)`-bit window into a sign and a magnitude in
/// `0..=2^(w-1)`, without branching on the window value.
fn booth_recode(raw: u32, w: u32) -> (Choice, u32) {
    let sign = (raw >> w) & 1;
    let neg_mask = 0u32.wrapping_sub(sign);
    // Two's complement within w + 1 bits.
    let complement = ((1u32 << (w + 1)) - 1) ^ raw;
    let d = (complement & neg_mask) | (raw & !neg_mask);
    let magnitude = (d >> 1) + (d & 1);
    (Choice::from(sign as u8), magnitude)
}

/// Number of `w`-bit Booth windows covering a scalar of the given bit
/// width.
fn window_count(scalar_bits: usize, w: usize) -> usize {
    scalar_bits / w + 1
}

/// Builds the window table `1·P, 2·P, ..., 16·P` in Jacobian form.
fn window_table<P: SWCurveConfig>(
    point: &Affine<P>,
) -> [Projective<P>; 1 << (WINDOW - 1)] {
    let mut table = [Projective::<P>::ZERO; 1 << (WINDOW - 1)];
    table[0] = (*point).into();
    for i in 1..table.len() {
        table[i] = table[i - 1] + point;
    }
    table
}

/// Straight-line Jacobian addition with masked identity handling.
///
/// Precondition: the inputs are not equal and not negatives of each other
/// unless one of them is the identity. The signed-window algorithms below
/// guarantee this for all scalars.
fn add_ct<P: SWCurveConfig>(
    a: &Projective<P>,
    b: &Projective<P>,
) -> Projective<P> {
    let z1z1 = a.z.square();
    let z2z2 = b.z.square();
    let u1 = a.x * z2z2;
    let u2 = b.x * z1z1;
    let s1 = a.y * b.z * z2z2;
    let s2 = b.y * a.z * z1z1;
    let h = u2 - u1;
    let r = s2 - s1;
    let hh = h.square();
    let hhh = h * hh;
    let v = u1 * hh;
    let x3 = r.square() - hhh - v.double();
    let y3 = r * (v - x3) - s1 * hhh;
    let z3 = a.z * b.z * h;

    let mut res = Projective::new_unchecked(x3, y3, z3);
    let a_inf = a.z.ct_eq(&P::BaseField::ZERO);
    let b_inf = b.z.ct_eq(&P::BaseField::ZERO);
    res = Projective::conditional_select(&res, a, b_inf);
    res = Projective::conditional_select(&res, b, a_inf);
    res
}

/// Straight-line mixed Jacobian + affine addition with masked identity
/// handling; same precondition as [`add_ct`].
fn add_mixed_ct<P: SWCurveConfig>(
    a: &Projective<P>,
    b: &Affine<P>,
) -> Projective<P> {
    let z1z1 = a.z.square();
    let u2 = b.x * z1z1;
    let s2 = b.y * a.z * z1z1;
    let h = u2 - a.x;
    let r = s2 - a.y;
    let hh = h.square();
    let hhh = h * hh;
    let v = a.x * hh;
    let x3 = r.square() - hhh - v.double();
    let y3 = r * (v - x3) - a.y * hhh;
    let z3 = a.z * h;

    let mut res = Projective::new_unchecked(x3, y3, z3);
    let a_inf = a.z.ct_eq(&P::BaseField::ZERO);
    let b_inf = Choice::from(u8::from(b.infinity));
    let lifted = Projective::new_unchecked(b.x, b.y, P::BaseField::ONE);
    res = Projective::conditional_select(&res, &lifted, a_inf);
    res = Projective::conditional_select(&res, a, b_inf);
    res
}

/// Computes `scalar * point` in constant time with a signed 5-bit window.
pub fn mul_ct<P: SWCurveConfig>(
    point: &Affine<P>,
    scalar: &P::ScalarField,
) -> Projective<P> {
    multi_mul_ct(&[(*point, *scalar)])
}

/// Computes `Σ scalarᵢ * pointᵢ` in constant time.
///
/// Each point gets a 16-entry Jacobian window table; every 5-bit Booth
/// digit is gathered by scanning the whole table and the digit sign is
/// applied by a masked negation of `Y`.
pub fn multi_mul_ct<P: SWCurveConfig>(
    pairs: &[(Affine<P>, P::ScalarField)],
) -> Projective<P> {
    let tables: Vec<_> = pairs.iter().map(|(p, _)| window_table(p)).collect();
    let bytes: Vec<_> = pairs
        .iter()
        .map(|(_, k)| k.into_bigint().into_bytes_le())
        .collect();

    let scalar_bits =
        <<P::ScalarField as PrimeField>::BigInt as BigInteger>::BITS;
    let windows = window_count(scalar_bits, WINDOW);

    let mut acc = Projective::<P>::ZERO;
    for w in (0..windows).rev() {
        for _ in 0..WINDOW {
            acc.double_in_place();
        }
        for (table, scalar_bytes) in tables.iter().zip(&bytes) {
            let raw = booth_window(scalar_bytes, w, WINDOW);
            let (is_neg, magnitude) = booth_recode(raw, WINDOW as u32);
            let mut entry =
                ct::lookup(table, 1, magnitude, Projective::<P>::ZERO);
            let neg_y = -entry.y;
            entry.y =
                P::BaseField::conditional_select(&entry.y, &neg_y, is_neg);
            acc = add_ct(&acc, &entry);
        }
    }
    acc
}

/// Computes `a * p + b * q` in constant time.
pub fn double_mul_ct<P: SWCurveConfig>(
    p: &Affine<P>,
    a: &P::ScalarField,
    q: &Affine<P>,
    b: &P::ScalarField,
) -> Projective<P> {
    multi_mul_ct(&[(*p, *a), (*q, *b)])
}

/// Precomputed multiples of a fixed base point for constant-time
/// fixed-base multiplication with a signed 7-bit window.
///
/// Row `j` holds the affine points `d * 2^(7j) * G` for `d` in `1..=64`,
/// so no doublings are needed during multiplication. The table is built
/// once per process under a one-shot guard by the curve instance modules.
pub struct FixedBaseTable<P: SWCurveConfig> {
    rows: Vec<Vec<Affine<P>>>,
}

impl<P: SWCurveConfig> FixedBaseTable<P> {
    /// Builds the table for `base`.
    #[must_use]
    pub fn new(base: &Affine<P>) -> Self {
        let scalar_bits =
            <<P::ScalarField as PrimeField>::BigInt as BigInteger>::BITS;
        let windows = window_count(scalar_bits, FIXED_WINDOW);
        let entries = 1 << (FIXED_WINDOW - 1);

        let mut flat: Vec<Projective<P>> =
            Vec::with_capacity(windows * entries);
        let mut row_base: Projective<P> = (*base).into();
        for _ in 0..windows {
            let mut multiple = row_base;
            for _ in 0..entries {
                flat.push(multiple);
                multiple += &row_base;
            }
            for _ in 0..FIXED_WINDOW {
                row_base.double_in_place();
            }
        }

        let affine = Projective::normalize_batch(&flat);
        let rows =
            affine.chunks(entries).map(<[Affine<P>]>::to_vec).collect();
        Self { rows }
    }

    /// Computes `scalar * G` in constant time, `G` being the table base.
    pub fn mul_ct(&self, scalar: &P::ScalarField) -> Projective<P> {
        let bytes = scalar.into_bigint().into_bytes_le();
        let mut acc = Projective::<P>::ZERO;
        for (j, row) in self.rows.iter().enumerate() {
            let raw = booth_window(&bytes, j, FIXED_WINDOW);
            let (is_neg, magnitude) = booth_recode(raw, FIXED_WINDOW as u32);
            let mut entry =
                ct::lookup(row, 1, magnitude, Affine::<P>::identity());
            let neg_y = -entry.y;
            entry.y =
                P::BaseField::conditional_select(&entry.y, &neg_y, is_neg);
            acc = add_mixed_ct(&acc, &entry);
        }
        acc
    }
}

/// Computes the width-`w` signed sliding-window (wNAF) digits of `k`,
/// least significant first. Variable time; for public scalars only.
pub(crate) fn wnaf_digits<B: BigInteger>(mut k: B, w: u32) -> Vec<i8> {
    let mut digits = Vec::with_capacity(B::BITS + 1);
    let modulus = 1u64 << w;
    let half = 1i64 << (w - 1);
    while !k.is_zero() {
        let digit: i64 = if k.is_odd() {
            let mut digit = (k.low_u64() & (modulus - 1)) as i64;
            if digit >= half {
                digit -= modulus as i64;
            }
            if digit >= 0 {
                k.sub_u64(digit as u64);
            } else {
                k.add_u64((-digit) as u64);
            }
            digit
        } else {
            0
        };
        digits.push(digit as i8);
        k >>= 1;
    }
    digits
}

/// Builds the odd multiples `1·P, 3·P, ..., 15·P` in Jacobian form.
fn odd_multiples<P: SWCurveConfig>(
    point: &Affine<P>,
) -> Vec<Projective<P>> {
    let twice: Projective<P> = point.into_group().double();
    let mut table = Vec::with_capacity(1 << (PUBLIC_WINDOW - 2));
    table.push(point.into_group());
    for i in 1..(1 << (PUBLIC_WINDOW - 2)) {
        let next = table[i - 1] + twice;
        table.push(next);
    }
    table
}

/// Computes `scalar * point` with a signed sliding window.
///
/// Variable time; for public inputs only.
pub fn mul_public<P: SWCurveConfig>(
    point: &Affine<P>,
    scalar: &P::ScalarField,
) -> Projective<P> {
    let digits = wnaf_digits(scalar.into_bigint(), PUBLIC_WINDOW as u32);
    let table = odd_multiples(point);
    let mut acc = Projective::<P>::zero();
    for &digit in digits.iter().rev() {
        acc.double_in_place();
        if digit > 0 {
            acc += &table[(digit as usize - 1) / 2];
        } else if digit < 0 {
            acc -= &table[((-digit) as usize - 1) / 2];
        }
    }
    acc
}

/// Computes `a * p + b * q` with interleaved signed sliding windows.
///
/// Variable time; for public inputs only (proof and signature
/// verification).
pub fn double_mul_public<P: SWCurveConfig>(
    p: &Affine<P>,
    a: &P::ScalarField,
    q: &Affine<P>,
    b: &P::ScalarField,
) -> Projective<P> {
    let mut digits_a = wnaf_digits(a.into_bigint(), PUBLIC_WINDOW as u32);
    let mut digits_b = wnaf_digits(b.into_bigint(), PUBLIC_WINDOW as u32);
    let len = digits_a.len().max(digits_b.len());
    digits_a.resize(len, 0);
    digits_b.resize(len, 0);

    let table_p = odd_multiples(p);
    let table_q = odd_multiples(q);

    let mut acc = Projective::<P>::zero();
    for i in (0..len).rev() {
        acc.double_in_place();
        for (digit, table) in
            [(digits_a[i], &table_p), (digits_b[i], &table_q)]
        {
            if digit > 0 {
                acc += &table[(digit as usize - 1) / 2];
            } else if digit < 0 {
                acc -= &table[((-digit) as usize - 1) / 2];
            }
        }
    }
    acc
}
