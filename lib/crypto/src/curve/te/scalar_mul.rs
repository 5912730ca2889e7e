//! Scalar multiplication over twisted Edwards curves with `a = -1`.
//!
//! The constant-time routines use the duplicated-coordinate point forms of
//! the extended coordinate system: a *precomputed* point `(y+x, y-x, 2dxy)`
//! for table entries with `Z = 1`, and a *cached* point
//! `(Y+X, Y-X, Z, 2dT)` for runtime multiples. Every table access scans
//! all entries and selects by mask; digit signs are applied by swapping the
//! duplicated coordinates under a mask. The unified addition law is
//! complete, so no identity patching is needed anywhere.
//!
//! The variable-time double-scalar routine ([`double_mul_public`]) is for
//! public inputs only (signature verification).

use alloc::vec::Vec;

use num_traits::One;
use subtle::{Choice, ConditionallySelectable};

use super::{Affine, Projective, TECurveConfig};
use crate::{
    arithmetic::BigInteger,
    ct,
    curve::{sw::scalar_mul::wnaf_digits, AffineRepr, CurveGroup},
    field::{group::AdditiveGroup, prime::PrimeField, Field},
};

/// A precomputed point `(y+x, y-x, 2dxy)` with implicit `Z = 1`.
#[derive(educe::Educe)]
#[educe(Clone, Copy)]
pub struct Precomp<P: TECurveConfig> {
    y_plus_x: P::BaseField,
    y_minus_x: P::BaseField,
    xy2d: P::BaseField,
}

impl<P: TECurveConfig> Precomp<P> {
    /// The identity in precomputed form: `y + x = y - x = 1`, `2dxy = 0`.
    fn identity() -> Self {
        Self {
            y_plus_x: P::BaseField::one(),
            y_minus_x: P::BaseField::one(),
            xy2d: P::BaseField::ZERO,
        }
    }

    fn from_affine(point: &Affine<P>) -> Self {
        Self {
            y_plus_x: point.y + point.x,
            y_minus_x: point.y - point.x,
            xy2d: point.x * point.y * P::COEFF_D.double(),
        }
    }

    /// Negates the point by swapping the duplicated coordinates under the
    /// mask.
    fn conditional_negate(&self, negative: Choice) -> Self {
        let negated = Self {
            y_plus_x: self.y_minus_x,
            y_minus_x: self.y_plus_x,
            xy2d: -self.xy2d,
        };
        Self::conditional_select(self, &negated, negative)
    }
}

impl<P: TECurveConfig> ConditionallySelectable for Precomp<P> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            y_plus_x: P::BaseField::conditional_select(
                &a.y_plus_x,
                &b.y_plus_x,
                choice,
            ),
            y_minus_x: P::BaseField::conditional_select(
                &a.y_minus_x,
                &b.y_minus_x,
                choice,
            ),
            xy2d: P::BaseField::conditional_select(&a.xy2d, &b.xy2d, choice),
        }
    }
}

/// A cached point `(Y+X, Y-X, Z, 2dT)` for repeated additions of the same
/// multiple.
#[derive(educe::Educe)]
#[educe(Clone, Copy)]
pub struct Cached<P: TECurveConfig> {
    y_plus_x: P::BaseField,
    y_minus_x: P::BaseField,
    z: P::BaseField,
    t2d: P::BaseField,
}

impl<P: TECurveConfig> Cached<P> {
    fn from_projective(point: &Projective<P>) -> Self {
        Self {
            y_plus_x: point.y + point.x,
            y_minus_x: point.y - point.x,
            z: point.z,
            t2d: point.t * P::COEFF_D.double(),
        }
    }

    fn negate(&self) -> Self {
        Self {
            y_plus_x: self.y_minus_x,
            y_minus_x: self.y_plus_x,
            z: self.z,
            t2d: -self.t2d,
        }
    }
}

impl<P: TECurveConfig> ConditionallySelectable for Cached<P> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            y_plus_x: P::BaseField::conditional_select(
                &a.y_plus_x,
                &b.y_plus_x,
                choice,
            ),
            y_minus_x: P::BaseField::conditional_select(
                &a.y_minus_x,
                &b.y_minus_x,
                choice,
            ),
            z: P::BaseField::conditional_select(&a.z, &b.z, choice),
            t2d: P::BaseField::conditional_select(&a.t2d, &b.t2d, choice),
        }
    }
}

/// Unified mixed addition of a precomputed point (`Z2 = 1`).
fn add_precomp<P: TECurveConfig>(
    p: &Projective<P>,
    q: &Precomp<P>,
) -> Projective<P> {
    let a = (p.y + p.x) * q.y_plus_x;
    let b = (p.y - p.x) * q.y_minus_x;
    let c = q.xy2d * p.t;
    let d = p.z.double();
    let e = a - b;
    let f = d - c;
    let g = d + c;
    let h = a + b;
    Projective::new_unchecked(e * f, g * h, e * h, f * g)
}

/// Unified addition of a cached point.
fn add_cached<P: TECurveConfig>(
    p: &Projective<P>,
    q: &Cached<P>,
) -> Projective<P> {
    let a = (p.y + p.x) * q.y_plus_x;
    let b = (p.y - p.x) * q.y_minus_x;
    let c = q.t2d * p.t;
    let zz = p.z * q.z;
    let d = zz.double();
    let e = a - b;
    let f = d - c;
    let g = d + c;
    let h = a + b;
    Projective::new_unchecked(e * f, g * h, e * h, f * g)
}

/// Splits a little-endian scalar encoding into signed radix-16 digits in
/// `[-8, 8]`, two digits per byte, least significant first.
fn signed_radix16(bytes: &[u8]) -> Vec<i8> {
    let mut digits = Vec::with_capacity(bytes.len() * 2);
    for byte in bytes {
        digits.push((byte & 15) as i8);
        digits.push((byte >> 4) as i8);
    }

    // Carry excess above 8 into the next digit.
    let mut carry = 0i8;
    let last = digits.len() - 1;
    for digit in &mut digits[..last] {
        let v = *digit + carry;
        carry = (v + 8) >> 4;
        *digit = v - (carry << 4);
    }
    digits[last] += carry;
    digits
}

/// Constant-time scan of a table row by digit magnitude, with masked sign
/// application. Digit zero selects the identity.
fn table_select<P: TECurveConfig>(
    row: &[Precomp<P>],
    digit: i8,
) -> Precomp<P> {
    let negative = Choice::from((digit as u8) >> 7);
    // |digit| without branching: (d ^ (d >> 7)) - (d >> 7).
    let m = digit >> 7;
    let magnitude = ((digit ^ m) - m) as u8;
    let entry = ct::lookup(row, 1, u32::from(magnitude), Precomp::identity());
    entry.conditional_negate(negative)
}

/// Precomputed multiples of a fixed base point for constant-time
/// fixed-base multiplication with signed radix-16 digits.
///
/// Row `j` holds `d * 256^j * B` for `d` in `1..=8`, in precomputed form.
/// Built once per process under a one-shot guard by the curve instance
/// modules.
pub struct BasepointTable<P: TECurveConfig> {
    rows: Vec<[Precomp<P>; 8]>,
}

impl<P: TECurveConfig> BasepointTable<P> {
    /// Builds the table for `base`.
    #[must_use]
    pub fn new(base: &Affine<P>) -> Self {
        debug_assert!(
            P::COEFF_A == -P::BaseField::one(),
            "duplicated-coordinate forms assume a = -1",
        );

        let scalar_bytes =
            <<P::ScalarField as PrimeField>::BigInt as BigInteger>::BYTES;

        let mut flat: Vec<Projective<P>> =
            Vec::with_capacity(scalar_bytes * 8);
        let mut row_base: Projective<P> = base.into_group();
        for _ in 0..scalar_bytes {
            let mut multiple = row_base;
            for _ in 0..8 {
                flat.push(multiple);
                multiple += &row_base;
            }
            for _ in 0..8 {
                row_base.double_in_place();
            }
        }

        let affine = Projective::normalize_batch(&flat);
        let rows = affine
            .chunks(8)
            .map(|chunk| {
                let mut row = [Precomp::identity(); 8];
                for (dst, src) in row.iter_mut().zip(chunk) {
                    *dst = Precomp::from_affine(src);
                }
                row
            })
            .collect();
        Self { rows }
    }

    /// Computes `scalar * B` in constant time, `B` being the table base.
    ///
    /// Processes the odd radix-16 digit positions, multiplies the
    /// accumulator by 16 with four doublings, then processes the even
    /// positions.
    pub fn mul_ct(&self, scalar: &P::ScalarField) -> Projective<P> {
        let bytes = scalar.into_bigint().into_bytes_le();
        let digits = signed_radix16(&bytes);

        let mut h = Projective::<P>::ZERO;
        for i in (1..digits.len()).step_by(2) {
            let entry = table_select(&self.rows[i / 2], digits[i]);
            h = add_precomp(&h, &entry);
        }

        for _ in 0..4 {
            h.double_in_place();
        }

        for i in (0..digits.len()).step_by(2) {
            let entry = table_select(&self.rows[i / 2], digits[i]);
            h = add_precomp(&h, &entry);
        }
        h
    }
}

/// Computes `scalar * point` in constant time.
///
/// Caches the multiples `0 * A, 1 * A, ..., 15 * A` and processes the
/// scalar one unsigned nibble at a time, most significant first, with four
/// doublings between nibbles and a full-table masked gather per nibble.
pub fn mul_ct<P: TECurveConfig>(
    point: &Projective<P>,
    scalar: &P::ScalarField,
) -> Projective<P> {
    debug_assert!(
        P::COEFF_A == -P::BaseField::one(),
        "duplicated-coordinate forms assume a = -1",
    );

    let mut multiples = [Projective::<P>::ZERO; 16];
    for i in 1..16 {
        multiples[i] = multiples[i - 1] + point;
    }
    let cached: Vec<Cached<P>> =
        multiples.iter().map(Cached::from_projective).collect();

    let bytes = scalar.into_bigint().into_bytes_le();
    let mut acc = Projective::<P>::ZERO;
    for byte in bytes.iter().rev() {
        for nibble in [byte >> 4, byte & 15] {
            for _ in 0..4 {
                acc.double_in_place();
            }
            let entry = ct::lookup(
                &cached,
                0,
                u32::from(nibble),
                Cached::from_projective(&Projective::<P>::ZERO),
            );
            acc = add_cached(&acc, &entry);
        }
    }
    acc
}

/// Computes `a * A + b * B` with signed sliding windows.
///
/// Variable time; for public inputs only (signature verification).
pub fn double_mul_public<P: TECurveConfig>(
    a: &P::ScalarField,
    point_a: &Projective<P>,
    b: &P::ScalarField,
    point_b: &Projective<P>,
) -> Projective<P> {
    let mut digits_a = wnaf_digits(a.into_bigint(), 5);
    let mut digits_b = wnaf_digits(b.into_bigint(), 5);
    let len = digits_a.len().max(digits_b.len());
    digits_a.resize(len, 0);
    digits_b.resize(len, 0);

    let table_a = odd_multiples(point_a);
    let table_b = odd_multiples(point_b);

    let mut acc = Projective::<P>::ZERO;
    for i in (0..len).rev() {
        acc.double_in_place();
        for (digit, table) in
            [(digits_a[i], &table_a), (digits_b[i], &table_b)]
        {
            if digit > 0 {
                acc = add_cached(&acc, &table[(digit as usize - 1) / 2]);
            } else if digit < 0 {
                acc = add_cached(
                    &acc,
                    &table[((-digit) as usize - 1) / 2].negate(),
                );
            }
        }
    }
    acc
}

/// Builds the odd multiples `1·P, 3·P, ..., 15·P` in cached form.
fn odd_multiples<P: TECurveConfig>(point: &Projective<P>) -> Vec<Cached<P>> {
    let twice = point.double();
    let mut multiples = Vec::with_capacity(8);
    multiples.push(*point);
    for i in 1..8 {
        let next = multiples[i - 1] + twice;
        multiples.push(next);
    }
    multiples.iter().map(Cached::from_projective).collect()
}
