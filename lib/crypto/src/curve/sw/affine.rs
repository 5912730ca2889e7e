//! Affine coordinates for a point on a short Weierstrass curve.

use alloc::{vec, vec::Vec};
use core::{
    borrow::Borrow,
    fmt::{Debug, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
};

use educe::Educe;
use num_traits::{One, Zero};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

use super::{Projective, SWCurveConfig};
use crate::{
    arithmetic::BigInteger,
    bits::BitIteratorBE,
    curve::AffineRepr,
    error::Error,
    field::{group::AdditiveGroup, prime::PrimeField, Field},
};

/// Affine coordinates for a point on an elliptic curve in short Weierstrass
/// form, over the base field `P::BaseField`.
///
/// The identity is carried as an explicit flag; its displayed coordinate
/// pair `(0, 0)` is off-curve for every supported curve and therefore
/// unambiguous.
#[derive(Educe)]
#[educe(Copy, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct Affine<P: SWCurveConfig> {
    #[doc(hidden)]
    pub x: P::BaseField,
    #[doc(hidden)]
    pub y: P::BaseField,
    #[doc(hidden)]
    pub infinity: bool,
}

impl<P: SWCurveConfig> PartialEq<Projective<P>> for Affine<P> {
    fn eq(&self, other: &Projective<P>) -> bool {
        self.into_group() == *other
    }
}

impl<P: SWCurveConfig> Display for Affine<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.infinity {
            true => write!(f, "infinity"),
            false => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

impl<P: SWCurveConfig> Debug for Affine<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.infinity {
            true => write!(f, "infinity"),
            false => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

impl<P: SWCurveConfig> Affine<P> {
    /// Constructs a group element from x and y coordinates.
    /// Performs checks to ensure that the point is on the curve and is in the
    /// right subgroup.
    ///
    /// # Panics
    ///
    /// Panics if the point is not on the curve or not in the prime-order
    /// subgroup.
    pub fn new(x: P::BaseField, y: P::BaseField) -> Self {
        let point = Self { x, y, infinity: false };
        assert!(point.is_on_curve());
        assert!(point.is_in_correct_subgroup_assuming_on_curve());
        point
    }

    /// Constructs a group element from x and y coordinates.
    ///
    /// # Warning
    ///
    /// Does *not* perform any checks to ensure the point is on the curve or
    /// is in the right subgroup.
    pub const fn new_unchecked(x: P::BaseField, y: P::BaseField) -> Self {
        Self { x, y, infinity: false }
    }

    /// Returns the point at infinity.
    pub const fn identity() -> Self {
        Self { x: P::BaseField::ZERO, y: P::BaseField::ZERO, infinity: true }
    }

    /// Checks if `self` is a valid point on the curve.
    pub fn is_on_curve(&self) -> bool {
        if self.infinity {
            return true;
        }
        // Rust does not optimise away addition with zero
        let mut x3b = P::add_b(self.x.square() * self.x);
        if !P::COEFF_A.is_zero() {
            x3b += P::mul_by_a(self.x);
        };
        self.y.square() == x3b
    }

    /// Checks if `self` is in the subgroup having order equaling that of
    /// `P::ScalarField`.
    pub fn is_in_correct_subgroup_assuming_on_curve(&self) -> bool {
        P::is_in_correct_subgroup_assuming_on_curve(self)
    }
}

impl<P: SWCurveConfig> Affine<P>
where
    P::BaseField: PrimeField,
{
    /// The length in bytes of one fixed-width big-endian coordinate.
    #[must_use]
    pub fn coordinate_len() -> usize {
        (<P::BaseField as PrimeField>::MODULUS_BIT_SIZE + 7) / 8
    }

    /// Serializes the point in SEC1 uncompressed form,
    /// `0x04 ‖ X ‖ Y` with fixed-width big-endian coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointAtInfinity`] for the group identity, which has
    /// no affine coordinates.
    pub fn to_uncompressed_bytes(&self) -> Result<Vec<u8>, Error> {
        if self.infinity {
            return Err(Error::PointAtInfinity);
        }
        let len = Self::coordinate_len();
        let mut out = Vec::with_capacity(1 + 2 * len);
        out.push(0x04);
        out.extend_from_slice(&encode_coordinate(self.x, len));
        out.extend_from_slice(&encode_coordinate(self.y, len));
        Ok(out)
    }

    /// Parses a point from SEC1 uncompressed form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] on a malformed frame or a
    /// non-canonical coordinate, and [`Error::NotOnCurve`] when the decoded
    /// coordinates do not satisfy the curve equation.
    pub fn from_uncompressed_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let len = Self::coordinate_len();
        if bytes.len() != 1 + 2 * len || bytes[0] != 0x04 {
            return Err(Error::InvalidEncoding);
        }
        let x = decode_coordinate::<P::BaseField>(&bytes[1..1 + len])?;
        let y = decode_coordinate::<P::BaseField>(&bytes[1 + len..])?;
        let point = Self { x, y, infinity: false };
        if !point.is_on_curve() {
            return Err(Error::NotOnCurve);
        }
        if !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(Error::NotOnCurve);
        }
        Ok(point)
    }
}

/// Serializes a field element as a fixed-width big-endian coordinate.
pub(crate) fn encode_coordinate<F: PrimeField>(
    coordinate: F,
    len: usize,
) -> Vec<u8> {
    let mut le = coordinate.into_bigint().into_bytes_le();
    le.truncate(len);
    le.reverse();
    le
}

/// Parses a fixed-width big-endian coordinate, rejecting non-canonical
/// values.
pub(crate) fn decode_coordinate<F: PrimeField>(
    bytes: &[u8],
) -> Result<F, Error> {
    let mut le = vec![0u8; F::BigInt::BYTES];
    if bytes.len() > le.len() {
        return Err(Error::InvalidEncoding);
    }
    for (dst, src) in le.iter_mut().zip(bytes.iter().rev()) {
        *dst = *src;
    }
    let repr = F::BigInt::from_bytes_le(&le);
    if repr >= F::MODULUS {
        return Err(Error::InvalidEncoding);
    }
    Ok(F::from_bigint(repr))
}

impl<P: SWCurveConfig> Zeroize for Affine<P> {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
        self.infinity.zeroize();
    }
}

impl<P: SWCurveConfig> ConstantTimeEq for Affine<P> {
    fn ct_eq(&self, other: &Self) -> Choice {
        let infinity_eq = Choice::from(u8::from(self.infinity == other.infinity));
        let both_infinity = Choice::from(u8::from(self.infinity & other.infinity));
        let coords_eq = self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y);
        infinity_eq & (both_infinity | coords_eq)
    }
}

impl<P: SWCurveConfig> ConditionallySelectable for Affine<P> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: P::BaseField::conditional_select(&a.x, &b.x, choice),
            y: P::BaseField::conditional_select(&a.y, &b.y, choice),
            infinity: bool::from(Choice::conditional_select(
                &Choice::from(u8::from(a.infinity)),
                &Choice::from(u8::from(b.infinity)),
                choice,
            )),
        }
    }
}

impl<P: SWCurveConfig> AffineRepr for Affine<P> {
    type BaseField = P::BaseField;
    type Config = P;
    type Group = Projective<P>;
    type ScalarField = P::ScalarField;

    fn xy(&self) -> Option<(Self::BaseField, Self::BaseField)> {
        (!self.infinity).then_some((self.x, self.y))
    }

    #[inline]
    fn generator() -> Self {
        P::GENERATOR
    }

    fn zero() -> Self {
        Self::identity()
    }

    fn mul_bigint(&self, by: impl BitIteratorBE) -> Self::Group {
        P::mul_affine(self, by)
    }

    /// Multiplies this element by the cofactor and output the
    /// resulting projective element.
    #[must_use]
    fn mul_by_cofactor_to_group(&self) -> Self::Group {
        P::mul_affine(self, Self::Config::COFACTOR)
    }

    /// Performs cofactor clearing.
    /// The default method is simply to multiply by the cofactor.
    /// Some curves can implement a more efficient algorithm.
    fn clear_cofactor(&self) -> Self {
        P::clear_cofactor(self)
    }
}

impl<P: SWCurveConfig> Neg for Affine<P> {
    type Output = Self;

    /// If `self.is_zero()`, returns `self` (`== Self::zero()`).
    /// Else, returns `(x, -y)`, where `self = (x, y)`.
    #[inline]
    fn neg(mut self) -> Self {
        self.y.neg_in_place();
        self
    }
}

impl<P: SWCurveConfig, T: Borrow<Self>> Add<T> for Affine<P> {
    type Output = Projective<P>;

    fn add(self, other: T) -> Projective<P> {
        let mut copy = self.into_group();
        copy += other.borrow();
        copy
    }
}

impl<P: SWCurveConfig> Add<Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn add(self, other: Projective<P>) -> Projective<P> {
        other + self
    }
}

impl<'a, P: SWCurveConfig> Add<&'a Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn add(self, other: &'a Projective<P>) -> Projective<P> {
        *other + self
    }
}

impl<P: SWCurveConfig, T: Borrow<Self>> Sub<T> for Affine<P> {
    type Output = Projective<P>;

    fn sub(self, other: T) -> Projective<P> {
        let mut copy = self.into_group();
        copy -= other.borrow();
        copy
    }
}

impl<P: SWCurveConfig> Sub<Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn sub(self, other: Projective<P>) -> Projective<P> {
        self + (-other)
    }
}

impl<'a, P: SWCurveConfig> Sub<&'a Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn sub(self, other: &'a Projective<P>) -> Projective<P> {
        self + (-*other)
    }
}

impl<P: SWCurveConfig> Default for Affine<P> {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl<P: SWCurveConfig, T: Borrow<P::ScalarField>> Mul<T> for Affine<P> {
    type Output = Projective<P>;

    #[inline]
    fn mul(self, other: T) -> Self::Output {
        self.mul_bigint(other.borrow().into_bigint())
    }
}

// The projective point X, Y, Z is represented in the affine
// coordinates as X/Z^2, Y/Z^3.
impl<P: SWCurveConfig> From<Projective<P>> for Affine<P> {
    #[inline]
    fn from(p: Projective<P>) -> Affine<P> {
        if p.is_zero() {
            Affine::identity()
        } else if p.z.is_one() {
            // If Z is one, the point is already normalized.
            Affine::new_unchecked(p.x, p.y)
        } else {
            // Z is nonzero, so it must have an inverse in a field.
            let zinv = p.z.inverse().expect("non-zero Z is invertible");
            let zinv_squared = zinv.square();

            // X/Z^2
            let x = p.x * zinv_squared;

            // Y/Z^3
            let y = p.y * zinv_squared * zinv;

            Affine::new_unchecked(x, y)
        }
    }
}
