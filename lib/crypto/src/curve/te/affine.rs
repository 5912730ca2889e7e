//! Affine coordinates for a point on a twisted Edwards curve.

use alloc::vec::Vec;
use core::{
    borrow::Borrow,
    fmt::{Debug, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
};

use educe::Educe;
use num_traits::{One, Zero};
use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

use super::{Projective, TECurveConfig};
use crate::{
    arithmetic::BigInteger,
    bits::BitIteratorBE,
    curve::AffineRepr,
    error::Error,
    field::{group::AdditiveGroup, prime::PrimeField, Field},
};

/// Affine coordinates for a point on a twisted Edwards curve, over the
/// base field `P::BaseField`.
#[derive(Educe)]
#[educe(Copy, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct Affine<P: TECurveConfig> {
    /// X coordinate of the point represented as a field element.
    pub x: P::BaseField,
    /// Y coordinate of the point represented as a field element.
    pub y: P::BaseField,
}

impl<P: TECurveConfig> Display for Affine<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.is_zero() {
            true => write!(f, "infinity"),
            false => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

impl<P: TECurveConfig> Debug for Affine<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.is_zero() {
            true => write!(f, "infinity"),
            false => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

impl<P: TECurveConfig> PartialEq<Projective<P>> for Affine<P> {
    fn eq(&self, other: &Projective<P>) -> bool {
        self.into_group() == *other
    }
}

impl<P: TECurveConfig> Affine<P> {
    /// Construct a new group element without checking whether the
    /// coordinates specify a point in the subgroup.
    pub const fn new_unchecked(x: P::BaseField, y: P::BaseField) -> Self {
        Self { x, y }
    }

    /// Construct a new group element, enforcing that the point is on the
    /// curve and in the prime-order subgroup.
    ///
    /// # Panics
    ///
    /// Panics if the point is not on the curve or not in the prime-order
    /// subgroup.
    pub fn new(x: P::BaseField, y: P::BaseField) -> Self {
        let p = Self::new_unchecked(x, y);
        assert!(p.is_on_curve());
        assert!(p.is_in_prime_order_subgroup());
        p
    }

    /// Construct the identity of the group.
    pub const fn zero() -> Self {
        Self::new_unchecked(P::BaseField::ZERO, P::BaseField::ONE)
    }

    /// Is this point the identity?
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_one()
    }

    /// Checks that the current point is on the elliptic curve.
    pub fn is_on_curve(&self) -> bool {
        let x2 = self.x.square();
        let y2 = self.y.square();

        let lhs = y2 + P::mul_by_a(x2);
        let rhs = P::BaseField::one() + (P::COEFF_D * x2 * y2);

        lhs == rhs
    }

    /// Checks if `self` is in the subgroup having order equaling that of
    /// `P::ScalarField` given it is on the curve.
    pub fn is_in_prime_order_subgroup(&self) -> bool {
        P::is_in_prime_order_subgroup(self)
    }
}

impl<P: TECurveConfig> Affine<P>
where
    P::BaseField: PrimeField,
{
    /// Serializes the point in compressed form: the `y` coordinate in
    /// little-endian with the sign of `x` in the most significant bit of
    /// the last byte.
    #[must_use]
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        let mut bytes = self.y.into_bigint().into_bytes_le();
        let is_odd = self.x.into_bigint().is_odd();
        let last = bytes.last_mut().expect("coordinate is non-empty");
        *last ^= u8::from(is_odd) << 7;
        bytes
    }

    /// Parses a point from compressed form, rejecting non-canonical `y`
    /// encodings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] on a malformed frame, a
    /// non-canonical `y`, or an `x = 0` point with the sign bit set, and
    /// [`Error::NotOnCurve`] when no curve point has the encoded `y`.
    pub fn from_compressed_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let byte_len =
            <<P::BaseField as PrimeField>::BigInt as BigInteger>::BYTES;
        if bytes.len() != byte_len {
            return Err(Error::InvalidEncoding);
        }

        let mut y_bytes: Vec<u8> = bytes.to_vec();
        let sign = y_bytes[byte_len - 1] >> 7 == 1;
        y_bytes[byte_len - 1] &= 0x7f;

        let y_repr =
            <<P::BaseField as PrimeField>::BigInt as BigInteger>::from_bytes_le(
                &y_bytes,
            );
        if y_repr >= <P::BaseField as PrimeField>::MODULUS {
            return Err(Error::InvalidEncoding);
        }
        let y = P::BaseField::from_bigint(y_repr);

        // a x² + y² = 1 + d x² y²  =>  x² = (y² - 1) / (d y² - a)
        let y2 = y.square();
        let numerator = y2 - P::BaseField::one();
        let denominator = P::COEFF_D * y2 - P::COEFF_A;
        let x2 = numerator
            * denominator.inverse().ok_or(Error::NotOnCurve)?;
        let mut x = x2.sqrt().ok_or(Error::NotOnCurve)?;

        if x.is_zero() && sign {
            return Err(Error::InvalidEncoding);
        }
        if x.into_bigint().is_odd() != sign {
            x = -x;
        }

        Ok(Self::new_unchecked(x, y))
    }
}

impl<P: TECurveConfig> AffineRepr for Affine<P> {
    type BaseField = P::BaseField;
    type Config = P;
    type Group = Projective<P>;
    type ScalarField = P::ScalarField;

    fn xy(&self) -> Option<(Self::BaseField, Self::BaseField)> {
        (!self.is_zero()).then_some((self.x, self.y))
    }

    fn generator() -> Self {
        P::GENERATOR
    }

    fn zero() -> Self {
        Self::new_unchecked(P::BaseField::ZERO, P::BaseField::ONE)
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

impl<P: TECurveConfig> ConditionallySelectable for Affine<P> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: P::BaseField::conditional_select(&a.x, &b.x, choice),
            y: P::BaseField::conditional_select(&a.y, &b.y, choice),
        }
    }
}

impl<P: TECurveConfig> Zeroize for Affine<P> {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
    }
}

impl<P: TECurveConfig> Neg for Affine<P> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new_unchecked(-self.x, self.y)
    }
}

impl<P: TECurveConfig, T: Borrow<Self>> Add<T> for Affine<P> {
    type Output = Projective<P>;

    fn add(self, other: T) -> Self::Output {
        let mut copy = self.into_group();
        copy += other.borrow();
        copy
    }
}

impl<P: TECurveConfig> Add<Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn add(self, other: Projective<P>) -> Projective<P> {
        other + self
    }
}

impl<'a, P: TECurveConfig> Add<&'a Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn add(self, other: &'a Projective<P>) -> Projective<P> {
        *other + self
    }
}

impl<P: TECurveConfig, T: Borrow<Self>> Sub<T> for Affine<P> {
    type Output = Projective<P>;

    fn sub(self, other: T) -> Self::Output {
        let mut copy = self.into_group();
        copy -= other.borrow();
        copy
    }
}

impl<P: TECurveConfig> Sub<Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn sub(self, other: Projective<P>) -> Projective<P> {
        self + (-other)
    }
}

impl<'a, P: TECurveConfig> Sub<&'a Projective<P>> for Affine<P> {
    type Output = Projective<P>;

    fn sub(self, other: &'a Projective<P>) -> Projective<P> {
        self + (-*other)
    }
}

impl<P: TECurveConfig> Default for Affine<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<P: TECurveConfig, T: Borrow<P::ScalarField>> Mul<T> for Affine<P> {
    type Output = Projective<P>;

    #[inline]
    fn mul(self, other: T) -> Self::Output {
        self.mul_bigint(other.borrow().into_bigint())
    }
}

// The projective point X, Y, T, Z is represented in the affine
// coordinates as X/Z, Y/Z.
impl<P: TECurveConfig> From<Projective<P>> for Affine<P> {
    fn from(p: Projective<P>) -> Affine<P> {
        if p.is_zero() {
            Affine::zero()
        } else if p.z.is_one() {
            // If Z is one, the point is already normalized.
            Affine::new_unchecked(p.x, p.y)
        } else {
            // Z is nonzero, so it must have an inverse in a field.
            let z_inv = p.z.inverse().expect("non-zero Z is invertible");
            let x = p.x * z_inv;
            let y = p.y * z_inv;
            Affine::new_unchecked(x, y)
        }
    }
}
