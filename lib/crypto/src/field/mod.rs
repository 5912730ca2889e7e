//! This module provides finite field traits and a generic prime field
//! element in Montgomery form.

pub mod fp;
pub mod group;
pub mod prime;

use core::ops::{Div, DivAssign};

use num_traits::One;
use subtle::{ConditionallySelectable, ConstantTimeEq};

use crate::{bits::BitIteratorBE, field::group::AdditiveGroup};

/// Defines an abstract field.
///
/// Field elements form an additive group under `+` and the non-zero ones a
/// multiplicative group under `*`. Conditional selection is part of the
/// contract so generic code can move field elements without branching on
/// secrets.
pub trait Field:
    AdditiveGroup<Scalar = Self>
    + One
    + ConditionallySelectable
    + ConstantTimeEq
    + Div<Self, Output = Self>
    + DivAssign<Self>
    + for<'a> Div<&'a Self, Output = Self>
    + for<'a> DivAssign<&'a Self>
    + core::iter::Product<Self>
    + for<'a> core::iter::Product<&'a Self>
{
    /// Multiplicative identity of the field.
    const ONE: Self;

    /// Returns `self * self`.
    #[must_use]
    fn square(&self) -> Self {
        let mut copy = *self;
        copy.square_in_place();
        copy
    }

    /// Squares `self` in place.
    fn square_in_place(&mut self) -> &mut Self;

    /// Halves `self` exactly, i.e. multiplies by the inverse of two.
    ///
    /// Required by the short Weierstrass doubling formula. Must not branch
    /// on the value.
    #[must_use]
    fn div_by_2(&self) -> Self;

    /// Computes the multiplicative inverse of `self` if `self` is nonzero.
    #[must_use]
    fn inverse(&self) -> Option<Self>;

    /// Computes a square root of `self`, if one exists.
    ///
    /// The returned root is not normalized to a particular sign.
    #[must_use]
    fn sqrt(&self) -> Option<Self>;

    /// Returns `true` when `self` is a square in the field; zero counts as
    /// a square.
    #[must_use]
    fn is_square(&self) -> bool;

    /// Inverts `self` in place if it is nonzero.
    fn inverse_in_place(&mut self) -> Option<&mut Self> {
        if let Some(inverse) = self.inverse() {
            *self = inverse;
            Some(self)
        } else {
            None
        }
    }

    /// Returns `self^exp`.
    ///
    /// The square-and-multiply schedule is driven by the bits of `exp`, so
    /// this is constant-time in `self` but not in the exponent. Exponents
    /// are public in every use inside this crate.
    #[must_use]
    fn pow(&self, exp: impl BitIteratorBE) -> Self {
        let mut res = Self::ONE;
        for bit in exp.bit_be_trimmed_iter() {
            res.square_in_place();
            if bit {
                res *= *self;
            }
        }
        res
    }
}
