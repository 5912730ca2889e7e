//! Jacobian coordinates for a point on a short Weierstrass curve.
//!
//! A point `(X, Y, Z)` corresponds to the affine point
//! `(X / Z², Y / Z³)`; the group identity is encoded as `Z = 0`.

use alloc::vec::Vec;
use core::{
    borrow::Borrow,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use educe::Educe;
use num_traits::{One, Zero};
use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

use super::{Affine, SWCurveConfig};
use crate::{
    bits::BitIteratorBE,
    curve::{batch_inversion, AffineRepr, CurveGroup, PrimeGroup},
    field::{group::AdditiveGroup, prime::PrimeField, Field},
    impl_additive_ops_from_ref,
};

/// Jacobian coordinates for a point on an elliptic curve in short
/// Weierstrass form, over the base field `P::BaseField`.
#[derive(Educe)]
#[educe(Copy, Clone, Eq(bound(P: SWCurveConfig)), Debug)]
#[must_use]
pub struct Projective<P: SWCurveConfig> {
    /// The x-coordinate of the point in Jacobian coordinates.
    pub x: P::BaseField,
    /// The y-coordinate of the point in Jacobian coordinates.
    pub y: P::BaseField,
    /// The z-coordinate of the point in Jacobian coordinates.
    pub z: P::BaseField,
}

impl<P: SWCurveConfig> PartialEq<Affine<P>> for Projective<P> {
    fn eq(&self, other: &Affine<P>) -> bool {
        self == &other.into_group()
    }
}

impl<P: SWCurveConfig> Display for Projective<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", Affine::from(*self))
    }
}

impl<P: SWCurveConfig> PartialEq for Projective<P> {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() {
            return other.is_zero();
        }

        if other.is_zero() {
            return false;
        }

        // x1/z1² == x2/z2² <==> x1 * z2² == x2 * z1².
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();

        (self.x * z2z2) == (other.x * z1z1)
            && (self.y * z2z2 * other.z) == (other.y * z1z1 * self.z)
    }
}

impl<P: SWCurveConfig> Hash for Projective<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.into_affine().hash(state);
    }
}

impl<P: SWCurveConfig> Default for Projective<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<P: SWCurveConfig> Projective<P> {
    /// Construct a new group element without checking whether the
    /// coordinates specify a point in the subgroup.
    pub const fn new_unchecked(
        x: P::BaseField,
        y: P::BaseField,
        z: P::BaseField,
    ) -> Self {
        Self { x, y, z }
    }

    /// Construct a new group element, checking that the normalized point is
    /// on the curve and in the prime-order subgroup.
    ///
    /// # Panics
    ///
    /// * If the point is not on the curve.
    /// * If the point is not in the prime-order subgroup.
    pub fn new(x: P::BaseField, y: P::BaseField, z: P::BaseField) -> Self {
        let p = Self::new_unchecked(x, y, z).into_affine();
        assert!(p.is_on_curve());
        assert!(p.is_in_correct_subgroup_assuming_on_curve());
        p.into()
    }
}

impl<P: SWCurveConfig> Zeroize for Projective<P> {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
        self.z.zeroize();
    }
}

impl<P: SWCurveConfig> Zero for Projective<P> {
    fn zero() -> Self {
        Projective::<P>::ZERO
    }

    fn is_zero(&self) -> bool {
        self.z.is_zero()
    }
}

impl<P: SWCurveConfig> ConditionallySelectable for Projective<P> {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: P::BaseField::conditional_select(&a.x, &b.x, choice),
            y: P::BaseField::conditional_select(&a.y, &b.y, choice),
            z: P::BaseField::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl<P: SWCurveConfig> AdditiveGroup for Projective<P> {
    type Scalar = P::ScalarField;

    const ZERO: Self = Self::new_unchecked(
        P::BaseField::ONE,
        P::BaseField::ONE,
        P::BaseField::ZERO,
    );

    /// Doubles this point in place.
    ///
    /// For `a = -3` uses the halved-M variant of the standard Jacobian
    /// doubling: `M = 3 (X - Z²)(X + Z²) / 2`, `S = X Y²`,
    /// `X' = M² - 2S`, `Y' = M (S - X') - Y⁴`, `Z' = Y Z`. Otherwise falls
    /// back to the generic `dbl-2007-bl` formula.
    ///
    /// Both formulas are straight-line and keep `Z = 0` for the identity.
    fn double_in_place(&mut self) -> &mut Self {
        if P::COEFF_A_IS_MINUS_THREE {
            let zz = self.z.square();
            let gamma = self.y.square();
            // M = 3 (X - Z²)(X + Z²) / 2
            let t = (self.x - zz) * (self.x + zz);
            let m = (t + t.double()).div_by_2();
            // S = X * Y²
            let s = self.x * gamma;
            // X3 = M² - 2S
            let x3 = m.square() - s.double();
            // Y3 = M (S - X3) - Y⁴
            let y3 = m * (s - x3) - gamma.square();
            // Z3 = Y * Z
            let z3 = self.y * self.z;
            self.x = x3;
            self.y = y3;
            self.z = z3;
        } else {
            // dbl-2007-bl
            let xx = self.x.square();
            let yy = self.y.square();
            let yyyy = yy.square();
            let zz = self.z.square();
            // S = 2 ((X + YY)² - XX - YYYY)
            let s = ((self.x + yy).square() - xx - yyyy).double();
            // M = 3 XX + a ZZ²
            let m = xx + xx.double() + P::mul_by_a(zz.square());
            // X3 = M² - 2S
            let x3 = m.square() - s.double();
            // Y3 = M (S - X3) - 8 YYYY
            let y3 = m * (s - x3) - yyyy.double().double().double();
            // Z3 = (Y + Z)² - YY - ZZ
            let z3 = (self.y + self.z).square() - yy - zz;
            self.x = x3;
            self.y = y3;
            self.z = z3;
        }
        self
    }
}

impl<P: SWCurveConfig> PrimeGroup for Projective<P> {
    type ScalarField = P::ScalarField;

    fn generator() -> Self {
        Affine::generator().into()
    }

    #[inline]
    fn mul_bigint(&self, other: impl BitIteratorBE) -> Self {
        P::mul_projective(self, other)
    }
}

impl<P: SWCurveConfig> CurveGroup for Projective<P> {
    type Affine = Affine<P>;
    type BaseField = P::BaseField;
    type Config = P;

    // A Jacobian element (x, y, z) is normalized to its affine
    // representation by the conversion (x, y, z) -> (x / z², y / z³).
    // Batch normalizing N elements costs one inversion plus a few
    // multiplications per element.
    fn normalize_batch(v: &[Self]) -> Vec<Self::Affine> {
        let mut z_s = v.iter().map(|g| g.z).collect::<Vec<_>>();

        batch_inversion(&mut z_s);

        v.iter()
            .zip(z_s)
            .map(|(g, z_inv)| {
                if g.is_zero() {
                    Affine::identity()
                } else {
                    let z_inv_squared = z_inv.square();
                    let x = g.x * z_inv_squared;
                    let y = g.y * z_inv_squared * z_inv;
                    Affine::new_unchecked(x, y)
                }
            })
            .collect()
    }
}

impl<P: SWCurveConfig> Neg for Projective<P> {
    type Output = Self;

    fn neg(mut self) -> Self {
        self.y = -self.y;
        self
    }
}

impl<P: SWCurveConfig, T: Borrow<Affine<P>>> AddAssign<T> for Projective<P> {
    /// Mixed Jacobian + affine addition.
    ///
    /// Dispatches on the exceptional cases (`P1 = ±P2`, either input the
    /// identity) by comparing coordinates, so it is variable-time and must
    /// only see public inputs. The constant-time scalar multiplication
    /// routines use the masked addition in
    /// [`scalar_mul`](super::scalar_mul) instead.
    fn add_assign(&mut self, other: T) {
        let other = other.borrow();
        if other.infinity {
            return;
        }
        if self.is_zero() {
            self.x = other.x;
            self.y = other.y;
            self.z = P::BaseField::one();
            return;
        }

        let z1z1 = self.z.square();
        // U2 = X2 * Z1²
        let u2 = other.x * z1z1;
        // S2 = Y2 * Z1³
        let s2 = other.y * self.z * z1z1;

        if self.x == u2 {
            if self.y == s2 {
                // P1 = P2; dispatch to doubling.
                self.double_in_place();
            } else {
                // P1 = -P2.
                *self = Self::zero();
            }
            return;
        }

        // H = U2 - X1
        let h = u2 - self.x;
        // R = S2 - Y1
        let r = s2 - self.y;
        let hh = h.square();
        let hhh = h * hh;
        // V = X1 * H²
        let v = self.x * hh;
        // X3 = R² - H³ - 2V
        let x3 = r.square() - hhh - v.double();
        // Y3 = R (V - X3) - Y1 * H³
        let y3 = r * (v - x3) - self.y * hhh;
        // Z3 = Z1 * H
        let z3 = self.z * h;
        self.x = x3;
        self.y = y3;
        self.z = z3;
    }
}

impl<P: SWCurveConfig, T: Borrow<Affine<P>>> Add<T> for Projective<P> {
    type Output = Self;

    fn add(mut self, other: T) -> Self {
        self += other.borrow();
        self
    }
}

impl<P: SWCurveConfig, T: Borrow<Affine<P>>> SubAssign<T> for Projective<P> {
    fn sub_assign(&mut self, other: T) {
        *self += -(*other.borrow());
    }
}

impl<P: SWCurveConfig, T: Borrow<Affine<P>>> Sub<T> for Projective<P> {
    type Output = Self;

    fn sub(mut self, other: T) -> Self {
        self -= other.borrow();
        self
    }
}

impl_additive_ops_from_ref!(Projective, SWCurveConfig);

impl<'a, P: SWCurveConfig> Add<&'a Self> for Projective<P> {
    type Output = Self;

    fn add(mut self, other: &'a Self) -> Self {
        self += other;
        self
    }
}

impl<'a, P: SWCurveConfig> Sub<&'a Self> for Projective<P> {
    type Output = Self;

    fn sub(mut self, other: &'a Self) -> Self {
        self -= other;
        self
    }
}

impl<'a, P: SWCurveConfig> AddAssign<&'a Self> for Projective<P> {
    /// Full Jacobian addition.
    ///
    /// Dispatches on the exceptional cases by comparing `U1, U2, S1, S2`,
    /// so it is variable-time and must only see public inputs (signature
    /// and proof verification). The constant-time scalar multiplication
    /// routines use the masked addition in
    /// [`scalar_mul`](super::scalar_mul) instead.
    fn add_assign(&mut self, other: &'a Self) {
        if self.is_zero() {
            *self = *other;
            return;
        }
        if other.is_zero() {
            return;
        }

        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        // U1 = X1 * Z2², U2 = X2 * Z1²
        let u1 = self.x * z2z2;
        let u2 = other.x * z1z1;
        // S1 = Y1 * Z2³, S2 = Y2 * Z1³
        let s1 = self.y * other.z * z2z2;
        let s2 = other.y * self.z * z1z1;

        if u1 == u2 {
            if s1 == s2 {
                self.double_in_place();
            } else {
                *self = Self::zero();
            }
            return;
        }

        let h = u2 - u1;
        let r = s2 - s1;
        let hh = h.square();
        let hhh = h * hh;
        let v = u1 * hh;
        let x3 = r.square() - hhh - v.double();
        let y3 = r * (v - x3) - s1 * hhh;
        let z3 = self.z * other.z * h;
        self.x = x3;
        self.y = y3;
        self.z = z3;
    }
}

impl<'a, P: SWCurveConfig> SubAssign<&'a Self> for Projective<P> {
    fn sub_assign(&mut self, other: &'a Self) {
        *self += -(*other);
    }
}

impl<P: SWCurveConfig, T: Borrow<P::ScalarField>> MulAssign<T>
    for Projective<P>
{
    fn mul_assign(&mut self, other: T) {
        *self = self.mul_bigint(other.borrow().into_bigint());
    }
}

impl<P: SWCurveConfig, T: Borrow<P::ScalarField>> Mul<T> for Projective<P> {
    type Output = Self;

    #[inline]
    fn mul(mut self, other: T) -> Self {
        self *= other;
        self
    }
}

impl<P: SWCurveConfig, T: Borrow<Affine<P>>> core::iter::Sum<T>
    for Projective<P>
{
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = T>,
    {
        iter.fold(Self::zero(), |acc, x| acc + x.borrow())
    }
}

// The affine point (X, Y) is lifted to Jacobian coordinates with Z = 1.
impl<P: SWCurveConfig> From<Affine<P>> for Projective<P> {
    fn from(p: Affine<P>) -> Projective<P> {
        if p.infinity {
            Projective::zero()
        } else {
            Self::new_unchecked(p.x, p.y, P::BaseField::one())
        }
    }
}
