//! This module contains definitions for the [Twisted Edwards model] of the
//! curve.
//!
//! [Twisted Edwards model]: https://www.hyperelliptic.org/EFD/g1p/auto-twisted.html
use num_traits::Zero;

mod affine;
pub use affine::*;

mod projective;
pub use projective::*;

pub mod instance;
pub mod scalar_mul;

use crate::{
    bits::BitIteratorBE,
    curve::AffineRepr,
    field::{group::AdditiveGroup, prime::PrimeField},
};

/// Constants and convenience functions
/// that define the [Twisted Edwards model] of the curve.
///
/// In this model, the curve equation is `a * x² + y² = 1 + d * x² * y²`, for
/// constants `a` and `d`.
///
/// [Twisted Edwards model]: https://www.hyperelliptic.org/EFD/g1p/auto-twisted.html
pub trait TECurveConfig: super::CurveConfig {
    /// Coefficient `a` of the curve equation.
    const COEFF_A: Self::BaseField;
    /// Coefficient `d` of the curve equation.
    const COEFF_D: Self::BaseField;
    /// Generator of the prime-order subgroup.
    const GENERATOR: Affine<Self>;

    /// Model parameters for the Montgomery curve that is birationally
    /// equivalent to this curve.
    type MontCurveConfig: MontCurveConfig<BaseField = Self::BaseField>;

    /// Helper method for computing `elem * Self::COEFF_A`.
    ///
    /// The default implementation should be overridden only if
    /// the product can be computed faster than standard field multiplication
    /// (eg: via doubling if `COEFF_A == 2`, or if `COEFF_A.is_zero()`).
    #[inline(always)]
    fn mul_by_a(elem: Self::BaseField) -> Self::BaseField {
        elem * Self::COEFF_A
    }

    /// Checks that the current point is in the prime order subgroup,
    /// assuming the point is already on the curve.
    fn is_in_prime_order_subgroup(item: &Affine<Self>) -> bool {
        Self::mul_affine(item, Self::ScalarField::characteristic()).is_zero()
    }

    /// Performs cofactor clearing.
    /// The default method is simply to multiply by the cofactor.
    /// For some curve families though, it is sufficient to multiply
    /// by a smaller scalar.
    fn clear_cofactor(item: &Affine<Self>) -> Affine<Self> {
        item.mul_by_cofactor()
    }

    /// Default implementation of group multiplication for projective
    /// coordinates.
    ///
    /// Variable time in the scalar; for public scalars only. The
    /// constant-time routines live in [`scalar_mul`].
    fn mul_projective(
        base: &Projective<Self>,
        scalar: impl BitIteratorBE,
    ) -> Projective<Self> {
        let mut res = Projective::zero();
        for b in scalar.bit_be_trimmed_iter() {
            res.double_in_place();
            if b {
                res += base;
            }
        }

        res
    }

    /// Default implementation of group multiplication for affine
    /// coordinates.
    ///
    /// Variable time in the scalar; for public scalars only. The
    /// constant-time routines live in [`scalar_mul`].
    fn mul_affine(
        base: &Affine<Self>,
        scalar: impl BitIteratorBE,
    ) -> Projective<Self> {
        let mut res = Projective::zero();
        for b in scalar.bit_be_trimmed_iter() {
            res.double_in_place();
            if b {
                res += base;
            }
        }

        res
    }
}

/// Constants and convenience functions that collectively define the
/// [Montgomery model](https://www.hyperelliptic.org/EFD/g1p/auto-montgom.html)
/// of the curve.
///
/// In this model, the curve equation is `b * y² = x³ + a * x² + x`, for
/// constants `a` and `b`.
pub trait MontCurveConfig: super::CurveConfig {
    /// Coefficient `a` of the curve equation.
    const COEFF_A: Self::BaseField;
    /// Coefficient `b` of the curve equation.
    const COEFF_B: Self::BaseField;

    /// Model parameters for the Twisted Edwards curve that is birationally
    /// equivalent to this curve.
    type TECurveConfig: TECurveConfig<BaseField = Self::BaseField>;
}

#[cfg(all(test, feature = "std"))]
mod test {
    use num_traits::Zero;
    use proptest::prelude::*;

    use super::scalar_mul;
    use crate::{
        arithmetic::{uint::U256, BigInteger},
        curve::{
            te::instance::curve25519::{
                mul_basepoint_ct, Curve25519Config, Fq, Fr,
            },
            AffineRepr, CurveGroup, PrimeGroup,
        },
        error::Error,
        field::{group::AdditiveGroup, prime::PrimeField},
    };

    type Affine = super::Affine<Curve25519Config>;
    type Projective = super::Projective<Curve25519Config>;

    fn scalar_from_bytes(bytes: [u8; 32]) -> Fr {
        Fr::from_bigint(U256::from_bytes_le(&bytes))
    }

    #[test]
    fn generator_is_on_curve_and_in_subgroup() {
        let g = Affine::generator();
        assert!(g.is_on_curve());
        assert!(g.is_in_prime_order_subgroup());
    }

    #[test]
    fn group_order_annihilates_the_base_point() {
        let order = <Fr as PrimeField>::MODULUS;
        assert!(Affine::generator().mul_bigint(order).is_zero());
    }

    #[test]
    fn identity_laws() {
        let g: Projective = Affine::generator().into();

        assert_eq!(g + Projective::zero(), g);
        assert!((g + (-g)).is_zero());
        assert_eq!(g.double(), g + g);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn scalar_mul_paths_agree(k: [u8; 32]) {
            let k = scalar_from_bytes(k);
            let g: Projective = Affine::generator().into();

            let fixed_base = mul_basepoint_ct(&k);
            let variable_base = scalar_mul::mul_ct(&g, &k);
            let double_and_add = g.mul_bigint(k.into_bigint());

            prop_assert_eq!(fixed_base, variable_base);
            prop_assert_eq!(fixed_base, double_and_add);
        }

        #[test]
        fn double_scalar_mul_agrees(a: [u8; 32], b: [u8; 32]) {
            let a = scalar_from_bytes(a);
            let b = scalar_from_bytes(b);
            let g: Projective = Affine::generator().into();
            let q = scalar_mul::mul_ct(&g, &scalar_from_bytes([13; 32]));

            let vartime = scalar_mul::double_mul_public(&a, &g, &b, &q);
            let constant_time =
                scalar_mul::mul_ct(&g, &a) + scalar_mul::mul_ct(&q, &b);
            prop_assert_eq!(vartime, constant_time);
        }

        #[test]
        fn addition_is_associative(a: [u8; 32], b: [u8; 32], c: [u8; 32]) {
            let g: Projective = Affine::generator().into();
            let p = scalar_mul::mul_ct(&g, &scalar_from_bytes(a));
            let q = scalar_mul::mul_ct(&g, &scalar_from_bytes(b));
            let r = scalar_mul::mul_ct(&g, &scalar_from_bytes(c));

            prop_assert_eq!((p + q) + r, p + (q + r));
            prop_assert_eq!(p + q, q + p);
        }

        #[test]
        fn compressed_bytes_roundtrip(k: [u8; 32]) {
            let point: Affine =
                scalar_mul::mul_ct(
                    &Affine::generator().into(),
                    &scalar_from_bytes(k),
                )
                .into_affine();

            let bytes = point.to_compressed_bytes();
            prop_assert_eq!(bytes.len(), 32);
            let decoded =
                Affine::from_compressed_bytes(&bytes).expect("canonical");
            prop_assert_eq!(decoded, point);
        }
    }

    #[test]
    fn non_canonical_y_is_rejected() {
        // y = p is a non-canonical encoding of y = 0.
        let p_bytes = <Fq as PrimeField>::MODULUS.into_bytes_le();
        assert_eq!(
            Affine::from_compressed_bytes(&p_bytes),
            Err(Error::InvalidEncoding),
        );

        // Wrong length.
        assert_eq!(
            Affine::from_compressed_bytes(&[0u8; 31]),
            Err(Error::InvalidEncoding),
        );
    }
}
