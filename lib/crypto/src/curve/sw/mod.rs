//! This module contains definitions for the [Short Weierstrass model] of the
//! curve.
//!
//! [Short Weierstrass model]: https://www.hyperelliptic.org/EFD/g1p/auto-shortw.html

use num_traits::Zero;

use crate::{
    bits::BitIteratorBE,
    curve::AffineRepr,
    field::{group::AdditiveGroup, prime::PrimeField},
};

mod affine;
pub use affine::*;

mod projective;
pub use projective::*;

pub mod instance;
pub mod scalar_mul;

/// Constants and convenience functions that collectively define the
/// [Short Weierstrass model] of the curve.
///
/// In this model, the curve equation is `y² = x³ + a * x + b`, for constants
/// `a` and `b`.
///
/// [Short Weierstrass model]: https://www.hyperelliptic.org/EFD/g1p/auto-shortw.html
pub trait SWCurveConfig: super::CurveConfig {
    /// Coefficient `a` of the curve equation.
    const COEFF_A: Self::BaseField;
    /// Coefficient `b` of the curve equation.
    const COEFF_B: Self::BaseField;
    /// Generator of the prime-order subgroup.
    const GENERATOR: Affine<Self>;

    /// Whether `COEFF_A == -3`, which selects the fast doubling formula.
    const COEFF_A_IS_MINUS_THREE: bool = false;

    /// Helper method for computing `elem * Self::COEFF_A`.
    ///
    /// The default implementation should be overridden only if
    /// the product can be computed faster than standard field multiplication
    /// (eg: via doubling if `COEFF_A == 2`, or if `COEFF_A.is_zero()`).
    #[inline(always)]
    fn mul_by_a(elem: Self::BaseField) -> Self::BaseField {
        if Self::COEFF_A.is_zero() {
            Self::BaseField::ZERO
        } else {
            elem * Self::COEFF_A
        }
    }

    /// Helper method for computing `elem + Self::COEFF_B`.
    #[inline(always)]
    fn add_b(elem: Self::BaseField) -> Self::BaseField {
        if Self::COEFF_B.is_zero() {
            elem
        } else {
            elem + Self::COEFF_B
        }
    }

    /// Check if the provided curve point is in the prime-order subgroup.
    ///
    /// The default implementation multiplies `item` by the order `r` of the
    /// prime-order subgroup, and checks if the result is zero. If the
    /// curve's cofactor is one, this check automatically returns true.
    fn is_in_correct_subgroup_assuming_on_curve(item: &Affine<Self>) -> bool {
        Self::cofactor_is_one()
            || Self::mul_affine(item, Self::ScalarField::characteristic())
                .is_zero()
    }

    /// Performs cofactor clearing.
    /// The default method is simply to multiply by the cofactor.
    /// Some curves can implement a more efficient algorithm.
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
        sw_double_and_add_projective(base, scalar)
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
        sw_double_and_add_affine(base, scalar)
    }
}

/// Standard double-and-add method for multiplication by a scalar.
#[inline(always)]
pub fn sw_double_and_add_affine<P: SWCurveConfig>(
    base: &Affine<P>,
    scalar: impl BitIteratorBE,
) -> Projective<P> {
    let mut res = Projective::zero();
    for b in scalar.bit_be_trimmed_iter() {
        res.double_in_place();
        if b {
            res += base;
        }
    }

    res
}

/// Standard double-and-add method for multiplication by a scalar.
#[inline(always)]
pub fn sw_double_and_add_projective<P: SWCurveConfig>(
    base: &Projective<P>,
    scalar: impl BitIteratorBE,
) -> Projective<P> {
    let mut res = Projective::zero();
    for b in scalar.bit_be_trimmed_iter() {
        res.double_in_place();
        if b {
            res += base;
        }
    }

    res
}

#[cfg(all(test, feature = "std"))]
mod test {
    use num_traits::Zero;
    use proptest::prelude::*;

    use super::scalar_mul;
    use crate::{
        arithmetic::{uint::U256, BigInteger},
        curve::{
            sw::instance::p256::{mul_generator_ct, Fr, P256Config},
            AffineRepr, CurveGroup,
        },
        error::Error,
        field::{group::AdditiveGroup, prime::PrimeField},
        fp_from_hex,
    };

    type Affine = super::Affine<P256Config>;
    type Projective = super::Projective<P256Config>;

    fn scalar_from_bytes(bytes: [u8; 32]) -> Fr {
        Fr::from_bigint(U256::from_bytes_le(&bytes))
    }

    #[test]
    fn generator_matches_standard_coordinates() {
        let g = Affine::generator();
        assert!(g.is_on_curve());
        assert_eq!(
            g.x,
            fp_from_hex!("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"),
        );
        assert_eq!(
            g.y,
            fp_from_hex!("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"),
        );

        // 1·G in every implementation equals G.
        assert_eq!(scalar_mul::mul_ct(&g, &Fr::ONE), g.into_group());
        assert_eq!(mul_generator_ct(&Fr::ONE), g.into_group());
    }

    #[test]
    fn group_order_annihilates_the_generator() {
        let order = <Fr as PrimeField>::MODULUS;
        assert!(Affine::generator().mul_bigint(order).is_zero());
    }

    #[test]
    fn identity_laws() {
        let g: Projective = Affine::generator().into();

        // P + ∞ = P and ∞ + P = P.
        assert_eq!(g + Projective::zero(), g);
        assert_eq!(Projective::zero() + g, g);

        // P + (-P) = ∞.
        assert!((g + (-g)).is_zero());

        // 2P = P + P through both the doubling and the addition paths.
        assert_eq!(g.double(), g + g);
    }

    #[test]
    fn exceptional_cases_of_mixed_addition() {
        let g = Affine::generator();
        let g_proj: Projective = g.into();

        // P1 = P2 dispatches to doubling.
        assert_eq!(g_proj + g, g_proj.double());
        // P1 = -P2 yields the identity.
        assert!((g_proj + (-g)).is_zero());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn addition_is_associative(a: [u8; 32], b: [u8; 32], c: [u8; 32]) {
            let g = Affine::generator();
            let p = scalar_mul::mul_public(&g, &scalar_from_bytes(a));
            let q = scalar_mul::mul_public(&g, &scalar_from_bytes(b));
            let r = scalar_mul::mul_public(&g, &scalar_from_bytes(c));

            prop_assert_eq!((p + q) + r, p + (q + r));
            prop_assert_eq!(p + q, q + p);
        }

        #[test]
        fn scalar_mul_paths_agree(k: [u8; 32]) {
            let k = scalar_from_bytes(k);
            let g = Affine::generator();

            let constant_time = scalar_mul::mul_ct(&g, &k);
            let fixed_base = mul_generator_ct(&k);
            let public = scalar_mul::mul_public(&g, &k);
            let double_and_add = g.mul_bigint(k.into_bigint());

            prop_assert_eq!(constant_time, fixed_base);
            prop_assert_eq!(constant_time, public);
            prop_assert_eq!(constant_time, double_and_add);
        }

        #[test]
        fn multi_scalar_mul_agrees_with_sum(a: [u8; 32], b: [u8; 32]) {
            let a = scalar_from_bytes(a);
            let b = scalar_from_bytes(b);
            let g = Affine::generator();
            let q: Affine =
                scalar_mul::mul_public(&g, &scalar_from_bytes([5; 32]))
                    .into_affine();

            let combined = scalar_mul::multi_mul_ct(&[(g, a), (q, b)]);
            let separate =
                scalar_mul::mul_public(&g, &a) + scalar_mul::mul_public(&q, &b);
            prop_assert_eq!(combined, separate);

            let vartime = scalar_mul::double_mul_public(&g, &a, &q, &b);
            prop_assert_eq!(combined, vartime);
        }

        #[test]
        fn uncompressed_bytes_roundtrip(k: [u8; 32]) {
            let point: Affine =
                scalar_mul::mul_public(&Affine::generator(), &scalar_from_bytes(k))
                    .into_affine();
            prop_assume!(!point.is_zero());

            let bytes = point.to_uncompressed_bytes().unwrap();
            prop_assert_eq!(bytes.len(), 65);
            prop_assert_eq!(bytes[0], 0x04);
            prop_assert_eq!(
                Affine::from_uncompressed_bytes(&bytes).unwrap(),
                point
            );
        }
    }

    #[test]
    fn invalid_encodings_are_rejected() {
        let g = Affine::generator();
        let mut bytes = g.to_uncompressed_bytes().unwrap();

        // Identity has no affine encoding.
        assert_eq!(
            Affine::identity().to_uncompressed_bytes(),
            Err(Error::PointAtInfinity),
        );

        // Wrong prefix byte.
        bytes[0] = 0x02;
        assert_eq!(
            Affine::from_uncompressed_bytes(&bytes),
            Err(Error::InvalidEncoding),
        );
        bytes[0] = 0x04;

        // Corrupting a coordinate moves the point off the curve.
        bytes[10] ^= 1;
        assert_eq!(
            Affine::from_uncompressed_bytes(&bytes),
            Err(Error::NotOnCurve),
        );
        bytes[10] ^= 1;

        // Truncation.
        assert_eq!(
            Affine::from_uncompressed_bytes(&bytes[..64]),
            Err(Error::InvalidEncoding),
        );

        // Non-canonical coordinate: x replaced by x + p.
        let mut non_canonical = bytes.clone();
        for byte in &mut non_canonical[1..33] {
            *byte = 0xff;
        }
        assert!(Affine::from_uncompressed_bytes(&non_canonical).is_err());
    }
}
