//! This module contains the [NIST P-384] curve configuration.
//!
//! [NIST P-384]: <https://neuromancer.sk/std/nist/P-384>
use crate::{
    arithmetic::uint::U384,
    curve::{
        sw::{Affine, Projective, SWCurveConfig},
        CurveConfig,
    },
    field::fp::{Fp384, FpParams, LIMBS_384},
    fp_from_hex, fp_from_num, from_hex,
};

/// Base field for [`P384Config`].
pub type Fq = Fp384<P384FqParam>;
/// Base field parameters for [`P384Config`].
pub struct P384FqParam;

impl FpParams<LIMBS_384> for P384FqParam {
    const GENERATOR: Fp384<Self> = fp_from_num!("19");
    const MODULUS: U384 = from_hex!("fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff0000000000000000ffffffff");
}

/// Scalar field for [`P384Config`].
pub type Fr = Fp384<P384FrParam>;
/// Scalar field parameters for [`P384Config`].
pub struct P384FrParam;

impl FpParams<LIMBS_384> for P384FrParam {
    const GENERATOR: Fp384<Self> = fp_from_num!("2");
    const MODULUS: U384 = from_hex!("ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf581a0db248b0a77aecec196accc52973");
}

const G_GENERATOR_X: Fq = fp_from_hex!("aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a385502f25dbf55296c3a545e3872760ab7");

const G_GENERATOR_Y: Fq = fp_from_hex!("3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c00a60b1ce1d7e819d7a431d7c90ea0e5f");

/// P-384's curve details.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct P384Config;

impl CurveConfig for P384Config {
    type BaseField = Fq;
    type ScalarField = Fr;

    const COFACTOR: &'static [u64] = &[1];
    const COFACTOR_INV: Fr = Fr::ONE;
}

impl SWCurveConfig for P384Config {
    const COEFF_A: Fq = fp_from_num!("3").ct_neg();
    const COEFF_A_IS_MINUS_THREE: bool = true;
    const COEFF_B: Fq = fp_from_hex!("b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875ac656398d8a2ed19d2a85c8edd3ec2aef");
    const GENERATOR: Affine<Self> =
        Affine::new_unchecked(G_GENERATOR_X, G_GENERATOR_Y);
}

#[cfg(feature = "std")]
lazy_static::lazy_static! {
    static ref GENERATOR_TABLE:
        crate::curve::sw::scalar_mul::FixedBaseTable<P384Config> =
            crate::curve::sw::scalar_mul::FixedBaseTable::new(
                &P384Config::GENERATOR,
            );
}

/// Computes `scalar * G` in constant time from the precomputed generator
/// table.
#[cfg(feature = "std")]
pub fn mul_generator_ct(scalar: &Fr) -> Projective<P384Config> {
    GENERATOR_TABLE.mul_ct(scalar)
}

#[cfg(all(test, feature = "std"))]
mod test {
    use num_traits::Zero;

    use super::*;
    use crate::{
        arithmetic::{uint::U384, BigInteger},
        curve::{sw::scalar_mul, AffineRepr},
        field::prime::PrimeField,
    };

    #[test]
    fn generator_is_on_curve() {
        let g = Affine::<P384Config>::generator();
        assert!(g.is_on_curve());
        assert!(g.mul_bigint(<Fr as PrimeField>::MODULUS).is_zero());
    }

    #[test]
    fn fixed_base_table_agrees_with_windowed_mul() {
        let k = Fr::from_bigint(U384::from_bytes_le(&[0xa5; 48]));
        assert_eq!(
            mul_generator_ct(&k),
            scalar_mul::mul_ct(&P384Config::GENERATOR, &k),
        );
    }
}
