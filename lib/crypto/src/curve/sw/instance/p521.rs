//! This module contains the [NIST P-521] curve configuration.
//!
//! [NIST P-521]: <https://neuromancer.sk/std/nist/P-521>
use crate::{
    arithmetic::uint::U576,
    curve::{
        sw::{Affine, Projective, SWCurveConfig},
        CurveConfig,
    },
    field::fp::{Fp576, FpParams, LIMBS_576},
    fp_from_hex, fp_from_num, from_hex,
};

/// Base field for [`P521Config`].
pub type Fq = Fp576<P521FqParam>;
/// Base field parameters for [`P521Config`].
pub struct P521FqParam;

impl FpParams<LIMBS_576> for P521FqParam {
    const GENERATOR: Fp576<Self> = fp_from_num!("3");
    const MODULUS: U576 = from_hex!("1ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");
}

/// Scalar field for [`P521Config`].
pub type Fr = Fp576<P521FrParam>;
/// Scalar field parameters for [`P521Config`].
pub struct P521FrParam;

impl FpParams<LIMBS_576> for P521FrParam {
    const GENERATOR: Fp576<Self> = fp_from_num!("7");
    const MODULUS: U576 = from_hex!("1fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e91386409");
}

const G_GENERATOR_X: Fq = fp_from_hex!("c6858e06b70404e9cd9e3ecb662395b4429c648139053fb521f828af606b4d3dbaa14b5e77efe75928fe1dc127a2ffa8de3348b3c1856a429bf97e7e31c2e5bd66");

const G_GENERATOR_Y: Fq = fp_from_hex!("11839296a789a3bc0045c8a5fb42c7d1bd998f54449579b446817afbd17273e662c97ee72995ef42640c550b9013fad0761353c7086a272c24088be94769fd16650");

/// P-521's curve details.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct P521Config;

impl CurveConfig for P521Config {
    type BaseField = Fq;
    type ScalarField = Fr;

    const COFACTOR: &'static [u64] = &[1];
    const COFACTOR_INV: Fr = Fr::ONE;
}

impl SWCurveConfig for P521Config {
    const COEFF_A: Fq = fp_from_num!("3").ct_neg();
    const COEFF_A_IS_MINUS_THREE: bool = true;
    const COEFF_B: Fq = fp_from_hex!("51953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef109e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b503f00");
    const GENERATOR: Affine<Self> =
        Affine::new_unchecked(G_GENERATOR_X, G_GENERATOR_Y);
}

#[cfg(feature = "std")]
lazy_static::lazy_static! {
    static ref GENERATOR_TABLE:
        crate::curve::sw::scalar_mul::FixedBaseTable<P521Config> =
            crate::curve::sw::scalar_mul::FixedBaseTable::new(
                &P521Config::GENERATOR,
            );
}

/// Computes `scalar * G` in constant time from the precomputed generator
/// table.
#[cfg(feature = "std")]
pub fn mul_generator_ct(scalar: &Fr) -> Projective<P521Config> {
    GENERATOR_TABLE.mul_ct(scalar)
}

#[cfg(all(test, feature = "std"))]
mod test {
    use num_traits::Zero;

    use super::*;
    use crate::{
        arithmetic::{uint::U576, BigInteger},
        curve::{sw::scalar_mul, AffineRepr},
        field::prime::PrimeField,
    };

    #[test]
    fn generator_is_on_curve() {
        let g = Affine::<P521Config>::generator();
        assert!(g.is_on_curve());
        assert!(g.mul_bigint(<Fr as PrimeField>::MODULUS).is_zero());
    }

    #[test]
    fn fixed_base_table_agrees_with_windowed_mul() {
        let k = Fr::from_bigint(U576::from_bytes_le(&[0x37; 72]));
        assert_eq!(
            mul_generator_ct(&k),
            scalar_mul::mul_ct(&P521Config::GENERATOR, &k),
        );
    }
}
