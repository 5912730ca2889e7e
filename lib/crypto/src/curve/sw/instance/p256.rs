//! This module contains the [NIST P-256] curve configuration.
//!
//! [NIST P-256]: <https://neuromancer.sk/std/nist/P-256>
use crate::{
    arithmetic::uint::U256,
    curve::{
        sw::{Affine, Projective, SWCurveConfig},
        CurveConfig,
    },
    field::fp::{Fp256, FpParams, LIMBS_256},
    fp_from_hex, fp_from_num, from_hex,
};

/// Base field for [`P256Config`].
pub type Fq = Fp256<P256FqParam>;
/// Base field parameters for [`P256Config`].
pub struct P256FqParam;

impl FpParams<LIMBS_256> for P256FqParam {
    const GENERATOR: Fp256<Self> = fp_from_num!("6");
    const MODULUS: U256 = from_hex!("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff");
}

/// Scalar field for [`P256Config`].
pub type Fr = Fp256<P256FrParam>;
/// Scalar field parameters for [`P256Config`].
pub struct P256FrParam;

impl FpParams<LIMBS_256> for P256FrParam {
    const GENERATOR: Fp256<Self> = fp_from_num!("7");
    const MODULUS: U256 = from_hex!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551");
}

const G_GENERATOR_X: Fq = fp_from_hex!("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296");

const G_GENERATOR_Y: Fq = fp_from_hex!("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5");

/// P-256's curve details.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct P256Config;

impl CurveConfig for P256Config {
    type BaseField = Fq;
    type ScalarField = Fr;

    const COFACTOR: &'static [u64] = &[1];
    const COFACTOR_INV: Fr = Fr::ONE;
}

impl SWCurveConfig for P256Config {
    const COEFF_A: Fq = fp_from_num!("3").ct_neg();
    const COEFF_A_IS_MINUS_THREE: bool = true;
    const COEFF_B: Fq = fp_from_hex!("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b");
    const GENERATOR: Affine<Self> =
        Affine::new_unchecked(G_GENERATOR_X, G_GENERATOR_Y);
}

#[cfg(feature = "std")]
lazy_static::lazy_static! {
    static ref GENERATOR_TABLE:
        crate::curve::sw::scalar_mul::FixedBaseTable<P256Config> =
            crate::curve::sw::scalar_mul::FixedBaseTable::new(
                &P256Config::GENERATOR,
            );
}

/// Computes `scalar * G` in constant time from the precomputed generator
/// table.
#[cfg(feature = "std")]
pub fn mul_generator_ct(scalar: &Fr) -> Projective<P256Config> {
    GENERATOR_TABLE.mul_ct(scalar)
}
