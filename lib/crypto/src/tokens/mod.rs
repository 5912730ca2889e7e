//! Anonymous-token protocols over P-384.
//!
//! Two constructions share the same shape: the issuer holds secret
//! scalars, the client blinds a nonce-derived point, the issuer signs the
//! blinded point and proves it used its committed key (DLEQ / DLEQOR), the
//! client unblinds and later redeems the token.
//!
//! * [`pmb`]: PMBTokens, carrying one bit of issuer-private metadata.
//! * [`voprf`]: a VOPRF variant without private metadata.
//!
//! Wire formats are length-prefixed concatenations of SEC1 uncompressed
//! points and fixed-width big-endian scalars; batch proofs are framed with
//! a 2-byte big-endian length prefix, which also terminates the issuance
//! response.

pub mod dleq;
pub mod pmb;
pub mod voprf;

use alloc::vec::Vec;

use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    arithmetic::{uint::U768, BigInteger},
    curve::sw::{instance::p384::P384Config, Affine, Projective},
    error::Error,
    field::{
        fp::{Fp768, FpParams, LIMBS_768},
        prime::PrimeField,
    },
    from_hex,
};

/// The token group: P-384.
pub(crate) type TokenConfig = P384Config;
/// A token group element in affine form.
pub(crate) type Point = Affine<TokenConfig>;
/// A token group element in Jacobian form.
pub(crate) type PointProj = Projective<TokenConfig>;
/// A scalar of the token group order.
pub(crate) type Scalar = crate::curve::sw::instance::p384::Fr;

/// Length of an encoded scalar in bytes.
pub(crate) const SCALAR_LEN: usize = 48;
/// Length of an encoded (uncompressed) point in bytes.
pub(crate) const POINT_LEN: usize = 97;
/// Length of a token nonce in bytes.
pub(crate) const NONCE_LEN: usize = 64;

/// P-384 scalar field held at 768-bit width, for reducing 64-byte hash
/// outputs modulo the group order.
pub(crate) struct P384Fr768Param;
impl FpParams<LIMBS_768> for P384Fr768Param {
    const GENERATOR: Fp768<Self> = crate::fp_from_num!("2");
    const MODULUS: U768 = from_hex!("ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf581a0db248b0a77aecec196accc52973");
}

/// Wide-width P-384 scalar.
pub(crate) type WideScalar = Fp768<P384Fr768Param>;

/// Hashes a labeled, length-framed transcript to a scalar.
///
/// Each input is preceded by its 4-byte big-endian length so that
/// distinct transcripts can never collide by reframing.
pub(crate) fn hash_to_scalar(label: &[u8], inputs: &[&[u8]]) -> Scalar {
    let mut h = Sha512::new();
    h.update(u32::try_from(label.len()).expect("short label").to_be_bytes());
    h.update(label);
    for input in inputs {
        h.update(
            u32::try_from(input.len()).expect("bounded input").to_be_bytes(),
        );
        h.update(input);
    }
    let digest = h.finalize();

    let mut padded = [0u8; 96];
    padded[..64].copy_from_slice(&digest);
    let wide = WideScalar::from_bigint(U768::from_bytes_le(&padded));
    Scalar::from_fp(wide)
}

/// Samples a uniformly random non-zero scalar.
pub(crate) fn random_nonzero_scalar(
    rng: &mut impl rand_core::CryptoRngCore,
) -> Scalar {
    loop {
        let candidate = Scalar::random(rng);
        if !num_traits::Zero::is_zero(&candidate) {
            return candidate;
        }
    }
}

/// Serializes a point in SEC1 uncompressed form.
pub(crate) fn encode_point(point: &Point) -> Result<[u8; POINT_LEN], Error> {
    let bytes = point.to_uncompressed_bytes()?;
    let mut out = [0u8; POINT_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Serializes a point, mapping the identity (which cannot occur in honest
/// transcripts) to a fixed all-zero frame.
pub(crate) fn encode_point_infallible(point: &Point) -> [u8; POINT_LEN] {
    encode_point(point).unwrap_or([0u8; POINT_LEN])
}

/// Parses a SEC1 uncompressed point, enforcing canonical coordinates and
/// curve membership.
pub(crate) fn decode_point(bytes: &[u8]) -> Result<Point, Error> {
    Point::from_uncompressed_bytes(bytes)
}

/// Serializes a scalar as fixed-width big-endian bytes.
pub(crate) fn encode_scalar(scalar: &Scalar) -> [u8; SCALAR_LEN] {
    let mut out = [0u8; SCALAR_LEN];
    out.copy_from_slice(&scalar.into_be_bytes());
    out
}

/// Parses a canonical fixed-width big-endian scalar.
pub(crate) fn decode_scalar(bytes: &[u8]) -> Result<Scalar, Error> {
    Scalar::from_be_bytes(bytes).ok_or(Error::InvalidEncoding)
}

/// Appends a 2-byte big-endian length prefix.
pub(crate) fn put_u16(out: &mut Vec<u8>, value: usize) {
    let value = u16::try_from(value).expect("frame fits a u16 prefix");
    out.extend_from_slice(&value.to_be_bytes());
}

/// A cursor over a received wire frame. Truncated reads surface as
/// [`Error::InvalidEncoding`].
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.bytes.len() < n {
            return Err(Error::InvalidEncoding);
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    pub(crate) fn take_u16(&mut self) -> Result<usize, Error> {
        let bytes = self.take(2)?;
        Ok(usize::from(u16::from_be_bytes([bytes[0], bytes[1]])))
    }

    pub(crate) fn take_point(&mut self) -> Result<Point, Error> {
        decode_point(self.take(POINT_LEN)?)
    }

    pub(crate) fn take_scalar(&mut self) -> Result<Scalar, Error> {
        decode_scalar(self.take(SCALAR_LEN)?)
    }

    pub(crate) fn finish(&self) -> Result<(), Error> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidEncoding)
        }
    }
}

/// Client-side state held between the blind and unblind steps of an
/// exchange: the token nonce `t`, the blinding scalar `r`, and the
/// blinded point `T' = r⁻¹ · H_t(t)`.
///
/// The blinding scalar is secret; the whole pretoken is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PreToken {
    pub(crate) nonce: [u8; NONCE_LEN],
    pub(crate) blinding: Scalar,
    #[zeroize(skip)]
    pub(crate) blinded: Point,
}

impl PreToken {
    /// The blinded point sent to the issuer.
    pub(crate) fn blinded_point(&self) -> Point {
        self.blinded
    }
}

/// Computes the batched-proof challenges
/// `e_i = H_c("DLEQ BATCH" ‖ transcript ‖ i)`.
pub(crate) fn batch_challenges(
    transcript: &[u8],
    count: usize,
) -> Vec<Scalar> {
    (0..count)
        .map(|i| {
            let index = u16::try_from(i).expect("small batch").to_be_bytes();
            hash_to_scalar(b"DLEQ BATCH", &[transcript, &index])
        })
        .collect()
}

/// Aggregates `Σ eᵢ · Pᵢ` over public points with public weights.
pub(crate) fn aggregate(points: &[Point], weights: &[Scalar]) -> Point {
    use crate::{
        curve::{sw::scalar_mul, CurveGroup},
        field::group::AdditiveGroup,
    };
    let mut acc = PointProj::ZERO;
    for (point, weight) in points.iter().zip(weights) {
        acc += &scalar_mul::mul_public(point, weight);
    }
    acc.into_affine()
}
