//! This module contains an Ed25519 signature implementation ([RFC 8032]),
//! including key derivation, signing, and signature verification.
//!
//! Signing and public-key derivation multiply the base point through the
//! constant-time precomputed-table path; verification evaluates
//! `s·B - k·A` through the variable-time double-scalar path, which is
//! sound because every verification input is public.
//!
//! [RFC 8032]: https://www.rfc-editor.org/rfc/rfc8032

#![allow(non_snake_case)]
use sha2::{digest::Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    arithmetic::uint::{U256, U512},
    arithmetic::BigInteger,
    curve::{
        te::{
            instance::curve25519::{
                mul_basepoint_ct, Curve25519Config, Curve25519FrParam,
            },
            scalar_mul, Affine, Projective,
        },
        CurveGroup, PrimeGroup,
    },
    error::Error,
    field::{
        fp::{Fp256, Fp512, FpParams, LIMBS_512},
        prime::PrimeField,
    },
    from_num,
    x25519::clamp_scalar,
};

/// Ed25519 scalar, an integer modulo the group order
/// `ℓ = 2²⁵² + 27742317777372353535851937790883648493`.
pub(crate) type Scalar = Fp256<Curve25519FrParam>;

/// Ed25519 scalar with a 512-bit inner integer, used to reduce 64-byte
/// hashes modulo `ℓ`.
pub(crate) type WideScalar = Fp512<Curve25519Fr512Param>;

/// Scalar field parameters for curve ed25519 with a 512-bit inner integer
/// size.
pub(crate) struct Curve25519Fr512Param;
impl FpParams<LIMBS_512> for Curve25519Fr512Param {
    const GENERATOR: Fp512<Self> = crate::fp_from_num!("2");
    const MODULUS: U512 = from_num!("7237005577332262213973186563042994240857116359379907606001950938285454250989");
}

/// Ed25519 extended twisted Edwards point.
pub(crate) type ProjectivePoint = Projective<Curve25519Config>;

/// Ed25519 affine point.
pub(crate) type AffinePoint = Affine<Curve25519Config>;

/// The length of an Ed25519 seed (`SecretKey`) in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;
/// The length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// The length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;
/// The length of an Ed25519 keypair (seed followed by public key) in
/// bytes.
pub const KEYPAIR_LENGTH: usize = SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH;

/// Ed25519 secret key as defined in [RFC 8032 § 5.1.5]: 32 octets of
/// cryptographically secure random data.
///
/// [RFC 8032 § 5.1.5]: https://www.rfc-editor.org/rfc/rfc8032#section-5.1.5
pub type SecretKey = [u8; SECRET_KEY_LENGTH];

/// Reduces a 64-byte little-endian integer modulo the group order `ℓ`.
///
/// The value is carried through 512-bit field arithmetic over `ℓ` and then
/// narrowed to the 256-bit scalar width.
pub(crate) fn reduce_wide(bytes: &[u8; 64]) -> Scalar {
    let wide = WideScalar::from_bigint(U512::from_bytes_le(bytes));
    Scalar::from_fp(wide)
}

/// Computes `(a * b + c) mod ℓ` on 32-byte little-endian scalars.
#[must_use]
pub fn scalar_muladd(a: &Scalar, b: &Scalar, c: &Scalar) -> Scalar {
    *a * *b + *c
}

/// Contains the secret scalar and domain separator used for generating
/// signatures.
///
/// In the usual Ed25519 signing algorithm, `scalar` and `hash_prefix` are
/// defined such that `scalar || hash_prefix = H(seed)` where `H` is
/// SHA-512, with `scalar` clamped.
///
/// Instances of this secret are automatically overwritten with zeroes when
/// they fall out of scope.
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub(crate) struct ExpandedSecretKey {
    /// The secret scalar used for signing.
    pub(crate) scalar: Scalar,
    /// The domain separator used when hashing the message to generate the
    /// pseudorandom `r` value.
    pub(crate) hash_prefix: [u8; 32],
}

impl From<&SecretKey> for ExpandedSecretKey {
    fn from(secret_key: &SecretKey) -> ExpandedSecretKey {
        let hash = Sha512::default().chain_update(secret_key).finalize();
        let mut scalar_bytes = [0u8; 32];
        let mut hash_prefix = [0u8; 32];
        scalar_bytes.copy_from_slice(&hash[00..32]);
        hash_prefix.copy_from_slice(&hash[32..64]);

        let scalar = Scalar::from_bigint(U256::from_bytes_le(&clamp_scalar(
            scalar_bytes,
        )));
        Self { scalar, hash_prefix }
    }
}

/// Ed25519 signing key which can be used to produce signatures.
///
/// Invariant: `verifying_key` is always the public key of `secret_key`.
/// This prevents the signing-function [oracle attack].
///
/// [oracle attack]: https://github.com/MystenLabs/ed25519-unsafe-libs
#[derive(Clone)]
pub struct SigningKey {
    /// The 32-byte seed.
    pub(crate) seed: SecretKey,
    /// The secret half of this signing key.
    pub(crate) signing_key: ExpandedSecretKey,
    /// The public half of this signing key.
    pub(crate) verifying_key: VerifyingKey,
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

impl SigningKey {
    /// Construct a [`SigningKey`] from a [`SecretKey`] seed.
    #[inline]
    #[must_use]
    pub fn from_bytes(secret_key: &SecretKey) -> Self {
        let signing_key: ExpandedSecretKey = secret_key.into();
        let point = mul_basepoint_ct(&signing_key.scalar);
        let verifying_key = VerifyingKey::from_point(point);
        Self { seed: *secret_key, signing_key, verifying_key }
    }

    /// Get the [`VerifyingKey`] for this [`SigningKey`].
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.verifying_key
    }

    /// Serializes the keypair as 64 bytes: seed followed by public key.
    #[must_use]
    pub fn to_keypair_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        let mut bytes = [0u8; KEYPAIR_LENGTH];
        bytes[..SECRET_KEY_LENGTH].copy_from_slice(&self.seed);
        bytes[SECRET_KEY_LENGTH..]
            .copy_from_slice(&self.verifying_key.to_bytes());
        bytes
    }

    /// Parses a 64-byte keypair, checking that the public half matches the
    /// seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] when the embedded public key
    /// does not belong to the seed.
    pub fn from_keypair_bytes(
        bytes: &[u8; KEYPAIR_LENGTH],
    ) -> Result<Self, Error> {
        let mut seed = [0u8; SECRET_KEY_LENGTH];
        seed.copy_from_slice(&bytes[..SECRET_KEY_LENGTH]);
        let key = Self::from_bytes(&seed);
        if key.verifying_key.to_bytes() != bytes[SECRET_KEY_LENGTH..] {
            return Err(Error::InvalidEncoding);
        }
        Ok(key)
    }

    /// Verify a signature on a message with this signing key's public key.
    #[must_use]
    pub fn is_valid_signature(
        &self,
        message: &[u8],
        signature: &Signature,
    ) -> bool {
        self.verifying_key.is_valid(message, signature)
    }

    /// Sign a message with this signing key's secret key.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        let mut h = Sha512::new();
        h.update(self.signing_key.hash_prefix);
        h.update(message);
        let r = reduce_wide(&h.finalize().into());

        let R = mul_basepoint_ct(&r);
        let R_bytes = compress(&R);

        let mut h = Sha512::new();
        h.update(R_bytes);
        h.update(self.verifying_key.to_bytes());
        h.update(message);
        let k = reduce_wide(&h.finalize().into());

        let s = scalar_muladd(&k, &self.signing_key.scalar, &r);

        Signature { R_bytes, s }
    }
}

/// Serializes a point in the "Ed25519" compressed format: the curve point
/// `(x, y)` is determined by the y-coordinate and the sign of `x`.
///
/// The first 255 bits represent the `y`-coordinate. The high bit of the
/// 32nd byte gives the sign of `x`.
fn compress(point: &ProjectivePoint) -> [u8; 32] {
    let affine = point.into_affine();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&affine.to_compressed_bytes());
    bytes
}

/// Ed25519 signature representation: the point `R` and the scalar `s`.
///
/// Wire format is 64 bytes, `R ‖ s`, with `s` a canonical little-endian
/// scalar in `[0, ℓ)`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Signature {
    /// Compressed encoding of the commitment point `R`.
    pub(crate) R_bytes: [u8; 32],
    /// The response scalar, reduced modulo `ℓ`.
    pub(crate) s: Scalar,
}

impl Signature {
    /// Serializes the signature as `R ‖ s`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..32].copy_from_slice(&self.R_bytes);
        bytes[32..].copy_from_slice(&self.s.into_bigint().into_bytes_le());
        bytes
    }

    /// Parses a signature, rejecting non-canonical `s` scalars.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] when the top three bits of the
    /// final byte are set or `s >= ℓ`.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LENGTH]) -> Result<Self, Error> {
        let mut R_bytes = [0u8; 32];
        R_bytes.copy_from_slice(&bytes[..32]);

        // Cheap high-bits check first, then the full range check.
        if bytes[63] & 0xe0 != 0 {
            return Err(Error::InvalidEncoding);
        }
        let s_repr = U256::from_bytes_le(&bytes[32..]);
        if s_repr >= <Curve25519FrParam as FpParams<4>>::MODULUS {
            return Err(Error::InvalidEncoding);
        }

        Ok(Self { R_bytes, s: Scalar::from_bigint(s_repr) })
    }
}

/// An Ed25519 public key.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct VerifyingKey {
    /// Compressed wire encoding of the point.
    pub(crate) compressed: [u8; 32],
    /// Edwards point used for curve arithmetic operations.
    pub(crate) point: ProjectivePoint,
}

impl VerifyingKey {
    fn from_point(point: ProjectivePoint) -> Self {
        Self { compressed: compress(&point), point }
    }

    /// Serializes the public key in its 32-byte compressed encoding.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.compressed
    }

    /// Parses a public key from its compressed encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] for a non-canonical encoding and
    /// [`Error::NotOnCurve`] when no curve point has the encoded
    /// y-coordinate.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, Error> {
        let affine = AffinePoint::from_compressed_bytes(bytes)?;
        Ok(Self { compressed: *bytes, point: affine.into() })
    }

    /// Verify a signature on a message with this public key.
    #[must_use]
    pub fn is_valid(&self, message: &[u8], signature: &Signature) -> bool {
        let mut h = Sha512::new();
        h.update(signature.R_bytes);
        h.update(self.compressed);
        h.update(message);
        let k = reduce_wide(&h.finalize().into());

        // R' = s·B - k·A must re-compress to the signature's R bytes.
        let expected_R = scalar_mul::double_mul_public(
            &signature.s,
            &ProjectivePoint::generator(),
            &k,
            &-self.point,
        );

        compress(&expected_R) == signature.R_bytes
    }

    /// Verify a 64-byte wire signature on a message.
    ///
    /// Malformed signatures (including `s` out of range) verify as false.
    #[must_use]
    pub fn is_valid_bytes(
        &self,
        message: &[u8],
        signature: &[u8; SIGNATURE_LENGTH],
    ) -> bool {
        match Signature::from_bytes(signature) {
            Ok(signature) => self.is_valid(message, &signature),
            Err(_) => false,
        }
    }
}

impl From<ProjectivePoint> for VerifyingKey {
    fn from(point: ProjectivePoint) -> Self {
        VerifyingKey::from_point(point)
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn zero_seed_public_key() {
        let signing_key = SigningKey::from_bytes(&[0u8; SECRET_KEY_LENGTH]);
        assert_eq!(
            signing_key.verifying_key().to_bytes(),
            hex!("3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29"),
        );
    }

    #[test]
    fn rfc8032_test_vector_1() {
        let seed =
            hex!("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60");
        let signing_key = SigningKey::from_bytes(&seed);
        assert_eq!(
            signing_key.verifying_key().to_bytes(),
            hex!("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"),
        );

        let signature = signing_key.sign(b"");
        assert_eq!(
            signature.to_bytes().as_slice(),
            hex!(
                "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155"
                "5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
            ),
        );
        assert!(signing_key.is_valid_signature(b"", &signature));
    }

    #[test]
    fn rfc8032_test_vector_2() {
        let seed =
            hex!("4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb");
        let signing_key = SigningKey::from_bytes(&seed);
        assert_eq!(
            signing_key.verifying_key().to_bytes(),
            hex!("3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c"),
        );

        let message = [0x72u8];
        let signature = signing_key.sign(&message);
        assert_eq!(
            signature.to_bytes().as_slice(),
            hex!(
                "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da"
                "085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00"
            ),
        );
        assert!(signing_key.is_valid_signature(&message, &signature));
    }

    #[test]
    fn high_s_signatures_are_rejected() {
        let signing_key = SigningKey::from_bytes(&[7u8; SECRET_KEY_LENGTH]);
        let mut bytes = signing_key.sign(b"message").to_bytes();

        // Setting any of the top three bits of the final byte puts `s` out
        // of range.
        bytes[63] |= 0xe0;
        assert_eq!(Signature::from_bytes(&bytes), Err(Error::InvalidEncoding));
        assert!(!signing_key
            .verifying_key()
            .is_valid_bytes(b"message", &bytes));
    }

    #[test]
    fn non_canonical_s_is_rejected() {
        let signing_key = SigningKey::from_bytes(&[9u8; SECRET_KEY_LENGTH]);
        let signature = signing_key.sign(b"msg");

        // s + ℓ has the same residue but is a non-canonical encoding.
        // The sum cannot carry: s < ℓ < 2^253.
        let order = <Curve25519FrParam as FpParams<4>>::MODULUS;
        let (sum, carry) =
            signature.s.into_bigint().ct_add_with_carry(&order);
        assert!(!carry);

        let mut bytes = signature.to_bytes();
        bytes[32..].copy_from_slice(&sum.into_bytes_le());
        assert_eq!(Signature::from_bytes(&bytes), Err(Error::InvalidEncoding));
    }

    proptest! {
        #[test]
        fn wide_reduction_matches_bigint_reference(bytes: [u8; 64]) {
            let reduced = reduce_wide(&bytes);

            let order = num_bigint::BigUint::parse_bytes(
                b"7237005577332262213973186563042994240857116359379907606001950938285454250989",
                10,
            ).expect("valid decimal");
            let expected =
                num_bigint::BigUint::from_bytes_le(&bytes) % &order;

            let got = num_bigint::BigUint::from_bytes_le(
                &reduced.into_bigint().into_bytes_le(),
            );
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn muladd_matches_bigint_reference(
            a: [u8; 32],
            b: [u8; 32],
            c: [u8; 32],
        ) {
            let to_scalar =
                |bytes: &[u8; 32]| Scalar::from_bigint(U256::from_bytes_le(bytes));
            let result =
                scalar_muladd(&to_scalar(&a), &to_scalar(&b), &to_scalar(&c));

            let order = num_bigint::BigUint::parse_bytes(
                b"7237005577332262213973186563042994240857116359379907606001950938285454250989",
                10,
            ).expect("valid decimal");
            let big = |bytes: &[u8; 32]| {
                num_bigint::BigUint::from_bytes_le(bytes) % &order
            };
            let expected = (big(&a) * big(&b) + big(&c)) % &order;

            let got = num_bigint::BigUint::from_bytes_le(
                &result.into_bigint().into_bytes_le(),
            );
            prop_assert_eq!(got, expected);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn sign_and_verify(seed: [u8; 32], message: Vec<u8>) {
            let signing_key = SigningKey::from_bytes(&seed);
            let signature = signing_key.sign(&message);
            prop_assert!(
                signing_key.is_valid_signature(&message, &signature)
            );

            // Wire round-trip preserves validity.
            let reparsed = Signature::from_bytes(&signature.to_bytes())
                .expect("produced signatures are canonical");
            prop_assert!(
                signing_key.is_valid_signature(&message, &reparsed)
            );
        }

        #[test]
        fn flipped_bits_invalidate(
            seed: [u8; 32],
            message: Vec<u8>,
            bit in 0usize..512,
        ) {
            let signing_key = SigningKey::from_bytes(&seed);
            let mut bytes = signing_key.sign(&message).to_bytes();
            bytes[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(!signing_key
                .verifying_key()
                .is_valid_bytes(&message, &bytes));
        }

        #[test]
        fn flipped_message_invalidates(seed: [u8; 32], message: Vec<u8>) {
            prop_assume!(!message.is_empty());
            let signing_key = SigningKey::from_bytes(&seed);
            let signature = signing_key.sign(&message);

            let mut tampered = message.clone();
            tampered[0] ^= 1;
            prop_assert!(
                !signing_key.is_valid_signature(&tampered, &signature)
            );
        }
    }
}
