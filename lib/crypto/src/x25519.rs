//! X25519 Diffie–Hellman key agreement over Curve25519 ([RFC 7748]).
//!
//! The scalar multiplication is a Montgomery ladder driven by one
//! conditional swap per bit, keyed by the XOR of the current and previous
//! scalar bits. Scalars are clamped on use; all-zero shared secrets
//! (small-subgroup peer points) are rejected.
//!
//! [RFC 7748]: https://www.rfc-editor.org/rfc/rfc7748

use num_traits::One;
use subtle::{Choice, ConditionallySelectable};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    arithmetic::{uint::U256, BigInteger},
    curve::te::{
        instance::curve25519::{Curve25519Config, Fq},
        MontCurveConfig,
    },
    error::Error,
    field::{prime::PrimeField, Field},
};

/// Length in bytes of X25519 public keys, private keys, and shared
/// secrets.
pub const KEY_LEN: usize = 32;

/// The u-coordinate of the Montgomery-form base point.
const BASEPOINT_U: [u8; KEY_LEN] = {
    let mut bytes = [0u8; KEY_LEN];
    bytes[0] = 9;
    bytes
};

/// Clamps the given little-endian representation of a 32-byte scalar:
/// clears the low three bits, clears the top bit, and sets bit 254.
#[must_use]
pub const fn clamp_scalar(mut bytes: [u8; KEY_LEN]) -> [u8; KEY_LEN] {
    bytes[0] &= 0b1111_1000;
    bytes[31] &= 0b0111_1111;
    bytes[31] |= 0b0100_0000;
    bytes
}

/// `(A - 2) / 4` for the Montgomery coefficient `A = 486662`.
fn a24() -> Fq {
    let a = <Curve25519Config as MontCurveConfig>::COEFF_A;
    (a - Fq::from(2u8)).div_by_2().div_by_2()
}

/// Decodes a peer u-coordinate, masking the unused top bit. Values at or
/// above the field modulus reduce modulo `p`.
fn decode_u(bytes: &[u8; KEY_LEN]) -> Fq {
    let mut bytes = *bytes;
    bytes[31] &= 0x7f;
    Fq::from_bigint(U256::from_bytes_le(&bytes))
}

/// Computes `scalar * point` on the Montgomery curve, returning the
/// little-endian u-coordinate of the result.
///
/// # Errors
///
/// Returns [`Error::SmallSubgroup`] when the output is all-zero, which
/// happens exactly when the peer point is in a small subgroup.
pub fn x25519(
    scalar: &[u8; KEY_LEN],
    point: &[u8; KEY_LEN],
) -> Result<[u8; KEY_LEN], Error> {
    let mut k = clamp_scalar(*scalar);
    let x1 = decode_u(point);

    let mut x2 = Fq::one();
    let mut z2 = Fq::ZERO;
    let mut x3 = x1;
    let mut z3 = Fq::one();

    let a24 = a24();
    let mut swap = Choice::from(0);
    for t in (0..255).rev() {
        let k_t = Choice::from((k[t / 8] >> (t % 8)) & 1);
        swap ^= k_t;
        Fq::conditional_swap(&mut x2, &mut x3, swap);
        Fq::conditional_swap(&mut z2, &mut z3, swap);
        swap = k_t;

        let a = x2 + z2;
        let aa = a.square();
        let b = x2 - z2;
        let bb = b.square();
        let e = aa - bb;
        let c = x3 + z3;
        let d = x3 - z3;
        let da = d * a;
        let cb = c * b;
        x3 = (da + cb).square();
        z3 = x1 * (da - cb).square();
        x2 = aa * bb;
        z2 = e * (aa + a24 * e);
    }
    Fq::conditional_swap(&mut x2, &mut x3, swap);
    Fq::conditional_swap(&mut z2, &mut z3, swap);
    k.zeroize();

    // z2 = 0 maps to 0 under inv0, so small-subgroup inputs surface as an
    // all-zero output below.
    let u = x2 * z2.inv0();
    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(&u.into_bigint().into_bytes_le());

    if out.iter().all(|&b| b == 0) {
        return Err(Error::SmallSubgroup);
    }
    Ok(out)
}

/// Derives the public key of a private key: `X25519(k, 9)`.
#[must_use]
pub fn x25519_base(scalar: &[u8; KEY_LEN]) -> [u8; KEY_LEN] {
    x25519(scalar, &BASEPOINT_U)
        .expect("the base point is not in a small subgroup")
}

/// An X25519 private key.
///
/// The key material is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StaticSecret([u8; KEY_LEN]);

impl StaticSecret {
    /// Samples a fresh private key.
    pub fn random_from_rng(rng: &mut impl rand_core::CryptoRngCore) -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        self.0
    }

    /// Computes the shared secret with a peer public key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SmallSubgroup`] when the peer key is in a small
    /// subgroup and the shared secret would be all-zero.
    pub fn diffie_hellman(
        &self,
        their_public: &PublicKey,
    ) -> Result<SharedSecret, Error> {
        x25519(&self.0, &their_public.0).map(SharedSecret)
    }
}

impl From<[u8; KEY_LEN]> for StaticSecret {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

/// An X25519 public key: the little-endian u-coordinate of the point
/// `k * 9`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl From<[u8; KEY_LEN]> for PublicKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<&StaticSecret> for PublicKey {
    fn from(secret: &StaticSecret) -> Self {
        Self(x25519_base(&secret.0))
    }
}

/// The result of a key agreement, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; KEY_LEN]);

impl SharedSecret {
    /// Returns the raw shared-secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rfc7748_test_vector() {
        let scalar =
            hex!("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4");
        let point =
            hex!("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c");
        let expected =
            hex!("c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552");
        assert_eq!(x25519(&scalar, &point).unwrap(), expected);
    }

    #[test]
    fn rfc7748_second_test_vector() {
        let scalar =
            hex!("4b66e9d4d1b4673c5ad22691957d6af5c11b6421e0ea01d42ca4169e7918ba0d");
        let point =
            hex!("e5210f12786811d3f4b7959d0538ae2c31dbe7106fc03c3efc4cd549c715a493");
        let expected =
            hex!("95cbde9476e8907d7aade45cb4b873f88b595a68799fa152e6f8f7647aac7957");
        assert_eq!(x25519(&scalar, &point).unwrap(), expected);
    }

    #[test]
    fn rfc7748_key_derivation_and_agreement() {
        let alice = StaticSecret::from(hex!(
            "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a"
        ));
        let bob = StaticSecret::from(hex!(
            "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb"
        ));

        let alice_public = PublicKey::from(&alice);
        let bob_public = PublicKey::from(&bob);
        assert_eq!(
            alice_public.as_bytes(),
            &hex!("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a"),
        );
        assert_eq!(
            bob_public.as_bytes(),
            &hex!("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f"),
        );

        let shared =
            hex!("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");
        assert_eq!(
            alice.diffie_hellman(&bob_public).unwrap().as_bytes(),
            &shared,
        );
        assert_eq!(
            bob.diffie_hellman(&alice_public).unwrap().as_bytes(),
            &shared,
        );
    }

    #[test]
    fn small_order_points_are_rejected() {
        // u = 0 and u = 1 are small-order points; the all-zero output must
        // surface as an error.
        let scalar = [0x42u8; KEY_LEN];
        let zero = [0u8; KEY_LEN];
        assert_eq!(x25519(&scalar, &zero), Err(Error::SmallSubgroup));

        let mut one = [0u8; KEY_LEN];
        one[0] = 1;
        assert_eq!(x25519(&scalar, &one), Err(Error::SmallSubgroup));
    }

    proptest! {
        #[test]
        fn key_agreement_commutes(a: [u8; 32], b: [u8; 32]) {
            let alice = StaticSecret::from(a);
            let bob = StaticSecret::from(b);

            let alice_shared = alice
                .diffie_hellman(&PublicKey::from(&bob))
                .expect("clamped keys never land in a small subgroup");
            let bob_shared = bob
                .diffie_hellman(&PublicKey::from(&alice))
                .expect("clamped keys never land in a small subgroup");
            prop_assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
        }

        #[test]
        fn high_bit_of_peer_point_is_ignored(a: [u8; 32], mut u: [u8; 32]) {
            let with_bit = {
                u[31] |= 0x80;
                x25519(&a, &u)
            };
            let without_bit = {
                u[31] &= 0x7f;
                x25519(&a, &u)
            };
            prop_assert_eq!(with_bit, without_bit);
        }
    }
}
