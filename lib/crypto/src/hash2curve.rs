//! Hashing byte strings to elliptic curve points, following the IRTF
//! [hash-to-curve] construction with SHA-512: `expand_message_xmd`,
//! `hash_to_field`, and the simplified SWU map for `a = -3` curves.
//!
//! Suites are provided for P-384 (`Z = -12`) and P-521 (`Z = -4`). Both
//! curves have cofactor one, so no cofactor clearing is performed.
//!
//! Inputs to these functions are public (domain separation tags and token
//! nonces), so none of the data-dependent work here involves secrets.
//!
//! [hash-to-curve]: https://www.rfc-editor.org/rfc/rfc9380

use alloc::vec::Vec;

use num_traits::Zero;
use sha2::{Digest, Sha512};

use crate::{
    arithmetic::uint::WideUint,
    curve::{
        sw::{
            instance::{
                p384::{P384Config, P384FqParam},
                p521::{P521Config, P521FqParam},
            },
            Affine, SWCurveConfig,
        },
        AffineRepr, CurveGroup,
    },
    field::{
        fp::{Fp, FpParams, LIMBS_384, LIMBS_576},
        group::AdditiveGroup,
        prime::PrimeField,
        Field,
    },
    fp_from_num,
};

/// Output size of the underlying hash in bytes.
const B_IN_BYTES: usize = 64;

/// Prefix hashed over oversized domain separation tags.
const OVERSIZE_DST_PREFIX: &[u8] = b"H2C-OVERSIZE-DST-";

/// A short Weierstrass curve that supports hashing to points via the
/// simplified SWU map.
pub trait HashToCurveSuite: SWCurveConfig
where
    Self::BaseField: PrimeField,
{
    /// Bytes of hash output consumed per field element:
    /// `L = ceil((ceil(log2 p) + k) / 8)` for security parameter `k`.
    const L: usize;

    /// The non-square constant `Z` of the simplified SWU map.
    const Z: Self::BaseField;

    /// Hashes `msg` under domain separation tag `dst` to `count` field
    /// elements.
    fn hash_to_field(
        msg: &[u8],
        dst: &[u8],
        count: usize,
    ) -> Vec<Self::BaseField>;
}

/// The `expand_message_xmd` construction with SHA-512.
///
/// Produces `len` uniform bytes from `msg` under domain separation tag
/// `dst`. Tags of 256 bytes or more are first replaced by their hash.
///
/// # Panics
///
/// Panics if more than `255 * 64` output bytes are requested.
#[must_use]
pub fn expand_message_xmd(msg: &[u8], dst: &[u8], len: usize) -> Vec<u8> {
    let ell = len.div_ceil(B_IN_BYTES);
    assert!(ell <= 255, "requested too much output");

    let shortened_dst;
    let dst = if dst.len() >= 256 {
        let mut h = Sha512::new();
        h.update(OVERSIZE_DST_PREFIX);
        h.update(dst);
        shortened_dst = h.finalize();
        &shortened_dst[..]
    } else {
        dst
    };
    let dst_len = u8::try_from(dst.len()).expect("tag fits one byte");

    // b_0 = H(Z_pad || msg || l_i_b_str || 0x00 || DST_prime), with
    // DST_prime = DST || len(DST) and Z_pad one hash input block of zeroes.
    let mut h = Sha512::new();
    h.update([0u8; 128]);
    h.update(msg);
    h.update(u16::try_from(len).expect("length fits two bytes").to_be_bytes());
    h.update([0u8]);
    h.update(dst);
    h.update([dst_len]);
    let b_0 = h.finalize();

    // b_i = H((b_0 xor b_{i-1}) || i || DST_prime), with b_0 standing in
    // for the xor on the first round.
    let mut out = Vec::with_capacity(ell * B_IN_BYTES);
    let mut b_prev = [0u8; B_IN_BYTES];
    for i in 1..=ell {
        let mut block = [0u8; B_IN_BYTES];
        for (xored, (b0_byte, prev_byte)) in
            block.iter_mut().zip(b_0.iter().zip(b_prev.iter()))
        {
            *xored = b0_byte ^ prev_byte;
        }

        let mut h = Sha512::new();
        h.update(block);
        h.update([u8::try_from(i).expect("ell fits one byte")]);
        h.update(dst);
        h.update([dst_len]);
        b_prev.copy_from_slice(&h.finalize());
        out.extend_from_slice(&b_prev);
    }

    out.truncate(len);
    out
}

/// Hashes `msg` to `count` elements of the field described by `P`,
/// deriving `l` big-endian bytes per element and reducing each modulo the
/// field order.
fn hash_to_field_fp<P: FpParams<N>, const N: usize>(
    msg: &[u8],
    dst: &[u8],
    count: usize,
    l: usize,
) -> Vec<Fp<P, N>> {
    assert!(l <= 16 * N, "derived bytes must fit the wide width");
    let bytes = expand_message_xmd(msg, dst, count * l);
    bytes
        .chunks(l)
        .map(|chunk| {
            let wide = WideUint::<N>::from_be_slice(chunk);
            Fp::from_bigint(wide.ct_rem(&P::MODULUS))
        })
        .collect()
}

/// Evaluates the curve polynomial `g(x) = x³ + a x + b`.
fn curve_polynomial<P: SWCurveConfig>(x: P::BaseField) -> P::BaseField {
    P::add_b(x.square() * x + P::mul_by_a(x))
}

/// The sign of a field element: the parity of its canonical
/// representative.
fn sgn0<F: PrimeField>(f: &F) -> bool {
    use crate::arithmetic::BigInteger;
    f.into_bigint().is_odd()
}

/// The simplified Shallue–van de Woestijne–Ulas map for `a = -3` curves,
/// sending a field element to a curve point.
#[must_use]
pub fn map_to_curve_sswu<P: HashToCurveSuite>(u: &P::BaseField) -> Affine<P>
where
    P::BaseField: PrimeField,
{
    let a = P::COEFF_A;
    let b = P::COEFF_B;

    // tv1 = 1 / (Z² u⁴ + Z u²), zero when the denominator vanishes.
    let zu2 = P::Z * u.square();
    let denominator = zu2.square() + zu2;
    let tv1 = denominator
        .inverse()
        .unwrap_or(<P::BaseField as AdditiveGroup>::ZERO);

    let minus_b_over_a =
        -b * a.inverse().expect("curve coefficient a is invertible");
    let x1 = if tv1.is_zero() {
        // Exceptional case: x1 = B / (Z A).
        b * (P::Z * a).inverse().expect("Z and a are non-zero")
    } else {
        minus_b_over_a * (<P::BaseField as Field>::ONE + tv1)
    };
    let gx1 = curve_polynomial::<P>(x1);

    let x2 = zu2 * x1;
    let gx2 = curve_polynomial::<P>(x2);

    // Exactly one of gx1, gx2 is a square for u outside a negligible set.
    let (x, mut y) = if gx1.is_square() {
        (x1, gx1.sqrt().expect("gx1 verified square"))
    } else {
        (x2, gx2.sqrt().expect("one of gx1, gx2 is a square"))
    };

    if sgn0(u) != sgn0(&y) {
        y = -y;
    }
    Affine::new_unchecked(x, y)
}

/// Hashes `msg` under `dst` to a point of the prime-order group:
/// `map(u0) + map(u1)` for `(u0, u1) = hash_to_field(msg, 2)`.
#[must_use]
pub fn hash_to_curve<P: HashToCurveSuite>(msg: &[u8], dst: &[u8]) -> Affine<P>
where
    P::BaseField: PrimeField,
{
    let u = P::hash_to_field(msg, dst, 2);
    let q0 = map_to_curve_sswu::<P>(&u[0]);
    let q1 = map_to_curve_sswu::<P>(&u[1]);
    // The cofactor is one for every supported suite; no clearing needed.
    (q0.into_group() + q1).into_affine()
}

impl HashToCurveSuite for P384Config {
    // L = ceil((384 + 192) / 8)
    const L: usize = 72;
    const Z: Self::BaseField = fp_from_num!("12").ct_neg();

    fn hash_to_field(
        msg: &[u8],
        dst: &[u8],
        count: usize,
    ) -> Vec<Self::BaseField> {
        hash_to_field_fp::<P384FqParam, LIMBS_384>(msg, dst, count, Self::L)
    }
}

impl HashToCurveSuite for P521Config {
    // L = ceil((521 + 256) / 8)
    const L: usize = 98;
    const Z: Self::BaseField = fp_from_num!("4").ct_neg();

    fn hash_to_field(
        msg: &[u8],
        dst: &[u8],
        count: usize,
    ) -> Vec<Self::BaseField> {
        hash_to_field_fp::<P521FqParam, LIMBS_576>(msg, dst, count, Self::L)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    const DST_P521: &[u8] = b"QUUX-V01-CS02-with-P521_XMD:SHA-512_SSWU_RO_";
    const DST_P384: &[u8] = b"QUUX-V01-CS02-with-P384_XMD:SHA-512_SSWU_RO_";

    #[test]
    fn expand_message_lengths_and_determinism() {
        for len in [1usize, 32, 64, 65, 128, 255] {
            let out = expand_message_xmd(b"abc", b"DST", len);
            assert_eq!(out.len(), len);
            assert_eq!(out, expand_message_xmd(b"abc", b"DST", len));
        }

        // The requested length is hashed into b_0, so different lengths
        // give unrelated outputs.
        let short = expand_message_xmd(b"abc", b"DST", 40);
        let long = expand_message_xmd(b"abc", b"DST", 200);
        assert_ne!(short.as_slice(), &long[..40]);
    }

    #[test]
    fn expand_message_domain_separation() {
        let a = expand_message_xmd(b"msg", b"tag-one", 64);
        let b = expand_message_xmd(b"msg", b"tag-two", 64);
        assert_ne!(a, b);

        let c = expand_message_xmd(b"other", b"tag-one", 64);
        assert_ne!(a, c);
    }

    #[test]
    fn oversize_dst_is_hashed_down() {
        let long_dst = vec![0x41u8; 300];
        let out = expand_message_xmd(b"msg", &long_dst, 64);
        assert_eq!(out.len(), 64);

        // The oversized tag must behave like its hashed replacement, not
        // like a truncation.
        let truncated = expand_message_xmd(b"msg", &long_dst[..255], 64);
        assert_ne!(out, truncated);
    }

    #[test]
    fn p521_suite_test_vectors() {
        use hex_literal::hex;

        // P521_XMD:SHA-512_SSWU_RO_, msg = "".
        let p = hash_to_curve::<P521Config>(b"", DST_P521);
        let bytes = p.to_uncompressed_bytes().unwrap();
        assert_eq!(
            bytes[1..67],
            hex!(
                "00fd767cebb2452030358d0e9cf907f525f50920c8f607889a6a35680727"
                "f64f4d66b161fafeb2654bea0d35086bec0a10b30b14adef3556ed9f7f1b"
                "c23cecc9c088"
            ),
        );
        assert_eq!(
            bytes[67..],
            hex!(
                "0169ba78d8d851e930680322596e39c78f4fe31b97e57629ef6460ddd68f"
                "8763fd7bd767a4e94a80d3d21a3c2ee98347e024fc73ee1c27166dc3fe5e"
                "eef782be411d"
            ),
        );

        // msg = "abc".
        let p = hash_to_curve::<P521Config>(b"abc", DST_P521);
        let bytes = p.to_uncompressed_bytes().unwrap();
        assert_eq!(
            bytes[1..67],
            hex!(
                "002f89a1677b28054b50d15e1f81ed6669b5a2158211118ebdef8a6efc77"
                "f8ccaa528f698214e4340155abc1fa08f8f613ef14a043717503d57e267d"
                "57155cf784a4"
            ),
        );
    }

    #[test]
    fn p521_hash_to_curve_is_on_curve_and_deterministic() {
        for msg in [b"".as_slice(), b"abc", b"abcdef0123456789"] {
            let p = hash_to_curve::<P521Config>(msg, DST_P521);
            assert!(p.is_on_curve());
            assert!(!p.is_zero());
            assert_eq!(p, hash_to_curve::<P521Config>(msg, DST_P521));
        }

        let a = hash_to_curve::<P521Config>(b"x", DST_P521);
        let b = hash_to_curve::<P521Config>(b"y", DST_P521);
        assert_ne!(a, b);
    }

    #[test]
    fn p384_hash_to_curve_is_on_curve_and_deterministic() {
        for msg in [b"".as_slice(), b"abc", b"a-longer-test-message"] {
            let p = hash_to_curve::<P384Config>(msg, DST_P384);
            assert!(p.is_on_curve());
            assert!(!p.is_zero());
            assert_eq!(p, hash_to_curve::<P384Config>(msg, DST_P384));
        }
    }

    #[test]
    fn sswu_map_outputs_lie_on_the_curve() {
        let u = P384Config::hash_to_field(b"map-input", DST_P384, 2);
        for u_i in &u {
            let p = map_to_curve_sswu::<P384Config>(u_i);
            assert!(p.is_on_curve());
        }
    }
}
