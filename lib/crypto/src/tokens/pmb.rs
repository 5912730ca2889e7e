//! PMBTokens: anonymous tokens carrying one bit of issuer-private
//! metadata, over P-384.
//!
//! The issuer holds six scalars `(x0, y0, x1, y1, xs, ys)` and publishes
//! `pub_b = x_b·G + y_b·H` for the two metadata branches plus
//! `pubs = xs·G + ys·H` for the validity key, where `H` is a curve
//! constant derived by hash-to-curve. Issuance signs blinded tokens under
//! the branch key selected by the private bit, with a batched DLEQ proof
//! for the validity key and a batched DLEQOR proof hiding the branch.
//!
//! Issuance is constant-time in the issuer scalars and the private bit.
//! Redemption recovers the bit by recomputing both branch points.

use alloc::vec::Vec;

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    curve::{
        sw::{instance::p384::P384Config, scalar_mul},
        AffineRepr, CurveGroup,
    },
    error::Error,
    field::Field,
    hash2curve,
    tokens::{
        aggregate, batch_challenges,
        dleq::{DleqBases, DleqOrProof, DleqProof},
        encode_point, put_u16, random_nonzero_scalar, Point, PreToken,
        Reader, Scalar, NONCE_LEN, POINT_LEN,
    },
};

/// Domain separation tag of the token-nonce hash `H_t`.
const HASH_T_DST: &[u8] = b"PMBTokens V1 HashT";
/// Domain separation tag of the issuance-nonce hash `H_s`.
const HASH_S_DST: &[u8] = b"PMBTokens V1 HashS";
/// Domain separation tag of the `H` generator derivation.
const HASH_H_DST: &[u8] = b"PMBTokens V1 HashH";
/// Challenge label of the batched validity DLEQ proof.
const DLEQ_LABEL: &[u8] = b"PMBTokens V1 DLEQ";
/// Challenge label of the batched DLEQOR proof.
const DLEQOR_LABEL: &[u8] = b"PMBTokens V1 DLEQOR";

lazy_static::lazy_static! {
    /// The curve constant `H`, fixed once per process.
    static ref H_GENERATOR: Point =
        hash2curve::hash_to_curve::<P384Config>(b"generator", HASH_H_DST);
}

/// Hashes a token nonce to a curve point: `T = H_t(t)`.
fn hash_t(nonce: &[u8; NONCE_LEN]) -> Point {
    hash2curve::hash_to_curve::<P384Config>(nonce, HASH_T_DST)
}

/// Hashes a blinded token point and issuance nonce to a curve point:
/// `S' = H_s(T', s)`.
fn hash_s(blinded: &Point, nonce: &[u8; NONCE_LEN]) -> Point {
    let mut msg = Vec::with_capacity(POINT_LEN + NONCE_LEN);
    msg.extend_from_slice(&super::encode_point_infallible(blinded));
    msg.extend_from_slice(nonce);
    hash2curve::hash_to_curve::<P384Config>(&msg, HASH_S_DST)
}

/// The issuer's public key: the three key commitments.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey {
    /// Identifier the issuer assigned to this key generation.
    pub key_id: u32,
    pub0: Point,
    pub1: Point,
    pubs: Point,
}

/// The issuer's secret key: six scalars and the public commitments.
///
/// Secret scalars are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct IssuerKey {
    x0: Scalar,
    y0: Scalar,
    x1: Scalar,
    y1: Scalar,
    xs: Scalar,
    ys: Scalar,
    #[zeroize(skip)]
    public: PublicKey,
}

impl IssuerKey {
    /// Samples a fresh issuer key.
    pub fn generate(
        rng: &mut impl rand_core::CryptoRngCore,
        key_id: u32,
    ) -> Self {
        let h = *H_GENERATOR;
        let commit = |x: &Scalar, y: &Scalar| {
            scalar_mul::multi_mul_ct(&[
                (Point::generator(), *x),
                (h, *y),
            ])
            .into_affine()
        };

        let x0 = random_nonzero_scalar(rng);
        let y0 = random_nonzero_scalar(rng);
        let x1 = random_nonzero_scalar(rng);
        let y1 = random_nonzero_scalar(rng);
        let xs = random_nonzero_scalar(rng);
        let ys = random_nonzero_scalar(rng);

        let public = PublicKey {
            key_id,
            pub0: commit(&x0, &y0),
            pub1: commit(&x1, &y1),
            pubs: commit(&xs, &ys),
        };
        Self { x0, y0, x1, y1, xs, ys, public }
    }

    /// The public half of this key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Signs a batch of blinded tokens under the branch selected by the
    /// private metadata bit, emitting the issuance response.
    ///
    /// The response carries, per token, the 64-byte issuance nonce `s`
    /// and the points `W' = x_b·T' + y_b·S'`, `Ws' = xs·T' + ys·S'`,
    /// followed by the length-prefixed batched DLEQOR and DLEQ proofs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] on a malformed request.
    pub fn sign(
        &self,
        rng: &mut impl rand_core::CryptoRngCore,
        request: &[u8],
        private_bit: bool,
    ) -> Result<Vec<u8>, Error> {
        let mut reader = Reader::new(request);
        let count = reader.take_u16()?;
        let mut blinded = Vec::with_capacity(count);
        for _ in 0..count {
            blinded.push(reader.take_point()?);
        }
        reader.finish()?;

        // Branch key selection by mask only.
        let branch = Choice::from(u8::from(private_bit));
        let xb = Scalar::conditional_select(&self.x0, &self.x1, branch);
        let yb = Scalar::conditional_select(&self.y0, &self.y1, branch);

        let mut nonces = Vec::with_capacity(count);
        let mut s_points = Vec::with_capacity(count);
        let mut w_points = Vec::with_capacity(count);
        let mut ws_points = Vec::with_capacity(count);
        for blinded_point in &blinded {
            let mut nonce = [0u8; NONCE_LEN];
            rng.fill_bytes(&mut nonce);
            let s_point = hash_s(blinded_point, &nonce);

            let w = scalar_mul::multi_mul_ct(&[
                (*blinded_point, xb),
                (s_point, yb),
            ])
            .into_affine();
            let ws = scalar_mul::multi_mul_ct(&[
                (*blinded_point, self.xs),
                (s_point, self.ys),
            ])
            .into_affine();

            nonces.push(nonce);
            s_points.push(s_point);
            w_points.push(w);
            ws_points.push(ws);
        }

        let (bases, w_batch, ws_batch) = batch_transcript(
            &self.public,
            &blinded,
            &s_points,
            &w_points,
            &ws_points,
        )?;

        let dleq = DleqProof::prove(
            rng,
            DLEQ_LABEL,
            &bases,
            &self.public.pubs,
            &ws_batch,
            &self.xs,
            &self.ys,
        );
        let dleqor = DleqOrProof::prove(
            rng,
            DLEQOR_LABEL,
            &bases,
            &[self.public.pub0, self.public.pub1],
            &w_batch,
            branch,
            &xb,
            &yb,
        );

        let mut response = Vec::new();
        put_u16(&mut response, count);
        for i in 0..count {
            response.extend_from_slice(&nonces[i]);
            response.extend_from_slice(&encode_point(&w_points[i])?);
            response.extend_from_slice(&encode_point(&ws_points[i])?);
        }
        let proof_len = DleqOrProof::BYTES + DleqProof::BYTES;
        put_u16(&mut response, proof_len);
        response.extend_from_slice(&dleqor.to_bytes());
        response.extend_from_slice(&dleq.to_bytes());
        Ok(response)
    }

    /// Redeems a token: checks validity and recovers the private
    /// metadata bit.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidEncoding`] when the token was issued under a
    ///   different key.
    /// * [`Error::ValidityCheckFailed`] when `xs·T + ys·S != Ws`.
    /// * [`Error::BadPrivateBit`] when neither or both branch points
    ///   match.
    pub fn redeem(&self, token: &Token) -> Result<bool, Error> {
        if token.key_id != self.public.key_id {
            return Err(Error::InvalidEncoding);
        }

        let t = hash_t(&token.nonce);

        let expected_ws = scalar_mul::multi_mul_ct(&[
            (t, self.xs),
            (token.s, self.ys),
        ])
        .into_affine();
        if !bool::from(expected_ws.ct_eq(&token.ws)) {
            return Err(Error::ValidityCheckFailed);
        }

        let w0 = scalar_mul::multi_mul_ct(&[(t, self.x0), (token.s, self.y0)])
            .into_affine();
        let w1 = scalar_mul::multi_mul_ct(&[(t, self.x1), (token.s, self.y1)])
            .into_affine();
        let matches_0 = bool::from(w0.ct_eq(&token.w));
        let matches_1 = bool::from(w1.ct_eq(&token.w));
        match (matches_0, matches_1) {
            (true, false) => Ok(false),
            (false, true) => Ok(true),
            _ => Err(Error::BadPrivateBit),
        }
    }
}

/// A redeemable token.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    /// Identifier of the issuing key generation.
    pub key_id: u32,
    /// The 64-byte token nonce `t`.
    pub nonce: [u8; NONCE_LEN],
    pub(crate) s: Point,
    pub(crate) w: Point,
    pub(crate) ws: Point,
}

impl Token {
    /// Serializes the token: key id, nonce, and the unblinded points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointAtInfinity`] if any stored point is the
    /// identity, which cannot happen for honestly issued tokens.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(4 + NONCE_LEN + 3 * POINT_LEN);
        out.extend_from_slice(&self.key_id.to_be_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&encode_point(&self.s)?);
        out.extend_from_slice(&encode_point(&self.w)?);
        out.extend_from_slice(&encode_point(&self.ws)?);
        Ok(out)
    }

    /// Parses a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] on malformed frames and
    /// [`Error::NotOnCurve`] for invalid points.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(bytes);
        let key_id_bytes = reader.take(4)?;
        let key_id = u32::from_be_bytes(
            key_id_bytes.try_into().expect("four bytes were taken"),
        );
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(reader.take(NONCE_LEN)?);
        let s = reader.take_point()?;
        let w = reader.take_point()?;
        let ws = reader.take_point()?;
        reader.finish()?;
        Ok(Self { key_id, nonce, s, w, ws })
    }
}

/// Blinds a batch of fresh token nonces, returning the client state and
/// the issuance request.
pub fn blind_batch(
    rng: &mut impl rand_core::CryptoRngCore,
    count: usize,
) -> (Vec<PreToken>, Vec<u8>) {
    let mut pretokens = Vec::with_capacity(count);
    let mut request = Vec::with_capacity(2 + count * POINT_LEN);
    put_u16(&mut request, count);

    for _ in 0..count {
        let mut nonce = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut nonce);
        let t = hash_t(&nonce);

        let blinding = random_nonzero_scalar(rng);
        let inverse = blinding
            .inverse()
            .expect("blinding scalar sampled non-zero");
        let blinded = scalar_mul::mul_ct(&t, &inverse).into_affine();

        request.extend_from_slice(
            &encode_point(&blinded).expect("hash-to-curve output is not the identity"),
        );
        pretokens.push(PreToken { nonce, blinding, blinded });
    }
    (pretokens, request)
}

/// Unblinds an issuance response, verifying the batched proofs against
/// the issuer public key.
///
/// # Errors
///
/// * [`Error::InvalidEncoding`] on malformed frames or a count mismatch.
/// * [`Error::ProofInvalid`] when either batched proof fails.
pub fn unblind(
    public: &PublicKey,
    pretokens: &[PreToken],
    response: &[u8],
) -> Result<Vec<Token>, Error> {
    let mut reader = Reader::new(response);
    let count = reader.take_u16()?;
    if count != pretokens.len() {
        return Err(Error::InvalidEncoding);
    }

    let mut nonces = Vec::with_capacity(count);
    let mut w_points = Vec::with_capacity(count);
    let mut ws_points = Vec::with_capacity(count);
    for _ in 0..count {
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(reader.take(NONCE_LEN)?);
        nonces.push(nonce);
        w_points.push(reader.take_point()?);
        ws_points.push(reader.take_point()?);
    }
    let proof_len = reader.take_u16()?;
    if proof_len != DleqOrProof::BYTES + DleqProof::BYTES {
        return Err(Error::InvalidEncoding);
    }
    let dleqor = DleqOrProof::from_reader(&mut reader)?;
    let dleq = DleqProof::from_reader(&mut reader)?;
    reader.finish()?;

    // Recompute S' per token and the batch aggregates, then check both
    // proofs before unblinding anything.
    let blinded: Vec<Point> =
        pretokens.iter().map(PreToken::blinded_point).collect();
    let s_points: Vec<Point> = blinded
        .iter()
        .zip(&nonces)
        .map(|(blinded_point, nonce)| hash_s(blinded_point, nonce))
        .collect();

    let (bases, w_batch, ws_batch) =
        batch_transcript(public, &blinded, &s_points, &w_points, &ws_points)?;

    dleq.verify(DLEQ_LABEL, &bases, &public.pubs, &ws_batch)?;
    dleqor.verify(
        DLEQOR_LABEL,
        &bases,
        &[public.pub0, public.pub1],
        &w_batch,
    )?;

    let mut tokens = Vec::with_capacity(count);
    for (i, pretoken) in pretokens.iter().enumerate() {
        let r = &pretoken.blinding;
        let s = scalar_mul::mul_ct(&s_points[i], r).into_affine();
        let w = scalar_mul::mul_ct(&w_points[i], r).into_affine();
        let ws = scalar_mul::mul_ct(&ws_points[i], r).into_affine();
        tokens.push(Token {
            key_id: public.key_id,
            nonce: pretoken.nonce,
            s,
            w,
            ws,
        });
    }
    Ok(tokens)
}

/// Builds the batched DLEQ bases and aggregates from the issuance
/// transcript: challenges `e_i` over the whole exchange, then
/// `T̃ = Σ e_i·T'_i` and friends.
fn batch_transcript(
    public: &PublicKey,
    blinded: &[Point],
    s_points: &[Point],
    w_points: &[Point],
    ws_points: &[Point],
) -> Result<(DleqBases, Point, Point), Error> {
    let mut transcript = Vec::new();
    transcript.extend_from_slice(&public.key_id.to_be_bytes());
    for point in [&public.pub0, &public.pub1, &public.pubs] {
        transcript.extend_from_slice(&encode_point(point)?);
    }
    for points in [blinded, s_points, w_points, ws_points] {
        for point in points {
            transcript.extend_from_slice(&encode_point(point)?);
        }
    }

    let challenges = batch_challenges(&transcript, blinded.len());
    let t_batch = aggregate(blinded, &challenges);
    let s_batch = aggregate(s_points, &challenges);
    let w_batch = aggregate(w_points, &challenges);
    let ws_batch = aggregate(ws_points, &challenges);

    let bases = DleqBases {
        g0: Point::generator(),
        g1: *H_GENERATOR,
        t0: t_batch,
        t1: s_batch,
    };
    Ok((bases, w_batch, ws_batch))
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;

    fn issue_batch(
        issuer: &IssuerKey,
        count: usize,
        private_bit: bool,
    ) -> (Vec<PreToken>, Vec<u8>) {
        let (pretokens, request) = blind_batch(&mut OsRng, count);
        let response = issuer
            .sign(&mut OsRng, &request, private_bit)
            .expect("well-formed request");
        (pretokens, response)
    }

    #[test]
    fn issuance_and_redemption_roundtrip() {
        let issuer = IssuerKey::generate(&mut OsRng, 7);
        let public = issuer.public_key();

        let (pretokens, response) = issue_batch(&issuer, 8, true);
        let tokens = unblind(&public, &pretokens, &response)
            .expect("honest issuance verifies");
        assert_eq!(tokens.len(), 8);

        for token in &tokens {
            assert_eq!(issuer.redeem(token), Ok(true));
        }
    }

    #[test]
    fn private_bit_zero_roundtrip() {
        let issuer = IssuerKey::generate(&mut OsRng, 1);
        let public = issuer.public_key();

        let (pretokens, response) = issue_batch(&issuer, 3, false);
        let tokens = unblind(&public, &pretokens, &response)
            .expect("honest issuance verifies");
        for token in &tokens {
            assert_eq!(issuer.redeem(token), Ok(false));
        }
    }

    #[test]
    fn tampered_response_fails_verification() {
        let issuer = IssuerKey::generate(&mut OsRng, 2);
        let public = issuer.public_key();

        let (pretokens, mut response) = issue_batch(&issuer, 2, true);
        // Flip one bit inside the first issued point.
        let offset = 2 + NONCE_LEN + 10;
        response[offset] ^= 1;

        let result = unblind(&public, &pretokens, &response);
        assert!(matches!(
            result,
            Err(Error::ProofInvalid)
                | Err(Error::NotOnCurve)
                | Err(Error::InvalidEncoding)
        ));
    }

    #[test]
    fn truncated_response_is_rejected() {
        let issuer = IssuerKey::generate(&mut OsRng, 2);
        let public = issuer.public_key();

        let (pretokens, response) = issue_batch(&issuer, 2, false);
        let truncated = &response[..response.len() - 1];
        assert_eq!(
            unblind(&public, &pretokens, truncated),
            Err(Error::InvalidEncoding),
        );
    }

    #[test]
    fn token_wire_roundtrip() {
        let issuer = IssuerKey::generate(&mut OsRng, 4);
        let public = issuer.public_key();

        let (pretokens, response) = issue_batch(&issuer, 1, true);
        let tokens = unblind(&public, &pretokens, &response).unwrap();

        let bytes = tokens[0].to_bytes().unwrap();
        let reparsed = Token::from_bytes(&bytes).unwrap();
        assert_eq!(reparsed, tokens[0]);
        assert_eq!(issuer.redeem(&reparsed), Ok(true));
    }

    #[test]
    fn forged_token_fails_validity() {
        let issuer = IssuerKey::generate(&mut OsRng, 9);
        let public = issuer.public_key();

        let (pretokens, response) = issue_batch(&issuer, 1, true);
        let mut token = unblind(&public, &pretokens, &response)
            .unwrap()
            .remove(0);

        // A different nonce breaks the validity relation.
        token.nonce[0] ^= 1;
        assert_eq!(
            issuer.redeem(&token),
            Err(Error::ValidityCheckFailed),
        );
    }

    #[test]
    fn swapped_w_fails_private_bit_recovery() {
        let issuer = IssuerKey::generate(&mut OsRng, 3);
        let public = issuer.public_key();

        let (pretokens, response) = issue_batch(&issuer, 2, true);
        let tokens = unblind(&public, &pretokens, &response).unwrap();

        // Valid Ws from one token with W from another keeps validity but
        // breaks bit recovery.
        let mut crossed = tokens[0].clone();
        crossed.w = tokens[1].w;
        assert_eq!(issuer.redeem(&crossed), Err(Error::BadPrivateBit));
    }
}
