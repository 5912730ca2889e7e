//! The VOPRF token variant: the PMBToken exchange shape without private
//! metadata.
//!
//! The issuer holds a single scalar `priv` with `pub = priv·G`; signing a
//! blinded token is `W' = priv·T'` with a batched DLEQ proof
//! `log_G(pub) = log_T̃(W̃)`. Redemption recomputes `priv·H_t(t)` and
//! compares it to the stored token point.

use alloc::vec::Vec;

use subtle::ConstantTimeEq;
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
        aggregate, batch_challenges, dleq::SchnorrDleqProof, encode_point,
        put_u16, random_nonzero_scalar, Point, PreToken, Reader, Scalar,
        NONCE_LEN, POINT_LEN,
    },
};

/// Domain separation tag of the token-nonce hash `H_t`.
const HASH_T_DST: &[u8] = b"VOPRF V1 HashT";
/// Challenge label of the batched DLEQ proof.
const DLEQ_LABEL: &[u8] = b"VOPRF V1 DLEQ";

/// Hashes a token nonce to a curve point: `T = H_t(t)`.
fn hash_t(nonce: &[u8; NONCE_LEN]) -> Point {
    hash2curve::hash_to_curve::<P384Config>(nonce, HASH_T_DST)
}

/// The issuer's public key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey {
    /// Identifier the issuer assigned to this key generation.
    pub key_id: u32,
    pub_point: Point,
}

/// The issuer's secret key, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct IssuerKey {
    secret: Scalar,
    #[zeroize(skip)]
    public: PublicKey,
}

impl IssuerKey {
    /// Samples a fresh issuer key.
    pub fn generate(
        rng: &mut impl rand_core::CryptoRngCore,
        key_id: u32,
    ) -> Self {
        let secret = random_nonzero_scalar(rng);
        let pub_point = crate::curve::sw::instance::p384::mul_generator_ct(
            &secret,
        )
        .into_affine();
        Self { secret, public: PublicKey { key_id, pub_point } }
    }

    /// The public half of this key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Signs a batch of blinded tokens: per token `W' = priv·T'`,
    /// followed by the length-prefixed batched DLEQ proof.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] on a malformed request.
    pub fn sign(
        &self,
        rng: &mut impl rand_core::CryptoRngCore,
        request: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut reader = Reader::new(request);
        let count = reader.take_u16()?;
        let mut blinded = Vec::with_capacity(count);
        for _ in 0..count {
            blinded.push(reader.take_point()?);
        }
        reader.finish()?;

        let w_points: Vec<Point> = blinded
            .iter()
            .map(|point| {
                scalar_mul::mul_ct(point, &self.secret).into_affine()
            })
            .collect();

        let (t_batch, w_batch) =
            batch_transcript(&self.public, &blinded, &w_points)?;
        let proof = SchnorrDleqProof::prove(
            rng,
            DLEQ_LABEL,
            &Point::generator(),
            &t_batch,
            &self.public.pub_point,
            &w_batch,
            &self.secret,
        );

        let mut response = Vec::new();
        put_u16(&mut response, count);
        for w in &w_points {
            response.extend_from_slice(&encode_point(w)?);
        }
        put_u16(&mut response, SchnorrDleqProof::BYTES);
        response.extend_from_slice(&proof.to_bytes());
        Ok(response)
    }

    /// Redeems a token by recomputing `priv·H_t(t)`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidEncoding`] when the token was issued under a
    ///   different key.
    /// * [`Error::ValidityCheckFailed`] when the stored point does not
    ///   match.
    pub fn redeem(&self, token: &Token) -> Result<(), Error> {
        if token.key_id != self.public.key_id {
            return Err(Error::InvalidEncoding);
        }

        let t = hash_t(&token.nonce);
        let expected =
            scalar_mul::mul_ct(&t, &self.secret).into_affine();
        if !bool::from(expected.ct_eq(&token.point)) {
            return Err(Error::ValidityCheckFailed);
        }
        Ok(())
    }
}

/// A redeemable VOPRF token: `(key_id, nonce, N)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    /// Identifier of the issuing key generation.
    pub key_id: u32,
    /// The 64-byte token nonce `t`.
    pub nonce: [u8; NONCE_LEN],
    pub(crate) point: Point,
}

impl Token {
    /// Serializes the token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointAtInfinity`] if the stored point is the
    /// identity, which cannot happen for honestly issued tokens.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(4 + NONCE_LEN + POINT_LEN);
        out.extend_from_slice(&self.key_id.to_be_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&encode_point(&self.point)?);
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
        let point = reader.take_point()?;
        reader.finish()?;
        Ok(Self { key_id, nonce, point })
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
            &encode_point(&blinded)
                .expect("hash-to-curve output is not the identity"),
        );
        pretokens.push(PreToken { nonce, blinding, blinded });
    }
    (pretokens, request)
}

/// Unblinds an issuance response, verifying the batched DLEQ proof.
///
/// # Errors
///
/// * [`Error::InvalidEncoding`] on malformed frames or a count mismatch.
/// * [`Error::ProofInvalid`] when the proof fails.
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

    let mut w_points = Vec::with_capacity(count);
    for _ in 0..count {
        w_points.push(reader.take_point()?);
    }
    let proof_len = reader.take_u16()?;
    if proof_len != SchnorrDleqProof::BYTES {
        return Err(Error::InvalidEncoding);
    }
    let proof = SchnorrDleqProof::from_reader(&mut reader)?;
    reader.finish()?;

    let blinded: Vec<Point> =
        pretokens.iter().map(PreToken::blinded_point).collect();
    let (t_batch, w_batch) = batch_transcript(public, &blinded, &w_points)?;
    proof.verify(
        DLEQ_LABEL,
        &Point::generator(),
        &t_batch,
        &public.pub_point,
        &w_batch,
    )?;

    let tokens = pretokens
        .iter()
        .zip(&w_points)
        .map(|(pretoken, w)| Token {
            key_id: public.key_id,
            nonce: pretoken.nonce,
            point: scalar_mul::mul_ct(w, &pretoken.blinding).into_affine(),
        })
        .collect();
    Ok(tokens)
}

/// Builds the batch aggregates `T̃ = Σ e_i·T'_i` and `W̃ = Σ e_i·W'_i`
/// over the issuance transcript.
fn batch_transcript(
    public: &PublicKey,
    blinded: &[Point],
    w_points: &[Point],
) -> Result<(Point, Point), Error> {
    let mut transcript = Vec::new();
    transcript.extend_from_slice(&public.key_id.to_be_bytes());
    transcript.extend_from_slice(&encode_point(&public.pub_point)?);
    for points in [blinded, w_points] {
        for point in points {
            transcript.extend_from_slice(&encode_point(point)?);
        }
    }

    let challenges = batch_challenges(&transcript, blinded.len());
    Ok((aggregate(blinded, &challenges), aggregate(w_points, &challenges)))
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;

    #[test]
    fn issuance_and_redemption_roundtrip() {
        let issuer = IssuerKey::generate(&mut OsRng, 11);
        let public = issuer.public_key();

        let (pretokens, request) = blind_batch(&mut OsRng, 4);
        let response =
            issuer.sign(&mut OsRng, &request).expect("well-formed request");
        let tokens = unblind(&public, &pretokens, &response)
            .expect("honest issuance verifies");

        for token in &tokens {
            assert_eq!(issuer.redeem(token), Ok(()));
        }
    }

    #[test]
    fn tampered_point_fails_proof() {
        let issuer = IssuerKey::generate(&mut OsRng, 5);
        let public = issuer.public_key();

        let (pretokens, request) = blind_batch(&mut OsRng, 2);
        let mut response =
            issuer.sign(&mut OsRng, &request).expect("well-formed request");
        response[10] ^= 1;

        let result = unblind(&public, &pretokens, &response);
        assert!(matches!(
            result,
            Err(Error::ProofInvalid)
                | Err(Error::NotOnCurve)
                | Err(Error::InvalidEncoding)
        ));
    }

    #[test]
    fn wrong_key_token_fails() {
        let issuer = IssuerKey::generate(&mut OsRng, 1);
        let other = IssuerKey::generate(&mut OsRng, 1);
        let public = issuer.public_key();

        let (pretokens, request) = blind_batch(&mut OsRng, 1);
        let response =
            issuer.sign(&mut OsRng, &request).expect("well-formed request");
        let token = unblind(&public, &pretokens, &response)
            .unwrap()
            .remove(0);

        assert_eq!(issuer.redeem(&token), Ok(()));
        assert_eq!(
            other.redeem(&token),
            Err(Error::ValidityCheckFailed),
        );
    }

    #[test]
    fn token_wire_roundtrip() {
        let issuer = IssuerKey::generate(&mut OsRng, 8);
        let public = issuer.public_key();

        let (pretokens, request) = blind_batch(&mut OsRng, 1);
        let response = issuer.sign(&mut OsRng, &request).unwrap();
        let token =
            unblind(&public, &pretokens, &response).unwrap().remove(0);

        let bytes = token.to_bytes().unwrap();
        assert_eq!(Token::from_bytes(&bytes).unwrap(), token);
    }
}
