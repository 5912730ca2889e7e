//! Discrete-log equality proofs for the token protocols.
//!
//! Three Fiat–Shamir proofs over P-384:
//!
//! * [`DleqProof`]: knowledge of `(x, y)` with `pub = x·g0 + y·g1` and
//!   `w = x·t0 + y·t1` (two-generator Okamoto/Chaum–Pedersen form, used
//!   for the PMBToken validity key).
//! * [`DleqOrProof`]: the OR composition over two public keys, proving
//!   the relation holds for one of them without revealing which (the
//!   private-metadata bit).
//! * [`SchnorrDleqProof`]: the single-scalar form
//!   `log_g(pub) = log_t(w)`, used by the VOPRF variant.
//!
//! Proving runs in constant time with respect to the witness scalars and,
//! for the OR proof, the selected branch: commitments are computed on both
//! branches and placed by mask. Verification is variable-time; every
//! verifier input is public.

use alloc::vec::Vec;

use subtle::{Choice, ConditionallySelectable};

use crate::{
    curve::{
        sw::scalar_mul::{mul_public, multi_mul_ct},
        CurveGroup,
    },
    error::Error,
    tokens::{
        encode_point_infallible, hash_to_scalar, Point, Reader, Scalar,
        SCALAR_LEN,
    },
};

/// The four fixed points a token DLEQ statement ranges over: the key
/// commitment bases `(g0, g1)` and the batched token bases `(t0, t1)`.
#[derive(Clone, Copy)]
pub(crate) struct DleqBases {
    pub(crate) g0: Point,
    pub(crate) g1: Point,
    pub(crate) t0: Point,
    pub(crate) t1: Point,
}

impl DleqBases {
    fn transcript_frames(&self) -> [[u8; 97]; 4] {
        [
            encode_point_infallible(&self.g0),
            encode_point_infallible(&self.g1),
            encode_point_infallible(&self.t0),
            encode_point_infallible(&self.t1),
        ]
    }
}

/// Computes `a·p + b·q - c·r` in variable time (verification only).
fn lincomb3(
    p: &Point,
    a: &Scalar,
    q: &Point,
    b: &Scalar,
    r: &Point,
    c: &Scalar,
) -> Point {
    let mut acc = mul_public(p, a);
    acc += &mul_public(q, b);
    acc -= &mul_public(r, c);
    acc.into_affine()
}

/// A two-generator DLEQ proof: challenge and the two responses
/// `u = k0 + c·x`, `v = k1 + c·y`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct DleqProof {
    pub(crate) c: Scalar,
    pub(crate) u: Scalar,
    pub(crate) v: Scalar,
}

impl DleqProof {
    pub(crate) const BYTES: usize = 3 * SCALAR_LEN;

    /// Proves `pub_point = x·g0 + y·g1` and `w = x·t0 + y·t1`.
    pub(crate) fn prove(
        rng: &mut impl rand_core::CryptoRngCore,
        label: &'static [u8],
        bases: &DleqBases,
        pub_point: &Point,
        w: &Point,
        x: &Scalar,
        y: &Scalar,
    ) -> Self {
        let k0 = Scalar::random(rng);
        let k1 = Scalar::random(rng);

        // Commitments on both statement sides, with secret nonces.
        let commit_key =
            multi_mul_ct(&[(bases.g0, k0), (bases.g1, k1)]).into_affine();
        let commit_token =
            multi_mul_ct(&[(bases.t0, k0), (bases.t1, k1)]).into_affine();

        let c = Self::challenge(
            label,
            bases,
            pub_point,
            w,
            &commit_key,
            &commit_token,
        );
        let u = k0 + c * *x;
        let v = k1 + c * *y;
        Self { c, u, v }
    }

    /// Verifies the proof against the public key and batched token point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProofInvalid`] when the recomputed challenge does
    /// not match.
    pub(crate) fn verify(
        &self,
        label: &'static [u8],
        bases: &DleqBases,
        pub_point: &Point,
        w: &Point,
    ) -> Result<(), Error> {
        // K0 = u·g0 + v·g1 - c·pub, K1 = u·t0 + v·t1 - c·w.
        let commit_key =
            lincomb3(&bases.g0, &self.u, &bases.g1, &self.v, pub_point, &self.c);
        let commit_token =
            lincomb3(&bases.t0, &self.u, &bases.t1, &self.v, w, &self.c);

        let expected = Self::challenge(
            label,
            bases,
            pub_point,
            w,
            &commit_key,
            &commit_token,
        );
        if expected != self.c {
            return Err(Error::ProofInvalid);
        }
        Ok(())
    }

    fn challenge(
        label: &'static [u8],
        bases: &DleqBases,
        pub_point: &Point,
        w: &Point,
        commit_key: &Point,
        commit_token: &Point,
    ) -> Scalar {
        let frames = bases.transcript_frames();
        hash_to_scalar(
            label,
            &[
                &frames[0],
                &frames[1],
                &frames[2],
                &frames[3],
                &encode_point_infallible(pub_point),
                &encode_point_infallible(w),
                &encode_point_infallible(commit_key),
                &encode_point_infallible(commit_token),
            ],
        )
    }

    pub(crate) fn to_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BYTES);
        out.extend_from_slice(&super::encode_scalar(&self.c));
        out.extend_from_slice(&super::encode_scalar(&self.u));
        out.extend_from_slice(&super::encode_scalar(&self.v));
        out
    }

    pub(crate) fn from_reader(reader: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            c: reader.take_scalar()?,
            u: reader.take_scalar()?,
            v: reader.take_scalar()?,
        })
    }
}

/// A DLEQOR proof over two candidate public keys: per-branch challenges
/// and responses, with `c0 + c1` bound to the transcript hash.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct DleqOrProof {
    pub(crate) c0: Scalar,
    pub(crate) c1: Scalar,
    pub(crate) u0: Scalar,
    pub(crate) v0: Scalar,
    pub(crate) u1: Scalar,
    pub(crate) v1: Scalar,
}

impl DleqOrProof {
    pub(crate) const BYTES: usize = 6 * SCALAR_LEN;

    /// Proves that `w = x·t0 + y·t1` for the key behind `pubs[b]`,
    /// without revealing the branch `b`.
    ///
    /// The real branch gets fresh commitments; the other branch is
    /// simulated from random challenge and responses. Branch placement is
    /// by mask only.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn prove(
        rng: &mut impl rand_core::CryptoRngCore,
        label: &'static [u8],
        bases: &DleqBases,
        pubs: &[Point; 2],
        w: &Point,
        branch: Choice,
        x: &Scalar,
        y: &Scalar,
    ) -> Self {
        let k0 = Scalar::random(rng);
        let k1 = Scalar::random(rng);
        let c_sim = Scalar::random(rng);
        let u_sim = Scalar::random(rng);
        let v_sim = Scalar::random(rng);

        // Real commitments for the selected branch.
        let real_key =
            multi_mul_ct(&[(bases.g0, k0), (bases.g1, k1)]).into_affine();
        let real_token =
            multi_mul_ct(&[(bases.t0, k0), (bases.t1, k1)]).into_affine();

        // Simulated commitments for the other branch, against its public
        // key (selected by mask).
        let sim_pub = Point::conditional_select(&pubs[1], &pubs[0], branch);
        let sim_key =
            lincomb3(&bases.g0, &u_sim, &bases.g1, &v_sim, &sim_pub, &c_sim);
        let sim_token =
            lincomb3(&bases.t0, &u_sim, &bases.t1, &v_sim, w, &c_sim);

        // Branch 0 carries the real commitments iff branch == 0.
        let commit_key_0 =
            Point::conditional_select(&real_key, &sim_key, branch);
        let commit_token_0 =
            Point::conditional_select(&real_token, &sim_token, branch);
        let commit_key_1 =
            Point::conditional_select(&sim_key, &real_key, branch);
        let commit_token_1 =
            Point::conditional_select(&sim_token, &real_token, branch);

        let c = Self::challenge(
            label,
            bases,
            pubs,
            w,
            &commit_key_0,
            &commit_token_0,
            &commit_key_1,
            &commit_token_1,
        );
        let c_real = c - c_sim;
        let u_real = k0 + c_real * *x;
        let v_real = k1 + c_real * *y;

        Self {
            c0: Scalar::conditional_select(&c_real, &c_sim, branch),
            c1: Scalar::conditional_select(&c_sim, &c_real, branch),
            u0: Scalar::conditional_select(&u_real, &u_sim, branch),
            v0: Scalar::conditional_select(&v_real, &v_sim, branch),
            u1: Scalar::conditional_select(&u_sim, &u_real, branch),
            v1: Scalar::conditional_select(&v_sim, &v_real, branch),
        }
    }

    /// Verifies the OR proof.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProofInvalid`] when the split challenges do not
    /// sum to the recomputed transcript challenge.
    pub(crate) fn verify(
        &self,
        label: &'static [u8],
        bases: &DleqBases,
        pubs: &[Point; 2],
        w: &Point,
    ) -> Result<(), Error> {
        let commit_key_0 =
            lincomb3(&bases.g0, &self.u0, &bases.g1, &self.v0, &pubs[0], &self.c0);
        let commit_token_0 =
            lincomb3(&bases.t0, &self.u0, &bases.t1, &self.v0, w, &self.c0);
        let commit_key_1 =
            lincomb3(&bases.g0, &self.u1, &bases.g1, &self.v1, &pubs[1], &self.c1);
        let commit_token_1 =
            lincomb3(&bases.t0, &self.u1, &bases.t1, &self.v1, w, &self.c1);

        let expected = Self::challenge(
            label,
            bases,
            pubs,
            w,
            &commit_key_0,
            &commit_token_0,
            &commit_key_1,
            &commit_token_1,
        );
        if expected != self.c0 + self.c1 {
            return Err(Error::ProofInvalid);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn challenge(
        label: &'static [u8],
        bases: &DleqBases,
        pubs: &[Point; 2],
        w: &Point,
        commit_key_0: &Point,
        commit_token_0: &Point,
        commit_key_1: &Point,
        commit_token_1: &Point,
    ) -> Scalar {
        let frames = bases.transcript_frames();
        hash_to_scalar(
            label,
            &[
                &frames[0],
                &frames[1],
                &frames[2],
                &frames[3],
                &encode_point_infallible(&pubs[0]),
                &encode_point_infallible(&pubs[1]),
                &encode_point_infallible(w),
                &encode_point_infallible(commit_key_0),
                &encode_point_infallible(commit_token_0),
                &encode_point_infallible(commit_key_1),
                &encode_point_infallible(commit_token_1),
            ],
        )
    }

    pub(crate) fn to_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BYTES);
        for scalar in [self.c0, self.c1, self.u0, self.v0, self.u1, self.v1] {
            out.extend_from_slice(&super::encode_scalar(&scalar));
        }
        out
    }

    pub(crate) fn from_reader(reader: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            c0: reader.take_scalar()?,
            c1: reader.take_scalar()?,
            u0: reader.take_scalar()?,
            v0: reader.take_scalar()?,
            u1: reader.take_scalar()?,
            v1: reader.take_scalar()?,
        })
    }
}

/// A single-scalar DLEQ proof: `log_g(pub) = log_t(w)`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct SchnorrDleqProof {
    pub(crate) c: Scalar,
    pub(crate) u: Scalar,
}

impl SchnorrDleqProof {
    pub(crate) const BYTES: usize = 2 * SCALAR_LEN;

    /// Proves `pub_point = x·g` and `w = x·t`.
    pub(crate) fn prove(
        rng: &mut impl rand_core::CryptoRngCore,
        label: &'static [u8],
        g: &Point,
        t: &Point,
        pub_point: &Point,
        w: &Point,
        x: &Scalar,
    ) -> Self {
        let k = Scalar::random(rng);
        let commit_key =
            crate::curve::sw::scalar_mul::mul_ct(g, &k).into_affine();
        let commit_token =
            crate::curve::sw::scalar_mul::mul_ct(t, &k).into_affine();

        let c = Self::challenge(
            label,
            g,
            t,
            pub_point,
            w,
            &commit_key,
            &commit_token,
        );
        let u = k + c * *x;
        Self { c, u }
    }

    /// Verifies the proof.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProofInvalid`] when the recomputed challenge does
    /// not match.
    pub(crate) fn verify(
        &self,
        label: &'static [u8],
        g: &Point,
        t: &Point,
        pub_point: &Point,
        w: &Point,
    ) -> Result<(), Error> {
        // K0 = u·g - c·pub, K1 = u·t - c·w.
        let commit_key = {
            let mut acc = mul_public(g, &self.u);
            acc -= &mul_public(pub_point, &self.c);
            acc.into_affine()
        };
        let commit_token = {
            let mut acc = mul_public(t, &self.u);
            acc -= &mul_public(w, &self.c);
            acc.into_affine()
        };

        let expected = Self::challenge(
            label,
            g,
            t,
            pub_point,
            w,
            &commit_key,
            &commit_token,
        );
        if expected != self.c {
            return Err(Error::ProofInvalid);
        }
        Ok(())
    }

    fn challenge(
        label: &'static [u8],
        g: &Point,
        t: &Point,
        pub_point: &Point,
        w: &Point,
        commit_key: &Point,
        commit_token: &Point,
    ) -> Scalar {
        hash_to_scalar(
            label,
            &[
                &encode_point_infallible(g),
                &encode_point_infallible(t),
                &encode_point_infallible(pub_point),
                &encode_point_infallible(w),
                &encode_point_infallible(commit_key),
                &encode_point_infallible(commit_token),
            ],
        )
    }

    pub(crate) fn to_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BYTES);
        out.extend_from_slice(&super::encode_scalar(&self.c));
        out.extend_from_slice(&super::encode_scalar(&self.u));
        out
    }

    pub(crate) fn from_reader(reader: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            c: reader.take_scalar()?,
            u: reader.take_scalar()?,
        })
    }
}
