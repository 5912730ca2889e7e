//! Errors surfaced by the primitives in this crate.
//!
//! All failures propagate to the outermost caller; the crate never retries
//! and never logs. Secret material held by an operation is zeroized before
//! an error is returned, and partially written output buffers are
//! unspecified on failure.

/// Errors surfaced by the primitives in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Point or scalar bytes are not in the expected canonical form, a
    /// signature scalar is out of range, or a wire frame is truncated or
    /// malformed.
    #[error("invalid encoding")]
    InvalidEncoding,
    /// Decoded affine coordinates do not satisfy the curve equation.
    #[error("point is not on the curve")]
    NotOnCurve,
    /// The affine coordinates of the group identity were requested.
    #[error("point is the point at infinity")]
    PointAtInfinity,
    /// An X25519 shared secret was all-zero (small-subgroup peer value).
    #[error("all-zero shared secret (small subgroup)")]
    SmallSubgroup,
    /// A DLEQ / DLEQOR challenge does not match the recomputed value.
    #[error("zero-knowledge proof rejected")]
    ProofInvalid,
    /// A redeemed token does not satisfy the issuer validity relation.
    #[error("token validity check failed")]
    ValidityCheckFailed,
    /// Redemption recovered neither private-metadata value, or both.
    #[error("private metadata bit is unrecoverable")]
    BadPrivateBit,
    /// Memory exhaustion while building temporary tables.
    #[error("allocation failed")]
    AllocationFailed,
    /// Unreachable in correct use.
    #[error("internal invariant violated")]
    InternalInvariant,
}
