//! Generic hashing support.
//!
//! This module provides a generic way to compute the [hash] of a value. It
//! is intended to be used as a replacement for [`core::hash`], which is
//! limited by the signature of [`core::hash::Hasher::finish`] returning a
//! `u64`. The buffer pool keys its content index with these hashers.
//!
//! [hash]: https://en.wikipedia.org/wiki/Hash_function

/// A hashable type.
///
/// Types implementing `Hash` are able to be hashed with an instance of
/// [`Hasher`].
pub trait Hash {
    /// Feeds this value into the given [`Hasher`].
    fn hash<H: Hasher>(&self, state: &mut H);
}

/// A trait for hashing an arbitrary stream of bytes.
///
/// Instances of `Hasher` usually represent state that is changed while
/// hashing data.
pub trait Hasher {
    /// The output type of this hasher.
    ///
    /// For [`core::hash`] types, it's `u64`. For this crate, it's
    /// `[u8; 32]`.
    type Output;

    /// Absorb additional input. Can be called multiple times.
    fn update(&mut self, input: &[u8]);

    /// Pad and squeeze the state to the output.
    fn finalize(self) -> Self::Output;
}

/// A trait for creating instances of [`Hasher`].
///
/// For each instance of `BuildHasher`, the [`Hasher`]s created by
/// [`build_hasher`] should be identical. That is, if the same stream of
/// bytes is fed into each hasher, the same output will also be generated.
///
/// [`build_hasher`]: BuildHasher::build_hasher
pub trait BuildHasher {
    /// Type of the hasher that will be created.
    type Hasher: Hasher;

    /// Creates a new hasher.
    ///
    /// Each call to `build_hasher` on the same instance should produce
    /// identical [`Hasher`]s.
    fn build_hasher(&self) -> Self::Hasher;

    /// Calculates the hash of a single value.
    fn hash_one<Hashable>(
        &self,
        h: Hashable,
    ) -> <Self::Hasher as Hasher>::Output
    where
        Hashable: Hash,
        Self: Sized,
        Self::Hasher: Hasher,
    {
        let mut hasher = self.build_hasher();
        h.hash(&mut hasher);
        hasher.finalize()
    }
}
