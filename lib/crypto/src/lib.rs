#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

#[macro_use]
mod const_helpers;

pub mod arithmetic;
pub mod bits;
pub mod chacha20;
pub mod ct;
pub mod curve;
pub mod error;
pub mod field;
pub mod hash;
pub mod hash2curve;
pub mod keccak;
pub mod x25519;

#[cfg(feature = "std")]
pub mod eddsa;
#[cfg(feature = "std")]
pub mod pool;
#[cfg(feature = "std")]
pub mod tokens;

pub use error::Error;
pub use keccak::KeccakBuilder;
