//! Twisted Edwards curve instances.

pub mod curve25519;
