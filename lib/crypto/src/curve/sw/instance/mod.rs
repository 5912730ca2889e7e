//! Short Weierstrass curve instances.

pub mod p256;
pub mod p384;
pub mod p521;
