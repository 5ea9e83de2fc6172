//! STARK-curve cryptography for perpetual order signing.
//!
//! Everything an order needs before it reaches the transport layer lives
//! here: prime-field arithmetic, curve point operations, the Pedersen
//! chain hash that turns an order into its canonical digest, and the
//! deterministic ECDSA signer that turns a digest into an `(r, s)` pair.
//!
//! All operations are pure functions over owned values; nothing blocks,
//! locks, or touches I/O, so hashing and signing may run concurrently
//! from any number of threads. Scalar multiplication with a private
//! scalar always goes through the fixed-iteration ladder.

mod curve;
mod ecdsa;
mod felt;
mod pedersen;


pub use curve::{CurvePoint, CURVE_ORDER};
pub use ecdsa::{sign, sign_message, verify, PrivateScalar, Signature};
pub use felt::{FieldElement, FIELD_PRIME};
pub use pedersen::{hash_elements, pedersen_hash};
