//! Negacyclic number-theoretic transforms over `Z_q[x]/(x^n + 1)`.
//!
//! Two engines compute the same transform: an in-place butterfly network
//! ([`dft::iterative`]) and a split/merge recursion ([`dft::recursive`]).
//! Moduli whose multiplicative group has too little power-of-two structure
//! (Mersenne-31) are lifted into the quadratic extension `F_q[u]/(u^2 + 1)`.

pub mod dft;
pub mod error;

pub use dft::ntt::{NttTable, Spectrum};
pub use dft::params::{ModulusParams, SUPPORTED_PARAMS};
pub use dft::DFT;
pub use error::{NttError, Result};
