//! Errors surfaced by field arithmetic, table construction and transforms.

use thiserror::Error;

/// Errors that may occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NttError {
    /// The transform length is not a power of two in `[2, 2^max_log_n]`.
    #[error("transform length {n} is not a power of two in [2, 2^{max_log_n}]")]
    InvalidLength {
        /// Requested length.
        n: usize,
        /// Largest supported log2 length for the modulus.
        max_log_n: u32,
    },
    /// An input entry is not a canonical residue in [0, q).
    #[error("coefficient {value} is not reduced modulo {modulus}")]
    InvalidCoefficient {
        /// The offending entry.
        value: u64,
        /// The base prime.
        modulus: u64,
    },
    /// Inversion of the zero element.
    #[error("zero has no inverse modulo {modulus}")]
    NotInvertible {
        /// The base prime.
        modulus: u64,
    },
    /// The modulus is unknown or lacks the structure an operation needs.
    #[error("modulus {modulus} is not supported: {reason}")]
    UnsupportedModulus {
        /// The rejected modulus.
        modulus: u64,
        /// What is missing.
        reason: &'static str,
    },
    /// Square root requested for a non-residue.
    #[error("value is not a quadratic residue modulo {modulus}")]
    NotQuadraticResidue {
        /// The base prime.
        modulus: u64,
    },
    /// An unreduced intermediate left the 256-bit window of the lazy path.
    #[error("unreduced value left the 256-bit bound at stage {stage}")]
    ReductionBoundExceeded {
        /// Butterfly stage where the check failed.
        stage: usize,
    },
    /// A spectrum was handed to a table using the other representation.
    #[error("spectrum does not match the {expected} representation of this table")]
    ShapeMismatch {
        /// Representation the table produces.
        expected: &'static str,
    },
    /// Two operands of a pointwise product have different lengths.
    #[error("operand lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, NttError>;
