use crate::dft::field::{inv, Field};
use crate::error::{NttError, Result};

/// 2^31 - 1
pub const M31: u64 = (1 << 31) - 1;

/// 2^-1 mod 2^31 - 1
pub const M31_INV_TWO: u64 = 1 << 30;

/// Reduces a product of two canonical values (< 2^62).
/// Since 2^31 = 1 mod p, x = hi * 2^31 + lo = hi + lo; hi + lo < 2p.
#[inline(always)]
pub fn reduce_product(x: u64) -> u64 {
    let folded = (x & M31) + (x >> 31);
    if folded >= M31 {
        folded - M31
    } else {
        folded
    }
}

/// Z_p for the Mersenne prime p = 2^31 - 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mersenne31;

impl Field for Mersenne31 {
    type Elem = u64;

    #[inline(always)]
    fn modulus(&self) -> u64 {
        M31
    }

    #[inline(always)]
    fn zero(&self) -> u64 {
        0
    }

    #[inline(always)]
    fn one(&self) -> u64 {
        1
    }

    #[inline(always)]
    fn from_base(&self, x: u64) -> u64 {
        x % M31
    }

    #[inline(always)]
    fn add(&self, a: u64, b: u64) -> u64 {
        let s = a + b;
        if s >= M31 {
            s - M31
        } else {
            s
        }
    }

    #[inline(always)]
    fn sub(&self, a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            a + M31 - b
        }
    }

    #[inline(always)]
    fn neg(&self, a: u64) -> u64 {
        if a == 0 {
            0
        } else {
            M31 - a
        }
    }

    #[inline(always)]
    fn mul(&self, a: u64, b: u64) -> u64 {
        reduce_product(a * b)
    }

    fn inverse(&self, a: u64) -> Result<u64> {
        inv(a, M31).ok_or(NttError::NotInvertible { modulus: M31 })
    }

    /// (p + 1) / 4 = 2^29, so the candidate root is 29 squarings of a.
    fn sqrt(&self, a: u64) -> Result<u64> {
        let a = a % M31;
        let mut root = a;
        for _ in 0..29 {
            root = self.mul(root, root);
        }
        if self.mul(root, root) == a {
            Ok(root)
        } else {
            Err(NttError::NotQuadraticResidue { modulus: M31 })
        }
    }

    #[inline(always)]
    fn half(&self) -> u64 {
        M31_INV_TWO
    }
}
