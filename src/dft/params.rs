use serde::{Deserialize, Serialize};

use crate::dft::field::{exp, mul};
use crate::dft::mersenne::M31;
use crate::error::{NttError, Result};

/// Falcon's modulus, the only one small enough for the lazy-reduction path.
pub const FALCON_Q: u64 = 12289;

/// A prime modulus and the largest log2 transform length validated for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModulusParams {
    pub q: u64,
    pub max_log_n: u32,
}

pub const SUPPORTED_PARAMS: [ModulusParams; 5] = [
    // Falcon
    ModulusParams::new(FALCON_Q, 11),
    // Dilithium
    ModulusParams::new(8380417, 9),
    // BabyBear
    ModulusParams::new(2013265921, 9),
    // KoalaBear
    ModulusParams::new((1 << 31) - (1 << 24) + 1, 9),
    // Mersenne 31
    ModulusParams::new(M31, 9),
];

/// How a modulus gets enough power-of-two roots of unity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Structure {
    /// 2^(max_log_n + 1) divides q - 1.
    Native,
    /// Runs in F_q[u]/(u^2 + 1); coefficients pair up into n/2 extension values.
    Lifted,
}

impl ModulusParams {
    pub const fn new(q: u64, max_log_n: u32) -> Self {
        Self { q, max_log_n }
    }

    /// Looks q up in [`SUPPORTED_PARAMS`].
    pub fn lookup(q: u64) -> Result<Self> {
        SUPPORTED_PARAMS
            .iter()
            .copied()
            .find(|p| p.q == q)
            .ok_or(NttError::UnsupportedModulus {
                modulus: q,
                reason: "not in the supported configuration table",
            })
    }

    #[inline(always)]
    pub fn max_len(&self) -> usize {
        1 << self.max_log_n
    }

    /// Checks that q is prime and has the structure for 2^max_log_n.
    pub fn structure(&self) -> Result<Structure> {
        let unsupported = |reason| NttError::UnsupportedModulus {
            modulus: self.q,
            reason,
        };
        if !is_prime(self.q) || self.q == 2 {
            return Err(unsupported("modulus must be an odd prime"));
        }
        if self.q >= 1 << 62 {
            return Err(unsupported("modulus must be below 2^62"));
        }
        if self.max_log_n == 0 {
            return Err(unsupported("max_log_n must be at least 1"));
        }
        if two_adicity(self.q - 1) > self.max_log_n {
            return Ok(Structure::Native);
        }
        if self.q == M31 {
            // two-adicity of p^2 - 1 is 32
            if self.max_log_n <= 31 {
                return Ok(Structure::Lifted);
            }
            return Err(unsupported("max_log_n exceeds the extension's two-adicity"));
        }
        Err(unsupported("q - 1 has too few factors of two"))
    }

    /// Validates a coefficient length and returns log2(n).
    pub fn check_len(&self, n: usize) -> Result<u32> {
        if n < 2 || !n.is_power_of_two() || n > self.max_len() {
            return Err(NttError::InvalidLength {
                n,
                max_log_n: self.max_log_n,
            });
        }
        Ok(n.trailing_zeros())
    }
}

/// The largest power of two dividing x.
#[inline]
pub fn two_adicity(x: u64) -> u32 {
    x.trailing_zeros()
}

/// Deterministic Miller-Rabin; these bases cover every u64.
pub fn is_prime(q: u64) -> bool {
    const BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if q < 2 {
        return false;
    }
    for &p in BASES.iter() {
        if q % p == 0 {
            return q == p;
        }
    }
    let s = two_adicity(q - 1);
    let d = (q - 1) >> s;
    'witness: for &a in BASES.iter() {
        let mut x = exp(a, d, q);
        if x == 1 || x == q - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul(x, x, q);
            if x == q - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
