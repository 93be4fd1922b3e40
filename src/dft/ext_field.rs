use serde::{Deserialize, Serialize};

use crate::dft::field::Field;
use crate::error::{NttError, Result};

/// c0 + c1 * u with u^2 = -1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fp2 {
    pub c0: u64,
    pub c1: u64,
}

impl Fp2 {
    #[inline(always)]
    pub const fn new(c0: u64, c1: u64) -> Self {
        Self { c0, c1 }
    }

    /// The generator u of the extension.
    pub const U: Fp2 = Fp2::new(0, 1);
}

/// F_q[u]/(u^2 + 1) over a base field `B`.
///
/// This is a field only when -1 is a non-residue mod q, i.e. q = 3 mod 4;
/// [`QuadraticExtension::new`] refuses any other base.
#[derive(Clone, Copy, Debug)]
pub struct QuadraticExtension<B> {
    base: B,
}

impl<B: Field<Elem = u64>> QuadraticExtension<B> {
    pub fn new(base: B) -> Result<Self> {
        if base.modulus() % 4 != 3 {
            return Err(NttError::UnsupportedModulus {
                modulus: base.modulus(),
                reason: "u^2 = -1 needs q = 3 mod 4",
            });
        }
        Ok(Self { base })
    }

    #[inline(always)]
    pub fn base(&self) -> &B {
        &self.base
    }

    /// c0^2 + c1^2, multiplicative since u^2 = -1.
    #[inline(always)]
    pub fn norm(&self, x: Fp2) -> u64 {
        let b = &self.base;
        b.add(b.mul(x.c0, x.c0), b.mul(x.c1, x.c1))
    }

    #[inline(always)]
    pub fn scale(&self, x: Fp2, k: u64) -> Fp2 {
        Fp2::new(self.base.mul(x.c0, k), self.base.mul(x.c1, k))
    }

    /// Roots of elements with c1 = 0: sqrt(c0), or u * sqrt(-c0) when c0 is
    /// a non-residue.
    fn sqrt_base(&self, c0: u64) -> Result<Fp2> {
        let b = &self.base;
        match b.sqrt(c0) {
            Ok(r) => Ok(Fp2::new(r, 0)),
            Err(NttError::NotQuadraticResidue { .. }) => Ok(Fp2::new(0, b.sqrt(b.neg(c0))?)),
            Err(e) => Err(e),
        }
    }
}

impl<B: Field<Elem = u64>> Field for QuadraticExtension<B> {
    type Elem = Fp2;

    #[inline(always)]
    fn modulus(&self) -> u64 {
        self.base.modulus()
    }

    #[inline(always)]
    fn zero(&self) -> Fp2 {
        Fp2::new(0, 0)
    }

    #[inline(always)]
    fn one(&self) -> Fp2 {
        Fp2::new(1, 0)
    }

    #[inline(always)]
    fn from_base(&self, x: u64) -> Fp2 {
        Fp2::new(self.base.from_base(x), 0)
    }

    #[inline(always)]
    fn add(&self, a: Fp2, b: Fp2) -> Fp2 {
        Fp2::new(self.base.add(a.c0, b.c0), self.base.add(a.c1, b.c1))
    }

    #[inline(always)]
    fn sub(&self, a: Fp2, b: Fp2) -> Fp2 {
        Fp2::new(self.base.sub(a.c0, b.c0), self.base.sub(a.c1, b.c1))
    }

    #[inline(always)]
    fn neg(&self, a: Fp2) -> Fp2 {
        Fp2::new(self.base.neg(a.c0), self.base.neg(a.c1))
    }

    /// (a0 b0 - a1 b1) + (a0 b1 + a1 b0) u
    #[inline(always)]
    fn mul(&self, a: Fp2, b: Fp2) -> Fp2 {
        let f = &self.base;
        Fp2::new(
            f.sub(f.mul(a.c0, b.c0), f.mul(a.c1, b.c1)),
            f.add(f.mul(a.c0, b.c1), f.mul(a.c1, b.c0)),
        )
    }

    /// conj(x) / norm(x)
    fn inverse(&self, a: Fp2) -> Result<Fp2> {
        let f = &self.base;
        let norm_inv = f.inverse(self.norm(a))?;
        Ok(Fp2::new(f.mul(a.c0, norm_inv), f.mul(f.neg(a.c1), norm_inv)))
    }

    /// For x = x1 + x2 u with x2 != 0 and root a + b u:
    /// b^2 = (-x1 + sqrt(x1^2 + x2^2)) / 2 and a = x2 / (2b).
    /// Exactly one sign of sqrt(norm) makes b^2 a residue, both are tried.
    fn sqrt(&self, x: Fp2) -> Result<Fp2> {
        if x.c1 == 0 {
            return self.sqrt_base(x.c0);
        }
        let f = &self.base;
        let not_residue = NttError::NotQuadraticResidue {
            modulus: f.modulus(),
        };
        let sqrt_norm = match f.sqrt(self.norm(x)) {
            Ok(r) => r,
            Err(NttError::NotQuadraticResidue { .. }) => return Err(not_residue),
            Err(e) => return Err(e),
        };
        let half = f.half();
        for s in [sqrt_norm, f.neg(sqrt_norm)] {
            let b2 = f.mul(f.add(f.neg(x.c0), s), half);
            let b = match f.sqrt(b2) {
                Ok(b) if b != 0 => b,
                _ => continue,
            };
            let a = f.mul(f.mul(x.c1, half), f.inverse(b)?);
            let root = Fp2::new(a, b);
            if self.mul(root, root) == x {
                return Ok(root);
            }
        }
        Err(not_residue)
    }
}
