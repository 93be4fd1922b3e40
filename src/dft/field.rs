use std::fmt::Debug;

use crate::dft::params::is_prime;
use crate::error::{NttError, Result};

/// Arithmetic over a finite field whose elements are plain `Copy` values.
///
/// The field object carries the modulus, so the same element type can back
/// several moduli. All outputs are canonical.
pub trait Field: Send + Sync {
    type Elem: Copy + Eq + Debug + Send + Sync;

    /// The base prime q.
    fn modulus(&self) -> u64;

    fn zero(&self) -> Self::Elem;

    fn one(&self) -> Self::Elem;

    /// Embeds a base field value, reducing it first.
    fn from_base(&self, x: u64) -> Self::Elem;

    fn add(&self, a: Self::Elem, b: Self::Elem) -> Self::Elem;

    fn sub(&self, a: Self::Elem, b: Self::Elem) -> Self::Elem;

    fn neg(&self, a: Self::Elem) -> Self::Elem;

    fn mul(&self, a: Self::Elem, b: Self::Elem) -> Self::Elem;

    /// Fails with [`NttError::NotInvertible`] on zero.
    fn inverse(&self, a: Self::Elem) -> Result<Self::Elem>;

    /// Fails with [`NttError::NotQuadraticResidue`] when no root exists.
    fn sqrt(&self, a: Self::Elem) -> Result<Self::Elem>;

    /// 1/2, i.e. (q + 1) / 2 embedded.
    fn half(&self) -> Self::Elem {
        self.from_base((self.modulus() + 1) / 2)
    }

    fn square(&self, a: Self::Elem) -> Self::Elem {
        self.mul(a, a)
    }

    /// a^e by square-and-multiply.
    fn pow(&self, base: Self::Elem, exp: u64) -> Self::Elem {
        let mut acc = self.one();
        let mut cur = base;
        let mut e = exp;
        while e > 0 {
            if (e & 1) == 1 {
                acc = self.mul(acc, cur);
            }
            cur = self.mul(cur, cur);
            e >>= 1;
        }
        acc
    }
}

/// (a + b) mod m
#[inline(always)]
pub fn add(a: u64, b: u64, m: u64) -> u64 {
    let add_num = a + b;
    if add_num >= m {
        add_num - m
    } else {
        add_num
    }
}

/// (a - b) mod m
#[inline(always)]
pub fn sub(a: u64, b: u64, m: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        a + m - b
    }
}

/// (a * b) mod m
#[inline(always)]
pub fn mul(a: u64, b: u64, m: u64) -> u64 {
    let mul_num = (a as u128) * (b as u128);
    (mul_num % (m as u128)) as u64
}

/// a^b mod m
pub fn exp(base: u64, exp: u64, m: u64) -> u64 {
    let mut exp_num = 1u64 % m;
    let mut current_base = base % m;
    let mut e = exp;
    while e > 0 {
        if (e & 1) == 1 {
            exp_num = mul(exp_num, current_base, m);
        }
        current_base = mul(current_base, current_base, m);
        e >>= 1;
    }
    exp_num
}

/// a^-1 mod m from the Bezout coefficient of a, normalized into [0, m).
/// Returns None when gcd(a, m) != 1, in particular for a = 0.
pub fn inv(a: u64, m: u64) -> Option<u64> {
    let (gcd, x, _) = extended_gcd((a % m) as i128, m as i128);
    if gcd != 1 {
        return None;
    }
    let mut x_mod_m = x % (m as i128);
    if x_mod_m < 0 {
        x_mod_m += m as i128;
    }
    Some(x_mod_m as u64)
}

/// Extended GCD on (r0, r1); returns (gcd, s0, t0) with gcd = r0*s0 + r1*t0.
fn extended_gcd(mut r0: i128, mut r1: i128) -> (i128, i128, i128) {
    let (mut s0, mut s1) = (1, 0);
    let (mut t0, mut t1) = (0, 1);

    while r1 != 0 {
        let q = r0 / r1;

        let next_r = r0 - q * r1;
        r0 = r1;
        r1 = next_r;

        let next_s = s0 - q * s1;
        s0 = s1;
        s1 = next_s;

        let next_t = t0 - q * t1;
        t0 = t1;
        t1 = next_t;
    }
    (r0, s0, t0)
}

/// Z_q for an arbitrary odd prime q, product-then-reduce multiplication.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimeField {
    q: u64,
}

impl PrimeField {
    /// Fails with `UnsupportedModulus` unless `q` is an odd prime.
    pub fn new(q: u64) -> Result<Self> {
        if q == 2 || !is_prime(q) {
            return Err(NttError::UnsupportedModulus {
                modulus: q,
                reason: "modulus must be an odd prime",
            });
        }
        Ok(Self { q })
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    /// Euler's criterion. Zero counts as a residue.
    pub fn is_quadratic_residue(&self, a: u64) -> bool {
        let a = a % self.q;
        a == 0 || exp(a, (self.q - 1) / 2, self.q) == 1
    }
}

impl Field for PrimeField {
    type Elem = u64;

    #[inline(always)]
    fn modulus(&self) -> u64 {
        self.q
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
        x % self.q
    }

    #[inline(always)]
    fn add(&self, a: u64, b: u64) -> u64 {
        add(a, b, self.q)
    }

    #[inline(always)]
    fn sub(&self, a: u64, b: u64) -> u64 {
        sub(a, b, self.q)
    }

    #[inline(always)]
    fn neg(&self, a: u64) -> u64 {
        sub(0, a, self.q)
    }

    #[inline(always)]
    fn mul(&self, a: u64, b: u64) -> u64 {
        mul(a, b, self.q)
    }

    fn inverse(&self, a: u64) -> Result<u64> {
        inv(a, self.q).ok_or(NttError::NotInvertible { modulus: self.q })
    }

    /// a^((q+1)/4), checked by squaring. Only defined for q = 3 mod 4.
    fn sqrt(&self, a: u64) -> Result<u64> {
        if self.q % 4 != 3 {
            return Err(NttError::UnsupportedModulus {
                modulus: self.q,
                reason: "square roots need q = 3 mod 4",
            });
        }
        let a = a % self.q;
        let root = exp(a, (self.q + 1) / 4, self.q);
        if mul(root, root, self.q) == a {
            Ok(root)
        } else {
            Err(NttError::NotQuadraticResidue { modulus: self.q })
        }
    }

    fn pow(&self, base: u64, e: u64) -> u64 {
        exp(base, e, self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_add() {
        let q = 5u64;
        assert_eq!(add(4, 1, q), 0);
        assert_eq!(add(q - 1, q - 1, q), 3);
    }

    #[test]
    fn test_sub() {
        let q = 5u64;
        assert_eq!(sub(2, 3, q), 4);
        assert_eq!(sub(0, 0, q), 0);
    }

    #[test]
    fn test_mul() {
        let q = 5u64;
        assert_eq!(mul(2, 3, q), 1);
    }

    #[test]
    fn test_exp() {
        let q = 5u64;
        assert_eq!(exp(2, 4, q), 1);
        assert_eq!(exp(3, 0, q), 1);
    }

    #[test]
    fn test_modinv() {
        let q = 5u64;
        assert_eq!(inv(4, q), Some(4));
        assert_eq!(inv(0, q), None);
        assert_eq!(inv(5, q), None);
    }

    #[test]
    fn test_extended_gcd() {
        let (gcd, x, y) = extended_gcd(30, 18);
        assert_eq!(gcd, 6);
        assert_eq!(30 * x + 18 * y, 6);
    }

    #[test]
    fn test_inverse_sampled() {
        let fp = PrimeField::new(8380417).unwrap();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let a = rng.gen_range(1..fp.q());
            let a_inv = fp.inverse(a).unwrap();
            assert_eq!(fp.mul(a, a_inv), 1);
        }
        assert_eq!(
            fp.inverse(0),
            Err(NttError::NotInvertible { modulus: 8380417 })
        );
    }

    #[test]
    fn test_new_rejects_non_primes() {
        for q in [0, 1, 2, 4, 12287 * 12289] {
            assert!(matches!(
                PrimeField::new(q),
                Err(NttError::UnsupportedModulus { modulus, .. }) if modulus == q
            ));
        }
        assert_eq!(PrimeField::new(12289).unwrap().q(), 12289);
    }

    #[test]
    fn test_neg() {
        let fp = PrimeField::new(12289).unwrap();
        assert_eq!(fp.neg(0), 0);
        assert_eq!(fp.neg(1), 12288);
    }

    #[test]
    fn test_half() {
        let fp = PrimeField::new(12289).unwrap();
        assert_eq!(fp.mul(fp.half(), 2), 1);
    }

    #[test]
    fn test_sqrt_needs_three_mod_four() {
        let fp = PrimeField::new(12289).unwrap();
        assert!(matches!(
            fp.sqrt(4),
            Err(NttError::UnsupportedModulus { modulus: 12289, .. })
        ));
    }

    #[test]
    fn test_sqrt_generic_prime() {
        // 7 = 3 mod 4
        let fp = PrimeField::new(7).unwrap();
        for b in 0..7 {
            let a = fp.mul(b, b);
            let r = fp.sqrt(a).unwrap();
            assert_eq!(fp.mul(r, r), a);
        }
        // 3 is a non-residue mod 7
        assert_eq!(fp.sqrt(3), Err(NttError::NotQuadraticResidue { modulus: 7 }));
    }

    #[test]
    fn test_quadratic_residue() {
        let fp = PrimeField::new(12289).unwrap();
        assert!(fp.is_quadratic_residue(0));
        assert!(fp.is_quadratic_residue(4));
        assert!(!fp.is_quadratic_residue(11));
    }
}
