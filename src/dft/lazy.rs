//! Butterfly networks that defer every modular reduction to one final pass.
//!
//! Values grow by about 15 bits per stage. Forward: V < q << (15 l + 14) at
//! stage l, so q << (15 l + 14) - V stands in for -V. Inverse: U, V < q << 15 l.
//! Both bounds rely on 2q < 2^15 and hold for q = 12289 up to 2^11 points
//! (at most 178 bits); they are not valid for other moduli. Every operation
//! on the wide intermediates is checked, and any overflow or negative value
//! is reported instead of wrapping.

use tracing::trace;

use crate::dft::params::FALCON_Q;
use crate::dft::roots::RootTableProvider;
use crate::error::{NttError, Result};

/// Bounds-checked little-endian 256-bit unsigned integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct U256([u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0; 4]);

    #[inline]
    pub const fn from_u64(x: u64) -> Self {
        U256([x, 0, 0, 0])
    }

    /// x << shift, None if bits fall off the top.
    pub fn shl(x: u64, shift: u32) -> Option<Self> {
        let limb = (shift / 64) as usize;
        let offset = shift % 64;
        if limb >= 4 {
            return if x == 0 { Some(Self::ZERO) } else { None };
        }
        let mut out = [0u64; 4];
        out[limb] = x << offset;
        let carry = if offset == 0 { 0 } else { x >> (64 - offset) };
        if carry != 0 {
            if limb + 1 >= 4 {
                return None;
            }
            out[limb + 1] = carry;
        }
        Some(U256(out))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let mut out = [0u64; 4];
        let mut carry = false;
        for (i, limb) in out.iter_mut().enumerate() {
            let (s, c1) = self.0[i].overflowing_add(rhs.0[i]);
            let (s, c2) = s.overflowing_add(carry as u64);
            *limb = s;
            carry = c1 || c2;
        }
        if carry {
            None
        } else {
            Some(U256(out))
        }
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let mut out = [0u64; 4];
        let mut borrow = false;
        for (i, limb) in out.iter_mut().enumerate() {
            let (d, b1) = self.0[i].overflowing_sub(rhs.0[i]);
            let (d, b2) = d.overflowing_sub(borrow as u64);
            *limb = d;
            borrow = b1 || b2;
        }
        if borrow {
            None
        } else {
            Some(U256(out))
        }
    }

    pub fn checked_mul_u64(self, k: u64) -> Option<Self> {
        let mut out = [0u64; 4];
        let mut carry = 0u128;
        for (i, limb) in out.iter_mut().enumerate() {
            let wide = (self.0[i] as u128) * (k as u128) + carry;
            *limb = wide as u64;
            carry = wide >> 64;
        }
        if carry != 0 {
            None
        } else {
            Some(U256(out))
        }
    }

    /// self mod m, folding limbs from the top.
    pub fn rem_u64(self, m: u64) -> u64 {
        let mut r = 0u128;
        for &limb in self.0.iter().rev() {
            r = ((r << 64) | limb as u128) % m as u128;
        }
        r as u64
    }

    pub fn bits(&self) -> u32 {
        match self.0.iter().rposition(|&l| l != 0) {
            Some(i) => 64 * i as u32 + (64 - self.0[i].leading_zeros()),
            None => 0,
        }
    }
}

fn check_modulus(q: u64) -> Result<()> {
    if q != FALCON_Q {
        return Err(NttError::UnsupportedModulus {
            modulus: q,
            reason: "lazy reduction bounds only hold for q = 12289",
        });
    }
    Ok(())
}

fn max_bits(a: &[U256]) -> u32 {
    a.iter().map(U256::bits).max().unwrap_or(0)
}

/// Forward NTT with one reduction at the end; equals the reduced transform.
pub fn forward_without_mod<R>(roots: &R, q: u64, f: &[u64]) -> Result<Vec<u64>>
where
    R: RootTableProvider<Elem = u64>,
{
    check_modulus(q)?;
    let n = f.len();
    let twiddles = roots.twiddles(n);
    let mut a: Vec<U256> = f.iter().map(|&x| U256::from_u64(x)).collect();

    let mut t = n;
    let mut m = 1;
    let mut stage = 0;
    while m < n {
        t >>= 1;
        let overflow = || NttError::ReductionBoundExceeded { stage };
        let neg_offset = U256::shl(q, 15 * stage as u32 + 14).ok_or_else(overflow)?;
        for i in 0..m {
            let j1 = 2 * i * t;
            let s = twiddles[m + i];
            for j in j1..j1 + t {
                let u = a[j];
                let v = a[j + t].checked_mul_u64(s).ok_or_else(overflow)?;
                a[j] = u.checked_add(v).ok_or_else(overflow)?;
                a[j + t] = u
                    .checked_add(neg_offset)
                    .and_then(|x| x.checked_sub(v))
                    .ok_or_else(overflow)?;
            }
        }
        trace!(stage, bits = max_bits(&a), "lazy forward stage");
        m <<= 1;
        stage += 1;
    }
    Ok(a.into_iter().map(|x| x.rem_u64(q)).collect())
}

/// Inverse NTT with one reduction (and the n^-1 scaling) at the end.
pub fn backward_without_mod<R>(roots: &R, q: u64, f_ntt: &[u64]) -> Result<Vec<u64>>
where
    R: RootTableProvider<Elem = u64>,
{
    check_modulus(q)?;
    let n = f_ntt.len();
    let inv_twiddles = roots.inverse_twiddles(n);
    let mut a: Vec<U256> = f_ntt.iter().map(|&x| U256::from_u64(x)).collect();

    let mut t = 1;
    let mut m = n;
    let mut stage = 0;
    while m > 1 {
        let h = m >> 1;
        let overflow = || NttError::ReductionBoundExceeded { stage };
        let neg_offset = U256::shl(q, 15 * stage as u32).ok_or_else(overflow)?;
        for i in 0..h {
            let j1 = 2 * i * t;
            let s = inv_twiddles[h + i];
            for j in j1..j1 + t {
                let u = a[j];
                let v = a[j + t];
                a[j] = u.checked_add(v).ok_or_else(overflow)?;
                a[j + t] = u
                    .checked_add(neg_offset)
                    .and_then(|x| x.checked_sub(v))
                    .and_then(|x| x.checked_mul_u64(s))
                    .ok_or_else(overflow)?;
            }
        }
        trace!(stage, bits = max_bits(&a), "lazy backward stage");
        t <<= 1;
        m = h;
        stage += 1;
    }

    let n_inv = roots.n_inverse(n);
    Ok(a
        .into_iter()
        .map(|x| ((x.rem_u64(q) as u128 * n_inv as u128) % q as u128) as u64)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::field::PrimeField;
    use crate::dft::iterative::{backward_inplace, forward_inplace};
    use crate::dft::roots::PrecomputedRoots;
    use rand::Rng;

    #[test]
    fn test_u256_ops() {
        let x = U256::shl(1, 200).unwrap();
        assert_eq!(x.bits(), 201);
        assert_eq!(U256::shl(1, 256), None);
        assert_eq!(U256::shl(u64::MAX, 193), None);
        assert_eq!(U256::shl(3, 64).unwrap(), U256([0, 3, 0, 0]));

        let a = U256([u64::MAX, u64::MAX, 0, 0]);
        let b = a.checked_add(U256::from_u64(1)).unwrap();
        assert_eq!(b, U256([0, 0, 1, 0]));
        assert_eq!(b.checked_sub(U256::from_u64(1)).unwrap(), a);
        assert_eq!(U256::ZERO.checked_sub(U256::from_u64(1)), None);
        assert_eq!(U256([0, 0, 0, u64::MAX]).checked_mul_u64(2), None);
        assert_eq!(U256([0, 0, 0, 1 << 63]).checked_add(U256([0, 0, 0, 1 << 63])), None);
    }

    #[test]
    fn test_u256_rem() {
        // 2^64 mod 12289
        let x = U256::shl(1, 64).unwrap();
        assert_eq!(x.rem_u64(12289), ((1u128 << 64) % 12289) as u64);
        let y = U256::from_u64(123_456_789).checked_mul_u64(987_654_321).unwrap();
        assert_eq!(y.rem_u64(12289), (123_456_789u128 * 987_654_321 % 12289) as u64);
    }

    #[test]
    fn test_lazy_matches_reduced() {
        let q = FALCON_Q;
        let fp = PrimeField::new(q).unwrap();
        let table = PrecomputedRoots::for_prime(&fp, 11).unwrap();
        let mut rng = rand::thread_rng();
        for log_n in 1..=11 {
            let f: Vec<u64> = (0..1 << log_n).map(|_| rng.gen_range(0..q)).collect();
            let mut expected = f.clone();
            forward_inplace(&fp, &table, &mut expected);
            assert_eq!(forward_without_mod(&table, q, &f).unwrap(), expected);

            let mut back = expected.clone();
            backward_inplace(&fp, &table, &mut back);
            assert_eq!(backward_without_mod(&table, q, &expected).unwrap(), back);
            assert_eq!(back, f);
        }
    }

    #[test]
    fn test_lazy_worst_case_input() {
        let q = FALCON_Q;
        let fp = PrimeField::new(q).unwrap();
        let table = PrecomputedRoots::for_prime(&fp, 11).unwrap();
        let f = vec![q - 1; 1 << 11];
        let mut expected = f.clone();
        forward_inplace(&fp, &table, &mut expected);
        assert_eq!(forward_without_mod(&table, q, &f).unwrap(), expected);
    }

    #[test]
    fn test_lazy_rejects_other_moduli() {
        let fp = PrimeField::new(8380417).unwrap();
        let table = PrecomputedRoots::for_prime(&fp, 9).unwrap();
        assert!(matches!(
            forward_without_mod(&table, 8380417, &[1, 2]),
            Err(NttError::UnsupportedModulus { modulus: 8380417, .. })
        ));
    }

    /// Twiddles far above 2q, so the per-stage bounds cannot hold.
    struct WideTwiddles(Vec<u64>);

    impl RootTableProvider for WideTwiddles {
        type Elem = u64;

        fn max_log_n(&self) -> u32 {
            self.0.len().trailing_zeros()
        }

        fn twiddles(&self, n: usize) -> &[u64] {
            &self.0[..n]
        }

        fn inverse_twiddles(&self, n: usize) -> &[u64] {
            &self.0[..n]
        }

        fn roots(&self, n: usize) -> &[u64] {
            &self.0[..n]
        }

        fn inverse_roots(&self, n: usize) -> &[u64] {
            &self.0[..n]
        }

        fn n_inverse(&self, _n: usize) -> u64 {
            1
        }

        fn lift_root(&self, _n: usize) -> u64 {
            1
        }
    }

    #[test]
    fn test_forward_reports_negative_intermediate() {
        let roots = WideTwiddles(vec![u64::MAX; 4]);
        // stage 0 only multiplies zeros; stage 1 computes 1 + (q << 29) - (2^64 - 1)
        assert_eq!(
            forward_without_mod(&roots, FALCON_Q, &[1, 1, 0, 0]),
            Err(NttError::ReductionBoundExceeded { stage: 1 })
        );
    }

    #[test]
    fn test_backward_reports_overflow() {
        let roots = WideTwiddles(vec![u64::MAX; 32]);
        let mut f = vec![0; 32];
        f[0] = 1;
        // each stage multiplies by a 64-bit twiddle, stage 4 needs more than 256 bits
        assert_eq!(
            backward_without_mod(&roots, FALCON_Q, &f),
            Err(NttError::ReductionBoundExceeded { stage: 4 })
        );
        assert!(backward_without_mod(&roots, FALCON_Q, &f[..16]).is_ok());
    }
}
