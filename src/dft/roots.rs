//! Root-of-unity tables for the transform engines.
//!
//! Every table hangs off one primitive 2N-th root of unity psi (N = 2^log_n),
//! so a length-n prefix or sub-table serves every smaller length n:
//!
//! - twiddles: psi^brv(i), the stage factors of the butterfly network;
//! - roots of x^n + 1 in recursive order, w_n[k] = psi_n^(2 brv(k) + 1) with
//!   psi_n = psi^(N/n), satisfying w_n[2k+1] = -w_n[2k] and w_{n/2}[k] = w_n[2k]^2.
//!
//! With this ordering the iterative and recursive engines emit identical
//! evaluation vectors.

use plonky2_util::{log2_strict, reverse_index_bits_in_place};
use tracing::debug;

use crate::dft::ext_field::{Fp2, QuadraticExtension};
use crate::dft::field::{Field, PrimeField};
use crate::dft::params::two_adicity;
use crate::error::{NttError, Result};

/// Read-only twiddle data consumed by the engines.
///
/// `n` is always a power of two not exceeding `2^max_log_n()`.
pub trait RootTableProvider: Send + Sync {
    type Elem: Copy + Send + Sync;

    fn max_log_n(&self) -> u32;

    /// psi_n^brv(i) for i in [0, n), bit-reversed order.
    fn twiddles(&self, n: usize) -> &[Self::Elem];

    /// psi_n^-brv(i) for i in [0, n).
    fn inverse_twiddles(&self, n: usize) -> &[Self::Elem];

    /// The n roots of x^n + 1 in recursive order.
    fn roots(&self, n: usize) -> &[Self::Elem];

    /// Elementwise inverses of [`RootTableProvider::roots`].
    fn inverse_roots(&self, n: usize) -> &[Self::Elem];

    fn n_inverse(&self, n: usize) -> Self::Elem;

    /// A primitive 2n-th root omega, mapping x -> omega y in the lifted path.
    fn lift_root(&self, n: usize) -> Self::Elem;
}

/// Tables computed once for a modulus and owned by its configuration.
#[derive(Clone, Debug)]
pub struct PrecomputedRoots<E> {
    log_n: u32,
    fwd_twid: Vec<E>,
    inv_twid: Vec<E>,
    /// indexed by log2(n)
    roots: Vec<Vec<E>>,
    inv_roots: Vec<Vec<E>>,
    n_inv: Vec<E>,
    /// psi_chain[k] is a primitive 2^(k+1)-th root
    psi_chain: Vec<E>,
}

impl<E: Copy + Eq + std::fmt::Debug + Send + Sync> PrecomputedRoots<E> {
    /// Builds every table from `psi`, a primitive 2^(log_n+1)-th root of unity.
    pub fn new<F: Field<Elem = E>>(field: &F, psi: E, log_n: u32) -> Result<Self> {
        let n = 1usize << log_n;
        let minus_one = field.neg(field.one());
        if log_n == 0 || field.pow(psi, n as u64) != minus_one {
            return Err(NttError::UnsupportedModulus {
                modulus: field.modulus(),
                reason: "root of unity has the wrong order",
            });
        }
        let psi_inv = field.inverse(psi)?;

        let (fwd_twid, inv_twid) = build_bitrev_tables(field, log_n, psi, psi_inv);
        let roots = build_recursive_roots(field, log_n, psi);
        let inv_roots = build_recursive_roots(field, log_n, psi_inv);

        let mut psi_chain = vec![psi; log_n as usize + 1];
        for k in (0..log_n as usize).rev() {
            psi_chain[k] = field.square(psi_chain[k + 1]);
        }

        let mut n_inv = Vec::with_capacity(log_n as usize + 1);
        let mut len = field.one();
        let two = field.from_base(2);
        for _ in 0..=log_n {
            n_inv.push(field.inverse(len)?);
            len = field.mul(len, two);
        }

        Ok(Self {
            log_n,
            fwd_twid,
            inv_twid,
            roots,
            inv_roots,
            n_inv,
            psi_chain,
        })
    }
}

impl PrecomputedRoots<u64> {
    /// Tables for a prime with 2^(log_n+1) | q - 1.
    pub fn for_prime(field: &PrimeField, log_n: u32) -> Result<Self> {
        let psi = find_prime_psi(field, log_n)?;
        debug!(q = field.q(), log_n, psi, "built prime-field root tables");
        Self::new(field, psi, log_n)
    }
}

impl PrecomputedRoots<Fp2> {
    /// Tables over F_q[u]/(u^2 + 1), reaching Fp lengths up to 2^log_n.
    pub fn for_extension<B: Field<Elem = u64>>(
        field: &QuadraticExtension<B>,
        log_n: u32,
    ) -> Result<Self> {
        let psi = find_extension_psi(field, log_n)?;
        debug!(
            q = field.modulus(),
            log_n,
            psi = ?psi,
            "built extension-field root tables"
        );
        Self::new(field, psi, log_n)
    }
}

impl<E: Copy + Send + Sync> RootTableProvider for PrecomputedRoots<E> {
    type Elem = E;

    #[inline(always)]
    fn max_log_n(&self) -> u32 {
        self.log_n
    }

    #[inline(always)]
    fn twiddles(&self, n: usize) -> &[E] {
        &self.fwd_twid[..n]
    }

    #[inline(always)]
    fn inverse_twiddles(&self, n: usize) -> &[E] {
        &self.inv_twid[..n]
    }

    #[inline(always)]
    fn roots(&self, n: usize) -> &[E] {
        &self.roots[log2_strict(n)]
    }

    #[inline(always)]
    fn inverse_roots(&self, n: usize) -> &[E] {
        &self.inv_roots[log2_strict(n)]
    }

    #[inline(always)]
    fn n_inverse(&self, n: usize) -> E {
        self.n_inv[log2_strict(n)]
    }

    #[inline(always)]
    fn lift_root(&self, n: usize) -> E {
        self.psi_chain[log2_strict(n)]
    }
}

/// fwd[brv(i)] = psi^i, inv[brv(i)] = psi_inv^i over log_n bits.
fn build_bitrev_tables<F: Field>(
    field: &F,
    log_n: u32,
    psi: F::Elem,
    psi_inv: F::Elem,
) -> (Vec<F::Elem>, Vec<F::Elem>) {
    let n = 1usize << log_n;
    let mut fwd = Vec::with_capacity(n);
    let mut inv = Vec::with_capacity(n);

    let mut cur_f = field.one();
    let mut cur_i = field.one();

    for _ in 0..n {
        fwd.push(cur_f);
        inv.push(cur_i);

        cur_f = field.mul(cur_f, psi);
        cur_i = field.mul(cur_i, psi_inv);
    }
    reverse_index_bits_in_place(&mut fwd);
    reverse_index_bits_in_place(&mut inv);
    (fwd, inv)
}

/// roots[k] holds the 2^k roots of x^(2^k) + 1; the top level takes the odd
/// powers of psi, every lower level squares the even entries of the one above.
fn build_recursive_roots<F: Field>(field: &F, log_n: u32, psi: F::Elem) -> Vec<Vec<F::Elem>> {
    let n = 1usize << log_n;
    let psi_sq = field.square(psi);

    let mut top = Vec::with_capacity(n);
    let mut odd_power = psi;
    for _ in 0..n {
        top.push(odd_power);
        odd_power = field.mul(odd_power, psi_sq);
    }
    reverse_index_bits_in_place(&mut top);

    let mut levels = vec![top];
    for _ in 0..log_n {
        let upper = &levels[levels.len() - 1];
        let lower = upper
            .iter()
            .step_by(2)
            .map(|&w| field.square(w))
            .collect::<Vec<_>>();
        levels.push(lower);
    }
    levels.reverse();
    levels
}

/// A primitive 2^(log_n+1)-th root whose degree-2 power, a square root of
/// -1, is the smaller of its two representatives.
fn find_prime_psi(field: &PrimeField, log_n: u32) -> Result<u64> {
    let q = field.q();
    let s = two_adicity(q - 1);
    if log_n == 0 || log_n + 1 > s {
        return Err(NttError::UnsupportedModulus {
            modulus: q,
            reason: "q - 1 has too few factors of two",
        });
    }
    // a non-residue raised to the odd part of q - 1 has order exactly 2^s
    let z = (2..q)
        .find(|&z| !field.is_quadratic_residue(z))
        .ok_or(NttError::UnsupportedModulus {
            modulus: q,
            reason: "no quadratic non-residue",
        })?;
    let g = field.pow(z, (q - 1) >> s);
    let mut psi = field.pow(g, 1 << (s - log_n - 1));

    let sqrt_minus_one = field.pow(psi, 1 << (log_n - 1));
    if sqrt_minus_one > q - sqrt_minus_one {
        psi = field.inverse(psi)?;
    }
    Ok(psi)
}

/// Square roots taken from u: u has order 4, and each root doubles the order,
/// so psi^(2^(log_n-1)) = u exactly.
fn find_extension_psi<B: Field<Elem = u64>>(
    field: &QuadraticExtension<B>,
    log_n: u32,
) -> Result<Fp2> {
    let mut psi = Fp2::U;
    for _ in 1..log_n {
        psi = field.sqrt(psi)?;
    }
    Ok(psi)
}
