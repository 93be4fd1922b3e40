//! Divide-and-conquer NTT: f(x) = f0(x^2) + x f1(x^2).
//!
//! The forward transform recurses on the even/odd coefficients and merges
//! their spectra; the inverse splits a spectrum into the two half-size
//! spectra, recurses, and interleaves the coefficients.

use crate::dft::field::Field;
use crate::dft::roots::RootTableProvider;

/// Below this length both halves are computed on the current thread.
const PAR_MIN_LEN: usize = 1 << 9;

fn join<A, B, RA, RB>(n: usize, oper_a: A, oper_b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if n >= PAR_MIN_LEN {
        rayon::join(oper_a, oper_b)
    } else {
        (oper_a(), oper_b())
    }
}

/// Splits coefficients by index parity.
pub fn split<E: Copy>(f: &[E]) -> (Vec<E>, Vec<E>) {
    let f0 = f.iter().step_by(2).copied().collect();
    let f1 = f.iter().skip(1).step_by(2).copied().collect();
    (f0, f1)
}

/// Interleaves two coefficient vectors, the inverse of [`split`].
pub fn merge<E: Copy>(f0: &[E], f1: &[E]) -> Vec<E> {
    let mut f = Vec::with_capacity(2 * f0.len());
    for (&a, &b) in f0.iter().zip(f1) {
        f.push(a);
        f.push(b);
    }
    f
}

/// Combines the spectra of f0 and f1 into the spectrum of f0(x^2) + x f1(x^2).
pub fn merge_ntt<F, R>(
    field: &F,
    roots: &R,
    f0_ntt: &[F::Elem],
    f1_ntt: &[F::Elem],
) -> Vec<F::Elem>
where
    F: Field,
    R: RootTableProvider<Elem = F::Elem>,
{
    let n = 2 * f0_ntt.len();
    let w = roots.roots(n);
    let mut f_ntt = Vec::with_capacity(n);
    for (i, (&a, &b)) in f0_ntt.iter().zip(f1_ntt).enumerate() {
        let v = field.mul(w[2 * i], b);
        f_ntt.push(field.add(a, v));
        f_ntt.push(field.sub(a, v));
    }
    f_ntt
}

/// Inverse of [`merge_ntt`].
pub fn split_ntt<F, R>(field: &F, roots: &R, f_ntt: &[F::Elem]) -> (Vec<F::Elem>, Vec<F::Elem>)
where
    F: Field,
    R: RootTableProvider<Elem = F::Elem>,
{
    let n = f_ntt.len();
    let w_inv = roots.inverse_roots(n);
    let half = field.half();
    let mut f0_ntt = Vec::with_capacity(n / 2);
    let mut f1_ntt = Vec::with_capacity(n / 2);
    for (i, pair) in f_ntt.chunks_exact(2).enumerate() {
        f0_ntt.push(field.mul(half, field.add(pair[0], pair[1])));
        f1_ntt.push(field.mul(field.mul(half, w_inv[2 * i]), field.sub(pair[0], pair[1])));
    }
    (f0_ntt, f1_ntt)
}

/// Coefficient form -> NTT form. Recursion depth is log2(n).
pub fn ntt<F, R>(field: &F, roots: &R, f: &[F::Elem]) -> Vec<F::Elem>
where
    F: Field,
    R: RootTableProvider<Elem = F::Elem>,
{
    debug_assert!(f.len() <= 1 || f.len().is_power_of_two());
    match f.len() {
        // x + 1 has the single root -1 and f is constant
        0 | 1 => f.to_vec(),
        2 => {
            let sqr1 = roots.roots(2)[0];
            let v = field.mul(sqr1, f[1]);
            vec![field.add(f[0], v), field.sub(f[0], v)]
        }
        n => {
            let (f0, f1) = split(f);
            let (f0_ntt, f1_ntt) = join(
                n,
                || ntt(field, roots, &f0),
                || ntt(field, roots, &f1),
            );
            merge_ntt(field, roots, &f0_ntt, &f1_ntt)
        }
    }
}

/// NTT form -> coefficient form.
pub fn intt<F, R>(field: &F, roots: &R, f_ntt: &[F::Elem]) -> Vec<F::Elem>
where
    F: Field,
    R: RootTableProvider<Elem = F::Elem>,
{
    debug_assert!(f_ntt.len() <= 1 || f_ntt.len().is_power_of_two());
    match f_ntt.len() {
        0 | 1 => f_ntt.to_vec(),
        2 => {
            let half = field.half();
            let sqr1_inv = roots.inverse_roots(2)[0];
            vec![
                field.mul(half, field.add(f_ntt[0], f_ntt[1])),
                field.mul(field.mul(half, sqr1_inv), field.sub(f_ntt[0], f_ntt[1])),
            ]
        }
        n => {
            let (f0_ntt, f1_ntt) = split_ntt(field, roots, f_ntt);
            let (f0, f1) = join(
                n,
                || intt(field, roots, &f0_ntt),
                || intt(field, roots, &f1_ntt),
            );
            merge(&f0, &f1)
        }
    }
}
