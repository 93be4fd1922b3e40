//! The embedding F_q[x]/(x^n + 1) -> F_q^2[y]/(y^(n/2) + 1), x -> omega y.
//!
//! omega is a primitive 2n-th root with omega^(n/2) = u. Since y^(n/2) = -1,
//! x^(n/2) maps to -u and coefficient i of the image is omega^i (a_i - u a_(i+n/2)).

use crate::dft::ext_field::{Fp2, QuadraticExtension};
use crate::dft::field::Field;
use crate::dft::roots::RootTableProvider;
use crate::error::Result;

/// n coefficients in F_q to n/2 coefficients in F_q^2.
pub fn fp_to_fp2<B, R>(field: &QuadraticExtension<B>, roots: &R, f: &[u64]) -> Vec<Fp2>
where
    B: Field<Elem = u64>,
    R: RootTableProvider<Elem = Fp2>,
{
    let half = f.len() / 2;
    let base = field.base();
    let omega = roots.lift_root(f.len());

    let mut omega_i = field.one();
    let mut out = Vec::with_capacity(half);
    for (&lo, &hi) in f[..half].iter().zip(&f[half..]) {
        out.push(field.mul(Fp2::new(lo, base.neg(hi)), omega_i));
        omega_i = field.mul(omega_i, omega);
    }
    out
}

/// Inverse of [`fp_to_fp2`]: undo the omega^i scaling, then c0 gives a_i and
/// -c1 gives a_(i+n/2).
pub fn fp2_to_fp<B, R>(field: &QuadraticExtension<B>, roots: &R, a: &[Fp2]) -> Result<Vec<u64>>
where
    B: Field<Elem = u64>,
    R: RootTableProvider<Elem = Fp2>,
{
    let base = field.base();
    let omega_inv = field.inverse(roots.lift_root(2 * a.len()))?;

    let mut omega_inv_i = field.one();
    let mut lo = Vec::with_capacity(2 * a.len());
    let mut hi = Vec::with_capacity(a.len());
    for &c in a {
        let c = field.mul(c, omega_inv_i);
        omega_inv_i = field.mul(omega_inv_i, omega_inv);
        lo.push(c.c0);
        hi.push(base.neg(c.c1));
    }
    lo.extend(hi);
    Ok(lo)
}
