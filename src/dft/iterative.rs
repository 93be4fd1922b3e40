//! In-place butterfly networks, eprint 2016/504 Algorithms 1 and 2.
//!
//! The groups of one stage touch disjoint slices and run on the rayon pool;
//! a stage starts only after the previous parallel iterator has drained.

use rayon::prelude::*;

use crate::dft::field::Field;
use crate::dft::roots::RootTableProvider;

/// Groups handed to one rayon task.
const MIN_GROUPS_PER_TASK: usize = 16;

/// Cooley-Tukey forward NTT, natural-order input, bit-reversed evaluation order.
///
/// - `a`: length n, a power of two covered by `roots`
pub fn forward_inplace<F, R>(field: &F, roots: &R, a: &mut [F::Elem])
where
    F: Field,
    R: RootTableProvider<Elem = F::Elem>,
{
    let n = a.len();
    debug_assert!(n.is_power_of_two());
    let twiddles = roots.twiddles(n);
    let mut t = n;
    let mut m = 1;
    while m < n {
        t >>= 1;
        a.par_chunks_mut(2 * t)
            .zip(twiddles[m..2 * m].par_iter())
            .with_min_len(MIN_GROUPS_PER_TASK)
            .for_each(|(group, &s)| {
                let (lo, hi) = group.split_at_mut(t);
                for (u, v) in lo.iter_mut().zip(hi.iter_mut()) {
                    let x = *u;
                    let y = field.mul(*v, s);
                    *u = field.add(x, y);
                    *v = field.sub(x, y);
                }
            });
        m <<= 1;
    }
}

/// Gentleman-Sande inverse NTT followed by the n^-1 scaling.
pub fn backward_inplace<F, R>(field: &F, roots: &R, a: &mut [F::Elem])
where
    F: Field,
    R: RootTableProvider<Elem = F::Elem>,
{
    let n = a.len();
    debug_assert!(n.is_power_of_two());
    let inv_twiddles = roots.inverse_twiddles(n);
    let mut t = 1;
    let mut m = n;
    while m > 1 {
        let h = m >> 1;
        a.par_chunks_mut(2 * t)
            .zip(inv_twiddles[h..m].par_iter())
            .with_min_len(MIN_GROUPS_PER_TASK)
            .for_each(|(group, &s)| {
                let (lo, hi) = group.split_at_mut(t);
                for (u, v) in lo.iter_mut().zip(hi.iter_mut()) {
                    let x = *u;
                    let y = *v;
                    *u = field.add(x, y);
                    *v = field.mul(field.sub(x, y), s);
                }
            });
        t <<= 1;
        m = h;
    }

    let n_inv = roots.n_inverse(n);
    a.par_iter_mut()
        .with_min_len(MIN_GROUPS_PER_TASK * 64)
        .for_each(|x| *x = field.mul(*x, n_inv));
}
