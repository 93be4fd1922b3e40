use crate::dft::field::{add, mul, sub, Field};

/// Naive negacyclic polynomial multiplication.
/// Interprets x^n = -1 and subtracts terms when the index exceeds n.
/// This is the O(n^2) reference for NTT-based multiplication.
pub fn naive_negacyclic(a: &[u64], b: &[u64], q: u64) -> Vec<u64> {
    let n = a.len();
    let mut c = vec![0u64; n];

    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            let prod = mul(ai, bj, q);
            let idx = i + j;

            // If idx < n, just add to c[idx].
            // If idx >= n, we interpret x^n = -1, so c[idx - n] -= product.
            if idx < n {
                c[idx] = add(c[idx], prod, q);
            } else {
                c[idx - n] = sub(c[idx - n], prod, q);
            }
        }
    }
    c
}

/// a[i] *= b[i] in the given field.
pub fn pointwise<F: Field>(field: &F, a: &mut [F::Elem], b: &[F::Elem]) {
    for (x, &y) in a.iter_mut().zip(b) {
        *x = field.mul(*x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::field::PrimeField;

    #[test]
    fn test_naive_negacyclic_simple() {
        let p = 19u64;
        let a = [1u64, 2, 3, 4];
        let b = [2u64, 2, 2, 2];
        let c = naive_negacyclic(&a, &b, p);
        assert_eq!(c, [3, 11, 4, 1]);
    }

    #[test]
    fn test_naive_negacyclic_wraps_sign() {
        // x * x = x^2 = -1 mod x^2 + 1
        let c = naive_negacyclic(&[0, 1], &[0, 1], 19);
        assert_eq!(c, [18, 0]);
    }

    #[test]
    fn test_pointwise_simple() {
        let fp = PrimeField::new(19).unwrap();
        let mut a = [3u64, 5];
        let b = [7u64, 2];
        pointwise(&fp, &mut a, &b);
        assert_eq!(a, [2, 10]);
    }
}
