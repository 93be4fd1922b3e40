//! Per-modulus configuration: validated parameters, the arithmetic strategy
//! chosen once at construction, and the root tables every transform reads.

use tracing::debug;

use crate::dft::ext_field::{Fp2, QuadraticExtension};
use crate::dft::field::PrimeField;
use crate::dft::mersenne::Mersenne31;
use crate::dft::params::{ModulusParams, Structure};
use crate::dft::roots::PrecomputedRoots;
use crate::dft::util::pointwise;
use crate::dft::{iterative, lazy, lift, recursive, DFT};
use crate::error::{NttError, Result};

/// The arithmetic the engines run in.
#[derive(Clone, Debug)]
pub enum Strategy {
    /// Transforms directly over F_q.
    Native {
        field: PrimeField,
        roots: PrecomputedRoots<u64>,
    },
    /// Lifts n coefficients to n/2 values of F_q[u]/(u^2 + 1) first.
    Lifted {
        field: QuadraticExtension<Mersenne31>,
        roots: PrecomputedRoots<Fp2>,
    },
}

/// NTT form of a polynomial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Spectrum {
    /// n evaluations in F_q.
    Native(Vec<u64>),
    /// n/2 evaluations in F_q^2.
    Lifted(Vec<Fp2>),
}

impl Spectrum {
    pub fn len(&self) -> usize {
        match self {
            Spectrum::Native(v) => v.len(),
            Spectrum::Lifted(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_native(&self) -> Option<&[u64]> {
        match self {
            Spectrum::Native(v) => Some(v),
            Spectrum::Lifted(_) => None,
        }
    }

    pub fn as_lifted(&self) -> Option<&[Fp2]> {
        match self {
            Spectrum::Lifted(v) => Some(v),
            Spectrum::Native(_) => None,
        }
    }
}

/// NTT/INTT for one modulus over Z_q[x]/(x^n + 1), n up to 2^max_log_n.
#[derive(Clone, Debug)]
pub struct NttTable {
    params: ModulusParams,
    strategy: Strategy,
}

impl NttTable {
    /// Builds the table for a modulus of [`crate::SUPPORTED_PARAMS`].
    pub fn new(q: u64) -> Result<Self> {
        Self::with_params(ModulusParams::lookup(q)?)
    }

    /// Builds the table for any descriptor whose modulus has the needed structure.
    pub fn with_params(params: ModulusParams) -> Result<Self> {
        let structure = params.structure()?;
        let strategy = match structure {
            Structure::Native => {
                let field = PrimeField::new(params.q)?;
                let roots = PrecomputedRoots::for_prime(&field, params.max_log_n)?;
                Strategy::Native { field, roots }
            }
            Structure::Lifted => {
                let field = QuadraticExtension::new(Mersenne31)?;
                let roots = PrecomputedRoots::for_extension(&field, params.max_log_n)?;
                Strategy::Lifted { field, roots }
            }
        };
        debug!(
            q = params.q,
            max_log_n = params.max_log_n,
            ?structure,
            "ntt table ready"
        );
        Ok(Self { params, strategy })
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.params.q
    }

    #[inline(always)]
    pub fn params(&self) -> ModulusParams {
        self.params
    }

    #[inline(always)]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn is_lifted(&self) -> bool {
        matches!(self.strategy, Strategy::Lifted { .. })
    }

    /// Butterfly-network engine.
    pub fn iterative(&self) -> Iterative<'_> {
        Iterative { table: self }
    }

    /// Split/merge engine.
    pub fn recursive(&self) -> Recursive<'_> {
        Recursive { table: self }
    }

    pub fn ntt(&self, f: &[u64]) -> Result<Spectrum> {
        self.iterative().forward(f)
    }

    pub fn intt(&self, f_ntt: &Spectrum) -> Result<Vec<u64>> {
        self.iterative().backward(f_ntt)
    }

    pub fn ntt_recursive(&self, f: &[u64]) -> Result<Spectrum> {
        self.recursive().forward(f)
    }

    pub fn intt_recursive(&self, f_ntt: &Spectrum) -> Result<Vec<u64>> {
        self.recursive().backward(f_ntt)
    }

    /// Forward transform reducing only once at the end. q = 12289 only.
    pub fn ntt_without_mod(&self, f: &[u64]) -> Result<Vec<u64>> {
        self.check_coefficients(f)?;
        match &self.strategy {
            Strategy::Native { roots, .. } => lazy::forward_without_mod(roots, self.q(), f),
            Strategy::Lifted { .. } => Err(self.no_lazy_path()),
        }
    }

    /// Inverse transform reducing only once at the end. q = 12289 only.
    pub fn intt_without_mod(&self, f_ntt: &[u64]) -> Result<Vec<u64>> {
        self.check_coefficients(f_ntt)?;
        match &self.strategy {
            Strategy::Native { roots, .. } => lazy::backward_without_mod(roots, self.q(), f_ntt),
            Strategy::Lifted { .. } => Err(self.no_lazy_path()),
        }
    }

    /// Pointwise product of two spectra of this table.
    pub fn pointwise_mul(&self, a: &Spectrum, b: &Spectrum) -> Result<Spectrum> {
        let same_len = |left: usize, right: usize| {
            if left == right {
                Ok(())
            } else {
                Err(NttError::LengthMismatch { left, right })
            }
        };
        match &self.strategy {
            Strategy::Native { field, .. } => {
                let (a, b) = (self.native_values(a)?, self.native_values(b)?);
                same_len(a.len(), b.len())?;
                let mut out = a.to_vec();
                pointwise(field, &mut out, b);
                Ok(Spectrum::Native(out))
            }
            Strategy::Lifted { field, .. } => {
                let (a, b) = (self.lifted_values(a)?, self.lifted_values(b)?);
                same_len(a.len(), b.len())?;
                let mut out = a.to_vec();
                pointwise(field, &mut out, b);
                Ok(Spectrum::Lifted(out))
            }
        }
    }

    fn no_lazy_path(&self) -> NttError {
        NttError::UnsupportedModulus {
            modulus: self.q(),
            reason: "lazy reduction bounds only hold for q = 12289",
        }
    }

    fn check_canonical(&self, values: impl IntoIterator<Item = u64>) -> Result<()> {
        let q = self.q();
        match values.into_iter().find(|&v| v >= q) {
            Some(value) => Err(NttError::InvalidCoefficient { value, modulus: q }),
            None => Ok(()),
        }
    }

    fn check_coefficients(&self, f: &[u64]) -> Result<()> {
        self.params.check_len(f.len())?;
        self.check_canonical(f.iter().copied())
    }

    fn native_values<'s>(&self, f_ntt: &'s Spectrum) -> Result<&'s [u64]> {
        let values = f_ntt.as_native().ok_or(NttError::ShapeMismatch {
            expected: "native",
        })?;
        self.check_coefficients(values)?;
        Ok(values)
    }

    /// n/2 extension values stand for n coefficients.
    fn lifted_values<'s>(&self, f_ntt: &'s Spectrum) -> Result<&'s [Fp2]> {
        let values = f_ntt.as_lifted().ok_or(NttError::ShapeMismatch {
            expected: "lifted",
        })?;
        self.params.check_len(2 * values.len())?;
        self.check_canonical(values.iter().flat_map(|c| [c.c0, c.c1]))?;
        Ok(values)
    }
}

/// [`NttTable`] through the in-place butterfly network.
#[derive(Clone, Copy, Debug)]
pub struct Iterative<'a> {
    table: &'a NttTable,
}

impl DFT for Iterative<'_> {
    fn forward(&self, f: &[u64]) -> Result<Spectrum> {
        self.table.check_coefficients(f)?;
        match &self.table.strategy {
            Strategy::Native { field, roots } => {
                let mut a = f.to_vec();
                iterative::forward_inplace(field, roots, &mut a);
                Ok(Spectrum::Native(a))
            }
            Strategy::Lifted { field, roots } => {
                let mut a = lift::fp_to_fp2(field, roots, f);
                iterative::forward_inplace(field, roots, &mut a);
                Ok(Spectrum::Lifted(a))
            }
        }
    }

    fn backward(&self, f_ntt: &Spectrum) -> Result<Vec<u64>> {
        match &self.table.strategy {
            Strategy::Native { field, roots } => {
                let mut a = self.table.native_values(f_ntt)?.to_vec();
                iterative::backward_inplace(field, roots, &mut a);
                Ok(a)
            }
            Strategy::Lifted { field, roots } => {
                let mut a = self.table.lifted_values(f_ntt)?.to_vec();
                iterative::backward_inplace(field, roots, &mut a);
                lift::fp2_to_fp(field, roots, &a)
            }
        }
    }
}

/// [`NttTable`] through the split/merge recursion.
#[derive(Clone, Copy, Debug)]
pub struct Recursive<'a> {
    table: &'a NttTable,
}

impl DFT for Recursive<'_> {
    fn forward(&self, f: &[u64]) -> Result<Spectrum> {
        self.table.check_coefficients(f)?;
        match &self.table.strategy {
            Strategy::Native { field, roots } => {
                Ok(Spectrum::Native(recursive::ntt(field, roots, f)))
            }
            Strategy::Lifted { field, roots } => {
                let lifted = lift::fp_to_fp2(field, roots, f);
                Ok(Spectrum::Lifted(recursive::ntt(field, roots, &lifted)))
            }
        }
    }

    fn backward(&self, f_ntt: &Spectrum) -> Result<Vec<u64>> {
        match &self.table.strategy {
            Strategy::Native { field, roots } => {
                let values = self.table.native_values(f_ntt)?;
                Ok(recursive::intt(field, roots, values))
            }
            Strategy::Lifted { field, roots } => {
                let values = self.table.lifted_values(f_ntt)?;
                lift::fp2_to_fp(field, roots, &recursive::intt(field, roots, values))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::mersenne::M31;
    use crate::dft::util::naive_negacyclic;
    use crate::SUPPORTED_PARAMS;
    use rand::thread_rng;
    use rand::Rng;

    fn random_poly(q: u64, n: usize) -> Vec<u64> {
        let mut rng = thread_rng();
        (0..n).map(|_| rng.gen_range(0..q)).collect()
    }

    #[test]
    fn test_falcon_two_point_scenario() {
        let q = 12289;
        let table = NttTable::new(q).unwrap();
        let f_ntt = table.ntt(&[1, 2]).unwrap();
        let expected = vec![(1 + 1479 * 2) % q, (q + 1 - 1479 * 2) % q];
        assert_eq!(f_ntt, Spectrum::Native(expected));
        assert_eq!(table.ntt_recursive(&[1, 2]).unwrap(), f_ntt);
        assert_eq!(table.intt(&f_ntt).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_round_trip_all_supported() {
        for p in SUPPORTED_PARAMS.iter() {
            let table = NttTable::with_params(*p).unwrap();
            for log_n in 1..=p.max_log_n {
                let f = random_poly(p.q, 1 << log_n);
                let f_ntt = table.ntt(&f).unwrap();
                assert_eq!(table.intt(&f_ntt).unwrap(), f, "q = {}, n = {}", p.q, f.len());
                assert_eq!(table.intt_recursive(&f_ntt).unwrap(), f);
                assert_eq!(table.ntt_recursive(&f).unwrap(), f_ntt);
            }
        }
    }

    #[test]
    fn test_polymul_all_supported() {
        for p in SUPPORTED_PARAMS.iter() {
            let table = NttTable::with_params(*p).unwrap();
            let n = 64;
            let a = random_poly(p.q, n);
            let b = random_poly(p.q, n);
            let product = table
                .pointwise_mul(&table.ntt(&a).unwrap(), &table.ntt(&b).unwrap())
                .unwrap();
            assert_eq!(table.intt(&product).unwrap(), naive_negacyclic(&a, &b, p.q));
        }
    }

    #[test]
    fn test_lifted_shape() {
        let table = NttTable::new(M31).unwrap();
        assert!(table.is_lifted());
        let f_ntt = table.ntt(&random_poly(M31, 16)).unwrap();
        assert_eq!(f_ntt.len(), 8);
        assert!(f_ntt.as_lifted().is_some());
    }

    #[test]
    fn test_lazy_entry_points() {
        let table = NttTable::new(12289).unwrap();
        let f = random_poly(12289, 1024);
        let lazy = table.ntt_without_mod(&f).unwrap();
        assert_eq!(Spectrum::Native(lazy.clone()), table.ntt(&f).unwrap());
        assert_eq!(table.intt_without_mod(&lazy).unwrap(), f);

        for q in [8380417, M31] {
            let table = NttTable::new(q).unwrap();
            assert!(matches!(
                table.ntt_without_mod(&[1, 2]),
                Err(NttError::UnsupportedModulus { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let table = NttTable::new(12289).unwrap();
        assert_eq!(
            table.ntt(&[1, 2, 3]),
            Err(NttError::InvalidLength { n: 3, max_log_n: 11 })
        );
        assert_eq!(
            table.ntt(&vec![0; 4096]),
            Err(NttError::InvalidLength { n: 4096, max_log_n: 11 })
        );
        assert_eq!(
            table.ntt(&[1, 12289]),
            Err(NttError::InvalidCoefficient { value: 12289, modulus: 12289 })
        );
        assert_eq!(
            table.intt(&Spectrum::Lifted(vec![Fp2::new(1, 2)])),
            Err(NttError::ShapeMismatch { expected: "native" })
        );
        let lifted = NttTable::new(M31).unwrap();
        assert_eq!(
            lifted.intt_recursive(&Spectrum::Native(vec![1, 2])),
            Err(NttError::ShapeMismatch { expected: "lifted" })
        );
        assert!(matches!(
            NttTable::new(7681),
            Err(NttError::UnsupportedModulus { modulus: 7681, .. })
        ));
    }

    #[test]
    fn test_pointwise_length_mismatch() {
        let table = NttTable::new(12289).unwrap();
        let a = table.ntt(&random_poly(12289, 4)).unwrap();
        let b = table.ntt(&random_poly(12289, 8)).unwrap();
        assert_eq!(
            table.pointwise_mul(&a, &b),
            Err(NttError::LengthMismatch { left: 4, right: 8 })
        );

        let lifted = NttTable::new(M31).unwrap();
        let a = lifted.ntt(&random_poly(M31, 8)).unwrap();
        let b = lifted.ntt(&random_poly(M31, 4)).unwrap();
        assert_eq!(
            lifted.pointwise_mul(&a, &b),
            Err(NttError::LengthMismatch { left: 4, right: 2 })
        );
    }

    #[test]
    fn test_custom_params() {
        // Kyber's modulus with a full negacyclic NTT of length 128
        let table = NttTable::with_params(ModulusParams::new(3329, 7)).unwrap();
        let f = random_poly(3329, 128);
        assert_eq!(table.intt(&table.ntt(&f).unwrap()).unwrap(), f);
    }
}
