pub mod ext_field;
pub mod field;
pub(crate) mod iterative;
pub(crate) mod lazy;
pub(crate) mod lift;
pub mod mersenne;
pub mod ntt;
pub mod params;
pub(crate) mod recursive;
pub mod roots;
pub mod util;

use crate::dft::ntt::Spectrum;
use crate::error::Result;

/// A negacyclic transform over the coefficient vectors of one modulus.
pub trait DFT {
    /// Coefficient form -> NTT form.
    fn forward(&self, f: &[u64]) -> Result<Spectrum>;
    /// NTT form -> coefficient form.
    fn backward(&self, f_ntt: &Spectrum) -> Result<Vec<u64>>;
}
