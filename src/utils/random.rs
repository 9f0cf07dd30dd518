use rand::{Rng, RngCore, distributions::Standard};

use crate::unitf64::UnitF64;

//=====================================================================
// Source of uniform random numbers for a single history. Every
// sampling routine takes the stream explicitly, there is no global
// generator.
//=====================================================================
pub trait RandomNumberStream {
    // Uniform draw in [0, 1)
    fn next_uniform(&mut self) -> f64;

    #[inline]
    fn next_unit(&mut self) -> UnitF64 {
        UnitF64::new_unchecked(self.next_uniform())
    }
}

impl<T: RandomNumberStream + ?Sized> RandomNumberStream for &mut T {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

// Adapts any rand generator into a RandomNumberStream
#[derive(Debug, Clone)]
pub struct RngStream<R: RngCore>(pub R);

impl<R: RngCore> RngStream<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: RngCore> RandomNumberStream for RngStream<R> {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.0.sample(Standard)
    }
}
