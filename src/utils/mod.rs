mod grid_search;
mod helper_functions;
mod mock_rng;
mod quadrature;
mod random;

#[cfg(test)]
pub(crate) mod testing;

pub use grid_search::HashGridSearcher;
pub use helper_functions::{check_ascending, float_to_index, float_to_int, search_bin};
pub use mock_rng::MockRng;
pub use quadrature::GaussKronrodIntegrator;
pub use random::{RandomNumberStream, RngStream};
