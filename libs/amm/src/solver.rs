//! Fixed-point root finder shared by the invariant and balance solvers
//!
//! Both stable pool solvers are Newton iterations over integers that stop
//! once two consecutive estimates are within one unit. Both share the
//! iteration budget and the tolerance defined here.

use crate::error::{MathError, RootFinderError};
use primitive_types::U256;
use tracing::{trace, warn};

/// Iteration budget of every solver loop
pub const MAX_ITERATIONS: u32 = 255;

/// Largest step between estimates accepted as converged
pub const CONVERGENCE_TOLERANCE: U256 = U256([1, 0, 0, 0]);

/// Converged estimate and the number of steps it took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convergence {
    pub value: U256,
    pub iterations: u32,
}

/// Integer Newton iteration driver
pub struct RootFinder;

impl RootFinder {
    /// Apply `step` to `seed` until the estimate moves by at most one unit
    ///
    /// # Arguments
    /// * `label` - Name used in log events
    /// * `seed` - Initial estimate
    /// * `step` - Maps the previous estimate to the next one
    ///
    /// # Returns
    /// The first estimate within tolerance of its predecessor, or
    /// `DidNotConverge` after [`MAX_ITERATIONS`] steps. Arithmetic errors
    /// raised by `step` abort the iteration unchanged.
    pub fn converge<F>(
        label: &'static str,
        seed: U256,
        mut step: F,
    ) -> Result<Convergence, RootFinderError>
    where
        F: FnMut(U256) -> Result<U256, MathError>,
    {
        let mut estimate = seed;

        for iteration in 1..=MAX_ITERATIONS {
            let previous = estimate;
            estimate = step(previous)?;
            trace!("{} iteration {}: {}", label, iteration, estimate);

            if Self::abs_diff(estimate, previous) <= CONVERGENCE_TOLERANCE {
                return Ok(Convergence {
                    value: estimate,
                    iterations: iteration,
                });
            }
        }

        warn!(
            "{} did not converge after {} iterations, last estimate {}",
            label, MAX_ITERATIONS, estimate
        );
        Err(RootFinderError::DidNotConverge {
            iterations: MAX_ITERATIONS,
            last: estimate,
        })
    }

    fn abs_diff(a: U256, b: U256) -> U256 {
        if a > b {
            a - b
        } else {
            b - a
        }
    }
}
