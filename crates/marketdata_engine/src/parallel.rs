//! Rayon-based execution of independent jobs.
//!
//! Jobs within a discovery round or a build layer are independent. They are
//! mapped on the rayon pool when there are enough of them to pay for the
//! scheduling, and sequentially otherwise. Results keep the input order.

use rayon::prelude::*;

use crate::config::EngineConfig;

/// Maps each item through `mapper`, in parallel when the config allows it.
///
/// # Returns
///
/// Vector of mapped results, in input order.
pub fn map_jobs<T, R, F>(items: &[T], config: &EngineConfig, mapper: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if config.should_parallelize(items.len()) {
        items.par_iter().map(mapper).collect()
    } else {
        items.iter().map(mapper).collect()
    }
}
