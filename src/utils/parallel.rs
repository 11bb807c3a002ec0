use rayon::prelude::*;

/// Maps collection and collects results into vector in parallel.
/// Result order matches source order, so selection stays deterministic.
pub fn parallel_collect<T, F, R>(source: &[T], map_op: F) -> Vec<R>
where
    T: Send + Sync,
    F: Fn(&T) -> R + Send + Sync,
    R: Send,
{
    source.par_iter().map(map_op).collect()
}
