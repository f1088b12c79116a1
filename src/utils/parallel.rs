#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;

/// Below this many items the thread pool costs more than it saves.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
const PARALLEL_THRESHOLD: usize = 64;

/// Finds the result for the earliest item (in slice order) for which `f`
/// returns `Some`, running in parallel when the `parallel` feature is on.
///
/// The returned value is the same in both modes, so callers get
/// deterministic diagnostics regardless of scheduling.
#[inline]
pub fn find_map_first<T, R, F>(collection: &[T], f: F) -> Option<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> Option<R> + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if collection.len() > PARALLEL_THRESHOLD {
            return collection
                .par_iter()
                .enumerate()
                .find_map_first(|(i, item)| f(i, item));
        }
        collection.iter().enumerate().find_map(|(i, item)| f(i, item))
    }
    #[cfg(any(not(feature = "parallel"), target_arch = "wasm32"))]
    {
        collection.iter().enumerate().find_map(|(i, item)| f(i, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_map_first_is_ordered() {
        let items: Vec<usize> = (0..1000).collect();
        let found = find_map_first(&items, |i, &v| (v % 7 == 3).then_some(i));
        assert_eq!(found, Some(3));
        assert_eq!(find_map_first(&items, |_, &v| (v > 5000).then_some(v)), None);
    }
}
