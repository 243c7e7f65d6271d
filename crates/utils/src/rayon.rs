// Copyright 2024 Irreducible Inc.

use std::{env, sync::OnceLock};

/// Runs the global pool on the calling thread when `RAYON_NUM_THREADS=1`.
///
/// The global pool can only be built once, so the outcome of the first call is cached and
/// returned by reference.
pub fn adjust_thread_pool() -> &'static Result<(), rayon::ThreadPoolBuildError> {
	static ONCE_GUARD: OnceLock<Result<(), rayon::ThreadPoolBuildError>> = OnceLock::new();

	ONCE_GUARD.get_or_init(|| match env::var("RAYON_NUM_THREADS") {
		Ok(v) if v == "1" => rayon::ThreadPoolBuilder::new()
			.num_threads(1)
			.use_current_thread()
			.build_global(),
		_ => Ok(()),
	})
}

/// Minimum number of items a rayon task should process for the given total, so that the work is
/// split into about four tasks per thread.
pub fn min_len_per_task(total: usize) -> usize {
	let tasks = 4 * rayon::current_num_threads();
	total.div_ceil(tasks).max(1)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_min_len_per_task_is_positive() {
		assert_eq!(min_len_per_task(0), 1);
		assert!(min_len_per_task(1 << 20) >= 1);
		assert!(min_len_per_task(1 << 20) * 4 * rayon::current_num_threads() >= 1 << 20);
	}
}
