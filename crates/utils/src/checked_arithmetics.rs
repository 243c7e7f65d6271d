// Copyright 2024 Irreducible Inc.

/// Exact division, panicking when `b` does not divide `a`.
pub const fn checked_int_div(a: usize, b: usize) -> usize {
	assert!(a % b == 0);
	a / b
}

/// Number of items that must be appended to `len` to reach the next multiple of `multiple`.
pub const fn padding_to_multiple(len: usize, multiple: usize) -> usize {
	match len % multiple {
		0 => 0,
		rem => multiple - rem,
	}
}

/// Smallest power of two that is at least `val`, with `0` mapped to `1`.
pub const fn next_pow2(val: usize) -> usize {
	if val <= 1 {
		1
	} else {
		val.next_power_of_two()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_checked_int_div() {
		assert_eq!(checked_int_div(96, 32), 3);
		assert_eq!(checked_int_div(0, 8), 0);
	}

	#[test]
	#[should_panic]
	fn test_checked_int_div_inexact() {
		_ = checked_int_div(48, 32);
	}

	#[test]
	fn test_padding_to_multiple() {
		assert_eq!(padding_to_multiple(0, 4), 0);
		assert_eq!(padding_to_multiple(5, 4), 3);
		assert_eq!(padding_to_multiple(16, 32), 16);
		assert_eq!(padding_to_multiple(64, 32), 0);
	}

	#[test]
	fn test_next_pow2() {
		assert_eq!(next_pow2(0), 1);
		assert_eq!(next_pow2(1), 1);
		assert_eq!(next_pow2(17), 32);
		assert_eq!(next_pow2(64), 64);
	}
}
