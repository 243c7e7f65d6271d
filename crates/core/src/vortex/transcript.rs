// Copyright 2024 Irreducible Inc.

//! The Fiat-Shamir schedule of an opening, replayed identically by the prover, the verifier and
//! the self-recursion.

use vortex_hash::Octuplet;
use vortex_math::KoalaBearExt4;

use crate::challenger::{sample_distinct_indices, VortexChallenger};

/// Observes the roots in stacking order and samples the row combination challenge α.
pub(crate) fn sample_combination_challenge<CH: VortexChallenger>(
	challenger: &mut CH,
	stacked_roots: &[Octuplet],
) -> KoalaBearExt4 {
	for root in stacked_roots {
		challenger.observe_slice(root);
	}
	challenger.sample_algebra_element()
}

/// Observes the combined row and samples the distinct codeword columns to open.
pub(crate) fn sample_opened_columns<CH: VortexChallenger>(
	challenger: &mut CH,
	combined_row: &[KoalaBearExt4],
	log_len: usize,
	count: usize,
) -> Vec<usize> {
	for &elem in combined_row {
		challenger.observe_algebra_element(elem);
	}
	sample_distinct_indices(challenger, log_len, count)
}
