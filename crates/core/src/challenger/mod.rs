// Copyright 2024 Irreducible Inc.

//! Fiat-Shamir instantiations of a random oracle.
//!
//! The transcript is a [`DuplexChallenger`] from [Plonky3] over the shared Poseidon2 permutation.
//! The challenger can observe prover messages and sample verifier randomness; extension elements
//! are observed and sampled coordinate by coordinate.
//!
//! [Plonky3]: <https://github.com/plonky3/plonky3>

pub use p3_challenger::{CanObserve, CanSample, CanSampleBits, DuplexChallenger, FieldChallenger};

use std::collections::BTreeSet;

use vortex_hash::{permutation, VortexPermutation, POSEIDON2_WIDTH, SPONGE_RATE};
use vortex_math::KoalaBear;

/// The transcript operations of a Vortex opening.
pub trait VortexChallenger: FieldChallenger<KoalaBear> {}

impl<CH: FieldChallenger<KoalaBear>> VortexChallenger for CH {}

/// The Fiat-Shamir challenger of the Vortex protocol.
pub type KoalaBearChallenger =
	DuplexChallenger<KoalaBear, VortexPermutation, POSEIDON2_WIDTH, SPONGE_RATE>;

pub fn new_koala_bear_challenger() -> KoalaBearChallenger {
	DuplexChallenger::new(permutation().clone())
}

/// Samples `count` distinct indices in `0..1 << log_len` by rejection.
///
/// ## Preconditions
///
/// * `count` must be at most `1 << log_len`
pub fn sample_distinct_indices<CH>(challenger: &mut CH, log_len: usize, count: usize) -> Vec<usize>
where
	CH: CanSampleBits<usize>,
{
	debug_assert!(count <= 1 << log_len);

	let mut seen = BTreeSet::new();
	let mut indices = Vec::with_capacity(count);
	while indices.len() < count {
		let index = challenger.sample_bits(log_len);
		if seen.insert(index) {
			indices.push(index);
		}
	}
	indices
}
