// Copyright 2024 Irreducible Inc.

use getset::CopyGetters;
use vortex_hash::ring_sis::RingSisParams;

/// Parameters of a Vortex commitment.
///
/// The builder methods only record values; they are validated when a
/// [`VortexContext`](super::VortexContext) is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct VortexConfig {
	/// Base-2 logarithm of the Reed–Solomon blow-up factor ρ.
	log_inv_rate: usize,
	/// Base-2 logarithm of the number of evaluations per row.
	log_row_len: usize,
	/// Soundness target driving the number of opened columns.
	target_security_bits: usize,
	/// Ring-SIS instance used for lattice-hashed rounds.
	sis: RingSisParams,
	/// Rounds with at least this many rows are lattice hashed.
	sis_threshold: usize,
	/// Whether the lattice hash is used at all.
	lattice_enabled: bool,
	/// Seed of the ring-SIS key.
	seed: u64,
}

impl VortexConfig {
	pub fn new(log_row_len: usize, log_inv_rate: usize) -> Self {
		Self {
			log_inv_rate,
			log_row_len,
			target_security_bits: 128,
			sis: RingSisParams::default(),
			sis_threshold: 32,
			lattice_enabled: true,
			seed: 0,
		}
	}

	pub const fn with_target_security_bits(mut self, bits: usize) -> Self {
		self.target_security_bits = bits;
		self
	}

	pub const fn with_sis(mut self, sis: RingSisParams) -> Self {
		self.sis = sis;
		self
	}

	pub const fn with_sis_threshold(mut self, threshold: usize) -> Self {
		self.sis_threshold = threshold;
		self
	}

	pub const fn with_lattice_enabled(mut self, enabled: bool) -> Self {
		self.lattice_enabled = enabled;
		self
	}

	pub const fn with_seed(mut self, seed: u64) -> Self {
		self.seed = seed;
		self
	}

	pub const fn row_len(&self) -> usize {
		1 << self.log_row_len
	}

	pub const fn codeword_len(&self) -> usize {
		1 << (self.log_row_len + self.log_inv_rate)
	}

	/// Number of columns opened by the verifier.
	///
	/// This is `2λ / log2(ρ)`, plus one when that falls short of `λ` bits, capped at the codeword
	/// length.
	pub const fn num_opened_columns(&self) -> usize {
		let log_inv_rate = self.log_inv_rate;
		if log_inv_rate == 0 {
			return self.codeword_len();
		}
		let mut nb = 2 * self.target_security_bits / log_inv_rate;
		if nb * log_inv_rate < self.target_security_bits {
			nb += 1;
		}
		if nb > self.codeword_len() {
			self.codeword_len()
		} else {
			nb
		}
	}
}
