// Copyright 2024 Irreducible Inc.

use lazy_static::lazy_static;
use p3_koala_bear::Poseidon2KoalaBear;
use p3_symmetric::{CryptographicHasher, PaddingFreeSponge, TruncatedPermutation};
use rand::{rngs::StdRng, SeedableRng};
use vortex_math::KoalaBear;

use crate::{Octuplet, DIGEST_SIZE};

/// Width of the permutation state.
pub const POSEIDON2_WIDTH: usize = 16;

/// Number of elements absorbed per permutation call.
pub const SPONGE_RATE: usize = 8;

/// Seed of the round constants, the ASCII bytes of `vortex`.
const PERMUTATION_SEED: u64 = 0x7665_7274_6578;

pub type VortexPermutation = Poseidon2KoalaBear<POSEIDON2_WIDTH>;

/// Rate 8, capacity 8. Inputs are not padded: every hashed column of a round has the same length.
pub type SpongeHasher = PaddingFreeSponge<VortexPermutation, POSEIDON2_WIDTH, SPONGE_RATE, DIGEST_SIZE>;

/// Permutes `left ‖ right` and keeps the first eight lanes.
pub type SpongeCompression = TruncatedPermutation<VortexPermutation, 2, DIGEST_SIZE, POSEIDON2_WIDTH>;

lazy_static! {
	static ref PERMUTATION: VortexPermutation =
		VortexPermutation::new_from_rng_128(&mut StdRng::seed_from_u64(PERMUTATION_SEED));
	static ref SPONGE: SpongeHasher = SpongeHasher::new(PERMUTATION.clone());
	static ref COMPRESSION: SpongeCompression = SpongeCompression::new(PERMUTATION.clone());
}

/// The Poseidon2 permutation shared by the sponge, the compression and the transcript.
pub fn permutation() -> &'static VortexPermutation {
	&PERMUTATION
}

pub fn sponge() -> &'static SpongeHasher {
	&SPONGE
}

pub fn compression() -> &'static SpongeCompression {
	&COMPRESSION
}

/// Sponge digest of a column of field elements.
pub fn hash_column(column: &[KoalaBear]) -> Octuplet {
	SPONGE.hash_slice(column)
}
