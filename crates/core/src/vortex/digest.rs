// Copyright 2024 Irreducible Inc.

//! Column digests: the Merkle leaf of every encoded column.

use p3_matrix::dense::RowMajorMatrix;
use p3_field::PrimeCharacteristicRing;
use rayon::prelude::*;
use vortex_hash::{hash_column, ring_sis::KeyShard, Octuplet};
use vortex_math::KoalaBear;

use super::error::Error;

/// How the columns of a round are digested, fixed per round when the context is compiled.
#[derive(Debug, Clone)]
pub enum DigestMode {
	/// Ring-SIS hash with the round's key shard, then a sponge hash of the lattice digest.
	Lattice(KeyShard),
	/// Sponge hash of the column.
	Sponge,
}

/// The digest of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDigest {
	pub leaf: Octuplet,
	/// The `d` field elements of the ring-SIS digest, in lattice mode.
	pub lattice: Option<Vec<KoalaBear>>,
}

impl DigestMode {
	pub const fn is_lattice(&self) -> bool {
		matches!(self, Self::Lattice(_))
	}

	pub const fn shard(&self) -> Option<&KeyShard> {
		match self {
			Self::Lattice(shard) => Some(shard),
			Self::Sponge => None,
		}
	}

	/// Digests one column of `column.len()` real rows followed by `num_shadow_rows` zeros.
	pub fn hash_column(&self, column: &[KoalaBear], num_shadow_rows: usize) -> Result<ColumnDigest, Error> {
		match self {
			Self::Lattice(shard) => {
				let mut padded = Vec::with_capacity(column.len() + num_shadow_rows);
				padded.extend_from_slice(column);
				padded.resize(column.len() + num_shadow_rows, KoalaBear::ZERO);

				let lattice = shard.hash(&padded)?;
				Ok(ColumnDigest {
					leaf: hash_column(&lattice),
					lattice: Some(lattice),
				})
			}
			Self::Sponge => Ok(ColumnDigest {
				leaf: hash_column(column),
				lattice: None,
			}),
		}
	}
}

/// Extracts column `index` of a row-major matrix.
pub fn matrix_column(matrix: &RowMajorMatrix<KoalaBear>, index: usize) -> Vec<KoalaBear> {
	matrix
		.values
		.iter()
		.skip(index)
		.step_by(matrix.width)
		.copied()
		.collect()
}

/// Digests every column of an encoded matrix, in parallel.
#[tracing::instrument("vortex::hash_columns", skip_all, level = "debug", fields(lattice = mode.is_lattice()))]
pub fn hash_columns(
	mode: &DigestMode,
	matrix: &RowMajorMatrix<KoalaBear>,
	num_shadow_rows: usize,
) -> Result<Vec<ColumnDigest>, Error> {
	(0..matrix.width)
		.into_par_iter()
		.map(|index| mode.hash_column(&matrix_column(matrix, index), num_shadow_rows))
		.collect()
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use rand::{rngs::StdRng, Rng, SeedableRng};
	use vortex_hash::ring_sis::{RingSisKey, RingSisParams};

	use super::*;

	#[test]
	fn test_shadow_rows_do_not_change_lattice_digest() {
		let mut rng = StdRng::seed_from_u64(0);
		let params = RingSisParams::new(4, 8).unwrap();
		let key = Arc::new(RingSisKey::generate(params, 2, 0).unwrap());
		let mode = DigestMode::Lattice(key.shard(0, 2).unwrap());

		let column = (0..5).map(|_| rng.random()).collect::<Vec<KoalaBear>>();
		let padded = mode.hash_column(&column, 3).unwrap();
		let unpadded = mode.hash_column(&column, 0).unwrap();
		assert_eq!(padded, unpadded);
		assert_eq!(padded.lattice.as_ref().map(Vec::len), Some(16));
		assert_eq!(padded.leaf, hash_column(&padded.lattice.unwrap()));
	}

	#[test]
	fn test_hash_columns_matches_column_extraction() {
		let mut rng = StdRng::seed_from_u64(1);
		let values = (0..12).map(|_| rng.random()).collect::<Vec<KoalaBear>>();
		let matrix = RowMajorMatrix::new(values.clone(), 4);

		assert_eq!(matrix_column(&matrix, 1), vec![values[1], values[5], values[9]]);
		let digests = hash_columns(&DigestMode::Sponge, &matrix, 0).unwrap();
		assert_eq!(digests.len(), 4);
		assert_eq!(digests[2].leaf, hash_column(&matrix_column(&matrix, 2)));
		assert!(digests.iter().all(|digest| digest.lattice.is_none()));
	}
}
