// Copyright 2024 Irreducible Inc.

use getset::Getters;
use p3_matrix::dense::RowMajorMatrix;
use vortex_hash::{compression, Octuplet};
use vortex_math::KoalaBear;
use vortex_utils::{checked_arithmetics::checked_int_div, ensure};

use super::{
	context::RoundLayout,
	digest::{hash_columns, ColumnDigest},
	error::Error,
};
use crate::{linear_code::LinearCode, merkle_tree::MerkleTree, reed_solomon::ReedSolomonCode};

/// Prover-side data of one committed round.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct CommittedRound {
	/// The Reed–Solomon encoding of every row.
	encoded: RowMajorMatrix<KoalaBear>,
	tree: MerkleTree<Octuplet>,
	/// Digest of every encoded column, the Merkle leaves.
	digests: Vec<ColumnDigest>,
}

impl CommittedRound {
	pub fn root(&self) -> Octuplet {
		self.tree.root()
	}

	pub fn num_rows(&self) -> usize {
		checked_int_div(self.encoded.values.len(), self.encoded.width)
	}
}

/// Encodes the rows of a round, digests its columns and builds the Merkle tree over the digests.
#[tracing::instrument(skip_all, name = "vortex::commit", level = "debug", fields(round = ?layout.id(), rows = rows.len()))]
pub fn commit_rows<Row>(
	code: &ReedSolomonCode,
	layout: &RoundLayout,
	rows: &[Row],
) -> Result<CommittedRound, Error>
where
	Row: AsRef<[KoalaBear]> + Sync,
{
	for (row, values) in rows.iter().enumerate() {
		let actual = values.as_ref().len();
		ensure!(
			actual == code.dim(),
			Error::EncodingSizeMismatch {
				row,
				expected: code.dim(),
				actual,
			}
		);
	}

	let encoded = code.encode_batch(rows)?;
	let digests = hash_columns(layout.mode(), &encoded, layout.num_shadow_rows())?;
	let tree = MerkleTree::build(compression(), digests.iter().map(|digest| digest.leaf).collect())?;

	Ok(CommittedRound {
		encoded,
		tree,
		digests,
	})
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use rand::{rngs::StdRng, Rng, SeedableRng};
	use vortex_hash::ring_sis::RingSisParams;

	use super::*;
	use crate::vortex::{digest::matrix_column, VortexConfig, VortexContext};

	fn random_rows(rng: &mut StdRng, num_rows: usize, row_len: usize) -> Vec<Vec<KoalaBear>> {
		(0..num_rows)
			.map(|_| (0..row_len).map(|_| rng.random()).collect())
			.collect()
	}

	#[test]
	fn test_commit_encodes_and_digests_every_column() {
		let mut rng = StdRng::seed_from_u64(0);
		let config = VortexConfig::new(3, 2)
			.with_sis(RingSisParams::new(4, 8).unwrap())
			.with_sis_threshold(4);
		let ctx = VortexContext::compile::<Vec<KoalaBear>>(config, &[5, 2], &[]).unwrap();

		for (round, num_rows) in [(0, 5), (1, 2)] {
			let rows = random_rows(&mut rng, num_rows, 8);
			let committed = ctx.commit(round, &rows).unwrap();
			assert_eq!(committed.num_rows(), num_rows);
			assert_eq!(committed.encoded().width, 32);
			assert_eq!(committed.tree().depth(), ctx.merkle_depth());

			let layout = ctx.round(round).unwrap();
			for (index, digest) in committed.digests().iter().enumerate() {
				let column = matrix_column(committed.encoded(), index);
				assert_eq!(*digest, layout.mode().hash_column(&column, layout.num_shadow_rows()).unwrap());
				assert_eq!(committed.tree().leaves()[index], digest.leaf);
			}
			assert_eq!(
				committed.digests().iter().all(|digest| digest.lattice.is_some()),
				layout.mode().is_lattice()
			);
		}
	}

	#[test]
	fn test_commit_rejects_wrong_shapes() {
		let mut rng = StdRng::seed_from_u64(1);
		let ctx = VortexContext::compile::<Vec<KoalaBear>>(VortexConfig::new(3, 1), &[3], &[]).unwrap();

		assert_matches!(
			ctx.commit(0, &random_rows(&mut rng, 2, 8)),
			Err(Error::NumRowsMismatch { round: 0, expected: 3, actual: 2 })
		);
		let mut rows = random_rows(&mut rng, 3, 8);
		rows[1].pop();
		assert_matches!(
			ctx.commit(0, &rows),
			Err(Error::EncodingSizeMismatch { row: 1, expected: 8, actual: 7 })
		);
		assert_matches!(ctx.commit(1, &rows), Err(Error::UnknownRound { round: 1, num_rounds: 1 }));
	}
}
