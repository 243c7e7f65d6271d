// Copyright 2024 Irreducible Inc.

use p3_symmetric::PseudoCompressionFunction;
use p3_util::log2_strict_usize;
use rayon::prelude::*;
use vortex_utils::{bail, ensure};

use super::error::{Error, VerificationError};

/// A binary Merkle tree over precomputed leaf digests.
///
/// Leaves are ordered by column index. Internal nodes are the compression of their two children,
/// left first.
#[derive(Debug, Clone)]
pub struct MerkleTree<D> {
	/// Base-2 logarithm of the number of leaves
	log_len: usize,
	/// All nodes, arranged as a flattened array of layers with the leaves first and the root at
	/// the end
	nodes: Vec<D>,
}

impl<D> MerkleTree<D>
where
	D: Copy + Send + Sync,
{
	#[tracing::instrument("MerkleTree::build", skip_all, level = "debug", fields(leaves = leaves.len()))]
	pub fn build<C>(compression: &C, leaves: Vec<D>) -> Result<Self, Error>
	where
		C: PseudoCompressionFunction<D, 2> + Sync,
	{
		let len = leaves.len();
		ensure!(len.is_power_of_two(), Error::IncorrectLeavesLen { len });
		let log_len = log2_strict_usize(len);

		let mut nodes = leaves;
		nodes.reserve(len - 1);
		let mut layer_start = 0;
		for layer in 0..log_len {
			let layer_len = len >> layer;
			let next_layer = Self::compress_layer(compression, &nodes[layer_start..layer_start + layer_len]);
			nodes.extend(next_layer);
			layer_start += layer_len;
		}

		Ok(Self { log_len, nodes })
	}

	fn compress_layer<C>(compression: &C, prev_layer: &[D]) -> Vec<D>
	where
		C: PseudoCompressionFunction<D, 2> + Sync,
	{
		prev_layer
			.par_chunks_exact(2)
			.map(|pair| compression.compress([pair[0], pair[1]]))
			.collect()
	}

	/// Number of levels between the leaves and the root.
	pub const fn depth(&self) -> usize {
		self.log_len
	}

	pub fn leaves(&self) -> &[D] {
		&self.nodes[..1 << self.log_len]
	}

	pub fn root(&self) -> D {
		self.nodes[self.nodes.len() - 1]
	}

	/// Get a Merkle branch for the given index, siblings ordered from the leaf upwards.
	///
	/// Throws if the index is out of range
	pub fn branch(&self, index: usize) -> Result<Vec<D>, Error> {
		if index >= 1 << self.log_len {
			bail!(Error::IndexOutOfRange {
				max: 1 << self.log_len,
			});
		}

		let mut layer_start = 0;
		let branch = (0..self.log_len)
			.map(|layer| {
				let sibling = self.nodes[layer_start + ((index >> layer) ^ 1)];
				layer_start += 1 << (self.log_len - layer);
				sibling
			})
			.collect();
		Ok(branch)
	}
}

/// Checks that `leaf` sits at `index` of the tree committed by `root`.
///
/// The siblings are ordered from the leaf upwards, as returned by [`MerkleTree::branch`].
pub fn verify_opening<D, C>(
	compression: &C,
	root: &D,
	leaf: D,
	index: usize,
	siblings: &[D],
) -> Result<(), Error>
where
	D: Copy + PartialEq,
	C: PseudoCompressionFunction<D, 2>,
{
	let depth = siblings.len();
	if depth < usize::BITS as usize && index >> depth != 0 {
		bail!(Error::IndexOutOfRange { max: 1 << depth });
	}

	let mut index = index;
	let computed = siblings.iter().fold(leaf, |node, &sibling| {
		let next_node = if index & 1 == 0 {
			compression.compress([node, sibling])
		} else {
			compression.compress([sibling, node])
		};
		index >>= 1;
		next_node
	});

	if computed == *root {
		Ok(())
	} else {
		Err(VerificationError::MerkleRootMismatch.into())
	}
}

#[cfg(test)]
mod tests {
	use std::iter::repeat_with;

	use assert_matches::assert_matches;
	use p3_field::PrimeCharacteristicRing;
	use proptest::prelude::*;
	use rand::{rngs::StdRng, Rng, SeedableRng};
	use vortex_hash::{compression, Octuplet};
	use vortex_math::KoalaBear;

	use super::*;

	fn random_leaves(rng: &mut StdRng, n: usize) -> Vec<Octuplet> {
		repeat_with(|| std::array::from_fn(|_| rng.random()))
			.take(n)
			.collect()
	}

	#[test]
	fn test_merkle_tree_shape() {
		let mut rng = StdRng::seed_from_u64(0);
		let leaves = random_leaves(&mut rng, 16);
		let tree = MerkleTree::build(compression(), leaves.clone()).unwrap();

		assert_eq!(tree.depth(), 4);
		assert_eq!(tree.leaves(), leaves.as_slice());
		let expected_root = {
			let mut layer = leaves;
			while layer.len() > 1 {
				layer = layer
					.chunks_exact(2)
					.map(|pair| compression().compress([pair[0], pair[1]]))
					.collect();
			}
			layer[0]
		};
		assert_eq!(tree.root(), expected_root);
	}

	#[test]
	fn test_single_leaf_tree() {
		let mut rng = StdRng::seed_from_u64(1);
		let leaves = random_leaves(&mut rng, 1);
		let tree = MerkleTree::build(compression(), leaves.clone()).unwrap();
		assert_eq!(tree.root(), leaves[0]);
		assert!(tree.branch(0).unwrap().is_empty());
		verify_opening(compression(), &tree.root(), leaves[0], 0, &[]).unwrap();
	}

	#[test]
	fn test_build_rejects_non_power_of_two() {
		let mut rng = StdRng::seed_from_u64(2);
		assert_matches!(
			MerkleTree::build(compression(), random_leaves(&mut rng, 6)),
			Err(Error::IncorrectLeavesLen { len: 6 })
		);
		assert_matches!(
			MerkleTree::<Octuplet>::build(compression(), vec![]),
			Err(Error::IncorrectLeavesLen { len: 0 })
		);
	}

	#[test]
	fn test_corrupted_sibling_is_rejected() {
		let mut rng = StdRng::seed_from_u64(3);
		let leaves = random_leaves(&mut rng, 8);
		let tree = MerkleTree::build(compression(), leaves.clone()).unwrap();

		let mut branch = tree.branch(5).unwrap();
		branch[1][0] += KoalaBear::ONE;
		assert_matches!(
			verify_opening(compression(), &tree.root(), leaves[5], 5, &branch),
			Err(Error::Verification(VerificationError::MerkleRootMismatch))
		);
		assert_matches!(tree.branch(8), Err(Error::IndexOutOfRange { max: 8 }));
	}

	proptest! {
		#[test]
		fn test_every_branch_verifies(log_len in 0usize..6, seed in any::<u64>()) {
			let mut rng = StdRng::seed_from_u64(seed);
			let leaves = random_leaves(&mut rng, 1 << log_len);
			let tree = MerkleTree::build(compression(), leaves.clone()).unwrap();
			for (index, leaf) in leaves.iter().enumerate() {
				let branch = tree.branch(index).unwrap();
				prop_assert_eq!(branch.len(), log_len);
				prop_assert!(verify_opening(compression(), &tree.root(), *leaf, index, &branch).is_ok());
				prop_assert!(verify_opening(compression(), &tree.root(), *leaf, index ^ 1, &branch).is_err() || log_len == 0);
			}
		}
	}
}
