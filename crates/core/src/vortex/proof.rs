// Copyright 2024 Irreducible Inc.

use p3_field::PrimeCharacteristicRing;
use vortex_hash::{Octuplet, DIGEST_SIZE};
use vortex_math::{KoalaBear, KoalaBearExt4};

use super::context::RoundLayout;

/// An opening of every committed round at the verifier's point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningProof {
	/// The α-combination of all stacked encoded rows, `U = Σ α^i·Enc(row_i)`.
	pub combined_row: Vec<KoalaBearExt4>,
	/// Indices of the opened codeword columns, in sampling order.
	pub columns: Vec<usize>,
	/// Opened columns, indexed by stacked round then by selection. Shadow rows are omitted.
	pub opened_columns: Vec<Vec<Vec<KoalaBear>>>,
	/// Merkle siblings of every opened column, indexed as `opened_columns`, from the leaf upwards.
	pub merkle_proofs: Vec<Vec<Vec<Octuplet>>>,
}

impl OpeningProof {
	/// Opened column `selection` across all stacked rounds, shadow rows filled with zeros.
	pub fn stacked_column(&self, layouts: &[&RoundLayout], selection: usize) -> Vec<KoalaBear> {
		let mut column = Vec::with_capacity(layouts.iter().map(|layout| layout.num_stacked_rows()).sum());
		for (layout, opened) in layouts.iter().zip(&self.opened_columns) {
			column.extend_from_slice(&opened[selection]);
			column.resize(column.len() + layout.num_shadow_rows(), KoalaBear::ZERO);
		}
		column
	}

	/// All Merkle siblings packed into one column.
	///
	/// For each stacked round, for each opened column, the siblings are listed from the root side
	/// down to the leaf. The column is zero-padded to `size` entries.
	pub fn packed_merkle_proofs(&self, size: usize) -> Vec<Octuplet> {
		let mut packed = self
			.merkle_proofs
			.iter()
			.flatten()
			.flat_map(|siblings| siblings.iter().rev().copied())
			.collect::<Vec<_>>();
		packed.resize(size.max(packed.len()), [KoalaBear::ZERO; DIGEST_SIZE]);
		packed
	}
}

/// Public statement of an opening: roots, evaluation point and claimed row evaluations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VortexInstance {
	/// Merkle root of every prover round, by registration index.
	pub roots: Vec<Octuplet>,
	pub point: KoalaBearExt4,
	/// Claimed evaluations of every row of every prover round, by registration index.
	pub ys: Vec<Vec<KoalaBearExt4>>,
	/// Claimed evaluations of the precomputed rows.
	pub precomputed_ys: Vec<KoalaBearExt4>,
}
