// Copyright 2024 Irreducible Inc.

use rayon::prelude::*;
use vortex_hash::{hash_column, Octuplet};
use vortex_math::{evaluate_univariate, KoalaBear};

use super::{
	compiler::{Compiler, OPENING_ROUND},
	context::{MerkleColumns, OpeningColumns, PrecomputedColumns},
	error::Error,
};
use crate::iop::{ColumnData, ColumnId, ColumnStatus, Constraint, LookupKind};

impl Compiler<'_> {
	/// Registers the opened columns: the selection lookup, the preimages, the re-derived leaves
	/// and the Merkle check over all rounds.
	#[tracing::instrument(skip_all, name = "self_recursion::open_columns", level = "debug")]
	pub fn open_columns(
		&mut self,
		precomputed: &PrecomputedColumns,
		combined_row: ColumnId,
		positions: &[usize],
		roots: &[Octuplet],
	) -> Result<OpeningColumns, Error> {
		let num_opened = positions.len();
		let sis_offset = self.ctx.sis_offset();
		let (proof, layouts) = (self.proof, &self.layouts);
		let stacked = (0..num_opened)
			.into_par_iter()
			.map(|selection| proof.stacked_column(layouts, selection))
			.collect::<Vec<_>>();

		let selected = self.insert(
			"Q",
			OPENING_ROUND,
			ColumnStatus::VerifierDefined,
			ColumnData::Base(position_column(positions)),
		);
		let alpha = self.alpha;
		let u_alpha_q = stacked
			.par_iter()
			.map(|column| evaluate_univariate(column, alpha))
			.collect();
		let u_alpha_q = self.insert("UalphaQ", OPENING_ROUND, ColumnStatus::Proof, ColumnData::Ext(u_alpha_q));
		self.constraints.push(Constraint::Inclusion {
			included: vec![selected, u_alpha_q],
			including: vec![precomputed.identity, combined_row],
			kind: LookupKind::Selection,
		});

		let non_sis = if sis_offset > 0 {
			stacked
				.iter()
				.enumerate()
				.map(|(selection, column)| {
					self.insert(
						format!("NonSisPreimage_{selection}"),
						OPENING_ROUND,
						ColumnStatus::Proof,
						ColumnData::Base(column[..sis_offset].to_vec()),
					)
				})
				.collect::<Vec<_>>()
		} else {
			Vec::new()
		};

		let sis = self.ctx.config().sis();
		let limb_values = if self.has_lattice() {
			stacked
				.par_iter()
				.map(|column| sis.limb_split(&column[sis_offset..]))
				.collect::<Vec<_>>()
		} else {
			Vec::new()
		};
		let mut limbs = Vec::with_capacity(limb_values.len());
		for (selection, values) in limb_values.iter().enumerate() {
			let column = self.insert(
				format!("PreimageLimbs_{selection}"),
				OPENING_ROUND,
				ColumnStatus::Proof,
				ColumnData::Base(values.clone()),
			);
			self.constraints.push(Constraint::Range {
				column,
				log_bound: sis.log_two_bound(),
				opened: selection,
			});
			limbs.push(column);
		}

		// Lattice digests, lattice round major.
		let degree = sis.degree();
		let dhq_values = if self.has_lattice() {
			let lattice = &self.lattice;
			let digests = (0..lattice.len() * num_opened)
				.into_par_iter()
				.map(|k| {
					let round = &lattice[k / num_opened];
					round
						.shard
						.hash_limbs(&limb_values[k % num_opened][round.limbs.clone()])
				})
				.collect::<Result<Vec<_>, _>>()?;
			Some(digests.concat())
		} else {
			None
		};
		let concatenated_dhq = dhq_values.as_ref().map(|values| {
			self.insert(
				"ConcatenatedDhQ",
				OPENING_ROUND,
				ColumnStatus::Proof,
				ColumnData::Base(values.clone()),
			)
		});

		// Re-derive the leaves of every round from the preimages.
		let mut leaves = Vec::with_capacity(self.layouts.len());
		let mut all_leaves = Vec::with_capacity(self.layouts.len() * num_opened);
		let mut sponge_offset = 0;
		let mut lattice_index = 0;
		for (round, layout) in self.layouts.clone().into_iter().enumerate() {
			let sources = match (layout.mode().is_lattice(), concatenated_dhq, &dhq_values) {
				(true, Some(dhq), Some(values)) => {
					let sources = (0..num_opened)
						.map(|selection| {
							let start = (lattice_index * num_opened + selection) * degree;
							(dhq, start..start + degree, &values[start..start + degree])
						})
						.collect::<Vec<_>>();
					lattice_index += 1;
					sources
				}
				_ => {
					let range = sponge_offset..sponge_offset + layout.num_rows();
					sponge_offset += layout.num_rows();
					non_sis
						.iter()
						.zip(&stacked)
						.map(|(&column, values)| (column, range.clone(), &values[range.clone()]))
						.collect()
				}
			};

			let round_leaves = sources
				.par_iter()
				.map(|(_, _, preimage)| hash_column(preimage))
				.collect::<Vec<Octuplet>>();
			all_leaves.extend_from_slice(&round_leaves);
			let round_leaves_column = self.insert(
				format!("Leaves_{round}"),
				OPENING_ROUND,
				ColumnStatus::Proof,
				ColumnData::Digests(round_leaves),
			);
			self.constraints.push(Constraint::LinearHash {
				sources: sources
					.into_iter()
					.map(|(column, range, _)| (column, range))
					.collect(),
				leaves: round_leaves_column,
				round,
			});
			leaves.push(round_leaves_column);
		}
		tracing::debug!(rounds = leaves.len(), num_opened, "re-derived leaves");

		let merkle = self.merkle_check(positions, roots, all_leaves);
		for (round, &round_leaves) in leaves.iter().enumerate() {
			self.constraints.push(Constraint::Inclusion {
				included: vec![round_leaves],
				including: vec![merkle.leaves],
				kind: LookupKind::LeafConsistency { round },
			});
		}

		Ok(OpeningColumns {
			selected,
			u_alpha_q,
			limbs,
			non_sis,
			concatenated_dhq,
			leaves,
			merkle,
		})
	}

	/// Gathers leaves, positions and roots of all rounds into single columns, checked against
	/// the packed Merkle proofs.
	fn merkle_check(
		&mut self,
		positions: &[usize],
		roots: &[Octuplet],
		leaves: Vec<Octuplet>,
	) -> MerkleColumns {
		let num_rounds = roots.len();
		let num_opened = positions.len();
		let proofs = self
			.proof
			.packed_merkle_proofs(self.ctx.merkle_proof_size());

		let leaves = self.insert("MerkleLeaves", OPENING_ROUND, ColumnStatus::Proof, ColumnData::Digests(leaves));
		let positions = self.insert(
			"MerklePositions",
			OPENING_ROUND,
			ColumnStatus::VerifierDefined,
			ColumnData::Base(position_column(positions).repeat(num_rounds)),
		);
		let roots = self.insert(
			"MerkleRoots",
			OPENING_ROUND,
			ColumnStatus::VerifierDefined,
			ColumnData::Digests(
				roots
					.iter()
					.flat_map(|root| std::iter::repeat(*root).take(num_opened))
					.collect(),
			),
		);
		let proofs = self.insert("MerkleProofs", OPENING_ROUND, ColumnStatus::Proof, ColumnData::Digests(proofs));

		self.constraints.push(Constraint::MerkleCheck {
			proofs,
			roots,
			positions,
			leaves,
			depth: self.ctx.merkle_depth(),
			num_opened,
		});

		MerkleColumns {
			leaves,
			positions,
			roots,
			proofs,
		}
	}
}

fn position_column(positions: &[usize]) -> Vec<KoalaBear> {
	positions
		.iter()
		.map(|&position| KoalaBear::new(position as u32))
		.collect()
}
