// Copyright 2024 Irreducible Inc.

use std::ops::Range;

use vortex_hash::ring_sis::KeyShard;
use vortex_math::{KoalaBear, KoalaBearExt4};

use super::context::PrecomputedColumns;
use crate::{
	challenger::VortexChallenger,
	iop::{ColumnArena, ColumnData, ColumnId, ColumnStatus, Constraint},
	vortex::{OpeningProof, RoundLayout, VortexContext},
};

/// Round of the recursion layer in which each group of columns is sent.
pub(super) const PRECOMPUTED_ROUND: usize = 0;
pub(super) const COMBINED_ROW_ROUND: usize = 0;
pub(super) const OPENING_ROUND: usize = 1;
pub(super) const COLLAPSE_ROUND: usize = 2;
pub(super) const FOLD_ROUND: usize = 3;

/// A lattice-hashed round, as seen from the opened columns.
pub(super) struct LatticeRound<'a> {
	/// Position of the round in stacking order.
	pub stacked_index: usize,
	pub shard: &'a KeyShard,
	/// Range of the round's limbs within the limb expansion of an opened column.
	pub limbs: Range<usize>,
}

/// Accumulates the columns and constraints of a self-recursion pass, phase by phase.
pub(super) struct Compiler<'a> {
	pub ctx: &'a VortexContext,
	pub layouts: Vec<&'a RoundLayout>,
	pub proof: &'a OpeningProof,
	pub alpha: KoalaBearExt4,
	pub lattice: Vec<LatticeRound<'a>>,
	pub columns: ColumnArena,
	pub constraints: Vec<Constraint>,
	/// Columns below this index have already been absorbed by the transcript.
	observed: usize,
}

impl<'a> Compiler<'a> {
	pub fn new(
		ctx: &'a VortexContext,
		layouts: Vec<&'a RoundLayout>,
		proof: &'a OpeningProof,
		alpha: KoalaBearExt4,
	) -> Self {
		let num_limbs = ctx.config().sis().num_limbs();
		let mut offset = 0;
		let lattice = layouts
			.iter()
			.enumerate()
			.filter_map(|(stacked_index, layout)| {
				let shard = layout.mode().shard()?;
				let len = layout.num_stacked_rows() * num_limbs;
				let limbs = offset..offset + len;
				offset += len;
				Some(LatticeRound {
					stacked_index,
					shard,
					limbs,
				})
			})
			.collect();

		Self {
			ctx,
			layouts,
			proof,
			alpha,
			lattice,
			columns: ColumnArena::new(),
			constraints: Vec::new(),
			observed: 0,
		}
	}

	pub fn insert(
		&mut self,
		name: impl Into<String>,
		round: usize,
		status: ColumnStatus,
		data: ColumnData,
	) -> ColumnId {
		self.columns.insert(name, round, status, data)
	}

	pub fn has_lattice(&self) -> bool {
		!self.lattice.is_empty()
	}

	/// Identity column over the codeword positions and the key shard of every lattice round.
	pub fn precompute(&mut self) -> PrecomputedColumns {
		let identity = (0..self.ctx.codeword_len())
			.map(|position| KoalaBear::new(position as u32))
			.collect();
		let identity =
			self.insert("I", PRECOMPUTED_ROUND, ColumnStatus::Precomputed, ColumnData::Base(identity));

		let shards = self
			.lattice
			.iter()
			.map(|round| (round.stacked_index, round.shard.flattened_key().to_vec()))
			.collect::<Vec<_>>();
		let keys = shards
			.into_iter()
			.map(|(stacked_index, key)| {
				self.insert(
					format!("A_{stacked_index}"),
					PRECOMPUTED_ROUND,
					ColumnStatus::Precomputed,
					ColumnData::Base(key),
				)
			})
			.collect();

		PrecomputedColumns { identity, keys }
	}

	/// Registers `U` with its proximity and evaluation constraints.
	///
	/// `U` was absorbed by the opening transcript already.
	pub fn combine_rows(&mut self, point: KoalaBearExt4, claim: KoalaBearExt4) -> ColumnId {
		let combined_row = self.insert(
			"U",
			COMBINED_ROW_ROUND,
			ColumnStatus::Proof,
			ColumnData::Ext(self.proof.combined_row.clone()),
		);
		let code = self.ctx.code();
		self.constraints.push(Constraint::ReedSolomon {
			column: combined_row,
			log_dimension: code.log_dimension(),
			log_inv_rate: code.log_inv_rate(),
		});
		self.constraints.push(Constraint::UnivariateEval {
			column: combined_row,
			log_dimension: code.log_dimension(),
			log_inv_rate: code.log_inv_rate(),
			point,
			value: claim,
		});
		self.observed = self.columns.len();
		combined_row
	}

	/// Absorbs every proof column registered since the last call.
	pub fn observe_proof_columns<CH: VortexChallenger>(&mut self, challenger: &mut CH) {
		for (_, entry) in self.columns.iter().skip(self.observed) {
			if entry.status() == ColumnStatus::Proof {
				challenger.observe_slice(&entry.data().to_bases());
			}
		}
		self.observed = self.columns.len();
	}

	pub fn finish(self) -> (ColumnArena, Vec<Constraint>) {
		(self.columns, self.constraints)
	}
}

#[cfg(test)]
mod tests {
	use p3_field::PrimeCharacteristicRing;
	use vortex_hash::ring_sis::RingSisParams;

	use super::*;
	use crate::{
		challenger::new_koala_bear_challenger,
		vortex::{open, VortexConfig},
	};

	#[test]
	fn test_lattice_limb_ranges_follow_stacking_order() {
		let config = VortexConfig::new(2, 1)
			.with_target_security_bits(4)
			.with_sis(RingSisParams::new(4, 8).unwrap())
			.with_sis_threshold(4);
		let ctx = VortexContext::compile::<Vec<KoalaBear>>(config, &[5, 2, 4], &[]).unwrap();
		let committed = [5, 2, 4]
			.iter()
			.enumerate()
			.map(|(round, &num_rows)| {
				ctx.commit(round, &vec![vec![KoalaBear::ONE; 4]; num_rows])
					.unwrap()
			})
			.collect::<Vec<_>>();
		let proof = open(&ctx, &committed, &mut new_koala_bear_challenger()).unwrap();

		let compiler = Compiler::new(&ctx, ctx.stacked_rounds(), &proof, KoalaBearExt4::ONE);
		// Stacking: the sponge round, then the lattice rounds of 5 + 3 and 4 rows, 4 limbs each.
		let ranges = compiler
			.lattice
			.iter()
			.map(|round| (round.stacked_index, round.limbs.clone()))
			.collect::<Vec<_>>();
		assert_eq!(ranges, vec![(1, 0..32), (2, 32..48)]);
		assert_eq!(ctx.sis_offset(), 2);
	}
}
