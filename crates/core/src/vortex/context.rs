// Copyright 2024 Irreducible Inc.

use std::sync::Arc;

use getset::{CopyGetters, Getters};
use rayon::prelude::*;
use vortex_math::{KoalaBear, KoalaBearExt4};
use vortex_hash::{
	ring_sis::{RingSisKey, RingSisParams},
	Octuplet,
};
use vortex_utils::{
	bail,
	checked_arithmetics::{next_pow2, padding_to_multiple},
	ensure,
};

use super::{
	commit::{commit_rows, CommittedRound},
	config::VortexConfig,
	digest::DigestMode,
	error::Error,
};
use crate::{iop::RecursionDepth, reed_solomon::ReedSolomonCode};

/// Identifies a committed round of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundId {
	/// The round of columns known at setup time.
	Precomputed,
	/// A round committed by the prover, by registration index.
	Committed(usize),
}

/// Shape and digest mode of one committed round, fixed at compile time.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct RoundLayout {
	#[get_copy = "pub"]
	id: RoundId,
	#[get_copy = "pub"]
	num_rows: usize,
	/// All-zero rows appended to lattice rounds so that the round fills whole key polynomials.
	#[get_copy = "pub"]
	num_shadow_rows: usize,
	#[get = "pub"]
	mode: DigestMode,
}

impl RoundLayout {
	/// Rows the round occupies in the stacked matrix, shadow rows included.
	pub const fn num_stacked_rows(&self) -> usize {
		self.num_rows + self.num_shadow_rows
	}
}

/// A round that is registered but not yet assigned a key shard.
struct RoundPlan {
	id: RoundId,
	num_rows: usize,
	lattice: bool,
}

/// The compiled Vortex commitment: code, round layouts, ring-SIS key and the precomputed round.
///
/// Compilation is the only place where the configuration is validated; every later operation
/// relies on the shapes fixed here.
#[derive(Debug, Getters, CopyGetters)]
pub struct VortexContext {
	#[get_copy = "pub"]
	config: VortexConfig,
	#[get = "pub"]
	code: ReedSolomonCode,
	/// Layouts of the prover rounds, by registration index.
	#[get = "pub"]
	rounds: Vec<RoundLayout>,
	precomputed: Option<(RoundLayout, CommittedRound)>,
	#[get = "pub"]
	key: Option<Arc<RingSisKey>>,
	#[get_copy = "pub"]
	depth: RecursionDepth,
}

impl VortexContext {
	/// Compiles a context for prover rounds of the given row counts, committing the precomputed
	/// rows right away.
	pub fn compile<Row>(
		config: VortexConfig,
		round_row_counts: &[usize],
		precomputed: &[Row],
	) -> Result<Self, Error>
	where
		Row: AsRef<[KoalaBear]> + Sync,
	{
		Self::compile_at_depth(config, round_row_counts, precomputed, RecursionDepth::ROOT)
	}

	#[tracing::instrument(skip_all, name = "VortexContext::compile", level = "debug", fields(depth = depth.value()))]
	pub fn compile_at_depth<Row>(
		config: VortexConfig,
		round_row_counts: &[usize],
		precomputed: &[Row],
		depth: RecursionDepth,
	) -> Result<Self, Error>
	where
		Row: AsRef<[KoalaBear]> + Sync,
	{
		if config.log_inv_rate() == 0 {
			bail!(Error::Configuration("the code rate must be below one"));
		}
		ensure!(
			round_row_counts.iter().all(|&rows| rows > 0),
			Error::Configuration("committed rounds must have at least one row")
		);
		let sis = config.sis();
		if config.lattice_enabled() {
			// Rebuild through the validating constructor, the configuration may hold any value.
			RingSisParams::new(sis.log_two_degree(), sis.log_two_bound())?;
		}

		let code = ReedSolomonCode::new(config.log_row_len(), config.log_inv_rate())?;
		let is_lattice =
			|num_rows: usize| config.lattice_enabled() && num_rows >= config.sis_threshold();

		// Shards are handed out in stacking order: the precomputed round first.
		let plans = (!precomputed.is_empty())
			.then_some(RoundPlan {
				id: RoundId::Precomputed,
				num_rows: precomputed.len(),
				lattice: is_lattice(precomputed.len()),
			})
			.into_iter()
			.chain(round_row_counts.iter().enumerate().map(|(index, &num_rows)| RoundPlan {
				id: RoundId::Committed(index),
				num_rows,
				lattice: is_lattice(num_rows),
			}))
			.collect::<Vec<_>>();

		let fields_per_poly = sis.fields_per_poly();
		let total_polys = plans
			.iter()
			.filter(|plan| plan.lattice)
			.map(|plan| sis.num_polys_for(plan.num_rows))
			.sum::<usize>();
		let key = if total_polys > 0 {
			Some(Arc::new(RingSisKey::generate(sis, total_polys, config.seed())?))
		} else {
			None
		};

		let mut next_poly = 0;
		let mut layouts = Vec::with_capacity(plans.len());
		for plan in plans {
			let (mode, num_shadow_rows) = match (&key, plan.lattice) {
				(Some(key), true) => {
					let num_polys = sis.num_polys_for(plan.num_rows);
					let shard = key.shard(next_poly, num_polys)?;
					next_poly += num_polys;
					(
						DigestMode::Lattice(shard),
						padding_to_multiple(plan.num_rows, fields_per_poly),
					)
				}
				_ => (DigestMode::Sponge, 0),
			};
			tracing::debug!(
				round = ?plan.id,
				rows = plan.num_rows,
				shadow_rows = num_shadow_rows,
				lattice = mode.is_lattice(),
				"registered round"
			);
			layouts.push(RoundLayout {
				id: plan.id,
				num_rows: plan.num_rows,
				num_shadow_rows,
				mode,
			});
		}

		let precomputed = match layouts.first() {
			Some(layout) if layout.id == RoundId::Precomputed => {
				let layout = layouts.remove(0);
				let committed = Self::commit_precomputed(&code, &layout, precomputed)?;
				Some((layout, committed))
			}
			_ => None,
		};

		Ok(Self {
			config,
			code,
			rounds: layouts,
			precomputed,
			key,
			depth,
		})
	}

	/// Commits the precomputed round; it is committed once, when the context is compiled.
	fn commit_precomputed<Row>(
		code: &ReedSolomonCode,
		layout: &RoundLayout,
		rows: &[Row],
	) -> Result<CommittedRound, Error>
	where
		Row: AsRef<[KoalaBear]> + Sync,
	{
		let committed = commit_rows(code, layout, rows)?;
		tracing::debug!(rows = rows.len(), "committed precomputed round");
		Ok(committed)
	}

	pub fn num_rounds(&self) -> usize {
		self.rounds.len()
	}

	pub fn round(&self, index: usize) -> Result<&RoundLayout, Error> {
		self.rounds.get(index).ok_or(Error::UnknownRound {
			round: index,
			num_rounds: self.rounds.len(),
		})
	}

	/// Layout of the precomputed round, absent when there are no precomputed rows.
	pub fn precomputed_round(&self) -> Option<&RoundLayout> {
		self.precomputed.as_ref().map(|(layout, _)| layout)
	}

	pub fn precomputed_commitment(&self) -> Option<&CommittedRound> {
		self.precomputed.as_ref().map(|(_, committed)| committed)
	}

	pub fn num_opened_columns(&self) -> usize {
		self.config.num_opened_columns()
	}

	pub fn codeword_len(&self) -> usize {
		self.config.codeword_len()
	}

	/// Depth of every round's Merkle tree.
	pub fn merkle_depth(&self) -> usize {
		self.config.log_row_len() + self.config.log_inv_rate()
	}

	/// Number of Merkle trees, the precomputed one included.
	pub fn num_committed_rounds(&self) -> usize {
		self.rounds.len() + usize::from(self.precomputed.is_some())
	}

	/// Number of octuplets of the packed Merkle proof column.
	pub fn merkle_proof_size(&self) -> usize {
		next_pow2(self.merkle_depth() * self.num_committed_rounds() * self.num_opened_columns())
	}

	/// The rounds in stacking order: sponge-hashed rounds before lattice-hashed ones, the
	/// precomputed round in front of its group.
	pub fn stacked_rounds(&self) -> Vec<&RoundLayout> {
		let precomputed = self.precomputed_round();
		let group = |lattice: bool| {
			precomputed
				.filter(move |layout| layout.mode.is_lattice() == lattice)
				.into_iter()
				.chain(
					self.rounds
						.iter()
						.filter(move |layout| layout.mode.is_lattice() == lattice),
				)
		};
		group(false).chain(group(true)).collect()
	}

	/// Total number of stacked rows, shadow rows included.
	pub fn num_stacked_rows(&self) -> usize {
		self.stacked_rounds()
			.iter()
			.map(|layout| layout.num_stacked_rows())
			.sum()
	}

	/// Number of stacked rows belonging to sponge-hashed rounds, which come first.
	pub fn sis_offset(&self) -> usize {
		self.stacked_rounds()
			.iter()
			.filter(|layout| !layout.mode.is_lattice())
			.map(|layout| layout.num_stacked_rows())
			.sum()
	}

	/// Commits the rows of prover round `round`.
	pub fn commit<Row>(&self, round: usize, rows: &[Row]) -> Result<CommittedRound, Error>
	where
		Row: AsRef<[KoalaBear]> + Sync,
	{
		let layout = self.round(round)?;
		ensure!(
			rows.len() == layout.num_rows(),
			Error::NumRowsMismatch {
				round,
				expected: layout.num_rows(),
				actual: rows.len(),
			}
		);
		commit_rows(&self.code, layout, rows)
	}

	/// Selects, in stacking order, the committed round of each stacked layout.
	pub(crate) fn stacked_commitments<'a>(
		&'a self,
		committed: &'a [CommittedRound],
	) -> Result<Vec<&'a CommittedRound>, Error> {
		ensure!(
			committed.len() == self.num_rounds(),
			Error::NumRoundsMismatch {
				expected: self.num_rounds(),
				actual: committed.len(),
			}
		);
		self.stacked_rounds()
			.into_iter()
			.map(|layout| match layout.id {
				RoundId::Committed(index) => Ok(&committed[index]),
				RoundId::Precomputed => self
					.precomputed_commitment()
					.ok_or(Error::Configuration("the precomputed round is not committed")),
			})
			.collect()
	}

	/// Roots in stacking order, given the roots of the prover rounds by index.
	pub fn stacked_roots(&self, roots: &[Octuplet]) -> Result<Vec<Octuplet>, Error> {
		ensure!(
			roots.len() == self.num_rounds(),
			Error::NumRoundsMismatch {
				expected: self.num_rounds(),
				actual: roots.len(),
			}
		);
		Ok(self
			.stacked_rounds()
			.into_iter()
			.filter_map(|layout| match layout.id {
				RoundId::Committed(index) => Some(roots[index]),
				RoundId::Precomputed => self.precomputed_commitment().map(CommittedRound::root),
			})
			.collect())
	}

	/// Evaluates the polynomial of every row at `point`; the claims a caller attaches to a round.
	pub fn evaluate_rows<Row>(&self, rows: &[Row], point: KoalaBearExt4) -> Result<Vec<KoalaBearExt4>, Error>
	where
		Row: AsRef<[KoalaBear]> + Sync,
	{
		rows.par_iter()
			.map(|row| Ok(self.code.evaluate_message(row.as_ref(), point)?))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	fn lattice_config() -> VortexConfig {
		VortexConfig::new(4, 1)
			.with_target_security_bits(4)
			.with_sis(RingSisParams::new(4, 8).unwrap())
			.with_sis_threshold(4)
	}

	#[test]
	fn test_shadow_rows_fill_key_polynomials() {
		let ctx = VortexContext::compile::<Vec<KoalaBear>>(lattice_config(), &[6, 2, 9], &[]).unwrap();
		let fields_per_poly = ctx.config().sis().fields_per_poly();
		assert_eq!(fields_per_poly, 4);

		for layout in ctx.rounds() {
			if layout.mode().is_lattice() {
				assert_eq!(layout.num_stacked_rows() % fields_per_poly, 0);
			} else {
				assert_eq!(layout.num_shadow_rows(), 0);
			}
		}
		assert_eq!(ctx.round(0).unwrap().num_shadow_rows(), 2);
		assert!(!ctx.round(1).unwrap().mode().is_lattice());
		assert_eq!(ctx.round(2).unwrap().num_shadow_rows(), 3);
	}

	#[test]
	fn test_key_shards_are_disjoint_and_consecutive() {
		let ctx = VortexContext::compile::<Vec<KoalaBear>>(lattice_config(), &[6, 2, 9], &[]).unwrap();
		let shards = ctx
			.stacked_rounds()
			.into_iter()
			.filter_map(|layout| layout.mode().shard())
			.collect::<Vec<_>>();
		assert_eq!(shards.len(), 2);
		assert_eq!(shards[0].poly_offset(), 0);
		assert_eq!(shards[0].num_polys(), 2);
		assert_eq!(shards[1].poly_offset(), 2);
		assert_eq!(shards[1].num_polys(), 3);
		assert_eq!(ctx.key().as_ref().map(|key| key.num_polys()), Some(5));
	}

	#[test]
	fn test_stacking_order() {
		let precomputed = vec![vec![KoalaBear::default(); 16]; 5];
		let ctx = VortexContext::compile(lattice_config(), &[6, 2, 1], &precomputed).unwrap();
		let order = ctx
			.stacked_rounds()
			.into_iter()
			.map(|layout| layout.id())
			.collect::<Vec<_>>();
		assert_eq!(
			order,
			vec![
				RoundId::Committed(1),
				RoundId::Committed(2),
				RoundId::Precomputed,
				RoundId::Committed(0)
			]
		);
		assert_eq!(ctx.sis_offset(), 3);
		assert_eq!(ctx.num_committed_rounds(), 4);
		// depth 5, 4 trees, 4 opened columns
		assert_eq!(ctx.merkle_proof_size(), 128);
	}

	#[test]
	fn test_empty_precomputed_round_is_skipped() {
		let ctx = VortexContext::compile::<Vec<KoalaBear>>(lattice_config(), &[6], &[]).unwrap();
		assert!(ctx.precomputed_round().is_none());
		assert_eq!(ctx.num_committed_rounds(), 1);
		assert_eq!(ctx.stacked_rounds().len(), 1);
		assert_eq!(ctx.stacked_roots(&[[KoalaBear::default(); 8]]).unwrap().len(), 1);
	}

	#[test]
	fn test_compile_rejects_bad_configurations() {
		assert_matches!(
			VortexContext::compile::<Vec<KoalaBear>>(VortexConfig::new(4, 0), &[4], &[]),
			Err(Error::Configuration(_))
		);
		assert_matches!(
			VortexContext::compile::<Vec<KoalaBear>>(VortexConfig::new(4, 1), &[4, 0], &[]),
			Err(Error::Configuration(_))
		);
		assert_matches!(
			VortexContext::compile(VortexConfig::new(4, 1), &[4], &[vec![KoalaBear::default(); 8]]),
			Err(Error::EncodingSizeMismatch { row: 0, expected: 16, actual: 8 })
		);
	}
}
