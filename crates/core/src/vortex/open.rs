// Copyright 2024 Irreducible Inc.

use p3_field::PrimeCharacteristicRing;
use rayon::prelude::*;
use vortex_math::{evaluate_univariate, KoalaBear, KoalaBearExt4};
use vortex_utils::rayon::min_len_per_task;

use super::{
	commit::CommittedRound,
	context::{RoundLayout, VortexContext},
	digest::matrix_column,
	error::Error,
	proof::OpeningProof,
	transcript::{sample_combination_challenge, sample_opened_columns},
};
use crate::challenger::VortexChallenger;

/// Opens every committed round at once.
///
/// The rounds are stacked, sponge-hashed rounds first, and combined with the powers of a single
/// challenge α. Shadow rows take their power of α but contribute nothing.
#[tracing::instrument(skip_all, name = "vortex::open", level = "debug", fields(depth = ctx.depth().value()))]
pub fn open<CH>(
	ctx: &VortexContext,
	committed: &[CommittedRound],
	challenger: &mut CH,
) -> Result<OpeningProof, Error>
where
	CH: VortexChallenger,
{
	let layouts = ctx.stacked_rounds();
	let rounds = ctx.stacked_commitments(committed)?;
	let roots = rounds.iter().map(|round| round.root()).collect::<Vec<_>>();

	let alpha = sample_combination_challenge(challenger, &roots);
	let combined_row = combine_rows(&layouts, &rounds, ctx.codeword_len(), alpha);

	let columns = sample_opened_columns(
		challenger,
		&combined_row,
		ctx.code().log_len(),
		ctx.num_opened_columns(),
	);
	tracing::debug!(?columns, "sampled opened columns");

	let opened_columns = rounds
		.iter()
		.map(|round| {
			columns
				.iter()
				.map(|&index| matrix_column(round.encoded(), index))
				.collect()
		})
		.collect();
	let merkle_proofs = rounds
		.iter()
		.map(|round| {
			columns
				.iter()
				.map(|&index| round.tree().branch(index))
				.collect::<Result<Vec<_>, _>>()
		})
		.collect::<Result<Vec<_>, _>>()?;

	Ok(OpeningProof {
		combined_row,
		columns,
		opened_columns,
		merkle_proofs,
	})
}

/// `U[j] = Σ α^i·M[i][j]` over the stacked encoded rows.
fn combine_rows(
	layouts: &[&RoundLayout],
	rounds: &[&CommittedRound],
	codeword_len: usize,
	alpha: KoalaBearExt4,
) -> Vec<KoalaBearExt4> {
	(0..codeword_len)
		.into_par_iter()
		.with_min_len(min_len_per_task(codeword_len))
		.map(|index| {
			let mut column = Vec::new();
			for (layout, round) in layouts.iter().zip(rounds) {
				column.extend(matrix_column(round.encoded(), index));
				column.resize(column.len() + layout.num_shadow_rows(), KoalaBear::ZERO);
			}
			evaluate_univariate(&column, alpha)
		})
		.collect()
}
