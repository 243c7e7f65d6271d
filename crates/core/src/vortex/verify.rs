// Copyright 2024 Irreducible Inc.

use itertools::izip;
use vortex_hash::compression;
use vortex_math::{evaluate_univariate, KoalaBearExt4};
use vortex_utils::{bail, ensure};

use super::{
	context::{RoundId, RoundLayout, VortexContext},
	error::{Error, VerificationError},
	proof::{OpeningProof, VortexInstance},
	transcript::{sample_combination_challenge, sample_opened_columns},
};
use crate::{challenger::VortexChallenger, linear_code::LinearCode, merkle_tree::verify_opening};

/// Verifies an opening proof against the instance.
///
/// The checks run in a fixed order: the proof shape, proximity of the combined row, Merkle
/// inclusion of every opened column, and consistency of the opened columns with the combined row.
#[tracing::instrument(skip_all, name = "vortex::verify", level = "debug", fields(depth = ctx.depth().value()))]
pub fn verify<CH>(
	ctx: &VortexContext,
	instance: &VortexInstance,
	proof: &OpeningProof,
	challenger: &mut CH,
) -> Result<(), Error>
where
	CH: VortexChallenger,
{
	let layouts = ctx.stacked_rounds();
	let ys = stacked_claims(ctx, &layouts, instance)?;
	let roots = ctx.stacked_roots(&instance.roots)?;

	let alpha = sample_combination_challenge(challenger, &roots);
	check_proof_shape(ctx, &layouts, proof)?;
	let columns = sample_opened_columns(
		challenger,
		&proof.combined_row,
		ctx.code().log_len(),
		ctx.num_opened_columns(),
	);
	ensure!(proof.columns == columns, VerificationError::IncorrectProofShape);

	// Proximity: U is a codeword whose polynomial takes the combined claim at the point.
	let code = ctx.code();
	if !code.is_codeword(&proof.combined_row)? {
		bail!(VerificationError::ProximityCheckFailed);
	}
	let coeffs = code.interpolate(&proof.combined_row)?;
	ensure!(
		evaluate_univariate(&coeffs, instance.point) == evaluate_univariate(&ys, alpha),
		VerificationError::ProximityCheckFailed
	);

	for (round, (layout, root, opened, proofs)) in
		izip!(&layouts, &roots, &proof.opened_columns, &proof.merkle_proofs).enumerate()
	{
		for (selection, (&index, column, siblings)) in izip!(&columns, opened, proofs).enumerate() {
			let digest = layout.mode().hash_column(column, layout.num_shadow_rows())?;
			verify_opening(compression(), root, digest.leaf, index, siblings).map_err(|_| {
				VerificationError::InclusionCheckFailed {
					round,
					column: selection,
				}
			})?;
		}
	}

	for (selection, &index) in columns.iter().enumerate() {
		let column = proof.stacked_column(&layouts, selection);
		ensure!(
			evaluate_univariate(&column, alpha) == proof.combined_row[index],
			VerificationError::LinearCombinationMismatch {
				column: Some(selection),
			}
		);
	}

	Ok(())
}

/// The claimed row evaluations in stacking order, zeros for the shadow rows.
pub(crate) fn stacked_claims(
	ctx: &VortexContext,
	layouts: &[&RoundLayout],
	instance: &VortexInstance,
) -> Result<Vec<KoalaBearExt4>, Error> {
	ensure!(
		instance.ys.len() == ctx.num_rounds(),
		Error::NumRoundsMismatch {
			expected: ctx.num_rounds(),
			actual: instance.ys.len(),
		}
	);

	let mut ys = Vec::with_capacity(ctx.num_stacked_rows());
	for layout in layouts {
		let claims = match layout.id() {
			RoundId::Committed(index) => &instance.ys[index],
			RoundId::Precomputed => &instance.precomputed_ys,
		};
		ensure!(claims.len() == layout.num_rows(), VerificationError::IncorrectProofShape);
		ys.extend_from_slice(claims);
		ys.resize(ys.len() + layout.num_shadow_rows(), KoalaBearExt4::default());
	}
	if ctx.precomputed_round().is_none() {
		ensure!(instance.precomputed_ys.is_empty(), VerificationError::IncorrectProofShape);
	}
	Ok(ys)
}

pub(crate) fn check_proof_shape(
	ctx: &VortexContext,
	layouts: &[&RoundLayout],
	proof: &OpeningProof,
) -> Result<(), Error> {
	let num_opened = ctx.num_opened_columns();
	let depth = ctx.merkle_depth();

	let well_formed = proof.combined_row.len() == ctx.codeword_len()
		&& proof.columns.len() == num_opened
		&& proof.opened_columns.len() == layouts.len()
		&& proof.merkle_proofs.len() == layouts.len()
		&& izip!(layouts, &proof.opened_columns, &proof.merkle_proofs).all(
			|(layout, opened, proofs)| {
				opened.len() == num_opened
					&& proofs.len() == num_opened
					&& opened.iter().all(|column| column.len() == layout.num_rows())
					&& proofs.iter().all(|siblings| siblings.len() == depth)
			},
		);
	ensure!(well_formed, VerificationError::IncorrectProofShape);
	Ok(())
}
