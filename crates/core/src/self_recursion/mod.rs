// Copyright 2024 Irreducible Inc.

//! Self-recursion: re-expressing the verification of a Vortex opening as columns and constraints.
//!
//! The pass replays the opening transcript, registers the proof data as columns of a
//! [`ColumnArena`](crate::iop::ColumnArena) and adds the constraints an outer layer has to prove:
//!
//! 1. the combined row `U` is a codeword and evaluates to the combined claim;
//! 2. the opened columns sit at the sampled positions of `U`, their lattice parts are short, and
//!    their re-derived leaves open the round roots;
//! 3. after collapsing the opened columns with the powers of `r`, the collapsed preimages match
//!    the collapsed combined-row entries;
//! 4. after folding at `x`, the collapsed key and preimage satisfy the CRT identity
//!    `E(x)·(x^d + 1) − D(x)·(x^d − 1) = 2·⟨A, S⟩` against the collapsed digests.
//!
//! The proof columns of the output are committed again by the next layer.

mod collapse;
mod compiler;
mod context;
mod error;
mod opening;
mod output;

pub use context::*;
pub use error::*;
pub use output::*;
use vortex_math::evaluate_univariate;
use vortex_utils::ensure;

use self::compiler::Compiler;
use crate::{
	challenger::VortexChallenger,
	vortex::{
		check_proof_shape, sample_combination_challenge, sample_opened_columns, stacked_claims,
		OpeningProof, VerificationError, VortexContext, VortexInstance,
	},
};

/// Compiles the verification of `proof` into a new set of columns and constraints.
///
/// The pass fails, and emits nothing, when the proof is malformed or any constraint fails on the
/// values the proof provides. The returned context is one level deeper than `ctx`.
#[tracing::instrument(skip_all, name = "self_recursion::self_recurse", level = "debug", fields(depth = ctx.depth().value()))]
pub fn self_recurse<CH>(
	ctx: &VortexContext,
	instance: &VortexInstance,
	proof: &OpeningProof,
	challenger: &mut CH,
) -> Result<SelfRecursionOutput, Error>
where
	CH: VortexChallenger,
{
	let layouts = ctx.stacked_rounds();
	let claims = stacked_claims(ctx, &layouts, instance)?;
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

	let mut compiler = Compiler::new(ctx, layouts, proof, alpha);
	let precomputed = compiler.precompute();
	let combined_row = compiler.combine_rows(instance.point, evaluate_univariate(&claims, alpha));
	let opening = compiler.open_columns(&precomputed, combined_row, &columns, &roots)?;

	compiler.observe_proof_columns(challenger);
	let r_collapse = challenger.sample_algebra_element();
	let collapse = compiler.collapse(&precomputed, &opening, r_collapse)?;

	let (fold, r_fold) = match (collapse.preimage_collapse, &collapse.lattice) {
		(Some(preimage_collapse), Some(lattice)) => {
			compiler.observe_proof_columns(challenger);
			let r_fold = challenger.sample_algebra_element();
			(Some(compiler.fold(preimage_collapse, lattice, r_fold)?), Some(r_fold))
		}
		_ => (None, None),
	};

	let (arena, constraints) = compiler.finish();
	tracing::debug!(columns = arena.len(), constraints = constraints.len(), "compiled opening");

	let output = SelfRecursionOutput {
		columns: arena,
		constraints,
		context: SelfRecursionContext::new(
			ctx.depth().next(),
			precomputed,
			combined_row,
			opening,
			collapse,
			fold,
			Challenges {
				alpha,
				columns,
				r_collapse,
				r_fold,
			},
		),
	};
	output.check()?;
	Ok(output)
}
