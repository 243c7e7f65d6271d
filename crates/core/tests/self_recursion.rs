// Copyright 2024 Irreducible Inc.

mod common;

use assert_matches::assert_matches;
use common::{open_random, open_rows, Opening};
use p3_field::PrimeCharacteristicRing;
use rand::{rngs::StdRng, Rng, SeedableRng};
use vortex_core::{
	challenger::new_koala_bear_challenger,
	iop::{ColumnData, ColumnStatus, RecursionDepth},
	self_recursion::{self_recurse, Error, SelfRecursionOutput},
	vortex::{matrix_column, verify, RoundId, VerificationError, VortexConfig, VortexContext},
};
use vortex_hash::ring_sis::RingSisParams;
use vortex_math::{KoalaBear, KoalaBearExt4};

fn mixed_config() -> VortexConfig {
	VortexConfig::new(3, 2)
		.with_target_security_bits(8)
		.with_sis(RingSisParams::new(4, 8).unwrap())
		.with_sis_threshold(4)
}

fn recurse(opening: &Opening) -> Result<SelfRecursionOutput, Error> {
	self_recurse(&opening.ctx, &opening.instance, &opening.proof, &mut new_koala_bear_challenger())
}

#[test]
fn test_honest_pass_with_mixed_rounds() {
	let opening = open_random(mixed_config(), &[6, 2, 5], 3, 0);
	let output = recurse(&opening).unwrap();
	let context = &output.context;

	assert_eq!(context.depth(), RecursionDepth::ROOT.next());
	assert_eq!(context.challenges.columns, opening.proof.columns);
	assert_eq!(context.opening.limbs.len(), 8);
	assert_eq!(context.opening.non_sis.len(), 8);
	assert_eq!(context.opening.leaves.len(), 4);
	assert!(context.collapse.non_sis_collapse.is_some());
	assert!(context.fold.is_some());
	assert!(context.challenges.r_fold.is_some());

	let proofs = output.columns.get(context.opening.merkle.proofs).unwrap();
	assert_eq!(proofs.size(), opening.ctx.merkle_proof_size());
	assert_eq!(proofs.status(), ColumnStatus::Proof);
}

#[test]
fn test_sponge_only_pass_skips_the_fold() {
	let config = mixed_config().with_lattice_enabled(false);
	let opening = open_random(config, &[6, 2], 0, 1);
	let output = recurse(&opening).unwrap();

	let context = &output.context;
	assert!(context.precomputed.keys.is_empty());
	assert!(context.opening.limbs.is_empty());
	assert!(context.opening.concatenated_dhq.is_none());
	assert!(context.collapse.preimage_collapse.is_none());
	assert!(context.fold.is_none());
	assert_eq!(context.challenges.r_fold, None);
}

#[test]
fn test_lattice_only_pass() {
	let opening = open_random(mixed_config(), &[6, 4], 0, 2);
	let output = recurse(&opening).unwrap();
	assert!(output.context.opening.non_sis.is_empty());
	assert!(output.context.collapse.non_sis_collapse.is_none());
	assert!(output.context.fold.is_some());
}

#[test]
fn test_forged_membership_fails_selection() {
	let mut opening = open_random(mixed_config(), &[6, 2], 0, 3);
	let columns = &opening.proof.columns;
	let forged = (0..opening.ctx.codeword_len())
		.find(|position| !columns.contains(position))
		.unwrap();

	// Open the column at another position, with a valid Merkle proof for that position.
	let stacked = opening.ctx.stacked_rounds();
	for (round, layout) in stacked.iter().enumerate() {
		let committed = match layout.id() {
			RoundId::Committed(index) => &opening.committed[index],
			RoundId::Precomputed => unreachable!(),
		};
		opening.proof.opened_columns[round][2] =
			matrix_column(committed.encoded(), forged);
		opening.proof.merkle_proofs[round][2] = committed.tree().branch(forged).unwrap();
	}

	assert_matches!(
		recurse(&opening),
		Err(Error::Verification(VerificationError::SelectionLookupFailed { index: 2 }))
	);
}

#[test]
fn test_corrupted_sibling_fails_merkle_check() {
	let mut opening = open_random(mixed_config(), &[6, 2], 0, 4);
	opening.proof.merkle_proofs[1][5][0][0] += KoalaBear::ONE;
	assert_matches!(
		recurse(&opening),
		Err(Error::Verification(VerificationError::InclusionCheckFailed { round: 1, column: 5 }))
	);
}

#[test]
fn test_wrong_claim_fails_evaluation() {
	let mut opening = open_random(mixed_config(), &[6, 2], 0, 5);
	opening.instance.ys[0][1] += KoalaBearExt4::ONE;
	assert_matches!(
		recurse(&opening),
		Err(Error::Verification(VerificationError::ProximityCheckFailed))
	);
}

#[test]
fn test_fold_identity_breaks_on_perturbation() {
	let opening = open_random(mixed_config(), &[6, 2], 0, 6);
	let mut output = recurse(&opening).unwrap();
	output.check().unwrap();

	let lattice = output.context.collapse.lattice.unwrap();
	let fold = output.context.fold.unwrap();
	let dual_failure = VerificationError::LatticeDualIdentityFailed;
	// DhQCollapse is also pinned to the concatenated DhQ by its outer fold, checked first.
	let cases = [
		(lattice.e_dual, dual_failure.clone()),
		(lattice.dhq_collapse, VerificationError::LinearCombinationMismatch { column: None }),
		(fold.a_collapse_fold, dual_failure.clone()),
		(fold.preimage_collapse_fold, dual_failure),
	];

	for (column, expected) in cases {
		let honest = output.columns.ext(column).unwrap();
		let mut values = honest.clone();
		values[3] += KoalaBearExt4::ONE;
		output.columns.assign(column, ColumnData::Ext(values)).unwrap();
		match output.check() {
			Err(Error::Verification(err)) => assert_eq!(err, expected),
			other => panic!("perturbed {column:?} gave {other:?}"),
		}
		output.columns.assign(column, ColumnData::Ext(honest)).unwrap();
	}
	output.check().unwrap();
}

#[test]
fn test_long_limb_fails_shortness() {
	let opening = open_random(mixed_config(), &[6, 2], 0, 7);
	let mut output = recurse(&opening).unwrap();

	let limbs = output.context.opening.limbs[1];
	let mut values = output.columns.base(limbs).unwrap().to_vec();
	values[3] = KoalaBear::new(1 << 8);
	output.columns.assign(limbs, ColumnData::Base(values)).unwrap();
	assert_matches!(
		output.check(),
		Err(Error::Verification(VerificationError::ShortnessCheckFailed { column: 1, index: 3 }))
	);
}

#[test]
fn test_committed_rows_cover_every_proof_column() {
	let opening = open_random(mixed_config(), &[6, 2], 0, 8);
	let output = recurse(&opening).unwrap();

	let row_len = 16;
	let expected = output
		.columns
		.iter()
		.filter(|(_, entry)| entry.status() == ColumnStatus::Proof)
		.map(|(_, entry)| entry.data().to_bases().len().next_power_of_two().max(row_len) / row_len)
		.sum::<usize>();
	let rows = output.committed_rows(row_len).unwrap();
	assert_eq!(rows.len(), expected);
	assert!(rows.iter().all(|row| row.len() == row_len));

	for row_len in [0, 12] {
		assert_matches!(
			output.committed_rows(row_len),
			Err(Error::RowLengthNotPowerOfTwo { row_len: len }) if len == row_len
		);
	}
}

#[test]
fn test_two_recursion_layers() {
	let opening = open_random(mixed_config(), &[6, 2], 2, 9);
	let first = recurse(&opening).unwrap();
	assert_eq!(first.context.depth(), RecursionDepth::new(1));

	let config = VortexConfig::new(6, 1).with_target_security_bits(8);
	let rows = first.committed_rows(config.row_len()).unwrap();
	let ctx = VortexContext::compile_at_depth::<Vec<KoalaBear>>(
		config,
		&[rows.len()],
		&[],
		first.context.depth(),
	)
	.unwrap();
	assert_eq!(ctx.depth(), RecursionDepth::new(1));

	let point: KoalaBearExt4 = StdRng::seed_from_u64(10).random();
	let second_opening = open_rows(ctx, vec![rows], &[], point);
	verify(
		&second_opening.ctx,
		&second_opening.instance,
		&second_opening.proof,
		&mut new_koala_bear_challenger(),
	)
	.unwrap();

	let second = recurse(&second_opening).unwrap();
	assert_eq!(second.context.depth(), RecursionDepth::new(2));
}
