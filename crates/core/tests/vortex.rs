// Copyright 2024 Irreducible Inc.

mod common;

use assert_matches::assert_matches;
use common::{open_random, Opening};
use p3_field::PrimeCharacteristicRing;
use vortex_core::{
	challenger::new_koala_bear_challenger,
	vortex::{verify, Error, VerificationError, VortexConfig},
};
use vortex_hash::ring_sis::RingSisParams;
use vortex_math::{KoalaBear, KoalaBearExt4};

fn check(opening: &Opening) -> Result<(), Error> {
	verify(&opening.ctx, &opening.instance, &opening.proof, &mut new_koala_bear_challenger())
}

/// 16 rows of 32 symbols, rate 1/4, lattice hashed.
fn reference_config() -> VortexConfig {
	VortexConfig::new(5, 2)
		.with_target_security_bits(8)
		.with_sis(RingSisParams::new(6, 16).unwrap())
		.with_sis_threshold(16)
}

#[test]
fn test_end_to_end_lattice_round() {
	let opening = open_random(reference_config(), &[16], 0, 0);
	let layout = opening.ctx.round(0).unwrap();
	assert!(layout.mode().is_lattice());
	assert_eq!(layout.num_shadow_rows(), 16);
	assert_eq!(opening.proof.columns.len(), 8);
	check(&opening).unwrap();
}

#[test]
fn test_corrupted_sibling_is_rejected() {
	let mut opening = open_random(reference_config(), &[16], 0, 1);
	opening.proof.merkle_proofs[0][0][2][5] += KoalaBear::ONE;
	assert_matches!(
		check(&opening),
		Err(Error::Verification(VerificationError::InclusionCheckFailed { round: 0, column: 0 }))
	);
}

#[test]
fn test_flipped_symbol_is_rejected() {
	let mut opening = open_random(reference_config(), &[16], 0, 2);
	opening.proof.opened_columns[0][4][7] += KoalaBear::ONE;
	assert_matches!(
		check(&opening),
		Err(Error::Verification(
			VerificationError::InclusionCheckFailed { column: 4, .. }
				| VerificationError::LinearCombinationMismatch { column: Some(4) }
		))
	);
}

#[test]
fn test_combined_row_is_bound_by_the_transcript() {
	let mut opening = open_random(reference_config(), &[16], 0, 3);
	opening.proof.combined_row[3] += KoalaBearExt4::ONE;
	assert_matches!(
		check(&opening),
		Err(Error::Verification(
			VerificationError::IncorrectProofShape | VerificationError::ProximityCheckFailed
		))
	);
}

#[test]
fn test_mixed_rounds_with_precomputed() {
	let config = VortexConfig::new(4, 1)
		.with_target_security_bits(8)
		.with_sis(RingSisParams::new(5, 8).unwrap())
		.with_sis_threshold(6);
	let opening = open_random(config, &[3, 10, 1, 7], 9, 4);

	let ctx = &opening.ctx;
	let lattice = ctx
		.stacked_rounds()
		.into_iter()
		.map(|layout| layout.mode().is_lattice())
		.collect::<Vec<_>>();
	assert_eq!(lattice, vec![false, false, true, true, true]);
	for layout in ctx.stacked_rounds() {
		if layout.mode().is_lattice() {
			assert_eq!(layout.num_stacked_rows() % config.sis().fields_per_poly(), 0);
		} else {
			assert_eq!(layout.num_shadow_rows(), 0);
		}
	}
	check(&opening).unwrap();
}

#[test]
fn test_sponge_only_rounds() {
	let config = VortexConfig::new(3, 1)
		.with_target_security_bits(8)
		.with_lattice_enabled(false);
	let opening = open_random(config, &[40, 2], 0, 5);
	assert!(opening.ctx.key().is_none());
	check(&opening).unwrap();
}

#[test]
fn test_empty_precomputed_round_is_not_opened() {
	let opening = open_random(reference_config(), &[16, 3], 0, 6);
	assert!(opening.ctx.precomputed_round().is_none());
	assert_eq!(opening.proof.opened_columns.len(), 2);
	assert_eq!(opening.ctx.num_committed_rounds(), 2);
	check(&opening).unwrap();
}

#[test]
fn test_encoding_is_deterministic() {
	let opening = open_random(reference_config(), &[16], 0, 7);
	let again = opening.ctx.commit(0, &opening.rounds[0]).unwrap();
	assert_eq!(again.root(), opening.committed[0].root());
	assert_eq!(again.encoded().values, opening.committed[0].encoded().values);
}

#[test]
fn test_encoding_is_systematic() {
	let opening = open_random(reference_config(), &[16], 0, 8);
	let encoded = opening.committed[0].encoded();
	let inv_rate = 1 << opening.ctx.config().log_inv_rate();
	for (row, values) in opening.rounds[0].iter().enumerate() {
		for (k, value) in values.iter().enumerate() {
			assert_eq!(encoded.values[row * encoded.width + k * inv_rate], *value);
		}
	}
}
