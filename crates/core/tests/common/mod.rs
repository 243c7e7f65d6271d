// Copyright 2024 Irreducible Inc.

#![allow(dead_code)]

use rand::{rngs::StdRng, Rng, SeedableRng};
use vortex_core::{
	challenger::new_koala_bear_challenger,
	vortex::{open, CommittedRound, OpeningProof, VortexConfig, VortexContext, VortexInstance},
};
use vortex_math::{KoalaBear, KoalaBearExt4};

pub fn random_rows(rng: &mut StdRng, num_rows: usize, row_len: usize) -> Vec<Vec<KoalaBear>> {
	(0..num_rows)
		.map(|_| (0..row_len).map(|_| rng.random()).collect())
		.collect()
}

/// An honest opening of freshly committed random rounds.
pub struct Opening {
	pub ctx: VortexContext,
	pub rounds: Vec<Vec<Vec<KoalaBear>>>,
	pub committed: Vec<CommittedRound>,
	pub instance: VortexInstance,
	pub proof: OpeningProof,
}

pub fn open_random(
	config: VortexConfig,
	round_rows: &[usize],
	num_precomputed: usize,
	seed: u64,
) -> Opening {
	let mut rng = StdRng::seed_from_u64(seed);
	let precomputed = random_rows(&mut rng, num_precomputed, config.row_len());
	let rounds = round_rows
		.iter()
		.map(|&num_rows| random_rows(&mut rng, num_rows, config.row_len()))
		.collect::<Vec<_>>();
	let point: KoalaBearExt4 = rng.random();

	let ctx = VortexContext::compile(config, round_rows, &precomputed).unwrap();
	open_rows(ctx, rounds, &precomputed, point)
}

pub fn open_rows(
	ctx: VortexContext,
	rounds: Vec<Vec<Vec<KoalaBear>>>,
	precomputed: &[Vec<KoalaBear>],
	point: KoalaBearExt4,
) -> Opening {
	let committed = rounds
		.iter()
		.enumerate()
		.map(|(index, rows)| ctx.commit(index, rows).unwrap())
		.collect::<Vec<_>>();
	let instance = VortexInstance {
		roots: committed.iter().map(CommittedRound::root).collect(),
		point,
		ys: rounds
			.iter()
			.map(|rows| ctx.evaluate_rows(rows, point).unwrap())
			.collect(),
		precomputed_ys: ctx.evaluate_rows(precomputed, point).unwrap(),
	};
	let proof = open(&ctx, &committed, &mut new_koala_bear_challenger()).unwrap();

	Opening {
		ctx,
		rounds,
		committed,
		instance,
		proof,
	}
}
