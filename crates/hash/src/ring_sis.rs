// Copyright 2024 Irreducible Inc.

//! Ring-SIS hash over $\mathbb{F}_p[X]/(X^d + 1)$.
//!
//! An input vector of field elements is decomposed into short limbs of `log_two_bound` bits,
//! the limbs are grouped into polynomials $s_j$ of `d` coefficients, and the digest is
//! $\sum_j a_j(X) \cdot s_j(X) \bmod X^d + 1$ where the $a_j$ are the public key polynomials.
//!
//! The key is split into disjoint [`KeyShard`]s, one per committed round, so that each committed
//! row is hashed with its own slice of the key.

use std::sync::Arc;

use getset::CopyGetters;
use groestl_crypto::Groestl256;
use p3_field::{ExtensionField, Field, PrimeCharacteristicRing, PrimeField32, TwoAdicField};
use rayon::prelude::*;
use vortex_math::{
	dft::{evaluate_on_subgroup, interpolate_subgroup},
	KoalaBear, KOALA_BEAR_BITS,
};
use vortex_utils::{bail, ensure};

use crate::expand::expand_seed;

const KEY_DOMAIN: &[u8] = b"vortex/ring-sis-key";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("the limb size must be between 1 and {max} bits, got {log_two_bound}")]
	InvalidBound { log_two_bound: usize, max: usize },
	#[error("the number of limbs per element ({num_limbs}) must divide the ring degree 2^{log_two_degree}")]
	DegreeNotDivisible {
		num_limbs: usize,
		log_two_degree: usize,
	},
	#[error("key shard {offset}..{end} exceeds the key of {num_polys} polynomials")]
	ShardOutOfRange {
		offset: usize,
		end: usize,
		num_polys: usize,
	},
	#[error("input of {len} limbs exceeds the shard capacity of {capacity} limbs")]
	InputTooLong { len: usize, capacity: usize },
	#[error("the field has no root of unity of order 2^{log_order}")]
	DegreeTooLarge { log_order: usize },
}

/// Parameters of the ring-SIS instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct RingSisParams {
	/// Base-2 logarithm of the ring degree `d`.
	log_two_degree: usize,
	/// Bit size of a limb; limbs lie in `0..2^log_two_bound`.
	log_two_bound: usize,
}

impl Default for RingSisParams {
	/// Degree 64 with 16-bit limbs, two limbs per element.
	fn default() -> Self {
		Self {
			log_two_degree: 6,
			log_two_bound: 16,
		}
	}
}

impl RingSisParams {
	pub fn new(log_two_degree: usize, log_two_bound: usize) -> Result<Self, Error> {
		if log_two_bound == 0 || log_two_bound > KOALA_BEAR_BITS {
			bail!(Error::InvalidBound {
				log_two_bound,
				max: KOALA_BEAR_BITS,
			});
		}
		// One extra bit for the 2d-th root of unity of the negacyclic twist.
		if log_two_degree + 1 > KoalaBear::TWO_ADICITY {
			bail!(Error::DegreeTooLarge {
				log_order: log_two_degree + 1,
			});
		}

		let params = Self {
			log_two_degree,
			log_two_bound,
		};
		ensure!(
			params.degree() % params.num_limbs() == 0,
			Error::DegreeNotDivisible {
				num_limbs: params.num_limbs(),
				log_two_degree,
			}
		);
		Ok(params)
	}

	/// The ring degree `d`, also the number of field elements in a digest.
	pub const fn degree(&self) -> usize {
		1 << self.log_two_degree
	}

	/// Number of limbs each field element is decomposed into.
	pub const fn num_limbs(&self) -> usize {
		KOALA_BEAR_BITS.div_ceil(self.log_two_bound)
	}

	/// Number of field elements packed into one ring element.
	pub const fn fields_per_poly(&self) -> usize {
		self.degree() / self.num_limbs()
	}

	/// Size of a digest in field elements.
	pub const fn output_size(&self) -> usize {
		self.degree()
	}

	/// Number of key polynomials needed to hash `num_fields` field elements.
	pub const fn num_polys_for(&self, num_fields: usize) -> usize {
		num_fields.div_ceil(self.fields_per_poly())
	}

	/// Splits every element into `num_limbs` little-endian limbs of `log_two_bound` bits.
	pub fn limb_split(&self, elems: &[KoalaBear]) -> Vec<KoalaBear> {
		let mask = (1u64 << self.log_two_bound) - 1;
		elems
			.iter()
			.flat_map(|elem| {
				let value = elem.as_canonical_u32() as u64;
				(0..self.num_limbs())
					.map(move |k| KoalaBear::from_u64((value >> (k * self.log_two_bound)) & mask))
			})
			.collect()
	}

	/// Inverse of [`Self::limb_split`], valid for limbs of any size.
	pub fn limb_recompose<FE: ExtensionField<KoalaBear>>(&self, limbs: &[FE]) -> Vec<FE> {
		let radix = KoalaBear::from_u64(1 << self.log_two_bound);
		limbs
			.chunks(self.num_limbs())
			.map(|chunk| chunk.iter().rev().fold(FE::ZERO, |acc, &limb| acc * radix + limb))
			.collect()
	}
}

/// The public key of the ring-SIS hash.
#[derive(Debug)]
pub struct RingSisKey {
	params: RingSisParams,
	num_polys: usize,
	/// Coefficients of the key polynomials, `d` per polynomial.
	coeffs: Vec<KoalaBear>,
	/// Evaluations of `ψ^i · a_j[i]` on the subgroup of order `d`, used for the negacyclic product.
	negacyclic_evals: Vec<KoalaBear>,
	/// Evaluations of `a_j` on the subgroup of order `d`, used for the cyclic product.
	cyclic_evals: Vec<KoalaBear>,
	/// `ψ^i` for a primitive `2d`-th root of unity `ψ`.
	twist: Vec<KoalaBear>,
	untwist: Vec<KoalaBear>,
}

impl RingSisKey {
	/// Derives a key of `num_polys` polynomials from `seed`.
	#[tracing::instrument(skip_all, name = "RingSisKey::generate", level = "debug")]
	pub fn generate(params: RingSisParams, num_polys: usize, seed: u64) -> Result<Self, Error> {
		let degree = params.degree();

		let psi = KoalaBear::two_adic_generator(params.log_two_degree() + 1);
		let twist = psi.powers().take(degree).collect::<Vec<_>>();
		let untwist = psi.inverse().powers().take(degree).collect::<Vec<_>>();

		let coeffs = expand_seed::<Groestl256>(KEY_DOMAIN, seed, num_polys * degree);

		let cyclic_evals = coeffs
			.par_chunks_exact(degree)
			.map(|poly| evaluate_on_subgroup(poly.to_vec()))
			.collect::<Vec<_>>()
			.concat();
		let negacyclic_evals = coeffs
			.par_chunks_exact(degree)
			.map(|poly| {
				let twisted = poly.iter().zip(&twist).map(|(&c, &t)| c * t).collect();
				evaluate_on_subgroup(twisted)
			})
			.collect::<Vec<_>>()
			.concat();

		Ok(Self {
			params,
			num_polys,
			coeffs,
			negacyclic_evals,
			cyclic_evals,
			twist,
			untwist,
		})
	}

	pub const fn params(&self) -> &RingSisParams {
		&self.params
	}

	pub const fn num_polys(&self) -> usize {
		self.num_polys
	}

	/// Returns the shard made of the key polynomials `poly_offset..poly_offset + num_polys`.
	pub fn shard(self: &Arc<Self>, poly_offset: usize, num_polys: usize) -> Result<KeyShard, Error> {
		let end = poly_offset + num_polys;
		ensure!(
			end <= self.num_polys,
			Error::ShardOutOfRange {
				offset: poly_offset,
				end,
				num_polys: self.num_polys,
			}
		);
		Ok(KeyShard {
			key: Arc::clone(self),
			poly_offset,
			num_polys,
		})
	}
}

/// Which reduction to apply to the key-preimage product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reduction {
	/// Modulo `X^d + 1`, the ring-SIS hash itself.
	Negacyclic,
	/// Modulo `X^d - 1`, the dual used to check the hash at a random point.
	Cyclic,
}

/// A contiguous slice of the key polynomials, assigned to one committed round.
#[derive(Debug, Clone, CopyGetters)]
pub struct KeyShard {
	key: Arc<RingSisKey>,
	#[getset(get_copy = "pub")]
	poly_offset: usize,
	#[getset(get_copy = "pub")]
	num_polys: usize,
}

impl KeyShard {
	pub fn params(&self) -> &RingSisParams {
		&self.key.params
	}

	/// Number of field elements a column hashed with this shard may have.
	pub fn max_num_fields(&self) -> usize {
		self.num_polys * self.key.params.fields_per_poly()
	}

	/// Coefficients of the shard polynomials, concatenated.
	pub fn flattened_key(&self) -> &[KoalaBear] {
		let degree = self.key.params.degree();
		&self.key.coeffs[self.poly_offset * degree..(self.poly_offset + self.num_polys) * degree]
	}

	/// Ring-SIS digest of a column of field elements.
	pub fn hash(&self, column: &[KoalaBear]) -> Result<Vec<KoalaBear>, Error> {
		let limbs = self.key.params.limb_split(column);
		self.hash_limbs(&limbs)
	}

	/// Ring-SIS digest of an already limb-decomposed input, `Σ a_j·s_j mod X^d + 1`.
	///
	/// The limbs need not be short; this is the linear map underlying the hash.
	pub fn hash_limbs<FE: ExtensionField<KoalaBear>>(&self, limbs: &[FE]) -> Result<Vec<FE>, Error> {
		self.product(limbs, Reduction::Negacyclic)
	}

	/// `Σ a_j·s_j mod X^d - 1`, evaluated on an already limb-decomposed input.
	pub fn hash_limbs_mod_xn_minus_1<FE: ExtensionField<KoalaBear>>(
		&self,
		limbs: &[FE],
	) -> Result<Vec<FE>, Error> {
		self.product(limbs, Reduction::Cyclic)
	}

	fn product<FE: ExtensionField<KoalaBear>>(
		&self,
		limbs: &[FE],
		reduction: Reduction,
	) -> Result<Vec<FE>, Error> {
		let key = &*self.key;
		let degree = key.params.degree();
		let capacity = self.num_polys * degree;
		ensure!(limbs.len() <= capacity, Error::InputTooLong { len: limbs.len(), capacity });

		let key_evals = match reduction {
			Reduction::Negacyclic => &key.negacyclic_evals,
			Reduction::Cyclic => &key.cyclic_evals,
		};
		let key_evals = &key_evals[self.poly_offset * degree..(self.poly_offset + self.num_polys) * degree];

		let mut acc = vec![FE::ZERO; degree];
		for (chunk, key_poly) in limbs.chunks(degree).zip(key_evals.chunks_exact(degree)) {
			let mut poly = chunk.to_vec();
			poly.resize(degree, FE::ZERO);
			if reduction == Reduction::Negacyclic {
				for (x, &t) in poly.iter_mut().zip(&key.twist) {
					*x *= t;
				}
			}
			let evals = evaluate_on_subgroup(poly);
			for ((a, s), &k) in acc.iter_mut().zip(evals).zip(key_poly) {
				*a += s * k;
			}
		}

		let mut acc = interpolate_subgroup(acc);
		if reduction == Reduction::Negacyclic {
			for (x, &t) in acc.iter_mut().zip(&key.untwist) {
				*x *= t;
			}
		}
		Ok(acc)
	}
}
