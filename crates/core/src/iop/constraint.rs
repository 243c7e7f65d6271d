// Copyright 2024 Irreducible Inc.

use std::{collections::HashSet, ops::Range};

use p3_field::{PrimeCharacteristicRing, PrimeField32};
use vortex_hash::{compression, hash_column};
use vortex_math::{evaluate_univariate, KoalaBear, KoalaBearExt4};

use super::{
	arena::{ColumnArena, ColumnId},
	error::Error,
};
use crate::{
	linear_code::LinearCode, merkle_tree::verify_opening, reed_solomon::ReedSolomonCode,
	vortex::VerificationError,
};

/// What a failed lookup means for the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
	/// Opened columns must sit at the selected positions of the combined row.
	Selection,
	/// Re-derived leaves of a round must appear among the Merkle leaves.
	LeafConsistency { round: usize },
}

/// An algebraic relation between columns of a [`ColumnArena`].
#[derive(Debug, Clone)]
pub enum Constraint {
	/// The column is a codeword of the Reed–Solomon code with the given parameters.
	ReedSolomon {
		column: ColumnId,
		log_dimension: usize,
		log_inv_rate: usize,
	},
	/// The polynomial whose evaluations the codeword column holds takes `value` at `point`.
	UnivariateEval {
		column: ColumnId,
		log_dimension: usize,
		log_inv_rate: usize,
		point: KoalaBearExt4,
		value: KoalaBearExt4,
	},
	/// Every row of the `included` tuple of columns is a row of the `including` tuple.
	Inclusion {
		included: Vec<ColumnId>,
		including: Vec<ColumnId>,
		kind: LookupKind,
	},
	/// Every entry of the column is below `2^log_bound`.
	Range {
		column: ColumnId,
		log_bound: usize,
		/// Index of the opened column the limbs belong to.
		opened: usize,
	},
	/// `leaves[k]` opens at `positions[k]` of the tree with root `roots[k]`, with the `depth`
	/// siblings of the `k`-th proof stored root side first in `proofs`.
	MerkleCheck {
		proofs: ColumnId,
		roots: ColumnId,
		positions: ColumnId,
		leaves: ColumnId,
		depth: usize,
		num_opened: usize,
	},
	/// `leaves[k]` is the sponge hash of the `k`-th source slice.
	LinearHash {
		sources: Vec<(ColumnId, Range<usize>)>,
		leaves: ColumnId,
		round: usize,
	},
	/// `target = Σ_k coeffs[k] · sources[k]`, entry-wise.
	LinearCombination {
		target: ColumnId,
		sources: Vec<ColumnId>,
		coeffs: Vec<KoalaBearExt4>,
	},
	/// `target` is the concatenation of the `coeffs[k] · sources[k]`.
	ScaledConcat {
		target: ColumnId,
		sources: Vec<ColumnId>,
		coeffs: Vec<KoalaBearExt4>,
	},
	/// `target[j] = Σ_k x^k · source[k · chunk_len + j]`.
	FoldOuter {
		target: ColumnId,
		source: ColumnId,
		chunk_len: usize,
		x: KoalaBearExt4,
	},
	/// `target[j] = Σ_k x^k · source[j · chunk_len + k]`.
	Fold {
		target: ColumnId,
		source: ColumnId,
		chunk_len: usize,
		x: KoalaBearExt4,
	},
	/// The collapsed combined-row entries agree with the collapsed preimages:
	///
	/// $$
	/// \sum_i r^i U_\alpha Q_i = \mathrm{NonSis}(\alpha) + \alpha^{\mathrm{offset}} \sum_{k, l}
	/// \mathrm{Preimage}_{k \cdot n + l} \cdot \mathrm{base}^l \alpha^k
	/// $$
	CollapseIdentity {
		u_alpha_q: ColumnId,
		non_sis: Option<ColumnId>,
		preimage: Option<ColumnId>,
		r: KoalaBearExt4,
		alpha: KoalaBearExt4,
		sis_offset: usize,
		limb_base: KoalaBear,
		num_limbs: usize,
	},
	/// The CRT identity tying the folded key and preimage to the collapsed digests:
	/// `E(x)·(x^d + 1) − D(x)·(x^d − 1) = 2·⟨A, S⟩`.
	DualIdentity {
		a_fold: ColumnId,
		preimage_fold: ColumnId,
		e_dual: ColumnId,
		dhq_collapse: ColumnId,
		x: KoalaBearExt4,
		degree: usize,
	},
}

impl Constraint {
	pub fn check(&self, arena: &ColumnArena) -> Result<(), Error> {
		match self {
			Self::ReedSolomon {
				column,
				log_dimension,
				log_inv_rate,
			} => {
				let code = ReedSolomonCode::new(*log_dimension, *log_inv_rate)
					.map_err(|_| VerificationError::ProximityCheckFailed)?;
				let word = arena.ext(*column)?;
				match code.is_codeword(&word) {
					Ok(true) => Ok(()),
					_ => Err(VerificationError::ProximityCheckFailed.into()),
				}
			}
			Self::UnivariateEval {
				column,
				log_dimension,
				log_inv_rate,
				point,
				value,
			} => {
				let code = ReedSolomonCode::new(*log_dimension, *log_inv_rate)
					.map_err(|_| VerificationError::ProximityCheckFailed)?;
				let coeffs = code
					.interpolate(&arena.ext(*column)?)
					.map_err(|_| VerificationError::ProximityCheckFailed)?;
				ensure_holds(
					evaluate_univariate(&coeffs, *point) == *value,
					VerificationError::ProximityCheckFailed,
				)
			}
			Self::Inclusion {
				included,
				including,
				kind,
			} => check_inclusion(arena, included, including, *kind),
			Self::Range {
				column,
				log_bound,
				opened,
			} => {
				let bound = 1u64 << log_bound;
				match arena
					.base(*column)?
					.iter()
					.position(|limb| limb.as_canonical_u32() as u64 >= bound)
				{
					None => Ok(()),
					Some(index) => Err(VerificationError::ShortnessCheckFailed {
						column: *opened,
						index,
					}
					.into()),
				}
			}
			Self::MerkleCheck {
				proofs,
				roots,
				positions,
				leaves,
				depth,
				num_opened,
			} => {
				let proofs = arena.digests(*proofs)?;
				let roots = arena.digests(*roots)?;
				let positions = arena.base(*positions)?;
				let leaves = arena.digests(*leaves)?;
				ensure_holds(
					leaves.len() == roots.len()
						&& leaves.len() == positions.len()
						&& proofs.len() >= leaves.len() * depth,
					VerificationError::IncorrectProofShape,
				)?;

				for (k, ((leaf, root), position)) in leaves.iter().zip(roots).zip(positions).enumerate() {
					let mut siblings = proofs[k * depth..(k + 1) * depth].to_vec();
					siblings.reverse();
					verify_opening(compression(), root, *leaf, position.as_canonical_u32() as usize, &siblings)
						.map_err(|_| VerificationError::InclusionCheckFailed {
							round: k / num_opened,
							column: k % num_opened,
						})?;
				}
				Ok(())
			}
			Self::LinearHash {
				sources,
				leaves,
				round,
			} => {
				let leaves = arena.digests(*leaves)?;
				ensure_holds(leaves.len() == sources.len(), VerificationError::IncorrectProofShape)?;
				for (column, ((source, range), leaf)) in sources.iter().zip(leaves).enumerate() {
					let preimage = arena.base(*source)?;
					let matches = preimage
						.get(range.clone())
						.is_some_and(|slice| hash_column(slice) == *leaf);
					ensure_holds(
						matches,
						VerificationError::InclusionCheckFailed {
							round: *round,
							column,
						},
					)?;
				}
				Ok(())
			}
			Self::LinearCombination {
				target,
				sources,
				coeffs,
			} => {
				let target = arena.ext(*target)?;
				let mut expected = vec![KoalaBearExt4::ZERO; target.len()];
				for (source, coeff) in sources.iter().zip(coeffs) {
					let source = arena.ext(*source)?;
					ensure_holds(source.len() == target.len(), mismatch(None))?;
					for (acc, value) in expected.iter_mut().zip(source) {
						*acc += value * *coeff;
					}
				}
				ensure_holds(expected == target, mismatch(None))
			}
			Self::ScaledConcat {
				target,
				sources,
				coeffs,
			} => {
				let mut expected = Vec::new();
				for (source, coeff) in sources.iter().zip(coeffs) {
					expected.extend(arena.ext(*source)?.into_iter().map(|value| value * *coeff));
				}
				ensure_holds(expected == arena.ext(*target)?, mismatch(None))
			}
			Self::FoldOuter {
				target,
				source,
				chunk_len,
				x,
			} => {
				let source = arena.ext(*source)?;
				ensure_holds(*chunk_len > 0 && source.len() % chunk_len == 0, mismatch(None))?;
				let chunks = source.chunks_exact(*chunk_len).collect::<Vec<_>>();
				let expected = (0..*chunk_len)
					.map(|j| {
						let column = chunks.iter().map(|chunk| chunk[j]).collect::<Vec<_>>();
						evaluate_univariate(&column, *x)
					})
					.collect::<Vec<_>>();
				ensure_holds(expected == arena.ext(*target)?, mismatch(None))
			}
			Self::Fold {
				target,
				source,
				chunk_len,
				x,
			} => {
				let source = arena.ext(*source)?;
				ensure_holds(
					*chunk_len > 0 && source.len() % chunk_len == 0,
					VerificationError::LatticeDualIdentityFailed,
				)?;
				ensure_holds(
					fold(&source, *chunk_len, *x) == arena.ext(*target)?,
					VerificationError::LatticeDualIdentityFailed,
				)
			}
			Self::CollapseIdentity {
				u_alpha_q,
				non_sis,
				preimage,
				r,
				alpha,
				sis_offset,
				limb_base,
				num_limbs,
			} => {
				let lhs = evaluate_univariate(&arena.ext(*u_alpha_q)?, *r);

				let mut rhs = KoalaBearExt4::ZERO;
				if let Some(non_sis) = non_sis {
					rhs += evaluate_univariate(&arena.ext(*non_sis)?, *alpha);
				}
				if let Some(preimage) = preimage {
					let preimage = arena.ext(*preimage)?;
					rhs += alpha.exp_u64(*sis_offset as u64)
						* evaluate_bivariate(&preimage, *limb_base, *alpha, *num_limbs);
				}
				ensure_holds(lhs == rhs, mismatch(None))
			}
			Self::DualIdentity {
				a_fold,
				preimage_fold,
				e_dual,
				dhq_collapse,
				x,
				degree,
			} => {
				let a_fold = arena.ext(*a_fold)?;
				let preimage_fold = arena.ext(*preimage_fold)?;
				ensure_holds(
					a_fold.len() == preimage_fold.len(),
					VerificationError::LatticeDualIdentityFailed,
				)?;
				let y = a_fold
					.iter()
					.zip(&preimage_fold)
					.map(|(a, s)| *a * *s)
					.sum::<KoalaBearExt4>();

				let y_dual = evaluate_univariate(&arena.ext(*e_dual)?, *x);
				let y_actual = evaluate_univariate(&arena.ext(*dhq_collapse)?, *x);
				let x_d = x.exp_u64(*degree as u64);
				ensure_holds(
					y_dual * (x_d + KoalaBearExt4::ONE) - y_actual * (x_d - KoalaBearExt4::ONE)
						== y.double(),
					VerificationError::LatticeDualIdentityFailed,
				)
			}
		}
	}
}

const fn mismatch(column: Option<usize>) -> VerificationError {
	VerificationError::LinearCombinationMismatch { column }
}

fn ensure_holds(condition: bool, err: VerificationError) -> Result<(), Error> {
	if condition {
		Ok(())
	} else {
		Err(err.into())
	}
}

fn check_inclusion(
	arena: &ColumnArena,
	included: &[ColumnId],
	including: &[ColumnId],
	kind: LookupKind,
) -> Result<(), Error> {
	let failure = |index| match kind {
		LookupKind::Selection => VerificationError::SelectionLookupFailed { index },
		LookupKind::LeafConsistency { round } => VerificationError::InclusionCheckFailed {
			round,
			column: index,
		},
	};
	ensure_holds(
		!included.is_empty() && included.len() == including.len(),
		VerificationError::IncorrectProofShape,
	)?;

	let rows = |columns: &[ColumnId]| -> Result<Vec<Vec<KoalaBear>>, Error> {
		let columns = columns
			.iter()
			.map(|id| arena.get(*id).map(|entry| entry.data()))
			.collect::<Result<Vec<_>, _>>()?;
		let len = columns[0].len();
		ensure_holds(
			columns.iter().all(|column| column.len() == len),
			VerificationError::IncorrectProofShape,
		)?;
		Ok((0..len)
			.map(|i| columns.iter().flat_map(|column| column.entry_bases(i)).collect())
			.collect())
	};

	let table = rows(including)?.into_iter().collect::<HashSet<_>>();
	match rows(included)?.iter().position(|row| !table.contains(row)) {
		None => Ok(()),
		Some(index) => Err(failure(index).into()),
	}
}

/// `Fold(v, x, d)[j] = Σ_k v[j·d + k] · x^k`: each chunk of `d` entries read as a polynomial and
/// evaluated at `x`.
pub fn fold(values: &[KoalaBearExt4], chunk_len: usize, x: KoalaBearExt4) -> Vec<KoalaBearExt4> {
	values
		.chunks(chunk_len)
		.map(|chunk| evaluate_univariate(chunk, x))
		.collect()
}

/// `Σ_k y^k Σ_l v[k·n + l] · x^l` for chunks of `n = num_limbs` entries.
pub fn evaluate_bivariate(
	values: &[KoalaBearExt4],
	x: KoalaBear,
	y: KoalaBearExt4,
	num_limbs: usize,
) -> KoalaBearExt4 {
	let x = KoalaBearExt4::from(x);
	let inner = values
		.chunks(num_limbs)
		.map(|chunk| evaluate_univariate(chunk, x))
		.collect::<Vec<_>>();
	evaluate_univariate(&inner, y)
}
