// Copyright 2024 Irreducible Inc.

use p3_field::PrimeCharacteristicRing;
use vortex_math::{KoalaBear, KoalaBearExt4};

use super::{
	compiler::{Compiler, COLLAPSE_ROUND, FOLD_ROUND},
	context::{CollapseColumns, FoldColumns, LatticeCollapseColumns, OpeningColumns, PrecomputedColumns},
	error::Error,
};
use crate::iop::{fold, ColumnData, ColumnId, ColumnStatus, Constraint};

impl Compiler<'_> {
	/// Collapses the opened columns with the powers of `r`.
	///
	/// The collapsed preimages are tied to `UalphaQ` by a single evaluation identity; for the
	/// lattice rounds the collapsed digests, keys and their cyclic counterpart are registered for
	/// the fold.
	#[tracing::instrument(skip_all, name = "self_recursion::collapse", level = "debug")]
	pub fn collapse(
		&mut self,
		precomputed: &PrecomputedColumns,
		opening: &OpeningColumns,
		r: KoalaBearExt4,
	) -> Result<CollapseColumns, Error> {
		let num_opened = self.proof.columns.len();
		let coeffs = r.powers().take(num_opened).collect::<Vec<_>>();

		let non_sis_collapse =
			self.linear_combination("NonSisCollapse", &opening.non_sis, &coeffs)?;
		let preimage_collapse = self.linear_combination("PreimageCollapse", &opening.limbs, &coeffs)?;

		let sis = self.ctx.config().sis();
		self.constraints.push(Constraint::CollapseIdentity {
			u_alpha_q: opening.u_alpha_q,
			non_sis: non_sis_collapse,
			preimage: preimage_collapse,
			r,
			alpha: self.alpha,
			sis_offset: self.ctx.sis_offset(),
			limb_base: KoalaBear::from_u64(1 << sis.log_two_bound()),
			num_limbs: sis.num_limbs(),
		});

		let lattice = match (opening.concatenated_dhq, preimage_collapse) {
			(Some(dhq), Some(preimage)) => {
				Some(self.collapse_lattice(precomputed, dhq, preimage, r, num_opened)?)
			}
			_ => None,
		};

		Ok(CollapseColumns {
			non_sis_collapse,
			preimage_collapse,
			lattice,
		})
	}

	/// Registers `Σ_k coeffs[k] · sources[k]` as a derived column, absent when there are no
	/// sources.
	fn linear_combination(
		&mut self,
		name: &str,
		sources: &[ColumnId],
		coeffs: &[KoalaBearExt4],
	) -> Result<Option<ColumnId>, Error> {
		let Some(&first) = sources.first() else {
			return Ok(None);
		};

		let mut values = vec![KoalaBearExt4::ZERO; self.columns.get(first)?.size()];
		for (&source, coeff) in sources.iter().zip(coeffs) {
			for (acc, value) in values.iter_mut().zip(self.columns.ext(source)?) {
				*acc += value * *coeff;
			}
		}

		let target = self.insert(name, COLLAPSE_ROUND, ColumnStatus::Derived, ColumnData::Ext(values));
		self.constraints.push(Constraint::LinearCombination {
			target,
			sources: sources.to_vec(),
			coeffs: coeffs[..sources.len()].to_vec(),
		});
		Ok(Some(target))
	}

	fn collapse_lattice(
		&mut self,
		precomputed: &PrecomputedColumns,
		concatenated_dhq: ColumnId,
		preimage_collapse: ColumnId,
		r: KoalaBearExt4,
		num_opened: usize,
	) -> Result<LatticeCollapseColumns, Error> {
		let degree = self.ctx.config().sis().degree();
		let round_coeffs = r
			.exp_u64(num_opened as u64)
			.powers()
			.take(self.lattice.len())
			.collect::<Vec<_>>();

		// DhQCollapse[j] = Σ_k r^k · DhQ[k·d + j], with k = h·t + i.
		let dhq = self.columns.ext(concatenated_dhq)?;
		let mut dhq_collapse = vec![KoalaBearExt4::ZERO; degree];
		for (chunk, coeff) in dhq.chunks_exact(degree).zip(r.powers()) {
			for (acc, value) in dhq_collapse.iter_mut().zip(chunk) {
				*acc += *value * coeff;
			}
		}
		let dhq_collapse =
			self.insert("DhQCollapse", COLLAPSE_ROUND, ColumnStatus::Derived, ColumnData::Ext(dhq_collapse));
		self.constraints.push(Constraint::FoldOuter {
			target: dhq_collapse,
			source: concatenated_dhq,
			chunk_len: degree,
			x: r,
		});

		let mut a_collapse = Vec::new();
		for (&key, coeff) in precomputed.keys.iter().zip(&round_coeffs) {
			a_collapse.extend(self.columns.ext(key)?.into_iter().map(|value| value * *coeff));
		}
		let a_collapse =
			self.insert("ACollapse", COLLAPSE_ROUND, ColumnStatus::Derived, ColumnData::Ext(a_collapse));
		self.constraints.push(Constraint::ScaledConcat {
			target: a_collapse,
			sources: precomputed.keys.clone(),
			coeffs: round_coeffs.clone(),
		});

		// Edual = Σ_h r^{t·h} · (A_h · PreimageCollapse_h mod X^d - 1).
		let preimage = self.columns.ext(preimage_collapse)?;
		let mut e_dual = vec![KoalaBearExt4::ZERO; degree];
		for (round, coeff) in self.lattice.iter().zip(&round_coeffs) {
			let cyclic = round
				.shard
				.hash_limbs_mod_xn_minus_1(&preimage[round.limbs.clone()])?;
			for (acc, value) in e_dual.iter_mut().zip(cyclic) {
				*acc += value * *coeff;
			}
		}
		let e_dual = self.insert("Edual", COLLAPSE_ROUND, ColumnStatus::Proof, ColumnData::Ext(e_dual));

		Ok(LatticeCollapseColumns {
			dhq_collapse,
			a_collapse,
			e_dual,
		})
	}

	/// Folds the collapsed key and preimage polynomial by polynomial at `x` and registers the
	/// CRT identity linking them to the negacyclic and cyclic collapsed digests.
	#[tracing::instrument(skip_all, name = "self_recursion::fold", level = "debug")]
	pub fn fold(
		&mut self,
		preimage_collapse: ColumnId,
		lattice: &LatticeCollapseColumns,
		x: KoalaBearExt4,
	) -> Result<FoldColumns, Error> {
		let degree = self.ctx.config().sis().degree();

		let a_collapse_fold = self.fold_column("ACollapseFold", lattice.a_collapse, degree, x)?;
		let preimage_collapse_fold =
			self.fold_column("PreimageCollapseFold", preimage_collapse, degree, x)?;
		self.constraints.push(Constraint::DualIdentity {
			a_fold: a_collapse_fold,
			preimage_fold: preimage_collapse_fold,
			e_dual: lattice.e_dual,
			dhq_collapse: lattice.dhq_collapse,
			x,
			degree,
		});

		Ok(FoldColumns {
			a_collapse_fold,
			preimage_collapse_fold,
		})
	}

	fn fold_column(
		&mut self,
		name: &str,
		source: ColumnId,
		chunk_len: usize,
		x: KoalaBearExt4,
	) -> Result<ColumnId, Error> {
		let folded = fold(&self.columns.ext(source)?, chunk_len, x);
		let target = self.insert(name, FOLD_ROUND, ColumnStatus::Derived, ColumnData::Ext(folded));
		self.constraints.push(Constraint::Fold {
			target,
			source,
			chunk_len,
			x,
		});
		Ok(target)
	}
}
