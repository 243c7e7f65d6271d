// Copyright 2024 Irreducible Inc.

use getset::CopyGetters;
use vortex_math::KoalaBearExt4;

use crate::iop::{ColumnId, RecursionDepth};

/// Column handles and challenges of one self-recursion pass.
#[derive(Debug, Clone, CopyGetters)]
pub struct SelfRecursionContext {
	/// One more than the depth of the context that was recursed on.
	#[get_copy = "pub"]
	depth: RecursionDepth,
	pub precomputed: PrecomputedColumns,
	pub combined_row: ColumnId,
	pub opening: OpeningColumns,
	pub collapse: CollapseColumns,
	/// Present when at least one round is lattice hashed.
	pub fold: Option<FoldColumns>,
	pub challenges: Challenges,
}

impl SelfRecursionContext {
	pub(super) const fn new(
		depth: RecursionDepth,
		precomputed: PrecomputedColumns,
		combined_row: ColumnId,
		opening: OpeningColumns,
		collapse: CollapseColumns,
		fold: Option<FoldColumns>,
		challenges: Challenges,
	) -> Self {
		Self {
			depth,
			precomputed,
			combined_row,
			opening,
			collapse,
			fold,
			challenges,
		}
	}
}

#[derive(Debug, Clone)]
pub struct PrecomputedColumns {
	/// `I = (0, 1, …, N - 1)` over the codeword positions.
	pub identity: ColumnId,
	/// Flattened key shard of every lattice-hashed round, in stacking order.
	pub keys: Vec<ColumnId>,
}

#[derive(Debug, Clone)]
pub struct OpeningColumns {
	/// The sampled positions `Q`.
	pub selected: ColumnId,
	/// `UalphaQ[i] = Σ α^row · opened_i[row]`.
	pub u_alpha_q: ColumnId,
	/// Limb expansion of the lattice part of every opened column.
	pub limbs: Vec<ColumnId>,
	/// Sponge-hashed part of every opened column, kept whole.
	pub non_sis: Vec<ColumnId>,
	/// Lattice digests, lattice round major, `d` entries per opened column.
	pub concatenated_dhq: Option<ColumnId>,
	/// Leaves re-derived from the preimages, one column per stacked round.
	pub leaves: Vec<ColumnId>,
	pub merkle: MerkleColumns,
}

#[derive(Debug, Clone, Copy)]
pub struct MerkleColumns {
	pub leaves: ColumnId,
	pub positions: ColumnId,
	pub roots: ColumnId,
	/// All siblings, packed root side first and zero-padded.
	pub proofs: ColumnId,
}

#[derive(Debug, Clone)]
pub struct CollapseColumns {
	pub non_sis_collapse: Option<ColumnId>,
	pub preimage_collapse: Option<ColumnId>,
	pub lattice: Option<LatticeCollapseColumns>,
}

#[derive(Debug, Clone, Copy)]
pub struct LatticeCollapseColumns {
	pub dhq_collapse: ColumnId,
	pub a_collapse: ColumnId,
	pub e_dual: ColumnId,
}

#[derive(Debug, Clone, Copy)]
pub struct FoldColumns {
	pub a_collapse_fold: ColumnId,
	pub preimage_collapse_fold: ColumnId,
}

#[derive(Debug, Clone)]
pub struct Challenges {
	pub alpha: KoalaBearExt4,
	pub columns: Vec<usize>,
	pub r_collapse: KoalaBearExt4,
	pub r_fold: Option<KoalaBearExt4>,
}
