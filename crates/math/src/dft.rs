// Copyright 2024 Irreducible Inc.

//! Transforms over the multiplicative subgroups of [`KoalaBear`], in natural order.
//!
//! Extension-valued vectors are transformed coordinatewise: each element becomes a row of its
//! basis coefficients and the columns go through [`Radix2DitParallel`] as one batch.

use p3_dft::{Radix2DitParallel, TwoAdicSubgroupDft};
use p3_field::{BasedVectorSpace, ExtensionField, PrimeCharacteristicRing};
use p3_matrix::{dense::RowMajorMatrix, Matrix};

use crate::KoalaBear;

fn to_coordinate_matrix<FE: ExtensionField<KoalaBear>>(values: &[FE]) -> RowMajorMatrix<KoalaBear> {
	let coords = values
		.iter()
		.flat_map(|value| value.as_basis_coefficients_slice().iter().copied())
		.collect();
	RowMajorMatrix::new(coords, <FE as BasedVectorSpace<KoalaBear>>::DIMENSION)
}

fn from_coordinate_matrix<FE: ExtensionField<KoalaBear>>(mat: RowMajorMatrix<KoalaBear>) -> Vec<FE> {
	mat.values
		.chunks_exact(<FE as BasedVectorSpace<KoalaBear>>::DIMENSION)
		.map(|coords| FE::from_basis_coefficients_fn(|i| coords[i]))
		.collect()
}

/// Evaluates the polynomial with coefficients `coeffs` on the subgroup of order `coeffs.len()`.
///
/// ## Preconditions
///
/// * `coeffs.len()` must be a power of two no larger than `2^24`
pub fn evaluate_on_subgroup<FE: ExtensionField<KoalaBear>>(coeffs: Vec<FE>) -> Vec<FE> {
	debug_assert!(coeffs.len().is_power_of_two());
	let evals = Radix2DitParallel::default().dft_batch(to_coordinate_matrix(&coeffs));
	from_coordinate_matrix(evals.to_row_major_matrix())
}

/// Inverse of [`evaluate_on_subgroup`].
pub fn interpolate_subgroup<FE: ExtensionField<KoalaBear>>(evals: Vec<FE>) -> Vec<FE> {
	debug_assert!(evals.len().is_power_of_two());
	from_coordinate_matrix(Radix2DitParallel::default().idft_batch(to_coordinate_matrix(&evals)))
}

/// Reed–Solomon extends every column of `mat` from the subgroup of order `mat.height()` to the
/// one of order `mat.height() << added_bits`.
#[tracing::instrument(skip_all, level = "debug", fields(height = mat.height(), width = mat.width()))]
pub fn extend_columns(mat: RowMajorMatrix<KoalaBear>, added_bits: usize) -> RowMajorMatrix<KoalaBear> {
	let dft = Radix2DitParallel::default();
	let width = mat.width();
	let mut coeffs = dft.idft_batch(mat);
	let extended_len = coeffs.values.len() << added_bits;
	coeffs.values.resize(extended_len, KoalaBear::ZERO);
	dft.dft_batch(RowMajorMatrix::new(coeffs.values, width))
		.to_row_major_matrix()
}
