// Copyright 2024 Irreducible Inc.

//! [Reed–Solomon] codes over the KoalaBear field.
//!
//! See [`ReedSolomonCode`] for details.
//!
//! [Reed–Solomon]: <https://en.wikipedia.org/wiki/Reed%E2%80%93Solomon_error_correction>

use getset::CopyGetters;
use p3_field::{ExtensionField, TwoAdicField};
use p3_matrix::dense::RowMajorMatrix;
use vortex_math::{
	dft::{evaluate_on_subgroup, extend_columns, interpolate_subgroup},
	evaluate_univariate, KoalaBear,
};
use vortex_utils::ensure;

use super::error::Error;
use crate::linear_code::LinearCode;

/// Systematic [Reed–Solomon] code over multiplicative subgroups of KoalaBear.
///
/// A message of `2^log_dimension` symbols is read as the evaluations of a polynomial of degree
/// below the dimension on the subgroup of that order. The codeword is the evaluation of the same
/// polynomial on the subgroup of order `2^(log_dimension + log_inv_rate)`. Since the smaller
/// subgroup is contained in the larger one, position `k * inv_rate()` of the codeword is symbol
/// `k` of the message.
///
/// [Reed–Solomon]: <https://en.wikipedia.org/wiki/Reed%E2%80%93Solomon_error_correction>
#[derive(Debug, Clone, Copy, CopyGetters)]
pub struct ReedSolomonCode {
	#[get_copy = "pub"]
	log_dimension: usize,
	#[get_copy = "pub"]
	log_inv_rate: usize,
}

impl ReedSolomonCode {
	pub fn new(log_dimension: usize, log_inv_rate: usize) -> Result<Self, Error> {
		let log_len = log_dimension + log_inv_rate;
		ensure!(log_len <= KoalaBear::TWO_ADICITY, Error::DomainTooLarge { log_len });
		Ok(Self {
			log_dimension,
			log_inv_rate,
		})
	}

	pub const fn log_len(&self) -> usize {
		self.log_dimension + self.log_inv_rate
	}

	fn check_len(expected: usize, actual: usize) -> Result<(), Error> {
		ensure!(expected == actual, Error::IncorrectBufferLength { expected, actual });
		Ok(())
	}

	/// Encodes `msg` into the provided codeword buffer.
	pub fn encode_into<FE: ExtensionField<KoalaBear>>(
		&self,
		msg: &[FE],
		code: &mut [FE],
	) -> Result<(), Error> {
		Self::check_len(self.dim(), msg.len())?;
		Self::check_len(self.len(), code.len())?;

		let mut coeffs = interpolate_subgroup(msg.to_vec());
		coeffs.resize(self.len(), FE::ZERO);
		code.copy_from_slice(&evaluate_on_subgroup(coeffs));
		Ok(())
	}

	/// Encodes every row of a batch, returning the matrix of codewords.
	///
	/// The rows are transposed into the columns of a single matrix so that one batched transform
	/// encodes all of them.
	#[tracing::instrument("ReedSolomonCode::encode_batch", skip_all, level = "debug", fields(rows = rows.len()))]
	pub fn encode_batch<Row>(&self, rows: &[Row]) -> Result<RowMajorMatrix<KoalaBear>, Error>
	where
		Row: AsRef<[KoalaBear]> + Sync,
	{
		let dim = self.dim();
		for row in rows {
			Self::check_len(dim, row.as_ref().len())?;
		}
		if rows.is_empty() {
			return Ok(RowMajorMatrix::new(Vec::new(), self.len()));
		}

		let messages = RowMajorMatrix::new(
			(0..dim)
				.flat_map(|k| rows.iter().map(move |row| row.as_ref()[k]))
				.collect(),
			rows.len(),
		);
		Ok(extend_columns(messages, self.log_inv_rate).transpose())
	}

	/// Returns the monomial coefficients of the polynomial a codeword evaluates.
	///
	/// Only the first `dim()` coefficients are returned; they determine the polynomial when the
	/// word is a codeword.
	pub fn interpolate<FE: ExtensionField<KoalaBear>>(&self, word: &[FE]) -> Result<Vec<FE>, Error> {
		Self::check_len(self.len(), word.len())?;
		let mut coeffs = interpolate_subgroup(word.to_vec());
		coeffs.truncate(self.dim());
		Ok(coeffs)
	}

	/// Evaluates the polynomial whose evaluations on the message domain are `msg` at `point`.
	pub fn evaluate_message<F, FE>(&self, msg: &[F], point: FE) -> Result<FE, Error>
	where
		F: ExtensionField<KoalaBear>,
		FE: ExtensionField<F>,
	{
		Self::check_len(self.dim(), msg.len())?;
		let coeffs = interpolate_subgroup(msg.to_vec());
		Ok(evaluate_univariate(&coeffs, point))
	}
}

impl LinearCode for ReedSolomonCode {
	type EncodeError = Error;

	fn dim_bits(&self) -> usize {
		self.log_dimension
	}

	fn inv_rate(&self) -> usize {
		1 << self.log_inv_rate
	}

	fn encode<FE: ExtensionField<KoalaBear>>(&self, msg: &[FE]) -> Result<Vec<FE>, Error> {
		let mut code = vec![FE::ZERO; self.len()];
		self.encode_into(msg, &mut code)?;
		Ok(code)
	}

	fn is_codeword<FE: ExtensionField<KoalaBear>>(&self, word: &[FE]) -> Result<bool, Error> {
		Self::check_len(self.len(), word.len())?;
		let coeffs = interpolate_subgroup(word.to_vec());
		Ok(coeffs[self.dim()..].iter().all(|coeff| coeff.is_zero()))
	}
}
