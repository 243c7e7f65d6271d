// Copyright 2024 Irreducible Inc.

//! The row code used by the commitment.

use auto_impl::auto_impl;
use p3_field::ExtensionField;
use vortex_math::KoalaBear;

/// A KoalaBear-linear code mapping `dim()` message symbols to `len()` codeword symbols.
///
/// Both the dimension and the blow-up `inv_rate()` are powers of two.
#[allow(clippy::len_without_is_empty)]
#[auto_impl(&)]
pub trait LinearCode {
	type EncodeError: std::error::Error + Send + Sync + 'static;

	fn dim_bits(&self) -> usize;

	fn dim(&self) -> usize {
		1 << self.dim_bits()
	}

	fn inv_rate(&self) -> usize;

	fn len(&self) -> usize {
		self.inv_rate() << self.dim_bits()
	}

	/// Encodes `msg`; symbols may live in any extension, which the code acts on coordinatewise.
	fn encode<FE: ExtensionField<KoalaBear>>(&self, msg: &[FE]) -> Result<Vec<FE>, Self::EncodeError>;

	/// Whether `word`, of length `len()`, lies in the code.
	fn is_codeword<FE: ExtensionField<KoalaBear>>(&self, word: &[FE]) -> Result<bool, Self::EncodeError>;
}
