// Copyright 2024 Irreducible Inc.

use p3_field::PrimeCharacteristicRing;
use vortex_math::KoalaBear;
use vortex_utils::{checked_arithmetics::next_pow2, ensure};

use super::{context::SelfRecursionContext, error::Error};
use crate::iop::{ColumnArena, ColumnStatus, Constraint};

/// The result of a self-recursion pass: the columns, the constraints over them and the handles.
#[derive(Debug, Clone)]
pub struct SelfRecursionOutput {
	pub columns: ColumnArena,
	/// In registration order, which is the order they are checked in.
	pub constraints: Vec<Constraint>,
	pub context: SelfRecursionContext,
}

impl SelfRecursionOutput {
	/// Checks every constraint on the column values, returning the first failure.
	#[tracing::instrument(skip_all, name = "SelfRecursionOutput::check", level = "debug", fields(constraints = self.constraints.len()))]
	pub fn check(&self) -> Result<(), Error> {
		for constraint in &self.constraints {
			constraint.check(&self.columns)?;
		}
		Ok(())
	}

	/// Rows of `row_len` field elements holding every proof column, for the next Vortex layer.
	///
	/// Each column is flattened to base field elements and zero-padded to the next power of two,
	/// and at least to one row, before being cut into rows. `row_len` must be a power of two.
	pub fn committed_rows(&self, row_len: usize) -> Result<Vec<Vec<KoalaBear>>, Error> {
		ensure!(row_len.is_power_of_two(), Error::RowLengthNotPowerOfTwo { row_len });

		let rows = self
			.columns
			.iter()
			.filter(|(_, entry)| entry.status() == ColumnStatus::Proof && entry.size() > 0)
			.flat_map(|(_, entry)| {
				let mut values = entry.data().to_bases();
				values.resize(next_pow2(values.len()).max(row_len), KoalaBear::ZERO);
				values
					.chunks_exact(row_len)
					.map(<[KoalaBear]>::to_vec)
					.collect::<Vec<_>>()
			})
			.collect();
		Ok(rows)
	}
}
