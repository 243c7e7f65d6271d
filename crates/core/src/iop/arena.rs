// Copyright 2024 Irreducible Inc.

use getset::{CopyGetters, Getters};
use p3_field::BasedVectorSpace;
use vortex_hash::Octuplet;
use vortex_math::{KoalaBear, KoalaBearExt4};

use super::error::Error;

/// Handle of a column registered in a [`ColumnArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(usize);

impl ColumnId {
	pub const fn index(self) -> usize {
		self.0
	}
}

/// Who provides the values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStatus {
	/// Known at setup time.
	Precomputed,
	/// Sent by the prover; committed by the next recursion layer.
	Proof,
	/// Computed by the verifier from its own randomness and public values.
	VerifierDefined,
	/// A linear image of other columns that the verifier can recompute.
	Derived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnData {
	Base(Vec<KoalaBear>),
	Ext(Vec<KoalaBearExt4>),
	Digests(Vec<Octuplet>),
}

impl ColumnData {
	#[allow(clippy::len_without_is_empty)]
	pub fn len(&self) -> usize {
		match self {
			Self::Base(values) => values.len(),
			Self::Ext(values) => values.len(),
			Self::Digests(values) => values.len(),
		}
	}

	/// Base field coordinates of entry `index`.
	pub(crate) fn entry_bases(&self, index: usize) -> Vec<KoalaBear> {
		match self {
			Self::Base(values) => vec![values[index]],
			Self::Ext(values) => values[index].as_basis_coefficients_slice().to_vec(),
			Self::Digests(values) => values[index].to_vec(),
		}
	}

	/// All base field coordinates, entry by entry.
	pub fn to_bases(&self) -> Vec<KoalaBear> {
		match self {
			Self::Base(values) => values.clone(),
			Self::Ext(values) => values
				.iter()
				.flat_map(|value| value.as_basis_coefficients_slice().iter().copied())
				.collect(),
			Self::Digests(values) => values.iter().flatten().copied().collect(),
		}
	}
}

#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct ColumnEntry {
	#[get = "pub"]
	name: String,
	/// Round of the recursion layer the column belongs to.
	#[get_copy = "pub"]
	round: usize,
	#[get_copy = "pub"]
	status: ColumnStatus,
	#[get = "pub"]
	data: ColumnData,
}

impl ColumnEntry {
	pub fn size(&self) -> usize {
		self.data.len()
	}
}

/// Owner of every column of a recursion layer; other structures refer to columns by [`ColumnId`].
#[derive(Debug, Default, Clone)]
pub struct ColumnArena {
	entries: Vec<ColumnEntry>,
}

impl ColumnArena {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(
		&mut self,
		name: impl Into<String>,
		round: usize,
		status: ColumnStatus,
		data: ColumnData,
	) -> ColumnId {
		let id = ColumnId(self.entries.len());
		self.entries.push(ColumnEntry {
			name: name.into(),
			round,
			status,
			data,
		});
		id
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, id: ColumnId) -> Result<&ColumnEntry, Error> {
		self.entries
			.get(id.0)
			.ok_or(Error::UnknownColumn { id: id.0 })
	}

	pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &ColumnEntry)> {
		self.entries
			.iter()
			.enumerate()
			.map(|(index, entry)| (ColumnId(index), entry))
	}

	pub fn base(&self, id: ColumnId) -> Result<&[KoalaBear], Error> {
		let entry = self.get(id)?;
		match &entry.data {
			ColumnData::Base(values) => Ok(values),
			_ => Err(Error::ColumnKindMismatch {
				name: entry.name.clone(),
				expected: "base field",
			}),
		}
	}

	pub fn digests(&self, id: ColumnId) -> Result<&[Octuplet], Error> {
		let entry = self.get(id)?;
		match &entry.data {
			ColumnData::Digests(values) => Ok(values),
			_ => Err(Error::ColumnKindMismatch {
				name: entry.name.clone(),
				expected: "digest",
			}),
		}
	}

	/// Values of a field column, lifted to the extension when they are base field elements.
	pub fn ext(&self, id: ColumnId) -> Result<Vec<KoalaBearExt4>, Error> {
		let entry = self.get(id)?;
		match &entry.data {
			ColumnData::Base(values) => Ok(values.iter().copied().map(Into::into).collect()),
			ColumnData::Ext(values) => Ok(values.clone()),
			ColumnData::Digests(_) => Err(Error::ColumnKindMismatch {
				name: entry.name.clone(),
				expected: "field",
			}),
		}
	}

	/// Overwrites the values of column `id`, keeping its size. Returns the previous values.
	pub fn assign(&mut self, id: ColumnId, data: ColumnData) -> Result<ColumnData, Error> {
		self.expect_size(id, data.len())?;
		let entry = &mut self.entries[id.0];
		Ok(std::mem::replace(&mut entry.data, data))
	}

	/// Fails unless column `id` has exactly `expected` entries.
	pub fn expect_size(&self, id: ColumnId, expected: usize) -> Result<(), Error> {
		let entry = self.get(id)?;
		if entry.size() != expected {
			return Err(Error::ColumnSizeMismatch {
				name: entry.name.clone(),
				expected,
				actual: entry.size(),
			});
		}
		Ok(())
	}
}
