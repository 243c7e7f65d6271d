// Copyright 2024 Irreducible Inc.

use crate::vortex::VerificationError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("column {id} is not registered")]
	UnknownColumn { id: usize },
	#[error("column {name} does not hold {expected} values")]
	ColumnKindMismatch { name: String, expected: &'static str },
	#[error("column {name} has {actual} entries, expected {expected}")]
	ColumnSizeMismatch {
		name: String,
		expected: usize,
		actual: usize,
	},
	#[error("verification failure: {0}")]
	Verification(#[from] VerificationError),
}
