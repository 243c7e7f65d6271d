// Copyright 2024 Irreducible Inc.

use crate::{merkle_tree, reed_solomon};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("row {row} has {actual} symbols, expected {expected}")]
	EncodingSizeMismatch {
		row: usize,
		expected: usize,
		actual: usize,
	},
	#[error("invalid configuration: {0}")]
	Configuration(&'static str),
	#[error("round {round} is not registered, there are {num_rounds} rounds")]
	UnknownRound { round: usize, num_rounds: usize },
	#[error("round {round} was registered with {expected} rows, got {actual}")]
	NumRowsMismatch {
		round: usize,
		expected: usize,
		actual: usize,
	},
	#[error("expected {expected} committed rounds, got {actual}")]
	NumRoundsMismatch { expected: usize, actual: usize },
	#[error("Merkle tree error: {0}")]
	MerkleTree(#[from] merkle_tree::Error),
	#[error("Reed-Solomon error: {0}")]
	ReedSolomon(#[from] reed_solomon::Error),
	#[error("ring-SIS error: {0}")]
	RingSis(#[from] vortex_hash::ring_sis::Error),
	#[error("verification failure: {0}")]
	Verification(#[from] VerificationError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
	#[error("the proof does not have the expected shape")]
	IncorrectProofShape,
	#[error("the combined row is not a codeword or does not evaluate to the claimed value")]
	ProximityCheckFailed,
	#[error("opened column {column} of round {round} is not included in the commitment")]
	InclusionCheckFailed { round: usize, column: usize },
	/// `column` is the opened column at fault, when the failing check involves a single one.
	#[error("linear combination mismatch at opened column {column:?}")]
	LinearCombinationMismatch { column: Option<usize> },
	#[error("the opened column at selection {index} is not an entry of the combined row")]
	SelectionLookupFailed { index: usize },
	#[error("the folded lattice hash identity does not hold")]
	LatticeDualIdentityFailed,
	#[error("limb {index} of column {column} exceeds the limb bound")]
	ShortnessCheckFailed { column: usize, index: usize },
}
