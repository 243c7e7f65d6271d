// Copyright 2024 Irreducible Inc.

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("a Merkle tree needs a power-of-two number of leaves, got {len}")]
	IncorrectLeavesLen { len: usize },
	#[error("leaf index is not below the tree width {max}")]
	IndexOutOfRange { max: usize },
	#[error("verification failure: {0}")]
	Verification(#[from] VerificationError),
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
	#[error("the authentication path does not lead to the committed root")]
	MerkleRootMismatch,
}
