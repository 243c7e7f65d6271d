// Copyright 2024 Irreducible Inc.

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("incorrect buffer length: expected {expected}, got {actual}")]
	IncorrectBufferLength { expected: usize, actual: usize },
	#[error("codeword domain of size 2^{log_len} exceeds the two-adicity of the field")]
	DomainTooLarge { log_len: usize },
}
