// Copyright 2024 Irreducible Inc.

use crate::{iop, vortex};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("vortex error: {0}")]
	Vortex(vortex::Error),
	#[error("column arena error: {0}")]
	Iop(iop::Error),
	#[error("ring-SIS error: {0}")]
	RingSis(#[from] vortex_hash::ring_sis::Error),
	#[error("verification failure: {0}")]
	Verification(#[from] vortex::VerificationError),
	#[error("row length {row_len} is not a power of two")]
	RowLengthNotPowerOfTwo { row_len: usize },
}

impl From<vortex::Error> for Error {
	fn from(err: vortex::Error) -> Self {
		match err {
			vortex::Error::Verification(err) => Self::Verification(err),
			err => Self::Vortex(err),
		}
	}
}

impl From<iop::Error> for Error {
	fn from(err: iop::Error) -> Self {
		match err {
			iop::Error::Verification(err) => Self::Verification(err),
			err => Self::Iop(err),
		}
	}
}
