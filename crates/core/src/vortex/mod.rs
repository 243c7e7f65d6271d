// Copyright 2024 Irreducible Inc.

//! The Vortex polynomial commitment.
//!
//! Rows of field elements are committed round by round: every row is Reed–Solomon encoded, every
//! encoded column is digested, and the digests become the leaves of one Merkle tree per round.
//! Columns of large rounds are digested with a ring-SIS hash before the sponge; this keeps the
//! opening amenable to [self-recursion](crate::self_recursion).

mod commit;
mod config;
mod context;
mod digest;
mod error;
mod open;
mod proof;
mod transcript;
mod verify;

pub use commit::*;
pub use config::*;
pub use context::*;
pub use digest::*;
pub use error::*;
pub use open::*;
pub use proof::*;
pub(crate) use transcript::*;
pub use verify::verify;
pub(crate) use verify::{check_proof_shape, stacked_claims};
