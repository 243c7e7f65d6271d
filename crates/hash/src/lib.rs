// Copyright 2024 Irreducible Inc.

//! Hash functions over the KoalaBear field used by the Vortex commitment scheme.
//!
//! * [`SpongeHasher`], a padding-free sponge over the width-16 KoalaBear Poseidon2 permutation,
//!   producing [`Octuplet`] digests,
//! * [`SpongeCompression`], the truncated-permutation compression used by Merkle trees,
//! * [`ring_sis`], the ring-SIS lattice hash used to digest large columns.

pub mod expand;
pub mod poseidon2;
pub mod ring_sis;

pub use p3_symmetric::{CryptographicHasher, Permutation, PseudoCompressionFunction};
pub use poseidon2::*;

use vortex_math::KoalaBear;

/// Number of field elements in a digest.
pub const DIGEST_SIZE: usize = 8;

/// The uniform digest shape: eight KoalaBear elements.
pub type Octuplet = [KoalaBear; DIGEST_SIZE];
