// Copyright 2024 Irreducible Inc.

//! Field aliases and polynomial helpers shared by the Vortex crates.
//!
//! Arithmetic comes from Plonky3: the base field is [`KoalaBear`], $p = 2^{31} - 2^{24} + 1$,
//! whose multiplicative group has a subgroup of order $2^{24}$. Challenges live in the binomial
//! extension $\mathbb{F}_p[X]/(X^4 - 3)$.

pub mod dft;
pub mod univariate;

use p3_field::extension::BinomialExtensionField;
pub use p3_koala_bear::KoalaBear;
pub use univariate::*;

/// The degree-4 challenge field.
pub type KoalaBearExt4 = BinomialExtensionField<KoalaBear, 4>;

/// Number of bits of a canonical [`KoalaBear`] element.
pub const KOALA_BEAR_BITS: usize = 31;
