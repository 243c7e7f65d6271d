// Copyright 2024 Irreducible Inc.

//! A minimal polynomial-IOP layer: an arena of named columns and the algebraic constraints
//! relating them.
//!
//! Self-recursion compiles an opening proof into columns of this arena plus constraints over
//! them. [`Constraint::check`] evaluates a constraint directly on the column data, which is what
//! an outer proof layer would prove.

mod arena;
mod constraint;
mod error;

pub use arena::*;
pub use constraint::*;
pub use error::*;

/// Number of self-recursion passes a context is away from the original commitment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecursionDepth(usize);

impl RecursionDepth {
	pub const ROOT: Self = Self(0);

	pub const fn new(depth: usize) -> Self {
		Self(depth)
	}

	pub const fn value(self) -> usize {
		self.0
	}

	#[must_use]
	pub const fn next(self) -> Self {
		Self(self.0 + 1)
	}
}
