// Copyright 2024 Irreducible Inc.

mod error;
#[allow(clippy::module_inception)]
mod merkle_tree;

pub use error::*;
pub use merkle_tree::*;
