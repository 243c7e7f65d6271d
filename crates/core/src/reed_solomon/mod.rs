// Copyright 2024 Irreducible Inc.

mod error;
#[allow(clippy::module_inception)]
pub mod reed_solomon;

pub use error::*;
pub use reed_solomon::*;
