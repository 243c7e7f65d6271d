// Copyright 2024 Irreducible Inc.

//! The Vortex polynomial commitment scheme and its self-recursion compiler.
//!
//! [`vortex`] commits to rows of [`KoalaBear`](vortex_math::KoalaBear) elements and opens them
//! at a point of the degree-4 extension. [`self_recursion`] turns the verification of an opening
//! into a fresh set of committed columns and constraints, so that the next layer only has to
//! prove those.

pub mod challenger;
pub mod iop;
pub mod linear_code;
pub mod merkle_tree;
pub mod reed_solomon;
pub mod self_recursion;
pub mod vortex;
