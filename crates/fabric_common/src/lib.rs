//! Shared foundational types used across the fabric place-and-route backend.
//!
//! This crate provides interned identifiers (the global name table every
//! device-database string is keyed by), content hashing for database
//! integrity checks, and the internal error type used for structural
//! invariant violations.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{FabricResult, InternalError};
