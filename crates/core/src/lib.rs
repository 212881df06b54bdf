//! `larder-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model and the non-negative `Quantity` type
//! every stock field is expressed in.

pub mod error;
pub mod id;
pub mod quantity;

pub use error::{DomainError, DomainResult};
pub use id::{BarcodeId, ItemId};
pub use quantity::Quantity;
