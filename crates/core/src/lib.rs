//! Core types for tablekit.
//!
//! Everything here is pure: attribute values, table definitions, keys, the
//! expression model and the `TableStore` contract. Backends live in the
//! `tablekit` crate.

pub mod expression;
pub mod key;
pub mod movies;
pub mod storage;
pub mod table;
pub mod value;
