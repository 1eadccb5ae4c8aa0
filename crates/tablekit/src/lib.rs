//! Demonstration routines for a DynamoDB table of movies.
//!
//! The binary parses a command line, opens one table store (DynamoDB or the
//! in-memory backend) and runs a single named operation against it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod operations;
pub mod output;
pub mod prelude;
pub mod storage;
