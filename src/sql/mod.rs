//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer and parser
//! - `types`: Runtime values and rows
//! - `schema`: Table and column schema definitions
//! - `plan`: Execution plan generation
//! - `executor`: Query and mutation execution
//! - `engine`: The database and its sessions

pub mod parser;
pub mod types;
pub mod schema;
pub mod plan;
pub mod executor;
pub mod engine;
