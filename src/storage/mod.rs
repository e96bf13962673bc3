//! Storage module
//!
//! This module contains the in-memory row store:
//! - Values
//! - Rows and row handles
//! - Tables

pub mod row;
pub mod table;
pub mod value;

pub use row::{Row, RowId};
pub use table::Table;
pub use value::Value;
