//! Query execution module
//!
//! This module contains the clause evaluator and the statement dispatcher.

pub mod evaluator;
pub mod result;
pub mod session;

pub use evaluator::{evaluate, Selection};
pub use result::QueryResult;
pub use session::{QueryLogEntry, Session};
