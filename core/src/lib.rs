//! sqlnest Core Types
//!
//! This crate provides the foundational types shared by the sqlnest crates:
//! - Value types (the Value enum carried in parameters and result rows)
//! - Queries (SQL text plus ordered parameters, with named placeholders)
//! - Selected field descriptors and join nullability
//! - Result sets as returned by an execution capability
//! - The result mapper turning positional rows into nested records
//! - Common error types

mod error;
mod field;
mod mapper;
mod query;
mod record;
mod result;
mod value;

pub use error::*;
pub use field::*;
pub use mapper::*;
pub use query::*;
pub use record::*;
pub use result::*;
pub use value::*;
