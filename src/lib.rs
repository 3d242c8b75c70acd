//! LocalLibrary catalog data layer
//!
//! SQLite-backed storage for a small lending library: books, authors,
//! genres, languages, and the physical copies members borrow. A web
//! front end is expected to sit on top of this crate; everything here
//! is plain async Rust with no HTTP surface.

pub mod error;
pub mod storage;

pub use error::{CatalogError, Result};
pub use storage::{Database, LoanStatus};
