// LocalLibrary - Lending Library Catalog
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Database storage and models
//!
//! This module handles all database operations for the catalog using SQLite.
//!
//! # Database Schema
//! - Authors: People who wrote books (name, life dates)
//! - Genres: Classification tags, unique case-insensitively
//! - Languages: Natural languages, kept as a standalone vocabulary
//! - Books: Bibliographic records (title, summary, ISBN, author)
//! - BookInstances: Physical copies with loan status and due date
//! - BookGenres: Book <-> Genre junction table
//!
//! # Usage Example
//! ```no_run
//! use locallibrary_core::storage::{Database, queries, models::NewBook};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create database
//! let db = Database::new("./catalog.db").await?;
//!
//! // Insert a book
//! let new_book = NewBook::new(
//!     "The Dispossessed",
//!     "An ambiguous utopia.",
//!     "9780061054884",
//! );
//! let book_id = queries::insert_book(db.pool(), &new_book).await?;
//!
//! // Find book by ISBN
//! let book = queries::find_book_by_isbn(db.pool(), "9780061054884").await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::{Database, DatabaseStats};
pub use models::{
    Author, Book, BookGenre, BookInstance, Genre, Language, LoanStatus, NewAuthor, NewBook,
    NewBookInstance,
};
pub use queries::{BookWithRelations, InstanceWithBook};
