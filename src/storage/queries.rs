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


//! Database query functions
//!
//! This module implements the repository pattern for catalog operations.
//!
//! # Query Patterns
//! - Repository functions per entity type
//! - Async/await for all database operations
//! - sqlx `query_as` for typed row mapping
//! - Transactions for multi-step operations (genre assignment)
//!
//! Insert paths validate field lengths before touching the database, so a
//! caller gets a `CatalogError` validation variant rather than a raw SQLite
//! constraint failure for predictable mistakes.

use crate::error::{CatalogError, Result};
use crate::storage::models::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;

// ============================================================================
// GENRE QUERIES
// ============================================================================

/// Insert a new genre
///
/// Returns the genre_id of the inserted genre. Inserting a name that only
/// differs by case from an existing genre is a unique-constraint error.
pub async fn insert_genre(pool: &SqlitePool, name: &str) -> Result<i64> {
    validate_tag_name(name)?;

    let result = sqlx::query("INSERT INTO Genres (name) VALUES (?)")
        .bind(name.trim())
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find genre by name (case-insensitive)
pub async fn find_genre_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Genre>> {
    let genre = sqlx::query_as::<_, Genre>("SELECT * FROM Genres WHERE name = ? COLLATE NOCASE")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(genre)
}

/// List all genres ordered by name
pub async fn list_genres(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let genres = sqlx::query_as::<_, Genre>("SELECT * FROM Genres ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(genres)
}

/// Delete a genre (junction rows removed via CASCADE)
pub async fn delete_genre(pool: &SqlitePool, genre_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM Genres WHERE genre_id = ?")
        .bind(genre_id)
        .execute(pool)
        .await?;

    Ok(())
}

// ============================================================================
// LANGUAGE QUERIES
// ============================================================================

/// Insert a new language
pub async fn insert_language(pool: &SqlitePool, name: &str) -> Result<i64> {
    validate_tag_name(name)?;

    let result = sqlx::query("INSERT INTO Languages (name) VALUES (?)")
        .bind(name.trim())
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find language by name (case-insensitive)
pub async fn find_language_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Language>> {
    let language =
        sqlx::query_as::<_, Language>("SELECT * FROM Languages WHERE name = ? COLLATE NOCASE")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(language)
}

/// List all languages ordered by name
pub async fn list_languages(pool: &SqlitePool) -> Result<Vec<Language>> {
    let languages = sqlx::query_as::<_, Language>("SELECT * FROM Languages ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(languages)
}

/// Delete a language
pub async fn delete_language(pool: &SqlitePool, language_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM Languages WHERE language_id = ?")
        .bind(language_id)
        .execute(pool)
        .await?;

    Ok(())
}

// ============================================================================
// AUTHOR QUERIES
// ============================================================================

/// Insert a new author
///
/// Returns the author_id of the inserted author.
pub async fn insert_author(pool: &SqlitePool, author: &NewAuthor) -> Result<i64> {
    author.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO Authors (first_name, last_name, date_of_birth, date_of_death)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&author.first_name)
    .bind(&author.last_name)
    .bind(author.date_of_birth)
    .bind(author.date_of_death)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find author by ID
pub async fn find_author_by_id(pool: &SqlitePool, author_id: i64) -> Result<Option<Author>> {
    let author = sqlx::query_as::<_, Author>("SELECT * FROM Authors WHERE author_id = ?")
        .bind(author_id)
        .fetch_optional(pool)
        .await?;

    Ok(author)
}

/// Update an existing author
///
/// Fields are validated the same as on insertion.
pub async fn update_author(pool: &SqlitePool, author: &Author) -> Result<()> {
    author.validate()?;

    sqlx::query(
        r#"
        UPDATE Authors SET
            first_name = ?, last_name = ?, date_of_birth = ?, date_of_death = ?
        WHERE author_id = ?
        "#,
    )
    .bind(&author.first_name)
    .bind(&author.last_name)
    .bind(author.date_of_birth)
    .bind(author.date_of_death)
    .bind(author.author_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all authors ordered by last name, then first name
pub async fn list_authors(pool: &SqlitePool) -> Result<Vec<Author>> {
    let authors =
        sqlx::query_as::<_, Author>("SELECT * FROM Authors ORDER BY last_name, first_name")
            .fetch_all(pool)
            .await?;

    Ok(authors)
}

/// Count total authors
pub async fn count_authors(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Authors")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Delete an author
///
/// Books owned by the author survive with `author_id = NULL`.
pub async fn delete_author(pool: &SqlitePool, author_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM Authors WHERE author_id = ?")
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(())
}

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book
///
/// Returns the book_id of the inserted book.
pub async fn insert_book(pool: &SqlitePool, book: &NewBook) -> Result<i64> {
    book.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO Books (title, summary, isbn, author_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&book.title)
    .bind(&book.summary)
    .bind(&book.isbn)
    .bind(book.author_id)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find book by ID
pub async fn find_book_by_id(pool: &SqlitePool, book_id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// Find book by ISBN
pub async fn find_book_by_isbn(pool: &SqlitePool, isbn: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE isbn = ?")
        .bind(isbn)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// Update an existing book
///
/// Fields are validated the same as on insertion.
pub async fn update_book(pool: &SqlitePool, book: &Book) -> Result<()> {
    book.validate()?;

    sqlx::query(
        r#"
        UPDATE Books SET
            title = ?, summary = ?, isbn = ?, author_id = ?
        WHERE book_id = ?
        "#,
    )
    .bind(&book.title)
    .bind(&book.summary)
    .bind(&book.isbn)
    .bind(book.author_id)
    .bind(book.book_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all books with pagination, ordered by title
pub async fn list_books(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>("SELECT * FROM Books ORDER BY title LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(books)
}

/// Count total books
pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Books")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Search books by title
pub async fn search_books_by_title(
    pool: &SqlitePool,
    query: &str,
    limit: i64,
) -> Result<Vec<Book>> {
    let search_pattern = format!("%{}%", query);
    let books =
        sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE title LIKE ? ORDER BY title LIMIT ?")
            .bind(&search_pattern)
            .bind(limit)
            .fetch_all(pool)
            .await?;

    Ok(books)
}

/// Delete a book
///
/// Junction rows are removed via CASCADE; instances of the book survive
/// with `book_id = NULL`.
pub async fn delete_book(pool: &SqlitePool, book_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM Books WHERE book_id = ?")
        .bind(book_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Replace the set of genres assigned to a book
///
/// Runs in a transaction: the previous assignment is dropped and the new
/// one inserted as a unit.
pub async fn set_book_genres(pool: &SqlitePool, book_id: i64, genre_ids: &[i64]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM BookGenres WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

    for genre_id in genre_ids {
        sqlx::query("INSERT INTO BookGenres (book_id, genre_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(())
}

/// List genres assigned to a book, ordered by name
pub async fn genres_for_book(pool: &SqlitePool, book_id: i64) -> Result<Vec<Genre>> {
    let genres = sqlx::query_as::<_, Genre>(
        r#"
        SELECT g.genre_id, g.name
        FROM BookGenres bg
        JOIN Genres g ON g.genre_id = bg.genre_id
        WHERE bg.book_id = ?
        ORDER BY g.name
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    Ok(genres)
}

/// Book read model with author display name and genre list included
///
/// This is what list pages render: one row per book, relations flattened
/// to display strings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookWithRelations {
    pub book_id: i64,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i64>,

    /// Author display name ("last_name, first_name"), NULL for orphaned books
    pub author_name: Option<String>,
    /// Comma-separated genre names
    pub genres_str: Option<String>,
}

impl BookWithRelations {
    /// Genre names as a vector
    pub fn genres(&self) -> Vec<String> {
        self.genres_str
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Path to this book's detail page, for the `book-detail` route
    pub fn detail_path(&self) -> String {
        format!("/catalog/book/{}", self.book_id)
    }
}

/// List books with author and genre data flattened in
pub async fn list_books_with_relations(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<BookWithRelations>> {
    let books = sqlx::query_as::<_, BookWithRelations>(
        r#"
        WITH book_genres AS (
            SELECT
                bg.book_id,
                GROUP_CONCAT(g.name, ', ') as genres
            FROM BookGenres bg
            JOIN Genres g ON g.genre_id = bg.genre_id
            GROUP BY bg.book_id
        )
        SELECT
            b.book_id,
            b.title,
            b.summary,
            b.isbn,
            b.author_id,
            a.last_name || ', ' || a.first_name as author_name,
            bg.genres as genres_str
        FROM Books b
        LEFT JOIN Authors a ON a.author_id = b.author_id
        LEFT JOIN book_genres bg ON bg.book_id = b.book_id
        ORDER BY b.title
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(books)
}

// ============================================================================
// BOOK INSTANCE QUERIES
// ============================================================================

/// Insert a new book instance
pub async fn insert_book_instance(pool: &SqlitePool, instance: &NewBookInstance) -> Result<()> {
    instance.validate()?;

    sqlx::query(
        r#"
        INSERT INTO BookInstances (instance_id, book_id, imprint, due_back, status)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&instance.instance_id)
    .bind(instance.book_id)
    .bind(&instance.imprint)
    .bind(instance.due_back)
    .bind(instance.status.code())
    .execute(pool)
    .await?;

    Ok(())
}

/// Find book instance by its UUID
pub async fn find_instance_by_id(
    pool: &SqlitePool,
    instance_id: &str,
) -> Result<Option<BookInstance>> {
    let instance =
        sqlx::query_as::<_, BookInstance>("SELECT * FROM BookInstances WHERE instance_id = ?")
            .bind(instance_id)
            .fetch_optional(pool)
            .await?;

    Ok(instance)
}

/// Update an existing book instance
///
/// The imprint and raw status code are validated before writing; the CHECK
/// constraint is the backstop, not the primary gate.
pub async fn update_instance(pool: &SqlitePool, instance: &BookInstance) -> Result<()> {
    instance.validate()?;

    sqlx::query(
        r#"
        UPDATE BookInstances SET
            book_id = ?, imprint = ?, due_back = ?, status = ?
        WHERE instance_id = ?
        "#,
    )
    .bind(instance.book_id)
    .bind(&instance.imprint)
    .bind(instance.due_back)
    .bind(&instance.status)
    .bind(&instance.instance_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Set the loan status of an instance
pub async fn update_instance_status(
    pool: &SqlitePool,
    instance_id: &str,
    status: LoanStatus,
) -> Result<()> {
    let result = sqlx::query("UPDATE BookInstances SET status = ? WHERE instance_id = ?")
        .bind(status.code())
        .bind(instance_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(format!(
            "BookInstance {}",
            instance_id
        )));
    }

    Ok(())
}

/// Mark an instance as on loan with the given due date
///
/// Pure field update: computing the due date (loan periods, renewals) is
/// the caller's business.
pub async fn check_out_instance(
    pool: &SqlitePool,
    instance_id: &str,
    due_back: NaiveDate,
) -> Result<()> {
    let result =
        sqlx::query("UPDATE BookInstances SET status = 'o', due_back = ? WHERE instance_id = ?")
            .bind(due_back)
            .bind(instance_id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(format!(
            "BookInstance {}",
            instance_id
        )));
    }

    Ok(())
}

/// Mark an instance as returned: available, no due date
pub async fn check_in_instance(pool: &SqlitePool, instance_id: &str) -> Result<()> {
    let result = sqlx::query(
        "UPDATE BookInstances SET status = 'a', due_back = NULL WHERE instance_id = ?",
    )
    .bind(instance_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(format!(
            "BookInstance {}",
            instance_id
        )));
    }

    Ok(())
}

/// List all instances in default order: due_back ascending
///
/// NULL due dates sort first, per SQLite's default NULL ordering.
pub async fn list_instances(pool: &SqlitePool) -> Result<Vec<BookInstance>> {
    let instances =
        sqlx::query_as::<_, BookInstance>("SELECT * FROM BookInstances ORDER BY due_back")
            .fetch_all(pool)
            .await?;

    Ok(instances)
}

/// List instances of one book, due_back ascending
pub async fn list_instances_for_book(
    pool: &SqlitePool,
    book_id: i64,
) -> Result<Vec<BookInstance>> {
    let instances = sqlx::query_as::<_, BookInstance>(
        "SELECT * FROM BookInstances WHERE book_id = ? ORDER BY due_back",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    Ok(instances)
}

/// List instances in a given loan status, due_back ascending
pub async fn list_instances_by_status(
    pool: &SqlitePool,
    status: LoanStatus,
) -> Result<Vec<BookInstance>> {
    let instances = sqlx::query_as::<_, BookInstance>(
        "SELECT * FROM BookInstances WHERE status = ? ORDER BY due_back",
    )
    .bind(status.code())
    .fetch_all(pool)
    .await?;

    Ok(instances)
}

/// Count instances in a given loan status
pub async fn count_instances_by_status(pool: &SqlitePool, status: LoanStatus) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM BookInstances WHERE status = ?")
        .bind(status.code())
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Delete a book instance
pub async fn delete_instance(pool: &SqlitePool, instance_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM BookInstances WHERE instance_id = ?")
        .bind(instance_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Instance read model joined with its book's title
///
/// Instances whose book was deleted (book_id NULL) are excluded from this
/// view; they still appear in the plain instance listings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InstanceWithBook {
    pub instance_id: String,
    pub book_id: i64,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: String,
    pub title: String,
}

impl InstanceWithBook {
    /// Get loan status as enum
    pub fn status(&self) -> Result<LoanStatus> {
        LoanStatus::from_code(&self.status)
    }
}

impl fmt::Display for InstanceWithBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.instance_id, self.title)
    }
}

/// List instances joined with book titles, due_back ascending
pub async fn list_instances_with_book(pool: &SqlitePool) -> Result<Vec<InstanceWithBook>> {
    let instances = sqlx::query_as::<_, InstanceWithBook>(
        r#"
        SELECT
            i.instance_id,
            i.book_id,
            i.imprint,
            i.due_back,
            i.status,
            b.title
        FROM BookInstances i
        JOIN Books b ON b.book_id = i.book_id
        ORDER BY i.due_back
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(instances)
}
