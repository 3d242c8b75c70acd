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


//! Database migrations
//!
//! This module handles database schema creation and migrations.
//!
//! # Migration Strategy
//! Since sqlx's compile-time migration system requires a build-time database
//! connection, we implement migrations as runtime SQL execution. Applied
//! migrations are tracked in the `_migrations` table and run exactly once,
//! in order, when a connection is opened.

use crate::error::Result;
use sqlx::{Executor, SqlitePool};

/// Run all database migrations
///
/// This function creates the catalog schema and applies any pending
/// migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    run_migration(pool, 1, "initial_schema", create_initial_schema(pool)).await?;

    Ok(())
}

/// Create migrations tracking table
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Run a single migration if it hasn't been applied yet
async fn run_migration(
    pool: &SqlitePool,
    id: i32,
    name: &str,
    migration_fn: impl std::future::Future<Output = Result<()>>,
) -> Result<()> {
    let applied: Option<i32> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        return Ok(());
    }

    migration_fn.await?;

    sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

    log::debug!("applied migration {} ({})", id, name);

    Ok(())
}

/// Create initial catalog schema
///
/// Creates all tables with their relationships, indexes, and constraints.
async fn create_initial_schema(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
-- ============================================================================
-- MAIN ENTITIES
-- ============================================================================

-- Authors table: person records with optional birth/death dates
CREATE TABLE IF NOT EXISTS Authors (
    author_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth TEXT,  -- ISO 8601 date (YYYY-MM-DD)
    date_of_death TEXT
);

-- Genres table: classification tags applied to books
-- Names are unique case-insensitively; duplicate tag rows are never useful.
CREATE TABLE IF NOT EXISTS Genres (
    genre_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

-- Languages table: natural languages
-- Declared alongside the other entities but carries no foreign keys.
CREATE TABLE IF NOT EXISTS Languages (
    language_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

-- Books table: bibliographic records
CREATE TABLE IF NOT EXISTS Books (
    book_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    summary TEXT NOT NULL DEFAULT '',
    isbn TEXT NOT NULL,  -- 13-character identifier string

    -- A book has at most one owning author; removing the author keeps the
    -- book and clears the reference.
    author_id INTEGER,

    -- Timestamps
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    FOREIGN KEY (author_id) REFERENCES Authors(author_id) ON DELETE SET NULL
);

-- BookInstances table: physical copies of books with loan state
CREATE TABLE IF NOT EXISTS BookInstances (
    instance_id TEXT PRIMARY KEY,  -- UUID, one per copy across the library
    book_id INTEGER,
    imprint TEXT NOT NULL,
    due_back TEXT,  -- ISO 8601 date; NULL while the copy is on the shelf

    -- Loan status code: m=Maintenance, o=On loan, a=Available, r=Reserved.
    -- New copies default to maintenance until they reach the shelves.
    status TEXT NOT NULL DEFAULT 'm' CHECK (status IN ('m', 'o', 'a', 'r')),

    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE SET NULL
);

-- ============================================================================
-- JUNCTION TABLES (Many-to-Many Relationships)
-- ============================================================================

-- BookGenres: Book <-> Genre junction
CREATE TABLE IF NOT EXISTS BookGenres (
    book_id INTEGER NOT NULL,
    genre_id INTEGER NOT NULL,
    FOREIGN KEY (book_id) REFERENCES Books(book_id) ON DELETE CASCADE,
    FOREIGN KEY (genre_id) REFERENCES Genres(genre_id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, genre_id)
);

-- ============================================================================
-- INDEXES
-- ============================================================================

CREATE INDEX IF NOT EXISTS idx_authors_name ON Authors(last_name, first_name);

CREATE INDEX IF NOT EXISTS idx_books_title ON Books(title);
CREATE INDEX IF NOT EXISTS idx_books_isbn ON Books(isbn);
CREATE INDEX IF NOT EXISTS idx_books_author ON Books(author_id);

-- Instance listings default to due_back order
CREATE INDEX IF NOT EXISTS idx_instances_due_back ON BookInstances(due_back);
CREATE INDEX IF NOT EXISTS idx_instances_status ON BookInstances(status);
CREATE INDEX IF NOT EXISTS idx_instances_book ON BookInstances(book_id);

CREATE INDEX IF NOT EXISTS idx_book_genres_genre ON BookGenres(genre_id);

-- ============================================================================
-- TRIGGERS
-- ============================================================================

-- Keep updated_at current when a book is modified
CREATE TRIGGER IF NOT EXISTS update_books_timestamp
AFTER UPDATE ON Books
FOR EACH ROW
BEGIN
    UPDATE Books SET updated_at = CURRENT_TIMESTAMP WHERE book_id = NEW.book_id;
END;
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::storage::database::Database;

    #[tokio::test]
    async fn test_migrations() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .expect("Failed to query tables");

        let expected_tables = vec![
            "Authors",
            "BookGenres",
            "BookInstances",
            "Books",
            "Genres",
            "Languages",
        ];

        assert_eq!(tables, expected_tables, "Missing or extra tables");
    }

    #[tokio::test]
    async fn test_migration_tracking() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .expect("Failed to query migrations");

        assert!(count > 0, "No migrations recorded");

        // Running again must be a no-op
        db.migrate().await.expect("Re-running migrations failed");
        let count_after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .expect("Failed to query migrations");
        assert_eq!(count, count_after);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let fk_enabled: i32 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .expect("Failed to check foreign keys");

        assert_eq!(fk_enabled, 1, "Foreign keys not enabled");
    }

    #[tokio::test]
    async fn test_status_check_constraint() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let result = sqlx::query(
            "INSERT INTO BookInstances (instance_id, imprint, status) VALUES ('test-id', 'Imprint', 'x')",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err(), "CHECK constraint did not reject bad status code");
    }

    #[tokio::test]
    async fn test_status_defaults_to_maintenance() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        sqlx::query("INSERT INTO BookInstances (instance_id, imprint) VALUES ('test-id', 'Imprint')")
            .execute(db.pool())
            .await
            .expect("Failed to insert instance");

        let status: String =
            sqlx::query_scalar("SELECT status FROM BookInstances WHERE instance_id = 'test-id'")
                .fetch_one(db.pool())
                .await
                .expect("Failed to read status");

        assert_eq!(status, "m");
    }

    #[tokio::test]
    async fn test_genre_name_unique_case_insensitive() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        sqlx::query("INSERT INTO Genres (name) VALUES ('Poetry')")
            .execute(db.pool())
            .await
            .expect("Failed to insert genre");

        let duplicate = sqlx::query("INSERT INTO Genres (name) VALUES ('poetry')")
            .execute(db.pool())
            .await;

        assert!(duplicate.is_err(), "Case-insensitive duplicate was accepted");
    }
}
