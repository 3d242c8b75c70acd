//! Database models for the LocalLibrary catalog
//!
//! This module contains the catalog entities: books, authors, genres,
//! languages, and the physical book copies ("instances") that circulate.
//!
//! # SQLite Adaptations
//! - Loan status stored as a single-character TEXT code ('m', 'o', 'a', 'r')
//! - Dates stored as TEXT in ISO 8601 format (YYYY-MM-DD)
//! - Book <-> Genre many-to-many uses the BookGenres junction table
//! - Instance identifiers are UUID v4 values stored as TEXT primary keys

use crate::error::{CatalogError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Maximum length for genre and language names
pub const MAX_NAME_LEN: usize = 200;
/// Maximum length for book titles and instance imprints
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum length for book summaries
pub const MAX_SUMMARY_LEN: usize = 1000;
/// Maximum length for author first/last names
pub const MAX_PERSON_NAME_LEN: usize = 100;
/// Fixed length of an ISBN-13 identifier string
pub const ISBN_LEN: usize = 13;

// ============================================================================
// ENUMS
// ============================================================================

/// Loan status of a physical book copy
///
/// Persisted as a single-character code. New instances default to
/// `Maintenance`: copies are created unavailable until they reach the
/// shelves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    /// All valid status codes, in declaration order
    pub const CODES: [&'static str; 4] = ["m", "o", "a", "r"];

    /// Parse a stored status code
    ///
    /// Unknown codes are an error rather than being coerced to a default;
    /// a bad code in the database means the row was written outside this
    /// crate and should be surfaced, not papered over.
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            other => Err(CatalogError::InvalidStatusCode(other.to_string())),
        }
    }

    /// Single-character code persisted in the database
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// MAIN ENTITIES
// ============================================================================

/// Genre - classification tag applied to books (e.g. Science Fiction, Poetry)
///
/// Referenced by many books through the BookGenres junction table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: i64,
    pub name: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Language - natural language of a book (e.g. English, French, Japanese)
///
/// Persisted and queryable, but not referenced by Book or BookInstance.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Language {
    pub language_id: i64,
    pub name: String,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Author - person record with optional birth and death dates
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Author {
    pub author_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[sqlx(default)]
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Path to this author's detail page, for the `author-detail` route
    pub fn detail_path(&self) -> String {
        format!("/catalog/author/{}", self.author_id)
    }

    /// Validate field presence and length limits (same rules as insertion)
    pub fn validate(&self) -> Result<()> {
        validate_author_fields(&self.first_name, &self.last_name)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Book - bibliographic record (not a specific physical copy)
///
/// A book has at most one owning author (nullable; deleting the author
/// leaves the book with `author_id = NULL`) and any number of genres
/// through the BookGenres junction table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    pub summary: String,
    /// 13-character ISBN identifier string
    pub isbn: String,
    #[sqlx(default)]
    pub author_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Path to this book's detail page, for the `book-detail` route
    pub fn detail_path(&self) -> String {
        format!("/catalog/book/{}", self.book_id)
    }

    /// Validate field presence and length limits (same rules as insertion)
    pub fn validate(&self) -> Result<()> {
        validate_book_fields(&self.title, &self.summary, &self.isbn)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// BookInstance - a specific physical copy of a book that can be borrowed
///
/// The primary key is a UUID (one per copy across the whole library).
/// `due_back` is set while a copy is out on loan or in maintenance and is
/// NULL when the copy sits on the shelf. `status` holds the raw loan status
/// code; use [`BookInstance::status`] for the typed view.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookInstance {
    /// UUID, stored as TEXT
    pub instance_id: String,
    #[sqlx(default)]
    pub book_id: Option<i64>,
    /// Publisher imprint of this particular printing
    pub imprint: String,
    #[sqlx(default)]
    pub due_back: Option<NaiveDate>,
    /// Loan status code ('m', 'o', 'a', 'r')
    pub status: String,
}

impl BookInstance {
    /// Get loan status as enum
    pub fn status(&self) -> Result<LoanStatus> {
        LoanStatus::from_code(&self.status)
    }

    /// Validate the imprint and the raw status code (same rules as insertion)
    pub fn validate(&self) -> Result<()> {
        validate_imprint(&self.imprint)?;
        LoanStatus::from_code(&self.status)?;
        Ok(())
    }
}

// ============================================================================
// JUNCTION TABLES (Many-to-Many Relationships)
// ============================================================================

/// BookGenre - junction row for Book <-> Genre
///
/// Composite primary key: (book_id, genre_id)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookGenre {
    pub book_id: i64,
    pub genre_id: i64,
}

// ============================================================================
// NEW RECORD STRUCTS (for inserts)
// ============================================================================

/// New author record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    /// Validate field presence and length limits
    pub fn validate(&self) -> Result<()> {
        validate_author_fields(&self.first_name, &self.last_name)
    }
}

/// New book record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i64>,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            isbn: isbn.into(),
            author_id: None,
        }
    }

    /// Validate field presence and length limits
    ///
    /// The ISBN must be exactly 13 characters; content beyond the length is
    /// not checked here (check digits belong to the import layer, if ever).
    pub fn validate(&self) -> Result<()> {
        validate_book_fields(&self.title, &self.summary, &self.isbn)
    }
}

/// New book instance record for insertion
///
/// `new()` allocates the UUID and defaults the status to maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookInstance {
    pub instance_id: String,
    pub book_id: Option<i64>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl NewBookInstance {
    pub fn new(book_id: i64, imprint: impl Into<String>) -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            book_id: Some(book_id),
            imprint: imprint.into(),
            due_back: None,
            status: LoanStatus::default(),
        }
    }

    /// Validate field presence and length limits
    pub fn validate(&self) -> Result<()> {
        validate_imprint(&self.imprint)
    }
}

/// Validate a genre or language name before insertion
///
/// Commas are rejected: genre lists render as comma-separated strings, so
/// a name containing one would be indistinguishable from two names.
pub fn validate_tag_name(name: &str) -> Result<()> {
    require_non_empty("name", name)?;
    require_max_len("name", name, MAX_NAME_LEN)?;
    if name.contains(',') {
        return Err(CatalogError::invalid_input("name must not contain ','"));
    }
    Ok(())
}

fn validate_author_fields(first_name: &str, last_name: &str) -> Result<()> {
    require_non_empty("first_name", first_name)?;
    require_non_empty("last_name", last_name)?;
    require_max_len("first_name", first_name, MAX_PERSON_NAME_LEN)?;
    require_max_len("last_name", last_name, MAX_PERSON_NAME_LEN)?;
    Ok(())
}

fn validate_book_fields(title: &str, summary: &str, isbn: &str) -> Result<()> {
    require_non_empty("title", title)?;
    require_max_len("title", title, MAX_TITLE_LEN)?;
    require_max_len("summary", summary, MAX_SUMMARY_LEN)?;
    if isbn.chars().count() != ISBN_LEN {
        return Err(CatalogError::InvalidIsbn {
            value: isbn.to_string(),
            length: isbn.chars().count(),
        });
    }
    Ok(())
}

fn validate_imprint(imprint: &str) -> Result<()> {
    require_non_empty("imprint", imprint)?;
    require_max_len("imprint", imprint, MAX_TITLE_LEN)?;
    Ok(())
}

fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::MissingRequiredField(field.to_string()));
    }
    Ok(())
}

fn require_max_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    let actual = value.chars().count();
    if actual > max {
        return Err(CatalogError::FieldTooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_status_codes_round() {
        for code in LoanStatus::CODES {
            let status = LoanStatus::from_code(code).expect("valid code");
            assert_eq!(status.code(), code);
        }
        assert!(LoanStatus::from_code("x").is_err());
        assert!(LoanStatus::from_code("").is_err());
    }

    #[test]
    fn test_loan_status_default_is_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::default().code(), "m");
    }

    #[test]
    fn test_author_display() {
        let author = Author {
            author_id: 1,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1929, 10, 21),
            date_of_death: NaiveDate::from_ymd_opt(2018, 1, 22),
        };
        assert_eq!(author.to_string(), "Le Guin, Ursula");
        assert_eq!(author.detail_path(), "/catalog/author/1");
    }

    #[test]
    fn test_book_display_and_path() {
        let book = Book {
            book_id: 7,
            title: "The Dispossessed".to_string(),
            summary: String::new(),
            isbn: "9780061054884".to_string(),
            author_id: Some(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(book.to_string(), "The Dispossessed");
        assert_eq!(book.detail_path(), "/catalog/book/7");
    }

    #[test]
    fn test_new_book_isbn_validation() {
        let mut book = NewBook::new("Title", "Summary", "9780061054884");
        assert!(book.validate().is_ok());

        book.isbn = "9780061054".to_string();
        match book.validate() {
            Err(CatalogError::InvalidIsbn { length, .. }) => assert_eq!(length, 10),
            other => panic!("expected InvalidIsbn, got {:?}", other),
        }
    }

    #[test]
    fn test_new_book_length_limits() {
        let book = NewBook::new("t".repeat(MAX_TITLE_LEN + 1), "s", "9780061054884");
        assert!(matches!(
            book.validate(),
            Err(CatalogError::FieldTooLong { field: "title", .. })
        ));

        let book = NewBook::new("t", "s".repeat(MAX_SUMMARY_LEN + 1), "9780061054884");
        assert!(matches!(
            book.validate(),
            Err(CatalogError::FieldTooLong { field: "summary", .. })
        ));
    }

    #[test]
    fn test_new_instance_defaults() {
        let instance = NewBookInstance::new(1, "Gollancz, 2003");
        assert_eq!(instance.status, LoanStatus::Maintenance);
        assert!(instance.due_back.is_none());
        // UUID text form is 36 chars with hyphens
        assert_eq!(instance.instance_id.len(), 36);
        assert!(instance.validate().is_ok());
    }

    #[test]
    fn test_tag_name_validation() {
        assert!(validate_tag_name("Science Fiction").is_ok());
        assert!(matches!(
            validate_tag_name("   "),
            Err(CatalogError::MissingRequiredField(_))
        ));
        assert!(validate_tag_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        // Comma-separated genre lists must stay unambiguous
        assert!(matches!(
            validate_tag_name("Fiction, Historical"),
            Err(CatalogError::InvalidInput(_))
        ));
    }
}
