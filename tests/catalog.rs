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


//! Integration test for the catalog storage layer
//!
//! Walks a file-backed database through the full life of a catalog entry:
//! author and book creation, genre assignment, copies entering circulation,
//! a loan cycle, and deletions with their referential side effects.

use chrono::NaiveDate;
use locallibrary_core::storage::models::{NewAuthor, NewBook, NewBookInstance};
use locallibrary_core::storage::{queries, Database, LoanStatus};

#[tokio::test]
async fn test_full_catalog_lifecycle() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("catalog.db");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");
    let pool = db.pool();

    // --- Author ---
    let mut author = NewAuthor::new("Ursula", "Le Guin");
    author.date_of_birth = NaiveDate::from_ymd_opt(1929, 10, 21);
    author.date_of_death = NaiveDate::from_ymd_opt(2018, 1, 22);
    let author_id = queries::insert_author(pool, &author)
        .await
        .expect("Failed to insert author");

    let stored_author = queries::find_author_by_id(pool, author_id)
        .await
        .expect("Failed to query author")
        .expect("Author not found");
    assert_eq!(stored_author.to_string(), "Le Guin, Ursula");
    assert_eq!(
        stored_author.detail_path(),
        format!("/catalog/author/{}", author_id)
    );

    // --- Book with genres and a language on record ---
    let mut book = NewBook::new(
        "The Left Hand of Darkness",
        "An envoy visits a planet whose people have no fixed sex.",
        "9780441478125",
    );
    book.author_id = Some(author_id);
    let book_id = queries::insert_book(pool, &book)
        .await
        .expect("Failed to insert book");

    let sf = queries::insert_genre(pool, "Science Fiction")
        .await
        .expect("Failed to insert genre");
    queries::insert_language(pool, "English")
        .await
        .expect("Failed to insert language");
    queries::set_book_genres(pool, book_id, &[sf])
        .await
        .expect("Failed to assign genres");

    let listed = queries::list_books_with_relations(pool, 10, 0)
        .await
        .expect("Failed to list books");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].author_name.as_deref(), Some("Le Guin, Ursula"));
    assert_eq!(listed[0].genres(), vec!["Science Fiction".to_string()]);

    // --- Two copies enter circulation ---
    let copy_a = NewBookInstance::new(book_id, "Ace Books, 1969");
    let copy_b = NewBookInstance::new(book_id, "Orbit, 2017");
    queries::insert_book_instance(pool, &copy_a)
        .await
        .expect("Failed to insert instance");
    queries::insert_book_instance(pool, &copy_b)
        .await
        .expect("Failed to insert instance");

    // New copies start in maintenance
    assert_eq!(
        queries::count_instances_by_status(pool, LoanStatus::Maintenance)
            .await
            .expect("Failed to count"),
        2
    );

    queries::update_instance_status(pool, &copy_a.instance_id, LoanStatus::Available)
        .await
        .expect("Failed to update status");
    queries::update_instance_status(pool, &copy_b.instance_id, LoanStatus::Available)
        .await
        .expect("Failed to update status");

    // --- Loan cycle on copy A ---
    let due = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
    queries::check_out_instance(pool, &copy_a.instance_id, due)
        .await
        .expect("Failed to check out");

    let on_loan = queries::list_instances_by_status(pool, LoanStatus::OnLoan)
        .await
        .expect("Failed to list");
    assert_eq!(on_loan.len(), 1);
    assert_eq!(on_loan[0].due_back, Some(due));

    // Copy B has no due date and sorts ahead of the loaned copy
    let all = queries::list_instances(pool).await.expect("Failed to list");
    assert_eq!(all[0].instance_id, copy_b.instance_id);
    assert_eq!(all[1].instance_id, copy_a.instance_id);

    let with_book = queries::list_instances_with_book(pool)
        .await
        .expect("Failed to list");
    assert_eq!(
        with_book[1].to_string(),
        format!("{} (The Left Hand of Darkness)", copy_a.instance_id)
    );

    queries::check_in_instance(pool, &copy_a.instance_id)
        .await
        .expect("Failed to check in");
    assert_eq!(
        queries::count_instances_by_status(pool, LoanStatus::Available)
            .await
            .expect("Failed to count"),
        2
    );

    // --- Deletions and their referential fallout ---
    queries::delete_author(pool, author_id)
        .await
        .expect("Failed to delete author");
    let orphaned_book = queries::find_book_by_id(pool, book_id)
        .await
        .expect("Failed to query book")
        .expect("Book should survive author deletion");
    assert_eq!(orphaned_book.author_id, None);

    queries::delete_book(pool, book_id)
        .await
        .expect("Failed to delete book");
    let orphaned_copy = queries::find_instance_by_id(pool, &copy_a.instance_id)
        .await
        .expect("Failed to query instance")
        .expect("Instance should survive book deletion");
    assert_eq!(orphaned_copy.book_id, None);

    // Genres keep existing after the junction rows cascade away
    assert_eq!(
        queries::list_genres(pool).await.expect("Failed to list").len(),
        1
    );

    db.close().await.expect("Failed to close database");
}
