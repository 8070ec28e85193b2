//! CRUD and search commands through the compiled binary.

use crate::common::{Sandbox, stderr, stdout};

#[test]
fn add_then_list_prints_every_book() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let out = sandbox.books(&["list"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "ID: 1, Title: Dune, Author: Frank Herbert, Genre: Sci-Fi\n\
         ID: 2, Title: Emma, Author: Jane Austen, Genre: Romance\n\
         ID: 3, Title: Ulysses, Author: James Joyce, Genre: Modernist\n"
    );
}

#[test]
fn list_on_empty_catalog() {
    let sandbox = Sandbox::new();
    let out = sandbox.books(&["list"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "No books in the catalog\n");
}

#[test]
fn get_json_round_trips_fields() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let out = sandbox.books(&["get", "2", "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let book: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(book["id"], 2);
    assert_eq!(book["title"], "Emma");
    assert_eq!(book["author"], "Jane Austen");
}

#[test]
fn get_missing_book_fails() {
    let sandbox = Sandbox::new();
    let out = sandbox.books(&["get", "7"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Book 7 not found"));
}

#[test]
fn get_rejects_non_positive_id() {
    let sandbox = Sandbox::new();
    let out = sandbox.books(&["get", "0"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid book ID"));
}

#[test]
fn update_and_delete() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let out = sandbox.books(&[
        "update",
        "2",
        "--title",
        "Persuasion",
        "--author",
        "Jane Austen",
        "--genre",
        "Romance",
    ]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "ID: 2, Title: Persuasion, Author: Jane Austen, Genre: Romance\n"
    );

    let out = sandbox.books(&["delete", "1"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Deleted book 1\n");

    let out = sandbox.books(&["delete", "1"]);
    assert!(!out.status.success());
}

#[test]
fn add_rejects_blank_fields() {
    let sandbox = Sandbox::new();
    let out = sandbox.books(&["add", "--title", " ", "--author", "A", "--genre", "G"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("book title must not be empty"));
}

#[test]
fn search_matches_title_substring() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let out = sandbox.books(&["search", "ul"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "ID: 3, Title: Ulysses, Author: James Joyce, Genre: Modernist\n"
    );
}
