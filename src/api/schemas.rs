//! Contracts shared by the route groups.

use crate::schema::{Schema, SchemaContract};

/// `200 → {message: string}`.
pub fn message_contract() -> SchemaContract {
    SchemaContract::new().response(
        200,
        Schema::object().required_property("message", Schema::string()),
    )
}

/// `200 → {books: array}`.
pub fn books_contract() -> SchemaContract {
    SchemaContract::new().response(
        200,
        Schema::object().required_property("books", Schema::array()),
    )
}

/// Body `{book: {title: string, author: string}}`, `200 → {status: number}`.
pub fn book_post_contract() -> SchemaContract {
    let book = Schema::object()
        .required_property("title", Schema::string())
        .required_property("author", Schema::string());

    SchemaContract::new()
        .body(Schema::object().required_property("book", book))
        .response(
            200,
            Schema::object().required_property("status", Schema::number()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{validate, Part};
    use serde_json::json;

    #[test]
    fn test_book_post_body() {
        let contract = book_post_contract();
        let body = contract.schema_for(Part::Body).unwrap();

        assert!(validate(&json!({ "book": { "title": "T", "author": "A" } }), body).is_ok());

        let violations = validate(&json!({ "book": { "title": "T" } }), body).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "book.author");
    }

    #[test]
    fn test_books_response_requires_array() {
        let contract = books_contract();
        let schema = contract.response_for(200).unwrap();

        assert!(validate(&json!({ "books": [] }), schema).is_ok());
        assert!(validate(&json!({ "books": {} }), schema).is_err());
    }
}
