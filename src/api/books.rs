//! Book catalog routes, mounted under `/books`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::schemas::{book_post_contract, books_contract};
use crate::routing::{
    HandlerResult, RegistrationContext, RegistrationError, Reply, RequestContext, RouteGroup,
};

pub const LIST_BOOKS: &str = "select * from books";
pub const INSERT_BOOK: &str = "INSERT INTO books (title, author) VALUES (?, ?)";

pub struct BooksRoutes;

#[derive(Deserialize)]
struct CreateBook {
    book: NewBook,
}

#[derive(Deserialize)]
struct NewBook {
    title: String,
    author: String,
}

#[derive(Serialize)]
struct Created {
    status: u16,
}

#[async_trait]
impl RouteGroup for BooksRoutes {
    fn name(&self) -> &str {
        "books"
    }

    async fn register(&self, ctx: &mut RegistrationContext) -> Result<(), RegistrationError> {
        ctx.get("/", books_contract(), list)?;
        ctx.post("/", book_post_contract(), create)?;
        Ok(())
    }
}

async fn list(ctx: RequestContext) -> HandlerResult {
    let books = ctx.data().query(LIST_BOOKS, &[]).await?;
    Ok(Reply::json(json!({ "books": books })))
}

async fn create(ctx: RequestContext) -> HandlerResult {
    let CreateBook { book } = ctx.body_as()?;
    let affected = ctx
        .data()
        .execute(INSERT_BOOK, &[json!(book.title), json!(book.author)])
        .await?;
    tracing::debug!(affected, "Book inserted");
    Reply::serialize(&Created { status: 200 })
}
