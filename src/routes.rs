use axum::{Router, routing::get};

use crate::handler::{self, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::healthcheck))
        .route("/books", get(handler::list_books).post(handler::create_book))
        .route(
            "/books/:id",
            get(handler::get_book)
                .head(handler::book_exists)
                .put(handler::update_book)
                .delete(handler::delete_book),
        )
}
