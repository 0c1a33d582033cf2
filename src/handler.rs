use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::{ListParams, ListQuery, StatusResponse, created, success};
use crate::error::ServiceError;
use crate::model::{NewBook, UpdateBook};
use crate::service::BookService;

#[derive(Clone)]
pub struct AppState {
    pub books: BookService,
}

// axum's default for a bad body is 422; callers get the same 400 as any
// other invalid payload.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload
        .map(|Json(p)| p)
        .map_err(|e| ServiceError::InvalidInput(e.body_text()))
}

pub async fn healthcheck() -> impl IntoResponse {
    tracing::debug!("got healthcheck request");
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = ListParams::from(pairs.into_iter().collect::<ListQuery>());

    match state.books.list_books(&params).await {
        Ok(books) => {
            tracing::info!(page = params.page, count = books.len(), "listed books");
            success(books)
        }
        Err(e) => e.into_response(),
    }
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Response {
    let book = match body(payload) {
        Ok(b) => b,
        Err(e) => return e.into_response(),
    };

    match state.books.create_book(book).await {
        Ok(book) => created(book),
        Err(e) => {
            tracing::info!(error = %e, "failed to create book");
            e.into_response()
        }
    }
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.books.get_book(&id).await {
        Ok(book) => success(book),
        Err(e) => e.into_response(),
    }
}

pub async fn book_exists(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.books.book_exists(&id).await {
        Ok(true) => StatusCode::OK.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => e.status().into_response(),
    }
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBook>, JsonRejection>,
) -> Response {
    let changes = match body(payload) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    match state.books.update_book(&id, changes).await {
        Ok(book) => success(book),
        Err(e) => {
            tracing::info!(id = %id, error = %e, "failed to update book");
            e.into_response()
        }
    }
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.books.delete_book(&id).await {
        Ok(book) => success(book),
        Err(e) => {
            tracing::info!(id = %id, error = %e, "failed to delete book");
            e.into_response()
        }
    }
}
