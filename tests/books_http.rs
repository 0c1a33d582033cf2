use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use bookshelf::db::Database;
use bookshelf::handler::AppState;
use bookshelf::routes::routes;
use bookshelf::service::BookService;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let db = Database::in_memory().await.unwrap();
    routes().with_state(AppState {
        books: BookService::new(Arc::new(db)),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn dune() -> Value {
    json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "description": "desert planet",
        "price": 9.99,
        "category": "Adventure"
    })
}

#[tokio::test]
async fn healthcheck_is_ok() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn book_crud_over_http() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/books", Some(dune())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["title"], "Dune");
    assert_eq!(body["data"]["category"], "Adventure");

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(json!({ "price": 12.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 12.5);
    assert_eq!(body["data"]["title"], "Dune");

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 12.5);

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Book not found" }));
}

#[tokio::test]
async fn client_supplied_id_is_ignored() {
    let app = app().await;
    let mut payload = dune();
    payload["id"] = json!("507f1f77bcf86cd799439011");

    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(body["data"]["id"], "507f1f77bcf86cd799439011");
}

#[tokio::test]
async fn listing_paginates_and_filters() {
    let app = app().await;
    for title in ["Dune", "Emma", "Dune Messiah"] {
        let mut payload = dune();
        payload["title"] = json!(title);
        send(&app, Method::POST, "/books", Some(payload)).await;
    }

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/books?page=2", None).await;
    let page: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(page, ["Dune Messiah"]);

    let (status, body) = send(&app, Method::GET, "/books?page=abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Dune");

    let (_, body) = send(&app, Method::GET, "/books?keyword=dun", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/books?keyword=xyz", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn repeated_page_lists_first_page() {
    let app = app().await;
    for title in ["Dune", "Emma", "Ivanhoe"] {
        let mut payload = dune();
        payload["title"] = json!(title);
        send(&app, Method::POST, "/books", Some(payload)).await;
    }

    let (status, body) = send(&app, Method::GET, "/books?page=2&page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Dune", "Emma"]);

    let (status, body) = send(&app, Method::GET, "/books?keyword=emm&keyword=dun", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Emma");
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = app().await;

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/books/nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid ID" }));
    }

    let (status, _) = send(&app, Method::PUT, "/books/nope", Some(json!({ "price": 1.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_book_is_not_found() {
    let app = app().await;
    let uri = "/books/507f1f77bcf86cd799439011";

    let (status, _) = send(&app, Method::DELETE, uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, uri, Some(json!({ "price": 1.0 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payloads_are_bad_request() {
    let app = app().await;

    let mut negative = dune();
    negative["price"] = json!(-3);
    let (status, body) = send(&app, Method::POST, "/books", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("price"));

    let mut unknown_category = dune();
    unknown_category["category"] = json!("Poetry");
    let (status, _) = send(&app, Method::POST, "/books", Some(unknown_category)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/books", Some(json!({ "title": "Dune" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn head_reports_existence() {
    let app = app().await;
    let (_, body) = send(&app, Method::POST, "/books", Some(dune())).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::HEAD, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::HEAD, "/books/507f1f77bcf86cd799439011", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::HEAD, "/books/nope", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
