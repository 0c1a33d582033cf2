use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const PAGE_SIZE: u64 = 2;
const DEFAULT_PAGE: u64 = 1;

/// Raw query string for `GET /books`, built from its key/value pairs so that
/// no query string rejects the request. A repeated `page` counts as
/// malformed; a repeated `keyword` keeps its first value.
#[derive(Debug, Default)]
pub struct ListQuery {
    pub page: Option<String>,
    pub keyword: Option<String>,
}

impl FromIterator<(String, String)> for ListQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = ListQuery::default();
        let mut pages = 0;

        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    pages += 1;
                    query.page.get_or_insert(value);
                }
                "keyword" => {
                    query.keyword.get_or_insert(value);
                }
                _ => {}
            }
        }

        if pages > 1 {
            query.page = None;
        }
        query
    }
}

/// Pagination and title filter for a listing.
///
/// `page` is 1-based and falls back to 1 when missing, non-numeric or below
/// one. An empty keyword means no filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    pub keyword: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            page: DEFAULT_PAGE,
            keyword: None,
        }
    }
}

impl ListParams {
    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }

    pub fn skip(&self) -> u64 {
        PAGE_SIZE.saturating_mul(self.page.saturating_sub(1))
    }
}

impl From<ListQuery> for ListParams {
    fn from(query: ListQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);

        ListParams {
            page,
            keyword: query.keyword.filter(|k| !k.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

pub fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse { data })).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse { data })).into_response()
}
