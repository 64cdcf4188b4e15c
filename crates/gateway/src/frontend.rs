//! Embedded single-page frontend.
//!
//! `static/index.html` is compiled into the binary with `include_str!` and
//! posts tasks to `/run`.

use axum::{Router, response::Html, routing::get};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Router serving the page at `/`.
pub fn frontend_router() -> Router {
    Router::new().route("/", get(index_handler))
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
