use std::sync::Arc;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::ActionConfig;
use crate::store::Store;

pub mod alerts;
pub mod filters;
pub mod history;
pub mod news;

pub const GENERIC_ERROR: &str = "An error occurred";

pub struct AppState {
    pub store: Store,
    pub actions: ActionConfig,
}

/// Route table for the whole UI.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(news::index))
        .route("/news/fetch", post(news::fetch_from_provider))
        .route("/news/:id", get(news::detail))
        .route("/filters", get(filters::index).post(filters::create))
        .route("/filters/results", get(filters::results))
        .route("/filters/results/clear", post(filters::clear_results))
        .route("/filters/:id", post(filters::update))
        .route("/filters/:id/delete", post(filters::delete))
        .route("/filters/:id/apply", post(filters::apply))
        .route("/alerts", get(alerts::index).post(alerts::create))
        .route("/alerts/process_all", post(alerts::process_all))
        .route("/alerts/test-result/clear", post(alerts::clear_test_result))
        .route(
            "/alerts/process-result/clear",
            post(alerts::clear_process_result),
        )
        .route("/alerts/:id", post(alerts::update))
        .route("/alerts/:id/delete", post(alerts::delete))
        .route("/alerts/:id/test", post(alerts::test))
        .route("/history", get(history::index))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Wrapper for HTML responses
pub struct HtmlTemplate<T>(pub T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// A form field that failed the checks made before submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
}

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value == current;
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

/// HTML checkboxes submit a value only when ticked.
pub fn checkbox(value: &Option<String>) -> bool {
    value.is_some()
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
