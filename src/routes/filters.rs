use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::models::{DaysWindow, Filter, FilterInput, NewsItem};
use crate::routes::{checkbox, AppState, DraftError, HtmlTemplate, GENERIC_ERROR};
use crate::store::{FiltersState, Rejection};

#[derive(Template)]
#[template(path = "filters.html")]
pub struct FiltersTemplate {
    pub filters: Vec<Filter>,
    pub error: Option<String>,
    pub form: Option<FilterForm>,
}

impl FiltersTemplate {
    fn new(state: FiltersState, form: Option<FilterForm>) -> Self {
        Self {
            error: state.status.error_text(GENERIC_ERROR),
            filters: state.items,
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "filtered_results.html")]
pub struct FilteredResultsTemplate {
    pub count: u64,
    pub items: Vec<NewsItem>,
}

/// Create/edit modal contents.
pub struct FilterForm {
    pub action: String,
    pub title: &'static str,
    pub submit_label: &'static str,
    pub draft: FilterDraft,
    pub error: Option<String>,
}

impl FilterForm {
    fn create(draft: FilterDraft, error: Option<String>) -> Self {
        Self {
            action: "/filters".to_string(),
            title: "Create Filter",
            submit_label: "Create",
            draft,
            error,
        }
    }

    fn edit(id: i64, draft: FilterDraft, error: Option<String>) -> Self {
        Self {
            action: format!("/filters/{}", id),
            title: "Edit Filter",
            submit_label: "Update",
            draft,
            error,
        }
    }
}

/// Raw form fields; list fields are comma-separated text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub sources: String,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl FilterDraft {
    pub fn blank() -> Self {
        Self {
            is_active: Some("on".to_string()),
            ..Default::default()
        }
    }

    pub fn from_filter(filter: &Filter) -> Self {
        Self {
            name: filter.name.clone(),
            keywords: filter.keywords.join(", "),
            sources: filter.sources.join(", "),
            categories: filter.categories.join(", "),
            is_active: filter.is_active.then(|| "on".to_string()),
        }
    }

    pub fn is_checked(&self) -> bool {
        checkbox(&self.is_active)
    }

    pub fn to_input(&self) -> Result<FilterInput, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::Missing("Filter name"));
        }
        Ok(FilterInput {
            name: name.to_string(),
            keywords: parse_list(&self.keywords),
            sources: parse_list(&self.sources),
            categories: parse_list(&self.categories),
            is_active: self.is_checked(),
        })
    }
}

/// Split comma-separated input, trimming entries and dropping empty ones.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct ModalQuery {
    pub modal: Option<String>,
    pub edit: Option<i64>,
}

async fn render(state: &AppState, form: Option<FilterForm>) -> Response {
    let snapshot = state.store.filters.snapshot().await;
    HtmlTemplate(FiltersTemplate::new(snapshot, form)).into_response()
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModalQuery>,
) -> Response {
    let _ = state.store.filters.fetch_filters().await;
    let snapshot = state.store.filters.snapshot().await;

    let form = match query.edit {
        Some(id) => snapshot
            .items
            .iter()
            .find(|f| f.id == id)
            .map(|f| FilterForm::edit(id, FilterDraft::from_filter(f), None)),
        None if query.modal.as_deref() == Some("create") => {
            Some(FilterForm::create(FilterDraft::blank(), None))
        }
        None => None,
    };
    HtmlTemplate(FiltersTemplate::new(snapshot, form)).into_response()
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(draft): Form<FilterDraft>,
) -> Response {
    let input = match draft.to_input() {
        Ok(input) => input,
        Err(e) => {
            let form = FilterForm::create(draft, Some(e.to_string()));
            return render(&state, Some(form)).await;
        }
    };
    match state.store.filters.create_filter(input).await {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/filters").into_response(),
        Err(Rejection::Api(_)) => render(&state, Some(FilterForm::create(draft, None))).await,
    }
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(draft): Form<FilterDraft>,
) -> Response {
    let input = match draft.to_input() {
        Ok(input) => input,
        Err(e) => {
            let form = FilterForm::edit(id, draft, Some(e.to_string()));
            return render(&state, Some(form)).await;
        }
    };
    match state.store.filters.update_filter(id, input).await {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/filters").into_response(),
        Err(Rejection::Api(_)) => render(&state, Some(FilterForm::edit(id, draft, None))).await,
    }
}

pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.store.filters.delete_filter(id).await {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/filters").into_response(),
        Err(Rejection::Api(_)) => render(&state, None).await,
    }
}

pub async fn apply(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    let window = DaysWindow {
        days: state.actions.apply_days,
    };
    match state.store.filters.apply_filter(id, window).await {
        Ok(batch) if batch.results.is_empty() => Redirect::to("/filters").into_response(),
        Ok(batch) => HtmlTemplate(FilteredResultsTemplate {
            count: batch.count,
            items: batch.results,
        })
        .into_response(),
        Err(Rejection::Duplicate) => Redirect::to("/filters/results").into_response(),
        Err(Rejection::Api(_)) => render(&state, None).await,
    }
}

pub async fn results(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.store.filters.snapshot().await;
    if snapshot.filtered_news.is_empty() {
        return Redirect::to("/filters").into_response();
    }
    HtmlTemplate(FilteredResultsTemplate {
        count: snapshot.filtered_count,
        items: snapshot.filtered_news,
    })
    .into_response()
}

pub async fn clear_results(State(state): State<Arc<AppState>>) -> Response {
    state.store.filters.clear_filtered_news().await;
    Redirect::to("/filters").into_response()
}
