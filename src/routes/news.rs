use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::models::{FetchNewsParams, NewsItem, NewsQuery};
use crate::routes::{AppState, HtmlTemplate, SelectOption};
use crate::store::{NewsState, Rejection};

const NEWS_ERROR: &str = "Failed to load news. Please check if the backend server is running.";
const MAX_PAGE_SIZE: u32 = 100;

const CATEGORIES: [(&str, &str); 8] = [
    ("", "None"),
    ("business", "Business"),
    ("entertainment", "Entertainment"),
    ("general", "General"),
    ("health", "Health"),
    ("science", "Science"),
    ("sports", "Sports"),
    ("technology", "Technology"),
];

#[derive(Template)]
#[template(path = "news.html")]
pub struct NewsTemplate {
    pub items: Vec<NewsItem>,
    pub error: Option<String>,
    pub fetch_form: Option<FetchForm>,
}

impl NewsTemplate {
    fn new(state: NewsState, fetch_form: Option<FetchForm>) -> Self {
        Self {
            error: state.status.error_text(NEWS_ERROR),
            items: state.items,
            fetch_form,
        }
    }
}

#[derive(Template)]
#[template(path = "news_detail.html")]
pub struct NewsDetailTemplate {
    pub item: Option<NewsItem>,
    pub error: Option<String>,
}

/// The "Fetch Latest News" modal.
pub struct FetchForm {
    pub categories: Vec<SelectOption>,
    pub query: String,
    pub page_size: String,
}

impl FetchForm {
    fn new(draft: &FetchDraft) -> Self {
        Self {
            categories: CATEGORIES
                .iter()
                .map(|(value, label)| SelectOption::new(*value, *label, &draft.category))
                .collect(),
            query: draft.query.clone(),
            page_size: draft.page_size.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchDraft {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub page_size: String,
}

impl FetchDraft {
    fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: page_size.to_string(),
            ..Default::default()
        }
    }

    /// Blank fields are omitted; an unusable page size falls back to the default.
    pub fn to_params(&self, default_page_size: u32) -> FetchNewsParams {
        let page_size = self
            .page_size
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .unwrap_or(default_page_size)
            .clamp(1, MAX_PAGE_SIZE);

        FetchNewsParams {
            category: non_blank(&self.category),
            query: non_blank(&self.query),
            page_size,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsPageQuery {
    pub modal: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub keywords: Option<String>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsPageQuery>,
) -> Response {
    let news_query = NewsQuery {
        source: query.source,
        category: query.category,
        keywords: query.keywords,
    };
    let _ = state.store.news.fetch_news(news_query).await;

    let fetch_form = (query.modal.as_deref() == Some("fetch")).then(|| {
        FetchForm::new(&FetchDraft::with_page_size(state.actions.fetch_page_size))
    });
    let snapshot = state.store.news.snapshot().await;
    HtmlTemplate(NewsTemplate::new(snapshot, fetch_form)).into_response()
}

pub async fn fetch_from_provider(
    State(state): State<Arc<AppState>>,
    Form(draft): Form<FetchDraft>,
) -> Response {
    let params = draft.to_params(state.actions.fetch_page_size);
    match state.store.news.fetch_news_from_api(params).await {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/").into_response(),
        Err(Rejection::Api(_)) => {
            let snapshot = state.store.news.snapshot().await;
            HtmlTemplate(NewsTemplate::new(snapshot, Some(FetchForm::new(&draft)))).into_response()
        }
    }
}

/// Shows the item this request fetched.
pub async fn detail(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    let template = match state.store.news.fetch_news_item(id).await {
        Ok(item) => NewsDetailTemplate {
            item: Some(item),
            error: None,
        },
        Err(Rejection::Api(payload)) => NewsDetailTemplate {
            item: None,
            error: Some(payload.describe(NEWS_ERROR)),
        },
        Err(Rejection::Duplicate) => NewsDetailTemplate {
            item: None,
            error: Some(NEWS_ERROR.to_string()),
        },
    };
    HtmlTemplate(template).into_response()
}
