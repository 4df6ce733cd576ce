use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::api::{ApiClient, ApiError};
use crate::models::{FetchNewsParams, ListResponse, NewsBatch, NewsItem, NewsQuery};
use crate::store::{
    payload_key, run_action, ErrorPayload, InFlight, Phase, Reducer, Rejection, RequestStatus,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsState {
    pub items: Vec<NewsItem>,
    pub status: RequestStatus,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    /// Item opened on the detail page
    pub current: Option<NewsItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewsAction {
    Fetch(Phase<ListResponse<NewsItem>>),
    FetchFromApi(Phase<NewsBatch>),
    FetchItem(Phase<NewsItem>),
    ClearError,
}

impl Reducer for NewsState {
    type Action = NewsAction;

    fn reduce(&mut self, action: NewsAction) {
        match action {
            NewsAction::Fetch(Phase::Fulfilled(list)) => {
                self.status.settle();
                let page = list.into_page();
                self.items = page.items;
                self.count = page.count;
                self.next = page.next;
                self.previous = page.previous;
            }
            NewsAction::FetchFromApi(Phase::Fulfilled(batch)) => {
                self.status.settle();
                self.items = batch.results;
                self.count = batch.count;
            }
            NewsAction::FetchItem(Phase::Pending) => {
                self.status.begin();
                self.current = None;
            }
            NewsAction::FetchItem(Phase::Fulfilled(item)) => {
                self.status.settle();
                self.current = Some(item);
            }
            NewsAction::Fetch(Phase::Pending) | NewsAction::FetchFromApi(Phase::Pending) => {
                self.status.begin()
            }
            NewsAction::Fetch(Phase::Rejected(e))
            | NewsAction::FetchFromApi(Phase::Rejected(e))
            | NewsAction::FetchItem(Phase::Rejected(e)) => self.status.fail(e),
            NewsAction::ClearError => self.status.error = None,
        }
    }
}

/// News errors always carry a `message`; an unreachable backend gets a hint.
pub fn normalize_news_error(err: &ApiError, base_url: &str) -> ErrorPayload {
    if err.is_network() {
        return ErrorPayload::message(format!(
            "Cannot connect to backend server. Please make sure it is running at {}",
            base_url
        ));
    }
    match ErrorPayload::from_api(err) {
        ErrorPayload(Value::String(text)) => ErrorPayload::message(text),
        payload => payload,
    }
}

pub struct NewsSlice {
    api: Arc<ApiClient>,
    state: RwLock<NewsState>,
    in_flight: InFlight,
}

impl NewsSlice {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(NewsState::default()),
            in_flight: InFlight::new(),
        }
    }

    pub async fn snapshot(&self) -> NewsState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: NewsAction) {
        self.state.write().await.reduce(action);
    }

    pub async fn fetch_news(&self, query: NewsQuery) -> Result<ListResponse<NewsItem>, Rejection> {
        let base_url = self.api.base_url();
        run_action(
            &self.state,
            "news/fetchNews",
            NewsAction::Fetch,
            self.api.list_news(&query),
            |err| normalize_news_error(err, base_url),
        )
        .await
    }

    /// Ask the backend to pull fresh articles from the news provider.
    pub async fn fetch_news_from_api(&self, params: FetchNewsParams) -> Result<NewsBatch, Rejection> {
        let _guard = self
            .in_flight
            .begin(payload_key("news/fetch", &params))
            .ok_or(Rejection::Duplicate)?;
        let base_url = self.api.base_url();
        run_action(
            &self.state,
            "news/fetchNewsFromAPI",
            NewsAction::FetchFromApi,
            self.api.fetch_news(&params),
            |err| normalize_news_error(err, base_url),
        )
        .await
    }

    pub async fn fetch_news_item(&self, id: i64) -> Result<NewsItem, Rejection> {
        let base_url = self.api.base_url();
        run_action(
            &self.state,
            "news/fetchNewsItem",
            NewsAction::FetchItem,
            self.api.get_news_item(id),
            |err| normalize_news_error(err, base_url),
        )
        .await
    }

    pub async fn clear_error(&self) {
        self.dispatch(NewsAction::ClearError).await;
    }
}
