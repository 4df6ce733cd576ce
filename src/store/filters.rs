use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::models::{DaysWindow, Filter, FilterInput, ListResponse, NewsBatch, NewsItem};
use crate::store::{
    payload_key, remove_by_id, replace_by_id, run_action, ErrorPayload, InFlight, Phase,
    Reducer, Rejection, RequestStatus,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltersState {
    pub items: Vec<Filter>,
    pub status: RequestStatus,
    /// Cached results of the last applied filter
    pub filtered_news: Vec<NewsItem>,
    pub filtered_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FiltersAction {
    Fetch(Phase<ListResponse<Filter>>),
    Create(Phase<Filter>),
    Update(Phase<Filter>),
    Delete(Phase<i64>),
    Apply(Phase<NewsBatch>),
    ClearError,
    ClearFilteredNews,
}

impl Reducer for FiltersState {
    type Action = FiltersAction;

    fn reduce(&mut self, action: FiltersAction) {
        match action {
            FiltersAction::Fetch(Phase::Fulfilled(list)) => {
                self.status.settle();
                self.items = list.into_items();
            }
            FiltersAction::Create(Phase::Fulfilled(filter)) => {
                self.status.settle();
                self.items.push(filter);
            }
            FiltersAction::Update(Phase::Fulfilled(filter)) => {
                self.status.settle();
                replace_by_id(&mut self.items, filter);
            }
            FiltersAction::Delete(Phase::Fulfilled(id)) => {
                self.status.settle();
                remove_by_id(&mut self.items, id);
            }
            FiltersAction::Apply(Phase::Fulfilled(batch)) => {
                self.status.settle();
                self.filtered_news = batch.results;
                self.filtered_count = batch.count;
            }
            FiltersAction::Fetch(Phase::Pending)
            | FiltersAction::Create(Phase::Pending)
            | FiltersAction::Update(Phase::Pending)
            | FiltersAction::Delete(Phase::Pending)
            | FiltersAction::Apply(Phase::Pending) => self.status.begin(),
            FiltersAction::Fetch(Phase::Rejected(e))
            | FiltersAction::Create(Phase::Rejected(e))
            | FiltersAction::Update(Phase::Rejected(e))
            | FiltersAction::Delete(Phase::Rejected(e))
            | FiltersAction::Apply(Phase::Rejected(e)) => self.status.fail(e),
            FiltersAction::ClearError => self.status.error = None,
            FiltersAction::ClearFilteredNews => {
                self.filtered_news.clear();
                self.filtered_count = 0;
            }
        }
    }
}

pub struct FiltersSlice {
    api: Arc<ApiClient>,
    state: RwLock<FiltersState>,
    in_flight: InFlight,
}

impl FiltersSlice {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(FiltersState::default()),
            in_flight: InFlight::new(),
        }
    }

    pub async fn snapshot(&self) -> FiltersState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: FiltersAction) {
        self.state.write().await.reduce(action);
    }

    pub async fn fetch_filters(&self) -> Result<ListResponse<Filter>, Rejection> {
        run_action(
            &self.state,
            "filters/fetchFilters",
            FiltersAction::Fetch,
            self.api.list_filters(),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn create_filter(&self, input: FilterInput) -> Result<Filter, Rejection> {
        let _guard = self
            .in_flight
            .begin(payload_key("filters/create", &input))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "filters/createFilter",
            FiltersAction::Create,
            self.api.create_filter(&input),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn update_filter(&self, id: i64, input: FilterInput) -> Result<Filter, Rejection> {
        let _guard = self
            .in_flight
            .begin(payload_key(&format!("filters/update/{}", id), &input))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "filters/updateFilter",
            FiltersAction::Update,
            self.api.update_filter(id, &input),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn delete_filter(&self, id: i64) -> Result<i64, Rejection> {
        let _guard = self
            .in_flight
            .begin(format!("filters/delete:{}", id))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "filters/deleteFilter",
            FiltersAction::Delete,
            async { self.api.delete_filter(id).await.map(|_| id) },
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn apply_filter(&self, id: i64, window: DaysWindow) -> Result<NewsBatch, Rejection> {
        let _guard = self
            .in_flight
            .begin(format!("filters/apply:{}", id))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "filters/applyFilter",
            FiltersAction::Apply,
            self.api.apply_filter(id, &window),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn clear_error(&self) {
        self.dispatch(FiltersAction::ClearError).await;
    }

    pub async fn clear_filtered_news(&self) {
        self.dispatch(FiltersAction::ClearFilteredNews).await;
    }
}
