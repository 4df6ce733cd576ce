//! Process-wide UI state.
//!
//! Four containers, one per backend resource group. Every async action runs
//! the same three-phase cycle: `Pending` marks the container loading and
//! clears its error, then either `Fulfilled` merges the payload or `Rejected`
//! stores the error. Rejections never touch item lists.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::api::{ApiClient, ApiError};

pub mod alert_history;
pub mod alerts;
mod error;
pub mod filters;
mod in_flight;
pub mod news;

pub use alert_history::{AlertHistorySlice, AlertHistoryState};
pub use alerts::{AlertsSlice, AlertsState};
pub use error::{ErrorPayload, Rejection};
pub use filters::{FiltersSlice, FiltersState};
pub use in_flight::{InFlight, InFlightGuard};
pub use news::{NewsSlice, NewsState};

/// Lifecycle phase of one async action.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Pending,
    Fulfilled(T),
    Rejected(ErrorPayload),
}

/// Loading flag and last error shared by every container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestStatus {
    pub loading: bool,
    pub error: Option<ErrorPayload>,
}

impl RequestStatus {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn settle(&mut self) {
        self.loading = false;
    }

    pub fn fail(&mut self, error: ErrorPayload) {
        self.loading = false;
        self.error = Some(error);
    }

    pub fn error_text(&self, fallback: &str) -> Option<String> {
        self.error.as_ref().map(|e| e.describe(fallback))
    }
}

/// A container state that folds actions into itself.
pub trait Reducer {
    type Action;

    fn reduce(&mut self, action: Self::Action);
}

/// Run one async action through its pending/fulfilled/rejected phases.
pub(crate) async fn run_action<S, T, Fut>(
    state: &RwLock<S>,
    name: &str,
    wrap: fn(Phase<T>) -> S::Action,
    request: Fut,
    normalize: impl FnOnce(&ApiError) -> ErrorPayload,
) -> Result<T, Rejection>
where
    S: Reducer,
    T: Clone,
    Fut: Future<Output = Result<T, ApiError>>,
{
    state.write().await.reduce(wrap(Phase::Pending));

    match request.await {
        Ok(value) => {
            state
                .write()
                .await
                .reduce(wrap(Phase::Fulfilled(value.clone())));
            Ok(value)
        }
        Err(err) => {
            warn!("Action '{}' rejected: {}", name, err);
            let payload = normalize(&err);
            state
                .write()
                .await
                .reduce(wrap(Phase::Rejected(payload.clone())));
            Err(Rejection::Api(payload))
        }
    }
}

/// De-duplication key for a request carrying `payload`.
pub(crate) fn payload_key<P: Serialize>(name: &str, payload: &P) -> String {
    format!(
        "{}:{}",
        name,
        serde_json::to_string(payload).unwrap_or_default()
    )
}

/// Identity-based list updates shared by the containers.
pub(crate) trait Identified {
    fn id(&self) -> i64;
}

impl Identified for crate::models::Filter {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for crate::models::Alert {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Replace the first item with a matching id; no-op when absent.
pub(crate) fn replace_by_id<T: Identified>(items: &mut [T], updated: T) {
    if let Some(slot) = items.iter_mut().find(|item| item.id() == updated.id()) {
        *slot = updated;
    }
}

pub(crate) fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: i64) {
    items.retain(|item| item.id() != id);
}

/// The whole state tree, shared by every view.
pub struct Store {
    pub news: NewsSlice,
    pub filters: FiltersSlice,
    pub alerts: AlertsSlice,
    pub alert_history: AlertHistorySlice,
}

impl Store {
    pub fn new(api: ApiClient) -> Self {
        let api = Arc::new(api);
        Self {
            news: NewsSlice::new(api.clone()),
            filters: FiltersSlice::new(api.clone()),
            alerts: AlertsSlice::new(api.clone()),
            alert_history: AlertHistorySlice::new(api),
        }
    }
}
