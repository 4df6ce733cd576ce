use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::models::{AlertHistory, ListResponse};
use crate::store::{run_action, ErrorPayload, Phase, Reducer, Rejection, RequestStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertHistoryState {
    pub items: Vec<AlertHistory>,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertHistoryAction {
    Fetch(Phase<ListResponse<AlertHistory>>),
    ClearError,
}

impl Reducer for AlertHistoryState {
    type Action = AlertHistoryAction;

    fn reduce(&mut self, action: AlertHistoryAction) {
        match action {
            AlertHistoryAction::Fetch(Phase::Pending) => self.status.begin(),
            AlertHistoryAction::Fetch(Phase::Fulfilled(list)) => {
                self.status.settle();
                self.items = list.into_items();
            }
            AlertHistoryAction::Fetch(Phase::Rejected(e)) => self.status.fail(e),
            AlertHistoryAction::ClearError => self.status.error = None,
        }
    }
}

pub struct AlertHistorySlice {
    api: Arc<ApiClient>,
    state: RwLock<AlertHistoryState>,
}

impl AlertHistorySlice {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(AlertHistoryState::default()),
        }
    }

    pub async fn snapshot(&self) -> AlertHistoryState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: AlertHistoryAction) {
        self.state.write().await.reduce(action);
    }

    /// Load history, optionally only the records of one alert.
    pub async fn fetch_alert_history(
        &self,
        alert: Option<i64>,
    ) -> Result<ListResponse<AlertHistory>, Rejection> {
        run_action(
            &self.state,
            "alertHistory/fetchAlertHistory",
            AlertHistoryAction::Fetch,
            self.api.list_alert_history(alert),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn clear_error(&self) {
        self.dispatch(AlertHistoryAction::ClearError).await;
    }
}
