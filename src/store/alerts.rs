use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::models::{
    Alert, AlertInput, DaysWindow, ListResponse, ProcessAllResult, TestAlertResult,
};
use crate::store::{
    payload_key, remove_by_id, replace_by_id, run_action, ErrorPayload, InFlight, Phase,
    Reducer, Rejection, RequestStatus,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertsState {
    pub items: Vec<Alert>,
    pub status: RequestStatus,
    pub test_result: Option<TestAlertResult>,
    pub process_result: Option<ProcessAllResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertsAction {
    Fetch(Phase<ListResponse<Alert>>),
    Create(Phase<Alert>),
    Update(Phase<Alert>),
    Delete(Phase<i64>),
    Test(Phase<TestAlertResult>),
    ProcessAll(Phase<ProcessAllResult>),
    ClearError,
    ClearTestResult,
    ClearProcessResult,
}

impl Reducer for AlertsState {
    type Action = AlertsAction;

    fn reduce(&mut self, action: AlertsAction) {
        match action {
            AlertsAction::Fetch(Phase::Fulfilled(list)) => {
                self.status.settle();
                self.items = list.into_items();
            }
            AlertsAction::Create(Phase::Fulfilled(alert)) => {
                self.status.settle();
                self.items.push(alert);
            }
            AlertsAction::Update(Phase::Fulfilled(alert)) => {
                self.status.settle();
                replace_by_id(&mut self.items, alert);
            }
            AlertsAction::Delete(Phase::Fulfilled(id)) => {
                self.status.settle();
                remove_by_id(&mut self.items, id);
            }
            AlertsAction::Test(Phase::Fulfilled(result)) => {
                self.status.settle();
                self.test_result = Some(result);
            }
            AlertsAction::ProcessAll(Phase::Fulfilled(result)) => {
                self.status.settle();
                self.process_result = Some(result);
            }
            AlertsAction::Fetch(Phase::Pending)
            | AlertsAction::Create(Phase::Pending)
            | AlertsAction::Update(Phase::Pending)
            | AlertsAction::Delete(Phase::Pending)
            | AlertsAction::Test(Phase::Pending)
            | AlertsAction::ProcessAll(Phase::Pending) => self.status.begin(),
            AlertsAction::Fetch(Phase::Rejected(e))
            | AlertsAction::Create(Phase::Rejected(e))
            | AlertsAction::Update(Phase::Rejected(e))
            | AlertsAction::Delete(Phase::Rejected(e))
            | AlertsAction::Test(Phase::Rejected(e))
            | AlertsAction::ProcessAll(Phase::Rejected(e)) => self.status.fail(e),
            AlertsAction::ClearError => self.status.error = None,
            AlertsAction::ClearTestResult => self.test_result = None,
            AlertsAction::ClearProcessResult => self.process_result = None,
        }
    }
}

pub struct AlertsSlice {
    api: Arc<ApiClient>,
    state: RwLock<AlertsState>,
    in_flight: InFlight,
}

impl AlertsSlice {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(AlertsState::default()),
            in_flight: InFlight::new(),
        }
    }

    pub async fn snapshot(&self) -> AlertsState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: AlertsAction) {
        self.state.write().await.reduce(action);
    }

    pub async fn fetch_alerts(&self) -> Result<ListResponse<Alert>, Rejection> {
        run_action(
            &self.state,
            "alerts/fetchAlerts",
            AlertsAction::Fetch,
            self.api.list_alerts(),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn create_alert(&self, input: AlertInput) -> Result<Alert, Rejection> {
        let _guard = self
            .in_flight
            .begin(payload_key("alerts/create", &input))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "alerts/createAlert",
            AlertsAction::Create,
            self.api.create_alert(&input),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn update_alert(&self, id: i64, input: AlertInput) -> Result<Alert, Rejection> {
        let _guard = self
            .in_flight
            .begin(payload_key(&format!("alerts/update/{}", id), &input))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "alerts/updateAlert",
            AlertsAction::Update,
            self.api.update_alert(id, &input),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn delete_alert(&self, id: i64) -> Result<i64, Rejection> {
        let _guard = self
            .in_flight
            .begin(format!("alerts/delete:{}", id))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "alerts/deleteAlert",
            AlertsAction::Delete,
            async { self.api.delete_alert(id).await.map(|_| id) },
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn test_alert(
        &self,
        id: i64,
        window: DaysWindow,
    ) -> Result<TestAlertResult, Rejection> {
        let _guard = self
            .in_flight
            .begin(format!("alerts/test:{}", id))
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "alerts/testAlert",
            AlertsAction::Test,
            self.api.test_alert(id, &window),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn process_all_alerts(
        &self,
        window: DaysWindow,
    ) -> Result<ProcessAllResult, Rejection> {
        let _guard = self
            .in_flight
            .begin("alerts/process_all")
            .ok_or(Rejection::Duplicate)?;
        run_action(
            &self.state,
            "alerts/processAllAlerts",
            AlertsAction::ProcessAll,
            self.api.process_all_alerts(&window),
            ErrorPayload::from_api,
        )
        .await
    }

    pub async fn clear_error(&self) {
        self.dispatch(AlertsAction::ClearError).await;
    }

    pub async fn clear_test_result(&self) {
        self.dispatch(AlertsAction::ClearTestResult).await;
    }

    pub async fn clear_process_result(&self) {
        self.dispatch(AlertsAction::ClearProcessResult).await;
    }
}
