use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::models::{
    Alert, AlertInput, DaysWindow, Filter, Frequency, ProcessAllResult, TestAlertResult,
};
use crate::routes::{checkbox, AppState, DraftError, HtmlTemplate, SelectOption, GENERIC_ERROR};
use crate::store::Rejection;

#[derive(Template)]
#[template(path = "alerts.html")]
pub struct AlertsTemplate {
    pub alerts: Vec<Alert>,
    pub error: Option<String>,
    /// Failure loading the filter choices for the form
    pub filters_error: Option<String>,
    pub test_result: Option<TestAlertResult>,
    pub process_result: Option<ProcessAllResult>,
    pub form: Option<AlertForm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Edit(i64),
}

/// Create/edit modal contents.
pub struct AlertForm {
    pub action: String,
    pub title: &'static str,
    pub submit_label: &'static str,
    pub email: String,
    pub filters: Vec<SelectOption>,
    pub frequencies: Vec<SelectOption>,
    pub is_active: bool,
    pub error: Option<String>,
}

impl AlertForm {
    fn new(
        target: FormTarget,
        draft: &AlertDraft,
        filters: &[Filter],
        error: Option<String>,
    ) -> Self {
        let (action, title, submit_label) = match target {
            FormTarget::Create => ("/alerts".to_string(), "Create Alert", "Create"),
            FormTarget::Edit(id) => (format!("/alerts/{}", id), "Edit Alert", "Update"),
        };

        let current_filter = draft.filter_criteria_id.trim();
        let mut filter_options = vec![SelectOption::new("", "Select a filter", current_filter)];
        filter_options.extend(
            filters
                .iter()
                .map(|f| SelectOption::new(f.id.to_string(), f.name.clone(), current_filter)),
        );

        Self {
            action,
            title,
            submit_label,
            email: draft.email.clone(),
            filters: filter_options,
            frequencies: Frequency::ALL
                .iter()
                .map(|f| SelectOption::new(f.as_str(), f.label(), draft.frequency.as_str()))
                .collect(),
            is_active: draft.is_checked(),
            error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlertDraft {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub filter_criteria_id: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl AlertDraft {
    pub fn blank() -> Self {
        Self {
            is_active: Some("on".to_string()),
            ..Default::default()
        }
    }

    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            email: alert.email.clone(),
            filter_criteria_id: alert
                .filter_criteria
                .as_ref()
                .map(|f| f.id.to_string())
                .unwrap_or_default(),
            frequency: alert.frequency,
            is_active: alert.is_active.then(|| "on".to_string()),
        }
    }

    pub fn is_checked(&self) -> bool {
        checkbox(&self.is_active)
    }

    pub fn to_input(&self) -> Result<AlertInput, DraftError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(DraftError::Missing("Email address"));
        }
        let filter = self.filter_criteria_id.trim();
        if filter.is_empty() {
            return Err(DraftError::Missing("Filter"));
        }
        let filter_criteria_id = filter
            .parse::<i64>()
            .map_err(|_| DraftError::NotANumber("Filter"))?;

        Ok(AlertInput {
            email: email.to_string(),
            filter_criteria_id,
            frequency: self.frequency,
            is_active: self.is_checked(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ModalQuery {
    pub modal: Option<String>,
    pub edit: Option<i64>,
}

type OpenForm = (FormTarget, AlertDraft, Option<String>);

async fn render(state: &AppState, open: Option<OpenForm>) -> Response {
    let alerts = state.store.alerts.snapshot().await;
    let filters = state.store.filters.snapshot().await;
    let form = open
        .map(|(target, draft, error)| AlertForm::new(target, &draft, &filters.items, error));

    HtmlTemplate(AlertsTemplate {
        error: alerts.status.error_text(GENERIC_ERROR),
        filters_error: filters.status.error_text(GENERIC_ERROR),
        alerts: alerts.items,
        test_result: alerts.test_result,
        process_result: alerts.process_result,
        form,
    })
    .into_response()
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModalQuery>,
) -> Response {
    let _ = tokio::join!(
        state.store.alerts.fetch_alerts(),
        state.store.filters.fetch_filters()
    );

    let open = match query.edit {
        Some(id) => state
            .store
            .alerts
            .snapshot()
            .await
            .items
            .iter()
            .find(|a| a.id == id)
            .map(|a| (FormTarget::Edit(id), AlertDraft::from_alert(a), None)),
        None if query.modal.as_deref() == Some("create") => {
            Some((FormTarget::Create, AlertDraft::blank(), None))
        }
        None => None,
    };
    render(&state, open).await
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(draft): Form<AlertDraft>,
) -> Response {
    submit(&state, FormTarget::Create, draft).await
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(draft): Form<AlertDraft>,
) -> Response {
    submit(&state, FormTarget::Edit(id), draft).await
}

async fn submit(state: &AppState, target: FormTarget, draft: AlertDraft) -> Response {
    let input = match draft.to_input() {
        Ok(input) => input,
        Err(e) => return render(state, Some((target, draft, Some(e.to_string())))).await,
    };
    let result = match target {
        FormTarget::Create => state.store.alerts.create_alert(input).await,
        FormTarget::Edit(id) => state.store.alerts.update_alert(id, input).await,
    };
    match result {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/alerts").into_response(),
        Err(Rejection::Api(_)) => render(state, Some((target, draft, None))).await,
    }
}

pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.store.alerts.delete_alert(id).await {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/alerts").into_response(),
        Err(Rejection::Api(_)) => render(&state, None).await,
    }
}

pub async fn test(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    let window = DaysWindow {
        days: state.actions.test_days,
    };
    match state.store.alerts.test_alert(id, window).await {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/alerts").into_response(),
        Err(Rejection::Api(_)) => render(&state, None).await,
    }
}

pub async fn process_all(State(state): State<Arc<AppState>>) -> Response {
    let window = DaysWindow {
        days: state.actions.process_days,
    };
    match state.store.alerts.process_all_alerts(window).await {
        Ok(_) | Err(Rejection::Duplicate) => Redirect::to("/alerts").into_response(),
        Err(Rejection::Api(_)) => render(&state, None).await,
    }
}

pub async fn clear_test_result(State(state): State<Arc<AppState>>) -> Response {
    state.store.alerts.clear_test_result().await;
    Redirect::to("/alerts").into_response()
}

pub async fn clear_process_result(State(state): State<Arc<AppState>>) -> Response {
    state.store.alerts.clear_process_result().await;
    Redirect::to("/alerts").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alert_json(id: i64, email: &str) -> serde_json::Value {
        json!({
            "id": id,
            "email": email,
            "filter_criteria": {"id": 1, "name": "Tech"},
            "frequency": "hourly",
            "is_active": true,
            "last_sent": null
        })
    }

    async fn mount_lists(server: &MockServer, alerts: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/alerts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(alerts))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/filters/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Tech"},
                {"id": 2, "name": "Markets"}
            ])))
            .mount(server)
            .await;
    }

    mod draft_tests {
        use super::*;

        #[test]
        fn test_form_to_input() {
            let draft: AlertDraft = serde_urlencoded::from_str(
                "email=me%40example.com&filter_criteria_id=2&frequency=immediate&is_active=on",
            )
            .unwrap();
            let input = draft.to_input().unwrap();
            assert_eq!(input.email, "me@example.com");
            assert_eq!(input.filter_criteria_id, 2);
            assert_eq!(input.frequency, Frequency::Immediate);
            assert!(input.is_active);
        }

        #[test]
        fn test_frequency_defaults_to_daily() {
            let draft: AlertDraft =
                serde_urlencoded::from_str("email=a%40b.c&filter_criteria_id=1").unwrap();
            let input = draft.to_input().unwrap();
            assert_eq!(input.frequency, Frequency::Daily);
            assert!(!input.is_active);
        }

        #[test]
        fn test_required_fields() {
            let no_email: AlertDraft = serde_urlencoded::from_str("filter_criteria_id=1").unwrap();
            assert_eq!(no_email.to_input(), Err(DraftError::Missing("Email address")));

            let no_filter: AlertDraft = serde_urlencoded::from_str("email=a%40b.c").unwrap();
            assert_eq!(no_filter.to_input(), Err(DraftError::Missing("Filter")));

            let bad_filter: AlertDraft =
                serde_urlencoded::from_str("email=a%40b.c&filter_criteria_id=abc").unwrap();
            assert_eq!(bad_filter.to_input(), Err(DraftError::NotANumber("Filter")));
        }

        #[test]
        fn test_from_alert() {
            let alert: Alert = serde_json::from_value(alert_json(5, "x@example.com")).unwrap();
            let draft = AlertDraft::from_alert(&alert);
            assert_eq!(draft.filter_criteria_id, "1");
            assert_eq!(draft.frequency, Frequency::Hourly);
            assert!(draft.is_checked());
        }

        #[test]
        fn test_form_marks_selected_options() {
            let filters: Vec<Filter> = serde_json::from_value(json!([
                {"id": 1, "name": "Tech"},
                {"id": 2, "name": "Markets"}
            ]))
            .unwrap();
            let draft = AlertDraft {
                filter_criteria_id: "2".to_string(),
                frequency: Frequency::Hourly,
                ..AlertDraft::blank()
            };
            let form = AlertForm::new(FormTarget::Edit(9), &draft, &filters, None);
            assert_eq!(form.title, "Edit Alert");
            assert_eq!(form.filters.len(), 3);
            let selected: Vec<_> = form.filters.iter().filter(|o| o.selected).collect();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].label, "Markets");
            assert!(form.frequencies.iter().any(|o| o.selected && o.value == "hourly"));
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_index_lists_alerts() {
            let (app, server) = create_test_app().await;
            mount_lists(
                &server,
                json!([
                    alert_json(1, "reader@example.com"),
                    {"id": 2, "email": "orphan@example.com", "filter_criteria": null, "frequency": "daily", "is_active": false}
                ]),
            )
            .await;

            let (status, body) = get(&app, "/alerts").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("reader@example.com"));
            assert!(body.contains("N/A"));
            assert!(body.contains("Never"));
            assert!(body.contains("Hourly"));
            assert!(body.contains("Inactive"));
            assert!(body.contains("Are you sure you want to delete this alert?"));
        }

        #[tokio::test]
        async fn test_create_modal_lists_filters() {
            let (app, server) = create_test_app().await;
            mount_lists(&server, json!([])).await;

            let (_, body) = get(&app, "/alerts?modal=create").await;
            assert!(body.contains("Create Alert"));
            assert!(body.contains("Select a filter"));
            assert!(body.contains("Markets"));
        }

        #[tokio::test]
        async fn test_filter_load_failure_is_shown() {
            let (app, server) = create_test_app().await;
            Mock::given(method("GET"))
                .and(path("/api/alerts/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/api/filters/"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let (status, body) = get(&app, "/alerts?modal=create").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("Failed to load filters:"));
            assert!(body.contains("Request failed with status code 500"));
            assert!(body.contains("Create Alert"));
        }

        #[tokio::test]
        async fn test_create_posts_input() {
            let (app, server) = create_test_app().await;
            Mock::given(method("POST"))
                .and(path("/api/alerts/"))
                .and(body_json(json!({
                    "email": "me@example.com",
                    "filter_criteria_id": 1,
                    "frequency": "daily",
                    "is_active": true
                })))
                .respond_with(
                    ResponseTemplate::new(201).set_body_json(alert_json(3, "me@example.com")),
                )
                .expect(1)
                .mount(&server)
                .await;

            let (status, _) = post_form(
                &app,
                "/alerts",
                "email=me%40example.com&filter_criteria_id=1&frequency=daily&is_active=on",
            )
            .await;
            assert_eq!(status, StatusCode::SEE_OTHER);
        }

        #[tokio::test]
        async fn test_missing_filter_reopens_form() {
            let (app, _server) = create_test_app().await;
            let (status, body) = post_form(&app, "/alerts", "email=me%40example.com").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("Filter is required"));
            assert!(body.contains("Create Alert"));
        }

        #[tokio::test]
        async fn test_validation_errors_from_backend() {
            let (app, server) = create_test_app().await;
            Mock::given(method("POST"))
                .and(path("/api/alerts/"))
                .respond_with(
                    ResponseTemplate::new(400)
                        .set_body_json(json!({"email": ["Enter a valid email address."]})),
                )
                .mount(&server)
                .await;

            let (status, body) =
                post_form(&app, "/alerts", "email=nope&filter_criteria_id=1&frequency=daily").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("Enter a valid email address."));
        }

        #[tokio::test]
        async fn test_test_alert_banner() {
            let (app, server) = create_test_app().await;
            mount_lists(&server, json!([alert_json(1, "reader@example.com")])).await;
            Mock::given(method("POST"))
                .and(path("/api/alerts/1/test/"))
                .and(body_json(json!({"days": 7})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "message": "Test email sent successfully",
                    "count": 4
                })))
                .expect(1)
                .mount(&server)
                .await;

            let (status, _) = post_empty(&app, "/alerts/1/test").await;
            assert_eq!(status, StatusCode::SEE_OTHER);

            let (_, body) = get(&app, "/alerts").await;
            assert!(body.contains("Test email sent successfully"));
            assert!(body.contains("(4 items)"));
            assert!(body.contains("alert-banner success"));

            post_empty(&app, "/alerts/test-result/clear").await;
            let (_, body) = get(&app, "/alerts").await;
            assert!(!body.contains("Test email sent successfully"));
        }

        #[tokio::test]
        async fn test_failed_test_banner_without_count() {
            let (app, server) = create_test_app().await;
            mount_lists(&server, json!([alert_json(1, "reader@example.com")])).await;
            Mock::given(method("POST"))
                .and(path("/api/alerts/1/test/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "message": "No matching news found",
                    "count": 0
                })))
                .mount(&server)
                .await;

            post_empty(&app, "/alerts/1/test").await;
            let (_, body) = get(&app, "/alerts").await;
            assert!(body.contains("No matching news found"));
            assert!(body.contains("alert-banner error"));
            assert!(!body.contains("items)"));
        }

        #[tokio::test]
        async fn test_process_all_summary() {
            let (app, server) = create_test_app().await;
            mount_lists(&server, json!([])).await;
            Mock::given(method("POST"))
                .and(path("/api/alerts/process_all/"))
                .and(body_json(json!({"days": 1})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "processed": 2,
                    "results": [
                        {"alert_id": 1, "email": "a@example.com", "status": "sent", "count": 3},
                        {"alert_id": 2, "email": "b@example.com", "status": "skipped", "reason": "No new items"}
                    ]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let (status, _) = post_empty(&app, "/alerts/process_all").await;
            assert_eq!(status, StatusCode::SEE_OTHER);

            let (_, body) = get(&app, "/alerts").await;
            assert!(body.contains("Processed 2 alerts"));
            assert!(body.contains("3 items"));
            assert!(body.contains("No new items"));

            post_empty(&app, "/alerts/process-result/clear").await;
            let (_, body) = get(&app, "/alerts").await;
            assert!(!body.contains("Processed 2 alerts"));
        }

        #[tokio::test]
        async fn test_delete_failure_is_shown() {
            let (app, server) = create_test_app().await;
            Mock::given(method("DELETE"))
                .and(path("/api/alerts/7/"))
                .respond_with(
                    ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})),
                )
                .mount(&server)
                .await;

            let (status, body) = post_empty(&app, "/alerts/7/delete").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("Not found."));
        }
    }
}
