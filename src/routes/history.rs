use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::models::{Alert, AlertHistory};
use crate::routes::{AppState, HtmlTemplate, SelectOption, GENERIC_ERROR};

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub records: Vec<AlertHistory>,
    pub alerts: Vec<SelectOption>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub alert: Option<String>,
}

impl HistoryQuery {
    /// The selected alert; "All Alerts" submits an empty value.
    pub fn alert_id(&self) -> Option<i64> {
        self.alert
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}

fn alert_options(alerts: &[Alert], selected: Option<i64>) -> Vec<SelectOption> {
    let current = selected.map(|id| id.to_string()).unwrap_or_default();
    let mut options = vec![SelectOption::new("", "All Alerts", &current)];
    options.extend(alerts.iter().map(|a| {
        SelectOption::new(
            a.id.to_string(),
            format!("{} - {}", a.email, a.filter_name_display()),
            &current,
        )
    }));
    options
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let selected = query.alert_id();
    let _ = tokio::join!(
        state.store.alerts.fetch_alerts(),
        state.store.alert_history.fetch_alert_history(selected)
    );

    let alerts = state.store.alerts.snapshot().await;
    let history = state.store.alert_history.snapshot().await;
    HtmlTemplate(HistoryTemplate {
        alerts: alert_options(&alerts.items, selected),
        error: history.status.error_text(GENERIC_ERROR),
        records: history.items,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_alerts(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/alerts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "email": "reader@example.com", "filter_criteria": {"id": 1, "name": "Tech"}},
                {"id": 2, "email": "other@example.com"}
            ])))
            .mount(server)
            .await;
    }

    #[test]
    fn test_alert_query_parsing() {
        let parse = |raw: Option<&str>| {
            HistoryQuery {
                alert: raw.map(str::to_string),
            }
            .alert_id()
        };
        assert_eq!(parse(None), None);
        assert_eq!(parse(Some("")), None);
        assert_eq!(parse(Some("abc")), None);
        assert_eq!(parse(Some("3")), Some(3));
    }

    #[test]
    fn test_alert_options() {
        let alerts: Vec<Alert> = serde_json::from_value(json!([
            {"id": 1, "email": "a@example.com", "filter_criteria": {"id": 4, "name": "Tech"}},
            {"id": 2, "email": "b@example.com"}
        ]))
        .unwrap();
        let options = alert_options(&alerts, Some(2));
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["All Alerts", "a@example.com - Tech", "b@example.com - N/A"]);
        assert!(options[2].selected);
        assert!(!options[0].selected);

        assert!(alert_options(&alerts, None)[0].selected);
    }

    #[tokio::test]
    async fn test_history_table() {
        let (app, server) = create_test_app().await;
        mount_alerts(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/alert-history/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "results": [
                    {
                        "id": 10,
                        "alert": {"id": 1, "email": "reader@example.com", "filter_criteria": {"id": 1, "name": "Tech"}},
                        "news_items": [
                            {"id": 1, "title": "A", "url": "https://a.example.com", "source": "A"},
                            {"id": 2, "title": "B", "url": "https://b.example.com", "source": "B"}
                        ],
                        "email_status": "sent",
                        "sent_at": "2024-05-02T08:00:00Z"
                    },
                    {"id": 11, "alert": null, "news_items": [], "email_status": "failed"}
                ]
            })))
            .mount(&server)
            .await;

        let (status, body) = get(&app, "/history").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("All Alerts"));
        assert!(body.contains("reader@example.com - Tech"));
        assert!(body.contains("2024-05-02 08:00:00 UTC"));
        assert!(body.contains("<td>2</td>"));
        assert!(body.contains("badge badge-success\">sent"));
        assert!(body.contains("badge badge-danger\">failed"));
    }

    #[tokio::test]
    async fn test_selected_alert_is_forwarded() {
        let (app, server) = create_test_app().await;
        mount_alerts(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/alert-history/"))
            .and(query_param("alert", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(&app, "/history?alert=1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No alert history found"));
    }

    #[tokio::test]
    async fn test_history_error() {
        let (app, server) = create_test_app().await;
        mount_alerts(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/alert-history/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, body) = get(&app, "/history").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Request failed with status code 500"));
    }
}
