//! Thin typed client for the news alert backend.
//!
//! One method per backend operation. Each returns the decoded body or the
//! failure as-is: no retries, no caching, and no timeout unless configured.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use crate::models::{
    Alert, AlertHistory, AlertInput, DaysWindow, FetchNewsParams, Filter, FilterInput,
    ListResponse, NewsBatch, NewsItem, NewsQuery, ProcessAllResult, TestAlertResult,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connection refused, DNS failure, timeout...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// True when the backend never answered.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent("NewsAlertUI/1.0");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        let text = self.send::<()>(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        let text = self.send(Method::POST, url, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        let text = self.send(Method::PUT, url, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path, &[])?;
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    // News

    pub async fn list_news(&self, query: &NewsQuery) -> Result<ListResponse<NewsItem>, ApiError> {
        self.get("/news/", &query.pairs()).await
    }

    pub async fn fetch_news(&self, params: &FetchNewsParams) -> Result<NewsBatch, ApiError> {
        self.post("/news/fetch/", params).await
    }

    pub async fn get_news_item(&self, id: i64) -> Result<NewsItem, ApiError> {
        self.get(&format!("/news/{}/", id), &[]).await
    }

    // Filters

    pub async fn list_filters(&self) -> Result<ListResponse<Filter>, ApiError> {
        self.get("/filters/", &[]).await
    }

    pub async fn get_filter(&self, id: i64) -> Result<Filter, ApiError> {
        self.get(&format!("/filters/{}/", id), &[]).await
    }

    pub async fn create_filter(&self, input: &FilterInput) -> Result<Filter, ApiError> {
        self.post("/filters/", input).await
    }

    pub async fn update_filter(&self, id: i64, input: &FilterInput) -> Result<Filter, ApiError> {
        self.put(&format!("/filters/{}/", id), input).await
    }

    pub async fn delete_filter(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/filters/{}/", id)).await
    }

    pub async fn apply_filter(&self, id: i64, window: &DaysWindow) -> Result<NewsBatch, ApiError> {
        self.post(&format!("/filters/{}/apply/", id), window).await
    }

    // Alerts

    pub async fn list_alerts(&self) -> Result<ListResponse<Alert>, ApiError> {
        self.get("/alerts/", &[]).await
    }

    pub async fn get_alert(&self, id: i64) -> Result<Alert, ApiError> {
        self.get(&format!("/alerts/{}/", id), &[]).await
    }

    pub async fn create_alert(&self, input: &AlertInput) -> Result<Alert, ApiError> {
        self.post("/alerts/", input).await
    }

    pub async fn update_alert(&self, id: i64, input: &AlertInput) -> Result<Alert, ApiError> {
        self.put(&format!("/alerts/{}/", id), input).await
    }

    pub async fn delete_alert(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/alerts/{}/", id)).await
    }

    pub async fn test_alert(
        &self,
        id: i64,
        window: &DaysWindow,
    ) -> Result<TestAlertResult, ApiError> {
        self.post(&format!("/alerts/{}/test/", id), window).await
    }

    pub async fn process_all_alerts(
        &self,
        window: &DaysWindow,
    ) -> Result<ProcessAllResult, ApiError> {
        self.post("/alerts/process_all/", window).await
    }

    // Alert history

    pub async fn list_alert_history(
        &self,
        alert: Option<i64>,
    ) -> Result<ListResponse<AlertHistory>, ApiError> {
        let query: Vec<(&str, String)> = alert
            .map(|id| vec![("alert", id.to_string())])
            .unwrap_or_default();
        self.get("/alert-history/", &query).await
    }
}
