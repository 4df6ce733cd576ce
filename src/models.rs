//! Data transfer objects exchanged with the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SUMMARY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    /// Description cut to the card length, with an ellipsis when truncated.
    pub fn summary(&self) -> Option<String> {
        let description = self.description.as_deref().filter(|d| !d.is_empty())?;
        if description.chars().count() > SUMMARY_CHARS {
            let cut: String = description.chars().take(SUMMARY_CHARS).collect();
            Some(format!("{}...", cut))
        } else {
            Some(description.to_string())
        }
    }

    pub fn published_display(&self) -> String {
        format_timestamp(self.published_at.as_ref()).unwrap_or_default()
    }

    pub fn author_display(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.is_empty())
    }

    pub fn image_display(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Filter {
    pub fn sources_display(&self) -> String {
        join_or_all(&self.sources)
    }

    pub fn categories_display(&self) -> String {
        join_or_all(&self.categories)
    }
}

fn join_or_all(values: &[String]) -> String {
    if values.is_empty() {
        "All".to_string()
    } else {
        values.join(", ")
    }
}

/// Body of filter create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterInput {
    pub name: String,
    pub keywords: Vec<String>,
    pub sources: Vec<String>,
    pub categories: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Immediate,
    Hourly,
    #[default]
    Daily,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Immediate, Frequency::Hourly, Frequency::Daily];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Immediate => "immediate",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Immediate => "Immediate",
            Frequency::Hourly => "Hourly",
            Frequency::Daily => "Daily",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub filter_criteria: Option<Filter>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_sent: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn filter_name(&self) -> Option<&str> {
        self.filter_criteria
            .as_ref()
            .map(|f| f.name.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn filter_name_display(&self) -> &str {
        self.filter_name().unwrap_or("N/A")
    }

    pub fn last_sent_display(&self) -> String {
        format_timestamp(self.last_sent.as_ref()).unwrap_or_else(|| "Never".to_string())
    }
}

/// Body of alert create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertInput {
    pub email: String,
    pub filter_criteria_id: i64,
    pub frequency: Frequency,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    #[default]
    Sent,
    Failed,
    #[serde(other)]
    Unknown,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
            EmailStatus::Unknown => "unknown",
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, EmailStatus::Sent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertHistory {
    pub id: i64,
    #[serde(default)]
    pub alert: Option<Alert>,
    #[serde(default)]
    pub news_items: Vec<NewsItem>,
    #[serde(default)]
    pub email_status: EmailStatus,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

impl AlertHistory {
    pub fn email_display(&self) -> &str {
        self.alert.as_ref().map(|a| a.email.as_str()).unwrap_or("N/A")
    }

    pub fn filter_display(&self) -> &str {
        self.alert
            .as_ref()
            .and_then(|a| a.filter_name())
            .unwrap_or("N/A")
    }

    pub fn sent_at_display(&self) -> String {
        format_timestamp(self.sent_at.as_ref()).unwrap_or_default()
    }
}

/// A list endpoint body: either a bare array or a paginated envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
}

/// Items plus whatever pagination metadata the response carried.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl<T> ListResponse<T> {
    pub fn into_page(self) -> ListPage<T> {
        match self {
            ListResponse::Bare(items) => ListPage {
                count: items.len() as u64,
                items,
                next: None,
                previous: None,
            },
            ListResponse::Paginated {
                results,
                count,
                next,
                previous,
            } => ListPage {
                count: count
                    .filter(|c| *c > 0)
                    .unwrap_or(results.len() as u64),
                items: results,
                next,
                previous,
            },
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.into_page().items
    }
}

/// Query string accepted by the news list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl NewsQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (key, value) in [
            ("source", &self.source),
            ("category", &self.category),
            ("keywords", &self.keywords),
        ] {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        pairs
    }
}

/// Body of the "fetch from provider" action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchNewsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub page_size: u32,
}

/// Look-back window for filter application, alert tests and processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaysWindow {
    pub days: u32,
}

/// Response of the fetch-from-provider and apply-filter actions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsBatch {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<NewsItem>,
    #[serde(default)]
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestAlertResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub count: u64,
}

impl TestAlertResult {
    pub fn is_success(&self) -> bool {
        self.message.contains("success")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessOutcome {
    pub alert_id: i64,
    #[serde(default)]
    pub email: String,
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl ProcessOutcome {
    pub fn detail(&self) -> String {
        match (&self.reason, self.count) {
            (Some(reason), _) => reason.clone(),
            (None, Some(count)) => format!("{} items", count),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessAllResult {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub results: Vec<ProcessOutcome>,
}

pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> Option<String> {
    timestamp.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}
