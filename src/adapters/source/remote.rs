use crate::domain::model::YearRecord;
use crate::domain::ports::Source;
use crate::utils::error::{CalendarError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("business-calendar/", env!("CARGO_PKG_VERSION"));

/// 透過 HTTP 取得 JSON 格式的年度日曆（與本系統儲存的格式相同）。
/// `endpoint` 中的 `{year}` 會被替換為請求的年份。
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Client,
    endpoint: String,
}

impl RemoteSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn url_for(&self, year: i32) -> String {
        self.endpoint.replace("{year}", &year.to_string())
    }
}

#[async_trait]
impl Source for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn get_year(&self, year: i32) -> Result<YearRecord> {
        let url = self.url_for(year);
        tracing::debug!("Requesting remote calendar: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CalendarError::source_unavailable(self.name(), format!("GET {}: {}", url, e)))?;

        let status = response.status();
        tracing::debug!("Remote calendar response status: {}", status);
        if !status.is_success() {
            return Err(CalendarError::source_unavailable(
                self.name(),
                format!("GET {} returned {}", url, status),
            ));
        }

        let calendar: YearRecord = response.json().await.map_err(|e| {
            CalendarError::source_unavailable(self.name(), format!("invalid calendar body: {}", e))
        })?;

        let invalid = calendar.invalid_dates(year);
        if !invalid.is_empty() {
            return Err(CalendarError::source_unavailable(
                self.name(),
                format!("calendar for {} has impossible dates (month, day): {:?}", year, invalid),
            ));
        }

        if calendar.len() != 12 {
            tracing::warn!(
                "Remote calendar for {} is incomplete: expected 12 months, found {}",
                year,
                calendar.len()
            );
        }

        Ok(calendar)
    }
}
