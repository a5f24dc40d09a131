use crate::domain::model::{Day, DayType, WeekDay, YearRecord};
use crate::domain::ports::Source;
use crate::utils::error::{CalendarError, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 從本地 TOML 檔讀取手動調整的日期。
///
/// ```toml
/// [[days]]
/// date = "2022-11-07"
/// type = "holiday"
/// desc = "Extra day off"
/// ```
///
/// 每次呼叫都重新讀檔，管理者可以在執行期間修改檔案。
#[derive(Debug, Clone)]
pub struct OverrideSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    days: Vec<OverrideEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverrideEntry {
    date: String,
    week_day: Option<WeekDay>,
    // 未填寫時為 false，與儲存格式一致
    #[serde(default)]
    working: bool,
    #[serde(rename = "type")]
    day_type: Option<DayType>,
    desc: Option<String>,
}

impl OverrideSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str, year: i32) -> Result<YearRecord> {
        let file: OverrideFile = toml::from_str(content).map_err(|e| {
            CalendarError::source_unavailable(
                self.name(),
                format!("cannot parse {}: {}", self.path.display(), e),
            )
        })?;

        let mut calendar = YearRecord::new();
        for entry in file.days {
            let date = NaiveDate::parse_from_str(entry.date.trim(), "%Y-%m-%d").map_err(|e| {
                CalendarError::source_unavailable(
                    self.name(),
                    format!("invalid date '{}': {}", entry.date, e),
                )
            })?;

            if date.year() != year {
                continue;
            }

            calendar.insert_day(
                date.month(),
                date.day(),
                Day {
                    week_day: entry.week_day,
                    working: entry.working,
                    day_type: entry.day_type,
                    description: entry.desc,
                },
            );
        }

        Ok(calendar)
    }
}

#[async_trait]
impl Source for OverrideSource {
    fn name(&self) -> &str {
        "overrides"
    }

    async fn get_year(&self, year: i32) -> Result<YearRecord> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CalendarError::source_unavailable(
                self.name(),
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?;
        tracing::debug!(
            "Read override file {} ({} bytes)",
            self.path.display(),
            content.len()
        );

        let calendar = self.parse(&content, year)?;
        tracing::debug!("Override file has {} days for {}", calendar.day_count(), year);
        Ok(calendar)
    }
}
