use crate::core::TriggerTime;
use crate::domain::model::WeekDay;
use crate::utils::error::{CalendarError, Result};
use crate::utils::validation::{self, Validate};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = "./calendar-data";
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_REMOTE_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// hh:mm[:ss]，本地時間。未設定則不自動同步
    pub sync_at: Option<String>,
    /// 啟動時同步的年份：數字、current、next 或 none
    pub sync_on_start: Option<Vec<String>>,
    pub shutdown_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "file" (預設) 或 "memory"
    pub engine: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub generic: Option<GenericSourceConfig>,
    pub remote: Option<RemoteSourceConfig>,
    pub overrides: Option<OverridesSourceConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenericSourceConfig {
    pub weekend: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSourceConfig {
    /// 可包含 {year} 佔位符
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverridesSourceConfig {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEngine {
    Memory,
    File,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalendarError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| CalendarError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${CALENDAR_DATA_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| CalendarError::config(format!("invalid env pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.trigger_time()?;
        self.sync_on_start_years(2000)?;
        self.store_engine()?;
        self.weekend()?;

        if let Some(seconds) = self.schedule.shutdown_timeout_seconds {
            validation::validate_range("schedule.shutdown_timeout_seconds", seconds, 1, 3600)?;
        }

        if self.store_engine()? == StoreEngine::File {
            validation::validate_path("store.path", self.store_path())?;
        }

        if let Some(remote) = &self.sources.remote {
            validation::validate_url("sources.remote.endpoint", &remote.endpoint)?;
            if let Some(seconds) = remote.timeout_seconds {
                validation::validate_range("sources.remote.timeout_seconds", seconds, 1, 600)?;
            }
        }

        if let Some(overrides) = &self.sources.overrides {
            validation::validate_path("sources.overrides.path", &overrides.path)?;
        }

        Ok(())
    }

    pub fn trigger_time(&self) -> Result<Option<TriggerTime>> {
        match self.schedule.sync_at.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }

    pub fn sync_on_start_years(&self, current_year: i32) -> Result<Vec<i32>> {
        match &self.schedule.sync_on_start {
            Some(values) => {
                validation::parse_years("schedule.sync_on_start", values, current_year)
            }
            None => Ok(vec![current_year, current_year + 1]),
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(
            self.schedule
                .shutdown_timeout_seconds
                .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECONDS),
        )
    }

    pub fn store_engine(&self) -> Result<StoreEngine> {
        match self.store.engine.as_deref().unwrap_or("file") {
            "file" => Ok(StoreEngine::File),
            "memory" => Ok(StoreEngine::Memory),
            other => Err(CalendarError::InvalidConfigValueError {
                field: "store.engine".to_string(),
                value: other.to_string(),
                reason: "Valid engines: file, memory".to_string(),
            }),
        }
    }

    pub fn store_path(&self) -> &str {
        self.store.path.as_deref().unwrap_or(DEFAULT_STORE_PATH)
    }

    /// 週末的星期，未設定時為週六、週日
    pub fn weekend(&self) -> Result<Vec<Weekday>> {
        let Some(names) = self.sources.generic.as_ref().and_then(|g| g.weekend.as_ref()) else {
            return Ok(vec![Weekday::Sat, Weekday::Sun]);
        };

        names
            .iter()
            .map(|name| {
                name.parse::<WeekDay>()
                    .map(Weekday::from)
                    .map_err(|reason| CalendarError::InvalidConfigValueError {
                        field: "sources.generic.weekend".to_string(),
                        value: name.clone(),
                        reason,
                    })
            })
            .collect()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
