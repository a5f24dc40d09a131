use crate::config::toml_config::TomlConfig;
use crate::core::{CalendarUpdater, SchedulerState, SyncScheduler, TriggerTime};
use crate::utils::error::{CalendarError, Result};
use chrono::{Datelike, Local};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// 常駐服務：啟動時同步指定年份，之後交給排程器每天更新。
pub struct CalendarService {
    updater: Arc<CalendarUpdater>,
    scheduler: SyncScheduler,
    sync_on_start: Vec<i32>,
    shutdown_timeout: Duration,
    startup_sync: Mutex<Option<JoinHandle<()>>>,
}

impl CalendarService {
    pub fn new(
        updater: Arc<CalendarUpdater>,
        trigger: Option<TriggerTime>,
        sync_on_start: Vec<i32>,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            scheduler: SyncScheduler::new(Arc::clone(&updater), trigger),
            updater,
            sync_on_start,
            shutdown_timeout,
            startup_sync: Mutex::new(None),
        }
    }

    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let updater = super::build_updater(config)?;
        let sync_on_start = config.sync_on_start_years(Local::now().year())?;

        Ok(Self::new(
            updater,
            config.trigger_time()?,
            sync_on_start,
            config.shutdown_timeout(),
        ))
    }

    pub fn updater(&self) -> &Arc<CalendarUpdater> {
        &self.updater
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// 在背景執行啟動同步並啟動排程器，不等待同步完成
    pub fn start(&self) -> Result<()> {
        if self.sync_on_start.is_empty() {
            tracing::info!("Sync on start disabled");
        } else {
            let updater = Arc::clone(&self.updater);
            let years = self.sync_on_start.clone();
            tracing::info!("Sync on start: {:?}", years);

            let handle = tokio::spawn(async move {
                let results = updater.update_years(&years).await;
                for (year, status) in &results {
                    if status != "ok" {
                        tracing::warn!("Startup sync of {} failed: {}", year, status);
                    }
                }
                tracing::info!("Startup sync finished");
            });

            let mut startup_sync = self
                .startup_sync
                .lock()
                .map_err(|_| CalendarError::SchedulerError {
                    message: "startup sync lock poisoned".to_string(),
                })?;
            *startup_sync = Some(handle);
        }

        self.scheduler.start()
    }

    /// 停止排程器並等待啟動同步結束，兩者共用同一個 deadline
    pub async fn shutdown(&self) -> Result<()> {
        let deadline = Instant::now() + self.shutdown_timeout;
        let scheduler_result = self.scheduler.stop(self.shutdown_timeout).await;

        let startup_sync = match self.startup_sync.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = startup_sync {
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Startup sync task failed: {}", e),
                Err(_) => {
                    tracing::error!("Startup sync did not finish within {:?}", self.shutdown_timeout);
                    return Err(CalendarError::ShutdownTimeout(self.shutdown_timeout));
                }
            }
        }

        scheduler_result
    }

    /// 執行直到 `signal` 完成，然後關閉
    pub async fn run_until<F>(&self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.start()?;
        signal.await;
        tracing::info!("Shutdown requested");
        self.shutdown().await
    }
}
