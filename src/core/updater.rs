use crate::core::aggregator::{Aggregator, SourceFailure};
use crate::domain::model::YearRecord;
use crate::domain::ports::Store;
use crate::utils::error::Result;
use chrono::{Datelike, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 一次 update_calendar 的結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub year: i32,
    /// false 代表所有來源都沒有資料，沒有寫入 store
    pub persisted: bool,
    pub months: usize,
    pub failures: Vec<SourceFailure>,
}

/// 建構日曆並寫入 store。可以同時被排程器與手動同步呼叫。
pub struct CalendarUpdater {
    aggregator: Aggregator,
    store: Arc<dyn Store>,
}

impl CalendarUpdater {
    pub fn new(aggregator: Aggregator, store: Arc<dyn Store>) -> Self {
        Self { aggregator, store }
    }

    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    /// 只建構不寫入
    pub async fn build_year(&self, year: i32) -> YearRecord {
        self.aggregator.build_year(year).await
    }

    /// 建構並寫入一年的日曆。結果為空時不寫入也不視為錯誤；
    /// 只有 store 寫入失敗才會回傳錯誤。
    pub async fn update_calendar(&self, year: i32) -> Result<SyncReport> {
        let outcome = self.aggregator.build(year).await;
        let months = outcome.calendar.len();

        if outcome.calendar.is_empty() {
            tracing::warn!("Nothing to update for {}: all sources returned no data", year);
            return Ok(SyncReport {
                year,
                persisted: false,
                months,
                failures: outcome.failures,
            });
        }

        if let Err(e) = self.store.put_year(year, outcome.calendar).await {
            tracing::error!("Cannot store calendar for {}: {}", year, e);
            return Err(e);
        }

        tracing::info!(
            "Calendar for {} updated ({} months, {} failed sources)",
            year,
            months,
            outcome.failures.len()
        );
        Ok(SyncReport {
            year,
            persisted: true,
            months,
            failures: outcome.failures,
        })
    }

    /// 更新今年與明年，失敗只記錄不回傳
    pub async fn update_current_years(&self) {
        let year = Local::now().year();
        for y in [year, year + 1] {
            if let Err(e) = self.update_calendar(y).await {
                tracing::warn!("Cannot update {}: {}", y, e);
            }
        }
    }

    /// 依序更新多個年份，回傳每年的結果：`ok` 或 `error: ...`
    pub async fn update_years(&self, years: &[i32]) -> BTreeMap<i32, String> {
        let mut results = BTreeMap::new();
        for &year in years {
            tracing::info!("Syncing year {}...", year);
            let status = match self.update_calendar(year).await {
                Ok(_) => "ok".to_string(),
                Err(e) => format!("error: {}", e),
            };
            results.insert(year, status);
        }
        tracing::debug!("Sync result: {:?}", results);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::core::aggregator::tests::StaticSource;
    use crate::domain::model::{Day, DayType, WeekDay};
    use crate::domain::ports::Source;
    use crate::utils::error::CalendarError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 記錄寫入次數的 store
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl Store for CountingStore {
        async fn put_year(&self, year: i32, data: YearRecord) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.put_year(year, data).await
        }

        async fn find_year(&self, year: i32) -> Result<Option<YearRecord>> {
            self.inner.find_year(year).await
        }
    }

    struct FailingStore;

    #[async_trait]
    impl Store for FailingStore {
        async fn put_year(&self, year: i32, _data: YearRecord) -> Result<()> {
            Err(CalendarError::persistence(year, "read-only"))
        }

        async fn find_year(&self, _year: i32) -> Result<Option<YearRecord>> {
            Ok(None)
        }
    }

    fn holidays() -> YearRecord {
        let mut year = YearRecord::new();
        year.insert_day(1, 1, Day::new(WeekDay::Sat, false, DayType::Holiday));
        year
    }

    fn updater_with(sources: Vec<Arc<dyn Source>>, store: Arc<dyn Store>) -> CalendarUpdater {
        CalendarUpdater::new(Aggregator::new(sources), store)
    }

    #[tokio::test]
    async fn test_update_calendar_persists() {
        let store = Arc::new(CountingStore::default());
        let updater = updater_with(
            vec![Arc::new(StaticSource::new("s1").with_year(2022, holidays()))],
            store.clone(),
        );

        let report = updater.update_calendar(2022).await.unwrap();

        assert!(report.persisted);
        assert_eq!(report.months, 1);
        assert!(report.failures.is_empty());
        assert_eq!(store.find_year(2022).await.unwrap(), Some(holidays()));
    }

    #[tokio::test]
    async fn test_empty_result_is_not_written() {
        let store = Arc::new(CountingStore::default());
        let updater = updater_with(vec![Arc::new(StaticSource::new("broken"))], store.clone());

        let report = updater.update_calendar(2022).await.unwrap();

        assert!(!report.persisted);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_still_persists_with_report() {
        let store = Arc::new(CountingStore::default());
        let updater = updater_with(
            vec![
                Arc::new(StaticSource::new("s1").with_year(2022, holidays())),
                Arc::new(StaticSource::new("broken")),
            ],
            store.clone(),
        );

        let report = updater.update_calendar(2022).await.unwrap();

        assert!(report.persisted);
        assert_eq!(report.failures[0].source_name, "broken");
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resync_is_idempotent() {
        let store = Arc::new(CountingStore::default());
        let updater = updater_with(
            vec![Arc::new(StaticSource::new("s1").with_year(2022, holidays()))],
            store.clone(),
        );

        updater.update_calendar(2022).await.unwrap();
        let first = store.find_year(2022).await.unwrap();
        updater.update_calendar(2022).await.unwrap();
        let second = store.find_year(2022).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_propagated() {
        let updater = updater_with(
            vec![Arc::new(StaticSource::new("s1").with_year(2022, holidays()))],
            Arc::new(FailingStore),
        );

        let err = updater.update_calendar(2022).await.unwrap_err();
        assert!(matches!(err, CalendarError::PersistenceFailure { year: 2022, .. }));
    }

    #[tokio::test]
    async fn test_update_years_reports_each_year() {
        let updater = updater_with(
            vec![Arc::new(StaticSource::new("s1").with_year(2022, holidays()))],
            Arc::new(FailingStore),
        );

        let results = updater.update_years(&[2022, 2023]).await;

        assert!(results[&2022].starts_with("error: "));
        // 2023 沒有資料：不寫入，仍視為成功
        assert_eq!(results[&2023], "ok");
    }

    #[tokio::test]
    async fn test_update_current_years_writes_both_years() {
        let year = Local::now().year();
        let store = Arc::new(CountingStore::default());
        let updater = updater_with(
            vec![Arc::new(
                StaticSource::new("s1")
                    .with_year(year, holidays())
                    .with_year(year + 1, holidays()),
            )],
            store.clone(),
        );

        updater.update_current_years().await;

        assert!(store.find_year(year).await.unwrap().is_some());
        assert!(store.find_year(year + 1).await.unwrap().is_some());
    }
}
