use crate::domain::model::YearRecord;
use crate::domain::ports::Source;
use serde::Serialize;
use std::sync::Arc;

/// 某個來源在一次建構中失敗的紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    /// 在優先順序中的位置，從 0 開始
    pub index: usize,
    pub source_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub calendar: YearRecord,
    pub failures: Vec<SourceFailure>,
}

/// 依固定的優先順序合併多個來源的年度日曆，後面的來源覆蓋前面的。
pub struct Aggregator {
    sources: Vec<Arc<dyn Source>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// 建構一年的日曆，忽略失敗的來源。
    /// 所有來源都失敗時回傳空的 YearRecord。
    pub async fn build_year(&self, year: i32) -> YearRecord {
        self.build(year).await.calendar
    }

    /// 與 [`Aggregator::build_year`] 相同，另外回傳每個失敗來源的原因。
    pub async fn build(&self, year: i32) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();

        for (index, source) in self.sources.iter().enumerate() {
            match source.get_year(year).await {
                Ok(data) => {
                    tracing::debug!(
                        "Source {} ({}) returned {} months / {} days for {}",
                        index,
                        source.name(),
                        data.len(),
                        data.day_count(),
                        year
                    );
                    outcome.calendar = outcome.calendar.merge(&data);
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping source {} ({}) for {}: {}",
                        index,
                        source.name(),
                        year,
                        e
                    );
                    outcome.failures.push(SourceFailure {
                        index,
                        source_name: source.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::model::{Day, DayType, WeekDay};
    use crate::utils::error::{CalendarError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// 依年份回傳固定資料的來源，沒有資料的年份視為失敗
    pub(crate) struct StaticSource {
        name: String,
        years: HashMap<i32, YearRecord>,
    }

    impl StaticSource {
        pub(crate) fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                years: HashMap::new(),
            }
        }

        pub(crate) fn with_year(mut self, year: i32, data: YearRecord) -> Self {
            self.years.insert(year, data);
            self
        }
    }

    #[async_trait]
    impl Source for StaticSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn get_year(&self, year: i32) -> Result<YearRecord> {
            self.years
                .get(&year)
                .cloned()
                .ok_or_else(|| CalendarError::source_unavailable(&self.name, format!("no such year: {}", year)))
        }
    }

    fn year_of(entries: &[(u32, u32, Day)]) -> YearRecord {
        let mut year = YearRecord::new();
        for (month, day, data) in entries {
            year.insert_day(*month, *day, data.clone());
        }
        year
    }

    fn first() -> YearRecord {
        year_of(&[
            (2, 21, Day::new(WeekDay::Mon, true, DayType::Normal)),
            (2, 22, Day::new(WeekDay::Tue, true, DayType::Normal)),
            (2, 23, Day::new(WeekDay::Wed, true, DayType::Normal)),
        ])
    }

    fn second() -> YearRecord {
        year_of(&[
            (2, 22, Day::new(WeekDay::Tue, true, DayType::PreHoliday)),
            (
                2,
                23,
                Day {
                    working: false,
                    day_type: Some(DayType::Holiday),
                    ..Day::default()
                },
            ),
            (2, 24, Day::new(WeekDay::Thu, true, DayType::Normal)),
        ])
    }

    #[tokio::test]
    async fn test_later_sources_override_earlier() {
        let aggregator = Aggregator::new(vec![
            Arc::new(StaticSource::new("s1").with_year(2022, first())),
            Arc::new(StaticSource::new("s2").with_year(2022, second())),
        ]);

        let calendar = aggregator.build_year(2022).await;

        assert_eq!(calendar, YearRecord::new().merge(&first()).merge(&second()));
        assert_eq!(
            calendar.day(2, 23),
            Some(&Day::new(WeekDay::Wed, false, DayType::Holiday))
        );
    }

    #[tokio::test]
    async fn test_order_matters() {
        let forward = Aggregator::new(vec![
            Arc::new(StaticSource::new("s1").with_year(2022, first())),
            Arc::new(StaticSource::new("s2").with_year(2022, second())),
        ]);
        let reversed = Aggregator::new(vec![
            Arc::new(StaticSource::new("s2").with_year(2022, second())),
            Arc::new(StaticSource::new("s1").with_year(2022, first())),
        ]);

        let a = forward.build_year(2022).await;
        let b = reversed.build_year(2022).await;
        assert_ne!(a, b);
        assert_eq!(b.day(2, 23), Some(&Day::new(WeekDay::Wed, true, DayType::Normal)));
    }

    #[tokio::test]
    async fn test_failed_source_is_skipped_and_reported() {
        let aggregator = Aggregator::new(vec![
            Arc::new(StaticSource::new("s1").with_year(2022, first())),
            Arc::new(StaticSource::new("broken")),
        ]);

        let outcome = aggregator.build(2022).await;

        assert_eq!(outcome.calendar, first());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].source_name, "broken");
        assert!(outcome.failures[0].message.contains("no such year: 2022"));
    }

    #[tokio::test]
    async fn test_all_sources_failing_gives_empty_calendar() {
        let aggregator = Aggregator::new(vec![
            Arc::new(StaticSource::new("a")),
            Arc::new(StaticSource::new("b")),
        ]);

        let outcome = aggregator.build(2022).await;
        assert!(outcome.calendar.is_empty());
        assert_eq!(outcome.failures.len(), 2);

        assert!(Aggregator::new(Vec::new()).build_year(2022).await.is_empty());
    }

    #[tokio::test]
    async fn test_build_is_deterministic() {
        let aggregator = Aggregator::new(vec![
            Arc::new(StaticSource::new("s1").with_year(2022, first())),
            Arc::new(StaticSource::new("s2").with_year(2022, second())),
        ]);

        assert_eq!(aggregator.build_year(2022).await, aggregator.build_year(2022).await);
        assert_eq!(aggregator.source_names(), vec!["s1", "s2"]);
    }
}
