use crate::domain::model::{Day, DayType, WeekDay, YearRecord};
use crate::domain::ports::Source;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};

/// 產生整年的基礎日曆：`weekend` 中的星期為週末，其餘為一般工作日。
/// 不依賴任何外部資料，永遠成功。
#[derive(Debug, Clone)]
pub struct GenericSource {
    weekend: Vec<Weekday>,
}

impl GenericSource {
    pub fn new() -> Self {
        Self::with_weekend([Weekday::Sat, Weekday::Sun])
    }

    pub fn with_weekend<I>(weekend: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut days: Vec<Weekday> = Vec::new();
        for day in weekend {
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Self { weekend: days }
    }

    pub fn weekend(&self) -> &[Weekday] {
        &self.weekend
    }

    fn is_weekend(&self, day: Weekday) -> bool {
        self.weekend.contains(&day)
    }

    pub fn generate(&self, year: i32) -> YearRecord {
        let mut calendar = YearRecord::new();

        let Some(first_day) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            tracing::warn!("Year {} is outside the supported date range", year);
            return calendar;
        };

        for date in first_day.iter_days().take_while(|d| d.year() == year) {
            let weekday = date.weekday();
            let is_weekend = self.is_weekend(weekday);
            let day_type = if is_weekend {
                DayType::Weekend
            } else {
                DayType::Normal
            };

            calendar.insert_day(
                date.month(),
                date.day(),
                Day::new(WeekDay::from(weekday), !is_weekend, day_type),
            );
        }

        calendar
    }
}

impl Default for GenericSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for GenericSource {
    fn name(&self) -> &str {
        "generic"
    }

    async fn get_year(&self, year: i32) -> Result<YearRecord> {
        Ok(self.generate(year))
    }
}
