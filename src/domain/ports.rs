use crate::domain::model::{Day, MonthRecord, YearRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 日曆資料來源。可以只回傳部分月份或部分日期。
#[async_trait]
pub trait Source: Send + Sync {
    /// 用於日誌與同步報告
    fn name(&self) -> &str;

    async fn get_year(&self, year: i32) -> Result<YearRecord>;
}

/// 合併後日曆的儲存位置。
///
/// 讀取一律回傳獨立的副本，同一年份的寫入以最後一次為準。
#[async_trait]
pub trait Store: Send + Sync {
    async fn put_year(&self, year: i32, data: YearRecord) -> Result<()>;

    async fn find_year(&self, year: i32) -> Result<Option<YearRecord>>;

    async fn find_month(&self, year: i32, month: u32) -> Result<Option<MonthRecord>> {
        Ok(self
            .find_year(year)
            .await?
            .and_then(|y| y.month(month).cloned()))
    }

    async fn find_day(&self, year: i32, month: u32, day: u32) -> Result<Option<Day>> {
        Ok(self
            .find_month(year, month)
            .await?
            .and_then(|m| m.get(day).cloned()))
    }
}
