use crate::domain::model::YearRecord;
use crate::domain::ports::Store;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// 只存在記憶體中的 Store，重新啟動後資料消失。
#[derive(Debug, Default)]
pub struct MemoryStore {
    years: RwLock<HashMap<i32, YearRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.years.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.years.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put_year(&self, year: i32, data: YearRecord) -> Result<()> {
        self.years.write().await.insert(year, data);
        Ok(())
    }

    async fn find_year(&self, year: i32) -> Result<Option<YearRecord>> {
        let years = self.years.read().await;
        Ok(years.get(&year).filter(|y| !y.is_empty()).cloned())
    }
}
