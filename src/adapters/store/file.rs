use crate::domain::model::YearRecord;
use crate::domain::ports::Store;
use crate::utils::error::{CalendarError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// 每個年份一個 JSON 檔：`<base_path>/<year>.json`。
///
/// 寫入先落在暫存檔再 rename，讀取端永遠看到完整的檔案。
#[derive(Debug)]
pub struct FileStore {
    base_path: PathBuf,
    write_seq: AtomicU64,
}

impl FileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn year_path(&self, year: i32) -> PathBuf {
        self.base_path.join(format!("{}.json", year))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn put_year(&self, year: i32, data: YearRecord) -> Result<()> {
        let full_path = self.year_path(year);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self
            .base_path
            .join(format!(".{}.json.{}.{}.tmp", year, std::process::id(), seq));

        let json = serde_json::to_vec_pretty(&data).map_err(|e| CalendarError::persistence(year, e))?;

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| CalendarError::persistence(year, e))?;
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| CalendarError::persistence(year, e))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &full_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(CalendarError::persistence(year, e));
        }

        tracing::debug!("Wrote {} ({} bytes)", full_path.display(), json.len());
        Ok(())
    }

    async fn find_year(&self, year: i32) -> Result<Option<YearRecord>> {
        let full_path = self.year_path(year);
        let data = match tokio::fs::read(&full_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CalendarError::persistence(year, e)),
        };

        let calendar: YearRecord = serde_json::from_slice(&data).map_err(|e| {
            CalendarError::persistence(year, format!("invalid calendar at {}: {}", full_path.display(), e))
        })?;

        if calendar.is_empty() {
            return Ok(None);
        }
        Ok(Some(calendar))
    }
}
