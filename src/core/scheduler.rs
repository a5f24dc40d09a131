use crate::core::updater::CalendarUpdater;
use crate::utils::error::{CalendarError, Result};
use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// 每日自動同步的時間（本地時區）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerTime(NaiveTime);

impl TriggerTime {
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// `now` 之後最近的一次觸發時間。今天的時間已過（或剛好等於）則排到明天。
    /// 當地時間不存在的日子（夏令時間跳過）往後順延。
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive();

        for offset in 0..=3 {
            let Some(date) = today.checked_add_days(Days::new(offset)) else {
                break;
            };
            if let Some(candidate) = tz.from_local_datetime(&date.and_time(self.0)).earliest() {
                if candidate > *now {
                    return candidate;
                }
            }
        }

        now.clone() + chrono::Duration::days(1)
    }

    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        (self.next_after(now) - now.clone())
            .to_std()
            .unwrap_or_default()
    }
}

impl FromStr for TriggerTime {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .map(TriggerTime)
            .map_err(|_| CalendarError::InvalidConfigValueError {
                field: "schedule.sync_at".to_string(),
                value: s.to_string(),
                reason: "time must match pattern hh:mm[:ss]".to_string(),
            })
    }
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

struct RunningLoop {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// 每天在 `trigger` 時間更新今年與明年的日曆。
///
/// 迴圈只等待兩個事件：計時器到期或收到停止訊號。
/// 執行中的更新不會被中斷，stop 會等它結束（最多到 deadline）。
pub struct SyncScheduler {
    updater: Arc<CalendarUpdater>,
    trigger: Option<TriggerTime>,
    state: Arc<watch::Sender<SchedulerState>>,
    running: Mutex<Option<RunningLoop>>,
}

impl SyncScheduler {
    /// `trigger` 為 `None` 時停用自動同步
    pub fn new(updater: Arc<CalendarUpdater>, trigger: Option<TriggerTime>) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            updater,
            trigger,
            state: Arc::new(state),
            running: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// 啟動背景迴圈，必須在 tokio runtime 內呼叫。
    /// 沒有設定觸發時間時維持 Idle。
    pub fn start(&self) -> Result<()> {
        let Some(trigger) = self.trigger else {
            tracing::info!("Automatic sync disabled: no trigger time configured");
            return Ok(());
        };

        let mut running = self
            .running
            .lock()
            .map_err(|_| CalendarError::SchedulerError {
                message: "scheduler lock poisoned".to_string(),
            })?;
        // 逾時的 stop 之後舊迴圈可能仍在執行
        if running.is_some() || self.state() == SchedulerState::ShuttingDown {
            return Err(CalendarError::SchedulerError {
                message: format!("cannot start scheduler in state {:?}", self.state()),
            });
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        self.state.send_replace(SchedulerState::Running);
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.updater),
            trigger,
            stop_rx,
            Arc::clone(&self.state),
        ));
        *running = Some(RunningLoop { stop_tx, handle });

        tracing::info!("Scheduler started, daily sync at {}", trigger);
        Ok(())
    }

    /// 停止背景迴圈，最多等待 `deadline`。
    ///
    /// 未啟動或已停止時直接回傳 Ok。逾時回傳 `ShutdownTimeout`，
    /// 但執行中的更新不會被強制中止，結束後狀態會自行轉為 Stopped。
    /// 前一次 stop 逾時後再呼叫，會等待舊迴圈結束（同樣最多 `deadline`）。
    pub async fn stop(&self, deadline: Duration) -> Result<()> {
        let running = match self.running.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        let Some(RunningLoop { stop_tx, handle }) = running else {
            if self.state() == SchedulerState::ShuttingDown {
                return self.wait_stopped(deadline).await;
            }
            tracing::debug!("Scheduler stop requested in state {:?}, nothing to do", self.state());
            return Ok(());
        };

        tracing::info!("Stopping scheduler...");
        self.state.send_replace(SchedulerState::ShuttingDown);
        // 迴圈已自行結束時 receiver 不存在，忽略即可
        let _ = stop_tx.send(());

        match tokio::time::timeout(deadline, handle).await {
            Ok(Ok(())) => {
                self.state.send_replace(SchedulerState::Stopped);
                tracing::info!("Scheduler stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                self.state.send_replace(SchedulerState::Stopped);
                Err(CalendarError::SchedulerError {
                    message: format!("scheduler loop terminated abnormally: {}", e),
                })
            }
            Err(_) => {
                tracing::error!("Scheduler did not stop within {:?}", deadline);
                Err(CalendarError::ShutdownTimeout(deadline))
            }
        }
    }

    async fn wait_stopped(&self, deadline: Duration) -> Result<()> {
        let mut rx = self.state.subscribe();
        let stopped = rx.wait_for(|state| *state == SchedulerState::Stopped);

        let result = match tokio::time::timeout(deadline, stopped).await {
            // sender 由 self 持有，不會被關閉
            Ok(_) => {
                tracing::info!("Scheduler stopped");
                Ok(())
            }
            Err(_) => {
                tracing::error!("Scheduler still shutting down after {:?}", deadline);
                Err(CalendarError::ShutdownTimeout(deadline))
            }
        };
        result
    }
}

async fn run_loop(
    updater: Arc<CalendarUpdater>,
    trigger: TriggerTime,
    mut stop_rx: oneshot::Receiver<()>,
    state: Arc<watch::Sender<SchedulerState>>,
) {
    loop {
        let now = Local::now();
        let delay = trigger.delay_from(&now);
        tracing::debug!("Next calendar sync in {:?}", delay);

        tokio::select! {
            biased;

            _ = &mut stop_rx => break,
            _ = tokio::time::sleep(delay) => {
                tracing::info!("Running scheduled calendar sync");
                updater.update_current_years().await;
            }
        }
    }

    state.send_replace(SchedulerState::Stopped);
}
