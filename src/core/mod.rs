pub mod aggregator;
pub mod scheduler;
pub mod updater;

pub use crate::domain::model::{Day, DayType, MonthRecord, WeekDay, YearRecord};
pub use crate::domain::ports::{Source, Store};
pub use crate::utils::error::Result;
pub use aggregator::{Aggregator, BuildOutcome, SourceFailure};
pub use scheduler::{SchedulerState, SyncScheduler, TriggerTime};
pub use updater::{CalendarUpdater, SyncReport};
