pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::source::{GenericSource, OverrideSource, RemoteSource};
pub use adapters::store::{FileStore, MemoryStore};
pub use app::CalendarService;
pub use config::TomlConfig;
pub use crate::core::{
    Aggregator, CalendarUpdater, Day, DayType, MonthRecord, Source, Store, SyncReport,
    SyncScheduler, TriggerTime, WeekDay, YearRecord,
};
pub use utils::error::{CalendarError, Result};
