pub mod service;

use crate::adapters::source::{GenericSource, OverrideSource, RemoteSource};
use crate::adapters::store::{FileStore, MemoryStore};
use crate::config::toml_config::{StoreEngine, TomlConfig, DEFAULT_REMOTE_TIMEOUT_SECONDS};
use crate::core::{Aggregator, CalendarUpdater, Source, Store};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

pub use service::CalendarService;

/// 依配置建立來源，優先順序固定為 generic → remote → overrides
pub fn build_sources(config: &TomlConfig) -> Result<Vec<Arc<dyn Source>>> {
    let mut sources: Vec<Arc<dyn Source>> = vec![Arc::new(GenericSource::with_weekend(
        config.weekend()?,
    ))];

    if let Some(remote) = &config.sources.remote {
        let timeout = Duration::from_secs(
            remote
                .timeout_seconds
                .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECONDS),
        );
        sources.push(Arc::new(RemoteSource::new(
            remote.endpoint.clone(),
            timeout,
            remote.user_agent.as_deref(),
        )?));
    }

    if let Some(overrides) = &config.sources.overrides {
        sources.push(Arc::new(OverrideSource::new(&overrides.path)));
    }

    Ok(sources)
}

pub fn build_store(config: &TomlConfig) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.store_engine()? {
        StoreEngine::Memory => Arc::new(MemoryStore::new()),
        StoreEngine::File => Arc::new(FileStore::new(config.store_path())),
    };
    Ok(store)
}

pub fn build_updater(config: &TomlConfig) -> Result<Arc<CalendarUpdater>> {
    let sources = build_sources(config)?;
    let store = build_store(config)?;

    let aggregator = Aggregator::new(sources);
    tracing::info!("Calendar sources: {:?}", aggregator.source_names());

    Ok(Arc::new(CalendarUpdater::new(aggregator, store)))
}
