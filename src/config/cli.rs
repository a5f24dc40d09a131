use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "business-calendar")]
#[command(about = "Business calendar aggregation and refresh service")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 常駐執行，每天定時同步今年與明年
    Serve {
        /// 覆蓋 schedule.sync_at (hh:mm[:ss])
        #[arg(long)]
        sync_at: Option<String>,

        /// 覆蓋 schedule.sync_on_start，例如 current,next 或 none
        #[arg(long, value_delimiter = ',')]
        sync_on_start: Option<Vec<String>>,
    },
    /// 立即同步指定年份後結束
    Sync {
        #[arg(long = "year", required = true, value_delimiter = ',')]
        years: Vec<String>,
    },
    /// 只建構不寫入，印出合併後的日曆
    Show {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: Option<u32>,
    },
    /// 從 store 讀取已儲存的日曆
    Get {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: Option<u32>,

        #[arg(long, requires = "month")]
        day: Option<u32>,
    },
}

impl CliConfig {
    /// 載入 TOML 配置並套用命令列的覆蓋值。未指定 `--config` 時使用預設值。
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Command::Serve {
            sync_at,
            sync_on_start,
        } = &self.command
        {
            if let Some(sync_at) = sync_at {
                tracing::info!("🔧 sync_at overridden to: {}", sync_at);
                settings.schedule.sync_at = Some(sync_at.clone());
            }
            if let Some(years) = sync_on_start {
                settings.schedule.sync_on_start = Some(years.clone());
            }
        }

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }

        match &self.command {
            Command::Show {
                month: Some(month), ..
            } => validation::validate_range("month", *month, 1, 12),
            Command::Get { month, day, .. } => {
                if let Some(month) = month {
                    validation::validate_range("month", *month, 1, 12)?;
                }
                if let Some(day) = day {
                    validation::validate_range("day", *day, 1, 31)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
