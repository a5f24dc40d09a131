use anyhow::Context;
use business_calendar::utils::error::ErrorSeverity;
use business_calendar::utils::{logger, validation, validation::Validate};
use business_calendar::{CalendarError, CalendarService, CliConfig, Command, Store, TomlConfig};
use chrono::{Datelike, Local};
use clap::Parser;
use serde::Serialize;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting business-calendar");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        let exit_code = match e.downcast_ref::<CalendarError>() {
            Some(err) => {
                tracing::error!("❌ {} (Severity: {:?})", err, err.severity());
                tracing::error!("💡 Recovery suggestion: {}", err.recovery_suggestion());
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 建議: {}", err.recovery_suggestion());

                // 根據錯誤嚴重程度決定退出碼
                match err.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &CliConfig) -> anyhow::Result<()> {
    cli.validate()?;
    let settings = cli.load_settings()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    match &cli.command {
        Command::Serve { .. } => serve(&settings).await,
        Command::Sync { years } => sync(&settings, years).await,
        Command::Show { year, month } => {
            let updater = business_calendar::app::build_updater(&settings)?;
            let calendar = updater.build_year(*year).await;
            match month {
                Some(m) => print_found(calendar.month(*m)),
                None => print_json(&calendar),
            }
        }
        Command::Get { year, month, day } => {
            let store = business_calendar::app::build_store(&settings)?;
            match (month, day) {
                (Some(m), Some(d)) => print_found(store.find_day(*year, *m, *d).await?),
                (Some(m), None) => print_found(store.find_month(*year, *m).await?),
                _ => print_found(store.find_year(*year).await?),
            }
        }
    }
}

async fn serve(settings: &TomlConfig) -> anyhow::Result<()> {
    let service = CalendarService::from_config(settings)?;
    service.run_until(shutdown_signal()).await?;
    tracing::info!("✅ Shutdown complete");
    Ok(())
}

async fn sync(settings: &TomlConfig, raw_years: &[String]) -> anyhow::Result<()> {
    let years = validation::parse_years("year", raw_years, Local::now().year())?;
    let updater = business_calendar::app::build_updater(settings)?;

    let results = updater.update_years(&years).await;
    print_json(&results)?;

    let failed: Vec<_> = results
        .iter()
        .filter(|(_, status)| status.as_str() != "ok")
        .map(|(year, _)| *year)
        .collect();
    if !failed.is_empty() {
        anyhow::bail!("sync failed for {:?}", failed);
    }
    Ok(())
}

fn print_found<T: Serialize>(value: Option<T>) -> anyhow::Result<()> {
    match value {
        Some(value) => print_json(&value),
        None => anyhow::bail!("not found"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("cannot serialize output")?;
    println!("{}", json);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
