use business_calendar::app::build_updater;
use business_calendar::{Day, DayType, FileStore, Store, TomlConfig, WeekDay};
use httpmock::prelude::*;
use std::io::Write;
use tempfile::TempDir;

const OVERRIDES: &str = r#"
[[days]]
date = "2022-11-07"
weekDay = "mon"
type = "holiday"
desc = "Company day off"

[[days]]
date = "2022-12-31"
working = true
type = "normal"
"#;

fn write_config(
    temp_dir: &TempDir,
    endpoint: &str,
    overrides: Option<&str>,
) -> anyhow::Result<TomlConfig> {
    let data_dir = temp_dir.path().join("data");
    let mut content = format!(
        r#"
[store]
engine = "file"
path = "{}"

[sources.remote]
endpoint = "{}"
timeout_seconds = 5
"#,
        data_dir.display(),
        endpoint
    );

    if let Some(overrides) = overrides {
        let path = temp_dir.path().join("overrides.toml");
        std::fs::File::create(&path)?.write_all(overrides.as_bytes())?;
        content.push_str(&format!("\n[sources.overrides]\npath = \"{}\"\n", path.display()));
    }

    let config = TomlConfig::from_toml_str(&content)?;
    config.validate_config()?;
    Ok(config)
}

#[tokio::test]
async fn test_sources_merge_in_priority_order() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/cal/2022");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "11": {
                    "3": {"weekDay": "thu", "working": true, "type": "preHoliday"},
                    "4": {"weekDay": "fri", "working": false, "type": "holiday", "desc": "Unity Day"},
                    "7": {"weekDay": "mon", "working": true, "type": "normal"}
                }
            }));
    });

    let config = write_config(&temp_dir, &server.url("/cal/{year}"), Some(OVERRIDES))?;
    let updater = build_updater(&config)?;

    let report = updater.update_calendar(2022).await?;
    api_mock.assert();
    assert!(report.persisted);
    assert!(report.failures.is_empty());
    assert_eq!(report.months, 12);

    // 從新的 store 讀取，確認資料已落地
    let store = FileStore::new(temp_dir.path().join("data"));
    assert_eq!(
        store.find_day(2022, 11, 3).await?,
        Some(Day::new(WeekDay::Thu, true, DayType::PreHoliday))
    );
    assert_eq!(
        store.find_day(2022, 11, 4).await?,
        Some(Day::new(WeekDay::Fri, false, DayType::Holiday).with_description("Unity Day"))
    );
    // overrides 最後套用，working 未填寫時為 false
    assert_eq!(
        store.find_day(2022, 11, 7).await?,
        Some(Day::new(WeekDay::Mon, false, DayType::Holiday).with_description("Company day off"))
    );
    // 只有 overrides 提供的欄位被覆蓋
    assert_eq!(
        store.find_day(2022, 12, 31).await?,
        Some(Day::new(WeekDay::Sat, true, DayType::Normal))
    );
    // 其餘日期維持 generic 的結果
    assert_eq!(
        store.find_day(2022, 11, 5).await?,
        Some(Day::new(WeekDay::Sat, false, DayType::Weekend))
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_remote_source_is_skipped() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cal/2023");
        then.status(503);
    });

    let config = write_config(&temp_dir, &server.url("/cal/{year}"), None)?;
    let updater = build_updater(&config)?;

    let report = updater.update_calendar(2023).await?;
    assert!(report.persisted);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source_name, "remote");
    assert_eq!(report.failures[0].index, 1);

    let stored = updater.store().find_year(2023).await?.expect("2023 stored");
    assert_eq!(stored.day_count(), 365);
    Ok(())
}

#[tokio::test]
async fn test_update_years_reports_per_year() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(404);
    });

    let config = write_config(&temp_dir, &server.url("/cal/{year}"), None)?;
    let updater = build_updater(&config)?;

    let results = updater.update_years(&[2022, 2023, 2022]).await;
    assert_eq!(results.len(), 2);
    assert!(results.values().all(|status| status == "ok"));

    assert!(updater.store().find_year(2022).await?.is_some());
    assert!(updater.store().find_year(2023).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_override_file_changes_are_picked_up() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(404);
    });

    let config = write_config(&temp_dir, &server.url("/cal/{year}"), Some(""))?;
    let updater = build_updater(&config)?;

    updater.update_calendar(2022).await?;
    assert_eq!(
        updater.store().find_day(2022, 11, 7).await?,
        Some(Day::new(WeekDay::Mon, true, DayType::Normal))
    );

    std::fs::write(temp_dir.path().join("overrides.toml"), OVERRIDES)?;
    updater.update_calendar(2022).await?;
    assert_eq!(
        updater.store().find_day(2022, 11, 7).await?.and_then(|d| d.day_type),
        Some(DayType::Holiday)
    );
    Ok(())
}
