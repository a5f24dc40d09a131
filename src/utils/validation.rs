use crate::utils::error::{CalendarError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CalendarError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    // {year} 佔位符不是合法的 URL 字元，先替換再解析
    let concrete = url_str.replace("{year}", "2000");
    match Url::parse(&concrete) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CalendarError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CalendarError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CalendarError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CalendarError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CalendarError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 解析年份清單：數字、`current`、`next`，或單獨的 `none`。
/// 重複的年份只保留一次，順序依第一次出現。
pub fn parse_years(field_name: &str, values: &[String], current_year: i32) -> Result<Vec<i32>> {
    if values.len() == 1 && values[0].trim() == "none" {
        return Ok(Vec::new());
    }

    let mut years = Vec::with_capacity(values.len());
    for raw in values {
        let year = match raw.trim() {
            "current" => current_year,
            "next" => current_year + 1,
            other => other
                .parse::<i32>()
                .map_err(|e| CalendarError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: raw.clone(),
                    reason: format!("Invalid year: {}", e),
                })?,
        };

        if year < 0 {
            return Err(CalendarError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: raw.clone(),
                reason: "Year cannot be negative".to_string(),
            });
        }

        if !years.contains(&year) {
            years.push(year);
        }
    }

    Ok(years)
}
