use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekDay::Mon => "mon",
            WeekDay::Tue => "tue",
            WeekDay::Wed => "wed",
            WeekDay::Thu => "thu",
            WeekDay::Fri => "fri",
            WeekDay::Sat => "sat",
            WeekDay::Sun => "sun",
        }
    }
}

impl From<Weekday> for WeekDay {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => WeekDay::Mon,
            Weekday::Tue => WeekDay::Tue,
            Weekday::Wed => WeekDay::Wed,
            Weekday::Thu => WeekDay::Thu,
            Weekday::Fri => WeekDay::Fri,
            Weekday::Sat => WeekDay::Sat,
            Weekday::Sun => WeekDay::Sun,
        }
    }
}

impl From<WeekDay> for Weekday {
    fn from(value: WeekDay) -> Self {
        match value {
            WeekDay::Mon => Weekday::Mon,
            WeekDay::Tue => Weekday::Tue,
            WeekDay::Wed => Weekday::Wed,
            WeekDay::Thu => Weekday::Thu,
            WeekDay::Fri => Weekday::Fri,
            WeekDay::Sat => Weekday::Sat,
            WeekDay::Sun => Weekday::Sun,
        }
    }
}

impl FromStr for WeekDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(WeekDay::Mon),
            "tue" | "tuesday" => Ok(WeekDay::Tue),
            "wed" | "wednesday" => Ok(WeekDay::Wed),
            "thu" | "thursday" => Ok(WeekDay::Thu),
            "fri" | "friday" => Ok(WeekDay::Fri),
            "sat" | "saturday" => Ok(WeekDay::Sat),
            "sun" | "sunday" => Ok(WeekDay::Sun),
            other => Err(format!("unknown week day '{}'", other)),
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayType {
    /// 一般工作日
    Normal,
    /// 週末
    Weekend,
    /// 節日前一天，通常縮短工時
    PreHoliday,
    /// 國定假日
    Holiday,
    /// 額外宣布的非工作日
    #[serde(rename = "noWork")]
    NonWorking,
}

/// 一天的分類。`None` 欄位代表來源沒有提供該資訊。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_day: Option<WeekDay>,

    #[serde(default)]
    pub working: bool,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub day_type: Option<DayType>,

    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Day {
    pub fn new(week_day: WeekDay, working: bool, day_type: DayType) -> Self {
        Self {
            week_day: Some(week_day),
            working,
            day_type: Some(day_type),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 把 `overlay` 疊在 `self` 之上。
    ///
    /// `working` 一律取 overlay 的值；其餘欄位只有在 overlay 有值時才覆蓋。
    /// 不檢查 `day_type` 與 `working` 是否一致。
    pub fn merge(&self, overlay: &Day) -> Day {
        Day {
            week_day: overlay.week_day.or(self.week_day),
            working: overlay.working,
            day_type: overlay.day_type.or(self.day_type),
            description: overlay
                .description
                .as_ref()
                .filter(|d| !d.is_empty())
                .or(self.description.as_ref())
                .cloned(),
        }
    }
}

/// 一個月的資料，key 為日期 (1-31)。沒有 key 代表沒有該日的資料。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthRecord(BTreeMap<u32, Day>);

impl MonthRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: u32) -> Option<&Day> {
        self.0.get(&day)
    }

    pub fn insert(&mut self, day: u32, data: Day) -> Option<Day> {
        self.0.insert(day, data)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Day)> {
        self.0.iter().map(|(num, day)| (*num, day))
    }

    pub fn day_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(u32, Day)> for MonthRecord {
    fn from_iter<I: IntoIterator<Item = (u32, Day)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 一整年的資料，key 為月份 (1-12)。沒有任何月份的 YearRecord 視為空，不會被儲存。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearRecord(BTreeMap<u32, MonthRecord>);

impl YearRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn month(&self, month: u32) -> Option<&MonthRecord> {
        self.0.get(&month)
    }

    pub fn day(&self, month: u32, day: u32) -> Option<&Day> {
        self.month(month).and_then(|m| m.get(day))
    }

    pub fn insert_month(&mut self, month: u32, data: MonthRecord) -> Option<MonthRecord> {
        self.0.insert(month, data)
    }

    pub fn insert_day(&mut self, month: u32, day: u32, data: Day) -> Option<Day> {
        self.0.entry(month).or_default().insert(day, data)
    }

    /// 月份數量
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn day_count(&self) -> usize {
        self.0.values().map(MonthRecord::len).sum()
    }

    pub fn months(&self) -> impl Iterator<Item = (u32, &MonthRecord)> {
        self.0.iter().map(|(num, month)| (*num, month))
    }

    pub fn month_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    /// 該年不存在的 (月, 日) key，例如 13 月或 2 月 30 日
    pub fn invalid_dates(&self, year: i32) -> Vec<(u32, u32)> {
        self.months()
            .flat_map(|(month, days)| days.day_numbers().map(move |day| (month, day)))
            .filter(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day).is_none())
            .collect()
    }

    /// 以 `overlay` 覆蓋 `self`，回傳新的 YearRecord，兩個輸入都不會被修改。
    ///
    /// 月份與日期取兩者的聯集。同一天同時存在時依 [`Day::merge`] 的規則合併，
    /// 只存在於 overlay 的日期則原樣複製。
    pub fn merge(&self, overlay: &YearRecord) -> YearRecord {
        let mut merged = self.clone();

        for (month_num, overlay_month) in overlay.months() {
            let target = merged.0.entry(month_num).or_default();

            for (day_num, overlay_day) in overlay_month.iter() {
                let day = match target.get(day_num) {
                    Some(base_day) => base_day.merge(overlay_day),
                    None => overlay_day.clone(),
                };
                target.insert(day_num, day);
            }
        }

        merged
    }
}

impl FromIterator<(u32, MonthRecord)> for YearRecord {
    fn from_iter<I: IntoIterator<Item = (u32, MonthRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
