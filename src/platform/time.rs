//! Wall-clock helpers
//!
//! The simulation never reads the clock; only daily quest rollover and run
//! seeding do.

use serde::{Deserialize, Serialize};

/// A calendar day in local time, formatted `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayStamp(pub String);

impl DayStamp {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self(format!("{year:04}-{month:02}-{day:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DayStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Today's local calendar day
#[cfg(target_arch = "wasm32")]
pub fn today() -> DayStamp {
    let now = js_sys::Date::new_0();
    DayStamp::new(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> DayStamp {
    use chrono::Datelike;
    let now = chrono::Local::now().date_naive();
    DayStamp::new(now.year(), now.month(), now.day())
}

/// Milliseconds since the Unix epoch (used to seed runs)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_stamp_format() {
        assert_eq!(DayStamp::new(2026, 3, 7).as_str(), "2026-03-07");
        assert_eq!(
            serde_json::to_string(&DayStamp::new(2026, 12, 31)).unwrap(),
            "\"2026-12-31\""
        );
    }

    #[test]
    fn test_today_is_well_formed() {
        let day = today();
        assert_eq!(day.as_str().len(), 10);
        assert_eq!(day.as_str().as_bytes()[4], b'-');
    }
}
