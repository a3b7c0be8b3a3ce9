use chrono::{DateTime, Days, NaiveDate};

/// Calendar-day format used on the wire and in the UI ("Mon Oct 19 2026").
pub const DAY_FORMAT: &str = "%a %b %d %Y";

/// Expands a leading `~` in a path to the user's home directory.
/// Also normalizes path separators for the current OS.
pub fn expand_tilde(path: &str) -> String {
    let result = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home
                .join(rest.trim_start_matches('/'))
                .to_string_lossy()
                .to_string(),
            None => path.to_string(),
        },
        _ => path.to_string(),
    };
    if cfg!(windows) {
        result.replace('/', "\\")
    } else {
        result
    }
}

/// The local calendar day.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parses a calendar day as written by the tracker itself, as an ISO date, or
/// as the RFC 3339 timestamp a spreadsheet hands back for date-typed cells.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|ts| ts.date_naive())
        })
}

/// The day `n` days before `day`, saturating at the calendar's lower bound.
pub fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

/// Rounds to one decimal place, the precision XP is reported with.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Serde adapter writing a `NaiveDate` in [`DAY_FORMAT`] and reading any
/// format [`parse_day`] accepts.
pub mod day_string {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(day: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_day(*day))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_day(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date {raw:?}")))
    }
}

pub mod day_string_opt {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(day: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match day {
            Some(day) => serializer.serialize_str(&super::format_day(*day)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_day(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date {s:?}"))),
        }
    }
}

/// Spreadsheet cells come back as numbers or as numeric strings.
pub mod lenient_number {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = match Cell::deserialize(deserializer)? {
            Cell::Number(n) => n,
            Cell::Text(s) if s.trim().is_empty() => 0.0,
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("expected a number, got {s:?}")))?,
        };
        if !n.is_finite() {
            return Err(serde::de::Error::custom(format!("expected a finite number, got {n}")));
        }
        Ok(n)
    }
}
