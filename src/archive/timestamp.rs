//! Takeout timestamp parsing and fixed-offset time zone conversion.
//!
//! Google Chat exports stamp every message like
//! `"Wednesday, January 3, 2024 at 2:30:45 PM UTC"`, sometimes with a
//! narrow no-break space before the AM/PM marker. The archive always emits
//! UTC; display conversion supports `UTC` and fixed `±HH:MM` offsets, with
//! civil-date arithmetic that is exact across month, year and leap-day
//! boundaries.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("malformed timestamp {0:?}")]
    Malformed(String),

    #[error("unknown weekday in {0:?}")]
    Weekday(String),

    #[error("unknown month in {0:?}")]
    Month(String),

    #[error("time of day out of range in {0:?}")]
    TimeOfDay(String),

    #[error("calendar date out of range in {0:?}")]
    CalendarDay(String),

    #[error("unrecognized time zone {0:?}, expected UTC or ±HH:MM")]
    Offset(String),
}

/// A calendar date, used for the inclusive start/end filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl FromStr for Date {
    type Err = TimestampError;

    /// Parse an ISO `YYYY-MM-DD` date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimestampError::Malformed(s.to_string());
        let mut parts = s.split('-');
        let year: i32 = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let month: u32 = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let day: u32 = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        if parts.next().is_some() {
            return Err(err());
        }
        if month < 1 || month > 12 || day < 1 || day > days_in_month(year, month) {
            return Err(TimestampError::CalendarDay(s.to_string()));
        }
        Ok(Date { year, month, day })
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A civil date-time without a zone; produced in UTC by the parser and
/// shifted with [`DateTime::with_offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl DateTime {
    pub fn date(&self) -> Date {
        Date {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }

    /// Shift this date-time by a fixed offset, carrying across day, month
    /// and year boundaries.
    pub fn with_offset(&self, offset: UtcOffset) -> DateTime {
        let days = days_from_civil(self.year, self.month, self.day);
        let seconds = days * 86_400
            + i64::from(self.hour) * 3_600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
            + i64::from(offset.minutes) * 60;
        let day_number = seconds.div_euclid(86_400);
        let tod = seconds.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(day_number);
        DateTime {
            year,
            month,
            day,
            hour: (tod / 3_600) as u32,
            minute: (tod % 3_600 / 60) as u32,
            second: (tod % 60) as u32,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// A fixed offset from UTC, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UtcOffset {
    minutes: i32,
}

impl UtcOffset {
    pub const UTC: UtcOffset = UtcOffset { minutes: 0 };

    pub fn minutes(&self) -> i32 {
        self.minutes
    }
}

impl FromStr for UtcOffset {
    type Err = TimestampError;

    /// Accepts `UTC`, `±HH:MM`, or `UTC±HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix("UTC").unwrap_or(trimmed);
        if body.is_empty() {
            return Ok(UtcOffset::UTC);
        }
        let err = || TimestampError::Offset(s.to_string());
        let (sign, rest) = if let Some(r) = body.strip_prefix('+') {
            (1, r)
        } else if let Some(r) = body.strip_prefix('-') {
            (-1, r)
        } else {
            return Err(err());
        };
        let (h, m) = rest.split_once(':').ok_or_else(err)?;
        if h.len() != 2 || m.len() != 2 || !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
            return Err(err());
        }
        let hours: u32 = h.parse().map_err(|_| err())?;
        let mins: u32 = m.parse().map_err(|_| err())?;
        if hours > 14 || mins > 59 {
            return Err(err());
        }
        Ok(UtcOffset {
            minutes: sign * (hours * 60 + mins) as i32,
        })
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minutes == 0 {
            return write!(f, "UTC");
        }
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let abs = self.minutes.abs();
        write!(f, "UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
    }
}

/// Parse a Takeout `created_date` string into a UTC [`DateTime`].
///
/// The weekday is validated as a weekday name but not cross-checked against
/// the date, matching the archive's own loose format. The trailing zone
/// token is required and the timestamp is interpreted as UTC regardless of
/// its value, since Takeout always exports in UTC.
pub fn parse_created_date(raw: &str) -> Result<DateTime, TimestampError> {
    // Narrow no-break space between the seconds and the AM/PM marker.
    let cleaned = raw.replace('\u{202F}', "");
    let s = cleaned.trim();
    let err = || TimestampError::Malformed(raw.to_string());

    let (weekday, rest) = s.split_once(", ").ok_or_else(err)?;
    if !WEEKDAYS.contains(&weekday) {
        return Err(TimestampError::Weekday(raw.to_string()));
    }
    let (month_name, rest) = rest.split_once(' ').ok_or_else(err)?;
    let month = MONTHS
        .iter()
        .position(|m| *m == month_name)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| TimestampError::Month(raw.to_string()))?;
    let (day_str, rest) = rest.split_once(", ").ok_or_else(err)?;
    let day: u32 = day_str.parse().map_err(|_| err())?;
    let (year_str, rest) = rest.split_once(" at ").ok_or_else(err)?;
    let year: i32 = year_str.parse().map_err(|_| err())?;

    if day < 1 || day > days_in_month(year, month) {
        return Err(TimestampError::CalendarDay(raw.to_string()));
    }

    // "2:30:45PM UTC" or "2:30:45 PM UTC"
    let (time_part, _zone) = rest.rsplit_once(' ').ok_or_else(err)?;
    let (clock, pm) = if let Some(p) = time_part.strip_suffix("PM") {
        (p.trim_end(), true)
    } else if let Some(p) = time_part.strip_suffix("AM") {
        (p.trim_end(), false)
    } else {
        return Err(err());
    };
    let mut fields = clock.split(':');
    let hour12: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let minute: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let second: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    if fields.next().is_some() {
        return Err(err());
    }
    if hour12 < 1 || hour12 > 12 || minute > 59 || second > 59 {
        return Err(TimestampError::TimeOfDay(raw.to_string()));
    }
    let hour = match (pm, hour12) {
        (false, 12) => 0,
        (false, h) => h,
        (true, 12) => 12,
        (true, h) => h + 12,
    };

    Ok(DateTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
    })
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

// Proleptic Gregorian day counting, with day 0 = 1970-01-01.

fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(if month <= 2 { year - 1 } else { year });
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = i64::from(if month > 2 { month - 3 } else { month + 9 });
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = (if month <= 2 { y + 1 } else { y }) as i32;
    (year, month, day)
}
