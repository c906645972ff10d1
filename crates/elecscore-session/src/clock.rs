//! Device time.
//!
//! Session ages are measured in "device time": a single integer synthesized
//! from calendar fields as
//!
//! ```text
//! sec + min*60 + hour*3600 + mday*86400 + mon*30*86400 + year*365*86400
//! ```
//!
//! with 30-day months and 365-day years, folded into 32 bits. The value only
//! grows within a month; comparing readings across a month or year boundary
//! can give a wrong difference. It is persisted next to every session, so the
//! derivation must not change while stored sessions exist.

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const MINUTE: u32 = 60;
const HOUR: u32 = 60 * MINUTE;
const DAY: u32 = 24 * HOUR;
const MONTH: u32 = 30 * DAY;
const YEAR: u32 = 365 * DAY;

/// Default offset applied to UTC before reading calendar fields, in seconds.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 3600;

/// Wall-clock years before this are treated as "clock not synchronized yet".
pub const DEFAULT_MIN_VALID_YEAR: i32 = 2016;

/// Broken-down calendar time with `struct tm` conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarFields {
    pub second: u32,
    pub minute: u32,
    pub hour: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// Month, 0-11.
    pub month: u32,
    /// Years since 1900.
    pub year: u32,
}

impl CalendarFields {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            second: dt.second(),
            minute: dt.minute(),
            hour: dt.hour(),
            day: dt.day(),
            month: dt.month0(),
            year: u32::try_from(dt.year() - 1900).unwrap_or(0),
        }
    }
}

/// A device-time reading. See the module docs for the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceTime(u32);

impl DeviceTime {
    /// Creation time recorded when the clock could not be read. Any later
    /// valid reading makes such a session look expired.
    pub const UNSET: DeviceTime = DeviceTime(u32::MAX);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub fn from_calendar(f: CalendarFields) -> Self {
        Self(
            f.second
                .wrapping_add(f.minute.wrapping_mul(MINUTE))
                .wrapping_add(f.hour.wrapping_mul(HOUR))
                .wrapping_add(f.day.wrapping_mul(DAY))
                .wrapping_add(f.month.wrapping_mul(MONTH))
                .wrapping_add(f.year.wrapping_mul(YEAR)),
        )
    }

    /// Elapsed device time since `earlier`, as an unsigned 32-bit difference.
    ///
    /// A creation time in the future wraps around to a very large age.
    pub fn age_since(self, earlier: DeviceTime) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

impl std::fmt::Display for DeviceTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of calendar time.
pub trait Clock: Send + Sync {
    /// Current calendar fields, or `None` if the time is not known.
    fn now(&self) -> Option<CalendarFields>;

    fn device_time(&self) -> Option<DeviceTime> {
        self.now().map(DeviceTime::from_calendar)
    }
}

/// Wall clock with a fixed offset from UTC.
#[derive(Debug, Clone)]
pub struct SystemClock {
    utc_offset: TimeDelta,
    min_valid_year: i32,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DEFAULT_UTC_OFFSET_SECS, DEFAULT_MIN_VALID_YEAR)
    }
}

impl SystemClock {
    pub fn new(utc_offset_secs: i32, min_valid_year: i32) -> Self {
        Self {
            utc_offset: TimeDelta::seconds(i64::from(utc_offset_secs)),
            min_valid_year,
        }
    }

    fn fields_at(&self, utc: NaiveDateTime) -> Option<CalendarFields> {
        let local = utc + self.utc_offset;
        if local.year() < self.min_valid_year {
            return None;
        }
        Some(CalendarFields::from_datetime(&local))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Option<CalendarFields> {
        self.fields_at(Utc::now().naive_utc())
    }
}

/// Clock driven by hand, for tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    current: Mutex<Option<NaiveDateTime>>,
}

impl ManualClock {
    pub fn at(dt: NaiveDateTime) -> Self {
        Self {
            current: Mutex::new(Some(dt)),
        }
    }

    /// A clock that has never been set.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, dt: NaiveDateTime) {
        *self.current.lock() = Some(dt);
    }

    pub fn clear(&self) {
        *self.current.lock() = None;
    }

    /// Move the clock forward. Does nothing while the clock is unset.
    pub fn advance(&self, by: TimeDelta) {
        if let Some(dt) = self.current.lock().as_mut() {
            *dt += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Option<CalendarFields> {
        self.current.lock().as_ref().map(CalendarFields::from_datetime)
    }
}
