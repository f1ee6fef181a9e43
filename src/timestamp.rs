//! Entry timestamps and MS-DOS date/time conversion.
//!
//! Zip headers store modification times as MS-DOS date/time values:
//! - local time without a zone
//! - years 1980 through 2107
//! - 2-second resolution
//!
//! [`Timestamp`] keeps whole Unix seconds and converts to and from the
//! broken-down [`DosDateTime`] fields the codec works with. Because the
//! format has no zone, the broken-down fields are interpreted as UTC.
//!
//! # Example
//!
//! ```rust
//! use zipedit::Timestamp;
//!
//! let ts = Timestamp::from_unix_secs(315_532_800); // 1980-01-01 00:00:00
//! let dos = ts.to_dos();
//! assert_eq!((dos.year, dos.month, dos.day), (1980, 1, 1));
//! assert_eq!(Timestamp::from_dos(dos), Some(ts));
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: i64 = 86_400;

/// Earliest year representable in an MS-DOS date.
const DOS_MIN_YEAR: u16 = 1980;

/// Latest year representable in an MS-DOS date.
const DOS_MAX_YEAR: u16 = 2107;

/// Broken-down MS-DOS date and time fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    /// Year, 1980-2107.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-58 in steps of two.
    pub second: u8,
}

/// A point in time with whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    /// Seconds since 1970-01-01 00:00:00 UTC.
    secs: i64,
}

impl Timestamp {
    /// Returns the current time.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Creates a timestamp from Unix seconds.
    #[inline]
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self { secs }
    }

    /// Creates a timestamp from a `SystemTime`, truncating sub-second precision.
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(duration) => Self::from_unix_secs(duration.as_secs() as i64),
            Err(e) => {
                let duration = e.duration();
                let mut secs = -(duration.as_secs() as i64);
                // round towards negative infinity
                if duration.subsec_nanos() > 0 {
                    secs -= 1;
                }
                Self::from_unix_secs(secs)
            }
        }
    }

    /// Creates a timestamp from MS-DOS date/time fields.
    ///
    /// Returns `None` if any field is out of range.
    pub fn from_dos(dos: DosDateTime) -> Option<Self> {
        if !(DOS_MIN_YEAR..=DOS_MAX_YEAR).contains(&dos.year)
            || !(1..=12).contains(&dos.month)
            || dos.day == 0
            || dos.day > days_in_month(dos.year as i64, dos.month as u32)
            || dos.hour > 23
            || dos.minute > 59
            || dos.second > 59
        {
            return None;
        }

        let days = days_from_civil(dos.year as i64, dos.month as u32, dos.day as u32);
        let secs = days * SECS_PER_DAY
            + dos.hour as i64 * 3600
            + dos.minute as i64 * 60
            + dos.second as i64;
        Some(Self::from_unix_secs(secs))
    }

    /// Converts to MS-DOS date/time fields.
    ///
    /// Times before 1980 are clamped to 1980-01-01 00:00:00 and times after
    /// 2107 to 2107-12-31 23:59:58. Odd seconds are rounded down.
    pub fn to_dos(&self) -> DosDateTime {
        let min = days_from_civil(DOS_MIN_YEAR as i64, 1, 1) * SECS_PER_DAY;
        let max = (days_from_civil(DOS_MAX_YEAR as i64, 12, 31) + 1) * SECS_PER_DAY - 2;
        let secs = self.secs.clamp(min, max);

        let days = secs.div_euclid(SECS_PER_DAY);
        let rem = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        DosDateTime {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: (rem / 3600) as u8,
            minute: (rem % 3600 / 60) as u8,
            second: ((rem % 60) & !1) as u8,
        }
    }

    /// Returns the timestamp as Unix seconds.
    #[inline]
    pub const fn as_unix_secs(&self) -> i64 {
        self.secs
    }

    /// Converts to a `SystemTime`.
    pub fn as_system_time(&self) -> SystemTime {
        if self.secs >= 0 {
            UNIX_EPOCH + Duration::from_secs(self.secs as u64)
        } else {
            UNIX_EPOCH - Duration::from_secs(self.secs.unsigned_abs())
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> SystemTime {
        ts.as_system_time()
    }
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u32) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = (y - era * 400) as u64;
    let mp = ((month + 9) % 12) as u64;
    let doy = (153 * mp + 2) / 5 + day as u64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe as i64 - 719_468
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if month <= 2 { y + 1 } else { y }, month, day)
}
