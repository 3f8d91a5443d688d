//! Partition naming.
//!
//! Derives the on-disk partition directory name from a timestamp and a
//! granularity, the way the table's partitioning scheme dictates (§6: partition
//! directory naming, e.g. `YYYY-MM-DD` for `DAY`).

use crate::core::Result;

/// Partitioning granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PartitionBy {
    Hour,
    Day,
    Month,
    Year,
    /// No partitioning: the whole table is a single partition named `default`.
    None,
}

impl PartitionBy {
    /// Directory name for the partition containing `timestamp_us` (microseconds
    /// since the Unix epoch).
    pub fn directory_name(&self, timestamp_us: i64) -> String {
        if matches!(self, PartitionBy::None) {
            return "default".to_string();
        }

        let days_since_epoch = timestamp_us.div_euclid(MICROS_PER_DAY);
        let us_in_day = timestamp_us.rem_euclid(MICROS_PER_DAY);
        let (year, month, day) = days_since_epoch_to_ymd(days_since_epoch);

        match self {
            PartitionBy::Year => format!("{year:04}"),
            PartitionBy::Month => format!("{year:04}-{month:02}"),
            PartitionBy::Day => format!("{year:04}-{month:02}-{day:02}"),
            PartitionBy::Hour => {
                let hour = us_in_day / MICROS_PER_HOUR;
                format!("{year:04}-{month:02}-{day:02}T{hour:02}")
            }
            PartitionBy::None => unreachable!(),
        }
    }

    /// Ceiling of `timestamp_us`'s partition: the first timestamp that falls
    /// into the *next* partition. Used by the opener to detect "this OOO slice
    /// extends past the table's last partition".
    pub fn ceil_timestamp(&self, timestamp_us: i64) -> i64 {
        match self {
            PartitionBy::None => i64::MAX,
            PartitionBy::Hour => {
                let floor = timestamp_us.div_euclid(MICROS_PER_HOUR) * MICROS_PER_HOUR;
                floor + MICROS_PER_HOUR
            }
            PartitionBy::Day => {
                let floor = timestamp_us.div_euclid(MICROS_PER_DAY) * MICROS_PER_DAY;
                floor + MICROS_PER_DAY
            }
            PartitionBy::Month | PartitionBy::Year => {
                // Months/years are variable-length; walk forward day by day from
                // the floor until the (year, month) pair changes. Partitions are
                // planned at most a few times per ingest batch, so this is not a
                // hot loop.
                let days_since_epoch = timestamp_us.div_euclid(MICROS_PER_DAY);
                let (year, month, _) = days_since_epoch_to_ymd(days_since_epoch);
                let mut probe_days = days_since_epoch;
                loop {
                    probe_days += 1;
                    let (probe_year, probe_month, _) = days_since_epoch_to_ymd(probe_days);
                    let crossed = match self {
                        PartitionBy::Year => probe_year != year,
                        PartitionBy::Month => probe_month != month || probe_year != year,
                        _ => unreachable!(),
                    };
                    if crossed {
                        return probe_days * MICROS_PER_DAY;
                    }
                }
            }
        }
    }

    /// Floor of `timestamp_us`'s partition: the first timestamp in that
    /// partition.
    pub fn floor_timestamp(&self, timestamp_us: i64) -> i64 {
        match self {
            PartitionBy::None => i64::MIN,
            PartitionBy::Hour => timestamp_us.div_euclid(MICROS_PER_HOUR) * MICROS_PER_HOUR,
            PartitionBy::Day => timestamp_us.div_euclid(MICROS_PER_DAY) * MICROS_PER_DAY,
            PartitionBy::Month | PartitionBy::Year => {
                let days_since_epoch = timestamp_us.div_euclid(MICROS_PER_DAY);
                let (year, month, _) = days_since_epoch_to_ymd(days_since_epoch);
                let mut probe_days = days_since_epoch;
                loop {
                    let (probe_year, probe_month, probe_day) = days_since_epoch_to_ymd(probe_days);
                    let at_boundary = match self {
                        PartitionBy::Year => probe_year == year && probe_month == 1 && probe_day == 1,
                        PartitionBy::Month => probe_year == year && probe_month == month && probe_day == 1,
                        _ => unreachable!(),
                    };
                    if at_boundary {
                        return probe_days * MICROS_PER_DAY;
                    }
                    probe_days -= 1;
                }
            }
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "HOUR" => Ok(PartitionBy::Hour),
            "DAY" => Ok(PartitionBy::Day),
            "MONTH" => Ok(PartitionBy::Month),
            "YEAR" => Ok(PartitionBy::Year),
            "NONE" => Ok(PartitionBy::None),
            other => Err(crate::core::Error::InvalidPartition(format!(
                "unknown partitionBy: {other}"
            ))),
        }
    }
}

const MICROS_PER_HOUR: i64 = 3_600_000_000;
const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Convert days since the Unix epoch to `(year, month, day)`.
fn days_since_epoch_to_ymd(mut days: i64) -> (i32, u8, u8) {
    let mut year: i32 = 1970;
    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if days >= 0 && days < days_in_year {
            break;
        }
        if days < 0 {
            year -= 1;
            days += if is_leap_year(year) { 366 } else { 365 };
        } else {
            days -= days_in_year;
            year += 1;
        }
    }

    let days_in_months = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month: u8 = 1;
    for &days_in_month in &days_in_months {
        if days < days_in_month as i64 {
            break;
        }
        days -= days_in_month as i64;
        month += 1;
    }

    let day = (days + 1) as u8;
    (year, month, day)
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
