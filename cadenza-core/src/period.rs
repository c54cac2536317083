//! Calendar-period truncation and stepping for the frequency lattice.
//!
//! These are pure UTC bucket functions: `period_start` floors a timestamp to
//! the start of its containing period, `period_step` advances a timestamp by
//! one period. Weeks start Monday 00:00 UTC.

use cadenza_types::Frequency;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

const DAY: i64 = 86_400;

const fn week_start_day(day: i64) -> i64 {
    // 1970-01-01 is a Thursday, hence the +3 shift to a Monday boundary.
    day - ((day + 3).rem_euclid(7))
}

fn day_start(ts: DateTime<Utc>) -> DateTime<Utc> {
    let day = ts.timestamp().div_euclid(DAY);
    DateTime::from_timestamp(day * DAY, 0).unwrap_or(ts)
}

fn week_start(ts: DateTime<Utc>) -> DateTime<Utc> {
    let ws = week_start_day(ts.timestamp().div_euclid(DAY));
    DateTime::from_timestamp(ws * DAY, 0).unwrap_or(ts)
}

fn date_start(ts: DateTime<Utc>, year: i32, month: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(ts, |naive| naive.and_utc())
}

/// Floor `ts` to the start of its containing period at `freq`.
///
/// `Unspecified` is the identity: every timestamp is its own period, so
/// grouping by it leaves a series dense.
#[must_use]
pub fn period_start(ts: DateTime<Utc>, freq: Frequency) -> DateTime<Utc> {
    match freq {
        Frequency::Day => day_start(ts),
        Frequency::Week => week_start(ts),
        Frequency::Month => date_start(ts, ts.year(), ts.month()),
        Frequency::Quarter => {
            let quarter_month = ((ts.month() - 1) / 3) * 3 + 1;
            date_start(ts, ts.year(), quarter_month)
        }
        Frequency::Year => date_start(ts, ts.year(), 1),
        Frequency::Unspecified => ts,
    }
}

/// Advance `ts` by one period at `freq`.
///
/// Month-based steps clamp the day of month the way calendar arithmetic
/// does (Jan 31 + 1 month = Feb 28/29). `Unspecified` has no period length
/// and returns `ts` unchanged; callers guard against it before building
/// grids.
#[must_use]
pub fn period_step(ts: DateTime<Utc>, freq: Frequency) -> DateTime<Utc> {
    match freq {
        Frequency::Day => ts + Duration::days(1),
        Frequency::Week => ts + Duration::days(7),
        Frequency::Month => ts.checked_add_months(Months::new(1)).unwrap_or(ts),
        Frequency::Quarter => ts.checked_add_months(Months::new(3)).unwrap_or(ts),
        Frequency::Year => ts.checked_add_months(Months::new(12)).unwrap_or(ts),
        Frequency::Unspecified => ts,
    }
}

/// Regular grid of timestamps from `start` to `end` inclusive, stepping one
/// `freq` period at a time. Empty when `end < start`.
#[must_use]
pub fn period_grid(start: DateTime<Utc>, end: DateTime<Utc>, freq: Frequency) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    if end < start || freq == Frequency::Unspecified {
        return out;
    }
    let mut cur = start;
    while cur <= end {
        out.push(cur);
        let next = period_step(cur, freq);
        if next <= cur {
            break;
        }
        cur = next;
    }
    out
}
