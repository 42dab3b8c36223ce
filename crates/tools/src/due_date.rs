//! Natural-language due dates.
//!
//! Understands absolute forms (`2026-03-14`, `2026-03-14 17:00`, RFC 3339,
//! `03/14/2026`, `March 14, 2026`) and relative ones resolved against a
//! reference instant (`today`, `tonight`, `tomorrow`, `next week`,
//! `in 3 days`, `2 hours from now`, `friday`, `next monday`). A relative
//! day may carry a time: `tomorrow at 5pm`, `friday at 09:30`.
//!
//! Times without an offset are taken as UTC. Relative days without a time
//! keep the reference time of day.

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%B %d %Y", "%d %B %Y", "%b %d, %Y", "%b %d %Y"];

/// Parse `input` relative to `now`. Returns `None` when nothing matches.
pub fn parse(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    parse_absolute(text).or_else(|| parse_relative(&text.to_lowercase(), now))
}

fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    None
}

fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (day_part, time) = match text.split_once(" at ") {
        Some((day, time)) => (day.trim(), Some(parse_time_of_day(time.trim())?)),
        None => (text, None),
    };

    let base = relative_day(day_part, now).or_else(|| relative_offset(day_part, now))?;

    Some(match time {
        Some(t) => Utc.from_utc_datetime(&base.date_naive().and_time(t)),
        None => base,
    })
}

fn relative_day(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match text {
        "now" | "today" => Some(now),
        "tonight" => NaiveTime::from_hms_opt(20, 0, 0)
            .map(|t| Utc.from_utc_datetime(&now.date_naive().and_time(t))),
        "tomorrow" => Some(now + Duration::days(1)),
        "day after tomorrow" | "the day after tomorrow" => Some(now + Duration::days(2)),
        "yesterday" => Some(now - Duration::days(1)),
        "next week" => Some(now + Duration::weeks(1)),
        "next month" => now.checked_add_months(Months::new(1)),
        "next year" => now.checked_add_months(Months::new(12)),
        _ => {
            let name = text.strip_prefix("next ").or_else(|| text.strip_prefix("this ")).unwrap_or(text);
            let weekday = parse_weekday(name)?;
            Some(next_weekday(now, weekday))
        }
    }
}

/// `in 3 days`, `3 days from now`, `in an hour`.
fn relative_offset(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let body = text
        .strip_prefix("in ")
        .or_else(|| text.strip_suffix(" from now"))?
        .trim();

    let (amount, unit) = body.split_once(' ')?;
    let amount = parse_amount(amount)?;
    let unit = unit.trim().trim_end_matches('s');

    match unit {
        "minute" | "min" => Some(now + Duration::minutes(amount)),
        "hour" | "hr" => Some(now + Duration::hours(amount)),
        "day" => Some(now + Duration::days(amount)),
        "week" => Some(now + Duration::weeks(amount)),
        "month" => now.checked_add_months(Months::new(u32::try_from(amount).ok()?)),
        _ => None,
    }
}

fn parse_amount(word: &str) -> Option<i64> {
    if let Ok(n) = word.parse::<i64>() {
        return (n >= 0).then_some(n);
    }
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        _ => return None,
    };
    Some(n)
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let weekday = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// The first `weekday` strictly after `now`'s date.
fn next_weekday(now: DateTime<Utc>, weekday: Weekday) -> DateTime<Utc> {
    let today = now.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let mut ahead = (target - today).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    now + Duration::days(ahead)
}

/// `17:00`, `5pm`, `5:30 pm`, `noon`, `midnight`.
fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    match text {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return Some(NaiveTime::MIN),
        _ => {}
    }

    let compact = text.replace(' ', "");
    let (clock, meridiem) = if let Some(rest) = compact.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = compact.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (compact.as_str(), None)
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (clock.parse::<u32>().ok()?, 0),
    };

    let hour = match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}
