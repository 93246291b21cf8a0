// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Offset};

use crate::parser::types::FormatError;
use crate::parser::util;

/// Normalizes an ISO 8601 / RFC 3339 timestamp to epoch seconds.
///
/// Accepts `Z`, `+HH:MM`, and `+HHMM` offsets; timestamps without any offset
/// are taken to be local time.
pub fn parse_iso_8601(timestamp: &str) -> Result<f64, FormatError> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
    return Ok(util::to_epoch(&dt));
  }

  if let Ok(dt) = DateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f%z") {
    return Ok(util::to_epoch(&dt));
  }

  let naive = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
    .map_err(|_| FormatError::BadTimestamp { timestamp: timestamp.to_string() })?;

  Ok(util::to_epoch(&util::resolve_local(naive)?))
}

/// Rewrites `YYYY:MM:DD-hh:mm:ss` into an ISO 8601 timestamp carrying the
/// reference time's UTC offset
pub fn fix_broken_sophos_timestamp(timestamp: &str, now: &DateTime<Local>) -> String {
  let repaired = timestamp.replacen('-', "T", 1).replacen(':', "-", 2);

  let offset = now.offset().fix().local_minus_utc();
  let sign = if offset < 0 { '-' } else { '+' };
  let minutes = offset.abs() / 60;

  format!("{}{}{:02}{:02}", repaired, sign, minutes / 60, minutes % 60)
}

/// `YYYY Mon DD hh:mm:ss`, local time
pub fn parse_year_first(time_part: &str) -> Result<f64, FormatError> {
  let naive = NaiveDateTime::parse_from_str(time_part, "%Y %b %d %H:%M:%S")
    .map_err(|_| FormatError::BadTimestamp { timestamp: time_part.to_string() })?;

  Ok(util::to_epoch(&util::resolve_local(naive)?))
}

fn month_number(name: &str) -> Result<u32, FormatError> {
  Ok(match name {
    "Jan" => 1,
    "Feb" => 2,
    "Mar" => 3,
    "Apr" => 4,
    "May" => 5,
    "Jun" => 6,
    "Jul" => 7,
    "Aug" => 8,
    "Sep" => 9,
    "Oct" => 10,
    "Nov" => 11,
    "Dec" => 12,
    _ => return Err(FormatError::BadMonth { token: name.to_string() })
  })
}

fn parse_number(token: &str) -> Result<u32, FormatError> {
  token.parse().map_err(|_| FormatError::BadNumber { token: token.to_string() })
}

/// Resolves the classic yearless `Mon DD hh:mm:ss` header against the
/// reference time.
///
/// Messages dated in the second half of the year while the reference clock
/// is still in the first half are assumed to be stragglers from the
/// previous year.
pub fn resolve_month_day(
  month_name: &str, day: &str, timeofday: &str,
  now: &DateTime<Local>
) -> Result<f64, FormatError> {
  let month = month_number(month_name)?;
  let day = parse_number(day)?;

  let clock: Vec<&str> = timeofday.split(':').collect();
  if clock.len() != 3 {
    return Err(FormatError::BadTimestamp { timestamp: timeofday.to_string() });
  }

  let hour = parse_number(clock[0])?;
  let minute = parse_number(clock[1])?;
  let second = parse_number(clock[2])?;

  let year = if now.month() < 6 && month > 6 {
    now.year() - 1
  } else {
    now.year()
  };

  let naive = NaiveDate::from_ymd_opt(year, month, day)
    .and_then(|date| date.and_hms_opt(hour, minute, second))
    .ok_or_else(|| FormatError::BadTimestamp {
      timestamp: format!("{} {} {}", month_name, day, timeofday)
    })?;

  Ok(util::to_epoch(&util::resolve_local(naive)?))
}
