// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use chrono::offset::LocalResult;

use crate::parser::types::FormatError;

/// Removes control characters that would corrupt downstream line-oriented
/// processing. Idempotent.
pub fn scrub(text: &str) -> String {
  text.chars()
    .filter_map(|c| match c {
      '\u{00}' | '\u{01}' | '\u{02}' | '\n' => None,
      '\t' => Some(' '),
      other => Some(other)
    })
    .collect()
}

/// Fetches a single byte, turning out-of-range probes into a recoverable
/// error rather than a panic
pub fn byte_at(line: &str, offset: usize) -> Result<u8, FormatError> {
  line.as_bytes().get(offset).copied().ok_or(FormatError::Truncated { offset })
}

/// Epoch seconds with fractional microseconds
pub fn to_epoch<Tz: TimeZone>(datetime: &DateTime<Tz>) -> f64 {
  datetime.timestamp() as f64 + f64::from(datetime.timestamp_subsec_micros()) / 1e6
}

/// Resolves a naive timestamp against the system timezone, preferring the
/// earlier instant when DST makes it ambiguous
pub fn resolve_local(naive: NaiveDateTime) -> Result<DateTime<Local>, FormatError> {
  match Local.from_local_datetime(&naive) {
    LocalResult::Single(dt) => Ok(dt),
    LocalResult::Ambiguous(earliest, _) => Ok(earliest),
    LocalResult::None => Err(FormatError::NonexistentLocalTime {
      timestamp: naive.to_string()
    })
  }
}

/// Splits off the first whitespace-delimited token, collapsing leading runs
/// the way `str.split_whitespace` does. `None` if there is no second part.
pub fn split_whitespace_once(text: &str) -> Option<(&str, &str)> {
  let text = text.trim_start();
  let idx = text.find(char::is_whitespace)?;
  let rest = text[idx..].trim_start();
  if rest.is_empty() {
    return None;
  }

  Some((&text[..idx], rest))
}

/// Splits into exactly `n` whitespace-delimited parts, the last being the
/// untokenized remainder. `None` when the input has fewer parts.
pub fn split_whitespace_n(text: &str, n: usize) -> Option<Vec<&str>> {
  let mut parts = Vec::with_capacity(n);
  let mut rest = text.trim_start();

  for _ in 0..n.saturating_sub(1) {
    let idx = rest.find(char::is_whitespace)?;
    parts.push(&rest[..idx]);

    rest = rest[idx..].trim_start();
    if rest.is_empty() {
      return None;
    }
  }

  parts.push(rest);
  Some(parts)
}
