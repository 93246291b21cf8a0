// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

// Timestamp-led variants: plain RFC 3339, the TP-Link firmware dialect
// with a space between date and time, and the Sophos firewall dialect with
// colons in the date.

use crate::event::Event;
use crate::parser::tag;
use crate::parser::timestamp;
use crate::parser::types::{FormatError, ParseContext};
use crate::parser::util;

fn missing_fields(wanted: usize, input: &str) -> FormatError {
  FormatError::MissingFields { wanted, input: input.to_string() }
}

/// `TIMESTAMP HOST TAG[PID]: message` with an RFC 3339 timestamp
pub fn parse_rfc3339(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  if line.len() <= 24 || line.as_bytes()[10] != b'T' {
    return Ok(None);
  }

  let mut split = line.splitn(3, ' ');
  let time = split.next().unwrap_or("");
  let host = split.next().ok_or_else(|| missing_fields(3, line))?;
  let rest = split.next().ok_or_else(|| missing_fields(3, line))?;

  let mut event = ctx.new_event(line);
  event.host = host.to_string();
  event.time = timestamp::parse_iso_8601(time)?;

  tag::parse_tag(rest).apply(&mut event);
  Ok(Some(event))
}

/// `DATE TIME HOST PID message` as emitted by TP-Link switches. No tag, and
/// the text keeps its surrounding whitespace.
pub fn parse_tplink(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  if util::byte_at(line, 10)? != b' ' {
    return Ok(None);
  }

  if util::byte_at(line, 19)? != b' ' {
    return Ok(None);
  }

  let mut split = line.splitn(5, ' ');
  let date = split.next().unwrap_or("");
  let time = split.next().unwrap_or("");
  let host = split.next().ok_or_else(|| missing_fields(5, line))?;
  let pid = split.next().ok_or_else(|| missing_fields(5, line))?;
  let rest = split.next().ok_or_else(|| missing_fields(5, line))?;

  let mut event = ctx.new_event(line);
  event.host = host.to_string();
  event.pid = pid.parse().map_err(|_| FormatError::BadNumber { token: pid.to_string() })?;
  event.time = timestamp::parse_iso_8601(&format!("{}T{}", date, time))?;
  event.text = rest.to_string();

  Ok(Some(event))
}

/// `YYYY:MM:DD-hh:mm:ss HOST TAG[PID]: message` from Sophos firewalls; the
/// timestamp is repaired before normalization
pub fn parse_sophos(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  if util::byte_at(line, 10)? != b'-' {
    return Ok(None);
  }

  if util::byte_at(line, 19)? != b' ' {
    return Ok(None);
  }

  let mut split = line.splitn(3, ' ');
  let time = split.next().unwrap_or("");
  let host = split.next().ok_or_else(|| missing_fields(3, line))?;
  let rest = split.next().ok_or_else(|| missing_fields(3, line))?;

  let mut event = ctx.new_event(line);
  event.host = host.to_string();
  event.time = timestamp::parse_iso_8601(
    &timestamp::fix_broken_sophos_timestamp(time, &ctx.now)
  )?;

  tag::parse_tag(rest).apply(&mut event);
  Ok(Some(event))
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::{Local, NaiveDate, Offset, TimeZone};
  use spectral::prelude::*;

  fn context() -> ParseContext {
    ParseContext {
      ipaddress: "127.0.0.1".to_string(),
      now: Local.with_ymd_and_hms(2023, 9, 29, 12, 0, 0).unwrap(),
      facility: 1,
      priority: 5
    }
  }

  #[test]
  fn test_rfc3339() {
    let event = parse_rfc3339(&context(), "2013-04-05T13:49:31.685Z esx Vpxa: message....")
      .unwrap().unwrap();

    assert_that!(event.host).is_equal_to("esx".to_string());
    assert_that!(event.application).is_equal_to("Vpxa".to_string());
    assert_that!(event.text).is_equal_to("message....".to_string());
    assert_eq!(event.time, 1365169771.685);
    assert_eq!(event.pid, 0);
  }

  #[test]
  fn test_rfc3339_passes_on_short_lines() {
    assert_that!(parse_rfc3339(&context(), "short")).is_ok_containing(None);
  }

  #[test]
  fn test_tplink() {
    let event = parse_tplink(
      &context(),
      "2023-09-29 18:41:55 host 51890 Login the web by  admin on web (10.1.2.3)."
    ).unwrap().unwrap();

    assert_that!(event.host).is_equal_to("host".to_string());
    assert_eq!(event.pid, 51890);
    // text is taken verbatim, inner whitespace intact
    assert_that!(event.text)
      .is_equal_to("Login the web by  admin on web (10.1.2.3).".to_string());

    let naive = NaiveDate::from_ymd_opt(2023, 9, 29).unwrap()
      .and_hms_opt(18, 41, 55).unwrap();
    let expected = util::to_epoch(&util::resolve_local(naive).unwrap());
    assert_eq!(event.time, expected);
  }

  #[test]
  fn test_tplink_needs_numeric_pid() {
    assert_that!(parse_tplink(&context(), "2023-09-29 18:41:55 host abc text here"))
      .is_err_containing(FormatError::BadNumber { token: "abc".to_string() });
  }

  #[test]
  fn test_sophos() {
    let ctx = context();
    let event = parse_sophos(&ctx, "2015:03:25-12:02:06 gw pluto[7122]: listening for IKE messages")
      .unwrap().unwrap();

    assert_that!(event.host).is_equal_to("gw".to_string());
    assert_that!(event.application).is_equal_to("pluto".to_string());
    assert_eq!(event.pid, 7122);
    assert_that!(event.text).is_equal_to("listening for IKE messages".to_string());

    let offset = f64::from(ctx.now.offset().fix().local_minus_utc());
    let naive = NaiveDate::from_ymd_opt(2015, 3, 25).unwrap()
      .and_hms_opt(12, 2, 6).unwrap();
    assert_eq!(event.time, naive.and_utc().timestamp() as f64 - offset);
  }
}
