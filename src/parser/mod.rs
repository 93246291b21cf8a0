// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

pub mod types;
pub mod util;

mod legacy;
mod rfc3339;
mod rfc5424;
mod shorthand;
mod tag;
mod timestamp;

use std::str;

use chrono::{DateTime, Local};

use crate::event::Event;
use crate::parser::types::{FormatError, ParseContext, VariantParser};

/// All known wire variants, in matching order. The more distinctive
/// layouts probe first; `parse_bsd` is the catch-all and always claims the
/// message.
static VARIANTS: &[VariantParser] = &[
  shorthand::parse_forward,
  shorthand::parse_monitoring_alert,
  rfc3339::parse_rfc3339,
  rfc3339::parse_tplink,
  rfc5424::parse_rfc5424,
  rfc3339::parse_sophos,
  legacy::parse_tag_only,
  legacy::parse_year_first,
  legacy::parse_bsd
];

/// Parses one already-scrubbed message line into an event.
///
/// Strips the `<PRI>` prefix when present (defaulting to facility 1,
/// priority 5 without one) and runs the variant chain. Errors mean the
/// message could not be parsed; callers usually fold them into a fallback
/// event via [`create_event_from_raw`].
pub fn parse_message(
  line: &str, ipaddress: &str, now: DateTime<Local>
) -> Result<Event, FormatError> {
  let (facility, priority, rest) = if line.starts_with('<') {
    let end = line.find('>').ok_or_else(|| FormatError::UnterminatedPriority {
      input: line.to_string()
    })?;

    let pri: i64 = line[1..end].parse().map_err(|_| FormatError::BadNumber {
      token: line[1..end].to_string()
    })?;

    (pri >> 3, pri & 7, &line[end + 1..])
  } else {
    (1, 5, line)
  };

  let ctx = ParseContext {
    ipaddress: ipaddress.to_string(),
    now,
    facility,
    priority
  };

  for parse_variant in VARIANTS {
    if let Some(mut event) = parse_variant(&ctx, rest)? {
      // forwarders may smuggle the original sender behind a pipe
      if let Some(idx) = event.host.find('|') {
        let address = event.host[idx + 1..].to_string();
        event.host.truncate(idx);
        event.ipaddress = address;
      }

      return Ok(event);
    }
  }

  Err(FormatError::MissingFields { wanted: 1, input: line.to_string() })
}

/// The never-fail entry point: decodes, scrubs, and parses a raw datagram,
/// producing a fallback event (facility 1, priority 0, text as received)
/// when anything goes wrong
pub fn create_event_from_raw(
  raw: &[u8], address: Option<(&str, u16)>, now: DateTime<Local>
) -> Event {
  let ipaddress = address.map(|(host, _port)| host).unwrap_or("");

  let line = match str::from_utf8(raw) {
    Ok(text) => util::scrub(text),
    Err(_) => {
      let line = util::scrub(&String::from_utf8_lossy(raw));
      return Event::new(&line, ipaddress, util::to_epoch(&now));
    }
  };

  parse_message(&line, ipaddress, now)
    .unwrap_or_else(|_| Event::new(&line, ipaddress, util::to_epoch(&now)))
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::{NaiveDate, TimeZone};
  use spectral::prelude::*;

  fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2012, 7, 10, 12, 0, 0).unwrap()
  }

  fn parse(line: &str) -> Event {
    create_event_from_raw(line.as_bytes(), Some(("10.1.1.1", 514)), now())
  }

  fn local_epoch(
    year: i32, month: u32, day: u32,
    hour: u32, minute: u32, second: u32
  ) -> f64 {
    let naive = NaiveDate::from_ymd_opt(year, month, day).unwrap()
      .and_hms_opt(hour, minute, second).unwrap();

    util::to_epoch(&util::resolve_local(naive).unwrap())
  }

  #[test]
  fn test_priority_prefix() {
    let event = parse("<78>May 26 13:45:01 Klapprechner CRON[8046]:  message....");

    assert_eq!(event.facility, 9);
    assert_eq!(event.priority, 6);
    assert_that!(event.host).is_equal_to("Klapprechner".to_string());
    assert_that!(event.application).is_equal_to("CRON".to_string());
    assert_eq!(event.pid, 8046);
    assert_that!(event.text).is_equal_to("message....".to_string());
  }

  #[test]
  fn test_missing_priority_defaults() {
    let event = parse("May 26 13:45:01 Klapprechner CRON[8046]:  message....");

    assert_eq!(event.facility, 1);
    assert_eq!(event.priority, 5);
    assert_eq!(event.time, local_epoch(2012, 5, 26, 13, 45, 1));
  }

  #[test]
  fn test_bracketed_application() {
    let event = parse("<78>May 26 13:45:01 Klapprechner [CRON][8046]:  message....");

    assert_that!(event.application).is_equal_to("CRON".to_string());
    assert_eq!(event.pid, 8046);
  }

  #[test]
  fn test_monitoring_alert_dispatch() {
    let event = parse("<154>@1341847712;5;Contact Info; MyHost My Service: CRIT - This che");

    assert_eq!(event.facility, 19);
    assert_eq!(event.priority, 2);
    assert_that!(event.host).is_equal_to("MyHost".to_string());
    assert_that!(event.application).is_equal_to("My Service".to_string());
    assert_that!(event.sl).contains_value(5);
    assert_that!(event.contact).contains_value("Contact Info".to_string());
    assert_eq!(event.time, 1341847712.0);
  }

  #[test]
  fn test_forwarded_alert_dispatch() {
    let event = parse(
      "<154>Jul  9 17:28:32 Klapprechner @1341847712;5;Contact Info;  MyHost My Service: CRIT - This che"
    );

    assert_that!(event.host).is_equal_to("MyHost".to_string());
    assert_that!(event.sl).contains_value(5);
    assert_eq!(event.time, 1341847712.0);
  }

  #[test]
  fn test_rfc3339_dispatch() {
    let event = parse("<166>2013-04-05T13:49:31.685Z esx Vpxa: message....");

    assert_eq!(event.facility, 20);
    assert_eq!(event.priority, 6);
    assert_that!(event.host).is_equal_to("esx".to_string());
    assert_eq!(event.time, 1365169771.685);
  }

  #[test]
  fn test_tag_only_dispatch() {
    let event = parse("<5>SYSTEM_INFO: [WLAN-1] Triggering Background Scan");

    assert_eq!(event.facility, 0);
    assert_eq!(event.priority, 5);
    assert_that!(event.application).is_equal_to("SYSTEM_INFO".to_string());
    // no timestamp in the message, so host and time come from the envelope
    assert_that!(event.host).is_equal_to("10.1.1.1".to_string());
  }

  #[test]
  fn test_forward_dispatch() {
    let event = parse("<78>@1341847712 Klapprechner /var/log/syslog: message....");

    assert_that!(event.host).is_equal_to("Klapprechner".to_string());
    assert_that!(event.application).is_equal_to("/var/log/syslog".to_string());
    assert_eq!(event.time, 1341847712.0);
    assert_that!(event.sl).is_none();
  }

  #[test]
  fn test_forward_with_level_dispatch() {
    let event = parse("<134>@1341847712;5 Klapprechner /var/log/syslog: message");

    assert_that!(event.sl).contains_value(5);
  }

  #[test]
  fn test_sophos_dispatch() {
    let event = parse("<84>2015:03:25-12:02:06 gw pluto[7122]: listening for IKE messages");

    assert_eq!(event.facility, 10);
    assert_eq!(event.priority, 4);
    assert_that!(event.host).is_equal_to("gw".to_string());
    assert_that!(event.application).is_equal_to("pluto".to_string());
  }

  #[test]
  fn test_rfc5424_dispatch() {
    let event = parse(
      "<134>1 2016-06-02T12:49:05.181+02:00 chrissw7 ChrisApp - TestID - coming from  java code"
    );

    assert_eq!(event.facility, 16);
    assert_eq!(event.priority, 6);
    assert_that!(event.host).is_equal_to("chrissw7".to_string());
    assert_eq!(event.time, 1464864545.181);
  }

  #[test]
  fn test_year_first_dispatch() {
    let event = parse(
      "2016 May 26 15:41:47 IST XYZ Ebra: %LINEPROTO-5-UPDOWN: Line protocol \
       on Interface Ethernet45 (XXX.ASAD.Et45), changed state to up"
    );

    assert_that!(event.host).is_equal_to("XYZ".to_string());
    assert_that!(event.application).is_equal_to("Ebra".to_string());
    assert_eq!(event.time, local_epoch(2016, 5, 26, 15, 41, 47));
  }

  #[test]
  fn test_tplink_dispatch() {
    let event = parse("<133>2023-09-29 18:41:55 host 51890 Login the web by user on web (x.x.x.x).....");

    assert_eq!(event.facility, 16);
    assert_eq!(event.priority, 5);
    assert_that!(event.host).is_equal_to("host".to_string());
    assert_eq!(event.pid, 51890);
  }

  #[test]
  fn test_piped_host_restores_sender() {
    let event = parse("<78>@1341847712 myhost|192.168.1.9 /var/log/syslog: message");

    assert_that!(event.host).is_equal_to("myhost".to_string());
    assert_that!(event.ipaddress).is_equal_to("192.168.1.9".to_string());
  }

  #[test]
  fn test_garbage_becomes_fallback_event() {
    let event = parse("<1>@");

    // the full original line survives, and the priority resets
    assert_that!(event.text).is_equal_to("<1>@".to_string());
    assert_eq!(event.facility, 1);
    assert_eq!(event.priority, 0);
    assert_that!(event.host).is_equal_to(String::new());
    assert_that!(event.ipaddress).is_equal_to("10.1.1.1".to_string());
    assert_eq!(event.time, util::to_epoch(&now()));
  }

  #[test]
  fn test_invalid_utf8_becomes_fallback_event() {
    let event = create_event_from_raw(b"\xff\xfe<13>oops", Some(("10.1.1.1", 514)), now());

    assert_eq!(event.facility, 1);
    assert_eq!(event.priority, 0);
    assert!(event.text.contains("<13>oops"));
  }

  #[test]
  fn test_control_characters_are_scrubbed() {
    let event = parse("<5>SYSTEM_INFO: tabs\tand \u{01}ctl");

    assert_that!(event.text).is_equal_to("tabs and ctl".to_string());
  }

  #[test]
  fn test_short_line_falls_back() {
    // too short for any timestamped variant to finish probing
    let event = parse("<5>hi: x");

    assert_eq!(event.priority, 0);
    assert_that!(event.text).is_equal_to("<5>hi: x".to_string());
  }
}
