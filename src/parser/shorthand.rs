// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

// Shorthand variants produced by monitoring forwarders: an `@` sigil, an
// epoch timestamp, and an optional service level in place of a syslog
// header.

use crate::event::Event;
use crate::parser::tag;
use crate::parser::types::{FormatError, ParseContext};
use crate::parser::util;

fn missing_fields(wanted: usize, input: &str) -> FormatError {
  FormatError::MissingFields { wanted, input: input.to_string() }
}

fn bad_number(token: &str) -> FormatError {
  FormatError::BadNumber { token: token.to_string() }
}

/// `@EPOCH[;SL] HOST TAG[PID]: message`, sent by forwarding peers
pub fn parse_forward(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  if util::byte_at(line, 0)? != b'@' {
    return Ok(None);
  }

  let sigil = util::byte_at(line, 11)?;
  if sigil != b' ' && sigil != b';' {
    return Ok(None);
  }

  // more than one semicolon in the first token means the alert shorthand,
  // not ours
  let first_token = line.splitn(2, ' ').next().unwrap_or("");
  if first_token.matches(';').count() > 1 {
    return Ok(None);
  }

  let mut split = line.splitn(3, ' ');
  let details = split.next().unwrap_or("");
  let host = split.next().ok_or_else(|| missing_fields(3, line))?;
  let rest = split.next().ok_or_else(|| missing_fields(3, line))?;

  let mut event = ctx.new_event(line);
  event.host = host.to_string();

  let mut detail_split = details.splitn(2, ';');
  let timestamp = detail_split.next().unwrap_or("");
  if let Some(sl) = detail_split.next() {
    event.sl = Some(sl.parse().map_err(|_| bad_number(sl))?);
  }

  // skip the @
  event.time = timestamp[1..].parse().map_err(|_| bad_number(timestamp))?;

  tag::parse_tag(rest).apply(&mut event);
  Ok(Some(event))
}

/// `@EPOCH[;SL;CONTACT;] HOST SERVICE: message`, the monitoring alert
/// shorthand
pub fn parse_monitoring_alert(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  if !line.starts_with('@') {
    return Ok(None);
  }

  let mut event = ctx.new_event(line);
  monitoring_info(&mut event, line)?;
  Ok(Some(event))
}

/// Fills an event from a monitoring alert line. Also reached from the
/// classic BSD parser when the message body turns out to carry a forwarded
/// alert; in that case the host parsed here wins over the header host.
pub fn monitoring_info(event: &mut Event, line: &str) -> Result<(), FormatError> {
  let (timestamp, host, rest) = if util::byte_at(line, 11)? == b';' {
    let mut split = line[1..].splitn(4, ';');
    let timestamp = split.next().unwrap_or("");
    let sl = split.next().ok_or_else(|| missing_fields(4, line))?;
    let contact = split.next().ok_or_else(|| missing_fields(4, line))?;
    let tail = split.next().ok_or_else(|| missing_fields(4, line))?;

    let (host, rest) = util::split_whitespace_once(tail)
      .ok_or_else(|| missing_fields(2, tail))?;

    if !sl.is_empty() {
      event.sl = Some(sl.parse().map_err(|_| bad_number(sl))?);
    }

    if !contact.is_empty() {
      event.contact = Some(contact.to_string());
    }

    (timestamp, host, rest)
  } else {
    let parts = util::split_whitespace_n(&line[1..], 3)
      .ok_or_else(|| missing_fields(3, line))?;

    (parts[0], parts[1], parts[2])
  };

  let epoch: i64 = timestamp.parse().map_err(|_| bad_number(timestamp))?;

  let mut split = rest.splitn(2, ": ");
  let service = split.next().unwrap_or("");
  let message = split.next().ok_or_else(|| missing_fields(2, rest))?;

  event.time = epoch as f64;
  event.host = host.to_string();
  event.application = service.to_string();
  event.pid = 0;
  event.text = message.trim().to_string();

  Ok(())
}
