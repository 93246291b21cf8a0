// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

// The variants without a usable timestamp-led header: bare tags, the
// year-first vendor dialect, and the classic BSD format that doubles as the
// catch-all.

use crate::event::Event;
use crate::parser::shorthand;
use crate::parser::tag;
use crate::parser::timestamp;
use crate::parser::types::{FormatError, ParseContext};
use crate::parser::util;

fn missing_fields(wanted: usize, input: &str) -> FormatError {
  FormatError::MissingFields { wanted, input: input.to_string() }
}

/// `TAG: message` with no header at all; time and host come from the
/// envelope
pub fn parse_tag_only(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  let head = line.splitn(2, ": ").next().unwrap_or("");
  if head.split(' ').count() != 1 {
    return Ok(None);
  }

  let mut event = ctx.new_event(line);
  tag::parse_tag(line).apply(&mut event);

  event.time = ctx.epoch_now();
  event.host = ctx.ipaddress.clone();

  Ok(Some(event))
}

/// `YYYY Mon DD hh:mm:ss TZN HOST APP: message`, a vendor dialect that puts
/// the year first and names its timezone
pub fn parse_year_first(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  if util::byte_at(line, 4)? != b' ' {
    return Ok(None);
  }

  if !line.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
    return Ok(None);
  }

  let time_part = line.get(..20)
    .ok_or(FormatError::Truncated { offset: 20 })?;

  // skip the timezone name; it is repeated in the offsetless timestamp
  let tail = line.get(25..).unwrap_or("");

  let mut split = tail.splitn(3, ' ');
  let host = split.next().unwrap_or("");
  let application = split.next().ok_or_else(|| missing_fields(3, tail))?;
  let rest = split.next().ok_or_else(|| missing_fields(3, tail))?;

  let mut event = ctx.new_event(line);
  event.host = host.to_string();
  event.application = application.trim_end_matches(':').to_string();
  event.pid = 0;
  event.text = rest.to_string();
  event.time = timestamp::parse_year_first(time_part)?;

  Ok(Some(event))
}

/// `Mon DD hh:mm:ss [HOST] TAG[PID]: message`, the classic BSD layout.
///
/// Always claims the message; this is the end of the chain. A host token
/// ending in a colon is actually a tag, in which case the host falls back
/// to the sender address. A body starting with `@` is a forwarded
/// monitoring alert and is parsed as such, including its own host.
pub fn parse_bsd(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  let parts = util::split_whitespace_n(line, 4)
    .ok_or_else(|| missing_fields(4, line))?;
  let (month, day, timeofday) = (parts[0], parts[1], parts[2]);
  let mut rest = parts[3];

  let (token, after_token) = util::split_whitespace_once(rest)
    .ok_or_else(|| missing_fields(2, rest))?;

  let mut event = ctx.new_event(line);
  if token.ends_with(':') {
    event.host = ctx.ipaddress.clone();
  } else {
    event.host = token.to_string();
    rest = after_token;
  }

  if rest.starts_with('@') {
    shorthand::monitoring_info(&mut event, rest)?;
  } else {
    tag::parse_tag(rest).apply(&mut event);
    event.time = timestamp::resolve_month_day(month, day, timeofday, &ctx.now)?;
  }

  Ok(Some(event))
}
