// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use regex::Regex;

use crate::event::Event;
use crate::parser::timestamp;
use crate::parser::types::{FormatError, ParseContext};

/// SD-ID of the vendor element whose parameters become event fields
pub const VENDOR_ELEMENT: &str = "Checkmk@18662";

const NILVALUE: &str = "-";

lazy_static! {
  // a bracketed element for our SD-ID, ending at the first unescaped ]
  static ref VENDOR_ELEMENT_PATTERN: Regex =
    Regex::new(r#"\[Checkmk@18662(?:[^\]\\]|\\.)*\]"#).unwrap();

  // a single SD-PARAM: space, name, quoted value with escapes
  static ref PARAM_PATTERN: Regex =
    Regex::new(r#" ([^= ]+)="((?:[^"\\]|\\.)*)""#).unwrap();
}

fn missing_fields(wanted: usize, input: &str) -> FormatError {
  FormatError::MissingFields { wanted, input: input.to_string() }
}

/// `VERSION TIMESTAMP HOSTNAME APP-NAME PROCID MSGID SD [message]` per
/// RFC 5424, with nilvalue handling for the header fields
pub fn parse_rfc5424(ctx: &ParseContext, line: &str) -> Result<Option<Event>, FormatError> {
  if line.len() <= 24 || line.as_bytes()[12] != b'T' {
    return Ok(None);
  }

  parse_fields(ctx, line).map(Some)
}

fn parse_fields(ctx: &ParseContext, line: &str) -> Result<Event, FormatError> {
  let mut split = line.splitn(7, ' ');
  let _version = split.next().unwrap_or("");
  let time = split.next().ok_or_else(|| missing_fields(7, line))?;
  let hostname = split.next().ok_or_else(|| missing_fields(7, line))?;
  let app_name = split.next().ok_or_else(|| missing_fields(7, line))?;
  let procid = split.next().ok_or_else(|| missing_fields(7, line))?;
  let _msgid = split.next().ok_or_else(|| missing_fields(7, line))?;
  let sd_and_message = split.next().ok_or_else(|| missing_fields(7, line))?;

  let mut event = ctx.new_event(line);

  event.time = if time == NILVALUE {
    ctx.epoch_now()
  } else {
    timestamp::parse_iso_8601(time)?
  };

  if hostname != NILVALUE {
    event.host = hostname.to_string();
  }

  if app_name != NILVALUE {
    event.application = app_name.to_string();
  }

  event.pid = if procid == NILVALUE {
    0
  } else {
    procid.parse().map_err(|_| FormatError::BadNumber { token: procid.to_string() })?
  };

  let (structured_data, message) = split_structured_data_and_message(sd_and_message)?;
  let message = message.strip_prefix('\u{feff}').unwrap_or(message);

  match structured_data {
    None => event.text = message.to_string(),
    Some(sd) => {
      let (fields, remaining_sd) = extract_vendor_element(sd)?;

      for (key, value) in fields {
        match key.as_str() {
          "sl" => {
            event.sl = Some(value.parse()
              .map_err(|_| FormatError::BadNumber { token: value })?);
          },
          "contact" => event.contact = Some(value),
          _ => {
            event.extra.insert(key, value);
          }
        }
      }

      event.text = if remaining_sd.is_empty() {
        message.to_string()
      } else {
        format!("{} {}", remaining_sd, message)
      };
    }
  }

  Ok(event)
}

/// Splits the tail of an RFC 5424 message into its structured data (if any)
/// and the free-form message, honoring escaped `]` inside elements
fn split_structured_data_and_message(tail: &str) -> Result<(Option<&str>, &str), FormatError> {
  if let Some(message) = tail.strip_prefix("- ") {
    return Ok((None, message));
  }

  if !tail.starts_with('[') {
    return Err(FormatError::MalformedStructuredData);
  }

  let bytes = tail.as_bytes();
  let mut outside = true;

  for (idx, &byte) in bytes.iter().enumerate() {
    if byte == b'[' && outside {
      outside = false;
    }

    if byte == b']' && (idx == 0 || bytes[idx - 1] != b'\\') {
      outside = true;
    }

    if byte == b' ' && outside {
      return Ok((Some(&tail[..idx]), &tail[idx + 1..]));
    }
  }

  if outside {
    // no message part at all
    Ok((Some(tail), ""))
  } else {
    Err(FormatError::MalformedStructuredData)
  }
}

/// Pulls the vendor element out of the structured data, returning its
/// unescaped parameters and whatever structured data remains
fn extract_vendor_element(sd: &str) -> Result<(Vec<(String, String)>, String), FormatError> {
  let matches: Vec<_> = VENDOR_ELEMENT_PATTERN.find_iter(sd).collect();

  let element = match matches.len() {
    0 => return Ok((vec![], sd.to_string())),
    1 => matches[0],
    _ => return Err(FormatError::AmbiguousStructuredData {
      element: VENDOR_ELEMENT.to_string()
    })
  };

  let mut fields = vec![];
  for caps in PARAM_PATTERN.captures_iter(element.as_str()) {
    fields.push((caps[1].to_string(), unescape(&caps[2])));
  }

  let remaining = format!("{}{}", &sd[..element.start()], &sd[element.end()..]);
  Ok((fields, remaining))
}

fn unescape(value: &str) -> String {
  value.replace("\\\\", "\\").replace("\\\"", "\"").replace("\\]", "]")
}
