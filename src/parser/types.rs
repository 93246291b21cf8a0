// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use chrono::{DateTime, Local};
use snafu::Snafu;

use crate::event::Event;
use crate::parser::util;

/// Reasons a wire variant can reject a message after claiming it.
///
/// Any of these reaching the dispatcher turns the whole message into a
/// fallback event, so none of them are fatal to the stream.
#[derive(Debug, Snafu, PartialEq)]
pub enum FormatError {
  #[snafu(display("message ends before offset {}", offset))]
  Truncated { offset: usize },

  #[snafu(display("expected {} fields in {:?}", wanted, input))]
  MissingFields { wanted: usize, input: String },

  #[snafu(display("invalid number {:?}", token))]
  BadNumber { token: String },

  #[snafu(display("unparseable timestamp {:?}", timestamp))]
  BadTimestamp { timestamp: String },

  #[snafu(display("unknown month name {:?}", token))]
  BadMonth { token: String },

  #[snafu(display("unterminated <PRI> prefix in {:?}", input))]
  UnterminatedPriority { input: String },

  #[snafu(display("structured data has the wrong format"))]
  MalformedStructuredData,

  #[snafu(display("found multiple {} structured data elements", element))]
  AmbiguousStructuredData { element: String },

  #[snafu(display("local time {} does not exist", timestamp))]
  NonexistentLocalTime { timestamp: String }
}

/// Per-message state shared by all variant parsers: the sender address, the
/// reference wall clock, and the facility/priority recovered from the <PRI>
/// prefix (or their defaults).
pub struct ParseContext {
  pub ipaddress: String,
  pub now: DateTime<Local>,
  pub facility: i64,
  pub priority: i64
}

impl ParseContext {
  pub fn epoch_now(&self) -> f64 {
    util::to_epoch(&self.now)
  }

  /// Seeds an event carrying this message's facility and priority
  pub fn new_event(&self, text: &str) -> Event {
    let mut event = Event::new(text, &self.ipaddress, self.epoch_now());
    event.facility = self.facility;
    event.priority = self.priority;
    event
  }
}

/// A single wire variant. `Ok(None)` means "not mine, try the next one";
/// an error means the variant claimed the message but could not finish.
pub type VariantParser = fn(&ParseContext, &str) -> Result<Option<Event>, FormatError>;
