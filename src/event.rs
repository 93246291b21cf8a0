// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

/// Lifecycle states assigned to events by downstream consumers.
///
/// Known transitions:
///   {ack, open, counting} => closed
///   {ack, delayed} => open
///   {open} => ack
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
  Open,
  Delayed,
  Counting,
  Ack,
  Closed
}

impl fmt::Display for EventPhase {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      EventPhase::Open => write!(f, "open"),
      EventPhase::Delayed => write!(f, "delayed"),
      EventPhase::Counting => write!(f, "counting"),
      EventPhase::Ack => write!(f, "ack"),
      EventPhase::Closed => write!(f, "closed")
    }
  }
}

impl FromStr for EventPhase {
  type Err = ();

  fn from_str(s: &str) -> Result<EventPhase, ()> {
    match s {
      "open" => Ok(EventPhase::Open),
      "delayed" => Ok(EventPhase::Delayed),
      "counting" => Ok(EventPhase::Counting),
      "ack" => Ok(EventPhase::Ack),
      "closed" => Ok(EventPhase::Closed),
      _ => Err(())
    }
  }
}

fn is_empty(map: &HashMap<String, String>) -> bool {
  map.is_empty()
}

/// The canonical record every inbound message is reduced to.
///
/// The parser guarantees that facility, priority, text, host, ipaddress,
/// application, pid and time are populated on every event it returns, no
/// matter which wire variant matched (or failed to match). The remaining
/// fields are filled in by later processing stages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Event {
  pub facility: i64,
  pub priority: i64,
  pub text: String,
  pub host: String,
  pub ipaddress: String,
  pub application: String,
  pub pid: i64,

  /// Seconds since the epoch, fractional where the source had them
  pub time: f64,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub core_host: Option<String>,
  pub host_in_downtime: bool,

  /// Service level hint carried by monitoring-alert shorthand messages
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sl: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub contact: Option<String>,

  /// Key/value pairs from vendor structured data
  #[serde(skip_serializing_if = "is_empty")]
  pub extra: HashMap<String, String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub count: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub phase: Option<EventPhase>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub rule_id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>
}

impl Event {
  /// Seeds an event with defaults; also the shape of the fallback record
  /// built for unparseable messages
  pub fn new(text: &str, ipaddress: &str, time: f64) -> Event {
    Event {
      facility: 1,
      priority: 0,
      text: text.to_string(),
      host: String::new(),
      ipaddress: ipaddress.to_string(),
      application: String::new(),
      pid: 0,
      time,
      core_host: None,
      host_in_downtime: false,
      sl: None,
      contact: None,
      extra: HashMap::new(),
      count: None,
      phase: None,
      rule_id: None,
      id: None
    }
  }
}
