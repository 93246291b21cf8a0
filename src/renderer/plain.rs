// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use chrono::{Local, TimeZone};

use crate::event::Event;

fn or_dash(value: &str) -> &str {
  if value.is_empty() { "-" } else { value }
}

/// One syslog-ish line per event, timestamp first
pub fn render_plain(event: &Event) -> String {
  let time = match Local.timestamp_opt(
    event.time as i64,
    ((event.time.fract()) * 1e9) as u32
  ).earliest() {
    Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    None => format!("@{}", event.time)
  };

  format!(
    "{} {} {}[{}]: {}",
    time,
    or_dash(&event.host),
    or_dash(&event.application),
    event.pid,
    event.text
  )
}
