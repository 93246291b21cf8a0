// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use crate::event::Event;

/// The `TAG[PID]:` header shared by several wire variants
#[derive(Debug, Clone, PartialEq)]
pub struct TagInfo {
  pub application: String,
  pub pid: i64,
  pub text: String
}

impl TagInfo {
  pub fn apply(self, event: &mut Event) {
    event.application = self.application;
    event.pid = self.pid;
    event.text = self.text;
  }
}

/// Splits `TAG[PID]: message` at the first colon-space.
///
/// Never fails: without a colon-space the whole trimmed content becomes the
/// text, and an unparseable pid degrades to 0.
pub fn parse_tag(content: &str) -> TagInfo {
  let mut split = content.splitn(2, ": ");
  let tag = split.next().unwrap_or("");

  let message = match split.next() {
    Some(message) => message,
    None => return TagInfo {
      application: String::new(),
      pid: 0,
      text: content.trim().to_string()
    }
  };

  let (application, pid) = if tag.contains('[') {
    let open = tag.rfind('[').unwrap_or(0);
    let application = tag[..open].trim_start_matches('[').trim_end_matches(']');
    let pid = tag[open + 1..].trim_end_matches(']').parse().unwrap_or(0);
    (application, pid)
  } else {
    (tag, 0)
  };

  TagInfo {
    application: application.to_string(),
    pid,
    text: message.trim().to_string()
  }
}
