// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use serde_json;

use crate::event::Event;

pub fn render_json(event: &Event) -> String {
  match serde_json::to_string(event) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("error converting event to json: {:?}", e);
      String::new()
    }
  }
}
