// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

mod json;
mod plain;

pub use self::json::render_json;
pub use self::plain::render_plain;

use crate::event::Event;

/// Turns one parsed event into an output line
pub type Renderer = fn(&Event) -> String;
