// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

extern crate atty;
extern crate chrono;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate maplit;
extern crate regex;
extern crate shellexpand;
#[macro_use] extern crate simple_error;
extern crate structopt;

mod config;
mod event;
mod parser;
mod query;
mod renderer;

use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Read};
use std::process::exit;

use chrono::Local;
use structopt::StructOpt;

use crate::config::Config;

/// Reads raw message lines from stdin and prints one rendered event per
/// line. Invalid UTF-8 and unparseable lines still produce (fallback)
/// events, so this never skips input.
fn run_stream(config: &Config) -> Result<(), Box<dyn Error>> {
  let render = config.renderer.get_renderer();
  let address = config.address.as_deref().map(|host| (host, 514u16));

  let stdin = io::stdin();
  for chunk in stdin.lock().split(b'\n') {
    let raw = chunk?;
    if raw.is_empty() {
      continue;
    }

    let event = parser::create_event_from_raw(&raw, address, Local::now());
    println!("{}", render(&event));
  }

  Ok(())
}

/// Evaluates the query file against the loaded tables and prints one JSON
/// array per result row
fn run_query(config: &Config, query_path: &str) -> Result<(), Box<dyn Error>> {
  let query = if query_path == "-" {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    buffer
  } else {
    fs::read_to_string(shellexpand::full(query_path)?.as_ref())?
  };

  let tables = match &config.tables {
    Some(tables) => tables.tables.clone(),
    None => bail!("query mode needs --tables")
  };

  let (rows, _columns) = query::execute_query(&tables, &query)?;
  for row in rows {
    println!("{}", serde_json::to_string(&row)?);
  }

  Ok(())
}

fn main() {
  let config = Config::from_args();

  let result = match &config.query {
    Some(query_path) => run_query(&config, query_path),
    None => run_stream(&config)
  };

  if let Err(e) = result {
    eprintln!("error: {}", e);
    exit(1);
  }
}
