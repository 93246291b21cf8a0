// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;

use atty::{self, Stream};
use shellexpand;
use simple_error::SimpleError;
use structopt::StructOpt;

use crate::query::Tables;
use crate::renderer::{self, Renderer};

#[derive(Debug, Clone, Copy)]
pub enum RendererType {
  Auto,
  Plain,
  Json
}

impl RendererType {
  pub fn get_renderer(&self) -> Renderer {
    match *self {
      // plain output is for people, json for pipes
      RendererType::Auto => if atty::is(Stream::Stdout) {
        renderer::render_plain
      } else {
        renderer::render_json
      },
      RendererType::Plain => renderer::render_plain,
      RendererType::Json => renderer::render_json
    }
  }
}

impl FromStr for RendererType {
  type Err = Box<dyn Error>;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "auto" => Ok(RendererType::Auto),
      "plain" => Ok(RendererType::Plain),
      "json" => Ok(RendererType::Json),
      _ => bail!(format!("invalid renderer type: {}", s))
    }
  }
}

/// A YAML document of named tables for query mode, loaded during argument
/// parsing so bad paths and bad documents fail before any evaluation
#[derive(Debug)]
pub struct TablesConfig {
  pub tables: Tables
}

impl FromStr for TablesConfig {
  type Err = SimpleError;

  fn from_str(path: &str) -> Result<Self, Self::Err> {
    let expanded_path = shellexpand::full(path).map_err(SimpleError::from)?;
    let file = File::open(&expanded_path.to_string()).map_err(SimpleError::from)?;
    let reader = BufReader::new(file);

    match serde_yaml::from_reader(reader) {
      Ok(tables) => Ok(TablesConfig { tables }),
      Err(e) => Err(SimpleError::new(
        format!("error loading tables {}: {:?}", path, e)
      ))
    }
  }
}

#[derive(Debug, StructOpt)]
#[structopt(
  name = "sawmill",
  rename_all = "kebab-case",
  setting = structopt::clap::AppSettings::ColoredHelp
)]
pub struct Config {
  /// Renderer to use, one of: auto, plain, json
  ///
  /// If auto, plain output is used on a terminal and json when output is
  /// redirected.
  #[structopt(long, short, default_value = "auto", env = "SM_RENDERER")]
  pub renderer: RendererType,

  /// Sender address to record on events read from stdin
  ///
  /// Events parsed from stdin have no receiving socket; this stands in for
  /// the peer address one would have provided.
  #[structopt(long, short = "a", env = "SM_ADDRESS")]
  pub address: Option<String>,

  /// Path to a YAML file of named tables, enables query mode with --query
  #[structopt(long, short = "t", env = "SM_TABLES")]
  pub tables: Option<TablesConfig>,

  /// Path to a query file, or - for stdin
  ///
  /// When set, no events are read; the query is evaluated against --tables
  /// and one JSON row is printed per result.
  #[structopt(long, short = "q", env = "SM_QUERY")]
  pub query: Option<String>
}

#[cfg(test)]
mod tests {
  use super::*;

  use spectral::prelude::*;

  #[test]
  fn test_renderer_type_from_str() {
    assert!("plain".parse::<RendererType>().is_ok());
    assert!("json".parse::<RendererType>().is_ok());
    assert!("fancy".parse::<RendererType>().is_err());
  }

  #[test]
  fn test_tables_config_rejects_missing_file() {
    assert_that!("/definitely/not/a/file.yml".parse::<TablesConfig>()).is_err();
  }
}
