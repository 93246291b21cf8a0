// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

pub mod filter;
pub mod ops;
pub mod stats;
pub mod types;

use serde_json::Value;

pub use crate::query::types::{QueryError, Row, Tables};

/// The table a query addresses, from its `GET` line
fn table_of_query(query: &str) -> Option<&str> {
  let first = query.lines().next()?;
  let name = first.strip_prefix("GET ")?.trim();

  if name.is_empty() {
    None
  } else {
    Some(name)
  }
}

/// Explicitly requested columns, if any
fn columns_of_query(query: &str) -> Option<Vec<String>> {
  for line in query.lines() {
    if let Some(names) = line.strip_prefix("Columns:") {
      return Some(names.split_whitespace().map(str::to_string).collect());
    }
  }

  None
}

fn show_column_headers(query: &str) -> bool {
  // Cache, OutputFormat, Localtime, KeepAlive and ResponseHeader are
  // accepted and ignored; only ColumnHeaders changes the result shape
  for line in query.lines() {
    if let Some(value) = line.strip_prefix("ColumnHeaders:") {
      return value.trim() == "on";
    }
  }

  false
}

/// Evaluates a query against the stored tables.
///
/// Returns the result rows (cell lists in column order, with any `stat_*`
/// outputs appended in name order) and the effective column names. Columns
/// default to the sorted keys of the table's first row when the query names
/// none.
pub fn execute_query(tables: &Tables, query: &str) -> Result<(Vec<Vec<Value>>, Vec<String>), QueryError> {
  let query_columns = columns_of_query(query);
  let mut columns = query_columns.clone().unwrap_or_default();

  let mut result = vec![];

  if let Some(table_name) = table_of_query(query) {
    let rows = tables.get(table_name).ok_or_else(|| QueryError::UnknownTable {
      table: table_name.to_string()
    })?;

    if query_columns.is_none() {
      if let Some(first) = rows.first() {
        columns = first.keys().cloned().collect();
        columns.sort();
      }
    }

    if !columns.is_empty() {
      let filtered = filter::evaluate_filter(query, rows)?;

      // grouping only applies to explicitly requested columns
      let group_columns = query_columns.unwrap_or_default();
      let aggregated = stats::evaluate_stats(query, &group_columns, filtered)?;

      for entry in &aggregated {
        let mut row = Vec::with_capacity(columns.len());

        for column in &columns {
          let cell = entry.get(column).ok_or_else(|| QueryError::MissingColumn {
            column: column.clone(),
            table: table_name.to_string()
          })?;

          row.push(cell.clone());
        }

        let mut stat_names: Vec<&String> = entry.keys()
          .filter(|key| key.starts_with("stat_"))
          .collect();
        stat_names.sort();

        for name in stat_names {
          row.push(entry[name].clone());
        }

        result.push(row);
      }
    }
  }

  if show_column_headers(query) {
    let header = columns.iter().cloned().map(Value::String).collect();
    result.insert(0, header);
  }

  Ok((result, columns))
}
