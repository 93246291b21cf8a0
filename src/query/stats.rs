// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use std::fmt;

use serde_json::{Number, Value};

use crate::query::filter::Predicate;
use crate::query::types::{self, QueryError, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
  Avg,
  Sum,
  Min,
  Max,
  Std,
  SumInv,
  AvgInv
}

impl fmt::Display for AggFunc {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      AggFunc::Avg => write!(f, "avg"),
      AggFunc::Sum => write!(f, "sum"),
      AggFunc::Min => write!(f, "min"),
      AggFunc::Max => write!(f, "max"),
      AggFunc::Std => write!(f, "std"),
      AggFunc::SumInv => write!(f, "suminv"),
      AggFunc::AvgInv => write!(f, "avginv")
    }
  }
}

impl AggFunc {
  fn from_name(name: &str) -> Option<AggFunc> {
    match name {
      "avg" => Some(AggFunc::Avg),
      "sum" => Some(AggFunc::Sum),
      "min" => Some(AggFunc::Min),
      "max" => Some(AggFunc::Max),
      "std" => Some(AggFunc::Std),
      "suminv" => Some(AggFunc::SumInv),
      "avginv" => Some(AggFunc::AvgInv),
      _ => None
    }
  }
}

/// One `Stats:` line: either an aggregation over a numeric column or a
/// predicate counted across the rows
#[derive(Debug, Clone)]
pub enum Reducer {
  Aggregate { func: AggFunc, field: String },
  Count(Predicate)
}

impl Reducer {
  /// Parses the body of one `Stats:` line, e.g. `sum state` or
  /// `state = 0`
  pub fn from_expression(expression: &str) -> Result<Reducer, QueryError> {
    let tokens: Vec<&str> = expression.split_whitespace().collect();

    match tokens.len() {
      2 => {
        let func = AggFunc::from_name(tokens[0])
          .ok_or_else(|| QueryError::BadDirective { line: expression.to_string() })?;

        Ok(Reducer::Aggregate { func, field: tokens[1].to_string() })
      },
      3 => Ok(Reducer::Count(Predicate::Leaf {
        field: tokens[0].to_string(),
        op: tokens[1].parse()?,
        value: tokens[2].to_string()
      })),
      _ => Err(QueryError::BadDirective { line: expression.to_string() })
    }
  }

  pub fn reduce(&self, rows: &[Row]) -> Result<Value, QueryError> {
    match self {
      Reducer::Count(predicate) => {
        let mut count = 0i64;
        for row in rows {
          if predicate.matches(row)? {
            count += 1;
          }
        }

        Ok(Value::from(count))
      },
      Reducer::Aggregate { func, field } => aggregate(*func, field, rows)
    }
  }
}

fn not_enough(func: AggFunc, wanted: usize) -> QueryError {
  QueryError::NotEnoughValues { func: func.to_string(), wanted }
}

fn numeric_value(value: f64, integral: bool) -> Value {
  if integral && value.fract() == 0.0 {
    Value::from(value as i64)
  } else {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
  }
}

fn aggregate(func: AggFunc, field: &str, rows: &[Row]) -> Result<Value, QueryError> {
  let mut values = Vec::with_capacity(rows.len());
  let mut all_integral = true;

  for row in rows {
    let cell = row.get(field).ok_or_else(|| QueryError::MissingField {
      field: field.to_string()
    })?;

    match cell {
      Value::Number(n) => {
        if n.as_i64().is_none() {
          all_integral = false;
        }

        values.push(n.as_f64().unwrap_or(std::f64::NAN));
      },
      other => return Err(QueryError::BadCoercion {
        literal: func.to_string(),
        cell: other.to_string()
      })
    }
  }

  let count = values.len();
  let sum: f64 = values.iter().sum();

  match func {
    AggFunc::Sum => Ok(numeric_value(sum, all_integral)),
    AggFunc::Avg => {
      if count == 0 {
        return Err(not_enough(func, 1));
      }

      Ok(numeric_value(sum / count as f64, all_integral))
    },
    AggFunc::Min => {
      let min = values.iter().cloned().fold(std::f64::INFINITY, f64::min);
      if count == 0 {
        return Err(not_enough(func, 1));
      }

      Ok(numeric_value(min, all_integral))
    },
    AggFunc::Max => {
      let max = values.iter().cloned().fold(std::f64::NEG_INFINITY, f64::max);
      if count == 0 {
        return Err(not_enough(func, 1));
      }

      Ok(numeric_value(max, all_integral))
    },
    AggFunc::Std => {
      // sample standard deviation
      if count < 2 {
        return Err(not_enough(func, 2));
      }

      let mean = sum / count as f64;
      let variance = values.iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>() / (count - 1) as f64;

      Ok(numeric_value(variance.sqrt(), false))
    },
    AggFunc::SumInv => {
      if sum == 0.0 {
        return Err(QueryError::DivisionByZero { func: func.to_string() });
      }

      Ok(numeric_value(1.0 / sum, false))
    },
    AggFunc::AvgInv => {
      if count == 0 {
        return Err(not_enough(func, 1));
      }

      let mean = sum / count as f64;
      if mean == 0.0 {
        return Err(QueryError::DivisionByZero { func: func.to_string() });
      }

      Ok(numeric_value(1.0 / mean, false))
    }
  }
}

fn group_key(columns: &[String], row: &Row) -> Result<Vec<Value>, QueryError> {
  columns.iter()
    .map(|column| {
      row.get(column).cloned().ok_or_else(|| QueryError::MissingField {
        field: column.clone()
      })
    })
    .collect()
}

/// Applies a query's `Stats:` lines to the filtered rows.
///
/// With declared columns the rows are grouped by their column value tuple
/// (stable sort, then consecutive runs); every reducer sees each full group
/// and contributes its own `stat_N` output row. Without columns a single
/// group spans all rows. Queries without `Stats:` lines pass through.
pub fn evaluate_stats(
  query: &str, columns: &[String], rows: Vec<Row>
) -> Result<Vec<Row>, QueryError> {
  let mut reducers = vec![];

  for line in query.lines() {
    if let Some(expression) = line.strip_prefix("Stats: ") {
      reducers.push(Reducer::from_expression(expression)?);
    } else if line.starts_with("StatsAnd:")
        || line.starts_with("StatsOr:")
        || line.starts_with("StatsNegate:") {
      return Err(QueryError::StatsCombinatorUnimplemented);
    }
  }

  if reducers.is_empty() {
    return Ok(rows);
  }

  let mut aggregated = vec![];

  if columns.is_empty() {
    for (idx, reducer) in reducers.iter().enumerate() {
      aggregated.push(hashmap!{
        format!("stat_{}", idx + 1) => reducer.reduce(&rows)?
      });
    }

    return Ok(aggregated);
  }

  let mut keyed = Vec::with_capacity(rows.len());
  for row in rows {
    keyed.push((group_key(columns, &row)?, row));
  }

  keyed.sort_by(|a, b| types::compare_key_tuples(&a.0, &b.0));

  let mut start = 0;
  while start < keyed.len() {
    let key = keyed[start].0.clone();

    let mut end = start + 1;
    while end < keyed.len() && keyed[end].0 == key {
      end += 1;
    }

    let group: Vec<Row> = keyed[start..end].iter().map(|(_, row)| row.clone()).collect();

    for (idx, reducer) in reducers.iter().enumerate() {
      let mut out: Row = columns.iter().cloned().zip(key.iter().cloned()).collect();
      out.insert(format!("stat_{}", idx + 1), reducer.reduce(&group)?);
      aggregated.push(out);
    }

    start = end;
  }

  Ok(aggregated)
}
