// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;
use snafu::Snafu;

/// One table row; cells are free-form JSON values
pub type Row = HashMap<String, Value>;

/// The in-memory data a query runs against, keyed by table name
pub type Tables = HashMap<String, Vec<Row>>;

/// Query evaluation fails fast: a malformed query or a query that does not
/// match the data is a bug in one of them, and hiding it behind an empty
/// result helps nobody.
#[derive(Debug, Snafu, PartialEq)]
pub enum QueryError {
  #[snafu(display("operator {:?} is not supported", op))]
  UnsupportedOperator { op: String },

  #[snafu(display("can't find column {:?} in result of table {:?}", column, table))]
  MissingColumn { column: String, table: String },

  #[snafu(display("field {:?} is not present in the row", field))]
  MissingField { field: String },

  #[snafu(display("table {:?} is not stored", table))]
  UnknownTable { table: String },

  #[snafu(display("{}: {} pops more predicates than the {} on the stack", op, wanted, have))]
  CombinatorUnderflow { op: String, wanted: usize, have: usize },

  #[snafu(display("stats combinators are not implemented"))]
  StatsCombinatorUnimplemented,

  #[snafu(display("can't parse directive {:?}", line))]
  BadDirective { line: String },

  #[snafu(display("can't coerce {:?} for comparison against {:?}", literal, cell))]
  BadCoercion { literal: String, cell: String },

  #[snafu(display("invalid regex {:?}", pattern))]
  BadRegex { pattern: String },

  #[snafu(display("{} needs at least {} values", func, wanted))]
  NotEnoughValues { func: String, wanted: usize },

  #[snafu(display("division by zero in {}", func))]
  DivisionByZero { func: String }
}

fn type_rank(value: &Value) -> u8 {
  match value {
    Value::Null => 0,
    Value::Bool(_) => 1,
    Value::Number(_) => 2,
    Value::String(_) => 3,
    Value::Array(_) => 4,
    Value::Object(_) => 5
  }
}

/// A total order over JSON values so grouping keys sort deterministically.
/// Mixed-type columns order by type first.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
  match (a, b) {
    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
    (Value::Number(x), Value::Number(y)) => {
      let x = x.as_f64().unwrap_or(std::f64::NAN);
      let y = y.as_f64().unwrap_or(std::f64::NAN);
      x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    },
    (Value::String(x), Value::String(y)) => x.cmp(y),
    (Value::Array(x), Value::Array(y)) => {
      for (ex, ey) in x.iter().zip(y.iter()) {
        let ord = compare_values(ex, ey);
        if ord != Ordering::Equal {
          return ord;
        }
      }

      x.len().cmp(&y.len())
    },
    _ => type_rank(a).cmp(&type_rank(b))
  }
}

pub fn compare_key_tuples(a: &[Value], b: &[Value]) -> Ordering {
  for (x, y) in a.iter().zip(b.iter()) {
    let ord = compare_values(x, y);
    if ord != Ordering::Equal {
      return ord;
    }
  }

  a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  use serde_json::json;

  #[test]
  fn test_compare_values() {
    assert_eq!(compare_values(&json!(1), &json!(2)), Ordering::Less);
    assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
    assert_eq!(compare_values(&json!("a"), &json!("b")), Ordering::Less);
    assert_eq!(compare_values(&json!("a"), &json!("a")), Ordering::Equal);

    // mixed types order by type, not by accident
    assert_eq!(compare_values(&json!(1), &json!("1")), Ordering::Less);
    assert_eq!(compare_values(&json!(null), &json!(false)), Ordering::Less);
  }

  #[test]
  fn test_compare_arrays() {
    assert_eq!(compare_values(&json!([1, 2]), &json!([1, 3])), Ordering::Less);
    assert_eq!(compare_values(&json!([1, 2]), &json!([1, 2, 0])), Ordering::Less);
    assert_eq!(compare_values(&json!([1, 2]), &json!([1, 2])), Ordering::Equal);
  }

  #[test]
  fn test_compare_key_tuples() {
    let a = vec![json!("a"), json!(1)];
    let b = vec![json!("a"), json!(2)];

    assert_eq!(compare_key_tuples(&a, &b), Ordering::Less);
    assert_eq!(compare_key_tuples(&a, &a.clone()), Ordering::Equal);
  }
}
