// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde_json::Value;

use crate::query::types::QueryError;

/// Comparison operators usable in `Filter:` and counting `Stats:` lines.
///
/// The literal on the right is coerced to the type of the cell on the left
/// before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
  Equal,
  Greater,
  Less,
  GreaterEqual,
  LessEqual,
  /// `~`, anchored regex match
  Match,
  /// `~~`, substring for strings, membership for lists
  Contains
}

impl FromStr for Operator {
  type Err = QueryError;

  fn from_str(s: &str) -> Result<Operator, QueryError> {
    match s {
      "=" => Ok(Operator::Equal),
      ">" => Ok(Operator::Greater),
      "<" => Ok(Operator::Less),
      ">=" => Ok(Operator::GreaterEqual),
      "<=" => Ok(Operator::LessEqual),
      "~" => Ok(Operator::Match),
      "~~" => Ok(Operator::Contains),
      _ => Err(QueryError::UnsupportedOperator { op: s.to_string() })
    }
  }
}

impl fmt::Display for Operator {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Operator::Equal => write!(f, "="),
      Operator::Greater => write!(f, ">"),
      Operator::Less => write!(f, "<"),
      Operator::GreaterEqual => write!(f, ">="),
      Operator::LessEqual => write!(f, "<="),
      Operator::Match => write!(f, "~"),
      Operator::Contains => write!(f, "~~")
    }
  }
}

fn bad_coercion(literal: &str, cell: &Value) -> QueryError {
  QueryError::BadCoercion {
    literal: literal.to_string(),
    cell: cell.to_string()
  }
}

/// Compares a cell against a literal coerced to the cell's type
fn compare_coerced(cell: &Value, literal: &str) -> Result<Ordering, QueryError> {
  match cell {
    Value::String(s) => Ok(s.as_str().cmp(literal)),
    Value::Number(n) => {
      if let Some(left) = n.as_i64() {
        let right: i64 = literal.trim().parse()
          .map_err(|_| bad_coercion(literal, cell))?;
        Ok(left.cmp(&right))
      } else {
        let left = n.as_f64().unwrap_or(std::f64::NAN);
        let right: f64 = literal.trim().parse()
          .map_err(|_| bad_coercion(literal, cell))?;
        Ok(left.partial_cmp(&right).unwrap_or(Ordering::Equal))
      }
    },
    // the empty string is the only falsy literal
    Value::Bool(b) => Ok(b.cmp(&!literal.is_empty())),
    _ => Err(bad_coercion(literal, cell))
  }
}

/// Applies an operator to a cell and a literal
pub fn apply(op: Operator, cell: &Value, literal: &str) -> Result<bool, QueryError> {
  match op {
    Operator::Equal => Ok(compare_coerced(cell, literal)? == Ordering::Equal),
    Operator::Greater => Ok(compare_coerced(cell, literal)? == Ordering::Greater),
    Operator::Less => Ok(compare_coerced(cell, literal)? == Ordering::Less),
    Operator::GreaterEqual => Ok(compare_coerced(cell, literal)? != Ordering::Less),
    Operator::LessEqual => Ok(compare_coerced(cell, literal)? != Ordering::Greater),
    Operator::Match => {
      let text = match cell {
        Value::String(s) => s,
        _ => return Err(bad_coercion(literal, cell))
      };

      // match-from-start semantics
      let pattern = format!("^(?:{})", literal);
      let regex = Regex::new(&pattern).map_err(|_| QueryError::BadRegex {
        pattern: literal.to_string()
      })?;

      Ok(regex.is_match(text))
    },
    Operator::Contains => match cell {
      Value::String(s) => Ok(s.contains(literal)),
      Value::Array(items) => Ok(items.iter().any(|item| item.as_str() == Some(literal))),
      _ => Err(bad_coercion(literal, cell))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use serde_json::json;
  use spectral::prelude::*;

  #[test]
  fn test_operator_round_trip() {
    for op in &["=", ">", "<", ">=", "<=", "~", "~~"] {
      let parsed: Operator = op.parse().unwrap();
      assert_that!(parsed.to_string()).is_equal_to(op.to_string());
    }

    assert_that!("!=".parse::<Operator>())
      .is_err_containing(QueryError::UnsupportedOperator { op: "!=".to_string() });
  }

  #[test]
  fn test_numeric_coercion() {
    assert_that!(apply(Operator::Equal, &json!(1), "1")).is_ok_containing(true);
    assert_that!(apply(Operator::Greater, &json!(2), "1")).is_ok_containing(true);
    assert_that!(apply(Operator::LessEqual, &json!(2), "2")).is_ok_containing(true);
    assert_that!(apply(Operator::Less, &json!(1.5), "2")).is_ok_containing(true);

    assert_that!(apply(Operator::Equal, &json!(1), "one")).is_err();
  }

  #[test]
  fn test_string_comparison() {
    assert_that!(apply(Operator::Equal, &json!("heute"), "heute")).is_ok_containing(true);
    assert_that!(apply(Operator::Greater, &json!("b"), "a")).is_ok_containing(true);
  }

  #[test]
  fn test_bool_truthiness() {
    assert_that!(apply(Operator::Equal, &json!(true), "1")).is_ok_containing(true);
    assert_that!(apply(Operator::Equal, &json!(false), "")).is_ok_containing(true);
    assert_that!(apply(Operator::Equal, &json!(true), "")).is_ok_containing(false);
  }

  #[test]
  fn test_match_is_anchored() {
    assert_that!(apply(Operator::Match, &json!("heute"), "heu")).is_ok_containing(true);
    assert_that!(apply(Operator::Match, &json!("heute"), "eut")).is_ok_containing(false);
    assert_that!(apply(Operator::Match, &json!("heute"), "h.*e$")).is_ok_containing(true);

    assert_that!(apply(Operator::Match, &json!("heute"), "("))
      .is_err_containing(QueryError::BadRegex { pattern: "(".to_string() });
  }

  #[test]
  fn test_contains() {
    assert_that!(apply(Operator::Contains, &json!("notification"), "idle"))
      .is_ok_containing(false);
    assert_that!(apply(Operator::Contains, &json!("notification"), "fica"))
      .is_ok_containing(true);

    // membership for list cells
    assert_that!(apply(Operator::Contains, &json!(["a", "b"]), "b"))
      .is_ok_containing(true);
    assert_that!(apply(Operator::Contains, &json!(["a", "b"]), "c"))
      .is_ok_containing(false);
  }

  #[test]
  fn test_ordering_against_list_is_an_error() {
    assert_that!(apply(Operator::Greater, &json!(["a"]), "a")).is_err();
  }
}
