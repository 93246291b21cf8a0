// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use crate::parser::util;
use crate::query::ops::{self, Operator};
use crate::query::types::{QueryError, Row};

/// A parsed filter expression. `Filter:` lines push leaves; `And: N` and
/// `Or: N` pop N expressions off the stack and push the combination.
#[derive(Debug, Clone)]
pub enum Predicate {
  Leaf {
    field: String,
    op: Operator,
    value: String
  },
  And(Vec<Predicate>),
  Or(Vec<Predicate>)
}

impl Predicate {
  /// Parses the body of one `Filter:` line, e.g. `name = heute`
  pub fn from_expression(expression: &str) -> Result<Predicate, QueryError> {
    let bad = || QueryError::BadDirective { line: expression.to_string() };

    let (field, rest) = util::split_whitespace_once(expression).ok_or_else(bad)?;

    // the value may be empty ("Filter: name = ")
    let (op, value) = match util::split_whitespace_once(rest) {
      Some((op, value)) => (op, value),
      None => {
        let op = rest.trim();
        if op.is_empty() {
          return Err(bad());
        }

        (op, "")
      }
    };

    Ok(Predicate::Leaf {
      field: field.to_string(),
      op: op.parse()?,
      value: value.to_string()
    })
  }

  pub fn matches(&self, row: &Row) -> Result<bool, QueryError> {
    match self {
      Predicate::Leaf { field, op, value } => {
        let cell = row.get(field).ok_or_else(|| QueryError::MissingField {
          field: field.clone()
        })?;

        ops::apply(*op, cell, value)
      },
      Predicate::And(parts) => {
        for part in parts {
          if !part.matches(row)? {
            return Ok(false);
          }
        }

        Ok(true)
      },
      Predicate::Or(parts) => {
        for part in parts {
          if part.matches(row)? {
            return Ok(true);
          }
        }

        Ok(false)
      }
    }
  }
}

fn pop_combinator(
  stack: &mut Vec<Predicate>, line: &str
) -> Result<Vec<Predicate>, QueryError> {
  let mut split = line.splitn(2, ' ');
  let op = split.next().unwrap_or("").trim_end_matches(':');
  let count = split.next()
    .and_then(|count| count.trim().parse::<usize>().ok())
    .ok_or_else(|| QueryError::BadDirective { line: line.to_string() })?;

  if count > stack.len() {
    return Err(QueryError::CombinatorUnderflow {
      op: op.to_string(),
      wanted: count,
      have: stack.len()
    });
  }

  Ok(stack.split_off(stack.len() - count))
}

/// Collects the filter expressions of a query into predicate trees. More
/// than one left on the stack means an implicit AND.
pub fn parse_filters(query: &str) -> Result<Vec<Predicate>, QueryError> {
  let mut stack: Vec<Predicate> = vec![];

  for line in query.lines() {
    if let Some(expression) = line.strip_prefix("Filter:") {
      stack.push(Predicate::from_expression(expression)?);
    } else if line.starts_with("And:") {
      let popped = pop_combinator(&mut stack, line)?;
      stack.push(Predicate::And(popped));
    } else if line.starts_with("Or:") {
      let popped = pop_combinator(&mut stack, line)?;
      stack.push(Predicate::Or(popped));
    }
  }

  Ok(stack)
}

/// Runs a query's filters over the rows, keeping the matches
pub fn evaluate_filter(query: &str, rows: &[Row]) -> Result<Vec<Row>, QueryError> {
  let mut filters = parse_filters(query)?;

  if filters.is_empty() {
    return Ok(rows.to_vec());
  }

  let predicate = if filters.len() == 1 {
    filters.remove(0)
  } else {
    Predicate::And(filters)
  };

  let mut matched = vec![];
  for row in rows {
    if predicate.matches(row)? {
      matched.push(row.clone());
    }
  }

  Ok(matched)
}
