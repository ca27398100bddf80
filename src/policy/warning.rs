//! Warning expressions: when a field value should be drawn in the warning color.
//!
//! Grammar:
//!
//! ```text
//! expr := alt (',' alt)*
//! alt  := cond ('+' cond)*
//! cond := op ':' operand
//! op   := gt | ge | lt | le | eq | match
//! ```
//!
//! Alternatives are OR-ed, conditions inside an alternative are AND-ed.
//! Numeric operators compare the first signed integer found in the value
//! against the first signed integer found in the operand. `match` is a
//! case-insensitive substring test.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    static ref SIGNED_INT: Regex = Regex::new(r"-?\d+").unwrap();
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningOp {
    /// value > operand
    Gt,
    /// value >= operand
    Ge,
    /// value < operand
    Lt,
    /// value <= operand
    Le,
    /// value == operand
    Eq,
    /// operand occurs in value, ignoring case
    Match,
    /// Unrecognized operator code; never holds
    Unknown,
}

impl WarningOp {
    fn parse(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "gt" => WarningOp::Gt,
            "ge" => WarningOp::Ge,
            "lt" => WarningOp::Lt,
            "le" => WarningOp::Le,
            "eq" => WarningOp::Eq,
            "match" => WarningOp::Match,
            _ => WarningOp::Unknown,
        }
    }
}

/// One `op:operand` test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Operator
    pub op: WarningOp,
    /// Raw operand text
    pub operand: String,
}

impl Condition {
    /// Evaluate against a non-blank value.
    pub fn holds(&self, value: &str) -> bool {
        if self.op == WarningOp::Match {
            return value.to_lowercase().contains(&self.operand.to_lowercase());
        }

        let (Some(actual), Some(expected)) = (first_signed_int(value), first_signed_int(&self.operand)) else {
            return false;
        };

        match self.op {
            WarningOp::Gt => actual > expected,
            WarningOp::Ge => actual >= expected,
            WarningOp::Lt => actual < expected,
            WarningOp::Le => actual <= expected,
            WarningOp::Eq => actual == expected,
            WarningOp::Match | WarningOp::Unknown => false,
        }
    }
}

/// Parsed warning expression.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub struct WarningExpression {
    source: String,
    alternatives: Vec<Vec<Condition>>,
}

impl WarningExpression {
    /// Parse an expression. Parsing never fails: conditions that do not split
    /// into exactly `op` and `operand` are dropped. An alternative left
    /// without conditions holds for every non-blank value. A blank source has
    /// no alternatives and never matches.
    pub fn parse(source: &str) -> Self {
        if source.trim().is_empty() {
            return Self {
                source: source.to_string(),
                alternatives: Vec::new(),
            };
        }
        let alternatives = source
            .split(',')
            .map(|alt| {
                alt.split('+')
                    .filter_map(|cond| {
                        let parts: Vec<&str> = cond.split(':').collect();
                        if parts.len() != 2 {
                            log::debug!("Dropping malformed warning condition '{}'", cond);
                            return None;
                        }
                        Some(Condition {
                            op: WarningOp::parse(parts[0]),
                            operand: parts[1].to_string(),
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            source: source.to_string(),
            alternatives,
        }
    }

    /// Whether `value` should be flagged. Blank values never are.
    pub fn matches(&self, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        self.alternatives
            .iter()
            .any(|conds| conds.iter().all(|cond| cond.holds(value)))
    }

    /// OR-ed groups of AND-ed conditions.
    pub fn alternatives(&self) -> &[Vec<Condition>] {
        &self.alternatives
    }

    /// True when the source was blank.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl From<String> for WarningExpression {
    fn from(source: String) -> Self {
        Self::parse(&source)
    }
}

impl From<&str> for WarningExpression {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl fmt::Display for WarningExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The first integer in `s`, negative when a '-' directly precedes its digits.
///
/// A string that is a plain integer on its own (including `+7`) is taken whole.
pub fn first_signed_int(s: &str) -> Option<i64> {
    if let Ok(n) = s.trim().parse::<i64>() {
        return Some(n);
    }
    SIGNED_INT.find(s).and_then(|m| m.as_str().parse().ok())
}
