//! Assembler for optimizer plan stages.
//!
//! A plan stage is a block of text with one operator per line:
//!
//! ```text
//! LogicalProject(name=[$0], age=[$1])
//!   CalciteLogicalIndexScan(table=[[OpenSearch, employees]])
//! ```
//!
//! The parser consumes the block line by line and builds an ordered mapping
//! from operator name to its parsed parameters. Lines that are not shaped like
//! `Name(params)` are skipped.

use std::fmt;

use super::common;
use super::params::parse_params;
use crate::value::{PlanMap, PlanValue};

/// Represents an input line, with surrounding whitespace removed, and the
/// one-based line number it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLine<'a>(pub usize, pub &'a str);

impl fmt::Display for PlanLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: '{}'", self.0, self.1)
    }
}

/// The parser for one plan stage.
///
/// Operators are recorded in the order they first appear. An operator name
/// that appears again replaces the parameters recorded for it earlier.
#[derive(Debug, Default)]
pub struct PlanParser {
    line_no: usize,
    operators: PlanMap,
}

impl PlanParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole plan stage.
    pub fn parse(input: &str) -> PlanMap {
        let mut parser = Self::new();
        for line in input.trim().lines() {
            parser.parse_line(line);
        }
        parser.finish()
    }

    /// Feed the next line of the stage.
    pub fn parse_line(&mut self, line: &str) {
        self.line_no += 1;
        let line = PlanLine(self.line_no, line.trim());
        if line.1.is_empty() {
            return;
        }

        match common::operator_line(line.1) {
            Ok(Some(shape)) => {
                let params = parse_params(shape.body);
                if self.operators.contains_key(shape.name) {
                    tracing::debug!(operator = shape.name, %line, "operator repeated, replacing");
                }
                self.operators
                    .insert(shape.name.to_string(), PlanValue::Mapping(params));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(%line, error = %e, "skipping line that is not an operator");
            }
        }
    }

    /// The number of operators recorded so far.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn finish(self) -> PlanMap {
        self.operators
    }
}

/// Parse a multi-line plan stage into an ordered mapping of operators.
///
/// ```rust
/// use opensearch_explain::parser::parse_plan_tree;
///
/// let tree = parse_plan_tree(
///     "LogicalProject(name=[$0], age=[$1])\n  CalciteLogicalIndexScan(table=[[OpenSearch, employees]])",
/// );
/// let operators: Vec<_> = tree.keys().map(String::as_str).collect();
/// assert_eq!(operators, vec!["LogicalProject", "CalciteLogicalIndexScan"]);
/// ```
pub fn parse_plan_tree(input: &str) -> PlanMap {
    PlanParser::parse(input)
}
