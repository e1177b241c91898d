//! Plain-text report of an optimizer explain.
//!
//! This keeps the plan text as the engine wrote it, one operator per line,
//! and only expands the compact `sourceBuilder` JSON of physical operators so
//! the search request can be read. With [`ReportOptions::highlight`] the
//! report is painted for a terminal.

use std::borrow::Cow;

use serde_json::Value;

use crate::explain::ExplainError;
use crate::highlight::highlight_plan;

const SOURCE_BUILDER_MARKER: &str = "sourceBuilder=";

/// Options for [`calcite_report_with_options`].
#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    /// Paint the report with ANSI colours, see [`crate::highlight`].
    pub highlight: bool,
}

/// Render the logical and physical stages of an optimizer explain response.
///
/// ```text
/// = Calcite Plan =
/// == Logical ==
/// LogicalProject(...)
///
/// == Physical ==
/// CalciteEnumerableIndexScan(...)
/// ```
pub fn calcite_report(envelope: &str) -> Result<String, ExplainError> {
    calcite_report_with_options(envelope, &ReportOptions::default())
}

/// Render the report with custom options.
pub fn calcite_report_with_options(
    envelope: &str,
    options: &ReportOptions,
) -> Result<String, ExplainError> {
    let data: Value = serde_json::from_str(envelope)?;
    let calcite = data
        .get("calcite")
        .filter(|c| c.is_object())
        .ok_or(ExplainError::MissingField("calcite"))?;

    let logical = stage_text(calcite, "logical", "calcite.logical")?
        .lines()
        .collect::<Vec<_>>()
        .join("\n");
    let physical = stage_text(calcite, "physical", "calcite.physical")?
        .lines()
        .map(expand_source_builder)
        .collect::<Vec<_>>()
        .join("\n");

    let report =
        format!("= Calcite Plan =\n== Logical ==\n{logical}\n\n== Physical ==\n{physical}");
    if options.highlight {
        return Ok(highlight_plan(&report));
    }
    Ok(report)
}

fn stage_text<'a>(
    calcite: &'a Value,
    key: &str,
    path: &'static str,
) -> Result<&'a str, ExplainError> {
    calcite
        .get(key)
        .and_then(Value::as_str)
        .ok_or(ExplainError::MissingField(path))
}

/// Pretty-print the `sourceBuilder` JSON object of a physical plan line in
/// place. The line is returned unchanged if it has no such object or the
/// object is not valid JSON.
pub fn expand_source_builder(line: &str) -> Cow<'_, str> {
    let Some(marker) = line.find(SOURCE_BUILDER_MARKER) else {
        return Cow::Borrowed(line);
    };
    let start = marker + SOURCE_BUILDER_MARKER.len();
    let Some(end) = object_end(&line[start..]).map(|len| start + len) else {
        return Cow::Borrowed(line);
    };

    let pretty = match serde_json::from_str::<Value>(&line[start..end])
        .and_then(|v| serde_json::to_string_pretty(&v))
    {
        Ok(pretty) => pretty,
        Err(e) => {
            tracing::debug!(error = %e, "sourceBuilder is not JSON, leaving the line as is");
            return Cow::Borrowed(line);
        }
    };

    let indent = " ".repeat(line.chars().take_while(|c| c.is_whitespace()).count());
    let block = pretty
        .lines()
        .map(|l| format!("{indent}{l}"))
        .collect::<Vec<_>>()
        .join("\n");
    let block = block.trim_start_matches(['|', ' ']);

    Cow::Owned(format!("{}{block}{}", &line[..start], &line[end..]))
}

/// Byte length of the leading text up to and including the `}` that brings
/// the brace depth back to zero.
fn object_end(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
