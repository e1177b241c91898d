//! Structure OpenSearch SQL/PPL explain output for display.
//!
//! The explain endpoint returns query plans as free-form text embedded in a
//! JSON response. This crate parses that text, in both the legacy tree form
//! and the optimizer ("calcite") form, into nested JSON that is much easier
//! to read.
//!
//! # Example
//! ```rust
//! use opensearch_explain::explain;
//!
//! let response = r#"{"calcite": {
//!     "logical": "LogicalProject(name=[$0])\n  CalciteLogicalIndexScan(table=[[OpenSearch, employees]])",
//!     "physical": "CalciteEnumerableIndexScan(table=[[OpenSearch, employees]], PushDownContext=[[PROJECT->[name]]])"
//! }}"#;
//!
//! let structured = explain(response).unwrap();
//! assert!(structured.contains("\"PROJECT->\": [\n"));
//! ```

pub mod explain;
pub mod fixtures;
pub mod highlight;
pub mod parser;
pub mod report;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types for easier access
pub use explain::{
    ExplainError, ExplainKind, OutputOptions, explain, explain_calcite,
    explain_calcite_with_options, explain_legacy, explain_legacy_with_options,
    explain_with_options, looks_like_explain, structure_envelope,
};
pub use parser::parse_plan_tree;
pub use report::{ReportOptions, calcite_report, calcite_report_with_options};
pub use value::{PlanMap, PlanValue};
