//! Parsers for the plan text embedded in explain responses.

mod common;
mod legacy;
mod params;
mod scan;
mod structural;

pub use common::{CallShape, Error, Rule};
pub use legacy::{parse_legacy_fields, parse_legacy_request};
pub use params::{classify_value, parse_arrow, parse_params};
pub use scan::{find_first_unescaped, split_respecting_nesting};
pub use structural::{PlanLine, PlanParser, parse_plan_tree};
