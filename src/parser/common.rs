use pest::Parser as PestParser;
use pest::iterators::Pair;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "parser/plan_grammar.pest"] // Path relative to src
pub struct PlanGrammar;

pub type Error = Box<pest::error::Error<Rule>>;

/// A `Name(body)` shape matched by one of the call rules of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallShape<'a> {
    pub name: &'a str,
    pub body: &'a str,
}

impl<'a> CallShape<'a> {
    fn from_pair(pair: Pair<'a, Rule>) -> Option<Self> {
        let mut name = None;
        let mut body = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::name => name = Some(inner.as_str()),
                Rule::call_body | Rule::request_body => body = Some(inner.as_str()),
                _ => {}
            }
        }
        Some(CallShape {
            name: name?,
            // An empty body produces no pair for the atomic body rule.
            body: body.unwrap_or(""),
        })
    }
}

fn parse_call(rule: Rule, input: &str) -> Result<Option<CallShape<'_>>, Error> {
    let mut pairs = PlanGrammar::parse(rule, input)?;
    Ok(pairs.next().and_then(CallShape::from_pair))
}

/// Match a whole plan line of the form `Name(params)`.
pub fn operator_line(line: &str) -> Result<Option<CallShape<'_>>, Error> {
    parse_call(Rule::operator_line, line)
}

/// Match a legacy request descriptor `Type(body)` at the start of `input`.
pub fn request_descriptor(input: &str) -> Result<Option<CallShape<'_>>, Error> {
    parse_call(Rule::request_descriptor, input)
}

/// Cut a legacy request body into its `key=value` parts.
pub fn request_parts(body: &str) -> Result<Vec<&str>, Error> {
    let mut pairs = PlanGrammar::parse(Rule::request_parts, body)?;
    let Some(pair) = pairs.next() else {
        return Ok(Vec::new());
    };
    Ok(pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::request_part)
        .map(|p| p.as_str())
        .collect())
}
