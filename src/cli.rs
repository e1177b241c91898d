use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::{
    ExplainKind, OutputOptions, ReportOptions, calcite_report_with_options, explain_with_options,
    structure_envelope,
};

#[derive(Parser)]
#[command(name = "opensearch-explain")]
#[command(about = "A CLI for structuring OpenSearch SQL/PPL explain output")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let (input, output) = match &self.command {
            Commands::Structure { input, output, .. } | Commands::Report { input, output, .. } => {
                (input, output)
            }
        };
        let reader =
            get_reader(input).with_context(|| format!("Failed to open input file: {input}"))?;
        let writer =
            get_writer(output).with_context(|| format!("Failed to create output file: {output}"))?;
        self.run_with_io(reader, writer)
    }

    /// Run CLI with provided readers and writers for testing
    pub fn run_with_io<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<()> {
        match &self.command {
            Commands::Structure { to, indent, .. } => {
                let options = OutputOptions::with_indent_width(*indent);
                self.run_structure_with_io(reader, writer, to, &options)
            }
            Commands::Report { color, .. } => {
                let options = ReportOptions { highlight: *color };
                self.run_report_with_io(reader, writer, &options)
            }
        }
    }

    /// Whether debug logging was requested.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Structure { verbose, .. } | Commands::Report { verbose, .. } => *verbose,
        }
    }

    fn run_structure_with_io<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
        to: &Format,
        options: &OutputOptions,
    ) -> Result<()> {
        let input_text = read_text_input(reader)?;

        to.write_explain(writer, &input_text, options)
            .with_context(|| {
                format!(
                    "Failed to write output as {} format",
                    format!("{to:?}").to_lowercase()
                )
            })?;

        tracing::info!("Successfully structured explain output");
        Ok(())
    }

    fn run_report_with_io<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
        options: &ReportOptions,
    ) -> Result<()> {
        if options.highlight {
            // Asked for explicitly, so paint even when not writing to a terminal.
            colored::control::set_override(true);
        }
        let input_text = read_text_input(reader)?;
        let report = calcite_report_with_options(&input_text, options)
            .with_context(|| "Failed to read input as an optimizer explain response")?;
        write_text_output(writer, &report)?;

        tracing::info!("Successfully rendered plan report");
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the plan text of an explain response with structured JSON
    ///
    /// Both legacy ({"root": ...}) and optimizer ({"calcite": ...}) responses
    /// are accepted; the form is picked from the top-level key.
    Structure {
        /// Input file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Output file (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: String,
        /// Output format: json, yaml
        #[arg(short = 't', long, default_value = "json")]
        to: Format,
        /// Spaces per indent level (json output only)
        #[arg(long, default_value_t = 2)]
        indent: usize,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the logical and physical plans of an optimizer explain as text
    Report {
        /// Input file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Output file (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: String,
        /// Highlight the plan with terminal colours
        #[arg(long)]
        color: bool,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Debug)]
pub enum Format {
    Json,
    Yaml,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(format!(
                "Invalid format: '{s}'. Supported formats: json, yaml"
            )),
        }
    }
}

impl Format {
    pub fn write_explain<W: Write>(
        &self,
        writer: W,
        input_text: &str,
        options: &OutputOptions,
    ) -> Result<()> {
        match self {
            Format::Json => {
                let json = explain_with_options(input_text, options)?;
                write_text_output(writer, &json)?;
            }
            Format::Yaml => {
                let envelope: Value = serde_json::from_str(input_text)?;
                if let Some(kind) = ExplainKind::detect(&envelope) {
                    tracing::debug!(?kind, "detected explain form");
                }
                let structured = structure_envelope(envelope)?;
                let yaml = serde_yaml::to_string(&to_yaml_value(&structured))?;
                write_text_output(writer, &yaml)?;
            }
        }
        Ok(())
    }
}

/// Convert to a YAML tree. JSON numbers are held as text to keep their exact
/// digits, which YAML's 64-bit numbers cannot always do; those that fit no
/// YAML number are written as strings.
fn to_yaml_value(value: &Value) -> serde_yaml::Value {
    use serde_yaml::Value as Yaml;

    match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Yaml::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Yaml::Number(u.into())
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| Yaml::Number(f.into()))
                    .unwrap_or_else(|| Yaml::String(n.to_string()))
            }
        }
        Value::String(s) => Yaml::String(s.clone()),
        Value::Array(items) => Yaml::Sequence(items.iter().map(to_yaml_value).collect()),
        Value::Object(map) => Yaml::Mapping(
            map.iter()
                .map(|(k, v)| (Yaml::String(k.clone()), to_yaml_value(v)))
                .collect(),
        ),
    }
}

/// Read text input from reader
fn read_text_input<R: Read>(mut reader: R) -> Result<String> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Write text output to writer
fn write_text_output<W: Write>(mut writer: W, content: &str) -> Result<()> {
    writer.write_all(content.as_bytes())?;
    Ok(())
}

/// Helper function to get reader from file path (or stdin if "-")
fn get_reader(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        Ok(Box::new(io::stdin()))
    } else {
        Ok(Box::new(fs::File::open(path)?))
    }
}

/// Helper function to get writer from file path (or stdout if "-")
fn get_writer(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(fs::File::create(path)?))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::fixtures::{CALCITE_EXPLAIN, LEGACY_EXPLAIN};

    fn structure_cli(to: Format, indent: usize) -> Cli {
        Cli {
            command: Commands::Structure {
                input: String::new(),  // Not used in run_with_io
                output: String::new(), // Not used in run_with_io
                to,
                indent,
                verbose: false,
            },
        }
    }

    fn run(cli: &Cli, input: &str) -> Result<String> {
        let mut output = Vec::new();
        cli.run_with_io(Cursor::new(input.to_string()), &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_structure_calcite_to_json() {
        let output_content = run(&structure_cli(Format::Json, 2), CALCITE_EXPLAIN).unwrap();
        assert!(output_content.starts_with("{\n  \"calcite\": {\n    \"logical\": {\n"));
        assert!(output_content.contains("\"LogicalProject\""));
        assert!(output_content.contains("\"PROJECT->\""));
    }

    #[test]
    fn test_structure_legacy_to_json() {
        let output_content = run(&structure_cli(Format::Json, 2), LEGACY_EXPLAIN).unwrap();
        assert!(output_content.contains("\"OpenSearchQueryRequest\""));
        assert!(output_content.contains("\"firstname\""));
    }

    #[test]
    fn test_structure_with_indent() {
        let output_content = run(&structure_cli(Format::Json, 4), CALCITE_EXPLAIN).unwrap();
        assert!(output_content.starts_with("{\n    \"calcite\": {\n"));
    }

    #[test]
    fn test_structure_to_yaml() {
        let output_content = run(&structure_cli(Format::Yaml, 2), CALCITE_EXPLAIN).unwrap();
        let parsed: Value = serde_yaml::from_str(&output_content).unwrap();
        assert_eq!(
            parsed["calcite"]["logical"]["LogicalProject"]["name"],
            Value::String("[$0]".to_string())
        );
    }

    fn report_cli(color: bool) -> Cli {
        Cli {
            command: Commands::Report {
                input: String::new(),
                output: String::new(),
                color,
                verbose: false,
            },
        }
    }

    #[test]
    fn test_report_command() {
        let output_content = run(&report_cli(false), CALCITE_EXPLAIN).unwrap();
        assert!(output_content.starts_with("= Calcite Plan =\n== Logical ==\n"));
        assert!(output_content.contains("== Physical =="));
        assert!(!output_content.contains('\u{1b}'));
    }

    #[test]
    fn test_report_command_with_color() {
        let output_content = run(&report_cli(true), CALCITE_EXPLAIN).unwrap();
        assert!(output_content.starts_with("\u{1b}[90m= Calcite Plan =\u{1b}[0m\n"));
        assert!(output_content.contains("\u{1b}[32mCalciteEnumerableIndexScan\u{1b}[0m"));
    }

    #[test]
    fn test_report_color_flag() {
        let cli = Cli::try_parse_from(["opensearch-explain", "report", "--color"]).unwrap();
        assert!(matches!(cli.command, Commands::Report { color: true, .. }));
    }

    #[test]
    fn test_yaml_numbers_stay_numbers() {
        let output_content = run(&structure_cli(Format::Yaml, 2), CALCITE_EXPLAIN).unwrap();
        assert!(output_content.contains("from: 0\n"), "{output_content}");
        assert!(output_content.contains("size: 200\n"), "{output_content}");
        assert!(!output_content.contains("serde_json"));
    }

    #[test]
    fn test_invalid_input_reports_error() {
        let err = run(&structure_cli(Format::Json, 2), "not json").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid explain response"));
    }

    #[test]
    fn test_format_from_str() {
        assert!(matches!("JSON".parse::<Format>(), Ok(Format::Json)));
        assert!(matches!("yml".parse::<Format>(), Ok(Format::Yaml)));
        assert!("protobuf".parse::<Format>().is_err());
    }
}
