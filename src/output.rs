//! Output encoding for command results
//!
//! `text` is meant for people, `json` and `yaml` for scripts.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Write any serializable value in the chosen encoding
pub fn write_value<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut *out, value)?;
        }
        OutputFormat::Text => {
            let value = serde_json::to_value(value)?;
            write_text(out, &value)?;
        }
    }
    Ok(())
}

/// Strings print raw, lists of strings one per line, anything else as compact JSON
fn write_text<W: Write>(out: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::String(s) => writeln!(out, "{}", s)?,
        Value::Array(items) if items.iter().all(Value::is_string) => {
            for item in items {
                if let Some(s) = item.as_str() {
                    writeln!(out, "{}", s)?;
                }
            }
        }
        other => writeln!(out, "{}", other)?,
    }
    Ok(())
}

/// Print a value to stdout
pub fn print<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    write_value(&mut lock, value, format)
}

/// Print a status line. In text mode it gets a check mark.
pub fn print_message(message: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{} {}", "✓".green(), message);
            Ok(())
        }
        _ => print(message, format),
    }
}

/// Print rows as a table in text mode, structured otherwise
pub fn print_rows<T: Tabled + Serialize>(rows: &[T], format: OutputFormat, empty: &str) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("{}", empty.dimmed());
            } else {
                println!("{}", render_table(rows));
            }
            Ok(())
        }
        _ => print(rows, format),
    }
}

pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
