//! Shared helper functions for CLI commands

use clap::ValueEnum;
use console::{style, StyledObject};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, RiskLevel, SqliteStore};
use crate::procurement::ProcurementService;

/// Width of section rules in human output
pub const RULE_WIDTH: usize = 68;

/// An opened database plus the configuration it was resolved from
pub struct Session {
    pub path: PathBuf,
    pub store: SqliteStore,
    pub config: Config,
    pub format: OutputFormat,
}

impl Session {
    /// Open the database named by `--database`, else the configured one
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let path = global
            .database
            .clone()
            .unwrap_or_else(|| config.database_path());
        let store = SqliteStore::open(&path)?;
        let format = resolve_format(global.format, &config);
        Ok(Self {
            path,
            store,
            config,
            format,
        })
    }

    /// Engine bound to this store, with the clock pinned when `--as-of` is given
    pub fn service(&self, global: &GlobalOpts) -> ProcurementService<'_, SqliteStore> {
        let service = ProcurementService::new(&self.store, self.config.scoring());
        match global.as_of {
            Some(now) => service.with_clock(now),
            None => service,
        }
    }
}

/// An explicit `--format` wins; `auto` defers to the configured default
pub fn resolve_format(requested: OutputFormat, config: &Config) -> OutputFormat {
    match requested {
        OutputFormat::Auto => config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .unwrap_or(OutputFormat::Auto),
        f => f,
    }
}

/// Print JSON or YAML; returns false for the tabular formats
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Rows rendered as a styled table, a markdown table or TSV
#[derive(Debug, Default)]
pub struct ReportTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> String {
        if format == OutputFormat::Tsv {
            let mut out = String::new();
            for line in std::iter::once(&self.header).chain(self.rows.iter()) {
                out.push_str(&line.join("\t"));
                out.push('\n');
            }
            return out;
        }

        let mut builder = Builder::default();
        builder.push_record(self.header.clone());
        for row in &self.rows {
            builder.push_record(row.clone());
        }
        let mut table = builder.build();
        if format == OutputFormat::Md {
            table.with(Style::markdown());
        } else {
            table.with(Style::rounded());
        }
        format!("{}\n", table)
    }

    pub fn print(&self, format: OutputFormat) {
        print!("{}", self.render(format));
    }
}

/// Bold underlined title over a double rule
pub fn print_header(title: &str) {
    println!("{}", style(title).bold().underlined());
    println!("{}", "═".repeat(RULE_WIDTH));
}

/// Section heading inside a human report
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(title).bold());
}

/// Dollar amount with thousands separators
pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Risk level coloured by severity
pub fn risk_style(level: RiskLevel) -> StyledObject<String> {
    let text = level.to_string();
    match level {
        RiskLevel::Low => style(text).green(),
        RiskLevel::Medium => style(text).yellow(),
        RiskLevel::High => style(text).red(),
        RiskLevel::Critical => style(text).red().bold(),
    }
}

/// The serialized name of a unit enum variant
pub fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Strategy;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(35000.0), "$35,000.00");
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(-1234.5), "-$1,234.50");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(1_234_567.0), "$1,234,567.00");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("ééééé", 4), "é...");
    }

    #[test]
    fn test_label_uses_serde_name() {
        assert_eq!(label(&Strategy::FewestVendors), "fewest_vendors");
        assert_eq!(label(&RiskLevel::Critical), "critical");
    }

    #[test]
    fn test_tsv_render() {
        let mut table = ReportTable::new(["ID", "NAME"]);
        table.push(["1".to_string(), "Widget".to_string()]);
        assert_eq!(table.render(OutputFormat::Tsv), "ID\tNAME\n1\tWidget\n");
    }

    #[test]
    fn test_markdown_render() {
        let mut table = ReportTable::new(["ID"]);
        table.push(["7"]);
        let out = table.render(OutputFormat::Md);
        assert!(out.contains("| ID |"));
        assert!(out.contains("| 7  |"));
    }

    #[test]
    fn test_resolve_format() {
        let config = Config {
            default_format: Some("json".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_format(OutputFormat::Auto, &config), OutputFormat::Json);
        assert_eq!(resolve_format(OutputFormat::Md, &config), OutputFormat::Md);
        assert_eq!(
            resolve_format(OutputFormat::Auto, &Config::default()),
            OutputFormat::Auto
        );
    }
}
