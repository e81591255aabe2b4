//! `cfdi catalog`: list the filterable classification codes.

use std::io::{self, Write};

use cfdi_core::catalog::{CatalogEntry, Dimension, IGNORE_FILTERS};
use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `cfdi catalog`.
#[derive(Args, Debug, Default)]
pub struct CatalogArgs {
    /// Only list one dimension.
    #[arg(long, value_enum)]
    pub dimension: Option<DimensionArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DimensionArg {
    PaymentMethod,
    PaymentForm,
    Usage,
    DocumentType,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::PaymentMethod => Self::PaymentMethod,
            DimensionArg::PaymentForm => Self::PaymentForm,
            DimensionArg::Usage => Self::Usage,
            DimensionArg::DocumentType => Self::DocumentType,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DimensionListing {
    pub dimension: Dimension,
    pub title: &'static str,
    pub entries: &'static [CatalogEntry],
}

#[derive(Debug, Serialize)]
pub struct CatalogReport {
    pub dimensions: Vec<DimensionListing>,
    pub ignore_filters: &'static CatalogEntry,
}

fn build_report(only: Option<Dimension>) -> CatalogReport {
    let dimensions = Dimension::ALL
        .into_iter()
        .filter(|dimension| only.is_none_or(|d| d == *dimension))
        .map(|dimension| DimensionListing {
            dimension,
            title: dimension.title(),
            entries: dimension.entries(),
        })
        .collect();
    CatalogReport {
        dimensions,
        ignore_filters: &IGNORE_FILTERS,
    }
}

/// Execute `cfdi catalog`.
pub fn run_catalog(args: &CatalogArgs, output: OutputMode) -> anyhow::Result<()> {
    let report = build_report(args.dimension.map(Dimension::from));
    render_mode(output, &report, write_text, write_pretty)
}

fn write_text(report: &CatalogReport, w: &mut dyn Write) -> io::Result<()> {
    for listing in &report.dimensions {
        for entry in listing.entries {
            writeln!(w, "{:?}\t{}\t{}", listing.dimension, entry.id, entry.label)?;
        }
    }
    writeln!(
        w,
        "Any\t{}\t{}",
        report.ignore_filters.id, report.ignore_filters.label
    )
}

fn write_pretty(report: &CatalogReport, w: &mut dyn Write) -> io::Result<()> {
    for listing in &report.dimensions {
        pretty_section(w, listing.title)?;
        for entry in listing.entries {
            writeln!(w, "  {:<8} {}", entry.id, entry.label)?;
        }
        writeln!(w)?;
    }
    writeln!(
        w,
        "{} ({}) disables every filter while it is active.",
        report.ignore_filters.id, report.ignore_filters.label
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_all_dimensions_in_tab_order() {
        let report = build_report(None);
        let order: Vec<Dimension> = report.dimensions.iter().map(|l| l.dimension).collect();
        assert_eq!(order, Dimension::ALL);
    }

    #[test]
    fn narrows_to_one_dimension() {
        let report = build_report(Some(Dimension::Usage));
        assert_eq!(report.dimensions.len(), 1);
        assert!(report.dimensions[0].entries.iter().any(|e| e.id == "G03"));
    }

    #[test]
    fn text_rows_end_with_ignore_entry() {
        let mut out = Vec::new();
        write_text(&build_report(Some(Dimension::PaymentMethod)), &mut out).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("PaymentMethod\tPUE\t"));
        assert!(lines[2].starts_with("Any\tIGNORE\t"));
    }

    #[test]
    fn json_uses_snake_case_dimensions() {
        let json = serde_json::to_value(build_report(Some(Dimension::PaymentForm))).expect("json");
        assert_eq!(json["dimensions"][0]["dimension"], "payment_form");
        assert_eq!(json["ignore_filters"]["id"], "IGNORE");
    }
}
