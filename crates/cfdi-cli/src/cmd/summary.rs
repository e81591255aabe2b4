//! `cfdi summary`: non-interactive filter and aggregate.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use cfdi_core::catalog::{Dimension, IGNORE_FILTERS, describe_payment_form, lookup_in};
use cfdi_core::config::load_config;
use cfdi_core::filter::FilterChain;
use cfdi_core::ingest::load_dir;
use cfdi_core::invoice::sort_by_issue_date;
use cfdi_core::selection::Selection;
use cfdi_core::summary::{Summary, count_by, summarize};
use chrono::NaiveDateTime;
use clap::Args;
use clap::builder::PossibleValuesParser;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::money::format_money;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

fn codes_of(dimension: Dimension) -> PossibleValuesParser {
    PossibleValuesParser::new(dimension.entries().iter().map(|entry| entry.id))
}

/// Arguments for `cfdi summary`.
#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    /// Invoices folder (defaults to `[invoices] dir`, usually `cfdis`).
    pub dir: Option<PathBuf>,

    /// Keep invoices with this payment method (repeatable).
    #[arg(long = "payment-method", value_name = "CODE", value_parser = codes_of(Dimension::PaymentMethod))]
    pub payment_method: Vec<String>,

    /// Keep invoices with this payment form (repeatable).
    #[arg(long = "payment-form", value_name = "CODE", value_parser = codes_of(Dimension::PaymentForm))]
    pub payment_form: Vec<String>,

    /// Keep invoices with this CFDI usage (repeatable).
    #[arg(long, value_name = "CODE", value_parser = codes_of(Dimension::Usage))]
    pub usage: Vec<String>,

    /// Keep invoices of this document type (repeatable).
    #[arg(long = "document-type", value_name = "CODE", value_parser = codes_of(Dimension::DocumentType))]
    pub document_type: Vec<String>,

    /// Disable every filter, whatever else is given.
    #[arg(long)]
    pub ignore_filters: bool,
}

impl SummaryArgs {
    /// Selection equivalent to toggling each requested code on.
    pub fn selection(&self) -> anyhow::Result<Selection> {
        let requested = [
            (Dimension::PaymentMethod, &self.payment_method),
            (Dimension::PaymentForm, &self.payment_form),
            (Dimension::Usage, &self.usage),
            (Dimension::DocumentType, &self.document_type),
        ];

        let mut selection = Selection::new();
        for (dimension, codes) in requested {
            for code in codes {
                let entry = lookup_in(dimension, code).with_context(|| {
                    format!("unknown {} code {code}", dimension.title().to_lowercase())
                })?;
                if !selection.contains(entry.id) {
                    selection.toggle(entry);
                }
            }
        }
        if self.ignore_filters {
            selection.toggle(&IGNORE_FILTERS);
        }
        Ok(selection)
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceLine {
    pub uuid: String,
    pub folio: String,
    pub issued_at: NaiveDateTime,
    pub issuer: String,
    pub payment_method: String,
    pub payment_form: String,
    pub currency: String,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct FormCount {
    pub code: String,
    pub description: String,
    pub count: usize,
}

/// Report payload for `cfdi summary`.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub dir: PathBuf,
    pub filters: Vec<&'static str>,
    pub ignore_filters: bool,
    pub summary: Summary,
    pub average: Option<Decimal>,
    pub by_payment_form: Vec<FormCount>,
    pub invoices: Vec<InvoiceLine>,
}

/// Filter and aggregate the invoices in `dir`.
pub fn build_report(dir: &Path, selection: &Selection) -> anyhow::Result<SummaryReport> {
    let mut invoices =
        load_dir(dir).with_context(|| format!("loading invoices from {}", dir.display()))?;
    sort_by_issue_date(&mut invoices);

    let visible = FilterChain::from_selection(selection).apply(&invoices);
    let summary = summarize(&visible)?;
    tracing::info!(
        total = invoices.len(),
        visible = visible.len(),
        "summary computed"
    );

    let by_payment_form = count_by(Dimension::PaymentForm, &visible)
        .into_iter()
        .map(|(code, count)| FormCount {
            description: describe_payment_form(&code),
            code,
            count,
        })
        .collect();

    let invoices = visible
        .into_iter()
        .map(|invoice| InvoiceLine {
            uuid: invoice.uuid,
            folio: invoice.folio,
            issued_at: invoice.issued_at,
            issuer: invoice.issuer.name,
            payment_method: invoice.payment_method,
            payment_form: invoice.payment_form,
            currency: invoice.currency,
            total: invoice.total,
        })
        .collect();

    Ok(SummaryReport {
        dir: dir.to_path_buf(),
        filters: selection.entries().map(|entry| entry.id).collect(),
        ignore_filters: selection.ignores_filters(),
        summary,
        average: summary.average(),
        by_payment_form,
        invoices,
    })
}

/// Execute `cfdi summary`.
pub fn run_summary(
    args: &SummaryArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let config = load_config(project_root)?;
    let dir = super::invoices_dir(args.dir.as_deref(), &config, project_root);
    let report = build_report(&dir, &args.selection()?)?;
    render_mode(output, &report, write_text, write_pretty)
}

fn write_text(report: &SummaryReport, w: &mut dyn Write) -> io::Result<()> {
    for line in &report.invoices {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            line.uuid,
            line.issued_at.format("%Y-%m-%d"),
            line.payment_method,
            line.payment_form,
            line.total
        )?;
    }
    let s = &report.summary;
    writeln!(
        w,
        "summary\t{}\t{}\t{}\t{}",
        s.count, s.subtotal, s.discount, s.total
    )?;
    for form in &report.by_payment_form {
        writeln!(w, "payment_form\t{}\t{}", form.code, form.count)?;
    }
    Ok(())
}

fn write_pretty(report: &SummaryReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Invoices in {}", report.dir.display()))?;
    if report.invoices.is_empty() {
        writeln!(w, "(no invoices match)")?;
    }
    for line in &report.invoices {
        writeln!(
            w,
            "{}  {:<10} {:<28} {:>4}  {:>16}",
            line.issued_at.format("%Y-%m-%d"),
            line.folio,
            line.issuer,
            line.payment_form,
            format_money(line.total)
        )?;
    }
    writeln!(w)?;

    pretty_section(w, "Summary")?;
    if report.ignore_filters {
        pretty_kv(w, "Filters", "ignored")?;
    } else if !report.filters.is_empty() {
        pretty_kv(w, "Filters", report.filters.join(", "))?;
    }
    pretty_kv(w, "Subtotal", format_money(report.summary.subtotal))?;
    pretty_kv(w, "Discount", format_money(report.summary.discount))?;
    pretty_kv(w, "Total", format_money(report.summary.total))?;
    pretty_kv(w, "Invoices", report.summary.count.to_string())?;
    if let Some(average) = report.average {
        pretty_kv(w, "Average", format_money(average))?;
    }
    writeln!(w)?;

    pretty_section(w, "Invoices by payment form")?;
    for form in &report.by_payment_form {
        writeln!(w, "{:<48} {:>6}", form.description, form.count)?;
    }
    Ok(())
}
