//! `cfdi payments`: payment complements grouped by month.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use cfdi_core::config::load_config;
use cfdi_core::payments::{MonthlyPayments, group_by_month, load_payments};
use clap::Args;
use serde::Serialize;

use crate::money::format_money;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `cfdi payments`.
#[derive(Args, Debug, Default)]
pub struct PaymentsArgs {
    /// Invoices folder (defaults to `[invoices] dir`, usually `cfdis`).
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct PaymentsReport {
    pub dir: PathBuf,
    pub months: Vec<MonthlyPayments>,
}

/// Execute `cfdi payments`.
pub fn run_payments(
    args: &PaymentsArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let config = load_config(project_root)?;
    let dir = super::invoices_dir(args.dir.as_deref(), &config, project_root);

    let receipts = load_payments(&dir)
        .with_context(|| format!("loading payment receipts from {}", dir.display()))?;
    let months = group_by_month(receipts);
    tracing::info!(months = months.len(), "payments grouped");

    let report = PaymentsReport { dir, months };
    render_mode(output, &report, write_text, write_pretty)
}

fn write_text(report: &PaymentsReport, w: &mut dyn Write) -> io::Result<()> {
    for month in &report.months {
        for receipt in &month.receipts {
            for line in &receipt.lines {
                writeln!(
                    w,
                    "{:04}-{:02}\t{}\t{}\t{}\t{}",
                    month.year,
                    month.month,
                    line.paid_at.format("%Y-%m-%d"),
                    receipt.issuer,
                    line.folio,
                    line.amount
                )?;
            }
        }
    }
    Ok(())
}

fn write_pretty(report: &PaymentsReport, w: &mut dyn Write) -> io::Result<()> {
    if report.months.is_empty() {
        writeln!(w, "No payment receipts in {}", report.dir.display())?;
        return Ok(());
    }

    for month in &report.months {
        pretty_section(w, &format!("{:04}-{:02}", month.year, month.month))?;
        for receipt in &month.receipts {
            writeln!(
                w,
                "{}  {} -> {}",
                receipt.issued_at.format("%Y-%m-%d"),
                receipt.issuer,
                receipt.recipient
            )?;
            for line in &receipt.lines {
                writeln!(
                    w,
                    "    {}  folio {:<12} {:>16}",
                    line.paid_at.format("%Y-%m-%d"),
                    line.folio,
                    format_money(line.amount)
                )?;
            }
        }
        pretty_kv(w, "Paid", format_money(month.total_paid))?;
        pretty_kv(w, "Documents", month.documents.to_string())?;
        writeln!(w)?;
    }
    Ok(())
}
